mod common;

use proptest::prelude::*;
use std::collections::HashMap;
use strokeforge::constraint::ConstraintMap;
use strokeforge::corpus::Corpus;
use strokeforge::geometry::{Coord, Finger};
use strokeforge::layout::Layout;
use strokeforge::remap::Remap;
use strokeforge::scorer::flow::tristroke_category;
use strokeforge::scorer::{CategoryReport, Nstroke, Taxonomy, Tristroke};

const QWERTY: &str = "qwertyuiopasdfghjkl;zxcvbnm,./";
// the layout keys plus a few the board never carries
const TEXT_CHARS: &str = "qwertyuiopasdfghjkl;zxcvbnm,./QX1 -";

const FINGERS: [Finger; 10] = [
    Finger::LP,
    Finger::LR,
    Finger::LM,
    Finger::LI,
    Finger::LT,
    Finger::RT,
    Finger::RI,
    Finger::RM,
    Finger::RR,
    Finger::RP,
];

// --- STRATEGIES ---

// Quarter-unit coordinates keep every translation exact.
prop_compose! {
    fn arb_tristroke()(
        fingers in proptest::array::uniform3(0usize..10),
        xs in proptest::array::uniform3(-20i32..20),
        ys in proptest::array::uniform3(-8i32..8),
    ) -> Tristroke {
        Nstroke::new(
            fingers.map(|f| FINGERS[f]),
            [0, 1, 2].map(|i| Coord::new(xs[i] as f64 / 4.0, ys[i] as f64 / 4.0)),
        )
    }
}

prop_compose! {
    fn arb_cycle()(
        keys in proptest::sample::subsequence(QWERTY.chars().collect::<Vec<_>>(), 2..7)
            .prop_shuffle()
    ) -> Remap {
        Remap::cycle(&keys)
    }
}

prop_compose! {
    fn arb_remap()(cycles in proptest::collection::vec(arb_cycle(), 1..4)) -> Remap {
        cycles.iter().fold(Remap::new(), |acc, c| &acc + c)
    }
}

prop_compose! {
    fn arb_layout()(keys in Just(QWERTY.chars().collect::<Vec<_>>()).prop_shuffle()) -> Layout {
        let keys: String = keys.into_iter().collect();
        Layout::from_keys("shuffled", common::qwerty().shared_geometry(), &keys).unwrap()
    }
}

prop_compose! {
    fn arb_corpus()(
        text in proptest::collection::vec(
            proptest::sample::select(TEXT_CHARS.chars().collect::<Vec<_>>()),
            3..240,
        ),
        extra in proptest::collection::vec(
            (proptest::sample::select(TEXT_CHARS.chars().collect::<Vec<_>>()), 1u64..40),
            0..20,
        ),
    ) -> Corpus {
        let mut corpus = Corpus::from_text(&text.into_iter().collect::<String>());
        // heavier trigrams around a single key
        for (key, count) in extra {
            corpus.add(&format!("{}e{}", key, key), count);
        }
        corpus.finish();
        corpus
    }
}

fn assert_rollups(report: &CategoryReport, taxonomy: Taxonomy) -> Result<(), TestCaseError> {
    for row in report.rows.iter().filter(|r| !r.category.is_leaf()) {
        let members: Vec<_> = row
            .category
            .members(taxonomy)
            .filter_map(|c| report.get(c))
            .map(|r| r.raw)
            .collect();
        let count: u64 = members.iter().map(|m| m.count).sum();
        let known: u64 = members.iter().map(|m| m.known).sum();
        let time: f64 = members.iter().map(|m| m.total_time).sum();
        prop_assert_eq!(row.raw.count, count, "{:?}", row.category);
        prop_assert_eq!(row.raw.known, known, "{:?}", row.category);
        prop_assert!((row.raw.total_time - time).abs() < 1e-6, "{:?}", row.category);
    }
    Ok(())
}

proptest! {
    #[test]
    fn test_category_survives_hand_translation(
        stroke in arb_tristroke(),
        left in -40i32..40,
        right in -40i32..40,
    ) {
        let mut shifted = stroke;
        for (f, c) in shifted.fingers.iter().zip(shifted.coords.iter_mut()) {
            let shift = if f.is_right() { right } else { left };
            c.x += shift as f64 / 4.0;
        }
        prop_assert_eq!(stroke.shape(), shifted.shape());
        prop_assert_eq!(tristroke_category(&stroke), tristroke_category(&shifted));
    }

    #[test]
    fn test_remaps_stay_permutations(remap in arb_remap()) {
        prop_assert!(remap.is_permutation());
        prop_assert!((&remap + &-&remap).is_empty());
    }

    #[test]
    fn test_inverse_restores_layout(remap in arb_remap()) {
        let mut layout = common::qwerty();
        layout.apply_remap(&remap).unwrap();
        layout.apply_remap(&-&remap).unwrap();
        prop_assert_eq!(layout, common::qwerty());
    }

    #[test]
    fn test_sum_is_sequential_application(a in arb_remap(), b in arb_remap()) {
        let mut sequential = common::qwerty();
        sequential.apply_remap(&a).unwrap();
        sequential.apply_remap(&b).unwrap();

        let mut combined = common::qwerty();
        combined.apply_remap(&(&b + &a)).unwrap();
        prop_assert_eq!(sequential, combined);
    }

    #[test]
    fn test_diff_recovers_remap(remap in arb_remap()) {
        let from = common::qwerty();
        let mut to = from.clone();
        to.apply_remap(&remap).unwrap();
        prop_assert_eq!(Remap::diff(&from, &to), remap);
    }

    #[test]
    fn test_cycles_rebuild(remap in arb_remap()) {
        let rebuilt = remap
            .cycles()
            .iter()
            .fold(Remap::new(), |acc, c| &acc + &Remap::cycle(c));
        prop_assert_eq!(rebuilt, remap);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_delta_matches_full_rescore(
        layout in arb_layout(),
        corpus in arb_corpus(),
        remap in arb_remap(),
    ) {
        let scorer = common::build(&layout, common::qwerty_speeds(), &corpus);
        let predicted = scorer.remapped_score(&layout, scorer.score(&layout), &remap).unwrap();

        let mut moved = layout.clone();
        moved.apply_remap(&remap).unwrap();
        let actual = scorer.score(&moved);

        prop_assert_eq!(predicted.count, actual.count);
        prop_assert_eq!(predicted.known, actual.known);
        prop_assert!((predicted.total_time - actual.total_time).abs() < 1e-6);
    }

    #[test]
    fn test_indexed_delta_matches_scan(
        layout in arb_layout(),
        corpus in arb_corpus(),
        remap in arb_remap(),
    ) {
        let scorer = common::build(&layout, common::qwerty_speeds(), &corpus);
        let indexed = scorer.score_delta(&layout, &remap).unwrap();
        let scanned = scorer.score_delta_scan(&layout, &remap).unwrap();
        prop_assert_eq!(indexed.count, scanned.count);
        prop_assert_eq!(indexed.known, scanned.known);
        prop_assert!((indexed.total_time - scanned.total_time).abs() < 1e-6);
    }

    #[test]
    fn test_aggregates_sum_their_members(layout in arb_layout(), corpus in arb_corpus()) {
        let scorer = common::build(&layout, common::qwerty_speeds(), &corpus);
        assert_rollups(&scorer.analyze(&layout), Taxonomy::Tristroke)?;
        assert_rollups(&scorer.analyze_bistrokes(&layout), Taxonomy::Bistroke)?;
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_random_legal_swap_respects_caps(
        caps in proptest::collection::vec(0.0..1.0f64, 30),
        freq_seed in any::<u64>(),
        rng_seed in any::<u64>(),
    ) {
        let layout = common::qwerty();
        let mut map = ConstraintMap::new("random");
        for (node, cap) in layout.geometry().keys.iter().zip(caps) {
            map.set_cap(node.pos(), cap).unwrap();
        }
        let mut freq_rng = fastrand::Rng::with_seed(freq_seed);
        let freqs: HashMap<char, f64> = layout.keys().map(|k| (k, freq_rng.f64() * 0.5)).collect();

        let mut rng = fastrand::Rng::with_seed(rng_seed);
        if let Ok(swap) = map.random_legal_swap(&layout, &freqs, &[], &mut rng) {
            prop_assert_eq!(swap.len(), 2);
            prop_assert!(map.is_remap_legal(&layout, &freqs, &swap));
        }
    }
}
