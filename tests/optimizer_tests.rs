mod common;

use itertools::Itertools;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use strokeforge::config::Config;
use strokeforge::constraint::ConstraintMap;
use strokeforge::geometry::Pos;
use strokeforge::layout::Layout;
use strokeforge::optimizer::anneal::{T0, TF};
use strokeforge::optimizer::{
    metropolis_accept, temperature, Anneal, NoProgress, OptimizationOptions, Optimizer,
    ProgressCallback, SteepestAscent,
};
use strokeforge::remap::Remap;

fn open() -> ConstraintMap {
    ConstraintMap::new("open")
}

#[test]
fn test_ascent_strictly_improves() {
    let scorer = common::qwerty_scorer();
    let constraints = open();
    let start = common::qwerty();
    let mut last = scorer.score(&start).score();

    let steps: Vec<_> = SteepestAscent::new(scorer, &constraints, &start, &[], 2)
        .unwrap()
        .take(40)
        .collect();
    assert!(!steps.is_empty());
    for step in &steps {
        assert!(step.score < last, "{} is not below {}", step.score, last);
        assert!((scorer.score(&step.layout).score() - step.score).abs() < 1e-9);
        assert_eq!(step.layout.name, "qwerty-ascended");
        last = step.score;
    }
    // the caller's layout is untouched
    assert_eq!(start, common::qwerty());
}

#[test]
fn test_ascent_finds_three_key_optimum() {
    let geom = common::tiny_board();
    let base = Layout::from_keys("abc", geom.clone(), "abc").unwrap();
    let speeds = common::sampled_speeds(&base, |_| true);
    let corpus = common::corpus_of(&[("abc", 1), ("bca", 1), ("aab", 1), ("cbb", 1), ("acb", 1)]);
    let scorer = common::build(&base, &speeds, &corpus);

    let scored: Vec<(Layout, f64)> = ['a', 'b', 'c']
        .iter()
        .permutations(3)
        .map(|p| {
            let keys: String = p.into_iter().collect();
            let layout = Layout::from_keys(&keys, geom.clone(), &keys).unwrap();
            let score = scorer.score(&layout).score();
            (layout, score)
        })
        .collect();
    let best = scored.iter().map(|(_, s)| *s).fold(f64::INFINITY, f64::min);
    let (worst, _) = scored
        .iter()
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .unwrap();

    let constraints = open();
    let mut search = SteepestAscent::new(&scorer, &constraints, worst, &[], 1).unwrap();
    let steps: Vec<_> = search.by_ref().collect();
    assert!(!steps.is_empty());
    assert!((search.stats().score() - best).abs() < 1e-9);
}

#[test]
fn test_ascent_obeys_pins_and_caps() {
    let scorer = common::qwerty_scorer();
    let start = common::qwerty();
    let freqs = scorer.key_frequencies(&start);
    // home-row pinky spots refuse anything busier than their current keys
    let cap = freqs[&'a'].max(freqs[&';']);
    let constraints = open()
        .with_cap(Pos::new(1, 0), cap)
        .unwrap()
        .with_cap(Pos::new(1, 9), cap)
        .unwrap();
    assert!(constraints.is_layout_legal(&start, &freqs));
    let pins = ['e', 't'];

    for step in SteepestAscent::new(scorer, &constraints, &start, &pins, 0)
        .unwrap()
        .take(15)
    {
        assert_eq!(step.layout.pos_of('e'), start.pos_of('e'));
        assert_eq!(step.layout.pos_of('t'), start.pos_of('t'));
        assert!(constraints.is_layout_legal(&step.layout, &freqs));
        for (key, _) in step.remap.iter() {
            assert!(!pins.contains(&key));
        }
    }
}

#[test]
fn test_ascent_with_nothing_to_move() {
    let scorer = common::qwerty_scorer();
    let start = common::qwerty();
    let pins: Vec<char> = start.keys().collect();
    let constraints = open();
    let mut search = SteepestAscent::new(scorer, &constraints, &start, &pins, 1).unwrap();
    assert!(search.next().is_none());
    assert!(search.next().is_none());
}

#[test]
fn test_temperature_schedule() {
    assert_eq!(temperature(0, 1000), T0);
    assert!((temperature(1000, 1000) - TF).abs() < 1e-12);
    assert!((temperature(500, 1000) - (T0 * TF).sqrt()).abs() < 1e-9);
    let temps: Vec<f64> = (0..=100).map(|i| temperature(i, 100)).collect();
    assert!(temps.windows(2).all(|w| w[1] < w[0]));
}

#[test]
fn test_metropolis_always_takes_improvements() {
    let mut rng = fastrand::Rng::with_seed(11);
    for _ in 0..1000 {
        assert!(metropolis_accept(0.0, 1e-6, &mut rng));
        assert!(metropolis_accept(-5.0, 0.5, &mut rng));
    }
}

#[test]
fn test_metropolis_acceptance_rate() {
    let mut rng = fastrand::Rng::with_seed(42);
    let (delta, temp) = (0.5, 1.0);
    let trials = 50_000;
    let accepted = (0..trials)
        .filter(|_| metropolis_accept(delta, temp, &mut rng))
        .count();
    let rate = accepted as f64 / trials as f64;
    let expected = (-delta / temp).exp();
    assert!((rate - expected).abs() < 0.015, "rate {} vs {}", rate, expected);
}

#[test]
fn test_anneal_yields_consistent_steps() {
    let scorer = common::qwerty_scorer();
    let constraints = open();
    let start = common::qwerty();
    let iterations = 2_000;

    let mut search = Anneal::new(scorer, &constraints, &start, &[], iterations, Some(5)).unwrap();
    let mut last_score = scorer.score(&start).score();
    let mut last_step = None;
    let mut accepted = 0;
    for step in search.by_ref() {
        assert!((step.score - last_score - step.delta).abs() < 1e-9);
        assert!((scorer.score(&step.layout).score() - step.score).abs() < 1e-6);
        assert_eq!(step.temperature, temperature(step.step, iterations));
        if let Some(prev) = last_step {
            assert!(step.step > prev);
        }
        last_step = Some(step.step);
        last_score = step.score;
        accepted += 1;
    }
    assert!(accepted > 0);
    assert_eq!(search.steps_taken(), iterations);
    assert_eq!(search.layout().name, "qwerty-annealed");
}

#[test]
fn test_anneal_is_reproducible_with_seed() {
    let scorer = common::qwerty_scorer();
    let constraints = open();
    let start = common::qwerty();
    let run = || {
        Anneal::new(scorer, &constraints, &start, &['a'], 500, Some(99))
            .unwrap()
            .map(|s| (s.step, s.remap))
            .collect::<Vec<_>>()
    };
    let first = run();
    assert_eq!(first, run());
    assert!(first.iter().all(|(_, r)| !r.touches('a')));
}

struct Counter(AtomicUsize);

impl ProgressCallback for Counter {
    fn on_progress(&self, _: usize, _: f64, _: &Layout, _: &Remap) -> bool {
        self.0.fetch_add(1, Ordering::SeqCst) < 2
    }
}

fn optimizer(options: OptimizationOptions) -> Optimizer {
    Optimizer::new(
        Arc::new(common::qwerty_scorer().clone()),
        Arc::new(open()),
        options,
    )
}

#[test]
fn test_total_remap_reproduces_result() {
    let start = common::qwerty();
    let opt = optimizer(OptimizationOptions {
        iterations: 3_000,
        seed: Some(17),
        ..Default::default()
    });

    for result in [
        opt.run_anneal(&start, NoProgress).unwrap(),
        opt.run_ascent(&start, NoProgress).unwrap(),
    ] {
        let mut replayed = start.clone();
        replayed.apply_remap(&result.total_remap).unwrap();
        assert_eq!(replayed, result.layout);
        assert!(result.steps > 0);
        assert!((common::qwerty_scorer().score(&replayed).score() - result.score).abs() < 1e-6);
    }
}

#[test]
fn test_runner_stops_early() {
    let start = common::qwerty();
    let capped = optimizer(OptimizationOptions {
        max_steps: 3,
        ..Default::default()
    });
    assert_eq!(capped.run_ascent(&start, NoProgress).unwrap().steps, 3);

    let counter = Counter(AtomicUsize::new(0));
    let result = optimizer(OptimizationOptions::default())
        .run_ascent(&start, counter)
        .unwrap();
    assert_eq!(result.steps, 3);
}

#[test]
fn test_options_from_config() {
    let mut config = Config::default();
    config.search.pins = "a s".to_string();
    config.search.max_seconds = 5;
    config.search.seed = Some(3);
    let options = OptimizationOptions::from(&config);
    assert_eq!(options.pinned_keys, vec!['a', 's']);
    assert_eq!(options.max_time, Some(std::time::Duration::from_secs(5)));
    assert_eq!(options.seed, Some(3));
    assert_eq!(options.iterations, 100_000);
}

#[test]
fn test_warmed_cache_survives_a_search() {
    let scorer = common::qwerty_scorer();
    let constraints = open();
    let mut start = common::qwerty();
    let trigrams: Vec<[char; 3]> = scorer.trigrams.iter().map(|(t, _)| *t).collect();
    let bigrams: Vec<[char; 2]> = scorer.bigrams.iter().map(|(b, _)| *b).collect();
    start.warm_cache(trigrams.iter(), bigrams.iter());
    assert!(!start.cache().is_empty());

    let last = Anneal::new(scorer, &constraints, &start, &[], 400, Some(8))
        .unwrap()
        .last()
        .unwrap();
    assert_eq!(last.layout.cache().len(), start.cache().len());
    for ngram in &trigrams {
        if let Ok(fresh) = last.layout.to_nstroke(*ngram) {
            assert_eq!(last.layout.tristroke(*ngram).unwrap(), fresh);
        }
    }
    for ngram in &bigrams {
        if let Ok(fresh) = last.layout.to_nstroke(*ngram) {
            assert_eq!(last.layout.bistroke(*ngram).unwrap(), fresh);
        }
    }
}
