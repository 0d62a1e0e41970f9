use rstest::rstest;
use strokeforge::scorer::category::{BISTROKE_CATEGORIES, TRISTROKE_CATEGORIES};
use strokeforge::scorer::{Category, Taxonomy};

#[test]
fn test_tags_parse_back() {
    for cat in TRISTROKE_CATEGORIES.iter().chain(BISTROKE_CATEGORIES) {
        assert_eq!(Category::parse(cat.tag()).unwrap(), *cat);
    }
    assert!(Category::parse("sfb.sideways").is_err());
}

#[rstest]
#[case(Category::Total, "total")]
#[case(Category::AnyScissor, "*.scissor")]
#[case(Category::AltFamily, "alt")]
#[case(Category::SfbRollIn, "sfb.roll.in")]
fn test_display_names(#[case] cat: Category, #[case] name: &str) {
    assert_eq!(cat.display_name(), name);
}

#[test]
fn test_every_leaf_is_in_total() {
    for taxonomy in [Taxonomy::Bistroke, Taxonomy::Tristroke] {
        let leaves: Vec<Category> = taxonomy.leaves().collect();
        let members: Vec<Category> = Category::Total.members(taxonomy).collect();
        assert_eq!(leaves, members);
    }
}

#[rstest]
#[case(Category::SfbFamily, &[
    Category::SfbAlt,
    Category::SfbRollIn,
    Category::SfbRollInScissor,
    Category::SfbRollOut,
    Category::SfbRollOutScissor,
])]
#[case(Category::AnyScissorTwice, &[
    Category::OnehandInScissorTwice,
    Category::OnehandOutScissorTwice,
    Category::SfsRedirectScissorTwice,
])]
#[case(Category::AnyScissorSkip, &[
    Category::AltInScissorSkip,
    Category::AltOutScissorSkip,
    Category::RedirectScissorSkip,
])]
#[case(Category::Redirect, &[Category::Redirect])]
fn test_aggregate_members(#[case] cat: Category, #[case] expected: &[Category]) {
    let members: Vec<Category> = cat.members(Taxonomy::Tristroke).collect();
    assert_eq!(members, expected);
}

#[test]
fn test_scissor_suffixes_do_not_overlap() {
    // ".scissor" must not pick up ".scissor.twice" or ".scissor_skip" leaves
    let scissor: Vec<Category> = Category::AnyScissor.members(Taxonomy::Tristroke).collect();
    assert!(scissor.contains(&Category::RollInScissor));
    assert!(!scissor.contains(&Category::OnehandInScissorTwice));
    assert!(!scissor.contains(&Category::AltInScissorSkip));
    assert!(!scissor.contains(&Category::RedirectScissorAndSkip));
}

#[rstest]
#[case(Category::OnehandInScissorTwice, &[
    Category::OnehandInScissor,
    Category::OnehandIn,
    Category::OnehandFamily,
    Category::Total,
])]
#[case(Category::RedirectScissorAndSkip, &[
    Category::RedirectScissor,
    Category::Redirect,
    Category::Total,
])]
#[case(Category::Sfr, &[Category::Sfb, Category::Total])]
#[case(Category::SfrFamily, &[Category::SfbFamily, Category::Total])]
#[case(Category::SfrRollInScissor, &[
    Category::SfrRollIn,
    Category::SfrFamily,
    Category::SfbFamily,
    Category::Total,
])]
#[case(Category::Sft, &[Category::Total])]
fn test_fallback_chains(#[case] start: Category, #[case] chain: &[Category]) {
    let mut walked = Vec::new();
    let mut current = start.fallback_parent();
    while let Some(parent) = current {
        walked.push(parent);
        current = parent.fallback_parent();
    }
    assert_eq!(walked, chain);
}

#[test]
fn test_every_chain_ends_at_total() {
    for cat in TRISTROKE_CATEGORIES.iter().chain(BISTROKE_CATEGORIES) {
        let mut steps = 0;
        let mut current = *cat;
        while let Some(parent) = current.fallback_parent() {
            current = parent;
            steps += 1;
            assert!(steps < 10, "{:?} does not terminate", cat);
        }
        assert_eq!(current, Category::Total);
    }
}
