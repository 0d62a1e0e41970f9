use crate::error::{SfResult, StrokeForgeError};
use std::str::FromStr;
use strum_macros::{EnumIter, EnumString, IntoStaticStr};

/// Stroke categories for both bistrokes and tristrokes.
///
/// Tags follow a dotted hierarchy. A tag ending in `.` is a family whose
/// stats are the sum of every tag sharing that prefix, a tag starting with
/// `.` sums every tag ending in it, and the empty tag is the grand total.
/// The hierarchy is spelled out in [`Category::family`],
/// [`Category::scissor_mark`] and [`Category::fallback_parent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, EnumString, IntoStaticStr)]
pub enum Category {
    #[strum(serialize = "")]
    Total,
    #[strum(serialize = ".scissor")]
    AnyScissor,
    #[strum(serialize = ".scissor.twice")]
    AnyScissorTwice,
    #[strum(serialize = ".scissor_and_skip")]
    AnyScissorAndSkip,
    #[strum(serialize = ".scissor_skip")]
    AnyScissorSkip,
    #[strum(serialize = "alt")]
    Alt,
    #[strum(serialize = "alt.")]
    AltFamily,
    #[strum(serialize = "alt.in")]
    AltIn,
    #[strum(serialize = "alt.in.scissor_skip")]
    AltInScissorSkip,
    #[strum(serialize = "alt.out")]
    AltOut,
    #[strum(serialize = "alt.out.scissor_skip")]
    AltOutScissorSkip,
    #[strum(serialize = "onehand.")]
    OnehandFamily,
    #[strum(serialize = "onehand.in")]
    OnehandIn,
    #[strum(serialize = "onehand.in.scissor")]
    OnehandInScissor,
    #[strum(serialize = "onehand.in.scissor.twice")]
    OnehandInScissorTwice,
    #[strum(serialize = "onehand.out")]
    OnehandOut,
    #[strum(serialize = "onehand.out.scissor")]
    OnehandOutScissor,
    #[strum(serialize = "onehand.out.scissor.twice")]
    OnehandOutScissorTwice,
    #[strum(serialize = "redirect")]
    Redirect,
    #[strum(serialize = "redirect.scissor")]
    RedirectScissor,
    #[strum(serialize = "redirect.scissor_and_skip")]
    RedirectScissorAndSkip,
    #[strum(serialize = "redirect.scissor_skip")]
    RedirectScissorSkip,
    #[strum(serialize = "roll.")]
    RollFamily,
    #[strum(serialize = "roll.in")]
    RollIn,
    #[strum(serialize = "roll.in.scissor")]
    RollInScissor,
    #[strum(serialize = "roll.out")]
    RollOut,
    #[strum(serialize = "roll.out.scissor")]
    RollOutScissor,
    #[strum(serialize = "sfb")]
    Sfb,
    #[strum(serialize = "sfb.")]
    SfbFamily,
    #[strum(serialize = "sfb.alt")]
    SfbAlt,
    #[strum(serialize = "sfb.roll.in")]
    SfbRollIn,
    #[strum(serialize = "sfb.roll.in.scissor")]
    SfbRollInScissor,
    #[strum(serialize = "sfb.roll.out")]
    SfbRollOut,
    #[strum(serialize = "sfb.roll.out.scissor")]
    SfbRollOutScissor,
    #[strum(serialize = "sfr")]
    Sfr,
    #[strum(serialize = "sfr.")]
    SfrFamily,
    #[strum(serialize = "sfr.alt")]
    SfrAlt,
    #[strum(serialize = "sfr.roll.in")]
    SfrRollIn,
    #[strum(serialize = "sfr.roll.in.scissor")]
    SfrRollInScissor,
    #[strum(serialize = "sfr.roll.out")]
    SfrRollOut,
    #[strum(serialize = "sfr.roll.out.scissor")]
    SfrRollOutScissor,
    #[strum(serialize = "sfs.")]
    SfsFamily,
    #[strum(serialize = "sfs.alt")]
    SfsAlt,
    #[strum(serialize = "sfs.redirect")]
    SfsRedirect,
    #[strum(serialize = "sfs.redirect.scissor")]
    SfsRedirectScissor,
    #[strum(serialize = "sfs.redirect.scissor.twice")]
    SfsRedirectScissorTwice,
    #[strum(serialize = "sft")]
    Sft,
    #[strum(serialize = "unknown")]
    Unknown,
}

use Category::*;

/// Which stroke length a category list describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Taxonomy {
    Bistroke,
    Tristroke,
}

pub const BISTROKE_CATEGORIES: &[Category] = &[
    Total,
    Alt,
    RollFamily,
    RollIn,
    RollInScissor,
    RollOut,
    RollOutScissor,
    Sfb,
    Sfr,
    Unknown,
];

pub const TRISTROKE_CATEGORIES: &[Category] = &[
    Total,
    AnyScissor,
    AnyScissorTwice,
    AnyScissorAndSkip,
    AnyScissorSkip,
    AltFamily,
    AltIn,
    AltInScissorSkip,
    AltOut,
    AltOutScissorSkip,
    OnehandFamily,
    OnehandIn,
    OnehandInScissor,
    OnehandInScissorTwice,
    OnehandOut,
    OnehandOutScissor,
    OnehandOutScissorTwice,
    Redirect,
    RedirectScissor,
    RedirectScissorAndSkip,
    RedirectScissorSkip,
    RollFamily,
    RollIn,
    RollInScissor,
    RollOut,
    RollOutScissor,
    SfbFamily,
    SfbAlt,
    SfbRollIn,
    SfbRollInScissor,
    SfbRollOut,
    SfbRollOutScissor,
    SfrFamily,
    SfrAlt,
    SfrRollIn,
    SfrRollInScissor,
    SfrRollOut,
    SfrRollOutScissor,
    SfsFamily,
    SfsAlt,
    SfsRedirect,
    SfsRedirectScissor,
    SfsRedirectScissorTwice,
    Sft,
    Unknown,
];

impl Taxonomy {
    pub fn categories(self) -> &'static [Category] {
        match self {
            Taxonomy::Bistroke => BISTROKE_CATEGORIES,
            Taxonomy::Tristroke => TRISTROKE_CATEGORIES,
        }
    }

    /// Categories a classifier can actually return.
    pub fn leaves(self) -> impl Iterator<Item = Category> {
        self.categories().iter().copied().filter(|c| c.is_leaf())
    }
}

impl Category {
    pub fn tag(self) -> &'static str {
        self.into()
    }

    pub fn parse(tag: &str) -> SfResult<Self> {
        Category::from_str(tag)
            .map_err(|_| StrokeForgeError::Validation(format!("Unknown category '{}'", tag)))
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Total => "total",
            AnyScissor => "*.scissor",
            AnyScissorTwice => "*.scissor.twice",
            AnyScissorAndSkip => "*.scissor_and_skip",
            AnyScissorSkip => "*.scissor_skip",
            AltFamily => "alt",
            OnehandFamily => "onehand",
            RollFamily => "roll",
            SfbFamily => "sfb",
            SfrFamily => "sfr",
            SfsFamily => "sfs",
            other => other.tag(),
        }
    }

    pub fn is_family(self) -> bool {
        matches!(
            self,
            AltFamily | OnehandFamily | RollFamily | SfbFamily | SfrFamily | SfsFamily
        )
    }

    pub fn is_suffix_aggregate(self) -> bool {
        matches!(
            self,
            AnyScissor | AnyScissorTwice | AnyScissorAndSkip | AnyScissorSkip
        )
    }

    pub fn is_leaf(self) -> bool {
        self != Total && !self.is_family() && !self.is_suffix_aggregate()
    }

    /// The prefix family a leaf belongs to, if any.
    pub fn family(self) -> Option<Category> {
        match self {
            AltIn | AltInScissorSkip | AltOut | AltOutScissorSkip => Some(AltFamily),
            OnehandIn | OnehandInScissor | OnehandInScissorTwice | OnehandOut
            | OnehandOutScissor | OnehandOutScissorTwice => Some(OnehandFamily),
            RollIn | RollInScissor | RollOut | RollOutScissor => Some(RollFamily),
            SfbAlt | SfbRollIn | SfbRollInScissor | SfbRollOut | SfbRollOutScissor => {
                Some(SfbFamily)
            }
            SfrAlt | SfrRollIn | SfrRollInScissor | SfrRollOut | SfrRollOutScissor => {
                Some(SfrFamily)
            }
            SfsAlt | SfsRedirect | SfsRedirectScissor | SfsRedirectScissorTwice => {
                Some(SfsFamily)
            }
            _ => None,
        }
    }

    /// The suffix aggregate whose tag a leaf ends with, if any.
    pub fn scissor_mark(self) -> Option<Category> {
        match self {
            OnehandInScissor | OnehandOutScissor | RedirectScissor | RollInScissor
            | RollOutScissor | SfbRollInScissor | SfbRollOutScissor | SfrRollInScissor
            | SfrRollOutScissor | SfsRedirectScissor => Some(AnyScissor),
            OnehandInScissorTwice | OnehandOutScissorTwice | SfsRedirectScissorTwice => {
                Some(AnyScissorTwice)
            }
            RedirectScissorAndSkip => Some(AnyScissorAndSkip),
            AltInScissorSkip | AltOutScissorSkip | RedirectScissorSkip => Some(AnyScissorSkip),
            _ => None,
        }
    }

    /// Whether the stats of `leaf` are counted towards `self`.
    pub fn contains(self, leaf: Category) -> bool {
        match self {
            Total => true,
            c if c.is_family() => leaf.family() == Some(c),
            c if c.is_suffix_aggregate() => leaf.scissor_mark() == Some(c),
            c => c == leaf,
        }
    }

    /// Leaves of `taxonomy` that sum into `self`.
    pub fn members(self, taxonomy: Taxonomy) -> impl Iterator<Item = Category> {
        taxonomy.leaves().filter(move |leaf| self.contains(*leaf))
    }

    /// Leaves whose tag extends this leaf's tag, such as the scissor
    /// variants of `redirect`. Empty for families and aggregates.
    pub fn subcategories(self, taxonomy: Taxonomy) -> impl Iterator<Item = Category> {
        let prefix = format!("{}.", self.tag());
        let own = self.is_leaf();
        taxonomy
            .leaves()
            .filter(move |leaf| own && leaf.tag().starts_with(&prefix))
    }

    /// Where to borrow a speed estimate from when this category has no
    /// data of its own. Walks from the most specific variant towards the
    /// grand total.
    pub fn fallback_parent(self) -> Option<Category> {
        match self {
            Total => None,

            OnehandInScissorTwice => Some(OnehandInScissor),
            OnehandOutScissorTwice => Some(OnehandOutScissor),
            SfsRedirectScissorTwice => Some(SfsRedirectScissor),

            OnehandInScissor => Some(OnehandIn),
            OnehandOutScissor => Some(OnehandOut),
            RollInScissor => Some(RollIn),
            RollOutScissor => Some(RollOut),
            SfbRollInScissor => Some(SfbRollIn),
            SfbRollOutScissor => Some(SfbRollOut),
            SfrRollInScissor => Some(SfrRollIn),
            SfrRollOutScissor => Some(SfrRollOut),
            SfsRedirectScissor => Some(SfsRedirect),
            RedirectScissorAndSkip => Some(RedirectScissor),
            RedirectScissor | RedirectScissorSkip => Some(Redirect),
            AltInScissorSkip => Some(AltIn),
            AltOutScissorSkip => Some(AltOut),

            // sfr strokes are the closest relatives of sfb strokes
            SfrFamily => Some(SfbFamily),
            Sfr => Some(Sfb),

            c if c.is_leaf() => c.family().or(Some(Total)),
            _ => Some(Total),
        }
    }
}
