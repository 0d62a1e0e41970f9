use crate::scorer::category::Category;
use crate::scorer::physics::{analyze_bifinger, bistroke_category, is_scissor, Bifinger};
use crate::scorer::stroke::{Bistroke, StrokeShape, Tristroke};
use std::collections::HashMap;
use std::sync::RwLock;

fn pair(t: &Tristroke, i: usize, j: usize) -> Bifinger {
    analyze_bifinger(t.fingers[i], &t.coords[i], t.fingers[j], &t.coords[j])
}

fn scissor(t: &Tristroke, i: usize, j: usize) -> bool {
    is_scissor(t.fingers[i], &t.coords[i], t.fingers[j], &t.coords[j])
}

/// Classifies a tristroke from its three pairwise relationships:
/// first (0,1), skip (0,2) and second (1,2).
pub fn tristroke_category(t: &Tristroke) -> Category {
    if t.has_unknown() {
        return Category::Unknown;
    }

    let first = pair(t, 0, 1);
    let skip = pair(t, 0, 2);
    let second = pair(t, 1, 2);

    let scissor_first = scissor(t, 0, 1);
    let scissor_second = scissor(t, 1, 2);
    let scissor_skip = scissor(t, 0, 2);
    let roll_scissors = scissor_first as u8 + scissor_second as u8;

    if skip.is_same_finger() {
        if first.is_same_finger() {
            return Category::Sft;
        }
        if first.is_roll() {
            return match roll_scissors {
                0 => Category::SfsRedirect,
                1 => Category::SfsRedirectScissor,
                _ => Category::SfsRedirectScissorTwice,
            };
        }
        // the skipped pair shares a finger, so it can never scissor
        return Category::SfsAlt;
    }

    if first.is_same_finger() {
        return same_finger_chain(first, second, scissor_second);
    }
    if second.is_same_finger() {
        return same_finger_chain(second, first, scissor_first);
    }

    if first == Bifinger::Alt && second == Bifinger::Alt {
        let inward = skip == Bifinger::RollIn;
        return match (inward, scissor_skip) {
            (true, true) => Category::AltInScissorSkip,
            (true, false) => Category::AltIn,
            (false, true) => Category::AltOutScissorSkip,
            (false, false) => Category::AltOut,
        };
    }

    if first.is_roll() && second.is_roll() {
        if first == second {
            let inward = first == Bifinger::RollIn;
            return match (inward, roll_scissors) {
                (true, 0) => Category::OnehandIn,
                (true, 1) => Category::OnehandInScissor,
                (true, _) => Category::OnehandInScissorTwice,
                (false, 0) => Category::OnehandOut,
                (false, 1) => Category::OnehandOutScissor,
                (false, _) => Category::OnehandOutScissorTwice,
            };
        }
        return match (roll_scissors > 0, scissor_skip) {
            (true, true) => Category::RedirectScissorAndSkip,
            (true, false) => Category::RedirectScissor,
            (false, true) => Category::RedirectScissorSkip,
            (false, false) => Category::Redirect,
        };
    }

    if first.is_roll() {
        roll(first, scissor_first)
    } else {
        roll(second, scissor_second)
    }
}

fn roll(direction: Bifinger, scissor: bool) -> Category {
    match (direction == Bifinger::RollIn, scissor) {
        (true, true) => Category::RollInScissor,
        (true, false) => Category::RollIn,
        (false, true) => Category::RollOutScissor,
        (false, false) => Category::RollOut,
    }
}

/// `same` is the same-finger pair, `other` the remaining adjacent pair.
fn same_finger_chain(same: Bifinger, other: Bifinger, scissor: bool) -> Category {
    let repeat = same == Bifinger::Sfr;
    match (repeat, other, scissor) {
        (false, Bifinger::RollIn, true) => Category::SfbRollInScissor,
        (false, Bifinger::RollIn, false) => Category::SfbRollIn,
        (false, Bifinger::RollOut, true) => Category::SfbRollOutScissor,
        (false, Bifinger::RollOut, false) => Category::SfbRollOut,
        (false, _, _) => Category::SfbAlt,
        (true, Bifinger::RollIn, true) => Category::SfrRollInScissor,
        (true, Bifinger::RollIn, false) => Category::SfrRollIn,
        (true, Bifinger::RollOut, true) => Category::SfrRollOutScissor,
        (true, Bifinger::RollOut, false) => Category::SfrRollOut,
        (true, _, _) => Category::SfrAlt,
    }
}

/// Memoizing front end for the classification functions. Results are
/// keyed by stroke shape, since per-hand translation never changes a
/// category.
#[derive(Debug, Default)]
pub struct StrokeClassifier {
    tristrokes: RwLock<HashMap<StrokeShape<3>, Category>>,
    bistrokes: RwLock<HashMap<StrokeShape<2>, Category>>,
}

impl StrokeClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tristroke(&self, stroke: &Tristroke) -> Category {
        let shape = stroke.shape();
        if let Some(cat) = self
            .tristrokes
            .read()
            .ok()
            .and_then(|map| map.get(&shape).copied())
        {
            return cat;
        }
        let cat = tristroke_category(stroke);
        if let Ok(mut map) = self.tristrokes.write() {
            map.insert(shape, cat);
        }
        cat
    }

    pub fn bistroke(&self, stroke: &Bistroke) -> Category {
        let shape = stroke.shape();
        if let Some(cat) = self
            .bistrokes
            .read()
            .ok()
            .and_then(|map| map.get(&shape).copied())
        {
            return cat;
        }
        let cat = bistroke_category(stroke);
        if let Ok(mut map) = self.bistrokes.write() {
            map.insert(shape, cat);
        }
        cat
    }

    pub fn cached(&self) -> usize {
        let tri = self.tristrokes.read().map(|m| m.len()).unwrap_or(0);
        let bi = self.bistrokes.read().map(|m| m.len()).unwrap_or(0);
        tri + bi
    }
}
