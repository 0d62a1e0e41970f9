use crate::geometry::{Coord, Finger};
use crate::scorer::category::Category;
use crate::scorer::stroke::Bistroke;
use std::cmp::Ordering;

/// Relationship between two consecutive (or skipped) presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bifinger {
    Unknown,
    Alt,
    /// Same finger, same key.
    Sfr,
    /// Same finger, different key.
    Sfb,
    /// Towards the thumb.
    RollIn,
    /// Away from the thumb.
    RollOut,
}

impl Bifinger {
    pub fn is_same_finger(self) -> bool {
        matches!(self, Bifinger::Sfr | Bifinger::Sfb)
    }

    pub fn is_roll(self) -> bool {
        matches!(self, Bifinger::RollIn | Bifinger::RollOut)
    }
}

pub fn analyze_bifinger(f0: Finger, c0: &Coord, f1: Finger, c1: &Coord) -> Bifinger {
    if !f0.is_known() || !f1.is_known() {
        return Bifinger::Unknown;
    }
    if f0.hand() != f1.hand() {
        return Bifinger::Alt;
    }

    // same hand, so equal reach means the same finger
    match f1.reach().cmp(&f0.reach()) {
        Ordering::Equal if c0.same_spot(c1) => Bifinger::Sfr,
        Ordering::Equal => Bifinger::Sfb,
        Ordering::Greater => Bifinger::RollOut,
        Ordering::Less => Bifinger::RollIn,
    }
}

/// Neighbouring fingers of one hand reaching keys at least 2.0 units apart.
/// Thumbs never scissor.
pub fn is_scissor(f0: Finger, c0: &Coord, f1: Finger, c1: &Coord) -> bool {
    if !f0.is_known() || !f1.is_known() || f0.hand() != f1.hand() {
        return false;
    }
    if f0.is_thumb() || f1.is_thumb() {
        return false;
    }
    if (f0.reach() - f1.reach()).abs() != 1 {
        return false;
    }
    c0.dist_sq(c1) >= 4.0
}

pub fn bistroke_category(stroke: &Bistroke) -> Category {
    let [f0, f1] = stroke.fingers;
    let [c0, c1] = &stroke.coords;
    let scissor = is_scissor(f0, c0, f1, c1);
    match analyze_bifinger(f0, c0, f1, c1) {
        Bifinger::Unknown => Category::Unknown,
        Bifinger::Alt => Category::Alt,
        Bifinger::Sfr => Category::Sfr,
        Bifinger::Sfb => Category::Sfb,
        Bifinger::RollIn if scissor => Category::RollInScissor,
        Bifinger::RollIn => Category::RollIn,
        Bifinger::RollOut if scissor => Category::RollOutScissor,
        Bifinger::RollOut => Category::RollOut,
    }
}
