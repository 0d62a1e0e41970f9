use crate::layout::Layout;
use crate::remap::Remap;
use fastrand::Rng;
use itertools::Itertools;

/// Every swap of two unpinned keys, in slot order.
pub fn swap_candidates(layout: &Layout, pins: &[char]) -> Vec<Remap> {
    let free: Vec<char> = layout.keys().filter(|k| !pins.contains(k)).collect();
    free.iter()
        .tuple_combinations()
        .map(|(a, b)| Remap::swap(*a, *b))
        .collect()
}

/// Every row swap followed by every column swap. Swaps that would move
/// nothing are left out.
pub fn structural_candidates(layout: &Layout, pins: &[char]) -> Vec<Remap> {
    let geom = layout.geometry();
    let rows = geom
        .rows()
        .into_iter()
        .tuple_combinations()
        .map(|(r1, r2)| Remap::row_swap(layout, r1, r2, pins));
    let cols = geom
        .cols()
        .into_iter()
        .tuple_combinations()
        .map(|(c1, c2)| Remap::col_swap(layout, c1, c2, pins));
    rows.chain(cols).filter(|r| !r.is_empty()).collect()
}

fn random_pair(values: &[i32], rng: &mut Rng) -> Option<(i32, i32)> {
    if values.len() < 2 {
        return None;
    }
    let i = rng.usize(..values.len());
    let mut j = rng.usize(..values.len() - 1);
    if j >= i {
        j += 1;
    }
    Some((values[i], values[j]))
}

pub fn random_row_swap(layout: &Layout, pins: &[char], rng: &mut Rng) -> Option<Remap> {
    let (r1, r2) = random_pair(&layout.geometry().rows(), rng)?;
    Some(Remap::row_swap(layout, r1, r2, pins)).filter(|r| !r.is_empty())
}

pub fn random_col_swap(layout: &Layout, pins: &[char], rng: &mut Rng) -> Option<Remap> {
    let (c1, c2) = random_pair(&layout.geometry().cols(), rng)?;
    Some(Remap::col_swap(layout, c1, c2, pins)).filter(|r| !r.is_empty())
}
