use crate::geometry::Pos;
use crate::layout::Layout;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::ops::{Add, Neg};

/// A relabeling of keys. `remap[k] = v` moves key `k` to the position
/// `v` held before the remap was applied. Keys not in the map stay put.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Remap(BTreeMap<char, char>);

impl Remap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity pairs are dropped.
    pub fn from_pairs<I: IntoIterator<Item = (char, char)>>(pairs: I) -> Self {
        Self(pairs.into_iter().filter(|(k, v)| k != v).collect())
    }

    /// Each key moves to the position of the key before it; the first key
    /// wraps around to the last key's position.
    pub fn cycle(keys: &[char]) -> Self {
        if keys.len() < 2 {
            return Self::new();
        }
        let n = keys.len();
        Self::from_pairs((0..n).map(|i| (keys[i], keys[(i + n - 1) % n])))
    }

    pub fn swap(a: char, b: char) -> Self {
        Self::cycle(&[a, b])
    }

    /// Swaps `first[i]` with `second[i]` for every i.
    pub fn set_swap(first: &[char], second: &[char]) -> Self {
        Self::from_pairs(
            first
                .iter()
                .zip(second.iter())
                .flat_map(|(a, b)| [(*a, *b), (*b, *a)]),
        )
    }

    /// Swaps every key of row `r1` with the key in the same column of row
    /// `r2`. Pinned keys and keys without a counterpart stay put.
    pub fn row_swap(layout: &Layout, r1: i32, r2: i32, pins: &[char]) -> Self {
        Self::structural_swap(layout, pins, |pos| {
            (pos.row == r1).then(|| Pos::new(r2, pos.col))
        })
    }

    /// Column counterpart of [`Remap::row_swap`].
    pub fn col_swap(layout: &Layout, c1: i32, c2: i32, pins: &[char]) -> Self {
        Self::structural_swap(layout, pins, |pos| {
            (pos.col == c1).then(|| Pos::new(pos.row, c2))
        })
    }

    fn structural_swap<F>(layout: &Layout, pins: &[char], counterpart: F) -> Self
    where
        F: Fn(Pos) -> Option<Pos>,
    {
        let mut map = BTreeMap::new();
        for node in &layout.geometry().keys {
            let Some(other_pos) = counterpart(node.pos()) else {
                continue;
            };
            let (Some(a), Some(b)) = (layout.key_at(node.pos()), layout.key_at(other_pos)) else {
                continue;
            };
            if a == b || pins.contains(&a) || pins.contains(&b) {
                continue;
            }
            map.insert(a, b);
            map.insert(b, a);
        }
        Self(map)
    }

    /// The remap that turns `from` into `to` over the keys they share.
    ///
    /// A chain of moves that ends on a key `to` does not have is closed by
    /// sending that key to the chain's vacated start. Chains that end on a
    /// slot empty in `from` cannot be expressed as a permutation and are
    /// dropped.
    pub fn diff(from: &Layout, to: &Layout) -> Self {
        let mut raw = BTreeMap::new();
        for key in from.keys() {
            let Some(target) = to.pos_of(key) else {
                continue;
            };
            if let Some(occupant) = from.key_at(target) {
                if occupant != key {
                    raw.insert(key, occupant);
                }
            }
        }

        // every position has one occupant, so each key is entered from at
        // most one other key
        let entered: HashSet<char> = raw.values().copied().collect();
        let mut kept = BTreeMap::new();
        let mut visited = HashSet::new();

        for &head in raw.keys().filter(|k| !entered.contains(*k)) {
            let mut chain = vec![head];
            let mut current = head;
            while let Some(&next) = raw.get(&current) {
                chain.push(next);
                current = next;
            }
            visited.extend(chain.iter().copied());
            if to.contains(current) {
                continue;
            }
            for pair in chain.windows(2) {
                kept.insert(pair[0], pair[1]);
            }
            kept.insert(current, head);
        }

        for &start in raw.keys() {
            if visited.contains(&start) {
                continue;
            }
            let mut current = start;
            while visited.insert(current) {
                let Some(&next) = raw.get(&current) else {
                    break;
                };
                kept.insert(current, next);
                current = next;
            }
        }
        Self(kept)
    }

    pub fn get(&self, key: char) -> char {
        self.0.get(&key).copied().unwrap_or(key)
    }

    pub fn translate<const N: usize>(&self, ngram: [char; N]) -> [char; N] {
        ngram.map(|k| self.get(k))
    }

    pub fn touches(&self, key: char) -> bool {
        self.0.contains_key(&key)
    }

    /// Keys that move.
    pub fn keys(&self) -> impl Iterator<Item = char> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, char)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Domain and range are the same set, and no two keys share a target.
    pub fn is_permutation(&self) -> bool {
        let domain: BTreeSet<char> = self.0.keys().copied().collect();
        let range: BTreeSet<char> = self.0.values().copied().collect();
        range.len() == self.0.len() && domain == range
    }

    /// Disjoint cycles, each listed so that `Remap::cycle` rebuilds it and
    /// starting from its smallest key.
    pub fn cycles(&self) -> Vec<Vec<char>> {
        let mut visited = HashSet::new();
        let mut cycles = Vec::new();
        for &start in self.0.keys() {
            if visited.contains(&start) {
                continue;
            }
            let mut chain = Vec::new();
            let mut current = start;
            while visited.insert(current) {
                chain.push(current);
                match self.0.get(&current) {
                    Some(&next) => current = next,
                    None => break,
                }
            }
            chain.reverse();
            if let Some(min_at) = chain.iter().enumerate().min_by_key(|(_, k)| **k).map(|(i, _)| i) {
                chain.rotate_left(min_at);
            }
            cycles.push(chain);
        }
        cycles
    }
}

impl Add<&Remap> for &Remap {
    type Output = Remap;

    /// `a + b` translates through `a`, then through `b`.
    fn add(self, rhs: &Remap) -> Remap {
        let keys: BTreeSet<char> = self.0.keys().chain(rhs.0.keys()).copied().collect();
        Remap::from_pairs(keys.into_iter().map(|k| (k, rhs.get(self.get(k)))))
    }
}

impl Add for Remap {
    type Output = Remap;

    fn add(self, rhs: Remap) -> Remap {
        &self + &rhs
    }
}

impl Neg for &Remap {
    type Output = Remap;

    fn neg(self) -> Remap {
        Remap(self.0.iter().map(|(k, v)| (*v, *k)).collect())
    }
}

impl Neg for Remap {
    type Output = Remap;

    fn neg(self) -> Remap {
        -&self
    }
}

impl fmt::Display for Remap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "no change");
        }
        let cycles = self.cycles();
        let (swaps, longer): (Vec<_>, Vec<_>) = cycles.iter().partition(|c| c.len() == 2);

        let mut parts = Vec::new();
        if !swaps.is_empty() {
            let left: Vec<String> = swaps.iter().map(|c| c[0].to_string()).collect();
            let right: Vec<String> = swaps.iter().map(|c| c[1].to_string()).collect();
            parts.push(format!("{} <-> {}", left.join(" "), right.join(" ")));
        }
        for cycle in longer {
            let keys: Vec<String> = cycle.iter().map(|k| k.to_string()).collect();
            parts.push(format!("{} cycle", keys.join(" ")));
        }
        write!(f, "{}", parts.join(", "))
    }
}
