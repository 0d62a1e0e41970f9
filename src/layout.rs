use crate::error::{SfResult, StrokeForgeError};
use crate::geometry::{Coord, Finger, KeyboardGeometry, Pos};
use crate::remap::Remap;
use crate::scorer::stroke::{Bistroke, Nstroke, Tristroke};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Memoized n-gram to stroke conversions for one layout.
#[derive(Debug, Clone, Default)]
pub struct StrokeCache {
    bistrokes: HashMap<[char; 2], Bistroke>,
    tristrokes: HashMap<[char; 3], Tristroke>,
}

impl StrokeCache {
    pub fn len(&self) -> usize {
        self.bistrokes.len() + self.tristrokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.bistrokes.clear();
        self.tristrokes.clear();
    }
}

/// A bijection between keys and board positions.
#[derive(Debug, Clone)]
pub struct Layout {
    pub name: String,
    geometry: Arc<KeyboardGeometry>,
    keys: Vec<Option<char>>,
    slots: HashMap<char, usize>,
    cache: StrokeCache,
}

impl Layout {
    pub fn new<I>(name: &str, geometry: Arc<KeyboardGeometry>, assignments: I) -> SfResult<Self>
    where
        I: IntoIterator<Item = (char, Pos)>,
    {
        let mut keys = vec![None; geometry.len()];
        let mut slots = HashMap::new();

        for (key, pos) in assignments {
            let slot = geometry.slot_at(pos).ok_or_else(|| {
                StrokeForgeError::Validation(format!(
                    "Layout '{}' places '{}' at {}, which is not on board '{}'",
                    name, key, pos, geometry.name
                ))
            })?;
            if keys[slot].is_some() {
                return Err(StrokeForgeError::Validation(format!(
                    "Layout '{}' places two keys at {}",
                    name, pos
                )));
            }
            if slots.insert(key, slot).is_some() {
                return Err(StrokeForgeError::Validation(format!(
                    "Layout '{}' places '{}' twice",
                    name, key
                )));
            }
            keys[slot] = Some(key);
        }

        Ok(Self {
            name: name.to_string(),
            geometry,
            keys,
            slots,
            cache: StrokeCache::default(),
        })
    }

    /// Keys listed in board slot order. Spaces leave a slot empty.
    pub fn from_keys(name: &str, geometry: Arc<KeyboardGeometry>, keys: &str) -> SfResult<Self> {
        let count = keys.chars().count();
        if count > geometry.len() {
            return Err(StrokeForgeError::Validation(format!(
                "Layout '{}' has {} keys but board '{}' has {} positions",
                name,
                count,
                geometry.name,
                geometry.len()
            )));
        }
        let assignments: Vec<(char, Pos)> = keys
            .chars()
            .zip(geometry.keys.iter())
            .filter(|(c, _)| *c != ' ')
            .map(|(c, node)| (c, node.pos()))
            .collect();
        Self::new(name, geometry, assignments)
    }

    pub fn geometry(&self) -> &KeyboardGeometry {
        &self.geometry
    }

    pub fn shared_geometry(&self) -> Arc<KeyboardGeometry> {
        self.geometry.clone()
    }

    /// A copy under a new name. The stroke cache comes along.
    pub fn renamed(&self, name: &str) -> Self {
        let mut copy = self.clone();
        copy.name = name.to_string();
        copy
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Keys in board slot order.
    pub fn keys(&self) -> impl Iterator<Item = char> + '_ {
        self.keys.iter().flatten().copied()
    }

    pub fn contains(&self, key: char) -> bool {
        self.slots.contains_key(&key)
    }

    pub fn slot_of(&self, key: char) -> Option<usize> {
        self.slots.get(&key).copied()
    }

    pub fn key_at_slot(&self, slot: usize) -> Option<char> {
        self.keys.get(slot).copied().flatten()
    }

    pub fn key_at(&self, pos: Pos) -> Option<char> {
        self.geometry
            .slot_at(pos)
            .and_then(|slot| self.key_at_slot(slot))
    }

    pub fn pos_of(&self, key: char) -> Option<Pos> {
        self.slot_of(key).map(|s| self.geometry.keys[s].pos())
    }

    pub fn finger_of(&self, key: char) -> Option<Finger> {
        self.slot_of(key).map(|s| self.geometry.keys[s].finger)
    }

    pub fn coord_of(&self, key: char) -> Option<Coord> {
        self.slot_of(key).map(|s| self.geometry.keys[s].coord())
    }

    /// Builds a stroke from the board data. Fails with `MissingKey` when a
    /// key is not on this layout; scoring passes skip such n-grams.
    pub fn to_nstroke<const N: usize>(&self, ngram: [char; N]) -> SfResult<Nstroke<N>> {
        let mut fingers = [Finger::Unknown; N];
        let mut coords = [Coord::default(); N];
        for (i, key) in ngram.iter().enumerate() {
            let slot = self
                .slot_of(*key)
                .ok_or(StrokeForgeError::MissingKey(*key))?;
            let node = &self.geometry.keys[slot];
            fingers[i] = node.finger;
            coords[i] = node.coord();
        }
        Ok(Nstroke::new(fingers, coords))
    }

    pub fn tristroke(&self, ngram: [char; 3]) -> SfResult<Tristroke> {
        match self.cache.tristrokes.get(&ngram) {
            Some(stroke) => Ok(*stroke),
            None => self.to_nstroke(ngram),
        }
    }

    pub fn bistroke(&self, ngram: [char; 2]) -> SfResult<Bistroke> {
        match self.cache.bistrokes.get(&ngram) {
            Some(stroke) => Ok(*stroke),
            None => self.to_nstroke(ngram),
        }
    }

    /// Converts and caches every n-gram whose keys are all on the layout.
    pub fn warm_cache<'a, T, B>(&mut self, trigrams: T, bigrams: B)
    where
        T: IntoIterator<Item = &'a [char; 3]>,
        B: IntoIterator<Item = &'a [char; 2]>,
    {
        for ngram in trigrams {
            if let Ok(stroke) = self.to_nstroke(*ngram) {
                self.cache.tristrokes.insert(*ngram, stroke);
            }
        }
        for ngram in bigrams {
            if let Ok(stroke) = self.to_nstroke(*ngram) {
                self.cache.bistrokes.insert(*ngram, stroke);
            }
        }
        debug!("Layout '{}' caches {} strokes", self.name, self.cache.len());
    }

    pub fn cache(&self) -> &StrokeCache {
        &self.cache
    }

    /// A remap may only permute keys that are already on this layout.
    pub fn check_remap(&self, remap: &Remap) -> SfResult<()> {
        for (from, to) in remap.iter() {
            for key in [from, to] {
                if !self.contains(key) {
                    return Err(StrokeForgeError::InvalidRemap(format!(
                        "'{}' is not on layout '{}'",
                        key, self.name
                    )));
                }
            }
        }
        if !remap.is_permutation() {
            return Err(StrokeForgeError::InvalidRemap(format!(
                "{} does not permute its own keys",
                remap
            )));
        }
        Ok(())
    }

    /// Moves every remapped key to the former position of its target.
    /// Invalid remaps are rejected before anything changes.
    pub fn apply_remap(&mut self, remap: &Remap) -> SfResult<()> {
        self.check_remap(remap)?;
        if remap.is_empty() {
            return Ok(());
        }

        let moves: Vec<(char, usize)> = remap
            .iter()
            .filter_map(|(from, to)| self.slot_of(to).map(|slot| (from, slot)))
            .collect();
        for (key, slot) in moves {
            self.slots.insert(key, slot);
            self.keys[slot] = Some(key);
        }

        let geometry = self.geometry.clone();
        let slots = &self.slots;
        let restroke = |key: &char| {
            slots
                .get(key)
                .map(|slot| (geometry.keys[*slot].finger, geometry.keys[*slot].coord()))
        };
        for (ngram, stroke) in self.cache.tristrokes.iter_mut() {
            if ngram.iter().any(|k| remap.touches(*k)) {
                for (i, key) in ngram.iter().enumerate() {
                    if let Some((finger, coord)) = restroke(key) {
                        stroke.fingers[i] = finger;
                        stroke.coords[i] = coord;
                    }
                }
            }
        }
        for (ngram, stroke) in self.cache.bistrokes.iter_mut() {
            if ngram.iter().any(|k| remap.touches(*k)) {
                for (i, key) in ngram.iter().enumerate() {
                    if let Some((finger, coord)) = restroke(key) {
                        stroke.fingers[i] = finger;
                        stroke.coords[i] = coord;
                    }
                }
            }
        }
        Ok(())
    }

    /// Every n-gram over this layout's keys containing at least one of
    /// `keys`, in slot order.
    pub fn ngrams_touching<const N: usize>(&self, keys: &[char]) -> Vec<[char; N]> {
        let all: Vec<char> = self.keys().collect();
        (0..N)
            .map(|_| all.iter().copied())
            .multi_cartesian_product()
            .filter(|ngram| ngram.iter().any(|k| keys.contains(k)))
            .filter_map(|ngram| <[char; N]>::try_from(ngram).ok())
            .collect()
    }

    /// Keys in slot order, with a space for every empty slot.
    pub fn to_key_string(&self) -> String {
        self.keys.iter().map(|k| k.unwrap_or(' ')).collect()
    }

    /// One string per board row, columns padded with spaces.
    pub fn rows(&self) -> Vec<String> {
        let cols = self.geometry.cols();
        self.geometry
            .rows()
            .into_iter()
            .map(|row| {
                cols.iter()
                    .map(|col| self.key_at(Pos::new(row, *col)).unwrap_or(' '))
                    .collect()
            })
            .collect()
    }
}

impl PartialEq for Layout {
    fn eq(&self, other: &Self) -> bool {
        self.geometry == other.geometry && self.keys == other.keys
    }
}

/// On-disk layout definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutDefinition {
    pub name: String,
    /// Keys in board slot order; spaces leave a slot empty.
    pub keys: String,
    #[serde(default)]
    pub geometry: Option<KeyboardGeometry>,
}

impl LayoutDefinition {
    pub fn into_layout(self) -> SfResult<Layout> {
        let geometry = match self.geometry {
            Some(g) => {
                g.validate()?;
                g
            }
            None => KeyboardGeometry::standard(),
        };
        Layout::from_keys(&self.name, Arc::new(geometry), &self.keys)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> SfResult<Layout> {
        let content = fs::read_to_string(path)?;
        let def: LayoutDefinition = serde_json::from_str(&content)?;
        def.into_layout()
    }
}
