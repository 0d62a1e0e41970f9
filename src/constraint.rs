use crate::error::{SfResult, StrokeForgeError};
use crate::geometry::Pos;
use crate::layout::Layout;
use crate::remap::Remap;
use fastrand::Rng;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Random draws made by `random_legal_swap` before it falls back to an
/// exhaustive scan.
pub const RANDOM_SWAP_ATTEMPTS: usize = 1000;

/// Per-position caps on relative key frequency. Positions without a cap
/// accept any key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintMap {
    pub name: String,
    caps: HashMap<Pos, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CapEntry {
    row: i32,
    col: i32,
    cap: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConstraintDefinition {
    name: String,
    #[serde(default)]
    caps: Vec<CapEntry>,
}

impl ConstraintMap {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            caps: HashMap::new(),
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> SfResult<Self> {
        let content = fs::read_to_string(path)?;
        let def: ConstraintDefinition = serde_json::from_str(&content)?;
        let mut map = Self::new(&def.name);
        for entry in def.caps {
            map.set_cap(Pos::new(entry.row, entry.col), entry.cap)?;
        }
        debug!("Loaded constraint map '{}' ({} caps)", map.name, map.caps.len());
        Ok(map)
    }

    pub fn set_cap(&mut self, pos: Pos, cap: f64) -> SfResult<()> {
        if !(0.0..=1.0).contains(&cap) {
            return Err(StrokeForgeError::Validation(format!(
                "Cap {} at {} is outside [0, 1]",
                cap, pos
            )));
        }
        self.caps.insert(pos, cap);
        Ok(())
    }

    pub fn with_cap(mut self, pos: Pos, cap: f64) -> SfResult<Self> {
        self.set_cap(pos, cap)?;
        Ok(self)
    }

    pub fn cap(&self, pos: Pos) -> f64 {
        self.caps.get(&pos).copied().unwrap_or(1.0)
    }

    fn allows(&self, key_freqs: &HashMap<char, f64>, key: char, pos: Pos) -> bool {
        key_freqs.get(&key).copied().unwrap_or(0.0) <= self.cap(pos)
    }

    pub fn is_layout_legal(&self, layout: &Layout, key_freqs: &HashMap<char, f64>) -> bool {
        layout.keys().all(|key| match layout.pos_of(key) {
            Some(pos) => self.allows(key_freqs, key, pos),
            None => true,
        })
    }

    /// Whether every key moved by `remap` fits under the cap of the
    /// position it moves to.
    pub fn is_remap_legal(
        &self,
        layout: &Layout,
        key_freqs: &HashMap<char, f64>,
        remap: &Remap,
    ) -> bool {
        remap.iter().all(|(key, target)| match layout.pos_of(target) {
            Some(pos) => self.allows(key_freqs, key, pos),
            None => false,
        })
    }

    /// Like [`ConstraintMap::is_remap_legal`], but names the first
    /// offending key.
    pub fn check_remap(
        &self,
        layout: &Layout,
        key_freqs: &HashMap<char, f64>,
        remap: &Remap,
    ) -> SfResult<()> {
        for (key, target) in remap.iter() {
            let pos = layout
                .pos_of(target)
                .ok_or(StrokeForgeError::MissingKey(target))?;
            if !self.allows(key_freqs, key, pos) {
                return Err(StrokeForgeError::IllegalRemap {
                    key,
                    pos,
                    freq: key_freqs.get(&key).copied().unwrap_or(0.0),
                    cap: self.cap(pos),
                });
            }
        }
        Ok(())
    }

    fn swap_is_legal(
        &self,
        layout: &Layout,
        key_freqs: &HashMap<char, f64>,
        a: char,
        b: char,
    ) -> bool {
        match (layout.pos_of(a), layout.pos_of(b)) {
            (Some(pa), Some(pb)) => {
                self.allows(key_freqs, a, pb) && self.allows(key_freqs, b, pa)
            }
            _ => false,
        }
    }

    /// A random swap of two unpinned keys that is legal in both
    /// directions. After a bounded number of random draws every pair is
    /// tried in shuffled order, so a legal swap is found whenever one
    /// exists.
    pub fn random_legal_swap(
        &self,
        layout: &Layout,
        key_freqs: &HashMap<char, f64>,
        pins: &[char],
        rng: &mut Rng,
    ) -> SfResult<Remap> {
        let mut free: Vec<char> = layout.keys().filter(|k| !pins.contains(k)).collect();
        if free.len() < 2 {
            return Err(StrokeForgeError::NoLegalMove { attempts: 0 });
        }

        for _ in 0..RANDOM_SWAP_ATTEMPTS {
            let i = rng.usize(..free.len());
            let mut j = rng.usize(..free.len() - 1);
            if j >= i {
                j += 1;
            }
            if self.swap_is_legal(layout, key_freqs, free[i], free[j]) {
                return Ok(Remap::swap(free[i], free[j]));
            }
        }

        rng.shuffle(&mut free);
        let mut attempts = RANDOM_SWAP_ATTEMPTS;
        for (a, b) in free.iter().tuple_combinations() {
            attempts += 1;
            if self.swap_is_legal(layout, key_freqs, *a, *b) {
                return Ok(Remap::swap(*a, *b));
            }
        }
        Err(StrokeForgeError::NoLegalMove { attempts })
    }
}
