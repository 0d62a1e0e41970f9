use crate::error::{SfResult, StrokeForgeError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// The ten fingers plus a catch-all. Left hand fingers have negative
/// ordinals, right hand positive, and the magnitude counts from the thumb
/// (1) out to the pinky (5).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    Display,
    IntoStaticStr,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Finger {
    LP,
    LR,
    LM,
    LI,
    LT,
    RT,
    RI,
    RM,
    RR,
    RP,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Hand {
    Left,
    Right,
}

impl Finger {
    pub fn ordinal(self) -> i8 {
        match self {
            Finger::LP => -5,
            Finger::LR => -4,
            Finger::LM => -3,
            Finger::LI => -2,
            Finger::LT => -1,
            Finger::Unknown => 0,
            Finger::RT => 1,
            Finger::RI => 2,
            Finger::RM => 3,
            Finger::RR => 4,
            Finger::RP => 5,
        }
    }

    /// Distance from the thumb: 1 for thumbs, 5 for pinkies, 0 if unknown.
    pub fn reach(self) -> i8 {
        self.ordinal().abs()
    }

    pub fn hand(self) -> Option<Hand> {
        match self.ordinal() {
            0 => None,
            o if o < 0 => Some(Hand::Left),
            _ => Some(Hand::Right),
        }
    }

    /// Hand grouping used when comparing stroke shapes. Unknown sits with
    /// the left hand.
    pub fn is_right(self) -> bool {
        self.ordinal() > 0
    }

    pub fn is_thumb(self) -> bool {
        self.reach() == 1
    }

    pub fn is_known(self) -> bool {
        self != Finger::Unknown
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub row: i32,
    pub col: i32,
}

impl Pos {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Physical location in key units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

/// Resolution used when coordinates are compared or hashed.
pub const COORD_SCALE: f64 = 1000.0;

pub fn quantize(v: f64) -> i64 {
    (v * COORD_SCALE).round() as i64
}

impl Coord {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dist_sq(&self, other: &Coord) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn quantized(&self) -> (i64, i64) {
        (quantize(self.x), quantize(self.y))
    }

    pub fn same_spot(&self, other: &Coord) -> bool {
        self.quantized() == other.quantized()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyNode {
    pub row: i32, // 0=Top, 1=Home, 2=Bottom on the standard board
    pub col: i32,
    pub finger: Finger,
    pub x: f64,
    pub y: f64,
}

impl KeyNode {
    pub fn pos(&self) -> Pos {
        Pos::new(self.row, self.col)
    }

    pub fn coord(&self) -> Coord {
        Coord::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyboardGeometry {
    #[serde(default = "default_board_name")]
    pub name: String,
    pub keys: Vec<KeyNode>,
}

fn default_board_name() -> String {
    "custom".to_string()
}

impl KeyboardGeometry {
    pub fn new(name: &str, keys: Vec<KeyNode>) -> SfResult<Self> {
        let geom = Self {
            name: name.to_string(),
            keys,
        };
        geom.validate()?;
        Ok(geom)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> SfResult<Self> {
        let content = fs::read_to_string(path)?;
        let geom: KeyboardGeometry = serde_json::from_str(&content)?;
        geom.validate()?;
        Ok(geom)
    }

    /// Each position may appear only once.
    pub fn validate(&self) -> SfResult<()> {
        let mut seen = HashSet::new();
        for node in &self.keys {
            if !seen.insert(node.pos()) {
                return Err(StrokeForgeError::Validation(format!(
                    "Board '{}' defines position {} twice",
                    self.name,
                    node.pos()
                )));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn slot_at(&self, pos: Pos) -> Option<usize> {
        self.keys.iter().position(|k| k.pos() == pos)
    }

    pub fn rows(&self) -> Vec<i32> {
        let mut rows: Vec<i32> = self.keys.iter().map(|k| k.row).collect();
        rows.sort_unstable();
        rows.dedup();
        rows
    }

    pub fn cols(&self) -> Vec<i32> {
        let mut cols: Vec<i32> = self.keys.iter().map(|k| k.col).collect();
        cols.sort_unstable();
        cols.dedup();
        cols
    }

    /// Standard 30-key row-staggered board with traditional fingering.
    pub fn standard() -> Self {
        const STAGGER: [f64; 3] = [0.0, 0.25, 0.75];
        const FINGERS: [Finger; 10] = [
            Finger::LP,
            Finger::LR,
            Finger::LM,
            Finger::LI,
            Finger::LI,
            Finger::RI,
            Finger::RI,
            Finger::RM,
            Finger::RR,
            Finger::RP,
        ];

        let mut keys = Vec::with_capacity(30);
        for (row, offset) in STAGGER.iter().enumerate() {
            for (col, finger) in FINGERS.iter().enumerate() {
                keys.push(KeyNode {
                    row: row as i32,
                    col: col as i32,
                    finger: *finger,
                    x: col as f64 + offset,
                    y: row as f64,
                });
            }
        }

        KeyboardGeometry {
            name: "standard".to_string(),
            keys,
        }
    }
}
