use crate::error::SfResult;
use crate::geometry::KeyboardGeometry;
use crate::layout::Layout;
use std::sync::Arc;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, EnumIter, EnumString, Display, PartialEq, Eq, Hash)]
#[strum(serialize_all = "snake_case")]
pub enum KnownLayout {
    Qwerty,
    Dvorak,
    Colemak,
    #[strum(serialize = "colemak_dh")]
    ColemakDH,
    Workman,
    Canary,
}

impl KnownLayout {
    // Top row, home row, bottom row on the standard 30-key board.
    pub fn key_string(&self) -> &'static str {
        match self {
            Self::Qwerty => "qwertyuiopasdfghjkl;zxcvbnm,./",
            Self::Dvorak => "',.pyfgcrlaoeuidhtns;qjkxbmwvz",
            Self::Colemak => "qwfpgjluy;arstdhneiozxcvbkm,./",
            Self::ColemakDH => "qwfpbjluy;arstgmneiozxcdvkh,./",
            Self::Workman => "qdrwbjfup;ashtgyneoizxmcvkl,./",
            Self::Canary => "wlypbzfou'crstgmneiaqjvdkxh/,.",
        }
    }

    pub fn layout_on(&self, geometry: Arc<KeyboardGeometry>) -> SfResult<Layout> {
        Layout::from_keys(&self.to_string(), geometry, self.key_string())
    }

    pub fn layout(&self) -> SfResult<Layout> {
        self.layout_on(Arc::new(KeyboardGeometry::standard()))
    }
}

/// Every preset on one shared standard board.
pub fn all_layouts() -> SfResult<Vec<Layout>> {
    let geometry = Arc::new(KeyboardGeometry::standard());
    KnownLayout::iter()
        .map(|known| known.layout_on(geometry.clone()))
        .collect()
}
