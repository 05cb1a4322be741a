//! Class data for character creation.
//!
//! Base stats, icons and display names for the three playable classes.

use crate::world::{PlayerClass, StatBlock};

/// Class-specific data for character creation.
#[derive(Debug, Clone, Copy)]
pub struct ClassData {
    /// Display name.
    pub name: &'static str,
    /// Glyph shown next to the character name.
    pub icon: &'static str,
    /// Stats at level 1.
    pub base_stats: StatBlock,
}

const VOIDWALKER: ClassData = ClassData {
    name: "Voidwalker",
    icon: "🌙",
    base_stats: StatBlock::new(15, 8, 12),
};

const AETHERMANCER: ClassData = ClassData {
    name: "Aethermancer",
    icon: "🔮",
    base_stats: StatBlock::new(8, 8, 19),
};

const FORGEMASTER: ClassData = ClassData {
    name: "Forgemaster",
    icon: "⚒️",
    base_stats: StatBlock::new(8, 19, 8),
};

impl PlayerClass {
    /// Get class data for character creation.
    pub fn data(&self) -> ClassData {
        match self {
            PlayerClass::Voidwalker => VOIDWALKER,
            PlayerClass::Aethermancer => AETHERMANCER,
            PlayerClass::Forgemaster => FORGEMASTER,
        }
    }

    pub fn name(&self) -> &'static str {
        self.data().name
    }

    pub fn icon(&self) -> &'static str {
        self.data().icon
    }
}
