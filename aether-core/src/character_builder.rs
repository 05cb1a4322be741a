//! Character creation.
//!
//! The creation screen collects a name and a class; the character can be
//! created once the trimmed name has at least three characters and a class
//! has been selected.

use crate::world::{Player, PlayerClass};

/// Minimum length of a trimmed character name, in characters.
pub const MIN_NAME_LEN: usize = 3;

/// Builder for new player characters.
#[derive(Debug, Clone, Default)]
pub struct CharacterBuilder {
    name: String,
    class: Option<PlayerClass>,
}

/// Error from character building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuilderError {
    NameTooShort { min: usize, got: usize },
    MissingClass,
}

impl std::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuilderError::NameTooShort { min, .. } => {
                write!(f, "Name must be at least {min} characters long")
            }
            BuilderError::MissingClass => write!(f, "Please select a class"),
        }
    }
}

impl std::error::Error for BuilderError {}

impl CharacterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the character's name. Surrounding whitespace is dropped on build.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn class(mut self, class: PlayerClass) -> Self {
        self.class = Some(class);
        self
    }

    /// Select a class by its identifier. Unknown names select voidwalker.
    pub fn class_name(self, name: &str) -> Self {
        self.class(PlayerClass::from_name(name))
    }

    pub fn selected_class(&self) -> Option<PlayerClass> {
        self.class
    }

    /// Check the creation gate without consuming the builder.
    pub fn validate(&self) -> Result<(), BuilderError> {
        let got = self.name.trim().chars().count();
        if got < MIN_NAME_LEN {
            return Err(BuilderError::NameTooShort {
                min: MIN_NAME_LEN,
                got,
            });
        }
        if self.class.is_none() {
            return Err(BuilderError::MissingClass);
        }
        Ok(())
    }

    /// Whether the create button would be enabled.
    pub fn can_create(&self) -> bool {
        self.validate().is_ok()
    }

    /// Build the character, returning an error if the gate is not satisfied.
    pub fn build(self) -> Result<Player, BuilderError> {
        self.validate()?;
        let class = self.class.ok_or(BuilderError::MissingClass)?;
        Ok(Player::new(self.name.trim(), class))
    }
}
