//! Game persistence for save/load functionality.
//!
//! The whole `GameState` is stored as one JSON document under a fixed key.
//! Loading overlays whatever fields the document carries onto a fully
//! specified default, so older or partial saves still load; fields the
//! engine does not recognise are logged and reported rather than failing.

use crate::world::{Dimension, GameState, Player, GAME_VERSION};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;
use tokio::fs;
use tokio::sync::RwLock;

/// Key the game is saved under.
pub const SAVE_KEY: &str = "aethermoor_save";

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid save format")]
    InvalidFormat,

    #[error("Save was written by a newer version ({found}); this build supports {supported}")]
    UnsupportedVersion { supported: String, found: String },
}

// ============================================================================
// Save stores
// ============================================================================

/// Key/value storage for serialized saves.
///
/// `get` returns `Ok(None)` when nothing is stored under the key, which is
/// distinct from a store that failed.
#[async_trait]
pub trait SaveStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, PersistError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), PersistError>;
    async fn remove(&self, key: &str) -> Result<(), PersistError>;
}

/// In-process store, used by tests and headless embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl SaveStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PersistError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), PersistError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// Store that keeps one `<key>.json` file per key in a directory.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    dir: PathBuf,
}

impl DirectoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File path for a key. Characters outside `[A-Za-z0-9_-]` become `_`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let safe_key: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{safe_key}.json"))
    }
}

#[async_trait]
impl SaveStore for DirectoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PersistError> {
        fs::create_dir_all(&self.dir).await?;
        fs::write(self.path_for(key), value).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), PersistError> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// Codec
// ============================================================================

/// Serialize the full state to compact JSON.
pub fn serialize(state: &GameState) -> Result<String, PersistError> {
    Ok(serde_json::to_string(state)?)
}

/// Serialize the full state to indented JSON, as written by exports.
pub fn serialize_pretty(state: &GameState) -> Result<String, PersistError> {
    Ok(serde_json::to_string_pretty(state)?)
}

/// What the loader had to work around.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Dotted paths of fields the engine does not recognise.
    pub unknown_fields: Vec<String>,
}

impl MigrationReport {
    pub fn is_clean(&self) -> bool {
        self.unknown_fields.is_empty()
    }
}

/// Decode a save document. See [`deserialize_with_report`].
pub fn deserialize(blob: &str) -> Result<GameState, PersistError> {
    deserialize_with_report(blob).map(|(state, _)| state)
}

/// Decode a save document onto a fresh default state.
///
/// Recognised fields replace the defaults, nested `player` and
/// `currentDimension` objects are overlaid onto a default player and
/// dimension, unknown fields are skipped and reported, and the result is
/// normalised back inside its invariants.
pub fn deserialize_with_report(blob: &str) -> Result<(GameState, MigrationReport), PersistError> {
    let document: Value = serde_json::from_str(blob)?;
    let Value::Object(mut patch) = document else {
        return Err(PersistError::InvalidFormat);
    };

    check_version(&patch)?;

    let mut report = MigrationReport::default();
    let mut base = object(serde_json::to_value(GameState::new())?)?;

    let nested = [
        ("player", serde_json::to_value(Player::default())?),
        ("currentDimension", serde_json::to_value(Dimension::default())?),
    ];
    for (key, default) in nested {
        match patch.remove(key) {
            Some(Value::Object(fields)) => {
                let mut value = object(default)?;
                overlay(&mut value, fields, key, &mut report);
                base.insert(key.to_string(), Value::Object(value));
            }
            Some(Value::Null) | None => {}
            Some(_) => return Err(PersistError::InvalidFormat),
        }
    }

    overlay(&mut base, patch, "", &mut report);

    for field in &report.unknown_fields {
        tracing::warn!(field = %field, "ignoring unrecognised save field");
    }

    let mut state: GameState = serde_json::from_value(Value::Object(base))?;
    state.version = GAME_VERSION.to_string();
    state.normalize();
    Ok((state, report))
}

fn object(value: Value) -> Result<Map<String, Value>, PersistError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(PersistError::InvalidFormat),
    }
}

fn overlay(
    base: &mut Map<String, Value>,
    patch: Map<String, Value>,
    path: &str,
    report: &mut MigrationReport,
) {
    for (key, value) in patch {
        let field_path = if path.is_empty() {
            key.clone()
        } else {
            format!("{path}.{key}")
        };

        match base.get_mut(&key) {
            None => report.unknown_fields.push(field_path),
            Some(slot) => match (slot, value) {
                (Value::Object(inner), Value::Object(fields)) => {
                    overlay(inner, fields, &field_path, report)
                }
                (slot, value) => *slot = value,
            },
        }
    }
}

fn major_version(version: &str) -> Option<u64> {
    version.split('.').next()?.trim().parse().ok()
}

fn check_version(document: &Map<String, Value>) -> Result<(), PersistError> {
    let Some(found) = document.get("version").and_then(Value::as_str) else {
        return Ok(());
    };
    match (major_version(found), major_version(GAME_VERSION)) {
        (Some(found_major), Some(supported_major)) if found_major > supported_major => {
            Err(PersistError::UnsupportedVersion {
                supported: GAME_VERSION.to_string(),
                found: found.to_string(),
            })
        }
        _ => Ok(()),
    }
}

// ============================================================================
// Export / import
// ============================================================================

/// A save rendered for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveExport {
    pub file_name: String,
    pub contents: String,
}

/// `aethermoor_save_YYYY-MM-DD.json`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("{SAVE_KEY}_{}.json", date.format("%Y-%m-%d"))
}

/// Render the state as a pretty-printed export dated `date`.
pub fn export(state: &GameState, date: NaiveDate) -> Result<SaveExport, PersistError> {
    Ok(SaveExport {
        file_name: export_file_name(date),
        contents: serialize_pretty(state)?,
    })
}

/// Decode an imported file. Same codec as loading from the store.
pub fn import(contents: &str) -> Result<(GameState, MigrationReport), PersistError> {
    deserialize_with_report(contents)
}
