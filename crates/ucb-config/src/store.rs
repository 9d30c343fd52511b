//! JSON key-value document persisted on local disk.
//!
//! # Design
//! - The whole document is held in memory and rewritten on every mutation.
//! - Writes go to a sibling staging file and are renamed into place.
//! - A missing or unreadable document loads as an empty store.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{ConfigError, ConfigResult};

/// Directory created under the platform configuration directory.
pub const APP_DIR_NAME: &str = "ucb-cli";
/// File name of the configuration document.
pub const FILE_NAME: &str = "config.json";

/// Key-value configuration store backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    document: Map<String, Value>,
}

impl ConfigStore {
    /// Load the store at `path`. Never fails: absent or corrupt files yield an empty store.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let document = load_document(&path);
        Self { path, document }
    }

    /// Load the store from the platform default location.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoConfigDir`] when no configuration directory exists
    /// for the current user.
    pub fn open_default() -> ConfigResult<Self> {
        Ok(Self::open(default_path()?))
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read `key`, falling back to `default` when it is absent or has another shape.
    #[must_use]
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.document
            .get(key)
            .and_then(|value| T::deserialize(value).ok())
            .unwrap_or(default)
    }

    /// Whether `key` is present in the document.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.document.contains_key(key)
    }

    /// Store `value` under `key` and persist the document.
    ///
    /// # Errors
    ///
    /// Returns an error when the value cannot be encoded or the file cannot be written.
    pub fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> ConfigResult<()> {
        let value = self.encode(value)?;
        self.update(|document| {
            document.insert(key.to_string(), value);
        })
    }

    /// Remove `key` and persist the document. Removing an absent key is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be written.
    pub fn delete(&mut self, key: &str) -> ConfigResult<()> {
        if !self.document.contains_key(key) {
            return Ok(());
        }
        self.update(|document| {
            document.remove(key);
        })
    }

    /// Apply several edits to the document and persist them with one write.
    ///
    /// The in-memory document only changes when the write succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be written.
    pub fn update<F>(&mut self, mutate: F) -> ConfigResult<()>
    where
        F: FnOnce(&mut Map<String, Value>),
    {
        let mut staged = self.document.clone();
        mutate(&mut staged);
        self.persist(&staged)?;
        self.document = staged;
        Ok(())
    }

    /// Encode a value with the store's serializer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] when `value` cannot be represented as JSON.
    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> ConfigResult<Value> {
        serde_json::to_value(value)
            .map_err(|source| ConfigError::json("store.encode", &self.path, source))
    }

    /// Raw file contents exactly as stored on disk; `None` when nothing was written yet.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read.
    pub fn dump(&self) -> ConfigResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ConfigError::io("store.dump", &self.path, source)),
        }
    }

    fn persist(&self, document: &Map<String, Value>) -> ConfigResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .map_err(|source| ConfigError::io("store.create_dir", parent, source))?;
        }

        let serialised = serde_json::to_string_pretty(document)
            .map_err(|source| ConfigError::json("store.serialize", &self.path, source))?;
        let staging = staging_path(&self.path);
        fs::write(&staging, serialised)
            .map_err(|source| ConfigError::io("store.write", &staging, source))?;
        fs::rename(&staging, &self.path)
            .map_err(|source| ConfigError::io("store.rename", &self.path, source))?;
        debug!(path = %self.path.display(), keys = document.len(), "config store persisted");
        Ok(())
    }
}

/// Platform default location of the configuration document.
///
/// # Errors
///
/// Returns [`ConfigError::NoConfigDir`] when the platform exposes no config directory.
pub fn default_path() -> ConfigResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join(FILE_NAME))
        .ok_or(ConfigError::NoConfigDir)
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn load_document(path: &Path) -> Map<String, Value> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Map::new(),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "config store unreadable; starting empty");
            return Map::new();
        }
    };

    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(document)) => document,
        Ok(_) => {
            warn!(path = %path.display(), "config store is not a JSON object; starting empty");
            Map::new()
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "config store is corrupt; starting empty");
            Map::new()
        }
    }
}
