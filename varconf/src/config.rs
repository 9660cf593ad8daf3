//! The root controller: one container bound to one JSON file.

use std::{
    fmt, fs,
    ops::{Deref, DerefMut},
    path::{Path, PathBuf},
    time::SystemTime,
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, ser::PrettyFormatter};

use crate::{
    error::{Error, Result, kind_name},
    schema::{self, Schema},
    variable::{Container, Variable},
};

/// Load and save behavior of a [`Config`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigOptions {
    /// Write the defaults to disk when the file does not exist yet.
    pub create_if_missing: bool,
    /// Indentation unit of the written file; empty writes compact JSON.
    pub indent: String,
    /// Copy the previous file to a timestamped backup before overwriting it.
    pub backup: bool,
}

impl Default for ConfigOptions {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            indent: "\t".to_string(),
            backup: false,
        }
    }
}

/// A container of variables persisted as one JSON object.
///
/// Top-level keys the container does not declare are kept as they were read
/// and written back after the declared ones.
pub struct Config<C> {
    path: PathBuf,
    options: ConfigOptions,
    container: C,
    schema: Schema,
    unaccepted: Map<String, Value>,
    dirty: bool,
}

impl<C: Container> Config<C> {
    /// Bind `container` to the file at `path` with default options.
    ///
    /// Nothing is read until [`Config::load`].
    pub fn new(path: impl AsRef<Path>, container: C) -> Result<Self> {
        Self::with_options(path, container, ConfigOptions::default())
    }

    /// Bind `container` to the file at `path` with explicit options.
    pub fn with_options(
        path: impl AsRef<Path>,
        container: C,
        options: ConfigOptions,
    ) -> Result<Self> {
        let schema = Schema::discover(&container)?;
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            options,
            container,
            schema,
            unaccepted: Map::new(),
            dirty: false,
        })
    }

    /// Set the indentation unit of the written file.
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.options.indent = indent.into();
        self
    }

    /// Whether a missing file is created from the defaults on load.
    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.options.create_if_missing = create;
        self
    }

    /// Whether save keeps a timestamped copy of the previous file.
    pub fn with_backup(mut self, backup: bool) -> Self {
        self.options.backup = backup;
        self
    }

    /// Read the file and merge it into the variables.
    ///
    /// A missing file is created from the defaults when
    /// [`ConfigOptions::create_if_missing`] is set and left alone otherwise.
    /// A blank file counts as an empty object.
    pub fn load(&mut self) -> Result<()> {
        if !self.path.exists() {
            if self.options.create_if_missing {
                info!("creating {} from defaults", self.path.display());
                return self.save();
            }
            debug!("{} does not exist, keeping defaults", self.path.display());
            return Ok(());
        }
        let text = fs::read_to_string(&self.path).map_err(|e| Error::io(&self.path, e))?;
        self.load_str(&text)
    }

    /// Merge a JSON document held in memory.
    pub fn load_str(&mut self, text: &str) -> Result<()> {
        let document = if text.trim().is_empty() {
            Value::Object(Map::new())
        } else {
            serde_json::from_str(text).map_err(|source| Error::Parse {
                path: self.path.clone(),
                source,
            })?
        };
        self.load_value(&document)
    }

    /// Merge an already parsed document.
    ///
    /// Replaces the retained unknown keys with the ones found in `document`.
    pub fn load_value(&mut self, document: &Value) -> Result<()> {
        let Value::Object(object) = document else {
            return Err(Error::NotAnObject {
                found: kind_name(document),
            });
        };
        let mut unaccepted = Map::new();
        self.schema.load(&mut self.container, object, |key, node| {
            debug!("retaining unknown key `{key}`");
            unaccepted.insert(key.to_string(), node.clone());
        });
        self.unaccepted = unaccepted;
        self.mark_clean();
        Ok(())
    }

    /// Write the document to the file.
    pub fn save(&mut self) -> Result<()> {
        let text = self.to_string_pretty()?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        if self.options.backup && self.path.exists() {
            let backup = self.backup_path();
            fs::copy(&self.path, &backup).map_err(|e| Error::io(&backup, e))?;
            info!("backed up {} to {}", self.path.display(), backup.display());
        }

        fs::write(&self.path, text).map_err(|e| Error::io(&self.path, e))?;
        debug!("saved {}", self.path.display());
        self.mark_clean();
        Ok(())
    }

    fn backup_path(&self) -> PathBuf {
        let secs = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let ext = self
            .path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("json");
        self.path.with_extension(format!("bk-{secs}.{ext}"))
    }

    /// The document as it would be saved.
    pub fn to_value(&self) -> Value {
        let mut object = self.schema.save(&self.container);
        for (key, node) in &self.unaccepted {
            if !self.schema.contains(key) {
                object.insert(key.clone(), node.clone());
            }
        }
        Value::Object(object)
    }

    /// Render the document with the configured indent.
    pub fn to_string_pretty(&self) -> Result<String> {
        let document = self.to_value();
        if self.options.indent.is_empty() {
            return Ok(serde_json::to_string(&document)?);
        }
        let mut out = Vec::new();
        let formatter = PrettyFormatter::with_indent(self.options.indent.as_bytes());
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        document.serialize(&mut serializer)?;
        out.push(b'\n');
        String::from_utf8(out).map_err(|e| Error::Serialize(serde::ser::Error::custom(e)))
    }

    /// Top-level keys read from the file that no variable claimed.
    pub fn unaccepted(&self) -> &Map<String, Value> {
        &self.unaccepted
    }

    /// File the document is read from and written to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and save behavior.
    pub fn options(&self) -> &ConfigOptions {
        &self.options
    }

    /// Index of the top-level variables.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Look up a variable by a dot-separated path, e.g. `"server.port"`.
    pub fn get_by_key(&self, path: &str) -> Option<&dyn Variable> {
        schema::find(&self.container, path)
    }

    /// Mutable form of [`Config::get_by_key`].
    pub fn get_mut_by_key(&mut self, path: &str) -> Option<&mut dyn Variable> {
        schema::find_mut(&mut self.container, path)
    }

    /// Whether there are changes not yet written to disk.
    pub fn is_dirty(&self) -> bool {
        self.dirty || schema::is_dirty(&self.container)
    }

    /// Force the next [`Config::is_dirty`] to report pending changes.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn mark_clean(&mut self) {
        self.dirty = false;
        schema::mark_clean(&mut self.container);
    }

    /// Consume the config, returning the container.
    pub fn into_inner(self) -> C {
        self.container
    }
}

impl<C> Deref for Config<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.container
    }
}

impl<C> DerefMut for Config<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.container
    }
}

impl<C: Container> fmt::Display for Config<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.to_string_pretty().map_err(|_| fmt::Error)?;
        f.write_str(text.trim_end())
    }
}

impl<C: fmt::Debug> fmt::Debug for Config<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("path", &self.path)
            .field("options", &self.options)
            .field("container", &self.container)
            .field("unaccepted", &self.unaccepted)
            .finish()
    }
}
