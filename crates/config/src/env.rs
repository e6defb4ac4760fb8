use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use crate::ConfigError;

/// Immutable view of the stack environment for a single compiler run.
///
/// Built once from the `.env` file plus any command-line overrides and then
/// passed by reference to everything that needs a value. Keys are kept sorted so
/// iteration never depends on file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvSnapshot {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Load variables from a dotenv file.
    ///
    /// A missing file is not an error: the stack falls back to per-service
    /// defaults, same as a fresh checkout without `.env`.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Environment file not found, using defaults");
            return Ok(Self::default());
        }

        let to_error = |source| ConfigError::EnvFile {
            path: path.to_path_buf(),
            source,
        };

        let mut vars = BTreeMap::new();
        for item in dotenvy::from_path_iter(path).map_err(to_error)? {
            let (key, value) = item.map_err(to_error)?;
            vars.insert(key, value);
        }

        tracing::debug!(path = %path.display(), count = vars.len(), "Loaded environment file");
        Ok(Self { vars })
    }

    /// Layer overrides on top of the loaded values. Nothing is written back to disk.
    pub fn with_overrides<I, K, V>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in overrides {
            let key = key.into();
            let value = value.into();
            tracing::info!(variable = %key, value = %value, "Applying SOURCE override");
            self.vars.insert(key, value);
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Value with surrounding whitespace removed; empty values count as unset.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Resolve which `.env` file to read.
///
/// `custom` is the value of `GENAI_ENV_FILE`; when set it wins over `<root>/.env`
/// and a leading `~` is expanded against `home`.
pub fn resolve_env_file_path(root: &Path, custom: Option<&str>, home: Option<&str>) -> PathBuf {
    match custom.map(str::trim).filter(|p| !p.is_empty()) {
        Some(path) => match (path.strip_prefix("~/"), home) {
            (Some(rest), Some(home)) => Path::new(home).join(rest),
            _ => PathBuf::from(path),
        },
        None => root.join(".env"),
    }
}
