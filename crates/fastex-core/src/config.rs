//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge `fex.toml` + `fex.<env>.toml` + `FEX_*` env vars.
//! Provides helpers to expand `~` and `${VAR}` and to resolve relative paths
//! against the directory holding the configuration file.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::schema::Schema;

pub const DEFAULT_CONFIG_FILE: &str = "fex.toml";

pub struct Config {
    figment: Figment,
    base_dir: PathBuf,
}

impl Config {
    /// Loads `fex.toml` from the working directory.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Loads `path`, then the `FEX_ENV` overlay next to it, then `FEX_*` env vars.
    /// Missing files contribute nothing.
    pub fn load_from(path: &Path) -> Result<Self> {
        let env_name = env::var("FEX_ENV").unwrap_or_else(|_| "dev".to_string());
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("fex");

        let mut figment = Figment::new().merge(Toml::file(path));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file(base_dir.join(format!("{stem}.dev.toml")))),
            "prod" | "production" => figment = figment.merge(Toml::file(base_dir.join(format!("{stem}.prod.toml")))),
            "test" | "testing" => figment = figment.merge(Toml::file(base_dir.join(format!("{stem}.test.toml")))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("FEX_").ignore(&["ENV"]).split("__"));

        tracing::debug!(env = %env_name, path = %path.display(), "loaded configuration");
        Ok(Self { figment, base_dir })
    }

    /// Builds a configuration from a single TOML file, without overlays or env vars.
    pub fn from_file(path: &Path) -> Self {
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self { figment: Figment::new().merge(Toml::file(path)), base_dir }
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::InvalidConfig(format!("Failed to get '{}': {}", key, e)))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.figment.contains(key)
    }

    /// The `[schema]` table, if one is configured.
    pub fn schema(&self) -> Result<Option<Schema>> {
        if !self.contains("schema") {
            return Ok(None);
        }
        self.get("schema").map(Some)
    }

    /// `data.input`, expanded and resolved against the config file's directory.
    pub fn input_path(&self) -> Result<Option<PathBuf>> {
        if !self.contains("data.input") {
            return Ok(None);
        }
        let raw: String = self.get("data.input")?;
        Ok(Some(resolve_with_base(&self.base_dir, raw)))
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    // Expand env vars first
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    // Expand ~ at start
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
