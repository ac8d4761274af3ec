use std::{
    fs, io,
    path::{Path, PathBuf},
};

use fluid_tokens_core::{Breakpoints, InvalidTokenPolicy, Options};
use serde::Deserialize;

use crate::{BuildError, Result};

pub use fluid_tokens_core::MAX_PRECISION;

/// Build settings, read from a JSON file. Every field is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct BuildConfig {
    pub sources: Vec<PathBuf>,
    pub out_dir: PathBuf,
    pub breakpoints: Breakpoints,
    pub precision: u32,
    pub on_invalid: InvalidTokenPolicy,
}
impl Default for BuildConfig {
    fn default() -> Self {
        let options = Options::default();
        Self {
            sources: vec![
                PathBuf::from("tokens/typography/font-sizes.json"),
                PathBuf::from("tokens/spacing/spacing.json"),
            ],
            out_dir: PathBuf::from("dist"),
            breakpoints: options.breakpoints,
            precision: options.precision,
            on_invalid: options.on_invalid,
        }
    }
}
impl BuildConfig {
    pub const DEFAULT_FILE: &'static str = "fluid-tokens.json";

    /// Reads `path`, or [`BuildConfig::DEFAULT_FILE`] when present, or falls
    /// back to defaults. Only an explicitly named file is required to exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(Self::DEFAULT_FILE).is_file() => {
                Self::from_file(Path::new(Self::DEFAULT_FILE))
            }
            None => Ok(Self::default()),
        }
    }

    /// Relative paths inside the file are taken relative to the file's directory.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => BuildError::MissingConfig {
                path: path.to_path_buf(),
            },
            _ => BuildError::Read {
                path: path.to_path_buf(),
                source,
            },
        })?;
        let mut config = Self::from_json(path, &contents)?;
        if let Some(base) = path.parent() {
            config.sources = config.sources.iter().map(|s| base.join(s)).collect();
            config.out_dir = base.join(&config.out_dir);
        }
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_json(path: &Path, contents: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(contents).map_err(|err| BuildError::InvalidConfig {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })?;
        config.validate(path)?;
        Ok(config)
    }

    pub fn validate(&self, path: &Path) -> Result<()> {
        let invalid = |reason: String| {
            Err(BuildError::InvalidConfig {
                path: path.to_path_buf(),
                reason,
            })
        };
        if self.sources.is_empty() {
            return invalid("at least one token source is required".to_string());
        }
        if self.precision > MAX_PRECISION {
            return invalid(format!(
                "precision {} is above the maximum of {MAX_PRECISION}",
                self.precision
            ));
        }
        Ok(())
    }

    pub fn options(&self) -> Options {
        Options {
            breakpoints: self.breakpoints.clone(),
            precision: self.precision,
            on_invalid: self.on_invalid,
        }
    }
}
