//! Build driver for the fluid design tokens: reads the configured token
//! sources, renders every artifact in memory, then writes them out.
//!
//! Artifacts, relative to the output directory:
//!
//! - `css/tokens.css`: custom properties, `clamp()` for fluid tokens
//! - `figma/<breakpoint>.json`: `category/name` -> record, per breakpoint
//! - `figma/figma-tokens.json`: all breakpoints combined
//! - `figma-plugin-format.json`: category -> name -> breakpoint -> value

use std::{
    collections::HashSet,
    fs, io,
    path::{Path, PathBuf},
};

use fluid_tokens_core::{naming, TokenError, TokenFile, TokenSet};
use serde::Serialize;

pub mod config;
mod error;

pub use config::BuildConfig;
pub use error::{BuildError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Relative to the output directory.
    pub path: PathBuf,
    pub contents: String,
}
impl Artifact {
    fn new(path: impl Into<PathBuf>, contents: String) -> Self {
        Self {
            path: path.into(),
            contents,
        }
    }
}

#[derive(Debug)]
pub struct BuildReport {
    pub tokens: usize,
    pub written: Vec<PathBuf>,
}

pub fn load_tokens(config: &BuildConfig) -> Result<TokenSet> {
    let files = config
        .sources
        .iter()
        .map(|path| {
            let contents = fs::read_to_string(path).map_err(|source| match source.kind() {
                io::ErrorKind::NotFound => BuildError::MissingInputFile { path: path.clone() },
                _ => BuildError::Read {
                    path: path.clone(),
                    source,
                },
            })?;
            tracing::debug!(path = %path.display(), bytes = contents.len(), "read token source");
            Ok(TokenFile::parse(&path.display().to_string(), &contents)?)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(TokenSet::load(files, config.options())?)
}

const COMBINED_STEM: &str = "figma-tokens";

/// Every artifact, fully formatted. Nothing touches the disk.
pub fn render(tokens: &TokenSet) -> Result<Vec<Artifact>> {
    let mut artifacts = vec![Artifact::new("css/tokens.css", tokens.to_css()?)];
    let discrete = tokens.to_discrete()?;
    // The combined export shares the directory, so its stem is taken.
    let mut stems = HashSet::from([COMBINED_STEM.to_string()]);
    for (breakpoint, records) in discrete.iter() {
        let stem = naming::identifier(breakpoint);
        if stem.is_empty() || !stems.insert(stem.clone()) {
            return Err(TokenError::InvalidBreakpoints(format!(
                "breakpoint {breakpoint} does not map to a distinct file name"
            ))
            .into());
        }
        let path = format!("figma/{stem}.json");
        let contents = to_json(&path, records)?;
        artifacts.push(Artifact::new(path, contents));
    }
    let combined = format!("figma/{COMBINED_STEM}.json");
    let contents = to_json(&combined, &discrete)?;
    artifacts.push(Artifact::new(combined, contents));
    artifacts.push(Artifact::new(
        "figma-plugin-format.json",
        to_json("figma-plugin-format.json", &tokens.to_plugin_format()?)?,
    ));
    Ok(artifacts)
}

fn to_json<T: Serialize>(artifact: &str, value: &T) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value).map_err(|source| BuildError::Serialize {
        artifact: artifact.to_string(),
        source,
    })?;
    json.push('\n');
    Ok(json)
}

/// Whole-file overwrite of each artifact under `out_dir`.
pub fn write(out_dir: &Path, artifacts: &[Artifact]) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let path = out_dir.join(&artifact.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| BuildError::OutputWriteFailure {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, &artifact.contents).map_err(|source| BuildError::OutputWriteFailure {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), bytes = artifact.contents.len(), "wrote artifact");
        written.push(path);
    }
    Ok(written)
}

/// Loads and renders without writing.
pub fn check(config: &BuildConfig) -> Result<(TokenSet, Vec<Artifact>)> {
    let tokens = load_tokens(config)?;
    let artifacts = render(&tokens)?;
    Ok((tokens, artifacts))
}

pub fn build(config: &BuildConfig) -> Result<BuildReport> {
    let (tokens, artifacts) = check(config)?;
    let written = write(&config.out_dir, &artifacts)?;
    Ok(BuildReport {
        tokens: tokens.len(),
        written,
    })
}
