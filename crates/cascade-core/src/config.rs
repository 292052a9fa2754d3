use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CascadeError;
use crate::source::ShaderSource;

/// Fixed offscreen resolution override. When absent, hosts size the chain to
/// the current display surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: i32,
    pub height: i32,
}

/// One pass in a chain: a vertex/fragment source file pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassConfig {
    pub vertex: PathBuf,
    pub fragment: PathBuf,
    #[serde(default)]
    pub label: Option<String>,
}

/// Declarative pass-chain configuration, loaded from JSON.
///
/// The config only names shader files and an optional resolution; compiling
/// and linking stay with the host, which owns the graphics context.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChainConfig {
    #[serde(default)]
    pub resolution: Option<Resolution>,
    #[serde(default)]
    pub passes: Vec<PassConfig>,
}

impl ChainConfig {
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, CascadeError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| CascadeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: ChainConfig =
            serde_json::from_slice(&bytes).map_err(|source| CascadeError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        if let Err(msg) = cfg.validate() {
            return Err(CascadeError::InvalidConfig {
                path: path.to_path_buf(),
                msg,
            });
        }
        Ok(cfg)
    }

    /// Structural checks that JSON shape alone cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(res) = self.resolution {
            if res.width <= 0 || res.height <= 0 {
                return Err(format!(
                    "non-positive resolution {}x{}",
                    res.width, res.height
                ));
            }
        }
        for (i, pass) in self.passes.iter().enumerate() {
            if pass.vertex.as_os_str().is_empty() {
                return Err(format!("pass {i} has an empty vertex shader path"));
            }
            if pass.fragment.as_os_str().is_empty() {
                return Err(format!("pass {i} has an empty fragment shader path"));
            }
        }
        Ok(())
    }

    /// Loads every pass's source pair, resolving relative paths against
    /// `base_dir` (typically the config file's directory).
    pub fn load_sources(&self, base_dir: impl AsRef<Path>) -> Result<Vec<ShaderSource>, CascadeError> {
        let base_dir = base_dir.as_ref();
        let mut sources = Vec::with_capacity(self.passes.len());
        for pass in &self.passes {
            let mut src =
                ShaderSource::from_files(base_dir.join(&pass.vertex), base_dir.join(&pass.fragment))?;
            if let Some(label) = &pass.label {
                src.origin = Some(label.clone());
            }
            sources.push(src);
        }
        Ok(sources)
    }
}
