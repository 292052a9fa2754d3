use std::path::PathBuf;

use thiserror::Error;

use crate::stage::ShaderStage;

/// Errors used across cascade crates.
///
/// Contract rule: this type lives in `cascade-core` and is re-exported by the
/// pipeline and backend crates. All failures surface synchronously to the
/// immediate caller; nothing is logged-and-ignored internally.
#[derive(Debug, Error)]
pub enum CascadeError {
    // ---- Capability ----
    #[error("offscreen render targets are not supported by this context")]
    UnsupportedTargets,

    #[error("shader programs are not supported by this context")]
    UnsupportedShaders,

    // ---- Shader build ----
    #[error("{stage} shader compile error: {log}")]
    Compile { stage: ShaderStage, log: String },

    #[error("program link error: {0}")]
    Link(String),

    #[error("backend object creation failed: {0}")]
    Create(String),

    // ---- Lifecycle ----
    #[error("cannot {op} a released {object}")]
    Released {
        object: &'static str,
        op: &'static str,
    },

    // ---- Arguments ----
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("pass chain program at position {index} is not valid")]
    InvalidProgram { index: usize },

    #[error("uniform '{0}' not found in program")]
    UniformNotFound(String),

    // ---- Config / assets ----
    #[error("io error at {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("json parse error at {}: {}", .path.display(), .source)]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config at {}: {}", .path.display(), .msg)]
    InvalidConfig { path: PathBuf, msg: String },
}
