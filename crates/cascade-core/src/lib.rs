#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(missing_debug_implementations)]

//! cascade core vocabulary.
//!
//! This crate is **contract-only**: error taxonomy, shader stage tags, shader
//! source loading, and pass-chain configuration. No GL handles, no windowing,
//! no backend policy.

pub mod config;
pub mod error;
pub mod source;
pub mod stage;

// ---- Stable re-exports ----
pub use config::{ChainConfig, PassConfig, Resolution};
pub use error::CascadeError;
pub use source::{read_source, ShaderSource};
pub use stage::ShaderStage;
