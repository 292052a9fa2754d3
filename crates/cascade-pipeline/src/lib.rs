#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(missing_debug_implementations)]

//! cascade pipeline: shader units, linked programs, offscreen render targets,
//! and the multi-pass compositor that chains them.
//!
//! Everything here is generic over [`cascade_contract::RenderContext`], so the
//! same code runs against the glow backend and against a fake context in
//! tests. The context is threaded into every call that touches the driver;
//! nothing here holds a context reference across calls.

pub mod compositor;
pub mod program;
pub mod target;
pub mod unit;

// ---- Stable re-exports ----
pub use cascade_core::{CascadeError, ShaderSource, ShaderStage};
pub use compositor::MultiPassCompositor;
pub use program::ShaderProgram;
pub use target::RenderTarget;
pub use unit::ShaderUnit;
