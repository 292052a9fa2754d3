use std::fmt;

/// Which point in the pipeline a shader unit executes.
///
/// A single unit type tagged with a stage replaces per-stage subtypes; the
/// two-case distinction does not warrant dynamic dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Per-vertex transform stage.
    Vertex,
    /// Per-pixel coloring stage.
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}
