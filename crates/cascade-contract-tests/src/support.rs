//! Small helpers shared by the test modules.

use cascade_pipeline::{ShaderProgram, ShaderStage, ShaderUnit};

use crate::fake::FakeContext;

pub const QUAD_VERT: &str = "void main() { gl_Position = a_pos; }";
pub const COPY_FRAG: &str = "void main() { o_color = texture(uTex0, v_uv); }";

/// Compiles and links a trivial program against the fake context.
pub fn make_program(ctx: &FakeContext) -> ShaderProgram<FakeContext> {
    let vertex =
        ShaderUnit::compile(ctx, ShaderStage::Vertex, QUAD_VERT).expect("vertex unit compiles");
    let fragment =
        ShaderUnit::compile(ctx, ShaderStage::Fragment, COPY_FRAG).expect("fragment unit compiles");
    ShaderProgram::link(ctx, vertex, fragment).expect("program links")
}
