#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(missing_debug_implementations)]

//! cascade context contract.
//!
//! This crate is **contract-only**: it defines the capability surface the
//! pipeline needs from a graphics backend, with no GL types and no windowing.
//! Backends (e.g. `cascade-glow`) implement [`RenderContext`] over their native
//! handle types; tests implement it over plain integers.

use std::fmt;

use cascade_core::{CascadeError, ShaderStage};

/// One corner of a textured rectangle: pixel coordinates of the destination
/// viewport plus UVs in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

/// A 1-4 component float or integer uniform value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Int(i32),
    IVec2([i32; 2]),
    IVec3([i32; 3]),
    IVec4([i32; 4]),
}

/// Capability contract over the active graphics context.
///
/// The context is process-wide mutable state (bound destination, bound
/// program, active texture unit); this trait models it as a single explicit
/// object every call goes through, so the single-active-target discipline is
/// observable by a fake implementation in tests.
///
/// Threading contract: all calls happen from one logical thread. A host that
/// renders from several threads must serialize every call behind a single
/// context-ownership token; this crate does not lock.
pub trait RenderContext {
    type Shader: Copy + Eq + fmt::Debug;
    type Program: Copy + Eq + fmt::Debug;
    type Texture: Copy + Eq + fmt::Debug;
    type Framebuffer: Copy + Eq + fmt::Debug;
    type UniformLocation: Clone + fmt::Debug;

    // ---- Capabilities / drawing surface ----

    /// Whether offscreen render targets (framebuffer objects) are available.
    fn supports_offscreen_targets(&self) -> bool;

    /// Whether programmable shaders are available.
    fn supports_shader_programs(&self) -> bool;

    /// Current display surface size; pass chains size their targets to match.
    fn display_size(&self) -> (i32, i32);

    // ---- Shader units ----

    /// Compiles `source` for `stage`. A failure carries the driver's
    /// diagnostic log.
    fn compile_shader(
        &self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<Self::Shader, CascadeError>;

    /// Driver info log for a shader object (may be non-empty on success).
    fn shader_log(&self, shader: Self::Shader) -> String;

    fn delete_shader(&self, shader: Self::Shader);

    // ---- Programs ----

    /// Links a vertex and fragment shader into a drawable program. A failure
    /// carries the driver's link log.
    fn link_program(
        &self,
        vertex: Self::Shader,
        fragment: Self::Shader,
    ) -> Result<Self::Program, CascadeError>;

    fn bind_program(&self, program: Self::Program);

    /// Unbinds whatever program is bound.
    fn unbind_program(&self);

    fn delete_program(&self, program: Self::Program);

    /// Resolves a named uniform, or `None` if the program has no such
    /// (active) uniform.
    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation>;

    /// Assigns a uniform of the currently bound program.
    fn set_uniform(&self, location: &Self::UniformLocation, value: UniformValue);

    // ---- Textures / framebuffers ----

    /// Allocates a `width` x `height` RGBA8 texture. `pixels`, when given,
    /// must be tightly packed RGBA8 of exactly that size; otherwise contents
    /// are driver-default.
    fn create_texture(
        &self,
        width: i32,
        height: i32,
        pixels: Option<&[u8]>,
    ) -> Result<Self::Texture, CascadeError>;

    fn delete_texture(&self, texture: Self::Texture);

    /// Allocates a framebuffer with `color` attached as its color output.
    fn create_framebuffer(&self, color: Self::Texture) -> Result<Self::Framebuffer, CascadeError>;

    fn delete_framebuffer(&self, framebuffer: Self::Framebuffer);

    /// Redirects drawing to `framebuffer`, or to the display surface for
    /// `None`.
    fn bind_framebuffer(&self, framebuffer: Option<Self::Framebuffer>);

    /// The currently bound drawing destination (`None` = display surface).
    fn bound_framebuffer(&self) -> Option<Self::Framebuffer>;

    fn set_viewport(&self, x: i32, y: i32, width: i32, height: i32);

    /// The current viewport as `[x, y, width, height]`.
    fn viewport(&self) -> [i32; 4];

    fn clear_color_buffer(&self);

    // ---- Draw ----

    /// Binds `image` on texture unit 0 and draws `quad` into the current
    /// destination. When no user program is bound the backend substitutes its
    /// own passthrough program, so the draw behaves as a plain textured blit.
    fn draw_textured_quad(&self, image: Self::Texture, quad: &[QuadVertex; 4]);
}
