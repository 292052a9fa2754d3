#![deny(rustdoc::broken_intra_doc_links)]
#![deny(missing_debug_implementations)]

//! cascade backend (glow/OpenGL).
//!
//! This crate contains **only** the GL realization of the context contract:
//! compile/link shaders, allocate framebuffer-backed targets, and draw
//! textured quads. It does NOT contain windowing, file IO, or host policy;
//! the host owns the GL context lifecycle and makes it current before use.

use std::cell::Cell;
use std::fmt;

use glow::HasContext;

use cascade_contract::{QuadVertex, RenderContext, UniformValue};
use cascade_core::{CascadeError, ShaderStage};

/// Standard pass vertex shader: clip-space position at location 0, UV at
/// location 1. Pass programs that want the default quad mapping can use this
/// verbatim.
pub const PASS_VERT: &str = r#"#version 330 core
layout (location = 0) in vec2 a_pos;
layout (location = 1) in vec2 a_uv;
out vec2 v_uv;
void main() {
    v_uv = a_uv;
    gl_Position = vec4(a_pos, 0.0, 1.0);
}
"#;

/// Fragment shader that samples texture unit 0 unchanged.
pub const PASSTHROUGH_FRAG: &str = r#"#version 330 core
in vec2 v_uv;
out vec4 o_color;
uniform sampler2D uTex0;
void main() { o_color = texture(uTex0, v_uv); }
"#;

/// The glow realization of [`RenderContext`].
///
/// Wraps an already-current `glow::Context` and tracks the mutable drawing
/// state (viewport, bound destination, bound program) that the rest of the
/// system keys off. All calls must come from the thread that owns the GL
/// context.
pub struct GlowContext {
    gl: glow::Context,
    display: Cell<(i32, i32)>,
    viewport: Cell<[i32; 4]>,
    bound_framebuffer: Cell<Option<glow::NativeFramebuffer>>,
    bound_program: Cell<Option<glow::NativeProgram>>,
    quad: QuadGeometry,
    // Used for textured-quad draws issued with no user program bound.
    blit_program: glow::NativeProgram,
}

impl fmt::Debug for GlowContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `glow::Context` owns driver state and does not implement Debug.
        f.debug_struct("GlowContext")
            .field("display", &self.display.get())
            .field("viewport", &self.viewport.get())
            .field("bound_framebuffer", &self.bound_framebuffer.get())
            .field("bound_program", &self.bound_program.get())
            .field("gl", &"<gl context>")
            .finish()
    }
}

impl GlowContext {
    /// Wraps an already-current GL context. `display_width`/`display_height`
    /// are the initial surface size; call [`resize_display`](Self::resize_display)
    /// from host resize events.
    pub fn new(
        gl: glow::Context,
        display_width: i32,
        display_height: i32,
    ) -> Result<Self, CascadeError> {
        let width = display_width.max(1);
        let height = display_height.max(1);

        let quad = unsafe { QuadGeometry::new(&gl)? };
        let blit_program = unsafe { compile_blit_program(&gl)? };

        unsafe {
            gl.viewport(0, 0, width, height);
        }

        tracing::debug!(width, height, "glow context wrapped");

        Ok(Self {
            gl,
            display: Cell::new((width, height)),
            viewport: Cell::new([0, 0, width, height]),
            bound_framebuffer: Cell::new(None),
            bound_program: Cell::new(None),
            quad,
            blit_program,
        })
    }

    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    /// Updates the tracked display surface size.
    pub fn resize_display(&self, width: i32, height: i32) {
        self.display.set((width.max(1), height.max(1)));
    }

    /// Reads back RGBA8 pixels from the current destination. This performs a
    /// GPU->CPU transfer and can stall; use sparingly.
    pub fn read_pixels_rgba(&self, x: i32, y: i32, width: i32, height: i32) -> Vec<u8> {
        let mut buf = vec![0u8; (width.max(0) as usize) * (height.max(0) as usize) * 4];
        unsafe {
            self.gl.read_pixels(
                x,
                y,
                width,
                height,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelPackData::Slice(&mut buf),
            );
        }
        buf
    }

    /// Explicitly frees the GL objects this wrapper owns (quad geometry and
    /// the internal blit program). The host still owns the GL context itself.
    pub fn destroy(&mut self) {
        unsafe {
            self.gl.delete_program(self.blit_program);
            self.quad.destroy(&self.gl);
        }
    }
}

impl RenderContext for GlowContext {
    type Shader = glow::NativeShader;
    type Program = glow::NativeProgram;
    type Texture = glow::NativeTexture;
    type Framebuffer = glow::NativeFramebuffer;
    type UniformLocation = glow::NativeUniformLocation;

    fn supports_offscreen_targets(&self) -> bool {
        unsafe {
            let major = self.gl.get_parameter_i32(glow::MAJOR_VERSION);
            major >= 3
                || self
                    .gl
                    .supported_extensions()
                    .contains("GL_ARB_framebuffer_object")
                || self
                    .gl
                    .supported_extensions()
                    .contains("GL_EXT_framebuffer_object")
        }
    }

    fn supports_shader_programs(&self) -> bool {
        unsafe {
            let major = self.gl.get_parameter_i32(glow::MAJOR_VERSION);
            major >= 2
                || self
                    .gl
                    .supported_extensions()
                    .contains("GL_ARB_shader_objects")
        }
    }

    fn display_size(&self) -> (i32, i32) {
        self.display.get()
    }

    fn compile_shader(
        &self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<Self::Shader, CascadeError> {
        let gl = &self.gl;
        let kind = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        };
        unsafe {
            let shader = gl
                .create_shader(kind)
                .map_err(|e| CascadeError::Create(format!("create_shader({stage}) failed: {e:?}")))?;
            gl.shader_source(shader, source);
            gl.compile_shader(shader);
            if !gl.get_shader_compile_status(shader) {
                let log = gl.get_shader_info_log(shader);
                gl.delete_shader(shader);
                return Err(CascadeError::Compile { stage, log });
            }
            Ok(shader)
        }
    }

    fn shader_log(&self, shader: Self::Shader) -> String {
        unsafe { self.gl.get_shader_info_log(shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { self.gl.delete_shader(shader) }
    }

    fn link_program(
        &self,
        vertex: Self::Shader,
        fragment: Self::Shader,
    ) -> Result<Self::Program, CascadeError> {
        let gl = &self.gl;
        unsafe {
            let program = gl
                .create_program()
                .map_err(|e| CascadeError::Create(format!("create_program failed: {e:?}")))?;
            gl.attach_shader(program, vertex);
            gl.attach_shader(program, fragment);
            gl.link_program(program);

            // The units stay alive independently (two-granularity release);
            // only the attachment is undone here.
            gl.detach_shader(program, vertex);
            gl.detach_shader(program, fragment);

            if !gl.get_program_link_status(program) {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                return Err(CascadeError::Link(log));
            }
            Ok(program)
        }
    }

    fn bind_program(&self, program: Self::Program) {
        unsafe { self.gl.use_program(Some(program)) }
        self.bound_program.set(Some(program));
    }

    fn unbind_program(&self) {
        unsafe { self.gl.use_program(None) }
        self.bound_program.set(None);
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { self.gl.delete_program(program) }
    }

    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { self.gl.get_uniform_location(program, name) }
    }

    fn set_uniform(&self, location: &Self::UniformLocation, value: UniformValue) {
        let gl = &self.gl;
        unsafe {
            match value {
                UniformValue::Float(v) => gl.uniform_1_f32(Some(location), v),
                UniformValue::Vec2([x, y]) => gl.uniform_2_f32(Some(location), x, y),
                UniformValue::Vec3([x, y, z]) => gl.uniform_3_f32(Some(location), x, y, z),
                UniformValue::Vec4([x, y, z, w]) => gl.uniform_4_f32(Some(location), x, y, z, w),
                UniformValue::Int(v) => gl.uniform_1_i32(Some(location), v),
                UniformValue::IVec2([x, y]) => gl.uniform_2_i32(Some(location), x, y),
                UniformValue::IVec3([x, y, z]) => gl.uniform_3_i32(Some(location), x, y, z),
                UniformValue::IVec4([x, y, z, w]) => gl.uniform_4_i32(Some(location), x, y, z, w),
            }
        }
    }

    fn create_texture(
        &self,
        width: i32,
        height: i32,
        pixels: Option<&[u8]>,
    ) -> Result<Self::Texture, CascadeError> {
        let gl = &self.gl;
        unsafe {
            let texture = gl
                .create_texture()
                .map_err(|e| CascadeError::Create(format!("create_texture failed: {e:?}")))?;

            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                glow::LINEAR as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                glow::LINEAR as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_S,
                glow::CLAMP_TO_EDGE as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_T,
                glow::CLAMP_TO_EDGE as i32,
            );
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA8 as i32,
                width,
                height,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                pixels,
            );
            gl.bind_texture(glow::TEXTURE_2D, None);

            Ok(texture)
        }
    }

    fn delete_texture(&self, texture: Self::Texture) {
        unsafe { self.gl.delete_texture(texture) }
    }

    fn create_framebuffer(&self, color: Self::Texture) -> Result<Self::Framebuffer, CascadeError> {
        let gl = &self.gl;
        unsafe {
            let framebuffer = gl
                .create_framebuffer()
                .map_err(|e| CascadeError::Create(format!("create_framebuffer failed: {e:?}")))?;

            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(framebuffer));
            gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0,
                glow::TEXTURE_2D,
                Some(color),
                0,
            );

            let status = gl.check_framebuffer_status(glow::FRAMEBUFFER);
            if status != glow::FRAMEBUFFER_COMPLETE {
                gl.bind_framebuffer(glow::FRAMEBUFFER, self.bound_framebuffer.get());
                gl.delete_framebuffer(framebuffer);
                return Err(CascadeError::Create(format!(
                    "framebuffer incomplete: 0x{status:x}"
                )));
            }

            // Restore whatever destination the caller had bound.
            gl.bind_framebuffer(glow::FRAMEBUFFER, self.bound_framebuffer.get());
            Ok(framebuffer)
        }
    }

    fn delete_framebuffer(&self, framebuffer: Self::Framebuffer) {
        unsafe { self.gl.delete_framebuffer(framebuffer) }
    }

    fn bind_framebuffer(&self, framebuffer: Option<Self::Framebuffer>) {
        unsafe { self.gl.bind_framebuffer(glow::FRAMEBUFFER, framebuffer) }
        self.bound_framebuffer.set(framebuffer);
    }

    fn bound_framebuffer(&self) -> Option<Self::Framebuffer> {
        self.bound_framebuffer.get()
    }

    fn set_viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.viewport(x, y, width, height) }
        self.viewport.set([x, y, width, height]);
    }

    fn viewport(&self) -> [i32; 4] {
        self.viewport.get()
    }

    fn clear_color_buffer(&self) {
        unsafe {
            self.gl.clear_color(0.0, 0.0, 0.0, 1.0);
            self.gl.clear(glow::COLOR_BUFFER_BIT);
        }
    }

    fn draw_textured_quad(&self, image: Self::Texture, quad: &[QuadVertex; 4]) {
        let gl = &self.gl;
        let [_, _, vw, vh] = self.viewport.get();
        let (vw, vh) = (vw.max(1) as f32, vh.max(1) as f32);

        // Interleave pos (pixel coords -> clip space) and uv.
        let mut verts = [0.0f32; 16];
        for (i, v) in quad.iter().enumerate() {
            verts[i * 4] = v.position[0] / vw * 2.0 - 1.0;
            verts[i * 4 + 1] = v.position[1] / vh * 2.0 - 1.0;
            verts[i * 4 + 2] = v.uv[0];
            verts[i * 4 + 3] = v.uv[1];
        }

        unsafe {
            let user_program = self.bound_program.get();
            if user_program.is_none() {
                gl.use_program(Some(self.blit_program));
            }

            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_2D, Some(image));

            self.quad.draw(gl, &verts);

            gl.bind_texture(glow::TEXTURE_2D, None);
            if user_program.is_none() {
                gl.use_program(None);
            }
        }
    }
}

/// The shared quad geometry: one VAO/VBO pair, re-uploaded per draw.
struct QuadGeometry {
    vao: glow::NativeVertexArray,
    vbo: glow::NativeBuffer,
}

impl QuadGeometry {
    unsafe fn new(gl: &glow::Context) -> Result<Self, CascadeError> {
        let vao = gl
            .create_vertex_array()
            .map_err(|e| CascadeError::Create(format!("create_vertex_array: {e}")))?;
        let vbo = gl
            .create_buffer()
            .map_err(|e| CascadeError::Create(format!("create_buffer: {e}")))?;

        gl.bind_vertex_array(Some(vao));
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));

        let verts = [0.0f32; 16];
        gl.buffer_data_u8_slice(
            glow::ARRAY_BUFFER,
            bytemuck::cast_slice(&verts),
            glow::DYNAMIC_DRAW,
        );

        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_f32(0, 2, glow::FLOAT, false, 4 * 4, 0);
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_f32(1, 2, glow::FLOAT, false, 4 * 4, 2 * 4);

        gl.bind_buffer(glow::ARRAY_BUFFER, None);
        gl.bind_vertex_array(None);

        Ok(Self { vao, vbo })
    }

    unsafe fn draw(&self, gl: &glow::Context, verts: &[f32; 16]) {
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbo));
        gl.buffer_sub_data_u8_slice(glow::ARRAY_BUFFER, 0, bytemuck::cast_slice(verts));
        gl.bind_buffer(glow::ARRAY_BUFFER, None);

        gl.bind_vertex_array(Some(self.vao));
        gl.draw_arrays(glow::TRIANGLE_FAN, 0, 4);
        gl.bind_vertex_array(None);
    }

    unsafe fn destroy(&self, gl: &glow::Context) {
        gl.delete_vertex_array(self.vao);
        gl.delete_buffer(self.vbo);
    }
}

unsafe fn compile_blit_program(gl: &glow::Context) -> Result<glow::NativeProgram, CascadeError> {
    let vs = gl
        .create_shader(glow::VERTEX_SHADER)
        .map_err(|e| CascadeError::Create(format!("create_shader(VS) failed: {e:?}")))?;
    gl.shader_source(vs, PASS_VERT);
    gl.compile_shader(vs);
    if !gl.get_shader_compile_status(vs) {
        let log = gl.get_shader_info_log(vs);
        gl.delete_shader(vs);
        return Err(CascadeError::Compile {
            stage: ShaderStage::Vertex,
            log,
        });
    }

    let fs = gl
        .create_shader(glow::FRAGMENT_SHADER)
        .map_err(|e| CascadeError::Create(format!("create_shader(FS) failed: {e:?}")))?;
    gl.shader_source(fs, PASSTHROUGH_FRAG);
    gl.compile_shader(fs);
    if !gl.get_shader_compile_status(fs) {
        let log = gl.get_shader_info_log(fs);
        gl.delete_shader(vs);
        gl.delete_shader(fs);
        return Err(CascadeError::Compile {
            stage: ShaderStage::Fragment,
            log,
        });
    }

    let program = gl
        .create_program()
        .map_err(|e| CascadeError::Create(format!("create_program failed: {e:?}")))?;
    gl.attach_shader(program, vs);
    gl.attach_shader(program, fs);
    gl.link_program(program);

    gl.detach_shader(program, vs);
    gl.detach_shader(program, fs);
    gl.delete_shader(vs);
    gl.delete_shader(fs);

    if !gl.get_program_link_status(program) {
        let log = gl.get_program_info_log(program);
        gl.delete_program(program);
        return Err(CascadeError::Link(log));
    }

    // The sampler always reads unit 0.
    gl.use_program(Some(program));
    if let Some(loc) = gl.get_uniform_location(program, "uTex0") {
        gl.uniform_1_i32(Some(&loc), 0);
    }
    gl.use_program(None);

    Ok(program)
}
