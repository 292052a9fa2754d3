use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use cascade_contract::{QuadVertex, RenderContext, UniformValue};
use cascade_core::{CascadeError, ShaderStage};

/// What one textured-quad draw saw at the moment it was issued.
#[derive(Debug, Clone)]
pub struct DrawRecord {
    pub image: u32,
    /// Simulated solid-color contents of `image` at draw time.
    pub source_texel: [u8; 4],
    /// Bound destination at draw time (`None` = display surface).
    pub destination: Option<u32>,
    /// Color attachment of `destination`, when it is a framebuffer.
    pub destination_attachment: Option<u32>,
    /// Bound program at draw time (`None` = backend blit).
    pub program: Option<u32>,
    pub viewport: [i32; 4],
    pub quad: [QuadVertex; 4],
}

/// Create/delete accounting for one resource class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceCounts {
    pub created: usize,
    pub deleted: usize,
}

/// Scripted in-memory context for driving the pipeline without a GPU.
///
/// Counts creates/releases, records every textured-quad draw, and simulates
/// texture contents as a single solid texel so identity round-trips are
/// observable. Draws propagate the source texel to the bound destination
/// unchanged (a passthrough stand-in; the fake does not run shaders).
///
/// Deleting a handle that is not live panics: in a test, a double-free is a
/// bug in the code under test, not a condition to report politely.
#[derive(Debug)]
pub struct FakeContext {
    next_handle: Cell<u32>,
    display: Cell<(i32, i32)>,
    supports_targets: Cell<bool>,
    supports_programs: Cell<bool>,

    live_shaders: RefCell<HashSet<u32>>,
    live_programs: RefCell<HashSet<u32>>,
    live_textures: RefCell<HashSet<u32>>,
    live_framebuffers: RefCell<HashSet<u32>>,

    textures_created: Cell<usize>,
    textures_deleted: Cell<usize>,
    framebuffers_created: Cell<usize>,
    framebuffers_deleted: Cell<usize>,
    framebuffer_attempts: Cell<usize>,

    // framebuffer -> color attachment
    attachments: RefCell<HashMap<u32, u32>>,
    // simulated solid-color contents per texture
    texels: RefCell<HashMap<u32, [u8; 4]>>,
    display_texel: Cell<[u8; 4]>,

    bound_framebuffer: Cell<Option<u32>>,
    bound_program: Cell<Option<u32>>,
    viewport: Cell<[i32; 4]>,

    draws: RefCell<Vec<DrawRecord>>,

    // ---- failure scripting ----
    refuse_framebuffer_at: Cell<Option<usize>>,
    scripted_compile_failure: RefCell<Option<String>>,
    scripted_link_failure: RefCell<Option<String>>,

    // ---- uniforms ----
    known_uniforms: RefCell<HashSet<String>>,
    uniform_locations: RefCell<HashMap<(u32, String), u32>>,
    uniform_queries: RefCell<Vec<String>>,
    uniform_sets: RefCell<Vec<(u32, UniformValue)>>,
}

impl FakeContext {
    pub fn new(display_width: i32, display_height: i32) -> Self {
        Self {
            next_handle: Cell::new(1),
            display: Cell::new((display_width, display_height)),
            supports_targets: Cell::new(true),
            supports_programs: Cell::new(true),
            live_shaders: RefCell::new(HashSet::new()),
            live_programs: RefCell::new(HashSet::new()),
            live_textures: RefCell::new(HashSet::new()),
            live_framebuffers: RefCell::new(HashSet::new()),
            textures_created: Cell::new(0),
            textures_deleted: Cell::new(0),
            framebuffers_created: Cell::new(0),
            framebuffers_deleted: Cell::new(0),
            framebuffer_attempts: Cell::new(0),
            attachments: RefCell::new(HashMap::new()),
            texels: RefCell::new(HashMap::new()),
            display_texel: Cell::new([0, 0, 0, 0]),
            bound_framebuffer: Cell::new(None),
            bound_program: Cell::new(None),
            viewport: Cell::new([0, 0, display_width, display_height]),
            draws: RefCell::new(Vec::new()),
            refuse_framebuffer_at: Cell::new(None),
            scripted_compile_failure: RefCell::new(None),
            scripted_link_failure: RefCell::new(None),
            known_uniforms: RefCell::new(HashSet::new()),
            uniform_locations: RefCell::new(HashMap::new()),
            uniform_queries: RefCell::new(Vec::new()),
            uniform_sets: RefCell::new(Vec::new()),
        }
    }

    fn alloc(&self) -> u32 {
        let handle = self.next_handle.get();
        self.next_handle.set(handle + 1);
        handle
    }

    // ---- scripting ----

    /// Refuse the `attempt`-th framebuffer creation (1-based) with a Create
    /// error.
    pub fn refuse_framebuffer_create(&self, attempt: usize) {
        self.refuse_framebuffer_at.set(Some(attempt));
    }

    /// Fail the next shader compile with `log` as the driver diagnostic.
    pub fn script_compile_failure(&self, log: impl Into<String>) {
        *self.scripted_compile_failure.borrow_mut() = Some(log.into());
    }

    /// Fail the next program link with `log` as the driver diagnostic.
    pub fn script_link_failure(&self, log: impl Into<String>) {
        *self.scripted_link_failure.borrow_mut() = Some(log.into());
    }

    pub fn set_supports_offscreen(&self, supported: bool) {
        self.supports_targets.set(supported);
    }

    pub fn set_supports_programs(&self, supported: bool) {
        self.supports_programs.set(supported);
    }

    /// Makes `name` resolvable as a uniform on every program.
    pub fn define_uniform(&self, name: impl Into<String>) {
        self.known_uniforms.borrow_mut().insert(name.into());
    }

    // ---- host-side drawing stand-in ----

    /// Paints the current destination a solid color, standing in for
    /// arbitrary host drawing commands in a base-render callback.
    pub fn paint(&self, color: [u8; 4]) {
        match self.bound_framebuffer.get() {
            Some(framebuffer) => {
                let attachments = self.attachments.borrow();
                let texture = attachments[&framebuffer];
                self.texels.borrow_mut().insert(texture, color);
            }
            None => self.display_texel.set(color),
        }
    }

    // ---- inspection ----

    pub fn texture_counts(&self) -> ResourceCounts {
        ResourceCounts {
            created: self.textures_created.get(),
            deleted: self.textures_deleted.get(),
        }
    }

    pub fn framebuffer_counts(&self) -> ResourceCounts {
        ResourceCounts {
            created: self.framebuffers_created.get(),
            deleted: self.framebuffers_deleted.get(),
        }
    }

    pub fn live_textures(&self) -> usize {
        self.live_textures.borrow().len()
    }

    pub fn live_framebuffers(&self) -> usize {
        self.live_framebuffers.borrow().len()
    }

    pub fn live_shaders(&self) -> usize {
        self.live_shaders.borrow().len()
    }

    pub fn live_programs(&self) -> usize {
        self.live_programs.borrow().len()
    }

    pub fn draws(&self) -> Vec<DrawRecord> {
        self.draws.borrow().clone()
    }

    /// Simulated contents of the display surface.
    pub fn display_texel(&self) -> [u8; 4] {
        self.display_texel.get()
    }

    /// How many times `name` was actually resolved against the driver.
    pub fn uniform_queries_for(&self, name: &str) -> usize {
        self.uniform_queries
            .borrow()
            .iter()
            .filter(|queried| queried.as_str() == name)
            .count()
    }

    pub fn uniform_sets(&self) -> Vec<(u32, UniformValue)> {
        self.uniform_sets.borrow().clone()
    }
}

impl RenderContext for FakeContext {
    type Shader = u32;
    type Program = u32;
    type Texture = u32;
    type Framebuffer = u32;
    type UniformLocation = u32;

    fn supports_offscreen_targets(&self) -> bool {
        self.supports_targets.get()
    }

    fn supports_shader_programs(&self) -> bool {
        self.supports_programs.get()
    }

    fn display_size(&self) -> (i32, i32) {
        self.display.get()
    }

    fn compile_shader(&self, stage: ShaderStage, _source: &str) -> Result<u32, CascadeError> {
        if let Some(log) = self.scripted_compile_failure.borrow_mut().take() {
            return Err(CascadeError::Compile { stage, log });
        }
        let shader = self.alloc();
        self.live_shaders.borrow_mut().insert(shader);
        Ok(shader)
    }

    fn shader_log(&self, _shader: u32) -> String {
        String::new()
    }

    fn delete_shader(&self, shader: u32) {
        assert!(
            self.live_shaders.borrow_mut().remove(&shader),
            "shader {shader} deleted twice or never created"
        );
    }

    fn link_program(&self, vertex: u32, fragment: u32) -> Result<u32, CascadeError> {
        assert!(
            self.live_shaders.borrow().contains(&vertex),
            "link with dead vertex shader {vertex}"
        );
        assert!(
            self.live_shaders.borrow().contains(&fragment),
            "link with dead fragment shader {fragment}"
        );
        if let Some(log) = self.scripted_link_failure.borrow_mut().take() {
            return Err(CascadeError::Link(log));
        }
        let program = self.alloc();
        self.live_programs.borrow_mut().insert(program);
        Ok(program)
    }

    fn bind_program(&self, program: u32) {
        assert!(
            self.live_programs.borrow().contains(&program),
            "bind of dead program {program}"
        );
        self.bound_program.set(Some(program));
    }

    fn unbind_program(&self) {
        self.bound_program.set(None);
    }

    fn delete_program(&self, program: u32) {
        assert!(
            self.live_programs.borrow_mut().remove(&program),
            "program {program} deleted twice or never created"
        );
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<u32> {
        self.uniform_queries.borrow_mut().push(name.to_string());
        if !self.known_uniforms.borrow().contains(name) {
            return None;
        }
        let key = (program, name.to_string());
        if let Some(&location) = self.uniform_locations.borrow().get(&key) {
            return Some(location);
        }
        let location = self.alloc();
        self.uniform_locations.borrow_mut().insert(key, location);
        Some(location)
    }

    fn set_uniform(&self, location: &u32, value: UniformValue) {
        self.uniform_sets.borrow_mut().push((*location, value));
    }

    fn create_texture(
        &self,
        width: i32,
        height: i32,
        pixels: Option<&[u8]>,
    ) -> Result<u32, CascadeError> {
        assert!(width > 0 && height > 0, "fake texture with bad dimensions");
        let texture = self.alloc();
        self.live_textures.borrow_mut().insert(texture);
        self.textures_created.set(self.textures_created.get() + 1);
        if let Some(pixels) = pixels {
            // Solid-color simulation: the first texel stands for the image.
            if pixels.len() >= 4 {
                self.texels
                    .borrow_mut()
                    .insert(texture, [pixels[0], pixels[1], pixels[2], pixels[3]]);
            }
        }
        Ok(texture)
    }

    fn delete_texture(&self, texture: u32) {
        assert!(
            self.live_textures.borrow_mut().remove(&texture),
            "texture {texture} deleted twice or never created"
        );
        self.textures_deleted.set(self.textures_deleted.get() + 1);
        self.texels.borrow_mut().remove(&texture);
    }

    fn create_framebuffer(&self, color: u32) -> Result<u32, CascadeError> {
        let attempt = self.framebuffer_attempts.get() + 1;
        self.framebuffer_attempts.set(attempt);
        if self.refuse_framebuffer_at.get() == Some(attempt) {
            return Err(CascadeError::Create(
                "framebuffer creation refused by test script".to_string(),
            ));
        }
        assert!(
            self.live_textures.borrow().contains(&color),
            "framebuffer attachment {color} is not a live texture"
        );
        let framebuffer = self.alloc();
        self.live_framebuffers.borrow_mut().insert(framebuffer);
        self.framebuffers_created
            .set(self.framebuffers_created.get() + 1);
        self.attachments.borrow_mut().insert(framebuffer, color);
        Ok(framebuffer)
    }

    fn delete_framebuffer(&self, framebuffer: u32) {
        assert!(
            self.live_framebuffers.borrow_mut().remove(&framebuffer),
            "framebuffer {framebuffer} deleted twice or never created"
        );
        self.framebuffers_deleted
            .set(self.framebuffers_deleted.get() + 1);
        self.attachments.borrow_mut().remove(&framebuffer);
    }

    fn bind_framebuffer(&self, framebuffer: Option<u32>) {
        if let Some(framebuffer) = framebuffer {
            assert!(
                self.live_framebuffers.borrow().contains(&framebuffer),
                "bind of dead framebuffer {framebuffer}"
            );
        }
        self.bound_framebuffer.set(framebuffer);
    }

    fn bound_framebuffer(&self) -> Option<u32> {
        self.bound_framebuffer.get()
    }

    fn set_viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.viewport.set([x, y, width, height]);
    }

    fn viewport(&self) -> [i32; 4] {
        self.viewport.get()
    }

    fn clear_color_buffer(&self) {
        self.paint([0, 0, 0, 255]);
    }

    fn draw_textured_quad(&self, image: u32, quad: &[QuadVertex; 4]) {
        assert!(
            self.live_textures.borrow().contains(&image),
            "draw samples dead texture {image}"
        );
        let source_texel = self
            .texels
            .borrow()
            .get(&image)
            .copied()
            .unwrap_or([0, 0, 0, 0]);
        let destination = self.bound_framebuffer.get();
        let destination_attachment =
            destination.and_then(|framebuffer| self.attachments.borrow().get(&framebuffer).copied());
        self.draws.borrow_mut().push(DrawRecord {
            image,
            source_texel,
            destination,
            destination_attachment,
            program: self.bound_program.get(),
            viewport: self.viewport.get(),
            quad: *quad,
        });
        // Passthrough propagation of the solid texel into the destination.
        match self.bound_framebuffer.get() {
            Some(framebuffer) => {
                let attachments = self.attachments.borrow();
                let texture = attachments[&framebuffer];
                self.texels.borrow_mut().insert(texture, source_texel);
            }
            None => self.display_texel.set(source_texel),
        }
    }
}
