use cascade_contract::RenderContext;
use cascade_core::CascadeError;

/// Drawing-destination state captured by `bind`, restored by `unbind`.
#[derive(Debug)]
struct SavedBinding<C: RenderContext> {
    viewport: [i32; 4],
    framebuffer: Option<C::Framebuffer>,
}

/// An offscreen, fixed-resolution drawing surface: a framebuffer with a
/// single-layer color texture attached.
///
/// Exactly one target may be the active drawing destination at a time.
/// `bind` and `unbind` must be called in pairs; an `unbind` without a
/// matching `bind` is a caller contract violation (asserted in debug builds,
/// not defended against otherwise).
#[derive(Debug)]
pub struct RenderTarget<C: RenderContext> {
    framebuffer: C::Framebuffer,
    texture: C::Texture,
    width: i32,
    height: i32,
    saved: Option<SavedBinding<C>>,
    released: bool,
}

impl<C: RenderContext> RenderTarget<C> {
    /// Allocates a target with driver-default (uninitialized) contents.
    pub fn create(ctx: &C, width: i32, height: i32) -> Result<Self, CascadeError> {
        Self::with_pixels(ctx, width, height, None)
    }

    /// Allocates a target seeded with `pixels` (tightly packed RGBA8).
    pub fn with_pixels(
        ctx: &C,
        width: i32,
        height: i32,
        pixels: Option<&[u8]>,
    ) -> Result<Self, CascadeError> {
        if !ctx.supports_offscreen_targets() {
            return Err(CascadeError::UnsupportedTargets);
        }
        if width <= 0 || height <= 0 {
            return Err(CascadeError::InvalidArgument(format!(
                "render target dimensions must be positive, got {width}x{height}"
            )));
        }

        let texture = ctx.create_texture(width, height, pixels)?;
        let framebuffer = match ctx.create_framebuffer(texture) {
            Ok(framebuffer) => framebuffer,
            Err(err) => {
                ctx.delete_texture(texture);
                return Err(err);
            }
        };

        Ok(Self {
            framebuffer,
            texture,
            width,
            height,
            saved: None,
            released: false,
        })
    }

    /// Redirects subsequent drawing into this target: saves the caller's
    /// viewport and destination, sets the viewport to the target size, and
    /// clears the color buffer.
    pub fn bind(&mut self, ctx: &C) -> Result<(), CascadeError> {
        if self.released {
            return Err(CascadeError::Released {
                object: "render target",
                op: "bind",
            });
        }
        debug_assert!(
            self.saved.is_none(),
            "render target bound twice without an unbind"
        );
        self.saved = Some(SavedBinding {
            viewport: ctx.viewport(),
            framebuffer: ctx.bound_framebuffer(),
        });
        ctx.bind_framebuffer(Some(self.framebuffer));
        ctx.set_viewport(0, 0, self.width, self.height);
        ctx.clear_color_buffer();
        Ok(())
    }

    /// Restores the viewport and destination saved by the matching `bind`.
    pub fn unbind(&mut self, ctx: &C) {
        debug_assert!(
            self.saved.is_some(),
            "render target unbound without a matching bind"
        );
        if let Some(saved) = self.saved.take() {
            ctx.bind_framebuffer(saved.framebuffer);
            let [x, y, width, height] = saved.viewport;
            ctx.set_viewport(x, y, width, height);
        }
    }

    /// Frees the framebuffer and its attached texture. [`image`](Self::image)
    /// must not be used after this; each target is released exactly once.
    pub fn release(&mut self, ctx: &C) -> Result<(), CascadeError> {
        if self.released {
            return Err(CascadeError::Released {
                object: "render target",
                op: "release",
            });
        }
        ctx.delete_framebuffer(self.framebuffer);
        ctx.delete_texture(self.texture);
        self.released = true;
        Ok(())
    }

    /// The image produced by the most recent bind/draw/unbind cycle.
    pub fn image(&self) -> C::Texture {
        debug_assert!(!self.released, "image handle of a released render target");
        self.texture
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Whether the active context can render offscreen at all.
    pub fn is_supported(ctx: &C) -> bool {
        ctx.supports_offscreen_targets()
    }
}
