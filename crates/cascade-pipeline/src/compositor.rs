use cascade_contract::{QuadVertex, RenderContext};
use cascade_core::CascadeError;
use tracing::{debug, trace};

use crate::program::ShaderProgram;
use crate::target::RenderTarget;

/// Applies an ordered chain of shader programs to a base rendering.
///
/// The compositor borrows its programs; the caller keeps ownership and must
/// keep them alive (the borrow makes releasing one out from under a live
/// compositor a compile error).
#[derive(Debug)]
pub struct MultiPassCompositor<'p, C: RenderContext> {
    programs: Vec<&'p ShaderProgram<C>>,
}

impl<'p, C: RenderContext> MultiPassCompositor<'p, C> {
    /// Builds a compositor over `programs`, applied in sequence order.
    ///
    /// Every program must be valid; the first invalid one is reported by
    /// position and nothing is constructed. Zero- and one-program chains are
    /// legal degenerate cases.
    pub fn new(programs: Vec<&'p ShaderProgram<C>>) -> Result<Self, CascadeError> {
        for (index, program) in programs.iter().enumerate() {
            if !program.is_valid() {
                return Err(CascadeError::InvalidProgram { index });
            }
        }
        Ok(Self { programs })
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// Renders `base_render` through every program in order and draws the
    /// result to the caller's currently active destination.
    ///
    /// `base_render` only issues drawing commands; it must not bind or unbind
    /// any target or program itself.
    ///
    /// The chain runs the base rendering into a fresh target sized to the
    /// display surface, then threads the produced image through each program,
    /// each pass writing into a fresh target and releasing the target that
    /// produced its input as soon as the draw has consumed it. Exactly N+1
    /// targets are created and released for N programs, including on failure
    /// paths: a mid-chain error releases every target this call allocated
    /// before propagating.
    pub fn apply<F>(&self, ctx: &C, base_render: F) -> Result<(), CascadeError>
    where
        F: FnOnce(&C),
    {
        let (width, height) = ctx.display_size();
        debug!(
            passes = self.programs.len(),
            width, height, "applying pass chain"
        );

        let mut current = RenderTarget::create(ctx, width, height)?;
        if let Err(err) = current.bind(ctx) {
            current.release(ctx)?;
            return Err(err);
        }
        base_render(ctx);
        current.unbind(ctx);

        for (index, program) in self.programs.iter().enumerate() {
            trace!(pass = index, "rendering shader pass");
            let mut next = match RenderTarget::create(ctx, width, height) {
                Ok(target) => target,
                Err(err) => {
                    current.release(ctx)?;
                    return Err(err);
                }
            };
            if let Err(err) = render_pass(ctx, program, current.image(), &mut next, width, height)
            {
                next.release(ctx)?;
                current.release(ctx)?;
                return Err(err);
            }
            current.release(ctx)?;
            current = next;
        }

        // The visible output: the last image, drawn to the destination that
        // was active when apply() was entered.
        draw_image(ctx, current.image(), width, height);
        current.release(ctx)?;
        Ok(())
    }
}

/// One shader pass: `input` drawn through `program` into `target`.
fn render_pass<C: RenderContext>(
    ctx: &C,
    program: &ShaderProgram<C>,
    input: C::Texture,
    target: &mut RenderTarget<C>,
    width: i32,
    height: i32,
) -> Result<(), CascadeError> {
    target.bind(ctx)?;
    if let Err(err) = program.bind(ctx) {
        target.unbind(ctx);
        return Err(err);
    }
    draw_image(ctx, input, width, height);
    ShaderProgram::unbind(ctx);
    target.unbind(ctx);
    Ok(())
}

/// Corner/UV pairs for a rectangle spanning `width` x `height`, wound
/// bottom-left, top-left, top-right, bottom-right.
fn fullscreen_quad(width: i32, height: i32) -> [QuadVertex; 4] {
    let (w, h) = (width as f32, height as f32);
    [
        QuadVertex {
            position: [0.0, 0.0],
            uv: [0.0, 0.0],
        },
        QuadVertex {
            position: [0.0, h],
            uv: [0.0, 1.0],
        },
        QuadVertex {
            position: [w, h],
            uv: [1.0, 1.0],
        },
        QuadVertex {
            position: [w, 0.0],
            uv: [1.0, 0.0],
        },
    ]
}

/// Draws `image` over the full destination viewport on texture unit 0. Pure
/// in (image, width, height); no state survives between calls.
fn draw_image<C: RenderContext>(ctx: &C, image: C::Texture, width: i32, height: i32) {
    ctx.draw_textured_quad(image, &fullscreen_quad(width, height));
}
