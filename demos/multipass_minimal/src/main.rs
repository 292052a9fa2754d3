//! Runs a two-pass chain (invert, then grayscale) over a generated base
//! image, entirely offscreen, prints a checksum of the visible result, and
//! exits. No event loop: this is a bring-up/smoke host, not an app.

use cascade_contract::{QuadVertex, RenderContext};
use cascade_glow::{GlowContext, PASS_VERT};
use cascade_pipeline::{CascadeError, MultiPassCompositor, ShaderProgram, ShaderSource};

use winit::event_loop::EventLoop;
use winit::window::WindowBuilder;

use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use raw_window_handle::HasRawWindowHandle;

const DISPLAY_W: i32 = 256;
const DISPLAY_H: i32 = 256;

const INVERT_FRAG: &str = r#"#version 330 core
in vec2 v_uv;
out vec4 o_color;
uniform sampler2D uTex0;
void main() {
    vec4 c = texture(uTex0, v_uv);
    o_color = vec4(1.0 - c.rgb, c.a);
}
"#;

const GRAYSCALE_FRAG: &str = r#"#version 330 core
in vec2 v_uv;
out vec4 o_color;
uniform sampler2D uTex0;
void main() {
    vec4 c = texture(uTex0, v_uv);
    float y = dot(c.rgb, vec3(0.299, 0.587, 0.114));
    o_color = vec4(vec3(y), c.a);
}
"#;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(e) = run() {
        eprintln!("[multipass_minimal] error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), CascadeError> {
    let event_loop = EventLoop::new();

    let window_builder = WindowBuilder::new()
        .with_title("cascade: multipass_minimal (prints checksum then exits)")
        .with_inner_size(winit::dpi::LogicalSize::new(
            DISPLAY_W as f64,
            DISPLAY_H as f64,
        ));

    let template = glutin::config::ConfigTemplateBuilder::new().with_alpha_size(8);

    let display_builder =
        glutin_winit::DisplayBuilder::new().with_window_builder(Some(window_builder));

    let (window, gl_config) = display_builder
        .build(&event_loop, template, |mut configs| configs.next().unwrap())
        .map_err(|e| CascadeError::Create(format!("DisplayBuilder.build: {e}")))?;

    let window = window
        .ok_or_else(|| CascadeError::Create("DisplayBuilder did not create a window".into()))?;
    let gl_display = gl_config.display();

    let raw_window_handle = window.raw_window_handle();

    let context_attributes = glutin::context::ContextAttributesBuilder::new()
        .with_profile(glutin::context::GlProfile::Core)
        .build(Some(raw_window_handle));

    let not_current_gl_context = unsafe {
        gl_display
            .create_context(&gl_config, &context_attributes)
            .map_err(|e| CascadeError::Create(format!("create_context: {e}")))?
    };

    let size = window.inner_size();
    let attrs = glutin::surface::SurfaceAttributesBuilder::<glutin::surface::WindowSurface>::new()
        .build(
            raw_window_handle,
            size.width.try_into().unwrap(),
            size.height.try_into().unwrap(),
        );

    let gl_surface = unsafe {
        gl_display
            .create_window_surface(&gl_config, &attrs)
            .map_err(|e| CascadeError::Create(format!("create_window_surface: {e}")))?
    };

    let _gl_context = not_current_gl_context
        .make_current(&gl_surface)
        .map_err(|e| CascadeError::Create(format!("make_current: {e}")))?;

    let gl = unsafe {
        glow::Context::from_loader_function(|s| {
            gl_display.get_proc_address(std::ffi::CString::new(s).unwrap().as_c_str()) as *const _
        })
    };

    let mut ctx = GlowContext::new(gl, size.width as i32, size.height as i32)?;

    // Base image: a diagonal color wash, uploaded once as a host texture.
    let base_tex = {
        let mut pixels = vec![0u8; (DISPLAY_W * DISPLAY_H * 4) as usize];
        for y in 0..DISPLAY_H {
            for x in 0..DISPLAY_W {
                let i = ((y * DISPLAY_W + x) * 4) as usize;
                pixels[i] = x as u8;
                pixels[i + 1] = y as u8;
                pixels[i + 2] = (x ^ y) as u8;
                pixels[i + 3] = 255;
            }
        }
        ctx.create_texture(DISPLAY_W, DISPLAY_H, Some(&pixels))?
    };

    let mut invert = ShaderProgram::from_source(
        &ctx,
        &ShaderSource::new(PASS_VERT, INVERT_FRAG).with_origin("builtin:invert"),
    )?;
    let mut grayscale = ShaderProgram::from_source(
        &ctx,
        &ShaderSource::new(PASS_VERT, GRAYSCALE_FRAG).with_origin("builtin:grayscale"),
    )?;

    let chain = MultiPassCompositor::new(vec![&invert, &grayscale])?;
    chain.apply(&ctx, |ctx: &GlowContext| {
        // The base rendering: draw the host texture over the whole viewport.
        let (w, h) = (DISPLAY_W as f32, DISPLAY_H as f32);
        let quad = [
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
        ];
        ctx.draw_textured_quad(base_tex, &quad);
    })?;

    // Checksum a 4x4 corner block of the visible output.
    let px = ctx.read_pixels_rgba(0, 0, 4, 4);
    let mut sum: u64 = 0;
    for b in &px {
        sum = sum.wrapping_add(*b as u64);
    }
    println!("[multipass_minimal] checksum(sum of 4x4 RGBA bytes) = {sum}");

    ctx.delete_texture(base_tex);
    invert.release_all(&ctx)?;
    grayscale.release_all(&ctx)?;
    ctx.destroy();

    Ok(())
}
