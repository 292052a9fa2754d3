//! Lifecycle contracts: release granularities, invalid-object-use errors,
//! bind/unbind state restoration, and uniform registration.

use cascade_contract::{RenderContext, UniformValue};
use cascade_pipeline::{CascadeError, RenderTarget, ShaderProgram, ShaderStage, ShaderUnit};

use crate::fake::FakeContext;
use crate::support::{make_program, COPY_FRAG, QUAD_VERT};

#[test]
fn binding_a_released_target_is_an_error() {
    let ctx = FakeContext::new(8, 8);
    let mut target = RenderTarget::create(&ctx, 4, 4).expect("create");
    target.release(&ctx).expect("release");

    let err = target.bind(&ctx).expect_err("bind must fail");
    assert!(
        matches!(
            err,
            CascadeError::Released {
                object: "render target",
                op: "bind"
            }
        ),
        "{err}"
    );
    // The destination is untouched by the failed bind.
    assert_eq!(ctx.bound_framebuffer(), None);
}

#[test]
fn releasing_a_target_twice_is_an_error() {
    let ctx = FakeContext::new(8, 8);
    let mut target = RenderTarget::create(&ctx, 4, 4).expect("create");
    target.release(&ctx).expect("first release");

    let err = target.release(&ctx).expect_err("second release must fail");
    assert!(matches!(err, CascadeError::Released { .. }), "{err}");
    assert_eq!(ctx.framebuffer_counts().deleted, 1);
    assert_eq!(ctx.texture_counts().deleted, 1);
}

#[test]
fn binding_a_released_program_is_an_error() {
    let ctx = FakeContext::new(8, 8);
    let mut program = make_program(&ctx);
    program.release(&ctx).expect("release");

    let err = program.bind(&ctx).expect_err("bind must fail");
    assert!(
        matches!(
            err,
            CascadeError::Released {
                object: "shader program",
                op: "bind"
            }
        ),
        "{err}"
    );
}

#[test]
fn program_release_keeps_units_reusable() {
    let ctx = FakeContext::new(8, 8);
    let mut program = make_program(&ctx);

    program.release(&ctx).expect("release");
    assert!(!program.is_valid());
    assert!(program.vertex().is_valid());
    assert!(program.fragment().is_valid());

    let (vertex, fragment) = program.into_units(&ctx).expect("recover units");
    let relinked = ShaderProgram::link(&ctx, vertex, fragment).expect("relink");
    assert!(relinked.is_valid());
}

#[test]
fn program_release_all_invalidates_everything() {
    let ctx = FakeContext::new(8, 8);
    let mut program = make_program(&ctx);

    program.release_all(&ctx).expect("release all");
    assert!(!program.is_valid());
    assert!(!program.vertex().is_valid());
    assert!(!program.fragment().is_valid());
    assert_eq!(ctx.live_programs(), 0);
    assert_eq!(ctx.live_shaders(), 0);
}

#[test]
fn into_units_releases_a_live_program_first() {
    let ctx = FakeContext::new(8, 8);
    let program = make_program(&ctx);

    let (vertex, fragment) = program.into_units(&ctx).expect("recover units");
    assert!(vertex.is_valid());
    assert!(fragment.is_valid());
    assert_eq!(ctx.live_programs(), 0);
}

#[test]
fn linking_mismatched_stages_is_rejected_without_leaks() {
    let ctx = FakeContext::new(8, 8);
    let first = ShaderUnit::compile(&ctx, ShaderStage::Fragment, COPY_FRAG).expect("compile");
    let second = ShaderUnit::compile(&ctx, ShaderStage::Fragment, COPY_FRAG).expect("compile");

    let err = ShaderProgram::link(&ctx, first, second).expect_err("must reject");
    assert!(matches!(err, CascadeError::InvalidArgument(_)), "{err}");
    assert_eq!(ctx.live_shaders(), 0);
}

#[test]
fn compile_failure_carries_the_driver_log() {
    let ctx = FakeContext::new(8, 8);
    ctx.script_compile_failure("0:1: 'vec5' : undeclared identifier");

    let err = ShaderUnit::<FakeContext>::compile(&ctx, ShaderStage::Fragment, "bad source")
        .expect_err("compile must fail");
    match err {
        CascadeError::Compile { stage, log } => {
            assert_eq!(stage, ShaderStage::Fragment);
            assert!(log.contains("undeclared identifier"), "{log}");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(ctx.live_shaders(), 0);
}

#[test]
fn link_failure_releases_both_units() {
    let ctx = FakeContext::new(8, 8);
    let vertex = ShaderUnit::compile(&ctx, ShaderStage::Vertex, QUAD_VERT).expect("compile");
    let fragment = ShaderUnit::compile(&ctx, ShaderStage::Fragment, COPY_FRAG).expect("compile");

    ctx.script_link_failure("varying v_uv not written by vertex stage");

    let err = ShaderProgram::link(&ctx, vertex, fragment).expect_err("link must fail");
    assert!(matches!(err, CascadeError::Link(_)), "{err}");
    assert_eq!(ctx.live_shaders(), 0);
    assert_eq!(ctx.live_programs(), 0);
}

#[test]
fn unsupported_program_context_rejects_compilation() {
    let ctx = FakeContext::new(8, 8);
    ctx.set_supports_programs(false);

    let err = ShaderUnit::<FakeContext>::compile(&ctx, ShaderStage::Vertex, QUAD_VERT)
        .expect_err("must reject");
    assert!(matches!(err, CascadeError::UnsupportedShaders), "{err}");
}

#[test]
fn uniform_locations_are_resolved_once_and_cached() {
    let ctx = FakeContext::new(8, 8);
    ctx.define_uniform("u_mix");
    let program = make_program(&ctx);

    program.bind(&ctx).expect("bind");
    program
        .set_uniform(&ctx, "u_mix", UniformValue::Float(0.25))
        .expect("first set");
    program
        .set_uniform(&ctx, "u_mix", UniformValue::Float(0.75))
        .expect("second set");
    ShaderProgram::unbind(&ctx);

    assert_eq!(ctx.uniform_queries_for("u_mix"), 1);
    assert_eq!(ctx.uniform_sets().len(), 2);
}

#[test]
fn unknown_uniform_is_reported_and_not_requeried() {
    let ctx = FakeContext::new(8, 8);
    let program = make_program(&ctx);

    let err = program
        .uniform_location(&ctx, "u_missing")
        .expect_err("must report");
    assert!(matches!(err, CascadeError::UniformNotFound(_)), "{err}");

    let err = program
        .uniform_location(&ctx, "u_missing")
        .expect_err("still missing");
    assert!(matches!(err, CascadeError::UniformNotFound(_)), "{err}");

    // The negative result is cached too.
    assert_eq!(ctx.uniform_queries_for("u_missing"), 1);
}

#[test]
fn bind_restores_nested_destinations_exactly() {
    let ctx = FakeContext::new(8, 8);
    let mut outer = RenderTarget::create(&ctx, 8, 8).expect("outer");
    let mut inner = RenderTarget::create(&ctx, 4, 4).expect("inner");

    outer.bind(&ctx).expect("bind outer");
    let outer_destination = ctx.bound_framebuffer();
    assert!(outer_destination.is_some());
    assert_eq!(ctx.viewport(), [0, 0, 8, 8]);

    inner.bind(&ctx).expect("bind inner");
    assert_eq!(ctx.viewport(), [0, 0, 4, 4]);
    assert_ne!(ctx.bound_framebuffer(), outer_destination);

    inner.unbind(&ctx);
    assert_eq!(ctx.bound_framebuffer(), outer_destination);
    assert_eq!(ctx.viewport(), [0, 0, 8, 8]);

    outer.unbind(&ctx);
    assert_eq!(ctx.bound_framebuffer(), None);

    outer.release(&ctx).expect("release outer");
    inner.release(&ctx).expect("release inner");
}

#[test]
fn bind_clears_stale_target_contents() {
    let ctx = FakeContext::new(8, 8);
    let mut target = RenderTarget::create(&ctx, 8, 8).expect("create");

    target.bind(&ctx).expect("bind");
    ctx.paint([10, 20, 30, 255]);
    target.unbind(&ctx);

    // Rebinding clears; the stale paint must not survive.
    target.bind(&ctx).expect("rebind");
    target.unbind(&ctx);

    let quad = [
        cascade_contract::QuadVertex {
            position: [0.0, 0.0],
            uv: [0.0, 0.0],
        },
        cascade_contract::QuadVertex {
            position: [0.0, 8.0],
            uv: [0.0, 1.0],
        },
        cascade_contract::QuadVertex {
            position: [8.0, 8.0],
            uv: [1.0, 1.0],
        },
        cascade_contract::QuadVertex {
            position: [8.0, 0.0],
            uv: [1.0, 0.0],
        },
    ];
    ctx.draw_textured_quad(target.image(), &quad);
    assert_eq!(ctx.display_texel(), [0, 0, 0, 255]);

    target.release(&ctx).expect("release");
}
