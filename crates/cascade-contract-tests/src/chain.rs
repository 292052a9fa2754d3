//! Pass-chaining behavior of `MultiPassCompositor::apply`.

use cascade_contract::RenderContext;
use cascade_pipeline::{CascadeError, MultiPassCompositor, RenderTarget};

use crate::fake::{FakeContext, ResourceCounts};
use crate::support::make_program;

#[test]
fn zero_pass_chain_is_an_identity_blit() {
    let ctx = FakeContext::new(4, 4);
    let compositor = MultiPassCompositor::new(vec![]).expect("empty chain is legal");

    compositor
        .apply(&ctx, |ctx: &FakeContext| ctx.paint([200, 40, 10, 255]))
        .expect("apply");

    // One target for the base pass, created and released exactly once.
    assert_eq!(
        ctx.framebuffer_counts(),
        ResourceCounts {
            created: 1,
            deleted: 1
        }
    );
    assert_eq!(
        ctx.texture_counts(),
        ResourceCounts {
            created: 1,
            deleted: 1
        }
    );
    assert_eq!(ctx.live_framebuffers(), 0);
    assert_eq!(ctx.live_textures(), 0);

    // The visible blit carries the base image to the display unchanged.
    let draws = ctx.draws();
    assert_eq!(draws.len(), 1);
    assert_eq!(draws[0].destination, None);
    assert_eq!(draws[0].program, None);
    assert_eq!(draws[0].source_texel, [200, 40, 10, 255]);
    assert_eq!(ctx.display_texel(), [200, 40, 10, 255]);
}

#[test]
fn single_program_chain_is_legal() {
    let ctx = FakeContext::new(8, 8);
    let program = make_program(&ctx);
    let compositor = MultiPassCompositor::new(vec![&program]).expect("one-program chain");

    compositor
        .apply(&ctx, |ctx: &FakeContext| ctx.paint([7, 7, 7, 255]))
        .expect("apply");

    assert_eq!(ctx.framebuffer_counts().created, 2);
    assert_eq!(ctx.framebuffer_counts().deleted, 2);
    assert_eq!(ctx.draws().len(), 2);
}

#[test]
fn chain_creates_and_releases_n_plus_one_targets() {
    let ctx = FakeContext::new(8, 8);
    let a = make_program(&ctx);
    let b = make_program(&ctx);
    let c = make_program(&ctx);
    let compositor = MultiPassCompositor::new(vec![&a, &b, &c]).expect("chain");

    compositor
        .apply(&ctx, |ctx: &FakeContext| ctx.paint([1, 2, 3, 255]))
        .expect("apply");

    assert_eq!(ctx.framebuffer_counts().created, 4);
    assert_eq!(ctx.framebuffer_counts().deleted, 4);
    assert_eq!(ctx.texture_counts().created, 4);
    assert_eq!(ctx.texture_counts().deleted, 4);
    assert_eq!(ctx.live_framebuffers(), 0);
    assert_eq!(ctx.live_textures(), 0);

    // Three pass draws plus the final blit.
    assert_eq!(ctx.draws().len(), 4);
}

#[test]
fn passes_run_in_order_each_consuming_the_previous_output() {
    let ctx = FakeContext::new(8, 8);
    let a = make_program(&ctx);
    let b = make_program(&ctx);
    let compositor = MultiPassCompositor::new(vec![&a, &b]).expect("chain");

    compositor
        .apply(&ctx, |ctx: &FakeContext| ctx.paint([9, 9, 9, 255]))
        .expect("apply");

    let draws = ctx.draws();
    assert_eq!(draws.len(), 3);

    // A runs first on the base rendering, then B, then the plain blit.
    assert_eq!(draws[0].program, Some(a.handle()));
    assert_eq!(draws[1].program, Some(b.handle()));
    assert_eq!(draws[2].program, None);

    // A's input is the base image; B's input is exactly A's output.
    assert_eq!(draws[0].source_texel, [9, 9, 9, 255]);
    assert_eq!(Some(draws[1].image), draws[0].destination_attachment);
    assert_eq!(Some(draws[2].image), draws[1].destination_attachment);

    // Each pass writes into a fresh offscreen target; the blit hits the display.
    assert!(draws[0].destination.is_some());
    assert!(draws[1].destination.is_some());
    assert_ne!(draws[0].destination, draws[1].destination);
    assert_eq!(draws[2].destination, None);
}

#[test]
fn mid_chain_target_failure_releases_every_allocated_target() {
    let ctx = FakeContext::new(8, 8);
    let a = make_program(&ctx);
    let b = make_program(&ctx);
    let compositor = MultiPassCompositor::new(vec![&a, &b]).expect("chain");

    // Base target is creation attempt 1, pass A's is 2; refuse pass B's.
    ctx.refuse_framebuffer_create(3);

    let err = compositor
        .apply(&ctx, |ctx: &FakeContext| ctx.paint([1, 1, 1, 255]))
        .expect_err("chain must fail");
    assert!(matches!(err, CascadeError::Create(_)), "{err}");

    assert_eq!(ctx.framebuffer_counts().created, 2);
    assert_eq!(ctx.framebuffer_counts().deleted, 2);
    // The orphaned texture of the refused framebuffer is cleaned up as well.
    assert_eq!(ctx.texture_counts().created, 3);
    assert_eq!(ctx.texture_counts().deleted, 3);
    assert_eq!(ctx.live_framebuffers(), 0);
    assert_eq!(ctx.live_textures(), 0);
}

#[test]
fn base_target_failure_propagates_with_nothing_left_behind() {
    let ctx = FakeContext::new(8, 8);
    let compositor = MultiPassCompositor::new(vec![]).expect("chain");

    ctx.refuse_framebuffer_create(1);

    let err = compositor
        .apply(&ctx, |ctx: &FakeContext| ctx.paint([1, 1, 1, 255]))
        .expect_err("chain must fail");
    assert!(matches!(err, CascadeError::Create(_)), "{err}");

    assert_eq!(ctx.framebuffer_counts().created, 0);
    assert_eq!(ctx.framebuffer_counts().deleted, 0);
    assert_eq!(ctx.texture_counts().created, 1);
    assert_eq!(ctx.texture_counts().deleted, 1);
    assert!(ctx.draws().is_empty());
}

#[test]
fn construction_is_fail_atomic_over_invalid_programs() {
    let ctx = FakeContext::new(8, 8);
    let good = make_program(&ctx);
    let mut bad = make_program(&ctx);
    bad.release(&ctx).expect("release");

    let err = MultiPassCompositor::new(vec![&good, &bad]).expect_err("must reject");
    match err {
        CascadeError::InvalidProgram { index } => assert_eq!(index, 1),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unsupported_offscreen_context_cannot_run_a_chain() {
    let ctx = FakeContext::new(8, 8);
    ctx.set_supports_offscreen(false);

    assert!(!RenderTarget::is_supported(&ctx));

    let err = RenderTarget::create(&ctx, 8, 8).expect_err("must reject");
    assert!(matches!(err, CascadeError::UnsupportedTargets), "{err}");

    let compositor = MultiPassCompositor::new(vec![]).expect("chain");
    let err = compositor
        .apply(&ctx, |ctx: &FakeContext| ctx.paint([1, 1, 1, 255]))
        .expect_err("chain must fail");
    assert!(matches!(err, CascadeError::UnsupportedTargets), "{err}");
    assert_eq!(ctx.texture_counts().created, 0);
}

#[test]
fn non_positive_target_dimensions_are_rejected() {
    let ctx = FakeContext::new(8, 8);

    let err = RenderTarget::create(&ctx, 0, 8).expect_err("zero width");
    assert!(matches!(err, CascadeError::InvalidArgument(_)), "{err}");

    let err = RenderTarget::create(&ctx, 8, -1).expect_err("negative height");
    assert!(matches!(err, CascadeError::InvalidArgument(_)), "{err}");

    assert_eq!(ctx.texture_counts().created, 0);
}

#[test]
fn apply_restores_the_callers_destination_and_viewport() {
    let ctx = FakeContext::new(8, 8);
    let program = make_program(&ctx);
    let compositor = MultiPassCompositor::new(vec![&program]).expect("chain");

    ctx.set_viewport(2, 2, 6, 6);

    compositor
        .apply(&ctx, |ctx: &FakeContext| ctx.paint([5, 5, 5, 255]))
        .expect("apply");

    assert_eq!(ctx.viewport(), [2, 2, 6, 6]);
    assert_eq!(ctx.bound_framebuffer(), None);
}
