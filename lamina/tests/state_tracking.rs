mod common;

use lamina::backend::render_state::ClearBuffers;
use lamina::backend::ErrorCode;
use lamina::layer::identity;
use lamina::trace::Call;
use lamina::shader::ShaderKind;
use lamina::{Bind, Canvas, ContextOpt, FramebufferHandle};

use common::{context, context_with, framebuffer, position};

#[test]
fn redundant_binds_are_elided() {
  let mut ctx = context(100, 100);
  let fb = framebuffer(&mut ctx, 100, 100);

  assert!(ctx.bind_framebuffer(fb, 100, 100, Bind::Cached));
  assert!(!ctx.bind_framebuffer(fb, 100, 100, Bind::Cached));
  assert!(ctx.bind_framebuffer(fb, 100, 50, Bind::Cached));
  assert!(ctx.bind_framebuffer(fb, 100, 50, Bind::Forced));

  assert_eq!(ctx.backend().framebuffer_binds(), vec![fb, fb, fb]);
  assert_eq!(ctx.state().viewport(), Some([0, 0, 100, 50]));
}

#[test]
fn bind_issued_only_on_change() {
  let mut ctx = context(10, 10);
  let a = framebuffer(&mut ctx, 10, 20);
  let b = framebuffer(&mut ctx, 20, 10);
  let sequence = [
    (a, 10, 10),
    (a, 10, 10),
    (b, 10, 10),
    (b, 20, 10),
    (b, 20, 10),
    (a, 10, 10),
    (a, 10, 10),
    (a, 10, 20),
  ];

  let mut last = None;
  let mut expected = 0;

  for &(fb, w, h) in &sequence {
    let issued = ctx.bind_framebuffer(fb, w, h, Bind::Cached);
    assert_eq!(issued, last != Some((fb, w, h)));

    if issued {
      expected += 1;
    }

    last = Some((fb, w, h));
    assert_eq!(ctx.state().viewport(), Some([0, 0, w as i32, h as i32]));
  }

  assert_eq!(ctx.backend().framebuffer_binds().len(), expected);
  assert_eq!(expected, 5);
}

#[test]
fn bind_flushes_against_old_target() {
  let mut ctx = context(100, 100);
  let fb = framebuffer(&mut ctx, 32, 32);
  ctx.bind_default();
  ctx.fill_rect(&identity(), 1., [10., 10.], [1., 0., 0., 1.]);
  assert_eq!(ctx.pending_quads(), 1);

  ctx.bind_framebuffer(fb, 32, 32, Bind::Cached);
  assert_eq!(ctx.pending_quads(), 0);

  let draw = position(&ctx, |c| matches!(c, Call::DrawIndexed { .. })).unwrap();
  let bind = position(&ctx, |c| *c == Call::BindFramebuffer(fb)).unwrap();
  assert!(draw < bind);

  let uniform = position(&ctx, |c| match c {
    Call::SetUniformVec2(_, name, size) => name == "u_ScreenSize" && *size == [100., 100.],
    _ => false,
  });
  assert!(uniform.is_some());
}

#[test]
fn check_error_drains_queue() {
  let mut ctx = context(1, 1);
  ctx.backend_mut().push_error(ErrorCode::InvalidValue);
  ctx.backend_mut().push_error(ErrorCode::Other(0x1234));

  assert_eq!(ctx.check_error("test"), 2);
  assert_eq!(ctx.check_error("test"), 0);
}

#[test]
fn check_error_disabled() {
  let mut ctx = context_with(ContextOpt::default().set_check_errors(false));
  ctx.backend_mut().push_error(ErrorCode::InvalidEnum);

  assert_eq!(ctx.check_error("test"), 0);
  assert_eq!(ctx.backend().pending_errors(), 1);
}

#[test]
fn bind_drains_errors_first() {
  let mut ctx = context(1, 1);
  ctx.backend_mut().push_error(ErrorCode::OutOfMemory);

  ctx.bind_default();
  assert_eq!(ctx.backend().pending_errors(), 0);
}

#[test]
fn invalidate_forces_rebind() {
  let mut ctx = context(8, 8);

  assert!(ctx.bind_default());
  assert!(!ctx.bind_default());

  ctx.invalidate();
  assert_eq!(ctx.state().bound_target(), None);
  assert!(ctx.bind_default());
}

#[test]
fn invalidate_forgets_active_pipeline() {
  let mut ctx = context(8, 8);
  ctx.bind_default();
  ctx.use_shader(Some(ShaderKind::Texture));
  ctx.fill_rect(&identity(), 1., [2., 2.], [0., 0., 1., 1.]);

  ctx.invalidate();
  assert_eq!(ctx.pending_quads(), 0);
  assert!(ctx.backend().calls().contains(&Call::Invalidate));

  ctx.backend_mut().clear_calls();
  ctx.use_shader(Some(ShaderKind::Color));
  ctx.use_shader(Some(ShaderKind::Color));

  let backend = ctx.backend();
  assert_eq!(backend.count(|c| matches!(c, Call::UseProgram(_))), 1);
  assert_eq!(backend.count(|c| matches!(c, Call::DrawIndexed { .. })), 0);
}

#[test]
fn dead_framebuffers_are_not_bound() {
  let mut ctx = context(8, 8);
  let fb = framebuffer(&mut ctx, 4, 4);
  ctx.delete_framebuffer(fb).unwrap();
  ctx.backend_mut().clear_calls();

  assert!(!ctx.bind_framebuffer(fb, 4, 4, Bind::Cached));
  assert!(!ctx.bind_framebuffer(fb, 4, 4, Bind::Forced));
  assert!(!ctx.bind_framebuffer(FramebufferHandle::from_raw(42), 4, 4, Bind::Forced));

  assert!(ctx.backend().framebuffer_binds().is_empty());
  assert_eq!(ctx.state().bound_target(), None);
}

#[test]
fn view_size_change_rebinds_back_buffer() {
  let mut ctx = context(8, 8);
  ctx.bind_default();

  ctx.set_view_size(16, 9);
  assert!(ctx.bind_default());
  assert_eq!(ctx.state().viewport(), Some([0, 0, 16, 9]));
}

#[test]
fn clear_color_is_cached() {
  let mut ctx = context(8, 8);

  ctx.clear(1., 0., 0., 1.);
  ctx.clear(1., 0., 0., 1.);
  ctx.clear(0., 1., 0., 1.);

  let backend = ctx.backend();
  assert_eq!(backend.count(|c| matches!(c, Call::SetClearColor(_))), 2);
  assert_eq!(backend.count(|c| *c == Call::Clear(ClearBuffers::COLOR)), 3);
  assert_eq!(ctx.state().clear_color(), Some([0., 1., 0., 1.]));
}
