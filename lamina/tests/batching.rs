mod common;

use lamina::layer::{identity, translation, FULL_REGION};
use lamina::shader::MAX_QUADS;
use lamina::trace::Call;
use lamina::{Canvas, ShaderKind, TextureHandle};

use common::{context, draws, position};

const RED: [f32; 4] = [1., 0., 0., 1.];

#[test]
fn same_shader_twice_flushes_once() {
  let mut ctx = context(64, 64);
  ctx.bind_default();
  ctx.fill_rect(&identity(), 1., [4., 4.], RED);
  assert_eq!(ctx.active_shader(), Some(ShaderKind::Color));

  assert!(ctx.use_shader(Some(ShaderKind::Texture)));
  assert!(!ctx.use_shader(Some(ShaderKind::Texture)));

  assert_eq!(ctx.backend().draw_calls(), 1);
  assert_eq!(ctx.active_shader(), Some(ShaderKind::Texture));
}

#[test]
fn no_shader_flushes_only_pending_batches() {
  let mut ctx = context(64, 64);

  assert!(!ctx.use_shader(None));

  ctx.use_shader(Some(ShaderKind::Color));
  assert!(!ctx.use_shader(None));

  ctx.fill_rect(&identity(), 1., [4., 4.], RED);
  assert!(ctx.use_shader(None));
  assert_eq!(ctx.backend().draw_calls(), 1);
  assert_eq!(ctx.pending_quads(), 0);
}

#[test]
fn switching_programs_binds_them() {
  let mut ctx = context(64, 64);

  ctx.use_shader(Some(ShaderKind::Color));
  ctx.use_shader(Some(ShaderKind::Color));
  ctx.use_shader(Some(ShaderKind::Texture));

  assert_eq!(ctx.backend().count(|c| matches!(c, Call::UseProgram(_))), 2);
}

#[test]
fn texture_change_flushes() {
  let mut ctx = context(64, 64);
  let a = ctx.create_texture(false, false).unwrap();
  let b = ctx.create_texture(false, false).unwrap();
  ctx.backend_mut().clear_calls();

  ctx.draw_texture(a, &identity(), 1., [8., 8.], FULL_REGION);
  ctx.draw_texture(a, &translation(8., 0.), 1., [8., 8.], FULL_REGION);
  assert_eq!(ctx.backend().draw_calls(), 0);

  ctx.draw_texture(b, &identity(), 1., [8., 8.], FULL_REGION);
  assert_eq!(ctx.backend().draw_calls(), 1);
  assert_eq!(ctx.pending_quads(), 1);

  // the flushed batch sampled `a`
  let bind = position(&ctx, |c| *c == Call::BindTexture(a)).unwrap();
  let draw = position(&ctx, |c| matches!(c, Call::DrawIndexed { .. })).unwrap();
  assert!(bind < draw);

  let vertices = &draws(&ctx)[0];
  assert_eq!(vertices.len(), 2 * 4 * 5);
}

#[test]
fn texture_vertices() {
  let mut ctx = context(64, 64);
  let texture = ctx.create_texture(false, false).unwrap();

  ctx.draw_texture(
    texture,
    &translation(2., 3.),
    0.5,
    [4., 2.],
    [0., 0., 0.5, 1.],
  );
  ctx.flush();

  assert_eq!(
    draws(&ctx)[0],
    vec![
      2., 3., 0., 0., 0.5, //
      6., 3., 0.5, 0., 0.5, //
      2., 5., 0., 1., 0.5, //
      6., 5., 0.5, 1., 0.5,
    ]
  );
}

#[test]
fn full_batch_flushes() {
  let mut ctx = context(64, 64);

  for _ in 0..=MAX_QUADS {
    ctx.fill_rect(&identity(), 1., [1., 1.], RED);
  }

  assert_eq!(ctx.backend().draw_calls(), 1);
  assert_eq!(ctx.pending_quads(), 1);

  let indices = ctx.backend().calls().iter().find_map(|c| match c {
    Call::DrawIndexed { indices, .. } => Some(indices.len()),
    _ => None,
  });
  assert_eq!(indices, Some(MAX_QUADS * 6));
}

#[test]
fn colors_are_premultiplied() {
  let mut ctx = context(64, 64);

  ctx.fill_rect(&identity(), 0.5, [1., 1.], [1., 1., 1., 0.5]);
  ctx.flush();

  assert_eq!(draws(&ctx)[0][..6], [0., 0., 0.25, 0.25, 0.25, 0.25]);
}

#[test]
fn upload_to_sampled_texture_flushes() {
  let mut ctx = context(64, 64);
  let sampled = ctx.create_texture(false, false).unwrap();
  let other = ctx.create_texture(false, false).unwrap();

  ctx.draw_texture(sampled, &identity(), 1., [1., 1.], FULL_REGION);

  ctx.upload_texture(other, [1, 1], &[0; 4]).unwrap();
  assert_eq!(ctx.backend().draw_calls(), 0);

  ctx.upload_texture(sampled, [1, 1], &[0; 4]).unwrap();
  assert_eq!(ctx.backend().draw_calls(), 1);

  let draw = position(&ctx, |c| matches!(c, Call::DrawIndexed { .. })).unwrap();
  let storages: Vec<_> = ctx
    .backend()
    .calls()
    .iter()
    .enumerate()
    .filter(|(_, c)| matches!(c, Call::TextureStorage(_, Some(4))))
    .map(|(i, _)| i)
    .collect();
  assert_eq!(storages.len(), 2);
  assert!(storages[0] < draw && draw < storages[1]);
}

#[test]
fn destroying_sampled_texture_flushes() {
  let mut ctx = context(64, 64);
  let texture = ctx.create_texture(false, false).unwrap();

  ctx.draw_texture(texture, &identity(), 1., [1., 1.], FULL_REGION);
  ctx.destroy_texture(texture).unwrap();

  let draw = position(&ctx, |c| matches!(c, Call::DrawIndexed { .. })).unwrap();
  let destroy = position(&ctx, |c| *c == Call::DestroyTexture(texture)).unwrap();
  assert!(draw < destroy);
}

#[test]
fn stale_texture_is_not_drawn() {
  let mut ctx = context(64, 64);

  ctx.draw_texture(TextureHandle::from_raw(99), &identity(), 1., [1., 1.], FULL_REGION);
  assert_eq!(ctx.pending_quads(), 0);
  assert_eq!(ctx.active_shader(), None);
}

#[test]
fn clear_flushes_pending_quads() {
  let mut ctx = context(64, 64);

  ctx.fill_rect(&identity(), 1., [1., 1.], RED);
  ctx.clear(0., 0., 0., 1.);

  let draw = position(&ctx, |c| matches!(c, Call::DrawIndexed { .. })).unwrap();
  let clear = position(&ctx, |c| matches!(c, Call::Clear(_))).unwrap();
  assert!(draw < clear);
}
