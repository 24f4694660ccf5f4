mod common;

use lamina::backend::{DriverError, IncompleteReason};
use lamina::shader::{ProgramError, StageType};
use lamina::texture::{Sampler, TextureError, Wrap};
use lamina::trace::{Call, TraceBackend};
use lamina::{Bind, ContextOpt, FramebufferHandle, GLContext, GraphicsError};

use common::{context, position};

#[test]
fn texture_sampling_follows_repeat_flags() {
  let mut ctx = context(8, 8);
  let texture = ctx.create_texture(true, false).unwrap();

  let calls = ctx.backend().calls();
  assert_eq!(calls[0], Call::NewTexture(texture));
  assert_eq!(calls[1], Call::BindTexture(texture));

  match calls[2] {
    Call::SetSampler(Sampler { wrap_s, wrap_t, .. }) => {
      assert_eq!(wrap_s, Wrap::Repeat);
      assert_eq!(wrap_t, Wrap::ClampToEdge);
    }

    ref call => panic!("unexpected call {:?}", call),
  }
}

#[test]
fn sized_texture_gets_empty_storage() {
  let mut ctx = context(8, 8);
  ctx.create_texture_sized(32, 16, false, false).unwrap();

  assert_eq!(
    ctx.backend().calls().last(),
    Some(&Call::TextureStorage([32, 16], None))
  );
  assert_eq!(ctx.live_textures(), 1);
}

#[test]
fn double_release_is_reported() {
  let mut ctx = context(8, 8);
  let texture = ctx.create_texture(false, false).unwrap();

  assert_eq!(ctx.destroy_texture(texture), Ok(()));
  assert_eq!(
    ctx.destroy_texture(texture),
    Err(GraphicsError::StaleTexture(texture))
  );

  let destroys = ctx
    .backend()
    .count(|c| *c == Call::DestroyTexture(texture));
  assert_eq!(destroys, 1);
  assert_eq!(ctx.live_textures(), 0);
}

#[test]
fn framebuffer_lifecycle() {
  let mut ctx = context(8, 8);
  let texture = ctx.create_texture_sized(64, 64, false, false).unwrap();
  let fb = ctx.create_framebuffer(texture).unwrap();

  assert!(ctx
    .backend()
    .calls()
    .contains(&Call::AttachColorTexture(texture, 0)));
  assert_eq!(ctx.framebuffer_texture(fb), Some(texture));
  assert_eq!(ctx.live_framebuffers(), 1);

  assert_eq!(ctx.delete_framebuffer(fb), Ok(()));
  assert_eq!(
    ctx.delete_framebuffer(fb),
    Err(GraphicsError::StaleFramebuffer(fb))
  );
  assert_eq!(ctx.backend().count(|c| *c == Call::DestroyFramebuffer(fb)), 1);
}

#[test]
fn creating_framebuffer_restores_binding() {
  let mut ctx = context(8, 8);
  let texture = ctx.create_texture_sized(4, 4, false, false).unwrap();
  ctx.bind_default();

  let fb = ctx.create_framebuffer(texture).unwrap();

  assert_eq!(
    ctx.backend().framebuffer_binds(),
    vec![
      FramebufferHandle::BACK_BUFFER,
      fb,
      FramebufferHandle::BACK_BUFFER
    ]
  );
  assert_eq!(
    ctx.state().bound_target().map(|t| t.framebuffer),
    Some(FramebufferHandle::BACK_BUFFER)
  );

  // still tracked: nothing to do
  assert!(!ctx.bind_default());
}

#[test]
fn incomplete_framebuffer_is_released() {
  let mut ctx = context(8, 8);
  let texture = ctx.create_texture(false, false).unwrap();
  ctx
    .backend_mut()
    .set_incomplete(Some(IncompleteReason::IncompleteAttachment));

  let result = ctx.create_framebuffer(texture);
  assert_eq!(
    result,
    Err(GraphicsError::Driver(DriverError::IncompleteFramebuffer(
      IncompleteReason::IncompleteAttachment
    )))
  );

  assert_eq!(ctx.live_framebuffers(), 0);
  assert!(position(&ctx, |c| matches!(c, Call::DestroyFramebuffer(_))).is_some());
}

#[test]
fn framebuffer_needs_live_texture() {
  let mut ctx = context(8, 8);
  let texture = ctx.create_texture(false, false).unwrap();
  ctx.destroy_texture(texture).unwrap();

  assert_eq!(
    ctx.create_framebuffer(texture),
    Err(GraphicsError::StaleTexture(texture))
  );
  assert!(position(&ctx, |c| matches!(c, Call::NewFramebuffer(_))).is_none());
}

#[test]
fn deleting_bound_framebuffer_invalidates_target() {
  let mut ctx = context(8, 8);
  let texture = ctx.create_texture_sized(4, 4, false, false).unwrap();
  let fb = ctx.create_framebuffer(texture).unwrap();

  ctx.bind_framebuffer(fb, 4, 4, Bind::Cached);
  ctx.delete_framebuffer(fb).unwrap();

  assert_eq!(ctx.state().bound_target(), None);
  assert!(ctx.bind_default());
}

#[test]
fn back_buffer_is_never_released() {
  let mut ctx = context(8, 8);

  assert_eq!(
    ctx.delete_framebuffer(FramebufferHandle::BACK_BUFFER),
    Err(GraphicsError::StaleFramebuffer(FramebufferHandle::BACK_BUFFER))
  );
  assert!(ctx.backend().calls().is_empty());
}

#[test]
fn allocation_failures() {
  let mut ctx = context(8, 8);

  ctx.backend_mut().fail_textures(true);
  assert_eq!(
    ctx.create_texture(false, false),
    Err(GraphicsError::Driver(DriverError::TextureAllocation))
  );

  ctx.backend_mut().fail_textures(false);
  let texture = ctx.create_texture(false, false).unwrap();

  ctx.backend_mut().fail_framebuffers(true);
  assert_eq!(
    ctx.create_framebuffer(texture),
    Err(GraphicsError::Driver(DriverError::FramebufferAllocation))
  );
}

#[test]
fn upload_checks_texel_count() {
  let mut ctx = context(8, 8);
  let texture = ctx.create_texture(false, false).unwrap();

  assert_eq!(
    ctx.upload_texture(texture, [1, 1], &[0; 3]),
    Err(GraphicsError::Texture(TextureError::WrongTexelCount(4, 3)))
  );
}

#[test]
fn upload_image() {
  let mut ctx = context(8, 8);
  let texture = ctx.create_texture(false, false).unwrap();
  let image = image::RgbaImage::from_pixel(3, 2, image::Rgba([255, 255, 255, 128]));

  ctx.upload_image(texture, &image).unwrap();

  assert_eq!(
    ctx.backend().calls().last(),
    Some(&Call::TextureStorage([3, 2], Some(24)))
  );
}

#[test]
fn program_failure_surfaces() {
  let _ = env_logger::builder().is_test(true).try_init();

  let mut backend = TraceBackend::new();
  let error = ProgramError::StageCompilationFailed(StageType::FragmentShader, "oops".to_owned());
  backend.fail_programs(Some(error.clone()));

  let result = GLContext::new(backend, ContextOpt::default());
  assert_eq!(result.err(), Some(GraphicsError::Program(error)));
}

#[test]
fn dispose_releases_programs() {
  let mut ctx = context(8, 8);
  ctx.create_texture(false, false).unwrap();

  let backend = ctx.dispose();
  assert_eq!(backend.live_programs(), 0);
  assert_eq!(backend.count(|c| matches!(c, Call::DestroyProgram(_))), 2);
}
