#![allow(dead_code)]

use lamina::trace::{Call, TraceBackend};
use lamina::{ContextOpt, FramebufferHandle, GLContext};

/// A context over a fresh trace backend, with the setup calls already cleared.
pub fn context(width: u32, height: u32) -> GLContext<TraceBackend> {
  context_with(ContextOpt::default().set_view_size([width, height]))
}

pub fn context_with(opts: ContextOpt) -> GLContext<TraceBackend> {
  let _ = env_logger::builder().is_test(true).try_init();

  let mut ctx = GLContext::new(TraceBackend::new(), opts).expect("context creation");
  ctx.backend_mut().clear_calls();
  ctx
}

/// A live framebuffer over a fresh texture, with the creation calls cleared.
pub fn framebuffer(
  ctx: &mut GLContext<TraceBackend>,
  width: u32,
  height: u32,
) -> FramebufferHandle {
  let texture = ctx
    .create_texture_sized(width, height, false, false)
    .expect("texture creation");
  let fb = ctx.create_framebuffer(texture).expect("framebuffer creation");
  ctx.backend_mut().clear_calls();
  fb
}

/// Index of the first recorded call matching a predicate.
pub fn position<F>(ctx: &GLContext<TraceBackend>, f: F) -> Option<usize>
where
  F: Fn(&Call) -> bool,
{
  ctx.backend().calls().iter().position(f)
}

/// Vertices of every draw call, in order.
pub fn draws(ctx: &GLContext<TraceBackend>) -> Vec<Vec<f32>> {
  ctx
    .backend()
    .calls()
    .iter()
    .filter_map(|c| match c {
      Call::DrawIndexed { vertices, .. } => Some(vertices.clone()),
      _ => None,
    })
    .collect()
}
