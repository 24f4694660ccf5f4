//! Graphics state tracking.
//!
//! The [`GraphicsState`] remembers what the driver currently has bound (framebuffer, its
//! size, viewport, clear color) so that redundant commands are never issued. Consecutive
//! paints targeting the same surface then only cost a comparison.
//!
//! The tracked state must always mirror the hardware: nothing may bind a framebuffer without
//! going through the tracker. Code that has to touch the driver behind its back (a platform
//! recreating a lost context, for instance) must call [`GraphicsState::invalidate`] afterwards.

use crate::backend::render_state::RenderState;
use crate::backend::Backend;
use crate::handle::FramebufferHandle;
use crate::shader::Shaders;

/// Cached value.
///
/// A cached value is used to prevent issuing costy GPU commands if we know the target value is
/// already set to what the command tries to set. For instance, if you ask to bind the
/// framebuffer `3` once, that value will be set on the GPU and cached on our side. Later, if no
/// other binding has occurred, asking to bind the framebuffer `3` again doesn’t have to perform
/// anything GPU-wise.
///
/// Note: do not confuse [`Cached`] with [`Bind`]. The latter is used to either use the regular
/// cache mechanism or override it to force a value to be written. It cannot be used to
/// invalidate a setting for later use.
#[derive(Debug)]
struct Cached<T>(Option<T>)
where
  T: PartialEq;

impl<T> Cached<T>
where
  T: PartialEq,
{
  /// A value nothing is known about yet.
  fn unknown() -> Self {
    Cached(None)
  }

  /// Explicitly invalidate a value.
  ///
  /// This is necessary when we want to be able to force a GPU command to run.
  fn invalidate(&mut self) {
    self.0 = None;
  }

  fn set(&mut self, value: T) {
    self.0 = Some(value);
  }

  fn get(&self) -> Option<&T> {
    self.0.as_ref()
  }

  /// Check if the cached value is invalid regarding a value.
  ///
  /// A non-cached value (i.e. empty) is always invalid whatever compared value. If a value is
  /// already cached, then it’s invalid if it’s not equal ([`PartialEq`]) to the input value.
  fn is_invalid(&self, new_val: &T) -> bool {
    match &self.0 {
      Some(ref t) => t != new_val,
      _ => true,
    }
  }
}

/// Should the binding be cached or forced to the provided value?
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Bind {
  Forced,
  Cached,
}

/// A framebuffer along with the size it is rendered at.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct RenderTarget {
  pub framebuffer: FramebufferHandle,
  pub size: [u32; 2],
}

/// The graphics state.
///
/// Owned by a [`GLContext`](crate::context::GLContext); there is one per driver context.
#[derive(Debug)]
pub struct GraphicsState {
  target: Cached<RenderTarget>,
  viewport: Cached<[i32; 4]>,
  clear_color: Cached<[f32; 4]>,

  // size of the on-screen framebuffer
  view_size: [u32; 2],

  check_errors: bool,
}

impl GraphicsState {
  /// Nothing is assumed about the hardware: the first commands are always issued.
  pub(crate) fn new(view_size: [u32; 2], check_errors: bool) -> Self {
    GraphicsState {
      target: Cached::unknown(),
      viewport: Cached::unknown(),
      clear_color: Cached::unknown(),
      view_size,
      check_errors,
    }
  }

  /// Currently bound render target, if known.
  pub fn bound_target(&self) -> Option<RenderTarget> {
    self.target.get().copied()
  }

  /// Size of the currently bound render target, falling back to the view size when unknown.
  pub fn target_size(&self) -> [u32; 2] {
    self.target.get().map_or(self.view_size, |t| t.size)
  }

  /// Last viewport set, if known.
  pub fn viewport(&self) -> Option<[i32; 4]> {
    self.viewport.get().copied()
  }

  /// Last clear color set, if known.
  pub fn clear_color(&self) -> Option<[f32; 4]> {
    self.clear_color.get().copied()
  }

  /// Size of the on-screen framebuffer.
  pub fn view_size(&self) -> [u32; 2] {
    self.view_size
  }

  pub(crate) fn set_view_size(&mut self, size: [u32; 2]) {
    self.view_size = size;
  }

  pub fn check_errors(&self) -> bool {
    self.check_errors
  }

  /// Forget everything about the hardware state.
  pub fn invalidate(&mut self) {
    self.target.invalidate();
    self.viewport.invalidate();
    self.clear_color.invalidate();
  }

  /// Forget which framebuffer is bound.
  pub(crate) fn invalidate_framebuffer(&mut self) {
    self.target.invalidate();
  }

  /// Drain and log every pending driver error, tagging them with `op`.
  ///
  /// Does nothing when error checking is disabled. Returns the number of errors drained.
  pub(crate) fn check_error<B>(&self, backend: &mut B, op: &str) -> usize
  where
    B: ?Sized + RenderState,
  {
    if !self.check_errors {
      return 0;
    }

    let mut drained = 0;

    while let Some(code) = unsafe { backend.next_error() } {
      log::error!("{}: glError {}", op, code);
      drained += 1;
    }

    drained
  }

  /// Bind a render target.
  ///
  /// Unless forced, nothing happens if the target is already bound. Otherwise, pending driver
  /// errors are checked, the active batch is flushed against the old target, then the target
  /// is bound and the viewport is set to cover it.
  ///
  /// Returns whether the target was bound.
  pub(crate) fn bind_framebuffer<B>(
    &mut self,
    backend: &mut B,
    shaders: &mut Shaders,
    target: RenderTarget,
    bind: Bind,
  ) -> bool
  where
    B: ?Sized + Backend,
  {
    if bind == Bind::Cached && !self.target.is_invalid(&target) {
      return false;
    }

    self.check_error(backend, "bind_framebuffer");
    shaders.flush(backend, self.target_size());

    let [width, height] = target.size;
    let viewport = [0, 0, width as i32, height as i32];

    unsafe {
      backend.bind_framebuffer(target.framebuffer);
      backend.set_viewport(viewport);
    }

    log::trace!("bound {} at {}x{}", target.framebuffer, width, height);

    self.viewport.set(viewport);
    self.target.set(target);

    true
  }

  /// Rebind the tracked framebuffer after something bound another one internally.
  ///
  /// If no framebuffer is tracked, there is nothing to restore and the next bind will be
  /// issued anyway.
  pub(crate) fn restore_framebuffer<B>(&mut self, backend: &mut B)
  where
    B: ?Sized + Backend,
  {
    if let Some(target) = self.target.get() {
      unsafe { backend.bind_framebuffer(target.framebuffer) };
    }
  }

  pub(crate) fn set_clear_color<B>(&mut self, backend: &mut B, color: [f32; 4])
  where
    B: ?Sized + RenderState,
  {
    if self.clear_color.is_invalid(&color) {
      unsafe { backend.set_clear_color(color) };
      self.clear_color.set(color);
    }
  }
}
