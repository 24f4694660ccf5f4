//! Framebuffer backend.

use crate::backend::{DriverError, IncompleteReason};
use crate::handle::{FramebufferHandle, TextureHandle};

pub unsafe trait Framebuffer {
  /// Allocate a new framebuffer name. Nothing is bound.
  unsafe fn new_framebuffer(&mut self) -> Result<FramebufferHandle, DriverError>;

  /// Bind a framebuffer as the draw target. [`FramebufferHandle::BACK_BUFFER`] binds the
  /// on-screen framebuffer.
  unsafe fn bind_framebuffer(&mut self, framebuffer: FramebufferHandle);

  /// Attach a texture to a color attachment of the currently bound framebuffer.
  unsafe fn attach_color_texture(&mut self, texture: TextureHandle, attachment_index: usize);

  /// Check the completeness of the currently bound framebuffer.
  unsafe fn validate_framebuffer(&mut self) -> Result<(), IncompleteReason>;

  /// Release a framebuffer name. If it was bound, the driver falls back to the on-screen
  /// framebuffer.
  unsafe fn destroy_framebuffer(&mut self, framebuffer: FramebufferHandle);
}
