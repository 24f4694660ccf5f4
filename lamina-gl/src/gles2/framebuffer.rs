use gl::types::*;

use crate::gles2::GLES2;
use lamina::backend::framebuffer::Framebuffer;
use lamina::backend::{DriverError, IncompleteReason};
use lamina::{FramebufferHandle, TextureHandle};

// OpenGL ES only; missing from the desktop bindings
const FRAMEBUFFER_INCOMPLETE_DIMENSIONS: GLenum = 0x8CD9;

unsafe impl Framebuffer for GLES2 {
  unsafe fn new_framebuffer(&mut self) -> Result<FramebufferHandle, DriverError> {
    let mut handle: GLuint = 0;
    gl::GenFramebuffers(1, &mut handle);

    if handle == 0 {
      Err(DriverError::FramebufferAllocation)
    } else {
      Ok(FramebufferHandle::from_raw(handle))
    }
  }

  unsafe fn bind_framebuffer(&mut self, framebuffer: FramebufferHandle) {
    gl::BindFramebuffer(gl::FRAMEBUFFER, framebuffer.raw());
  }

  unsafe fn attach_color_texture(&mut self, texture: TextureHandle, attachment_index: usize) {
    gl::FramebufferTexture2D(
      gl::FRAMEBUFFER,
      gl::COLOR_ATTACHMENT0 + attachment_index as GLenum,
      gl::TEXTURE_2D,
      texture.raw(),
      0,
    );
  }

  unsafe fn validate_framebuffer(&mut self) -> Result<(), IncompleteReason> {
    get_framebuffer_status()
  }

  unsafe fn destroy_framebuffer(&mut self, framebuffer: FramebufferHandle) {
    let handle = framebuffer.raw();
    gl::DeleteFramebuffers(1, &handle);
  }
}

fn get_framebuffer_status() -> Result<(), IncompleteReason> {
  let status = unsafe { gl::CheckFramebufferStatus(gl::FRAMEBUFFER) };

  match status {
    gl::FRAMEBUFFER_COMPLETE => Ok(()),
    gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => Err(IncompleteReason::IncompleteAttachment),
    gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => Err(IncompleteReason::MissingAttachment),
    FRAMEBUFFER_INCOMPLETE_DIMENSIONS => Err(IncompleteReason::IncompleteDimensions),
    gl::FRAMEBUFFER_UNSUPPORTED => Err(IncompleteReason::Unsupported),
    _ => Err(IncompleteReason::Unknown(status)),
  }
}
