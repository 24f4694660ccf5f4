//! Bookkeeping of live GPU objects.

use std::collections::{HashMap, HashSet};

use crate::backend::framebuffer::Framebuffer;
use crate::backend::texture::Texture;
use crate::backend::DriverError;
use crate::context::GraphicsError;
use crate::handle::{FramebufferHandle, TextureHandle};
use crate::texture::Sampler;

/// Live textures and framebuffers.
///
/// The registry never releases anything on its own; it only refuses to forward a release for a
/// handle it doesn’t know about.
#[derive(Debug, Default)]
pub(crate) struct Registry {
  textures: HashSet<TextureHandle>,
  // framebuffer -> its color texture
  framebuffers: HashMap<FramebufferHandle, TextureHandle>,
}

impl Registry {
  pub(crate) fn is_live_texture(&self, texture: TextureHandle) -> bool {
    self.textures.contains(&texture)
  }

  pub(crate) fn live_textures(&self) -> usize {
    self.textures.len()
  }

  pub(crate) fn live_framebuffers(&self) -> usize {
    self.framebuffers.len()
  }

  /// Color texture of a live framebuffer.
  pub(crate) fn framebuffer_texture(&self, framebuffer: FramebufferHandle) -> Option<TextureHandle> {
    self.framebuffers.get(&framebuffer).copied()
  }

  /// Allocate a texture, leaving it bound with `sampler` applied.
  pub(crate) fn create_texture<B>(
    &mut self,
    backend: &mut B,
    sampler: &Sampler,
  ) -> Result<TextureHandle, DriverError>
  where
    B: ?Sized + Texture,
  {
    let texture = unsafe { backend.new_texture()? };

    unsafe {
      backend.bind_texture(texture);
      backend.set_sampler(sampler);
    }

    self.textures.insert(texture);
    log::debug!("created {}", texture);

    Ok(texture)
  }

  pub(crate) fn destroy_texture<B>(
    &mut self,
    backend: &mut B,
    texture: TextureHandle,
  ) -> Result<(), GraphicsError>
  where
    B: ?Sized + Texture,
  {
    if !self.textures.remove(&texture) {
      log::error!("releasing {} which is not live", texture);
      return Err(GraphicsError::StaleTexture(texture));
    }

    unsafe { backend.destroy_texture(texture) };
    log::debug!("destroyed {}", texture);

    Ok(())
  }

  /// Allocate a framebuffer rendering into `texture`.
  ///
  /// The new framebuffer is left bound; the caller restores the tracked binding.
  pub(crate) fn create_framebuffer<B>(
    &mut self,
    backend: &mut B,
    texture: TextureHandle,
  ) -> Result<FramebufferHandle, GraphicsError>
  where
    B: ?Sized + Framebuffer,
  {
    if !self.is_live_texture(texture) {
      log::error!("attaching {} which is not live", texture);
      return Err(GraphicsError::StaleTexture(texture));
    }

    let framebuffer = unsafe { backend.new_framebuffer()? };

    unsafe {
      backend.bind_framebuffer(framebuffer);
      backend.attach_color_texture(texture, 0);

      if let Err(reason) = backend.validate_framebuffer() {
        backend.destroy_framebuffer(framebuffer);
        return Err(DriverError::from(reason).into());
      }
    }

    self.framebuffers.insert(framebuffer, texture);
    log::debug!("created {} rendering into {}", framebuffer, texture);

    Ok(framebuffer)
  }

  pub(crate) fn delete_framebuffer<B>(
    &mut self,
    backend: &mut B,
    framebuffer: FramebufferHandle,
  ) -> Result<(), GraphicsError>
  where
    B: ?Sized + Framebuffer,
  {
    if self.framebuffers.remove(&framebuffer).is_none() {
      log::error!("releasing {} which is not live", framebuffer);
      return Err(GraphicsError::StaleFramebuffer(framebuffer));
    }

    unsafe { backend.destroy_framebuffer(framebuffer) };
    log::debug!("destroyed {}", framebuffer);

    Ok(())
  }
}
