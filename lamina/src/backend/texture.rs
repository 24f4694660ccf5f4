//! Texture backend.

use crate::backend::DriverError;
use crate::handle::TextureHandle;
use crate::texture::Sampler;

pub unsafe trait Texture {
  /// Allocate a new texture name. Nothing is bound.
  unsafe fn new_texture(&mut self) -> Result<TextureHandle, DriverError>;

  /// Bind a texture to the 2D target of the active texture unit.
  unsafe fn bind_texture(&mut self, texture: TextureHandle);

  /// Apply sampling parameters to the currently bound texture.
  unsafe fn set_sampler(&mut self, sampler: &Sampler);

  /// (Re)create the RGBA8 storage of the currently bound texture.
  ///
  /// With `texels` set to `None`, the content is left undefined. Otherwise, `texels` holds
  /// exactly `width * height` premultiplied RGBA8 texels, row by row.
  unsafe fn texture_storage(&mut self, size: [u32; 2], texels: Option<&[u8]>);

  /// Release a texture name.
  unsafe fn destroy_texture(&mut self, texture: TextureHandle);
}
