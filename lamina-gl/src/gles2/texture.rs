use gl::types::*;
use std::ptr;

use crate::gles2::GLES2;
use lamina::backend::texture::Texture;
use lamina::backend::DriverError;
use lamina::texture::{MagFilter, MinFilter, Sampler, Wrap};
use lamina::TextureHandle;

unsafe impl Texture for GLES2 {
  unsafe fn new_texture(&mut self) -> Result<TextureHandle, DriverError> {
    let mut handle: GLuint = 0;
    gl::GenTextures(1, &mut handle);

    if handle == 0 {
      Err(DriverError::TextureAllocation)
    } else {
      Ok(TextureHandle::from_raw(handle))
    }
  }

  unsafe fn bind_texture(&mut self, texture: TextureHandle) {
    self.state.bind_texture(texture.raw());
  }

  unsafe fn set_sampler(&mut self, sampler: &Sampler) {
    let target = gl::TEXTURE_2D;

    gl::TexParameteri(
      target,
      gl::TEXTURE_WRAP_S,
      opengl_wrap(sampler.wrap_s) as GLint,
    );
    gl::TexParameteri(
      target,
      gl::TEXTURE_WRAP_T,
      opengl_wrap(sampler.wrap_t) as GLint,
    );
    gl::TexParameteri(
      target,
      gl::TEXTURE_MIN_FILTER,
      opengl_min_filter(sampler.min_filter) as GLint,
    );
    gl::TexParameteri(
      target,
      gl::TEXTURE_MAG_FILTER,
      opengl_mag_filter(sampler.mag_filter) as GLint,
    );
  }

  unsafe fn texture_storage(&mut self, size: [u32; 2], texels: Option<&[u8]>) {
    let data = texels.map_or(ptr::null(), |texels| texels.as_ptr() as *const GLvoid);

    gl::TexImage2D(
      gl::TEXTURE_2D,
      0,
      gl::RGBA as GLint,
      size[0] as GLsizei,
      size[1] as GLsizei,
      0,
      gl::RGBA,
      gl::UNSIGNED_BYTE,
      data,
    );
  }

  unsafe fn destroy_texture(&mut self, texture: TextureHandle) {
    let handle = texture.raw();

    gl::DeleteTextures(1, &handle);
    self.state.forget_texture(handle);
  }
}

fn opengl_wrap(wrap: Wrap) -> GLenum {
  match wrap {
    Wrap::ClampToEdge => gl::CLAMP_TO_EDGE,
    Wrap::Repeat => gl::REPEAT,
    Wrap::MirroredRepeat => gl::MIRRORED_REPEAT,
  }
}

fn opengl_min_filter(filter: MinFilter) -> GLenum {
  match filter {
    MinFilter::Nearest => gl::NEAREST,
    MinFilter::Linear => gl::LINEAR,
  }
}

fn opengl_mag_filter(filter: MagFilter) -> GLenum {
  match filter {
    MagFilter::Nearest => gl::NEAREST,
    MagFilter::Linear => gl::LINEAR,
  }
}
