//! Shader pipelines and the batching protocol.
//!
//! Two pipelines are available: one drawing textured quads and one drawing flat colored quads.
//! Each of them owns a batch of quads waiting to be drawn. Only one pipeline is *active* at a
//! time, and only the active one may hold pending quads:
//!
//! - switching to the other pipeline, or to no pipeline at all, flushes the active batch
//!   first;
//! - the texture pipeline also flushes when asked to draw with a texture other than the one its
//!   batch samples;
//! - a batch reaching [`MAX_QUADS`] is flushed before growing further.
//!
//! A flush is a single indexed draw call. Correctness requires flushing before anything that
//! would make the batch’s assumptions stale (the bound framebuffer, the current program or the
//! content of the sampled texture) and the [`GLContext`] takes care of that.
//!
//! [`GLContext`]: crate::context::GLContext

mod batch;
pub mod source;

use std::error;
use std::fmt;

pub use self::batch::MAX_QUADS;
use self::batch::QuadBatch;
use crate::backend::shader::Shader;
use crate::backend::texture::Texture;
use crate::handle::{ProgramHandle, TextureHandle};

/// A shader stage type.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StageType {
  /// Vertex shader.
  VertexShader,
  /// Fragment shader.
  FragmentShader,
}

impl fmt::Display for StageType {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      StageType::VertexShader => f.write_str("vertex shader"),
      StageType::FragmentShader => f.write_str("fragment shader"),
    }
  }
}

/// Errors that a program can generate.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProgramError {
  /// A shader stage failed to compile. The `String` is the driver’s log.
  StageCompilationFailed(StageType, String),
  /// Program link failed. You can inspect the reason by looking at the contained `String`.
  LinkFailed(String),
  /// The driver couldn’t give us a new shader or program name.
  ProgramAllocation,
}

impl fmt::Display for ProgramError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      ProgramError::StageCompilationFailed(ref ty, ref r) => {
        write!(f, "{} compilation error: {}", ty, r)
      }

      ProgramError::LinkFailed(ref s) => write!(f, "shader program failed to link: {}", s),

      ProgramError::ProgramAllocation => f.write_str("cannot allocate shader program"),
    }
  }
}

impl error::Error for ProgramError {}

/// A `f32` vertex attribute of an interleaved layout.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VertexAttrib {
  /// Name in the vertex shader.
  pub name: &'static str,
  /// Number of `f32` components.
  pub size: usize,
}

impl VertexAttrib {
  /// Number of `f32` a vertex of `attribs` spans.
  pub fn stride(attribs: &[VertexAttrib]) -> usize {
    attribs.iter().map(|a| a.size).sum()
  }
}

/// Layout of the texture pipeline: position, texture coordinates, opacity.
pub const TEXTURE_ATTRIBS: &[VertexAttrib] = &[
  VertexAttrib {
    name: "a_Position",
    size: 2,
  },
  VertexAttrib {
    name: "a_TexCoord",
    size: 2,
  },
  VertexAttrib {
    name: "a_Alpha",
    size: 1,
  },
];

/// Layout of the color pipeline: position, premultiplied color.
pub const COLOR_ATTRIBS: &[VertexAttrib] = &[
  VertexAttrib {
    name: "a_Position",
    size: 2,
  },
  VertexAttrib {
    name: "a_Color",
    size: 4,
  },
];

/// Name of the uniform receiving the bound framebuffer size.
pub const SCREEN_SIZE_UNIFORM: &str = "u_ScreenSize";

/// The two pipelines.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ShaderKind {
  /// Textured quads.
  Texture,
  /// Flat colored quads.
  Color,
}

#[derive(Debug)]
struct TextureShader {
  program: ProgramHandle,
  batch: QuadBatch,
  // texture sampled by every quad of the batch
  texture: Option<TextureHandle>,
}

#[derive(Debug)]
struct ColorShader {
  program: ProgramHandle,
  batch: QuadBatch,
}

/// Both pipelines and the record of which one is active.
#[derive(Debug)]
pub(crate) struct Shaders {
  texture: TextureShader,
  color: ColorShader,
  active: Option<ShaderKind>,
}

impl Shaders {
  pub(crate) fn new<B>(backend: &mut B) -> Result<Self, ProgramError>
  where
    B: ?Sized + Shader,
  {
    let texture = unsafe {
      backend.new_program(source::TEXTURE_VS, source::TEXTURE_FS, TEXTURE_ATTRIBS)?
    };
    let color = match unsafe {
      backend.new_program(source::COLOR_VS, source::COLOR_FS, COLOR_ATTRIBS)
    } {
      Ok(color) => color,
      Err(e) => {
        unsafe { backend.destroy_program(texture) };
        return Err(e);
      }
    };

    Ok(Shaders {
      texture: TextureShader {
        program: texture,
        batch: QuadBatch::new(VertexAttrib::stride(TEXTURE_ATTRIBS)),
        texture: None,
      },
      color: ColorShader {
        program: color,
        batch: QuadBatch::new(VertexAttrib::stride(COLOR_ATTRIBS)),
      },
      active: None,
    })
  }

  pub(crate) fn active(&self) -> Option<ShaderKind> {
    self.active
  }

  pub(crate) fn program(&self, kind: ShaderKind) -> ProgramHandle {
    match kind {
      ShaderKind::Texture => self.texture.program,
      ShaderKind::Color => self.color.program,
    }
  }

  /// Number of quads waiting in the active batch.
  pub(crate) fn pending_quads(&self) -> usize {
    match self.active {
      Some(ShaderKind::Texture) => self.texture.batch.quads(),
      Some(ShaderKind::Color) => self.color.batch.quads(),
      None => 0,
    }
  }

  /// Whether the pending texture batch samples `texture`.
  pub(crate) fn samples(&self, texture: TextureHandle) -> bool {
    !self.texture.batch.is_empty() && self.texture.texture == Some(texture)
  }

  /// Switch pipelines, flushing the active one if it changes.
  ///
  /// Returns whether a draw call was issued.
  pub(crate) fn use_shader<B>(
    &mut self,
    backend: &mut B,
    kind: Option<ShaderKind>,
    target_size: [u32; 2],
  ) -> bool
  where
    B: ?Sized + Shader + Texture,
  {
    if self.active == kind {
      return false;
    }

    let flushed = self.flush(backend, target_size);
    self.active = kind;

    if let Some(kind) = kind {
      unsafe { backend.use_program(self.program(kind)) };
    }

    flushed
  }

  /// Flush the active batch, if any. The active pipeline stays active.
  pub(crate) fn flush<B>(&mut self, backend: &mut B, target_size: [u32; 2]) -> bool
  where
    B: ?Sized + Shader + Texture,
  {
    match self.active {
      Some(ShaderKind::Texture) => self.texture.flush(backend, target_size),
      Some(ShaderKind::Color) => self.color.flush(backend, target_size),
      None => false,
    }
  }

  /// Queue a textured quad. `corners` are the transformed corners (top-left, top-right,
  /// bottom-left, bottom-right) and `region` the `[u0, v0, u1, v1]` texture coordinates.
  pub(crate) fn add_texture_quad<B>(
    &mut self,
    backend: &mut B,
    target_size: [u32; 2],
    texture: TextureHandle,
    corners: [[f32; 2]; 4],
    region: [f32; 4],
    alpha: f32,
  ) where
    B: ?Sized + Shader + Texture,
  {
    self.use_shader(backend, Some(ShaderKind::Texture), target_size);

    let shader = &mut self.texture;
    if shader.texture != Some(texture) || shader.batch.is_full() {
      shader.flush(backend, target_size);
      shader.texture = Some(texture);
    }

    let [u0, v0, u1, v1] = region;
    let uvs = [[u0, v0], [u1, v0], [u0, v1], [u1, v1]];
    let mut quad = [0.; 20];

    for (i, (pos, uv)) in corners.iter().zip(uvs.iter()).enumerate() {
      quad[i * 5..i * 5 + 5].copy_from_slice(&[pos[0], pos[1], uv[0], uv[1], alpha]);
    }

    shader.batch.push_quad(&quad);
  }

  /// Queue a flat colored quad. `color` is straight (not premultiplied) RGBA.
  pub(crate) fn add_color_quad<B>(
    &mut self,
    backend: &mut B,
    target_size: [u32; 2],
    corners: [[f32; 2]; 4],
    color: [f32; 4],
    alpha: f32,
  ) where
    B: ?Sized + Shader + Texture,
  {
    self.use_shader(backend, Some(ShaderKind::Color), target_size);

    let shader = &mut self.color;
    if shader.batch.is_full() {
      shader.flush(backend, target_size);
    }

    let [r, g, b, a] = premultiply(color, alpha);
    let mut quad = [0.; 24];

    for (i, pos) in corners.iter().enumerate() {
      quad[i * 6..i * 6 + 6].copy_from_slice(&[pos[0], pos[1], r, g, b, a]);
    }

    shader.batch.push_quad(&quad);
  }

  /// Forget the active pipeline and drop every pending quad.
  ///
  /// Returns the number of quads dropped.
  pub(crate) fn reset(&mut self) -> usize {
    let dropped = self.texture.batch.quads() + self.color.batch.quads();

    self.texture.batch.clear();
    self.texture.texture = None;
    self.color.batch.clear();
    self.active = None;

    dropped
  }

  /// Release both programs. Pending quads are dropped.
  pub(crate) fn destroy<B>(self, backend: &mut B)
  where
    B: ?Sized + Shader,
  {
    unsafe {
      backend.destroy_program(self.texture.program);
      backend.destroy_program(self.color.program);
    }
  }
}

impl TextureShader {
  fn flush<B>(&mut self, backend: &mut B, target_size: [u32; 2]) -> bool
  where
    B: ?Sized + Shader + Texture,
  {
    if self.batch.is_empty() {
      return false;
    }

    unsafe {
      backend.set_uniform_vec2(self.program, SCREEN_SIZE_UNIFORM, size_f32(target_size));

      if let Some(texture) = self.texture {
        backend.bind_texture(texture);
      }
    }

    self.batch.flush(backend, self.program)
  }
}

impl ColorShader {
  fn flush<B>(&mut self, backend: &mut B, target_size: [u32; 2]) -> bool
  where
    B: ?Sized + Shader,
  {
    if self.batch.is_empty() {
      return false;
    }

    unsafe {
      backend.set_uniform_vec2(self.program, SCREEN_SIZE_UNIFORM, size_f32(target_size));
    }

    self.batch.flush(backend, self.program)
  }
}

fn size_f32([w, h]: [u32; 2]) -> [f32; 2] {
  [w as f32, h as f32]
}

/// Premultiply a straight RGBA color, scaling its alpha by `alpha` first.
pub fn premultiply([r, g, b, a]: [f32; 4], alpha: f32) -> [f32; 4] {
  let a = a * alpha;
  [r * a, g * a, b * a, a]
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn strides() {
    assert_eq!(VertexAttrib::stride(TEXTURE_ATTRIBS), 5);
    assert_eq!(VertexAttrib::stride(COLOR_ATTRIBS), 6);
  }

  #[test]
  fn premultiplied_color() {
    assert_eq!(premultiply([1., 0.5, 0., 0.5], 0.5), [0.25, 0.125, 0., 0.25]);
  }
}
