//! Texture sampling and texel upload types.
//!
//! Textures are always 2D and stored as 8-bit RGBA. The only thing you choose when creating
//! one is how it should be sampled, which is described by a [`Sampler`].

use std::error;
use std::fmt;

/// How to wrap texture coordinates while sampling textures?
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Wrap {
  /// If textures coordinates lay outside of *[0;1]*, they will be clamped to either *0* or *1* for
  /// every components.
  ClampToEdge,
  /// Textures coordinates are repeated if they lay outside of *[0;1]*. Picture this as:
  ///
  /// ```ignore
  /// // given the frac function returning the fractional part of a floating number:
  /// coord_ith = frac(coord_ith); // always between [0;1]
  /// ```
  Repeat,
  /// Same as `Repeat` but it will alternatively repeat between *[0;1]* and *[1;0]*.
  MirroredRepeat,
}

impl Wrap {
  /// `Repeat` if `repeat` is set, `ClampToEdge` otherwise.
  pub fn repeat_if(repeat: bool) -> Self {
    if repeat {
      Wrap::Repeat
    } else {
      Wrap::ClampToEdge
    }
  }
}

/// Minification filter.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MinFilter {
  /// Nearest interpolation.
  Nearest,
  /// Linear interpolation between surrounding pixels.
  Linear,
}

/// Magnification filter.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MagFilter {
  /// Nearest interpolation.
  Nearest,
  /// Linear interpolation between surrounding pixels.
  Linear,
}

/// A `Sampler` object gives hint on how a texture should be sampled.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Sampler {
  /// How should we wrap around the *s* sampling coordinate?
  pub wrap_s: Wrap,
  /// How should we wrap around the *t* sampling coordinate?
  pub wrap_t: Wrap,
  /// Minification filter.
  pub min_filter: MinFilter,
  /// Magnification filter.
  pub mag_filter: MagFilter,
}

/// Default value is as following:
///
/// - both coordinates clamped to edge;
/// - linear minification and magnification.
impl Default for Sampler {
  fn default() -> Self {
    Sampler {
      wrap_s: Wrap::ClampToEdge,
      wrap_t: Wrap::ClampToEdge,
      min_filter: MinFilter::Linear,
      mag_filter: MagFilter::Linear,
    }
  }
}

impl Sampler {
  /// Linear sampler repeating along the axes that ask for it and clamping along the others.
  pub fn wrapping(repeat_x: bool, repeat_y: bool) -> Self {
    Sampler {
      wrap_s: Wrap::repeat_if(repeat_x),
      wrap_t: Wrap::repeat_if(repeat_y),
      ..Sampler::default()
    }
  }
}

/// Number of bytes of a single RGBA8 texel.
pub const TEXEL_BYTES: usize = 4;

/// Errors that might happen when uploading texels.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TextureError {
  /// The texel data doesn’t cover the area exactly.
  ///
  /// The first [`usize`] is the number of expected bytes and the second [`usize`] is the number
  /// you provided.
  WrongTexelCount(usize, usize),
}

impl TextureError {
  /// Check that `texels` exactly covers a `[width, height]` RGBA8 area.
  pub fn check_texels(size: [u32; 2], texels: &[u8]) -> Result<(), Self> {
    let expected = size[0] as usize * size[1] as usize * TEXEL_BYTES;

    if expected == texels.len() {
      Ok(())
    } else {
      Err(TextureError::WrongTexelCount(expected, texels.len()))
    }
  }
}

impl fmt::Display for TextureError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      TextureError::WrongTexelCount(expected, provided) => write!(
        f,
        "wrong texel count: expected {} bytes, provided {} bytes",
        expected, provided
      ),
    }
  }
}

impl error::Error for TextureError {}
