//! That module exports blending-related types.
//!
//! Given two pixels *src* and *dst* – source and destination, we associate each pixel a blending
//! factor – respectively, *srcK* and *dstK*. *src* is the pixel being computed, and *dst* is the
//! pixel that is already stored in the framebuffer. Pixels are always blended additively:
//!
//! > `blended = src * srcK + dst * dstK`
//!
//! Layers are drawn with premultiplied alpha, so the usual setting is [`Blending::PREMULTIPLIED`].

/// Blending factors. Pixel data are multiplied by these factors to achieve several effects.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Factor {
  /// `1 * color = factor`
  One,
  /// `0 * color = 0`
  Zero,
  /// `src * color`
  SrcColor,
  /// `(1 - src) * color`
  SrcColorComplement,
  /// `dst * color`
  DestColor,
  /// `(1 - dst) * color`
  DestColorComplement,
  /// `srcA * color`
  SrcAlpha,
  /// `(1 - srcA) * color`
  SrcAlphaComplement,
  /// `dstA * color`
  DstAlpha,
  /// `(1 - dstA) * color`
  DstAlphaComplement,
}

/// Source and destination factors.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct Blending {
  /// Factor applied to the pixel being computed.
  pub src: Factor,
  /// Factor applied to the pixel already in the framebuffer.
  pub dst: Factor,
}

impl Blending {
  /// Blending for premultiplied-alpha colors.
  pub const PREMULTIPLIED: Blending = Blending {
    src: Factor::One,
    dst: Factor::SrcAlphaComplement,
  };
}
