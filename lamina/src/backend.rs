//! Backend interfacing.
//!
//! A backend is the thin layer talking to the actual graphics driver. It is split in several
//! capability traits, one per kind of object it manages, and a type implementing all of them
//! is a [`Backend`]. The rest of the crate only ever talks to a backend through these traits, so
//! adding a platform means implementing them for a new type, nothing more.
//!
//! All the traits are `unsafe` to implement: the context relies on backends doing exactly what
//! each method documents (no more binds, no fewer objects) to keep its cached state in sync
//! with the hardware. Calling their methods is `unsafe` as well, because handles are not
//! checked at that level; the [`GLContext`] is the safe entry point.
//!
//! [`GLContext`]: crate::context::GLContext

pub mod framebuffer;
pub mod render_state;
pub mod shader;
pub mod texture;

use std::error;
use std::fmt;

use self::framebuffer::Framebuffer;
use self::render_state::RenderState;
use self::shader::Shader;
use self::texture::Texture;

/// A full backend, usable by a [`GLContext`](crate::context::GLContext).
pub trait Backend: Texture + Framebuffer + Shader + RenderState {}

impl<B> Backend for B where B: Texture + Framebuffer + Shader + RenderState {}

/// Failures reported synchronously by a driver when allocating objects.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DriverError {
  /// The driver couldn’t give us a new texture name.
  TextureAllocation,
  /// The driver couldn’t give us a new framebuffer name.
  FramebufferAllocation,
  /// A framebuffer is not complete after attaching its color texture.
  IncompleteFramebuffer(IncompleteReason),
}

impl fmt::Display for DriverError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      DriverError::TextureAllocation => f.write_str("cannot allocate texture"),
      DriverError::FramebufferAllocation => f.write_str("cannot allocate framebuffer"),
      DriverError::IncompleteFramebuffer(ref r) => write!(f, "incomplete framebuffer: {}", r),
    }
  }
}

impl error::Error for DriverError {}

impl From<IncompleteReason> for DriverError {
  fn from(e: IncompleteReason) -> Self {
    DriverError::IncompleteFramebuffer(e)
  }
}

/// Reason a framebuffer is incomplete.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IncompleteReason {
  /// Incomplete attachment (color texture without storage, for instance).
  IncompleteAttachment,
  /// An attachment was missing.
  MissingAttachment,
  /// Attachments don’t have the same dimensions.
  IncompleteDimensions,
  /// The combination of attachment formats is not supported by the driver.
  Unsupported,
  /// A status the backend doesn’t know about.
  Unknown(u32),
}

impl fmt::Display for IncompleteReason {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      IncompleteReason::IncompleteAttachment => f.write_str("incomplete attachment"),
      IncompleteReason::MissingAttachment => f.write_str("missing attachment"),
      IncompleteReason::IncompleteDimensions => f.write_str("incomplete dimensions"),
      IncompleteReason::Unsupported => f.write_str("unsupported"),
      IncompleteReason::Unknown(status) => write!(f, "unknown status 0x{:04X}", status),
    }
  }
}

/// A pending error code, as found in the driver’s error queue.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorCode {
  InvalidEnum,
  InvalidValue,
  InvalidOperation,
  InvalidFramebufferOperation,
  OutOfMemory,
  /// Any other code, verbatim.
  Other(u32),
}

impl fmt::Display for ErrorCode {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      ErrorCode::InvalidEnum => f.write_str("GL_INVALID_ENUM"),
      ErrorCode::InvalidValue => f.write_str("GL_INVALID_VALUE"),
      ErrorCode::InvalidOperation => f.write_str("GL_INVALID_OPERATION"),
      ErrorCode::InvalidFramebufferOperation => f.write_str("GL_INVALID_FRAMEBUFFER_OPERATION"),
      ErrorCode::OutOfMemory => f.write_str("GL_OUT_OF_MEMORY"),
      ErrorCode::Other(code) => write!(f, "0x{:04X}", code),
    }
  }
}
