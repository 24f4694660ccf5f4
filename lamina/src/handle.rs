//! Typed GPU object handles.
//!
//! A handle is a copy of the raw integer name a driver gave to an object. Handles of
//! different kinds are different types, so a texture cannot be bound as a framebuffer by
//! mistake.
//!
//! Handles are owned by whoever allocated them through a [`GLContext`]. Copying a handle
//! doesn’t copy the object: once released, every copy is dangling. Using a dangling handle is
//! a contract violation; the context reports the ones it can see (double releases) and
//! forwards nothing to the driver for them.
//!
//! [`GLContext`]: crate::context::GLContext

use std::fmt;

macro_rules! handle {
  ($(#[$attr:meta])* $name:ident, $label:literal) => {
    $(#[$attr])*
    #[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
    pub struct $name(u32);

    impl $name {
      /// Wrap a raw driver name.
      ///
      /// Only backends should do this, with names they just allocated.
      pub const fn from_raw(raw: u32) -> Self {
        $name(raw)
      }

      /// Raw driver name.
      pub const fn raw(self) -> u32 {
        self.0
      }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, concat!($label, " #{}"), self.0)
      }
    }
  };
}

handle!(
  /// Handle to a 2D RGBA texture.
  TextureHandle,
  "texture"
);

handle!(
  /// Handle to a framebuffer object.
  FramebufferHandle,
  "framebuffer"
);

handle!(
  /// Handle to a linked shader program.
  ProgramHandle,
  "program"
);

impl FramebufferHandle {
  /// The on-screen framebuffer.
  ///
  /// It is never allocated nor released.
  pub const BACK_BUFFER: FramebufferHandle = FramebufferHandle(0);

  /// Whether this handle is the on-screen framebuffer.
  pub fn is_back_buffer(self) -> bool {
    self == Self::BACK_BUFFER
  }
}
