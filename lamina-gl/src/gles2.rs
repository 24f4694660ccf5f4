//! OpenGL ES 2 backend.
//!
//! This module implements an OpenGL ES 2 backend for lamina. The backend type is [`GLES2`].

mod framebuffer;
mod render_state;
mod shader;
mod state;
mod texture;

use std::os::raw::c_void;

pub use self::state::GLState;
pub use self::state::StateQueryError;

/// Load the OpenGL function pointers of the current context.
///
/// Must be called once the context is current and before creating a [`GLES2`].
pub fn load_with<F>(loader: F)
where
  F: FnMut(&'static str) -> *const c_void,
{
  gl::load_with(loader);
}

/// An OpenGL ES 2 backend.
///
/// This type is to be used as a lamina backend type. Only one can exist per thread, as it
/// mirrors the state of the context current on that thread.
#[derive(Debug)]
pub struct GLES2 {
  pub(crate) state: GLState,
}

impl GLES2 {
  /// Create a new OpenGL ES 2 backend over the context current on this thread.
  pub fn new() -> Result<Self, StateQueryError> {
    GLState::new().map(|state| GLES2 { state })
  }

  /// Internal access to the backend state.
  ///
  /// # Unsafety
  ///
  /// This method is **highly unsafe** as it exposes the internals of the backend. Playing with
  /// it should be done with extreme caution.
  pub unsafe fn state(&mut self) -> &mut GLState {
    &mut self.state
  }
}
