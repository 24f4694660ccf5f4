//! Graphics state.

use gl::types::*;
use std::cell::RefCell;
use std::collections::HashMap;
use std::error;
use std::fmt;
use std::marker::PhantomData;

use crate::gles2::shader::ProgramLayout;

// TLS synchronization barrier for `GLState`.
thread_local!(static TLS_ACQUIRE_GFX_STATE: RefCell<Option<()>> = RefCell::new(Some(())));

/// Cached value.
///
/// A cached value is used to prevent issuing costy GPU commands if we know the target value is
/// already set to what the command tries to set. For instance, if you ask to use a texture ID
/// `34` once, that value will be set on the GPU and cached on our side. Later, if no other texture
/// setting has occurred, if you ask to use the texture ID `34` again, because the value is cached,
/// we know the GPU is already using it, so we don’t have to perform anything GPU-wise.
#[derive(Debug)]
struct Cached<T>(Option<T>)
where
  T: PartialEq;

impl<T> Cached<T>
where
  T: PartialEq,
{
  fn unknown() -> Self {
    Cached(None)
  }

  /// Explicitly invalidate a value.
  ///
  /// This is necessary when we want to be able to force a GPU command to run.
  fn invalidate(&mut self) {
    self.0 = None;
  }

  fn set(&mut self, value: T) {
    self.0 = Some(value);
  }

  fn is(&self, value: &T) -> bool {
    self.0.as_ref() == Some(value)
  }

  /// Check if the cached value is invalid regarding a value.
  ///
  /// A non-cached value (i.e. empty) is always invalid whatever compared value. If a value is
  /// already cached, then it’s invalid if it’s not equal ([`PartialEq`]) to the input value.
  fn is_invalid(&self, new_val: &T) -> bool {
    match &self.0 {
      Some(ref t) => t != new_val,
      _ => true,
    }
  }
}

/// The graphics state.
///
/// Object bindings the lamina context doesn’t track itself (texture, program, buffers) are
/// cached here, along with the streaming buffers quads are uploaded through and the vertex
/// layout of every live program.
#[derive(Debug)]
pub struct GLState {
  _a: PhantomData<*const ()>, // !Send and !Sync

  bound_texture: Cached<GLuint>,
  current_program: Cached<GLuint>,
  bound_array_buffer: Cached<GLuint>,
  bound_element_array_buffer: Cached<GLuint>,

  // attribute locations 0..enabled_attribs are enabled
  enabled_attribs: usize,

  // streaming buffers, allocated on first draw
  vertex_buffer: GLuint,
  index_buffer: GLuint,

  pub(crate) programs: HashMap<GLuint, ProgramLayout>,
}

impl GLState {
  /// Create a new `GLState`.
  ///
  /// > Note: keep in mind you can create only one per thread at a time.
  pub(crate) fn new() -> Result<Self, StateQueryError> {
    TLS_ACQUIRE_GFX_STATE.with(|rc| {
      let mut inner = rc.borrow_mut();

      match *inner {
        Some(_) => {
          inner.take();

          Ok(GLState {
            _a: PhantomData,
            bound_texture: Cached::unknown(),
            current_program: Cached::unknown(),
            bound_array_buffer: Cached::unknown(),
            bound_element_array_buffer: Cached::unknown(),
            enabled_attribs: 0,
            vertex_buffer: 0,
            index_buffer: 0,
            programs: HashMap::new(),
          })
        }

        None => Err(StateQueryError::UnavailableGLState),
      }
    })
  }

  /// Forget every cached binding. Use it after something else touched the context.
  pub fn invalidate(&mut self) {
    self.bound_texture.invalidate();
    self.current_program.invalidate();
    self.bound_array_buffer.invalidate();
    self.bound_element_array_buffer.invalidate();
    self.enabled_attribs = 0;
  }

  pub(crate) unsafe fn bind_texture(&mut self, handle: GLuint) {
    if self.bound_texture.is_invalid(&handle) {
      gl::BindTexture(gl::TEXTURE_2D, handle);
      self.bound_texture.set(handle);
    }
  }

  /// Deleting a bound texture reverts the binding to 0.
  pub(crate) fn forget_texture(&mut self, handle: GLuint) {
    if self.bound_texture.is(&handle) {
      self.bound_texture.set(0);
    }
  }

  pub(crate) unsafe fn use_program(&mut self, handle: GLuint) {
    if self.current_program.is_invalid(&handle) {
      gl::UseProgram(handle);
      self.current_program.set(handle);
    }
  }

  /// A program deleted while current stays in use until another one is made current.
  pub(crate) fn forget_program(&mut self, handle: GLuint) {
    if self.current_program.is(&handle) {
      self.current_program.invalidate();
    }
  }

  pub(crate) unsafe fn bind_array_buffer(&mut self, handle: GLuint) {
    if self.bound_array_buffer.is_invalid(&handle) {
      gl::BindBuffer(gl::ARRAY_BUFFER, handle);
      self.bound_array_buffer.set(handle);
    }
  }

  pub(crate) unsafe fn bind_element_array_buffer(&mut self, handle: GLuint) {
    if self.bound_element_array_buffer.is_invalid(&handle) {
      gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, handle);
      self.bound_element_array_buffer.set(handle);
    }
  }

  /// Enable attribute locations `0..count` and disable the ones above.
  pub(crate) unsafe fn enable_attribs(&mut self, count: usize) {
    for location in self.enabled_attribs..count {
      gl::EnableVertexAttribArray(location as GLuint);
    }

    for location in count..self.enabled_attribs {
      gl::DisableVertexAttribArray(location as GLuint);
    }

    self.enabled_attribs = count;
  }

  /// Streaming vertex and index buffers, allocating them if needed.
  pub(crate) unsafe fn stream_buffers(&mut self) -> (GLuint, GLuint) {
    if self.vertex_buffer == 0 {
      gl::GenBuffers(1, &mut self.vertex_buffer);
    }

    if self.index_buffer == 0 {
      gl::GenBuffers(1, &mut self.index_buffer);
    }

    (self.vertex_buffer, self.index_buffer)
  }
}

impl Drop for GLState {
  fn drop(&mut self) {
    let _ = TLS_ACQUIRE_GFX_STATE.try_with(|rc| *rc.borrow_mut() = Some(()));
  }
}

/// An error that might happen when the context is queried.
#[non_exhaustive]
#[derive(Debug)]
pub enum StateQueryError {
  /// The [`GLState`] object is unavailable.
  ///
  /// That might occur if the current thread doesn’t support allocating a new graphics state. It
  /// might happen if you try to have more than one state on the same thread, for instance.
  UnavailableGLState,
}

impl fmt::Display for StateQueryError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      StateQueryError::UnavailableGLState => write!(f, "unavailable graphics state"),
    }
  }
}

impl error::Error for StateQueryError {}
