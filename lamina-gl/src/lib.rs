//! OpenGL ES 2 backend.
//!
//! This crate exports an [OpenGL ES 2](https://www.khronos.org/opengles/) backend for
//! `lamina`. The backend type is [`GLES2`].
//!
//! The crate doesn’t create contexts. A windowing or platform layer creates one, makes it
//! current on the rendering thread, loads the function pointers with [`load_with`] and then
//! builds a [`GLES2`] on that same thread.

pub mod gles2;

pub use gles2::{load_with, StateQueryError, GLES2};
