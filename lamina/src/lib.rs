//! # Layer compositing over a tracked graphics state
//!
//! lamina is the rendering core of a 2D game backend. It sits between a tree of paintable
//! layers and a low-level graphics driver (OpenGL ES 2 in `lamina-gl`, a recording driver in
//! [`trace`]) and it makes sure that the driver only ever sees the state changes it needs to
//! see:
//!
//! - **Handles**: GPU objects are referred to by typed handles: [`TextureHandle`],
//!   [`FramebufferHandle`] and [`ProgramHandle`]. They are plain values you own; nothing is
//!   released behind your back, and releasing twice is reported instead of forwarded.
//! - **State tracking**: the currently bound framebuffer, its size, the viewport and the clear
//!   color are cached. Binding the framebuffer that is already bound costs nothing.
//! - **Batching**: quads are accumulated into one of two shader pipelines (textured quads and
//!   flat colored quads) and submitted as a single draw call. Anything that would make a
//!   pending batch stale (rebinding the target, switching shaders or textures, uploading to a
//!   texture the batch samples) flushes it first.
//! - **Layers**: a [`Layer`] tree is composited into the on-screen framebuffer with
//!   [`GLContext::paint_layers`]. Groups compose their transform and opacity with their
//!   parent’s before painting their children.
//!
//! The crate also carries the small concurrency toolbox the backends need to load resources
//! off the rendering thread: an [`exec::Exec`] job executor and a single-resolution
//! [`deferred::Deferred`] result.
//!
//! # Threading
//!
//! Everything graphics-related must be used from a single thread, the one owning the driver
//! context. None of the graphics types lock anything. Only the [`exec`] and [`deferred`]
//! modules are meant to cross threads.

pub mod backend;
pub mod blending;
pub mod context;
pub mod deferred;
pub mod exec;
pub mod handle;
pub mod layer;
mod registry;
pub mod shader;
pub mod state;
pub mod texture;
pub mod trace;

pub use crate::context::{ContextOpt, GLContext, GraphicsError};
pub use crate::handle::{FramebufferHandle, ProgramHandle, TextureHandle};
pub use crate::layer::{Canvas, GroupLayer, ImageLayer, Layer, Paint, SolidLayer, Transform};
pub use crate::shader::ShaderKind;
pub use crate::state::Bind;
