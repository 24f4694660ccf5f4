//! Asynchronous sound loading.
//!
//! Sounds are opened and decoded off the calling thread. [`Audio::create_sound`] returns a
//! pending [`Deferred`](lamina::deferred::Deferred) right away; a job scheduled on an
//! [`Exec`](lamina::exec::Exec) opens the resource, converts it if needed and hands it to a
//! [`Mixer`], then resolves the deferred with the clip or with a [`LoadError`].
//!
//! Playback itself is the mixer’s business. [`BufferMixer`] is an in-memory mixer that only
//! validates and buffers samples; platform crates provide mixers backed by real audio lines.

pub mod convert;
pub mod error;
pub mod format;
pub mod loader;
pub mod mixer;
pub mod resource;
pub mod wav;

pub use crate::error::LoadError;
pub use crate::format::{AudioFormat, Encoding};
pub use crate::loader::Audio;
pub use crate::mixer::{BufferMixer, BufferedClip, Mixer};
pub use crate::resource::{AudioResource, AudioStream, FileResource, MemoryResource};
