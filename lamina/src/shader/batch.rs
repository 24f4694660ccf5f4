//! Quad accumulation.

use crate::backend::shader::Shader;
use crate::handle::ProgramHandle;

/// Maximum number of quads a batch holds before it must be flushed.
///
/// Indices are `u16`, so this must stay below `65536 / 4`.
pub const MAX_QUADS: usize = 4096;

/// Interleaved vertices and triangle indices of a run of quads.
///
/// Each quad is given as its four corners in the order top-left, top-right, bottom-left,
/// bottom-right and becomes two triangles.
#[derive(Debug)]
pub(crate) struct QuadBatch {
  stride: usize,
  vertices: Vec<f32>,
  indices: Vec<u16>,
}

impl QuadBatch {
  pub(crate) fn new(stride: usize) -> Self {
    QuadBatch {
      stride,
      vertices: Vec::new(),
      indices: Vec::new(),
    }
  }

  pub(crate) fn is_empty(&self) -> bool {
    self.indices.is_empty()
  }

  pub(crate) fn quads(&self) -> usize {
    self.indices.len() / 6
  }

  pub(crate) fn is_full(&self) -> bool {
    self.quads() >= MAX_QUADS
  }

  /// Append a quad; `corners` holds four vertices of `stride` floats each.
  pub(crate) fn push_quad(&mut self, corners: &[f32]) {
    debug_assert_eq!(corners.len(), 4 * self.stride);
    debug_assert!(!self.is_full());

    let base = (self.quads() * 4) as u16;
    self.vertices.extend_from_slice(corners);
    self
      .indices
      .extend_from_slice(&[base, base + 1, base + 2, base + 1, base + 3, base + 2]);
  }

  /// Drop every queued quad.
  pub(crate) fn clear(&mut self) {
    self.vertices.clear();
    self.indices.clear();
  }

  /// Submit the whole batch as one draw call with the current program, then empty it.
  ///
  /// Returns whether anything was drawn.
  pub(crate) fn flush<B>(&mut self, backend: &mut B, program: ProgramHandle) -> bool
  where
    B: ?Sized + Shader,
  {
    if self.is_empty() {
      return false;
    }

    log::trace!("flushing {} quads with {}", self.quads(), program);

    unsafe { backend.draw_indexed(program, &self.vertices, &self.indices) };
    self.clear();

    true
  }
}
