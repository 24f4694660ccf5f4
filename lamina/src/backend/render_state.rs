//! Render state backend: viewport, clearing, blending and the error queue.

use crate::backend::ErrorCode;
use crate::blending::Blending;

/// Buffers to clear.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ClearBuffers {
  pub color: bool,
  pub depth: bool,
}

impl ClearBuffers {
  pub const COLOR: ClearBuffers = ClearBuffers {
    color: true,
    depth: false,
  };

  pub const COLOR_DEPTH: ClearBuffers = ClearBuffers {
    color: true,
    depth: true,
  };
}

pub unsafe trait RenderState {
  unsafe fn set_viewport(&mut self, viewport: [i32; 4]);

  unsafe fn set_clear_color(&mut self, color: [f32; 4]);

  /// Clear the bound framebuffer.
  unsafe fn clear(&mut self, buffers: ClearBuffers);

  /// Enable blending with the given factors, or disable it with `None`.
  unsafe fn set_blending(&mut self, blending: Option<Blending>);

  unsafe fn set_face_culling(&mut self, enabled: bool);

  /// Forget every binding the backend caches on its side.
  ///
  /// Called when something outside the context may have changed the driver state.
  unsafe fn invalidate(&mut self);

  /// Pop the oldest pending error, if any.
  ///
  /// Backends must eventually return `None` once the queue is drained.
  unsafe fn next_error(&mut self) -> Option<ErrorCode>;
}
