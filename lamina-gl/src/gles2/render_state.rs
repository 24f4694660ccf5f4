use gl::types::*;

use crate::gles2::GLES2;
use lamina::backend::render_state::{ClearBuffers, RenderState};
use lamina::backend::ErrorCode;
use lamina::blending::{Blending, Factor};

unsafe impl RenderState for GLES2 {
  unsafe fn set_viewport(&mut self, viewport: [i32; 4]) {
    gl::Viewport(viewport[0], viewport[1], viewport[2], viewport[3]);
  }

  unsafe fn set_clear_color(&mut self, color: [f32; 4]) {
    gl::ClearColor(color[0], color[1], color[2], color[3]);
  }

  unsafe fn clear(&mut self, buffers: ClearBuffers) {
    let mut bits: GLbitfield = 0;

    if buffers.color {
      bits |= gl::COLOR_BUFFER_BIT;
    }

    if buffers.depth {
      bits |= gl::DEPTH_BUFFER_BIT;
    }

    gl::Clear(bits);
  }

  unsafe fn set_blending(&mut self, blending: Option<Blending>) {
    match blending {
      Some(Blending { src, dst }) => {
        gl::Enable(gl::BLEND);
        gl::BlendFunc(from_blending_factor(src), from_blending_factor(dst));
      }

      None => gl::Disable(gl::BLEND),
    }
  }

  unsafe fn set_face_culling(&mut self, enabled: bool) {
    if enabled {
      gl::Enable(gl::CULL_FACE);
    } else {
      gl::Disable(gl::CULL_FACE);
    }
  }

  unsafe fn invalidate(&mut self) {
    self.state.invalidate();
  }

  unsafe fn next_error(&mut self) -> Option<ErrorCode> {
    match gl::GetError() {
      gl::NO_ERROR => None,
      gl::INVALID_ENUM => Some(ErrorCode::InvalidEnum),
      gl::INVALID_VALUE => Some(ErrorCode::InvalidValue),
      gl::INVALID_OPERATION => Some(ErrorCode::InvalidOperation),
      gl::INVALID_FRAMEBUFFER_OPERATION => Some(ErrorCode::InvalidFramebufferOperation),
      gl::OUT_OF_MEMORY => Some(ErrorCode::OutOfMemory),
      code => Some(ErrorCode::Other(code)),
    }
  }
}

#[inline]
fn from_blending_factor(factor: Factor) -> GLenum {
  match factor {
    Factor::One => gl::ONE,
    Factor::Zero => gl::ZERO,
    Factor::SrcColor => gl::SRC_COLOR,
    Factor::SrcColorComplement => gl::ONE_MINUS_SRC_COLOR,
    Factor::DestColor => gl::DST_COLOR,
    Factor::DestColorComplement => gl::ONE_MINUS_DST_COLOR,
    Factor::SrcAlpha => gl::SRC_ALPHA,
    Factor::SrcAlphaComplement => gl::ONE_MINUS_SRC_ALPHA,
    Factor::DstAlpha => gl::DST_ALPHA,
    Factor::DstAlphaComplement => gl::ONE_MINUS_DST_ALPHA,
  }
}
