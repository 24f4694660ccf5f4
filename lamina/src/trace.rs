//! A recording backend.
//!
//! [`TraceBackend`] doesn’t talk to any driver. It hands out object names from counters and
//! records every call it receives, in order, as a [`Call`]. It’s what tests and headless tools
//! use to check exactly which commands a context issues.
//!
//! Driver misbehavior can be simulated: errors can be queued for [`RenderState::next_error`] to
//! return, and allocations or framebuffer validation can be made to fail.

use std::collections::{HashSet, VecDeque};

use crate::backend::framebuffer::Framebuffer;
use crate::backend::render_state::{ClearBuffers, RenderState};
use crate::backend::shader::Shader;
use crate::backend::texture::Texture;
use crate::backend::{DriverError, ErrorCode, IncompleteReason};
use crate::blending::Blending;
use crate::handle::{FramebufferHandle, ProgramHandle, TextureHandle};
use crate::shader::{ProgramError, VertexAttrib};
use crate::texture::Sampler;

/// A recorded backend call.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
  NewTexture(TextureHandle),
  BindTexture(TextureHandle),
  SetSampler(Sampler),
  /// Storage size and the number of bytes uploaded, if any.
  TextureStorage([u32; 2], Option<usize>),
  DestroyTexture(TextureHandle),
  NewFramebuffer(FramebufferHandle),
  BindFramebuffer(FramebufferHandle),
  AttachColorTexture(TextureHandle, usize),
  ValidateFramebuffer,
  DestroyFramebuffer(FramebufferHandle),
  /// Program and the stride of its vertex layout.
  NewProgram(ProgramHandle, usize),
  UseProgram(ProgramHandle),
  SetUniformVec2(ProgramHandle, String, [f32; 2]),
  DrawIndexed {
    program: ProgramHandle,
    vertices: Vec<f32>,
    indices: Vec<u16>,
  },
  DestroyProgram(ProgramHandle),
  SetViewport([i32; 4]),
  SetClearColor([f32; 4]),
  Clear(ClearBuffers),
  SetBlending(Option<Blending>),
  SetFaceCulling(bool),
  Invalidate,
}

/// Recording backend.
#[derive(Debug, Default)]
pub struct TraceBackend {
  calls: Vec<Call>,
  errors: VecDeque<ErrorCode>,

  next_texture: u32,
  next_framebuffer: u32,
  next_program: u32,
  programs: HashSet<ProgramHandle>,

  fail_textures: bool,
  fail_framebuffers: bool,
  incomplete: Option<IncompleteReason>,
  fail_programs: Option<ProgramError>,
}

impl TraceBackend {
  pub fn new() -> Self {
    TraceBackend::default()
  }

  /// Every call received so far, oldest first.
  pub fn calls(&self) -> &[Call] {
    &self.calls
  }

  /// Take the recorded calls, leaving the log empty.
  pub fn take_calls(&mut self) -> Vec<Call> {
    std::mem::take(&mut self.calls)
  }

  pub fn clear_calls(&mut self) {
    self.calls.clear();
  }

  /// Number of recorded calls matching a predicate.
  pub fn count<F>(&self, f: F) -> usize
  where
    F: Fn(&Call) -> bool,
  {
    self.calls.iter().filter(|c| f(c)).count()
  }

  /// Number of draw calls.
  pub fn draw_calls(&self) -> usize {
    self.count(|c| matches!(c, Call::DrawIndexed { .. }))
  }

  /// Framebuffers bound, in order.
  pub fn framebuffer_binds(&self) -> Vec<FramebufferHandle> {
    self
      .calls
      .iter()
      .filter_map(|c| match *c {
        Call::BindFramebuffer(fb) => Some(fb),
        _ => None,
      })
      .collect()
  }

  /// Programs created and not destroyed yet.
  pub fn live_programs(&self) -> usize {
    self.programs.len()
  }

  /// Queue a driver error.
  pub fn push_error(&mut self, code: ErrorCode) {
    self.errors.push_back(code);
  }

  pub fn pending_errors(&self) -> usize {
    self.errors.len()
  }

  /// Make texture allocations fail.
  pub fn fail_textures(&mut self, fail: bool) {
    self.fail_textures = fail;
  }

  /// Make framebuffer allocations fail.
  pub fn fail_framebuffers(&mut self, fail: bool) {
    self.fail_framebuffers = fail;
  }

  /// Make framebuffer validation fail with `reason`, or succeed with `None`.
  pub fn set_incomplete(&mut self, reason: Option<IncompleteReason>) {
    self.incomplete = reason;
  }

  /// Make program creation fail with `error`, or succeed with `None`.
  pub fn fail_programs(&mut self, error: Option<ProgramError>) {
    self.fail_programs = error;
  }

  fn record(&mut self, call: Call) {
    log::trace!("{:?}", call);
    self.calls.push(call);
  }
}

unsafe impl Texture for TraceBackend {
  unsafe fn new_texture(&mut self) -> Result<TextureHandle, DriverError> {
    if self.fail_textures {
      return Err(DriverError::TextureAllocation);
    }

    self.next_texture += 1;
    let texture = TextureHandle::from_raw(self.next_texture);
    self.record(Call::NewTexture(texture));

    Ok(texture)
  }

  unsafe fn bind_texture(&mut self, texture: TextureHandle) {
    self.record(Call::BindTexture(texture));
  }

  unsafe fn set_sampler(&mut self, sampler: &Sampler) {
    self.record(Call::SetSampler(*sampler));
  }

  unsafe fn texture_storage(&mut self, size: [u32; 2], texels: Option<&[u8]>) {
    self.record(Call::TextureStorage(size, texels.map(<[u8]>::len)));
  }

  unsafe fn destroy_texture(&mut self, texture: TextureHandle) {
    self.record(Call::DestroyTexture(texture));
  }
}

unsafe impl Framebuffer for TraceBackend {
  unsafe fn new_framebuffer(&mut self) -> Result<FramebufferHandle, DriverError> {
    if self.fail_framebuffers {
      return Err(DriverError::FramebufferAllocation);
    }

    self.next_framebuffer += 1;
    let framebuffer = FramebufferHandle::from_raw(self.next_framebuffer);
    self.record(Call::NewFramebuffer(framebuffer));

    Ok(framebuffer)
  }

  unsafe fn bind_framebuffer(&mut self, framebuffer: FramebufferHandle) {
    self.record(Call::BindFramebuffer(framebuffer));
  }

  unsafe fn attach_color_texture(&mut self, texture: TextureHandle, attachment_index: usize) {
    self.record(Call::AttachColorTexture(texture, attachment_index));
  }

  unsafe fn validate_framebuffer(&mut self) -> Result<(), IncompleteReason> {
    self.record(Call::ValidateFramebuffer);
    self.incomplete.map_or(Ok(()), Err)
  }

  unsafe fn destroy_framebuffer(&mut self, framebuffer: FramebufferHandle) {
    self.record(Call::DestroyFramebuffer(framebuffer));
  }
}

unsafe impl Shader for TraceBackend {
  unsafe fn new_program(
    &mut self,
    _vertex: &str,
    _fragment: &str,
    attribs: &[VertexAttrib],
  ) -> Result<ProgramHandle, ProgramError> {
    if let Some(ref e) = self.fail_programs {
      return Err(e.clone());
    }

    self.next_program += 1;
    let program = ProgramHandle::from_raw(self.next_program);
    self.programs.insert(program);
    self.record(Call::NewProgram(program, VertexAttrib::stride(attribs)));

    Ok(program)
  }

  unsafe fn use_program(&mut self, program: ProgramHandle) {
    self.record(Call::UseProgram(program));
  }

  unsafe fn set_uniform_vec2(&mut self, program: ProgramHandle, name: &str, value: [f32; 2]) {
    self.record(Call::SetUniformVec2(program, name.to_owned(), value));
  }

  unsafe fn draw_indexed(&mut self, program: ProgramHandle, vertices: &[f32], indices: &[u16]) {
    self.record(Call::DrawIndexed {
      program,
      vertices: vertices.to_vec(),
      indices: indices.to_vec(),
    });
  }

  unsafe fn destroy_program(&mut self, program: ProgramHandle) {
    self.programs.remove(&program);
    self.record(Call::DestroyProgram(program));
  }
}

unsafe impl RenderState for TraceBackend {
  unsafe fn set_viewport(&mut self, viewport: [i32; 4]) {
    self.record(Call::SetViewport(viewport));
  }

  unsafe fn set_clear_color(&mut self, color: [f32; 4]) {
    self.record(Call::SetClearColor(color));
  }

  unsafe fn clear(&mut self, buffers: ClearBuffers) {
    self.record(Call::Clear(buffers));
  }

  unsafe fn set_blending(&mut self, blending: Option<Blending>) {
    self.record(Call::SetBlending(blending));
  }

  unsafe fn set_face_culling(&mut self, enabled: bool) {
    self.record(Call::SetFaceCulling(enabled));
  }

  unsafe fn invalidate(&mut self) {
    self.record(Call::Invalidate);
  }

  unsafe fn next_error(&mut self) -> Option<ErrorCode> {
    self.errors.pop_front()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn names_are_per_kind() {
    let mut backend = TraceBackend::new();

    unsafe {
      assert_eq!(backend.new_texture(), Ok(TextureHandle::from_raw(1)));
      assert_eq!(backend.new_framebuffer(), Ok(FramebufferHandle::from_raw(1)));
      assert_eq!(backend.new_texture(), Ok(TextureHandle::from_raw(2)));
    }

    assert_eq!(backend.calls().len(), 3);
  }

  #[test]
  fn error_queue_drains_in_order() {
    let mut backend = TraceBackend::new();
    backend.push_error(ErrorCode::InvalidEnum);
    backend.push_error(ErrorCode::OutOfMemory);

    unsafe {
      assert_eq!(backend.next_error(), Some(ErrorCode::InvalidEnum));
      assert_eq!(backend.next_error(), Some(ErrorCode::OutOfMemory));
      assert_eq!(backend.next_error(), None);
    }
  }
}
