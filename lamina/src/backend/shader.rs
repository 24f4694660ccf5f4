//! Shader backend.

use crate::handle::ProgramHandle;
use crate::shader::{ProgramError, VertexAttrib};

pub unsafe trait Shader {
  /// Compile both stages and link them into a program.
  ///
  /// `attribs` lists the interleaved `f32` vertex attributes, in order. Their locations are
  /// bound before linking and the backend remembers the layout to draw with the program later.
  unsafe fn new_program(
    &mut self,
    vertex: &str,
    fragment: &str,
    attribs: &[VertexAttrib],
  ) -> Result<ProgramHandle, ProgramError>;

  /// Make a program current.
  unsafe fn use_program(&mut self, program: ProgramHandle);

  /// Set a `vec2` uniform of the current program. Inactive uniforms are ignored.
  unsafe fn set_uniform_vec2(&mut self, program: ProgramHandle, name: &str, value: [f32; 2]);

  /// Draw indexed triangles with the current program.
  ///
  /// `vertices` follows the attribute layout the program was created with.
  unsafe fn draw_indexed(&mut self, program: ProgramHandle, vertices: &[f32], indices: &[u16]);

  /// Release a program.
  unsafe fn destroy_program(&mut self, program: ProgramHandle);
}
