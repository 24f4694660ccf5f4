use gl::types::*;
use std::collections::HashMap;
use std::ffi::CString;
use std::mem;
use std::ptr;

use crate::gles2::GLES2;
use lamina::backend::shader::Shader;
use lamina::shader::{ProgramError, StageType, VertexAttrib};
use lamina::ProgramHandle;

/// Vertex layout and uniform locations of a linked program.
#[derive(Debug)]
pub(crate) struct ProgramLayout {
  // (components, offset in floats), indexed by attribute location
  attribs: Vec<(GLint, usize)>,
  stride: usize,
  uniforms: HashMap<String, GLint>,
}

impl ProgramLayout {
  fn new(attribs: &[VertexAttrib]) -> Self {
    let mut offset = 0;
    let attribs = attribs
      .iter()
      .map(|a| {
        let entry = (a.size as GLint, offset);
        offset += a.size;
        entry
      })
      .collect();

    ProgramLayout {
      attribs,
      stride: offset,
      uniforms: HashMap::new(),
    }
  }

  unsafe fn uniform_location(&mut self, program: GLuint, name: &str) -> GLint {
    if let Some(location) = self.uniforms.get(name) {
      return *location;
    }

    let location = match CString::new(name) {
      Ok(c_name) => gl::GetUniformLocation(program, c_name.as_ptr() as *const GLchar),
      Err(_) => -1,
    };

    if location < 0 {
      log::warn!("uniform {} is not active in program #{}", name, program);
    }

    self.uniforms.insert(name.to_owned(), location);
    location
  }
}

unsafe fn compile_stage(ty: StageType, src: &str) -> Result<GLuint, ProgramError> {
  let gl_ty = match ty {
    StageType::VertexShader => gl::VERTEX_SHADER,
    StageType::FragmentShader => gl::FRAGMENT_SHADER,
  };

  let handle = gl::CreateShader(gl_ty);

  if handle == 0 {
    return Err(ProgramError::ProgramAllocation);
  }

  let src_ptr = src.as_ptr() as *const GLchar;
  let src_len = src.len() as GLint;
  gl::ShaderSource(handle, 1, &src_ptr, &src_len);
  gl::CompileShader(handle);

  let mut compiled: GLint = gl::FALSE.into();
  gl::GetShaderiv(handle, gl::COMPILE_STATUS, &mut compiled);

  if compiled == gl::TRUE.into() {
    Ok(handle)
  } else {
    let mut log_len: GLint = 0;
    gl::GetShaderiv(handle, gl::INFO_LOG_LENGTH, &mut log_len);

    let log = info_log(log_len, |len, written, buf| {
      gl::GetShaderInfoLog(handle, len, written, buf)
    });

    gl::DeleteShader(handle);

    Err(ProgramError::StageCompilationFailed(ty, log))
  }
}

unsafe fn link_program(handle: GLuint) -> Result<(), ProgramError> {
  gl::LinkProgram(handle);

  let mut linked: GLint = gl::FALSE.into();
  gl::GetProgramiv(handle, gl::LINK_STATUS, &mut linked);

  if linked == gl::TRUE.into() {
    Ok(())
  } else {
    let mut log_len: GLint = 0;
    gl::GetProgramiv(handle, gl::INFO_LOG_LENGTH, &mut log_len);

    let log = info_log(log_len, |len, written, buf| {
      gl::GetProgramInfoLog(handle, len, written, buf)
    });

    Err(ProgramError::LinkFailed(log))
  }
}

unsafe fn info_log<F>(log_len: GLint, get: F) -> String
where
  F: FnOnce(GLsizei, *mut GLsizei, *mut GLchar),
{
  let mut log: Vec<u8> = vec![0; log_len.max(0) as usize];
  let mut written: GLsizei = 0;

  if !log.is_empty() {
    get(log_len, &mut written, log.as_mut_ptr() as *mut GLchar);
  }

  log.truncate(written.max(0) as usize);
  String::from_utf8_lossy(&log).into_owned()
}

unsafe fn bind_attrib_locations(program: GLuint, attribs: &[VertexAttrib]) -> Result<(), ProgramError> {
  for (index, attrib) in attribs.iter().enumerate() {
    let c_name = CString::new(attrib.name)
      .map_err(|_| ProgramError::LinkFailed(format!("invalid attribute name {:?}", attrib.name)))?;

    gl::BindAttribLocation(program, index as GLuint, c_name.as_ptr() as *const GLchar);
  }

  Ok(())
}

unsafe impl Shader for GLES2 {
  unsafe fn new_program(
    &mut self,
    vertex: &str,
    fragment: &str,
    attribs: &[VertexAttrib],
  ) -> Result<ProgramHandle, ProgramError> {
    let vs = compile_stage(StageType::VertexShader, vertex)?;
    let fs = match compile_stage(StageType::FragmentShader, fragment) {
      Ok(fs) => fs,
      Err(e) => {
        gl::DeleteShader(vs);
        return Err(e);
      }
    };

    let handle = gl::CreateProgram();

    let linked = if handle == 0 {
      Err(ProgramError::ProgramAllocation)
    } else {
      gl::AttachShader(handle, vs);
      gl::AttachShader(handle, fs);

      let linked = bind_attrib_locations(handle, attribs).and_then(|_| link_program(handle));

      gl::DetachShader(handle, vs);
      gl::DetachShader(handle, fs);
      linked
    };

    gl::DeleteShader(vs);
    gl::DeleteShader(fs);

    if let Err(e) = linked {
      if handle != 0 {
        gl::DeleteProgram(handle);
      }

      return Err(e);
    }

    self
      .state
      .programs
      .insert(handle, ProgramLayout::new(attribs));

    log::debug!("linked program #{}", handle);

    Ok(ProgramHandle::from_raw(handle))
  }

  unsafe fn use_program(&mut self, program: ProgramHandle) {
    self.state.use_program(program.raw());
  }

  unsafe fn set_uniform_vec2(&mut self, program: ProgramHandle, name: &str, value: [f32; 2]) {
    let handle = program.raw();
    self.state.use_program(handle);

    let location = match self.state.programs.get_mut(&handle) {
      Some(layout) => layout.uniform_location(handle, name),
      None => return,
    };

    if location >= 0 {
      gl::Uniform2f(location, value[0], value[1]);
    }
  }

  unsafe fn draw_indexed(&mut self, program: ProgramHandle, vertices: &[f32], indices: &[u16]) {
    let handle = program.raw();

    let (attribs, stride) = match self.state.programs.get(&handle) {
      Some(layout) => (layout.attribs.clone(), layout.stride),
      None => {
        log::error!("drawing with unknown {}", program);
        return;
      }
    };

    self.state.use_program(handle);

    let (vertex_buffer, index_buffer) = self.state.stream_buffers();

    self.state.bind_array_buffer(vertex_buffer);
    gl::BufferData(
      gl::ARRAY_BUFFER,
      mem::size_of_val(vertices) as GLsizeiptr,
      vertices.as_ptr() as *const GLvoid,
      gl::STREAM_DRAW,
    );

    self.state.bind_element_array_buffer(index_buffer);
    gl::BufferData(
      gl::ELEMENT_ARRAY_BUFFER,
      mem::size_of_val(indices) as GLsizeiptr,
      indices.as_ptr() as *const GLvoid,
      gl::STREAM_DRAW,
    );

    self.state.enable_attribs(attribs.len());

    let stride_bytes = (stride * mem::size_of::<f32>()) as GLsizei;
    for (location, (size, offset)) in attribs.into_iter().enumerate() {
      gl::VertexAttribPointer(
        location as GLuint,
        size,
        gl::FLOAT,
        gl::FALSE,
        stride_bytes,
        (offset * mem::size_of::<f32>()) as *const GLvoid,
      );
    }

    gl::DrawElements(
      gl::TRIANGLES,
      indices.len() as GLsizei,
      gl::UNSIGNED_SHORT,
      ptr::null(),
    );
  }

  unsafe fn destroy_program(&mut self, program: ProgramHandle) {
    let handle = program.raw();

    self.state.programs.remove(&handle);
    self.state.forget_program(handle);
    gl::DeleteProgram(handle);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use lamina::shader::{COLOR_ATTRIBS, TEXTURE_ATTRIBS};

  #[test]
  fn texture_layout() {
    let layout = ProgramLayout::new(TEXTURE_ATTRIBS);

    assert_eq!(layout.stride, 5);
    assert_eq!(layout.attribs, vec![(2, 0), (2, 2), (1, 4)]);
  }

  #[test]
  fn color_layout() {
    let layout = ProgramLayout::new(COLOR_ATTRIBS);

    assert_eq!(layout.stride, 6);
    assert_eq!(layout.attribs, vec![(2, 0), (4, 2)]);
  }

  #[test]
  fn empty_info_log() {
    let log = unsafe { info_log(0, |_, _, _| unreachable!()) };
    assert!(log.is_empty());
  }
}
