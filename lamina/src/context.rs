//! Graphics context.
//!
//! A [`GLContext`] owns a [`Backend`] together with everything needed to drive it without
//! redundant state changes: the [`GraphicsState`] tracker, the two shader pipelines and the
//! bookkeeping of live GPU objects. It is the only safe way to talk to a backend.
//!
//! A typical frame is a single call to [`GLContext::paint_layers`]. Offscreen rendering binds a
//! framebuffer created with [`GLContext::create_framebuffer`], paints into it through the
//! [`Canvas`] implementation, and switches back.

use std::error;
use std::fmt;

use crate::backend::render_state::ClearBuffers;
use crate::backend::{Backend, DriverError};
use crate::blending::Blending;
use crate::handle::{FramebufferHandle, TextureHandle};
use crate::layer::{self, Canvas, Layer, Transform};
use crate::registry::Registry;
use crate::shader::{ProgramError, ShaderKind, Shaders};
use crate::state::{Bind, GraphicsState, RenderTarget};
use crate::texture::{Sampler, TextureError, TEXEL_BYTES};

/// Context options.
///
/// Such options allow to tweak how a context is set up. Options are built with the `set_*`
/// methods, starting from [`ContextOpt::default`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContextOpt {
  view_size: [u32; 2],
  check_errors: bool,
  background: [f32; 4],
  blending: Option<Blending>,
  face_culling: bool,
}

impl Default for ContextOpt {
  /// Defaults:
  ///
  /// - `view_size` set to `[0, 0]`.
  /// - `check_errors` set to `true`.
  /// - `background` set to transparent black.
  /// - `blending` set to [`Blending::PREMULTIPLIED`].
  /// - `face_culling` set to `false`.
  fn default() -> Self {
    ContextOpt {
      view_size: [0, 0],
      check_errors: true,
      background: [0., 0., 0., 0.],
      blending: Some(Blending::PREMULTIPLIED),
      face_culling: false,
    }
  }
}

impl ContextOpt {
  /// Size of the on-screen framebuffer. Default to `[0, 0]`.
  #[inline]
  pub fn set_view_size(self, view_size: [u32; 2]) -> Self {
    ContextOpt { view_size, ..self }
  }

  /// Size of the on-screen framebuffer.
  #[inline]
  pub fn view_size(&self) -> [u32; 2] {
    self.view_size
  }

  /// Drain and log driver errors at checkpoints. Default to `true`.
  #[inline]
  pub fn set_check_errors(self, check_errors: bool) -> Self {
    ContextOpt {
      check_errors,
      ..self
    }
  }

  #[inline]
  pub fn check_errors(&self) -> bool {
    self.check_errors
  }

  /// Color the on-screen framebuffer is cleared to before each frame. Default to transparent
  /// black.
  #[inline]
  pub fn set_background(self, background: [f32; 4]) -> Self {
    ContextOpt { background, ..self }
  }

  #[inline]
  pub fn background(&self) -> [f32; 4] {
    self.background
  }

  /// Blending equation, or `None` to disable blending. Default to premultiplied-alpha blending.
  #[inline]
  pub fn set_blending<B>(self, blending: B) -> Self
  where
    B: Into<Option<Blending>>,
  {
    ContextOpt {
      blending: blending.into(),
      ..self
    }
  }

  #[inline]
  pub fn blending(&self) -> Option<Blending> {
    self.blending
  }

  /// Back-face culling. Default to `false`.
  #[inline]
  pub fn set_face_culling(self, face_culling: bool) -> Self {
    ContextOpt {
      face_culling,
      ..self
    }
  }

  #[inline]
  pub fn face_culling(&self) -> bool {
    self.face_culling
  }
}

/// Errors a context operation can fail with.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GraphicsError {
  /// The driver refused an allocation.
  Driver(DriverError),
  /// A built-in shader program failed to build.
  Program(ProgramError),
  /// Texel data doesn’t match the texture area.
  Texture(TextureError),
  /// The texture was already released, or never allocated by this context.
  StaleTexture(TextureHandle),
  /// The framebuffer was already released, or never allocated by this context.
  StaleFramebuffer(FramebufferHandle),
}

impl fmt::Display for GraphicsError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      GraphicsError::Driver(ref e) => write!(f, "driver error: {}", e),
      GraphicsError::Program(ref e) => write!(f, "program error: {}", e),
      GraphicsError::Texture(ref e) => write!(f, "texture error: {}", e),
      GraphicsError::StaleTexture(texture) => write!(f, "{} is not live", texture),
      GraphicsError::StaleFramebuffer(framebuffer) => write!(f, "{} is not live", framebuffer),
    }
  }
}

impl error::Error for GraphicsError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      GraphicsError::Driver(e) => Some(e),
      GraphicsError::Program(e) => Some(e),
      GraphicsError::Texture(e) => Some(e),
      _ => None,
    }
  }
}

impl From<DriverError> for GraphicsError {
  fn from(e: DriverError) -> Self {
    GraphicsError::Driver(e)
  }
}

impl From<ProgramError> for GraphicsError {
  fn from(e: ProgramError) -> Self {
    GraphicsError::Program(e)
  }
}

impl From<TextureError> for GraphicsError {
  fn from(e: TextureError) -> Self {
    GraphicsError::Texture(e)
  }
}

/// A graphics context over a backend.
#[derive(Debug)]
pub struct GLContext<B>
where
  B: Backend,
{
  backend: B,
  state: GraphicsState,
  shaders: Shaders,
  registry: Registry,
  opts: ContextOpt,
}

impl<B> GLContext<B>
where
  B: Backend,
{
  /// Set the backend up for layer compositing and build the shader pipelines.
  pub fn new(mut backend: B, opts: ContextOpt) -> Result<Self, GraphicsError> {
    let mut state = GraphicsState::new(opts.view_size, opts.check_errors);

    unsafe {
      backend.set_face_culling(opts.face_culling);
      backend.set_blending(opts.blending);
    }

    state.set_clear_color(&mut backend, opts.background);

    let shaders = Shaders::new(&mut backend)?;
    state.check_error(&mut backend, "init");

    log::debug!("context ready at {}x{}", opts.view_size[0], opts.view_size[1]);

    Ok(GLContext {
      backend,
      state,
      shaders,
      registry: Registry::default(),
      opts,
    })
  }

  pub fn opts(&self) -> &ContextOpt {
    &self.opts
  }

  /// Tracked graphics state.
  pub fn state(&self) -> &GraphicsState {
    &self.state
  }

  pub fn backend(&self) -> &B {
    &self.backend
  }

  /// Direct access to the backend.
  ///
  /// Anything done through it is invisible to the tracker; call [`GLContext::invalidate`]
  /// after changing driver state.
  pub fn backend_mut(&mut self) -> &mut B {
    &mut self.backend
  }

  pub fn live_textures(&self) -> usize {
    self.registry.live_textures()
  }

  pub fn live_framebuffers(&self) -> usize {
    self.registry.live_framebuffers()
  }

  /// Color texture a live framebuffer renders into.
  pub fn framebuffer_texture(&self, framebuffer: FramebufferHandle) -> Option<TextureHandle> {
    self.registry.framebuffer_texture(framebuffer)
  }

  /// Currently active shader pipeline.
  pub fn active_shader(&self) -> Option<ShaderKind> {
    self.shaders.active()
  }

  /// Number of quads waiting in the active batch.
  pub fn pending_quads(&self) -> usize {
    self.shaders.pending_quads()
  }

  /// Allocate a texture with linear filtering, repeating along the axes that ask for it and
  /// clamping along the others. It has no storage until something is uploaded.
  pub fn create_texture(
    &mut self,
    repeat_x: bool,
    repeat_y: bool,
  ) -> Result<TextureHandle, GraphicsError> {
    let texture = self
      .registry
      .create_texture(&mut self.backend, &Sampler::wrapping(repeat_x, repeat_y))?;
    Ok(texture)
  }

  /// Allocate a texture with RGBA8 storage of the given size and undefined content.
  pub fn create_texture_sized(
    &mut self,
    width: u32,
    height: u32,
    repeat_x: bool,
    repeat_y: bool,
  ) -> Result<TextureHandle, GraphicsError> {
    let texture = self.create_texture(repeat_x, repeat_y)?;

    // create_texture leaves the texture bound
    unsafe { self.backend.texture_storage([width, height], None) };

    Ok(texture)
  }

  /// Replace the storage and content of a texture with premultiplied RGBA8 texels.
  pub fn upload_texture(
    &mut self,
    texture: TextureHandle,
    size: [u32; 2],
    texels: &[u8],
  ) -> Result<(), GraphicsError> {
    if !self.registry.is_live_texture(texture) {
      log::error!("uploading to {} which is not live", texture);
      return Err(GraphicsError::StaleTexture(texture));
    }

    TextureError::check_texels(size, texels)?;

    if self.shaders.samples(texture) {
      self.flush();
    }

    unsafe {
      self.backend.bind_texture(texture);
      self.backend.texture_storage(size, Some(texels));
    }

    log::trace!("uploaded {}x{} texels to {}", size[0], size[1], texture);

    Ok(())
  }

  /// Upload a straight-alpha image, premultiplying it on the way.
  pub fn upload_image(
    &mut self,
    texture: TextureHandle,
    image: &image::RgbaImage,
  ) -> Result<(), GraphicsError> {
    let texels = premultiply_texels(image.as_raw());
    self.upload_texture(texture, [image.width(), image.height()], &texels)
  }

  pub fn destroy_texture(&mut self, texture: TextureHandle) -> Result<(), GraphicsError> {
    if self.shaders.samples(texture) {
      self.flush();
    }

    self.registry.destroy_texture(&mut self.backend, texture)
  }

  /// Allocate a framebuffer rendering into `texture`.
  ///
  /// The tracked binding is left untouched.
  pub fn create_framebuffer(
    &mut self,
    texture: TextureHandle,
  ) -> Result<FramebufferHandle, GraphicsError> {
    self.flush();

    let result = self.registry.create_framebuffer(&mut self.backend, texture);

    // only these two outcomes went as far as binding the new framebuffer
    if matches!(
      result,
      Ok(_) | Err(GraphicsError::Driver(DriverError::IncompleteFramebuffer(_)))
    ) {
      self.state.restore_framebuffer(&mut self.backend);
    }

    result
  }

  pub fn delete_framebuffer(&mut self, framebuffer: FramebufferHandle) -> Result<(), GraphicsError> {
    let is_bound = self
      .state
      .bound_target()
      .map_or(false, |t| t.framebuffer == framebuffer);

    if is_bound && self.registry.framebuffer_texture(framebuffer).is_some() {
      self.flush();
      self.state.invalidate_framebuffer();
    }

    self.registry.delete_framebuffer(&mut self.backend, framebuffer)
  }

  /// Bind a framebuffer rendered at `width`×`height`.
  ///
  /// With [`Bind::Cached`], nothing happens if that exact target is already bound. Returns
  /// whether the bind was issued. Framebuffers that aren’t live are refused and never bound.
  pub fn bind_framebuffer(
    &mut self,
    framebuffer: FramebufferHandle,
    width: u32,
    height: u32,
    bind: Bind,
  ) -> bool {
    if framebuffer != FramebufferHandle::BACK_BUFFER
      && self.registry.framebuffer_texture(framebuffer).is_none()
    {
      log::error!("binding {} which is not live", framebuffer);
      return false;
    }

    let target = RenderTarget {
      framebuffer,
      size: [width, height],
    };

    self
      .state
      .bind_framebuffer(&mut self.backend, &mut self.shaders, target, bind)
  }

  /// Bind the on-screen framebuffer at the view size.
  pub fn bind_default(&mut self) -> bool {
    let [width, height] = self.state.view_size();
    self.bind_framebuffer(FramebufferHandle::BACK_BUFFER, width, height, Bind::Cached)
  }

  /// Change the size of the on-screen framebuffer, after the surface got resized.
  ///
  /// The new size is used by the next [`GLContext::bind_default`].
  pub fn set_view_size(&mut self, width: u32, height: u32) {
    self.state.set_view_size([width, height]);
  }

  /// Clear the color buffer of the bound framebuffer.
  pub fn clear(&mut self, r: f32, g: f32, b: f32, a: f32) {
    self.clear_buffers([r, g, b, a], ClearBuffers::COLOR);
  }

  fn clear_buffers(&mut self, color: [f32; 4], buffers: ClearBuffers) {
    // pending quads belong before the clear
    self.flush();
    self.state.set_clear_color(&mut self.backend, color);
    unsafe { self.backend.clear(buffers) };
  }

  /// Drain and log pending driver errors, tagging them with `op`. Returns how many were found.
  pub fn check_error(&mut self, op: &str) -> usize {
    self.state.check_error(&mut self.backend, op)
  }

  /// Make a pipeline active, or none. Returns whether a batch was flushed.
  pub fn use_shader(&mut self, kind: Option<ShaderKind>) -> bool {
    let size = self.state.target_size();
    self.shaders.use_shader(&mut self.backend, kind, size)
  }

  /// Submit the active batch. Returns whether a draw call was issued.
  pub fn flush(&mut self) -> bool {
    let size = self.state.target_size();
    self.shaders.flush(&mut self.backend, size)
  }

  /// Forget the tracked state. Use it after driver state was changed behind the context’s back.
  ///
  /// Quads still pending are dropped.
  pub fn invalidate(&mut self) {
    log::debug!("graphics state invalidated");

    let dropped = self.shaders.reset();
    if dropped > 0 {
      log::warn!("dropping {} pending quads on invalidation", dropped);
    }

    self.state.invalidate();
    unsafe { self.backend.invalidate() };
  }

  /// Composite a layer tree into the on-screen framebuffer.
  pub fn paint_layers(&mut self, root: &Layer) {
    self.check_error("paint_layers start");

    self.bind_default();
    self.clear_buffers(self.opts.background, ClearBuffers::COLOR_DEPTH);

    root.paint(self, &layer::identity(), 1.);

    self.check_error("paint_layers end");
    self.use_shader(None);
  }

  /// Tear the context down and give the backend back.
  ///
  /// Pending quads are dropped. Textures and framebuffers still live are reported and left to
  /// the driver.
  pub fn dispose(mut self) -> B {
    let textures = self.registry.live_textures();
    let framebuffers = self.registry.live_framebuffers();

    if textures + framebuffers > 0 {
      log::debug!(
        "disposing context with {} live textures and {} live framebuffers",
        textures,
        framebuffers
      );
    }

    self.shaders.destroy(&mut self.backend);
    self.backend
  }
}

impl<B> Canvas for GLContext<B>
where
  B: Backend,
{
  fn draw_texture(
    &mut self,
    texture: TextureHandle,
    transform: &Transform,
    alpha: f32,
    size: [f32; 2],
    region: [f32; 4],
  ) {
    if !self.registry.is_live_texture(texture) {
      log::error!("drawing {} which is not live", texture);
      return;
    }

    let corners = layer::quad_corners(transform, size);
    let target_size = self.state.target_size();

    self.shaders.add_texture_quad(
      &mut self.backend,
      target_size,
      texture,
      corners,
      region,
      alpha,
    );
  }

  fn fill_rect(&mut self, transform: &Transform, alpha: f32, size: [f32; 2], color: [f32; 4]) {
    let corners = layer::quad_corners(transform, size);
    let target_size = self.state.target_size();

    self
      .shaders
      .add_color_quad(&mut self.backend, target_size, corners, color, alpha);
  }
}

/// Premultiply straight-alpha RGBA8 texels.
pub fn premultiply_texels(texels: &[u8]) -> Vec<u8> {
  let mut out = Vec::with_capacity(texels.len());

  for px in texels.chunks_exact(TEXEL_BYTES) {
    let a = px[3] as u32;

    for &c in &px[..3] {
      out.push(((c as u32 * a + 127) / 255) as u8);
    }

    out.push(px[3]);
  }

  out
}
