mod common;

use std::cell::RefCell;
use std::rc::Rc;

use lamina::backend::render_state::ClearBuffers;
use lamina::backend::ErrorCode;
use lamina::layer::{quad_corners, translation};
use lamina::trace::Call;
use lamina::{Canvas, ContextOpt, FramebufferHandle, GroupLayer, Layer, Paint, Transform};

use common::{context, context_with, draws};

const RED: [f32; 4] = [1., 0., 0., 1.];
const GREEN: [f32; 4] = [0., 1., 0., 1.];
const BLUE: [f32; 4] = [0., 0., 1., 1.];

// first vertex of the n-th quad of a color draw: position then premultiplied color
fn color_vertex(vertices: &[f32], quad: usize) -> &[f32] {
  &vertices[quad * 24..quad * 24 + 6]
}

#[test]
fn nested_groups_compose() {
  let mut ctx = context(100, 100);

  let mut inner = GroupLayer::new();
  inner.add(Layer::solid(GREEN, [1., 1.]));
  inner.add(
    Layer::solid(BLUE, [1., 1.])
      .with_alpha(0.5)
      .with_transform(translation(1., 1.)),
  );

  let mut root = GroupLayer::new();
  root.add(Layer::solid(RED, [1., 1.]));
  root.add(
    Layer::group(inner)
      .with_alpha(0.5)
      .with_transform(translation(0., 5.)),
  );

  let root = Layer::group(root).with_transform(translation(10., 0.));
  ctx.paint_layers(&root);

  let draws = draws(&ctx);
  assert_eq!(draws.len(), 1);
  assert_eq!(draws[0].len(), 3 * 24);

  assert_eq!(color_vertex(&draws[0], 0), &[10., 0., 1., 0., 0., 1.]);
  assert_eq!(color_vertex(&draws[0], 1), &[10., 5., 0., 0.5, 0., 0.5]);
  assert_eq!(color_vertex(&draws[0], 2), &[11., 6., 0., 0., 0.25, 0.25]);
}

#[test]
fn frame_sequence() {
  let mut ctx = context(320, 240);
  ctx.backend_mut().push_error(ErrorCode::InvalidOperation);

  ctx.paint_layers(&Layer::solid(RED, [4., 4.]));

  let calls = ctx.backend().calls();
  assert_eq!(calls[0], Call::BindFramebuffer(FramebufferHandle::BACK_BUFFER));
  assert_eq!(calls[1], Call::SetViewport([0, 0, 320, 240]));
  // the transparent background was set at creation already
  assert_eq!(calls[2], Call::Clear(ClearBuffers::COLOR_DEPTH));
  assert!(matches!(calls[3], Call::UseProgram(_)));
  assert!(matches!(calls.last(), Some(Call::DrawIndexed { .. })));

  assert_eq!(ctx.backend().pending_errors(), 0);
  assert_eq!(ctx.active_shader(), None);
  assert_eq!(ctx.pending_quads(), 0);
}

#[test]
fn consecutive_frames_skip_the_bind() {
  let mut ctx = context(32, 32);
  let scene = Layer::solid(RED, [4., 4.]);

  ctx.paint_layers(&scene);
  ctx.paint_layers(&scene);

  assert_eq!(ctx.backend().framebuffer_binds().len(), 1);
  assert_eq!(ctx.backend().draw_calls(), 2);
}

#[test]
fn background_is_the_clear_color() {
  let background = [0.1, 0.2, 0.3, 1.];
  let mut ctx = context_with(
    ContextOpt::default()
      .set_view_size([8, 8])
      .set_background(background),
  );

  ctx.clear(1., 1., 1., 1.);
  ctx.paint_layers(&Layer::group(GroupLayer::new()));

  assert_eq!(ctx.state().clear_color(), Some(background));
  assert_eq!(ctx.backend().draw_calls(), 0);
}

#[test]
fn invisible_layers_draw_nothing() {
  let mut ctx = context(32, 32);

  let mut root = GroupLayer::new();
  root.add(Layer::solid(RED, [4., 4.]).with_visible(false));

  ctx.paint_layers(&Layer::group(root));

  assert_eq!(ctx.backend().draw_calls(), 0);
  assert_eq!(ctx.backend().count(|c| matches!(c, Call::UseProgram(_))), 0);
}

#[test]
fn mixed_layers_switch_shaders() {
  let mut ctx = context(32, 32);
  let texture = ctx.create_texture(false, false).unwrap();

  let mut root = GroupLayer::new();
  root.add(Layer::image(texture, [4., 4.]));
  root.add(Layer::solid(RED, [4., 4.]));
  root.add(Layer::image(texture, [4., 4.]).with_depth(1.));
  root.add(Layer::image(texture, [4., 4.]).with_depth(1.));

  ctx.paint_layers(&Layer::group(root));

  let draws = draws(&ctx);
  assert_eq!(draws.len(), 3);
  assert_eq!(draws[0].len(), 4 * 5);
  assert_eq!(draws[1].len(), 4 * 6);
  assert_eq!(draws[2].len(), 2 * 4 * 5);
}

#[test]
fn depth_reorders_siblings() {
  let mut ctx = context(32, 32);

  let mut root = GroupLayer::new();
  root.add(Layer::solid(RED, [1., 1.]).with_depth(2.));
  root.add(Layer::solid(GREEN, [1., 1.]).with_depth(-1.));

  ctx.paint_layers(&Layer::group(root));

  let draws = draws(&ctx);
  assert_eq!(&color_vertex(&draws[0], 0)[2..], &GREEN);
  assert_eq!(&color_vertex(&draws[0], 1)[2..], &RED);
}

struct Outline {
  log: Rc<RefCell<Vec<[[f32; 2]; 4]>>>,
}

impl Paint for Outline {
  fn paint(&self, canvas: &mut dyn Canvas, transform: &Transform, alpha: f32) {
    self.log.borrow_mut().push(quad_corners(transform, [2., 2.]));
    canvas.fill_rect(transform, alpha, [2., 2.], BLUE);
  }
}

#[test]
fn custom_paint() {
  let mut ctx = context(32, 32);
  let log = Rc::new(RefCell::new(Vec::new()));

  let mut root = GroupLayer::new();
  root.add(Layer::leaf(Outline { log: log.clone() }).with_transform(translation(3., 3.)));

  ctx.paint_layers(&Layer::group(root));

  assert_eq!(log.borrow()[0][3], [5., 5.]);
  assert_eq!(ctx.backend().draw_calls(), 1);
}

#[test]
fn deep_trees_do_not_recurse() {
  let mut ctx = context(32, 32);
  let mut layer = Layer::solid(RED, [1., 1.]);

  for _ in 0..100_000 {
    let mut group = GroupLayer::new();
    group.add(layer);
    layer = Layer::group(group);
  }

  ctx.paint_layers(&layer);
  assert_eq!(ctx.backend().draw_calls(), 1);

  // dropping the tree is recursive; leak it to keep the test stack small
  std::mem::forget(layer);
}
