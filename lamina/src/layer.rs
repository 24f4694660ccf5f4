//! Layers.
//!
//! A scene is a tree of [`Layer`]s. Every layer carries a local transform, an opacity, a depth
//! and a visibility flag, and is either a *group* holding child layers or a *leaf* that knows
//! how to paint itself.
//!
//! Children are owned by their group, so a layer has exactly one parent and a tree cannot
//! contain cycles. Painting walks the tree with an explicit stack rather than recursion, so
//! deep trees don’t threaten the call stack.
//!
//! # Render order
//!
//! A group keeps its children sorted by ascending depth; children sharing a depth keep their
//! insertion order. Children are painted in that order, so later children paint over earlier
//! ones.
//!
//! # Composition
//!
//! A layer painted under a parent transform `P` and opacity `p` paints with `P ∘ L` and
//! `p × l`, where `L` and `l` are its own transform and opacity. Invisible layers and their
//! whole subtree are skipped.

use std::fmt;

use cgmath::{Matrix3, SquareMatrix, Vector3};

use crate::handle::TextureHandle;

/// 2D affine transform, as a homogeneous 3×3 matrix mapping layer space to parent space.
pub type Transform = Matrix3<f32>;

/// The identity transform.
pub fn identity() -> Transform {
  Matrix3::identity()
}

/// A translation by `(x, y)`.
pub fn translation(x: f32, y: f32) -> Transform {
  Matrix3::new(1., 0., 0., 0., 1., 0., x, y, 1.)
}

/// A scaling by `(sx, sy)` around the origin.
pub fn scaling(sx: f32, sy: f32) -> Transform {
  Matrix3::new(sx, 0., 0., 0., sy, 0., 0., 0., 1.)
}

/// A rotation by `angle` radians around the origin.
pub fn rotation(angle: f32) -> Transform {
  let (s, c) = angle.sin_cos();
  Matrix3::new(c, s, 0., -s, c, 0., 0., 0., 1.)
}

/// Apply a transform to a point.
pub fn transform_point(transform: &Transform, x: f32, y: f32) -> [f32; 2] {
  let p = transform * Vector3::new(x, y, 1.);
  [p.x, p.y]
}

/// Corners of a `[width, height]` rectangle anchored at the origin, transformed, in the order
/// top-left, top-right, bottom-left, bottom-right.
pub fn quad_corners(transform: &Transform, [w, h]: [f32; 2]) -> [[f32; 2]; 4] {
  [
    transform_point(transform, 0., 0.),
    transform_point(transform, w, 0.),
    transform_point(transform, 0., h),
    transform_point(transform, w, h),
  ]
}

/// Whole texture, as `[u0, v0, u1, v1]`.
pub const FULL_REGION: [f32; 4] = [0., 0., 1., 1.];

/// Surface leaves paint onto.
///
/// Transforms and opacities given to these methods are the fully composed ones.
pub trait Canvas {
  /// Draw the `region` (`[u0, v0, u1, v1]`) of a texture stretched over a `size` rectangle.
  fn draw_texture(
    &mut self,
    texture: TextureHandle,
    transform: &Transform,
    alpha: f32,
    size: [f32; 2],
    region: [f32; 4],
  );

  /// Fill a `size` rectangle with a straight-alpha RGBA color.
  fn fill_rect(&mut self, transform: &Transform, alpha: f32, size: [f32; 2], color: [f32; 4]);
}

/// Something a leaf layer paints.
pub trait Paint {
  fn paint(&self, canvas: &mut dyn Canvas, transform: &Transform, alpha: f32);
}

/// A texture stretched over a rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageLayer {
  pub texture: TextureHandle,
  pub size: [f32; 2],
  /// Part of the texture to show, as `[u0, v0, u1, v1]`.
  pub region: [f32; 4],
}

impl ImageLayer {
  pub fn new(texture: TextureHandle, size: [f32; 2]) -> Self {
    ImageLayer {
      texture,
      size,
      region: FULL_REGION,
    }
  }
}

impl Paint for ImageLayer {
  fn paint(&self, canvas: &mut dyn Canvas, transform: &Transform, alpha: f32) {
    canvas.draw_texture(self.texture, transform, alpha, self.size, self.region);
  }
}

/// A rectangle filled with a flat color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolidLayer {
  /// Straight-alpha RGBA.
  pub color: [f32; 4],
  pub size: [f32; 2],
}

impl Paint for SolidLayer {
  fn paint(&self, canvas: &mut dyn Canvas, transform: &Transform, alpha: f32) {
    canvas.fill_rect(transform, alpha, self.size, self.color);
  }
}

/// Children of a group layer, sorted by depth.
#[derive(Debug, Default)]
pub struct GroupLayer {
  children: Vec<Layer>,
}

impl GroupLayer {
  pub fn new() -> Self {
    GroupLayer::default()
  }

  /// Add a child, after every child of lower or equal depth.
  pub fn add(&mut self, layer: Layer) {
    let index = self.children.partition_point(|c| c.depth <= layer.depth);
    self.children.insert(index, layer);
  }

  /// Remove and return the child at `index`, in render order.
  pub fn remove(&mut self, index: usize) -> Option<Layer> {
    if index < self.children.len() {
      Some(self.children.remove(index))
    } else {
      None
    }
  }

  pub fn clear(&mut self) {
    self.children.clear();
  }

  pub fn len(&self) -> usize {
    self.children.len()
  }

  pub fn is_empty(&self) -> bool {
    self.children.is_empty()
  }

  /// Children in render order.
  pub fn children(&self) -> &[Layer] {
    &self.children
  }
}

/// What a layer is.
pub enum Node {
  Group(GroupLayer),
  Leaf(Box<dyn Paint>),
}

impl fmt::Debug for Node {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      Node::Group(ref group) => f.debug_tuple("Group").field(group).finish(),
      Node::Leaf(_) => f.write_str("Leaf(..)"),
    }
  }
}

/// A node of the scene tree.
#[derive(Debug)]
pub struct Layer {
  transform: Transform,
  alpha: f32,
  depth: f32,
  visible: bool,
  node: Node,
}

impl Layer {
  fn new(node: Node) -> Self {
    Layer {
      transform: identity(),
      alpha: 1.,
      depth: 0.,
      visible: true,
      node,
    }
  }

  pub fn group(group: GroupLayer) -> Self {
    Layer::new(Node::Group(group))
  }

  pub fn leaf<P>(paint: P) -> Self
  where
    P: Paint + 'static,
  {
    Layer::new(Node::Leaf(Box::new(paint)))
  }

  pub fn image(texture: TextureHandle, size: [f32; 2]) -> Self {
    Layer::leaf(ImageLayer::new(texture, size))
  }

  pub fn solid(color: [f32; 4], size: [f32; 2]) -> Self {
    Layer::leaf(SolidLayer { color, size })
  }

  /// Set the local transform.
  pub fn with_transform(self, transform: Transform) -> Self {
    Layer { transform, ..self }
  }

  /// Set the opacity.
  pub fn with_alpha(self, alpha: f32) -> Self {
    Layer { alpha, ..self }
  }

  /// Set the depth. Only meaningful before the layer is added to a group.
  pub fn with_depth(self, depth: f32) -> Self {
    Layer { depth, ..self }
  }

  pub fn with_visible(self, visible: bool) -> Self {
    Layer { visible, ..self }
  }

  pub fn transform(&self) -> &Transform {
    &self.transform
  }

  pub fn set_transform(&mut self, transform: Transform) {
    self.transform = transform;
  }

  pub fn alpha(&self) -> f32 {
    self.alpha
  }

  pub fn set_alpha(&mut self, alpha: f32) {
    self.alpha = alpha;
  }

  pub fn depth(&self) -> f32 {
    self.depth
  }

  pub fn visible(&self) -> bool {
    self.visible
  }

  pub fn set_visible(&mut self, visible: bool) {
    self.visible = visible;
  }

  pub fn node(&self) -> &Node {
    &self.node
  }

  pub fn as_group(&self) -> Option<&GroupLayer> {
    match self.node {
      Node::Group(ref group) => Some(group),
      Node::Leaf(_) => None,
    }
  }

  pub fn as_group_mut(&mut self) -> Option<&mut GroupLayer> {
    match self.node {
      Node::Group(ref mut group) => Some(group),
      Node::Leaf(_) => None,
    }
  }

  /// Paint this layer and its subtree under a parent transform and opacity.
  pub fn paint(&self, canvas: &mut dyn Canvas, transform: &Transform, alpha: f32) {
    let mut stack = vec![(self, *transform, alpha)];

    while let Some((layer, parent_transform, parent_alpha)) = stack.pop() {
      if !layer.visible {
        continue;
      }

      let transform = parent_transform * layer.transform;
      let alpha = parent_alpha * layer.alpha;

      match layer.node {
        // reversed so that the first child is popped first
        Node::Group(ref group) => stack.extend(
          group
            .children
            .iter()
            .rev()
            .map(|child| (child, transform, alpha)),
        ),

        Node::Leaf(ref leaf) => leaf.paint(canvas, &transform, alpha),
      }
    }
  }
}
