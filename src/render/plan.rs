//! Plain descriptions of what a frame draws.
//!
//! The [`FrameRenderer`](super::renderer::FrameRenderer) turns its state into a [`FramePlan`] and
//! hands the pieces to a [`Backend`](super::backend::Backend). Keeping the plan separate from the
//! GL calls lets the scene math be inspected without a GPU.

use glam::{Mat4, Vec3, Vec4};

use super::geometry::QuadCorner;

/// The background image stretched over the whole viewport.
#[derive(Clone, Debug, PartialEq)]
pub struct BackgroundQuad {
    pub corners: [QuadCorner; 4],
    /// Orthographic projection spanning `[0, width] x [0, height]`.
    pub projection: Mat4,
    pub model: Mat4,
}

/// The textured sphere and the transform it is drawn with.
#[derive(Clone, Debug, PartialEq)]
pub struct SphereDraw {
    pub projection: Mat4,
    /// Translation, then rotation, then scale.
    pub model: Mat4,
    pub camera_offset: Vec3,
    /// Rotation angle in degrees.
    pub angle: f32,
    /// Normalized rotation axis.
    pub axis: Vec3,
    pub scale: f32,
    pub radius: f32,
    pub slices: u32,
    pub stacks: u32,
}

/// Everything drawn in one frame, in order.
#[derive(Clone, Debug, PartialEq)]
pub struct FramePlan {
    pub clear_color: Vec4,
    pub background: Option<BackgroundQuad>,
    pub sphere: SphereDraw,
}
