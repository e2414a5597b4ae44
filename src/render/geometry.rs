//! Geometry used by the scene: the UV sphere and the full-viewport background quad.
//!
//! The sphere follows the layout of the classic GLU quadric: the poles lie on the Z axis, `s` runs
//! with longitude and `t` goes from 1 at the north pole to 0 at the south pole.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};
use glow::HasContext;

use crate::abs::Vertex;

#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(C)]
pub struct TexturedVertex {
    pub position: Vec3,
    pub uv: Vec2,
}

impl Vertex for TexturedVertex {
    fn vertex_attribs(gl: &glow::Context) {
        unsafe {
            let stride = std::mem::size_of::<TexturedVertex>() as i32;

            // Position attribute
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);

            // Texture coordinate attribute
            gl.enable_vertex_attrib_array(1);
            gl.vertex_attrib_pointer_f32(
                1,
                2,
                glow::FLOAT,
                false,
                stride,
                std::mem::size_of::<Vec3>() as i32,
            );
        }
    }
}

pub const MIN_SLICES: u32 = 3;
pub const MIN_STACKS: u32 = 2;

/// Tessellates a sphere of the given radius centered on the origin.
///
/// Returns `(stacks + 1) * (slices + 1)` vertices (the seam column is duplicated so it can carry
/// `s = 1`) and `6 * slices * stacks` triangle indices. Values below [`MIN_SLICES`] and
/// [`MIN_STACKS`] are raised to them.
pub fn uv_sphere(radius: f32, slices: u32, stacks: u32) -> (Vec<TexturedVertex>, Vec<u32>) {
    let slices = slices.max(MIN_SLICES);
    let stacks = stacks.max(MIN_STACKS);

    let mut vertices = Vec::with_capacity(((stacks + 1) * (slices + 1)) as usize);
    for i in 0..=stacks {
        let rho = i as f32 * PI / stacks as f32;
        let (sin_rho, cos_rho) = rho.sin_cos();
        for j in 0..=slices {
            let theta = if j == slices {
                0.0
            } else {
                j as f32 * TAU / slices as f32
            };
            let (sin_theta, cos_theta) = theta.sin_cos();
            vertices.push(TexturedVertex {
                position: Vec3::new(-sin_theta * sin_rho, cos_theta * sin_rho, cos_rho) * radius,
                uv: Vec2::new(
                    j as f32 / slices as f32,
                    1.0 - i as f32 / stacks as f32,
                ),
            });
        }
    }

    let row = slices + 1;
    let mut indices = Vec::with_capacity((6 * slices * stacks) as usize);
    for i in 0..stacks {
        for j in 0..slices {
            let top_left = i * row + j;
            let bottom_left = top_left + row;
            indices.extend_from_slice(&[
                top_left,
                bottom_left,
                top_left + 1,
                top_left + 1,
                bottom_left,
                bottom_left + 1,
            ]);
        }
    }

    (vertices, indices)
}

/// One corner of the background quad: where it lands on screen and which texel it samples.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadCorner {
    pub screen: Vec2,
    pub uv: Vec2,
}

/// The corners of a quad covering a `width` by `height` viewport, counter-clockwise from the
/// bottom-left, with the texture stretched over the whole area.
pub fn background_quad(width: u32, height: u32) -> [QuadCorner; 4] {
    let (w, h) = (width as f32, height as f32);
    [
        QuadCorner {
            screen: Vec2::new(0.0, 0.0),
            uv: Vec2::new(0.0, 0.0),
        },
        QuadCorner {
            screen: Vec2::new(w, 0.0),
            uv: Vec2::new(1.0, 0.0),
        },
        QuadCorner {
            screen: Vec2::new(w, h),
            uv: Vec2::new(1.0, 1.0),
        },
        QuadCorner {
            screen: Vec2::new(0.0, h),
            uv: Vec2::new(0.0, 1.0),
        },
    ]
}

/// Two triangles over the corners returned by [`background_quad`].
pub fn quad_indices() -> [u32; 6] {
    [0, 1, 2, 2, 3, 0]
}

/// Converts quad corners to vertices lying on the `z = 0` plane.
pub fn quad_vertices(corners: &[QuadCorner; 4]) -> [TexturedVertex; 4] {
    corners.map(|corner| TexturedVertex {
        position: corner.screen.extend(0.0),
        uv: corner.uv,
    })
}
