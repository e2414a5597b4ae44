//! The [`Backend`] trait is the seam between the frame renderer and the GPU.
//!
//! [`GlBackend`] draws through OpenGL. Tests drive the renderer with a recording backend instead.

use std::sync::Arc;

use glam::{Mat4, Vec4};
use glow::HasContext;
use image::RgbaImage;

use crate::abs::{Mesh, ShaderProgram, Texture};

use super::{
    geometry,
    plan::{BackgroundQuad, SphereDraw},
};

const VERTEX_SHADER: &str = include_str!("shaders/textured/vert.glsl");
const FRAGMENT_SHADER: &str = include_str!("shaders/textured/frag.glsl");

/// The drawing operations the frame renderer needs from a graphics API.
pub trait Backend {
    /// The GPU texture type. Dropping it releases the texture.
    type Texture;

    /// Uploads an RGBA image whose rows are already in bottom-up order.
    fn upload_texture(&mut self, image: &RgbaImage) -> Result<Self::Texture, String>;

    /// Sets the region of the window that is drawn to.
    fn set_viewport(&mut self, width: u32, height: u32);

    /// Clears the color and depth buffers.
    fn clear(&mut self, color: Vec4);

    fn set_depth_test(&mut self, enabled: bool);

    fn draw_background(
        &mut self,
        texture: &Self::Texture,
        quad: &BackgroundQuad,
    ) -> Result<(), String>;

    fn draw_sphere(&mut self, texture: &Self::Texture, sphere: &SphereDraw) -> Result<(), String>;
}

/// Sphere mesh kept across frames, together with the parameters it was built from.
struct CachedSphere {
    radius: f32,
    slices: u32,
    stacks: u32,
    mesh: Mesh,
}

/// A [`Backend`] drawing with OpenGL 3.3 core through `glow`.
pub struct GlBackend {
    gl: Arc<glow::Context>,
    program: ShaderProgram,
    quad: Mesh,
    sphere: Option<CachedSphere>,
}

impl GlBackend {
    /// Compiles the textured shader and allocates the background quad.
    pub fn new(gl: &Arc<glow::Context>) -> Result<Self, String> {
        let program = ShaderProgram::from_sources(gl, VERTEX_SHADER, FRAGMENT_SHADER)?;
        let quad = Mesh::new(
            gl,
            &geometry::quad_vertices(&geometry::background_quad(1, 1)),
            &geometry::quad_indices(),
            glow::TRIANGLES,
            glow::DYNAMIC_DRAW,
        )?;

        unsafe {
            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LESS);
        }

        Ok(Self {
            gl: Arc::clone(gl),
            program,
            quad,
            sphere: None,
        })
    }

    /// Tessellates the sphere mesh if the cached one was built from different parameters.
    fn ensure_sphere_mesh(&mut self, sphere: &SphereDraw) -> Result<(), String> {
        if let Some(cached) = &self.sphere
            && cached.radius == sphere.radius
            && cached.slices == sphere.slices
            && cached.stacks == sphere.stacks
        {
            return Ok(());
        }

        let (vertices, indices) = geometry::uv_sphere(sphere.radius, sphere.slices, sphere.stacks);
        log::debug!(
            "Tessellated sphere: radius {}, {}x{}, {} vertices",
            sphere.radius,
            sphere.slices,
            sphere.stacks,
            vertices.len()
        );
        let mesh = Mesh::new(
            &self.gl,
            &vertices,
            &indices,
            glow::TRIANGLES,
            glow::STATIC_DRAW,
        )?;
        self.sphere = Some(CachedSphere {
            radius: sphere.radius,
            slices: sphere.slices,
            stacks: sphere.stacks,
            mesh,
        });
        Ok(())
    }

    fn draw_textured(&self, texture: &Texture, projection: Mat4, model: Mat4, mesh: &Mesh) {
        self.program.use_program();
        texture.bind(0);
        self.program.set_uniform("u_texture", 0);
        self.program.set_uniform("u_projection", projection);
        self.program.set_uniform("u_model", model);
        mesh.draw();
    }
}

impl Backend for GlBackend {
    type Texture = Texture;

    fn upload_texture(&mut self, image: &RgbaImage) -> Result<Texture, String> {
        let texture = Texture::new(&self.gl, image)?;
        log::debug!(
            "Uploaded {}x{} RGBA texture",
            texture.width(),
            texture.height()
        );
        Ok(texture)
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        unsafe {
            self.gl.viewport(0, 0, width as i32, height as i32);
        }
    }

    fn clear(&mut self, color: Vec4) {
        unsafe {
            self.gl.clear_color(color.x, color.y, color.z, color.w);
            self.gl
                .clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
    }

    fn set_depth_test(&mut self, enabled: bool) {
        unsafe {
            if enabled {
                self.gl.enable(glow::DEPTH_TEST);
            } else {
                self.gl.disable(glow::DEPTH_TEST);
            }
        }
    }

    fn draw_background(&mut self, texture: &Texture, quad: &BackgroundQuad) -> Result<(), String> {
        self.quad
            .update_vertices(&geometry::quad_vertices(&quad.corners));
        self.draw_textured(texture, quad.projection, quad.model, &self.quad);
        Ok(())
    }

    fn draw_sphere(&mut self, texture: &Texture, sphere: &SphereDraw) -> Result<(), String> {
        self.ensure_sphere_mesh(sphere)
            .map_err(|e| format!("failed to build sphere mesh: {e}"))?;
        let cached = self
            .sphere
            .as_ref()
            .ok_or_else(|| "sphere mesh missing after tessellation".to_string())?;
        self.draw_textured(texture, sphere.projection, sphere.model, &cached.mesh);
        Ok(())
    }
}
