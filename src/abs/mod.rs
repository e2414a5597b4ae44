//! This module contains the thin OpenGL layer of the demo: application setup, shader programs,
//! meshes and textures. Every GPU object here releases itself on drop.

pub mod app;
pub mod mesh;
pub mod shader;
pub mod texture;

pub use app::*;
pub use mesh::*;
pub use shader::*;
pub use texture::*;
