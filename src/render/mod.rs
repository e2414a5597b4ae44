//! Module for anything related to rendering.
//!
//! This module contains the frame renderer, the scene geometry, the backend it draws through and
//! the shaders used by the OpenGL backend.

pub mod backend;
pub mod geometry;
pub mod plan;
pub mod renderer;

pub use backend::GlBackend;
pub use renderer::FrameRenderer;
