//! The frame renderer: owns the textures and the animation angle, and draws one frame per tick.
//!
//! A renderer starts out uninitialized. [`FrameRenderer::initialize`] loads the images and moves
//! it to the ready state, which it never leaves. Every other operation requires the ready state.

use std::path::Path;

use glam::{Mat4, Vec3};
use image::RgbaImage;

use crate::{config::SceneSettings, error::RenderError};

use super::{
    backend::Backend,
    geometry,
    plan::{BackgroundQuad, FramePlan, SphereDraw},
};

/// Width over height, or `1.0` for a zero height.
pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    if height == 0 {
        1.0
    } else {
        width as f32 / height as f32
    }
}

/// Decodes an image file and flips it so its first row is the bottom of the picture.
pub fn load_image(path: &Path) -> Result<RgbaImage, RenderError> {
    let image = image::ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(image::ImageError::IoError)
        .and_then(|reader| reader.decode())
        .map_err(|source| RenderError::ImageLoad {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(image.flipv().to_rgba8())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

struct Ready<T> {
    texture: T,
    background: Option<T>,
    /// Degrees.
    angle: f32,
    projection: Mat4,
}

enum RendererState<T> {
    Uninitialized,
    Ready(Ready<T>),
}

/// Draws the textured sphere and the optional background through a [`Backend`].
pub struct FrameRenderer<B: Backend> {
    backend: B,
    settings: SceneSettings,
    viewport: Viewport,
    state: RendererState<B::Texture>,
}

impl<B: Backend> FrameRenderer<B> {
    /// Creates an uninitialized renderer for a viewport of the given size.
    pub fn new(backend: B, settings: SceneSettings, width: u32, height: u32) -> Self {
        Self {
            backend,
            settings,
            viewport: Viewport { width, height },
            state: RendererState::Uninitialized,
        }
    }

    /// Loads the sphere texture and, if a non-empty path is given, the background texture.
    ///
    /// On failure the renderer stays uninitialized and any texture uploaded by this call is
    /// released again.
    pub fn initialize(
        &mut self,
        texture_path: &Path,
        background_path: Option<&Path>,
    ) -> Result<(), RenderError> {
        if self.is_ready() {
            return Err(RenderError::AlreadyInitialized);
        }

        let texture = self.load_texture(texture_path)?;
        let background = match background_path.filter(|path| !path.as_os_str().is_empty()) {
            Some(path) => Some(self.load_texture(path)?),
            None => None,
        };

        self.state = RendererState::Ready(Ready {
            texture,
            background,
            angle: 0.0,
            projection: self.perspective(),
        });
        Ok(())
    }

    fn load_texture(&mut self, path: &Path) -> Result<B::Texture, RenderError> {
        let image = load_image(path)?;
        let texture =
            self.backend
                .upload_texture(&image)
                .map_err(|reason| RenderError::TextureUpload {
                    path: path.to_path_buf(),
                    reason,
                })?;
        log::info!(
            "Loaded texture {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        Ok(texture)
    }

    fn perspective(&self) -> Mat4 {
        Mat4::perspective_rh_gl(
            self.settings.fov_degrees.to_radians(),
            self.aspect(),
            self.settings.near,
            self.settings.far,
        )
    }

    fn ready_mut(&mut self) -> Result<&mut Ready<B::Texture>, RenderError> {
        match &mut self.state {
            RendererState::Ready(ready) => Ok(ready),
            RendererState::Uninitialized => Err(RenderError::NotReady),
        }
    }

    /// Updates the viewport and recomputes the perspective projection.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        if !self.is_ready() {
            return Err(RenderError::NotReady);
        }
        self.viewport = Viewport { width, height };
        let projection = self.perspective();
        self.ready_mut()?.projection = projection;
        self.backend.set_viewport(width, height);
        log::debug!("Resized to {width}x{height} (aspect {})", self.aspect());
        Ok(())
    }

    /// Advances the rotation by the configured step.
    pub fn advance(&mut self) -> Result<(), RenderError> {
        let step = self.settings.rotation_step;
        self.advance_by(step)
    }

    /// Advances the rotation by `delta` degrees.
    ///
    /// The angle is kept in `[0, 360)` so that small steps keep their precision however long the
    /// demo runs.
    pub fn advance_by(&mut self, delta: f32) -> Result<(), RenderError> {
        let ready = self.ready_mut()?;
        ready.angle = (ready.angle + delta).rem_euclid(360.0);
        Ok(())
    }

    /// Describes the next frame without drawing it.
    pub fn plan_frame(&self) -> Result<FramePlan, RenderError> {
        let RendererState::Ready(ready) = &self.state else {
            return Err(RenderError::NotReady);
        };
        let settings = &self.settings;
        let Viewport { width, height } = self.viewport;

        let model = Mat4::IDENTITY;

        let background = ready.background.as_ref().map(|_| BackgroundQuad {
            corners: geometry::background_quad(width, height),
            projection: Mat4::orthographic_rh_gl(
                0.0,
                width.max(1) as f32,
                0.0,
                height.max(1) as f32,
                -1.0,
                1.0,
            ),
            model: Mat4::IDENTITY,
        });

        let camera_offset = Vec3::new(0.0, 0.0, -settings.camera_distance);
        let axis = settings.rotation_axis.try_normalize().unwrap_or(Vec3::Z);
        let model = model
            * Mat4::from_translation(camera_offset)
            * Mat4::from_axis_angle(axis, ready.angle.to_radians())
            * Mat4::from_scale(Vec3::splat(settings.sphere_scale));

        Ok(FramePlan {
            clear_color: settings.clear_color,
            background,
            sphere: SphereDraw {
                projection: ready.projection,
                model,
                camera_offset,
                angle: ready.angle,
                axis,
                scale: settings.sphere_scale,
                radius: settings.sphere_radius,
                slices: settings.slices,
                stacks: settings.stacks,
            },
        })
    }

    /// Clears the screen, draws the background if there is one, then draws the sphere.
    pub fn render_frame(&mut self) -> Result<(), RenderError> {
        let plan = self.plan_frame()?;
        let RendererState::Ready(ready) = &self.state else {
            return Err(RenderError::NotReady);
        };

        self.backend.clear(plan.clear_color);

        if let (Some(texture), Some(quad)) = (&ready.background, &plan.background) {
            self.backend.set_depth_test(false);
            let drawn = self.backend.draw_background(texture, quad);
            self.backend.set_depth_test(true);
            drawn.map_err(|reason| RenderError::Draw { reason })?;
        }

        self.backend
            .draw_sphere(&ready.texture, &plan.sphere)
            .map_err(|reason| RenderError::Draw { reason })
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, RendererState::Ready(_))
    }

    pub fn has_background(&self) -> bool {
        matches!(
            &self.state,
            RendererState::Ready(Ready {
                background: Some(_),
                ..
            })
        )
    }

    /// The current rotation angle in degrees, if initialized.
    pub fn angle(&self) -> Option<f32> {
        match &self.state {
            RendererState::Ready(ready) => Some(ready.angle),
            RendererState::Uninitialized => None,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Aspect ratio of the current viewport, `1.0` when its height is zero.
    pub fn aspect(&self) -> f32 {
        aspect_ratio(self.viewport.width, self.viewport.height)
    }

    #[cfg(test)]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

#[cfg(test)]
mod tests {
    use std::{path::PathBuf, rc::Rc};

    use glam::Vec2;
    use image::Rgba;

    use super::*;
    use crate::render::backend::recording::{Call, RecordingBackend};

    /// Writes a small PNG whose top row is red and the rest blue.
    fn write_image(name: &str, width: u32, height: u32) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("texsphere-tests-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let image = RgbaImage::from_fn(width, height, |_, y| {
            if y == 0 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });
        image.save(&path).unwrap();
        path
    }

    fn renderer() -> FrameRenderer<RecordingBackend> {
        FrameRenderer::new(RecordingBackend::default(), SceneSettings::default(), 800, 600)
    }

    #[test]
    fn test_aspect_ratio() {
        assert_eq!(aspect_ratio(800, 600), 800.0 / 600.0);
        assert_eq!(aspect_ratio(1920, 1080), 1920.0 / 1080.0);
        assert_eq!(aspect_ratio(300, 0), 1.0);
        assert_eq!(aspect_ratio(0, 0), 1.0);
    }

    #[test]
    fn test_load_image_flips_rows() {
        let path = write_image("flip.png", 2, 3);
        let image = load_image(&path).unwrap();
        assert_eq!(image.dimensions(), (2, 3));
        // The red top row of the file ends up last in memory.
        assert_eq!(image.get_pixel(0, 2), &Rgba([255, 0, 0, 255]));
        assert_eq!(image.get_pixel(0, 0), &Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_operations_before_initialize_fail() {
        let mut renderer = renderer();
        assert!(matches!(renderer.resize(10, 10), Err(RenderError::NotReady)));
        assert!(matches!(renderer.advance(), Err(RenderError::NotReady)));
        assert!(matches!(renderer.render_frame(), Err(RenderError::NotReady)));
        assert!(matches!(renderer.plan_frame(), Err(RenderError::NotReady)));
        assert!(renderer.backend_mut().calls.is_empty());
    }

    #[test]
    fn test_missing_texture_is_an_image_load_error() {
        let mut renderer = renderer();
        let missing = std::env::temp_dir().join("texsphere-does-not-exist.png");
        let err = renderer.initialize(&missing, None).unwrap_err();
        assert!(matches!(err, RenderError::ImageLoad { .. }));
        assert!(!renderer.is_ready());
        assert_eq!(renderer.angle(), None);
    }

    #[test]
    fn test_undecodable_texture_is_an_image_load_error() {
        let dir = std::env::temp_dir().join(format!("texsphere-tests-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("garbage.png");
        std::fs::write(&path, b"definitely not an image").unwrap();

        let mut renderer = renderer();
        let err = renderer.initialize(&path, None).unwrap_err();
        assert!(matches!(err, RenderError::ImageLoad { .. }));
        assert!(!renderer.is_ready());
    }

    #[test]
    fn test_rejected_upload_is_a_texture_upload_error() {
        let path = write_image("upload-large.png", 8, 8);
        let mut renderer = renderer();
        renderer.backend_mut().max_texture_size = Some(4);
        let err = renderer.initialize(&path, None).unwrap_err();
        assert!(matches!(err, RenderError::TextureUpload { .. }));
        assert!(!renderer.is_ready());
    }

    #[test]
    fn test_failed_background_releases_sphere_texture() {
        let earth = write_image("release-earth.png", 4, 4);
        let stars = write_image("release-stars.png", 8, 8);
        let mut backend = RecordingBackend::default();
        backend.max_texture_size = Some(4);
        let released = Rc::clone(&backend.released);

        let mut renderer = FrameRenderer::new(backend, SceneSettings::default(), 800, 600);
        let err = renderer.initialize(&earth, Some(stars.as_path())).unwrap_err();
        assert!(matches!(err, RenderError::TextureUpload { .. }));
        assert!(!renderer.is_ready());
        assert_eq!(*released.borrow(), vec![1]);
    }

    #[test]
    fn test_initialize_twice_fails() {
        let earth = write_image("twice-earth.png", 2, 2);
        let mut renderer = renderer();
        renderer.initialize(&earth, None).unwrap();
        assert!(matches!(
            renderer.initialize(&earth, None),
            Err(RenderError::AlreadyInitialized)
        ));
        assert!(renderer.is_ready());
    }

    #[test]
    fn test_textures_released_once_on_drop() {
        let earth = write_image("drop-earth.png", 2, 2);
        let stars = write_image("drop-stars.png", 2, 2);
        let backend = RecordingBackend::default();
        let released = Rc::clone(&backend.released);

        let mut renderer = FrameRenderer::new(backend, SceneSettings::default(), 800, 600);
        renderer.initialize(&earth, Some(stars.as_path())).unwrap();
        renderer.render_frame().unwrap();
        renderer.render_frame().unwrap();
        assert!(released.borrow().is_empty());

        drop(renderer);
        let mut ids = released.borrow().clone();
        ids.sort();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_advance_accumulates_half_degree_steps() {
        let earth = write_image("advance-earth.png", 2, 2);
        let mut renderer = renderer();
        renderer.initialize(&earth, None).unwrap();
        assert_eq!(renderer.angle(), Some(0.0));

        let mut previous = 0.0;
        for n in 1..=600 {
            renderer.advance().unwrap();
            let angle = renderer.angle().unwrap();
            assert_eq!(angle, 0.5 * n as f32);
            assert!(angle >= previous);
            previous = angle;
        }

        // A full turn wraps back to the start of the circle.
        renderer.advance_by(62.0).unwrap();
        assert_eq!(renderer.angle(), Some(2.0));
    }

    #[test]
    fn test_rotation_keeps_moving_after_long_runs() {
        let earth = write_image("long-run-earth.png", 2, 2);
        let mut renderer = renderer();
        renderer.initialize(&earth, None).unwrap();

        // Without wrapping, an f32 angle this large no longer changes by 0.5.
        renderer.advance_by(8_388_608.0).unwrap();
        let angle = renderer.angle().unwrap();
        assert!((0.0..360.0).contains(&angle));

        let before = renderer.plan_frame().unwrap().sphere.model;
        renderer.advance().unwrap();
        assert_eq!(renderer.angle(), Some(angle + 0.5));
        let after = renderer.plan_frame().unwrap().sphere.model;
        assert_ne!(before, after);
    }

    #[test]
    fn test_draw_failure_is_reported() {
        let earth = write_image("draw-fail-earth.png", 2, 2);
        let stars = write_image("draw-fail-stars.png", 2, 2);
        let mut renderer = renderer();
        renderer.initialize(&earth, Some(stars.as_path())).unwrap();
        renderer.backend_mut().take_calls();
        renderer.backend_mut().fail_draws = true;

        let err = renderer.render_frame().unwrap_err();
        assert!(matches!(err, RenderError::Draw { .. }));
        // Depth testing is restored even though the background draw failed.
        assert_eq!(
            renderer.backend_mut().take_calls(),
            vec![Call::Clear, Call::DepthTest(false), Call::DepthTest(true)]
        );
    }

    #[test]
    fn test_resize_updates_viewport_and_projection() {
        let earth = write_image("resize-earth.png", 2, 2);
        let mut renderer = renderer();
        renderer.initialize(&earth, None).unwrap();
        renderer.backend_mut().take_calls();

        renderer.resize(1024, 512).unwrap();
        assert_eq!(
            renderer.viewport(),
            Viewport {
                width: 1024,
                height: 512
            }
        );
        assert_eq!(renderer.backend_mut().take_calls(), vec![Call::Viewport(1024, 512)]);
        assert_eq!(renderer.aspect(), 2.0);
        let expected = Mat4::perspective_rh_gl(45.0f32.to_radians(), 2.0, 0.1, 100.0);
        assert_eq!(renderer.plan_frame().unwrap().sphere.projection, expected);

        renderer.resize(640, 0).unwrap();
        assert_eq!(renderer.aspect(), 1.0);
        let expected = Mat4::perspective_rh_gl(45.0f32.to_radians(), 1.0, 0.1, 100.0);
        assert_eq!(renderer.plan_frame().unwrap().sphere.projection, expected);
    }

    #[test]
    fn test_empty_background_path_skips_background() {
        let earth = write_image("empty-bg-earth.png", 2, 2);
        let mut renderer = renderer();
        renderer.initialize(&earth, Some(Path::new(""))).unwrap();
        assert!(renderer.is_ready());
        assert!(!renderer.has_background());

        renderer.backend_mut().take_calls();
        renderer.render_frame().unwrap();
        let calls = renderer.backend_mut().take_calls();
        assert!(
            !calls
                .iter()
                .any(|call| matches!(call, Call::Background { .. } | Call::DepthTest(_)))
        );
    }

    #[test]
    fn test_sphere_frame_after_ten_ticks() {
        let earth = write_image("scenario-earth.png", 4, 2);
        let mut renderer = renderer();
        renderer.initialize(&earth, Some(Path::new(""))).unwrap();
        renderer.resize(800, 600).unwrap();
        for _ in 0..10 {
            renderer.advance().unwrap();
        }
        renderer.backend_mut().take_calls();
        renderer.render_frame().unwrap();

        let calls = renderer.backend_mut().take_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], Call::Clear);
        let Call::Sphere { texture, sphere } = &calls[1] else {
            panic!("expected a sphere draw, got {:?}", calls[1]);
        };
        assert_eq!(*texture, 1);
        assert_eq!(sphere.angle, 5.0);
        assert_eq!(sphere.radius, 1.5);
        assert_eq!((sphere.slices, sphere.stacks), (32, 32));
        assert_eq!(sphere.axis, Vec3::new(2.0, -1.0, -1.0).normalize());
        assert_eq!(sphere.camera_offset, Vec3::new(0.0, 0.0, -4.5));
        assert_eq!(sphere.scale, 1.0);

        // The model moves the origin to the camera offset and leaves the axis in place.
        let origin = sphere.model.transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(0.0, 0.0, -4.5)).length() < 1e-5);
        let axis = sphere.model.transform_vector3(sphere.axis);
        assert!((axis - sphere.axis).length() < 1e-5);
    }

    #[test]
    fn test_background_drawn_once_before_sphere() {
        let earth = write_image("bg-earth.png", 2, 2);
        let stars = write_image("bg-stars.png", 3, 3);
        let mut renderer = renderer();
        renderer.initialize(&earth, Some(stars.as_path())).unwrap();
        assert!(renderer.has_background());
        renderer.backend_mut().take_calls();

        renderer.render_frame().unwrap();
        let calls = renderer.backend_mut().take_calls();
        assert_eq!(calls.len(), 5);
        assert_eq!(calls[0], Call::Clear);
        assert_eq!(calls[1], Call::DepthTest(false));
        assert!(matches!(calls[2], Call::Background { texture: 2, .. }));
        assert_eq!(calls[3], Call::DepthTest(true));
        assert!(matches!(calls[4], Call::Sphere { texture: 1, .. }));
    }

    #[test]
    fn test_background_quad_follows_resize() {
        let earth = write_image("quad-earth.png", 2, 2);
        let stars = write_image("quad-stars.png", 2, 2);
        let mut renderer = renderer();
        renderer.initialize(&earth, Some(stars.as_path())).unwrap();

        for (width, height) in [(800, 600), (1280, 720), (333, 777)] {
            renderer.resize(width, height).unwrap();
            let quad = renderer.plan_frame().unwrap().background.unwrap();
            let screen_of = |uv: Vec2| quad.corners.iter().find(|c| c.uv == uv).unwrap().screen;
            assert_eq!(screen_of(Vec2::ZERO), Vec2::ZERO);
            assert_eq!(
                screen_of(Vec2::ONE),
                Vec2::new(width as f32, height as f32)
            );

            // The orthographic projection maps those corners to the clip-space corners.
            let low = quad.projection.project_point3(Vec3::ZERO);
            let high = quad
                .projection
                .project_point3(Vec3::new(width as f32, height as f32, 0.0));
            assert!((low.truncate() - Vec2::new(-1.0, -1.0)).length() < 1e-5);
            assert!((high.truncate() - Vec2::new(1.0, 1.0)).length() < 1e-5);
        }
    }
}
