//! Point-cloud scene
//!
//! Uploads the scene geometry once and draws it every frame with a single MVP.

use super::buffer::{upload_buffer, BufferHandle, BufferTarget, BufferUsage, GraphicsBackend};
use super::mesh::{self, Geometry};
use crate::error::{Error, Result};
use crate::math::{FrameState, Mat4};
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawMode {
    Points,
    Lines,
    Triangles,
}

/// Buffers and vertex count for one uploaded object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Drawable {
    pub positions: BufferHandle,
    pub colors: BufferHandle,
    pub color_components: usize,
    pub vertex_count: usize,
    pub mode: DrawMode,
}

impl Drawable {
    /// Uploads positions and colors as two `f32` vertex buffers.
    pub fn upload<B>(backend: &mut B, geometry: &Geometry, mode: DrawMode, usage: BufferUsage) -> Result<Self>
    where
        B: GraphicsBackend + ?Sized,
    {
        if geometry.positions.len() % 3 != 0 {
            return Err(Error::InvalidArgument(format!(
                "position count {} is not a multiple of 3",
                geometry.positions.len()
            )));
        }
        if !matches!(geometry.color_components, 3 | 4)
            || geometry.colors.len() != geometry.vertex_count() * geometry.color_components
        {
            return Err(Error::InvalidArgument(format!(
                "{} color values do not match {} vertices with {} components",
                geometry.colors.len(),
                geometry.vertex_count(),
                geometry.color_components
            )));
        }

        let positions = upload_buffer(backend, &geometry.positions, BufferTarget::Array, usage)?;
        let colors = upload_buffer(backend, &geometry.colors, BufferTarget::Array, usage)?;
        Ok(Self {
            positions,
            colors,
            color_components: geometry.color_components,
            vertex_count: geometry.vertex_count(),
            mode,
        })
    }
}

/// Per-frame drawing calls on top of the buffer capabilities.
pub trait DrawBackend: GraphicsBackend {
    /// Hands the 16 column-major floats of `mvp` to the shader uniform.
    fn set_mvp(&mut self, mvp: &Mat4) -> Result<()>;

    fn draw(&mut self, drawable: &Drawable) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub point_count: usize,
    pub point_size: f32,
    pub axis_radius: f32,
    pub axis_length: f32,
    pub cylinder_segments: u32,
    pub circle_radius: f32,
    pub circle_segments: u32,
    /// Grid divisions per half axis; no grid when `None`.
    pub grid_divisions: Option<u32>,
    pub clear_color: [f32; 4],
    pub spin_step: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            point_count: 1000,
            point_size: 3.0,
            axis_radius: 0.02,
            axis_length: 2.0,
            cylinder_segments: 16,
            circle_radius: 1.0,
            circle_segments: 64,
            grid_divisions: None,
            clear_color: [0.0, 0.1, 0.25, 1.0],
            spin_step: 0.01,
        }
    }
}

/// Host-side arrays for every object in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneGeometry {
    pub points: Geometry,
    pub axes: Geometry,
    pub circles: Geometry,
    pub grid: Option<Geometry>,
}

impl SceneGeometry {
    pub fn generate<R: Rng + ?Sized>(config: &SceneConfig, rng: &mut R) -> Self {
        Self {
            points: mesh::unit_sphere_points(rng, config.point_count),
            axes: mesh::axis_cylinders(config.axis_radius, config.axis_length, config.cylinder_segments),
            circles: mesh::reference_circles(config.circle_radius, config.circle_segments),
            grid: config
                .grid_divisions
                .map(|divisions| mesh::grid(config.circle_radius, divisions)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointCloudScene {
    pub points: Drawable,
    pub axes: Drawable,
    pub circles: Drawable,
    pub grid: Option<Drawable>,
}

impl PointCloudScene {
    pub fn upload<B>(backend: &mut B, geometry: &SceneGeometry, usage: BufferUsage) -> Result<Self>
    where
        B: GraphicsBackend + ?Sized,
    {
        let points = Drawable::upload(backend, &geometry.points, DrawMode::Points, usage)?;
        let axes = Drawable::upload(backend, &geometry.axes, DrawMode::Triangles, usage)?;
        let circles = Drawable::upload(backend, &geometry.circles, DrawMode::Lines, usage)?;
        let grid = geometry
            .grid
            .as_ref()
            .map(|g| Drawable::upload(backend, g, DrawMode::Lines, usage))
            .transpose()?;

        log::info!(
            "scene uploaded: {} points, {} axis vertices, {} circle vertices{}",
            points.vertex_count,
            axes.vertex_count,
            circles.vertex_count,
            grid.as_ref().map(|g| format!(", {} grid vertices", g.vertex_count)).unwrap_or_default()
        );

        Ok(Self {
            points,
            axes,
            circles,
            grid,
        })
    }

    pub fn drawables(&self) -> impl Iterator<Item = &Drawable> {
        [&self.points, &self.axes, &self.circles]
            .into_iter()
            .chain(self.grid.as_ref())
    }

    /// Sets the frame's MVP once, then draws every object.
    pub fn render<B>(&self, backend: &mut B, frame: &FrameState) -> Result<()>
    where
        B: DrawBackend + ?Sized,
    {
        backend.set_mvp(&frame.mvp())?;
        for drawable in self.drawables() {
            backend.draw(drawable)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::buffer::ElementType;
    use crate::render::recording::{BackendCall, RecordingBackend};
    use crate::render::Camera;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_config() -> SceneConfig {
        SceneConfig {
            point_count: 50,
            cylinder_segments: 4,
            circle_segments: 8,
            ..Default::default()
        }
    }

    #[test]
    fn upload_creates_two_float_buffers_per_object() {
        let mut rng = StdRng::seed_from_u64(11);
        let geometry = SceneGeometry::generate(&small_config(), &mut rng);
        let mut backend = RecordingBackend::new();
        let scene = PointCloudScene::upload(&mut backend, &geometry, BufferUsage::StaticDraw).unwrap();

        assert_eq!(backend.buffer_count(), 6);
        assert!(backend.calls().iter().all(|c| match c {
            BackendCall::BufferData { element_type, .. } => *element_type == ElementType::F32,
            _ => true,
        }));
        assert_eq!(scene.points.vertex_count, 50);
        assert_eq!(scene.axes.vertex_count, 3 * 4 * 12);
        assert_eq!(scene.circles.vertex_count, 3 * 8 * 2);
        assert!(scene.grid.is_none());

        let staged = backend.staged(scene.points.positions).unwrap();
        assert_eq!(staged.view.byte_len(), 50 * 3 * 4);
    }

    #[test]
    fn grid_adds_a_fourth_drawable() {
        let config = SceneConfig {
            grid_divisions: Some(2),
            ..small_config()
        };
        let mut rng = StdRng::seed_from_u64(12);
        let geometry = SceneGeometry::generate(&config, &mut rng);
        let mut backend = RecordingBackend::new();
        let scene = PointCloudScene::upload(&mut backend, &geometry, BufferUsage::StaticDraw).unwrap();
        assert_eq!(scene.drawables().count(), 4);
        assert_eq!(scene.grid.unwrap().color_components, 4);
    }

    #[test]
    fn render_sets_mvp_then_draws_in_order() {
        let mut rng = StdRng::seed_from_u64(13);
        let geometry = SceneGeometry::generate(&small_config(), &mut rng);
        let mut backend = RecordingBackend::new();
        let scene = PointCloudScene::upload(&mut backend, &geometry, BufferUsage::StaticDraw).unwrap();
        backend.clear_calls();

        let camera = Camera::default();
        let frame = camera.frame(Mat4::rotate_y(0.5));
        scene.render(&mut backend, &frame).unwrap();

        let calls = backend.calls();
        assert_eq!(calls[0], BackendCall::SetMvp(frame.mvp().to_cols_array()));
        assert_eq!(
            calls[1..],
            [
                BackendCall::Draw {
                    mode: DrawMode::Points,
                    vertex_count: 50
                },
                BackendCall::Draw {
                    mode: DrawMode::Triangles,
                    vertex_count: 144
                },
                BackendCall::Draw {
                    mode: DrawMode::Lines,
                    vertex_count: 48
                },
            ]
        );
        assert_eq!(backend.mvp(), Some(frame.mvp()));
        assert_eq!(backend.upload_count(), 0);
    }

    #[test]
    fn empty_geometry_is_rejected() {
        let mut backend = RecordingBackend::new();
        let err = Drawable::upload(&mut backend, &Geometry::default(), DrawMode::Points, BufferUsage::StaticDraw)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn mismatched_colors_are_rejected_before_upload() {
        let mut backend = RecordingBackend::new();
        let geometry = Geometry {
            positions: vec![0.0; 6],
            colors: vec![1.0; 3],
            color_components: 3,
        };
        let err = Drawable::upload(&mut backend, &geometry, DrawMode::Lines, BufferUsage::StaticDraw).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(backend.calls().is_empty());
    }
}
