//! Load-once scene state and the per-frame render boundary.
//!
//! A [`Scene`] owns the triangulation read at setup. Every refresh, the
//! render loop asks it for a [`Frame`]: flat position and color buffers plus
//! the model-view-projection matrix for the current frame count.

use std::path::Path;

use nalgebra::Matrix4;
use tracing::warn;

use crate::buffers::FrameBuffers;
use crate::camera::{aspect_ratio, CameraAnimator, CameraSettings};
use crate::error::ParseError;
use crate::geometry::Triangulation;
use crate::obj::Reader;

/// Size of the drawable surface in pixels (or cells)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        aspect_ratio(self.width, self.height)
    }
}

/// Everything the rendering collaborator needs to draw one frame
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub buffers: FrameBuffers,
    pub mvp: Matrix4<f32>,
}

impl Frame {
    pub fn vertex_count(&self) -> usize {
        self.buffers.vertex_count()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scene {
    mesh: Triangulation,
    camera: CameraAnimator,
}

impl Scene {
    pub fn new(mesh: Triangulation) -> Self {
        Self {
            mesh,
            camera: CameraAnimator::default(),
        }
    }

    /// A scene with nothing to draw
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_camera(mut self, settings: CameraSettings) -> Self {
        self.camera = CameraAnimator::new(settings);
        self
    }

    /// Read the mesh file once.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let mut mesh = Triangulation::new();
        Reader::new(path).read_file(&mut mesh)?;
        Ok(Self::new(mesh))
    }

    /// Read the mesh file, falling back to an empty scene if it cannot be
    /// parsed.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::load(path).unwrap_or_else(|e| {
            warn!("Drawing an empty scene, {} could not be loaded: {}", path.display(), e);
            Self::empty()
        })
    }

    pub fn triangulation(&self) -> &Triangulation {
        &self.mesh
    }

    pub fn camera(&self) -> &CameraAnimator {
        &self.camera
    }

    /// Build the buffers and matrix for frame number `frame_count`.
    ///
    /// A broken triangle index only costs this frame its geometry; the
    /// matrix is still produced.
    pub fn frame(&self, frame_count: u64, viewport: Viewport, refresh_rate_hz: f32) -> Frame {
        let buffers = FrameBuffers::build(&self.mesh).unwrap_or_else(|e| {
            warn!("Skipping geometry for frame {}: {}", frame_count, e);
            FrameBuffers::empty()
        });
        let mvp = self
            .camera
            .compute_matrix(frame_count, refresh_rate_hz, viewport.aspect());

        Frame { buffers, mvp }
    }
}
