/// Per-frame expansion of an indexed triangulation into flat vertex arrays
use crate::error::IndexError;
use crate::geometry::Triangulation;

pub const VERTICES_PER_TRIANGLE: usize = 3;
pub const COORDINATES_PER_VERTEX: usize = 3;
pub const CHANNELS_PER_VERTEX: usize = 3;

/// Dark red, applied to every vertex by [`build_color_buffer`]
pub const DEFAULT_VERTEX_COLOR: [f32; 3] = [0.5, 0.0, 0.0];

/// Expand every triangle into the x, y, z of its v1, v2 and v3 points.
///
/// The result always holds `9 * triangle_count` floats. Indices are
/// bounds-checked against the point sequence.
pub fn build_position_buffer(mesh: &Triangulation) -> Result<Vec<f32>, IndexError> {
    let points = mesh.unique_points();
    let mut positions = Vec::with_capacity(
        mesh.triangle_count() * VERTICES_PER_TRIANGLE * COORDINATES_PER_VERTEX,
    );

    for (triangle_index, triangle) in mesh.triangles().iter().enumerate() {
        for index in triangle.indices() {
            let point = points.get(index).ok_or(IndexError {
                triangle: triangle_index,
                index,
                point_count: points.len(),
            })?;
            positions.extend_from_slice(&[point.x(), point.y(), point.z()]);
        }
    }

    Ok(positions)
}

/// One [`DEFAULT_VERTEX_COLOR`] triple per vertex of `triangle_count` triangles
pub fn build_color_buffer(triangle_count: usize) -> Vec<f32> {
    build_color_buffer_with(triangle_count, DEFAULT_VERTEX_COLOR)
}

/// One `rgb` triple per vertex of `triangle_count` triangles
pub fn build_color_buffer_with(triangle_count: usize, rgb: [f32; 3]) -> Vec<f32> {
    let len = triangle_count * VERTICES_PER_TRIANGLE * CHANNELS_PER_VERTEX;
    assert_eq!(len % CHANNELS_PER_VERTEX, 0);

    let colors: Vec<f32> = rgb.iter().copied().cycle().take(len).collect();
    debug_assert_eq!(colors.len(), len);
    colors
}

/// Position and color arrays for one frame, ready for upload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameBuffers {
    pub positions: Vec<f32>,
    pub colors: Vec<f32>,
}

impl FrameBuffers {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build both buffers for `mesh` with the default vertex color.
    pub fn build(mesh: &Triangulation) -> Result<Self, IndexError> {
        Self::build_with_color(mesh, DEFAULT_VERTEX_COLOR)
    }

    pub fn build_with_color(mesh: &Triangulation, rgb: [f32; 3]) -> Result<Self, IndexError> {
        let positions = build_position_buffer(mesh)?;
        let colors = build_color_buffer_with(mesh.triangle_count(), rgb);
        Ok(Self { positions, colors })
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / COORDINATES_PER_VERTEX
    }

    pub fn triangle_count(&self) -> usize {
        self.vertex_count() / VERTICES_PER_TRIANGLE
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Iterate over (position, color) pairs, one per vertex.
    pub fn vertices(&self) -> impl Iterator<Item = ([f32; 3], [f32; 3])> + '_ {
        self.positions
            .chunks_exact(COORDINATES_PER_VERTEX)
            .zip(self.colors.chunks_exact(CHANNELS_PER_VERTEX))
            .map(|(p, c)| ([p[0], p[1], p[2]], [c[0], c[1], c[2]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point3D, Triangle};
    use crate::obj::parse_str;

    #[test]
    fn test_position_buffer_follows_index_order() {
        let mut mesh = Triangulation::new();
        let a = mesh.register_point(Point3D::new(1.0, 2.0, 3.0));
        let b = mesh.register_point(Point3D::new(4.0, 5.0, 6.0));
        let c = mesh.register_point(Point3D::new(7.0, 8.0, 9.0));
        mesh.add_triangle(c, a, b);

        let positions = build_position_buffer(&mesh).unwrap();
        assert_eq!(
            positions,
            vec![7.0, 8.0, 9.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]
        );
    }

    #[test]
    fn test_duplicate_corner_scenario() {
        let mut mesh = Triangulation::new();
        parse_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nv 0 0 0\nf 4 2 3\n", &mut mesh).unwrap();

        let positions = build_position_buffer(&mesh).unwrap();
        assert_eq!(positions.len(), 9);
        assert_eq!(
            positions,
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]
        );
    }

    #[test]
    fn test_repeated_index_repeats_coordinates() {
        let mut mesh = Triangulation::new();
        let a = mesh.register_point(Point3D::new(1.0, 1.0, 1.0));
        let b = mesh.register_point(Point3D::new(2.0, 2.0, 2.0));
        mesh.add_triangle(a, b, a);

        let positions = build_position_buffer(&mesh).unwrap();
        assert_eq!(&positions[0..3], &positions[6..9]);
    }

    #[test]
    fn test_buffer_lengths_match() {
        for size in [0.5, 1.0, 3.0] {
            let cube = Triangulation::cube(size);
            let positions = build_position_buffer(&cube).unwrap();
            let colors = build_color_buffer(cube.triangle_count());
            assert_eq!(positions.len(), 9 * cube.triangle_count());
            assert_eq!(colors.len(), positions.len());
        }
    }

    #[test]
    fn test_color_buffer_is_dark_red() {
        let colors = build_color_buffer(2);
        assert_eq!(colors.len(), 18);
        for rgb in colors.chunks_exact(3) {
            assert_eq!(rgb, &[0.5, 0.0, 0.0]);
        }
    }

    #[test]
    fn test_custom_color() {
        let colors = build_color_buffer_with(1, [0.1, 0.2, 0.3]);
        assert_eq!(colors, vec![0.1, 0.2, 0.3, 0.1, 0.2, 0.3, 0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_empty_mesh_builds_empty_buffers() {
        let mesh = Triangulation::new();
        let buffers = FrameBuffers::build(&mesh).unwrap();
        assert!(buffers.is_empty());
        assert_eq!(buffers.positions.len(), 0);
        assert_eq!(buffers.colors.len(), 0);
        assert_eq!(buffers.vertex_count(), 0);
        assert_eq!(build_color_buffer(0).len(), 0);
    }

    #[test]
    fn test_out_of_range_index_is_reported() {
        let mut mesh = Triangulation::new();
        let a = mesh.register_point(Point3D::new(0.0, 0.0, 0.0));
        let b = mesh.register_point(Point3D::new(1.0, 0.0, 0.0));
        mesh.add_triangle(a, b, a);
        mesh.push_triangle_unchecked(Triangle::new(a, b, 2));

        let err = build_position_buffer(&mesh).unwrap_err();
        assert_eq!(
            err,
            IndexError {
                triangle: 1,
                index: 2,
                point_count: 2,
            }
        );
        assert!(FrameBuffers::build(&mesh).is_err());
    }

    #[test]
    fn test_frame_buffers_vertices() {
        let cube = Triangulation::cube(2.0);
        let buffers = FrameBuffers::build(&cube).unwrap();
        assert_eq!(buffers.vertex_count(), 36);
        assert_eq!(buffers.triangle_count(), 12);
        assert_eq!(buffers.vertices().count(), 36);
        assert!(buffers
            .vertices()
            .all(|(_, color)| color == DEFAULT_VERTEX_COLOR));
    }
}
