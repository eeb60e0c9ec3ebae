/// Index-based mesh primitives: points, triangles and the deduplicating triangulation
use std::collections::HashMap;

use nalgebra::Point3;

/// A single 3D coordinate. Two points are equal when their coordinates are.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point3D {
    position: Point3<f32>,
}

impl Point3D {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Point3::new(x, y, z),
        }
    }

    pub fn x(&self) -> f32 {
        self.position.x
    }

    pub fn y(&self) -> f32 {
        self.position.y
    }

    pub fn z(&self) -> f32 {
        self.position.z
    }

    pub fn is_finite(&self) -> bool {
        self.position.coords.iter().all(|c| c.is_finite())
    }

    /// Hash key that agrees with `==` for finite coordinates.
    fn key(&self) -> [u32; 3] {
        // -0.0 == 0.0 but their bit patterns differ
        let canonical = |v: f32| if v == 0.0 { 0 } else { v.to_bits() };
        [
            canonical(self.position.x),
            canonical(self.position.y),
            canonical(self.position.z),
        ]
    }
}

/// Three indices into the owning triangulation's point sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Triangle {
    indices: [usize; 3],
}

impl Triangle {
    pub fn new(v1: usize, v2: usize, v3: usize) -> Self {
        Self {
            indices: [v1, v2, v3],
        }
    }

    pub fn v1(&self) -> usize {
        self.indices[0]
    }

    pub fn v2(&self) -> usize {
        self.indices[1]
    }

    pub fn v3(&self) -> usize {
        self.indices[2]
    }

    /// The indices in draw order: v1, v2, v3.
    pub fn indices(&self) -> [usize; 3] {
        self.indices
    }
}

/// A mesh of unique points and the triangles connecting them.
///
/// Points are only ever appended, so an index handed out by
/// [`register_point`](Self::register_point) stays valid for the lifetime of
/// the triangulation. No two stored points compare equal.
#[derive(Debug, Clone, Default)]
pub struct Triangulation {
    points: Vec<Point3D>,
    triangles: Vec<Triangle>,
    lookup: HashMap<[u32; 3], usize>,
}

impl Triangulation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(points: usize, triangles: usize) -> Self {
        Self {
            points: Vec::with_capacity(points),
            triangles: Vec::with_capacity(triangles),
            lookup: HashMap::with_capacity(points),
        }
    }

    /// Return the index of a point equal to `point`, appending it first if
    /// no such point is stored yet.
    pub fn register_point(&mut self, point: Point3D) -> usize {
        debug_assert!(point.is_finite(), "non-finite point {:?}", point);
        let next = self.points.len();
        let index = *self.lookup.entry(point.key()).or_insert(next);
        if index == next {
            self.points.push(point);
        }
        index
    }

    /// Append a triangle. The indices must come from
    /// [`register_point`](Self::register_point) on this triangulation.
    pub fn add_triangle(&mut self, i1: usize, i2: usize, i3: usize) {
        let count = self.points.len();
        debug_assert!(
            i1 < count && i2 < count && i3 < count,
            "triangle ({}, {}, {}) out of range for {} points",
            i1,
            i2,
            i3,
            count
        );
        self.triangles.push(Triangle::new(i1, i2, i3));
    }

    pub fn unique_points(&self) -> &[Point3D] {
        &self.points
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// True when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Append a triangle without checking its indices.
    #[cfg(test)]
    pub(crate) fn push_triangle_unchecked(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// Build an axis-aligned cube centred on the origin.
    ///
    /// Every triangle registers its own three corners, so the 36 corner
    /// registrations collapse onto 8 shared points.
    pub fn cube(size: f32) -> Self {
        let half = size / 2.0;
        let mut mesh = Self::with_capacity(8, CUBE_TRIANGLES.len());

        for corners in CUBE_TRIANGLES {
            let [a, b, c] = corners
                .map(|[x, y, z]| mesh.register_point(Point3D::new(x * half, y * half, z * half)));
            mesh.add_triangle(a, b, c);
        }

        mesh
    }
}

/// Unit cube corners per triangle, two triangles per face
const CUBE_TRIANGLES: [[[f32; 3]; 3]; 12] = [
    // Front
    [[-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0]],
    [[-1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]],
    // Back
    [[-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [1.0, 1.0, -1.0]],
    [[-1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [1.0, -1.0, -1.0]],
    // Top
    [[-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0], [1.0, 1.0, 1.0]],
    [[-1.0, 1.0, -1.0], [1.0, 1.0, 1.0], [1.0, 1.0, -1.0]],
    // Bottom
    [[-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, -1.0, 1.0]],
    [[-1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [-1.0, -1.0, 1.0]],
    // Right
    [[1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0]],
    [[1.0, -1.0, -1.0], [1.0, 1.0, 1.0], [1.0, -1.0, 1.0]],
    // Left
    [[-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0]],
    [[-1.0, -1.0, -1.0], [-1.0, 1.0, 1.0], [-1.0, 1.0, -1.0]],
];
