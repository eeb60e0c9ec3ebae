/// ASCII rasterizer for the core's flat frame buffers
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use meshspin_core::Frame;
use nalgebra::{Matrix4, Vector4};
use std::io::Write;

/// Character luminosity ramp for depth shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &['.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Vertices closer to the eye plane than this are dropped
const MIN_CLIP_W: f32 = 1e-6;

/// Darkest a shaded color is allowed to get
const MIN_BRIGHTNESS: f32 = 0.35;

/// A vertex after the model-view-projection transform, in cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Projected {
    x: f32,
    y: f32,
    /// Eye-space distance, taken from the clip-space w
    depth: f32,
}

/// Depth-buffered renderer that turns a [`Frame`] into terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::Reset; size],
        }
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
        self.color_buffer.fill(Color::Reset);
    }

    /// Character at a cell, for inspection
    pub fn cell(&self, x: usize, y: usize) -> Option<char> {
        if x < self.width && y < self.height {
            Some(self.char_buffer[y * self.width + x])
        } else {
            None
        }
    }

    /// Number of cells covered by geometry
    pub fn covered_cells(&self) -> usize {
        self.char_buffer.iter().filter(|&&c| c != ' ').count()
    }

    pub fn render_frame(&mut self, frame: &Frame) {
        let vertices: Vec<(Option<Projected>, [f32; 3])> = frame
            .buffers
            .vertices()
            .map(|(position, color)| (self.project(&frame.mvp, position), color))
            .collect();

        // Shade relative to the visible depth range of this frame
        let (near, far) = vertices
            .iter()
            .filter_map(|(p, _)| p.map(|p| p.depth))
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), d| {
                (lo.min(d), hi.max(d))
            });

        for triangle in vertices.chunks_exact(3) {
            let (Some(a), Some(b), Some(c)) = (triangle[0].0, triangle[1].0, triangle[2].0) else {
                continue; // Triangle is clipped
            };

            let mean_depth = (a.depth + b.depth + c.depth) / 3.0;
            let brightness = if far > near {
                1.0 - (mean_depth - near) / (far - near)
            } else {
                1.0
            };

            let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32).round() as usize;
            let character = LUMINOSITY_RAMP[char_index.min(LUMINOSITY_RAMP.len() - 1)];
            let color = shade(triangle[0].1, brightness);

            self.rasterize_triangle([a, b, c], character, color);
        }
    }

    fn project(&self, mvp: &Matrix4<f32>, position: [f32; 3]) -> Option<Projected> {
        let clip = mvp * Vector4::new(position[0], position[1], position[2], 1.0);
        if clip.w < MIN_CLIP_W {
            return None;
        }

        let ndc = clip.xyz() / clip.w;
        if !(-1.0..=1.0).contains(&ndc.z) {
            return None;
        }

        Some(Projected {
            x: (ndc.x + 1.0) * 0.5 * self.width as f32,
            y: (1.0 - ndc.y) * 0.5 * self.height as f32,
            depth: clip.w,
        })
    }

    fn rasterize_triangle(&mut self, corners: [Projected; 3], character: char, color: Color) {
        let [v0, v1, v2] = corners;
        if self.width == 0 || self.height == 0 {
            return;
        }

        // Bounding box
        let min_x = v0.x.min(v1.x).min(v2.x).floor() as i32;
        let max_x = v0.x.max(v1.x).max(v2.x).ceil() as i32;
        let min_y = v0.y.min(v1.y).min(v2.y).floor() as i32;
        let max_y = v0.y.max(v1.y).max(v2.y).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let Some((w0, w1, w2)) =
                    barycentric((v0.x, v0.y), (v1.x, v1.y), (v2.x, v2.y), (px, py))
                else {
                    return; // Degenerate on screen
                };

                // Either winding counts, the mesh has no culling
                let inside = (w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0)
                    || (w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0);
                if !inside {
                    continue;
                }

                let depth = w0 * v0.depth + w1 * v1.depth + w2 * v2.depth;
                let idx = y as usize * self.width + x as usize;
                // Less-or-equal, later triangles win ties
                if depth <= self.depth_buffer[idx] {
                    self.depth_buffer[idx] = depth;
                    self.char_buffer[idx] = character;
                    self.color_buffer[idx] = color;
                }
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut current = None;
        for y in 0..self.height {
            writer.queue(cursor::MoveTo(0, y as u16))?;
            for x in 0..self.width {
                let idx = y * self.width + x;
                let color = self.color_buffer[idx];
                if current != Some(color) {
                    writer.queue(SetForegroundColor(color))?;
                    current = Some(color);
                }
                writer.queue(Print(self.char_buffer[idx]))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Scale a 0-1 RGB triple by brightness into a terminal color
fn shade(rgb: [f32; 3], brightness: f32) -> Color {
    let scale = MIN_BRIGHTNESS + (1.0 - MIN_BRIGHTNESS) * brightness.clamp(0.0, 1.0);
    let channel = |v: f32| ((v * scale).clamp(0.0, 1.0) * 255.0).round() as u8;
    Color::Rgb {
        r: channel(rgb[0]),
        g: channel(rgb[1]),
        b: channel(rgb[2]),
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshspin_core::{Scene, Triangulation, Viewport};

    #[test]
    fn test_barycentric_inside_and_outside() {
        let (a, b, c) = ((0.0, 0.0), (4.0, 0.0), (0.0, 4.0));
        let (w0, w1, w2) = barycentric(a, b, c, (1.0, 1.0)).unwrap();
        assert!(w0 > 0.0 && w1 > 0.0 && w2 > 0.0);
        assert!((w0 + w1 + w2 - 1.0).abs() < 1e-6);

        let (w0, w1, w2) = barycentric(a, b, c, (5.0, 5.0)).unwrap();
        assert!(w0 < 0.0 || w1 < 0.0 || w2 < 0.0);

        assert!(barycentric(a, a, a, (0.0, 0.0)).is_none());
    }

    #[test]
    fn test_renders_cube_in_centre() {
        let scene = Scene::new(Triangulation::cube(1.0));
        let mut renderer = AsciiRenderer::new(40, 20);
        let frame = scene.frame(30, Viewport::new(40, 40), 60.0);

        renderer.render_frame(&frame);
        assert!(renderer.covered_cells() > 0);
        assert_ne!(renderer.cell(20, 10), Some(' '));
        assert_eq!(renderer.cell(0, 0), Some(' '));
        assert_eq!(renderer.cell(40, 0), None);
    }

    #[test]
    fn test_empty_frame_draws_nothing() {
        let scene = Scene::empty();
        let mut renderer = AsciiRenderer::new(10, 5);
        renderer.render_frame(&scene.frame(0, Viewport::new(10, 10), 60.0));
        assert_eq!(renderer.covered_cells(), 0);

        let mut out = Vec::new();
        renderer.draw(&mut out).unwrap();
        assert!(!out.is_empty());
    }

    #[test]
    fn test_clear_and_resize() {
        let scene = Scene::new(Triangulation::cube(1.0));
        let mut renderer = AsciiRenderer::new(30, 15);
        renderer.render_frame(&scene.frame(0, Viewport::new(30, 30), 60.0));
        assert!(renderer.covered_cells() > 0);

        renderer.clear();
        assert_eq!(renderer.covered_cells(), 0);

        renderer.resize(8, 4);
        assert_eq!(renderer.size(), (8, 4));
        assert_eq!(renderer.cell(7, 3), Some(' '));

        renderer.resize(0, 0);
        renderer.render_frame(&scene.frame(0, Viewport::new(0, 0), 60.0));
        assert_eq!(renderer.covered_cells(), 0);
    }

    #[test]
    fn test_shade_keeps_hue() {
        assert_eq!(shade([0.5, 0.0, 0.0], 1.0), Color::Rgb { r: 128, g: 0, b: 0 });
        match shade([0.5, 0.0, 0.0], 0.0) {
            Color::Rgb { r, g, b } => {
                assert!(r > 0 && r < 128);
                assert_eq!((g, b), (0, 0));
            }
            other => panic!("unexpected color {:?}", other),
        }
    }
}
