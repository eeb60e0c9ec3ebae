/// meshspin core library - indexed mesh loading and per-frame buffer generation
///
/// Reads a mesh file once into a deduplicated point/triangle triangulation,
/// expands it every frame into flat position and color arrays, and computes
/// the model-view-projection matrix of a continuously spinning camera.

pub mod buffers;
pub mod camera;
pub mod error;
pub mod geometry;
pub mod obj;
pub mod scene;
pub mod transform;

// Re-export commonly used types
pub use buffers::{build_color_buffer, build_position_buffer, FrameBuffers};
pub use camera::{compute_matrix, CameraAnimator, CameraSettings, FrameCounter};
pub use error::{Error, IndexError, ParseError};
pub use geometry::{Point3D, Triangle, Triangulation};
pub use obj::Reader;
pub use scene::{Frame, Scene, Viewport};
pub use transform::{RotationState, Transform};
