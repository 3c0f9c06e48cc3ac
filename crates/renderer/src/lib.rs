//! 2D rendering for Hollowdeep: follow camera, draw lists and a wgpu sprite batcher.

pub mod camera;
pub mod draw;
pub mod pipeline;
pub mod renderer;
pub mod texture;
pub mod vertex;

pub use camera::*;
pub use draw::*;
pub use pipeline::*;
pub use renderer::*;
pub use texture::*;
pub use vertex::*;
