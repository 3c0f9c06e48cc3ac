//! Collision and spatial indexing for Hollowdeep.
//!
//! - [`SpatialStore`]: chunked map from grid cell to world objects, with an
//!   overflow list for objects larger than one chunk.
//! - [`resolve_collisions`]: axis-of-least-penetration AABB response.

pub mod collision;
pub mod spatial;

pub use collision::*;
pub use spatial::*;
