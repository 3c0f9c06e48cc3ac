//! Core engine types and utilities for Hollowdeep.
//!
//! This crate provides the foundational types used across all engine systems:
//! - Axis-aligned rectangles and world objects
//! - Resource and upgrade tables
//! - Stage definitions
//! - Fixed-tick timing
//! - Common component types for ECS

pub mod components;
pub mod rect;
pub mod resources;
pub mod stage;
pub mod time;
pub mod world;

pub use components::*;
pub use rect::*;
pub use resources::*;
pub use stage::*;
pub use time::*;
pub use world::*;

// Re-export commonly used types
pub use glam::{IVec2, Vec2, Vec4};
pub use hecs::{Entity, World};
