//! # Core Module
//!
//! Shared-ownership primitives used across the viewer.
//!
//! The viewer runs entirely on the render thread, so the only container needed is the
//! single-threaded [`StResource`] and its weak counterpart.

pub mod st_resource;

pub use st_resource::{StResource, WeakStResource};
