// src/data/mod.rs
//! Data handling modules for the particle field.
//!
//! This module provides functionality for:
//! - Generating the point cloud and uploading it to the GPU.
//! - Defining the data structures for GPU buffers and the sprite material.

pub mod point_cloud;
pub mod types;

// Re-export commonly used types for convenience.
pub use self::point_cloud::PointCloud;
pub use self::types::{FieldUniformStd140, PointInstance, PointMaterial, ADDITIVE_BLENDING};
