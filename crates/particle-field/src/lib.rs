// src/lib.rs
//! Decorative particle background.
//!
//! A fixed cloud of additively blended point sprites, slowly drifting around
//! its vertical axis and tilted by the pointer, rendered once per display
//! refresh with wgpu.

pub mod camera;
pub mod clock;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod field;
pub mod host;
pub mod renderer;
pub mod viewport;

pub use crate::{
    config::Config,
    error::{FieldError, RenderError},
    field::{CloudRotation, FrameBudget, FrameRenderer, ParticleField},
    viewport::Viewport,
};
