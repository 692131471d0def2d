//! Platform front ends.

pub mod winit;
