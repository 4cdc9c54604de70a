//! Render pipelines.

pub mod mesh;
