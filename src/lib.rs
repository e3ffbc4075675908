//! GPU resource lifecycle helpers built on top of [ash].
//!
//! This crate owns the hard part of a command-buffer/fence based renderer:
//! creating buffers and images with correctly chosen memory types, staging
//! host data into device-local memory, and destroying resources only once a
//! fence proves the GPU can no longer reference them.

pub mod logging;
pub mod vulkan;
