//! The device context: the front door for everything in this library.
//!
//! A DeviceContext owns the render device, the per-worker command pools, and
//! the recycler. Applications create one context, share it behind an Arc,
//! and go through it for resource creation, staging, submission, and
//! deferred destruction.

mod context;

use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::vulkan::{
    command_buffer::{CommandBufferError, WorkerPools},
    recycler::{Disposable, Recycler},
    render_device::RenderDevice,
    sync::{Fence, FenceError},
};

#[derive(Debug, Error)]
pub enum ContextError {
    #[error(transparent)]
    UnexpectedFenceError(#[from] FenceError),

    #[error(transparent)]
    UnexpectedCommandBufferError(#[from] CommandBufferError),
}

/// The application-facing facade over the device, command pools, and the
/// recycler.
pub struct DeviceContext {
    /// Retired resources, waiting on their fences. The mutex serializes the
    /// recycler's single-threaded protocol for callers on any thread.
    recycler: Mutex<Recycler<Arc<Fence>, Disposable>>,

    /// One transient command pool per worker, created lazily.
    pub(crate) worker_pools: WorkerPools,

    /// The device shared by everything the context creates.
    pub(crate) vk_dev: Arc<RenderDevice>,
}
