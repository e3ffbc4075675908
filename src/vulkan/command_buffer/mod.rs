mod command_pool;
mod worker_pools;

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use ash::vk;
use thiserror::Error;

use crate::vulkan::{
    render_device::{RenderDevice, RenderDeviceError},
    sync::FenceError,
};

#[derive(Debug, Error)]
pub enum CommandBufferError {
    #[error("Unable to create the command pool")]
    UnableToCreateCommandPool(#[source] vk::Result),

    #[error("Unable to allocate a command buffer from the command pool")]
    UnableToAllocateBuffer(#[source] vk::Result),

    #[error("Unable to reset the command pool")]
    UnableToResetPool(#[source] vk::Result),

    #[error("Unable to begin the command buffer")]
    UnableToBeginCommandBuffer(#[source] vk::Result),

    #[error("Unable to end the command buffer")]
    UnableToEndCommandBuffer(#[source] vk::Result),

    #[error(transparent)]
    UnexpectedFenceError(#[from] FenceError),

    #[error(transparent)]
    UnableToSubmit(#[from] RenderDeviceError),
}

/// An owned command pool which is automatically destroyed when dropped.
pub struct CommandPool {
    /// The raw command pool handle.
    pub raw: vk::CommandPool,

    /// The device which created the pool.
    pub vk_dev: Arc<RenderDevice>,
}

/// Identifies the worker which owns a command pool.
///
/// Command pools are not safe for concurrent recording, so each recording
/// worker gets its own pool. The id is passed explicitly rather than read
/// from thread-local storage so the pool map stays testable without real OS
/// threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkerId(pub usize);

/// One transient command pool per worker, created lazily on first use and
/// torn down with the device context.
pub struct WorkerPools {
    pools: Mutex<HashMap<WorkerId, Arc<CommandPool>>>,

    /// The device used to create the pools.
    pub vk_dev: Arc<RenderDevice>,
}
