mod fence;
mod semaphore;

use std::sync::Arc;

use ash::vk;
use thiserror::Error;

use crate::vulkan::render_device::RenderDevice;

#[derive(Debug, Error)]
pub enum FenceError {
    #[error("Unable to create a new fence")]
    UnableToCreateFence(#[source] vk::Result),

    #[error("Error while waiting for fence")]
    UnexpectedWaitError(#[source] vk::Result),

    #[error("Error while resetting fence")]
    UnexpectedResetError(#[source] vk::Result),

    #[error("Error while checking fence status")]
    UnexpectedStatusError(#[source] vk::Result),
}

#[derive(Debug, Error)]
pub enum SemaphoreError {
    #[error("Unable to create a new semaphore")]
    UnableToCreateSemaphore(#[source] vk::Result),
}

/// An owned Vulkan fence object which is automatically destroyed when dropped.
///
/// A fence must be associated with at most one pending submission at a time.
/// Reusing a fence before it has been reset, and before its prior submission
/// completed, is a correctness violation.
pub struct Fence {
    /// The raw fence handle.
    pub raw: vk::Fence,

    /// The device which created the fence.
    pub vk_dev: Arc<RenderDevice>,
}

/// An owned Vulkan semaphore object which is automatically destroyed when
/// dropped.
pub struct Semaphore {
    /// The raw semaphore handle.
    pub raw: vk::Semaphore,

    /// The device which created the semaphore.
    pub vk_dev: Arc<RenderDevice>,
}
