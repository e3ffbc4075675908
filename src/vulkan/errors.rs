//! A single place to find every error type which this library can produce.

use thiserror::Error;

pub use crate::vulkan::{
    allocator::AllocatorError,
    command_buffer::CommandBufferError,
    context::ContextError,
    instance::InstanceError,
    render_device::{PhysicalDeviceError, RenderDeviceError},
    staging::StagingError,
    swapchain::SwapchainError,
    sync::{FenceError, SemaphoreError},
    vulkan_debug::VulkanDebugError,
};

/// An umbrella for every error which can originate in this library. Useful
/// for application-facing functions which can fail in multiple subsystems.
#[derive(Debug, Error)]
pub enum VulkanError {
    #[error(transparent)]
    InstanceError(#[from] InstanceError),

    #[error(transparent)]
    RenderDeviceError(#[from] RenderDeviceError),

    #[error(transparent)]
    AllocatorError(#[from] AllocatorError),

    #[error(transparent)]
    CommandBufferError(#[from] CommandBufferError),

    #[error(transparent)]
    FenceError(#[from] FenceError),

    #[error(transparent)]
    SemaphoreError(#[from] SemaphoreError),

    #[error(transparent)]
    StagingError(#[from] StagingError),

    #[error(transparent)]
    ContextError(#[from] ContextError),

    #[error(transparent)]
    SwapchainError(#[from] SwapchainError),

    #[error(transparent)]
    VulkanDebugError(#[from] VulkanDebugError),
}
