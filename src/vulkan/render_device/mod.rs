mod gpu_queue;
mod physical_device;
mod render_device;

use std::sync::Mutex;

use ash::vk;
use thiserror::Error;

use crate::vulkan::instance::{Instance, InstanceError};

/// This enum represents the errors which can occur while attempting to find
/// a usable physical device for the application.
#[derive(Debug, Error)]
pub enum PhysicalDeviceError {
    #[error("Unable to enumerate physical devices")]
    UnableToEnumerateDevices(#[source] vk::Result),

    #[error("No suitable physical device could be found for this application")]
    NoSuitableDeviceFound,
}

/// This enum represents errors which can occur while attempting to find all of
/// the Vulkan command queues which are required by the application.
#[derive(Debug, Error)]
pub enum QueueSelectionError {
    #[error("Unable to find a suitable graphics queue")]
    UnableToFindGraphicsQueue,
}

/// This enum represents errors which can occur while working with the render
/// device.
#[derive(Debug, Error)]
pub enum RenderDeviceError {
    #[error("Unexpected physical device error")]
    UnexpectedPhysicalDeviceError(#[from] PhysicalDeviceError),

    #[error("Unexpected queue selection error")]
    UnexpectedQueueSelectionError(#[from] QueueSelectionError),

    #[error("Unexpected Vulkan instance error")]
    UnexpectedInstanceError(#[from] InstanceError),

    #[error("Unable to submit commands to the graphics queue")]
    UnableToSubmitToQueue(#[source] vk::Result),

    #[error("Unable to wait for the device to idle")]
    UnableToWaitIdle(#[source] vk::Result),

    #[error("Unable to set debug name, {}, for {:?}", .0, .1)]
    UnableToSetDebugName(String, vk::ObjectType, #[source] vk::Result),
}

/// This struct bundles a Vulkan queue with related data for easy tracking.
#[derive(Debug, Clone, Copy)]
pub struct GpuQueue {
    pub queue: vk::Queue,
    pub family_id: u32,
    pub index: u32,
}

/// The render device holds the core Vulkan state and devices which are used
/// by all parts of the application.
///
/// All work in this library runs on the single graphics queue. Submission is
/// serialized with an internal lock because Vulkan queues are not safe for
/// concurrent submission.
pub struct RenderDevice {
    /// The physical device used by this application.
    physical_device: vk::PhysicalDevice,

    /// The Vulkan logical device used to issue commands to the physical
    /// device.
    pub logical_device: ash::Device,

    /// The gpu command queue used for graphics and transfer operations.
    graphics_queue: GpuQueue,

    /// Serializes submission and presentation on the graphics queue.
    queue_lock: Mutex<()>,

    /// The physical device's memory types and heaps, queried once at startup.
    memory_properties: vk::PhysicalDeviceMemoryProperties,

    /// The Vulkan library instance.
    pub instance: Instance,
}
