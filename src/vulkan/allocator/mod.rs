//! GPU memory allocation: memory-type selection, buffer and image creation,
//! and the device entry points they are built on.
//!
//! Allocation is deliberately simple -- one device allocation per resource,
//! bound at offset zero. The interesting part is the failure path: every step
//! of resource creation can fail independently, and a failure must release
//! everything acquired by the prior steps before the error is returned.

mod buffer;
mod image;
mod memory_device;
mod memory_type;

#[cfg(test)]
pub(crate) mod fake;

use std::ffi::c_void;

use ash::vk;
use thiserror::Error;

pub use self::{
    buffer::create_buffer, image::create_image,
    memory_type::select_memory_type,
};

#[derive(Debug, Error)]
pub enum AllocatorError {
    #[error(
        "no memory type with properties {:?} could be found for type bits {:#034b}",
        .0, .1
    )]
    NoSupportedMemoryType(vk::MemoryPropertyFlags, u32),

    #[error("refusing to create a zero-byte resource")]
    ZeroSizeResource,

    #[error(
        "initial data is {} bytes but the buffer only holds {} bytes",
        .data_size, .buffer_size
    )]
    InitialDataTooLarge { data_size: u64, buffer_size: u64 },

    #[error(
        "initial data requires a host-visible memory type, use the staging \
         uploader for device-local resources"
    )]
    InitialDataRequiresHostVisible,

    #[error("the device is out of memory")]
    OutOfDeviceMemory(#[source] vk::Result),

    #[error("failed to allocate memory using the Vulkan device")]
    LogicalDeviceAllocationFailed(#[source] vk::Result),

    #[error(
        "Unable to create a new device buffer for {} bytes with flags {:?}",
        .size, .usage
    )]
    UnableToCreateBuffer {
        size: u64,
        usage: vk::BufferUsageFlags,
        source: vk::Result,
    },

    #[error("Unable to bind device memory to buffer")]
    UnableToBindBufferMemory(#[source] vk::Result),

    #[error("Unable to create a new device image")]
    UnableToCreateImage(#[source] vk::Result),

    #[error("Unable to bind device memory to image")]
    UnableToBindImageMemory(#[source] vk::Result),

    #[error("Unable to map device memory")]
    UnableToMapDeviceMemory(#[source] vk::Result),

    #[error(
        "Device memory pointer was not found, did you try calling .map()?"
    )]
    NoMappedPointerFound,
}

/// A single allocated piece of device memory.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub struct Allocation {
    pub memory: vk::DeviceMemory,
    pub offset: vk::DeviceSize,
    pub byte_size: vk::DeviceSize,
    pub memory_type_index: u32,
}

/// A Vulkan buffer and its associated device memory.
///
/// There is no Drop impl: buffers are destroyed explicitly, either
/// synchronously when the owner can prove no GPU work references them, or by
/// handing them to the recycler for fence-gated destruction.
pub struct Buffer {
    /// The underlying Vulkan buffer handle.
    pub raw: vk::Buffer,

    /// The actual memory allocation for this buffer.
    pub allocation: Allocation,

    /// The usage flags the buffer was created with.
    pub usage: vk::BufferUsageFlags,

    /// A full-range descriptor for binding this buffer.
    pub descriptor: vk::DescriptorBufferInfo,

    /// The pointer to the cpu-accessible memory-mapped region of memory for
    /// this buffer. Only valid after a call to map().
    pub mapped_ptr: Option<*mut c_void>,
}

/// A Vulkan image and its associated device memory. Like [Buffer], images
/// carry no Drop impl and are destroyed explicitly or via the recycler.
pub struct Image {
    /// The underlying Vulkan image handle.
    pub raw: vk::Image,

    /// The actual memory allocation for this image.
    pub allocation: Allocation,

    /// The image's pixel format.
    pub format: vk::Format,

    /// The full extent of mip level 0.
    pub extent: vk::Extent3D,

    /// The number of mip levels in the image.
    pub mip_levels: u32,
}

/// The raw device entry points used when creating and destroying resources.
///
/// [crate::vulkan::RenderDevice] implements this with real Vulkan calls; the
/// allocation logic is written against the trait so its failure paths can be
/// exercised with an injected-failure double.
pub trait MemoryDevice {
    /// The device's memory types and heaps.
    fn memory_properties(&self) -> &vk::PhysicalDeviceMemoryProperties;

    /// Create a raw buffer handle with no memory bound.
    fn create_buffer_handle(
        &self,
        byte_size: u64,
        usage: vk::BufferUsageFlags,
    ) -> Result<vk::Buffer, AllocatorError>;

    /// Query the buffer's memory requirements. The reported size can exceed
    /// the requested size due to alignment.
    fn buffer_memory_requirements(
        &self,
        buffer: vk::Buffer,
    ) -> vk::MemoryRequirements;

    /// Create a raw image handle with no memory bound.
    fn create_image_handle(
        &self,
        create_info: &vk::ImageCreateInfo,
    ) -> Result<vk::Image, AllocatorError>;

    /// Query the image's memory requirements.
    fn image_memory_requirements(
        &self,
        image: vk::Image,
    ) -> vk::MemoryRequirements;

    /// Allocate device memory of the given size at the given type index.
    fn allocate_memory(
        &self,
        byte_size: u64,
        memory_type_index: u32,
    ) -> Result<vk::DeviceMemory, AllocatorError>;

    /// Bind an allocation to a buffer at the allocation's offset.
    fn bind_buffer_memory(
        &self,
        buffer: vk::Buffer,
        allocation: &Allocation,
    ) -> Result<(), AllocatorError>;

    /// Bind an allocation to an image at the allocation's offset.
    fn bind_image_memory(
        &self,
        image: vk::Image,
        allocation: &Allocation,
    ) -> Result<(), AllocatorError>;

    /// Map the allocation, copy `bytes` into it, then unmap.
    ///
    /// # Safety
    ///
    /// The allocation must be host-visible, bound, and not concurrently
    /// mapped or in use by the GPU.
    unsafe fn write_bytes(
        &self,
        allocation: &Allocation,
        bytes: &[u8],
    ) -> Result<(), AllocatorError>;

    /// Destroy a raw buffer handle.
    ///
    /// # Safety
    ///
    /// No GPU work may reference the buffer.
    unsafe fn destroy_buffer_handle(&self, buffer: vk::Buffer);

    /// Destroy a raw image handle.
    ///
    /// # Safety
    ///
    /// No GPU work may reference the image.
    unsafe fn destroy_image_handle(&self, image: vk::Image);

    /// Free a device memory allocation.
    ///
    /// # Safety
    ///
    /// No GPU work may reference the memory, and no resource may still be
    /// bound to it.
    unsafe fn free_memory(&self, memory: vk::DeviceMemory);
}
