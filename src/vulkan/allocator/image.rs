use ash::vk;
use scopeguard::ScopeGuard;

use super::{
    select_memory_type, Allocation, AllocatorError, Image, MemoryDevice,
};

/// Create an image with freshly allocated, bound device memory.
///
/// Follows the same leak-free step sequence as [super::create_buffer]: a
/// failure at any step releases everything acquired by the prior steps.
pub fn create_image<Device: MemoryDevice>(
    device: &Device,
    create_info: &vk::ImageCreateInfo,
    memory_property_flags: vk::MemoryPropertyFlags,
) -> Result<Image, AllocatorError> {
    if create_info.extent.width == 0 || create_info.extent.height == 0 {
        return Err(AllocatorError::ZeroSizeResource);
    }

    let raw = device.create_image_handle(create_info)?;
    let raw = scopeguard::guard(raw, |raw| unsafe {
        device.destroy_image_handle(raw);
    });

    let requirements = device.image_memory_requirements(*raw);
    let memory_type_index = select_memory_type(
        device.memory_properties(),
        requirements.memory_type_bits,
        memory_property_flags,
    )?;

    let memory =
        device.allocate_memory(requirements.size, memory_type_index)?;
    let allocation = Allocation {
        memory,
        offset: 0,
        byte_size: requirements.size,
        memory_type_index,
    };
    let memory = scopeguard::guard(memory, |memory| unsafe {
        device.free_memory(memory);
    });

    device.bind_image_memory(*raw, &allocation)?;

    ScopeGuard::into_inner(memory);
    let raw = ScopeGuard::into_inner(raw);
    Ok(Image {
        raw,
        allocation,
        format: create_info.format,
        extent: create_info.extent,
        mip_levels: create_info.mip_levels,
    })
}

impl Image {
    /// Destroy the image handle and free its memory.
    ///
    /// # Safety
    ///
    /// The caller must ensure no GPU work references this image. When that
    /// cannot be proven, hand the image to the recycler instead.
    pub unsafe fn destroy<Device: MemoryDevice>(self, device: &Device) {
        device.destroy_image_handle(self.raw);
        device.free_memory(self.allocation.memory);
    }
}
