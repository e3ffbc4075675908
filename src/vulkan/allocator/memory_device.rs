use ash::vk;

use super::{Allocation, AllocatorError, MemoryDevice};
use crate::vulkan::render_device::RenderDevice;

/// Map a raw allocation failure to the library's error taxonomy.
/// Out-of-device-memory is surfaced as a distinct kind so callers can choose
/// to free other resources and retry.
fn allocation_error(err: vk::Result) -> AllocatorError {
    match err {
        vk::Result::ERROR_OUT_OF_DEVICE_MEMORY => {
            AllocatorError::OutOfDeviceMemory(err)
        }
        _ => AllocatorError::LogicalDeviceAllocationFailed(err),
    }
}

impl MemoryDevice for RenderDevice {
    fn memory_properties(&self) -> &vk::PhysicalDeviceMemoryProperties {
        RenderDevice::memory_properties(self)
    }

    fn create_buffer_handle(
        &self,
        byte_size: u64,
        usage: vk::BufferUsageFlags,
    ) -> Result<vk::Buffer, AllocatorError> {
        let create_info = vk::BufferCreateInfo {
            size: byte_size,
            usage,
            sharing_mode: vk::SharingMode::EXCLUSIVE,
            ..Default::default()
        };
        unsafe {
            self.logical_device
                .create_buffer(&create_info, None)
                .map_err(|err| AllocatorError::UnableToCreateBuffer {
                    size: byte_size,
                    usage,
                    source: err,
                })
        }
    }

    fn buffer_memory_requirements(
        &self,
        buffer: vk::Buffer,
    ) -> vk::MemoryRequirements {
        unsafe {
            self.logical_device.get_buffer_memory_requirements(buffer)
        }
    }

    fn create_image_handle(
        &self,
        create_info: &vk::ImageCreateInfo,
    ) -> Result<vk::Image, AllocatorError> {
        unsafe {
            self.logical_device
                .create_image(create_info, None)
                .map_err(AllocatorError::UnableToCreateImage)
        }
    }

    fn image_memory_requirements(
        &self,
        image: vk::Image,
    ) -> vk::MemoryRequirements {
        unsafe { self.logical_device.get_image_memory_requirements(image) }
    }

    fn allocate_memory(
        &self,
        byte_size: u64,
        memory_type_index: u32,
    ) -> Result<vk::DeviceMemory, AllocatorError> {
        let allocate_info = vk::MemoryAllocateInfo {
            allocation_size: byte_size,
            memory_type_index,
            ..Default::default()
        };
        unsafe {
            self.logical_device
                .allocate_memory(&allocate_info, None)
                .map_err(allocation_error)
        }
    }

    fn bind_buffer_memory(
        &self,
        buffer: vk::Buffer,
        allocation: &Allocation,
    ) -> Result<(), AllocatorError> {
        unsafe {
            self.logical_device
                .bind_buffer_memory(
                    buffer,
                    allocation.memory,
                    allocation.offset,
                )
                .map_err(AllocatorError::UnableToBindBufferMemory)
        }
    }

    fn bind_image_memory(
        &self,
        image: vk::Image,
        allocation: &Allocation,
    ) -> Result<(), AllocatorError> {
        unsafe {
            self.logical_device
                .bind_image_memory(image, allocation.memory, allocation.offset)
                .map_err(AllocatorError::UnableToBindImageMemory)
        }
    }

    unsafe fn write_bytes(
        &self,
        allocation: &Allocation,
        bytes: &[u8],
    ) -> Result<(), AllocatorError> {
        let ptr = self
            .logical_device
            .map_memory(
                allocation.memory,
                allocation.offset,
                allocation.byte_size,
                vk::MemoryMapFlags::empty(),
            )
            .map_err(AllocatorError::UnableToMapDeviceMemory)?;
        std::ptr::copy_nonoverlapping(
            bytes.as_ptr(),
            ptr as *mut u8,
            bytes.len(),
        );
        self.logical_device.unmap_memory(allocation.memory);
        Ok(())
    }

    unsafe fn destroy_buffer_handle(&self, buffer: vk::Buffer) {
        self.logical_device.destroy_buffer(buffer, None);
    }

    unsafe fn destroy_image_handle(&self, image: vk::Image) {
        self.logical_device.destroy_image(image, None);
    }

    unsafe fn free_memory(&self, memory: vk::DeviceMemory) {
        self.logical_device.free_memory(memory, None);
    }
}
