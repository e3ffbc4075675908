use ash::vk;
use scopeguard::ScopeGuard;

use super::{
    select_memory_type, Allocation, AllocatorError, Buffer, MemoryDevice,
};
use crate::vulkan::render_device::RenderDevice;

/// Create a buffer with freshly allocated, bound device memory.
///
/// The steps -- create the handle, query requirements, select a memory type,
/// allocate, bind, and optionally write initial data -- each fail
/// independently. A failure at any step releases everything acquired by the
/// prior steps before the error is returned, so no handle or allocation can
/// leak on the failure path.
///
/// `initial_data` is only legal for host-visible memory; device-local buffers
/// are filled through the staging uploader instead.
pub fn create_buffer<Device: MemoryDevice>(
    device: &Device,
    usage: vk::BufferUsageFlags,
    memory_property_flags: vk::MemoryPropertyFlags,
    byte_size: u64,
    initial_data: Option<&[u8]>,
) -> Result<Buffer, AllocatorError> {
    if byte_size == 0 {
        return Err(AllocatorError::ZeroSizeResource);
    }
    if let Some(bytes) = initial_data {
        if bytes.len() as u64 > byte_size {
            return Err(AllocatorError::InitialDataTooLarge {
                data_size: bytes.len() as u64,
                buffer_size: byte_size,
            });
        }
        if !memory_property_flags
            .contains(vk::MemoryPropertyFlags::HOST_VISIBLE)
        {
            return Err(AllocatorError::InitialDataRequiresHostVisible);
        }
    }

    let raw = device.create_buffer_handle(byte_size, usage)?;
    let raw = scopeguard::guard(raw, |raw| unsafe {
        device.destroy_buffer_handle(raw);
    });

    // The reported size is authoritative -- it can exceed the requested size
    // due to alignment and must be used for the allocation.
    let requirements = device.buffer_memory_requirements(*raw);
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

    device.bind_buffer_memory(*raw, &allocation)?;

    if let Some(bytes) = initial_data {
        unsafe { device.write_bytes(&allocation, bytes)? };
    }

    ScopeGuard::into_inner(memory);
    let raw = ScopeGuard::into_inner(raw);
    Ok(Buffer {
        raw,
        allocation,
        usage,
        descriptor: vk::DescriptorBufferInfo {
            buffer: raw,
            offset: 0,
            range: byte_size,
        },
        mapped_ptr: None,
    })
}

impl Buffer {
    /// Destroy the buffer handle and free its memory.
    ///
    /// # Safety
    ///
    /// The caller must ensure no GPU work references this buffer. When that
    /// cannot be proven, hand the buffer to the recycler instead.
    pub unsafe fn destroy<Device: MemoryDevice>(self, device: &Device) {
        device.destroy_buffer_handle(self.raw);
        device.free_memory(self.allocation.memory);
    }

    /// Acquire a CPU-accessible pointer to the memory used by this buffer.
    ///
    /// # Errors
    ///
    /// * This will fail if the buffer was not created with the HOST_VISIBLE
    ///   property.
    /// * This will also fail if the buffer is already mapped.
    pub fn map(&mut self, vk_dev: &RenderDevice) -> Result<(), AllocatorError> {
        let ptr = unsafe {
            vk_dev
                .logical_device
                .map_memory(
                    self.allocation.memory,
                    self.allocation.offset,
                    self.allocation.byte_size,
                    vk::MemoryMapFlags::empty(),
                )
                .map_err(AllocatorError::UnableToMapDeviceMemory)?
        };
        self.mapped_ptr = Some(ptr);
        Ok(())
    }

    /// Unmap the buffer's memory.
    pub fn unmap(&mut self, vk_dev: &RenderDevice) {
        unsafe {
            vk_dev.logical_device.unmap_memory(self.allocation.memory);
        }
        self.mapped_ptr = None;
    }

    /// Access the buffer's memory by treating it like a `&[Element]`.
    pub fn data<'element, Element: 'element + Copy>(
        &self,
    ) -> Result<&'element [Element], AllocatorError> {
        let ptr = self.mapped_ptr.ok_or(AllocatorError::NoMappedPointerFound)?;
        let elements =
            self.allocation.byte_size as usize / std::mem::size_of::<Element>();
        let data = unsafe {
            std::slice::from_raw_parts(ptr as *const Element, elements)
        };
        Ok(data)
    }

    /// Access the buffer's memory by treating it like a `&mut [Element]`.
    pub fn data_mut<'element, Element: 'element + Copy>(
        &self,
    ) -> Result<&'element mut [Element], AllocatorError> {
        let ptr = self.mapped_ptr.ok_or(AllocatorError::NoMappedPointerFound)?;
        let elements =
            self.allocation.byte_size as usize / std::mem::size_of::<Element>();
        let data = unsafe {
            std::slice::from_raw_parts_mut(ptr as *mut Element, elements)
        };
        Ok(data)
    }
}
