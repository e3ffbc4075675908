use std::sync::Arc;

use ash::vk;

use super::{CommandBufferError, CommandPool};
use crate::vulkan::{
    render_device::RenderDevice, vulkan_debug::VulkanDebug,
    vulkan_debug::VulkanDebugError,
};

impl CommandPool {
    /// Create a new command pool for the given queue family.
    pub fn new(
        vk_dev: Arc<RenderDevice>,
        queue_family_id: u32,
        flags: vk::CommandPoolCreateFlags,
    ) -> Result<Self, CommandBufferError> {
        let raw = {
            let create_info = vk::CommandPoolCreateInfo {
                queue_family_index: queue_family_id,
                flags,
                ..Default::default()
            };
            unsafe {
                vk_dev
                    .logical_device
                    .create_command_pool(&create_info, None)
                    .map_err(CommandBufferError::UnableToCreateCommandPool)?
            }
        };
        Ok(Self { raw, vk_dev })
    }

    /// Create a new transient command pool for submitting graphics commands.
    pub fn new_transient_graphics_pool(
        vk_dev: Arc<RenderDevice>,
    ) -> Result<Self, CommandBufferError> {
        let family_id = vk_dev.graphics_queue().family_id;
        Self::new(vk_dev, family_id, vk::CommandPoolCreateFlags::TRANSIENT)
    }

    /// Allocate raw vulkan command buffers.
    ///
    /// # Safety
    ///
    /// The caller is responsible for freeing the buffers when they are
    /// no-longer in use.
    pub unsafe fn allocate_command_buffers(
        &self,
        level: vk::CommandBufferLevel,
        command_buffer_count: u32,
    ) -> Result<Vec<vk::CommandBuffer>, CommandBufferError> {
        let create_info = vk::CommandBufferAllocateInfo {
            command_pool: self.raw,
            level,
            command_buffer_count,
            ..Default::default()
        };
        let buffer = self
            .vk_dev
            .logical_device
            .allocate_command_buffers(&create_info)
            .map_err(CommandBufferError::UnableToAllocateBuffer)?;
        Ok(buffer)
    }

    /// Allocate a single raw vulkan command buffer.
    ///
    /// # Safety
    ///
    /// The caller is responsible for freeing the buffer when it is no-longer
    /// in use.
    pub unsafe fn allocate_command_buffer(
        &self,
        level: vk::CommandBufferLevel,
    ) -> Result<vk::CommandBuffer, CommandBufferError> {
        let buffers = self.allocate_command_buffers(level, 1)?;
        Ok(buffers[0])
    }

    /// Free Vulkan command buffers which were allocated from this pool.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the provided buffers were actually
    /// allocated from this pool. Additionally, there is no internal
    /// synchronization, so it is invalid to use this method from multiple
    /// threads or while the command buffers are in use by the GPU.
    pub unsafe fn free_command_buffers(
        &self,
        command_buffers: &[vk::CommandBuffer],
    ) {
        self.vk_dev
            .logical_device
            .free_command_buffers(self.raw, command_buffers);
    }

    /// Free a Vulkan command buffer which was allocated from this pool.
    ///
    /// # Safety
    ///
    /// Same contract as [Self::free_command_buffers].
    pub unsafe fn free_command_buffer(
        &self,
        command_buffer: vk::CommandBuffer,
    ) {
        self.free_command_buffers(&[command_buffer]);
    }

    /// Reset the entire command pool.
    pub fn reset(&self) -> Result<(), CommandBufferError> {
        unsafe {
            self.vk_dev
                .logical_device
                .reset_command_pool(
                    self.raw,
                    vk::CommandPoolResetFlags::empty(),
                )
                .map_err(CommandBufferError::UnableToResetPool)?;
        }
        Ok(())
    }
}

impl VulkanDebug for CommandPool {
    fn set_debug_name(
        &self,
        debug_name: impl Into<String>,
    ) -> Result<(), VulkanDebugError> {
        self.vk_dev.name_vulkan_object(
            debug_name,
            vk::ObjectType::COMMAND_POOL,
            self.raw,
        )?;
        Ok(())
    }
}

impl Drop for CommandPool {
    /// # DANGER
    ///
    /// There is no internal synchronization for this type. Unexpected behavior
    /// can occur if this instance is still in-use by the GPU when it is
    /// dropped.
    fn drop(&mut self) {
        unsafe {
            self.vk_dev
                .logical_device
                .destroy_command_pool(self.raw, None)
        }
    }
}
