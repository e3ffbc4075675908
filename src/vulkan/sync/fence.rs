use std::sync::Arc;

use ash::vk;

use super::{Fence, FenceError};
use crate::vulkan::{
    render_device::RenderDevice, vulkan_debug::VulkanDebug,
    vulkan_debug::VulkanDebugError,
};

impl Fence {
    /// Create a new unsignaled fence, ready to be attached to a submission.
    pub fn new(vk_dev: Arc<RenderDevice>) -> Result<Self, FenceError> {
        Self::with_flags(vk_dev, vk::FenceCreateFlags::empty())
    }

    /// Create a new fence which starts in the signaled state. Useful for
    /// per-frame fences which are waited on before the first submission.
    pub fn new_signaled(vk_dev: Arc<RenderDevice>) -> Result<Self, FenceError> {
        Self::with_flags(vk_dev, vk::FenceCreateFlags::SIGNALED)
    }

    fn with_flags(
        vk_dev: Arc<RenderDevice>,
        flags: vk::FenceCreateFlags,
    ) -> Result<Self, FenceError> {
        let raw = {
            let create_info = vk::FenceCreateInfo {
                flags,
                ..Default::default()
            };
            unsafe {
                vk_dev
                    .logical_device
                    .create_fence(&create_info, None)
                    .map_err(FenceError::UnableToCreateFence)?
            }
        };
        Ok(Self { raw, vk_dev })
    }

    /// Block until the fence is signaled, then reset.
    pub fn wait_and_reset(&self) -> Result<(), FenceError> {
        self.wait()?;
        self.reset()
    }

    /// Block until the fence is signaled.
    pub fn wait(&self) -> Result<(), FenceError> {
        unsafe {
            self.vk_dev
                .logical_device
                .wait_for_fences(&[self.raw], true, u64::MAX)
                .map_err(FenceError::UnexpectedWaitError)?;
        }
        Ok(())
    }

    /// Reset the fence for future signalling.
    pub fn reset(&self) -> Result<(), FenceError> {
        unsafe {
            self.vk_dev
                .logical_device
                .reset_fences(&[self.raw])
                .map_err(FenceError::UnexpectedResetError)?;
        }
        Ok(())
    }

    /// Check the fence's status without blocking.
    pub fn is_signaled(&self) -> Result<bool, FenceError> {
        unsafe {
            self.vk_dev
                .logical_device
                .get_fence_status(self.raw)
                .map_err(FenceError::UnexpectedStatusError)
        }
    }
}

impl VulkanDebug for Fence {
    fn set_debug_name(
        &self,
        debug_name: impl Into<String>,
    ) -> Result<(), VulkanDebugError> {
        self.vk_dev.name_vulkan_object(
            debug_name,
            vk::ObjectType::FENCE,
            self.raw,
        )?;
        Ok(())
    }
}

impl Drop for Fence {
    /// # DANGER
    ///
    /// There is no internal synchronization for this type. Unexpected behavior
    /// can occur if this instance is still in-use by the GPU when it is
    /// dropped.
    fn drop(&mut self) {
        unsafe {
            self.vk_dev.logical_device.destroy_fence(self.raw, None);
        }
    }
}
