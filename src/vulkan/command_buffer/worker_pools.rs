use std::sync::Arc;

use ash::vk;

use super::{CommandBufferError, CommandPool, WorkerId, WorkerPools};
use crate::vulkan::{render_device::RenderDevice, sync::Fence};

impl WorkerPools {
    pub fn new(vk_dev: Arc<RenderDevice>) -> Self {
        Self {
            pools: Default::default(),
            vk_dev,
        }
    }

    /// Get the transient command pool for the given worker, creating it on
    /// first use.
    pub fn pool_for_worker(
        &self,
        worker: WorkerId,
    ) -> Result<Arc<CommandPool>, CommandBufferError> {
        let mut pools = self
            .pools
            .lock()
            .expect("unable to acquire the worker pool map lock");
        if let Some(pool) = pools.get(&worker) {
            return Ok(pool.clone());
        }
        let pool = Arc::new(CommandPool::new_transient_graphics_pool(
            self.vk_dev.clone(),
        )?);
        log::debug!("Created transient command pool for {:?}", worker);
        pools.insert(worker, pool.clone());
        Ok(pool)
    }

    /// Record commands into a one-time-submit primary command buffer, submit
    /// them to the graphics queue, and block until a fence proves they have
    /// completed.
    ///
    /// Intended for infrequent setup-time work like staging uploads, not for
    /// steady-state per-frame submission.
    pub fn sync_commands<T>(
        &self,
        worker: WorkerId,
        record: impl FnOnce(&ash::Device, vk::CommandBuffer) -> T,
    ) -> Result<T, CommandBufferError> {
        let pool = self.pool_for_worker(worker)?;
        let cmd = unsafe {
            pool.allocate_command_buffer(vk::CommandBufferLevel::PRIMARY)?
        };
        let result = self.record_submit_and_wait(cmd, record);
        unsafe { pool.free_command_buffer(cmd) };
        result
    }

    /// Record commands into a primary command buffer and submit them with the
    /// provided fence, returning immediately after submission. The caller
    /// owns the command buffer's cleanup, typically by handing it to the
    /// recycler alongside the fence.
    pub fn submit_commands(
        &self,
        worker: WorkerId,
        fence: &Fence,
        record: impl FnOnce(&ash::Device, vk::CommandBuffer),
    ) -> Result<(Arc<CommandPool>, vk::CommandBuffer), CommandBufferError>
    {
        let pool = self.pool_for_worker(worker)?;
        let cmd = unsafe {
            pool.allocate_command_buffer(vk::CommandBufferLevel::PRIMARY)?
        };
        let submitted = self.record_and_submit(cmd, fence.raw, record);
        match submitted {
            Ok(()) => Ok((pool, cmd)),
            Err(error) => {
                unsafe { pool.free_command_buffer(cmd) };
                Err(error)
            }
        }
    }

    /// Drop every worker pool. The device must be idle.
    pub fn destroy_all(&self) {
        let mut pools = self
            .pools
            .lock()
            .expect("unable to acquire the worker pool map lock");
        pools.clear();
    }

    fn record_submit_and_wait<T>(
        &self,
        cmd: vk::CommandBuffer,
        record: impl FnOnce(&ash::Device, vk::CommandBuffer) -> T,
    ) -> Result<T, CommandBufferError> {
        let fence = Fence::new(self.vk_dev.clone())?;
        let result = self.record_and_submit(cmd, fence.raw, |device, cmd| {
            record(device, cmd)
        })?;
        fence.wait()?;
        Ok(result)
    }

    fn record_and_submit<T>(
        &self,
        cmd: vk::CommandBuffer,
        fence: vk::Fence,
        record: impl FnOnce(&ash::Device, vk::CommandBuffer) -> T,
    ) -> Result<T, CommandBufferError> {
        let device = &self.vk_dev.logical_device;
        unsafe {
            let begin_info = vk::CommandBufferBeginInfo {
                flags: vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT,
                ..Default::default()
            };
            device
                .begin_command_buffer(cmd, &begin_info)
                .map_err(CommandBufferError::UnableToBeginCommandBuffer)?;

            let result = record(device, cmd);

            device
                .end_command_buffer(cmd)
                .map_err(CommandBufferError::UnableToEndCommandBuffer)?;

            let submit_info = vk::SubmitInfo {
                command_buffer_count: 1,
                p_command_buffers: &cmd,
                ..Default::default()
            };
            self.vk_dev
                .submit_to_graphics_queue(&[submit_info], fence)?;

            Ok(result)
        }
    }
}
