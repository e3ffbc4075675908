use std::sync::{Arc, Mutex};

use ash::vk;

use super::{ContextError, DeviceContext};
use crate::vulkan::{
    allocator::{self, AllocatorError, Buffer, Image},
    command_buffer::{WorkerId, WorkerPools},
    recycler::{Disposable, Recycler},
    render_device::RenderDevice,
    sync::Fence,
};

impl DeviceContext {
    /// Create a new context which owns the render device.
    pub fn new(vk_dev: Arc<RenderDevice>) -> Self {
        Self {
            recycler: Mutex::new(Recycler::new()),
            worker_pools: WorkerPools::new(vk_dev.clone()),
            vk_dev,
        }
    }

    /// The underlying render device.
    pub fn device(&self) -> &Arc<RenderDevice> {
        &self.vk_dev
    }

    /// Create a buffer with freshly allocated, bound device memory.
    pub fn create_buffer(
        &self,
        usage: vk::BufferUsageFlags,
        memory_property_flags: vk::MemoryPropertyFlags,
        byte_size: u64,
        initial_data: Option<&[u8]>,
    ) -> Result<Buffer, AllocatorError> {
        allocator::create_buffer(
            self.vk_dev.as_ref(),
            usage,
            memory_property_flags,
            byte_size,
            initial_data,
        )
    }

    /// Create an image with freshly allocated, bound device memory.
    pub fn create_image(
        &self,
        create_info: &vk::ImageCreateInfo,
        memory_property_flags: vk::MemoryPropertyFlags,
    ) -> Result<Image, AllocatorError> {
        allocator::create_image(
            self.vk_dev.as_ref(),
            create_info,
            memory_property_flags,
        )
    }

    /// Destroy a buffer immediately, bypassing the recycler.
    ///
    /// # Safety
    ///
    /// The caller must prove no GPU work references the buffer. When in
    /// doubt, use [Self::trash_buffer] instead.
    pub unsafe fn destroy_buffer_now(&self, buffer: Buffer) {
        buffer.destroy(self.vk_dev.as_ref());
    }

    /// Destroy an image immediately, bypassing the recycler.
    ///
    /// # Safety
    ///
    /// The caller must prove no GPU work references the image. When in
    /// doubt, use [Self::trash_image] instead.
    pub unsafe fn destroy_image_now(&self, image: Image) {
        image.destroy(self.vk_dev.as_ref());
    }

    /// Register a resource for deferred destruction. The resource stays
    /// alive at least until a later [Self::empty_dumpster] fence signals.
    pub fn trash(&self, disposable: Disposable) {
        self.recycler()
            .trash(disposable);
    }

    /// Retire a buffer to the recycler.
    pub fn trash_buffer(&self, buffer: Buffer) {
        self.trash(Disposable::Buffer(buffer));
    }

    /// Retire an image to the recycler.
    pub fn trash_image(&self, image: Image) {
        self.trash(Disposable::Image(image));
    }

    /// Bind everything trashed since the last call to the given fence.
    /// Typically called once per frame with the frame's submission fence.
    pub fn empty_dumpster(&self, fence: Arc<Fence>) {
        self.recycler().empty_dumpster(fence);
    }

    /// Poll the recycler and destroy every matured resource. Returns the
    /// number of resources destroyed.
    pub fn recycle(&self) -> Result<usize, ContextError> {
        let matured = self.recycler().recycle()?;
        let count = matured.len();
        for disposable in matured {
            log::trace!("recycle {}", disposable.kind());
            // recycle() only returns entries whose fence has signaled
            unsafe { disposable.dispose(self.vk_dev.as_ref()) };
        }
        Ok(count)
    }

    /// Record and submit a one-time-use primary command buffer without
    /// waiting for it to finish.
    ///
    /// The command buffer is retired to the recycler under the returned
    /// fence, along with everything else trashed since the last dumpster
    /// flush. The caller keeps the fence for frame pacing; it is safe to
    /// drop immediately because the recycler shares ownership.
    pub fn with_primary_command_buffer(
        &self,
        worker: WorkerId,
        record: impl FnOnce(&ash::Device, vk::CommandBuffer),
    ) -> Result<Arc<Fence>, ContextError> {
        let fence = Arc::new(Fence::new(self.vk_dev.clone())?);
        let (pool, cmd) =
            self.worker_pools
                .submit_commands(worker, fence.as_ref(), record)?;
        self.trash(Disposable::CommandBuffers {
            pool,
            buffers: vec![cmd],
        });
        self.empty_dumpster(fence.clone());
        Ok(fence)
    }

    /// Record commands, submit them, and block until they complete.
    pub fn sync_commands<T>(
        &self,
        worker: WorkerId,
        record: impl FnOnce(&ash::Device, vk::CommandBuffer) -> T,
    ) -> Result<T, ContextError> {
        Ok(self.worker_pools.sync_commands(worker, record)?)
    }

    fn recycler(
        &self,
    ) -> std::sync::MutexGuard<'_, Recycler<Arc<Fence>, Disposable>> {
        self.recycler
            .lock()
            .expect("unable to acquire the recycler lock")
    }
}

impl Drop for DeviceContext {
    /// Teardown waits for the device to idle, then destroys every resource
    /// still held by the recycler, fences or not. Errors are logged rather
    /// than panicked because Drop has no way to report them.
    fn drop(&mut self) {
        if let Err(error) = self.vk_dev.wait_idle() {
            log::error!(
                "unable to wait for the device to idle during teardown: {}",
                error
            );
        }
        let remaining = self.recycler().drain();
        if !remaining.is_empty() {
            log::debug!(
                "destroying {} resources still held at teardown",
                remaining.len()
            );
        }
        for disposable in remaining {
            // the device is idle, so unfenced disposal is legal here
            unsafe { disposable.dispose(self.vk_dev.as_ref()) };
        }
        self.worker_pools.destroy_all();
    }
}
