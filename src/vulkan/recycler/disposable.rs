use super::Disposable;
use crate::vulkan::render_device::RenderDevice;

impl Disposable {
    /// Destroy the retired resource.
    ///
    /// # Safety
    ///
    /// The caller must have proof that no GPU work references the resource:
    /// either the batch's fence has signaled, or the device is fully idle
    /// (teardown).
    pub unsafe fn dispose(self, vk_dev: &RenderDevice) {
        match self {
            Disposable::Buffer(buffer) => {
                buffer.destroy(vk_dev);
            }
            Disposable::Image(image) => {
                image.destroy(vk_dev);
            }
            Disposable::ImageView(view) => {
                vk_dev.logical_device.destroy_image_view(view, None);
            }
            Disposable::Framebuffer(framebuffer) => {
                vk_dev.logical_device.destroy_framebuffer(framebuffer, None);
            }
            Disposable::Semaphore(semaphore) => {
                // the semaphore's Drop impl destroys the handle
                drop(semaphore);
            }
            Disposable::CommandBuffers { pool, buffers } => {
                pool.free_command_buffers(&buffers);
            }
        }
    }

    /// A short tag for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Disposable::Buffer(_) => "Buffer",
            Disposable::Image(_) => "Image",
            Disposable::ImageView(_) => "ImageView",
            Disposable::Framebuffer(_) => "Framebuffer",
            Disposable::Semaphore(_) => "Semaphore",
            Disposable::CommandBuffers { .. } => "CommandBuffers",
        }
    }
}
