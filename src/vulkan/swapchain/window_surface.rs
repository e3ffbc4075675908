use ash::{extensions::khr, vk};

use super::{SwapchainError, WindowSurface};

impl WindowSurface {
    /// Wrap a surface created by the windowing system.
    ///
    /// The WindowSurface takes ownership of the surface handle and destroys
    /// it when dropped.
    pub fn new(khr: vk::SurfaceKHR, loader: khr::Surface) -> Self {
        Self { khr, loader }
    }

    /// Check that a queue family on the physical device can present images
    /// to this surface.
    pub fn can_queue_family_present(
        &self,
        physical_device: vk::PhysicalDevice,
        queue_family_index: u32,
    ) -> Result<bool, SwapchainError> {
        unsafe {
            self.loader
                .get_physical_device_surface_support(
                    physical_device,
                    queue_family_index,
                    self.khr,
                )
                .map_err(SwapchainError::UnableToCheckSurfaceSupport)
        }
    }

    /// The formats this device can present to the surface. Empty when the
    /// query fails.
    pub fn supported_formats(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> Vec<vk::SurfaceFormatKHR> {
        unsafe {
            self.loader
                .get_physical_device_surface_formats(
                    physical_device,
                    self.khr,
                )
                .unwrap_or_default()
        }
    }

    /// The presentation modes this device supports for the surface. Empty
    /// when the query fails.
    pub fn supported_presentation_modes(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> Vec<vk::PresentModeKHR> {
        unsafe {
            self.loader
                .get_physical_device_surface_present_modes(
                    physical_device,
                    self.khr,
                )
                .unwrap_or_default()
        }
    }

    /// The surface's current capabilities on the given physical device.
    pub fn surface_capabilities(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> Result<vk::SurfaceCapabilitiesKHR, SwapchainError> {
        unsafe {
            self.loader
                .get_physical_device_surface_capabilities(
                    physical_device,
                    self.khr,
                )
                .map_err(SwapchainError::UnableToGetSurfaceCapabilities)
        }
    }
}

impl Drop for WindowSurface {
    /// # DANGER
    ///
    /// The surface must be dropped before the Instance which created it, and
    /// only after every swapchain built on it has been destroyed.
    fn drop(&mut self) {
        unsafe {
            self.loader.destroy_surface(self.khr, None);
        }
    }
}
