use std::sync::Arc;

use ash::{extensions::khr, vk};
use scopeguard::ScopeGuard;

use super::{selection, Swapchain, SwapchainError, WindowSurface};
use crate::vulkan::{render_device::RenderDevice, sync::Fence};

impl Swapchain {
    /// Create a new swapchain for the surface, accounting for the previous
    /// swapchain if one existed.
    ///
    /// The old swapchain's handle is passed to the driver so it can recycle
    /// resources. It is destroyed only after the new chain and its views
    /// exist, and only once the device is idle.
    pub fn new(
        vk_dev: Arc<RenderDevice>,
        surface: &WindowSurface,
        framebuffer_size: (u32, u32),
        vsync: bool,
        previous: Option<Self>,
    ) -> Result<Self, SwapchainError> {
        let old_khr = previous
            .as_ref()
            .map(|swapchain| swapchain.khr)
            .unwrap_or_else(vk::SwapchainKHR::null);
        let swapchain = match Self::build(
            vk_dev.clone(),
            surface,
            framebuffer_size,
            vsync,
            old_khr,
        ) {
            Ok(swapchain) => swapchain,
            Err(error) => {
                // The old chain may still be referenced by in-flight work;
                // idle the device before its Drop destroys it.
                if previous.is_some() {
                    if let Err(wait_error) = vk_dev.wait_idle() {
                        log::error!(
                            "unable to idle the device before destroying \
                             the old swapchain: {}",
                            wait_error
                        );
                    }
                }
                return Err(error);
            }
        };

        if let Some(old) = previous {
            swapchain.vk_dev.wait_idle()?;
            drop(old);
        }

        Ok(swapchain)
    }

    fn build(
        vk_dev: Arc<RenderDevice>,
        surface: &WindowSurface,
        framebuffer_size: (u32, u32),
        vsync: bool,
        old_swapchain: vk::SwapchainKHR,
    ) -> Result<Self, SwapchainError> {
        if !surface.can_queue_family_present(
            vk_dev.physical_device(),
            vk_dev.graphics_queue().family_id,
        )? {
            return Err(SwapchainError::SurfaceNotSupported);
        }

        let formats = surface.supported_formats(vk_dev.physical_device());
        let modes =
            surface.supported_presentation_modes(vk_dev.physical_device());
        let capabilities =
            surface.surface_capabilities(vk_dev.physical_device())?;

        let format = selection::choose_surface_format(&formats)
            .ok_or(SwapchainError::SurfaceNotSupported)?;
        let present_mode = selection::choose_present_mode(&modes, vsync);
        let extent =
            selection::choose_swap_extent(&capabilities, framebuffer_size);
        let image_count = selection::choose_image_count(&capabilities);
        log::debug!(
            "swapchain: {:?} {:?} {}x{} with {} images",
            format.format,
            present_mode,
            extent.width,
            extent.height,
            image_count,
        );

        let create_info = vk::SwapchainCreateInfoKHR {
            surface: surface.khr,
            min_image_count: image_count,
            image_format: format.format,
            image_color_space: format.color_space,
            image_extent: extent,
            image_array_layers: 1,
            image_usage: vk::ImageUsageFlags::COLOR_ATTACHMENT,
            image_sharing_mode: vk::SharingMode::EXCLUSIVE,
            pre_transform: capabilities.current_transform,
            composite_alpha: vk::CompositeAlphaFlagsKHR::OPAQUE,
            present_mode,
            clipped: vk::TRUE,
            old_swapchain,
            ..Default::default()
        };

        let loader = khr::Swapchain::new(
            &vk_dev.instance.ash,
            &vk_dev.logical_device,
        );
        let khr = unsafe {
            loader
                .create_swapchain(&create_info, None)
                .map_err(SwapchainError::UnableToCreateSwapchain)?
        };
        let khr = scopeguard::guard(khr, |khr| unsafe {
            loader.destroy_swapchain(khr, None);
        });
        let images = unsafe {
            loader
                .get_swapchain_images(*khr)
                .map_err(SwapchainError::UnableToGetSwapchainImages)?
        };
        let image_views =
            create_image_views(&vk_dev, &images, format.format)?;
        let khr = ScopeGuard::into_inner(khr);

        let mut in_flight_fences = Vec::with_capacity(images.len());
        in_flight_fences.resize_with(images.len(), || None);

        Ok(Self {
            loader,
            khr,
            images,
            image_views,
            format: format.format,
            color_space: format.color_space,
            extent,
            in_flight_fences,
            vk_dev,
        })
    }

    /// Replace this swapchain with a new one for the same surface. Used when
    /// acquire or present reports that a rebuild is needed.
    pub fn rebuild(
        self,
        surface: &WindowSurface,
        framebuffer_size: (u32, u32),
        vsync: bool,
    ) -> Result<Self, SwapchainError> {
        Self::new(
            self.vk_dev.clone(),
            surface,
            framebuffer_size,
            vsync,
            Some(self),
        )
    }

    /// Acquire the next swapchain image.
    ///
    /// The given semaphore is signaled when the image is actually ready for
    /// rendering. Before returning, this blocks on the in-flight fence
    /// previously recorded for the acquired image, so the caller can reuse
    /// any per-image resources immediately.
    pub fn acquire_next_image(
        &mut self,
        semaphore: vk::Semaphore,
    ) -> Result<usize, SwapchainError> {
        let result = unsafe {
            self.loader.acquire_next_image(
                self.khr,
                u64::MAX,
                semaphore,
                vk::Fence::null(),
            )
        };
        let index = match result {
            Ok((index, false)) => index as usize,
            Ok((_, true)) => {
                log::debug!("acquire: swapchain suboptimal, needs rebuild");
                return Err(SwapchainError::NeedsRebuild);
            }
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                log::debug!("acquire: swapchain lost, needs rebuild");
                return Err(SwapchainError::NeedsRebuild);
            }
            Err(error) => {
                return Err(SwapchainError::UnableToAcquireImage(error));
            }
        };

        if let Some(fence) = &self.in_flight_fences[index] {
            fence.wait()?;
        }

        Ok(index)
    }

    /// Record the fence signaled by this frame's submission so the next
    /// acquisition of image `index` can wait for it.
    pub fn record_in_flight_fence(
        &mut self,
        index: usize,
        fence: Arc<Fence>,
    ) {
        self.in_flight_fences[index] = Some(fence);
    }

    /// Present a swapchain image once the wait semaphores are signaled.
    ///
    /// Presentation holds the device's queue lock so it cannot race with
    /// command submission on other threads.
    pub fn queue_present(
        &self,
        index: usize,
        wait_semaphores: &[vk::Semaphore],
    ) -> Result<(), SwapchainError> {
        let index_u32 = index as u32;
        let present_info = vk::PresentInfoKHR {
            wait_semaphore_count: wait_semaphores.len() as u32,
            p_wait_semaphores: wait_semaphores.as_ptr(),
            swapchain_count: 1,
            p_swapchains: &self.khr,
            p_image_indices: &index_u32,
            ..Default::default()
        };
        let result = self.vk_dev.with_graphics_queue(|queue| unsafe {
            self.loader.queue_present(queue, &present_info)
        });
        match result {
            Ok(false) => Ok(()),
            Ok(true) => {
                log::debug!("present: swapchain suboptimal, needs rebuild");
                Err(SwapchainError::NeedsRebuild)
            }
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                log::debug!("present: swapchain lost, needs rebuild");
                Err(SwapchainError::NeedsRebuild)
            }
            Err(error) => Err(SwapchainError::UnableToPresentImage(error)),
        }
    }

    /// Create one framebuffer per swapchain image view. The swapchain view
    /// is attachment zero; `extra_attachments` follow in order.
    ///
    /// The caller owns the framebuffers and must destroy them before the
    /// swapchain is rebuilt or dropped.
    pub fn create_framebuffers(
        &self,
        render_pass: vk::RenderPass,
        extra_attachments: &[vk::ImageView],
    ) -> Result<Vec<vk::Framebuffer>, SwapchainError> {
        let mut framebuffers = Vec::with_capacity(self.image_views.len());
        for &image_view in &self.image_views {
            let mut attachments = vec![image_view];
            attachments.extend_from_slice(extra_attachments);
            let create_info = vk::FramebufferCreateInfo {
                render_pass,
                attachment_count: attachments.len() as u32,
                p_attachments: attachments.as_ptr(),
                width: self.extent.width,
                height: self.extent.height,
                layers: 1,
                ..Default::default()
            };
            let framebuffer = unsafe {
                self.vk_dev
                    .logical_device
                    .create_framebuffer(&create_info, None)
            };
            match framebuffer {
                Ok(framebuffer) => framebuffers.push(framebuffer),
                Err(error) => {
                    for framebuffer in framebuffers.drain(..) {
                        unsafe {
                            self.vk_dev
                                .logical_device
                                .destroy_framebuffer(framebuffer, None);
                        }
                    }
                    return Err(SwapchainError::UnableToCreateFramebuffer(
                        error,
                    ));
                }
            }
        }
        Ok(framebuffers)
    }

    /// The 2D extent used to create the swapchain images and views.
    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    /// The format of the swapchain's images.
    pub fn format(&self) -> vk::Format {
        self.format
    }

    /// The color space of the swapchain's images.
    pub fn color_space(&self) -> vk::ColorSpaceKHR {
        self.color_space
    }

    /// The number of images in the swapchain.
    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// The swapchain's images.
    pub fn images(&self) -> &[vk::Image] {
        &self.images
    }

    /// One view per swapchain image.
    pub fn image_views(&self) -> &[vk::ImageView] {
        &self.image_views
    }
}

impl Drop for Swapchain {
    /// # DANGER
    ///
    /// The owner must ensure that no GPU work references the swapchain's
    /// images before dropping.
    fn drop(&mut self) {
        unsafe {
            for &image_view in &self.image_views {
                self.vk_dev
                    .logical_device
                    .destroy_image_view(image_view, None);
            }
            self.loader.destroy_swapchain(self.khr, None);
        }
    }
}

fn create_image_views(
    vk_dev: &RenderDevice,
    images: &[vk::Image],
    format: vk::Format,
) -> Result<Vec<vk::ImageView>, SwapchainError> {
    let mut image_views = Vec::with_capacity(images.len());
    for (i, &image) in images.iter().enumerate() {
        let create_info = vk::ImageViewCreateInfo {
            image,
            format,
            view_type: vk::ImageViewType::TYPE_2D,
            subresource_range: vk::ImageSubresourceRange {
                aspect_mask: vk::ImageAspectFlags::COLOR,
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: 1,
            },
            ..Default::default()
        };
        let result = unsafe {
            vk_dev
                .logical_device
                .create_image_view(&create_info, None)
        };
        match result {
            Ok(image_view) => {
                image_views.push(image_view);
                vk_dev.name_vulkan_object(
                    format!("swapchain image view {}", i),
                    vk::ObjectType::IMAGE_VIEW,
                    image_view,
                )?;
            }
            Err(error) => {
                for image_view in image_views.drain(..) {
                    unsafe {
                        vk_dev
                            .logical_device
                            .destroy_image_view(image_view, None);
                    }
                }
                return Err(SwapchainError::UnableToCreateImageView(error));
            }
        }
    }
    Ok(image_views)
}
