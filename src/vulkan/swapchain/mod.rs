//! Swapchain creation, acquisition, and presentation.
//!
//! The swapchain owns one in-flight fence slot per image. Acquiring an image
//! blocks on that image's previously recorded fence, which is the primary
//! backpressure mechanism keeping the CPU from racing ahead of the GPU.

mod selection;
mod swapchain;
mod window_surface;

use std::sync::Arc;

use ash::{extensions::khr, vk};
use thiserror::Error;

use crate::vulkan::{
    render_device::{RenderDevice, RenderDeviceError},
    sync::{Fence, FenceError},
};

#[derive(Debug, Error)]
pub enum SwapchainError {
    #[error("The graphics queue cannot present images to this surface")]
    SurfaceNotSupported,

    #[error(
        "Unable to determine if the device can present images to this surface"
    )]
    UnableToCheckSurfaceSupport(#[source] vk::Result),

    #[error("Unable to get the surface capabilities for the physical device")]
    UnableToGetSurfaceCapabilities(#[source] vk::Result),

    #[error("Unable to create the swapchain")]
    UnableToCreateSwapchain(#[source] vk::Result),

    #[error("Unable to get the swapchain's images")]
    UnableToGetSwapchainImages(#[source] vk::Result),

    #[error("Unable to create a view for a swapchain image")]
    UnableToCreateImageView(#[source] vk::Result),

    #[error("Unable to create a framebuffer for a swapchain image view")]
    UnableToCreateFramebuffer(#[source] vk::Result),

    #[error("Unable to acquire a swapchain image")]
    UnableToAcquireImage(#[source] vk::Result),

    #[error("Unable to present a swapchain image")]
    UnableToPresentImage(#[source] vk::Result),

    #[error(
        "The swapchain no longer matches the surface and must be rebuilt"
    )]
    NeedsRebuild,

    #[error(transparent)]
    UnexpectedFenceError(#[from] FenceError),

    #[error(transparent)]
    UnexpectedRenderDeviceError(#[from] RenderDeviceError),
}

/// The presentation surface and the extension loader used to query it. These
/// two are always used together, so they live together.
pub struct WindowSurface {
    pub khr: vk::SurfaceKHR,
    pub loader: khr::Surface,
}

/// The swapchain, its images and views, and the in-flight fence recorded for
/// each image.
pub struct Swapchain {
    loader: khr::Swapchain,
    khr: vk::SwapchainKHR,
    images: Vec<vk::Image>,
    image_views: Vec<vk::ImageView>,
    format: vk::Format,
    color_space: vk::ColorSpaceKHR,
    extent: vk::Extent2D,
    in_flight_fences: Vec<Option<Arc<Fence>>>,

    /// The device must outlive the swapchain.
    pub vk_dev: Arc<RenderDevice>,
}
