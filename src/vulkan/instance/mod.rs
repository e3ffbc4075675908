mod debug_callback;
mod extensions;
mod instance;
mod layers;

use ash::{extensions::ext::DebugUtils, vk, Entry};
use thiserror::Error;

/// This enum represents the errors which can occur when building and handling
/// the Vulkan instance.
#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("Error while loading the Vulkan library")]
    VulkanLoadingError(#[source] ash::LoadingError),

    #[error("Unable to list the available Vulkan extensions on this platform")]
    UnableToListAvailableExtensions(#[source] vk::Result),

    #[error("Required extensions are not available on this platform: {:?}", .0)]
    RequiredExtensionsNotFound(Vec<String>),

    #[error("Unable to list the available Vulkan layers on this platform")]
    UnableToListAvailableLayers(#[source] vk::Result),

    #[error("Unable to setup the Vulkan debug callback")]
    DebugMessengerCreateFailed(#[source] vk::Result),

    #[error("Unable to create the Vulkan instance")]
    UnableToCreateInstance(#[source] vk::Result),

    #[error("Unable to create the logical device")]
    UnableToCreateLogicalDevice(#[source] vk::Result),
}

/// The Instance struct holds the ash entry and ash library handle along with
/// the debug callback.
///
/// Validation layers and the debug-utils extension are enabled when the
/// platform provides them and silently skipped when it does not, so the same
/// code path works on developer machines and headless CI runners.
pub struct Instance {
    /// The Ash Vulkan library handle.
    pub ash: ash::Instance,

    /// The DebugUtils entrypoint, used to set debug names for vulkan objects.
    /// None when the platform does not provide the debug-utils extension.
    pub debug: Option<DebugUtils>,

    /// The layers applied to this vulkan instance.
    layers: Vec<String>,

    /// The instance's debug messenger, when debug-utils is available.
    debug_messenger: Option<vk::DebugUtilsMessengerEXT>,

    /// The vulkan function loader.
    #[allow(unused)]
    pub entry: Entry,
}
