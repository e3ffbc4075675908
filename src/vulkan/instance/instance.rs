use std::ffi::CString;

use ash::{extensions::ext::DebugUtils, vk, Entry};

use super::{debug_callback, extensions, layers, Instance, InstanceError};
use crate::{logging::PrettyList, vulkan::ffi::to_os_ptrs};

impl Instance {
    /// Create a new ash instance with the required extensions.
    ///
    /// Validation layers and the debug callback are set up automatically when
    /// the platform provides them.
    pub fn new(
        required_extensions: &[String],
    ) -> Result<Self, InstanceError> {
        let entry = unsafe {
            Entry::load().map_err(InstanceError::VulkanLoadingError)?
        };
        let layers = layers::filter_available(&entry, &debug_layers())?;
        let debug_utils_available =
            extensions::is_available(&entry, DebugUtils::name())?;

        let mut enabled_extensions = required_extensions.to_vec();
        if debug_utils_available {
            enabled_extensions
                .push(DebugUtils::name().to_string_lossy().into_owned());
        }
        extensions::check_extensions(&entry, &enabled_extensions)?;

        log::debug!("Enabled extensions: {}", PrettyList(&enabled_extensions));
        log::debug!("Enabled layers: {}", PrettyList(&layers));

        let instance = create_instance(&entry, &enabled_extensions, &layers)?;

        let (debug, debug_messenger) = if debug_utils_available {
            let (debug, messenger) =
                debug_callback::create_debug_logger(&entry, &instance)?;
            (Some(debug), Some(messenger))
        } else {
            (None, None)
        };

        Ok(Self {
            ash: instance,
            debug,
            layers,
            debug_messenger,
            entry,
        })
    }

    /// Create the logical device with the requested queues and extensions.
    pub fn create_logical_device(
        &self,
        physical_device: &vk::PhysicalDevice,
        physical_device_features: vk::PhysicalDeviceFeatures,
        physical_device_extensions: &[String],
        queue_create_infos: &[vk::DeviceQueueCreateInfo],
    ) -> Result<ash::Device, InstanceError> {
        let (_c_names, layer_name_ptrs) = unsafe { to_os_ptrs(&self.layers) };
        let (_c_ext_names, ext_name_ptrs) =
            unsafe { to_os_ptrs(physical_device_extensions) };

        let create_info = vk::DeviceCreateInfo {
            queue_create_info_count: queue_create_infos.len() as u32,
            p_queue_create_infos: queue_create_infos.as_ptr(),
            p_enabled_features: &physical_device_features,
            pp_enabled_layer_names: layer_name_ptrs.as_ptr(),
            enabled_layer_count: layer_name_ptrs.len() as u32,
            pp_enabled_extension_names: ext_name_ptrs.as_ptr(),
            enabled_extension_count: physical_device_extensions.len() as u32,
            ..Default::default()
        };

        unsafe {
            self.ash
                .create_device(*physical_device, &create_info, None)
                .map_err(InstanceError::UnableToCreateLogicalDevice)
        }
    }
}

impl Drop for Instance {
    /// The owner must ensure that the Instance is only dropped after other
    /// resources which depend on it! There is no internal synchronization.
    fn drop(&mut self) {
        unsafe {
            if let (Some(debug), Some(messenger)) =
                (&self.debug, self.debug_messenger.take())
            {
                debug.destroy_debug_utils_messenger(messenger, None);
            }
            self.ash.destroy_instance(None);
        }
    }
}

/// The debug layers requested by this library. Layers which the platform does
/// not provide are skipped.
fn debug_layers() -> Vec<String> {
    vec!["VK_LAYER_KHRONOS_validation".to_owned()]
}

/// Create a Vulkan instance with the given extensions and layers.
fn create_instance(
    entry: &Entry,
    extensions: &[String],
    layers: &[String],
) -> Result<ash::Instance, InstanceError> {
    let app_name = CString::new("vk_context").unwrap();
    let engine_name = CString::new("no engine").unwrap();

    let app_info = vk::ApplicationInfo {
        p_engine_name: engine_name.as_ptr(),
        p_application_name: app_name.as_ptr(),
        application_version: vk::make_api_version(0, 1, 0, 0),
        engine_version: vk::make_api_version(0, 1, 0, 0),
        api_version: vk::make_api_version(0, 1, 1, 0),
        ..Default::default()
    };

    let (_layer_names, layer_ptrs) = unsafe { to_os_ptrs(layers) };
    let (_ext_names, ext_ptrs) = unsafe { to_os_ptrs(extensions) };

    let create_info = vk::InstanceCreateInfo {
        p_application_info: &app_info,
        pp_enabled_layer_names: layer_ptrs.as_ptr(),
        enabled_layer_count: layer_ptrs.len() as u32,
        pp_enabled_extension_names: ext_ptrs.as_ptr(),
        enabled_extension_count: ext_ptrs.len() as u32,
        ..Default::default()
    };

    unsafe {
        entry
            .create_instance(&create_info, None)
            .map_err(InstanceError::UnableToCreateInstance)
    }
}
