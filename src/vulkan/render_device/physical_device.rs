use std::ffi::CStr;

use ash::vk;

use super::{PhysicalDeviceError, QueueSelectionError};

/// Pick a physical device which provides a graphics-capable queue family.
/// Discrete GPUs are preferred, then integrated, then whatever is left.
pub fn find_optimal(
    instance: &ash::Instance,
) -> Result<vk::PhysicalDevice, PhysicalDeviceError> {
    let devices = unsafe {
        instance
            .enumerate_physical_devices()
            .map_err(PhysicalDeviceError::UnableToEnumerateDevices)?
    };

    let mut candidates: Vec<(u32, vk::PhysicalDevice)> = devices
        .into_iter()
        .filter(|device| find_graphics_queue_family(instance, *device).is_ok())
        .map(|device| {
            let properties =
                unsafe { instance.get_physical_device_properties(device) };
            let rank = match properties.device_type {
                vk::PhysicalDeviceType::DISCRETE_GPU => 0,
                vk::PhysicalDeviceType::INTEGRATED_GPU => 1,
                _ => 2,
            };
            (rank, device)
        })
        .collect();
    candidates.sort_by_key(|(rank, _)| *rank);

    let (_, device) = candidates
        .first()
        .ok_or(PhysicalDeviceError::NoSuitableDeviceFound)?;

    let properties =
        unsafe { instance.get_physical_device_properties(*device) };
    let name = unsafe { CStr::from_ptr(properties.device_name.as_ptr()) };
    log::info!(
        "Using physical device: {} ({:?})",
        name.to_string_lossy(),
        properties.device_type
    );

    Ok(*device)
}

/// Find the index of a queue family which supports graphics operations.
pub fn find_graphics_queue_family(
    instance: &ash::Instance,
    physical_device: vk::PhysicalDevice,
) -> Result<u32, QueueSelectionError> {
    let queue_families = unsafe {
        instance.get_physical_device_queue_family_properties(physical_device)
    };
    queue_families
        .iter()
        .enumerate()
        .find(|(_, family)| {
            family.queue_flags.contains(vk::QueueFlags::GRAPHICS)
        })
        .map(|(index, _)| index as u32)
        .ok_or(QueueSelectionError::UnableToFindGraphicsQueue)
}
