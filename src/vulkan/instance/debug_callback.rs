use std::{borrow::Cow, ffi::CStr, os::raw::c_void};

use ash::{extensions::ext::DebugUtils, vk, Entry};

use super::InstanceError;

/// Create a debug messenger which routes validation layer messages into the
/// application's log.
pub fn create_debug_logger(
    entry: &Entry,
    instance: &ash::Instance,
) -> Result<(DebugUtils, vk::DebugUtilsMessengerEXT), InstanceError> {
    let debug = DebugUtils::new(entry, instance);

    let create_info = vk::DebugUtilsMessengerCreateInfoEXT {
        message_severity: vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
            | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
            | vk::DebugUtilsMessageSeverityFlagsEXT::INFO,
        message_type: vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
            | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
            | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        pfn_user_callback: Some(debug_callback),
        ..Default::default()
    };

    let debug_messenger = unsafe {
        debug
            .create_debug_utils_messenger(&create_info, None)
            .map_err(InstanceError::DebugMessengerCreateFailed)?
    };

    Ok((debug, debug_messenger))
}

unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _user_data: *mut c_void,
) -> vk::Bool32 {
    let callback_data = *p_callback_data;
    let message = if callback_data.p_message.is_null() {
        Cow::from("")
    } else {
        CStr::from_ptr(callback_data.p_message).to_string_lossy()
    };

    let full_message = format!("Vulkan Debug [{:?}]: {}", message_type, message);

    if message_severity
        .contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR)
    {
        log::error!("{}", full_message);
    } else if message_severity
        .contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING)
    {
        log::warn!("{}", full_message);
    } else if message_severity
        .contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO)
    {
        log::debug!("{}", full_message);
    } else {
        log::trace!("{}", full_message);
    }

    vk::FALSE
}
