use std::ffi::CStr;

use ash::Entry;

use super::InstanceError;

/// Check that every required extension is available on this platform.
pub fn check_extensions(
    entry: &Entry,
    required_extensions: &[String],
) -> Result<(), InstanceError> {
    let available = available_extension_names(entry)?;
    let missing: Vec<String> = required_extensions
        .iter()
        .filter(|name| !available.contains(name))
        .cloned()
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(InstanceError::RequiredExtensionsNotFound(missing))
    }
}

/// Check whether a single extension is available on this platform.
pub fn is_available(
    entry: &Entry,
    extension_name: &CStr,
) -> Result<bool, InstanceError> {
    let name = extension_name.to_string_lossy().into_owned();
    Ok(available_extension_names(entry)?.contains(&name))
}

fn available_extension_names(
    entry: &Entry,
) -> Result<Vec<String>, InstanceError> {
    let properties = entry
        .enumerate_instance_extension_properties(None)
        .map_err(InstanceError::UnableToListAvailableExtensions)?;
    Ok(properties
        .iter()
        .map(|properties| {
            let name = unsafe {
                CStr::from_ptr(properties.extension_name.as_ptr())
            };
            name.to_string_lossy().into_owned()
        })
        .collect())
}
