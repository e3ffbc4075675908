use std::ffi::CStr;

use ash::Entry;

use super::InstanceError;
use crate::logging::PrettyList;

/// Filter the desired layers down to the ones which this platform actually
/// provides. Unlike extensions, layers are purely diagnostic, so a missing
/// layer is logged rather than treated as an error.
pub fn filter_available(
    entry: &Entry,
    desired_layers: &[String],
) -> Result<Vec<String>, InstanceError> {
    let properties = entry
        .enumerate_instance_layer_properties()
        .map_err(InstanceError::UnableToListAvailableLayers)?;
    let available: Vec<String> = properties
        .iter()
        .map(|properties| {
            let name =
                unsafe { CStr::from_ptr(properties.layer_name.as_ptr()) };
            name.to_string_lossy().into_owned()
        })
        .collect();

    log::debug!("Available layers: {}", PrettyList(&available));

    let (found, missing): (Vec<String>, Vec<String>) = desired_layers
        .iter()
        .cloned()
        .partition(|layer| available.contains(layer));
    if !missing.is_empty() {
        log::info!(
            "Skipping unavailable debug layers: {}",
            PrettyList(&missing)
        );
    }
    Ok(found)
}
