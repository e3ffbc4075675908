use ash::vk;

use super::AllocatorError;

/// Select a memory type index which satisfies both the resource's reported
/// type bits and the caller's required property flags.
///
/// The first matching index wins -- the Vulkan spec orders memory types so
/// that faster types appear first, so no best-fit heuristic is needed. When
/// no index matches, this returns an error rather than a sentinel value:
/// index 0 can be a perfectly legitimate memory type, so it must never double
/// as a failure marker.
pub fn select_memory_type(
    memory_properties: &vk::PhysicalDeviceMemoryProperties,
    type_bits: u32,
    required: vk::MemoryPropertyFlags,
) -> Result<u32, AllocatorError> {
    let count = memory_properties.memory_type_count as usize;
    memory_properties.memory_types[..count]
        .iter()
        .enumerate()
        .find(|(i, memory_type)| {
            let type_supported = type_bits & (1u32 << i) != 0;
            let properties_supported =
                memory_type.property_flags.contains(required);
            type_supported && properties_supported
        })
        .map(|(i, _memory_type)| i as u32)
        .ok_or(AllocatorError::NoSupportedMemoryType(required, type_bits))
}

#[cfg(test)]
mod test {
    use super::*;

    fn device_memory_properties(
        flags: &[vk::MemoryPropertyFlags],
    ) -> vk::PhysicalDeviceMemoryProperties {
        let mut properties = vk::PhysicalDeviceMemoryProperties {
            memory_type_count: flags.len() as u32,
            ..Default::default()
        };
        for (i, property_flags) in flags.iter().enumerate() {
            properties.memory_types[i].property_flags = *property_flags;
        }
        properties
    }

    #[test]
    fn picks_the_lowest_matching_index() {
        let properties = device_memory_properties(&[
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
            vk::MemoryPropertyFlags::HOST_VISIBLE
                | vk::MemoryPropertyFlags::HOST_COHERENT,
            vk::MemoryPropertyFlags::HOST_VISIBLE
                | vk::MemoryPropertyFlags::HOST_COHERENT,
        ]);
        let index = select_memory_type(
            &properties,
            0b111,
            vk::MemoryPropertyFlags::HOST_VISIBLE,
        )
        .unwrap();
        assert_eq!(index, 1);
    }

    #[test]
    fn respects_the_resource_type_bits() {
        let properties = device_memory_properties(&[
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
        ]);
        // type 0 has the right properties but is excluded by the type bits
        let index = select_memory_type(
            &properties,
            0b10,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
        )
        .unwrap();
        assert_eq!(index, 1);
    }

    #[test]
    fn requires_a_full_superset_of_the_requested_flags() {
        let properties = device_memory_properties(&[
            vk::MemoryPropertyFlags::HOST_VISIBLE,
            vk::MemoryPropertyFlags::HOST_VISIBLE
                | vk::MemoryPropertyFlags::HOST_COHERENT,
        ]);
        let index = select_memory_type(
            &properties,
            0b11,
            vk::MemoryPropertyFlags::HOST_VISIBLE
                | vk::MemoryPropertyFlags::HOST_COHERENT,
        )
        .unwrap();
        assert_eq!(index, 1);
    }

    #[test]
    fn fails_when_no_type_matches() {
        let properties = device_memory_properties(&[
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
            vk::MemoryPropertyFlags::HOST_VISIBLE,
        ]);
        let result = select_memory_type(
            &properties,
            0b11,
            vk::MemoryPropertyFlags::HOST_VISIBLE
                | vk::MemoryPropertyFlags::HOST_COHERENT,
        );
        assert!(matches!(
            result,
            Err(AllocatorError::NoSupportedMemoryType(_, _))
        ));
    }

    #[test]
    fn index_zero_is_a_valid_result() {
        let properties = device_memory_properties(&[
            vk::MemoryPropertyFlags::HOST_VISIBLE
                | vk::MemoryPropertyFlags::HOST_COHERENT,
        ]);
        let index = select_memory_type(
            &properties,
            0b1,
            vk::MemoryPropertyFlags::HOST_VISIBLE,
        )
        .unwrap();
        assert_eq!(index, 0);
    }
}
