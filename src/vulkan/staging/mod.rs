//! Staging uploads: moving host bytes into device-local memory through a
//! transient host-visible buffer.
//!
//! Staging blocks the calling thread until the device-side copy completes.
//! That is deliberate: uploads are setup-time operations, not steady-state
//! per-frame work, and the blocking wait is what makes it safe to destroy the
//! transient buffer immediately afterwards.

mod staging;

use ash::vk;
use thiserror::Error;

use crate::vulkan::{
    allocator::AllocatorError, command_buffer::CommandBufferError,
};

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("refusing to stage a zero-length transfer")]
    EmptyTransfer,

    #[error("an image upload requires at least one mip region")]
    NoMipRegions,

    #[error(
        "mip region for level {} is out of range for {} mip levels",
        .level, .mip_levels
    )]
    MipLevelOutOfRange { level: u32, mip_levels: u32 },

    #[error("mip region for level {} has a zero byte count", .level)]
    EmptyMipRegion { level: u32 },

    #[error(
        "mip region for level {} spans bytes {}..{} but only {} bytes were \
         provided",
        .level, .byte_offset, .byte_end, .data_size
    )]
    MipRegionOutOfBounds {
        level: u32,
        byte_offset: u64,
        byte_end: u64,
        data_size: u64,
    },

    #[error(
        "refusing to read {} bytes back from a {} byte buffer",
        .requested, .available
    )]
    ReadBackOutOfBounds { requested: u64, available: u64 },

    #[error(transparent)]
    UnexpectedAllocatorError(#[from] AllocatorError),

    #[error(transparent)]
    UnexpectedCommandBufferError(#[from] CommandBufferError),
}

/// Describes where one mip level's texels live inside an upload's byte
/// buffer.
#[derive(Debug, Clone, Copy)]
pub struct MipRegion {
    /// The destination mip level.
    pub mip_level: u32,

    /// The byte offset of this level's first texel within the upload.
    pub byte_offset: u64,

    /// The number of bytes this level occupies within the upload. The caller
    /// computes this from the extent and the image format's texel size.
    pub byte_count: u64,

    /// The extent of this mip level.
    pub extent: vk::Extent3D,
}

/// Reject degenerate or out-of-bounds mip regions before any device call is
/// made.
pub(crate) fn check_mip_regions(
    regions: &[MipRegion],
    data_size: u64,
    mip_levels: u32,
) -> Result<(), StagingError> {
    if regions.is_empty() {
        return Err(StagingError::NoMipRegions);
    }
    for region in regions {
        if region.mip_level >= mip_levels {
            return Err(StagingError::MipLevelOutOfRange {
                level: region.mip_level,
                mip_levels,
            });
        }
        if region.byte_count == 0 {
            return Err(StagingError::EmptyMipRegion {
                level: region.mip_level,
            });
        }
        let byte_end = region
            .byte_offset
            .checked_add(region.byte_count)
            .unwrap_or(u64::MAX);
        if byte_end > data_size {
            return Err(StagingError::MipRegionOutOfBounds {
                level: region.mip_level,
                byte_offset: region.byte_offset,
                byte_end,
                data_size,
            });
        }
    }
    Ok(())
}

/// Reject a read-back that would copy past the end of the source buffer
/// before any device call is made.
pub(crate) fn check_read_back_size(
    requested: u64,
    available: u64,
) -> Result<(), StagingError> {
    if requested == 0 {
        return Err(StagingError::EmptyTransfer);
    }
    if requested > available {
        return Err(StagingError::ReadBackOutOfBounds {
            requested,
            available,
        });
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn region(mip_level: u32, byte_offset: u64, byte_count: u64) -> MipRegion {
        MipRegion {
            mip_level,
            byte_offset,
            byte_count,
            extent: vk::Extent3D {
                width: 4,
                height: 4,
                depth: 1,
            },
        }
    }

    #[test]
    fn an_empty_region_list_is_rejected() {
        let result = check_mip_regions(&[], 1024, 1);
        assert!(matches!(result, Err(StagingError::NoMipRegions)));
    }

    #[test]
    fn a_region_for_a_missing_mip_level_is_rejected() {
        let result = check_mip_regions(&[region(2, 0, 64)], 1024, 2);
        assert!(matches!(
            result,
            Err(StagingError::MipLevelOutOfRange { level: 2, .. })
        ));
    }

    #[test]
    fn a_region_starting_past_the_end_of_the_data_is_rejected() {
        let result = check_mip_regions(&[region(0, 1024, 64)], 1024, 1);
        assert!(matches!(
            result,
            Err(StagingError::MipRegionOutOfBounds { .. })
        ));
    }

    #[test]
    fn a_region_overrunning_the_end_of_the_data_is_rejected() {
        // A 4x4 RGBA mip needs 64 bytes, but starting at byte 1020 of a
        // 1024 byte upload leaves only 4.
        let result = check_mip_regions(&[region(0, 1020, 64)], 1024, 1);
        assert!(matches!(
            result,
            Err(StagingError::MipRegionOutOfBounds {
                byte_end: 1084,
                data_size: 1024,
                ..
            })
        ));
    }

    #[test]
    fn a_zero_length_region_is_rejected() {
        let result = check_mip_regions(&[region(0, 0, 0)], 1024, 1);
        assert!(matches!(
            result,
            Err(StagingError::EmptyMipRegion { level: 0 })
        ));
    }

    #[test]
    fn an_offset_and_count_that_overflow_are_rejected() {
        let result = check_mip_regions(&[region(0, u64::MAX, 64)], 1024, 1);
        assert!(matches!(
            result,
            Err(StagingError::MipRegionOutOfBounds { .. })
        ));
    }

    #[test]
    fn in_bounds_regions_pass() {
        let regions = [region(0, 0, 64), region(1, 64, 16)];
        assert!(check_mip_regions(&regions, 80, 2).is_ok());
    }

    #[test]
    fn a_read_back_larger_than_the_buffer_is_rejected() {
        let result = check_read_back_size(128, 64);
        assert!(matches!(
            result,
            Err(StagingError::ReadBackOutOfBounds {
                requested: 128,
                available: 64,
            })
        ));
    }

    #[test]
    fn a_zero_length_read_back_is_rejected() {
        assert!(matches!(
            check_read_back_size(0, 64),
            Err(StagingError::EmptyTransfer)
        ));
    }

    #[test]
    fn a_read_back_of_the_whole_buffer_passes() {
        assert!(check_read_back_size(64, 64).is_ok());
    }
}
