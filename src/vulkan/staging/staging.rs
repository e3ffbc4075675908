use ash::vk;

use super::{check_mip_regions, check_read_back_size, MipRegion, StagingError};
use crate::vulkan::{
    allocator::{create_buffer, create_image, Buffer, Image},
    command_buffer::WorkerId,
    context::DeviceContext,
};

impl DeviceContext {
    /// Copy `data` into a new device-local buffer with the given usage.
    ///
    /// A transient host-visible staging buffer carries the bytes across; the
    /// call blocks until the device-side copy has finished, then destroys the
    /// staging buffer. TRANSFER_DST is added to `usage` automatically.
    pub fn stage_to_device(
        &self,
        worker: WorkerId,
        usage: vk::BufferUsageFlags,
        data: &[u8],
    ) -> Result<Buffer, StagingError> {
        if data.is_empty() {
            return Err(StagingError::EmptyTransfer);
        }
        let byte_size = data.len() as u64;

        let staging = create_buffer(
            self.vk_dev.as_ref(),
            vk::BufferUsageFlags::TRANSFER_SRC,
            vk::MemoryPropertyFlags::HOST_VISIBLE
                | vk::MemoryPropertyFlags::HOST_COHERENT,
            byte_size,
            Some(data),
        )?;
        let buffer = match create_buffer(
            self.vk_dev.as_ref(),
            usage | vk::BufferUsageFlags::TRANSFER_DST,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
            byte_size,
            None,
        ) {
            Ok(buffer) => buffer,
            Err(error) => {
                unsafe { staging.destroy(self.vk_dev.as_ref()) };
                return Err(error.into());
            }
        };

        let result = self.worker_pools.sync_commands(
            worker,
            |device, command_buffer| {
                let region = vk::BufferCopy {
                    src_offset: 0,
                    dst_offset: 0,
                    size: byte_size,
                };
                unsafe {
                    device.cmd_copy_buffer(
                        command_buffer,
                        staging.raw,
                        buffer.raw,
                        &[region],
                    );
                }
            },
        );

        // sync_commands has waited for the copy, so the staging buffer is
        // unreferenced either way.
        unsafe { staging.destroy(self.vk_dev.as_ref()) };
        if let Err(error) = result {
            unsafe { buffer.destroy(self.vk_dev.as_ref()) };
            return Err(error.into());
        }
        Ok(buffer)
    }

    /// Copy texel `data` into a new device-local image.
    ///
    /// Each mip region names where one mip level's texels start within
    /// `data`. The image is transitioned from UNDEFINED to
    /// TRANSFER_DST_OPTIMAL for the copy, then to SHADER_READ_ONLY_OPTIMAL
    /// before the call returns. TRANSFER_DST usage is added automatically.
    pub fn stage_to_device_image(
        &self,
        worker: WorkerId,
        create_info: &vk::ImageCreateInfo,
        mip_regions: &[MipRegion],
        data: &[u8],
    ) -> Result<Image, StagingError> {
        if data.is_empty() {
            return Err(StagingError::EmptyTransfer);
        }
        check_mip_regions(
            mip_regions,
            data.len() as u64,
            create_info.mip_levels,
        )?;

        let staging = create_buffer(
            self.vk_dev.as_ref(),
            vk::BufferUsageFlags::TRANSFER_SRC,
            vk::MemoryPropertyFlags::HOST_VISIBLE
                | vk::MemoryPropertyFlags::HOST_COHERENT,
            data.len() as u64,
            Some(data),
        )?;

        let mut create_info = *create_info;
        create_info.usage |= vk::ImageUsageFlags::TRANSFER_DST;
        let image = match create_image(
            self.vk_dev.as_ref(),
            &create_info,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
        ) {
            Ok(image) => image,
            Err(error) => {
                unsafe { staging.destroy(self.vk_dev.as_ref()) };
                return Err(error.into());
            }
        };

        let mip_levels = create_info.mip_levels;
        let layer_count = create_info.array_layers;
        let result = self.worker_pools.sync_commands(
            worker,
            |device, command_buffer| {
                let to_transfer = image_memory_barrier(
                    image.raw,
                    mip_levels,
                    layer_count,
                    vk::ImageLayout::UNDEFINED,
                    vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                    vk::AccessFlags::empty(),
                    vk::AccessFlags::TRANSFER_WRITE,
                );
                let regions: Vec<vk::BufferImageCopy> = mip_regions
                    .iter()
                    .map(|mip_region| vk::BufferImageCopy {
                        buffer_offset: mip_region.byte_offset,
                        buffer_row_length: 0,
                        buffer_image_height: 0,
                        image_subresource: vk::ImageSubresourceLayers {
                            aspect_mask: vk::ImageAspectFlags::COLOR,
                            mip_level: mip_region.mip_level,
                            base_array_layer: 0,
                            layer_count,
                        },
                        image_offset: vk::Offset3D::default(),
                        image_extent: mip_region.extent,
                    })
                    .collect();
                let to_shader_read = image_memory_barrier(
                    image.raw,
                    mip_levels,
                    layer_count,
                    vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                    vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
                    vk::AccessFlags::TRANSFER_WRITE,
                    vk::AccessFlags::SHADER_READ,
                );
                unsafe {
                    device.cmd_pipeline_barrier(
                        command_buffer,
                        vk::PipelineStageFlags::TOP_OF_PIPE,
                        vk::PipelineStageFlags::TRANSFER,
                        vk::DependencyFlags::empty(),
                        &[],
                        &[],
                        &[to_transfer],
                    );
                    device.cmd_copy_buffer_to_image(
                        command_buffer,
                        staging.raw,
                        image.raw,
                        vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                        &regions,
                    );
                    device.cmd_pipeline_barrier(
                        command_buffer,
                        vk::PipelineStageFlags::TRANSFER,
                        vk::PipelineStageFlags::FRAGMENT_SHADER,
                        vk::DependencyFlags::empty(),
                        &[],
                        &[],
                        &[to_shader_read],
                    );
                }
            },
        );

        unsafe { staging.destroy(self.vk_dev.as_ref()) };
        if let Err(error) = result {
            unsafe { image.destroy(self.vk_dev.as_ref()) };
            return Err(error.into());
        }
        Ok(image)
    }

    /// Copy the first `byte_size` bytes of a device buffer back to the host.
    ///
    /// The source buffer must have been created with TRANSFER_SRC usage. The
    /// call blocks until the device-side copy completes. Asking for more
    /// bytes than the buffer holds is an error.
    pub fn read_back_buffer(
        &self,
        worker: WorkerId,
        buffer: &Buffer,
        byte_size: u64,
    ) -> Result<Vec<u8>, StagingError> {
        check_read_back_size(byte_size, buffer.descriptor.range)?;

        let mut staging = create_buffer(
            self.vk_dev.as_ref(),
            vk::BufferUsageFlags::TRANSFER_DST,
            vk::MemoryPropertyFlags::HOST_VISIBLE
                | vk::MemoryPropertyFlags::HOST_COHERENT,
            byte_size,
            None,
        )?;

        let source = buffer.raw;
        let result = self.worker_pools.sync_commands(
            worker,
            |device, command_buffer| {
                let region = vk::BufferCopy {
                    src_offset: 0,
                    dst_offset: 0,
                    size: byte_size,
                };
                unsafe {
                    device.cmd_copy_buffer(
                        command_buffer,
                        source,
                        staging.raw,
                        &[region],
                    );
                }
            },
        );
        if let Err(error) = result {
            unsafe { staging.destroy(self.vk_dev.as_ref()) };
            return Err(error.into());
        }

        let bytes = read_mapped_bytes(&mut staging, self, byte_size as usize);
        unsafe { staging.destroy(self.vk_dev.as_ref()) };
        bytes
    }
}

fn read_mapped_bytes(
    staging: &mut Buffer,
    ctx: &DeviceContext,
    byte_count: usize,
) -> Result<Vec<u8>, StagingError> {
    staging.map(ctx.vk_dev.as_ref())?;
    let bytes = staging.data::<u8>()?[0..byte_count].to_vec();
    staging.unmap(ctx.vk_dev.as_ref());
    Ok(bytes)
}

fn image_memory_barrier(
    image: vk::Image,
    mip_levels: u32,
    layer_count: u32,
    old_layout: vk::ImageLayout,
    new_layout: vk::ImageLayout,
    src_access_mask: vk::AccessFlags,
    dst_access_mask: vk::AccessFlags,
) -> vk::ImageMemoryBarrier {
    vk::ImageMemoryBarrier {
        src_access_mask,
        dst_access_mask,
        old_layout,
        new_layout,
        src_queue_family_index: vk::QUEUE_FAMILY_IGNORED,
        dst_queue_family_index: vk::QUEUE_FAMILY_IGNORED,
        image,
        subresource_range: vk::ImageSubresourceRange {
            aspect_mask: vk::ImageAspectFlags::COLOR,
            base_mip_level: 0,
            level_count: mip_levels,
            base_array_layer: 0,
            layer_count,
        },
        ..Default::default()
    }
}
