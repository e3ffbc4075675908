//! A handle-tracking double for [MemoryDevice], used to exercise allocation
//! failure paths without a live Vulkan device.

use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, HashSet},
};

use ash::vk::{self, Handle};

use super::{Allocation, AllocatorError, MemoryDevice};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStep {
    CreateBuffer,
    CreateImage,
    Allocate,
    BindBuffer,
    BindImage,
    Write,
}

/// Tracks every handle and allocation it hands out so tests can assert that
/// failure paths release exactly what they acquired.
pub struct FakeMemoryDevice {
    properties: vk::PhysicalDeviceMemoryProperties,
    alignment: u64,
    next_handle: Cell<u64>,
    calls: Cell<usize>,
    fail_step: Cell<Option<FailureStep>>,
    live_buffers: RefCell<HashSet<u64>>,
    live_images: RefCell<HashSet<u64>>,
    live_memory: RefCell<HashSet<u64>>,
    requested_sizes: RefCell<HashMap<u64, u64>>,
    written: RefCell<HashMap<u64, Vec<u8>>>,
}

impl FakeMemoryDevice {
    pub fn new(memory_type_flags: &[vk::MemoryPropertyFlags]) -> Self {
        let mut properties = vk::PhysicalDeviceMemoryProperties {
            memory_type_count: memory_type_flags.len() as u32,
            ..Default::default()
        };
        for (i, flags) in memory_type_flags.iter().enumerate() {
            properties.memory_types[i].property_flags = *flags;
        }
        Self {
            properties,
            alignment: 256,
            next_handle: Cell::new(1),
            calls: Cell::new(0),
            fail_step: Cell::new(None),
            live_buffers: RefCell::new(HashSet::new()),
            live_images: RefCell::new(HashSet::new()),
            live_memory: RefCell::new(HashSet::new()),
            requested_sizes: RefCell::new(HashMap::new()),
            written: RefCell::new(HashMap::new()),
        }
    }

    /// Arm a single step to fail on its next invocation.
    pub fn fail_at(&self, step: FailureStep) {
        self.fail_step.set(Some(step));
    }

    /// True when every handed-out handle and allocation has been released.
    pub fn is_clean(&self) -> bool {
        self.live_buffers.borrow().is_empty()
            && self.live_images.borrow().is_empty()
            && self.live_memory.borrow().is_empty()
    }

    pub fn live_buffer_count(&self) -> usize {
        self.live_buffers.borrow().len()
    }

    pub fn live_image_count(&self) -> usize {
        self.live_images.borrow().len()
    }

    pub fn live_memory_count(&self) -> usize {
        self.live_memory.borrow().len()
    }

    /// The number of device entry points invoked so far. Degenerate inputs
    /// must be rejected before any device call is made.
    pub fn call_count(&self) -> usize {
        self.calls.get()
    }

    /// The bytes most recently written into the given allocation.
    pub fn written_bytes(&self, allocation: &Allocation) -> Vec<u8> {
        self.written
            .borrow()
            .get(&allocation.memory.as_raw())
            .cloned()
            .unwrap_or_default()
    }

    fn next(&self) -> u64 {
        let handle = self.next_handle.get();
        self.next_handle.set(handle + 1);
        handle
    }

    fn record_call(&self) {
        self.calls.set(self.calls.get() + 1);
    }

    fn take_failure(&self, step: FailureStep) -> bool {
        if self.fail_step.get() == Some(step) {
            self.fail_step.set(None);
            true
        } else {
            false
        }
    }

    fn aligned(&self, byte_size: u64) -> u64 {
        ((byte_size + self.alignment - 1) / self.alignment) * self.alignment
    }

    fn all_type_bits(&self) -> u32 {
        (1u32 << self.properties.memory_type_count) - 1
    }
}

impl MemoryDevice for FakeMemoryDevice {
    fn memory_properties(&self) -> &vk::PhysicalDeviceMemoryProperties {
        &self.properties
    }

    fn create_buffer_handle(
        &self,
        byte_size: u64,
        usage: vk::BufferUsageFlags,
    ) -> Result<vk::Buffer, AllocatorError> {
        self.record_call();
        if self.take_failure(FailureStep::CreateBuffer) {
            return Err(AllocatorError::UnableToCreateBuffer {
                size: byte_size,
                usage,
                source: vk::Result::ERROR_OUT_OF_HOST_MEMORY,
            });
        }
        let handle = self.next();
        self.live_buffers.borrow_mut().insert(handle);
        self.requested_sizes.borrow_mut().insert(handle, byte_size);
        Ok(vk::Buffer::from_raw(handle))
    }

    fn buffer_memory_requirements(
        &self,
        buffer: vk::Buffer,
    ) -> vk::MemoryRequirements {
        self.record_call();
        let requested = self
            .requested_sizes
            .borrow()
            .get(&buffer.as_raw())
            .copied()
            .unwrap_or(0);
        vk::MemoryRequirements {
            size: self.aligned(requested),
            alignment: self.alignment,
            memory_type_bits: self.all_type_bits(),
        }
    }

    fn create_image_handle(
        &self,
        create_info: &vk::ImageCreateInfo,
    ) -> Result<vk::Image, AllocatorError> {
        self.record_call();
        if self.take_failure(FailureStep::CreateImage) {
            return Err(AllocatorError::UnableToCreateImage(
                vk::Result::ERROR_OUT_OF_HOST_MEMORY,
            ));
        }
        let handle = self.next();
        self.live_images.borrow_mut().insert(handle);
        let extent = create_info.extent;
        let byte_size =
            u64::from(extent.width) * u64::from(extent.height) * 4;
        self.requested_sizes.borrow_mut().insert(handle, byte_size);
        Ok(vk::Image::from_raw(handle))
    }

    fn image_memory_requirements(
        &self,
        image: vk::Image,
    ) -> vk::MemoryRequirements {
        self.record_call();
        let requested = self
            .requested_sizes
            .borrow()
            .get(&image.as_raw())
            .copied()
            .unwrap_or(0);
        vk::MemoryRequirements {
            size: self.aligned(requested),
            alignment: self.alignment,
            memory_type_bits: self.all_type_bits(),
        }
    }

    fn allocate_memory(
        &self,
        byte_size: u64,
        _memory_type_index: u32,
    ) -> Result<vk::DeviceMemory, AllocatorError> {
        self.record_call();
        if self.take_failure(FailureStep::Allocate) {
            return Err(AllocatorError::OutOfDeviceMemory(
                vk::Result::ERROR_OUT_OF_DEVICE_MEMORY,
            ));
        }
        let handle = self.next();
        self.live_memory.borrow_mut().insert(handle);
        self.requested_sizes.borrow_mut().insert(handle, byte_size);
        Ok(vk::DeviceMemory::from_raw(handle))
    }

    fn bind_buffer_memory(
        &self,
        _buffer: vk::Buffer,
        _allocation: &Allocation,
    ) -> Result<(), AllocatorError> {
        self.record_call();
        if self.take_failure(FailureStep::BindBuffer) {
            return Err(AllocatorError::UnableToBindBufferMemory(
                vk::Result::ERROR_OUT_OF_DEVICE_MEMORY,
            ));
        }
        Ok(())
    }

    fn bind_image_memory(
        &self,
        _image: vk::Image,
        _allocation: &Allocation,
    ) -> Result<(), AllocatorError> {
        self.record_call();
        if self.take_failure(FailureStep::BindImage) {
            return Err(AllocatorError::UnableToBindImageMemory(
                vk::Result::ERROR_OUT_OF_DEVICE_MEMORY,
            ));
        }
        Ok(())
    }

    unsafe fn write_bytes(
        &self,
        allocation: &Allocation,
        bytes: &[u8],
    ) -> Result<(), AllocatorError> {
        self.record_call();
        if self.take_failure(FailureStep::Write) {
            return Err(AllocatorError::UnableToMapDeviceMemory(
                vk::Result::ERROR_MEMORY_MAP_FAILED,
            ));
        }
        self.written
            .borrow_mut()
            .insert(allocation.memory.as_raw(), bytes.to_vec());
        Ok(())
    }

    unsafe fn destroy_buffer_handle(&self, buffer: vk::Buffer) {
        self.record_call();
        self.live_buffers.borrow_mut().remove(&buffer.as_raw());
    }

    unsafe fn destroy_image_handle(&self, image: vk::Image) {
        self.record_call();
        self.live_images.borrow_mut().remove(&image.as_raw());
    }

    unsafe fn free_memory(&self, memory: vk::DeviceMemory) {
        self.record_call();
        self.live_memory.borrow_mut().remove(&memory.as_raw());
    }
}
