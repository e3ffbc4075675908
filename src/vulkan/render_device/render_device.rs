use std::sync::Mutex;

use ash::vk;

use super::{physical_device, GpuQueue, RenderDevice, RenderDeviceError};
use crate::vulkan::instance::Instance;

impl RenderDevice {
    /// Create the Vulkan render device.
    ///
    /// A single graphics queue is created; all submission in this library is
    /// serialized on it.
    pub fn new(
        instance: Instance,
        physical_device_extensions: &[String],
    ) -> Result<Self, RenderDeviceError> {
        let physical_device = physical_device::find_optimal(&instance.ash)?;
        let graphics_family_index = physical_device::find_graphics_queue_family(
            &instance.ash,
            physical_device,
        )?;

        let queue_priorities = [1.0f32];
        let queue_create_infos = [vk::DeviceQueueCreateInfo {
            queue_family_index: graphics_family_index,
            queue_count: 1,
            p_queue_priorities: queue_priorities.as_ptr(),
            ..Default::default()
        }];

        let logical_device = instance.create_logical_device(
            &physical_device,
            vk::PhysicalDeviceFeatures::default(),
            physical_device_extensions,
            &queue_create_infos,
        )?;

        let graphics_queue =
            GpuQueue::from_device(&logical_device, graphics_family_index, 0);

        let memory_properties = unsafe {
            instance
                .ash
                .get_physical_device_memory_properties(physical_device)
        };

        Ok(Self {
            physical_device,
            logical_device,
            graphics_queue,
            queue_lock: Mutex::new(()),
            memory_properties,
            instance,
        })
    }

    /// The physical device in use.
    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    /// The graphics queue used by all work in this library.
    pub fn graphics_queue(&self) -> &GpuQueue {
        &self.graphics_queue
    }

    /// The physical device's memory types and heaps.
    pub fn memory_properties(&self) -> &vk::PhysicalDeviceMemoryProperties {
        &self.memory_properties
    }

    /// Submit command buffers to the graphics queue.
    ///
    /// The internal queue lock is held for the duration of the submission so
    /// multiple recording threads can share this device safely.
    pub fn submit_to_graphics_queue(
        &self,
        submit_infos: &[vk::SubmitInfo],
        fence: vk::Fence,
    ) -> Result<(), RenderDeviceError> {
        let _queue_guard = self
            .queue_lock
            .lock()
            .expect("unable to acquire the graphics queue lock");
        unsafe {
            self.logical_device
                .queue_submit(self.graphics_queue.queue, submit_infos, fence)
                .map_err(RenderDeviceError::UnableToSubmitToQueue)
        }
    }

    /// Run `action` with exclusive access to the graphics queue. Used for
    /// presentation, which must not race with submission.
    pub fn with_graphics_queue<T>(
        &self,
        action: impl FnOnce(vk::Queue) -> T,
    ) -> T {
        let _queue_guard = self
            .queue_lock
            .lock()
            .expect("unable to acquire the graphics queue lock");
        action(self.graphics_queue.queue)
    }

    /// Block until every queue on the device has finished all pending work.
    pub fn wait_idle(&self) -> Result<(), RenderDeviceError> {
        unsafe {
            self.logical_device
                .device_wait_idle()
                .map_err(RenderDeviceError::UnableToWaitIdle)
        }
    }

    /// Assign a name to a Vulkan object which shows up in validation layer
    /// logs. A no-op when debug-utils is unavailable.
    pub fn name_vulkan_object<Name, Handle>(
        &self,
        name: Name,
        object_type: vk::ObjectType,
        handle: Handle,
    ) -> Result<(), RenderDeviceError>
    where
        Name: Into<String>,
        Handle: vk::Handle + Copy,
    {
        let debug = match &self.instance.debug {
            Some(debug) => debug,
            None => return Ok(()),
        };

        let owned_name = name.into();
        let cname = std::ffi::CString::new(owned_name.clone()).unwrap();
        let name_info = vk::DebugUtilsObjectNameInfoEXT {
            object_type,
            object_handle: handle.as_raw(),
            p_object_name: cname.as_ptr(),
            ..Default::default()
        };
        unsafe {
            debug
                .debug_utils_set_object_name(
                    self.logical_device.handle(),
                    &name_info,
                )
                .map_err(|err| {
                    RenderDeviceError::UnableToSetDebugName(
                        owned_name,
                        object_type,
                        err,
                    )
                })
        }
    }
}

impl Drop for RenderDevice {
    /// The owner must ensure that all resources created with this device have
    /// been destroyed and that the device is idle before dropping.
    fn drop(&mut self) {
        unsafe {
            self.logical_device.destroy_device(None);
        }
    }
}
