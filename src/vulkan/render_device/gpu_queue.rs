use super::GpuQueue;

impl GpuQueue {
    /// Build a GpuQueue by reading the raw queue handle from the device.
    pub fn from_device(
        logical_device: &ash::Device,
        family_id: u32,
        index: u32,
    ) -> Self {
        let queue = unsafe { logical_device.get_device_queue(family_id, index) };
        Self {
            queue,
            family_id,
            index,
        }
    }
}
