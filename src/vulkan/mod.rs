//! Device-facing modules: instance and device setup, memory allocation,
//! staging uploads, synchronization, deferred destruction, and the swapchain.

pub mod allocator;
pub mod command_buffer;
pub mod context;
pub mod errors;
pub mod instance;
pub mod recycler;
pub mod render_device;
pub mod staging;
pub mod swapchain;
pub mod sync;

mod ffi;
mod vulkan_debug;

pub use self::{
    allocator::{Allocation, Buffer, Image, MemoryDevice},
    command_buffer::{CommandPool, WorkerId, WorkerPools},
    context::DeviceContext,
    instance::Instance,
    recycler::{Disposable, PollFence, Recycler},
    render_device::{GpuQueue, RenderDevice},
    staging::{MipRegion, StagingError},
    swapchain::{Swapchain, WindowSurface},
    sync::{Fence, Semaphore},
    vulkan_debug::VulkanDebug,
};
