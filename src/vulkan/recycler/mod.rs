//! Deferred, fence-gated destruction of GPU resources.
//!
//! Destroying a resource which an in-flight command buffer still references
//! is undefined behavior on the device side. Call sites, however, want to
//! express destruction where it is natural for them -- at the end of a scope,
//! or an explicit "done with this". The recycler reconciles the two: retired
//! resources are trashed into a pending list, the pending list is batched
//! under a frame fence at submission time, and each batch is destroyed only
//! once the device has signaled its fence.
//!
//! Entries move Pending -> Fenced -> Executed, strictly forward:
//!
//! * [Recycler::trash] registers an entry with no fence attached (Pending).
//! * [Recycler::empty_dumpster] takes the whole pending list as one batch and
//!   queues it behind a fence (Fenced).
//! * [Recycler::recycle] pops batches off the FRONT of the fenced queue while
//!   their fences report signaled, handing the entries back for destruction
//!   (Executed). The first unsignaled fence stops the scan -- batches are
//!   never executed out of submission order.

mod disposable;
mod recycler;

use std::{collections::VecDeque, sync::Arc};

use ash::vk;

use crate::vulkan::{
    allocator::{Buffer, Image},
    command_buffer::CommandPool,
    sync::{Fence, FenceError, Semaphore},
};

/// A fence whose status the recycler can poll without blocking.
///
/// The recycler is written against this trait so its ordering and teardown
/// invariants can be tested without a live device.
pub trait PollFence {
    type Error;

    /// True when the fence's submission has completed on the device.
    fn is_signaled(&self) -> Result<bool, Self::Error>;
}

impl PollFence for Arc<Fence> {
    type Error = FenceError;

    fn is_signaled(&self) -> Result<bool, Self::Error> {
        Fence::is_signaled(self)
    }
}

/// A batch of trash entries gated behind a single fence.
struct RecycleBin<F, T> {
    fence: F,
    batch: Vec<T>,
}

/// The deferred destruction manager.
///
/// Single-threaded by design: whichever thread calls `trash`,
/// `empty_dumpster`, and `recycle` must be the same thread, or the owner must
/// wrap the recycler in a mutex.
pub struct Recycler<F: PollFence, T> {
    /// Trash entries with no fence attached yet.
    dumpster: Vec<T>,

    /// Fenced batches, ordered by submission.
    bins: VecDeque<RecycleBin<F, T>>,
}

/// A GPU resource retired to the recycler.
///
/// A tagged variant per resource kind, instead of boxed destructor closures,
/// so disposal is plain enum dispatch.
pub enum Disposable {
    Buffer(Buffer),
    Image(Image),
    ImageView(vk::ImageView),
    Framebuffer(vk::Framebuffer),
    Semaphore(Semaphore),
    CommandBuffers {
        pool: Arc<CommandPool>,
        buffers: Vec<vk::CommandBuffer>,
    },
}
