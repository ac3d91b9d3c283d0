//! Ambient per-block context shared by every generator and control callback.
//!
//! The engine loop builds one `BlockCtx` before invoking any generator or
//! callback for a block, and the same reference is threaded through every
//! call for that block. Generators read sample rate / channel count / block
//! size from here rather than caching them, so a generator built for one
//! engine stays valid if moved to another engine with a different
//! configuration.

/// Per-block parameters visible to every generator and control callback
/// invoked during that block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockCtx {
    pub sample_rate: u32,
    pub block_size: u32,
    pub nchnls: u32,
    pub current_block_num: u64,
}

impl BlockCtx {
    pub fn new(sample_rate: u32, block_size: u32, nchnls: u32, current_block_num: u64) -> Self {
        Self {
            sample_rate,
            block_size,
            nchnls,
            current_block_num,
        }
    }
}
