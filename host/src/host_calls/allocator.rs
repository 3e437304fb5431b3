use crate::error::AllocError;
use crate::host::caller_state::HostState;
use anyhow::Result;
use tracing::{debug, warn};
use wasmtime::Caller;

/// `env.malloc` as seen from the guest. Out-of-memory comes back as NULL so
/// the guest can decide what a failed allocation means; a call before the
/// heap base negotiation finished traps the calling chain instead.
pub fn host_malloc(mut caller: Caller<'_, HostState>, size: i32) -> Result<i32> {
    match caller.data_mut().allocator.alloc(size as u32) {
        Ok(offset) => {
            debug!(size, offset, "malloc");
            Ok(offset as i32)
        }
        Err(err @ AllocError::OutOfMemory { .. }) => {
            warn!(size, %err, "malloc refused");
            Ok(0)
        }
        Err(err @ AllocError::Uninitialized) => Err(err.into()),
    }
}

/// `env.free`: the bump allocator never reclaims, but guests built against a
/// malloc/free pair still need the symbol to resolve.
pub fn host_free(_caller: Caller<'_, HostState>, _ptr: i32, _size: i32) {}
