use crate::allocator::BumpAllocator;
use wasmtime::SharedMemory;

/// Store data reachable from every host call via `Caller`. Single-threaded
/// by design: the store's `&mut` discipline is the only synchronization.
pub struct HostState {
    pub shared_memory: SharedMemory,
    pub allocator: BumpAllocator,
}
