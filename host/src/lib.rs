pub mod allocator;
pub mod error;
pub mod host;
pub mod host_calls;

pub use allocator::BumpAllocator;
pub use error::{AllocError, HostError};
pub use host::host_object::{GuestHost, GuestHostConfig};
