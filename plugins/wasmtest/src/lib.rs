#[global_allocator]
static ALLOC: guest_alloc::HostAllocator = guest_alloc::HostAllocator;

#[no_mangle]
pub extern "C" fn add(lhs: u8, rhs: u8) -> i16 {
    (lhs as i16).wrapping_add(rhs as i16)
}

/// Touches the negotiated heap: grabs a small buffer through the global
/// allocator, stamps a byte the host can look for, and hands the offset back.
#[no_mangle]
pub extern "C" fn fill() -> i32 {
    let mut buf = vec![0u8; 5];
    buf[3] = 42;
    let ptr = buf.as_ptr() as i32;
    std::mem::forget(buf);
    ptr
}
