use thiserror::Error;

/// Failures on the load/instantiate path. All of these are fatal to startup;
/// the host never retries a guest.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("cannot reserve {pages} pages of linear memory")]
    ResourceExhausted {
        pages: u32,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("guest module rejected")]
    InstantiationFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("guest does not export `{0}`")]
    MissingExport(String),

    #[error("host environment setup failed")]
    Environment(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Failures crossing the `env.malloc` boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AllocError {
    /// The guest called `malloc` before the heap base was negotiated. This is
    /// a broken setup sequence, not a recoverable condition.
    #[error("malloc called before the heap base was negotiated")]
    Uninitialized,

    /// The request would run past the end of the linear memory region.
    #[error("allocation of {requested} bytes exceeds the {remaining} bytes left in linear memory")]
    OutOfMemory { requested: u32, remaining: u32 },
}
