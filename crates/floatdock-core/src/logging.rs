#![forbid(unsafe_code)]

//! Logging facade.
//!
//! With the `tracing` feature the usual `tracing` macros are re-exported
//! here. Without it, the same names expand to nothing so call sites never
//! need their own `cfg` guards.
//!
//! The `tracing-json` feature adds [`init_json_subscriber`], a convenience
//! for hosts that want newline-delimited JSON logs filtered by `RUST_LOG`.

#[cfg(feature = "tracing")]
pub use tracing::{debug, error, info, trace, warn};

// Named apart from the builtin `warn` attribute so the re-export is unambiguous.
#[cfg(not(feature = "tracing"))]
macro_rules! fd_trace {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
macro_rules! fd_debug {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
macro_rules! fd_info {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
macro_rules! fd_warn {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
macro_rules! fd_error {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
#[allow(unused_imports)]
pub(crate) use {fd_debug as debug, fd_error as error, fd_info as info, fd_trace as trace, fd_warn as warn};

/// Install a global JSON subscriber honoring `RUST_LOG`.
///
/// Returns `false` if a global subscriber was already installed.
#[cfg(feature = "tracing-json")]
pub fn init_json_subscriber() -> bool {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .is_ok()
}
