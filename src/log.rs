//! Crate-internal logging macros.
//!
//! With the `defmt` feature enabled every macro forwards to the matching
//! `defmt` macro. Without it the arguments are still evaluated by reference
//! so that call sites stay warning-free on host builds and in tests.
//!
//! # Usage
//!
//! ```ignore
//! log_warn!("bmp: unsupported compression {}", compression);
//! log_debug!("png: {}x{} type {}", width, height, color_type);
//! ```
//!
//! Nothing on a per-pixel path logs. Decoders log once per image, fonts once
//! per load.

#[cfg(feature = "defmt")]
macro_rules! log_trace {
    ($($arg:tt)*) => {{ defmt::trace!($($arg)*); }};
}

#[cfg(not(feature = "defmt"))]
macro_rules! log_trace {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{ $( let _ = &$arg; )* }};
}

#[cfg(feature = "defmt")]
macro_rules! log_debug {
    ($($arg:tt)*) => {{ defmt::debug!($($arg)*); }};
}

#[cfg(not(feature = "defmt"))]
macro_rules! log_debug {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{ $( let _ = &$arg; )* }};
}

#[cfg(feature = "defmt")]
macro_rules! log_info {
    ($($arg:tt)*) => {{ defmt::info!($($arg)*); }};
}

#[cfg(not(feature = "defmt"))]
macro_rules! log_info {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{ $( let _ = &$arg; )* }};
}

#[cfg(feature = "defmt")]
macro_rules! log_warn {
    ($($arg:tt)*) => {{ defmt::warn!($($arg)*); }};
}

#[cfg(not(feature = "defmt"))]
macro_rules! log_warn {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{ $( let _ = &$arg; )* }};
}
