pub mod renderer;
pub mod utils;

pub use anyhow;
pub use fontdue;
pub use glam;
pub use glow;
pub use log;

#[macro_export]
macro_rules! error_return {
    ($($arg:tt)+) => { { log::error!($($arg)+); return; } };
}

#[macro_export]
macro_rules! trace_return {
    ($($arg:tt)+) => { { log::trace!($($arg)+); return; } };
}
