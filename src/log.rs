//! Console logging. In the browser this goes to `console.*`; host builds
//! (unit tests) write to stderr instead.

#[cfg(target_arch = "wasm32")]
pub(crate) fn log(msg: &str) {
    web_sys::console::log_1(&msg.into());
}

#[cfg(target_arch = "wasm32")]
pub(crate) fn warn(msg: &str) {
    web_sys::console::warn_1(&msg.into());
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn log(msg: &str) {
    eprintln!("{msg}");
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn warn(msg: &str) {
    eprintln!("warning: {msg}");
}

// `println!`-style syntax for console logs
macro_rules! console_log {
    ($($t:tt)*) => ($crate::log::log(&format_args!($($t)*).to_string()))
}

macro_rules! console_warn {
    ($($t:tt)*) => ($crate::log::warn(&format_args!($($t)*).to_string()))
}
