use std::io;

use crate::system::sessions::Session;

/// OS-specific counter access. Everything that needs a `target_os` cfg lives
/// under this module.
pub trait PlatformExtensions {
    /// Contents of the kernel cpu statistics table (`/proc/stat` format).
    fn cpu_stat() -> io::Result<String>;
    /// Contents of the processor description table (`/proc/cpuinfo` format).
    fn cpu_info() -> io::Result<String>;
    /// Currently logged-in user sessions, in login-record order.
    fn login_sessions() -> io::Result<Vec<Session>>;
}

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(any(target_os = "linux", target_os = "macos"))]
mod utmpx;
#[cfg(not(any(target_os = "linux", target_os = "macos")))]
mod unsupported;

#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(target_os = "macos")]
use macos as platform_impl;
#[cfg(not(any(target_os = "linux", target_os = "macos")))]
use unsupported as platform_impl;

pub fn cpu_stat() -> io::Result<String> {
    platform_impl::Platform::cpu_stat()
}

pub fn cpu_info() -> io::Result<String> {
    platform_impl::Platform::cpu_info()
}

pub fn login_sessions() -> io::Result<Vec<Session>> {
    platform_impl::Platform::login_sessions()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrappers_do_not_panic() {
        let _ = cpu_stat();
        let _ = cpu_info();
        let _ = login_sessions();
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn linux_exposes_cpu_tables() {
        let stat = cpu_stat().unwrap();
        assert!(stat.lines().any(|line| line.starts_with("cpu ")));
        let info = cpu_info().unwrap();
        assert!(info.contains("processor"));
    }
}
