use std::io;

use super::{PlatformExtensions, utmpx};
use crate::system::sessions::Session;

pub struct Platform;

impl PlatformExtensions for Platform {
    fn cpu_stat() -> io::Result<String> {
        // Mach exposes host_statistics instead of a stat table.
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "cpu tick counters are only read from /proc/stat",
        ))
    }

    fn cpu_info() -> io::Result<String> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "processor table is only read from /proc/cpuinfo",
        ))
    }

    fn login_sessions() -> io::Result<Vec<Session>> {
        Ok(utmpx::user_processes())
    }
}
