use std::io;

use super::PlatformExtensions;
use crate::system::sessions::Session;

pub struct Platform;

impl PlatformExtensions for Platform {
    fn cpu_stat() -> io::Result<String> {
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
        // No utmp database here; an empty list is a valid answer.
        Ok(Vec::new())
    }
}
