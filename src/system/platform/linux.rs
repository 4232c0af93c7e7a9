use std::io;

use super::{PlatformExtensions, utmpx};
use crate::system::sessions::Session;

pub struct Platform;

impl Platform {
    const STAT: &str = "/proc/stat";
    const CPUINFO: &str = "/proc/cpuinfo";
}

impl PlatformExtensions for Platform {
    fn cpu_stat() -> io::Result<String> {
        std::fs::read_to_string(Self::STAT)
    }

    fn cpu_info() -> io::Result<String> {
        std::fs::read_to_string(Self::CPUINFO)
    }

    fn login_sessions() -> io::Result<Vec<Session>> {
        Ok(utmpx::user_processes())
    }
}
