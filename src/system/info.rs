use sysinfo::System;

/// Operating system identification, printed once after the last round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SystemInfo {
    pub system_name: String,
    pub machine_name: String,
    pub version: String,
    pub release: String,
    pub architecture: String,
}

impl SystemInfo {
    const UNKNOWN: &str = "unknown";

    pub fn current() -> Self {
        let or_unknown = |value: Option<String>| value.unwrap_or_else(|| Self::UNKNOWN.to_owned());
        Self {
            system_name: or_unknown(System::name()),
            machine_name: or_unknown(System::host_name()),
            version: or_unknown(System::os_version()),
            release: or_unknown(System::kernel_version()),
            architecture: std::env::consts::ARCH.to_owned(),
        }
    }
}
