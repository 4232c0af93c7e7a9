use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::Config;
use crate::coordinator::RunPlan;
use crate::error::ConfigError;
use crate::render::report::ReportLayout;
use crate::system::Category;
use crate::system::info::SystemInfo;

#[derive(Debug, Parser)]
#[command(
    name = "hoststat",
    about = "Samples memory, CPU utilization and login sessions in fixed rounds"
)]
pub struct Cli {
    /// Show only system usage (memory and CPU)
    #[arg(long)]
    pub system: bool,

    /// Show only logged-in sessions
    #[arg(long)]
    pub user: bool,

    /// Draw graphs next to memory and CPU figures
    #[arg(short, long)]
    pub graphics: bool,

    /// Print reports one after another instead of refreshing the screen
    #[arg(long)]
    pub sequential: bool,

    /// Number of reported rounds [default: 10]
    #[arg(long, value_name = "N")]
    pub samples: Option<u64>,

    /// Seconds between rounds [default: 1]
    #[arg(long, value_name = "SECS")]
    pub tdelay: Option<u64>,

    /// Positional form of --samples
    #[arg(value_name = "SAMPLES")]
    pub samples_positional: Option<u64>,

    /// Positional form of --tdelay
    #[arg(value_name = "TDELAY")]
    pub tdelay_positional: Option<u64>,

    /// Path to config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log filter for diagnostics on stderr (e.g. `debug`, `hoststat=trace`)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

/// Every report reprints the whole sample log, so runs stay bounded.
pub const MAX_SAMPLES: u32 = 100_000;

/// Which worker categories run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Categories {
    pub memory: bool,
    pub cpu: bool,
    pub sessions: bool,
}

impl Categories {
    pub const ALL: Categories = Categories {
        memory: true,
        cpu: true,
        sessions: true,
    };

    /// `--system` selects memory and CPU, `--user` selects sessions; neither
    /// or both select everything.
    pub fn from_flags(system: bool, user: bool) -> Self {
        let system_stats = system || !user;
        Categories {
            memory: system_stats,
            cpu: system_stats,
            sessions: user || !system,
        }
    }

    pub fn contains(self, category: Category) -> bool {
        match category {
            Category::Memory => self.memory,
            Category::Cpu => self.cpu,
            Category::Sessions => self.sessions,
        }
    }

    pub fn iter(self) -> impl Iterator<Item = Category> {
        Category::ALL.into_iter().filter(move |&c| self.contains(c))
    }
}

/// Fully resolved run settings: config file values overridden by flags.
#[derive(Clone, Debug)]
pub struct Settings {
    pub categories: Categories,
    pub graphics: bool,
    pub sequential: bool,
    pub samples: u32,
    pub delay: Duration,
    pub max_sessions: usize,
    pub show_system_info: bool,
}

impl Settings {
    pub fn layout(&self) -> ReportLayout {
        ReportLayout {
            samples: self.samples,
            delay_secs: self.delay.as_secs(),
            graphics: self.graphics,
        }
    }

    pub fn run_plan(&self, system_info: Option<SystemInfo>) -> RunPlan {
        RunPlan {
            samples: self.samples,
            delay: self.delay,
            layout: self.layout(),
            sequential: self.sequential,
            system_info: system_info.filter(|_| self.show_system_info),
        }
    }
}

impl Cli {
    pub fn resolve(&self, config: &Config) -> Result<Settings, ConfigError> {
        let samples = pick(
            "samples",
            self.samples,
            self.samples_positional,
            config.general.samples,
        )?;
        let delay = pick(
            "tdelay",
            self.tdelay,
            self.tdelay_positional,
            config.general.tdelay_secs,
        )?;

        if samples == 0 {
            return Err(ConfigError::ZeroSamples);
        }
        if delay == 0 {
            return Err(ConfigError::ZeroDelay);
        }
        let samples = u32::try_from(samples)
            .ok()
            .filter(|&n| n <= MAX_SAMPLES)
            .ok_or(ConfigError::SamplesOutOfRange { value: samples })?;

        Ok(Settings {
            categories: Categories::from_flags(self.system, self.user),
            graphics: self.graphics || config.display.graphics,
            sequential: self.sequential || config.display.sequential,
            samples,
            delay: Duration::from_secs(delay),
            max_sessions: config.sessions.max_sessions,
            show_system_info: config.display.show_system_info,
        })
    }
}

/// A value may come from its flag or its positional slot, not both with
/// different values.
fn pick(
    name: &'static str,
    flag: Option<u64>,
    positional: Option<u64>,
    fallback: u64,
) -> Result<u64, ConfigError> {
    match (flag, positional) {
        (Some(flag), Some(positional)) if flag != positional => Err(ConfigError::Conflicting {
            name,
            flag,
            positional,
        }),
        (Some(value), _) | (None, Some(value)) => Ok(value),
        (None, None) => Ok(fallback),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("hoststat").chain(args.iter().copied())).unwrap()
    }

    fn resolve(args: &[&str]) -> Result<Settings, ConfigError> {
        parse(args).resolve(&Config::default())
    }

    #[test]
    fn defaults() {
        let settings = resolve(&[]).unwrap();
        assert_eq!(settings.samples, 10);
        assert_eq!(settings.delay, Duration::from_secs(1));
        assert_eq!(settings.categories, Categories::ALL);
        assert!(!settings.graphics);
        assert!(!settings.sequential);
    }

    #[test]
    fn equals_form_flags() {
        let settings = resolve(&["--samples=3", "--tdelay=2", "-g", "--sequential"]).unwrap();
        assert_eq!(settings.samples, 3);
        assert_eq!(settings.delay, Duration::from_secs(2));
        assert!(settings.graphics);
        assert!(settings.sequential);
    }

    #[test]
    fn positional_values() {
        let settings = resolve(&["5", "2"]).unwrap();
        assert_eq!(settings.samples, 5);
        assert_eq!(settings.delay, Duration::from_secs(2));
    }

    #[test]
    fn matching_flag_and_positional_are_accepted() {
        assert_eq!(resolve(&["--samples=4", "4"]).unwrap().samples, 4);
    }

    #[test]
    fn conflicting_flag_and_positional() {
        let err = resolve(&["--samples=4", "5"]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Conflicting {
                name: "samples",
                flag: 4,
                positional: 5
            }
        ));
    }

    #[test]
    fn zero_values_rejected() {
        assert!(matches!(
            resolve(&["--samples=0"]),
            Err(ConfigError::ZeroSamples)
        ));
        assert!(matches!(
            resolve(&["--tdelay=0"]),
            Err(ConfigError::ZeroDelay)
        ));
    }

    #[test]
    fn huge_sample_count_rejected() {
        assert!(matches!(
            resolve(&["--samples=99999999999"]),
            Err(ConfigError::SamplesOutOfRange { .. })
        ));
        assert!(matches!(
            resolve(&["--samples=4294967295"]),
            Err(ConfigError::SamplesOutOfRange { value: 4294967295 })
        ));
        let limit = MAX_SAMPLES.to_string();
        assert!(matches!(
            resolve(&["--samples", &(MAX_SAMPLES as u64 + 1).to_string()]),
            Err(ConfigError::SamplesOutOfRange { .. })
        ));
        assert_eq!(resolve(&["--samples", &limit]).unwrap().samples, MAX_SAMPLES);
    }

    #[test]
    fn largest_accepted_run_builds_its_log() {
        let settings = resolve(&["--samples", &MAX_SAMPLES.to_string()]).unwrap();
        let log = crate::render::report::SampleLog::new(settings.samples);
        assert_eq!(log.memory_rows().count(), MAX_SAMPLES as usize);
    }

    #[test]
    fn category_selection() {
        assert_eq!(
            Categories::from_flags(false, true),
            Categories {
                memory: false,
                cpu: false,
                sessions: true
            }
        );
        assert_eq!(
            Categories::from_flags(true, false),
            Categories {
                memory: true,
                cpu: true,
                sessions: false
            }
        );
        assert_eq!(Categories::from_flags(true, true), Categories::ALL);
        assert_eq!(
            Categories::from_flags(false, true).iter().collect::<Vec<_>>(),
            vec![Category::Sessions]
        );
        assert_eq!(
            Categories::from_flags(true, false).iter().collect::<Vec<_>>(),
            vec![Category::Memory, Category::Cpu]
        );
        assert!(!Categories::from_flags(true, false).contains(Category::Sessions));
        assert_eq!(Categories::ALL.iter().count(), Category::ALL.len());
    }

    #[test]
    fn flags_override_config() {
        let mut config = Config::default();
        config.general.samples = 7;
        config.display.graphics = true;
        let settings = parse(&["--samples=2"]).resolve(&config).unwrap();
        assert_eq!(settings.samples, 2);
        assert!(settings.graphics);
    }

    #[test]
    fn unknown_flag_is_a_parse_error() {
        assert!(Cli::try_parse_from(["hoststat", "--bogus"]).is_err());
    }
}
