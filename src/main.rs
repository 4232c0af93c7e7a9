use std::io;
use std::process::ExitCode;

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::Report;
use tracing::info;

use hoststat::cli::{Cli, Settings};
use hoststat::config::{Config, load_config, load_config_from_path};
use hoststat::control::{StdinInput, control_channel, listen_for_signals};
use hoststat::coordinator::probe::{CpuProbe, MemoryProbe, SessionsProbe};
use hoststat::coordinator::{Outcome, Supervisor, WorkerSet};
use hoststat::logging::{build_filter, init_tracing};
use hoststat::system::Category;
use hoststat::system::collector::Collector;
use hoststat::system::cpu::ProcStatCpu;
use hoststat::system::info::SystemInfo;
use hoststat::system::memory::SysinfoMemory;
use hoststat::system::sessions::UtmpSessions;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version land here too.
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            return Ok(ExitCode::from(code));
        }
    };

    match run(cli).await {
        Ok(outcome) => {
            info!(?outcome, "run finished");
            Ok(ExitCode::SUCCESS)
        }
        Err(report) => {
            eprintln!("hoststat: {}", cause_chain(&report));
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run(cli: Cli) -> Result<Outcome> {
    let config = load_config_for_cli(&cli)?;
    let settings = cli.resolve(&config)?;
    init_tracing(
        build_filter(cli.log_level.as_deref(), &config.logging)?,
        config.logging.json,
    );
    info!(?settings, "starting");

    let workers = spawn_workers(&settings);
    let (handle, queue) = control_channel();
    let _signals = listen_for_signals(handle)?;

    let system_info = settings.show_system_info.then(SystemInfo::current);
    let mut supervisor = Supervisor::new(
        workers,
        queue,
        settings.run_plan(system_info),
        io::stdout(),
        StdinInput::default(),
        Collector::new(),
    );
    Ok(supervisor.run().await?)
}

fn load_config_for_cli(cli: &Cli) -> Result<Config> {
    let config = match &cli.config {
        Some(path) => load_config_from_path(path)?,
        None => load_config()?,
    };
    Ok(config)
}

fn spawn_workers(settings: &Settings) -> WorkerSet {
    settings
        .categories
        .iter()
        .fold(WorkerSet::builder(), |builder, category| match category {
            Category::Memory => {
                builder.memory(MemoryProbe::new(SysinfoMemory::default(), settings.graphics))
            }
            Category::Cpu => builder.cpu(CpuProbe::new(
                ProcStatCpu::default(),
                settings.samples,
                settings.graphics,
            )),
            Category::Sessions => {
                builder.sessions(SessionsProbe::new(UtmpSessions, settings.max_sessions))
            }
        })
        .build()
}

fn cause_chain(report: &Report) -> String {
    report
        .chain()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ")
}
