use std::io::Write;
use std::time::Duration;

use crossterm::QueueableCommand;
use crossterm::cursor::MoveTo;
use crossterm::terminal::{Clear, ClearType};
use futures::future::join_all;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::control::{ControlQueue, OperatorInput, WaitOutcome, interruptible_wait};
use crate::coordinator::message::{
    CpuResponse, MemoryResponse, Readiness, RoundIndex, SessionsResponse,
};
use crate::coordinator::probe::Probe;
use crate::coordinator::worker::{WorkerHandle, spawn_worker};
use crate::error::MonitorError;
use crate::render::report::{
    ReportLayout, RoundReport, SampleLog, render_report, render_system_info,
};
use crate::system::Category;
use crate::system::collector::SelfUsage;
use crate::system::info::SystemInfo;

/// The enabled workers and the readiness channel they share.
pub struct WorkerSet {
    memory: Option<WorkerHandle<MemoryResponse>>,
    cpu: Option<WorkerHandle<CpuResponse>>,
    sessions: Option<WorkerHandle<SessionsResponse>>,
    ready: mpsc::UnboundedReceiver<Readiness>,
    shut_down: bool,
}

/// Spawns workers one category at a time. Must be used inside a tokio
/// runtime.
pub struct WorkerSetBuilder {
    memory: Option<WorkerHandle<MemoryResponse>>,
    cpu: Option<WorkerHandle<CpuResponse>>,
    sessions: Option<WorkerHandle<SessionsResponse>>,
    ready_tx: mpsc::UnboundedSender<Readiness>,
    ready_rx: mpsc::UnboundedReceiver<Readiness>,
}

impl WorkerSetBuilder {
    pub fn memory(mut self, probe: impl Probe<Output = MemoryResponse>) -> Self {
        self.memory = Some(spawn_worker(probe, self.ready_tx.clone()));
        self
    }

    pub fn cpu(mut self, probe: impl Probe<Output = CpuResponse>) -> Self {
        self.cpu = Some(spawn_worker(probe, self.ready_tx.clone()));
        self
    }

    pub fn sessions(mut self, probe: impl Probe<Output = SessionsResponse>) -> Self {
        self.sessions = Some(spawn_worker(probe, self.ready_tx.clone()));
        self
    }

    /// Seals the readiness channel: once every worker is gone the receiver
    /// reports closed instead of waiting forever.
    pub fn build(self) -> WorkerSet {
        WorkerSet {
            memory: self.memory,
            cpu: self.cpu,
            sessions: self.sessions,
            ready: self.ready_rx,
            shut_down: false,
        }
    }
}

impl WorkerSet {
    pub fn builder() -> WorkerSetBuilder {
        let (ready_tx, ready_rx) = mpsc::unbounded_channel();
        WorkerSetBuilder {
            memory: None,
            cpu: None,
            sessions: None,
            ready_tx,
            ready_rx,
        }
    }

    fn awaiting(&self) -> usize {
        [
            self.memory.as_ref().is_some_and(WorkerHandle::is_awaiting),
            self.cpu.as_ref().is_some_and(WorkerHandle::is_awaiting),
            self.sessions.as_ref().is_some_and(WorkerHandle::is_awaiting),
        ]
        .into_iter()
        .filter(|&awaiting| awaiting)
        .count()
    }

    /// Sends `Round(round)` to every enabled worker.
    pub async fn dispatch(&mut self, round: RoundIndex) {
        debug!(%round, "dispatching round");
        if let Some(handle) = self.memory.as_mut() {
            handle.dispatch(round).await;
        }
        if let Some(handle) = self.cpu.as_mut() {
            handle.dispatch(round).await;
        }
        if let Some(handle) = self.sessions.as_mut() {
            handle.dispatch(round).await;
        }
    }

    /// Collects one response from every dispatched worker, in whatever order
    /// they become ready.
    pub async fn gather(&mut self, round: RoundIndex) -> Result<RoundReport, MonitorError> {
        let mut report = RoundReport::new(round);

        while self.awaiting() > 0 {
            let notice = self
                .ready
                .recv()
                .await
                .ok_or(MonitorError::ReadinessClosed(round))?;
            debug!(%round, ?notice, "readiness");

            match notice {
                Readiness::Ready(category) => self.collect(category, round, &mut report).await?,
                Readiness::Exited(category) => self.exited(category, round)?,
            }
        }

        Ok(report)
    }

    async fn collect(
        &mut self,
        category: Category,
        round: RoundIndex,
        report: &mut RoundReport,
    ) -> Result<(), MonitorError> {
        match category {
            Category::Memory => {
                if let Some(handle) = self.memory.as_mut()
                    && let Some(response) = handle.take_response(round).await?
                {
                    report.memory = Some(response);
                }
            }
            Category::Cpu => {
                if let Some(handle) = self.cpu.as_mut()
                    && let Some(response) = handle.take_response(round).await?
                {
                    report.cpu = Some(response);
                }
            }
            Category::Sessions => {
                if let Some(handle) = self.sessions.as_mut()
                    && let Some(response) = handle.take_response(round).await?
                {
                    report.sessions = Some(response);
                }
            }
        }
        Ok(())
    }

    fn exited(&mut self, category: Category, round: RoundIndex) -> Result<(), MonitorError> {
        match category {
            Category::Memory => self.memory.as_mut().map_or(Ok(()), |h| h.exited(round)),
            Category::Cpu => self.cpu.as_mut().map_or(Ok(()), |h| h.exited(round)),
            Category::Sessions => self.sessions.as_mut().map_or(Ok(()), |h| h.exited(round)),
        }
    }

    /// Terminates every worker and waits for their tasks. Safe to call more
    /// than once.
    pub async fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        let mut tasks = Vec::with_capacity(3);
        if let Some(handle) = self.memory.as_mut() {
            tasks.extend(handle.terminate().await);
        }
        if let Some(handle) = self.cpu.as_mut() {
            tasks.extend(handle.terminate().await);
        }
        if let Some(handle) = self.sessions.as_mut() {
            tasks.extend(handle.terminate().await);
        }

        for result in join_all(tasks).await {
            if let Err(error) = result {
                warn!(%error, "worker task ended abnormally");
            }
        }

        if let Some(handle) = self.memory.as_mut() {
            handle.mark_terminated();
        }
        if let Some(handle) = self.cpu.as_mut() {
            handle.mark_terminated();
        }
        if let Some(handle) = self.sessions.as_mut() {
            handle.mark_terminated();
        }
        debug!("all workers shut down");
    }
}

/// Fixed parameters of a run.
#[derive(Clone, Debug)]
pub struct RunPlan {
    pub samples: u32,
    pub delay: Duration,
    pub layout: ReportLayout,
    pub sequential: bool,
    pub system_info: Option<SystemInfo>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Every round was reported.
    Completed { rounds: u32 },
    /// A terminate request ended the run after `completed` rounds.
    Terminated { completed: u32 },
}

/// Drives the workers through the rounds of a run and prints each report.
pub struct Supervisor<W, I, U> {
    workers: WorkerSet,
    control: ControlQueue,
    plan: RunPlan,
    out: W,
    input: I,
    usage: U,
}

impl<W, I, U> Supervisor<W, I, U>
where
    W: Write,
    I: OperatorInput,
    U: SelfUsage,
{
    pub fn new(
        workers: WorkerSet,
        control: ControlQueue,
        plan: RunPlan,
        out: W,
        input: I,
        usage: U,
    ) -> Self {
        Self {
            workers,
            control,
            plan,
            out,
            input,
            usage,
        }
    }

    /// Runs every round, then shuts the workers down whatever the outcome.
    pub async fn run(&mut self) -> Result<Outcome, MonitorError> {
        let result = self.rounds().await;
        self.workers.shutdown().await;

        if let Ok(Outcome::Completed { .. }) = result
            && let Some(info) = &self.plan.system_info
        {
            self.out.write_all(render_system_info(info).as_bytes())?;
            self.out.flush()?;
        }
        result
    }

    pub fn into_output(self) -> W {
        self.out
    }

    async fn rounds(&mut self) -> Result<Outcome, MonitorError> {
        let samples = self.plan.samples;
        let mut log = SampleLog::new(samples);

        self.workers.dispatch(RoundIndex::WARM_UP).await;

        for n in 1..=samples {
            let waited = interruptible_wait(
                self.plan.delay,
                &mut self.control,
                &mut self.input,
                &mut self.out,
            )
            .await?;
            if waited == WaitOutcome::Terminate {
                info!(completed = n - 1, "terminated on request");
                return Ok(Outcome::Terminated { completed: n - 1 });
            }

            let round = RoundIndex::new(n);
            self.workers.dispatch(round).await;
            let report = self.workers.gather(round).await?;
            log.record(&report);

            let text = render_report(
                &report,
                &log,
                &self.plan.layout,
                self.usage.resident_kilobytes(),
            );
            if !self.plan.sequential {
                self.out
                    .queue(Clear(ClearType::All))?
                    .queue(MoveTo(0, 0))?;
            }
            self.out.write_all(text.as_bytes())?;
            self.out.flush()?;
            debug!(%round, "report printed");
        }

        Ok(Outcome::Completed { rounds: samples })
    }
}
