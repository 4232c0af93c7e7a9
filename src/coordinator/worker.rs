use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::coordinator::message::{Readiness, Request, Response, RoundIndex};
use crate::coordinator::probe::Probe;
use crate::error::MonitorError;
use crate::system::Category;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    AwaitingResponse,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Liveness {
    Running,
    Terminating,
    Terminated,
}

/// Reports the worker's end on the readiness channel, however the task
/// finishes.
struct ExitGuard {
    category: Category,
    ready: mpsc::UnboundedSender<Readiness>,
}

impl Drop for ExitGuard {
    fn drop(&mut self) {
        let _ = self.ready.send(Readiness::Exited(self.category));
    }
}

/// Supervisor-side view of one worker task.
#[derive(Debug)]
pub struct WorkerHandle<T> {
    category: Category,
    requests: mpsc::Sender<Request>,
    responses: mpsc::Receiver<Response<T>>,
    phase: Phase,
    liveness: Liveness,
    task: Option<JoinHandle<()>>,
}

/// Spawns the worker task for one sampler on the current runtime.
pub fn spawn_worker<P: Probe>(
    probe: P,
    ready: mpsc::UnboundedSender<Readiness>,
) -> WorkerHandle<P::Output> {
    let category = probe.category();
    let (request_tx, request_rx) = mpsc::channel(1);
    let (response_tx, response_rx) = mpsc::channel(1);
    let task = tokio::spawn(run_worker(probe, request_rx, response_tx, ready));

    WorkerHandle {
        category,
        requests: request_tx,
        responses: response_rx,
        phase: Phase::Idle,
        liveness: Liveness::Running,
        task: Some(task),
    }
}

async fn run_worker<P: Probe>(
    mut probe: P,
    mut requests: mpsc::Receiver<Request>,
    responses: mpsc::Sender<Response<P::Output>>,
    ready: mpsc::UnboundedSender<Readiness>,
) {
    let category = probe.category();
    let _guard = ExitGuard {
        category,
        ready: ready.clone(),
    };
    debug!(%category, "worker started");

    while let Some(request) = requests.recv().await {
        let round = match request {
            Request::Round(round) => round,
            Request::Terminate => break,
        };

        let response = match probe.observe(round) {
            Ok(None) => continue,
            Ok(Some(output)) => Ok(output),
            Err(error) => {
                warn!(%category, %round, %error, "source failed");
                Err(error)
            }
        };
        let failed = response.is_err();

        if responses.send(response).await.is_err() || ready.send(Readiness::Ready(category)).is_err() {
            break;
        }
        if failed {
            break;
        }
        debug!(%category, %round, "response sent");
    }

    debug!(%category, "worker exiting");
}

impl<T> WorkerHandle<T> {
    pub fn category(&self) -> Category {
        self.category
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn liveness(&self) -> Liveness {
        self.liveness
    }

    pub fn is_awaiting(&self) -> bool {
        self.phase == Phase::AwaitingResponse
    }

    /// Sends `Round(round)`. A failed send is logged only: the worker has
    /// already exited, and its queued failure or exit notice will surface
    /// while gathering.
    pub async fn dispatch(&mut self, round: RoundIndex) {
        if let Err(error) = self.requests.send(Request::Round(round)).await {
            warn!(category = %self.category, %round, %error, "worker is gone");
        }
        if !round.is_warm_up() {
            self.phase = Phase::AwaitingResponse;
        }
    }

    /// Reads the response announced by a `Ready` notice.
    ///
    /// Returns `Ok(None)` for a notice nobody asked for.
    pub async fn take_response(&mut self, round: RoundIndex) -> Result<Option<T>, MonitorError> {
        if self.phase != Phase::AwaitingResponse {
            warn!(category = %self.category, %round, "unexpected readiness notice");
            return Ok(None);
        }
        self.phase = Phase::Idle;
        match self.responses.recv().await {
            Some(Ok(output)) => Ok(Some(output)),
            Some(Err(error)) => Err(error.into()),
            None => Err(MonitorError::WorkerLost {
                category: self.category,
                round,
            }),
        }
    }

    /// Handles an `Exited` notice. Fatal when a response was still owed.
    pub fn exited(&mut self, round: RoundIndex) -> Result<(), MonitorError> {
        self.liveness = Liveness::Terminated;
        if self.phase != Phase::AwaitingResponse {
            return Ok(());
        }
        self.phase = Phase::Idle;
        match self.responses.try_recv() {
            Ok(Err(error)) => Err(error.into()),
            _ => Err(MonitorError::WorkerLost {
                category: self.category,
                round,
            }),
        }
    }

    /// Asks the worker to stop and hands back its task for joining.
    pub async fn terminate(&mut self) -> Option<JoinHandle<()>> {
        if self.liveness == Liveness::Running {
            self.liveness = Liveness::Terminating;
            // an already-closed channel means the task is finished.
            let _ = self.requests.send(Request::Terminate).await;
        }
        self.phase = Phase::Idle;
        self.task.take()
    }

    pub fn mark_terminated(&mut self) {
        self.liveness = Liveness::Terminated;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::message::MemoryResponse;
    use crate::coordinator::probe::MemoryProbe;
    use crate::system::memory::MemorySample;
    use crate::system::source::ScriptedSource;

    struct Panicking;

    impl Probe for Panicking {
        type Output = MemoryResponse;

        fn category(&self) -> Category {
            Category::Memory
        }

        fn observe(&mut self, _: RoundIndex) -> Result<Option<MemoryResponse>, crate::error::SourceUnavailable> {
            panic!("sampler blew up");
        }
    }

    fn memory_source(rounds: usize) -> ScriptedSource<MemorySample> {
        ScriptedSource::new(Category::Memory)
            .repeat(MemorySample::from_counters(1 << 30, 4 << 30, 0, 0), rounds)
    }

    #[tokio::test]
    async fn warm_up_sends_nothing_then_rounds_answer() {
        let (ready_tx, mut ready_rx) = mpsc::unbounded_channel();
        let mut handle = spawn_worker(MemoryProbe::new(memory_source(2), false), ready_tx);

        handle.dispatch(RoundIndex::WARM_UP).await;
        assert!(!handle.is_awaiting());
        handle.dispatch(RoundIndex::new(1)).await;
        assert!(handle.is_awaiting());

        assert_eq!(ready_rx.recv().await, Some(Readiness::Ready(Category::Memory)));
        let response = handle.take_response(RoundIndex::new(1)).await.unwrap();
        assert!(response.is_some());
        assert_eq!(handle.phase(), Phase::Idle);

        let task = handle.terminate().await.unwrap();
        task.await.unwrap();
        assert_eq!(ready_rx.recv().await, Some(Readiness::Exited(Category::Memory)));
    }

    #[tokio::test]
    async fn failure_is_answered_then_worker_exits() {
        let (ready_tx, mut ready_rx) = mpsc::unbounded_channel();
        let source = memory_source(1).then_fail("meminfo unreadable");
        let mut handle = spawn_worker(MemoryProbe::new(source, false), ready_tx);

        handle.dispatch(RoundIndex::WARM_UP).await;
        handle.dispatch(RoundIndex::new(1)).await;
        assert_eq!(ready_rx.recv().await, Some(Readiness::Ready(Category::Memory)));
        let err = handle.take_response(RoundIndex::new(1)).await.unwrap_err();
        assert!(matches!(err, MonitorError::Source(e) if e.reason == "meminfo unreadable"));
        assert_eq!(ready_rx.recv().await, Some(Readiness::Exited(Category::Memory)));
    }

    #[tokio::test]
    async fn panicking_worker_still_reports_exit() {
        let (ready_tx, mut ready_rx) = mpsc::unbounded_channel();
        let mut handle = spawn_worker(Panicking, ready_tx);

        handle.dispatch(RoundIndex::new(1)).await;
        assert_eq!(ready_rx.recv().await, Some(Readiness::Exited(Category::Memory)));
        let err = handle.exited(RoundIndex::new(1)).unwrap_err();
        assert!(matches!(
            err,
            MonitorError::WorkerLost {
                category: Category::Memory,
                ..
            }
        ));
        assert_eq!(handle.liveness(), Liveness::Terminated);
    }
}
