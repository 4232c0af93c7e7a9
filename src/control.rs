//! Out-of-band control of a run: terminate, resume, and operator interrupts.
//!
//! Requests are queued as they arrive (from OS signals or a [`ControlHandle`])
//! and are only looked at inside [`interruptible_wait`], between rounds. A
//! request that shows up while a report is being gathered or printed simply
//! waits in the queue.

use std::collections::VecDeque;
use std::future::Future;
use std::io::{self, Write};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader, Stdin};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, trace, warn};

use crate::error::ControlProtocolError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlRequest {
    /// Stop now: skip the rest of the wait and every remaining round.
    Terminate,
    /// Keep waiting out whatever is left of the delay.
    Resume,
    /// The operator wants to stop; ask before acting on it.
    OperatorInterrupt,
    /// A signal with no defined meaning.
    Unrecognized(i32),
}

impl ControlRequest {
    #[cfg(unix)]
    pub fn from_signal(signal: i32) -> Self {
        match signal {
            libc::SIGINT => ControlRequest::OperatorInterrupt,
            libc::SIGTERM | libc::SIGHUP | libc::SIGQUIT => ControlRequest::Terminate,
            libc::SIGCONT | libc::SIGUSR1 => ControlRequest::Resume,
            other => ControlRequest::Unrecognized(other),
        }
    }
}

/// Sending half of the control queue. Cheap to clone.
#[derive(Clone, Debug)]
pub struct ControlHandle {
    tx: mpsc::UnboundedSender<ControlRequest>,
}

impl ControlHandle {
    /// Queues a request. Returns `false` once the run is over.
    pub fn send(&self, request: ControlRequest) -> bool {
        self.tx.send(request).is_ok()
    }

    pub fn terminate(&self) -> bool {
        self.send(ControlRequest::Terminate)
    }

    pub fn resume(&self) -> bool {
        self.send(ControlRequest::Resume)
    }

    pub fn interrupt(&self) -> bool {
        self.send(ControlRequest::OperatorInterrupt)
    }
}

/// Receiving half of the control queue, owned by the supervisor.
#[derive(Debug)]
pub struct ControlQueue {
    rx: mpsc::UnboundedReceiver<ControlRequest>,
}

pub fn control_channel() -> (ControlHandle, ControlQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ControlHandle { tx }, ControlQueue { rx })
}

/// Where the operator's answer to the quit prompt comes from.
pub trait OperatorInput {
    /// Reads one line. `Ok(None)` means the input is closed.
    fn read_line(&mut self) -> impl Future<Output = io::Result<Option<String>>> + Send;
}

pub struct StdinInput {
    reader: BufReader<Stdin>,
}

impl Default for StdinInput {
    fn default() -> Self {
        Self {
            reader: BufReader::new(tokio::io::stdin()),
        }
    }
}

impl OperatorInput for StdinInput {
    async fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        match self.reader.read_line(&mut line).await? {
            0 => Ok(None),
            _ => Ok(Some(line)),
        }
    }
}

/// Canned operator answers.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    lines: VecDeque<String>,
}

impl ScriptedInput {
    pub fn new<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> Self {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl OperatorInput for ScriptedInput {
    async fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitState {
    Sleeping,
    InterruptPending,
    Resumed,
    TerminateRequested,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The delay ran out (or was cut short by an unrecognized request).
    Elapsed,
    /// A terminate request arrived, directly or by operator confirmation.
    Terminate,
}

pub const QUIT_PROMPT: &str = "\nDo you want to quit? (y/n): ";
pub const QUIT_REPROMPT: &str = "Please answer y or n.";

/// Sleeps for `delay` while serving control requests.
///
/// The deadline is fixed on entry, so resuming after an interruption only
/// waits out the remainder and the total never drops below `delay`. Time
/// spent at the quit prompt does not count towards the delay.
pub async fn interruptible_wait<I, W>(
    delay: Duration,
    queue: &mut ControlQueue,
    input: &mut I,
    out: &mut W,
) -> io::Result<WaitOutcome>
where
    I: OperatorInput,
    W: Write,
{
    let mut deadline = Instant::now() + delay;
    let mut state = WaitState::Sleeping;

    loop {
        trace!(?state, "waiting between rounds");
        let request = tokio::select! {
            _ = sleep_until(deadline) => return Ok(WaitOutcome::Elapsed),
            request = queue.rx.recv() => request,
        };
        let Some(request) = request else {
            // every handle is gone; nothing can interrupt any more.
            sleep_until(deadline).await;
            return Ok(WaitOutcome::Elapsed);
        };

        state = WaitState::InterruptPending;
        debug!(?request, ?state, "control request received");

        let request = match request {
            ControlRequest::OperatorInterrupt => {
                let prompted = Instant::now();
                let quit = confirm_quit(input, out).await?;
                deadline += prompted.elapsed();
                if quit {
                    ControlRequest::Terminate
                } else {
                    ControlRequest::Resume
                }
            }
            other => other,
        };

        match request {
            ControlRequest::Terminate => {
                state = WaitState::TerminateRequested;
                debug!(?state, "terminating");
                return Ok(WaitOutcome::Terminate);
            }
            ControlRequest::Unrecognized(signal) => {
                let error = ControlProtocolError::UnrecognizedSignal(signal);
                warn!(%error, "ending the wait early");
                return Ok(WaitOutcome::Elapsed);
            }
            ControlRequest::Resume | ControlRequest::OperatorInterrupt => {
                state = WaitState::Resumed;
                let remaining = deadline.saturating_duration_since(Instant::now());
                debug!(?state, ?remaining, "resuming wait");
            }
        }
    }
}

/// Asks whether to quit until the answer is yes or no. Closed input counts
/// as yes.
async fn confirm_quit<I, W>(input: &mut I, out: &mut W) -> io::Result<bool>
where
    I: OperatorInput,
    W: Write,
{
    loop {
        out.write_all(QUIT_PROMPT.as_bytes())?;
        out.flush()?;
        let Some(line) = input.read_line().await? else {
            return Ok(true);
        };
        match line.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => writeln!(out, "{QUIT_REPROMPT}")?,
        }
    }
}

/// Background tasks forwarding OS signals into the control queue. Dropping
/// the listener stops forwarding.
pub struct SignalListener {
    tasks: Vec<JoinHandle<()>>,
}

impl Drop for SignalListener {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

#[cfg(unix)]
pub fn listen_for_signals(handle: ControlHandle) -> io::Result<SignalListener> {
    use tokio::signal::unix::{SignalKind, signal};

    const FORWARDED: [i32; 7] = [
        libc::SIGINT,
        libc::SIGTERM,
        libc::SIGHUP,
        libc::SIGQUIT,
        libc::SIGCONT,
        libc::SIGUSR1,
        libc::SIGUSR2,
    ];

    let mut tasks = Vec::with_capacity(FORWARDED.len() + 1);
    for raw in FORWARDED {
        let mut stream = signal(SignalKind::from_raw(raw))?;
        let handle = handle.clone();
        tasks.push(tokio::spawn(async move {
            while stream.recv().await.is_some() {
                if !handle.send(ControlRequest::from_signal(raw)) {
                    break;
                }
            }
        }));
    }

    // Swallow terminal stop requests so Ctrl-Z cannot freeze a run mid-round.
    let mut suspend = signal(SignalKind::from_raw(libc::SIGTSTP))?;
    tasks.push(tokio::spawn(async move {
        while suspend.recv().await.is_some() {
            debug!("ignoring terminal stop request");
        }
    }));

    Ok(SignalListener { tasks })
}

#[cfg(not(unix))]
pub fn listen_for_signals(handle: ControlHandle) -> io::Result<SignalListener> {
    let task = tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if !handle.interrupt() {
                break;
            }
        }
    });
    Ok(SignalListener { tasks: vec![task] })
}
