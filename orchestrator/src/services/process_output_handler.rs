//! Helper to handle workload stdout/stderr output
//!
//! Output is always piped so the workload never blocks on a full pipe.
//! Background tasks drain both streams, forward each line at debug level, and
//! record the most recent I/O phase announced on stdout.

use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;

use crate::config::PhaseMarkers;
use crate::core::scenario::IoPhase;
use shared::{process_debug, ProcessId};

/// Phase progress of one workload, shared with its output consumer
#[derive(Debug, Default)]
pub struct PhaseTracker {
    current: Mutex<Option<IoPhase>>,
    lines: AtomicU64,
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one line of output
    pub fn observe(&self, line: &str, markers: &PhaseMarkers) {
        self.lines.fetch_add(1, Ordering::Relaxed);
        if let Some(phase) = markers.phase_of(line) {
            if let Ok(mut current) = self.current.lock() {
                *current = Some(phase);
            }
        }
    }

    /// Phase most recently announced, if any
    pub fn current(&self) -> Option<IoPhase> {
        self.current.lock().ok().and_then(|current| *current)
    }

    /// Whether the workload is currently in the given phase
    pub fn is_in(&self, phase: IoPhase) -> bool {
        self.current() == Some(phase)
    }

    pub fn lines_seen(&self) -> u64 {
        self.lines.load(Ordering::Relaxed)
    }
}

/// Configure stdio for a workload process
pub fn configure_child_stdio(cmd: &mut tokio::process::Command) {
    cmd.stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .stdin(Stdio::null());
}

/// Spawn tasks that drain the workload's output
pub fn spawn_output_consumers(
    mut child: Child,
    workload: ProcessId,
    markers: PhaseMarkers,
    tracker: Arc<PhaseTracker>,
) -> Child {
    if let Some(stdout) = child.stdout.take() {
        let workload = workload.clone();
        tokio::spawn(async move {
            consume_lines(stdout, |line| {
                process_debug!(workload, "{}", line);
                tracker.observe(line, &markers);
            })
            .await;
        });
    }

    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(async move {
            consume_lines(stderr, |line| {
                process_debug!(workload, "stderr: {}", line);
            })
            .await;
        });
    }

    child
}

async fn consume_lines<R, F>(stream: R, mut on_line: F)
where
    R: AsyncRead + Unpin,
    F: FnMut(&str),
{
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        on_line(&line);
    }
}
