//! Real workload controller
//!
//! Spawns the IOR command line with tokio, follows its output for phase
//! announcements, and stops it with SIGTERM, escalating to SIGKILL when the
//! grace period runs out.

use async_trait::async_trait;
use std::collections::HashMap;
use std::process::ExitStatus;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;

use super::process_output_handler::{configure_child_stdio, spawn_output_consumers, PhaseTracker};
use crate::config::{IorConfig, PoolTarget};
use crate::core::scenario::IoPhase;
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::traits::{ExitKind, WorkloadController, WorkloadHandle};
use shared::{process_debug, process_info, process_warn, ProcessId};

/// Default time allowed for each stop stage
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(10);

/// Workload controller backed by real OS processes
pub struct RealWorkloadController {
    ior: IorConfig,
    grace_period: Duration,
    workloads: Mutex<HashMap<u64, Arc<Mutex<ManagedWorkload>>>>,
    /// Exits of workloads whose process has been released
    finished: Mutex<HashMap<u64, ExitKind>>,
    next_id: AtomicU64,
}

enum Tracked {
    Live(Arc<Mutex<ManagedWorkload>>),
    Finished(ExitKind),
}

/// A spawned workload and what is known about it
struct ManagedWorkload {
    child: Child,
    pid: u32,
    tracker: Arc<PhaseTracker>,
    exit: Option<ExitKind>,
}

impl ManagedWorkload {
    /// Record a natural exit if the process has finished
    fn poll_exit(&mut self) -> Option<ExitKind> {
        if self.exit.is_none() {
            if let Ok(Some(status)) = self.child.try_wait() {
                self.exit = Some(natural_exit(status));
            }
        }
        self.exit
    }
}

impl RealWorkloadController {
    pub fn new(ior: IorConfig) -> Self {
        Self {
            ior,
            grace_period: DEFAULT_GRACE_PERIOD,
            workloads: Mutex::new(HashMap::new()),
            finished: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Set the time allowed after SIGTERM, and again after SIGKILL
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Live workload for a handle, or the recorded exit of a released one
    async fn lookup(&self, handle: &WorkloadHandle) -> OrchestratorResult<Tracked> {
        if let Some(managed) = self.workloads.lock().await.get(&handle.id) {
            return Ok(Tracked::Live(managed.clone()));
        }
        self.finished
            .lock()
            .await
            .get(&handle.id)
            .map(|exit| Tracked::Finished(*exit))
            .ok_or_else(|| OrchestratorError::InvalidArguments {
                message: format!("unknown workload handle {}", handle.id),
            })
    }

    /// Drop the process and its output state once its exit is known
    async fn release(&self, id: u64, exit: ExitKind) {
        self.finished.lock().await.insert(id, exit);
        self.workloads.lock().await.remove(&id);
    }

    async fn live_count(&self) -> usize {
        self.workloads.lock().await.len()
    }

    /// Wait for the child for at most one grace period
    async fn wait_within_grace(&self, workload: &mut ManagedWorkload) -> OrchestratorResult<Option<ExitStatus>> {
        match tokio::time::timeout(self.grace_period, workload.child.wait()).await {
            Ok(Ok(status)) => Ok(Some(status)),
            Ok(Err(source)) => Err(OrchestratorError::Process {
                pid: workload.pid,
                source,
            }),
            Err(_) => Ok(None),
        }
    }
}

#[async_trait]
impl WorkloadController for RealWorkloadController {
    async fn start(&self, target: &PoolTarget) -> OrchestratorResult<WorkloadHandle> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let program = self.ior.program().to_string();
        let args = self.ior.to_args(target);

        let mut cmd = Command::new(&program);
        cmd.args(&args).kill_on_drop(true);
        configure_child_stdio(&mut cmd);

        process_debug!(ProcessId::current(), "🚀 Spawning {} {}", program, args.join(" "));
        let child = cmd
            .spawn()
            .map_err(|source| OrchestratorError::Launch {
                program: program.clone(),
                source,
            })?;
        let pid = child.id().unwrap_or_default();

        let tracker = Arc::new(PhaseTracker::new());
        let child = spawn_output_consumers(
            child,
            ProcessId::Workload(id),
            self.ior.markers.clone(),
            tracker.clone(),
        );

        self.workloads.lock().await.insert(
            id,
            Arc::new(Mutex::new(ManagedWorkload {
                child,
                pid,
                tracker,
                exit: None,
            })),
        );

        process_info!(ProcessId::current(), "✅ Workload {} started against {} (PID {})", id, target, pid);
        process_debug!(ProcessId::current(), "{} workload(s) live", self.live_count().await);
        Ok(WorkloadHandle { id, pid })
    }

    async fn is_running(&self, handle: &WorkloadHandle, phase_hint: Option<IoPhase>) -> bool {
        let Ok(Tracked::Live(managed)) = self.lookup(handle).await else {
            return false;
        };
        let mut workload = managed.lock().await;

        if let Some(exit) = workload.poll_exit() {
            drop(workload);
            self.release(handle.id, exit).await;
            return false;
        }

        match phase_hint {
            None => true,
            Some(phase) => workload.tracker.is_in(phase),
        }
    }

    async fn stop(&self, handle: &WorkloadHandle) -> OrchestratorResult<ExitKind> {
        let managed = match self.lookup(handle).await? {
            Tracked::Live(managed) => managed,
            Tracked::Finished(exit) => return Ok(exit),
        };
        let mut workload = managed.lock().await;

        if let Some(exit) = workload.poll_exit() {
            process_debug!(ProcessId::current(), "Workload {} already finished ({})", handle.id, exit);
            drop(workload);
            self.release(handle.id, exit).await;
            return Ok(exit);
        }

        process_debug!(ProcessId::current(), "📤 Sending SIGTERM to workload {} (PID {})", handle.id, workload.pid);
        send_terminate(&mut workload).map_err(|source| OrchestratorError::Process {
            pid: handle.pid,
            source,
        })?;

        if self.wait_within_grace(&mut workload).await?.is_some() {
            workload.exit = Some(ExitKind::Terminated);
            drop(workload);
            self.release(handle.id, ExitKind::Terminated).await;
            process_info!(ProcessId::current(), "🛑 Workload {} terminated", handle.id);
            return Ok(ExitKind::Terminated);
        }

        process_warn!(
            ProcessId::current(),
            "🔨 Workload {} ignored SIGTERM for {:?}, using SIGKILL",
            handle.id,
            self.grace_period
        );
        workload.child.start_kill().map_err(|source| OrchestratorError::Process {
            pid: handle.pid,
            source,
        })?;

        if self.wait_within_grace(&mut workload).await?.is_some() {
            workload.exit = Some(ExitKind::Killed);
            drop(workload);
            self.release(handle.id, ExitKind::Killed).await;
            process_info!(ProcessId::current(), "🔨 Workload {} force killed", handle.id);
            return Ok(ExitKind::Killed);
        }

        Err(OrchestratorError::WorkloadHung {
            pid: handle.pid,
            grace: self.grace_period,
        })
    }

    async fn wait(&self, handle: &WorkloadHandle) -> OrchestratorResult<ExitKind> {
        let managed = match self.lookup(handle).await? {
            Tracked::Live(managed) => managed,
            Tracked::Finished(exit) => return Ok(exit),
        };
        let mut workload = managed.lock().await;

        let exit = match workload.exit {
            Some(exit) => exit,
            None => {
                let status = workload.child.wait().await.map_err(|source| OrchestratorError::Process {
                    pid: handle.pid,
                    source,
                })?;
                natural_exit(status)
            }
        };
        workload.exit = Some(exit);
        drop(workload);
        self.release(handle.id, exit).await;

        process_info!(ProcessId::current(), "🏁 Workload {} completed ({})", handle.id, exit);
        Ok(exit)
    }
}

fn natural_exit(status: ExitStatus) -> ExitKind {
    ExitKind::Exited(status.code())
}

#[cfg(unix)]
fn send_terminate(workload: &mut ManagedWorkload) -> std::io::Result<()> {
    use nix::errno::Errno;
    use nix::sys::signal::{self, Signal};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(workload.pid) else {
        return workload.child.start_kill();
    };
    match signal::kill(Pid::from_raw(raw), Signal::SIGTERM) {
        // Already gone; the following wait reaps it
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(e) => Err(std::io::Error::from(e)),
    }
}

#[cfg(not(unix))]
fn send_terminate(workload: &mut ManagedWorkload) -> std::io::Result<()> {
    workload.child.start_kill()
}
