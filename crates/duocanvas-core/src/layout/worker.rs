//! Background layout worker for large graphs.
//!
//! Jobs carry the sequence number issued by the state machine. The worker
//! never gets cancelled; the machine simply ignores results whose sequence
//! number is no longer the latest. Jobs that are still queued when a newer
//! one arrives are skipped, since their results would be discarded anyway.

use super::{LayoutJob, LayoutResult};
use std::sync::mpsc::{Receiver, RecvTimeoutError, SendError, Sender, TryRecvError, channel};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;

/// Worker errors.
#[derive(Debug, Error)]
pub enum LayoutWorkerError {
    #[error("Failed to spawn layout thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("Layout thread is no longer running")]
    Disconnected,
    #[error("Layout thread rejected job {}", .0.sequence)]
    Rejected(Box<LayoutJob>),
}

/// Commands sent to the layout thread.
enum WorkerCommand {
    Run(Box<LayoutJob>),
    Shutdown,
}

/// Owns the layout thread and both ends of its channels.
pub struct LayoutWorker {
    cmd_tx: Sender<WorkerCommand>,
    result_rx: Receiver<LayoutResult>,
    thread: Option<JoinHandle<()>>,
}

impl LayoutWorker {
    /// Start the layout thread.
    pub fn spawn() -> Result<Self, LayoutWorkerError> {
        let (cmd_tx, cmd_rx) = channel::<WorkerCommand>();
        let (result_tx, result_rx) = channel::<LayoutResult>();

        let handle = thread::Builder::new()
            .name("duocanvas-layout".to_string())
            .spawn(move || worker_loop(cmd_rx, result_tx))?;

        log::info!("Layout worker started");
        Ok(Self {
            cmd_tx,
            result_rx,
            thread: Some(handle),
        })
    }

    /// Queue a job. A rejected job is handed back inside the error.
    pub fn submit(&self, job: LayoutJob) -> Result<(), LayoutWorkerError> {
        self.cmd_tx
            .send(WorkerCommand::Run(Box::new(job)))
            .map_err(|SendError(command)| match command {
                WorkerCommand::Run(job) => LayoutWorkerError::Rejected(job),
                WorkerCommand::Shutdown => LayoutWorkerError::Disconnected,
            })
    }

    /// Drain finished results without blocking.
    ///
    /// Fails with [`LayoutWorkerError::Disconnected`] once the thread is gone
    /// and every result it produced has been taken.
    pub fn poll(&self) -> Result<Vec<LayoutResult>, LayoutWorkerError> {
        let mut results = Vec::new();
        loop {
            match self.result_rx.try_recv() {
                Ok(result) => results.push(result),
                Err(TryRecvError::Empty) => return Ok(results),
                Err(TryRecvError::Disconnected) if results.is_empty() => {
                    return Err(LayoutWorkerError::Disconnected);
                }
                Err(TryRecvError::Disconnected) => return Ok(results),
            }
        }
    }

    /// Wait up to `timeout` for the next finished result.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<LayoutResult>, LayoutWorkerError> {
        match self.result_rx.recv_timeout(timeout) {
            Ok(result) => Ok(Some(result)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(LayoutWorkerError::Disconnected),
        }
    }

    /// A worker whose thread has already exited.
    #[cfg(test)]
    pub(crate) fn disconnected() -> Self {
        let (cmd_tx, _) = channel::<WorkerCommand>();
        let (_, result_rx) = channel::<LayoutResult>();
        Self {
            cmd_tx,
            result_rx,
            thread: None,
        }
    }
}

impl Drop for LayoutWorker {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(WorkerCommand::Shutdown);
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                log::error!("Layout worker panicked");
            }
        }
    }
}

fn worker_loop(cmd_rx: Receiver<WorkerCommand>, result_tx: Sender<LayoutResult>) {
    while let Ok(command) = cmd_rx.recv() {
        let mut job = match command {
            WorkerCommand::Run(job) => job,
            WorkerCommand::Shutdown => break,
        };

        // Skip ahead to the newest queued job.
        let mut shutdown = false;
        loop {
            match cmd_rx.try_recv() {
                Ok(WorkerCommand::Run(newer)) => {
                    log::debug!("Skipping superseded layout job {}", job.sequence);
                    job = newer;
                }
                Ok(WorkerCommand::Shutdown) => {
                    shutdown = true;
                    break;
                }
                Err(_) => break,
            }
        }
        if shutdown {
            break;
        }

        log::debug!(
            "Computing layout {} ({} nodes, {} edges)",
            job.sequence,
            job.graph.nodes.len(),
            job.graph.edges.len()
        );
        if result_tx.send(job.run()).is_err() {
            break;
        }
    }
    log::info!("Layout worker exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{LayoutDirection, LayoutEdge, LayoutGraph, LayoutNode, LayoutOptions};

    fn chain_job(sequence: u64) -> LayoutJob {
        LayoutJob {
            sequence,
            graph: LayoutGraph::new(
                vec![LayoutNode::new("A"), LayoutNode::new("B")],
                vec![LayoutEdge::new("A", "B")],
            ),
            direction: LayoutDirection::TB,
            options: LayoutOptions::default(),
        }
    }

    #[test]
    fn test_worker_roundtrip() {
        let worker = LayoutWorker::spawn().unwrap();
        worker.submit(chain_job(7)).unwrap();

        let result = worker.recv_timeout(Duration::from_secs(5)).unwrap().unwrap();
        assert_eq!(result.sequence, 7);
        assert_eq!(result.positions.len(), 2);
        assert_eq!(result, chain_job(7).run());
    }

    #[test]
    fn test_latest_job_always_completes() {
        let worker = LayoutWorker::spawn().unwrap();
        for sequence in 1..=5 {
            worker.submit(chain_job(sequence)).unwrap();
        }

        let mut last = None;
        while let Ok(Some(result)) = worker.recv_timeout(Duration::from_secs(5)) {
            let done = result.sequence == 5;
            last = Some(result.sequence);
            if done {
                break;
            }
        }
        assert_eq!(last, Some(5));
    }

    #[test]
    fn test_poll_empty() {
        let worker = LayoutWorker::spawn().unwrap();
        assert!(worker.poll().unwrap().is_empty());
    }

    #[test]
    fn test_dead_worker_reports_disconnect() {
        let worker = LayoutWorker::disconnected();
        assert!(matches!(worker.poll(), Err(LayoutWorkerError::Disconnected)));
        assert!(matches!(
            worker.recv_timeout(Duration::from_millis(10)),
            Err(LayoutWorkerError::Disconnected)
        ));

        match worker.submit(chain_job(3)) {
            Err(LayoutWorkerError::Rejected(job)) => assert_eq!(job.sequence, 3),
            other => panic!("expected rejected job, got {:?}", other),
        }
    }
}
