use crate::config::RunConfig;
use crate::controller::ControllerState;
use crate::error::{Error, Result};
use crate::estimate::Estimate;
use crate::worker::{run_worker, Handshake, Shared, WorkerReport};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::{self, JoinHandle};
use tracing::debug;

struct TokioHandshake {
    done: UnboundedSender<usize>,
    resume: UnboundedReceiver<()>,
}

impl Handshake for TokioHandshake {
    fn signal_done(&self, worker: usize) {
        let _ = self.done.send(worker);
    }

    fn wait_resume(&mut self) -> bool {
        // Workers live on the blocking pool, where blocking_recv is allowed.
        self.resume.blocking_recv().is_some()
    }
}

struct AsyncWorker {
    id: usize,
    join: JoinHandle<WorkerReport>,
    resume: UnboundedSender<()>,
}

impl AsyncWorker {
    fn resume(&self) {
        let _ = self.resume.send(());
    }
}

/// Same handshake as [`crate::controller::Controller`], with workers on
/// tokio's blocking pool and the controller awaiting the fan-in channel.
pub async fn estimate_pi_async(config: RunConfig) -> Result<Estimate> {
    config.validate()?;

    let mut state = ControllerState::Idle;
    let shared = Arc::new(Shared::new(config.layout(), config.workers));
    let (done_tx, mut done_rx) = unbounded_channel();

    let workers: Vec<AsyncWorker> = (0..config.workers)
        .map(|id| {
            let (resume_tx, resume_rx) = unbounded_channel();
            let handshake = TokioHandshake {
                done: done_tx.clone(),
                resume: resume_rx,
            };
            let shared = Arc::clone(&shared);
            let join = task::spawn_blocking(move || run_worker(id, id, &shared, handshake));

            AsyncWorker {
                id,
                join,
                resume: resume_tx,
            }
        })
        .collect();
    drop(done_tx);
    state.advance();

    let started = Instant::now();
    state.advance();
    for worker in &workers {
        worker.resume();
    }

    let mut dispatched = 0usize;
    while !shared.scheduler.is_exhausted() {
        match done_rx.recv().await {
            Some(id) => workers[id].resume(),
            None => break,
        }
        dispatched += 1;
    }
    debug!(
        dispatched,
        cursor = shared.scheduler.cursor(),
        "dispatch finished"
    );

    state.advance();
    for worker in &workers {
        worker.resume();
    }

    let mut reports = Vec::with_capacity(workers.len());
    let mut panicked = None;
    for AsyncWorker { id, join, .. } in workers {
        match join.await {
            Ok(report) => reports.push(report),
            Err(_) => {
                panicked.get_or_insert(id);
            }
        }
    }
    if let Some(worker) = panicked {
        return Err(Error::WorkerPanicked { worker });
    }

    let layout = shared.layout;
    let pi = shared.accumulator.load() / layout.iterations() as f64;
    state.advance();
    debug_assert_eq!(state, ControllerState::Done);

    Ok(Estimate {
        pi,
        iterations: layout.iterations(),
        total_blocks: layout.total_blocks(),
        workers: config.workers,
        elapsed: started.elapsed(),
        reports,
    })
}
