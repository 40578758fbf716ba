use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::estimate::Estimate;
use crate::worker::{run_worker, Handshake, Shared, WorkerReport};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Lifecycle of a controller. Each state is only ever left for the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Initialized,
    Dispatching,
    Draining,
    Done,
}

impl ControllerState {
    pub fn next(self) -> Option<ControllerState> {
        match self {
            ControllerState::Idle => Some(ControllerState::Initialized),
            ControllerState::Initialized => Some(ControllerState::Dispatching),
            ControllerState::Dispatching => Some(ControllerState::Draining),
            ControllerState::Draining => Some(ControllerState::Done),
            ControllerState::Done => None,
        }
    }

    pub(crate) fn advance(&mut self) {
        if let Some(next) = self.next() {
            debug!(from = ?*self, to = ?next, "controller state");
            *self = next;
        }
    }
}

struct ChannelHandshake {
    done: Sender<usize>,
    resume: Receiver<()>,
}

impl Handshake for ChannelHandshake {
    fn signal_done(&self, worker: usize) {
        // The controller keeps the fan-in receiver until every worker is joined.
        let _ = self.done.send(worker);
    }

    fn wait_resume(&mut self) -> bool {
        self.resume.recv().is_ok()
    }
}

/// Controller-side handle of one worker thread.
pub struct WorkerHandle {
    id: usize,
    join: JoinHandle<WorkerReport>,
    resume: Sender<()>,
}

impl WorkerHandle {
    pub fn id(&self) -> usize {
        self.id
    }

    fn resume(&self) {
        // Fails only once the worker has exited, which is normal during drain.
        let _ = self.resume.send(());
    }
}

fn spawn_worker(id: usize, shared: &Arc<Shared>, done: &Sender<usize>) -> io::Result<WorkerHandle> {
    let (resume_tx, resume_rx) = unbounded();
    let handshake = ChannelHandshake {
        done: done.clone(),
        resume: resume_rx,
    };
    let shared = Arc::clone(shared);

    let join = thread::Builder::new()
        .name(format!("pi-worker-{}", id))
        .spawn(move || run_worker(id, id, &shared, handshake))?;

    Ok(WorkerHandle {
        id,
        join,
        resume: resume_tx,
    })
}

/// Lets dormant workers observe a closed resume channel, then joins them.
fn release(workers: Vec<WorkerHandle>) {
    for WorkerHandle { id, join, resume } in workers {
        drop(resume);
        if join.join().is_err() {
            warn!(worker = id, "worker panicked while being released");
        }
    }
}

/// Drives a pool of worker threads through the completion/resume handshake.
pub struct Controller {
    config: RunConfig,
    shared: Arc<Shared>,
    workers: Vec<WorkerHandle>,
    done: Receiver<usize>,
    state: ControllerState,
}

impl Controller {
    /// Spawns `config.workers` dormant workers, worker `i` pre-assigned
    /// block `i`. Nothing runs until [`Controller::run`].
    pub fn setup(config: RunConfig) -> Result<Self> {
        Self::setup_with(config, spawn_worker)
    }

    fn setup_with<F>(config: RunConfig, mut spawn: F) -> Result<Self>
    where
        F: FnMut(usize, &Arc<Shared>, &Sender<usize>) -> io::Result<WorkerHandle>,
    {
        config.validate()?;

        let mut state = ControllerState::Idle;
        let shared = Arc::new(Shared::new(config.layout(), config.workers));
        let (done_tx, done_rx) = unbounded();
        let mut workers = Vec::with_capacity(config.workers);

        for id in 0..config.workers {
            match spawn(id, &shared, &done_tx) {
                Ok(handle) => workers.push(handle),
                Err(source) => {
                    release(workers);
                    return Err(Error::ResourceCreation { worker: id, source });
                }
            }
        }

        if config.workers > shared.layout.total_blocks() {
            info!(
                workers = config.workers,
                blocks = shared.layout.total_blocks(),
                "more workers than blocks, extra workers will merge an empty sum"
            );
        }

        state.advance();
        Ok(Controller {
            config,
            shared,
            workers,
            done: done_rx,
            state,
        })
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn run(mut self) -> Result<Estimate> {
        let started = Instant::now();
        self.state.advance();

        for worker in &self.workers {
            worker.resume();
        }

        let mut dispatched = 0usize;
        while !self.shared.scheduler.is_exhausted() {
            let id = match self.done.recv() {
                Ok(id) => id,
                // Every worker has exited; joining below reports why.
                Err(_) => break,
            };
            self.workers[id].resume();
            dispatched += 1;
        }
        debug!(
            dispatched,
            cursor = self.shared.scheduler.cursor(),
            "dispatch finished"
        );

        self.state.advance();
        for worker in &self.workers {
            worker.resume();
        }

        let mut reports = Vec::with_capacity(self.workers.len());
        let mut panicked = None;
        for WorkerHandle { id, join, .. } in std::mem::take(&mut self.workers) {
            match join.join() {
                Ok(report) => reports.push(report),
                Err(_) => {
                    panicked.get_or_insert(id);
                }
            }
        }
        if let Some(worker) = panicked {
            return Err(Error::WorkerPanicked { worker });
        }

        let layout = self.shared.layout;
        let pi = self.shared.accumulator.load() / layout.iterations() as f64;
        self.state.advance();

        Ok(Estimate {
            pi,
            iterations: layout.iterations(),
            total_blocks: layout.total_blocks(),
            workers: self.config.workers,
            elapsed: started.elapsed(),
            reports,
        })
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        release(std::mem::take(&mut self.workers));
    }
}

/// Runs the threaded flavor end to end.
pub fn estimate_pi(config: RunConfig) -> Result<Estimate> {
    Controller::setup(config)?.run()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_config(workers: usize, iterations: u64, block_size: u64) -> RunConfig {
        RunConfig::new(workers)
            .with_iterations(iterations)
            .with_block_size(block_size)
    }

    #[test]
    fn states_advance_in_order() {
        let mut state = ControllerState::Idle;
        let mut seen = vec![state];
        while state.next().is_some() {
            state.advance();
            seen.push(state);
        }

        assert_eq!(
            seen,
            vec![
                ControllerState::Idle,
                ControllerState::Initialized,
                ControllerState::Dispatching,
                ControllerState::Draining,
                ControllerState::Done,
            ]
        );
        state.advance();
        assert_eq!(state, ControllerState::Done);
    }

    #[test]
    fn setup_leaves_workers_dormant() {
        let controller = Controller::setup(run_config(3, 30, 10)).unwrap();

        assert_eq!(controller.state(), ControllerState::Initialized);
        assert_eq!(controller.shared.scheduler.cursor(), 3);
        assert_eq!(controller.shared.accumulator.merges(), 0);
        let ids: Vec<_> = controller.workers.iter().map(WorkerHandle::id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn dropping_unrun_controller_releases_workers() {
        let controller = Controller::setup(run_config(4, 100, 10)).unwrap();
        let shared = Arc::clone(&controller.shared);

        drop(controller);

        assert_eq!(shared.accumulator.merges(), 0);
        assert_eq!(Arc::strong_count(&shared), 1);
    }

    #[test]
    fn spawn_failure_aborts_setup() {
        let config = run_config(4, 100, 10);
        let mut seen = None;

        let result = Controller::setup_with(config, |id, shared, done| {
            seen.get_or_insert_with(|| Arc::clone(shared));
            if id == 2 {
                Err(io::Error::new(io::ErrorKind::Other, "no more threads"))
            } else {
                spawn_worker(id, shared, done)
            }
        });

        match result {
            Err(Error::ResourceCreation { worker, .. }) => assert_eq!(worker, 2),
            other => panic!("expected ResourceCreation, got {:?}", other.map(|c| c.state())),
        }

        // the two spawned workers were released and joined without merging
        let shared = seen.unwrap();
        assert_eq!(shared.accumulator.merges(), 0);
        assert_eq!(Arc::strong_count(&shared), 1);
    }

    #[test]
    fn invalid_config_spawns_nothing() {
        let spawn = |_: usize, _: &Arc<Shared>, _: &Sender<usize>| -> io::Result<WorkerHandle> {
            panic!("no worker may be spawned for an invalid config")
        };
        let result = Controller::setup_with(RunConfig::new(0), spawn);
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn run_reports_every_worker() {
        let estimate = estimate_pi(run_config(3, 1_000, 64)).unwrap();

        assert_eq!(estimate.reports.len(), 3);
        assert!(estimate.reports.iter().all(|r| r.merged));
        assert_eq!(estimate.claimed_blocks(), (0..16).collect::<Vec<_>>());
    }
}
