use crate::accumulator::GlobalAccumulator;
use crate::block::BlockLayout;
use crate::integrand::block_sum;
use crate::scheduler::BlockScheduler;
use tracing::{debug, trace};

/// State every worker of one run shares with the controller.
#[derive(Debug)]
pub struct Shared {
    pub layout: BlockLayout,
    pub scheduler: BlockScheduler,
    pub accumulator: GlobalAccumulator,
}

impl Shared {
    pub fn new(layout: BlockLayout, workers: usize) -> Self {
        Shared {
            layout,
            scheduler: BlockScheduler::new(layout.total_blocks(), workers),
            accumulator: GlobalAccumulator::new(),
        }
    }
}

/// A worker's side of the completion/resume rendezvous with the controller.
pub trait Handshake {
    /// Raise this worker's completion signal.
    fn signal_done(&self, worker: usize);

    /// Block until the controller resumes this worker. Returns `false`
    /// when the controller has gone away and the worker must stop.
    fn wait_resume(&mut self) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkerReport {
    pub id: usize,
    pub blocks: Vec<usize>,
    pub iterations: u64,
    pub partial: f64,
    pub merged: bool,
}

impl WorkerReport {
    fn new(id: usize) -> Self {
        WorkerReport {
            id,
            blocks: Vec::new(),
            iterations: 0,
            partial: 0.0,
            merged: false,
        }
    }
}

/// Worker body. Starts dormant, computes `first_block` once activated,
/// then keeps claiming blocks from the scheduler until it draws an index
/// past the end. The private sum is merged into the shared total exactly
/// once, on the way out.
pub fn run_worker<H: Handshake>(
    id: usize,
    first_block: usize,
    shared: &Shared,
    mut handshake: H,
) -> WorkerReport {
    let mut report = WorkerReport::new(id);

    if !handshake.wait_resume() {
        debug!(worker = id, "released before activation");
        return report;
    }

    let iterations = shared.layout.iterations();
    let mut current = first_block;

    while shared.scheduler.has_remaining(current) {
        if let Some(block) = shared.layout.block(current) {
            report.partial += block_sum(block.start, block.end, iterations);
            report.iterations += block.len();
            report.blocks.push(block.index);
            trace!(
                worker = id,
                block = block.index,
                start = block.start,
                end = block.end,
                "block done"
            );
        }

        handshake.signal_done(id);

        if !shared.scheduler.is_exhausted() && !handshake.wait_resume() {
            debug!(worker = id, "controller gone, abandoning partial sum");
            return report;
        }

        current = shared.scheduler.claim_next();
    }

    shared.accumulator.add(report.partial);
    report.merged = true;
    debug!(worker = id, blocks = report.blocks.len(), "merged partial sum");

    report
}
