use crate::block::{block_count, BlockLayout};
use crate::error::{Error, Result};

pub const DEFAULT_ITERATIONS: u64 = 100_000_000;
pub const DEFAULT_BLOCK_SIZE: u64 = 8_307_040;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    pub iterations: u64,
    pub block_size: u64,
    pub workers: usize,
}

impl RunConfig {
    pub fn new(workers: usize) -> Self {
        RunConfig {
            iterations: DEFAULT_ITERATIONS,
            block_size: DEFAULT_BLOCK_SIZE,
            workers,
        }
    }

    pub fn with_iterations(mut self, iterations: u64) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_block_size(mut self, block_size: u64) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::invalid_config("worker count must be at least 1"));
        }
        if self.iterations == 0 {
            return Err(Error::invalid_config("iteration count must be at least 1"));
        }
        if self.block_size == 0 {
            return Err(Error::invalid_config("block size must be at least 1"));
        }
        if block_count(self.iterations, self.block_size).is_none() {
            let message = format!(
                "{} iterations in blocks of {} is more blocks than this platform can index",
                self.iterations, self.block_size
            );
            return Err(Error::invalid_config(message));
        }
        Ok(())
    }

    pub fn layout(&self) -> BlockLayout {
        BlockLayout::new(self.iterations, self.block_size)
    }
}

/// Parses a worker count typed by the user. Negative, zero and
/// non-numeric input are all configuration errors.
pub fn parse_worker_count(input: &str) -> Result<usize> {
    let trimmed = input.trim();
    let value: i64 = match trimmed.parse() {
        Ok(value) => value,
        Err(_) => {
            let message = format!("'{}' is not a worker count", trimmed);
            return Err(Error::invalid_config(message));
        }
    };

    if value <= 0 {
        let message = format!("worker count must be positive, got {}", value);
        return Err(Error::invalid_config(message));
    }

    usize::try_from(value).map_err(|_| {
        let message = format!("worker count {} is too large", value);
        Error::invalid_config(message)
    })
}
