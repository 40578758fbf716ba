use crate::worker::WorkerReport;
use std::fmt;
use std::time::Duration;

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct Estimate {
    pub pi: f64,
    pub iterations: u64,
    pub total_blocks: usize,
    pub workers: usize,
    pub elapsed: Duration,
    pub reports: Vec<WorkerReport>,
}

impl Estimate {
    pub fn error(&self) -> f64 {
        (self.pi - std::f64::consts::PI).abs()
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed.as_millis()
    }

    /// Every block index computed during the run, sorted. A correct run
    /// yields exactly `0..total_blocks`.
    pub fn claimed_blocks(&self) -> Vec<usize> {
        let mut blocks: Vec<usize> = self
            .reports
            .iter()
            .flat_map(|r| r.blocks.iter().copied())
            .collect();
        blocks.sort_unstable();
        blocks
    }

    pub fn computed_iterations(&self) -> u64 {
        self.reports.iter().map(|r| r.iterations).sum()
    }
}

/// Fractional digits needed to write any finite f64 exactly (2^-1074).
const EXACT_DIGITS: usize = 1074;

/// The exact decimal expansion of `value`, without trailing zeros.
pub fn exact_decimal(value: f64) -> String {
    let text = format!("{:.*}", EXACT_DIGITS, value);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Prints the full expansion of the f64 unless a precision is given.
impl fmt::Display for Estimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match f.precision() {
            Some(digits) => writeln!(f, "Pi = {:.*}", digits, self.pi)?,
            None => writeln!(f, "Pi = {}", exact_decimal(self.pi))?,
        }
        writeln!(
            f,
            "Not all decimal digits are shown due to system limitations"
        )?;
        write!(f, "Time elapsed: {} ms", self.elapsed_ms())
    }
}
