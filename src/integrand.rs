/// Midpoint-rule sum of `4 / (1 + x^2)` over iterations `[start, end)` of
/// an `iterations`-step partition of `[0, 1]`. Not yet divided by the step
/// count.
pub fn block_sum(start: u64, end: u64, iterations: u64) -> f64 {
    let n = iterations as f64;
    let mut sum = 0.0;

    for i in start..end {
        let x = (i as f64 + 0.5) / n;
        sum += 4.0 / (1.0 + x * x);
    }

    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_range_sums_to_zero() {
        assert_eq!(block_sum(5, 5, 10), 0.0);
    }

    #[test]
    fn single_step_uses_midpoint() {
        // x = 0.5 -> 4 / 1.25
        assert!((block_sum(0, 1, 1) - 3.2).abs() < 1e-12);
    }

    #[test]
    fn split_ranges_add_up() {
        let whole = block_sum(0, 1000, 1000);
        let split = block_sum(0, 333, 1000) + block_sum(333, 1000, 1000);
        assert!((whole - split).abs() < 1e-9);
    }
}
