/// A contiguous half-open range `[start, end)` of iteration indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub index: usize,
    pub start: u64,
    pub end: u64,
}

impl Block {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// How an iteration space of `iterations` steps is cut into blocks of
/// `block_size`. The last block is clamped to the end of the space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLayout {
    iterations: u64,
    block_size: u64,
    total_blocks: usize,
}

impl BlockLayout {
    /// Both arguments must be non-zero; `RunConfig::validate` guarantees it.
    /// A block count that does not fit in `usize` saturates; `validate`
    /// rejects such configurations before a layout is built.
    pub fn new(iterations: u64, block_size: u64) -> Self {
        let total_blocks = block_count(iterations, block_size).unwrap_or(usize::MAX);
        BlockLayout {
            iterations,
            block_size,
            total_blocks,
        }
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    pub fn total_blocks(&self) -> usize {
        self.total_blocks
    }

    pub fn block(&self, index: usize) -> Option<Block> {
        if index >= self.total_blocks {
            return None;
        }

        let start = index as u64 * self.block_size;
        let end = start.saturating_add(self.block_size).min(self.iterations);

        Some(Block { index, start, end })
    }

    pub fn blocks(&self) -> impl Iterator<Item = Block> + '_ {
        (0..self.total_blocks).filter_map(move |index| self.block(index))
    }
}

/// `ceil(iterations / block_size)`, or `None` when it does not fit in `usize`.
pub fn block_count(iterations: u64, block_size: u64) -> Option<usize> {
    usize::try_from(iterations.div_ceil(block_size)).ok()
}
