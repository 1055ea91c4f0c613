//! Logarithmic crossfade from one control value to the next.
//!
//! A hardware reading only changes once per block, so every block is rendered
//! as a ramp from the value used by the previous block (`prev`) to the newest
//! reading (`value`):
//!
//! ```text
//! out[i] = value * w(i) + prev * (1 - w(i)),   w(i) = ln(i + 1) / ln(N)
//! ```
//!
//! `i` is the zero-based frame index inside a block of `N` frames, so the
//! first frame of a block is exactly `prev` and the last one exactly `value`.
//! Consecutive blocks therefore join without a step.
//!
//! The most common block size gets a precomputed table of `ln(i + 1)` so the
//! hot path does not evaluate a logarithm per sample.

/// Block size served by the lookup table.
pub const TABLE_SIZE: usize = 128;

/// Crossfade with an explicit `ln(N)`.
///
/// `ln_n` must be non-zero, i.e. `N >= 2`.
#[inline]
pub fn calculate(value: f32, prev: f32, i: usize, ln_n: f32) -> f32 {
    let w = ((i + 1) as f32).ln() / ln_n;
    value * w + prev * (1.0 - w)
}

/// Precomputed crossfade state for the active block size.
#[derive(Clone, Debug)]
pub struct LogCurve {
    /// `ln(i + 1)` for `i` in `0..TABLE_SIZE`
    table: [f32; TABLE_SIZE],
    /// `ln(TABLE_SIZE)`, the table's normalization constant
    table_norm: f32,
    block_size: usize,
    /// `ln(block_size)`
    block_log: f32,
}

impl Default for LogCurve {
    fn default() -> Self {
        Self::new(TABLE_SIZE)
    }
}

impl LogCurve {
    /// Build the table and the context for `block_size`.
    pub fn new(block_size: usize) -> Self {
        let mut table = [0.0; TABLE_SIZE];
        for (i, entry) in table.iter_mut().enumerate() {
            *entry = ((i + 1) as f32).ln();
        }

        Self {
            table,
            table_norm: (TABLE_SIZE as f32).ln(),
            block_size,
            block_log: (block_size as f32).ln(),
        }
    }

    /// Recompute the context after the host announced a new block size.
    pub fn set_block_size(&mut self, block_size: usize) {
        self.block_size = block_size;
        self.block_log = (block_size as f32).ln();
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Crossfade through the table. Only meaningful for blocks of
    /// [`TABLE_SIZE`] frames; `i` must be below it.
    #[inline]
    pub fn calculate_for_table(&self, value: f32, prev: f32, i: usize) -> f32 {
        let w = self.table[i] / self.table_norm;
        value * w + prev * (1.0 - w)
    }

    /// Fill `out` with the ramp from `prev` to `value`, scaled by `gain`.
    ///
    /// The block size is `out.len()`. Blocks shorter than two frames, and
    /// blocks where `value == prev`, hold `value` flat.
    pub fn render(&self, out: &mut [f32], value: f32, prev: f32, gain: f32) {
        let n = out.len();

        // nothing moved (the usual case for CV), or no room for a ramp
        if n < 2 || value == prev {
            out.iter_mut().for_each(|s| *s = value * gain);
            return;
        }

        if n == TABLE_SIZE {
            for (i, s) in out.iter_mut().enumerate() {
                *s = self.calculate_for_table(value, prev, i) * gain;
            }
            return;
        }

        // the host may hand us a block before announcing its size
        let ln_n = if n == self.block_size {
            self.block_log
        } else {
            (n as f32).ln()
        };

        for (i, s) in out.iter_mut().enumerate() {
            *s = calculate(value, prev, i, ln_n) * gain;
        }
    }
}
