//! Block-to-scalar reduction for the audio → hardware direction.

/// Collapses one audio block into one representative value.
///
/// The statistic is `(max + middle) / 2` over the sorted block: it sits
/// between the median and the peak, halves single-sample clicks, and follows
/// sustained level changes. Hardware calibrated against it expects exactly
/// this value, not a true median.
///
/// Sorting happens in scratch storage owned by the reducer, sized by
/// [`set_block_size`](Self::set_block_size) so the audio thread never
/// allocates.
#[derive(Clone, Debug, Default)]
pub struct Reducer {
    scratch: Vec<f32>,
}

impl Reducer {
    pub fn new(block_size: usize) -> Self {
        Self {
            scratch: Vec::with_capacity(block_size),
        }
    }

    /// Reallocate scratch storage for a new host block size.
    ///
    /// Not real-time safe; call it from the block-size notification.
    pub fn set_block_size(&mut self, block_size: usize) {
        self.scratch = Vec::with_capacity(block_size);
    }

    /// Reduce `block` to a single value. An empty block reduces to `0.0`.
    ///
    /// Positive NaN samples sort above every number, negative NaN below.
    pub fn reduce(&mut self, block: &[f32]) -> f32 {
        let n = block.len();
        if n == 0 {
            return 0.0;
        }

        self.scratch.clear();
        self.scratch.extend_from_slice(block);
        self.scratch.sort_unstable_by(f32::total_cmp);

        // halve first: the sum of two large samples overflows
        self.scratch[n - 1] * 0.5 + self.scratch[n / 2] * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascending_block_averages_max_and_middle() {
        let mut r = Reducer::new(8);
        assert_eq!(r.reduce(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]), 6.5);
    }

    #[test]
    fn order_does_not_matter() {
        let mut r = Reducer::new(8);
        assert_eq!(r.reduce(&[8.0, 3.0, 5.0, 1.0, 7.0, 2.0, 6.0, 4.0]), 6.5);
    }

    #[test]
    fn full_scale_samples_do_not_overflow() {
        let mut r = Reducer::new(4);
        assert_eq!(r.reduce(&[3.0e38, 3.0e38, -1.0, 3.0e38]), 3.0e38);
        assert_eq!(r.reduce(&[f32::MAX; 4]), f32::MAX);
        assert_eq!(r.reduce(&[f32::MIN; 4]), f32::MIN);
    }

    #[test]
    fn constant_block_reduces_to_the_constant() {
        let mut r = Reducer::new(128);
        assert_eq!(r.reduce(&[3.25; 128]), 3.25);
    }

    #[test]
    fn single_click_is_attenuated() {
        let mut r = Reducer::new(64);
        let mut block = [1.0f32; 64];
        block[17] = 10.0;
        // (10 + 1) / 2, far from the click
        assert_eq!(r.reduce(&block), 5.5);
    }

    #[test]
    fn odd_and_tiny_blocks() {
        let mut r = Reducer::default();
        assert_eq!(r.reduce(&[]), 0.0);
        assert_eq!(r.reduce(&[4.0]), 4.0);
        assert_eq!(r.reduce(&[1.0, 3.0]), 3.0);
        assert_eq!(r.reduce(&[1.0, 2.0, 9.0]), 5.5);
    }

    #[test]
    fn scratch_capacity_follows_block_size() {
        let mut r = Reducer::new(16);
        r.set_block_size(512);
        assert!(r.scratch.capacity() >= 512);
        assert_eq!(r.reduce(&vec![0.5; 512]), 0.5);
        assert!(r.scratch.capacity() >= 512);
    }
}
