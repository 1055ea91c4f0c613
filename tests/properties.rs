use proptest::prelude::*;

use cvbridge::curve::LogCurve;
use cvbridge::reduce::Reducer;
use cvbridge::{PedalMode, Quantizer};

/// Ordinary CV levels mixed with samples near the ends of the f32 range.
fn sample() -> impl Strategy<Value = f32> {
    prop_oneof![
        -10.0f32..10.0,
        f32::MAX / 2.0..f32::MAX,
        -f32::MAX..-f32::MAX / 2.0,
    ]
}

proptest! {
    #[test]
    fn reduced_value_stays_within_the_block(
        block in prop::collection::vec(sample(), 1..2048),
    ) {
        let mut reducer = Reducer::new(block.len());
        let value = reducer.reduce(&block);

        let min = block.iter().copied().fold(f32::INFINITY, f32::min);
        let max = block.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        prop_assert!(value.is_finite());
        prop_assert!(value >= min && value <= max, "{} outside [{}, {}]", value, min, max);
    }

    #[test]
    fn reduction_ignores_sample_order(
        block in prop::collection::vec(0.0f32..10.0f32, 1..512),
    ) {
        let mut reducer = Reducer::default();
        let forward = reducer.reduce(&block);

        let reversed: Vec<f32> = block.iter().rev().copied().collect();
        prop_assert_eq!(forward, reducer.reduce(&reversed));
    }

    #[test]
    fn constant_blocks_reduce_to_the_constant(c in sample(), n in 1usize..1024) {
        let mut reducer = Reducer::new(n);
        prop_assert_eq!(reducer.reduce(&vec![c; n]), c);
    }

    #[test]
    fn quantizer_never_leaves_the_register_range(
        value in prop::num::f32::ANY,
        raw_max in 1u32..65536,
        v_max in 0.1f32..100.0,
    ) {
        let q = Quantizer::new(raw_max, v_max);
        prop_assert!(q.quantize(value) <= raw_max);
    }

    #[test]
    fn quantizer_is_monotonic(a in -1.0f32..11.0, b in -1.0f32..11.0) {
        let q = Quantizer::default();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(q.quantize(lo) <= q.quantize(hi));
    }

    #[test]
    fn quantization_error_is_half_a_step(v in 0.0f32..10.0) {
        let q = Quantizer::default();
        let back = q.dequantize(q.quantize(v) as i64);
        prop_assert!((back - v).abs() <= q.step() / 2.0 + 1e-4, "{} -> {}", v, back);
    }

    #[test]
    fn ramps_stay_between_endpoints(
        value in 0.0f32..10.0,
        prev in 0.0f32..10.0,
        n in 2usize..1024,
    ) {
        let curve = LogCurve::new(n);
        let mut out = vec![0.0; n];
        curve.render(&mut out, value, prev, 1.0);

        let (lo, hi) = if value <= prev { (value, prev) } else { (prev, value) };
        for &s in &out {
            prop_assert!(s >= lo - 1e-4 && s <= hi + 1e-4);
        }
        prop_assert!((out[n - 1] - value).abs() < 1e-4);
    }

    #[test]
    fn pedal_port_only_used_when_enabled(enable: bool, select: bool) {
        let mode = PedalMode::from_switches(enable, select);
        prop_assert_eq!(mode.pedal_source().is_some(), enable);
        if enable {
            prop_assert_eq!(mode.pedal_source(), Some(select as usize));
        }
    }
}
