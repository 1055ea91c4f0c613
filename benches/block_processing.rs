use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use crossbeam_channel::bounded;

use cvbridge::nodes::{CaptureMessage, CvCapture, CvPlayback};
use cvbridge::reduce::Reducer;
use cvbridge::{AudioNode, ProcessContext};

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Reducer.reduce()");
    for &n in &[128usize, 1024, 4096] {
        // a descending ramp is a slow case for the sort
        let block: Vec<f32> = (0..n).rev().map(|i| i as f32 / n as f32).collect();
        let mut reducer = Reducer::new(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &block, |b, block| {
            b.iter(|| reducer.reduce(black_box(block)))
        });
    }
    group.finish();

    let mut group = c.benchmark_group("CvCapture.process()");
    for &n in &[128usize, 256] {
        let ctx = ProcessContext::new(48_000, n);
        let mut node = CvCapture::new(false);
        node.buffer_size_changed(&ctx);
        let mut outputs = vec![vec![0.0; n]; 3];
        node.process(&ctx, std::iter::once(CaptureMessage::Prime([0.0, 0.0])), &[], &mut outputs);

        // alternate readings so every block renders a full ramp
        let mut toggle = false;
        group.bench_function(BenchmarkId::from_parameter(n), |b| {
            b.iter(|| {
                toggle = !toggle;
                let value = if toggle { 10.0 } else { 0.0 };
                let msgs = [
                    CaptureMessage::Sample { channel: 0, value },
                    CaptureMessage::Sample { channel: 1, value },
                ];
                node.process(&ctx, msgs.into_iter(), &[], &mut outputs);
            })
        });
    }
    group.finish();

    c.bench_function("CvPlayback.process()", |b| {
        let n = 1024;
        let ctx = ProcessContext::new(48_000, n);
        let (tx, rx) = bounded(1);
        let mut node = CvPlayback::new(tx);
        node.buffer_size_changed(&ctx);
        let inputs = vec![vec![0.5; n], vec![0.25; n]];

        b.iter(|| {
            node.process(&ctx, std::iter::empty(), black_box(&inputs), &mut []);
            rx.try_recv().ok()
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
