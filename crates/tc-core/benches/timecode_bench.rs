//! Criterion benchmarks for timecode arithmetic and the line codec.
//!
//! The tick hot path is one increment plus one `timecode_update` encode per
//! subscriber, up to 60 times per second per session, so both operations are
//! measured here.
//!
//! Run with:
//! ```bash
//! cargo bench --package tc-core --bench timecode_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tc_core::protocol::framing::{decode_request, encode_message};
use tc_core::protocol::messages::ServerMessage;
use tc_core::{FrameRate, Timecode};

// ── Benchmark groups ──────────────────────────────────────────────────────────

/// Benchmarks one increment at each supported framerate.
fn bench_increment(c: &mut Criterion) {
    let mut group = c.benchmark_group("timecode_increment");
    for rate in FrameRate::ALL {
        group.bench_with_input(
            BenchmarkId::new("fps", rate.label()),
            &rate.max_frames(),
            |b, &max_frames| {
                b.iter(|| {
                    let mut tc = Timecode::new(23, 59, 59, max_frames - 1);
                    tc.increment(black_box(max_frames));
                    tc
                })
            },
        );
    }
    group.finish();
}

/// Benchmarks parse and format of the canonical string form.
fn bench_string_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("timecode_string");

    group.bench_function("parse", |b| {
        b.iter(|| black_box("12:34:56:12").parse::<Timecode>().unwrap())
    });

    let tc = Timecode::new(12, 34, 56, 12);
    group.bench_function("format", |b| b.iter(|| black_box(&tc).to_string()));

    group.finish();
}

/// Benchmarks the line codec on the broadcast hot path.
fn bench_line_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("line_codec");

    let update = ServerMessage::TimecodeUpdate {
        timecode: "12:34:56:12".to_string(),
    };
    group.bench_function("encode_timecode_update", |b| {
        b.iter(|| encode_message(black_box(&update)).unwrap())
    });

    let request = r#"{"type":"create_session","framerate":"29.97","initial_timecode":"01:00:00:00"}"#;
    group.bench_function("decode_create_session", |b| {
        b.iter(|| decode_request(black_box(request)).unwrap())
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_increment,
    bench_string_conversion,
    bench_line_codec
);
criterion_main!(benches);
