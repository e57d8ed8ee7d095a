//! Benchmarks for Magic Drill detection
//!
//! Run: cargo bench
//! Run specific: cargo bench -- zip
//! Compare: cargo bench -- --save-baseline v1 && cargo bench -- --baseline v1

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use magic_drill::{detect, DEFAULT_HEAD_BYTES};

fn head_with(prefix: &[u8]) -> Vec<u8> {
    let mut buf = prefix.to_vec();
    buf.resize(DEFAULT_HEAD_BYTES, 0x20);
    buf
}

fn zip_head() -> Vec<u8> {
    let mut buf = Vec::new();
    for name in ["[Content_Types].xml", "_rels/.rels", "docProps/app.xml", "word/document.xml"] {
        buf.extend_from_slice(&[0x50, 0x4B, 0x03, 0x04, 0x14, 0x00, 0x06, 0x00, 0x08, 0x00]);
        buf.extend_from_slice(&[0x00; 8]);
        buf.extend_from_slice(&64u32.to_le_bytes());
        buf.extend_from_slice(&200u32.to_le_bytes());
        buf.extend_from_slice(&(name.len() as u16).to_le_bytes());
        buf.extend_from_slice(&0u16.to_le_bytes());
        buf.extend_from_slice(name.as_bytes());
        buf.extend_from_slice(&[0xAA; 64]);
    }
    head_with(&buf)
}

// ============================================================================
// Single formats
// ============================================================================

fn benchmark_typical_heads(c: &mut Criterion) {
    let cases: Vec<(&str, Vec<u8>)> = vec![
        ("jpeg", head_with(&[0xFF, 0xD8, 0xFF, 0xE0])),
        ("png", head_with(b"\x89PNG\r\n\x1a\n\x00\x00\x00\x0dIHDR")),
        ("docx", zip_head()),
        ("mp4", head_with(b"\x00\x00\x00\x18ftypisom\x00\x00\x02\x00")),
        ("mp3", head_with(&[0xFF, 0xFB, 0x90, 0x64])),
        ("unknown", head_with(b"plain text with nothing special")),
    ];

    let mut group = c.benchmark_group("detect");
    group.throughput(Throughput::Bytes(DEFAULT_HEAD_BYTES as u64));
    for (name, buf) in &cases {
        group.bench_with_input(BenchmarkId::from_parameter(name), buf, |b, buf| {
            b.iter(|| detect(black_box(buf)))
        });
    }
    group.finish();
}

// ============================================================================
// Worst case: falls through the whole table
// ============================================================================

fn benchmark_fallthrough(c: &mut Criterion) {
    let buf = vec![0x55u8; DEFAULT_HEAD_BYTES];
    c.bench_function("detect_no_match_4100", |b| b.iter(|| detect(black_box(&buf))));
}

criterion_group!(benches, benchmark_typical_heads, benchmark_fallthrough);
criterion_main!(benches);
