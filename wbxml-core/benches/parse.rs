//! Benchmarks for WBXML reading and event dispatch.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use wbxml_core::activesync::{airsync, codepages, email};
use wbxml_core::{parse, dump, DumpOptions, EventParser, Writer, WriterConfig};

/// A Sync response with `items` added messages.
fn sync_response(items: usize) -> Vec<u8> {
    let mut w = Writer::new(WriterConfig::default()).unwrap();
    w.stag(airsync::Sync, &[]).unwrap();
    w.stag(airsync::Collections, &[]).unwrap();
    w.stag(airsync::Collection, &[]).unwrap();
    w.tag_with_text(airsync::SyncKey, &[], "1234567890").unwrap();
    w.tag_with_text(airsync::CollectionId, &[], "5").unwrap();
    w.tag_with_text(airsync::Status, &[], "1").unwrap();
    w.stag(airsync::Commands, &[]).unwrap();
    for i in 0..items {
        w.stag(airsync::Add, &[]).unwrap();
        w.tag_with_text(airsync::ServerId, &[], format!("5:{}", i)).unwrap();
        w.stag(airsync::ApplicationData, &[]).unwrap();
        w.tag_with_text(email::Subject, &[], format!("Message number {}", i)).unwrap();
        w.tag_with_text(email::From, &[], "\"Someone\" <someone@example.com>").unwrap();
        w.tag_with_text(email::Read, &[], "0").unwrap();
        w.etag().unwrap().etag().unwrap();
    }
    w.etag().unwrap().etag().unwrap().etag().unwrap().etag().unwrap();
    w.finish().unwrap().into_vec()
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for items in [1, 50, 500] {
        let input = sync_response(items);
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_function(format!("sync_{}", items), |b| {
            b.iter(|| parse(black_box(&input), codepages()).unwrap().nodes.len())
        });
    }
    group.finish();
}

fn bench_event_parser(c: &mut Criterion) {
    let input = sync_response(500);
    let doc = parse(&input, codepages()).unwrap();

    let mut group = c.benchmark_group("event_parser");
    group.throughput(Throughput::Elements(500));
    group.bench_function("sync_adds", |b| {
        b.iter(|| {
            let mut count = 0;
            let mut ep = EventParser::new();
            ep.add_listener(
                [airsync::Sync, airsync::Collections, airsync::Collection, airsync::Commands, airsync::Add],
                |node| {
                    count += node.child(airsync::ServerId).map_or(0, |_| 1);
                    Ok(())
                },
            );
            ep.run(black_box(&doc)).unwrap();
            drop(ep);
            count
        })
    });
    group.finish();
}

fn bench_dump(c: &mut Criterion) {
    let doc = parse(&sync_response(50), codepages()).unwrap();
    c.bench_function("dump/sync_50", |b| {
        b.iter(|| dump(black_box(&doc), codepages(), &DumpOptions::default()).len())
    });
}

criterion_group!(benches, bench_parse, bench_event_parser, bench_dump);
criterion_main!(benches);
