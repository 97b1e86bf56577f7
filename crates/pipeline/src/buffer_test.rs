//! Tests for PacketCollector

use std::sync::Arc;

use beacon_config::StoreConfig;
use beacon_protocol::DataPacket;
use beacon_store::{PacketStore, PacketStream};
use tempfile::TempDir;

use crate::buffer::PacketCollector;
use crate::metrics::PipelineMetrics;

fn collector_in(dir: &TempDir, limit: usize) -> (PacketCollector, Arc<PipelineMetrics>) {
    let config = StoreConfig::default().with_directory(dir.path());
    let store = Arc::new(PacketStore::new(&config).unwrap());
    let metrics = Arc::new(PipelineMetrics::new());
    (
        PacketCollector::new(limit, store, Arc::clone(&metrics)),
        metrics,
    )
}

fn packet(seq: i64) -> DataPacket {
    let mut p = DataPacket::new("events");
    p.set("seq", seq);
    p
}

fn shard_count(dir: &TempDir) -> usize {
    std::fs::read_dir(dir.path()).unwrap().count()
}

#[test]
fn test_flush_empty_buffer_performs_no_io() {
    let dir = TempDir::new().unwrap();
    let (collector, metrics) = collector_in(&dir, 10);

    collector.flush();
    collector.flush();

    assert_eq!(shard_count(&dir), 0);
    assert_eq!(metrics.snapshot().flushes, 0);
}

#[test]
fn test_add_below_limit_buffers_only() {
    let dir = TempDir::new().unwrap();
    let (collector, metrics) = collector_in(&dir, 3);

    collector.add(packet(1));
    collector.add(packet(2));

    assert_eq!(collector.len(), 2);
    assert_eq!(shard_count(&dir), 0);
    assert_eq!(metrics.snapshot().packets_collected, 2);
}

#[test]
fn test_add_at_limit_triggers_flush() {
    let dir = TempDir::new().unwrap();
    let (collector, metrics) = collector_in(&dir, 3);

    collector.add(packet(1));
    collector.add(packet(2));
    collector.add(packet(3));

    assert!(collector.is_empty());
    assert_eq!(metrics.snapshot().flushes, 1);
    assert!(dir.path().join("events0").exists());
}

#[test]
fn test_lifecycle_flush_persists_partial_buffer() {
    let dir = TempDir::new().unwrap();
    let (collector, metrics) = collector_in(&dir, 100);

    collector.add(packet(1));
    collector.flush();

    assert!(collector.is_empty());
    assert_eq!(metrics.snapshot().flushes, 1);
    assert!(dir.path().join("events0").exists());
}

#[test]
fn test_flush_preserves_packet_order() {
    let dir = TempDir::new().unwrap();
    let (collector, _metrics) = collector_in(&dir, 100);

    for seq in 1..=3 {
        collector.add(packet(seq));
    }
    collector.flush();

    let mut stream = PacketStream::open(dir.path().join("events0")).unwrap();
    let batch = stream.load_next().unwrap();
    let seqs: Vec<i64> = batch.iter().map(|p| p.int_or("seq", 0)).collect();
    assert_eq!(seqs, vec![1, 2, 3]);
}

#[test]
fn test_buffer_cleared_even_when_save_fails() {
    let dir = TempDir::new().unwrap();
    let config = StoreConfig::default()
        .with_directory(dir.path())
        .with_max_cache_size(16);
    let store = Arc::new(PacketStore::new(&config).unwrap());
    let metrics = Arc::new(PipelineMetrics::new());
    let collector = PacketCollector::new(100, store, Arc::clone(&metrics));

    let mut big = DataPacket::new("events");
    big.set("blob", vec![0u8; 4096]);
    collector.add(big);
    collector.flush();

    // The buffer must not retain packets a failing disk cannot take.
    assert!(collector.is_empty());
    assert_eq!(metrics.snapshot().flush_failures, 1);
    assert_eq!(metrics.snapshot().flushes, 1);
}
