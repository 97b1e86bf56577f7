//! Packet reader - iterator over every shard file in the cache directory
//!
//! `PacketReader` walks the directory's shard files in name order and
//! yields one `StoredBatch` per file, combining all of the file's records.
//! The batch carries the path it came from so the caller can delete
//! exactly that file once delivery succeeds; the reader never deletes
//! anything itself.

use std::fs;
use std::path::{Path, PathBuf};

use beacon_protocol::{DataPacket, DestinationId};

use crate::error::{Result, StoreError};
use crate::lease::ShardLease;
use crate::path::is_lock_file;
use crate::stream::PacketStream;

/// All packets recovered from one shard file
#[derive(Debug)]
pub struct StoredBatch {
    /// Destination the packets are bound for
    destination: DestinationId,

    /// Packets in append order
    packets: Vec<DataPacket>,

    /// The file that produced this batch
    path: PathBuf,
}

impl StoredBatch {
    /// Get the destination identifier
    #[inline]
    pub fn destination(&self) -> &DestinationId {
        &self.destination
    }

    /// Get the packets in append order
    #[inline]
    pub fn packets(&self) -> &[DataPacket] {
        &self.packets
    }

    /// Get the source file path
    ///
    /// Delete exactly this file once the batch has been submitted
    /// successfully, and only then.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of packets in the batch
    #[inline]
    pub fn len(&self) -> usize {
        self.packets.len()
    }

    /// Check if the batch holds no packets
    ///
    /// Empty batches come from files whose every record was corrupt.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }
}

/// Iterator over the batches of every readable shard file
///
/// Holds a `ShardLease` on the file behind the most recently yielded
/// batch until the next call, so the writer stays off that shard while
/// the caller submits and possibly deletes it.
pub struct PacketReader {
    /// Shard candidates in directory (name) order
    paths: Vec<PathBuf>,

    /// Index of the next candidate to open
    next: usize,

    /// Lease over the file of the last yielded batch
    current_lease: Option<ShardLease>,
}

impl PacketReader {
    /// Open a reader over the cache directory
    ///
    /// Fails only if the directory itself cannot be listed; unreadable
    /// individual files are skipped later.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| StoreError::io(dir, e))? {
            let entry = entry.map_err(|e| StoreError::io(dir, e))?;
            let name = entry.file_name();
            if is_lock_file(&name.to_string_lossy()) {
                continue;
            }
            if entry.metadata().map(|m| m.is_file()).unwrap_or(false) {
                paths.push(entry.path());
            }
        }
        paths.sort();

        tracing::debug!(directory = %dir.display(), files = paths.len(), "packet reader opened");

        Ok(Self {
            paths,
            next: 0,
            current_lease: None,
        })
    }

    /// Load the combined batch of the next readable shard file
    ///
    /// Advances through candidate files until one yields packets (or even
    /// an all-corrupt empty batch), claiming it for the duration. Returns
    /// `None` once every file has been exhausted.
    pub fn load_next(&mut self) -> Option<StoredBatch> {
        // Release the claim on the previously yielded file.
        self.current_lease = None;

        while self.next < self.paths.len() {
            let path = self.paths[self.next].clone();
            self.next += 1;

            // A shard claimed by the writer (or a vanished file) is
            // skipped, not an error; it stays for the next run.
            let Some(lease) = ShardLease::claim(&path) else {
                tracing::debug!(path = %path.display(), "shard busy, skipping");
                continue;
            };

            let mut stream = match PacketStream::open(&path) {
                Ok(stream) => stream,
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "shard unreadable, skipping");
                    continue;
                }
            };

            let Some(first) = stream.load_next() else {
                continue;
            };

            let destination = stream.destination().clone();
            let mut packets = first;
            while let Some(batch) = stream.load_next() {
                packets.extend(batch);
            }

            self.current_lease = Some(lease);
            return Some(StoredBatch {
                destination,
                packets,
                path,
            });
        }

        None
    }

    /// Path of the file behind the most recently yielded batch
    pub fn source_path(&self) -> Option<&Path> {
        self.current_lease.as_ref().map(ShardLease::path)
    }
}

impl std::fmt::Debug for PacketReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PacketReader")
            .field("files", &self.paths.len())
            .field("next", &self.next)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::PacketStore;
    use beacon_config::StoreConfig;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> PacketStore {
        let config = StoreConfig::default().with_directory(dir.path());
        PacketStore::new(&config).unwrap()
    }

    fn packet(dest: &str, seq: i64) -> DataPacket {
        let mut p = DataPacket::new(dest);
        p.set("seq", seq);
        p
    }

    #[test]
    fn test_empty_directory_yields_none() {
        let dir = TempDir::new().unwrap();
        let mut reader = PacketReader::open(dir.path()).unwrap();
        assert!(reader.load_next().is_none());
        assert!(reader.source_path().is_none());
    }

    #[test]
    fn test_missing_directory_is_error() {
        let err = PacketReader::open("/no/such/dir").unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[test]
    fn test_combines_all_records_of_one_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&[packet("events", 1)]);
        store.save(&[packet("events", 2), packet("events", 3)]);

        let mut reader = PacketReader::open(dir.path()).unwrap();
        let batch = reader.load_next().unwrap();

        assert_eq!(batch.destination().as_str(), "events");
        assert_eq!(batch.len(), 3);
        let seqs: Vec<i64> = batch.packets().iter().map(|p| p.int_or("seq", 0)).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
        assert_eq!(batch.path(), dir.path().join("events0"));

        assert!(reader.load_next().is_none());
    }

    #[test]
    fn test_yields_one_batch_per_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&[packet("events", 1), packet("wifi", 2)]);

        let mut reader = PacketReader::open(dir.path()).unwrap();
        let first = reader.load_next().unwrap();
        let second = reader.load_next().unwrap();

        // Name order: events0 before wifi0.
        assert_eq!(first.destination().as_str(), "events");
        assert_eq!(second.destination().as_str(), "wifi");
        assert!(reader.load_next().is_none());
    }

    #[test]
    fn test_holds_lease_until_next_call() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&[packet("events", 1)]);

        let mut reader = PacketReader::open(dir.path()).unwrap();
        let batch = reader.load_next().unwrap();

        // The yielded file is claimed: the writer moves to the next shard.
        assert!(ShardLease::claim(batch.path()).is_none());
        assert_eq!(reader.source_path(), Some(batch.path()));

        assert!(reader.load_next().is_none());
        assert!(ShardLease::claim(dir.path().join("events0").as_path()).is_some());
    }

    #[test]
    fn test_skips_claimed_files() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&[packet("events", 1), packet("wifi", 2)]);

        let _held = ShardLease::claim(&dir.path().join("events0")).unwrap();

        let mut reader = PacketReader::open(dir.path()).unwrap();
        let batch = reader.load_next().unwrap();
        assert_eq!(batch.destination().as_str(), "wifi");
        assert!(reader.load_next().is_none());
    }

    #[test]
    fn test_skips_files_without_shard_names() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("README"), b"not a shard").unwrap();
        let store = store_in(&dir);
        store.save(&[packet("events", 1)]);

        let mut reader = PacketReader::open(dir.path()).unwrap();
        let batch = reader.load_next().unwrap();
        assert_eq!(batch.destination().as_str(), "events");
        assert!(reader.load_next().is_none());
    }

    #[test]
    fn test_all_corrupt_file_yields_empty_batch() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events0");
        let mut contents = Vec::new();
        contents.extend_from_slice(&4u32.to_be_bytes());
        contents.extend_from_slice(&[0xee; 4]); // undecompressible record
        std::fs::write(&path, contents).unwrap();

        let mut reader = PacketReader::open(dir.path()).unwrap();
        let batch = reader.load_next().unwrap();
        assert!(batch.is_empty());
        assert_eq!(batch.path(), path);
    }
}
