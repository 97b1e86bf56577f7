//! Packet store - write path
//!
//! `PacketStore::save` groups packets by destination and appends one
//! compressed record per group to that destination's shard file. A group
//! is dropped whole when it cannot be encoded or would push the cache
//! directory over its byte budget; losing a record is acceptable,
//! unbounded disk growth is not.

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use beacon_config::StoreConfig;
use beacon_protocol::{encode_packets, DataPacket, DestinationId};
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::{Result, StoreError};
use crate::lease::{sweep_stale_locks, ShardLease};
use crate::path::{directory_size, shard_file_name};
use crate::LENGTH_PREFIX_SIZE;

/// Durable, compressed, size-capped store for packet batches
///
/// One shard file per destination (several candidates under concurrent
/// claims), each a sequence of `[u32 length][deflate bytes]` records.
#[derive(Debug)]
pub struct PacketStore {
    /// Cache directory holding all shard files
    dir: PathBuf,

    /// Byte budget across every file in the directory
    max_cache_size: u64,

    /// Shard candidates probed per destination
    max_files_per_destination: u32,

    /// File name clamp applied before shard files are created
    max_file_name_len: usize,
}

impl PacketStore {
    /// Open (creating if needed) the store over the configured directory
    ///
    /// Lock files left behind by a previous process are swept here; there
    /// is one writer process per cache directory.
    pub fn new(config: &StoreConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.directory)
            .map_err(|e| StoreError::io(&config.directory, e))?;

        let swept = sweep_stale_locks(&config.directory)
            .map_err(|e| StoreError::io(&config.directory, e))?;
        if swept > 0 {
            tracing::warn!(
                directory = %config.directory.display(),
                count = swept,
                "swept stale shard locks"
            );
        }

        tracing::debug!(
            directory = %config.directory.display(),
            max_cache_size = config.max_cache_size,
            max_files_per_destination = config.max_files_per_destination,
            "packet store ready"
        );

        Ok(Self {
            dir: config.directory.clone(),
            max_cache_size: config.max_cache_size,
            max_files_per_destination: config.max_files_per_destination,
            max_file_name_len: config.max_file_name_len,
        })
    }

    /// Get the cache directory
    #[inline]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Total bytes currently cached on disk
    pub fn directory_size(&self) -> Result<u64> {
        directory_size(&self.dir).map_err(|e| StoreError::io(&self.dir, e))
    }

    /// Persist a batch of packets, grouped by destination
    ///
    /// Each group is encoded, compressed and appended as one record to a
    /// claimed shard of its destination. A failed group is logged and
    /// dropped; remaining groups still persist. Returns `true` only if
    /// every group was written.
    pub fn save(&self, packets: &[DataPacket]) -> bool {
        if packets.is_empty() {
            return true;
        }

        let mut dir_size = match self.directory_size() {
            Ok(size) => size,
            Err(e) => {
                tracing::warn!(error = %e, "cannot size cache directory, batch dropped");
                return false;
            }
        };

        let mut groups: BTreeMap<&DestinationId, Vec<&DataPacket>> = BTreeMap::new();
        for packet in packets {
            groups.entry(packet.destination()).or_default().push(packet);
        }

        let mut all_ok = true;
        for (destination, group) in groups {
            match self.save_group(destination, &group, dir_size) {
                Ok(written) => {
                    dir_size += written;
                    tracing::trace!(
                        destination = %destination,
                        packets = group.len(),
                        bytes = written,
                        "packet group persisted"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        destination = %destination,
                        packets = group.len(),
                        error = %e,
                        "packet group dropped"
                    );
                    all_ok = false;
                }
            }
        }

        all_ok
    }

    /// Write one destination's packets as a single record
    ///
    /// Returns the bytes added to the directory.
    fn save_group(
        &self,
        destination: &DestinationId,
        group: &[&DataPacket],
        dir_size: u64,
    ) -> Result<u64> {
        let encoded = encode_packets(group.iter().copied())?;
        let compressed = compress(&encoded).map_err(|e| StoreError::io(&self.dir, e))?;

        let needed = (LENGTH_PREFIX_SIZE + compressed.len()) as u64;
        if dir_size + needed > self.max_cache_size {
            return Err(StoreError::cache_full(
                destination.clone(),
                needed,
                self.max_cache_size.saturating_sub(dir_size),
            ));
        }

        for index in 0..self.max_files_per_destination {
            let name = shard_file_name(destination, index, self.max_file_name_len);
            let path = self.dir.join(name);

            if let Some(lease) = ShardLease::claim(&path) {
                append_record(lease.path(), &compressed)?;
                return Ok(needed);
            }
        }

        Err(StoreError::NoShardAvailable {
            destination: destination.clone(),
        })
    }
}

/// Append one `[u32 length][bytes]` record, creating the file if absent
fn append_record(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| StoreError::io(path, e))?;

    file.write_all(&(bytes.len() as u32).to_be_bytes())
        .map_err(|e| StoreError::io(path, e))?;
    file.write_all(bytes).map_err(|e| StoreError::io(path, e))?;

    Ok(())
}

/// Deflate-compress a record body
fn compress(bytes: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(
        Vec::with_capacity(bytes.len() / 2 + 64),
        Compression::default(),
    );
    encoder.write_all(bytes)?;
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn test_save_empty_batch_is_noop() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert!(store.save(&[]));
        assert_eq!(store.directory_size().unwrap(), 0);
    }

    #[test]
    fn test_save_creates_shard_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert!(store.save(&[packet("events", 1)]));
        assert!(dir.path().join("events0").exists());
        assert!(store.directory_size().unwrap() > 0);
    }

    #[test]
    fn test_save_groups_by_destination() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let batch = vec![
            packet("events", 1),
            packet("wifi", 2),
            packet("events", 3),
        ];
        assert!(store.save(&batch));

        assert!(dir.path().join("events0").exists());
        assert!(dir.path().join("wifi0").exists());
    }

    #[test]
    fn test_save_appends_to_existing_shard() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert!(store.save(&[packet("events", 1)]));
        let first = store.directory_size().unwrap();
        assert!(store.save(&[packet("events", 2)]));

        assert!(store.directory_size().unwrap() > first);
        assert!(!dir.path().join("events1").exists());
    }

    #[test]
    fn test_save_skips_claimed_shard() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let _held = ShardLease::claim(&dir.path().join("events0")).unwrap();
        assert!(store.save(&[packet("events", 1)]));

        assert!(!dir.path().join("events0").exists());
        assert!(dir.path().join("events1").exists());
    }

    #[test]
    fn test_save_fails_when_all_shards_claimed() {
        let dir = TempDir::new().unwrap();
        let config = StoreConfig::default().with_directory(dir.path());
        let config = StoreConfig {
            max_files_per_destination: 2,
            ..config
        };
        let store = PacketStore::new(&config).unwrap();

        let _l0 = ShardLease::claim(&dir.path().join("events0")).unwrap();
        let _l1 = ShardLease::claim(&dir.path().join("events1")).unwrap();

        assert!(!store.save(&[packet("events", 1)]));
        assert_eq!(store.directory_size().unwrap(), 0);
    }

    #[test]
    fn test_save_over_budget_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let config = StoreConfig::default()
            .with_directory(dir.path())
            .with_max_cache_size(16);
        let store = PacketStore::new(&config).unwrap();

        let mut big = DataPacket::new("events");
        big.set("blob", vec![0u8; 4096]);

        assert!(!store.save(&[big]));
        assert_eq!(store.directory_size().unwrap(), 0);
    }

    #[test]
    fn test_save_over_budget_keeps_other_groups() {
        let dir = TempDir::new().unwrap();
        let config = StoreConfig::default()
            .with_directory(dir.path())
            .with_max_cache_size(200);
        let store = PacketStore::new(&config).unwrap();

        // Incompressible payload so the compressed record stays over budget.
        let mut noise = 0x2545f491_u32;
        let blob: Vec<u8> = (0..8192)
            .map(|_| {
                noise = noise.wrapping_mul(1664525).wrapping_add(1013904223);
                (noise >> 24) as u8
            })
            .collect();
        let mut big = DataPacket::new("bulk");
        big.set("blob", blob);
        let small = packet("events", 1);

        // Record order is destination order: "bulk" fails, "events" persists.
        assert!(!store.save(&[big, small]));
        assert!(dir.path().join("events0").exists());
        assert!(!dir.path().join("bulk0").exists());
    }

    #[test]
    fn test_new_sweeps_stale_locks() {
        let dir = TempDir::new().unwrap();
        std::fs::File::create(dir.path().join("events0.lock")).unwrap();

        let store = store_in(&dir);
        assert!(!dir.path().join("events0.lock").exists());
        assert!(store.save(&[packet("events", 1)]));
        assert!(dir.path().join("events0").exists());
    }
}
