//! Packet stream - sequential reader over one shard file
//!
//! `PacketStream` walks the `[u32 length][deflate bytes]` records of a
//! single store file and reconstructs the packet batches inside them.
//! It is built to survive corruption: a bad length closes the stream, a
//! bad compressed body yields an empty batch so the caller can advance
//! to the next record.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use beacon_protocol::{decode_packets, DataPacket, DestinationId, MAX_RECORD_SIZE};
use flate2::read::ZlibDecoder;

use crate::error::{Result, StoreError};
use crate::path::destination_from_file_name;
use crate::LENGTH_PREFIX_SIZE;

/// Sequential reader of one shard file
pub struct PacketStream {
    /// The shard file being read
    path: PathBuf,

    /// Destination recovered from the shard file name
    destination: DestinationId,

    reader: BufReader<File>,

    /// Set once the file is exhausted or a corrupt length was seen
    closed: bool,
}

impl PacketStream {
    /// Open a shard file for reading
    ///
    /// The destination is recovered from the `<destination><digit>` file
    /// name; files not following the pattern are rejected.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let destination = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(destination_from_file_name)
            .ok_or_else(|| StoreError::UnrecognizedShard {
                path: path.to_path_buf(),
            })?;

        let file = File::open(path).map_err(|e| StoreError::io(path, e))?;
        let reader = BufReader::with_capacity(32 * 1024, file);

        Ok(Self {
            path: path.to_path_buf(),
            destination,
            reader,
            closed: false,
        })
    }

    /// Get the shard file path
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the destination this shard belongs to
    #[inline]
    pub fn destination(&self) -> &DestinationId {
        &self.destination
    }

    /// Load the next batch of packets from the file
    ///
    /// Returns `None` at end of file, on a short read, or when a record
    /// length fails the sanity check; in all those cases the stream is
    /// closed. A record that fails to decompress yields an empty batch
    /// instead, so the caller can still advance past it.
    pub fn load_next(&mut self) -> Option<Vec<DataPacket>> {
        if self.closed {
            return None;
        }

        // Record length prefix; clean EOF here ends the file normally.
        let mut len_bytes = [0u8; LENGTH_PREFIX_SIZE];
        match self.reader.read_exact(&mut len_bytes) {
            Ok(()) => {}
            Err(e) => {
                if e.kind() != io::ErrorKind::UnexpectedEof {
                    tracing::warn!(path = %self.path.display(), error = %e, "shard read failed");
                }
                self.closed = true;
                return None;
            }
        }

        let len = u32::from_be_bytes(len_bytes) as usize;
        if len == 0 || len > MAX_RECORD_SIZE {
            tracing::warn!(
                path = %self.path.display(),
                length = len,
                max = MAX_RECORD_SIZE,
                "record length out of bounds, closing shard"
            );
            self.closed = true;
            return None;
        }

        let mut compressed = vec![0u8; len];
        if let Err(e) = self.reader.read_exact(&mut compressed) {
            tracing::warn!(path = %self.path.display(), error = %e, "truncated record, closing shard");
            self.closed = true;
            return None;
        }

        let mut body = Vec::with_capacity(len * 2);
        if let Err(e) = ZlibDecoder::new(compressed.as_slice()).read_to_end(&mut body) {
            tracing::warn!(path = %self.path.display(), error = %e, "record failed to decompress");
            return Some(Vec::new());
        }

        Some(decode_packets(&body, &self.destination))
    }
}

impl std::fmt::Debug for PacketStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PacketStream")
            .field("path", &self.path)
            .field("destination", &self.destination)
            .field("closed", &self.closed)
            .finish()
    }
}
