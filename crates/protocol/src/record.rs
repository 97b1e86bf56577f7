//! Record codec - serialization of packet sequences
//!
//! A record is the decompressed body of one length-prefixed store entry:
//! a sequence of serialized packets, each laid out as
//!
//! ```text
//! [i32 version][i32 count] then count x [string key][typed value]
//! ```
//!
//! Strings are `[i32 length][utf8 bytes]`; a typed value is a 1-byte tag
//! followed by its payload. All integers are big-endian. Version 1 is the
//! only defined format.
//!
//! Decoding is forgiving by contract: an unknown version or malformed
//! field stops the record at that point and whatever parsed before it is
//! returned. Encoding is strict: a value that cannot be represented fails
//! the whole record, since partial packets are useless to the backend.

use bytes::{BufMut, Bytes, BytesMut};

use crate::destination::DestinationId;
use crate::error::ProtocolError;
use crate::packet::{DataPacket, PacketValue};
use crate::{FORMAT_VERSION, MAX_VALUE_SIZE, Result};

/// Value type tags on the wire
const TAG_BOOL: u8 = 0;
const TAG_INT: u8 = 1;
const TAG_FLOAT: u8 = 2;
const TAG_STR: u8 = 3;
const TAG_BLOB: u8 = 4;

/// Encode a sequence of packets into one record body
///
/// The destination is not written; it is implied by the store file the
/// record lands in. Fails on the first value that cannot be encoded -
/// the caller drops the whole group rather than persist a partial record.
pub fn encode_packets<'a>(packets: impl IntoIterator<Item = &'a DataPacket>) -> Result<Bytes> {
    let mut buf = BytesMut::with_capacity(256);

    for packet in packets {
        buf.put_i32(FORMAT_VERSION);
        buf.put_i32(packet.len() as i32);

        for (key, value) in packet.values() {
            put_str(&mut buf, key, key)?;
            put_value(&mut buf, key, value)?;
        }
    }

    Ok(buf.freeze())
}

/// Decode a record body into packets bound for the given destination
///
/// Stops at the first unknown version tag or malformed field, returning
/// the packets fully parsed before that point. Running out of bytes at a
/// packet boundary ends the record normally.
pub fn decode_packets(buf: &[u8], destination: &DestinationId) -> Vec<DataPacket> {
    let mut cursor = Cursor::new(buf);
    let mut packets = Vec::new();

    loop {
        if cursor.is_at_end() {
            break;
        }

        let Some(version) = cursor.read_i32() else {
            break;
        };
        if version != FORMAT_VERSION {
            break;
        }

        let Some(count) = cursor.read_i32() else {
            break;
        };
        if count < 0 {
            break;
        }

        let mut packet = DataPacket::new(destination.clone());
        let mut complete = true;

        for _ in 0..count {
            let Some(key) = cursor.read_str() else {
                complete = false;
                break;
            };
            let Some(value) = cursor.read_value() else {
                complete = false;
                break;
            };
            packet.set(key, value);
        }

        if !complete {
            break;
        }
        packets.push(packet);
    }

    packets
}

fn put_str(buf: &mut BytesMut, key: &str, s: &str) -> Result<()> {
    if s.len() > MAX_VALUE_SIZE {
        return Err(ProtocolError::value_too_large(key, s.len()));
    }
    buf.put_i32(s.len() as i32);
    buf.put_slice(s.as_bytes());
    Ok(())
}

fn put_value(buf: &mut BytesMut, key: &str, value: &PacketValue) -> Result<()> {
    match value {
        PacketValue::Bool(v) => {
            buf.put_u8(TAG_BOOL);
            buf.put_u8(u8::from(*v));
        }
        PacketValue::Int(v) => {
            buf.put_u8(TAG_INT);
            buf.put_i64(*v);
        }
        PacketValue::Float(v) => {
            buf.put_u8(TAG_FLOAT);
            buf.put_f64(*v);
        }
        PacketValue::Str(v) => {
            buf.put_u8(TAG_STR);
            put_str(buf, key, v)?;
        }
        PacketValue::Blob(v) => {
            if v.len() > MAX_VALUE_SIZE {
                return Err(ProtocolError::value_too_large(key, v.len()));
            }
            buf.put_u8(TAG_BLOB);
            buf.put_i32(v.len() as i32);
            buf.put_slice(v);
        }
    }
    Ok(())
}

/// Bounds-checked reader over a record body
///
/// Every read returns `None` instead of panicking when the buffer runs
/// out; the decode loop treats that as the end of usable data.
struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    fn is_at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(n)?;
        if end > self.buf.len() {
            return None;
        }
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Some(slice)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take(1).map(|b| b[0])
    }

    fn read_i32(&mut self) -> Option<i32> {
        self.take(4).map(|b| i32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_i64(&mut self) -> Option<i64> {
        self.take(8)
            .map(|b| i64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.take(8)
            .map(|b| f64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
    }

    fn read_str(&mut self) -> Option<String> {
        let len = self.read_i32()?;
        if len < 0 {
            return None;
        }
        let bytes = self.take(len as usize)?;
        String::from_utf8(bytes.to_vec()).ok()
    }

    fn read_bytes(&mut self) -> Option<Vec<u8>> {
        let len = self.read_i32()?;
        if len < 0 {
            return None;
        }
        self.take(len as usize).map(<[u8]>::to_vec)
    }

    fn read_value(&mut self) -> Option<PacketValue> {
        match self.read_u8()? {
            TAG_BOOL => self.read_u8().map(|b| PacketValue::Bool(b != 0)),
            TAG_INT => self.read_i64().map(PacketValue::Int),
            TAG_FLOAT => self.read_f64().map(PacketValue::Float),
            TAG_STR => self.read_str().map(PacketValue::Str),
            TAG_BLOB => self.read_bytes().map(PacketValue::Blob),
            _ => None,
        }
    }
}
