// ---------------------------------------------------------------------------
// file_header: magic bytes, version, flags and checksum of a progress file
// ---------------------------------------------------------------------------
//
// Header format (28 bytes, fixed-size, little-endian):
//   [0..4]   Magic bytes: "MTRO"
//   [4..8]   Header format version (u32)
//   [8..12]  Flags (u32: bit 0 = lz4 compressed payload)
//   [12..20] Timestamp (Unix epoch seconds, u64)
//   [20..24] Uncompressed payload size (u32)
//   [24..28] xxHash32 checksum of the stored payload (everything after the header)

use xxhash_rust::xxh32::xxh32;

use crate::save_error::SaveError;

/// Magic bytes identifying a progress file.
pub const MAGIC: [u8; 4] = *b"MTRO";

pub const HEADER_SIZE: usize = 28;

/// Layout version of the header itself (the payload carries its own).
pub const HEADER_FORMAT_VERSION: u32 = 1;

/// Payload is lz4 block-compressed with a prepended size.
pub const FLAG_COMPRESSED: u32 = 1;

const XXHASH_SEED: u32 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub format_version: u32,
    pub flags: u32,
    pub timestamp: u64,
    pub uncompressed_size: u32,
    pub checksum: u32,
}

impl FileHeader {
    pub fn is_compressed(&self) -> bool {
        self.flags & FLAG_COMPRESSED != 0
    }

    fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(&MAGIC);
        out[4..8].copy_from_slice(&self.format_version.to_le_bytes());
        out[8..12].copy_from_slice(&self.flags.to_le_bytes());
        out[12..20].copy_from_slice(&self.timestamp.to_le_bytes());
        out[20..24].copy_from_slice(&self.uncompressed_size.to_le_bytes());
        out[24..28].copy_from_slice(&self.checksum.to_le_bytes());
        out
    }
}

fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Prepend a header to `payload`. `uncompressed_size` is the size before
/// compression (equal to `payload.len()` when `flags` is 0).
pub fn wrap_with_header(payload: &[u8], flags: u32, uncompressed_size: usize) -> Vec<u8> {
    let header = FileHeader {
        format_version: HEADER_FORMAT_VERSION,
        flags,
        timestamp: now_secs(),
        uncompressed_size: uncompressed_size as u32,
        checksum: xxh32(payload, XXHASH_SEED),
    };
    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
    out.extend_from_slice(&header.to_bytes());
    out.extend_from_slice(payload);
    out
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(word)
}

/// Validate the header and return it with the payload behind it.
pub fn unwrap_header(bytes: &[u8]) -> Result<(FileHeader, &[u8]), SaveError> {
    if bytes.len() < HEADER_SIZE {
        return Err(SaveError::Corrupted(format!(
            "{} bytes is too short for a {HEADER_SIZE}-byte header",
            bytes.len()
        )));
    }
    if bytes[..4] != MAGIC {
        return Err(SaveError::Corrupted("not a progress file".into()));
    }

    let mut stamp = [0u8; 8];
    stamp.copy_from_slice(&bytes[12..20]);
    let header = FileHeader {
        format_version: read_u32(bytes, 4),
        flags: read_u32(bytes, 8),
        timestamp: u64::from_le_bytes(stamp),
        uncompressed_size: read_u32(bytes, 20),
        checksum: read_u32(bytes, 24),
    };
    if header.format_version > HEADER_FORMAT_VERSION {
        return Err(SaveError::VersionMismatch {
            expected_max: HEADER_FORMAT_VERSION,
            found: header.format_version,
        });
    }

    let payload = &bytes[HEADER_SIZE..];
    let computed = xxh32(payload, XXHASH_SEED);
    if computed != header.checksum {
        return Err(SaveError::Corrupted(format!(
            "checksum mismatch (expected {:#010X}, got {:#010X})",
            header.checksum, computed
        )));
    }
    Ok((header, payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_and_unwrap_roundtrip() {
        let data = b"level progress";
        let wrapped = wrap_with_header(data, 0, data.len());
        assert_eq!(&wrapped[..4], &MAGIC);
        assert_eq!(wrapped.len(), HEADER_SIZE + data.len());

        let (header, payload) = unwrap_header(&wrapped).expect("valid header");
        assert_eq!(header.format_version, HEADER_FORMAT_VERSION);
        assert!(!header.is_compressed());
        assert_eq!(header.uncompressed_size, data.len() as u32);
        assert_eq!(payload, data);
    }

    #[test]
    fn test_corrupted_payload_detected() {
        let mut wrapped = wrap_with_header(b"payload", 0, 7);
        let last = wrapped.len() - 1;
        wrapped[last] ^= 0xFF;
        match unwrap_header(&wrapped) {
            Err(SaveError::Corrupted(msg)) => assert!(msg.contains("checksum"), "got: {msg}"),
            other => panic!("expected Corrupted, got {other:?}"),
        }
    }

    #[test]
    fn test_future_header_version_rejected() {
        let mut wrapped = wrap_with_header(b"payload", 0, 7);
        wrapped[4..8].copy_from_slice(&999u32.to_le_bytes());
        assert!(matches!(
            unwrap_header(&wrapped),
            Err(SaveError::VersionMismatch { found: 999, .. })
        ));
    }

    #[test]
    fn test_foreign_and_truncated_files_rejected() {
        assert!(matches!(
            unwrap_header(b"MTRO\x01\x00"),
            Err(SaveError::Corrupted(_))
        ));
        let foreign = vec![0u8; 64];
        assert!(matches!(unwrap_header(&foreign), Err(SaveError::Corrupted(_))));
    }

    #[test]
    fn test_compressed_flag_survives() {
        let wrapped = wrap_with_header(b"xx", FLAG_COMPRESSED, 4096);
        let (header, _) = unwrap_header(&wrapped).expect("valid header");
        assert!(header.is_compressed());
        assert_eq!(header.uncompressed_size, 4096);
    }
}
