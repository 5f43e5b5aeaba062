// ---------------------------------------------------------------------------
// codec: ProgressFile <-> bytes on disk
// ---------------------------------------------------------------------------
//
// encode: bitcode -> lz4 (payloads above COMPRESS_THRESHOLD) -> header
// decode: header check -> lz4 (if flagged) -> bitcode -> version check

use crate::file_header::{unwrap_header, wrap_with_header, FLAG_COMPRESSED};
use crate::progress_file::{ProgressFile, CURRENT_PROGRESS_VERSION};
use crate::save_error::SaveError;

/// Payloads smaller than this are stored uncompressed.
pub const COMPRESS_THRESHOLD: usize = 1024;

pub fn encode_progress(file: &ProgressFile) -> Vec<u8> {
    let encoded = bitcode::encode(file);
    if encoded.len() < COMPRESS_THRESHOLD {
        return wrap_with_header(&encoded, 0, encoded.len());
    }
    let compressed = lz4_flex::compress_prepend_size(&encoded);
    wrap_with_header(&compressed, FLAG_COMPRESSED, encoded.len())
}

pub fn decode_progress(bytes: &[u8]) -> Result<ProgressFile, SaveError> {
    if bytes.is_empty() {
        return Err(SaveError::NoData);
    }
    let (header, payload) = unwrap_header(bytes)?;
    let decompressed;
    let raw = if header.is_compressed() {
        decompressed = lz4_flex::decompress_size_prepended(payload)
            .map_err(|e| SaveError::Decode(format!("lz4: {e}")))?;
        decompressed.as_slice()
    } else {
        payload
    };
    if raw.len() != header.uncompressed_size as usize {
        return Err(SaveError::Corrupted(format!(
            "payload is {} bytes, header says {}",
            raw.len(),
            header.uncompressed_size
        )));
    }

    let file: ProgressFile = bitcode::decode(raw)?;
    if file.version > CURRENT_PROGRESS_VERSION {
        return Err(SaveError::VersionMismatch {
            expected_max: CURRENT_PROGRESS_VERSION,
            found: file.version,
        });
    }
    Ok(file)
}
