//! # Padding Schemes
//!
//! Reversible padding of the final plaintext fragment to a multiple of the
//! block size.
//!
//! `pad` always grows the input — when the data is already block-aligned a
//! full block of padding is appended — so `unpad` is never ambiguous about
//! whether padding exists. The one documented exception is ZEROS, which
//! cannot distinguish pad bytes from trailing zero plaintext: its `unpad`
//! strips every trailing zero byte and must not be used where trailing
//! zeros are meaningful.
//!
//! A malformed pad pattern surfaces as
//! [`Error::PaddingValidationFailure`](crate::error::Error) — in practice a
//! wrong key or corrupted ciphertext, and terminal for the stream.

use rand::RngCore;

use crate::crypto::block::BLOCK_SIZE;
use crate::error::{Error, Result};
use crate::suite::PaddingKind;

/// Pad `data` to the next multiple of [`BLOCK_SIZE`]
///
/// The result is always strictly longer than the input.
pub fn pad(kind: PaddingKind, data: &[u8]) -> Vec<u8> {
    let pad_len = BLOCK_SIZE - data.len() % BLOCK_SIZE;
    let mut out = Vec::with_capacity(data.len() + pad_len);
    out.extend_from_slice(data);

    match kind {
        PaddingKind::Zeros => {
            out.resize(data.len() + pad_len, 0);
        }
        PaddingKind::Pkcs7 => {
            out.resize(data.len() + pad_len, pad_len as u8);
        }
        PaddingKind::AnsiX923 => {
            out.resize(data.len() + pad_len - 1, 0);
            out.push(pad_len as u8);
        }
        PaddingKind::Iso10126 => {
            let mut fill = vec![0u8; pad_len - 1];
            rand::rngs::OsRng.fill_bytes(&mut fill);
            out.extend_from_slice(&fill);
            out.push(pad_len as u8);
        }
    }
    out
}

/// Remove padding added by [`pad`] with the same scheme
pub fn unpad(kind: PaddingKind, data: &[u8]) -> Result<Vec<u8>> {
    if data.is_empty() || data.len() % BLOCK_SIZE != 0 {
        return Err(Error::PaddingValidationFailure(format!(
            "padded length {} is not a positive block multiple",
            data.len()
        )));
    }

    match kind {
        PaddingKind::Zeros => {
            // Lossy by design: trailing zero plaintext bytes are stripped too
            let end = data
                .iter()
                .rposition(|&b| b != 0)
                .map(|i| i + 1)
                .unwrap_or(0);
            Ok(data[..end].to_vec())
        }
        PaddingKind::Pkcs7 => {
            let pad_len = check_pad_len(data)?;
            let body = data.len() - pad_len;
            if data[body..].iter().any(|&b| b != pad_len as u8) {
                return Err(Error::PaddingValidationFailure(
                    "PKCS7 pad bytes do not all equal the pad length".into(),
                ));
            }
            Ok(data[..body].to_vec())
        }
        PaddingKind::AnsiX923 => {
            let pad_len = check_pad_len(data)?;
            let body = data.len() - pad_len;
            if data[body..data.len() - 1].iter().any(|&b| b != 0) {
                return Err(Error::PaddingValidationFailure(
                    "ANSI X9.23 fill bytes are not zero".into(),
                ));
            }
            Ok(data[..body].to_vec())
        }
        PaddingKind::Iso10126 => {
            // Fill bytes are random; only the length byte is checked
            let pad_len = check_pad_len(data)?;
            Ok(data[..data.len() - pad_len].to_vec())
        }
    }
}

/// Validate the trailing length byte shared by the length-terminated schemes
fn check_pad_len(data: &[u8]) -> Result<usize> {
    let pad_len = data[data.len() - 1] as usize;
    if pad_len == 0 || pad_len > BLOCK_SIZE || pad_len > data.len() {
        return Err(Error::PaddingValidationFailure(format!(
            "pad length byte {pad_len} out of range"
        )));
    }
    Ok(pad_len)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KINDS: [PaddingKind; 4] = [
        PaddingKind::Zeros,
        PaddingKind::Pkcs7,
        PaddingKind::AnsiX923,
        PaddingKind::Iso10126,
    ];

    #[test]
    fn test_round_trip_every_length() {
        for kind in ALL_KINDS {
            for len in 0..=4 * BLOCK_SIZE {
                // Non-zero fill so ZEROS stripping stays unambiguous
                let data: Vec<u8> = (0..len).map(|i| (i % 255) as u8 + 1).collect();
                let padded = pad(kind, &data);

                assert_eq!(padded.len() % BLOCK_SIZE, 0, "{kind:?} len {len}");
                assert!(padded.len() > data.len(), "{kind:?} len {len}");

                let unpadded = unpad(kind, &padded).unwrap();
                assert_eq!(unpadded, data, "{kind:?} len {len}");
            }
        }
    }

    #[test]
    fn test_aligned_input_gets_full_block() {
        for kind in ALL_KINDS {
            let data = [1u8; BLOCK_SIZE];
            assert_eq!(pad(kind, &data).len(), 2 * BLOCK_SIZE);
        }
    }

    #[test]
    fn test_pkcs7_pattern() {
        let padded = pad(PaddingKind::Pkcs7, &[0xFFu8; 13]);
        assert_eq!(&padded[13..], &[3, 3, 3]);
    }

    #[test]
    fn test_ansi_x923_pattern() {
        let padded = pad(PaddingKind::AnsiX923, &[0xFFu8; 13]);
        assert_eq!(&padded[13..], &[0, 0, 3]);
    }

    #[test]
    fn test_pkcs7_rejects_inconsistent_bytes() {
        let mut padded = pad(PaddingKind::Pkcs7, b"hello");
        let fill_start = padded.len() - 4;
        padded[fill_start] ^= 1;
        assert!(matches!(
            unpad(PaddingKind::Pkcs7, &padded),
            Err(Error::PaddingValidationFailure(_))
        ));
    }

    #[test]
    fn test_ansi_x923_rejects_nonzero_fill() {
        let mut padded = pad(PaddingKind::AnsiX923, b"hello");
        let fill_start = padded.len() - 4;
        padded[fill_start] = 0x77;
        assert!(matches!(
            unpad(PaddingKind::AnsiX923, &padded),
            Err(Error::PaddingValidationFailure(_))
        ));
    }

    #[test]
    fn test_length_byte_out_of_range_rejected() {
        let mut padded = pad(PaddingKind::Pkcs7, b"hello");
        let last = padded.len() - 1;
        padded[last] = 0;
        assert!(unpad(PaddingKind::Pkcs7, &padded).is_err());
        padded[last] = (BLOCK_SIZE + 1) as u8;
        assert!(unpad(PaddingKind::Pkcs7, &padded).is_err());
    }

    #[test]
    fn test_unpad_rejects_misaligned_input() {
        assert!(unpad(PaddingKind::Pkcs7, &[1u8; 17]).is_err());
        assert!(unpad(PaddingKind::Zeros, &[]).is_err());
    }

    #[test]
    fn test_zeros_is_documented_lossy() {
        // Trailing zero plaintext bytes are stripped along with the pad
        let data = [1u8, 2, 0, 0];
        let padded = pad(PaddingKind::Zeros, &data);
        assert_eq!(unpad(PaddingKind::Zeros, &padded).unwrap(), vec![1u8, 2]);
    }

    #[test]
    fn test_empty_input_round_trip() {
        for kind in ALL_KINDS {
            let padded = pad(kind, &[]);
            assert_eq!(padded.len(), BLOCK_SIZE);
            assert_eq!(unpad(kind, &padded).unwrap(), Vec::<u8>::new());
        }
    }
}
