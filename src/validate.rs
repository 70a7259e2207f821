//! Cheap checks on raw downloaded bytes.
//!
//! Both checks are pure and allocation-free so they can run on every attempt
//! before any parsing happens.

/// PDF magic bytes.
pub const PDF_SIGNATURE: &[u8] = b"%PDF-";

/// Leading window searched for [`PDF_SIGNATURE`]. PDFs may carry a preamble.
pub const SIGNATURE_WINDOW: usize = 1024;

/// True iff `%PDF-` occurs within the first 1024 bytes.
pub fn validate_signature(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(SIGNATURE_WINDOW)];
    head.windows(PDF_SIGNATURE.len())
        .any(|window| window == PDF_SIGNATURE)
}

/// True iff `bytes.len() <= max_bytes`.
pub fn validate_size(bytes: &[u8], max_bytes: u64) -> bool {
    bytes.len() as u64 <= max_bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_at_start() {
        assert!(validate_signature(b"%PDF-1.4\n..."));
    }

    #[test]
    fn signature_missing() {
        assert!(!validate_signature(b"<html>...</html>"));
        assert!(!validate_signature(b""));
        assert!(!validate_signature(b"%PDF"));
    }

    #[test]
    fn signature_after_preamble() {
        assert!(validate_signature(b"junk\n%PDF-1.4"));
    }

    #[test]
    fn signature_window_boundary() {
        // Signature ends exactly at byte 1024.
        let mut inside = vec![b' '; SIGNATURE_WINDOW - PDF_SIGNATURE.len()];
        inside.extend_from_slice(PDF_SIGNATURE);
        assert!(validate_signature(&inside));

        // Signature straddles the window edge.
        let mut straddling = vec![b' '; SIGNATURE_WINDOW - 2];
        straddling.extend_from_slice(PDF_SIGNATURE);
        assert!(!validate_signature(&straddling));

        let mut outside = vec![b' '; SIGNATURE_WINDOW];
        outside.extend_from_slice(PDF_SIGNATURE);
        assert!(!validate_signature(&outside));
    }

    #[test]
    fn size_boundary() {
        let max = 64;
        assert!(validate_size(&vec![0u8; max], max as u64));
        assert!(!validate_size(&vec![0u8; max + 1], max as u64));
        assert!(validate_size(&[], 0));
    }
}
