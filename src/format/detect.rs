//! Format detection for DICOM files.
//!
//! Two independent signals decide whether a byte stream is DICOM:
//!
//! - **Element heuristic**: the stream opens directly with well-formed
//!   explicit VR elements from the file meta group, followed by an element
//!   from the identifying group. This accepts files written without the
//!   128-byte preamble and magic.
//! - **Part 10 magic**: `DICM` at offset 128, after the preamble.
//!
//! The heuristic always runs first, since files lacking the magic are exactly
//! the ones it exists for.

use std::io::{self, Read};

use tracing::{debug, trace};

use crate::error::MalformedStream;

use super::dicom::{Vr, FILE_META_GROUP, IDENTIFYING_GROUP};

// =============================================================================
// DicomFormat
// =============================================================================

/// How a DICOM file announces itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DicomFormat {
    /// Standard Part 10 file: 128-byte preamble followed by `DICM`
    Part10,

    /// Element stream starting at offset 0, without preamble or magic
    NoPreamble,
}

impl DicomFormat {
    /// Get a human-readable name for the format.
    pub const fn name(&self) -> &'static str {
        match self {
            DicomFormat::Part10 => "DICOM Part 10",
            DicomFormat::NoPreamble => "DICOM (no preamble)",
        }
    }
}

// =============================================================================
// Constants
// =============================================================================

/// Length of the Part 10 preamble that precedes the magic.
pub const PREAMBLE_LENGTH: usize = 128;

/// Part 10 magic bytes.
pub const DICOM_MAGIC: &[u8; 4] = b"DICM";

// =============================================================================
// Element Heuristic
// =============================================================================

/// Check whether a stream opens with a plausible run of DICOM elements.
///
/// Bytes are consumed from `reader`. The caller must rewind or reopen the
/// stream before parsing it for real, and must not call this twice on the
/// same stream without doing so.
///
/// Malformed input never produces an error: any inconsistency simply yields
/// `false`.
pub fn is_likely_dicom<R: Read>(reader: R) -> bool {
    match scan_leading_elements(reader) {
        Ok(()) => {
            debug!("No DICOM magic found, but the stream looks like DICOM without a preamble");
            true
        }
        Err(reason) => {
            trace!("Element heuristic rejected stream: {}", reason);
            false
        }
    }
}

/// Walk the leading elements until the file meta group ends.
///
/// Succeeds once an element from a group other than the meta group has been
/// read and skipped in full.
fn scan_leading_elements<R: Read>(mut reader: R) -> Result<(), MalformedStream> {
    loop {
        let mut header = [0u8; 6];
        read_header_bytes(&mut reader, &mut header)?;

        let group = u16::from_le_bytes([header[0], header[1]]);
        if group != FILE_META_GROUP && group != IDENTIFYING_GROUP {
            return Err(MalformedStream::UnexpectedGroup(group));
        }

        let vr = Vr::from_bytes([header[4], header[5]]);
        let length = if vr.is_some_and(Vr::is_detector_short_length) {
            let mut field = [0u8; 2];
            read_header_bytes(&mut reader, &mut field)?;
            i64::from(u16::from_le_bytes(field))
        } else {
            // Two reserved bytes, then a 4-byte length
            let mut field = [0u8; 6];
            read_header_bytes(&mut reader, &mut field)?;
            i64::from(i32::from_le_bytes([field[2], field[3], field[4], field[5]]))
        };

        if length <= 0 {
            return Err(MalformedStream::NonPositiveLength(length));
        }

        // Lengths above i32::MAX were rejected as negative above
        let length = length as u32;
        let skipped = io::copy(&mut (&mut reader).take(u64::from(length)), &mut io::sink())
            .map_err(|_| MalformedStream::TruncatedValue(length))?;
        if skipped < u64::from(length) {
            return Err(MalformedStream::TruncatedValue(length));
        }

        trace!(
            "Skipped element ({:04X},{:04X}) of {} bytes",
            group,
            u16::from_le_bytes([header[2], header[3]]),
            length
        );

        if group != FILE_META_GROUP {
            return Ok(());
        }
    }
}

fn read_header_bytes<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<(), MalformedStream> {
    reader
        .read_exact(buf)
        .map_err(|_| MalformedStream::TruncatedHeader)
}

// =============================================================================
// Part 10 Magic
// =============================================================================

/// Check if bytes carry the Part 10 preamble and `DICM` magic.
pub fn has_dicom_magic(bytes: &[u8]) -> bool {
    bytes.len() >= PREAMBLE_LENGTH + DICOM_MAGIC.len()
        && &bytes[PREAMBLE_LENGTH..PREAMBLE_LENGTH + DICOM_MAGIC.len()] == DICOM_MAGIC
}

/// Check the Part 10 magic, reading no more than the preamble and magic.
pub fn probe_dicom_magic<R: Read>(reader: R) -> bool {
    let probe_length = PREAMBLE_LENGTH + DICOM_MAGIC.len();
    let mut head = Vec::with_capacity(probe_length);
    match reader.take(probe_length as u64).read_to_end(&mut head) {
        Ok(_) => has_dicom_magic(&head),
        Err(e) => {
            trace!("Magic probe failed: {}", e);
            false
        }
    }
}

/// Detect how an in-memory file announces itself as DICOM.
///
/// Returns `None` if neither the element heuristic nor the magic matches.
pub fn detect_format(bytes: &[u8]) -> Option<DicomFormat> {
    if is_likely_dicom(bytes) {
        return Some(DicomFormat::NoPreamble);
    }
    if has_dicom_magic(bytes) {
        return Some(DicomFormat::Part10);
    }
    None
}

// =============================================================================
// Tests
// =============================================================================
