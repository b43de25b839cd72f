//! DICOM tag and value representation definitions.
//!
//! This module defines the vocabulary for element parsing:
//! - Tags that identify the attributes needed for geometry and pixel decoding
//! - Value representations, which decide how an element's length is encoded
//!
//! Only the attributes this crate reads are named here. Every other element is
//! parsed structurally and kept by tag.

use std::fmt;

// =============================================================================
// Tag
// =============================================================================

/// A (group, element) pair identifying an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag {
    pub group: u16,
    pub element: u16,
}

impl Tag {
    pub const fn new(group: u16, element: u16) -> Self {
        Self { group, element }
    }

    /// Whether this tag belongs to the file meta information group.
    #[inline]
    pub const fn is_meta(self) -> bool {
        self.group == FILE_META_GROUP
    }

    /// Item and delimitation tags, which carry no VR in any encoding.
    #[inline]
    pub const fn is_delimiter(self) -> bool {
        self.group == 0xFFFE
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:04X},{:04X})", self.group, self.element)
    }
}

/// Group of the file meta information elements.
pub const FILE_META_GROUP: u16 = 0x0002;

/// Group of the identifying elements that usually follow the meta group.
pub const IDENTIFYING_GROUP: u16 = 0x0008;

/// Named tags read by this crate.
pub mod tags {
    use super::Tag;

    // -------------------------------------------------------------------------
    // File Meta Information
    // -------------------------------------------------------------------------
    pub const FILE_META_GROUP_LENGTH: Tag = Tag::new(0x0002, 0x0000);
    pub const TRANSFER_SYNTAX_UID: Tag = Tag::new(0x0002, 0x0010);

    // -------------------------------------------------------------------------
    // Acquisition
    // -------------------------------------------------------------------------
    pub const SLICE_THICKNESS: Tag = Tag::new(0x0018, 0x0050);
    pub const SPACING_BETWEEN_SLICES: Tag = Tag::new(0x0018, 0x0088);
    pub const IMAGER_PIXEL_SPACING: Tag = Tag::new(0x0018, 0x1164);
    pub const NOMINAL_SCANNED_PIXEL_SPACING: Tag = Tag::new(0x0018, 0x2010);

    // -------------------------------------------------------------------------
    // Image Plane
    // -------------------------------------------------------------------------
    pub const IMAGE_POSITION_PATIENT: Tag = Tag::new(0x0020, 0x0032);
    pub const IMAGE_ORIENTATION_PATIENT: Tag = Tag::new(0x0020, 0x0037);
    pub const PLANE_POSITION_SEQUENCE: Tag = Tag::new(0x0020, 0x9113);
    pub const PLANE_ORIENTATION_SEQUENCE: Tag = Tag::new(0x0020, 0x9116);

    // -------------------------------------------------------------------------
    // Image Pixel
    // -------------------------------------------------------------------------
    pub const SAMPLES_PER_PIXEL: Tag = Tag::new(0x0028, 0x0002);
    pub const PLANAR_CONFIGURATION: Tag = Tag::new(0x0028, 0x0006);
    pub const NUMBER_OF_FRAMES: Tag = Tag::new(0x0028, 0x0008);
    pub const ROWS: Tag = Tag::new(0x0028, 0x0010);
    pub const COLUMNS: Tag = Tag::new(0x0028, 0x0011);
    pub const PIXEL_SPACING: Tag = Tag::new(0x0028, 0x0030);
    pub const BITS_ALLOCATED: Tag = Tag::new(0x0028, 0x0100);
    pub const PIXEL_REPRESENTATION: Tag = Tag::new(0x0028, 0x0103);
    pub const RESCALE_INTERCEPT: Tag = Tag::new(0x0028, 0x1052);
    pub const RESCALE_SLOPE: Tag = Tag::new(0x0028, 0x1053);
    pub const PIXEL_MEASURES_SEQUENCE: Tag = Tag::new(0x0028, 0x9110);
    pub const PIXEL_VALUE_TRANSFORMATION_SEQUENCE: Tag = Tag::new(0x0028, 0x9145);

    // -------------------------------------------------------------------------
    // Private: Philips number of cardiac phases
    // -------------------------------------------------------------------------
    pub const PHASE_COUNT: Tag = Tag::new(0x2001, 0x1017);

    // -------------------------------------------------------------------------
    // Multi-frame Functional Groups
    // -------------------------------------------------------------------------
    pub const SHARED_FUNCTIONAL_GROUPS: Tag = Tag::new(0x5200, 0x9229);
    pub const PER_FRAME_FUNCTIONAL_GROUPS: Tag = Tag::new(0x5200, 0x9230);

    // -------------------------------------------------------------------------
    // Pixel Data
    // -------------------------------------------------------------------------
    pub const FLOAT_PIXEL_DATA: Tag = Tag::new(0x7FE0, 0x0008);
    pub const DOUBLE_FLOAT_PIXEL_DATA: Tag = Tag::new(0x7FE0, 0x0009);
    pub const PIXEL_DATA: Tag = Tag::new(0x7FE0, 0x0010);

    // -------------------------------------------------------------------------
    // Items and Delimiters
    // -------------------------------------------------------------------------
    pub const ITEM: Tag = Tag::new(0xFFFE, 0xE000);
    pub const ITEM_DELIMITATION: Tag = Tag::new(0xFFFE, 0xE00D);
    pub const SEQUENCE_DELIMITATION: Tag = Tag::new(0xFFFE, 0xE0DD);
}

// =============================================================================
// Value Representations
// =============================================================================

/// Value representation of an element.
///
/// In explicit VR encodings the VR decides the element header layout:
/// short-length VRs are followed by a 2-byte length, everything else by two
/// reserved bytes and a 4-byte length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vr {
    AE,
    AS,
    AT,
    CS,
    DA,
    DS,
    DT,
    FL,
    FD,
    IS,
    LO,
    LT,
    OB,
    OD,
    OF,
    OL,
    OV,
    OW,
    PN,
    SH,
    SL,
    SQ,
    SS,
    ST,
    SV,
    TM,
    UC,
    UI,
    UL,
    UN,
    UR,
    US,
    UT,
    UV,
}

impl Vr {
    /// Parse a two-character VR code.
    ///
    /// Returns `None` for codes that are not defined VRs.
    pub fn from_bytes(code: [u8; 2]) -> Option<Self> {
        let vr = match &code {
            b"AE" => Vr::AE,
            b"AS" => Vr::AS,
            b"AT" => Vr::AT,
            b"CS" => Vr::CS,
            b"DA" => Vr::DA,
            b"DS" => Vr::DS,
            b"DT" => Vr::DT,
            b"FL" => Vr::FL,
            b"FD" => Vr::FD,
            b"IS" => Vr::IS,
            b"LO" => Vr::LO,
            b"LT" => Vr::LT,
            b"OB" => Vr::OB,
            b"OD" => Vr::OD,
            b"OF" => Vr::OF,
            b"OL" => Vr::OL,
            b"OV" => Vr::OV,
            b"OW" => Vr::OW,
            b"PN" => Vr::PN,
            b"SH" => Vr::SH,
            b"SL" => Vr::SL,
            b"SQ" => Vr::SQ,
            b"SS" => Vr::SS,
            b"ST" => Vr::ST,
            b"SV" => Vr::SV,
            b"TM" => Vr::TM,
            b"UC" => Vr::UC,
            b"UI" => Vr::UI,
            b"UL" => Vr::UL,
            b"UN" => Vr::UN,
            b"UR" => Vr::UR,
            b"US" => Vr::US,
            b"UT" => Vr::UT,
            b"UV" => Vr::UV,
            _ => return None,
        };
        Some(vr)
    }

    /// Whether the preamble heuristic treats this VR as having a 2-byte length.
    ///
    /// This is the detector's fixed whitelist, which is narrower than the
    /// full short-length class (`LT` is absent). Anything outside the list
    /// is scanned with the reserved-bytes-plus-u32 layout.
    pub const fn is_detector_short_length(self) -> bool {
        matches!(
            self,
            Vr::AE
                | Vr::AS
                | Vr::AT
                | Vr::CS
                | Vr::DA
                | Vr::DS
                | Vr::DT
                | Vr::FL
                | Vr::FD
                | Vr::IS
                | Vr::LO
                | Vr::PN
                | Vr::SH
                | Vr::SL
                | Vr::SS
                | Vr::ST
                | Vr::TM
                | Vr::UI
                | Vr::UL
                | Vr::US
        )
    }

    /// Whether an explicit VR element header uses the reserved-bytes-plus-u32
    /// length layout.
    pub const fn has_long_length(self) -> bool {
        matches!(
            self,
            Vr::OB
                | Vr::OD
                | Vr::OF
                | Vr::OL
                | Vr::OV
                | Vr::OW
                | Vr::SQ
                | Vr::SV
                | Vr::UC
                | Vr::UN
                | Vr::UR
                | Vr::UT
                | Vr::UV
        )
    }

    /// VR implied by the tag when the stream carries no VR (implicit VR).
    ///
    /// Tags this crate does not interpret are treated as `UN`.
    pub fn implicit_for(tag: Tag) -> Self {
        match tag {
            tags::TRANSFER_SYNTAX_UID => Vr::UI,
            tags::SLICE_THICKNESS
            | tags::SPACING_BETWEEN_SLICES
            | tags::IMAGER_PIXEL_SPACING
            | tags::NOMINAL_SCANNED_PIXEL_SPACING
            | tags::IMAGE_POSITION_PATIENT
            | tags::IMAGE_ORIENTATION_PATIENT
            | tags::PIXEL_SPACING
            | tags::RESCALE_INTERCEPT
            | tags::RESCALE_SLOPE => Vr::DS,
            tags::NUMBER_OF_FRAMES => Vr::IS,
            tags::SAMPLES_PER_PIXEL
            | tags::PLANAR_CONFIGURATION
            | tags::ROWS
            | tags::COLUMNS
            | tags::BITS_ALLOCATED
            | tags::PIXEL_REPRESENTATION => Vr::US,
            tags::PHASE_COUNT => Vr::SL,
            tags::PLANE_POSITION_SEQUENCE
            | tags::PLANE_ORIENTATION_SEQUENCE
            | tags::PIXEL_MEASURES_SEQUENCE
            | tags::PIXEL_VALUE_TRANSFORMATION_SEQUENCE
            | tags::SHARED_FUNCTIONAL_GROUPS
            | tags::PER_FRAME_FUNCTIONAL_GROUPS => Vr::SQ,
            tags::FLOAT_PIXEL_DATA => Vr::OF,
            tags::DOUBLE_FLOAT_PIXEL_DATA => Vr::OD,
            tags::PIXEL_DATA => Vr::OW,
            _ => Vr::UN,
        }
    }
}
