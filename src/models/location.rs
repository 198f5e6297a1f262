use serde::{Deserialize, Serialize};

use super::point::Point;
use super::report::SegmentMode;

/// Position of a located symbol in image space
///
/// The three finder-pattern centers plus the bottom-right alignment point
/// define the perspective of the symbol; `dimension` is its module count
/// per side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SymbolLocation {
    /// Top-left finder pattern center
    pub top_left: Point,
    /// Top-right finder pattern center
    pub top_right: Point,
    /// Bottom-left finder pattern center
    pub bottom_left: Point,
    /// Bottom-right alignment pattern center (6.5 modules in from the corner)
    pub alignment: Point,
    /// Modules per side, 17 + 4 * version
    pub dimension: usize,
}

impl SymbolLocation {
    /// Build a location for a known version
    pub fn for_version(
        top_left: Point,
        top_right: Point,
        bottom_left: Point,
        alignment: Point,
        version: u8,
    ) -> Self {
        Self {
            top_left,
            top_right,
            bottom_left,
            alignment,
            dimension: 17 + 4 * version as usize,
        }
    }
}

/// One decoded payload chunk handed over by the upstream decoder
///
/// Chunks line up index-for-index with the segment list this crate computes;
/// an ECI designator occupies one slot on both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalChunk {
    /// Encoding mode the upstream decoder assigned
    pub mode: SegmentMode,
    /// Decoded text, for modes the decoder rendered as a string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Raw decoded bytes, for byte-mode chunks without a text rendering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes: Option<Vec<u8>>,
    /// ECI assignment number, on ECI chunks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eci: Option<u32>,
}

/// Everything the upstream localization/decoding collaborator supplies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocatedSymbol {
    /// Symbol version, 1-40
    pub version: u8,
    /// Corner geometry in image space
    pub location: SymbolLocation,
    /// Error-corrected data codewords
    pub data_codewords: Vec<u8>,
    /// Decoded chunks, positionally aligned with the segment stream
    #[serde(default)]
    pub chunks: Vec<ExternalChunk>,
}
