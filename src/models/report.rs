use std::fmt;

use serde::{Deserialize, Serialize};

/// Error correction level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EcLevel {
    /// Low (~7% recovery capacity)
    L,
    /// Medium (~15% recovery capacity)
    M,
    /// Quartile (~25% recovery capacity)
    Q,
    /// High (~30% recovery capacity)
    H,
}

impl EcLevel {
    /// Nominal recovery capacity in percent
    pub fn recovery_percent(&self) -> u8 {
        match self {
            EcLevel::L => 7,
            EcLevel::M => 15,
            EcLevel::Q => 25,
            EcLevel::H => 30,
        }
    }
}

impl fmt::Display for EcLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EcLevel::L => "L",
            EcLevel::M => "M",
            EcLevel::Q => "Q",
            EcLevel::H => "H",
        };
        f.write_str(label)
    }
}

/// Where the reported error correction level was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EcLevelSource {
    /// Recovered from the 15-bit format information fields
    FormatInfo,
    /// Reverse lookup from the observed data codeword count
    CapacityTable,
}

/// Format information recovered from the two redundant 15-bit fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatMetadata {
    /// Error correction level encoded in the field
    pub ec_level: EcLevel,
    /// Data mask pattern index (0-7)
    pub data_mask: u8,
    /// Hamming distance between the best observed field and its table entry
    pub hamming_distance: u32,
}

/// Encoding mode of one data segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentMode {
    /// Digits 0-9, packed 3 per 10 bits
    Numeric,
    /// The 45-character alphanumeric set, packed 2 per 11 bits
    Alphanumeric,
    /// Raw 8-bit bytes
    Byte,
    /// Shift JIS kanji, 13 bits per character
    Kanji,
    /// Extended Channel Interpretation designator
    Eci,
}

impl SegmentMode {
    /// Map a 4-bit mode indicator to its segment mode
    pub fn from_nibble(bits: u8) -> Option<Self> {
        match bits {
            0b0001 => Some(SegmentMode::Numeric),
            0b0010 => Some(SegmentMode::Alphanumeric),
            0b0100 => Some(SegmentMode::Byte),
            0b1000 => Some(SegmentMode::Kanji),
            0b0111 => Some(SegmentMode::Eci),
            _ => None,
        }
    }
}

impl fmt::Display for SegmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SegmentMode::Numeric => "numeric",
            SegmentMode::Alphanumeric => "alphanumeric",
            SegmentMode::Byte => "byte",
            SegmentMode::Kanji => "kanji",
            SegmentMode::Eci => "eci",
        };
        f.write_str(label)
    }
}

/// Decoded payload attached to a segment from the upstream decoder's chunks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentContent {
    /// Textual content
    Text(String),
    /// Raw byte content
    Bytes(Vec<u8>),
}

/// One parsed mode segment with its exact bit accounting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentReport {
    /// Encoding mode announced by the 4-bit indicator
    pub mode: SegmentMode,
    /// Declared character count, absent for ECI segments
    pub char_count: Option<usize>,
    /// Bits spent on the mode indicator (always 4)
    pub mode_bits: usize,
    /// Bits spent on the character count field
    pub count_bits: usize,
    /// Bits spent on the payload (or the ECI designator)
    pub payload_bits: usize,
    /// ECI assignment number, when the designator resolved one
    pub eci_assignment: Option<u32>,
    /// Decoded content paired in from the upstream decoder
    pub content: Option<SegmentContent>,
}

impl SegmentReport {
    /// Total bits this segment consumed from the stream
    pub fn total_bits(&self) -> usize {
        self.mode_bits + self.count_bits + self.payload_bits
    }
}

/// Why the segment parser stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentHalt {
    /// An explicit 0000 terminator was read
    Terminator,
    /// Fewer than 4 bits remained before a mode indicator
    Exhausted,
    /// A mode indicator that names no known mode
    UnknownMode(u8),
    /// A declared field ran past the end of the stream
    Truncated,
}

/// Bit-level accounting of the stream tail after the data segments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaddingSummary {
    /// Total data bits (codeword count times 8)
    pub total_bits: usize,
    /// Bits consumed by segments plus any terminator
    pub bits_consumed: usize,
    /// Bits spent on the terminator, 0 when none was read
    pub terminator_bits: usize,
    /// Bits left over after the consumed prefix
    pub pad_bits: usize,
    /// Codeword bytes touched by the consumed prefix
    pub used_bytes: usize,
    /// Fill bits completing the last touched byte
    pub intra_byte_bits: usize,
    /// Literal pad byte values after the last touched byte
    pub pad_bytes: Vec<u8>,
}

/// A run of equally sized error correction blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockGroup {
    /// Number of blocks in this group
    pub num_blocks: usize,
    /// Data codewords carried by each block
    pub data_codewords_per_block: usize,
}

/// Error correction geometry for one (version, level) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionCapacity {
    /// Error correction level this layout belongs to
    pub ec_level: EcLevel,
    /// EC codewords appended to every block
    pub ec_codewords_per_block: usize,
    /// Block groups, short blocks first
    pub groups: Vec<BlockGroup>,
}

impl VersionCapacity {
    /// Total data codewords across all block groups
    pub fn total_data_codewords(&self) -> usize {
        self.groups
            .iter()
            .map(|g| g.num_blocks * g.data_codewords_per_block)
            .sum()
    }

    /// Total number of error correction blocks
    pub fn total_blocks(&self) -> usize {
        self.groups.iter().map(|g| g.num_blocks).sum()
    }
}

/// Full structural report for one inspected symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeReport {
    /// Symbol version as claimed by the upstream decoder
    pub version: u8,
    /// Module dimension, 17 + 4 * version
    pub dimension: usize,
    /// Format information, absent when neither field was recoverable
    pub format: Option<FormatMetadata>,
    /// Reconciled error correction level
    pub ec_level: Option<EcLevel>,
    /// Which source the reconciled level came from
    pub ec_level_source: Option<EcLevelSource>,
    /// Block layout matching the observed codeword count
    pub capacity: Option<VersionCapacity>,
    /// Ordered data segments
    pub segments: Vec<SegmentReport>,
    /// Why segment parsing stopped
    pub halt: SegmentHalt,
    /// Terminator, pad bit and pad byte accounting
    pub padding: PaddingSummary,
}
