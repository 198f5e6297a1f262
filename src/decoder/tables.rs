//! Error correction capacity tables and the reverse lookup by codeword count.

use crate::error::{ProbeError, Result};
use crate::models::{BlockGroup, EcLevel, VersionCapacity};

// Tables from the QR Code specification (Model 2) via Nayuki QR Code generator.
// Index: [ec_level][version]
const ECC_CODEWORDS_PER_BLOCK: [[i8; 41]; 4] = [
    [
        -1, 7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28,
        30, 30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Low
    [
        -1, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28,
        28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    ], // Medium
    [
        -1, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30,
        30, 30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Quartile
    [
        -1, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24,
        30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // High
];

const NUM_ERROR_CORRECTION_BLOCKS: [[i8; 41]; 4] = [
    [
        -1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12,
        13, 14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25,
    ], // Low
    [
        -1, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21,
        23, 25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49,
    ], // Medium
    [
        -1, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27,
        29, 34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68,
    ], // Quartile
    [
        -1, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32,
        35, 37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81,
    ], // High
];

/// Codewords in the whole symbol (data plus EC), indexed by version
const TOTAL_CODEWORDS: [i16; 41] = [
    -1, 26, 44, 70, 100, 134, 172, 196, 242, 292, 346, 404, 466, 532, 581, 655, 733, 815, 901, 991,
    1085, 1156, 1258, 1364, 1474, 1588, 1706, 1828, 1921, 2051, 2185, 2323, 2465, 2611, 2761, 2876,
    3034, 3196, 3362, 3532, 3706,
];

fn ec_level_index(ec_level: EcLevel) -> usize {
    match ec_level {
        EcLevel::L => 0,
        EcLevel::M => 1,
        EcLevel::Q => 2,
        EcLevel::H => 3,
    }
}

/// Block layout for one (version, EC level) pair
///
/// Block groups are derived arithmetically: `data_total / num_blocks` short
/// blocks first, then `data_total % num_blocks` blocks one codeword longer.
pub fn version_capacity(version: u8, ec_level: EcLevel) -> Option<VersionCapacity> {
    if !(1..=40).contains(&version) {
        return None;
    }
    let idx = ec_level_index(ec_level);
    let ecc_per_block = ECC_CODEWORDS_PER_BLOCK[idx][version as usize] as usize;
    let num_blocks = NUM_ERROR_CORRECTION_BLOCKS[idx][version as usize] as usize;
    let total = TOTAL_CODEWORDS[version as usize] as usize;
    let data_total = total - num_blocks * ecc_per_block;

    let short_len = data_total / num_blocks;
    let num_long_blocks = data_total % num_blocks;
    let num_short_blocks = num_blocks - num_long_blocks;

    let mut groups = Vec::with_capacity(2);
    if num_short_blocks > 0 {
        groups.push(BlockGroup {
            num_blocks: num_short_blocks,
            data_codewords_per_block: short_len,
        });
    }
    if num_long_blocks > 0 {
        groups.push(BlockGroup {
            num_blocks: num_long_blocks,
            data_codewords_per_block: short_len + 1,
        });
    }

    Some(VersionCapacity {
        ec_level,
        ec_codewords_per_block: ecc_per_block,
        groups,
    })
}

/// Reverse lookup of the EC level from an observed data codeword count
///
/// Data codeword totals are unique across the four levels of a version, so
/// an exact count pins down the level. Used to corroborate, or substitute
/// for, the format-information result.
pub fn determine_error_correction(
    version: u8,
    total_data_codewords: usize,
) -> Result<VersionCapacity> {
    for ec_level in [EcLevel::L, EcLevel::M, EcLevel::Q, EcLevel::H] {
        if let Some(capacity) = version_capacity(version, ec_level) {
            if capacity.total_data_codewords() == total_data_codewords {
                return Ok(capacity);
            }
        }
    }
    Err(ProbeError::CapacityLookupFailed {
        version,
        data_codewords: total_data_codewords,
    })
}
