//! Format information recovery from the sampled module matrix.

use crate::error::{ProbeError, Result};
use crate::models::{BitGrid, EcLevel, FormatMetadata};

/// Design tolerance of the (15,5) BCH-like format code
const MAX_FORMAT_DISTANCE: u32 = 3;

/// All 32 valid masked format codewords, ordered by their 5 data bits
///
/// The two EC indicator bits run M (00), L (01), H (10), Q (11), with mask
/// patterns 0-7 inside each group. Nearest-match ties resolve to the first
/// entry in this order.
const FORMAT_TABLE: [(u16, EcLevel, u8); 32] = [
    (0x5412, EcLevel::M, 0),
    (0x5125, EcLevel::M, 1),
    (0x5E7C, EcLevel::M, 2),
    (0x5B4B, EcLevel::M, 3),
    (0x45F9, EcLevel::M, 4),
    (0x40CE, EcLevel::M, 5),
    (0x4F97, EcLevel::M, 6),
    (0x4AA0, EcLevel::M, 7),
    (0x77C4, EcLevel::L, 0),
    (0x72F3, EcLevel::L, 1),
    (0x7DAA, EcLevel::L, 2),
    (0x789D, EcLevel::L, 3),
    (0x662F, EcLevel::L, 4),
    (0x6318, EcLevel::L, 5),
    (0x6C41, EcLevel::L, 6),
    (0x6976, EcLevel::L, 7),
    (0x1689, EcLevel::H, 0),
    (0x13BE, EcLevel::H, 1),
    (0x1CE7, EcLevel::H, 2),
    (0x19D0, EcLevel::H, 3),
    (0x0762, EcLevel::H, 4),
    (0x0255, EcLevel::H, 5),
    (0x0D0C, EcLevel::H, 6),
    (0x083B, EcLevel::H, 7),
    (0x355F, EcLevel::Q, 0),
    (0x3068, EcLevel::Q, 1),
    (0x3F31, EcLevel::Q, 2),
    (0x3A06, EcLevel::Q, 3),
    (0x24B4, EcLevel::Q, 4),
    (0x2183, EcLevel::Q, 5),
    (0x2EDA, EcLevel::Q, 6),
    (0x2BED, EcLevel::Q, 7),
];

/// Module positions of the copy wrapping the top-left finder pattern
///
/// Row 8 left to right skipping the timing column, then column 8 bottom to
/// top skipping the timing row; MSB first.
pub(crate) fn primary_positions() -> [(usize, usize); 15] {
    [
        (0, 8),
        (1, 8),
        (2, 8),
        (3, 8),
        (4, 8),
        (5, 8),
        (7, 8),
        (8, 8),
        (8, 7),
        (8, 5),
        (8, 4),
        (8, 3),
        (8, 2),
        (8, 1),
        (8, 0),
    ]
}

/// Module positions of the copy split across the bottom-left and top-right
/// finder patterns; MSB first
pub(crate) fn secondary_positions(dimension: usize) -> [(usize, usize); 15] {
    let mut positions = [(0, 0); 15];
    for (i, pos) in positions.iter_mut().take(7).enumerate() {
        *pos = (8, dimension - 1 - i);
    }
    for (i, pos) in positions.iter_mut().skip(7).enumerate() {
        *pos = (dimension - 8 + i, 8);
    }
    positions
}

fn read_field(matrix: &BitGrid, positions: &[(usize, usize); 15]) -> u16 {
    let mut bits = 0u16;
    for &(x, y) in positions {
        bits = (bits << 1) | matrix.get(x, y) as u16;
    }
    bits
}

/// Recover error correction level and mask pattern from the two redundant
/// 15-bit format fields
///
/// An exact table match on either field short-circuits. Otherwise the
/// globally closest codeword over both fields wins, accepted up to Hamming
/// distance 3; beyond that the format information is unrecoverable.
pub fn read_format_info(matrix: &BitGrid) -> Result<FormatMetadata> {
    let dimension = matrix.width();
    let primary = read_field(matrix, &primary_positions());
    let secondary = read_field(matrix, &secondary_positions(dimension));

    for &(codeword, ec_level, data_mask) in &FORMAT_TABLE {
        if codeword == primary || codeword == secondary {
            return Ok(FormatMetadata {
                ec_level,
                data_mask,
                hamming_distance: 0,
            });
        }
    }

    let mut best: Option<(FormatMetadata, u32)> = None;
    for &(codeword, ec_level, data_mask) in &FORMAT_TABLE {
        for observed in [primary, secondary] {
            let distance = (codeword ^ observed).count_ones();
            if best.is_none_or(|(_, best_distance)| distance < best_distance) {
                best = Some((
                    FormatMetadata {
                        ec_level,
                        data_mask,
                        hamming_distance: distance,
                    },
                    distance,
                ));
            }
        }
    }

    match best {
        Some((metadata, distance)) if distance <= MAX_FORMAT_DISTANCE => Ok(metadata),
        Some((_, distance)) => Err(ProbeError::FormatInfoUnrecoverable {
            best_distance: distance,
        }),
        None => unreachable!("format table is never empty"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_field(matrix: &mut BitGrid, positions: &[(usize, usize); 15], codeword: u16) {
        for (i, &(x, y)) in positions.iter().enumerate() {
            matrix.set(x, y, (codeword >> (14 - i)) & 1 == 1);
        }
    }

    fn matrix_with_format(codeword: u16) -> BitGrid {
        let mut matrix = BitGrid::new(21, 21);
        write_field(&mut matrix, &primary_positions(), codeword);
        write_field(&mut matrix, &secondary_positions(21), codeword);
        matrix
    }

    #[test]
    fn test_all_codewords_recover_exactly() {
        for &(codeword, ec_level, data_mask) in &FORMAT_TABLE {
            let matrix = matrix_with_format(codeword);
            let meta = read_format_info(&matrix).unwrap();
            assert_eq!(meta.ec_level, ec_level);
            assert_eq!(meta.data_mask, data_mask);
            assert_eq!(meta.hamming_distance, 0);
        }
    }

    #[test]
    fn test_three_corruptions_recover() {
        // BCH(15,5) has minimum distance 7, so any 3 flips stay closest to
        // the original codeword.
        for &(codeword, ec_level, data_mask) in &FORMAT_TABLE {
            for flips in [0b111u16, 0b100_0000_0100_0001, 0b110_0000_0000_0001] {
                let corrupted = codeword ^ flips;
                let mut matrix = BitGrid::new(21, 21);
                write_field(&mut matrix, &primary_positions(), corrupted);
                write_field(&mut matrix, &secondary_positions(21), corrupted);
                let meta = read_format_info(&matrix).unwrap();
                assert_eq!(meta.ec_level, ec_level, "codeword {codeword:#06x}");
                assert_eq!(meta.data_mask, data_mask);
                assert_eq!(meta.hamming_distance, 3);
            }
        }
    }

    #[test]
    fn test_exact_secondary_overrides_corrupt_primary() {
        let (codeword, ec_level, data_mask) = FORMAT_TABLE[5];
        let mut matrix = BitGrid::new(21, 21);
        write_field(&mut matrix, &primary_positions(), codeword ^ 0x001F);
        write_field(&mut matrix, &secondary_positions(21), codeword);
        let meta = read_format_info(&matrix).unwrap();
        assert_eq!(meta.ec_level, ec_level);
        assert_eq!(meta.data_mask, data_mask);
        assert_eq!(meta.hamming_distance, 0);
    }

    #[test]
    fn test_four_flips_toward_a_neighbor_decode_as_the_neighbor() {
        // Pick two codewords at distance exactly 7 and flip 4 of the
        // differing bits: the result sits at distance 4 from the original
        // and 3 from the neighbor.
        let mut pair = None;
        'outer: for (i, &(a, ..)) in FORMAT_TABLE.iter().enumerate() {
            for &(b, level, mask) in &FORMAT_TABLE[i + 1..] {
                if (a ^ b).count_ones() == 7 {
                    pair = Some((a, b, level, mask));
                    break 'outer;
                }
            }
        }
        let (a, b, level, mask) = pair.expect("table holds codewords at distance 7");

        let mut corrupted = a;
        let mut remaining = 4;
        for bit in 0..15 {
            if remaining > 0 && (a ^ b) >> bit & 1 == 1 {
                corrupted ^= 1 << bit;
                remaining -= 1;
            }
        }

        let matrix = matrix_with_format(corrupted);
        let meta = read_format_info(&matrix).unwrap();
        assert_eq!(meta.ec_level, level);
        assert_eq!(meta.data_mask, mask);
        assert_eq!(meta.hamming_distance, 3);
    }

    #[test]
    fn test_unrecoverable_fields_fail() {
        // Both copies read all-set; the nearest codeword is farther than
        // the tolerance.
        let mut matrix = BitGrid::new(21, 21);
        write_field(&mut matrix, &primary_positions(), 0x7FFF);
        write_field(&mut matrix, &secondary_positions(21), 0x7FFF);
        let err = read_format_info(&matrix).unwrap_err();
        assert!(matches!(
            err,
            ProbeError::FormatInfoUnrecoverable { best_distance } if best_distance > 3
        ));
    }
}
