//! Mode-segment parsing of the data codeword bitstream.
//!
//! The parser accounts for every bit each segment consumes but never decodes
//! payload values; decoded content arrives from the upstream decoder and is
//! paired in afterwards.

use super::bits::BitCursor;
use crate::models::{PaddingSummary, SegmentHalt, SegmentMode, SegmentReport};

/// Outcome of one pass over the codeword bitstream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentParse {
    /// Fully parsed segments in stream order
    pub segments: Vec<SegmentReport>,
    /// Bits consumed by complete segments plus any terminator
    pub bits_consumed: usize,
    /// Bits the terminator took, 0 when the stream ended without one
    pub terminator_bits: usize,
    /// Why parsing stopped
    pub halt: SegmentHalt,
}

/// Character count field width for a mode at a version
///
/// Versions beyond 40 are not rejected here; they fall into the widest tier
/// so a bogus upstream version degrades instead of panicking.
fn char_count_bits(mode: SegmentMode, version: u8) -> usize {
    match mode {
        SegmentMode::Numeric => {
            if version <= 9 {
                10
            } else if version <= 26 {
                12
            } else {
                14
            }
        }
        SegmentMode::Alphanumeric => {
            if version <= 9 {
                9
            } else if version <= 26 {
                11
            } else {
                13
            }
        }
        SegmentMode::Byte => {
            if version <= 9 {
                8
            } else {
                16
            }
        }
        SegmentMode::Kanji => {
            if version <= 9 {
                8
            } else if version <= 26 {
                10
            } else {
                12
            }
        }
        SegmentMode::Eci => 0,
    }
}

/// Payload bits a character segment occupies for a declared count
fn payload_bits_for(mode: SegmentMode, char_count: usize) -> usize {
    match mode {
        // 3 digits per 10 bits, then 7 bits for 2 digits or 4 bits for 1
        SegmentMode::Numeric => {
            (char_count / 3) * 10
                + match char_count % 3 {
                    2 => 7,
                    1 => 4,
                    _ => 0,
                }
        }
        // 2 characters per 11 bits, 6 bits for a trailing odd character
        SegmentMode::Alphanumeric => (char_count / 2) * 11 + (char_count % 2) * 6,
        SegmentMode::Byte => char_count * 8,
        SegmentMode::Kanji => char_count * 13,
        SegmentMode::Eci => 0,
    }
}

/// Walk the codeword bitstream and account for every segment
///
/// Stops at an explicit terminator, when fewer than 4 bits remain, on an
/// unknown mode indicator, or when a declared field runs past the end.
/// The last two rewind the partial read so `bits_consumed` covers complete
/// segments only; none of them is an error.
pub fn parse_segments(codewords: &[u8], version: u8) -> SegmentParse {
    let mut cursor = BitCursor::new(codewords);
    let mut segments = Vec::new();
    let mut terminator_bits = 0;
    let mut halt = SegmentHalt::Exhausted;

    while cursor.remaining() >= 4 {
        let mark = cursor.position();
        let Some(nibble) = cursor.read(4) else {
            break;
        };
        let nibble = nibble as u8;

        if nibble == 0 {
            terminator_bits = 4;
            halt = SegmentHalt::Terminator;
            break;
        }

        let Some(mode) = SegmentMode::from_nibble(nibble) else {
            cursor.rewind_to(mark);
            halt = SegmentHalt::UnknownMode(nibble);
            break;
        };

        if mode == SegmentMode::Eci {
            match read_eci(&mut cursor) {
                Some((payload_bits, assignment)) => segments.push(SegmentReport {
                    mode,
                    char_count: None,
                    mode_bits: 4,
                    count_bits: 0,
                    payload_bits,
                    eci_assignment: assignment,
                    content: None,
                }),
                None => {
                    cursor.rewind_to(mark);
                    halt = SegmentHalt::Truncated;
                    break;
                }
            }
            continue;
        }

        let count_bits = char_count_bits(mode, version);
        let Some(char_count) = cursor.read(count_bits) else {
            cursor.rewind_to(mark);
            halt = SegmentHalt::Truncated;
            break;
        };
        let char_count = char_count as usize;

        let payload_bits = payload_bits_for(mode, char_count);
        if cursor.skip(payload_bits).is_none() {
            cursor.rewind_to(mark);
            halt = SegmentHalt::Truncated;
            break;
        }

        segments.push(SegmentReport {
            mode,
            char_count: Some(char_count),
            mode_bits: 4,
            count_bits,
            payload_bits,
            eci_assignment: None,
            content: None,
        });
    }

    SegmentParse {
        segments,
        bits_consumed: cursor.position(),
        terminator_bits,
        halt,
    }
}

/// ECI designator: a capped three-level prefix code
///
/// Prefix 0 carries a 7-bit assignment, 10 a 14-bit one, 110 a 21-bit one.
/// All-ones prefix 111 has no defined fourth tier; its 3 bits are consumed
/// and the assignment stays unresolved. Returns the payload bit count after
/// the mode nibble, or None when the stream ends mid-designator.
fn read_eci(cursor: &mut BitCursor<'_>) -> Option<(usize, Option<u32>)> {
    if cursor.read(1)? == 0 {
        return Some((8, Some(cursor.read(7)?)));
    }
    if cursor.read(1)? == 0 {
        return Some((16, Some(cursor.read(14)?)));
    }
    if cursor.read(1)? == 0 {
        return Some((24, Some(cursor.read(21)?)));
    }
    Some((3, None))
}

/// Padding breakdown for the stream tail after segment parsing
pub fn padding_summary(
    codewords: &[u8],
    bits_consumed: usize,
    terminator_bits: usize,
) -> PaddingSummary {
    let total_bits = codewords.len() * 8;
    let pad_bits = total_bits.saturating_sub(bits_consumed);
    let used_bytes = bits_consumed.div_ceil(8);
    let intra_byte_bits = used_bytes * 8 - bits_consumed;
    let pad_bytes = codewords.get(used_bytes..).unwrap_or_default().to_vec();
    PaddingSummary {
        total_bits,
        bits_consumed,
        terminator_bits,
        pad_bits,
        used_bytes,
        intra_byte_bits,
        pad_bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Byte-mode "HELLO" at version 1 with terminator and standard padding
    fn hello_codewords() -> Vec<u8> {
        vec![
            0x40, 0x54, 0x84, 0x54, 0xC4, 0xC4, 0xF0, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11, 0xEC,
            0x11, 0xEC,
        ]
    }

    #[test]
    fn test_byte_segment_walk() {
        let parse = parse_segments(&hello_codewords(), 1);
        assert_eq!(parse.segments.len(), 1);
        let segment = &parse.segments[0];
        assert_eq!(segment.mode, SegmentMode::Byte);
        assert_eq!(segment.char_count, Some(5));
        assert_eq!(segment.mode_bits, 4);
        assert_eq!(segment.count_bits, 8);
        assert_eq!(segment.payload_bits, 40);
        assert_eq!(parse.terminator_bits, 4);
        assert_eq!(parse.bits_consumed, 56);
        assert_eq!(parse.halt, SegmentHalt::Terminator);
    }

    #[test]
    fn test_padding_accounting() {
        let codewords = hello_codewords();
        let parse = parse_segments(&codewords, 1);
        let padding = padding_summary(&codewords, parse.bits_consumed, parse.terminator_bits);
        assert_eq!(padding.total_bits, 128);
        assert_eq!(padding.bits_consumed, 56);
        assert_eq!(padding.pad_bits, 72);
        assert_eq!(padding.used_bytes, 7);
        assert_eq!(padding.intra_byte_bits, 0);
        assert_eq!(
            padding.pad_bytes,
            vec![0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11, 0xEC]
        );
    }

    #[test]
    fn test_numeric_remainder_widths() {
        // "12345678" is 8 digits: 2 full groups of 3 plus a 2-digit tail.
        assert_eq!(payload_bits_for(SegmentMode::Numeric, 8), 27);
        assert_eq!(payload_bits_for(SegmentMode::Numeric, 7), 24);
        assert_eq!(payload_bits_for(SegmentMode::Numeric, 6), 20);
        // Alphanumeric pairs with an odd tail.
        assert_eq!(payload_bits_for(SegmentMode::Alphanumeric, 5), 28);
        assert_eq!(payload_bits_for(SegmentMode::Alphanumeric, 4), 22);
        assert_eq!(payload_bits_for(SegmentMode::Kanji, 3), 39);
    }

    #[test]
    fn test_numeric_segment_stream() {
        // 0001 | 0000000100 (count 4) | 10 + 4 payload bits | 0000
        // = 4 + 10 + 14 + 4 = 32 bits.
        let codewords = vec![0b0001_0000, 0b0001_0000, 0b0000_0000, 0b0000_0000];
        let parse = parse_segments(&codewords, 1);
        assert_eq!(parse.segments.len(), 1);
        assert_eq!(parse.segments[0].mode, SegmentMode::Numeric);
        assert_eq!(parse.segments[0].char_count, Some(4));
        assert_eq!(parse.segments[0].payload_bits, 14);
        assert_eq!(parse.bits_consumed, 32);
        assert_eq!(parse.halt, SegmentHalt::Terminator);
    }

    #[test]
    fn test_count_width_tiers() {
        assert_eq!(char_count_bits(SegmentMode::Numeric, 9), 10);
        assert_eq!(char_count_bits(SegmentMode::Numeric, 10), 12);
        assert_eq!(char_count_bits(SegmentMode::Numeric, 27), 14);
        assert_eq!(char_count_bits(SegmentMode::Alphanumeric, 26), 11);
        assert_eq!(char_count_bits(SegmentMode::Byte, 9), 8);
        assert_eq!(char_count_bits(SegmentMode::Byte, 10), 16);
        assert_eq!(char_count_bits(SegmentMode::Kanji, 40), 12);
        // Versions past 40 saturate into the widest tier.
        assert_eq!(char_count_bits(SegmentMode::Numeric, 41), 14);
    }

    #[test]
    fn test_eci_single_byte_designator() {
        // 0111 | 0 0011010 (ECI 26, UTF-8) | terminator
        let codewords = vec![0b0111_0001, 0b1010_0000];
        let parse = parse_segments(&codewords, 1);
        assert_eq!(parse.segments.len(), 1);
        let segment = &parse.segments[0];
        assert_eq!(segment.mode, SegmentMode::Eci);
        assert_eq!(segment.char_count, None);
        assert_eq!(segment.payload_bits, 8);
        assert_eq!(segment.eci_assignment, Some(26));
        assert_eq!(parse.bits_consumed, 16);
        assert_eq!(parse.halt, SegmentHalt::Terminator);
    }

    #[test]
    fn test_eci_two_byte_designator() {
        // 0111 | 10 then 14 bits = 1000 (0x3E8)
        let mut bits: u32 = 0;
        bits = (bits << 4) | 0b0111;
        bits = (bits << 2) | 0b10;
        bits = (bits << 14) | 1000;
        // 20 bits so far; pad to 24 with terminator 0000.
        bits <<= 4;
        let codewords = vec![(bits >> 16) as u8, (bits >> 8) as u8, bits as u8];
        let parse = parse_segments(&codewords, 1);
        assert_eq!(parse.segments.len(), 1);
        assert_eq!(parse.segments[0].payload_bits, 16);
        assert_eq!(parse.segments[0].eci_assignment, Some(1000));
        assert_eq!(parse.bits_consumed, 24);
    }

    #[test]
    fn test_eci_unresolved_prefix() {
        // 0111 | 111 -> three prefix bits consumed, assignment unresolved.
        let codewords = vec![0b0111_1110, 0b0000_0000];
        let parse = parse_segments(&codewords, 1);
        assert_eq!(parse.segments.len(), 1);
        assert_eq!(parse.segments[0].payload_bits, 3);
        assert_eq!(parse.segments[0].eci_assignment, None);
        // Parsing continues after the unresolved designator: next nibble is
        // 0000, a terminator.
        assert_eq!(parse.halt, SegmentHalt::Terminator);
        assert_eq!(parse.bits_consumed, 11);
    }

    #[test]
    fn test_unknown_mode_halts_and_rewinds() {
        // Byte segment then structured-append nibble 0011.
        let codewords = vec![0x40, 0x14, 0x13, 0x00];
        let parse = parse_segments(&codewords, 1);
        assert_eq!(parse.segments.len(), 1);
        assert_eq!(parse.segments[0].char_count, Some(1));
        assert_eq!(parse.halt, SegmentHalt::UnknownMode(0b0011));
        // 4 + 8 + 8 bits for the byte segment; the unknown nibble is rewound.
        assert_eq!(parse.bits_consumed, 20);
        assert_eq!(parse.terminator_bits, 0);
    }

    #[test]
    fn test_truncated_payload_rewinds() {
        // Byte mode declaring 200 characters in a 3-byte stream.
        let codewords = vec![0x4C, 0x80, 0x00];
        let parse = parse_segments(&codewords, 1);
        assert!(parse.segments.is_empty());
        assert_eq!(parse.halt, SegmentHalt::Truncated);
        assert_eq!(parse.bits_consumed, 0);
    }

    #[test]
    fn test_exhausted_without_terminator() {
        // 0010 | 000000011 (3 chars) | 17 payload bits leaves only 2 bits,
        // too few for another mode indicator.
        let codewords = vec![0x20, 0x18, 0x00, 0x03];
        let parse = parse_segments(&codewords, 1);
        assert_eq!(parse.segments.len(), 1);
        assert_eq!(parse.segments[0].mode, SegmentMode::Alphanumeric);
        assert_eq!(parse.segments[0].char_count, Some(3));
        assert_eq!(parse.segments[0].payload_bits, 17);
        assert_eq!(parse.bits_consumed, 30);
        assert_eq!(parse.halt, SegmentHalt::Exhausted);
        assert_eq!(parse.terminator_bits, 0);
        let padding = padding_summary(&codewords, parse.bits_consumed, parse.terminator_bits);
        assert_eq!(padding.pad_bits, 2);
        assert_eq!(padding.intra_byte_bits, 2);
        assert_eq!(padding.used_bytes, 4);
        assert!(padding.pad_bytes.is_empty());
    }

    #[test]
    fn test_empty_stream() {
        let parse = parse_segments(&[], 1);
        assert!(parse.segments.is_empty());
        assert_eq!(parse.halt, SegmentHalt::Exhausted);
        assert_eq!(parse.bits_consumed, 0);
        let padding = padding_summary(&[], 0, 0);
        assert_eq!(padding.total_bits, 0);
        assert_eq!(padding.pad_bits, 0);
    }
}
