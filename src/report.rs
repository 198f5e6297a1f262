//! Report assembly: EC-level reconciliation, segment/chunk pairing and the
//! rendered text form.

use std::fmt;

use tracing::{debug, warn};

use crate::config;
use crate::models::{
    DecodeReport, EcLevel, EcLevelSource, ExternalChunk, FormatMetadata, PaddingSummary,
    SegmentContent, SegmentHalt, SegmentMode, SegmentReport, VersionCapacity,
};

/// Attach upstream-decoded content to the computed segment list
///
/// Chunks pair index-for-index with segments; an ECI designator occupies one
/// slot on both sides, which is what keeps the two lists aligned. A mode
/// mismatch means the lists have drifted apart, so the content is left off
/// rather than attached to the wrong segment.
pub(crate) fn pair_chunks(segments: &mut [SegmentReport], chunks: &[ExternalChunk]) {
    if chunks.len() != segments.len() {
        debug!(
            segments = segments.len(),
            chunks = chunks.len(),
            "segment and chunk counts differ, pairing the shared prefix"
        );
    }
    for (index, (segment, chunk)) in segments.iter_mut().zip(chunks).enumerate() {
        if chunk.mode != segment.mode {
            warn!(
                index,
                segment_mode = %segment.mode,
                chunk_mode = %chunk.mode,
                "chunk mode disagrees with parsed segment, dropping its content"
            );
            continue;
        }
        if segment.mode == SegmentMode::Eci {
            if let (Some(parsed), Some(decoded)) = (segment.eci_assignment, chunk.eci) {
                if parsed != decoded {
                    warn!(index, parsed, decoded, "ECI assignment disagreement");
                }
            }
            continue;
        }
        segment.content = match (&chunk.text, &chunk.bytes) {
            (Some(text), _) => Some(SegmentContent::Text(text.clone())),
            (None, Some(bytes)) => Some(SegmentContent::Bytes(bytes.clone())),
            (None, None) => None,
        };
    }
}

/// Combine the stage outputs into the final report
///
/// The format-information EC level is authoritative; the capacity-table
/// level is the fallback and always supplies the block layout. Disagreement
/// between the two is logged, not fatal.
pub(crate) fn assemble(
    version: u8,
    format: Option<FormatMetadata>,
    capacity: Option<VersionCapacity>,
    segments: Vec<SegmentReport>,
    halt: SegmentHalt,
    padding: PaddingSummary,
) -> DecodeReport {
    let (ec_level, ec_level_source) = match (&format, &capacity) {
        (Some(meta), Some(cap)) => {
            if meta.ec_level != cap.ec_level {
                warn!(
                    format_level = %meta.ec_level,
                    capacity_level = %cap.ec_level,
                    "format info and capacity lookup disagree, keeping the format info level"
                );
            }
            (Some(meta.ec_level), Some(EcLevelSource::FormatInfo))
        }
        (Some(meta), None) => (Some(meta.ec_level), Some(EcLevelSource::FormatInfo)),
        (None, Some(cap)) => (Some(cap.ec_level), Some(EcLevelSource::CapacityTable)),
        (None, None) => (None, None),
    };

    DecodeReport {
        version,
        dimension: 17 + 4 * version as usize,
        format,
        ec_level,
        ec_level_source,
        capacity,
        segments,
        halt,
        padding,
    }
}

fn describe_level(level: EcLevel) -> String {
    format!("{} (~{}% recovery)", level, level.recovery_percent())
}

impl fmt::Display for DecodeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "version: {} ({}x{} modules)",
            self.version, self.dimension, self.dimension
        )?;

        match (self.ec_level, self.ec_level_source) {
            (Some(level), Some(EcLevelSource::FormatInfo)) => writeln!(
                f,
                "error correction: {}, from format info",
                describe_level(level)
            )?,
            (Some(level), Some(EcLevelSource::CapacityTable)) => writeln!(
                f,
                "error correction: {}, from codeword count",
                describe_level(level)
            )?,
            _ => writeln!(f, "error correction: Unknown")?,
        }

        match &self.format {
            Some(meta) => {
                writeln!(f, "data mask: pattern {}", meta.data_mask)?;
                writeln!(f, "format info distance: {}", meta.hamming_distance)?;
            }
            None => writeln!(f, "data mask: Unknown")?,
        }

        match &self.capacity {
            Some(capacity) => {
                let groups: Vec<String> = capacity
                    .groups
                    .iter()
                    .map(|g| {
                        format!(
                            "{} x {} data codewords",
                            g.num_blocks, g.data_codewords_per_block
                        )
                    })
                    .collect();
                writeln!(
                    f,
                    "blocks: {}, {} EC codewords per block",
                    groups.join(" + "),
                    capacity.ec_codewords_per_block
                )?;
            }
            None => writeln!(f, "blocks: Unknown")?,
        }

        writeln!(f, "segments: {}", self.segments.len())?;
        for (index, segment) in self.segments.iter().enumerate() {
            write!(f, "  {}. {}", index + 1, segment.mode)?;
            if let Some(count) = segment.char_count {
                write!(f, ", {count} characters")?;
            }
            if let Some(eci) = segment.eci_assignment {
                write!(f, ", assignment {eci}")?;
            }
            write!(
                f,
                ", {}+{}+{} bits",
                segment.mode_bits, segment.count_bits, segment.payload_bits
            )?;
            match &segment.content {
                Some(SegmentContent::Text(text)) => write!(f, ", {text:?}")?,
                Some(SegmentContent::Bytes(bytes)) => write!(f, ", {} raw bytes", bytes.len())?,
                None => {}
            }
            writeln!(f)?;
        }

        match self.halt {
            SegmentHalt::Terminator => {
                writeln!(f, "terminator: {} bits", self.padding.terminator_bits)?
            }
            SegmentHalt::Exhausted => writeln!(f, "terminator: none, stream exhausted")?,
            SegmentHalt::UnknownMode(nibble) => {
                writeln!(f, "terminator: none, stopped at unknown mode {nibble:04b}")?
            }
            SegmentHalt::Truncated => writeln!(f, "terminator: none, stream truncated mid-segment")?,
        }

        writeln!(
            f,
            "padding: {}/{} bits consumed, {} intra-byte bits, {} pad bits",
            self.padding.bits_consumed,
            self.padding.total_bits,
            self.padding.intra_byte_bits,
            self.padding.pad_bits
        )?;

        if !self.padding.pad_bytes.is_empty() {
            let preview_len = config::pad_preview_len().min(self.padding.pad_bytes.len());
            let preview: Vec<String> = self.padding.pad_bytes[..preview_len]
                .iter()
                .map(|b| format!("{b:02X}"))
                .collect();
            write!(f, "pad bytes: {}", preview.join(" "))?;
            let hidden = self.padding.pad_bytes.len() - preview_len;
            if hidden > 0 {
                write!(f, " (+{hidden} more)")?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn byte_segment(count: usize) -> SegmentReport {
        SegmentReport {
            mode: SegmentMode::Byte,
            char_count: Some(count),
            mode_bits: 4,
            count_bits: 8,
            payload_bits: count * 8,
            eci_assignment: None,
            content: None,
        }
    }

    fn byte_chunk(text: &str) -> ExternalChunk {
        ExternalChunk {
            mode: SegmentMode::Byte,
            text: Some(text.to_string()),
            bytes: None,
            eci: None,
        }
    }

    #[test]
    fn test_pairing_attaches_text() {
        let mut segments = vec![byte_segment(5)];
        pair_chunks(&mut segments, &[byte_chunk("HELLO")]);
        assert_eq!(
            segments[0].content,
            Some(SegmentContent::Text("HELLO".into()))
        );
    }

    #[test]
    fn test_pairing_skips_eci_slot() {
        let mut segments = vec![
            SegmentReport {
                mode: SegmentMode::Eci,
                char_count: None,
                mode_bits: 4,
                count_bits: 0,
                payload_bits: 8,
                eci_assignment: Some(26),
                content: None,
            },
            byte_segment(2),
        ];
        let chunks = vec![
            ExternalChunk {
                mode: SegmentMode::Eci,
                text: None,
                bytes: None,
                eci: Some(26),
            },
            byte_chunk("hi"),
        ];
        pair_chunks(&mut segments, &chunks);
        assert_eq!(segments[0].content, None);
        assert_eq!(segments[1].content, Some(SegmentContent::Text("hi".into())));
    }

    #[test]
    fn test_pairing_mode_mismatch_drops_content() {
        let mut segments = vec![byte_segment(3)];
        let chunks = vec![ExternalChunk {
            mode: SegmentMode::Numeric,
            text: Some("123".into()),
            bytes: None,
            eci: None,
        }];
        pair_chunks(&mut segments, &chunks);
        assert_eq!(segments[0].content, None);
    }

    #[test]
    fn test_format_info_level_wins() {
        let format = FormatMetadata {
            ec_level: EcLevel::M,
            data_mask: 2,
            hamming_distance: 0,
        };
        let capacity = crate::decoder::tables::version_capacity(1, EcLevel::L).unwrap();
        let padding = crate::decoder::segments::padding_summary(&[], 0, 0);
        let report = assemble(
            1,
            Some(format),
            Some(capacity),
            Vec::new(),
            SegmentHalt::Exhausted,
            padding,
        );
        assert_eq!(report.ec_level, Some(EcLevel::M));
        assert_eq!(report.ec_level_source, Some(EcLevelSource::FormatInfo));
    }

    #[test]
    fn test_capacity_fallback_when_format_missing() {
        let capacity = crate::decoder::tables::version_capacity(1, EcLevel::Q).unwrap();
        let padding = crate::decoder::segments::padding_summary(&[], 0, 0);
        let report = assemble(
            1,
            None,
            Some(capacity),
            Vec::new(),
            SegmentHalt::Exhausted,
            padding,
        );
        assert_eq!(report.ec_level, Some(EcLevel::Q));
        assert_eq!(report.ec_level_source, Some(EcLevelSource::CapacityTable));
        assert!(report.format.is_none());
    }

    #[test]
    fn test_rendered_report_marks_unknowns() {
        let padding = crate::decoder::segments::padding_summary(&[0xEC; 4], 0, 0);
        let report = assemble(2, None, None, Vec::new(), SegmentHalt::Exhausted, padding);
        let text = report.to_string();
        assert!(text.contains("version: 2 (25x25 modules)"));
        assert!(text.contains("error correction: Unknown"));
        assert!(text.contains("data mask: Unknown"));
        assert!(text.contains("blocks: Unknown"));
        assert!(text.contains("pad bytes: EC EC EC EC"));
    }
}
