//! qrprobe - structural QR symbol inspector
//!
//! Given a raw RGBA image and a symbol already located and error-corrected
//! by an upstream decoder, qrprobe reconstructs and explains the symbol's
//! internal structure: format information, error correction block layout,
//! the mode-segment stream and the padding trail. It decodes structure, not
//! content; payload text arrives from the collaborator and is only paired
//! onto the computed segments.
//!
//! The pipeline is synchronous and allocation-per-request: binarize the
//! image, sample the module grid through the corner perspective, recover
//! format information, parse the codeword bitstream and assemble the
//! report. Only a malformed pixel buffer aborts; every other failure
//! degrades to "Unknown" fields in the report.

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Region-adaptive binarization of RGBA buffers
pub mod binarize;
/// Environment-variable knobs
pub mod config;
/// Format info, capacity tables and segment parsing
pub mod decoder;
/// Error taxonomy
pub mod error;
/// Data structures exchanged between stages
pub mod models;
/// Report assembly and rendering
pub mod report;
/// Perspective-correct module sampling
pub mod sample;

pub use error::{ProbeError, Result};
pub use models::{
    BitGrid, DecodeReport, EcLevel, ExternalChunk, LocatedSymbol, PixelBuffer, Point,
    SymbolLocation,
};

use tracing::{debug, warn};

use models::FormatMetadata;

/// Inspect a located symbol together with its source image
///
/// Runs the full pipeline: binarization, module sampling, format
/// information recovery, capacity lookup and segment parsing. Fails only
/// when the pixel buffer does not match its declared dimensions; all other
/// degradations are reported as "Unknown" fields.
pub fn inspect(pixels: PixelBuffer<'_>, symbol: &LocatedSymbol) -> Result<DecodeReport> {
    let grid = binarize::binarize(pixels)?;
    debug!(width = grid.width(), height = grid.height(), "image binarized");

    let modules = sample::extract_modules(&grid, &symbol.location);
    let format = match decoder::format::read_format_info(&modules) {
        Ok(meta) => {
            debug!(
                ec_level = %meta.ec_level,
                data_mask = meta.data_mask,
                distance = meta.hamming_distance,
                "format information recovered"
            );
            Some(meta)
        }
        Err(err) => {
            warn!(%err, "falling back to capacity-derived EC level");
            None
        }
    };

    Ok(analyze(symbol, format))
}

/// Inspect a located symbol without its source image
///
/// Format information lives in the image modules, so it is reported as
/// unknown; everything derived from the codewords is still produced.
pub fn inspect_symbol(symbol: &LocatedSymbol) -> DecodeReport {
    analyze(symbol, None)
}

/// Codeword-side analysis shared by both entry points
fn analyze(symbol: &LocatedSymbol, format: Option<FormatMetadata>) -> DecodeReport {
    let capacity = match decoder::tables::determine_error_correction(
        symbol.version,
        symbol.data_codewords.len(),
    ) {
        Ok(capacity) => Some(capacity),
        Err(err) => {
            warn!(%err, "block layout unknown");
            None
        }
    };

    let parse = decoder::segments::parse_segments(&symbol.data_codewords, symbol.version);
    debug!(
        segments = parse.segments.len(),
        bits_consumed = parse.bits_consumed,
        halt = ?parse.halt,
        "segment stream parsed"
    );
    let padding = decoder::segments::padding_summary(
        &symbol.data_codewords,
        parse.bits_consumed,
        parse.terminator_bits,
    );

    let mut segments = parse.segments;
    report::pair_chunks(&mut segments, &symbol.chunks);

    report::assemble(symbol.version, format, capacity, segments, parse.halt, padding)
}
