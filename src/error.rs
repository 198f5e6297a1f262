use thiserror::Error;

/// Failures the inspection pipeline can surface
///
/// Only `MalformedImage` aborts an inspection. The other variants are
/// recovered internally: the report is assembled with "Unknown" fields
/// instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// Pixel buffer length does not match the declared dimensions
    #[error("malformed image: {width}x{height} RGBA needs {expected} bytes, got {actual}")]
    MalformedImage {
        /// Declared image width in pixels
        width: usize,
        /// Declared image height in pixels
        height: usize,
        /// Expected byte length, width * height * 4
        expected: usize,
        /// Actual byte length supplied
        actual: usize,
    },

    /// Neither 15-bit format field is within Hamming distance 3 of a valid codeword
    #[error("format information unrecoverable: best match at distance {best_distance}, tolerance is 3")]
    FormatInfoUnrecoverable {
        /// Smallest Hamming distance found over both fields and all 32 codewords
        best_distance: u32,
    },

    /// No error correction level of the version matches the observed codeword count
    #[error("no EC level of version {version} holds {data_codewords} data codewords")]
    CapacityLookupFailed {
        /// Symbol version the lookup ran against
        version: u8,
        /// Observed data codeword count
        data_codewords: usize,
    },
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, ProbeError>;
