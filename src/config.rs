//! Environment-variable knobs, read once per process.

use std::sync::OnceLock;

fn parse_env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

static PAD_PREVIEW_LEN: OnceLock<usize> = OnceLock::new();

/// Maximum number of pad bytes listed in a rendered report
pub fn pad_preview_len() -> usize {
    *PAD_PREVIEW_LEN.get_or_init(|| parse_env_usize("QRPROBE_PAD_PREVIEW", 32).clamp(1, 512))
}

static MAX_IMAGE_DIM: OnceLock<usize> = OnceLock::new();

/// Largest accepted image edge length, guards the CLI against absurd inputs
pub fn max_image_dim() -> usize {
    *MAX_IMAGE_DIM.get_or_init(|| parse_env_usize("QRPROBE_MAX_IMAGE_DIM", 10_000).max(1))
}
