//! Idempotent conversion of one sample to the canonical encoding.
//!
//! The existence of the target file is the only guard against repeated work:
//! an existing target is returned as [`NormalizeOutcome::AlreadyPresent`]
//! without being re-validated.  No locking is done here, so callers must
//! never schedule two conversions for the same target concurrently.

use std::path::Path;
use std::sync::Arc;

use super::format::CanonicalFormat;
use super::toolkit::{AudioToolkit, ToolkitError};

/// Result of a normalization request.
#[derive(Debug)]
pub enum NormalizeOutcome {
    /// The target was produced by this call.
    Converted,
    /// The target existed beforehand and was left untouched.
    AlreadyPresent,
    /// The toolkit failed; the target does not exist.
    Failed(ToolkitError),
}

impl NormalizeOutcome {
    /// `true` when the canonical target is available after the call.
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Converted | Self::AlreadyPresent)
    }
}

/// Converts source samples to a fixed [`CanonicalFormat`].
#[derive(Clone)]
pub struct AudioNormalizer {
    toolkit: Arc<dyn AudioToolkit>,
    format: CanonicalFormat,
}

impl AudioNormalizer {
    pub fn new(toolkit: Arc<dyn AudioToolkit>, format: CanonicalFormat) -> Self {
        Self { toolkit, format }
    }

    pub fn format(&self) -> &CanonicalFormat {
        &self.format
    }

    pub fn toolkit(&self) -> &Arc<dyn AudioToolkit> {
        &self.toolkit
    }

    /// Produce `target` from `source` unless `target` already exists.
    ///
    /// Never returns an error: toolkit failures become
    /// [`NormalizeOutcome::Failed`], and any file the toolkit left behind at
    /// `target` is removed so absence and failure always coincide.
    pub fn normalize(&self, source: &Path, target: &Path) -> NormalizeOutcome {
        if target.exists() {
            return NormalizeOutcome::AlreadyPresent;
        }

        match self.toolkit.convert(source, target, &self.format) {
            Ok(()) if target.exists() => NormalizeOutcome::Converted,
            Ok(()) => NormalizeOutcome::Failed(ToolkitError::Encode {
                path: target.to_path_buf(),
                reason: "toolkit reported success but produced no file".into(),
            }),
            Err(e) => {
                if target.exists() {
                    let _ = std::fs::remove_file(target);
                }
                NormalizeOutcome::Failed(e)
            }
        }
    }
}
