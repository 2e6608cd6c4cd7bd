// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by [`crate::export_to_file`] and [`crate::export_series`].
#[derive(Error, Debug)]
pub enum ExportError {
    /// The output extension does not name a known format.
    #[error("unsupported export format for {}", .path.display())]
    UnsupportedFormat {
        /// The requested output path.
        path: PathBuf,
    },
    /// The output file could not be created or written.
    #[error("failed to write {}", .path.display())]
    Io {
        /// The output path.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: io::Error,
    },
    /// The PNG encoder rejected the image.
    #[error("failed to encode {}", .path.display())]
    Png {
        /// The output path.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: png::EncodingError,
    },
    /// There is nothing to draw.
    #[error("nothing to export: the matrix has no cells")]
    Empty,
}
