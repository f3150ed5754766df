//! On-disk format for precomputed similarity matrices.
//!
//! A file starts with the `FKSI` magic and a `u16` format version, followed by
//! a `bincode` payload holding the matrix size and its row-major values. The
//! matrix is re-validated on load.

use std::io::{BufReader, BufWriter, Read, Write};

use bincode::{deserialize_from, serialize_into};
use camino::{Utf8Path, Utf8PathBuf};
use forkcast_core::{DenseSimilarityMatrix, SimilarityError};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fs::{create_utf8_file, open_utf8_file};

/// File identifier for similarity artefacts.
pub const SIMILARITY_INDEX_MAGIC: [u8; 4] = *b"FKSI";

/// Supported artefact format version.
pub const SIMILARITY_INDEX_VERSION: u16 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct SimilarityPayload {
    size: u64,
    values: Vec<f32>,
}

/// Errors raised while reading or writing a similarity artefact.
#[derive(Debug, Error)]
pub enum ArtefactError {
    /// The file could not be opened, created or flushed.
    #[error("failed to access similarity index at {path}: {source}")]
    Io {
        /// Artefact location.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The payload could not be encoded or decoded.
    #[error("failed to encode or decode similarity index at {path}: {source}")]
    Codec {
        /// Artefact location.
        path: Utf8PathBuf,
        /// Failure reported by `bincode`.
        #[source]
        source: bincode::Error,
    },
    /// The file did not start with [`SIMILARITY_INDEX_MAGIC`].
    #[error("invalid similarity index magic: expected {expected:?}, found {found:?}")]
    InvalidMagic {
        /// Expected byte sequence.
        expected: [u8; 4],
        /// Bytes read from the file.
        found: [u8; 4],
    },
    /// The file uses a format version this build cannot read.
    #[error("unsupported similarity index version {found}; supported version is {supported}")]
    UnsupportedVersion {
        /// Version in the file header.
        found: u16,
        /// Version understood by this build.
        supported: u16,
    },
    /// The stored size does not fit this platform.
    #[error("similarity index size {size} is too large for this platform")]
    Oversized {
        /// Size stored in the file.
        size: u64,
    },
    /// The decoded values failed matrix validation.
    #[error("similarity index at {path} is invalid: {source}")]
    Invalid {
        /// Artefact location.
        path: Utf8PathBuf,
        /// Validation failure.
        #[source]
        source: SimilarityError,
    },
}

/// Persist `matrix` to `path`, creating parent directories and truncating
/// any existing file.
///
/// # Errors
/// Returns [`ArtefactError`] when the file cannot be written or encoded.
pub fn write_similarity_index(
    path: &Utf8Path,
    matrix: &DenseSimilarityMatrix,
) -> Result<(), ArtefactError> {
    let io_error = |source| ArtefactError::Io {
        path: path.to_path_buf(),
        source,
    };
    let codec_error = |source| ArtefactError::Codec {
        path: path.to_path_buf(),
        source,
    };

    let file = create_utf8_file(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&SIMILARITY_INDEX_MAGIC).map_err(io_error)?;
    serialize_into(&mut writer, &SIMILARITY_INDEX_VERSION).map_err(codec_error)?;
    let payload = SimilarityPayload {
        size: matrix.size() as u64,
        values: matrix.values().to_vec(),
    };
    serialize_into(&mut writer, &payload).map_err(codec_error)?;

    let file = writer.into_inner().map_err(|err| io_error(err.into_error()))?;
    file.sync_all().map_err(io_error)?;
    debug!("wrote {0}x{0} similarity index to {path}", matrix.size());
    Ok(())
}

/// Load and validate the similarity matrix stored at `path`.
///
/// # Errors
/// Returns [`ArtefactError`] for I/O failures, a bad header, a corrupt
/// payload, or values that fail matrix validation.
pub fn read_similarity_index(path: &Utf8Path) -> Result<DenseSimilarityMatrix, ArtefactError> {
    let io_error = |source| ArtefactError::Io {
        path: path.to_path_buf(),
        source,
    };
    let codec_error = |source| ArtefactError::Codec {
        path: path.to_path_buf(),
        source,
    };

    let file = open_utf8_file(path).map_err(io_error)?;
    let mut reader = BufReader::new(file);

    let mut magic = [0_u8; 4];
    reader.read_exact(&mut magic).map_err(io_error)?;
    if magic != SIMILARITY_INDEX_MAGIC {
        return Err(ArtefactError::InvalidMagic {
            expected: SIMILARITY_INDEX_MAGIC,
            found: magic,
        });
    }

    let version: u16 = deserialize_from(&mut reader).map_err(codec_error)?;
    if version != SIMILARITY_INDEX_VERSION {
        return Err(ArtefactError::UnsupportedVersion {
            found: version,
            supported: SIMILARITY_INDEX_VERSION,
        });
    }

    let payload: SimilarityPayload = deserialize_from(&mut reader).map_err(codec_error)?;
    let size = usize::try_from(payload.size).map_err(|_| ArtefactError::Oversized {
        size: payload.size,
    })?;
    let matrix =
        DenseSimilarityMatrix::new(size, payload.values).map_err(|source| ArtefactError::Invalid {
            path: path.to_path_buf(),
            source,
        })?;
    debug!("loaded {size}x{size} similarity index from {path}");
    Ok(matrix)
}
