//! Error types emitted by the geoscout CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>`.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use geoscout_core::{CacheError, ReaderError, StoreError};
use thiserror::Error;

/// Errors emitted by the geoscout CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// The requested operation requires a missing compile-time feature.
    #[error("{action} requires the `{feature}` feature to be enabled")]
    MissingFeature {
        feature: &'static str,
        action: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The bounding box edges are inverted or empty.
    #[error(
        "bounding box must have top > bottom and right > left \
         (got top {top}, bottom {bottom}, left {left}, right {right})"
    )]
    InvalidBoundingBox {
        top: f64,
        bottom: f64,
        left: f64,
        right: f64,
    },
    /// A category name did not match any amenity type.
    #[error("unknown amenity category {name:?}")]
    UnknownCategory { name: String },
    /// Both a city and a postcode were given as the street owner.
    #[error("pass either --city-id or --postcode, not both")]
    ConflictingOwners,
    /// Opening the amenity database failed.
    #[error("failed to open amenity database {path:?}: {source}")]
    OpenStore {
        path: Utf8PathBuf,
        #[source]
        source: StoreError,
    },
    /// Querying amenities failed.
    #[error("amenity query failed: {0}")]
    Query(#[from] CacheError),
    /// Opening the region file failed.
    #[error("failed to open region file {path:?}: {source}")]
    OpenRegionFile {
        path: Utf8PathBuf,
        #[source]
        source: ReaderError,
    },
    /// No resident city has the requested id.
    #[error("no city with id {id} in region {region:?}")]
    UnknownCity { id: i64, region: String },
    /// The requested postcode does not exist.
    #[error("no postcode {code:?} in region {region:?}")]
    UnknownPostcode { code: String, region: String },
    /// The requested street does not exist for the chosen owner.
    #[error("no street named {name:?} for the selected city or postcode")]
    UnknownStreet { name: String },
    /// Serialising an amenity failed.
    #[error("failed to serialise amenity: {0}")]
    SerialiseAmenity(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}

/// Check that `path` names an existing file.
pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match crate::fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}
