//! `pois` command: list amenities inside a bounding box.

use std::collections::BTreeSet;
use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use geoscout_core::{
    AMENITY_LIMIT, Amenity, AmenityCache, AmenityFilter, AmenityStore, AmenityType, BoundingBox,
    PoiFilter,
};
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::error::require_existing;
use crate::{
    ARG_BOTTOM, ARG_DATABASE, ARG_LEFT, ARG_RIGHT, ARG_TOP, CliError, ENV_BOTTOM, ENV_DATABASE,
    ENV_LEFT, ENV_RIGHT, ENV_TOP,
};

/// Zoom recorded with the cached region when none is given.
pub(crate) const DEFAULT_ZOOM: u32 = 15;

/// CLI arguments for the `pois` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "List amenities strictly inside a bounding box, read from a \
                 SQLite amenity database. Amenities are printed one JSON \
                 object per line. Categories take the form `kind` or \
                 `kind:subtype`, separated by commas.",
    about = "List amenities inside a bounding box"
)]
#[ortho_config(prefix = "GEOSCOUT")]
pub(crate) struct PoisArgs {
    /// Path to the SQLite amenity database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Northern edge latitude.
    #[arg(long = ARG_TOP, allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) top: Option<f64>,
    /// Southern edge latitude.
    #[arg(long = ARG_BOTTOM, allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) bottom: Option<f64>,
    /// Western edge longitude.
    #[arg(long = ARG_LEFT, allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) left: Option<f64>,
    /// Eastern edge longitude.
    #[arg(long = ARG_RIGHT, allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) right: Option<f64>,
    /// Map zoom level.
    #[arg(long)]
    #[serde(default)]
    pub(crate) zoom: Option<u32>,
    /// Maximum number of amenities fetched from the database.
    #[arg(long)]
    #[serde(default)]
    pub(crate) limit: Option<usize>,
    /// Comma-separated categories, e.g. `shop,sustenance:cafe`.
    #[arg(long, value_name = "list")]
    #[serde(default)]
    pub(crate) categories: Option<String>,
    /// Only keep amenities whose name contains this text.
    #[arg(long)]
    #[serde(default)]
    pub(crate) name: Option<String>,
}

impl PoisArgs {
    pub(crate) fn into_config(self) -> Result<PoisConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PoisConfig::try_from(merged)
    }
}

/// Resolved `pois` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PoisConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) bbox: BoundingBox,
    pub(crate) zoom: u32,
    pub(crate) limit: usize,
    pub(crate) filter: Option<PoiFilter>,
}

impl TryFrom<PoisArgs> for PoisConfig {
    type Error = CliError;

    fn try_from(args: PoisArgs) -> Result<Self, Self::Error> {
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_DATABASE,
        })?;
        let edge = |value: Option<f64>, field, env| {
            value.ok_or(CliError::MissingArgument { field, env })
        };
        let top = edge(args.top, ARG_TOP, ENV_TOP)?;
        let bottom = edge(args.bottom, ARG_BOTTOM, ENV_BOTTOM)?;
        let left = edge(args.left, ARG_LEFT, ENV_LEFT)?;
        let right = edge(args.right, ARG_RIGHT, ENV_RIGHT)?;
        if !(top > bottom && right > left) {
            return Err(CliError::InvalidBoundingBox {
                top,
                bottom,
                left,
                right,
            });
        }

        let filter = build_filter(args.categories.as_deref(), args.name.as_deref())?;
        Ok(Self {
            database,
            bbox: BoundingBox::new(top, bottom, left, right),
            zoom: args.zoom.unwrap_or(DEFAULT_ZOOM),
            limit: args.limit.unwrap_or(AMENITY_LIMIT),
            filter,
        })
    }
}

/// Build a filter from the category list and name text.
///
/// Returns `None` when neither narrows the result. The filter id lists the
/// canonical category entries sorted and deduplicated, followed by the
/// lowercased name, so equal selections share cache entries however they
/// were typed.
pub(crate) fn build_filter(
    categories: Option<&str>,
    name: Option<&str>,
) -> Result<Option<PoiFilter>, CliError> {
    let mut selections = Vec::new();
    for entry in categories.unwrap_or_default().split(',').map(str::trim) {
        if entry.is_empty() {
            continue;
        }
        let (kind, subtype) = match entry.split_once(':') {
            Some((kind, subtype)) => (kind, Some(subtype.trim()).filter(|s| !s.is_empty())),
            None => (entry, None),
        };
        let parsed = AmenityType::parse(kind);
        if parsed == AmenityType::Other && !kind.trim().eq_ignore_ascii_case("other") {
            return Err(CliError::UnknownCategory {
                name: kind.trim().to_owned(),
            });
        }
        selections.push((parsed, subtype));
    }
    let name = name.map(str::trim).filter(|name| !name.is_empty());
    if selections.is_empty() && name.is_none() {
        return Ok(None);
    }

    let keys: BTreeSet<String> = selections
        .iter()
        .map(|(kind, subtype)| match subtype {
            Some(subtype) => format!("{kind}:{subtype}"),
            None => kind.as_str().to_owned(),
        })
        .collect();
    let keys: Vec<String> = keys.into_iter().collect();
    let mut filter = PoiFilter::new(format!(
        "cli:{}:{}",
        keys.join(","),
        name.map(str::to_lowercase).unwrap_or_default()
    ));
    for (kind, subtype) in selections {
        filter = match subtype {
            Some(subtype) => filter.with_subtype(kind, subtype),
            None => filter.with_category(kind),
        };
    }
    if let Some(name) = name {
        filter = filter.with_name(name);
    }
    Ok(Some(filter))
}

#[cfg(feature = "store-sqlite")]
pub(super) fn run_pois(args: PoisArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    use geoscout_core::SqliteAmenityStore;

    let config = args.into_config()?;
    require_existing(&config.database, ARG_DATABASE)?;
    let store = SqliteAmenityStore::open_read_only(config.database.as_std_path()).map_err(
        |source| CliError::OpenStore {
            path: config.database.clone(),
            source,
        },
    )?;
    let amenities = query_amenities(store, &config)?;
    write_amenities(writer, &amenities)
}

#[cfg(not(feature = "store-sqlite"))]
pub(super) fn run_pois(_args: PoisArgs, _writer: &mut dyn Write) -> Result<(), CliError> {
    Err(CliError::MissingFeature {
        feature: "store-sqlite",
        action: "querying amenities",
    })
}

/// Run the configured query against `store` through an amenity cache.
pub(crate) fn query_amenities<S: AmenityStore>(
    store: S,
    config: &PoisConfig,
) -> Result<Vec<Amenity>, CliError> {
    let cache = AmenityCache::new(store);
    let filter = config.filter.as_ref().map(|f| f as &dyn AmenityFilter);
    let amenities = cache.refresh(&config.bbox, config.zoom, Some(config.limit), filter)?;
    info!(
        "found {} amenities inside {:?}",
        amenities.len(),
        config.bbox
    );
    Ok(amenities)
}

pub(crate) fn write_amenities(
    writer: &mut dyn Write,
    amenities: &[Amenity],
) -> Result<(), CliError> {
    for amenity in amenities {
        serde_json::to_writer(&mut *writer, amenity).map_err(CliError::SerialiseAmenity)?;
        writeln!(writer).map_err(CliError::WriteOutput)?;
    }
    writer.flush().map_err(CliError::WriteOutput)
}
