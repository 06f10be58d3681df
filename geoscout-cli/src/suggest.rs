//! `suggest` command: complete city, street and building names.

use std::io::Write;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, ValueEnum};
use geoscout_core::{AddressIndex, CitySuggestion, MapObject, ReaderError, RegionFile};
use log::debug;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::error::require_existing;
use crate::fs::open_utf8_file;
use crate::{
    ARG_CITY_ID, ARG_REGION, ARG_REGION_FILE, ARG_STREET, CliError, ENV_CITY_ID, ENV_REGION,
    ENV_REGION_FILE, ENV_STREET,
};

/// Level of the address hierarchy to complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum SuggestLevel {
    /// Cities, villages and postcodes.
    #[default]
    Cities,
    /// Streets of a city or postcode.
    Streets,
    /// Buildings of a street.
    Buildings,
}

/// CLI arguments for the `suggest` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Suggest names from a region file. Cities are searched by \
                 default; streets need --city-id or --postcode, and \
                 buildings additionally need --street. Matches are printed \
                 one per line.",
    about = "Suggest cities, streets or buildings for a partial name"
)]
#[ortho_config(prefix = "GEOSCOUT")]
pub(crate) struct SuggestArgs {
    /// Hierarchy level to search.
    #[arg(value_enum, value_name = "level")]
    #[serde(default)]
    pub(crate) level: Option<SuggestLevel>,
    /// Partial name; empty lists everything at the level.
    #[arg(value_name = "prefix")]
    #[serde(default)]
    pub(crate) prefix: Option<String>,
    /// Path to the region file.
    #[arg(long = ARG_REGION_FILE, value_name = "path")]
    #[serde(default)]
    pub(crate) region_file: Option<Utf8PathBuf>,
    /// Region name inside the file.
    #[arg(long = ARG_REGION)]
    #[serde(default)]
    pub(crate) region: Option<String>,
    /// Match and print English names.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    #[serde(default)]
    pub(crate) english: Option<bool>,
    /// Id of the city whose streets are searched.
    #[arg(long = ARG_CITY_ID, allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) city_id: Option<i64>,
    /// Postcode whose streets are searched.
    #[arg(long)]
    #[serde(default)]
    pub(crate) postcode: Option<String>,
    /// Street whose buildings are searched.
    #[arg(long = ARG_STREET)]
    #[serde(default)]
    pub(crate) street: Option<String>,
}

impl SuggestArgs {
    pub(crate) fn into_config(self) -> Result<SuggestConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SuggestConfig::try_from(merged)
    }
}

/// Owner of the streets being searched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum OwnerSelector {
    City(i64),
    Postcode(String),
}

/// Resolved `suggest` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SuggestConfig {
    pub(crate) region_file: Utf8PathBuf,
    pub(crate) region: String,
    pub(crate) level: SuggestLevel,
    pub(crate) prefix: String,
    pub(crate) use_english_names: bool,
    pub(crate) owner: Option<OwnerSelector>,
    pub(crate) street: Option<String>,
}

impl TryFrom<SuggestArgs> for SuggestConfig {
    type Error = CliError;

    fn try_from(args: SuggestArgs) -> Result<Self, Self::Error> {
        let region_file = args.region_file.ok_or(CliError::MissingArgument {
            field: ARG_REGION_FILE,
            env: ENV_REGION_FILE,
        })?;
        let region = args.region.ok_or(CliError::MissingArgument {
            field: ARG_REGION,
            env: ENV_REGION,
        })?;
        let level = args.level.unwrap_or_default();

        let owner = match (args.city_id, args.postcode) {
            (Some(_), Some(_)) => return Err(CliError::ConflictingOwners),
            (Some(id), None) => Some(OwnerSelector::City(id)),
            (None, Some(code)) => Some(OwnerSelector::Postcode(code)),
            (None, None) => None,
        };
        if level != SuggestLevel::Cities && owner.is_none() {
            return Err(CliError::MissingArgument {
                field: ARG_CITY_ID,
                env: ENV_CITY_ID,
            });
        }
        if level == SuggestLevel::Buildings && args.street.is_none() {
            return Err(CliError::MissingArgument {
                field: ARG_STREET,
                env: ENV_STREET,
            });
        }

        Ok(Self {
            region_file,
            region,
            level,
            prefix: args.prefix.unwrap_or_default(),
            use_english_names: args.english.unwrap_or(false),
            owner,
            street: args.street,
        })
    }
}

pub(super) fn run_suggest(args: SuggestArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    require_existing(&config.region_file, ARG_REGION_FILE)?;
    let file = open_region_file(&config.region_file)?;
    let index = AddressIndex::new(config.region.clone(), Arc::new(file));
    let names = suggest_names(&index, &config)?;
    index.close();
    write_names(writer, &names)
}

fn open_region_file(path: &Utf8Path) -> Result<RegionFile, CliError> {
    let open_error = |source| CliError::OpenRegionFile {
        path: path.to_path_buf(),
        source,
    };
    let file = open_utf8_file(path).map_err(|source| {
        open_error(ReaderError::Io {
            path: path.as_std_path().to_path_buf(),
            source,
        })
    })?;
    RegionFile::from_reader(file, path.as_std_path()).map_err(open_error)
}

/// Run the configured suggestion against `index`.
pub(crate) fn suggest_names(
    index: &AddressIndex,
    config: &SuggestConfig,
) -> Result<Vec<String>, CliError> {
    index.set_use_english_names(config.use_english_names);
    let english = config.use_english_names;
    let names = match config.level {
        SuggestLevel::Cities => display_names(index.suggest_cities(&config.prefix, None), english),
        SuggestLevel::Streets => {
            let owner = resolve_owner(index, config)?;
            display_names(index.suggest_streets(owner.as_owner(), &config.prefix), english)
        }
        SuggestLevel::Buildings => {
            let owner = resolve_owner(index, config)?;
            let name = config.street.as_deref().unwrap_or_default();
            let street = index
                .street_by_name(owner.as_owner(), name)
                .ok_or_else(|| CliError::UnknownStreet {
                    name: name.to_owned(),
                })?;
            display_names(index.suggest_buildings(&street, &config.prefix), english)
        }
    };
    debug!("{} suggestions for {:?}", names.len(), config.prefix);
    Ok(names)
}

fn resolve_owner(index: &AddressIndex, config: &SuggestConfig) -> Result<CitySuggestion, CliError> {
    match &config.owner {
        Some(OwnerSelector::City(id)) => index
            .city_by_id(*id)
            .map(CitySuggestion::City)
            .ok_or_else(|| CliError::UnknownCity {
                id: *id,
                region: config.region.clone(),
            }),
        Some(OwnerSelector::Postcode(code)) => index
            .postcode(code)
            .map(CitySuggestion::Postcode)
            .ok_or_else(|| CliError::UnknownPostcode {
                code: code.clone(),
                region: config.region.clone(),
            }),
        None => Err(CliError::MissingArgument {
            field: ARG_CITY_ID,
            env: ENV_CITY_ID,
        }),
    }
}

fn display_names<T: MapObject>(objects: Vec<T>, use_english_names: bool) -> Vec<String> {
    objects
        .iter()
        .map(|object| object.display_name(use_english_names).to_owned())
        .collect()
}

fn write_names(writer: &mut dyn Write, names: &[String]) -> Result<(), CliError> {
    for name in names {
        writeln!(writer, "{name}").map_err(CliError::WriteOutput)?;
    }
    writer.flush().map_err(CliError::WriteOutput)
}
