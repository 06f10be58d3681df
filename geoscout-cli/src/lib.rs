//! Command-line interface for geoscout's amenity and address queries.
#![forbid(unsafe_code)]

use std::io::Write;

use clap::{Parser, Subcommand};

mod error;
mod fs;
mod pois;
mod suggest;

pub use error::CliError;

use pois::PoisArgs;
use suggest::SuggestArgs;

pub(crate) const ARG_DATABASE: &str = "database";
pub(crate) const ENV_DATABASE: &str = "GEOSCOUT_CMDS_POIS_DATABASE";
pub(crate) const ARG_TOP: &str = "top";
pub(crate) const ENV_TOP: &str = "GEOSCOUT_CMDS_POIS_TOP";
pub(crate) const ARG_BOTTOM: &str = "bottom";
pub(crate) const ENV_BOTTOM: &str = "GEOSCOUT_CMDS_POIS_BOTTOM";
pub(crate) const ARG_LEFT: &str = "left";
pub(crate) const ENV_LEFT: &str = "GEOSCOUT_CMDS_POIS_LEFT";
pub(crate) const ARG_RIGHT: &str = "right";
pub(crate) const ENV_RIGHT: &str = "GEOSCOUT_CMDS_POIS_RIGHT";
pub(crate) const ARG_REGION_FILE: &str = "region-file";
pub(crate) const ENV_REGION_FILE: &str = "GEOSCOUT_CMDS_SUGGEST_REGION_FILE";
pub(crate) const ARG_REGION: &str = "region";
pub(crate) const ENV_REGION: &str = "GEOSCOUT_CMDS_SUGGEST_REGION";
pub(crate) const ARG_CITY_ID: &str = "city-id";
pub(crate) const ENV_CITY_ID: &str = "GEOSCOUT_CMDS_SUGGEST_CITY_ID";
pub(crate) const ARG_STREET: &str = "street";
pub(crate) const ENV_STREET: &str = "GEOSCOUT_CMDS_SUGGEST_STREET";

/// Run the geoscout CLI with the current process arguments and environment.
///
/// Results are written to standard output.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    dispatch(cli.command, &mut stdout)
}

fn dispatch(command: Command, writer: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Pois(args) => pois::run_pois(args, writer),
        Command::Suggest(args) => suggest::run_suggest(args, writer),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "geoscout",
    about = "Query amenities by area and suggest addresses by name",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List amenities inside a bounding box.
    Pois(PoisArgs),
    /// Suggest cities, streets or buildings for a partial name.
    Suggest(SuggestArgs),
}

#[cfg(test)]
mod tests;
