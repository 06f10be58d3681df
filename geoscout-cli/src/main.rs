//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use geoscout_cli::CliError;

fn main() {
    env_logger::init();
    match geoscout_cli::run() {
        Ok(()) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("geoscout: {err}");
            std::process::exit(1);
        }
    }
}
