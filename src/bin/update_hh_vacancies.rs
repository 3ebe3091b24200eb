use std::{error::Error, path::Path};

use clap::Parser;
use hh_archive::{
    config::{DbConfig, DEFAULT_CONFIG_PATH, DEFAULT_SECTION},
    db::hh::{
        ingest::{self, DEFAULT_EMPLOYER_IDS},
        lib_hh::HhClient,
        vacancies_archive::HhVacanciesArchive,
    },
};
use log::{debug, error, info};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Environment name, e.g., test, prod
    #[arg(short, long, default_value = "prod")]
    env: String,

    /// TOML file with the DuckDB connection parameters
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Section of the config file to use
    #[arg(short, long, default_value = DEFAULT_SECTION)]
    section: String,

    /// Comma separated hh.ru employer ids
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_EMPLOYER_IDS)]
    employer_ids: Vec<i64>,
}

/// Archive the latest vacancies of a list of employers.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();
    if let Err(e) = dotenvy::from_path(Path::new(format!(".env/{}.env", args.env).as_str())) {
        debug!("No env file for {}: {}", args.env, e);
    }

    let config = DbConfig::load(&args.config, &args.section).inspect_err(|e| error!("{}", e))?;
    let archive = HhVacanciesArchive::from(config);
    let client = HhClient::new();

    match ingest::run(&archive, &client, &args.employer_ids) {
        Ok(summary) => info!(
            "Done.  {} vacancies from {} employers, {} new employers, {} new vacancies",
            summary.vacancies_fetched,
            summary.unique_employers,
            summary.employers_inserted,
            summary.vacancies_inserted
        ),
        Err(e) => {
            error!("{}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
