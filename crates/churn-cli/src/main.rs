use anyhow::Result;
use clap::Command;
use log::LevelFilter;
use std::path::PathBuf;

use churn_cli::select::{print_scores, resolve_config, run, CONFIG_ENV};

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("CHURN_LOG", "error,churn=info"))
        .init();

    Command::new("churn")
        .version(clap::crate_version!())
        .about("Profit-driven churn model selection")
        .after_help(
            "Reads data/churn_train.csv and data/churn_test.csv unless a JSON config \
             named by CHURN_CONFIG says otherwise. Set CHURN_LOG to adjust logging.",
        )
        .get_matches();

    let config = resolve_config(std::env::var_os(CONFIG_ENV).map(PathBuf::from))?;
    let outcome = run(&config)?;
    print_scores(&mut std::io::stdout().lock(), &outcome)?;
    Ok(())
}
