pub mod cli;
pub mod core;

use crate::core::config::AppConfig;
use crate::core::selector::{IconResolver, unique_options};
use crate::core::{FormController, RateMatrix, record};
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Convert {
        amount: String,
        from: String,
        to: String,
    },
    Rates {
        base: String,
    },
    List {
        search: Option<String>,
    },
    Exchange {
        amount: String,
        from: Option<String>,
        to: Option<String>,
        swap: bool,
    },
    Session,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("swapfx starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let records = record::load_records(config.prices_path.as_deref().map(Path::new))?;
    let rates = Arc::new(RateMatrix::from_records(&records));
    let icons = IconResolver::new(&config.icons_dir);

    match command {
        AppCommand::Convert { amount, from, to } => cli::convert::run(&rates, &amount, &from, &to),
        AppCommand::Rates { base } => cli::convert::run_rates(&rates, &base),
        AppCommand::List { search } => {
            cli::list::run(unique_options(&records, &icons), search.as_deref());
            Ok(())
        }
        AppCommand::Exchange {
            amount,
            from,
            to,
            swap,
        } => {
            let from = from.unwrap_or(config.default_from);
            let to = to.unwrap_or(config.default_to);
            let form = FormController::new(rates, &from, &to, config.latency);
            cli::exchange::run(&form, &amount, swap).await
        }
        AppCommand::Session => {
            let form = FormController::new(
                rates,
                &config.default_from,
                &config.default_to,
                config.latency,
            );
            let mut session = cli::session::Session::new(
                form,
                unique_options(&records, &icons),
                &config.default_from,
                &config.default_to,
            );
            let input = tokio::io::BufReader::new(tokio::io::stdin());
            cli::session::run(&mut session, input, &mut std::io::stdout()).await
        }
    }
}
