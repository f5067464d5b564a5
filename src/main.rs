use anyhow::{Context, Result};
use log::info;
use std::env;
use std::io;
use std::path::PathBuf;

use pokertab::config::{Config, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
use pokertab::utils::{CsvWorkbook, StdinForm};
use pokertab::{RunOutcome, TabUpdater};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = Config::load(&config_path)
        .with_context(|| format!("loading configuration from {}", config_path.display()))?;

    let mut workbook = CsvWorkbook::open(config.workbook_path(), config.currency.clone())
        .with_context(|| format!("opening sheet '{}'", config.sheet_key))?;

    let stdin = io::stdin();
    let mut form = StdinForm::new(stdin.lock(), io::stderr());
    let updater = TabUpdater::from_config(&config);

    match updater.run(&mut form, workbook.sheet_mut()).await {
        Ok(RunOutcome::Cancelled) => Ok(()),
        Ok(RunOutcome::Applied(report)) => {
            workbook
                .save()
                .with_context(|| format!("saving {}", workbook.path().display()))?;
            info!(
                "Updated {} and inserted {} players; block now spans rows {}-{}",
                report.updated.len(),
                report.inserted.len(),
                report.first_row,
                report.last_row
            );
            Ok(())
        }
        Err(err) => {
            // keep whatever already reached the sheet; there is no rollback
            if let Err(save_err) = workbook.save() {
                log::error!("Could not save partial changes: {}", save_err);
            }
            Err(err).context("updating the poker tab")
        }
    }
}
