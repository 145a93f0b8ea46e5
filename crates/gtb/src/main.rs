use std::sync::Arc;

use gtb_core::{backup::BackupManager, config::Config, roster::RosterStore};
use gtb_translate::GoogleTranslator;

#[tokio::main]
async fn main() -> Result<(), gtb_core::Error> {
    gtb_core::logging::init("gtb")?;

    let cfg = Arc::new(Config::load()?);
    tracing::info!(data_file = %cfg.data_file.display(), "configuration loaded");

    let backups = BackupManager::new(
        cfg.data_file.clone(),
        cfg.backup_dir.clone(),
        cfg.backup_retention,
    );
    let roster = Arc::new(RosterStore::new(cfg.data_file.clone(), backups));
    roster.init()?;

    let translator = Arc::new(GoogleTranslator::new(
        cfg.translate_endpoint.clone(),
        cfg.translate_timeout,
    )?);

    gtb_telegram::router::run_polling(cfg, roster, translator)
        .await
        .map_err(|e| gtb_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
