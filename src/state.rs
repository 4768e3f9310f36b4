use std::sync::Arc;

use tracing::warn;

use crate::{config::Config, notify::Mailer, sheets::SheetsClient};

pub struct State {
    pub config: Config,
    pub sheets: Option<SheetsClient>,
    pub mailer: Option<Mailer>,
}

impl State {
    pub fn new() -> Arc<Self> {
        let config = Config::load();

        let sheets = config.sheets.clone().map(SheetsClient::new);

        let mailer = config.email.clone().and_then(|email| {
            Mailer::new(email)
                .map_err(|e| warn!("Failed to build mail transport: {e}"))
                .ok()
        });

        Arc::new(Self {
            config,
            sheets,
            mailer,
        })
    }
}
