use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

#[derive(Clone)]
pub struct SheetsConfig {
    pub service_account_email: String,
    pub private_key: String,
    pub sheet_id: String,
}

#[derive(Clone)]
pub struct EmailConfig {
    pub user: String,
    pub pass: String,
}

pub struct Config {
    pub port: u16,
    pub sheets: Option<SheetsConfig>,
    pub email: Option<EmailConfig>,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("RUST_PORT", "1111"),
            sheets: load_sheets(),
            email: load_email(),
        }
    }
}

fn load_sheets() -> Option<SheetsConfig> {
    match (
        var("GOOGLE_SERVICE_ACCOUNT_EMAIL"),
        var("GOOGLE_PRIVATE_KEY"),
        var("GOOGLE_SHEET_ID"),
    ) {
        (Ok(service_account_email), Ok(private_key), Ok(sheet_id)) => Some(SheetsConfig {
            service_account_email,
            // env files carry the key with literal \n sequences
            private_key: private_key.replace("\\n", "\n"),
            sheet_id,
        }),
        _ => {
            warn!("Missing Google Sheets credentials, order sheet disabled");
            None
        }
    }
}

fn load_email() -> Option<EmailConfig> {
    match (var("EMAIL_USER"), var("EMAIL_PASS")) {
        (Ok(user), Ok(pass)) => Some(EmailConfig { user, pass }),
        _ => {
            warn!("Missing email credentials, notifications disabled");
            None
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
