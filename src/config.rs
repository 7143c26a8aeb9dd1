use std::env;

use anyhow::{bail, Context, Result};

/// How outbound SMS are delivered. `Log` mirrors the provider's local mode:
/// the message is logged instead of sent and a fixed provider id is returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SmsMode {
    Log,
    Live,
}

impl SmsMode {
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "log" => Ok(SmsMode::Log),
            "live" => Ok(SmsMode::Live),
            other => bail!("SMS_MODE must be 'log' or 'live', got '{other}'"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_path: String,
    pub server_host: String,
    pub server_port: u16,
    pub cors_allowed_origin: Option<String>,
    pub sms_mode: SmsMode,
    pub twilio_account_sid: Option<String>,
    pub twilio_auth_token: Option<String>,
    pub twilio_from_number: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let database_path =
            env::var("DATABASE_PATH").unwrap_or_else(|_| "outreach.db".to_string());
        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("SERVER_PORT must be a valid u16")?;
        let cors_allowed_origin = env::var("CORS_ALLOWED_ORIGIN").ok();
        let sms_mode = match env::var("SMS_MODE") {
            Ok(value) => SmsMode::parse(&value)?,
            Err(_) => SmsMode::Log,
        };
        let twilio_account_sid = env::var("TWILIO_ACCOUNT_SID").ok();
        let twilio_auth_token = env::var("TWILIO_AUTH_TOKEN").ok();
        let twilio_from_number = env::var("TWILIO_FROM_NUMBER").ok();

        if sms_mode == SmsMode::Live {
            if twilio_account_sid.is_none()
                || twilio_auth_token.is_none()
                || twilio_from_number.is_none()
            {
                bail!(
                    "TWILIO_ACCOUNT_SID, TWILIO_AUTH_TOKEN and TWILIO_FROM_NUMBER \
                     must be set when SMS_MODE=live"
                );
            }
        }

        Ok(Self {
            database_path,
            server_host,
            server_port,
            cors_allowed_origin,
            sms_mode,
            twilio_account_sid,
            twilio_auth_token,
            twilio_from_number,
        })
    }
}
