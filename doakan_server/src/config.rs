use std::{env, io::Write};

use chrono::Duration;
use doakan_common::{parse_boolean_flag, Secret};
use doakan_engine::{
    sqlite_db::{db_url, SQLITE_DB_URL},
    StatusMapping,
};
use log::*;
use midtrans_tools::MidtransConfig;
use rand::{thread_rng, RngCore};
use tempfile::NamedTempFile;

use crate::errors::ServerError;

const DEFAULT_DKN_HOST: &str = "127.0.0.1";
const DEFAULT_DKN_PORT: u16 = 8080;
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::hours(24);
/// HS256 keys shorter than the hash output are accepted by most libraries, but we don't.
const MIN_JWT_SECRET_LENGTH: usize = 32;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    pub midtrans: MidtransConfig,
    /// If false, Midtrans notifications are accepted without checking `signature_key`. **DANGER**
    pub signature_checks: bool,
    /// Gateway status codes and the transaction outcome each one maps to.
    pub status_mapping: StatusMapping,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_DKN_HOST.to_string(),
            port: DEFAULT_DKN_PORT,
            database_url: SQLITE_DB_URL.to_string(),
            auth: AuthConfig::default(),
            midtrans: MidtransConfig::default(),
            signature_checks: true,
            status_mapping: StatusMapping::midtrans(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("DKN_HOST").ok().unwrap_or_else(|| DEFAULT_DKN_HOST.into());
        let port = env::var("DKN_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for DKN_PORT. {e} Using the default, {DEFAULT_DKN_PORT}, instead."
                    );
                    DEFAULT_DKN_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_DKN_PORT);
        let database_url = db_url();
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to the \
                 default configuration."
            );
            AuthConfig::default()
        });
        let midtrans = MidtransConfig::new_from_env_or_default();
        let signature_checks = parse_boolean_flag(env::var("DKN_MIDTRANS_SIGNATURE_CHECKS").ok(), true);
        if !signature_checks {
            warn!(
                "🚨️🚨️🚨️ Midtrans notification signature checks are DISABLED. Anyone can mark transactions as paid. \
                 Never run production like this. 🚨️🚨️🚨️"
            );
        }
        let status_mapping = configure_status_mapping();
        Self { host, port, database_url, auth, midtrans, signature_checks, status_mapping }
    }
}

fn configure_status_mapping() -> StatusMapping {
    let defaults = StatusMapping::midtrans();
    match env::var("DKN_GATEWAY_STATUS_OVERRIDES") {
        Ok(overrides) => defaults.with_overrides(&overrides).unwrap_or_else(|e| {
            warn!("🪛️ Ignoring invalid DKN_GATEWAY_STATUS_OVERRIDES. {e}. Using the default status mapping.");
            StatusMapping::midtrans()
        }),
        Err(_) => {
            debug!("🪛️ DKN_GATEWAY_STATUS_OVERRIDES is not set. Using the default Midtrans status mapping.");
            defaults
        },
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The HMAC secret that signs and verifies access tokens.
    pub jwt_secret: Secret<String>,
    /// How long an issued access token stays valid.
    pub token_lifetime: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        let mut tmpfile = NamedTempFile::new().ok().and_then(|f| f.keep().ok());
        warn!(
            "🚨️🚨️🚨️ The JWT secret has not been set. I'm using a random value for this session. DO NOT operate on \
             production like this since every issued token becomes invalid when the server restarts. 🚨️🚨️🚨️"
        );
        let mut bytes = [0u8; 32];
        thread_rng().fill_bytes(&mut bytes);
        let secret = hex::encode(bytes);
        match &mut tmpfile {
            Some((f, p)) => match writeln!(f, "{secret}") {
                Ok(()) => warn!(
                    "🚨️🚨️🚨️ The JWT secret for this session was written to {}. If this is a production instance, \
                     you are doing it wrong! Set the DKN_JWT_SECRET environment variable instead. 🚨️🚨️🚨️",
                    p.to_str().unwrap_or("???")
                ),
                Err(e) => warn!("🪛️ Could not write the JWT secret to the temporary file. {e}"),
            },
            None => {
                warn!("🪛️ Could not create a temporary file to store the JWT secret. ");
            },
        }
        Self { jwt_secret: Secret::new(secret), token_lifetime: DEFAULT_TOKEN_LIFETIME }
    }
}

impl AuthConfig {
    pub fn new(jwt_secret: &str, token_lifetime: Duration) -> Self {
        Self { jwt_secret: Secret::new(jwt_secret.to_string()), token_lifetime }
    }

    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret =
            env::var("DKN_JWT_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [DKN_JWT_SECRET]")))?;
        if secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(ServerError::ConfigurationError(format!(
                "DKN_JWT_SECRET must be at least {MIN_JWT_SECRET_LENGTH} characters long"
            )));
        }
        let token_lifetime = env::var("DKN_TOKEN_LIFETIME_HOURS")
            .ok()
            .and_then(|s| {
                s.parse::<i64>()
                    .ok()
                    .filter(|h| *h > 0)
                    .or_else(|| {
                        warn!("🪛️ Invalid configuration value for DKN_TOKEN_LIFETIME_HOURS: {s}");
                        None
                    })
                    .map(Duration::hours)
            })
            .unwrap_or(DEFAULT_TOKEN_LIFETIME);
        Ok(Self { jwt_secret: Secret::new(secret), token_lifetime })
    }
}
