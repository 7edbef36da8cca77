use core::fmt::{Debug, Display};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::PathBuf;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;

pub const CONFIG_FILE: &str = "festival.toml";
pub const ENV_PREFIX: &str = "FESTIVAL_";

#[derive(Deserialize, Clone)]
pub struct PusherConfig {
    pub app_id: String,
    pub key: String,
    pub secret: String,
    pub cluster: String,
    #[serde(default = "default_channel")]
    pub channel: String,
    #[serde(default = "default_event")]
    pub event: String,
}

#[derive(Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
    pub database_url: String,
    /// Directory holding `events.json`, `flats.json` and `aarti.json`.
    #[serde(default = "default_fixtures_dir")]
    pub fixtures_dir: PathBuf,
    /// Root the gallery folders are resolved against.
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
    pub admin_token: Option<String>,
    pub pusher: Option<PusherConfig>,
}

fn default_listen() -> SocketAddr {
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(0, 0, 0, 0), 3000))
}

fn default_fixtures_dir() -> PathBuf {
    PathBuf::from("public/data")
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_channel() -> String {
    "aarti-bookings".to_owned()
}

fn default_event() -> String {
    "new-booking".to_owned()
}

#[derive(thiserror::Error)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Figment(#[from] figment::Error),
}

impl Debug for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Config {
    #[must_use]
    pub fn figment() -> Figment {
        Figment::new()
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}

pub fn get_config() -> Result<Config, ConfigError> {
    Ok(Config::figment().extract()?)
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn defaults_fill_in_missing_values() {
        Jail::expect_with(|jail| {
            jail.create_file(CONFIG_FILE, r#"database_url = "postgres://localhost/festival""#)?;
            let config: Config = Config::figment().extract()?;
            assert_eq!(config.listen.port(), 3000);
            assert_eq!(config.fixtures_dir, PathBuf::from("public/data"));
            assert_eq!(config.public_dir, PathBuf::from("public"));
            assert!(config.admin_token.is_none());
            assert!(config.pusher.is_none());
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                r#"
                database_url = "postgres://localhost/festival"
                listen = "127.0.0.1:8080"

                [pusher]
                app_id = "1"
                key = "key"
                secret = "secret"
                cluster = "ap2"
                "#,
            )?;
            jail.set_env("FESTIVAL_DATABASE_URL", "postgres://db/other");
            jail.set_env("FESTIVAL_PUSHER__CHANNEL", "dashboard");
            let config: Config = Config::figment().extract()?;
            assert_eq!(config.database_url, "postgres://db/other");
            assert_eq!(config.listen.port(), 8080);
            let pusher = config.pusher.expect("pusher section");
            assert_eq!(pusher.channel, "dashboard");
            assert_eq!(pusher.event, "new-booking");
            Ok(())
        });
    }
}
