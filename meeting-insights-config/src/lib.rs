use core::fmt::{Debug, Display};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::PathBuf;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;

pub const CONFIG_FILE: &str = "meetings.toml";
pub const ENV_PREFIX: &str = "MEETINGS_";
/// Longest meeting the generator may produce.
pub const MAX_MEETING_HOURS: i64 = 24;

/// Bounds for the randomized meeting duration, in hours.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct HoursRange {
    pub minimum: f64,
    pub maximum: f64,
}

impl HoursRange {
    /// Integer bounds actually drawn from: `ceil(minimum)..=floor(maximum)`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, reason = "hour counts are tiny")]
    pub fn bounds(&self) -> (i64, i64) {
        (self.minimum.ceil() as i64, self.maximum.floor() as i64)
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
    pub database_url: Option<String>,
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    pub participants: Vec<String>,
    pub hours_range: HoursRange,
}

const fn default_listen() -> SocketAddr {
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 3000))
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("frontend")
}

#[derive(thiserror::Error)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Figment(#[from] Box<figment::Error>),
    #[error("the participant roster must not be empty")]
    EmptyRoster,
    #[error("participant #{0} has a blank name")]
    BlankParticipant(usize),
    #[error(
        "invalid hours range {minimum}..={maximum}: need 1 <= ceil(minimum) <= floor(maximum) <= {}",
        MAX_MEETING_HOURS
    )]
    InvalidHoursRange { minimum: f64, maximum: f64 },
}

impl From<figment::Error> for ConfigError {
    fn from(value: figment::Error) -> Self {
        Self::Figment(Box::new(value))
    }
}

impl Debug for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Config {
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.participants.is_empty() {
            return Err(ConfigError::EmptyRoster);
        }
        if let Some(index) = self.participants.iter().position(|name| name.trim().is_empty()) {
            return Err(ConfigError::BlankParticipant(index));
        }
        let (minimum, maximum) = self.hours_range.bounds();
        if !self.hours_range.minimum.is_finite()
            || !self.hours_range.maximum.is_finite()
            || minimum < 1
            || minimum > maximum
            || maximum > MAX_MEETING_HOURS
        {
            return Err(ConfigError::InvalidHoursRange {
                minimum: self.hours_range.minimum,
                maximum: self.hours_range.maximum,
            });
        }
        Ok(self)
    }
}

#[must_use]
pub fn figment() -> Figment {
    Figment::new()
        .merge(Toml::file(CONFIG_FILE))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

pub fn get_config() -> Result<Config, ConfigError> {
    figment().extract::<Config>()?.validate()
}
