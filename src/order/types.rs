use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Zomato,
    Swiggy,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Zomato => "zomato",
            Platform::Swiggy => "swiggy",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_location() -> String {
    "Mangaluru".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default = "default_location")]
    pub location: String,
}

impl Default for ContactDetails {
    fn default() -> Self {
        Self {
            phone: None,
            location: default_location(),
        }
    }
}

impl ContactDetails {
    pub fn phone(&self) -> Option<&str> {
        self.phone
            .as_deref()
            .map(str::trim)
            .filter(|phone| !phone.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderBackendConfig {
    Simulated,
    Webhook { endpoint: String },
}

fn default_backend() -> OrderBackendConfig {
    OrderBackendConfig::Simulated
}

fn default_platform() -> Platform {
    Platform::Zomato
}

fn default_confirmation_timeout_ms() -> u64 {
    120_000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderConfig {
    #[serde(default = "default_backend")]
    pub backend: OrderBackendConfig,
    #[serde(default = "default_platform")]
    pub platform: Platform,
    #[serde(default)]
    pub contact: ContactDetails,
    #[serde(default = "default_confirmation_timeout_ms")]
    pub confirmation_timeout_ms: u64,
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            platform: default_platform(),
            contact: ContactDetails::default(),
            confirmation_timeout_ms: default_confirmation_timeout_ms(),
        }
    }
}

impl OrderConfig {
    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_millis(self.confirmation_timeout_ms.max(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationReason {
    /// The simulated backend is the configured one.
    Configured,
    MissingContact,
    /// The real backend answered but refused the order.
    BackendRefused,
    BackendError,
    TimedOut,
    Cancelled,
}

impl SimulationReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SimulationReason::Configured => "configured",
            SimulationReason::MissingContact => "missing_contact",
            SimulationReason::BackendRefused => "backend_refused",
            SimulationReason::BackendError => "backend_error",
            SimulationReason::TimedOut => "timed_out",
            SimulationReason::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementOutcome {
    /// The real backend confirmed the order.
    Placed { backend: &'static str },
    Simulated { reason: SimulationReason },
}

impl PlacementOutcome {
    pub fn is_real(self) -> bool {
        matches!(self, PlacementOutcome::Placed { .. })
    }
}
