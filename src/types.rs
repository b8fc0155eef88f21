use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PayboxError;

/// Currencies accepted by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    KZT,
    USD,
    EUR,
    KGS,
}

impl Currency {
    /// Underlying wire value, as it appears in payloads and signatures.
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::KZT => "KZT",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::KGS => "KGS",
        }
    }
}

impl FromStr for Currency {
    type Err = PayboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "KZT" => Ok(Currency::KZT),
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            "KGS" => Ok(Currency::KGS),
            other => Err(PayboxError::Validation(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binary protocol flag carried as the integers 1 (on) and 0 (off).
///
/// Note the interaction with signing: `Off` serializes to `0`, which the
/// falsy-skip rule drops from the signing string entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnOff {
    On,
    Off,
}

impl OnOff {
    /// Underlying wire value.
    pub fn as_u8(&self) -> u8 {
        match self {
            OnOff::On => 1,
            OnOff::Off => 0,
        }
    }
}

impl Serialize for OnOff {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.as_u8())
    }
}

impl FromStr for OnOff {
    type Err = PayboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" | "on" | "true" => Ok(OnOff::On),
            "0" | "off" | "false" => Ok(OnOff::Off),
            other => Err(PayboxError::Config(format!(
                "expected on/off flag, got {other:?}"
            ))),
        }
    }
}

/// Hosted payment page language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ru,
    En,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Ru => "ru",
            Language::En => "en",
        }
    }
}

/// HTTP method the gateway should use when calling a merchant URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestMethod {
    GET,
    POST,
    XML,
}

impl RequestMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMethod::GET => "GET",
            RequestMethod::POST => "POST",
            RequestMethod::XML => "XML",
        }
    }
}

/// What the init-response redirect URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RedirectUrlType {
    #[serde(rename = "need data")]
    NeedData,
    #[serde(rename = "payment system")]
    PaymentSystem,
}

impl RedirectUrlType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedirectUrlType::NeedData => "need data",
            RedirectUrlType::PaymentSystem => "payment system",
        }
    }
}

/// Init-response status reported by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitStatus {
    Ok,
    Error,
}

impl InitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InitStatus::Ok => "ok",
            InitStatus::Error => "error",
        }
    }
}
