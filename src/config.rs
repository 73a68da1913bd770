// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults, and the [`Settings`] loaded from
//! them at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `AUTH0_DOMAIN` | Identity provider domain; the JWK set is fetched from `https://<domain>/.well-known/jwks.json` | Required |
//! | `API_AUDIENCE` | Expected JWT audience claim | Required |
//! | `API_ISSUER` | Expected JWT issuer claim | `https://<AUTH0_DOMAIN>/` |
//! | `JWT_ALGORITHM` | The only signing algorithm accepted | `RS256` |
//! | `JWKS_TIMEOUT_SECS` | Timeout for a single key set fetch | `10` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `TLS_CERT_PATH` | PEM certificate chain; HTTPS when set with `TLS_KEY_PATH` | Unset |
//! | `TLS_KEY_PATH` | PEM private key | Unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use jsonwebtoken::Algorithm;
use thiserror::Error;
use url::Url;

use crate::auth::VerifierConfig;

pub const AUTH0_DOMAIN_ENV: &str = "AUTH0_DOMAIN";
pub const API_AUDIENCE_ENV: &str = "API_AUDIENCE";
pub const API_ISSUER_ENV: &str = "API_ISSUER";
pub const JWT_ALGORITHM_ENV: &str = "JWT_ALGORITHM";
pub const JWKS_TIMEOUT_ENV: &str = "JWKS_TIMEOUT_SECS";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_ALGORITHM: Algorithm = Algorithm::RS256;
pub const DEFAULT_JWKS_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Path of the JWK set relative to the identity provider domain.
pub const JWKS_PATH: &str = ".well-known/jwks.json";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("{0} is not an RSA signing algorithm")]
    UnsupportedAlgorithm(String),

    #[error("TLS_CERT_PATH and TLS_KEY_PATH must be set together")]
    PartialTls,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            other => Err(ConfigError::Invalid {
                var: LOG_FORMAT_ENV,
                reason: format!("expected `json` or `pretty`, got `{other}`"),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub jwks_url: Url,
    pub jwks_timeout: Duration,
    pub verifier: VerifierConfig,
    pub bind_addr: SocketAddr,
    pub tls: Option<TlsPaths>,
    pub log_format: LogFormat,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from an arbitrary variable lookup. Empty values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let required = |name: &'static str| var(name).ok_or(ConfigError::Missing(name));

        let domain = required(AUTH0_DOMAIN_ENV)?;
        let audience = required(API_AUDIENCE_ENV)?;
        let base = domain_url(&domain)?;
        let jwks_url = base.join(JWKS_PATH).map_err(|e| ConfigError::Invalid {
            var: AUTH0_DOMAIN_ENV,
            reason: e.to_string(),
        })?;
        let issuer = var(API_ISSUER_ENV).unwrap_or_else(|| base.to_string());

        let algorithm = match var(JWT_ALGORITHM_ENV) {
            Some(name) => parse_algorithm(&name)?,
            None => DEFAULT_ALGORITHM,
        };

        let timeout_secs = match var(JWKS_TIMEOUT_ENV) {
            Some(raw) => parse_number::<u64>(JWKS_TIMEOUT_ENV, &raw)?,
            None => DEFAULT_JWKS_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: JWKS_TIMEOUT_ENV,
                reason: "must be greater than zero".to_string(),
            });
        }

        let host = var(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match var(PORT_ENV) {
            Some(raw) => parse_number::<u16>(PORT_ENV, &raw)?,
            None => DEFAULT_PORT,
        };
        let bind_addr = format!("{host}:{port}")
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                var: HOST_ENV,
                reason: e.to_string(),
            })?;

        let tls = match (var(TLS_CERT_PATH_ENV), var(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::PartialTls),
        };

        let log_format = match var(LOG_FORMAT_ENV) {
            Some(raw) => raw.parse()?,
            None => LogFormat::default(),
        };

        Ok(Self {
            jwks_url,
            jwks_timeout: Duration::from_secs(timeout_secs),
            verifier: VerifierConfig {
                audience,
                issuer,
                algorithm,
            },
            bind_addr,
            tls,
            log_format,
        })
    }
}

/// `https://<domain>/`, accepting a bare host or one with a scheme.
fn domain_url(domain: &str) -> Result<Url, ConfigError> {
    let raw = if domain.contains("://") {
        domain.to_string()
    } else {
        format!("https://{domain}")
    };
    let mut url = Url::parse(&raw).map_err(|e| ConfigError::Invalid {
        var: AUTH0_DOMAIN_ENV,
        reason: e.to_string(),
    })?;
    if url.host_str().is_none() {
        return Err(ConfigError::Invalid {
            var: AUTH0_DOMAIN_ENV,
            reason: "missing host".to_string(),
        });
    }
    url.set_path("/");
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

fn parse_algorithm(name: &str) -> Result<Algorithm, ConfigError> {
    let algorithm = Algorithm::from_str(name).map_err(|_| ConfigError::Invalid {
        var: JWT_ALGORITHM_ENV,
        reason: format!("unknown algorithm `{name}`"),
    })?;
    match algorithm {
        Algorithm::RS256
        | Algorithm::RS384
        | Algorithm::RS512
        | Algorithm::PS256
        | Algorithm::PS384
        | Algorithm::PS512 => Ok(algorithm),
        _ => Err(ConfigError::UnsupportedAlgorithm(name.to_string())),
    }
}

fn parse_number<T: FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        reason: e.to_string(),
    })
}
