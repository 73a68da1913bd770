// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Optional HTTPS termination from PEM files on disk.

use std::io;

use axum_server::tls_rustls::RustlsConfig;

use crate::config::TlsPaths;

/// Install ring as the process-wide rustls provider. Must run before any
/// TLS configuration is built; a second call is a no-op.
pub fn install_crypto_provider() {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        tracing::debug!("rustls crypto provider already installed");
    }
}

pub async fn load_rustls_config(paths: &TlsPaths) -> io::Result<RustlsConfig> {
    let config = RustlsConfig::from_pem_file(&paths.cert, &paths.key).await?;
    tracing::info!(cert = %paths.cert.display(), "loaded TLS certificate");
    Ok(config)
}
