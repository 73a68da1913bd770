// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, process::ExitCode, sync::Arc};

use axum_server::Handle;
use casting_agency_server::{
    api::router,
    auth::{AuthGate, HttpKeySource, JwksManager, TokenVerifier},
    config::Settings,
    logging::init_tracing,
    server::{serve, shutdown_on_signal},
    state::AppState,
    store::InMemoryStore,
    tls::{install_crypto_provider, load_rustls_config},
};

#[tokio::main]
async fn main() -> ExitCode {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            init_tracing(Default::default());
            tracing::error!(error = %err, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(settings.log_format);
    install_crypto_provider();

    let source = match HttpKeySource::new(settings.jwks_url.clone(), settings.jwks_timeout) {
        Ok(source) => source,
        Err(err) => {
            tracing::error!(error = %err, "failed to build key set client");
            return ExitCode::FAILURE;
        }
    };
    let keys = Arc::new(JwksManager::new(Arc::new(source)));

    // Warm the cache; a failure here is retried on the first request.
    if let Err(err) = keys.ensure_loaded().await {
        tracing::warn!(error = %err, jwks_url = %settings.jwks_url, "initial key set fetch failed");
    }

    let verifier = TokenVerifier::new(keys, settings.verifier.clone());
    let state = AppState::new(InMemoryStore::new(), AuthGate::new(Arc::new(verifier)));
    let app = router(state);

    let handle: Handle<SocketAddr> = Handle::new();
    tokio::spawn(shutdown_on_signal(handle.clone()));

    let tls = match &settings.tls {
        Some(paths) => match load_rustls_config(paths).await {
            Ok(config) => Some(config),
            Err(err) => {
                tracing::error!(error = %err, "failed to load TLS credentials");
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };

    tracing::info!(audience = %settings.verifier.audience, issuer = %settings.verifier.issuer, "casting agency starting");
    let served = serve(app, settings.bind_addr, tls, handle).await;

    match served {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "server failed");
            ExitCode::FAILURE
        }
    }
}
