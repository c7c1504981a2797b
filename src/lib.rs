pub mod adapters;
pub mod bootstrap;
pub mod common;
pub mod config;
pub mod database;
pub mod dependencies;
pub mod domain;
pub mod routes;
pub mod services;
pub mod state;

use std::{net::SocketAddr, str::FromStr};

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use tokio::signal;
use tower_http::{
	cors::{AllowOrigin, CorsLayer},
	trace::TraceLayer,
};

use crate::{bootstrap::Bootstrap, config::Config, routes::create_routes};

pub async fn run(config: Config) -> anyhow::Result<()> {
	let state = Bootstrap::app_state(&config).await.context("failed to initialise application state")?;

	let origins = config
		.origins()
		.map(|origin| origin.parse::<HeaderValue>().with_context(|| format!("invalid origin `{origin}`")))
		.collect::<anyhow::Result<Vec<_>>>()?;

	let app = create_routes(state.clone())
		.layer(
			CorsLayer::new()
				.allow_origin(AllowOrigin::list(origins))
				.allow_methods([Method::GET, Method::POST, Method::DELETE])
				.allow_headers([axum::http::header::AUTHORIZATION, axum::http::header::CONTENT_TYPE]),
		)
		.layer(TraceLayer::new_for_http());

	let addr = SocketAddr::from_str(&config.server_ip_port).with_context(|| format!("invalid SERVER_IP_PORT `{}`", config.server_ip_port))?;
	tracing::info!("Start web server on {}", addr);
	axum::Server::bind(&addr)
		.serve(app.into_make_service())
		.with_graceful_shutdown(shutdown_signal())
		.await?;

	bootstrap::shutdown(state).await;
	Ok(())
}

async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(err) = signal::ctrl_c().await {
			tracing::error!("Failed to install Ctrl+C handler: {}", err);
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match signal::unix::signal(signal::unix::SignalKind::terminate()) {
			Ok(mut stream) => {
				stream.recv().await;
			}
			Err(err) => {
				tracing::error!("Failed to install SIGTERM handler: {}", err);
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => tracing::warn!("Received Ctrl+C, shutting down"),
		_ = terminate => tracing::warn!("Received SIGTERM, shutting down"),
	}
}
