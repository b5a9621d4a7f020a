//! Bankroll is a web app for running a shared betting bankroll.
//!
//! It tracks the money of a group of people across bookmaker accounts and
//! payment methods, records single bets and surebets, splits bet profits
//! between partners and accrues fees for the people lending their accounts.
//!
//! This library provides a REST API that directly serves HTML pages. The
//! bookkeeping rules live in the hosted PostgreSQL database and are reached
//! through the `Backend` trait.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod backend;
mod bankroll;
mod betting;
mod endpoints;
mod error;
mod fees;
mod form;
mod grouping;
mod html;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod partner;
mod routing;
mod summary;
mod timezone;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use backend::PgBackend;
pub use error::Error;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use timezone::get_local_timezone;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Could not listen for the ctrl+c signal: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(error) => {
                tracing::error!("Could not listen for the terminate signal: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
