//! Coverage server: registers the coverage tool and serves it over HTTP and a binary socket.
//!
//! Exposes `inner_main` so a workspace-level shim binary can call into the server logic.

extern crate alloc;
extern crate core;

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod http;
pub mod registry;
pub mod run;
pub mod state;
pub mod websocket;

use std::{io, panic, process, sync::Once};

use eyre::Result;
use tracing::{Instrument as _, error, info};
use tracing_subscriber::{EnvFilter, fmt::time::ChronoLocal};

use cli::{Cli, LogFormat};
use config::Settings;

static INIT_TRACING: Once = Once::new();
static INIT_PANIC_HOOK: Once = Once::new();

/// The server's main function; can be called from a shim binary.
///
/// # Errors
///
/// Returns an error if the configuration cannot be resolved or the server fails to start.
pub async fn inner_main(invocation: Cli) -> Result<()> {
    init_tracing(invocation.log_format);
    install_panic_hook();

    let startup_span = tracing::info_span!(
        "coverage.startup",
        pid = process::id(),
        version = env!("CARGO_PKG_VERSION")
    );

    async move {
        let settings = Settings::resolve(&invocation).await?;
        info!(?settings, "Starting coverage server");
        run::start(settings).await
    }
    .instrument(startup_span)
    .await
}

/// Logs go to stderr, stdout carries only the startup line.
fn init_tracing(format: LogFormat) {
    INIT_TRACING.call_once(move || {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_timer(ChronoLocal::rfc_3339())
            .with_writer(io::stderr);

        match format {
            LogFormat::Compact => builder.compact().init(),
            LogFormat::Json => builder.json().init(),
            LogFormat::Pretty => builder.pretty().init(),
        }
    });
}

/// Routes panics to the log instead of stderr. Handler panics are recovered per request by the router.
fn install_panic_hook() {
    INIT_PANIC_HOOK.call_once(|| {
        panic::set_hook(Box::new(|info| {
            let location = info
                .location()
                .map(ToString::to_string)
                .unwrap_or_default();
            error!(
                %location,
                "Panic: {}",
                http::middleware::panic_message(info.payload())
            );
        }));
    });
}
