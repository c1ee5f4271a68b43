use core::{future, net::SocketAddr};

use coverage_common::ToolDescriptor;
use eyre::WrapErr as _;
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};

use crate::{
    config::Settings, dispatch::Dispatcher, http::router, registry::ToolRegistry, state::AppState,
};

/// Creates a future that resolves when a shutdown signal is received.
pub(crate) async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {e}");
            future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {e}");
                future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Received shutdown, shutting down");
}

/// Wires the registry, dispatcher and router together, registers the coverage
/// tool and serves HTTP and the binary socket on one listener.
///
/// Prints `coverageServer started on port <port>` to stdout once the listener is bound.
///
/// # Errors
///
/// Returns an error if registration fails, the address cannot be bound or the server fails.
pub async fn start(settings: Settings) -> eyre::Result<()> {
    let registry = ToolRegistry::default();
    let dispatcher = Dispatcher::new(settings.tools_dir);
    let app_state = AppState::new(registry.clone(), dispatcher, settings.socket_request_timeout);
    let app = router::create_app(app_state.clone());

    let tool = ToolDescriptor::coverage();
    match app_state.dispatcher.script_path(&tool) {
        Ok(script) if !script.is_file() => {
            warn!(
                "Script for '{}' not found at {}, requests for it will fail",
                tool.name,
                script.display()
            );
        }
        Ok(_) => {}
        Err(e) => warn!("{e}"),
    }
    registry
        .register(tool)
        .wrap_err("Failed to register coverage tool")?;

    let addr = SocketAddr::from((settings.bind, settings.port));
    let listener = TcpListener::bind(addr)
        .await
        .wrap_err(format!("Failed to bind {addr}"))?;
    let local_addr = listener.local_addr()?;
    info!(
        tools_dir = %app_state.dispatcher.tools_dir().display(),
        "Listening on http://{local_addr}"
    );
    println!("coverageServer started on port {}", local_addr.port());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("HTTP server failed")?;
    Ok(())
}
