//! Serve command - runs the lexlist HTTP API.

use std::sync::Arc;

use lexlist::{
    Clock, Store, SystemClock,
    backend::database::InMemory,
    list::ListConfig,
};
use tokio::signal::unix::{SignalKind, signal};

use crate::backend::{JSON_FILE, create_backend, data_dir};
use crate::cli::ServeArgs;
use crate::server::{AppState, backend_name, router};
use crate::session::SessionStore;

/// Run the lexlist server
pub async fn run(args: &ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    // Create the storage backend
    let backend = create_backend(&args.backend_config).await?;
    let config = ListConfig {
        max_rank_length: args.max_rank_length,
    };
    let store = Store::open(backend, config);

    if let (Some(username), Some(password)) = (&args.admin_username, &args.admin_password) {
        let admin = store.ensure_admin(username, password).await?;
        tracing::info!(user_id = %admin.id, username = %admin.username, "admin account ready");
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let sessions = SessionStore::new(clock, args.session_ttl_minutes);

    let app = router(AppState {
        store: store.clone(),
        sessions,
    });

    // Bind server
    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        %local_addr,
        backend = backend_name(&store),
        max_rank_length = args.max_rank_length,
        "lexlist server started"
    );
    println!("lexlist listening on http://{local_addr}");
    println!("Press Ctrl+C to shutdown");

    let json_path = data_dir(&args.backend_config).join(JSON_FILE);

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Save database on shutdown (only needed for InMemory backend)
    if let Some(in_memory_backend) = store.backend().as_any().downcast_ref::<InMemory>() {
        match in_memory_backend.save_to_file(&json_path).await {
            Ok(()) => {
                tracing::info!("Database saved to {}", json_path.display());
                println!("\nDatabase saved successfully");
            }
            Err(e) => {
                tracing::error!("Failed to save database: {e:?}");
                eprintln!("Failed to save database: {e:?}");
            }
        }
    }

    println!("Server shut down");
    Ok(())
}

/// Resolve on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to set up SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for SIGINT: {e}");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = interrupt => tracing::info!("Received SIGINT, initiating graceful shutdown..."),
        _ = terminate => tracing::info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
