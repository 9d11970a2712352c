use crate::adapters::openmeteo::OpenMeteoClient;
use crate::app::api::{auth::Credentials, create_router, AppState};
use crate::app::scheduler::ModelScheduler;
use crate::config::{Settings, ADMIN_USERNAME};
use crate::core::solar::SolarService;
use crate::core::weather::WeatherService;
use crate::utils::error::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;

/// Wires the forecast client, the weather service and the solar service.
pub fn build_solar_service(settings: &Settings) -> Arc<SolarService> {
    let client = OpenMeteoClient::new(settings.openmeteo_endpoint.clone());
    let weather = Arc::new(WeatherService::new(
        Arc::new(client),
        settings.location.clone(),
    ));
    Arc::new(SolarService::new(settings.model_chain(), weather))
}

/// Runs the service until Ctrl+C or SIGTERM.
pub async fn serve(settings: Settings, addr: SocketAddr) -> Result<()> {
    let solar = build_solar_service(&settings);

    if let Err(e) = solar.run_model(None, None).await {
        tracing::warn!("Initial model run failed: {}", e);
        tracing::warn!("💡 Suggestion: {}", e.recovery_suggestion());
    }

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("API server listening on {}", addr);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = ModelScheduler::new(solar.clone()).spawn(shutdown_rx);

    let state = AppState::new(
        solar,
        Credentials::new(ADMIN_USERNAME, settings.api_admin_pass.clone()),
    );
    let served = axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    let _ = shutdown_tx.send(true);
    if let Err(e) = scheduler.await {
        tracing::error!("Scheduler task error: {}", e);
    }
    served?;

    tracing::info!("Shutting down Madame Soleil");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}
