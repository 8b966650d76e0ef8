//! Tahajjud Timer - last third of the night countdown server
//!
//! This is the main entry point for the tahajjud-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use tahajjud_timer::{
    config::{Config, StartupSource},
    state::AppState,
    api::create_router,
    services::{
        load_for_city, load_for_coordinates, load_manual, AladhanProvider, BigDataCloudResolver,
    },
    tasks::{countdown_task, schedule_refresh_task},
    time::SystemClock,
    utils::shutdown_signal,
};

/// Load the schedule requested on the command line, if any
async fn load_startup_schedule(state: &AppState, source: StartupSource) {
    let result = match source {
        StartupSource::None => {
            info!("No startup location given, waiting for POST /city, /coordinates or /manual");
            return;
        }
        StartupSource::City(city) => load_for_city(
            state.resolver.as_ref(),
            state.prayer_provider.as_ref(),
            state.clock.as_ref(),
            &city,
        )
        .await
        .map(|schedule| ("city", schedule)),
        StartupSource::Coordinates { latitude, longitude } => load_for_coordinates(
            state.resolver.as_ref(),
            state.prayer_provider.as_ref(),
            state.clock.as_ref(),
            latitude,
            longitude,
        )
        .await
        .map(|schedule| ("coordinates", schedule)),
        StartupSource::Manual { maghrib, fajr } => {
            load_manual(state.clock.as_ref(), &maghrib, &fajr).map(|schedule| ("manual", schedule))
        }
    };

    match result {
        Ok((action, schedule)) => {
            if let Err(e) = state.set_schedule(action, schedule) {
                error!("Failed to store startup schedule: {}", e);
            }
        }
        // The server keeps running so times can still be supplied over HTTP
        Err(e) => warn!("Failed to load startup schedule: {}", e),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("tahajjud_timer={},tower_http=info", config.log_level()))
        .init();

    config.validate().map_err(anyhow::Error::msg)?;

    info!("Starting tahajjud-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, method={}, refresh={}s",
          config.host, config.port, config.method, config.refresh_secs);

    let resolver = BigDataCloudResolver::new(config.geo_api.clone())?;
    let provider = AladhanProvider::new(config.prayer_api.clone(), config.method)?;

    // Create application state
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        Arc::new(SystemClock),
        Arc::new(resolver),
        Arc::new(provider),
    ));

    // Start the countdown background task before any schedule is loaded
    let countdown_state = Arc::clone(&state);
    tokio::spawn(async move {
        countdown_task(countdown_state).await;
    });

    // Start the daily refresh background task
    let refresh_state = Arc::clone(&state);
    let refresh_period = config.refresh_period();
    tokio::spawn(async move {
        schedule_refresh_task(refresh_state, refresh_period).await;
    });

    load_startup_schedule(&state, config.startup_source()).await;

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST   /city        - Load prayer times for a city");
    info!("  POST   /coordinates - Load prayer times for latitude/longitude");
    info!("  POST   /manual      - Set Maghrib and Fajr by hand (HH:MM)");
    info!("  DELETE /schedule    - Clear the schedule and stop the countdown");
    info!("  GET    /window      - Current Tahajjud window");
    info!("  GET    /countdown   - Time until the next window boundary");
    info!("  GET    /status      - Schedule, countdown and server status");
    info!("  GET    /health      - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
