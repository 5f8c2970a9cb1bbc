use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

use fleet_dashboard::build_router;
use fleet_dashboard::config::EnvironmentConfig;
use fleet_dashboard::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();
    let config = EnvironmentConfig::from_env()?;

    // Configurar logging
    let level = if config.is_production() {
        tracing::Level::INFO
    } else {
        tracing::Level::DEBUG
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    info!("🚚 Fleet Dashboard - API");
    info!("================================================");

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let server_url = config.server_url();

    let app_state = match AppState::from_config(config).await {
        Ok(state) => state,
        Err(e) => {
            error!("❌ Error inicializando el servicio: {}", e);
            return Err(e);
        }
    };

    info!(
        "🗄️ Almacén: {} | Cache: {}",
        app_state.repository.store_name(),
        app_state.cache.backend_name()
    );

    let app = build_router(app_state);

    info!("🌐 Servidor iniciando en {}", server_url);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health");
    info!("🚛 /api/vehicles  - registro de vehículos");
    info!("🧑‍✈️ /api/drivers   - roster de conductores");
    info!("🗺️ /api/trips     - viajes (dispatch / complete / cancel)");
    info!("🔧 /api/maintenance - mantenimiento");
    info!("⛽ /api/fuel-logs - combustible y gastos");
    info!("📊 /api/analytics - overview, ROI, eficiencia, exportación CSV");
    info!("🤖 POST /api/ai/chat - asistente (SSE)");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
