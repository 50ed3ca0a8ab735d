// MediDoctor Core Library
// AI-assisted visual triage demo: mock injury scan, risk triage, doctor booking

pub mod db;
pub mod error;
pub mod routes;
pub mod services;
pub mod settings;

use anyhow::Context;
use tokio::net::TcpListener;

/// Start the MediDoctor API and serve until Ctrl-C
pub async fn run() -> anyhow::Result<()> {
    let settings = settings::Settings::load()?;

    std::fs::create_dir_all(&settings.data_dir)
        .with_context(|| format!("Failed to create data dir {:?}", settings.data_dir))?;
    std::fs::create_dir_all(&settings.upload_dir)
        .with_context(|| format!("Failed to create upload dir {:?}", settings.upload_dir))?;

    let db_path = settings.db_path();
    let db = db::Database::new(&db_path).context("Failed to initialize database")?;
    db.run_migrations().context("Failed to run migrations")?;

    let seeded = db
        .seed_doctors(services::doctors::SEED_DOCTORS)
        .context("Failed to seed doctors")?;
    if seeded > 0 {
        log::info!("Seeded {} doctors", seeded);
    }

    let addr = settings.bind_addr();
    let state = routes::AppState::new(db, settings);
    let app = routes::router(state);

    let listener = TcpListener::bind(addr.as_str())
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    log::info!("MediDoctor API started on http://{}, database at {:?}", addr, db_path);
    log::warn!("PROTOTYPE ONLY - Not for medical use");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    log::info!("MediDoctor API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl-C: {}", e);
    }
}
