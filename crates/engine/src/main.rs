//! Holdfast Engine - Main entry point.
//!
//! Loads a world snapshot into the in-memory adapters, audits it and logs the
//! load of every container.

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use holdfast_engine::infrastructure::config::AppConfig;
use holdfast_engine::infrastructure::memory::WorldSnapshot;
use holdfast_engine::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "holdfast_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Holdfast Engine");

    let config = AppConfig::from_env()?;
    tracing::info!(
        max_commit_attempts = config.containment.max_commit_attempts,
        "Containment configured"
    );

    let snapshot = match &config.seed_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading world snapshot");
            WorldSnapshot::read(path)
                .await
                .with_context(|| format!("Failed to load snapshot {}", path.display()))?
        }
        None => {
            tracing::info!("HOLDFAST_SEED_PATH not set, starting with an empty world");
            WorldSnapshot::default()
        }
    };

    let app = App::from_snapshot(snapshot, config.containment)?;
    let ops = &app.use_cases.containment;

    let report = ops.audit().await?;
    for violation in &report.violations {
        tracing::warn!(%violation, "Containment invariant violated");
    }

    for record in app.repositories.items.list_all().await? {
        let is_container = app
            .repositories
            .catalog
            .get(record.item.template_id)
            .await?
            .is_some_and(|t| t.is_container());
        if !is_container {
            continue;
        }
        let capacity = ops.get_capacity(record.item.id).await?;
        tracing::info!(
            container_id = %capacity.container_id,
            weight = capacity.current_weight,
            max_weight = ?capacity.max_weight,
            volume = capacity.current_volume,
            max_volume = ?capacity.max_volume,
            items = capacity.item_count,
            "Container load"
        );
    }

    tracing::info!(items = report.items_checked, "Holdfast Engine ready");
    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
