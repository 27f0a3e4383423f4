use std::sync::Arc;

use anyhow::anyhow;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use social_proof::domain::schedule::Phase;
use social_proof::infra::{console::ConsoleTarget, image_probe::HttpImageProbe, sheets::SheetsFeed};
use social_proof::{Widget, WidgetConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = WidgetConfig::from_env()?;
    if config.spreadsheet_id.is_none() {
        return Err(anyhow!("missing required env var: SPW_SPREADSHEET_ID"));
    }

    let feed = SheetsFeed::from_config(&config)?;
    tracing::info!(url = %feed.url(), "using spreadsheet feed");
    let probe = HttpImageProbe::new()?;

    let target = Arc::new(ConsoleTarget::new("social-proof"));
    let mut widget = Widget::new(config, Arc::new(feed), Arc::new(probe), target);
    tracing::info!(container = %widget.container_id(), "starting widget");

    if widget.init().await == 0 {
        tracing::warn!("nothing to display");
        return Ok(());
    }
    let mut phases = widget
        .subscribe()
        .ok_or_else(|| anyhow!("widget has no display cycle"))?;

    tokio::select! {
        result = phases.wait_for(|phase| *phase == Phase::Stopped) => {
            if let Err(err) = result {
                tracing::warn!(error = %err, "display cycle ended unexpectedly");
            }
        }
        _ = shutdown_signal() => {}
    }

    widget.destroy();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
