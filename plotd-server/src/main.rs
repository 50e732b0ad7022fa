//! # plotd
//!
//! Standalone demo server for the plot-history engine. Embedders normally
//! create devices through [`DeviceRegistry`] from their own runtime; this
//! binary stands up a single device, records a sample page, and serves it
//! until interrupted.

use std::path::PathBuf;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use plotd_core::{Color, DrawingPrimitive, PageStyle, Style, TextStyle};
use plotd_renderer::RenderConfig;
use plotd_server::{DeviceRegistry, ServerConfig};

/// Default port for the plotd server.
const DEFAULT_PORT: u16 = 8288;

/// Initialize structured tracing.
///
/// Set `RUST_LOG` to control log levels (default: info,plotd_server=debug).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,plotd_server=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

fn env_flag(name: &str) -> bool {
    std::env::var(name).is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

fn config_from_env() -> (ServerConfig, usize) {
    let host = std::env::var("PLOTD_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PLOTD_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let history_limit = std::env::var("PLOTD_HISTORY")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(plotd_core::store::DEFAULT_HISTORY_LIMIT);

    let config = ServerConfig {
        host,
        port,
        cors: env_flag("PLOTD_CORS"),
        www_root: std::env::var("PLOTD_WWW").ok().map(PathBuf::from),
        silent: env_flag("PLOTD_SILENT"),
        enabled: true,
        token: None,
    }
    .with_token(std::env::var("PLOTD_TOKEN").unwrap_or_default());

    (config, history_limit)
}

/// Record a small sample plot so the server has something to show.
fn record_demo_page(device: &plotd_server::PlotDevice) {
    let recorder = device.recorder();
    recorder.page_begin(PageStyle::default());

    let axis = Style {
        stroke: Some(Color::rgb(64, 64, 64)),
        ..Style::default()
    };
    let curve = Style {
        stroke: Some(Color::rgb(31, 119, 180)),
        line_width: 2.0,
        ..Style::default()
    };

    let points: Vec<(f64, f64)> = (0..=60)
        .map(|i| {
            let x = f64::from(i) / 60.0;
            (60.0 + x * 600.0, 288.0 - (x * std::f64::consts::TAU).sin() * 200.0)
        })
        .collect();

    let draws = [
        DrawingPrimitive::Line {
            from: (60.0, 288.0),
            to: (660.0, 288.0),
            style: axis.clone(),
        },
        DrawingPrimitive::Line {
            from: (60.0, 88.0),
            to: (60.0, 488.0),
            style: axis,
        },
        DrawingPrimitive::Polyline {
            points,
            style: curve,
        },
        DrawingPrimitive::Text {
            pos: (360.0, 40.0),
            content: "plotd demo".to_string(),
            rotation: 0.0,
            hadj: 0.5,
            font: TextStyle {
                size: 16.0,
                ..TextStyle::default()
            },
        },
    ];
    for primitive in draws {
        if let Err(e) = recorder.record(primitive) {
            tracing::warn!("demo draw failed: {e}");
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let (config, history_limit) = config_from_env();
    let silent = config.silent;

    let registry = DeviceRegistry::new();
    let device = registry.create(config, RenderConfig::default(), history_limit);
    registry.set_active(device.id());
    record_demo_page(&device);

    let addr = device
        .start_server()
        .await?
        .ok_or_else(|| anyhow::anyhow!("server disabled by configuration"))?;

    if !silent {
        tracing::info!("open http://{addr}/plot/0.svg in your browser");
        tracing::info!("poll http://{addr}/state for changes");
    }

    tokio::signal::ctrl_c().await?;
    tracing::info!("interrupt received, shutting down");
    registry.shutdown(device.id()).await;

    Ok(())
}
