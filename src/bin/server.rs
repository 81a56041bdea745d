use std::net::SocketAddr;

use anyhow::Context;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine;
use clap::Parser;
use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use flowergen::FlowerScene;
use flowergen::camera::CameraState;
use flowergen::color::ColorScheme;
use flowergen::config::{ConfigError, FlowerConfig, ParamStore};
use flowergen::presets::{self, Preset};
use flowergen::render::MAX_SIDE;

#[derive(Parser)]
#[command(name = "flowergen-server")]
#[command(about = "HTTP render server for parametric flowers")]
struct Args {
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: SocketAddr,

    /// Image width when a request leaves it out
    #[arg(
        long,
        default_value_t = 768,
        value_parser = clap::value_parser!(u32).range(1..=MAX_SIDE as i64)
    )]
    width: u32,

    /// Image height when a request leaves it out
    #[arg(
        long,
        default_value_t = 768,
        value_parser = clap::value_parser!(u32).range(1..=MAX_SIDE as i64)
    )]
    height: u32,
}

#[derive(Clone, Copy)]
struct AppState {
    width: usize,
    height: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderRequest {
    preset: Option<String>,
    /// Partial config overlaid on the preset.
    config: Option<serde_json::Value>,
    width: Option<usize>,
    height: Option<usize>,
    pitch: Option<f32>,
    yaw: Option<f32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RenderResponse {
    data_url: String,
    config: FlowerConfig,
    width: usize,
    height: usize,
    quads: usize,
    leaves: Vec<LeafEntry>,
    timings: Vec<TimingEntry>,
}

#[derive(Serialize)]
struct LeafEntry {
    leaf: usize,
    segment: usize,
    fallback: bool,
}

#[derive(Serialize)]
struct TimingEntry {
    name: String,
    ms: f64,
}

#[derive(Debug, Error)]
enum ApiError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("image size {0}x{1} out of range (1..={max})", max = MAX_SIDE)]
    BadSize(usize, usize),

    #[error("PNG encode failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("render task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Config(_) | ApiError::BadSize(..) => StatusCode::BAD_REQUEST,
            ApiError::Encode(_) | ApiError::Join(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::warn!(error = %self, "request failed");
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

fn encode_png(rgba: &[u8], w: usize, h: usize) -> Result<String, ApiError> {
    let mut buf = Vec::new();
    let encoder = PngEncoder::new(&mut buf);
    encoder.write_image(rgba, w as u32, h as u32, image::ExtendedColorType::Rgba8)?;
    let b64 = base64::engine::general_purpose::STANDARD.encode(&buf);
    Ok(format!("data:image/png;base64,{}", b64))
}

fn resolve_config(req: &RenderRequest) -> Result<FlowerConfig, ConfigError> {
    let mut store = ParamStore::default();
    if let Some(name) = &req.preset {
        store.apply_preset(name)?;
    }
    if let Some(patch) = &req.config {
        store.apply_json(patch)?;
    }
    Ok(store.snapshot().clamped())
}

async fn render_handler(
    State(state): State<AppState>,
    Json(req): Json<RenderRequest>,
) -> Result<Json<RenderResponse>, ApiError> {
    let config = resolve_config(&req)?;
    if matches!(config.color, ColorScheme::Unknown) {
        tracing::warn!("unknown color mode, using rainbow");
    }
    let width = req.width.unwrap_or(state.width);
    let height = req.height.unwrap_or(state.height);
    let max = MAX_SIDE as usize;
    if !(1..=max).contains(&width) || !(1..=max).contains(&height) {
        return Err(ApiError::BadSize(width, height));
    }
    let defaults = CameraState::default();
    let camera = CameraState::with_angles(
        req.pitch.unwrap_or(defaults.pitch()),
        req.yaw.unwrap_or(defaults.yaw()),
    );

    let response = tokio::task::spawn_blocking(move || -> Result<RenderResponse, ApiError> {
        let mut scene = FlowerScene::default();
        scene.camera = camera;
        let (rgba, stats, timings) = scene.render_image(&config, width, height);

        Ok(RenderResponse {
            data_url: encode_png(&rgba, width, height)?,
            config,
            width,
            height,
            quads: stats.quads,
            leaves: stats
                .leaves
                .iter()
                .map(|p| LeafEntry {
                    leaf: p.leaf,
                    segment: p.segment,
                    fallback: p.fallback,
                })
                .collect(),
            timings: timings
                .iter()
                .map(|t| TimingEntry {
                    name: t.name.to_string(),
                    ms: t.ms,
                })
                .collect(),
        })
    })
    .await??;

    tracing::info!(width, height, quads = response.quads, "rendered");
    Ok(Json(response))
}

async fn presets_handler() -> Json<Vec<Preset>> {
    Json(presets::ALL.to_vec())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let state = AppState {
        width: args.width as usize,
        height: args.height as usize,
    };

    let app = Router::new()
        .route("/api/render", post(render_handler))
        .route("/api/presets", get(presets_handler))
        .layer(CorsLayer::permissive())
        .with_state(state);

    tracing::info!(
        width = args.width,
        height = args.height,
        "flowergen server at http://{}",
        args.addr
    );

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .with_context(|| format!("binding {}", args.addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> RenderRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn preset_with_partial_config_keeps_preset_shape() {
        let req = request(r#"{"preset":"tulip","config":{"color":{"mode":"pink"}}}"#);
        let config = resolve_config(&req).unwrap();
        assert_eq!(config.shape, presets::TULIP.config.shape);
        assert_eq!(config.leaves, presets::TULIP.config.leaves);
        assert_eq!(config.color, ColorScheme::Pink);
    }

    #[test]
    fn unknown_preset_is_a_config_error() {
        let req = request(r#"{"preset":"daisy"}"#);
        assert!(matches!(resolve_config(&req), Err(ConfigError::UnknownPreset(_))));
    }

    #[test]
    fn default_size_is_range_checked() {
        assert!(Args::try_parse_from(["flowergen-server", "--width", "0"]).is_err());
        assert!(Args::try_parse_from(["flowergen-server", "--height", "5000"]).is_err());
        let args = Args::try_parse_from(["flowergen-server", "--width", "512"]).unwrap();
        assert_eq!((args.width, args.height), (512, 768));
    }
}
