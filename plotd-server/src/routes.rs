//! API route handlers.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use plotd_core::{PageSelector, PlotError};
use plotd_renderer::RenderError;

use crate::AppState;

/// Errors recovered into HTTP responses.
///
/// These never propagate into the store's internal state; a failed request
/// leaves the plot history exactly as it was.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Selected page does not exist, was evicted, or the selector is
    /// malformed.
    #[error("Page not found: {0}")]
    NotFound(String),

    /// Malformed query or path parameter.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Destructive operation on a device that is no longer the host's
    /// active plotting target.
    #[error("Device is not the active plotting target")]
    NotActive,

    /// Rendering failed.
    #[error("Render failed: {0}")]
    Render(String),
}

impl From<PlotError> for ApiError {
    fn from(err: PlotError) -> Self {
        match err {
            PlotError::PageNotFound(s) => Self::NotFound(s),
            PlotError::InvalidArgument(s) => Self::InvalidArgument(s),
            PlotError::NotActive => Self::NotActive,
            PlotError::NoOpenPage => Self::NotFound("no open page".to_string()),
        }
    }
}

impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Geometry(s) => Self::InvalidArgument(s),
            RenderError::Resource(s) => Self::Render(s),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::NotActive => StatusCode::CONFLICT,
            Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// Body of `GET /state`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StateBody {
    /// Configured listen host.
    pub host: String,
    /// Bound port.
    pub port: u16,
    /// Whether a bearer token is required. The token value itself is never
    /// reported.
    pub token: bool,
    /// Number of pages in history.
    pub hsize: usize,
    /// Update id for change detection.
    pub upid: u64,
    /// Whether this device is the host's active plotting target.
    pub active: bool,
}

/// Geometry overrides for a render request.
#[derive(Debug, Default, Deserialize)]
pub struct RenderQuery {
    /// Canvas width in pixels; 0 or absent uses the configured default.
    pub width: Option<f64>,
    /// Canvas height in pixels; 0 or absent uses the configured default.
    pub height: Option<f64>,
    /// Base point size; 0 or absent uses the configured default.
    pub pointsize: Option<f64>,
}

/// `GET /state` - compact status snapshot for polling clients.
#[tracing::instrument(name = "state", skip(app))]
pub async fn state(State(app): State<AppState>) -> Json<StateBody> {
    let snap = app.store.snapshot();
    Json(StateBody {
        host: app.config.host.clone(),
        port: app.port,
        token: app.token_required(),
        hsize: snap.hsize,
        upid: snap.upid,
        active: snap.active,
    })
}

/// `GET /plot/{selector}.svg` - render one page on demand.
#[tracing::instrument(name = "plot_svg", skip(app))]
pub async fn plot_svg(
    State(app): State<AppState>,
    Path(selector): Path<String>,
    Query(query): Query<RenderQuery>,
) -> Result<Response, ApiError> {
    let selector = parse_selector(&selector)?;
    let width = geometry(query.width, "width")?;
    let height = geometry(query.height, "height")?;
    let pointsize = geometry(query.pointsize, "pointsize")?;

    // The page is an owned snapshot, so rendering holds no store lock and
    // cannot stall the host's drawing thread.
    let page = app.store.get(selector)?;
    let svg = app.renderer.render(&page, width, height, pointsize)?;
    Ok((
        [(header::CONTENT_TYPE, "image/svg+xml")],
        svg,
    )
        .into_response())
}

/// Body of `DELETE /plot/{selector}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct RemoveBody {
    /// Whether a page was removed.
    pub removed: bool,
}

/// `DELETE /plot/{selector}` - remove one page from history.
#[tracing::instrument(name = "delete_plot", skip(app))]
pub async fn delete_plot(
    State(app): State<AppState>,
    Path(selector): Path<String>,
) -> Result<Json<RemoveBody>, ApiError> {
    require_active(&app)?;
    let selector = parse_selector(&selector)?;
    app.store.remove(selector)?;
    Ok(Json(RemoveBody { removed: true }))
}

/// Body of `DELETE /plot`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClearBody {
    /// Always true; clearing cannot fail.
    pub cleared: bool,
}

/// `DELETE /plot` - clear the whole history.
#[tracing::instrument(name = "clear_plots", skip(app))]
pub async fn clear_plots(State(app): State<AppState>) -> Result<Json<ClearBody>, ApiError> {
    require_active(&app)?;
    app.store.clear();
    Ok(Json(ClearBody { cleared: true }))
}

/// Built-in landing page served at the root when no web-asset root is
/// configured. Unmatched paths are left to the router's default `404`.
pub async fn index(State(app): State<AppState>) -> Html<String> {
    let snap = app.store.snapshot();
    Html(format!(
        "<!DOCTYPE html><html><head><title>plotd</title></head><body>\
         <h1>plotd</h1><p>{} page(s) recorded. Fetch <code>/plot/0.svg</code> \
         for the current page or poll <code>/state</code> for changes.</p>\
         </body></html>",
        snap.hsize
    ))
}

/// Reads are always served, but a device that is no longer the host's
/// selected target refuses to mutate a background session.
fn require_active(app: &AppState) -> Result<(), ApiError> {
    if app.store.is_active() {
        Ok(())
    } else {
        Err(ApiError::NotActive)
    }
}

fn parse_selector(raw: &str) -> Result<PageSelector, ApiError> {
    let trimmed = raw.strip_suffix(".svg").unwrap_or(raw);
    trimmed
        .parse()
        .map_err(|_| ApiError::NotFound(raw.to_string()))
}

fn geometry(value: Option<f64>, name: &str) -> Result<f64, ApiError> {
    match value {
        None => Ok(0.0),
        Some(v) if v.is_finite() && v >= 0.0 => Ok(v),
        Some(v) => Err(ApiError::InvalidArgument(format!(
            "{name} must be a non-negative finite number, got {v}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotd_core::PageId;

    #[test]
    fn selector_strips_svg_suffix() {
        assert_eq!(
            parse_selector("3.svg").expect("selector"),
            PageSelector::Id(PageId(3))
        );
        assert_eq!(
            parse_selector("-1").expect("selector"),
            PageSelector::Relative(-1)
        );
        assert!(parse_selector("cover.svg").is_err());
    }

    #[test]
    fn geometry_validation() {
        assert!((geometry(None, "width").expect("default")).abs() < f64::EPSILON);
        assert!((geometry(Some(400.0), "width").expect("value") - 400.0).abs() < f64::EPSILON);
        assert!(geometry(Some(-1.0), "width").is_err());
        assert!(geometry(Some(f64::NAN), "width").is_err());
    }

    #[test]
    fn error_status_mapping() {
        let resp = ApiError::NotFound("2".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let resp = ApiError::InvalidArgument("w".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let resp = ApiError::NotActive.into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }
}
