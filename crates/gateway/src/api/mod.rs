pub mod admin;
pub mod logout;
pub mod widget;

use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::services::ServeDir;

use crate::inject;
use crate::state::AppState;

/// Build the gateway's own routes.
///
/// `/admin/*` handlers are gated by the [`admin::AdminGuard`] extractor;
/// the rest are public.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(admin::health))
        // Sign-out hook (sets the reset marker)
        .route("/chatwoot/logout", get(logout::logout).post(logout::logout))
        // Fragments for external renderers
        .route("/v1/widget", get(widget::widget))
        // Admin
        .route(
            "/admin/chatwoot",
            get(admin::show_settings).post(admin::save_settings),
        )
        .route("/admin/chatwoot/info", get(admin::system_info))
}

/// Full application: gateway routes plus the site's pages, which are
/// served from `site.pages_dir` with the widget injected.
pub fn app(state: AppState) -> Router {
    let pages = Router::new()
        .fallback_service(ServeDir::new(&state.config.site.pages_dir))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            inject::inject_widget,
        ));

    router().merge(pages).with_state(state)
}
