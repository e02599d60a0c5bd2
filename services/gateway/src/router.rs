use crate::handlers::{asset, auth, order};
use crate::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/assets", get(asset::list_assets))
        .route("/assets/{asset_name}", get(asset::get_asset))
        .route("/orders", post(order::create_order).get(order::list_orders))
        .route("/orders/pending", get(order::list_pending_orders))
        .route("/orders/{id}", delete(order::cancel_order))
        .route("/orders/{id}/match", post(order::match_order));

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
