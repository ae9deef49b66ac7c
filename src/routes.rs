use axum::{
    extract::{DefaultBodyLimit, FromRef},
    http::{HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::database::models::{AssetKind, CctvDetail, ComputerDetail, OtherDetail};
use crate::handlers::{elevated, protected, public};
use crate::middleware::{jwt_auth_middleware, require_admin};
use crate::services::AssetService;
use crate::state::AppState;

/// Full application router over the given state
pub fn app(config: &AppConfig, state: AppState) -> Router {
    let api = Router::new()
        .merge(asset_routes::<CctvDetail>("/cctvs"))
        .merge(asset_routes::<ComputerDetail>("/computers"))
        .merge(asset_routes::<OtherDetail>("/others"))
        .merge(stock_routes())
        .merge(history_routes())
        .merge(genunit_routes())
        .merge(checklist_routes())
        .merge(user_routes())
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    let router = Router::new()
        // Public
        .route("/", get(public::info::root))
        .route("/health", get(public::info::health))
        .route("/auth/login", post(public::auth::login))
        .route("/auth/refresh", post(public::auth::refresh))
        // Protected
        .nest("/api", api)
        // Elevated
        .nest("/api/admin", admin_routes(state.clone()))
        // Global middleware
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(cors_layer(config))
        .with_state(state);

    if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if !config.security.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers(Any)
}

/// The three asset registries share one generic handler set
fn asset_routes<D>(path: &str) -> Router<AppState>
where
    D: AssetKind,
    AssetService<D>: FromRef<AppState>,
{
    use protected::assets;

    Router::new()
        .route(path, get(assets::find::<D>).post(assets::insert::<D>))
        .route(
            &format!("{}/:id", path),
            get(assets::get::<D>).put(assets::edit::<D>).delete(assets::delete::<D>),
        )
        .route(&format!("{}/:id/disable", path), put(assets::disable::<D>))
}

fn stock_routes() -> Router<AppState> {
    use protected::stocks;

    Router::new()
        .route("/stocks", get(stocks::find).post(stocks::insert))
        .route("/stocks/:id", get(stocks::get).put(stocks::edit).delete(stocks::delete))
        .route("/stocks/:id/disable", put(stocks::disable))
        .route("/stocks/:id/increment", post(stocks::increment))
        .route("/stocks/:id/decrement", post(stocks::decrement))
}

fn history_routes() -> Router<AppState> {
    use protected::histories;

    Router::new()
        .route("/histories", get(histories::find).post(histories::insert))
        .route("/histories/parent/:parent_id", get(histories::find_for_parent))
        .route(
            "/histories/:id",
            get(histories::get).put(histories::edit).delete(histories::delete),
        )
}

fn genunit_routes() -> Router<AppState> {
    use protected::genunits;

    Router::new()
        .route("/genunits", get(genunits::find))
        .route("/genunits/:id", get(genunits::get))
}

fn checklist_routes() -> Router<AppState> {
    use axum::routing::patch;
    use protected::checklists;

    Router::new()
        .route("/checklists/:kind", get(checklists::find).post(checklists::create))
        .route("/checklists/:kind/:id", get(checklists::get).delete(checklists::delete))
        .route("/checklists/:kind/:id/items/:item_id", patch(checklists::update_item))
        .route("/checklists/:kind/:id/finish", post(checklists::finish))
}

fn user_routes() -> Router<AppState> {
    use protected::users;

    Router::new()
        .route("/users", get(users::find))
        .route("/users/me", get(users::me))
        .route("/users/me/password", put(users::change_password))
        .route("/users/:id", get(users::get))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    use elevated::{genunits, users};

    // route_layer: last added runs first, so the token is checked before the role
    Router::new()
        .route("/users", post(users::register))
        .route("/users/:id", put(users::edit).delete(users::delete))
        .route("/users/:id/password", put(users::reset_password))
        .route("/genunits/pings", put(genunits::update_pings))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}
