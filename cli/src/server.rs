use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, Request, State, rejection::JsonRejection},
    http::{HeaderValue, Method, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use recipebox_core::error::RecipeError;
use recipebox_core::models::{DeleteAck, NewRecipe, Recipe, RecipeUpdate, parse_recipe_id};
use recipebox_core::service::RecipeService;

const BODY_LIMIT: usize = 1024 * 1024; // 1 MB

#[derive(Clone)]
pub(crate) struct AppState {
    service: Arc<Mutex<RecipeService>>,
}

impl AppState {
    pub(crate) fn new(service: RecipeService) -> Self {
        Self {
            service: Arc::new(Mutex::new(service)),
        }
    }

    fn service(&self) -> MutexGuard<'_, RecipeService> {
        self.service.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// --- Error handling ---

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    BadRequest(String),
    PayloadTooLarge(String),
    Store(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            Self::Store(err) => {
                tracing::error!("recipe store error: {err:#}");
                (
                    StatusCode::BAD_REQUEST,
                    "Recipe store request failed".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<RecipeError> for ApiError {
    fn from(err: RecipeError) -> Self {
        match err {
            RecipeError::Validation(msg) => Self::BadRequest(msg),
            RecipeError::NotFound(_) => Self::NotFound(err.to_string()),
            RecipeError::Store(e) => Self::Store(e),
        }
    }
}

// Any unreadable body is a 400, except one cut off by the body limit.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge(rejection.body_text())
        } else {
            Self::BadRequest(rejection.body_text())
        }
    }
}

// --- Middleware ---

async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static("default-src 'none'"),
    );
    response
}

// The browser client is served from another origin during development.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}

// --- Handlers ---

async fn home() -> &'static str {
    "Welcome to the Recipe Management API"
}

async fn create_recipe(
    State(state): State<AppState>,
    payload: Result<Json<NewRecipe>, JsonRejection>,
) -> Result<(StatusCode, Json<Recipe>), ApiError> {
    let Json(fields) = payload?;
    let recipe = state.service().create(fields)?;
    tracing::info!(id = %recipe.id, name = %recipe.name, "created recipe");
    Ok((StatusCode::CREATED, Json(recipe)))
}

async fn list_recipes(State(state): State<AppState>) -> Result<Json<Vec<Recipe>>, ApiError> {
    let recipes = state.service().list_all()?;
    Ok(Json(recipes))
}

async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Recipe>, ApiError> {
    let id = parse_recipe_id(&id)?;
    let recipe = state.service().get_by_id(id)?;
    Ok(Json(recipe))
}

async fn update_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<RecipeUpdate>, JsonRejection>,
) -> Result<Json<Recipe>, ApiError> {
    let id = parse_recipe_id(&id)?;
    let Json(fields) = payload?;
    let recipe = state.service().update(id, fields)?;
    tracing::info!(%id, "updated recipe");
    Ok(Json(recipe))
}

async fn delete_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteAck>, ApiError> {
    let id = parse_recipe_id(&id)?;
    let ack = state.service().delete(id)?;
    tracing::info!(%id, "deleted recipe");
    Ok(Json(ack))
}

pub(crate) fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/api/recipes", get(list_recipes).post(create_recipe))
        .route("/api/recipes/add", post(create_recipe))
        .route("/api/recipes/update/{id}", put(update_recipe))
        .route(
            "/api/recipes/{id}",
            get(get_recipe).put(update_recipe).delete(delete_recipe),
        )
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(security_headers))
        .with_state(state)
}

// --- Server startup ---

pub async fn start_server(service: RecipeService, port: u16, bind: &str) -> anyhow::Result<()> {
    let app = build_router(AppState::new(service));

    let addr = format!("{bind}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Server running on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received Ctrl+C, shutting down");
}

/// Serve an in-memory store on an ephemeral port; returns the base URL.
#[cfg(test)]
pub(crate) async fn spawn_test_server() -> String {
    let app = build_router(AppState::new(RecipeService::new_in_memory().unwrap()));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn test_app() -> Router {
        build_router(AppState::new(RecipeService::new_in_memory().unwrap()))
    }

    async fn send(app: &Router, request: axum::http::Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    fn json_request(method: &str, uri: &str, body: &serde_json::Value) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn pasta() -> serde_json::Value {
        serde_json::json!({
            "name": "Pasta",
            "ingredients": ["tomato", "basil"],
            "instructions": "Boil and toss.",
            "category": "Dinner",
        })
    }

    async fn create(app: &Router, body: &serde_json::Value) -> serde_json::Value {
        let (status, json) = send(app, json_request("POST", "/api/recipes/add", body)).await;
        assert_eq!(status, StatusCode::CREATED);
        json
    }

    #[tokio::test]
    async fn home_route_returns_welcome() {
        let app = test_app();
        let response = app.oneshot(empty_request("GET", "/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"Welcome to the Recipe Management API");
    }

    #[tokio::test]
    async fn create_returns_201_with_record() {
        let app = test_app();
        let json = create(&app, &pasta()).await;

        assert_eq!(json["name"], "Pasta");
        assert_eq!(json["ingredients"], serde_json::json!(["tomato", "basil"]));
        assert_eq!(json["category"], "Dinner");
        assert_eq!(json["isFavorite"], false);
        assert!(Uuid::parse_str(json["_id"].as_str().unwrap()).is_ok());
        assert!(json["createdAt"].is_string());
    }

    #[tokio::test]
    async fn create_on_collection_path_is_accepted() {
        let app = test_app();
        let (status, json) = send(&app, json_request("POST", "/api/recipes", &pasta())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["name"], "Pasta");
    }

    #[tokio::test]
    async fn create_without_name_returns_400() {
        let app = test_app();
        let body = serde_json::json!({ "ingredients": ["egg"], "category": "Breakfast" });
        let (status, json) = send(&app, json_request("POST", "/api/recipes/add", &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("name"));

        let body = serde_json::json!({ "name": "", "ingredients": ["egg"] });
        let (status, _) = send(&app, json_request("POST", "/api/recipes/add", &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, list) = send(&app, empty_request("GET", "/api/recipes")).await;
        assert_eq!(list, serde_json::json!([]));
    }

    #[tokio::test]
    async fn malformed_json_returns_400_with_error_body() {
        let app = test_app();
        let request = axum::http::Request::post("/api/recipes/add")
            .header("content-type", "application/json")
            .body(Body::from("{\"name\": "))
            .unwrap();
        let (status, json) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn list_returns_all_in_insertion_order() {
        let app = test_app();
        create(&app, &pasta()).await;
        create(&app, &serde_json::json!({ "name": "Salad", "category": "Lunch" })).await;

        let (status, json) = send(&app, empty_request("GET", "/api/recipes")).await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Pasta", "Salad"]);
    }

    #[tokio::test]
    async fn get_by_id_returns_created_record() {
        let app = test_app();
        let created = create(&app, &pasta()).await;
        let id = created["_id"].as_str().unwrap();

        let (status, json) = send(&app, empty_request("GET", &format!("/api/recipes/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, created);
    }

    #[tokio::test]
    async fn get_missing_returns_404() {
        let app = test_app();
        let uri = format!("/api/recipes/{}", Uuid::new_v4());
        let (status, json) = send(&app, empty_request("GET", &uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Recipe not found");
    }

    #[tokio::test]
    async fn malformed_id_returns_400() {
        let app = test_app();
        let (status, json) = send(&app, empty_request("GET", "/api/recipes/not-an-id")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("not-an-id"));
    }

    #[tokio::test]
    async fn update_ignores_id_and_created_at() {
        let app = test_app();
        let created = create(&app, &pasta()).await;
        let id = created["_id"].as_str().unwrap();

        let body = serde_json::json!({
            "_id": Uuid::new_v4().to_string(),
            "createdAt": "2001-01-01T00:00:00Z",
            "name": "Penne",
            "isFavorite": true,
        });
        let (status, json) = send(
            &app,
            json_request("PUT", &format!("/api/recipes/update/{id}"), &body),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["_id"], created["_id"]);
        assert_eq!(json["createdAt"], created["createdAt"]);
        assert_eq!(json["name"], "Penne");
        assert_eq!(json["isFavorite"], true);
        assert_eq!(json["ingredients"], created["ingredients"]);
    }

    #[tokio::test]
    async fn update_on_item_path_is_accepted() {
        let app = test_app();
        let created = create(&app, &pasta()).await;
        let id = created["_id"].as_str().unwrap();

        let body = serde_json::json!({ "category": "Lunch" });
        let (status, json) =
            send(&app, json_request("PUT", &format!("/api/recipes/{id}"), &body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["category"], "Lunch");
    }

    #[tokio::test]
    async fn update_missing_returns_404() {
        let app = test_app();
        let uri = format!("/api/recipes/update/{}", Uuid::new_v4());
        let body = serde_json::json!({ "name": "Ghost" });
        let (status, json) = send(&app, json_request("PUT", &uri, &body)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Recipe not found");
    }

    #[tokio::test]
    async fn update_blank_name_returns_400() {
        let app = test_app();
        let created = create(&app, &pasta()).await;
        let id = created["_id"].as_str().unwrap();
        let body = serde_json::json!({ "name": "  " });
        let (status, _) = send(
            &app,
            json_request("PUT", &format!("/api/recipes/update/{id}"), &body),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_then_get_returns_404() {
        let app = test_app();
        let created = create(&app, &pasta()).await;
        let uri = format!("/api/recipes/{}", created["_id"].as_str().unwrap());

        let (status, json) = send(&app, empty_request("DELETE", &uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "Recipe deleted successfully");

        let (status, _) = send(&app, empty_request("GET", &uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_missing_returns_404() {
        let app = test_app();
        let uri = format!("/api/recipes/{}", Uuid::new_v4());
        let (status, json) = send(&app, empty_request("DELETE", &uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Recipe not found");
    }

    #[tokio::test]
    async fn cors_allows_any_origin() {
        let app = test_app();
        let request = axum::http::Request::get("/api/recipes")
            .header("origin", "http://localhost:3000")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn cors_preflight_succeeds() {
        let app = test_app();
        let request = axum::http::Request::builder()
            .method("OPTIONS")
            .uri("/api/recipes/add")
            .header("origin", "http://localhost:3000")
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-type")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert!(response.status().is_success());
        let methods = response
            .headers()
            .get("access-control-allow-methods")
            .unwrap()
            .to_str()
            .unwrap();
        assert!(methods.contains("POST"));
        assert!(methods.contains("DELETE"));
    }

    #[tokio::test]
    async fn security_headers_present() {
        let app = test_app();
        let response = app
            .oneshot(empty_request("GET", "/api/recipes"))
            .await
            .unwrap();

        assert_eq!(
            response.headers().get("x-content-type-options").unwrap(),
            "nosniff"
        );
        assert_eq!(response.headers().get("x-frame-options").unwrap(), "DENY");
        assert_eq!(
            response.headers().get("content-security-policy").unwrap(),
            "default-src 'none'"
        );
    }

    #[tokio::test]
    async fn body_size_limit_rejects_oversized() {
        let app = test_app();

        let big_body = vec![b' '; BODY_LIMIT + 1];
        let response = app
            .oneshot(
                axum::http::Request::post("/api/recipes/add")
                    .header("content-type", "application/json")
                    .body(Body::from(big_body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn store_error_does_not_leak_details() {
        let error = ApiError::Store(anyhow::anyhow!("disk I/O error at /var/lib/recipebox.db"));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Recipe store request failed");
        assert!(!json["error"].as_str().unwrap().contains("/var/lib"));
    }
}
