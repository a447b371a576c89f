// HTTP API routes.
//
// Thin mapping between the REST surface and the MatrixController; no
// routing logic lives here.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::json;

use octomux_core::{
    ConnectionState, MatrixStatus, PORT_MAX, PORT_MIN, PortId, PortKind, resolve_port,
};

use crate::api::{
    HealthResponse, InputListResponse, OutputListResponse, OutputRouting, PortInfo, PresetRequest,
    PresetResponse, RoutingStateResponse, ServiceInfo, SetRoutingRequest, SetRoutingResponse,
};
use crate::error::ApiError;
use crate::state::AppState;

/// Build the router with all routes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/healthz/live", get(liveness))
        .route("/healthz/ready", get(readiness))
        .route("/api/status", get(get_status))
        .route("/api/inputs", get(get_inputs))
        .route("/api/outputs", get(get_outputs))
        .route("/api/routing", get(get_routing))
        .route(
            "/api/routing/output/{output_id}",
            get(get_output_routing).post(set_output_routing),
        )
        .route("/api/routing/preset", post(set_preset_routing))
        .with_state(state)
}

// ── Service endpoints ───────────────────────────────────────────────

async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: "octomux",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn liveness() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness(State(state): State<AppState>) -> Json<HealthResponse> {
    let link = state.controller.link();
    let matrix_connected = link.state == ConnectionState::Connected;

    let status = match link.state {
        ConnectionState::Connected => "ok",
        ConnectionState::Error => "error",
        ConnectionState::Disconnected => "degraded",
    };

    let uptime = (Utc::now() - state.started_at)
        .to_std()
        .unwrap_or_default()
        .as_secs_f64();

    Json(HealthResponse {
        status,
        matrix_connected,
        last_health_check: link.last_command,
        uptime_seconds: uptime,
    })
}

async fn get_status(State(state): State<AppState>) -> Json<MatrixStatus> {
    Json(state.controller.status())
}

// ── Port listings ───────────────────────────────────────────────────

async fn get_inputs(State(state): State<AppState>) -> Json<InputListResponse> {
    let names = state.controller.input_names().await;
    let inputs: Vec<PortInfo> = names
        .into_iter()
        .map(|(number, name)| PortInfo { number, name })
        .collect();
    let names = inputs.iter().map(|p| p.name.clone()).collect();
    Json(InputListResponse { inputs, names })
}

async fn get_outputs(State(state): State<AppState>) -> Json<OutputListResponse> {
    let names = state.controller.output_names().await;
    let outputs: Vec<PortInfo> = names
        .into_iter()
        .map(|(number, name)| PortInfo { number, name })
        .collect();
    let names = outputs.iter().map(|p| p.name.clone()).collect();
    Json(OutputListResponse { outputs, names })
}

// ── Routing endpoints ───────────────────────────────────────────────

async fn get_routing(State(state): State<AppState>) -> Json<RoutingStateResponse> {
    let table = state.controller.routing_state().await;
    let input_names = state.controller.input_names().await;
    let output_names = state.controller.output_names().await;

    let outputs = (PORT_MIN..=PORT_MAX)
        .map(|output| {
            let input = table.get(&output).copied().flatten();
            OutputRouting {
                output,
                output_name: output_names.get(&output).cloned(),
                input,
                input_name: input.and_then(|i| input_names.get(&i).cloned()),
            }
        })
        .collect();

    Json(RoutingStateResponse {
        outputs,
        input_names,
        output_names,
    })
}

async fn get_output_routing(
    State(state): State<AppState>,
    Path(output_id): Path<String>,
) -> Result<Json<OutputRouting>, ApiError> {
    let input_names = state.controller.input_names().await;
    let output_names = state.controller.output_names().await;

    let output = resolve_port(
        &PortId::from(output_id.as_str()),
        PortKind::Output,
        &output_names,
    )?;

    let table = state.controller.routing_state().await;
    let input = table.get(&output).copied().flatten();

    Ok(Json(OutputRouting {
        output,
        output_name: output_names.get(&output).cloned(),
        input,
        input_name: input.and_then(|i| input_names.get(&i).cloned()),
    }))
}

async fn set_output_routing(
    State(state): State<AppState>,
    Path(output_id): Path<String>,
    Json(req): Json<SetRoutingRequest>,
) -> Result<Json<SetRoutingResponse>, ApiError> {
    let route = state
        .controller
        .set_routing(&req.input, &PortId::from(output_id.as_str()))
        .await?;

    let message = format!("Routed {} to {}", route.input_name, route.output_name);
    Ok(Json(SetRoutingResponse {
        route,
        success: true,
        message,
    }))
}

async fn set_preset_routing(
    State(state): State<AppState>,
    Json(req): Json<PresetRequest>,
) -> Json<PresetResponse> {
    let mappings: Vec<(PortId, PortId)> = req
        .mappings
        .into_iter()
        .map(|(output, input)| (PortId::from(output), input))
        .collect();

    let outcome = state.controller.apply_presets(&mappings).await;
    Json(PresetResponse {
        success: outcome.success(),
        outcome,
    })
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use url::Url;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use octomux_core::{MatrixConfig, MatrixController};

    use super::router;
    use crate::state::AppState;

    async fn setup(server: &MockServer) -> (Router, MatrixController) {
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200))
            .mount(server)
            .await;

        let config = MatrixConfig {
            base_url: Url::parse(&server.uri()).unwrap(),
            timeout: Duration::from_secs(2),
            verify_tls: false,
            health_interval: Duration::from_secs(3600),
        };
        let controller = MatrixController::new(config);
        controller.start().await.unwrap();

        (router(AppState::new(controller.clone())), controller)
    }

    async fn mount_names(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/form-system-info.cgi"))
            .and(body_string_contains("in_name=0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "in_name": ["Apple TV", "PlayStation 5", "HDMI 3", "HDMI 4",
                            "HDMI 5", "HDMI 6", "HDMI 7", "HDMI 8"]
            })))
            .mount(server)
            .await;

        Mock::given(method("POST"))
            .and(path("/form-system-info.cgi"))
            .and(body_string_contains("out_name=0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "out_name": ["Living Room TV", "Bedroom TV", "Output 3", "Output 4",
                             "Output 5", "Output 6", "Output 7", "Output 8"]
            })))
            .mount(server)
            .await;
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn liveness_is_always_ok() {
        let server = MockServer::start().await;
        let (app, controller) = setup(&server).await;

        let response = app.oneshot(get("/healthz/live")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "status": "ok" }));

        controller.stop().await;
    }

    #[tokio::test]
    async fn readiness_reflects_connection_state() {
        let server = MockServer::start().await;
        let (app, controller) = setup(&server).await;

        let response = app.oneshot(get("/healthz/ready")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["matrix_connected"], true);

        controller.stop().await;
    }

    #[tokio::test]
    async fn inputs_listing_carries_device_names() {
        let server = MockServer::start().await;
        mount_names(&server).await;
        let (app, controller) = setup(&server).await;

        let response = app.oneshot(get("/api/inputs")).await.unwrap();
        let body = body_json(response).await;

        assert_eq!(body["inputs"].as_array().unwrap().len(), 8);
        assert_eq!(body["inputs"][0]["name"], "Apple TV");
        assert_eq!(body["names"][1], "PlayStation 5");

        controller.stop().await;
    }

    #[tokio::test]
    async fn set_routing_by_name_succeeds() {
        let server = MockServer::start().await;
        mount_names(&server).await;
        Mock::given(method("POST"))
            .and(path("/form-system-cmd.cgi"))
            .and(body_string_contains("cmd=SW%2B2%2B1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
            .expect(1)
            .mount(&server)
            .await;

        let (app, controller) = setup(&server).await;

        let response = app
            .oneshot(post_json(
                "/api/routing/output/Living%20Room%20TV",
                &json!({ "input": "PlayStation 5" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["output"], 1);
        assert_eq!(body["input"], 2);
        assert_eq!(body["message"], "Routed PlayStation 5 to Living Room TV");

        controller.stop().await;
    }

    #[tokio::test]
    async fn unknown_input_name_is_a_bad_request() {
        let server = MockServer::start().await;
        mount_names(&server).await;
        let (app, controller) = setup(&server).await;

        let response = app
            .oneshot(post_json(
                "/api/routing/output/1",
                &json!({ "input": "Betamax" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "invalid_request");
        assert!(
            body["message"].as_str().unwrap().contains("Betamax"),
            "got: {body}"
        );

        controller.stop().await;
    }

    #[tokio::test]
    async fn device_failure_maps_to_service_unavailable() {
        let server = MockServer::start().await;
        mount_names(&server).await;
        Mock::given(method("POST"))
            .and(path("/form-system-cmd.cgi"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (app, controller) = setup(&server).await;

        let response = app
            .oneshot(post_json("/api/routing/output/1", &json!({ "input": 3 })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert_eq!(body["error"], "matrix_unavailable");
        assert!(
            body["message"]
                .as_str()
                .unwrap()
                .starts_with("Matrix communication error:"),
            "got: {body}"
        );

        controller.stop().await;
    }

    #[tokio::test]
    async fn preset_reports_per_entry_failures() {
        let server = MockServer::start().await;
        mount_names(&server).await;
        Mock::given(method("POST"))
            .and(path("/form-system-cmd.cgi"))
            .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
            .mount(&server)
            .await;

        let (app, controller) = setup(&server).await;

        let response = app
            .oneshot(post_json(
                "/api/routing/preset",
                &json!({ "mappings": {
                    "Living Room TV": "Apple TV",
                    "2": 3,
                    "No Such Output": 1
                }}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["applied"]["1"], 1);
        assert_eq!(body["applied"]["2"], 3);
        assert!(body["failed"]["No Such Output"].is_string());

        controller.stop().await;
    }

    #[tokio::test]
    async fn routing_table_degrades_to_unknown() {
        let server = MockServer::start().await;
        mount_names(&server).await;

        let (app, controller) = setup(&server).await;

        let response = app.oneshot(get("/api/routing")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let outputs = body["outputs"].as_array().unwrap();
        assert_eq!(outputs.len(), 8);
        assert_eq!(outputs[0]["output"], 1);
        assert_eq!(outputs[0]["output_name"], "Living Room TV");
        assert!(outputs[0]["input"].is_null());

        controller.stop().await;
    }
}
