//! End-to-end tests against a small pet-store contract.
//!
//! Every test builds a router through `build_router` and drives it with
//! plain `http` requests, so routing, middleware ordering, validation and
//! logging are exercised together.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use daedalus::config::ValidationSettings;
use daedalus::core::{
    handler_fn, BoxedHandler, Contract, EngineFactory, Handler, Operation, OperationHandlers,
    ParamType, Parameter, Request, RequestContext, Response, ResponseSpec, Schema, TrieEngine,
    TypedValue, ValidationError,
};
use daedalus::middleware::{error_handler, json_error_handler, ErrorHandler, FnMiddleware};
use daedalus::telemetry::{dispatch_with_writer, LogCapture, LogConfig};
use daedalus::{build_router, BuildError, ContractValidation, Router, RouterOption};
use http::{header, Method, StatusCode};
use http_body_util::{BodyExt, Full};

type Recorded = Arc<Mutex<Vec<Vec<ValidationError>>>>;

fn pet_schema() -> Schema {
    Schema::object(vec![("id", Schema::integer()), ("name", Schema::string())]).require(["name"])
}

fn pet_store() -> Contract {
    Contract::builder()
        .base_path("/v2")
        .operation(
            Operation::builder("getPetById")
                .method(Method::GET)
                .path("/pet/{petId}")
                .parameter(Parameter::path("petId", ParamType::Integer).format("int64"))
                .response(200, ResponseSpec::new("a pet").schema(pet_schema()))
                .build(),
        )
        .operation(
            Operation::builder("findPetsByStatus")
                .method(Method::GET)
                .path("/pet/findByStatus")
                .parameter(Parameter::query("status", ParamType::String).required())
                .parameter(Parameter::query("limit", ParamType::Integer).format("int32").required())
                .build(),
        )
        .operation(
            Operation::builder("addPet")
                .method(Method::POST)
                .path("/pet")
                .parameter(Parameter::body("pet", pet_schema()).required())
                .build(),
        )
        .operation(
            Operation::builder("deletePet")
                .method(Method::DELETE)
                .path("/pet/{petId}")
                .parameter(Parameter::path("petId", ParamType::Integer).format("int64"))
                .build(),
        )
        .build()
}

fn json(status: StatusCode, body: &'static str) -> Response {
    http::Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from_static(body.as_bytes())))
        .unwrap()
}

/// Handlers for everything except `deletePet`.
fn handlers() -> OperationHandlers {
    let mut handlers = OperationHandlers::new();
    handlers.insert(
        "getPetById".into(),
        handler_fn(|ctx: RequestContext, _request| async move {
            let body = format!("{:?}", ctx.path_param("petId"));
            Response::new(Full::new(Bytes::from(body)))
        }),
    );
    handlers.insert(
        "findPetsByStatus".into(),
        handler_fn(|_ctx, _request| async { json(StatusCode::OK, "[]") }),
    );
    handlers.insert(
        "addPet".into(),
        handler_fn(|_ctx, request: Request| async move {
            let body = request.into_body().collect().await.unwrap().to_bytes();
            Response::new(Full::new(body))
        }),
    );
    handlers
}

fn recording_errors() -> (ErrorHandler, Recorded) {
    let calls: Recorded = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&calls);
    let handler = error_handler(move |response: &mut Response, errors: &[ValidationError]| {
        sink.lock().unwrap().push(errors.to_vec());
        *response.status_mut() = StatusCode::BAD_REQUEST;
    });
    (handler, calls)
}

fn validated_router(errors: ErrorHandler) -> Router {
    build_router(&pet_store(), &handlers(), ContractValidation::new(errors)).unwrap()
}

fn request(method: Method, uri: &str, body: &'static [u8]) -> Request {
    http::Request::builder()
        .method(method)
        .uri(uri)
        .body(Full::new(Bytes::from_static(body)))
        .unwrap()
}

async fn body_string(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Parsed JSON log events.
fn events(logs: &LogCapture) -> Vec<serde_json::Value> {
    logs.lines()
        .iter()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn messages(events: &[serde_json::Value]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|event| event["fields"]["message"].as_str())
        .collect()
}

fn capture(level: &str) -> (LogCapture, RouterOption) {
    let logs = LogCapture::new();
    let config = LogConfig {
        level: level.to_string(),
        ..LogConfig::production()
    };
    let dispatch = dispatch_with_writer(&config, logs.clone()).unwrap();
    (logs, RouterOption::logger(dispatch))
}

// ============================================================================
// Path parameters
// ============================================================================

#[tokio::test]
async fn test_integer_path_param_is_typed() {
    let (errors, _) = recording_errors();
    let router = validated_router(errors);

    let response = router.serve(request(Method::GET, "/v2/pet/12", b"")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_string(response).await,
        format!("{:?}", Some(&TypedValue::Int64(12)))
    );
}

#[tokio::test]
async fn test_unparsable_path_param_is_unset() {
    let (errors, calls) = recording_errors();
    let router = validated_router(errors);

    let response = router.serve(request(Method::GET, "/v2/pet/abc", b"")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "None");
    assert!(calls.lock().unwrap().is_empty());
}

// ============================================================================
// Unbound operations
// ============================================================================

#[tokio::test]
async fn test_missing_handler_warns_once_and_leaves_route_unbound() {
    let (logs, logger) = capture("debug");
    let router = build_router(&pet_store(), &handlers(), [logger]).unwrap();

    let events = events(&logs);
    let warnings: Vec<_> = events
        .iter()
        .filter(|event| event["level"] == "WARN")
        .collect();
    assert_eq!(warnings.len(), 1, "{events:#?}");
    assert_eq!(
        warnings[0]["fields"]["message"],
        "no handler registered for operation"
    );
    assert_eq!(warnings[0]["fields"]["operation_id"], "deletePet");
    assert_eq!(
        messages(&events)
            .iter()
            .filter(|message| **message == "registered route")
            .count(),
        3
    );

    let response = router.serve(request(Method::DELETE, "/v2/pet/12", b"")).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let allow = response.headers()[header::ALLOW].to_str().unwrap();
    assert!(allow.contains("GET"));
    assert!(!allow.contains("DELETE"));
}

// ============================================================================
// Query validation
// ============================================================================

#[tokio::test]
async fn test_every_missing_query_param_is_reported() {
    let (errors, calls) = recording_errors();
    let router = validated_router(errors);

    let response = router
        .serve(request(Method::GET, "/v2/pet/findByStatus", b""))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].len(), 2);
    assert!(calls[0]
        .iter()
        .all(|error| matches!(error, ValidationError::MissingParameter { .. })));
}

#[tokio::test]
async fn test_valid_query_reaches_handler() {
    let (errors, calls) = recording_errors();
    let router = validated_router(errors);

    let response = router
        .serve(request(
            Method::GET,
            "/v2/pet/findByStatus?status=available&limit=10",
            b"",
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "[]");
    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_continue_on_query_error_still_runs_handler() {
    let (errors, calls) = recording_errors();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);

    let mut handlers = handlers();
    handlers.insert(
        "findPetsByStatus".into(),
        handler_fn(move |_ctx, _request| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { json(StatusCode::OK, "[]") }
        }),
    );
    let validation = ContractValidation::new(errors).settings(ValidationSettings {
        continue_on_query_error: true,
        ..ValidationSettings::default()
    });
    let router = build_router(&pet_store(), &handlers, validation).unwrap();

    let response = router
        .serve(request(Method::GET, "/v2/pet/findByStatus?limit=ten", b""))
        .await;
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(calls.lock().unwrap()[0].len(), 2);
}

// ============================================================================
// Body validation
// ============================================================================

#[tokio::test]
async fn test_accepted_body_is_replayed_byte_for_byte() {
    let (errors, calls) = recording_errors();
    let router = validated_router(errors);
    let payload: &'static [u8] = b"{\n  \"name\":   \"doggie\",\n  \"id\": 7\n}";

    let response = router.serve(request(Method::POST, "/v2/pet", payload)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await.as_bytes(), payload);
    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_rejected_body_uses_error_envelope() {
    let router = validated_router(json_error_handler(StatusCode::UNPROCESSABLE_ENTITY));

    let response = router
        .serve(request(Method::POST, "/v2/pet", b"{\"id\": \"seven\"}"))
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let envelope: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(envelope["error"]["code"], "VALIDATION_FAILED");
    assert!(envelope["error"]["details"].as_array().unwrap().len() >= 2);
}

#[tokio::test]
async fn test_malformed_body_short_circuits() {
    let (errors, calls) = recording_errors();
    let router = validated_router(errors);

    let response = router.serve(request(Method::POST, "/v2/pet", b"{name:")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert!(matches!(calls[0][..], [ValidationError::InvalidPayload { .. }]));
}

// ============================================================================
// Response validation
// ============================================================================

fn response_checked(handler: BoxedHandler, errors: ErrorHandler) -> Router {
    let mut handlers = OperationHandlers::new();
    handlers.insert("getPetById".into(), handler);
    let validation = ContractValidation::new(errors).settings(ValidationSettings {
        responses: true,
        ..ValidationSettings::default()
    });
    build_router(&pet_store(), &handlers, validation).unwrap()
}

#[tokio::test]
async fn test_invalid_response_reaches_client_unchanged() {
    let (errors, calls) = recording_errors();
    let router = response_checked(
        handler_fn(|_ctx, _request| async { json(StatusCode::OK, r#"{"id":"x"}"#) }),
        errors,
    );

    let response = router.serve(request(Method::GET, "/v2/pet/1", b"")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    assert_eq!(body_string(response).await, r#"{"id":"x"}"#);

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].len(), 2);
}

#[tokio::test]
async fn test_undecodable_response_is_reported_not_altered() {
    let (errors, calls) = recording_errors();
    let router = response_checked(
        handler_fn(|_ctx, _request| async { json(StatusCode::OK, "not json") }),
        errors,
    );

    let response = router.serve(request(Method::GET, "/v2/pet/1", b"")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "not json");
    assert!(matches!(
        calls.lock().unwrap()[0][..],
        [ValidationError::InvalidPayload { .. }]
    ));
}

#[tokio::test]
async fn test_undeclared_status_is_not_checked() {
    let (errors, calls) = recording_errors();
    let router = response_checked(
        handler_fn(|_ctx, _request| async { json(StatusCode::NOT_FOUND, "gone") }),
        errors,
    );

    let response = router.serve(request(Method::GET, "/v2/pet/1", b"")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_string(response).await, "gone");
    assert!(calls.lock().unwrap().is_empty());
}

// ============================================================================
// Middleware ordering
// ============================================================================

fn tracing_middleware(name: &'static str, seen: Arc<Mutex<Vec<String>>>) -> RouterOption {
    RouterOption::middleware(FnMiddleware::new(
        name,
        move |ctx: RequestContext, request, next: BoxedHandler| {
            let operation = ctx
                .operation_id()
                .map_or_else(|| "-".to_string(), ToString::to_string);
            seen.lock().unwrap().push(format!("{name}:{operation}"));
            next.call(ctx, request)
        },
    ))
}

#[tokio::test]
async fn test_stamp_runs_before_custom_middleware() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let options = [
        tracing_middleware("a", Arc::clone(&seen)),
        tracing_middleware("b", Arc::clone(&seen)),
    ];
    let router = build_router(&pet_store(), &handlers(), options).unwrap();

    let response = router
        .serve(request(Method::GET, "/v2/pet/findByStatus", b""))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        *seen.lock().unwrap(),
        vec!["b:findPetsByStatus", "a:findPetsByStatus"]
    );
}

// ============================================================================
// Routing
// ============================================================================

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let router = build_router(&pet_store(), &handlers(), []).unwrap();

    let response = router.serve(request(Method::GET, "/v2/store/order", b"")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let outside = router.serve(request(Method::GET, "/pet/12", b"")).await;
    assert_eq!(outside.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_static_segment_beats_parameter() {
    let router = build_router(&pet_store(), &handlers(), []).unwrap();

    let response = router
        .serve(request(Method::GET, "/v2/pet/findByStatus", b""))
        .await;
    assert_eq!(body_string(response).await, "[]");
}

/// Pet store plus routes that capture under other names at shared positions.
fn pet_store_with_uploads() -> Contract {
    let mut builder = Contract::builder().base_path("/v2");
    for op in pet_store().operation_list() {
        builder = builder.operation(op.clone());
    }
    builder
        .operation(
            Operation::builder("uploadFile")
                .method(Method::POST)
                .path("/pet/{id}/uploadImage")
                .parameter(Parameter::path("id", ParamType::Integer).format("int64"))
                .build(),
        )
        .operation(
            Operation::builder("getUserByName")
                .method(Method::GET)
                .path("/user/{username}")
                .parameter(Parameter::path("username", ParamType::String))
                .build(),
        )
        .build()
}

fn upload_handlers() -> OperationHandlers {
    let mut handlers = handlers();
    handlers.insert(
        "uploadFile".into(),
        handler_fn(|ctx: RequestContext, _request| async move {
            Response::new(Full::new(Bytes::from(format!("{:?}", ctx.path_param("id")))))
        }),
    );
    handlers.insert(
        "getUserByName".into(),
        handler_fn(|ctx: RequestContext, _request| async move {
            Response::new(Full::new(Bytes::from(format!("{:?}", ctx.path_param("username")))))
        }),
    );
    handlers
}

#[tokio::test]
async fn test_param_names_may_differ_at_shared_positions() {
    let (errors, _) = recording_errors();
    let router = build_router(
        &pet_store_with_uploads(),
        &upload_handlers(),
        ContractValidation::new(errors),
    )
    .unwrap();

    let response = router.serve(request(Method::GET, "/v2/pet/4", b"")).await;
    assert_eq!(
        body_string(response).await,
        format!("{:?}", Some(&TypedValue::Int64(4)))
    );

    let response = router
        .serve(request(Method::POST, "/v2/pet/4/uploadImage", b""))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_string(response).await,
        format!("{:?}", Some(&TypedValue::Int64(4)))
    );
}

#[tokio::test]
async fn test_encoded_path_param_is_decoded() {
    let (errors, _) = recording_errors();
    let router = build_router(
        &pet_store_with_uploads(),
        &upload_handlers(),
        ContractValidation::new(errors),
    )
    .unwrap();

    let response = router
        .serve(request(Method::GET, "/v2/user/john%20doe", b""))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_string(response).await,
        format!("{:?}", Some(&TypedValue::String("john doe".to_string())))
    );
}

#[tokio::test]
async fn test_empty_base_path_mounts_at_root() {
    let contract = Contract::builder()
        .operation(Operation::builder("getPetById").path("/pet/{petId}").build())
        .build();
    let router = build_router(&contract, &handlers(), []).unwrap();

    let response = router.serve(request(Method::GET, "/pet/3", b"")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_custom_engine_builds_both_levels() {
    let built = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&built);
    let engine: EngineFactory = Arc::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Box::new(TrieEngine::new())
    });

    let router = build_router(&pet_store(), &handlers(), [RouterOption::engine(engine)]).unwrap();
    assert_eq!(built.load(Ordering::SeqCst), 2);

    let response = router.serve(request(Method::GET, "/v2/pet/5", b"")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_router_serves_concurrently() {
    let (errors, _) = recording_errors();
    let router = validated_router(errors);

    let tasks: Vec<_> = (0..16)
        .map(|id| {
            let router = router.clone();
            tokio::spawn(async move {
                let uri = format!("/v2/pet/{id}");
                let request = http::Request::builder()
                    .uri(uri)
                    .body(Full::new(Bytes::new()))
                    .unwrap();
                body_string(router.serve(request).await).await
            })
        })
        .collect();

    for (id, task) in tasks.into_iter().enumerate() {
        let expected = format!("{:?}", Some(&TypedValue::Int64(i64::try_from(id).unwrap())));
        assert_eq!(task.await.unwrap(), expected);
    }
}

// ============================================================================
// Build failures and logging
// ============================================================================

#[test]
fn test_contract_error_fails_build() {
    let contract = Contract::builder()
        .operation(Operation::builder("addPet").method(Method::POST).path("/pet").build())
        .operation(Operation::builder("addPet").method(Method::PUT).path("/pet").build())
        .build();

    let err = build_router(&contract, &handlers(), []).unwrap_err();
    assert!(matches!(err, BuildError::Contract(_)));
}

#[test]
fn test_rejected_pattern_fails_build() {
    let contract = Contract::builder()
        .operation(Operation::builder("addPet").method(Method::POST).path("/pet/{}").build())
        .build();

    let err = build_router(&contract, &handlers(), []).unwrap_err();
    assert!(matches!(err, BuildError::Route(_)));
}

#[tokio::test]
async fn test_request_logs_go_to_injected_logger() {
    let (logs, logger) = capture("debug");
    let (errors, _) = recording_errors();
    let mut options = vec![logger];
    options.extend(ContractValidation::new(errors));
    let router = build_router(&pet_store(), &handlers(), options).unwrap();

    router
        .serve(request(Method::GET, "/v2/pet/findByStatus", b""))
        .await;

    let events = events(&logs);
    let messages = messages(&events);
    assert!(messages.contains(&"dispatching operation"));
    assert!(messages.contains(&"query validation failed"));
}

#[tokio::test]
async fn test_router_is_a_handler() {
    let router = build_router(&pet_store(), &handlers(), []).unwrap();
    let handler: BoxedHandler = Arc::new(router);

    let response = handler
        .call(RequestContext::new(), request(Method::GET, "/v2/pet/8", b""))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}
