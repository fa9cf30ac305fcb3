//! DeepResearch API Gateway
//!
//! The entry point for all external API requests.
//! Handles:
//! - Research runs and the prompting workflow
//! - Direct source and tool access
//! - Rate limiting
//! - Observability (logging, metrics, tracing)

mod extract;
mod handlers;
mod middleware;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use deepresearch_common::{
    config::AppConfig,
    llm::OpenAiTextService,
    metrics,
    research::Timeouts,
    sources::SourceSet,
    ResearchOrchestrator, ToolExecutor,
};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::Notify;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub orchestrator: ResearchOrchestrator,
    pub tools: ToolExecutor,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, orchestrator: ResearchOrchestrator) -> Self {
        let tools = ToolExecutor::new(orchestrator.sources().clone());
        Self {
            config,
            orchestrator,
            tools,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    // Initialize tracing
    init_tracing(&config);

    info!(
        service = %config.observability.service_name,
        "Starting DeepResearch API Gateway v{}",
        deepresearch_common::VERSION
    );

    let config = Arc::new(config);

    // Initialize metrics
    install_metrics_exporter(config.observability.metrics_port)?;
    metrics::register_metrics();

    // Source backends
    let sources = match SourceSet::connect_reference(&config.sources).await {
        Ok(sources) => sources,
        Err(e) => {
            warn!(error = %e, "Internal source initialization failed, internal research may be limited");
            SourceSet::reference(&config.sources)
        }
    };

    // Text service and orchestrator
    let text = OpenAiTextService::new(config.llm.clone())?;
    let orchestrator = ResearchOrchestrator::new(Arc::new(text), sources, Timeouts::from_config(&config.llm));

    let state = AppState::new(config.clone(), orchestrator);

    // Build the router
    let app = create_router(state)?;

    // Start the server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!(modes = ?deepresearch_common::models::ResearchMode::ALL.map(|m| m.as_str()), "Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;

    serve_until_shutdown(listener, app, shutdown_signal(), config.shutdown_timeout()).await?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.observability.log_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.observability.json_logging {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// Serve Prometheus metrics on their own port; 0 disables the exporter
fn install_metrics_exporter(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    if port == 0 {
        return Ok(());
    }

    PrometheusBuilder::new()
        .with_http_listener(SocketAddr::from(([0, 0, 0, 0], port)))
        .set_buckets_for_metric(Matcher::Full(metrics::RUN_DURATION.to_string()), metrics::RUN_BUCKETS)?
        .set_buckets_for_metric(Matcher::Full(metrics::STEP_DURATION.to_string()), metrics::LATENCY_BUCKETS)?
        .set_buckets_for_metric(Matcher::Full(metrics::GATEWAY_DURATION.to_string()), metrics::LATENCY_BUCKETS)?
        .install()?;

    info!(port, "Metrics exporter listening");
    Ok(())
}

/// Create the main application router
fn create_router(state: AppState) -> Result<Router, deepresearch_common::AppError> {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    let rate_limit = &state.config.rate_limit;
    let limiter = if rate_limit.enabled {
        Some(middleware::rate_limit::create_rate_limiter(rate_limit)?)
    } else {
        None
    };
    let max_concurrent = state.config.server.max_concurrent_requests.max(1);

    let mut routes = Router::new()
        // Service description
        .route("/", get(handlers::health::root))
        .route("/healthz", get(handlers::health::healthz))
        .route("/research-modes", get(handlers::research::research_modes))
        .route("/research-depth-options", get(handlers::research::research_depth_options))

        // Research
        .route("/research", post(handlers::research::research))
        .route("/research-analysis", post(handlers::research::research_analysis))

        // Prompting workflow
        .route("/clarify", post(handlers::prompting::clarify))
        .route("/rewrite-prompt", post(handlers::prompting::rewrite_prompt))

        // Sources
        .route("/websearch", post(handlers::sources::web_search))
        .route("/mcp/search", post(handlers::sources::internal_search))
        .route("/mcp/fetch", post(handlers::sources::internal_fetch))

        // Tools
        .route("/tools", get(handlers::tools::list_tools))
        .route("/tools/call", post(handlers::tools::call_tool))
        .with_state(state);

    if let Some(limiter) = limiter {
        routes = routes.layer(from_fn_with_state(limiter, middleware::rate_limit::rate_limit));
    }

    // Compose the app
    Ok(routes
        .layer(GlobalConcurrencyLimitLayer::new(max_concurrent))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(propagate_id)
        .layer(request_id))
}

/// Serve `app` until `signal` fires, then give in-flight requests at most
/// `grace` to finish before returning.
async fn serve_until_shutdown<F>(
    listener: TcpListener,
    app: Router,
    signal: F,
    grace: Duration,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let draining = Arc::new(Notify::new());
    let notify = draining.clone();

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            signal.await;
            notify.notify_one();
        })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => return result,
        _ = draining.notified() => {}
    }

    match tokio::time::timeout(grace, server).await {
        Ok(result) => result,
        Err(_) => {
            warn!(grace_secs = grace.as_secs_f64(), "Shutdown grace period elapsed, dropping in-flight requests");
            Ok(())
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use async_trait::async_trait;
    use deepresearch_common::llm::{fallback_clarification, fallback_rewrite, AnalysisOptions};
    use deepresearch_common::models::{
        ClarificationResponse, ClarificationWithAnswers, PromptRewriteResponse, ResearchMode,
    };
    use deepresearch_common::tools::ToolDefinition;
    use deepresearch_common::{Outcome, TextService};
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpStream;
    use tokio_test::assert_ok;
    use tower::ServiceExt;

    /// Text service that only remembers whether analysis was reached
    #[derive(Default)]
    struct AnalysisFlag {
        analyzed: AtomicBool,
    }

    #[async_trait]
    impl TextService for AnalysisFlag {
        async fn clarify(&self, _query: &str) -> Outcome<ClarificationResponse> {
            Outcome::Ok(fallback_clarification())
        }

        async fn rewrite(
            &self,
            original_query: &str,
            _clarification: &ClarificationWithAnswers,
        ) -> Outcome<PromptRewriteResponse> {
            Outcome::Ok(fallback_rewrite(original_query))
        }

        async fn analyze(
            &self,
            _prompt: &str,
            _mode: ResearchMode,
            _tools: &[ToolDefinition],
            _options: &AnalysisOptions,
        ) -> Outcome<String> {
            self.analyzed.store(true, Ordering::SeqCst);
            Outcome::Ok("analysis".to_string())
        }
    }

    fn test_router(mut config: AppConfig) -> Router {
        config.sources = config.sources.without_latency();
        let text = OpenAiTextService::new(config.llm.clone()).unwrap();
        let orchestrator = ResearchOrchestrator::new(
            Arc::new(text),
            SourceSet::reference(&config.sources),
            Timeouts::from_config(&config.llm),
        );
        assert_ok!(create_router(AppState::new(Arc::new(config), orchestrator)))
    }

    async fn call(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health_and_banner() {
        let router = test_router(AppConfig::default());

        let (status, body) = call(&router, Method::GET, "/healthz", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));

        let (_, body) = call(&router, Method::GET, "/", None).await;
        assert_eq!(body["available_modes"].as_array().unwrap().len(), 5);
        assert_eq!(body["version"], deepresearch_common::VERSION);
    }

    #[tokio::test]
    async fn test_research_web_only_offline() {
        let router = test_router(AppConfig::default());
        let (status, body) = call(
            &router,
            Method::POST,
            "/research",
            Some(json!({
                "query": "AI and the labour market",
                "mode": "websearch-only",
                "include_clarification": false,
                "include_prompt_rewriting": false
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["mode"], "websearch-only");
        let steps: Vec<_> = body["steps"]
            .as_array()
            .unwrap()
            .iter()
            .map(|step| step["step_type"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(steps, vec!["search", "analysis"]);
        assert_eq!(body["search_results"].as_array().unwrap().len(), 5);
        assert!(body["final_analysis"]
            .as_str()
            .unwrap()
            .starts_with("Error during deep research:"));
    }

    #[tokio::test]
    async fn test_research_internal_only_fetches_reference_corpus() {
        let router = test_router(AppConfig::default());
        let (status, body) = call(
            &router,
            Method::POST,
            "/research",
            Some(json!({ "query": "quarterly results", "mode": "mcp-only" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["fetch_results"].as_array().unwrap().len(), 3);
        assert_eq!(body["steps"].as_array().unwrap().len(), 2 + 1 + 3 + 1);
        assert!(body["clarification"]["questions"].is_array());
    }

    #[tokio::test]
    async fn test_unknown_mode_is_rejected() {
        let router = test_router(AppConfig::default());
        let (status, body) = call(
            &router,
            Method::POST,
            "/research",
            Some(json!({ "query": "x", "mode": "gpt-5-research" })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let detail = body["detail"].as_str().unwrap();
        assert!(detail.contains("unknown variant"));
        assert!(detail.contains("websearch-only"));
    }

    #[tokio::test]
    async fn test_empty_query_fails_validation() {
        let router = test_router(AppConfig::default());
        let (status, body) = call(
            &router,
            Method::POST,
            "/research",
            Some(json!({ "query": "", "mode": "o3-deep-research" })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().starts_with("Validation failed"));
    }

    #[tokio::test]
    async fn test_research_analysis_skips_prompting() {
        let router = test_router(AppConfig::default());
        let (status, body) = call(
            &router,
            Method::POST,
            "/research-analysis",
            Some(json!({ "rewritten_prompt": "Conduct comprehensive research on: X", "mode": "websearch-mcp" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query"], "Conduct comprehensive research on: X");
        assert_eq!(body["clarification"], Value::Null);
        assert_eq!(body["prompt_rewrite"], Value::Null);
        assert_eq!(body["steps"][0]["input_data"]["source"], "websearch");
    }

    #[tokio::test]
    async fn test_prompting_endpoints_fall_back_offline() {
        let router = test_router(AppConfig::default());

        let (status, body) = call(&router, Method::POST, "/clarify", Some(json!({ "query": "wind farms" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["questions"].as_array().unwrap().len(), 3);

        let (status, body) = call(
            &router,
            Method::POST,
            "/rewrite-prompt",
            Some(json!({
                "original_query": "wind farms",
                "clarification_with_answers": {
                    "questions": [{ "question": "Where?", "context": "" }],
                    "answers": [{ "question_index": 5, "answer": "ignored" }],
                    "clarified_intent": "wind farm economics"
                }
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["rewritten_prompt"],
            "Conduct comprehensive research on: wind farms. Provide detailed analysis with supporting evidence from multiple reliable sources."
        );
    }

    #[tokio::test]
    async fn test_source_pass_through() {
        let router = test_router(AppConfig::default());

        let (status, body) = call(&router, Method::POST, "/websearch", Some(json!({ "query": "tides" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 5);

        let (_, body) = call(
            &router,
            Method::POST,
            "/mcp/search",
            Some(json!({ "query": "tides", "max_results": 2 })),
        )
        .await;
        assert_eq!(body.as_array().unwrap().len(), 2);
        assert!(body[0]["url"].as_str().unwrap().starts_with("mcp://"));

        let (status, body) = call(&router, Method::POST, "/mcp/fetch", Some(json!({ "id": "mcp_search_2" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "mcp_search_2");

        let (status, body) = call(&router, Method::POST, "/mcp/fetch", Some(json!({ "id": "nope" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Source not found: nope");
    }

    #[tokio::test]
    async fn test_tools_endpoints() {
        let router = test_router(AppConfig::default());

        let (_, body) = call(&router, Method::GET, "/tools", None).await;
        let names: Vec<_> = body["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|tool| tool["function"]["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["web_search", "mcp_search", "mcp_fetch"]);
        assert_eq!(body["tools"][0]["type"], "function");

        let (status, body) = call(
            &router,
            Method::POST,
            "/tools/call",
            Some(json!({ "name": "mcp_fetch", "arguments": { "id": "mcp_search_1" } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["metadata"]["source"], "internal_source");
    }

    #[tokio::test]
    async fn test_descriptive_endpoints() {
        let router = test_router(AppConfig::default());

        let (_, body) = call(&router, Method::GET, "/research-modes", None).await;
        assert_eq!(body["modes"].as_object().unwrap().len(), 5);
        assert!(body["modes"]["mcp-only"]["capabilities"].is_array());

        let (_, body) = call(&router, Method::GET, "/research-depth-options", None).await;
        assert_eq!(body["default"], "medium");
        assert_eq!(body["depth_options"]["fast"]["max_tool_calls"], 5);
        assert_eq!(body["depth_options"]["deep"]["max_tool_calls"], 30);
    }

    #[tokio::test]
    async fn test_rate_limit_rejects_excess_requests() {
        let mut config = AppConfig::default();
        config.rate_limit.requests_per_second = 1;
        config.rate_limit.burst = 1;
        let router = test_router(config);

        let (status, _) = call(&router, Method::GET, "/healthz", None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(&router, Method::GET, "/healthz", None).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body, json!({ "detail": "Rate limit exceeded" }));
    }

    #[tokio::test]
    async fn test_request_id_is_propagated() {
        let router = test_router(AppConfig::default());
        let request = Request::builder().uri("/healthz").body(Body::empty()).unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_dropped_research_request_cancels_run() {
        let mut config = AppConfig::default();
        config.sources = config.sources.without_latency();
        config.sources.web_latency_ms = 300;

        let text = Arc::new(AnalysisFlag::default());
        let orchestrator = ResearchOrchestrator::new(
            text.clone(),
            SourceSet::reference(&config.sources),
            Timeouts::from_config(&config.llm),
        );
        let router = assert_ok!(create_router(AppState::new(Arc::new(config), orchestrator)));

        let request = Request::builder()
            .method(Method::POST)
            .uri("/research")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({
                    "query": "grid storage",
                    "mode": "websearch-only",
                    "include_clarification": false,
                    "include_prompt_rewriting": false
                })
                .to_string(),
            ))
            .unwrap();

        let outcome = tokio::time::timeout(Duration::from_millis(50), router.oneshot(request)).await;
        assert!(outcome.is_err(), "request should still be searching");

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(!text.analyzed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_shutdown_drops_requests_after_grace_period() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().route("/stuck", get(|| std::future::pending::<&'static str>()));

        let trigger = Arc::new(Notify::new());
        let signal = {
            let trigger = trigger.clone();
            async move { trigger.notified().await }
        };
        let server = tokio::spawn(serve_until_shutdown(listener, app, signal, Duration::from_millis(100)));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /stuck HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.notify_one();

        let joined = tokio::time::timeout(Duration::from_secs(5), server).await;
        let result = assert_ok!(assert_ok!(joined));
        assert_ok!(result);
    }
}
