//! HTTP boundary: the JSON API plus the static browser UI.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{error, info, warn};

use crate::cli::CliOptions;
use crate::config::{AppConfig, cloudflare_run_url};
use crate::remote::completion::{ChatCompletionsClient, TextCompletion};
use crate::remote::http_client;
use crate::remote::image::{CloudflareImageClient, ImageGenerator};
use crate::remote::notify::{Notifier, WebhookNotifier};

mod api;

use api::{generate_image_handler, generate_script_handler};

#[derive(Clone)]
pub(crate) struct AppState {
    config: Arc<AppConfig>,
    completion: Option<Arc<dyn TextCompletion>>,
    image: Option<Arc<dyn ImageGenerator>>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl AppState {
    fn from_cli(cli: &CliOptions) -> Result<Self, anyhow::Error> {
        let config = AppConfig::from(cli);
        let client = http_client(config.request_timeout).context("Failed to build HTTP client")?;

        let completion = cli.github_token.clone().map(|token| {
            Arc::new(ChatCompletionsClient::new(
                client.clone(),
                cli.completion_endpoint.clone(),
                token,
            )) as Arc<dyn TextCompletion>
        });

        let image = match (cli.cf_token.clone(), cli.account_id.as_deref()) {
            (Some(token), Some(account_id)) => {
                let run_url =
                    cloudflare_run_url(&cli.cloudflare_api_base, account_id, &config.image.model)
                        .context("Invalid Cloudflare run URL")?;
                Some(Arc::new(CloudflareImageClient::new(client.clone(), run_url, token))
                    as Arc<dyn ImageGenerator>)
            }
            _ => None,
        };

        let notifier = cli.notify_webhook_url.clone().map(|url| {
            Arc::new(WebhookNotifier::new(client.clone(), url)) as Arc<dyn Notifier>
        });

        info!("[CONFIG] GitHub Token configured: {}", completion.is_some());
        info!("[CONFIG] Cloudflare Token configured: {}", image.is_some());
        info!("[CONFIG] Notification webhook configured: {}", notifier.is_some());
        info!("[CONFIG] Prompt models: {}", config.cascade.models.join(", "));
        info!("[CONFIG] Image model: {}", config.image.model);
        if completion.is_none() {
            warn!("No GITHUB_TOKEN, every prompt will use the local enhancer");
        }

        Ok(Self {
            config: Arc::new(config),
            completion,
            image,
            notifier,
        })
    }
}

fn create_router(static_dir: &Path) -> Router<AppState> {
    Router::new()
        .route("/api/generate-script", post(generate_script_handler))
        .route("/api/generate-image", post(generate_image_handler))
        .route("/healthz", get(|| async { "ok" }))
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
}

/// Resolves once `signal` fires; a signal listener that failed never resolves.
async fn wait_for_shutdown(signal: impl Future<Output = std::io::Result<()>>) {
    match signal.await {
        Ok(()) => info!("Shutting down"),
        Err(err) => {
            error!("Failed to listen for shutdown signal: {}", err);
            std::future::pending::<()>().await;
        }
    }
}

async fn shutdown_signal() {
    wait_for_shutdown(tokio::signal::ctrl_c()).await;
}

/// Builds the application from the CLI options and serves it until Ctrl-C.
pub async fn setup_server(cli: &CliOptions) -> Result<(), anyhow::Error> {
    let state = AppState::from_cli(cli)?;
    let app = create_router(&cli.static_dir).with_state(state);

    let addr = format!("{}:{}", cli.listen_address, cli.port);
    info!("[SERVER] Running on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::prompt::cascade::tests::ScriptedCompletion;
    use crate::remote::RemoteError;
    use crate::remote::image::{ImageRequest, ImageResult};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header::CONTENT_TYPE};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Notify;
    use tower::ServiceExt;

    #[derive(Default)]
    struct FakeImages {
        fail: bool,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ImageGenerator for FakeImages {
        async fn generate(&self, request: &ImageRequest<'_>) -> Result<ImageResult, RemoteError> {
            self.prompts
                .lock()
                .expect("lock prompts")
                .push(request.prompt.to_string());
            if self.fail {
                return Err(RemoteError::Status {
                    status: reqwest::StatusCode::BAD_REQUEST,
                    body: "{\"errors\":[{\"message\":\"bad prompt\"}]}".to_string(),
                });
            }
            Ok(ImageResult {
                base64: "aGVsbG8=".to_string(),
                mime: "image/png".to_string(),
            })
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
        sent: Notify,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, message: &str) -> Result<(), RemoteError> {
            self.messages
                .lock()
                .expect("lock messages")
                .push(message.to_string());
            self.sent.notify_one();
            Ok(())
        }
    }

    fn state(
        completion: Option<Arc<dyn TextCompletion>>,
        image: Option<Arc<dyn ImageGenerator>>,
        notifier: Option<Arc<dyn Notifier>>,
    ) -> AppState {
        let mut config = AppConfig::default();
        config.cascade.models = vec!["m1".to_string(), "m2".to_string()];
        AppState {
            config: Arc::new(config),
            completion,
            image,
            notifier,
        }
    }

    fn app(state: AppState) -> Router {
        create_router(Path::new("./does-not-exist")).with_state(state)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read_json(response: axum::response::Response) -> Value {
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("collect body")
            .to_bytes();
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn script_from_model_is_tagged() {
        let backend = Arc::new(ScriptedCompletion::answering("m2", "\"Misty harbour at dawn\""));
        let app = app(state(Some(backend.clone()), None, None));

        let response = app
            .oneshot(post_json("/api/generate-script", json!({"prompt": "a harbour"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["script"], "Misty harbour at dawn");
        assert_eq!(body["source"], "model");
        assert_eq!(body["model"], "m2");
        assert_eq!(backend.called_models(), vec!["m1", "m2"]);
    }

    #[tokio::test]
    async fn script_without_token_uses_enhancer() {
        let app = app(state(None, None, None));

        let response = app
            .oneshot(post_json(
                "/api/generate-script",
                json!({"prompt": "  a cat sitting on a windowsill "}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["source"], "fallback");
        assert!(body.get("model").is_none());
        assert_eq!(
            body["script"],
            "a cat sitting on a windowsill, photorealistic, cinematic lighting, \
             high quality, detailed, professional composition, adorable"
        );
    }

    #[tokio::test]
    async fn blank_prompt_is_rejected_before_any_call() {
        let backend = Arc::new(ScriptedCompletion::default());
        let app = app(state(Some(backend.clone()), None, None));

        let response = app
            .clone()
            .oneshot(post_json("/api/generate-script", json!({"prompt": "   "})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["error"], "Prompt is required");

        let response = app
            .oneshot(post_json("/api/generate-script", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(backend.called_models().is_empty());
    }

    #[tokio::test]
    async fn image_is_returned_as_data_url_and_notified() {
        let images = Arc::new(FakeImages::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let app = app(state(None, Some(images.clone()), Some(notifier.clone())));

        let response = app
            .oneshot(post_json(
                "/api/generate-image",
                json!({"script": "a fox\n\nin   the snow"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["imageUrl"], "data:image/png;base64,aGVsbG8=");
        assert_eq!(body["mime"], "image/png");
        assert_eq!(
            *images.prompts.lock().expect("lock prompts"),
            vec!["a fox in the snow".to_string()]
        );

        tokio::time::timeout(Duration::from_secs(5), notifier.sent.notified())
            .await
            .expect("notification sent");
        let messages = notifier.messages.lock().expect("lock messages");
        assert_eq!(messages.len(), 1);
        assert!(messages[0].ends_with("a fox in the snow"));
    }

    #[tokio::test]
    async fn long_prompts_are_capped() {
        let images = Arc::new(FakeImages::default());
        let app = app(state(None, Some(images.clone()), None));

        let response = app
            .oneshot(post_json("/api/generate-image", json!({"script": "x".repeat(600)})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(images.prompts.lock().expect("lock prompts")[0].len(), 500);
    }

    #[tokio::test]
    async fn image_failure_surfaces_details_without_notifying() {
        let images = Arc::new(FakeImages {
            fail: true,
            ..FakeImages::default()
        });
        let notifier = Arc::new(RecordingNotifier::default());
        let app = app(state(None, Some(images), Some(notifier.clone())));

        let response = app
            .oneshot(post_json("/api/generate-image", json!({"script": "a fox"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = read_json(response).await;
        assert_eq!(body["error"], "Failed to generate image");
        assert!(body["details"].as_str().unwrap_or_default().contains("bad prompt"));

        tokio::task::yield_now().await;
        assert!(notifier.messages.lock().expect("lock messages").is_empty());
    }

    #[tokio::test]
    async fn image_without_credentials_is_unavailable() {
        let app = app(state(None, None, None));
        let response = app
            .oneshot(post_json("/api/generate-image", json!({"script": "a fox"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn invalid_json_is_bad_request() {
        let app = app(state(None, None, None));
        let request = Request::builder()
            .method("POST")
            .uri("/api/generate-image")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn serves_static_index() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("index.html"), "<h1>storyforge</h1>").expect("write index");
        let app = create_router(dir.path()).with_state(state(None, None, None));

        let request = Request::builder()
            .method("GET")
            .uri("/")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("collect body")
            .to_bytes();
        assert_eq!(&bytes[..], b"<h1>storyforge</h1>");
    }

    #[tokio::test]
    async fn bundled_ui_guards_input_and_offers_download() {
        let public = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/public"));
        let app = create_router(public).with_state(state(None, None, None));

        let request = Request::builder()
            .method("GET")
            .uri("/")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("collect body")
            .to_bytes();
        let page = String::from_utf8_lossy(&bytes);
        for needle in [
            r#"id="download""#,
            "Please describe your idea first!",
            "Please tell us your story idea!",
            "Please enter a prompt describing the image you want!",
            "button.disabled = busy",
            "setTimeout(",
            r#"id="status""#,
        ] {
            assert!(page.contains(needle), "index.html is missing {needle}");
        }
    }

    #[tokio::test]
    async fn healthz_answers_ok() {
        let app = app(state(None, None, None));
        let request = Request::builder()
            .method("GET")
            .uri("/healthz")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn shutdown_follows_the_signal() {
        tokio::time::timeout(Duration::from_secs(1), wait_for_shutdown(async { Ok(()) }))
            .await
            .expect("shutdown after signal");
    }

    #[tokio::test]
    async fn failed_signal_listener_keeps_serving() {
        let waited = tokio::time::timeout(
            Duration::from_millis(50),
            wait_for_shutdown(async { Err(std::io::Error::other("no signal handler")) }),
        )
        .await;
        assert!(waited.is_err(), "server must not shut down without a signal");
    }
}
