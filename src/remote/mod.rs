//! Clients for the services storyforge calls out to.

use std::time::Duration;

use reqwest::StatusCode;

pub mod completion;
pub mod image;
pub mod notify;

/// Failure of a single outbound call.
#[derive(Debug)]
pub enum RemoteError {
    /// The request never produced a response (DNS, TLS, timeout...).
    Transport(reqwest::Error),
    /// The service answered 429.
    RateLimited {
        /// Body returned with the 429.
        body: String,
    },
    /// The service answered with a non-2xx status.
    Status {
        /// HTTP status returned.
        status: StatusCode,
        /// Response body, for diagnosis.
        body: String,
    },
    /// A 2xx response that did not carry what we asked for.
    Malformed(String),
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "Request failed: {err}"),
            Self::RateLimited { body } => write!(f, "Rate limited: {body}"),
            Self::Status { status, body } => write!(f, "Remote returned {status}: {body}"),
            Self::Malformed(message) => write!(f, "Malformed response: {message}"),
        }
    }
}

impl std::error::Error for RemoteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        RemoteError::Transport(err)
    }
}

impl RemoteError {
    /// Classifies a non-success status, keeping the body for diagnosis.
    pub(crate) fn from_status(status: StatusCode, body: String) -> Self {
        if status == StatusCode::TOO_MANY_REQUESTS {
            RemoteError::RateLimited { body }
        } else {
            RemoteError::Status { status, body }
        }
    }

    /// Body or message the caller can show for diagnosis.
    pub fn details(&self) -> String {
        match self {
            Self::RateLimited { body } | Self::Status { body, .. } => body.clone(),
            other => other.to_string(),
        }
    }
}

/// Shared HTTP client for all outbound calls.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Loopback HTTP server the client tests point their reqwest clients at.
#[cfg(test)]
pub(crate) mod test_server {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use axum::Router;
    use axum::http::HeaderMap;
    use axum::http::header::AUTHORIZATION;
    use serde_json::Value;
    use url::Url;

    /// Authorization header and JSON body of one received request.
    #[derive(Clone, Debug)]
    pub(crate) struct Received {
        pub(crate) authorization: Option<String>,
        pub(crate) body: Value,
    }

    pub(crate) type Log = Arc<Mutex<Vec<Received>>>;

    pub(crate) fn record(log: &Log, headers: &HeaderMap, body: Value) {
        let authorization = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        log.lock()
            .expect("lock log")
            .push(Received { authorization, body });
    }

    pub(crate) fn received(log: &Log) -> Vec<Received> {
        log.lock().expect("lock log").clone()
    }

    /// Serves `router` on an ephemeral port, returns its base URL.
    pub(crate) async fn serve(router: Router) -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind loopback");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        Url::parse(&format!("http://{addr}/")).expect("server url")
    }

    /// Client that never goes through an environment proxy.
    pub(crate) fn client() -> reqwest::Client {
        reqwest::Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .expect("build client")
    }
}
