//! Blocking client that executes `RecordsApi` requests over HTTP.
//!
//! # Design
//! One `ApiClient` is built at startup and handed to whoever needs it. It owns
//! a single `ureq::Agent`, created the first time a request is made and reused
//! for the lifetime of the client. The agent sits in a `OnceLock`, so sharing
//! the client across threads still constructs it exactly once.
//!
//! The agent is told not to treat 4xx/5xx as transport errors: the status is
//! handed back as data and `RecordsApi` alone decides what is accepted.

use std::fmt;
use std::sync::OnceLock;

use tracing::debug;
use ureq::{Agent, RequestBuilder};

use crate::client::{accepts_status, RecordsApi, ASSIGNMENTS_PATH, STUDENT_PATH};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::token::TokenProvider;
use crate::types::{AssignmentList, StudentProfile};

pub struct ApiClient {
    api: RecordsApi,
    config: ClientConfig,
    tokens: Box<dyn TokenProvider>,
    agent: OnceLock<Agent>,
}

impl ApiClient {
    pub fn new(config: ClientConfig, tokens: impl TokenProvider + 'static) -> Self {
        Self {
            api: RecordsApi::new(&config.base_url),
            config,
            tokens: Box::new(tokens),
            agent: OnceLock::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        self.api.base_url()
    }

    /// The shared agent, built on first access.
    pub fn agent(&self) -> &Agent {
        self.agent.get_or_init(|| {
            debug!(base_url = self.api.base_url(), "building HTTP agent");
            Agent::config_builder()
                .http_status_as_error(false)
                .timeout_global(self.config.timeout())
                .build()
                .new_agent()
        })
    }

    /// `GET /assignments`.
    pub fn fetch_assignments(&self) -> Result<AssignmentList, ApiError> {
        let token = self.tokens.token();
        let request = self.api.build_fetch_assignments(&token);
        let response = self.send(ASSIGNMENTS_PATH, &token, request, true)?;
        self.api.parse_fetch_assignments(response)
    }

    /// `GET /student`.
    pub fn fetch_student(&self) -> Result<StudentProfile, ApiError> {
        let token = self.tokens.token();
        let request = self.api.build_fetch_student(&token);
        let response = self.send(STUDENT_PATH, &token, request, true)?;
        let profile = self.api.parse_fetch_student(response)?;
        if let Ok(json) = serde_json::to_string(&profile) {
            debug!(profile = %json, "fetched student");
        }
        Ok(profile)
    }

    /// `PUT /student` with the serialized profile as body.
    pub fn update_student(&self, profile: &StudentProfile) -> Result<(), ApiError> {
        let token = self.tokens.token();
        let request = self.api.build_update_student(&token, profile)?;
        if let Some(body) = &request.body {
            debug!(profile = %body, "updating student");
        }
        let response = self.send(STUDENT_PATH, &token, request, false)?;
        self.api.parse_update_student(response)
    }

    fn send(
        &self,
        resource: &str,
        token: &str,
        request: HttpRequest,
        read_body: bool,
    ) -> Result<HttpResponse, ApiError> {
        debug!(resource, token, method = request.method.as_str(), "sending request");
        let response = self.execute(request, read_body)?;
        debug!(resource, status = response.status, "received response");
        Ok(response)
    }

    /// The body is only read when `read_body` is set and the status is
    /// accepted; rejected responses reach the parser with an empty body.
    fn execute(&self, request: HttpRequest, read_body: bool) -> Result<HttpResponse, ApiError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;
        let agent = self.agent();

        let mut response = match (method, body) {
            (HttpMethod::Get, _) => with_headers(agent.get(&url), &headers).call()?,
            (HttpMethod::Put, Some(body)) => {
                with_headers(agent.put(&url), &headers).send(body.as_bytes())?
            }
            (HttpMethod::Put, None) => with_headers(agent.put(&url), &headers).send_empty()?,
        };

        let status = response.status().as_u16();
        let body = if read_body && accepts_status(status) {
            response.body_mut().read_to_string()?
        } else {
            String::new()
        };

        Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body,
        })
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .field("agent_built", &self.agent.get().is_some())
            .finish_non_exhaustive()
    }
}

fn with_headers<B>(builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    headers
        .iter()
        .fold(builder, |builder, (name, value)| builder.header(name.as_str(), value.as_str()))
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::token::StaticToken;

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLog {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn start_mock_server(token: &str) -> String {
        let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = std_listener.local_addr().unwrap();
        std_listener.set_nonblocking(true).unwrap();

        let state = Arc::new(tokio::sync::RwLock::new(mock_server::ServerState::seeded(token)));
        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
                mock_server::run_with_state(listener, state).await
            })
            .unwrap();
        });

        format!("http://{addr}")
    }

    #[test]
    fn requests_log_resource_token_status_and_profiles() {
        let base_url = start_mock_server("log-token");
        let client = ApiClient::new(ClientConfig::new(&base_url), StaticToken::new("log-token"));

        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let (fetched, edited) = tracing::subscriber::with_default(subscriber, || {
            let fetched = client.fetch_student().unwrap();
            let mut edited = fetched.clone();
            edited.set("github_user", "countess");
            client.update_student(&edited).unwrap();
            (fetched, edited)
        });

        let output = log.contents();
        assert!(output.contains("/student"), "{output}");
        assert!(output.contains("log-token"), "{output}");
        assert!(output.contains("status=200"), "{output}");
        assert!(output.contains("status=201"), "{output}");
        assert!(output.contains(&serde_json::to_string(&fetched).unwrap()), "{output}");
        assert!(output.contains(&serde_json::to_string(&edited).unwrap()), "{output}");
    }

    #[test]
    fn agent_is_built_lazily_and_once() {
        let client = ApiClient::new(ClientConfig::new("http://localhost:1"), StaticToken::new("t"));
        assert!(client.agent.get().is_none());

        let first: *const Agent = client.agent();
        let second: *const Agent = client.agent();
        assert!(std::ptr::eq(first, second));
        assert!(client.agent.get().is_some());
    }

    #[test]
    fn base_url_comes_from_config() {
        let client = ApiClient::new(ClientConfig::new("http://example.test/"), StaticToken::new("t"));
        assert_eq!(client.base_url(), "http://example.test");
    }

    #[test]
    fn debug_output_omits_token() {
        let client = ApiClient::new(ClientConfig::default(), StaticToken::new("very-secret"));
        let rendered = format!("{client:?}");
        assert!(rendered.contains("agent_built: false"));
        assert!(!rendered.contains("very-secret"));
    }

    #[test]
    fn client_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ApiClient>();
    }

    #[test]
    fn unreachable_host_is_transport_error() {
        // Port 1 on loopback refuses connections.
        let client = ApiClient::new(ClientConfig::new("http://127.0.0.1:1"), StaticToken::new("t"));
        let err = client.fetch_assignments().unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert_eq!(err.status(), None);
    }
}
