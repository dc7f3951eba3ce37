use std::sync::Arc;

use auth::Authenticator;
use auth::SessionIssuer;
use auth::SigningKey;
use auth::TokenCodec;
use auth::TOKEN_HEADER;
use serde_json::json;
use serde_json::Value;
use user_service::domain::user::service::UserService;
use user_service::inbound::http::router::create_router;
use user_service::outbound::repositories::InMemoryUserRepository;

pub const TEST_SECRET: &str = "test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
    pub codec: Arc<TokenCodec>,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let signing_key = SigningKey::new(TEST_SECRET).expect("Failed to build signing key");
        let codec = Arc::new(TokenCodec::new(&signing_key));

        let user_repo = Arc::new(InMemoryUserRepository::new());
        let session_issuer = Arc::new(SessionIssuer::new(Arc::clone(&codec)));
        let user_service = Arc::new(UserService::new(user_repo, session_issuer));
        let authenticator = Arc::new(Authenticator::new(Arc::clone(&codec)));

        let router = create_router(user_service, authenticator);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            api_client: reqwest::Client::new(),
            codec,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(&format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(&format!("{}{}", self.address, path))
    }

    /// Helper to make GET request carrying the `token` header
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).header(TOKEN_HEADER, token)
    }

    /// Register a user and return the parsed response body
    pub async fn signup(&self, email: &str, phone: &str, user_type: &str) -> Value {
        let response = self
            .post("/users/signup")
            .json(&json!({
                "first_name": "Ada",
                "last_name": "Lovelace",
                "email": email,
                "phone": phone,
                "password": "pass_word!",
                "user_type": user_type
            }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        response.json().await.expect("Failed to parse response")
    }

    /// Send a login request and return the raw response
    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/users/login")
            .json(&json!({
                "email": email,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }
}
