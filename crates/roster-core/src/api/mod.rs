//! User-management REST API client
//!
//! Endpoints:
//! - `POST /api/auth/login`
//! - `POST /api/auth/register`
//! - `GET /api/users`
//! - `PUT /api/users/{id}`
//! - `DELETE /api/users/{id}`
//!
//! Every call runs exactly once: no retry, no timeout, no cancellation.

use async_trait::async_trait;
use reqwest::{header, Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::models::{
    LoginRequest, LoginResponse, RegisterContract, RegistrationForm, UpdateUserRequest, UserDraft,
    UserRecord,
};
use crate::session::Session;

const LOGIN_PATH: &str = "/api/auth/login";
const REGISTER_PATH: &str = "/api/auth/register";
const USERS_PATH: &str = "/api/users";

/// User operations the controllers depend on
#[async_trait]
pub trait UserApi: Send + Sync {
    async fn list_users(&self) -> Result<Vec<UserRecord>>;

    async fn register_user(&self, draft: &UserDraft) -> Result<serde_json::Value>;

    async fn update_user(&self, user_id: i64, body: &UpdateUserRequest) -> Result<serde_json::Value>;

    async fn delete_user(&self, user_id: i64) -> Result<()>;
}

/// HTTP client for the user-management API
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ClientConfig,
    client: Client,
    session: Option<Session>,
}

impl ApiClient {
    /// Unauthenticated client; attach a session with [`ApiClient::with_session`]
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            config: config.clone(),
            client,
            session: None,
        })
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Issue a request, attaching the bearer token when a session is present.
    ///
    /// 2xx replies are parsed as JSON (an empty body reads as `null`); any
    /// other status becomes [`Error::Api`].
    pub async fn request<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(method, path, body, true).await
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: Option<&B>, authorize: bool) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.config.url(path);
        log::debug!("{} {}", method, url);

        let mut request = self.client.request(method.clone(), &url);
        if authorize {
            if let Some(session) = &self.session {
                request = request.bearer_auth(session.token());
            }
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = server_message(&text);
            log::debug!("{} {} failed with {}", method, url, status);
            return Err(Error::api(status.as_u16(), message));
        }

        let text = if text.trim().is_empty() { "null" } else { text.as_str() };
        Ok(serde_json::from_str(text)?)
    }

    fn require_session(&self) -> Result<()> {
        if self.session.is_none() {
            return Err(Error::session("Token is missing. Please log in again."));
        }
        Ok(())
    }

    /// Exchange credentials for a bearer token
    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let reply: LoginResponse = self.send(Method::POST, LOGIN_PATH, Some(&body), false).await?;
        Ok(reply.token)
    }

    /// Create an account through the registration endpoint.
    ///
    /// `authenticated` controls whether the bearer token is sent.
    pub async fn register(
        &self,
        draft: &UserDraft,
        contract: RegisterContract,
        authenticated: bool,
    ) -> Result<serde_json::Value> {
        if authenticated {
            self.require_session()?;
        }
        let body = contract.body(draft);
        self.send(Method::POST, REGISTER_PATH, Some(&body), authenticated).await
    }

    /// Public self-registration; the confirmation field is checked before anything is sent
    pub async fn register_account(&self, form: &RegistrationForm) -> Result<serde_json::Value> {
        form.validate()?;
        self.register(&form.draft, self.config.register_contract, false).await
    }
}

#[async_trait]
impl UserApi for ApiClient {
    async fn list_users(&self) -> Result<Vec<UserRecord>> {
        self.require_session()?;
        self.request::<(), _>(Method::GET, USERS_PATH, None).await
    }

    async fn register_user(&self, draft: &UserDraft) -> Result<serde_json::Value> {
        self.register(
            draft,
            self.config.register_contract,
            self.config.require_auth_for_registration,
        )
        .await
    }

    async fn update_user(&self, user_id: i64, body: &UpdateUserRequest) -> Result<serde_json::Value> {
        self.require_session()?;
        let path = format!("{}/{}", USERS_PATH, user_id);
        self.request(Method::PUT, &path, Some(body)).await
    }

    async fn delete_user(&self, user_id: i64) -> Result<()> {
        self.require_session()?;
        let path = format!("{}/{}", USERS_PATH, user_id);
        let _: serde_json::Value = self.request::<(), _>(Method::DELETE, &path, None).await?;
        Ok(())
    }
}

/// `error` or `message` field of a JSON error body
fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error", "message"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;
    use std::path::PathBuf;

    fn mint(username: &str, user_id: i64) -> String {
        encode(
            &Header::default(),
            &json!({"username": username, "user_id": user_id}),
            &EncodingKey::from_secret(b"server-secret"),
        )
        .unwrap()
    }

    fn anonymous(server: &MockServer) -> ApiClient {
        let config = ClientConfig::new(&server.base_url(), PathBuf::from("unused.json")).unwrap();
        ApiClient::new(&config).unwrap()
    }

    fn authorized(server: &MockServer, token: &str) -> ApiClient {
        anonymous(server).with_session(Session::from_token(token).unwrap())
    }

    #[test]
    fn test_server_message_prefers_error_field() {
        assert_eq!(
            server_message(r#"{"error":"boom","message":"other"}"#).as_deref(),
            Some("boom")
        );
        assert_eq!(server_message(r#"{"message":"nope"}"#).as_deref(), Some("nope"));
        assert_eq!(server_message("<html>500</html>"), None);
        assert_eq!(server_message(""), None);
    }

    #[tokio::test]
    async fn test_login_returns_token_without_auth_header() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/auth/login")
                .header_missing("authorization")
                .json_body(json!({"username": "jdoe", "password": "pw"}));
            then.status(200).json_body(json!({"token": "tok"}));
        });

        let token = anonymous(&server).login("jdoe", "pw").await.unwrap();
        assert_eq!(token, "tok");
        mock.assert();
    }

    #[tokio::test]
    async fn test_login_failure_carries_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/auth/login");
            then.status(401).json_body(json!({"message": "Invalid credentials"}));
        });

        let err = anonymous(&server).login("jdoe", "bad").await.unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.to_string(), "API error 401: Invalid credentials");
    }

    #[tokio::test]
    async fn test_list_users_sends_bearer_token() {
        let server = MockServer::start();
        let token = mint("jdoe", 5);
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/users")
                .header("authorization", format!("Bearer {}", token));
            then.status(200).json_body(json!([
                {"user_id": 3, "username": "a", "fullname": "A"},
                {"user_id": 5, "username": "jdoe", "fullname": "Jane Doe"}
            ]));
        });

        let users = authorized(&server, &token).list_users().await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[1].username, "jdoe");
        mock.assert();
    }

    #[tokio::test]
    async fn test_list_users_without_session_makes_no_request() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/api/users");
            then.status(200).json_body(json!([]));
        });

        let err = anonymous(&server).list_users().await.unwrap_err();
        assert!(err.is_auth_failure());
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_update_user_omits_empty_password() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(PUT)
                .path("/api/users/5")
                .json_body(json!({"fullname": "Jane Roe", "username": "jroe"}));
            then.status(200).json_body(json!({"message": "updated"}));
        });

        let body = UpdateUserRequest {
            fullname: "Jane Roe".to_string(),
            username: "jroe".to_string(),
            password: None,
        };
        let reply = authorized(&server, &mint("admin", 1))
            .update_user(5, &body)
            .await
            .unwrap();
        assert_eq!(reply["message"], "updated");
        mock.assert();
    }

    #[tokio::test]
    async fn test_delete_user_accepts_empty_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(DELETE).path("/api/users/7");
            then.status(204);
        });

        authorized(&server, &mint("admin", 1)).delete_user(7).await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn test_delete_user_server_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(DELETE).path("/api/users/7");
            then.status(500).json_body(json!({"error": "database down"}));
        });

        let err = authorized(&server, &mint("admin", 1))
            .delete_user(7)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().contains("database down"));
    }

    #[tokio::test]
    async fn test_register_unauthenticated_by_default() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/auth/register")
                .header_missing("authorization")
                .json_body(json!({"fullname": "New", "username": "new", "password": "pw"}));
            then.status(201).json_body(json!({"user_id": 9, "username": "new", "fullname": "New"}));
        });

        let draft = UserDraft {
            fullname: "New".to_string(),
            username: "new".to_string(),
            password: "pw".to_string(),
        };
        let created = authorized(&server, &mint("admin", 1))
            .register_user(&draft)
            .await
            .unwrap();
        assert_eq!(created["user_id"], 9);
        mock.assert();
    }

    #[tokio::test]
    async fn test_register_account_password_mismatch_makes_no_request() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/api/auth/register");
            then.status(201).json_body(json!({}));
        });

        let form = RegistrationForm {
            draft: UserDraft {
                fullname: "New".to_string(),
                username: "new".to_string(),
                password: "one".to_string(),
            },
            confirm_password: "two".to_string(),
        };
        let err = anonymous(&server).register_account(&form).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_register_authenticated_when_required() {
        let server = MockServer::start();
        let token = mint("admin", 1);
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/auth/register")
                .header("authorization", format!("Bearer {}", token))
                .json_body(json!({"fullName": "New", "username": "new", "passwordx": "pw"}));
            then.status(201).json_body(json!({}));
        });

        let mut config = ClientConfig::new(&server.base_url(), PathBuf::from("unused.json")).unwrap();
        config.require_auth_for_registration = true;
        config.register_contract = RegisterContract::Legacy;
        let client = ApiClient::new(&config)
            .unwrap()
            .with_session(Session::from_token(token.clone()).unwrap());

        let draft = UserDraft {
            fullname: "New".to_string(),
            username: "new".to_string(),
            password: "pw".to_string(),
        };
        client.register_user(&draft).await.unwrap();
        mock.assert();
    }
}
