//! reqwest-backed implementation of [`CareApi`].

use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;

use super::client::CareApi;
use super::error::ApiError;
use super::types::{AuthResponse, LoginRequest, RegistrationRequest};
use crate::config::ClientConfig;
use crate::models::{
    Appointment, ChatReply, ChatRequest, FaqEntry, RiskAssessment, RosterEntry, VitalReading,
    VitalSubmission,
};
use crate::session::CredentialToken;

/// HTTP client for the CareCompanion backend.
///
/// Keeps a cookie jar so the server-side session set during the provider
/// redirect is presented to `/auth/oauth-user`. No client-side timeout is
/// configured; hung requests surface whenever the transport gives up.
pub struct HttpCareApi {
    api_base: String,
    client: Client,
}

impl HttpCareApi {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            api_base: config.api_base(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    /// API URL with each segment percent-encoded, for paths that carry ids.
    fn segment_url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url =
            Url::parse(&self.api_base).map_err(|e| ApiError::Transport(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::Transport(format!("{} cannot take a path", self.api_base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authed(&self, request: RequestBuilder, token: &CredentialToken) -> RequestBuilder {
        request.bearer_auth(token.expose())
    }

    /// Send and decode a JSON body; non-2xx becomes [`ApiError::Status`].
    async fn fetch<T: DeserializeOwned + Send>(
        &self,
        endpoint: &'static str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await.map_err(|e| {
            tracing::debug!(endpoint, error = %e, "Request failed before a response");
            ApiError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(endpoint, status = status.as_u16(), "Request rejected");
            return Err(ApiError::from_status(status.as_u16(), &body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

impl CareApi for HttpCareApi {
    async fn register(&self, request: &RegistrationRequest) -> Result<AuthResponse, ApiError> {
        let req = self.client.post(self.url("/auth/register")).json(request);
        self.fetch("register", req).await
    }

    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        let req = self.client.post(self.url("/auth/login")).json(request);
        self.fetch("login", req).await
    }

    async fn oauth_session(&self) -> Result<AuthResponse, ApiError> {
        let req = self.client.get(self.url("/auth/oauth-user"));
        self.fetch("oauth_session", req).await
    }

    async fn list_vitals(&self, token: &CredentialToken) -> Result<Vec<VitalReading>, ApiError> {
        let req = self.authed(self.client.get(self.url("/vitals")), token);
        self.fetch("list_vitals", req).await
    }

    async fn submit_vital(
        &self,
        token: &CredentialToken,
        body: &VitalSubmission,
    ) -> Result<VitalReading, ApiError> {
        let req = self.authed(self.client.post(self.url("/vitals")), token).json(body);
        self.fetch("submit_vital", req).await
    }

    async fn latest_risk(
        &self,
        token: &CredentialToken,
    ) -> Result<Option<RiskAssessment>, ApiError> {
        let req = self.authed(self.client.get(self.url("/risk-score/latest")), token);
        match self.fetch::<Option<RiskAssessment>>("latest_risk", req).await {
            Err(e) if e.is_not_found() => Ok(None),
            other => other,
        }
    }

    async fn chat(
        &self,
        token: &CredentialToken,
        request: &ChatRequest,
    ) -> Result<ChatReply, ApiError> {
        let req = self.authed(self.client.post(self.url("/chat")), token).json(request);
        self.fetch("chat", req).await
    }

    async fn list_patients(&self, token: &CredentialToken) -> Result<Vec<RosterEntry>, ApiError> {
        let req = self.authed(self.client.get(self.url("/doctor/patients")), token);
        self.fetch("list_patients", req).await
    }

    async fn patient_vitals(
        &self,
        token: &CredentialToken,
        patient_id: &str,
    ) -> Result<Vec<VitalReading>, ApiError> {
        let url = self.segment_url(&["doctor", "patients", patient_id, "vitals"])?;
        let req = self.authed(self.client.get(url), token);
        self.fetch("patient_vitals", req).await
    }

    async fn list_faqs(&self, token: &CredentialToken) -> Result<Vec<FaqEntry>, ApiError> {
        let req = self.authed(self.client.get(self.url("/faqs")), token);
        self.fetch("list_faqs", req).await
    }

    async fn list_appointments(
        &self,
        token: &CredentialToken,
    ) -> Result<Vec<Appointment>, ApiError> {
        let req = self.authed(self.client.get(self.url("/appointments")), token);
        self.fetch("list_appointments", req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::http::{HeaderMap, StatusCode as AxumStatus};
    use axum::extract::Path;
    use axum::response::IntoResponse;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use crate::models::Role;

    async fn serve(app: Router) -> HttpCareApi {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        let config = ClientConfig::new(&format!("http://{addr}"), std::env::temp_dir());
        HttpCareApi::new(&config).unwrap()
    }

    fn user_json(role: &str) -> Value {
        json!({"id": "u1", "email": "ann@example.org", "full_name": "Ann Lee", "role": role})
    }

    fn bearer(headers: &HeaderMap) -> Option<String> {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    #[tokio::test]
    async fn login_posts_credentials_and_parses_session() {
        let seen = Arc::new(Mutex::new(None::<Value>));
        let seen_in = seen.clone();
        let app = Router::new().route(
            "/api/auth/login",
            post(move |Json(body): Json<Value>| {
                let seen = seen_in.clone();
                async move {
                    *seen.lock().unwrap() = Some(body);
                    Json(json!({"access_token": "tok-1", "token_type": "bearer", "user": user_json("patient")}))
                }
            }),
        );
        let api = serve(app).await;

        let resp = api
            .login(&LoginRequest {
                email: "ann@example.org".into(),
                password: "pw".into(),
            })
            .await
            .unwrap();

        assert_eq!(resp.access_token, "tok-1");
        assert_eq!(resp.user.role, Role::Patient);
        let body = seen.lock().unwrap().clone().unwrap();
        assert_eq!(body, json!({"email": "ann@example.org", "password": "pw"}));
    }

    #[tokio::test]
    async fn rejected_login_keeps_server_detail() {
        let app = Router::new().route(
            "/api/auth/login",
            post(|| async {
                (
                    AxumStatus::UNAUTHORIZED,
                    Json(json!({"detail": "Invalid email or password"})),
                )
            }),
        );
        let api = serve(app).await;

        let err = api
            .login(&LoginRequest {
                email: "x@y.z".into(),
                password: "bad".into(),
            })
            .await
            .unwrap_err();

        assert!(err.is_auth_failure());
        assert_eq!(err.user_message("Authentication failed"), "Invalid email or password");
    }

    #[tokio::test]
    async fn protected_calls_carry_bearer_header() {
        let app = Router::new().route(
            "/api/vitals",
            get(|headers: HeaderMap| async move {
                if bearer(&headers).as_deref() == Some("Bearer tok-7") {
                    Json(json!([{"id": "v1", "heart_rate": 70, "timestamp": "2024-01-01T00:00:00+00:00"}]))
                        .into_response()
                } else {
                    (AxumStatus::UNAUTHORIZED, Json(json!({"detail": "Invalid or expired token"})))
                        .into_response()
                }
            }),
        );
        let api = serve(app).await;

        let vitals = api.list_vitals(&CredentialToken::new("tok-7")).await.unwrap();
        assert_eq!(vitals.len(), 1);
        assert_eq!(vitals[0].heart_rate, Some(70));

        let err = api.list_vitals(&CredentialToken::new("wrong")).await.unwrap_err();
        assert!(err.is_auth_failure());
    }

    #[tokio::test]
    async fn registration_body_omits_absent_fields() {
        let seen = Arc::new(Mutex::new(None::<Value>));
        let seen_in = seen.clone();
        let app = Router::new().route(
            "/api/auth/register",
            post(move |Json(body): Json<Value>| {
                let seen = seen_in.clone();
                async move {
                    *seen.lock().unwrap() = Some(body);
                    Json(json!({"access_token": "t", "user": user_json("doctor")}))
                }
            }),
        );
        let api = serve(app).await;

        api.register(&RegistrationRequest {
            email: "d@x.org".into(),
            password: "pw".into(),
            full_name: "Dana Cole".into(),
            role: Role::Doctor,
            age: None,
            specialization: Some("Cardiology".into()),
        })
        .await
        .unwrap();

        let body = seen.lock().unwrap().clone().unwrap();
        let obj = body.as_object().unwrap();
        assert!(!obj.contains_key("age"));
        assert_eq!(obj["specialization"], "Cardiology");
        assert_eq!(obj["role"], "doctor");
    }

    #[tokio::test]
    async fn missing_risk_reads_as_none() {
        let app = Router::new()
            .route(
                "/api/risk-score/latest",
                get(|| async { (AxumStatus::NOT_FOUND, Json(json!({"detail": "Not Found"}))) }),
            );
        let api = serve(app).await;
        let risk = api.latest_risk(&CredentialToken::new("t")).await.unwrap();
        assert!(risk.is_none());
    }

    #[tokio::test]
    async fn null_risk_reads_as_none() {
        let app = Router::new().route("/api/risk-score/latest", get(|| async { Json(Value::Null) }));
        let api = serve(app).await;
        let risk = api.latest_risk(&CredentialToken::new("t")).await.unwrap();
        assert!(risk.is_none());
    }

    #[tokio::test]
    async fn oauth_session_sends_no_bearer() {
        let app = Router::new().route(
            "/api/auth/oauth-user",
            get(|headers: HeaderMap| async move {
                if bearer(&headers).is_some() {
                    (AxumStatus::BAD_REQUEST, Json(json!({"detail": "unexpected token"})))
                        .into_response()
                } else {
                    Json(json!({"access_token": "g-tok", "user": user_json("patient")}))
                        .into_response()
                }
            }),
        );
        let api = serve(app).await;
        let resp = api.oauth_session().await.unwrap();
        assert_eq!(resp.access_token, "g-tok");
    }

    #[tokio::test]
    async fn patient_vitals_uses_patient_path() {
        let app = Router::new().route(
            "/api/doctor/patients/p-42/vitals",
            get(|| async { Json(json!([])) }),
        );
        let api = serve(app).await;
        let vitals = api
            .patient_vitals(&CredentialToken::new("t"), "p-42")
            .await
            .unwrap();
        assert!(vitals.is_empty());
    }

    #[tokio::test]
    async fn patient_id_is_one_encoded_segment() {
        let app = Router::new().route(
            "/api/doctor/patients/:id/vitals",
            get(|Path(id): Path<String>| async move {
                if id == "a/b?c" {
                    Json(json!([])).into_response()
                } else {
                    AxumStatus::NOT_FOUND.into_response()
                }
            }),
        );
        let api = serve(app).await;
        let vitals = api
            .patient_vitals(&CredentialToken::new("t"), "a/b?c")
            .await
            .unwrap();
        assert!(vitals.is_empty());
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let app = Router::new().route("/api/faqs", get(|| async { "not json" }));
        let api = serve(app).await;
        let err = api.list_faqs(&CredentialToken::new("t")).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn unreachable_server_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = ClientConfig::new(&format!("http://{addr}"), std::env::temp_dir());
        let api = HttpCareApi::new(&config).unwrap();
        let err = api.list_faqs(&CredentialToken::new("t")).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
