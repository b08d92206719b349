//! Client façade for the EMQX `/clients` admin endpoints.
//!
//! # Design
//! `EmqxClient` holds immutable `Credentials` and a transport, and carries no
//! mutable state between calls. Each operation is split into a `build_*`
//! method that produces an `HttpRequest` and a `parse_*` method that consumes
//! an `HttpResponse`; the operation itself is build, execute, parse. Both
//! halves are public so callers that own their I/O can drive them directly.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use tracing::{debug, warn};

use crate::auth::Credentials;
use crate::error::{ApiError, ConfigError};
use crate::filter::ClientQueryFilter;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, UreqTransport};
use crate::types::{ClientListPage, ClientRecord, QoS, SubscribeRequest, UnsubscribeRequest};

/// Characters escaped when a client id is placed in a path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Synchronous client for the EMQX client-management API.
#[derive(Debug, Clone)]
pub struct EmqxClient<T = UreqTransport> {
    credentials: Credentials,
    transport: T,
}

impl EmqxClient<UreqTransport> {
    pub fn new(base_url: &str, app_id: &str, app_secret: &str) -> Self {
        Self::with_transport(
            Credentials::new(base_url, app_id, app_secret),
            UreqTransport::new(),
        )
    }

    /// Build a client from `EMQX_BASE_URL`, `EMQX_APP_ID` and `EMQX_APP_SECRET`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::with_transport(
            Credentials::from_env()?,
            UreqTransport::new(),
        ))
    }
}

impl<T: HttpTransport> EmqxClient<T> {
    pub fn with_transport(credentials: Credentials, transport: T) -> Self {
        Self {
            credentials,
            transport,
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// `GET /clients` with `filter` as the query string.
    pub fn list_clients(&self, filter: &ClientQueryFilter) -> Result<ClientListPage, ApiError> {
        let response = self.send(self.build_list_clients(filter))?;
        self.parse_list_clients(response)
    }

    /// `GET /clients/{id}`.
    pub fn get_client(&self, client_id: &str) -> Result<ClientRecord, ApiError> {
        let response = self.send(self.build_get_client(client_id))?;
        self.parse_get_client(response)
    }

    /// `DELETE /clients/{id}`: kicks the client and drops its session.
    pub fn delete_client(&self, client_id: &str) -> Result<(), ApiError> {
        let response = self.send(self.build_delete_client(client_id))?;
        self.parse_delete_client(response)
    }

    /// `POST /clients/{id}/subscribe`.
    pub fn subscribe(&self, client_id: &str, topic: &str, qos: QoS) -> Result<(), ApiError> {
        let response = self.send(self.build_subscribe(client_id, topic, qos)?)?;
        self.parse_subscribe(response)
    }

    /// `POST /clients/{id}/unsubscribe`.
    pub fn unsubscribe(&self, client_id: &str, topic: &str) -> Result<(), ApiError> {
        let response = self.send(self.build_unsubscribe(client_id, topic)?)?;
        self.parse_unsubscribe(response)
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = request.method.as_str(), url = %request.url, "sending admin request");
        let response = self.transport.execute(request).map_err(ApiError::Transport)?;
        debug!(status = response.status, "admin response received");
        Ok(response)
    }

    // -----------------------------------------------------------------------
    // Request builders
    // -----------------------------------------------------------------------

    pub fn build_list_clients(&self, filter: &ClientQueryFilter) -> HttpRequest {
        let query = filter.query_string();
        let url = if query.is_empty() {
            format!("{}/clients", self.credentials.base_url())
        } else {
            format!("{}/clients?{query}", self.credentials.base_url())
        };
        self.request(HttpMethod::Get, url, None)
    }

    pub fn build_get_client(&self, client_id: &str) -> HttpRequest {
        self.request(HttpMethod::Get, self.client_url(client_id, None), None)
    }

    pub fn build_delete_client(&self, client_id: &str) -> HttpRequest {
        self.request(HttpMethod::Delete, self.client_url(client_id, None), None)
    }

    pub fn build_subscribe(
        &self,
        client_id: &str,
        topic: &str,
        qos: QoS,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(&SubscribeRequest {
            topic: topic.to_string(),
            qos,
        })
        .map_err(ApiError::Serialization)?;
        Ok(self.request(
            HttpMethod::Post,
            self.client_url(client_id, Some("subscribe")),
            Some(body),
        ))
    }

    pub fn build_unsubscribe(&self, client_id: &str, topic: &str) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(&UnsubscribeRequest {
            topic: topic.to_string(),
        })
        .map_err(ApiError::Serialization)?;
        Ok(self.request(
            HttpMethod::Post,
            self.client_url(client_id, Some("unsubscribe")),
            Some(body),
        ))
    }

    fn client_url(&self, client_id: &str, action: Option<&str>) -> String {
        let id = utf8_percent_encode(client_id, PATH_SEGMENT);
        match action {
            Some(action) => format!("{}/clients/{id}/{action}", self.credentials.base_url()),
            None => format!("{}/clients/{id}", self.credentials.base_url()),
        }
    }

    /// Every request is authenticated; requests with a body are JSON.
    fn request(&self, method: HttpMethod, url: String, body: Option<String>) -> HttpRequest {
        let mut headers = vec![(
            "authorization".to_string(),
            self.credentials.auth_header(),
        )];
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        HttpRequest {
            method,
            url,
            headers,
            body,
        }
    }

    // -----------------------------------------------------------------------
    // Response parsers
    // -----------------------------------------------------------------------

    pub fn parse_list_clients(&self, response: HttpResponse) -> Result<ClientListPage, ApiError> {
        check_status(&response, 200)?;
        serde_json::from_str(&response.body).map_err(ApiError::Deserialization)
    }

    pub fn parse_get_client(&self, response: HttpResponse) -> Result<ClientRecord, ApiError> {
        check_status(&response, 200)?;
        serde_json::from_str(&response.body).map_err(ApiError::Deserialization)
    }

    pub fn parse_delete_client(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)
    }

    pub fn parse_subscribe(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 200)
    }

    pub fn parse_unsubscribe(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)
    }
}

/// Anything but the exact expected status is an error carrying the body.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    warn!(
        status = response.status,
        expected, "unexpected status from EMQX admin API"
    );
    Err(ApiError::Status {
        status: response.status,
        body: response.body.clone(),
    })
}
