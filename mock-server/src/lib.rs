use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

/// EMQX error code for an unknown client.
pub const CODE_CLIENT_NOT_FOUND: u32 = 112;
/// EMQX error code for rejected credentials.
pub const CODE_AUTH_FAILED: u32 = 106;
/// EMQX error code for a malformed parameter.
pub const CODE_BAD_PARAMS: u32 = 102;

const DEFAULT_LIMIT: usize = 10_000;

/// The subset of the EMQX client object this server tracks.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MockClient {
    pub node: String,
    pub clientid: String,
    pub username: String,
    pub proto_name: String,
    pub proto_ver: u8,
    pub ip_address: String,
    pub port: u16,
    pub connected: bool,
    pub connected_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disconnected_at: Option<String>,
    pub zone: String,
    pub clean_start: bool,
    pub create_at: String,
    pub subscriptions_cnt: usize,
    #[serde(skip)]
    pub subscriptions: Vec<(String, u8)>,
}

impl MockClient {
    /// A connected MQTT 5 client with plausible defaults.
    pub fn new(clientid: &str) -> Self {
        Self {
            node: "emqx@127.0.0.1".to_string(),
            clientid: clientid.to_string(),
            username: String::new(),
            proto_name: "MQTT".to_string(),
            proto_ver: 5,
            ip_address: "127.0.0.1".to_string(),
            port: 50_000,
            connected: true,
            connected_at: "2024-01-01 00:00:00".to_string(),
            disconnected_at: None,
            zone: "external".to_string(),
            clean_start: true,
            create_at: "2024-01-01 00:00:00".to_string(),
            subscriptions_cnt: 0,
            subscriptions: Vec::new(),
        }
    }

    fn conn_state(&self) -> &'static str {
        if self.connected {
            "connected"
        } else {
            "disconnected"
        }
    }
}

#[derive(Serialize)]
pub struct PageMeta {
    pub page: usize,
    pub limit: usize,
    pub count: usize,
}

#[derive(Serialize)]
pub struct ClientsPage {
    pub code: u32,
    pub data: Vec<MockClient>,
    pub meta: PageMeta,
}

/// Query parameters of `GET /clients`. The `_gte_*`/`_lte_*` time bounds
/// are accepted and ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(rename = "_page")]
    pub page: Option<usize>,
    #[serde(rename = "_limit")]
    pub limit: Option<usize>,
    pub clientid: Option<String>,
    pub username: Option<String>,
    pub zone: Option<String>,
    pub ip_address: Option<String>,
    pub connected_state: Option<String>,
    pub clean_start: Option<bool>,
    pub proto_name: Option<String>,
    pub proto_ver: Option<u8>,
}

impl ListParams {
    fn matches(&self, client: &MockClient) -> bool {
        fn eq(want: &Option<String>, have: &str) -> bool {
            want.as_deref().map_or(true, |w| w == have)
        }
        eq(&self.clientid, &client.clientid)
            && eq(&self.username, &client.username)
            && eq(&self.zone, &client.zone)
            && eq(&self.ip_address, &client.ip_address)
            && eq(&self.connected_state, client.conn_state())
            && eq(&self.proto_name, &client.proto_name)
            && self.clean_start.map_or(true, |c| c == client.clean_start)
            && self.proto_ver.map_or(true, |v| v == client.proto_ver)
    }
}

#[derive(Deserialize)]
pub struct SubscribeBody {
    pub topic: String,
    pub qos: u8,
}

#[derive(Deserialize)]
pub struct UnsubscribeBody {
    pub topic: String,
}

pub struct AppState {
    auth_header: String,
    clients: RwLock<Vec<MockClient>>,
}

pub type Db = Arc<AppState>;

type Failure = (StatusCode, Json<Value>);

fn failure(status: StatusCode, code: u32, message: &str) -> Failure {
    (status, Json(json!({ "code": code, "message": message })))
}

/// Router accepting `admin`/`public` with no clients connected.
pub fn app() -> Router {
    app_with("admin", "public", Vec::new())
}

/// Router accepting `app_id`/`app_secret`, seeded with `clients` in order.
pub fn app_with(app_id: &str, app_secret: &str, clients: Vec<MockClient>) -> Router {
    let raw = format!("{app_id}:{app_secret}");
    let db: Db = Arc::new(AppState {
        auth_header: format!("Basic {}", general_purpose::STANDARD.encode(raw)),
        clients: RwLock::new(clients),
    });
    Router::new()
        .route("/clients", get(list_clients))
        .route("/clients/{id}", get(get_client).delete(delete_client))
        .route("/clients/{id}/subscribe", post(subscribe))
        .route("/clients/{id}/unsubscribe", post(unsubscribe))
        .with_state(db)
}

pub async fn run(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, router).await
}

/// A handful of clients for running the server by hand.
pub fn demo_clients() -> Vec<MockClient> {
    let mut offline = MockClient::new("thermostat-2");
    offline.connected = false;
    offline.disconnected_at = Some("2024-01-01 01:00:00".to_string());
    offline.clean_start = false;

    let mut legacy = MockClient::new("gateway-7");
    legacy.proto_ver = 4;
    legacy.username = "gateway".to_string();
    legacy.zone = "internal".to_string();

    vec![MockClient::new("thermostat-1"), offline, legacy]
}

fn authorize(db: &AppState, headers: &HeaderMap) -> Result<(), Failure> {
    let given = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if given == Some(db.auth_header.as_str()) {
        Ok(())
    } else {
        Err(failure(
            StatusCode::UNAUTHORIZED,
            CODE_AUTH_FAILED,
            "Auth failed",
        ))
    }
}

fn not_found() -> Failure {
    failure(
        StatusCode::NOT_FOUND,
        CODE_CLIENT_NOT_FOUND,
        "Client not found",
    )
}

async fn list_clients(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Result<Json<ClientsPage>, Failure> {
    authorize(&db, &headers)?;
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);

    let clients = db.clients.read().await;
    let matching: Vec<&MockClient> = clients.iter().filter(|c| params.matches(c)).collect();
    let data = matching
        .iter()
        .skip((page - 1).saturating_mul(limit))
        .take(limit)
        .map(|&c| c.clone())
        .collect();

    Ok(Json(ClientsPage {
        code: 0,
        data,
        meta: PageMeta {
            page,
            limit,
            count: matching.len(),
        },
    }))
}

async fn get_client(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<MockClient>, Failure> {
    authorize(&db, &headers)?;
    let clients = db.clients.read().await;
    clients
        .iter()
        .find(|c| c.clientid == id)
        .cloned()
        .map(Json)
        .ok_or_else(not_found)
}

async fn delete_client(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, Failure> {
    authorize(&db, &headers)?;
    let mut clients = db.clients.write().await;
    let pos = clients
        .iter()
        .position(|c| c.clientid == id)
        .ok_or_else(not_found)?;
    clients.remove(pos);
    info!(clientid = %id, "client kicked");
    Ok(StatusCode::NO_CONTENT)
}

async fn subscribe(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<SubscribeBody>,
) -> Result<Json<Value>, Failure> {
    authorize(&db, &headers)?;
    if body.qos > 2 {
        return Err(failure(
            StatusCode::BAD_REQUEST,
            CODE_BAD_PARAMS,
            "qos must be 0, 1 or 2",
        ));
    }
    let mut clients = db.clients.write().await;
    let client = clients
        .iter_mut()
        .find(|c| c.clientid == id)
        .ok_or_else(not_found)?;
    client.subscriptions.retain(|(topic, _)| *topic != body.topic);
    client.subscriptions.push((body.topic.clone(), body.qos));
    client.subscriptions_cnt = client.subscriptions.len();
    info!(clientid = %id, topic = %body.topic, qos = body.qos, "subscribed");
    Ok(Json(json!({ "code": 0 })))
}

async fn unsubscribe(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<UnsubscribeBody>,
) -> Result<StatusCode, Failure> {
    authorize(&db, &headers)?;
    let mut clients = db.clients.write().await;
    let client = clients
        .iter_mut()
        .find(|c| c.clientid == id)
        .ok_or_else(not_found)?;
    client.subscriptions.retain(|(topic, _)| *topic != body.topic);
    client.subscriptions_cnt = client.subscriptions.len();
    info!(clientid = %id, topic = %body.topic, "unsubscribed");
    Ok(StatusCode::NO_CONTENT)
}
