//! Wire DTOs for the EMQX `/clients` endpoints.
//!
//! # Design
//! `ClientRecord` mirrors the flat JSON object EMQX returns for a client
//! session. Every field defaults when absent: brokers omit some fields
//! depending on session state (`disconnected_at` only appears for offline
//! clients) and version. These types are defined independently of the
//! mock-server crate; integration tests catch schema drift.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Reads `null` as the field's default. EMQX sends `null` for some scalars,
/// e.g. `username` of an anonymous client.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Snapshot of one broker-managed MQTT client session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientRecord {
    /// Name of the node the client is connected to.
    #[serde(deserialize_with = "null_as_default")]
    pub node: String,
    #[serde(deserialize_with = "null_as_default")]
    pub clientid: String,
    #[serde(deserialize_with = "null_as_default")]
    pub username: String,
    /// `MQTT`, `CoAP`, `MQTT-SN`, ...
    #[serde(deserialize_with = "null_as_default")]
    pub proto_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub proto_ver: u8,
    #[serde(deserialize_with = "null_as_default")]
    pub ip_address: String,
    #[serde(deserialize_with = "null_as_default")]
    pub port: u16,
    #[serde(deserialize_with = "null_as_default")]
    pub is_bridge: bool,
    /// `YYYY-MM-DD HH:mm:ss`
    #[serde(deserialize_with = "null_as_default")]
    pub connected_at: String,
    /// Only reported while `connected` is false.
    pub disconnected_at: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub connected: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub zone: String,
    /// Keepalive in seconds.
    #[serde(deserialize_with = "null_as_default")]
    pub keepalive: u32,

    // Session
    #[serde(deserialize_with = "null_as_default")]
    pub clean_start: bool,
    /// Session expiry interval in seconds.
    #[serde(deserialize_with = "null_as_default")]
    pub expiry_interval: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub create_at: String,

    // Subscriptions
    #[serde(deserialize_with = "null_as_default")]
    pub subscriptions_cnt: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub max_subscriptions: u64,

    // Queues
    #[serde(deserialize_with = "null_as_default")]
    pub inflight: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub max_inflight: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub mqueue_len: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub max_mqueue: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub mqueue_dropped: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub awaiting_rel: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub max_awaiting_rel: u64,

    // Traffic received by the broker
    #[serde(deserialize_with = "null_as_default")]
    pub recv_oct: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub recv_cnt: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub recv_pkt: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub recv_msg: u64,

    // Traffic sent by the broker
    #[serde(deserialize_with = "null_as_default")]
    pub send_oct: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub send_cnt: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub send_pkt: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub send_msg: u64,

    // Connection process
    #[serde(deserialize_with = "null_as_default")]
    pub mailbox_len: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub heap_size: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub reductions: u64,
}

/// Pagination metadata of a list response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageMeta {
    pub page: u64,
    pub limit: u64,
    /// Total matching clients across all pages.
    pub count: u64,
}

/// One page of the server-side paginated client collection, in the order
/// the server returned it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientListPage {
    #[serde(rename = "data", default)]
    pub items: Vec<ClientRecord>,
    #[serde(default)]
    pub meta: PageMeta,
}

impl ClientListPage {
    /// First record whose client id equals `client_id`.
    pub fn find(&self, client_id: &str) -> Option<&ClientRecord> {
        self.items.iter().find(|c| c.clientid == client_id)
    }

    /// Client ids in page order.
    pub fn client_ids(&self) -> Vec<&str> {
        self.items.iter().map(|c| c.clientid.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// MQTT quality-of-service level, serialized as its integer value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QoS {
    #[default]
    AtMostOnce,
    AtLeastOnce,
    ExactlyOnce,
}

impl From<QoS> for u8 {
    fn from(qos: QoS) -> u8 {
        match qos {
            QoS::AtMostOnce => 0,
            QoS::AtLeastOnce => 1,
            QoS::ExactlyOnce => 2,
        }
    }
}

impl TryFrom<u8> for QoS {
    type Error = ApiError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(QoS::AtMostOnce),
            1 => Ok(QoS::AtLeastOnce),
            2 => Ok(QoS::ExactlyOnce),
            other => Err(ApiError::InvalidQos(other)),
        }
    }
}

impl Serialize for QoS {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8((*self).into())
    }
}

impl<'de> Deserialize<'de> for QoS {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let level = u8::deserialize(deserializer)?;
        QoS::try_from(level).map_err(serde::de::Error::custom)
    }
}

/// Body of `POST /clients/{id}/subscribe`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeRequest {
    pub topic: String,
    pub qos: QoS,
}

/// Body of `POST /clients/{id}/unsubscribe`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsubscribeRequest {
    pub topic: String,
}
