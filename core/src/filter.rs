//! Query filter for `GET /clients`.
//!
//! Every field is optional. Unset fields, and set fields holding an empty
//! string or zero, are left out of the query string. Keys are emitted in a
//! fixed order so the encoded form is stable.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// Connection state a client can be filtered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Connected,
    Idle,
    Disconnected,
}

impl ConnectionState {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionState::Connected => "connected",
            ConnectionState::Idle => "idle",
            ConnectionState::Disconnected => "disconnected",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter and pagination parameters for listing clients.
///
/// Timestamp bounds are unix seconds. `clean_start` distinguishes
/// "filter for false" (`Some(false)`) from "don't filter" (`None`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientQueryFilter {
    #[serde(rename = "_page")]
    pub page: Option<u64>,
    #[serde(rename = "_limit")]
    pub limit: Option<u64>,
    pub clientid: Option<String>,
    pub username: Option<String>,
    pub zone: Option<String>,
    pub ip_address: Option<String>,
    #[serde(rename = "connected_state")]
    pub conn_state: Option<ConnectionState>,
    pub clean_start: Option<bool>,
    pub proto_name: Option<String>,
    pub proto_ver: Option<String>,
    #[serde(rename = "_gte_create_at")]
    pub gte_create_at: Option<i64>,
    #[serde(rename = "_lte_create_at")]
    pub lte_create_at: Option<i64>,
    #[serde(rename = "_gte_connected_at")]
    pub gte_connected_at: Option<i64>,
    #[serde(rename = "_lte_connected_at")]
    pub lte_connected_at: Option<i64>,
}

fn text(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn number<N: Copy + Default + PartialEq + ToString>(value: Option<N>) -> Option<String> {
    value.filter(|n| *n != N::default()).map(|n| n.to_string())
}

impl ClientQueryFilter {
    /// Key/value pairs that will be sent, in wire order.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        let mut push = |key: &'static str, value: Option<String>| {
            if let Some(value) = value {
                pairs.push((key, value));
            }
        };

        push("_page", number(self.page));
        push("_limit", number(self.limit));
        push("clientid", text(&self.clientid).map(str::to_string));
        push("username", text(&self.username).map(str::to_string));
        push("zone", text(&self.zone).map(str::to_string));
        push("ip_address", text(&self.ip_address).map(str::to_string));
        push(
            "connected_state",
            self.conn_state.map(|s| s.as_str().to_string()),
        );
        push("clean_start", self.clean_start.map(|b| b.to_string()));
        push("proto_name", text(&self.proto_name).map(str::to_string));
        push("proto_ver", text(&self.proto_ver).map(str::to_string));
        push("_gte_create_at", number(self.gte_create_at));
        push("_lte_create_at", number(self.lte_create_at));
        push("_gte_connected_at", number(self.gte_connected_at));
        push("_lte_connected_at", number(self.lte_connected_at));

        pairs
    }

    /// URL-encoded query string, without a leading `?`. Empty when no field
    /// is set.
    ///
    /// Values follow `application/x-www-form-urlencoded`: space becomes `+`,
    /// `*` is left as is and `~` is escaped to `%7E`.
    pub fn query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.pairs() {
            serializer.append_pair(key, &value);
        }
        serializer.finish()
    }
}
