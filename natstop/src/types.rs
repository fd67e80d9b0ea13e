//! Types that mirror the server's monitoring JSON schema (`/varz`, `/connz`).

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct ServerOptions {
    #[serde(default, rename = "max_connections")]
    pub max_connections: u32,
}

/// Server-wide load and cumulative traffic counters (`/varz`).
/// Load and counters are required: a body without them is not a `/varz` answer.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct ServerStats {
    #[serde(rename = "cpu")]
    pub cpu_percent: f64,
    #[serde(rename = "mem")]
    pub mem_bytes: u64,
    // cumulative totals; the poll loop diffs these to compute rates
    pub in_msgs: u64,
    pub out_msgs: u64,
    pub in_bytes: u64,
    pub out_bytes: u64,
    #[serde(default)]
    pub options: ServerOptions,
}

impl ServerStats {
    pub fn max_connections(&self) -> u32 {
        self.options.max_connections
    }

    pub fn counters(&self) -> Counters {
        Counters {
            in_msgs: self.in_msgs,
            out_msgs: self.out_msgs,
            in_bytes: self.in_bytes,
            out_bytes: self.out_bytes,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ConnectionInfo {
    #[serde(rename = "cid")]
    pub id: u64,
    #[serde(default, rename = "ip")]
    pub remote_host: String,
    #[serde(default, rename = "port")]
    pub remote_port: u16,
    #[serde(default, rename = "subscriptions")]
    pub subscription_count: u32,
    #[serde(default)]
    pub pending_bytes: u64,
    #[serde(default)]
    pub out_msgs: u64,
    #[serde(default)]
    pub in_msgs: u64,
    #[serde(default)]
    pub out_bytes: u64,
    #[serde(default)]
    pub in_bytes: u64,
    #[serde(default, rename = "lang")]
    pub client_language: String,
    #[serde(default, rename = "version")]
    pub client_version: String,
}

impl ConnectionInfo {
    pub fn address(&self) -> String {
        format!("{}:{}", self.remote_host, self.remote_port)
    }
}

/// Per-connection listing (`/connz`).
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct ConnectionList {
    pub num_connections: u32,
    // older servers may send `null` when nobody is connected
    #[serde(default, deserialize_with = "null_as_empty")]
    pub connections: Vec<ConnectionInfo>,
}

fn null_as_empty<'de, D>(d: D) -> Result<Vec<ConnectionInfo>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<ConnectionInfo>>::deserialize(d)?.unwrap_or_default())
}

/// The four cumulative counters rates are derived from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub in_msgs: u64,
    pub out_msgs: u64,
    pub in_bytes: u64,
    pub out_bytes: u64,
}

/// One paired capture of `/varz` and `/connz`. Never mutated once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub server: ServerStats,
    pub connections: ConnectionList,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varz_decodes_nested_max_connections() {
        let json = r#"{
            "server_id": "abc",
            "cpu": 12.5,
            "mem": 10485760,
            "in_msgs": 100,
            "out_msgs": 200,
            "in_bytes": 3000,
            "out_bytes": 4000,
            "options": {"max_connections": 65536, "port": 4222}
        }"#;
        let v: ServerStats = serde_json::from_str(json).unwrap();
        assert_eq!(v.cpu_percent, 12.5);
        assert_eq!(v.mem_bytes, 10 * 1024 * 1024);
        assert_eq!(v.max_connections(), 65536);
        assert_eq!(
            v.counters(),
            Counters {
                in_msgs: 100,
                out_msgs: 200,
                in_bytes: 3000,
                out_bytes: 4000
            }
        );
    }

    #[test]
    fn connz_decodes_connection_records() {
        let json = r#"{
            "now": "2015-07-14T13:30:59.271149-07:00",
            "num_connections": 1,
            "connections": [{
                "cid": 7, "ip": "127.0.0.1", "port": 51234,
                "subscriptions": 3, "pending_bytes": 12,
                "out_msgs": 1, "in_msgs": 2, "out_bytes": 3, "in_bytes": 4,
                "lang": "go", "version": "1.0.9"
            }]
        }"#;
        let c: ConnectionList = serde_json::from_str(json).unwrap();
        assert_eq!(c.num_connections, 1);
        let conn = &c.connections[0];
        assert_eq!(conn.id, 7);
        assert_eq!(conn.address(), "127.0.0.1:51234");
        assert_eq!(conn.subscription_count, 3);
        assert_eq!(conn.client_language, "go");
    }

    #[test]
    fn unrelated_objects_are_rejected() {
        assert!(serde_json::from_str::<ServerStats>(r#"{"error":"not found"}"#).is_err());
        assert!(serde_json::from_str::<ServerStats>(r#"{"cpu": 1.0, "mem": 2}"#).is_err());
        assert!(serde_json::from_str::<ConnectionList>(r#"{"error":"bad"}"#).is_err());
        assert!(serde_json::from_str::<ServerStats>("[1,2,3]").is_err());
    }

    #[test]
    fn connz_null_connections_is_empty() {
        let c: ConnectionList =
            serde_json::from_str(r#"{"num_connections":0,"connections":null}"#).unwrap();
        assert!(c.connections.is_empty());
    }
}
