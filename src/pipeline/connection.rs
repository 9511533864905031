//! Directed connections between node ports

use crate::core::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One end of a connection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConnectionPort {
    pub node_id: String,
    pub port_id: String,
}

impl PipelineConnectionPort {
    pub fn new(node_id: impl Into<String>, port_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            port_id: port_id.into(),
        }
    }
}

/// An edge from a source output port to a target input port
///
/// `filters` is a query gating propagation. On the wire it travels
/// JSON-encoded under `condition`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ConnectionWire", into = "ConnectionWire")]
pub struct PipelineConnection {
    pub source: PipelineConnectionPort,
    pub target: PipelineConnectionPort,
    pub filters: Option<Value>,
    pub action: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConnectionWire {
    src: PipelineConnectionPort,
    tgt: PipelineConnectionPort,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    condition: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    action: Option<String>,
}

impl TryFrom<ConnectionWire> for PipelineConnection {
    type Error = serde_json::Error;

    fn try_from(wire: ConnectionWire) -> std::result::Result<Self, Self::Error> {
        let filters = match wire.condition {
            None | Some(Value::Null) => None,
            Some(Value::String(encoded)) if encoded.is_empty() => None,
            Some(Value::String(encoded)) => Some(serde_json::from_str(&encoded)?),
            // older pipelines store the query unencoded
            Some(query) => Some(query),
        };

        Ok(Self {
            source: wire.src,
            target: wire.tgt,
            filters,
            action: wire.action,
        })
    }
}

impl From<PipelineConnection> for ConnectionWire {
    fn from(connection: PipelineConnection) -> Self {
        Self {
            src: connection.source,
            tgt: connection.target,
            condition: connection.filters.map(|query| Value::String(query.to_string())),
            action: connection.action,
        }
    }
}

impl PipelineConnection {
    pub fn new(source: PipelineConnectionPort, target: PipelineConnectionPort) -> Self {
        Self {
            source,
            target,
            filters: None,
            action: None,
        }
    }

    pub fn with_filters(mut self, filters: Value) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }

    pub fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn connection() -> PipelineConnection {
        PipelineConnection::new(
            PipelineConnectionPort::new("n1", "p-out"),
            PipelineConnectionPort::new("n2", "p-in"),
        )
    }

    #[test]
    fn test_plain_connection_has_no_condition_or_action() {
        assert_eq!(
            connection().to_json().unwrap(),
            json!({
                "src": {"nodeId": "n1", "portId": "p-out"},
                "tgt": {"nodeId": "n2", "portId": "p-in"}
            })
        );
    }

    #[test]
    fn test_filters_encoded_as_condition_string() {
        let filters = json!({"$and": [{"hidden": false}, {"type": "file"}]});
        let value = connection()
            .with_filters(filters.clone())
            .with_action("complete")
            .to_json()
            .unwrap();

        let condition = value["condition"].as_str().unwrap();
        assert_eq!(serde_json::from_str::<Value>(condition).unwrap(), filters);
        assert_eq!(value["action"], json!("complete"));

        let parsed = PipelineConnection::from_json(&value).unwrap();
        assert_eq!(parsed.filters, Some(filters));
        assert_eq!(parsed.action.as_deref(), Some("complete"));
    }

    #[test]
    fn test_unencoded_condition_accepted() {
        let value = json!({
            "src": {"nodeId": "n1", "portId": "a"},
            "tgt": {"nodeId": "n2", "portId": "b"},
            "condition": {"dir": "/train"}
        });
        let parsed = PipelineConnection::from_json(&value).unwrap();
        assert_eq!(parsed.filters, Some(json!({"dir": "/train"})));
    }

    #[test]
    fn test_empty_condition_string_is_no_filter() {
        let value = json!({
            "src": {"nodeId": "n1", "portId": "a"},
            "tgt": {"nodeId": "n2", "portId": "b"},
            "condition": ""
        });
        assert_eq!(PipelineConnection::from_json(&value).unwrap().filters, None);
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(connection(), connection());
        assert_ne!(connection(), connection().with_action("discard"));
    }
}
