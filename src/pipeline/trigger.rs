//! Start-node triggers

use crate::core::GraphError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::LazyLock;

static CRON_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Za-z*/,\-?LW#]+$").expect("valid cron field regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerResource {
    Item,
    Dataset,
    Annotation,
    ItemStatus,
    Task,
    Assignment,
    Model,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerAction {
    Created,
    Updated,
    Deleted,
    Clone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionMode {
    Once,
    Always,
}

/// Fire on platform resource events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTrigger {
    #[serde(default = "empty_filter")]
    pub filter: Value,
    pub resource: TriggerResource,
    pub execution_mode: ExecutionMode,
    #[serde(default)]
    pub actions: Vec<TriggerAction>,
}

fn empty_filter() -> Value {
    json!({})
}

impl Default for EventTrigger {
    fn default() -> Self {
        Self {
            filter: empty_filter(),
            resource: TriggerResource::Item,
            execution_mode: ExecutionMode::Once,
            actions: vec![TriggerAction::Created],
        }
    }
}

/// Fire on a schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CronTrigger {
    pub cron: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "spec")]
pub enum Trigger {
    Event(EventTrigger),
    Cron(CronTrigger),
}

impl Trigger {
    pub fn event(resource: TriggerResource, actions: Vec<TriggerAction>) -> Self {
        Trigger::Event(EventTrigger {
            resource,
            actions,
            ..Default::default()
        })
    }

    pub fn cron(cron: impl Into<String>) -> Self {
        Trigger::Cron(CronTrigger { cron: cron.into() })
    }

    /// Check a cron trigger has five or six well-formed fields
    pub fn validate(&self) -> Result<(), GraphError> {
        if let Trigger::Cron(CronTrigger { cron }) = self {
            let fields: Vec<&str> = cron.split_whitespace().collect();
            let well_formed = (5..=6).contains(&fields.len()) && fields.iter().all(|f| CRON_FIELD.is_match(f));
            if !well_formed {
                return Err(GraphError::InvalidCron { cron: cron.clone() });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_trigger_wire_format() {
        let trigger = Trigger::event(TriggerResource::Item, vec![TriggerAction::Created, TriggerAction::Updated]);
        assert_eq!(
            serde_json::to_value(&trigger).unwrap(),
            json!({
                "type": "Event",
                "spec": {
                    "filter": {},
                    "resource": "Item",
                    "executionMode": "Once",
                    "actions": ["Created", "Updated"]
                }
            })
        );
    }

    #[test]
    fn test_cron_trigger_parse() {
        let trigger: Trigger = serde_json::from_value(json!({"type": "Cron", "spec": {"cron": "0 5 * * *"}})).unwrap();
        assert_eq!(trigger, Trigger::cron("0 5 * * *"));
        assert!(trigger.validate().is_ok());
    }

    #[test]
    fn test_event_filter_defaults_to_empty() {
        let trigger: Trigger = serde_json::from_value(json!({
            "type": "Event",
            "spec": {"resource": "Dataset", "executionMode": "Always"}
        }))
        .unwrap();
        match trigger {
            Trigger::Event(event) => {
                assert_eq!(event.filter, json!({}));
                assert!(event.actions.is_empty());
            }
            other => panic!("unexpected trigger {:?}", other),
        }
    }

    #[test]
    fn test_invalid_cron() {
        assert!(Trigger::cron("every day").validate().is_err());
        assert!(Trigger::cron("* * * *").validate().is_err());
        assert!(Trigger::cron("0 0 12 * * ? 2030").validate().is_err());
        assert!(Trigger::cron("*/15 0 1,15 * 1-5").validate().is_ok());
        assert!(Trigger::cron("0 0 12 ? * MON").validate().is_ok());
    }
}
