//! Task node - routes items into an annotation or QA task

use crate::core::PlatformError;
use crate::pipeline::io::{PipelineNameSpace, PipelineNodeIO};
use crate::pipeline::node::{NodeType, PipelineNode, DEFAULT_POSITION};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const DEFAULT_TASK_TYPE: &str = "annotation";
pub const QA_TASK_TYPE: &str = "qa";

/// Days until the default due date
const DEFAULT_DUE_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskPriority {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl TaskPriority {
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            1 => Some(TaskPriority::Low),
            2 => Some(TaskPriority::Medium),
            3 => Some(TaskPriority::High),
            _ => None,
        }
    }
}

/// Share of the task assigned to one annotator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadUnit {
    pub assignee_id: String,
    pub load: f64,
}

impl WorkloadUnit {
    pub fn new(assignee_id: impl Into<String>, load: f64) -> Self {
        Self {
            assignee_id: assignee_id.into(),
            load,
        }
    }
}

/// Default output actions for a task type
pub fn default_actions(task_type: &str) -> Vec<String> {
    let first = if task_type == QA_TASK_TYPE { "approve" } else { "complete" };
    vec![first.to_string(), "discard".to_string()]
}

/// Default due date: now + 7 days, epoch milliseconds
pub fn default_due_date() -> i64 {
    (Utc::now() + Duration::days(DEFAULT_DUE_DAYS)).timestamp_millis()
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskNode {
    node: PipelineNode,
}

/// Builder for [`TaskNode`]
#[derive(Debug, Clone)]
pub struct TaskNodeBuilder {
    name: String,
    project_id: String,
    dataset_id: String,
    recipe_title: Option<String>,
    recipe_id: Option<String>,
    task_owner: Option<String>,
    workload: Vec<WorkloadUnit>,
    task_type: String,
    position: (f64, f64),
    actions: Vec<String>,
    repeatable: bool,
    batch_size: Option<i64>,
    max_batch_workload: Option<i64>,
    priority: TaskPriority,
    due_date: Option<i64>,
    consensus_task_type: Option<String>,
    consensus_percentage: Option<i64>,
    consensus_assignees: Option<i64>,
    groups: Vec<String>,
}

impl TaskNodeBuilder {
    pub fn recipe_title(mut self, recipe_title: impl Into<String>) -> Self {
        self.recipe_title = Some(recipe_title.into());
        self
    }

    pub fn recipe_id(mut self, recipe_id: impl Into<String>) -> Self {
        self.recipe_id = Some(recipe_id.into());
        self
    }

    pub fn task_owner(mut self, task_owner: impl Into<String>) -> Self {
        self.task_owner = Some(task_owner.into());
        self
    }

    pub fn workload(mut self, workload: Vec<WorkloadUnit>) -> Self {
        self.workload = workload;
        self
    }

    pub fn task_type(mut self, task_type: impl Into<String>) -> Self {
        self.task_type = task_type.into();
        self
    }

    pub fn position(mut self, position: (f64, f64)) -> Self {
        self.position = position;
        self
    }

    /// Output actions; empty falls back to the task type's defaults
    pub fn actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actions = actions.into_iter().map(Into::into).collect();
        self
    }

    pub fn repeatable(mut self, repeatable: bool) -> Self {
        self.repeatable = repeatable;
        self
    }

    pub fn batch_size(mut self, batch_size: i64) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    pub fn max_batch_workload(mut self, max_batch_workload: i64) -> Self {
        self.max_batch_workload = Some(max_batch_workload);
        self
    }

    pub fn priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Due date in epoch milliseconds
    pub fn due_date(mut self, due_date: i64) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn consensus(mut self, task_type: impl Into<String>, percentage: i64, assignees: i64) -> Self {
        self.consensus_task_type = Some(task_type.into());
        self.consensus_percentage = Some(percentage);
        self.consensus_assignees = Some(assignees);
        self
    }

    pub fn groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    pub fn build(self) -> TaskNode {
        let actions = if self.actions.is_empty() {
            default_actions(&self.task_type)
        } else {
            self.actions
        };

        let namespace = PipelineNameSpace::new("move_to_task")
            .with_project_name("DataloopTasks")
            .with_service_name("pipeline-utils");

        let node = PipelineNode::new(self.name, NodeType::Task, namespace)
            .with_inputs(vec![PipelineNodeIO::item()])
            .with_outputs(vec![PipelineNodeIO::item().with_actions(actions)])
            .with_project_id(self.project_id)
            .with_position(self.position);

        let mut task = TaskNode { node };
        task.set_dataset_id(self.dataset_id);
        task.set_recipe_title(self.recipe_title);
        task.set_recipe_id(self.recipe_id);
        task.set_task_owner(self.task_owner);
        task.set_workload(&self.workload);
        task.set_task_type(self.task_type);
        task.set_repeatable(self.repeatable);
        task.set_batch_size(self.batch_size);
        task.set_max_batch_workload(self.max_batch_workload);
        task.set_priority(self.priority);
        task.set_due_date(self.due_date.unwrap_or_else(default_due_date));
        task.node.set_metadata("consensusTaskType", self.consensus_task_type.map(Value::from));
        task.node.set_metadata("consensusPercentage", self.consensus_percentage.map(Value::from));
        task.node.set_metadata("consensusAssignees", self.consensus_assignees.map(Value::from));
        task.set_groups(&self.groups);
        task
    }
}

impl TaskNode {
    pub fn builder(
        name: impl Into<String>,
        project_id: impl Into<String>,
        dataset_id: impl Into<String>,
    ) -> TaskNodeBuilder {
        TaskNodeBuilder {
            name: name.into(),
            project_id: project_id.into(),
            dataset_id: dataset_id.into(),
            recipe_title: None,
            recipe_id: None,
            task_owner: None,
            workload: Vec::new(),
            task_type: DEFAULT_TASK_TYPE.to_string(),
            position: DEFAULT_POSITION,
            actions: Vec::new(),
            repeatable: true,
            batch_size: None,
            max_batch_workload: None,
            priority: TaskPriority::Medium,
            due_date: None,
            consensus_task_type: None,
            consensus_percentage: None,
            consensus_assignees: None,
            groups: Vec::new(),
        }
    }

    /// Wrap a parsed base node, checking the metadata types
    pub fn from_node(node: PipelineNode) -> Result<Self, PlatformError> {
        let meta = &node.metadata;
        let is_str = |v: &Value| v.is_string();
        let is_int = |v: &Value| v.is_i64() || v.is_u64();

        check(meta.get("datasetId"), "dataset_id", "string", is_str)?;
        check(meta.get("recipeTitle"), "recipe_title", "string", is_str)?;
        check(meta.get("recipeId"), "recipe_id", "string", is_str)?;
        check(meta.get("taskOwner"), "task_owner", "string", is_str)?;
        check(meta.get("taskType"), "task_type", "string", is_str)?;
        check(meta.get("repeatable"), "repeatable", "bool", Value::is_boolean)?;
        check(meta.get("batchSize"), "batch_size", "int", is_int)?;
        check(meta.get("maxBatchWorkload"), "max_batch_workload", "int", is_int)?;
        check(meta.get("dueDate"), "due_date", "float or int", Value::is_number)?;
        check(meta.get("priority"), "priority", "TaskPriority or int", |v| {
            v.as_i64().and_then(TaskPriority::from_i64).is_some()
        })?;
        check(meta.get("consensusTaskType"), "consensus_task_type", "string", is_str)?;
        check(meta.get("consensusPercentage"), "consensus_percentage", "int", is_int)?;
        check(meta.get("consensusAssignees"), "consensus_assignees", "int", is_int)?;
        check(meta.get("groups"), "groups", "list of strings", |v| {
            v.as_array().is_some_and(|groups| groups.iter().all(Value::is_string))
        })?;
        if let Some(workload) = meta.get("workload") {
            if !workload.is_null() && serde_json::from_value::<Vec<WorkloadUnit>>(workload.clone()).is_err() {
                return Err(PlatformError::bad_request(
                    "Param workload must be a list of {assigneeId, load}",
                ));
            }
        }

        Ok(Self { node })
    }

    pub fn base(&self) -> &PipelineNode {
        &self.node
    }

    pub fn base_mut(&mut self) -> &mut PipelineNode {
        &mut self.node
    }

    pub fn dataset_id(&self) -> Option<&str> {
        self.node.metadata_str("datasetId")
    }

    pub fn set_dataset_id(&mut self, dataset_id: impl Into<String>) {
        self.node.set_metadata("datasetId", Some(Value::String(dataset_id.into())));
    }

    pub fn recipe_title(&self) -> Option<&str> {
        self.node.metadata_str("recipeTitle")
    }

    pub fn set_recipe_title(&mut self, recipe_title: Option<String>) {
        self.node.set_metadata("recipeTitle", recipe_title.map(Value::String));
    }

    pub fn recipe_id(&self) -> Option<&str> {
        self.node.metadata_str("recipeId")
    }

    pub fn set_recipe_id(&mut self, recipe_id: Option<String>) {
        self.node.set_metadata("recipeId", recipe_id.map(Value::String));
    }

    pub fn task_owner(&self) -> Option<&str> {
        self.node.metadata_str("taskOwner")
    }

    pub fn set_task_owner(&mut self, task_owner: Option<String>) {
        self.node.set_metadata("taskOwner", task_owner.map(Value::String));
    }

    pub fn task_type(&self) -> &str {
        self.node.metadata_str("taskType").unwrap_or(DEFAULT_TASK_TYPE)
    }

    pub fn set_task_type(&mut self, task_type: impl Into<String>) {
        self.node.set_metadata("taskType", Some(Value::String(task_type.into())));
    }

    pub fn workload(&self) -> Vec<WorkloadUnit> {
        self.node
            .metadata
            .get("workload")
            .and_then(|w| serde_json::from_value(w.clone()).ok())
            .unwrap_or_default()
    }

    pub fn set_workload(&mut self, workload: &[WorkloadUnit]) {
        let value = if workload.is_empty() {
            None
        } else {
            Some(json!(workload))
        };
        self.node.set_metadata("workload", value);
    }

    pub fn repeatable(&self) -> bool {
        self.node
            .metadata
            .get("repeatable")
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    pub fn set_repeatable(&mut self, repeatable: bool) {
        self.node.set_metadata("repeatable", Some(Value::Bool(repeatable)));
    }

    pub fn batch_size(&self) -> Option<i64> {
        self.node.metadata.get("batchSize").and_then(Value::as_i64)
    }

    pub fn set_batch_size(&mut self, batch_size: Option<i64>) {
        self.node.set_metadata("batchSize", batch_size.map(Value::from));
    }

    pub fn max_batch_workload(&self) -> Option<i64> {
        self.node.metadata.get("maxBatchWorkload").and_then(Value::as_i64)
    }

    pub fn set_max_batch_workload(&mut self, max_batch_workload: Option<i64>) {
        self.node.set_metadata("maxBatchWorkload", max_batch_workload.map(Value::from));
    }

    pub fn priority(&self) -> Option<TaskPriority> {
        self.node
            .metadata
            .get("priority")
            .and_then(Value::as_i64)
            .and_then(TaskPriority::from_i64)
    }

    pub fn set_priority(&mut self, priority: TaskPriority) {
        self.node.set_metadata("priority", Some(Value::from(priority as i64)));
    }

    /// Due date in epoch milliseconds
    pub fn due_date(&self) -> Option<i64> {
        let due = self.node.metadata.get("dueDate")?;
        due.as_i64().or_else(|| due.as_f64().map(|ms| ms as i64))
    }

    pub fn set_due_date(&mut self, due_date: i64) {
        self.node.set_metadata("dueDate", Some(Value::from(due_date)));
    }

    pub fn groups(&self) -> Vec<String> {
        self.node
            .metadata
            .get("groups")
            .and_then(Value::as_array)
            .map(|groups| {
                groups
                    .iter()
                    .filter_map(|g| g.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn set_groups(&mut self, groups: &[String]) {
        let value = if groups.is_empty() {
            None
        } else {
            Some(json!(groups))
        };
        self.node.set_metadata("groups", value);
    }

    /// Actions on the task's output port
    pub fn actions(&self) -> &[String] {
        self.node
            .outputs
            .first()
            .map(|port| port.actions.as_slice())
            .unwrap_or(&[])
    }

    pub fn set_actions(&mut self, actions: Vec<String>) {
        if let Some(port) = self.node.outputs.first_mut() {
            port.actions = actions;
        }
    }
}

fn check(
    value: Option<&Value>,
    param: &str,
    expected: &str,
    accept: impl Fn(&Value) -> bool,
) -> Result<(), PlatformError> {
    match value {
        Some(value) if !value.is_null() && !accept(value) => Err(PlatformError::bad_request(format!(
            "Param {} must be of type {}",
            param, expected
        ))),
        _ => Ok(()),
    }
}
