//! Scenario tests for building and serializing pipeline graphs

use dataloop::core::GraphError;
use dataloop::entities::{Package, Service};
use dataloop::pipeline::nodes::{TaskPriority, WorkloadUnit};
use dataloop::pipeline::{
    CodeNode, ConnectOptions, DatasetNode, FunctionNode, Node, Pipeline, TaskNode, Trigger, TriggerAction,
    TriggerResource,
};
use serde_json::{json, Value};

const CODE: &str = "def run(item):\n    return item\n";

fn detector() -> (Service, Package) {
    let service = serde_json::from_value(json!({
        "id": "svc-1",
        "name": "detector",
        "projectId": "project-1",
        "moduleName": "default_module"
    }))
    .unwrap();
    let package = serde_json::from_value(json!({
        "id": "pkg-1",
        "name": "detector-pkg",
        "modules": [{
            "name": "default_module",
            "functions": [{
                "name": "detect",
                "inputs": [{"type": "Item", "name": "item"}],
                "outputs": [{"type": "Item", "name": "item", "actions": ["car", "no-car"]}]
            }]
        }]
    }))
    .unwrap();
    (service, package)
}

/// dataset -> code -> detector -> labeling task
fn labeling_pipeline() -> (Pipeline, [String; 4]) {
    let (service, package) = detector();
    let mut pipeline = Pipeline::new("labeling", "project-1");

    let dataset = pipeline
        .add_node(DatasetNode::new("input", "project-1", "ds-1").with_folder("/incoming"))
        .unwrap();
    let code = pipeline
        .add_node(CodeNode::new("normalize", "project-1", "my-project", "run", CODE).unwrap())
        .unwrap();
    let function = pipeline
        .add_node(FunctionNode::new("detect cars", &service, &package, "detect"))
        .unwrap();
    let task = pipeline
        .add_node(
            TaskNode::builder("label", "project-1", "ds-1")
                .task_type("annotation")
                .workload(vec![WorkloadUnit::new("annotator@example.com", 100.0)])
                .priority(TaskPriority::High)
                .position((4.0, 1.0))
                .build(),
        )
        .unwrap();

    pipeline.connect(&dataset, &code, ConnectOptions::new()).unwrap();
    pipeline.connect(&code, &function, ConnectOptions::new()).unwrap();
    pipeline
        .connect(
            &function,
            &task,
            ConnectOptions::new()
                .action("car")
                .filters(json!({"$and": [{"metadata.system.mimetype": "image/*"}]})),
        )
        .unwrap();

    (pipeline, [dataset, code, function, task])
}

#[test]
fn test_dataset_to_code_default_connection_json() {
    let mut pipeline = Pipeline::new("p", "project-1");
    let dataset = pipeline.add_node(DatasetNode::new("input", "project-1", "ds-1")).unwrap();
    let code = pipeline
        .add_node(CodeNode::new("code", "project-1", "proj", "run", CODE).unwrap())
        .unwrap();

    let connection = pipeline.connect(&dataset, &code, ConnectOptions::new()).unwrap();
    let dataset_out = pipeline.node(&dataset).unwrap().base().outputs[0].port_id.clone();
    let code_in = pipeline.node(&code).unwrap().base().inputs[0].port_id.clone();

    assert_eq!(
        connection.to_json().unwrap(),
        json!({
            "src": {"nodeId": dataset, "portId": dataset_out},
            "tgt": {"nodeId": code, "portId": code_in}
        })
    );
}

#[test]
fn test_full_pipeline_round_trip() {
    let (pipeline, [dataset, code, function, task]) = labeling_pipeline();
    let json = pipeline.to_json().unwrap();

    let parsed = Pipeline::from_json(&json).unwrap();
    assert_eq!(parsed.to_json().unwrap(), json);
    assert_eq!(parsed, pipeline);

    assert!(matches!(parsed.node(&dataset), Some(Node::Dataset(_))));
    assert!(matches!(parsed.node(&code), Some(Node::Code(_))));
    assert!(matches!(parsed.node(&function), Some(Node::Function(_))));
    assert!(matches!(parsed.node(&task), Some(Node::Task(_))));
    assert!(parsed.is_root(&dataset));
    assert!(parsed.validate().is_ok());
}

#[test]
fn test_every_node_round_trips_individually() {
    let (pipeline, _) = labeling_pipeline();
    for node in &pipeline.nodes {
        let json = node.to_json().unwrap();
        let parsed = Node::from_json(&json).unwrap();
        assert_eq!(parsed.to_json().unwrap(), json, "node {}", node.name());
    }
}

#[test]
fn test_filtered_connection_wire_format() {
    let (pipeline, _) = labeling_pipeline();
    let json = pipeline.to_json().unwrap();
    let gated = &json["connections"][2];

    assert_eq!(gated["action"], json!("car"));
    let condition = gated["condition"].as_str().unwrap();
    let decoded: Value = serde_json::from_str(condition).unwrap();
    assert_eq!(decoded, json!({"$and": [{"metadata.system.mimetype": "image/*"}]}));
}

#[test]
fn test_connect_then_disconnect_restores_connections() {
    let (mut pipeline, [dataset, _, function, task]) = labeling_pipeline();
    let before = pipeline.connections.clone();

    pipeline.connect(&dataset, &task, ConnectOptions::new()).unwrap();
    assert_eq!(pipeline.connections.len(), before.len() + 1);

    assert!(pipeline.disconnect(&dataset, &task, ConnectOptions::new()).unwrap());
    assert_eq!(pipeline.connections, before);

    // already gone: no error, no change
    assert!(!pipeline.disconnect(&dataset, &task, ConnectOptions::new()).unwrap());
    assert_eq!(pipeline.connections, before);

    // the gated edge only matches with its action and filters
    assert!(!pipeline.disconnect(&function, &task, ConnectOptions::new()).unwrap());
    assert_eq!(pipeline.connections, before);
}

#[test]
fn test_connect_to_foreign_node_fails_without_side_effects() {
    let (mut pipeline, [dataset, ..]) = labeling_pipeline();
    let stranger = DatasetNode::new("other", "project-1", "ds-2");
    let stranger_id = stranger.base().node_id.clone();
    let nodes = pipeline.nodes.len();

    let err = pipeline.connect(&dataset, &stranger_id, ConnectOptions::new()).unwrap_err();
    assert_eq!(err, GraphError::NodeNotFound { node_id: stranger_id });
    assert_eq!(pipeline.nodes.len(), nodes);
}

#[test]
fn test_task_node_actions_follow_task_type() {
    let qa = TaskNode::builder("review", "p", "ds").task_type("qa").build();
    assert_eq!(qa.actions(), ["approve", "discard"]);

    let annotation = TaskNode::builder("label", "p", "ds").build();
    assert_eq!(annotation.actions(), ["complete", "discard"]);

    let custom = TaskNode::builder("label", "p", "ds").actions(["done"]).build();
    assert_eq!(custom.actions(), ["done"]);
}

#[test]
fn test_task_node_type_errors_on_parse() {
    let task = TaskNode::builder("label", "p", "ds").build();
    let mut json = task.base().to_json().unwrap();
    json["metadata"]["datasetId"] = json!(42);

    let err = Node::from_json(&json).unwrap_err();
    assert!(err.to_string().contains("dataset_id"), "{}", err);
}

#[test]
fn test_positions_survive_serialization() {
    let (pipeline, [.., task]) = labeling_pipeline();
    let parsed = Pipeline::from_json(&pipeline.to_json().unwrap()).unwrap();
    let (x, y) = parsed.node(&task).unwrap().base().position().unwrap();
    assert!((x - 4.0).abs() < 1e-9);
    assert!((y - 1.0).abs() < 1e-9);
}

#[test]
fn test_triggers_and_root() {
    let (mut pipeline, [dataset, code, ..]) = labeling_pipeline();
    let on_created = Trigger::event(TriggerResource::Item, vec![TriggerAction::Created]);
    pipeline.add_trigger(&dataset, on_created.clone()).unwrap();
    pipeline.add_trigger(&code, Trigger::cron("0 0 * * *")).unwrap();

    let json = pipeline.to_json().unwrap();
    let start_nodes = json["startNodes"].as_array().unwrap();
    assert_eq!(start_nodes.len(), 2);
    assert_eq!(start_nodes[0]["type"], json!("root"));
    assert_eq!(start_nodes[0]["trigger"]["type"], json!("Event"));
    assert_eq!(start_nodes[1]["type"], json!("trigger"));
    assert_eq!(start_nodes[1]["trigger"]["spec"]["cron"], json!("0 0 * * *"));

    pipeline.set_start_node(&code).unwrap();
    assert!(pipeline.is_root(&code));
    assert!(!pipeline.is_root(&dataset));

    // the root entry keeps its event trigger when it moves
    let root = &pipeline.start_nodes[0];
    assert_eq!(root.node_id, code);
    assert_eq!(root.trigger, Some(on_created));
    assert_eq!(pipeline.start_nodes[1].trigger, Some(Trigger::cron("0 0 * * *")));
}

#[test]
fn test_wiring_upstream_of_root_reroots_pipeline() {
    let mut pipeline = Pipeline::new("late source", "project-1");
    let code = pipeline
        .add_node(CodeNode::new("normalize", "project-1", "my-project", "run", CODE).unwrap())
        .unwrap();
    let dataset = pipeline.add_node(DatasetNode::new("input", "project-1", "ds-1")).unwrap();
    assert!(pipeline.is_root(&code));

    pipeline.connect(&dataset, &code, ConnectOptions::new()).unwrap();

    assert!(pipeline.is_root(&dataset));
    assert!(!pipeline.is_root(&code));
    let json = pipeline.to_json().unwrap();
    assert_eq!(json["startNodes"], json!([{"nodeId": dataset, "type": "root"}]));
}

#[test]
fn test_remove_node_keeps_graph_valid() {
    let (mut pipeline, [_, code, ..]) = labeling_pipeline();
    pipeline.remove_node(&code).unwrap();
    assert_eq!(pipeline.connections.len(), 1);
    assert!(pipeline.validate().is_ok());
}
