use portloom_core::Value;
use portloom_graph::{
    ExecutionId, PortGraph, PortId, StateError, SubPortGraph, VertexId, WorkflowState,
};

fn text(value: &Value) -> &str {
    value.downcast_ref::<String>().map(String::as_str).unwrap()
}

#[test]
fn created_empty() {
    let pg = PortGraph::new();
    let ws = WorkflowState::new(&pg);
    assert_eq!(ws.items().count(), 0);

    let mut pg = PortGraph::new();
    let v = pg.add_vertex(None).unwrap();
    pg.add_in_port(v, "in", None).unwrap();
    pg.add_out_port(v, "out", None).unwrap();

    let ws = WorkflowState::new(&pg);
    assert_eq!(ws.items().count(), 0);
}

#[test]
fn detects_graph_edits() {
    let mut pg = PortGraph::new();
    let ws = WorkflowState::new(&pg);
    assert!(ws.portgraph_still_valid(&pg));
    let v0 = pg.add_vertex(None).unwrap();
    assert!(!ws.portgraph_still_valid(&pg));

    let ws = WorkflowState::new(&pg);
    assert!(ws.portgraph_still_valid(&pg));
    let out = pg.add_out_port(v0, "out", None).unwrap();
    assert!(!ws.portgraph_still_valid(&pg));

    let v1 = pg.add_vertex(None).unwrap();
    let inp = pg.add_in_port(v1, "in", None).unwrap();
    let ws = WorkflowState::new(&pg);
    assert!(ws.portgraph_still_valid(&pg));
    pg.connect(out, inp, None).unwrap();
    assert!(!ws.portgraph_still_valid(&pg));

    let ws = WorkflowState::new(&pg);
    assert!(ws.portgraph_still_valid(&pg));
    pg.remove_port(out).unwrap();
    assert!(!ws.portgraph_still_valid(&pg));
}

#[test]
fn no_values_on_input_ports() {
    let mut pg = PortGraph::new();
    let v = pg.add_vertex(None).unwrap();
    let inp = pg.add_in_port(v, "in", None).unwrap();
    let mut ws = WorkflowState::new(&pg);

    assert!(matches!(
        ws.store(&pg, inp, Value::new(1_i64)),
        Err(StateError::StoreOnInput(_))
    ));
}

#[test]
fn stored_values_come_back() {
    let mut pg = PortGraph::new();
    let v = pg.add_vertex(None).unwrap();
    let out = pg.add_out_port(v, "out", None).unwrap();
    let mut ws = WorkflowState::new(&pg);

    ws.store(&pg, out, Value::new(String::from("data"))).unwrap();
    assert!(ws.get(&pg, PortId(out.0 + 1)).is_err());
    assert_eq!(text(&ws.get(&pg, out).unwrap()), "data");

    let items: Vec<_> = ws.items().collect();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].0, out);
}

#[test]
fn params_only_on_lonely_input_ports() {
    let mut pg = PortGraph::new();
    let v0 = pg.add_vertex(None).unwrap();
    pg.add_in_port(v0, "in", None).unwrap();
    let out = pg.add_out_port(v0, "out", None).unwrap();
    let v1 = pg.add_vertex(None).unwrap();
    let inp = pg.add_in_port(v1, "in", None).unwrap();
    pg.connect(out, inp, None).unwrap();

    let mut ws = WorkflowState::new(&pg);

    assert!(matches!(
        ws.store_param(&pg, out, Value::new(0_i64), ExecutionId(0)),
        Err(StateError::ParamOnOutput(_))
    ));
    assert!(matches!(
        ws.store_param(&pg, inp, Value::new(0_i64), ExecutionId(0)),
        Err(StateError::ParamOnConnected(_))
    ));
}

#[test]
fn get_follows_connections() {
    let mut pg = PortGraph::new();
    let v0 = pg.add_vertex(None).unwrap();
    let out = pg.add_out_port(v0, "out", None).unwrap();
    let v1 = pg.add_vertex(None).unwrap();
    let inp = pg.add_in_port(v1, "in", None).unwrap();

    // unknown port
    let ws = WorkflowState::new(&pg);
    assert!(ws.get(&pg, PortId(1000)).is_err());

    // lonely input port without data
    let mut ws = WorkflowState::new(&pg);
    assert!(matches!(
        ws.get(&pg, inp),
        Err(StateError::MissingParam(_))
    ));

    // lonely input port with data
    ws.store_param(&pg, inp, Value::new(String::from("param")), ExecutionId(0))
        .unwrap();
    assert_eq!(text(&ws.get(&pg, inp).unwrap()), "param");

    // connected input port forwards its source
    pg.connect(out, inp, None).unwrap();
    let mut ws = WorkflowState::new(&pg);
    ws.store(&pg, out, Value::new(String::from("data"))).unwrap();
    assert_eq!(text(&ws.get(&pg, inp).unwrap()), "data");
}

#[test]
fn get_gathers_multiple_sources_in_pid_order() {
    let mut pg = PortGraph::new();
    let v0 = pg.add_vertex(None).unwrap();
    let out0 = pg.add_out_port(v0, "out", None).unwrap();
    let v1 = pg.add_vertex(None).unwrap();
    let out1 = pg.add_out_port(v1, "out", None).unwrap();
    let v2 = pg.add_vertex(None).unwrap();
    let inp = pg.add_in_port(v2, "in", None).unwrap();
    pg.connect(out0, inp, None).unwrap();
    pg.connect(out1, inp, None).unwrap();

    let mut ws = WorkflowState::new(&pg);
    assert!(ws.get(&pg, inp).is_err());
    ws.store(&pg, out0, Value::new(String::from("data0"))).unwrap();
    // one source still missing
    assert!(ws.get(&pg, inp).is_err());
    ws.store(&pg, out1, Value::new(String::from("data1"))).unwrap();

    let gathered = ws.get(&pg, inp).unwrap();
    let seq = gathered.as_seq().unwrap();
    assert_eq!(seq.len(), 2);
    assert_eq!(text(&seq[0]), "data0");
    assert_eq!(text(&seq[1]), "data1");
}

#[test]
fn port_priority_comparator_is_configurable() {
    let mut pg = PortGraph::new();
    let v0 = pg.add_vertex(None).unwrap();
    let out0 = pg.add_out_port(v0, "out", None).unwrap();
    let v1 = pg.add_vertex(None).unwrap();
    let out1 = pg.add_out_port(v1, "out", None).unwrap();
    let v2 = pg.add_vertex(None).unwrap();
    let inp = pg.add_in_port(v2, "in", None).unwrap();
    pg.connect(out0, inp, None).unwrap();
    pg.connect(out1, inp, None).unwrap();

    let mut ws = WorkflowState::new(&pg);
    ws.store(&pg, out0, Value::new(String::from("data0"))).unwrap();
    ws.store(&pg, out1, Value::new(String::from("data1"))).unwrap();

    // reverse the default ordering
    ws.set_port_priority(|a, b| b.cmp(&a));
    let gathered = ws.get(&pg, inp).unwrap();
    let seq = gathered.as_seq().unwrap();
    assert_eq!(text(&seq[0]), "data1");
    assert_eq!(text(&seq[1]), "data0");
}

#[test]
fn readiness_needs_params_on_every_lonely_input() {
    let mut pg = PortGraph::new();
    let v0 = pg.add_vertex(None).unwrap();
    let lonely = pg.add_in_port(v0, "in", None).unwrap();
    let out0 = pg.add_out_port(v0, "out", None).unwrap();
    let v1 = pg.add_vertex(None).unwrap();
    let out1 = pg.add_out_port(v1, "out", None).unwrap();
    let v2 = pg.add_vertex(None).unwrap();
    let inp2 = pg.add_in_port(v2, "in", None).unwrap();
    pg.add_out_port(v2, "out", None).unwrap();
    pg.connect(out1, inp2, None).unwrap();
    pg.connect(out0, inp2, None).unwrap();

    let mut ws = WorkflowState::new(&pg);
    assert!(!ws.is_ready_for_evaluation(&pg));

    // values on outputs do not make the state ready
    ws.store(&pg, out1, Value::new(String::from("data"))).unwrap();
    assert!(!ws.is_ready_for_evaluation(&pg));

    ws.store_param(&pg, lonely, Value::new(String::from("param")), ExecutionId(0))
        .unwrap();
    assert!(ws.is_ready_for_evaluation(&pg));
}

#[test]
fn vertices_start_unevaluated() {
    let mut pg = PortGraph::new();
    let v0 = pg.add_vertex(None).unwrap();
    let v1 = pg.add_vertex(None).unwrap();

    let ws = WorkflowState::new(&pg);
    assert_eq!(ws.last_evaluation(v0), None);
    assert_eq!(ws.last_evaluation(v1), None);
}

#[test]
fn last_evaluation_is_per_vertex() {
    let mut pg = PortGraph::new();
    let v0 = pg.add_vertex(None).unwrap();
    let v1 = pg.add_vertex(None).unwrap();

    let mut ws = WorkflowState::new(&pg);
    ws.set_last_evaluation(v0, ExecutionId(1));
    assert_eq!(ws.last_evaluation(v0), Some(ExecutionId(1)));
    assert_eq!(ws.last_evaluation(v1), None);
}

#[test]
fn when_on_unknown_port_fails() {
    let mut pg = PortGraph::new();
    let v = pg.add_vertex(None).unwrap();
    pg.add_in_port(v, "in", None).unwrap();
    pg.add_out_port(v, "out", None).unwrap();

    let ws = WorkflowState::new(&pg);
    assert!(ws.when(&pg, PortId(1000)).is_err());
}

#[test]
fn when_of_output_tracks_owner_evaluation() {
    let mut pg = PortGraph::new();
    let v = pg.add_vertex(None).unwrap();
    let out = pg.add_out_port(v, "out", None).unwrap();

    let mut ws = WorkflowState::new(&pg);
    assert_eq!(ws.when(&pg, out).unwrap(), None);

    ws.set_last_evaluation(v, ExecutionId(1));
    assert_eq!(ws.when(&pg, out).unwrap(), Some(ExecutionId(1)));
}

#[test]
fn when_of_param_is_explicit() {
    let mut pg = PortGraph::new();
    let v = pg.add_vertex(None).unwrap();
    let inp = pg.add_in_port(v, "in", None).unwrap();

    let mut ws = WorkflowState::new(&pg);
    assert!(matches!(
        ws.when(&pg, inp),
        Err(StateError::MissingParam(_))
    ));

    ws.store_param(&pg, inp, Value::new(String::from("param")), ExecutionId(10))
        .unwrap();
    assert_eq!(ws.when(&pg, inp).unwrap(), Some(ExecutionId(10)));
}

#[test]
fn when_of_connected_input_is_oldest_source() {
    let mut pg = PortGraph::new();
    let v0 = pg.add_vertex(None).unwrap();
    let out0 = pg.add_out_port(v0, "out", None).unwrap();
    let v1 = pg.add_vertex(None).unwrap();
    let out1 = pg.add_out_port(v1, "out", None).unwrap();
    let v2 = pg.add_vertex(None).unwrap();
    let inp = pg.add_in_port(v2, "in", None).unwrap();
    pg.connect(out0, inp, None).unwrap();

    let mut ws = WorkflowState::new(&pg);
    assert_eq!(ws.when(&pg, inp).unwrap(), None);
    ws.set_last_evaluation(v0, ExecutionId(10));
    assert_eq!(ws.when(&pg, inp).unwrap(), Some(ExecutionId(10)));

    // a second, never-evaluated source pins the answer at None
    pg.connect(out1, inp, None).unwrap();
    let mut ws = WorkflowState::new(&pg);
    assert_eq!(ws.when(&pg, inp).unwrap(), None);
    ws.set_last_evaluation(v0, ExecutionId(10));
    assert_eq!(ws.when(&pg, inp).unwrap(), None);
    ws.set_last_evaluation(v1, ExecutionId(11));
    assert_eq!(ws.when(&pg, inp).unwrap(), Some(ExecutionId(10)));
}

#[test]
fn clear_forgets_everything() {
    let mut pg = PortGraph::new();
    let v = pg.add_vertex(None).unwrap();
    let inp = pg.add_in_port(v, "in", None).unwrap();
    let out = pg.add_out_port(v, "out", None).unwrap();

    let mut ws = WorkflowState::new(&pg);
    ws.store(&pg, out, Value::new(1_i64)).unwrap();
    ws.store_param(&pg, inp, Value::new(2_i64), ExecutionId(0))
        .unwrap();
    ws.set_last_evaluation(v, ExecutionId(0));

    ws.clear();
    assert_eq!(ws.items().count(), 0);
    assert!(ws.get(&pg, out).is_err());
    assert!(ws.get(&pg, inp).is_err());
    assert_eq!(ws.last_evaluation(v), None);
}

#[test]
fn state_over_upstream_view_is_ready_without_lonely_inputs() {
    let mut pg = PortGraph::new();
    let v0 = pg.add_vertex(None).unwrap();
    let out = pg.add_out_port(v0, "out", None).unwrap();
    let v1 = pg.add_vertex(None).unwrap();
    let inp = pg.add_in_port(v1, "in", None).unwrap();
    pg.connect(out, inp, None).unwrap();

    let ws = WorkflowState::new(&pg);
    assert!(ws.is_ready_for_evaluation(&pg));

    let sub = SubPortGraph::upstream(&pg, inp).unwrap();
    let sub_ws = WorkflowState::new(&sub);
    assert!(sub_ws.is_ready_for_evaluation(&sub));
}

#[test]
fn fingerprint_ignores_values() {
    let mut pg = PortGraph::new();
    let v = pg.add_vertex(Some(VertexId(0))).unwrap();
    let out = pg.add_out_port(v, "out", None).unwrap();

    let mut ws = WorkflowState::new(&pg);
    ws.store(&pg, out, Value::new(String::from("data"))).unwrap();
    assert!(ws.portgraph_still_valid(&pg));
}
