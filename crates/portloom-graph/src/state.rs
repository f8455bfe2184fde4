use std::cmp::Ordering;
use std::hash::{BuildHasher, Hash, Hasher};

use ahash::{AHashMap, RandomState};

use portloom_core::Value;

use crate::error::StateError;
use crate::ids::{ExecutionId, PortId, VertexId};
use crate::view::PortGraphView;

/// Digest of a port graph's topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint(u64);

/// Compute the topology digest of a graph: a hash over its sorted
/// vertex, edge, and port id lists. Stored values are not part of it, so
/// only structural edits change the digest.
pub fn fingerprint<G: PortGraphView>(graph: &G) -> Fingerprint {
    // fixed seeds: the digest must not vary between hasher instances
    let state = RandomState::with_seeds(
        0x706f_7274_6c6f_6f6d,
        0x746f_706f_6c6f_6779,
        0x6669_6e67_6572_7072,
        0x696e_7473_7461_7465,
    );
    let mut hasher = state.build_hasher();

    let mut vids: Vec<u64> = graph.vertices().into_iter().map(|v| v.0).collect();
    vids.sort_unstable();
    let mut eids: Vec<u64> = graph.edges().into_iter().map(|e| e.0).collect();
    eids.sort_unstable();
    let mut pids: Vec<u64> = graph.ports().into_iter().map(|p| p.0).collect();
    pids.sort_unstable();

    vids.hash(&mut hasher);
    eids.hash(&mut hasher);
    pids.hash(&mut hasher);
    Fingerprint(hasher.finish())
}

/// Values and timestamps attached to the ports of one port graph: a
/// snapshot of what happened to data in a workflow.
///
/// A state is bound to the graph it was created from only through a
/// topology [`Fingerprint`]; every operation takes the graph (or a view
/// of it) as an explicit argument. Use
/// [`portgraph_still_valid`](Self::portgraph_still_valid) to detect
/// edits made after the state was created.
///
/// Three kinds of entries are kept:
/// - values, written on output ports by evaluation,
/// - parameters with their storage execution, written on unconnected
///   input ports by the caller,
/// - the execution in which each vertex last completed.
pub struct WorkflowState {
    fingerprint: Fingerprint,
    values: AHashMap<PortId, Value>,
    params: AHashMap<PortId, Value>,
    param_when: AHashMap<PortId, ExecutionId>,
    last_eval: AHashMap<VertexId, ExecutionId>,
    port_priority: Box<dyn Fn(PortId, PortId) -> Ordering>,
}

impl WorkflowState {
    pub fn new<G: PortGraphView>(graph: &G) -> Self {
        Self {
            fingerprint: fingerprint(graph),
            values: AHashMap::new(),
            params: AHashMap::new(),
            param_when: AHashMap::new(),
            last_eval: AHashMap::new(),
            port_priority: Box::new(|a, b| a.cmp(&b)),
        }
    }

    /// Drop every value, parameter, and evaluation stamp.
    pub fn clear(&mut self) {
        self.values.clear();
        self.params.clear();
        self.param_when.clear();
        self.last_eval.clear();
    }

    /// Whether the graph still matches the topology captured when this
    /// state was created.
    pub fn portgraph_still_valid<G: PortGraphView>(&self, graph: &G) -> bool {
        fingerprint(graph) == self.fingerprint
    }

    /// Replace the comparator that orders fan-in sources.
    ///
    /// The default orders by ascending port id.
    pub fn set_port_priority(&mut self, cmp: impl Fn(PortId, PortId) -> Ordering + 'static) {
        self.port_priority = Box::new(cmp);
    }

    /// Store a value on an output port.
    pub fn store<G: PortGraphView>(
        &mut self,
        graph: &G,
        pid: PortId,
        value: Value,
    ) -> Result<(), StateError> {
        if graph.is_in_port(pid)? {
            return Err(StateError::StoreOnInput(pid));
        }
        self.values.insert(pid, value);
        Ok(())
    }

    /// Store a parameter on an unconnected input port, recording the
    /// execution in which it was stored.
    pub fn store_param<G: PortGraphView>(
        &mut self,
        graph: &G,
        pid: PortId,
        param: Value,
        when: ExecutionId,
    ) -> Result<(), StateError> {
        if graph.is_out_port(pid)? {
            return Err(StateError::ParamOnOutput(pid));
        }
        if graph.nb_connections(pid)? > 0 {
            return Err(StateError::ParamOnConnected(pid));
        }
        self.params.insert(pid, param);
        self.param_when.insert(pid, when);
        Ok(())
    }

    /// Retrieve the value seen by a port.
    ///
    /// An output port yields its stored value. An unconnected input
    /// yields its parameter. An input with one incoming edge forwards
    /// its source. An input with several incoming edges yields a
    /// [`Value::seq`] of the sources' values, ordered by the port
    /// priority comparator.
    pub fn get<G: PortGraphView>(&self, graph: &G, pid: PortId) -> Result<Value, StateError> {
        if graph.is_out_port(pid)? {
            return self
                .values
                .get(&pid)
                .cloned()
                .ok_or(StateError::MissingValue(pid));
        }

        let mut sources = graph.connected_ports(pid)?;
        match sources.len() {
            0 => self
                .params
                .get(&pid)
                .cloned()
                .ok_or(StateError::MissingParam(pid)),
            1 => self.get(graph, sources[0]),
            _ => {
                sources.sort_by(|&a, &b| (self.port_priority)(a, b));
                let mut values = Vec::with_capacity(sources.len());
                for source in sources {
                    values.push(self.get(graph, source)?);
                }
                Ok(Value::seq(values))
            }
        }
    }

    /// Retrieve the execution in which a port's data was produced, or
    /// `None` if it never was.
    ///
    /// An output port reports its owner's last evaluation. An
    /// unconnected input reports when its parameter was stored. A
    /// connected input reports the **oldest** of its sources: the port
    /// is only as fresh as its oldest contribution, and a
    /// never-evaluated source pins it at `None`.
    pub fn when<G: PortGraphView>(
        &self,
        graph: &G,
        pid: PortId,
    ) -> Result<Option<ExecutionId>, StateError> {
        if graph.is_out_port(pid)? {
            return Ok(self.last_evaluation(graph.port_vertex(pid)?));
        }

        let sources = graph.connected_ports(pid)?;
        if sources.is_empty() {
            return self
                .param_when
                .get(&pid)
                .copied()
                .map(Some)
                .ok_or(StateError::MissingParam(pid));
        }
        // None sorts below every id, so an unknown source wins the min
        let mut oldest = self.when(graph, sources[0])?;
        for source in &sources[1..] {
            oldest = oldest.min(self.when(graph, *source)?);
        }
        Ok(oldest)
    }

    /// The execution in which this vertex last completed, or `None` if
    /// it never did.
    pub fn last_evaluation(&self, vid: VertexId) -> Option<ExecutionId> {
        self.last_eval.get(&vid).copied()
    }

    pub fn set_last_evaluation(&mut self, vid: VertexId, exec: ExecutionId) {
        self.last_eval.insert(vid, exec);
    }

    /// Iterate over the `(port, value)` pairs stored on output ports.
    pub fn items(&self) -> impl Iterator<Item = (PortId, &Value)> + '_ {
        self.values.iter().map(|(&pid, value)| (pid, value))
    }

    /// Whether every unconnected input port of the graph has a
    /// parameter, i.e. evaluation has everything it needs.
    pub fn is_ready_for_evaluation<G: PortGraphView>(&self, graph: &G) -> bool {
        graph.in_ports().into_iter().all(|pid| {
            graph.nb_connections(pid).map_or(false, |n| n > 0) || self.params.contains_key(&pid)
        })
    }
}
