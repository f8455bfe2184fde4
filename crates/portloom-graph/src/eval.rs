use std::cmp::Reverse;

use crate::env::EvaluationEnvironment;
use crate::error::EvalError;
use crate::ids::VertexId;
use crate::state::WorkflowState;
use crate::view::PortGraphView;

/// An algorithm that walks a port graph and invokes its actors in
/// dependency order, recording results in a [`WorkflowState`].
///
/// The walk is shared; implementations differ only in the per-vertex
/// decision made by [`eval_node`](Self::eval_node).
pub trait Evaluation {
    /// Evaluate a single vertex, storing its outputs in `state`.
    ///
    /// Does not check that the state is ready nor that upstream vertices
    /// have run; [`eval`](Self::eval) does.
    fn eval_node<G: PortGraphView>(
        &self,
        env: &EvaluationEnvironment,
        graph: &G,
        state: &mut WorkflowState,
        vid: VertexId,
    ) -> Result<(), EvalError>;

    /// Whether any vertex is missing a stamp for the current execution.
    fn requires_evaluation<G: PortGraphView>(
        &self,
        env: &EvaluationEnvironment,
        graph: &G,
        state: &WorkflowState,
    ) -> bool {
        let current = env.current_execution();
        graph
            .vertices()
            .into_iter()
            .any(|vid| state.last_evaluation(vid) != Some(current))
    }

    /// Evaluate the graph, producing a valid state from a ready one.
    ///
    /// Starting from `start` when given, otherwise from the leaves
    /// (vertices with no outgoing edge), highest actor priority first,
    /// ties in insertion order. Every vertex upstream of a starting
    /// point is brought up to date before the point itself runs, and no
    /// vertex runs twice within one execution.
    fn eval<G: PortGraphView>(
        &self,
        env: &EvaluationEnvironment,
        graph: &G,
        state: &mut WorkflowState,
        start: Option<VertexId>,
    ) -> Result<(), EvalError> {
        if !state.is_ready_for_evaluation(graph) {
            return Err(EvalError::StateNotReady);
        }

        let current = env.current_execution();
        match start {
            Some(vid) => {
                if state.last_evaluation(vid) != Some(current) {
                    self.eval_upstream(env, graph, state, vid)?;
                }
            }
            None => {
                let mut leaves = Vec::new();
                for vid in graph.vertices() {
                    if graph.nb_out_edges(vid)? == 0 {
                        leaves.push(vid);
                    }
                }
                // stable sort keeps insertion order among equal priorities
                leaves.sort_by_key(|&vid| {
                    Reverse(
                        graph
                            .actor(vid)
                            .ok()
                            .flatten()
                            .map_or(0, |actor| actor.priority()),
                    )
                });

                log::debug!(
                    "evaluating {} leaves under execution {:?}",
                    leaves.len(),
                    current
                );
                for vid in leaves {
                    if state.last_evaluation(vid) != Some(current) {
                        self.eval_upstream(env, graph, state, vid)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Bring every vertex upstream of `vid` up to date for the current
    /// execution, then evaluate `vid` itself.
    fn eval_upstream<G: PortGraphView>(
        &self,
        env: &EvaluationEnvironment,
        graph: &G,
        state: &mut WorkflowState,
        vid: VertexId,
    ) -> Result<(), EvalError> {
        let current = env.current_execution();
        for nid in graph.in_neighbors(vid)? {
            if state.last_evaluation(nid) != Some(current) {
                self.eval_upstream(env, graph, state, nid)?;
            }
        }
        self.eval_node(env, graph, state, vid)
    }
}

/// Reevaluates every vertex it reaches, unconditionally.
#[derive(Debug, Default, Clone, Copy)]
pub struct BruteEvaluation;

impl Evaluation for BruteEvaluation {
    fn eval_node<G: PortGraphView>(
        &self,
        env: &EvaluationEnvironment,
        graph: &G,
        state: &mut WorkflowState,
        vid: VertexId,
    ) -> Result<(), EvalError> {
        let actor = graph.actor(vid)?.ok_or(EvalError::MissingActor(vid))?;

        let mut inputs = Vec::with_capacity(actor.inputs().len());
        for key in actor.inputs() {
            let pid = graph.in_port(vid, key)?;
            inputs.push(state.get(graph, pid)?);
        }

        log::trace!("invoking actor {} on vertex {:?}", actor.id(), vid);
        let values = actor
            .invoke(&inputs)
            .map_err(|source| EvalError::ActorFailed { vid, source })?;

        let outputs = actor.outputs();
        if values.len() != outputs.len() {
            return Err(EvalError::OutputArity {
                vid,
                got: values.len(),
                expected: outputs.len(),
            });
        }
        for (key, value) in outputs.iter().zip(values) {
            let pid = graph.out_port(vid, key)?;
            state.store(graph, pid, value)?;
        }

        // the stamp is only written once every output is in place; a
        // failing actor leaves the vertex unevaluated
        state.set_last_evaluation(vid, env.current_execution());
        Ok(())
    }
}

/// Reevaluates a vertex only when it has never run, its actor refuses
/// laziness, or some input is newer than the vertex's last evaluation.
#[derive(Debug, Default, Clone, Copy)]
pub struct LazyEvaluation;

impl Evaluation for LazyEvaluation {
    fn eval_node<G: PortGraphView>(
        &self,
        env: &EvaluationEnvironment,
        graph: &G,
        state: &mut WorkflowState,
        vid: VertexId,
    ) -> Result<(), EvalError> {
        let Some(last) = state.last_evaluation(vid) else {
            return BruteEvaluation.eval_node(env, graph, state, vid);
        };
        if last == env.current_execution() {
            // already evaluated under this execution
            return Ok(());
        }

        let lazy = graph
            .actor(vid)?
            .ok_or(EvalError::MissingActor(vid))?
            .is_lazy();
        if !lazy {
            return BruteEvaluation.eval_node(env, graph, state, vid);
        }

        for pid in graph.vertex_in_ports(vid)? {
            if state.when(graph, pid)? > Some(last) {
                return BruteEvaluation.eval_node(env, graph, state, vid);
            }
        }
        log::debug!("vertex {:?} unchanged since {:?}, skipping", vid, last);
        Ok(())
    }
}
