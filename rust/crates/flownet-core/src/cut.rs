use std::collections::VecDeque;

use log::debug;

use crate::graph::{EdgeId, IndexGraph, NodeId};
use crate::maxflow::{directed_flow, MaximumFlow};
use crate::network::{EdgeNetwork, FlowNetwork};
use crate::numerics::{FlowValue, CUT_EPSILON};
use crate::weights::WeightFunction;
use crate::FlowError;

/// Partition of the vertices into a left (source) side and a right side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexBiPartition {
    in_left: Vec<bool>,
}

impl VertexBiPartition {
    pub fn from_membership(in_left: Vec<bool>) -> Self {
        Self { in_left }
    }

    pub fn is_left(&self, node: NodeId) -> bool {
        self.in_left[node.0]
    }

    pub fn left_vertices(&self) -> Vec<NodeId> {
        (0..self.in_left.len())
            .filter(|&v| self.in_left[v])
            .map(NodeId)
            .collect()
    }

    pub fn right_vertices(&self) -> Vec<NodeId> {
        (0..self.in_left.len())
            .filter(|&v| !self.in_left[v])
            .map(NodeId)
            .collect()
    }

    /// Edges leaving the left side; for undirected graphs every edge with one
    /// endpoint on each side.
    pub fn cross_edges(&self, graph: &IndexGraph) -> Vec<EdgeId> {
        graph
            .edges()
            .filter(|&e| {
                let u = self.in_left[graph.edge_source(e).0];
                let v = self.in_left[graph.edge_target(e).0];
                if graph.is_directed() {
                    u && !v
                } else {
                    u != v
                }
            })
            .collect()
    }

    pub fn cut_weight<V: FlowValue>(
        &self,
        graph: &IndexGraph,
        weights: &dyn WeightFunction<V>,
    ) -> Result<V, FlowError> {
        crate::weights::weight_sum(weights, self.cross_edges(graph))
    }
}

/// Source side of a minimum cut of the maximum flow stored in `net`: the
/// vertices reachable from `sources` in the residual graph. Residual arcs are
/// read off the original edges and never built.
pub fn min_cut_from_flow<N>(graph: &IndexGraph, net: &N, sources: &[NodeId]) -> VertexBiPartition
where
    N: FlowNetwork + ?Sized,
{
    let eps = N::Value::tolerance(CUT_EPSILON);
    let mut visited = vec![false; graph.node_count()];
    let mut queue = VecDeque::new();
    for &s in sources {
        if !visited[s.0] {
            visited[s.0] = true;
            queue.push_back(s);
        }
    }
    while let Some(u) = queue.pop_front() {
        if graph.is_directed() {
            for &e in graph.outgoing_edges(u) {
                let v = graph.edge_target(e);
                if !visited[v.0] && net.capacity(e) - net.flow(e) > eps {
                    visited[v.0] = true;
                    queue.push_back(v);
                }
            }
            for &e in graph.incoming_edges(u) {
                let v = graph.edge_source(e);
                if !visited[v.0] && net.flow(e) > eps {
                    visited[v.0] = true;
                    queue.push_back(v);
                }
            }
        } else {
            for &e in graph.outgoing_edges(u) {
                let v = graph.edge_endpoint(e, u);
                if visited[v.0] {
                    continue;
                }
                if net.capacity(e) - directed_flow(graph, net, e, u) > eps {
                    visited[v.0] = true;
                    queue.push_back(v);
                }
            }
        }
    }
    VertexBiPartition::from_membership(visited)
}

/// Minimum `source`-`sink` cut with respect to edge `weights`.
pub fn compute_minimum_cut<V, M>(
    graph: &IndexGraph,
    weights: &dyn WeightFunction<V>,
    source: NodeId,
    sink: NodeId,
    max_flow: &M,
) -> Result<VertexBiPartition, FlowError>
where
    V: FlowValue,
    M: MaximumFlow,
{
    compute_minimum_cut_multi(graph, weights, &[source], &[sink], max_flow)
}

pub fn compute_minimum_cut_multi<V, M>(
    graph: &IndexGraph,
    weights: &dyn WeightFunction<V>,
    sources: &[NodeId],
    sinks: &[NodeId],
    max_flow: &M,
) -> Result<VertexBiPartition, FlowError>
where
    V: FlowValue,
    M: MaximumFlow,
{
    let mut net = EdgeNetwork::from_weights(graph, weights)?;
    let value = max_flow.compute_maximum_flow_multi(graph, &mut net, sources, sinks)?;
    let cut = min_cut_from_flow(graph, &net, sources);
    debug!(
        "minimum cut of weight {} with {} vertices on the source side",
        value,
        cut.left_vertices().len()
    );
    Ok(cut)
}

/// Minimum cut over all vertex pairs. Vertex 0 is on one side of every cut,
/// so it is paired with each other vertex as source (and, for directed graphs,
/// also as sink).
pub fn compute_global_minimum_cut<V, M>(
    graph: &IndexGraph,
    weights: &dyn WeightFunction<V>,
    max_flow: &M,
) -> Result<VertexBiPartition, FlowError>
where
    V: FlowValue,
    M: MaximumFlow,
{
    if graph.node_count() < 2 {
        return Err(FlowError::InvalidInput(
            "a cut needs at least two vertices".to_string(),
        ));
    }
    let anchor = NodeId(0);
    let mut best: Option<(V, VertexBiPartition)> = None;
    for other in graph.nodes().skip(1) {
        let mut pairs = vec![(anchor, other)];
        if graph.is_directed() {
            pairs.push((other, anchor));
        }
        for (s, t) in pairs {
            let cut = compute_minimum_cut(graph, weights, s, t, max_flow)?;
            let weight = cut.cut_weight(graph, weights)?;
            if best.as_ref().map_or(true, |(w, _)| weight < *w) {
                best = Some((weight, cut));
            }
        }
    }
    best.map(|(_, cut)| cut).ok_or_else(|| {
        FlowError::InvalidInput("a cut needs at least two vertices".to_string())
    })
}
