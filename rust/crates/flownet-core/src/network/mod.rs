mod reduced;

pub use reduced::ReducedNetwork;

use num_traits::Zero;

use crate::graph::{EdgeId, IndexGraph, NodeId};
use crate::numerics::{FlowValue, FLOW_EPSILON, SUPPLY_EPSILON};
use crate::weights::WeightFunction;
use crate::FlowError;

/// Per-edge capacity and flow.
///
/// `set_flow` never stores a value outside `[0, capacity]` (or
/// `[-capacity, capacity]` for networks over undirected graphs, where the sign
/// gives the direction relative to `edge_source`).
pub trait FlowNetwork {
    type Value: FlowValue;

    fn capacity(&self, edge: EdgeId) -> Self::Value;

    fn set_capacity(&mut self, edge: EdgeId, capacity: Self::Value) -> Result<(), FlowError>;

    fn flow(&self, edge: EdgeId) -> Self::Value;

    fn set_flow(&mut self, edge: EdgeId, flow: Self::Value) -> Result<(), FlowError>;

    fn residual_capacity(&self, edge: EdgeId) -> Self::Value {
        self.capacity(edge) - self.flow(edge)
    }
}

/// Validates `flow` against `capacity` and clamps it into range.
pub(crate) fn checked_flow<V: FlowValue>(
    edge: EdgeId,
    flow: V,
    capacity: V,
    signed: bool,
) -> Result<V, FlowError> {
    let slack = V::tolerance(FLOW_EPSILON);
    let lower = if signed { -capacity } else { V::zero() };
    let in_range = flow >= lower - slack && flow <= capacity + slack;
    if !in_range {
        return Err(FlowError::FlowOutOfRange {
            edge: edge.0,
            flow: flow.as_f64(),
            capacity: capacity.as_f64(),
        });
    }
    Ok(flow.max_of(lower).min_of(capacity))
}

#[derive(Debug, Clone)]
pub struct EdgeNetwork<V: FlowValue> {
    capacities: Vec<V>,
    flows: Vec<V>,
    signed: bool,
}

impl<V: FlowValue> EdgeNetwork<V> {
    /// Zero capacities for every edge of `graph`.
    pub fn new(graph: &IndexGraph) -> Self {
        Self {
            capacities: vec![V::zero(); graph.edge_count()],
            flows: vec![V::zero(); graph.edge_count()],
            signed: !graph.is_directed(),
        }
    }

    pub fn from_capacities(graph: &IndexGraph, capacities: Vec<V>) -> Result<Self, FlowError> {
        if capacities.len() != graph.edge_count() {
            return Err(FlowError::InvalidInput(
                "capacity vector length mismatch".to_string(),
            ));
        }
        if let Some(edge) = capacities.iter().position(|&c| !(c >= V::zero())) {
            return Err(negative_capacity(EdgeId(edge)));
        }
        Ok(Self {
            flows: vec![V::zero(); capacities.len()],
            capacities,
            signed: !graph.is_directed(),
        })
    }

    pub fn from_weights(
        graph: &IndexGraph,
        weights: &dyn WeightFunction<V>,
    ) -> Result<Self, FlowError> {
        let capacities = graph.edges().map(|e| weights.weight(e.0)).collect();
        Self::from_capacities(graph, capacities)
    }

    pub fn edge_count(&self) -> usize {
        self.capacities.len()
    }

    pub fn capacities(&self) -> &[V] {
        &self.capacities
    }

    pub fn flows(&self) -> &[V] {
        &self.flows
    }

    pub fn reset_flows(&mut self) {
        self.flows.iter_mut().for_each(|f| *f = V::zero());
    }
}

impl<V: FlowValue> FlowNetwork for EdgeNetwork<V> {
    type Value = V;

    fn capacity(&self, edge: EdgeId) -> V {
        self.capacities[edge.0]
    }

    fn set_capacity(&mut self, edge: EdgeId, capacity: V) -> Result<(), FlowError> {
        if !(capacity >= V::zero()) {
            return Err(negative_capacity(edge));
        }
        self.capacities[edge.0] = capacity;
        Ok(())
    }

    fn flow(&self, edge: EdgeId) -> V {
        self.flows[edge.0]
    }

    fn set_flow(&mut self, edge: EdgeId, flow: V) -> Result<(), FlowError> {
        let value = checked_flow(edge, flow, self.capacities[edge.0], self.signed)?;
        self.flows[edge.0] = value;
        Ok(())
    }
}

fn negative_capacity(edge: EdgeId) -> FlowError {
    FlowError::InvalidInput(format!("edge {} has a negative capacity", edge.0))
}

/// Net flow leaving `node`: outflow minus inflow.
pub fn net_outflow<N>(graph: &IndexGraph, net: &N, node: NodeId) -> N::Value
where
    N: FlowNetwork + ?Sized,
{
    let mut total = N::Value::zero();
    if graph.is_directed() {
        for &e in graph.outgoing_edges(node) {
            total = total + net.flow(e);
        }
        for &e in graph.incoming_edges(node) {
            total = total - net.flow(e);
        }
    } else {
        for &e in graph.outgoing_edges(node) {
            if graph.is_self_loop(e) {
                continue;
            }
            if graph.edge_source(e) == node {
                total = total + net.flow(e);
            } else {
                total = total - net.flow(e);
            }
        }
    }
    total
}

pub fn check_capacities<N>(graph: &IndexGraph, net: &N) -> Result<(), FlowError>
where
    N: FlowNetwork + ?Sized,
{
    for e in graph.edges() {
        if !(net.capacity(e) >= N::Value::zero()) {
            return Err(negative_capacity(e));
        }
    }
    Ok(())
}

pub fn check_lower_bound<N>(
    graph: &IndexGraph,
    net: &N,
    lower_bound: &dyn WeightFunction<N::Value>,
) -> Result<(), FlowError>
where
    N: FlowNetwork + ?Sized,
{
    for e in graph.edges() {
        let lower = lower_bound.weight(e.0);
        if !(lower >= N::Value::zero()) {
            return Err(FlowError::InvalidInput(format!(
                "edge {} has a negative lower bound",
                e.0
            )));
        }
        if lower > net.capacity(e) {
            return Err(FlowError::InvalidInput(format!(
                "lower bound of edge {} exceeds its capacity",
                e.0
            )));
        }
    }
    Ok(())
}

pub fn check_supply<V: FlowValue>(
    graph: &IndexGraph,
    supply: &dyn WeightFunction<V>,
) -> Result<(), FlowError> {
    let total = V::checked_sum(graph.nodes().map(|v| supply.weight(v.0)), "supply sum")?;
    if total.abs() > V::tolerance(SUPPLY_EPSILON) {
        return Err(FlowError::InvalidInput(
            "supply must sum to zero".to_string(),
        ));
    }
    Ok(())
}

/// Checks that no vertex is both a source and a sink and that all terminals
/// are vertices of `graph`.
pub fn check_terminals(
    graph: &IndexGraph,
    sources: &[NodeId],
    sinks: &[NodeId],
) -> Result<(), FlowError> {
    let mut is_source = vec![false; graph.node_count()];
    for &s in sources {
        graph.check_node(s)?;
        is_source[s.0] = true;
    }
    for &t in sinks {
        graph.check_node(t)?;
        if is_source[t.0] {
            return Err(FlowError::TerminalOverlap(t.0));
        }
    }
    Ok(())
}
