use num_traits::{One, Zero};

use crate::graph::{IndexGraph, NodeId};
use crate::network::FlowNetwork;
use crate::weights::WeightFunction;
use crate::FlowError;

use super::FlowValue;

/// A cost strictly larger in magnitude than the cost of any simple path or
/// cycle over the first `edge_count` edges: `1 + sum(|cost(e)|)`.
pub fn huge_cost<C: FlowValue>(
    edge_count: usize,
    cost: &dyn WeightFunction<C>,
) -> Result<C, FlowError> {
    C::checked_sum(
        std::iter::once(C::one()).chain((0..edge_count).map(|e| cost.weight(e).abs())),
        "huge cost",
    )
}

pub fn vertex_max_supply<N>(graph: &IndexGraph, net: &N, node: NodeId) -> Result<N::Value, FlowError>
where
    N: FlowNetwork + ?Sized,
{
    N::Value::checked_sum(
        graph.outgoing_edges(node).iter().map(|&e| net.capacity(e)),
        "vertex max supply",
    )
}

pub fn vertex_max_demand<N>(graph: &IndexGraph, net: &N, node: NodeId) -> Result<N::Value, FlowError>
where
    N: FlowNetwork + ?Sized,
{
    N::Value::checked_sum(
        graph.incoming_edges(node).iter().map(|&e| net.capacity(e)),
        "vertex max demand",
    )
}

/// A capacity no feasible flow between `sources` and `sinks` can reach:
/// one more than the larger of the total capacity leaving the sources and the
/// total capacity entering the sinks.
pub fn huge_capacity<N>(
    graph: &IndexGraph,
    net: &N,
    sources: &[NodeId],
    sinks: &[NodeId],
) -> Result<N::Value, FlowError>
where
    N: FlowNetwork + ?Sized,
{
    let mut out_total = N::Value::zero();
    for &s in sources {
        out_total = out_total.add_checked(vertex_max_supply(graph, net, s)?, "huge capacity")?;
    }
    let mut in_total = N::Value::zero();
    for &t in sinks {
        in_total = in_total.add_checked(vertex_max_demand(graph, net, t)?, "huge capacity")?;
    }
    out_total.max_of(in_total).add_checked(N::Value::one(), "huge capacity")
}
