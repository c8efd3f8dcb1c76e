use crate::graph::IndexGraph;
use crate::network::FlowNetwork;
use crate::weights::WeightFunction;
use crate::FlowError;

use super::{build_terminal_problem, ReducedProblem};

/// Supply to terminals: `S -> v` with capacity `supply(v)` for every vertex
/// with positive supply and `v -> T` with capacity `-supply(v)` for every
/// vertex with negative supply. All of these arcs cost `-huge_cost`, and the
/// instance is feasible exactly when a maximum flow saturates them.
pub fn reduce_supply<'a, N>(
    graph: &IndexGraph,
    net: &'a mut N,
    supply: &dyn WeightFunction<N::Value>,
) -> Result<ReducedProblem<'a, N>, FlowError>
where
    N: FlowNetwork + ?Sized,
{
    build_terminal_problem(graph, net, &[], &[], None, Some(supply))
}
