use log::debug;
use num_traits::Zero;

use crate::graph::IndexGraph;
use crate::maxflow::{EdmondsKarp, MaximumFlow};
use crate::network::{check_capacities, check_supply, FlowNetwork};
use crate::reduction::{eliminate_lower_bounds, reduce_supply};
use crate::weights::WeightFunction;
use crate::{FlowError, FlowOptions};

/// Stores in `net` some flow whose net outflow at every vertex equals
/// `supply`, ignoring costs. Fails with [`FlowError::Infeasible`] when no such
/// flow exists.
pub fn compute_circulation<N>(
    graph: &IndexGraph,
    net: &mut N,
    supply: &dyn WeightFunction<N::Value>,
    options: &FlowOptions,
) -> Result<(), FlowError>
where
    N: FlowNetwork + ?Sized,
{
    graph.require_directed()?;
    check_capacities(graph, &*net)?;
    check_supply(graph, supply)?;

    let mut problem = reduce_supply(graph, net, supply)?;
    if problem.layout().supply_edges().next().is_none() {
        for e in graph.edges() {
            problem.network.set_flow(e, N::Value::zero())?;
        }
        return Ok(());
    }
    let value = EdmondsKarp::new(options.clone()).compute_maximum_flow(
        &problem.graph,
        &mut problem.network,
        problem.source,
        problem.sink,
    )?;
    debug!("circulation routed {} units of supply", value);
    problem.check_saturated(options.epsilon)
}

/// As [`compute_circulation`], with every edge carrying at least
/// `lower_bound(e)`.
pub fn compute_circulation_with_lower_bound<N>(
    graph: &IndexGraph,
    net: &mut N,
    lower_bound: &dyn WeightFunction<N::Value>,
    supply: &dyn WeightFunction<N::Value>,
    options: &FlowOptions,
) -> Result<(), FlowError>
where
    N: FlowNetwork + ?Sized,
{
    check_supply(graph, supply)?;
    let mut reduction = eliminate_lower_bounds(graph, net, lower_bound, Some(supply))?;
    compute_circulation(graph, &mut reduction.network, &reduction.supply, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeId;
    use crate::network::{net_outflow, EdgeNetwork};

    fn cycle4() -> IndexGraph {
        let mut graph = IndexGraph::new_directed(4);
        graph.add_edge(NodeId(0), NodeId(1)).unwrap();
        graph.add_edge(NodeId(1), NodeId(2)).unwrap();
        graph.add_edge(NodeId(2), NodeId(3)).unwrap();
        graph.add_edge(NodeId(3), NodeId(0)).unwrap();
        graph
    }

    #[test]
    fn routes_supply_along_available_paths() {
        let graph = cycle4();
        let mut net = EdgeNetwork::from_capacities(&graph, vec![10_i64; 4]).unwrap();
        let supply = vec![6_i64, 0, -6, 0];
        compute_circulation(&graph, &mut net, &supply, &FlowOptions::default()).unwrap();
        for v in graph.nodes() {
            assert_eq!(net_outflow(&graph, &net, v), supply[v.0]);
        }
    }

    #[test]
    fn insufficient_capacity_is_infeasible() {
        let graph = cycle4();
        let mut net = EdgeNetwork::from_capacities(&graph, vec![2_i64, 2, 10, 10]).unwrap();
        let supply = vec![5_i64, 0, -5, 0];
        let err = compute_circulation(&graph, &mut net, &supply, &FlowOptions::default())
            .unwrap_err();
        assert!(matches!(err, FlowError::Infeasible { .. }));
    }

    #[test]
    fn lower_bounds_force_a_circulation() {
        let graph = cycle4();
        let mut net = EdgeNetwork::from_capacities(&graph, vec![5_i64; 4]).unwrap();
        let lower = vec![0_i64, 3, 0, 0];
        let supply = vec![0_i64; 4];
        compute_circulation_with_lower_bound(
            &graph,
            &mut net,
            &lower,
            &supply,
            &FlowOptions::default(),
        )
        .unwrap();
        for e in graph.edges() {
            assert_eq!(net.flow(e), 3);
        }
    }
}
