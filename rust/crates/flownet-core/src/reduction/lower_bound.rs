use log::debug;

use crate::graph::IndexGraph;
use crate::network::{check_lower_bound, FlowNetwork, ReducedNetwork};
use crate::numerics::FlowValue;
use crate::weights::WeightFunction;
use crate::FlowError;

/// Network with lower bounds removed, plus the supply that the mandatory
/// lower-bound units leave to be routed.
pub struct LowerBoundReduction<'a, N: FlowNetwork + ?Sized> {
    pub network: ReducedNetwork<'a, N>,
    pub supply: Vec<N::Value>,
}

/// `supply` (zero when absent) after moving `lower_bound(e)` units out of the
/// source and into the target of every edge `e`.
pub fn shifted_supply<V: FlowValue>(
    graph: &IndexGraph,
    lower_bound: Option<&dyn WeightFunction<V>>,
    supply: Option<&dyn WeightFunction<V>>,
) -> Result<Vec<V>, FlowError> {
    let mut shifted: Vec<V> = match supply {
        Some(supply) => graph.nodes().map(|v| supply.weight(v.0)).collect(),
        None => vec![V::zero(); graph.node_count()],
    };
    if let Some(lower) = lower_bound {
        for e in graph.edges() {
            let l = lower.weight(e.0);
            if l == V::zero() {
                continue;
            }
            let u = graph.edge_source(e).0;
            let v = graph.edge_target(e).0;
            shifted[u] = shifted[u].add_checked(-l, "lower bound supply")?;
            shifted[v] = shifted[v].add_checked(l, "lower bound supply")?;
        }
    }
    Ok(shifted)
}

/// Sets every edge of `net` to its lower bound and wraps it so that solvers
/// see capacity `c - l` and flow `f - l`.
pub fn eliminate_lower_bounds<'a, N>(
    graph: &IndexGraph,
    net: &'a mut N,
    lower_bound: &'a dyn WeightFunction<N::Value>,
    supply: Option<&dyn WeightFunction<N::Value>>,
) -> Result<LowerBoundReduction<'a, N>, FlowError>
where
    N: FlowNetwork + ?Sized,
{
    graph.require_directed()?;
    check_lower_bound(graph, &*net, lower_bound)?;
    let supply = shifted_supply(graph, Some(lower_bound), supply)?;
    for e in graph.edges() {
        net.set_flow(e, lower_bound.weight(e.0))?;
    }
    debug!(
        "eliminated lower bounds on {} edges of a {}-vertex graph",
        graph.edge_count(),
        graph.node_count()
    );
    Ok(LowerBoundReduction {
        network: ReducedNetwork::new(net, graph.edge_count(), Some(lower_bound)),
        supply,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeId, NodeId};
    use crate::network::EdgeNetwork;

    #[test]
    fn mandatory_units_shift_supply() {
        let mut graph = IndexGraph::new_directed(3);
        graph.add_edge(NodeId(0), NodeId(1)).unwrap();
        graph.add_edge(NodeId(1), NodeId(2)).unwrap();
        let lower = vec![2_i64, 5];
        let supply = vec![4_i64, 0, -4];
        let shifted = shifted_supply::<i64>(&graph, Some(&lower), Some(&supply)).unwrap();
        assert_eq!(shifted, vec![2, -3, 1]);
        let plain = shifted_supply::<i64>(&graph, None, None).unwrap();
        assert_eq!(plain, vec![0, 0, 0]);
    }

    #[test]
    fn wrapped_capacity_excludes_the_lower_bound() {
        let mut graph = IndexGraph::new_directed(2);
        graph.add_edge(NodeId(0), NodeId(1)).unwrap();
        let mut net = EdgeNetwork::from_capacities(&graph, vec![10_i64]).unwrap();
        let lower = vec![3_i64];
        {
            let mut reduction = eliminate_lower_bounds(&graph, &mut net, &lower, None).unwrap();
            assert_eq!(reduction.network.capacity(EdgeId(0)), 7);
            assert_eq!(reduction.network.flow(EdgeId(0)), 0);
            assert_eq!(reduction.supply, vec![-3, 3]);
            reduction.network.set_flow(EdgeId(0), 5).unwrap();
        }
        assert_eq!(net.flow(EdgeId(0)), 8);
    }

    #[test]
    fn lower_bound_above_capacity_is_rejected_before_solving() {
        let mut graph = IndexGraph::new_directed(2);
        graph.add_edge(NodeId(0), NodeId(1)).unwrap();
        let mut net = EdgeNetwork::from_capacities(&graph, vec![2.0_f64]).unwrap();
        let lower = vec![2.5_f64];
        assert!(matches!(
            eliminate_lower_bounds(&graph, &mut net, &lower, None),
            Err(FlowError::InvalidInput(_))
        ));
        assert_eq!(net.flow(EdgeId(0)), 0.0);
    }
}
