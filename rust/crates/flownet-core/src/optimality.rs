use log::{trace, warn};

use crate::graph::residual::{ResidualGraph, ResidualGraphBuilder, ResidualState};
use crate::graph::IndexGraph;
use crate::network::FlowNetwork;
use crate::numerics::FlowValue;
use crate::weights::WeightFunction;
use crate::{FlowError, FlowOptions};

#[derive(Debug, Default, Clone)]
pub struct CancellationStats {
    pub cycles_canceled: usize,
    pub total_flow_augmented: f64,
    pub total_cost_reduction: f64,
}

/// Bellman-Ford from a virtual root at distance zero to every vertex. Returns
/// the arcs of a negative cycle among arcs with residual above `flow_slack`.
pub(crate) fn find_negative_cycle<V: FlowValue, C: FlowValue>(
    residual: &ResidualGraph,
    state: &ResidualState<V>,
    costs: &[C],
    flow_slack: V,
    cost_slack: C,
) -> Result<Option<Vec<usize>>, FlowError> {
    let n = residual.node_count();
    let mut dist = vec![C::zero(); n];
    let mut pred: Vec<Option<usize>> = vec![None; n];
    let mut updated = None;

    for _ in 0..n {
        updated = None;
        for arc in 0..residual.arc_count() {
            if state.residual(arc) <= flow_slack {
                continue;
            }
            let u = residual.arc_source(arc).0;
            let v = residual.arc_target(arc).0;
            let nd = dist[u].add_checked(costs[arc], "residual path cost")?;
            if nd + cost_slack < dist[v] {
                dist[v] = nd;
                pred[v] = Some(arc);
                updated = Some(v);
            }
        }
        if updated.is_none() {
            return Ok(None);
        }
    }

    let Some(mut v) = updated else {
        return Ok(None);
    };
    for _ in 0..n {
        if let Some(arc) = pred[v] {
            v = residual.arc_source(arc).0;
        }
    }
    let start = v;
    let mut cycle = Vec::new();
    let mut current = start;
    for _ in 0..=n {
        let Some(arc) = pred[current] else {
            return Ok(None);
        };
        cycle.push(arc);
        current = residual.arc_source(arc).0;
        if current == start {
            return Ok(Some(cycle));
        }
    }
    Ok(None)
}

/// Cancels negative cycles until none is left. Fails with
/// [`FlowError::NegativeCycleLeft`] once `max_cycle_cancellations` cycles
/// were canceled and another one remains.
pub(crate) fn cancel_cycles<V: FlowValue, C: FlowValue>(
    residual: &ResidualGraph,
    state: &mut ResidualState<V>,
    costs: &[C],
    options: &FlowOptions,
) -> Result<CancellationStats, FlowError> {
    let flow_slack = V::tolerance(options.epsilon);
    let cost_slack = C::tolerance(options.epsilon);
    let mut stats = CancellationStats::default();
    while let Some(cycle) = find_negative_cycle(residual, state, costs, flow_slack, cost_slack)? {
        let bottleneck = cycle
            .iter()
            .map(|&arc| state.residual(arc))
            .fold(state.residual(cycle[0]), |a, b| a.min_of(b));
        if bottleneck <= flow_slack || stats.cycles_canceled >= options.max_cycle_cancellations {
            warn!(
                "stopped after {} cycle cancellations with a negative cycle left",
                stats.cycles_canceled
            );
            return Err(FlowError::NegativeCycleLeft {
                cancellations: stats.cycles_canceled,
            });
        }
        for &arc in &cycle {
            state.push(residual, arc, bottleneck);
        }
        let cycle_cost: f64 = cycle.iter().map(|&arc| costs[arc].as_f64()).sum();
        trace!(
            "canceled cycle of {} arcs, cost {} per unit, {} units",
            cycle.len(),
            cycle_cost,
            bottleneck
        );
        stats.cycles_canceled += 1;
        stats.total_flow_augmented += bottleneck.as_f64();
        stats.total_cost_reduction += -cycle_cost * bottleneck.as_f64();
    }
    Ok(stats)
}

/// Repeatedly pushes flow around negative-cost residual cycles of the flow
/// stored in `net` until none is left, then writes the flow back. On error
/// `net` is left untouched.
pub fn cancel_negative_cycles<N, C>(
    graph: &IndexGraph,
    net: &mut N,
    cost: &dyn WeightFunction<C>,
    options: &FlowOptions,
) -> Result<CancellationStats, FlowError>
where
    N: FlowNetwork + ?Sized,
    C: FlowValue,
{
    graph.require_directed()?;
    let residual = ResidualGraphBuilder::from_graph(graph).build(options.arc_order());
    let mut state = ResidualState::from_network(&residual, &*net);
    let costs = residual.arc_costs(cost);
    let stats = cancel_cycles(&residual, &mut state, &costs, options)?;
    state.write_back(&residual, net)?;
    Ok(stats)
}

/// Optimality oracle: a flow has minimum cost among flows with the same
/// supply exactly when its residual graph has no negative cycle.
pub fn has_negative_residual_cycle<N, C>(
    graph: &IndexGraph,
    net: &N,
    cost: &dyn WeightFunction<C>,
    epsilon: f64,
) -> Result<bool, FlowError>
where
    N: FlowNetwork + ?Sized,
    C: FlowValue,
{
    let residual = ResidualGraphBuilder::from_graph(graph).build(Default::default());
    let state = ResidualState::from_network(&residual, net);
    let costs = residual.arc_costs(cost);
    let cycle = find_negative_cycle(
        &residual,
        &state,
        &costs,
        N::Value::tolerance(epsilon),
        C::tolerance(epsilon),
    )?;
    Ok(cycle.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeId, NodeId};
    use crate::network::EdgeNetwork;

    fn triangle() -> IndexGraph {
        let mut graph = IndexGraph::new_directed(3);
        graph.add_edge(NodeId(0), NodeId(1)).unwrap();
        graph.add_edge(NodeId(1), NodeId(2)).unwrap();
        graph.add_edge(NodeId(2), NodeId(0)).unwrap();
        graph
    }

    #[test]
    fn cancels_negative_cycle() {
        let graph = triangle();
        let mut net = EdgeNetwork::from_capacities(&graph, vec![2_i64, 3, 4]).unwrap();
        let cost = vec![-5_i64, 1, 1];
        assert_eq!(has_negative_residual_cycle(&graph, &net, &cost, 0.0), Ok(true));
        let stats = cancel_negative_cycles(&graph, &mut net, &cost, &FlowOptions::default())
            .unwrap();
        assert_eq!(stats.cycles_canceled, 1);
        assert_eq!(stats.total_cost_reduction, 6.0);
        for e in graph.edges() {
            assert_eq!(net.flow(e), 2);
        }
        assert_eq!(has_negative_residual_cycle(&graph, &net, &cost, 0.0), Ok(false));
    }

    #[test]
    fn non_negative_cycles_are_left_alone() {
        let graph = triangle();
        let mut net = EdgeNetwork::from_capacities(&graph, vec![1.0_f64, 1.0, 1.0]).unwrap();
        let cost = vec![-1.0_f64, 0.5, 0.5];
        let stats =
            cancel_negative_cycles(&graph, &mut net, &cost, &FlowOptions::compacted()).unwrap();
        assert_eq!(stats.cycles_canceled, 0);
        assert_eq!(net.flow(EdgeId(0)), 0.0);
    }

    #[test]
    fn iteration_cap_fails_and_keeps_the_flow() {
        let graph = triangle();
        let mut net = EdgeNetwork::from_capacities(&graph, vec![2_i64, 3, 4]).unwrap();
        let cost = vec![-5_i64, 1, 1];
        let options = FlowOptions {
            max_cycle_cancellations: 0,
            ..FlowOptions::default()
        };
        let err = cancel_negative_cycles(&graph, &mut net, &cost, &options).unwrap_err();
        assert_eq!(err, FlowError::NegativeCycleLeft { cancellations: 0 });
        assert_eq!(net.flow(EdgeId(0)), 0);
    }

    #[test]
    fn unrepresentable_path_costs_overflow() {
        let graph = triangle();
        let net = EdgeNetwork::from_capacities(&graph, vec![1_i64, 1, 1]).unwrap();
        let cost = vec![i64::MIN / 2, i64::MIN / 2, i64::MIN / 2];
        assert_eq!(
            has_negative_residual_cycle(&graph, &net, &cost, 0.0),
            Err(FlowError::Overflow("residual path cost"))
        );
    }
}
