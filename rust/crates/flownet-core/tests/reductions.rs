use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use flownet_core::maxflow::flow_value;
use flownet_core::reduction::{reduce_supply, reduce_terminals, EdgeBand};
use flownet_core::solver::total_cost;
use flownet_core::{
    ArcOrder, CycleCanceling, EdgeId, EdgeNetwork, FlowError, FlowNetwork, IndexGraph,
    MinCostFlowSolver, NodeId, ResidualGraphBuilder, SuccessiveShortestPaths,
};

fn fork() -> (IndexGraph, EdgeNetwork<i64>) {
    let mut graph = IndexGraph::new_directed(4);
    graph.add_edge(NodeId(0), NodeId(2)).unwrap();
    graph.add_edge(NodeId(1), NodeId(2)).unwrap();
    graph.add_edge(NodeId(2), NodeId(3)).unwrap();
    graph.add_edge(NodeId(1), NodeId(3)).unwrap();
    let net = EdgeNetwork::from_capacities(&graph, vec![4_i64, 6, 7, 2]).unwrap();
    (graph, net)
}

#[test]
fn multiple_sources_share_the_bottleneck() {
    let cost = vec![1_i64, 1, 1, 5];
    let sources = [NodeId(0), NodeId(1)];

    let (graph, mut net) = fork();
    MinCostFlowSolver::new(SuccessiveShortestPaths::default())
        .compute_min_cost_max_flow_multi(&graph, &mut net, &cost, &sources, &[NodeId(3)])
        .unwrap();
    assert_eq!(flow_value(&graph, &net, &sources), 9);
    assert_eq!(net.flow(EdgeId(2)), 7);
    assert_eq!(net.flow(EdgeId(3)), 2);
    assert_eq!(total_cost(&graph, &net, &cost), Ok(24));

    let (graph, mut net) = fork();
    MinCostFlowSolver::new(CycleCanceling::default())
        .compute_min_cost_max_flow_multi(&graph, &mut net, &cost, &sources, &[NodeId(3)])
        .unwrap();
    assert_eq!(flow_value(&graph, &net, &sources), 9);
    assert_eq!(total_cost(&graph, &net, &cost), Ok(24));
}

#[test]
fn lower_bounds_with_terminals() {
    let cost = vec![1_i64, 1, 1, 5];
    let lower = vec![0_i64, 0, 0, 2];
    let (graph, mut net) = fork();
    MinCostFlowSolver::new(SuccessiveShortestPaths::default())
        .compute_min_cost_max_flow_multi_with_lower_bound(
            &graph,
            &mut net,
            &cost,
            &lower,
            &[NodeId(0), NodeId(1)],
            &[NodeId(3)],
        )
        .unwrap();
    assert_eq!(net.flow(EdgeId(3)), 2);
    assert_eq!(total_cost(&graph, &net, &cost), Ok(24));
}

#[test]
fn stranded_mandatory_units_are_infeasible() {
    let mut graph = IndexGraph::new_directed(5);
    graph.add_edge(NodeId(0), NodeId(1)).unwrap();
    graph.add_edge(NodeId(1), NodeId(2)).unwrap();
    graph.add_edge(NodeId(3), NodeId(4)).unwrap();
    let mut net = EdgeNetwork::from_capacities(&graph, vec![5_i64, 5, 2]).unwrap();
    let cost = vec![1_i64, 1, 1];
    let lower = vec![0_i64, 0, 1];
    let err = MinCostFlowSolver::new(SuccessiveShortestPaths::default())
        .compute_min_cost_max_flow_with_lower_bound(
            &graph,
            &mut net,
            &cost,
            &lower,
            NodeId(0),
            NodeId(2),
        )
        .unwrap_err();
    assert!(matches!(err, FlowError::Infeasible { .. }));
}

#[test]
fn reduced_capacities_are_immutable() {
    let (graph, mut net) = fork();
    let mut problem = reduce_terminals(&graph, &mut net, &[NodeId(0)], &[NodeId(3)]).unwrap();
    assert_eq!(
        problem.network.set_capacity(EdgeId(0), 1),
        Err(FlowError::ImmutableCapacity)
    );
    assert_eq!(
        problem.network.set_capacity(EdgeId(4), 1),
        Err(FlowError::ImmutableCapacity)
    );
    problem.network.set_flow(EdgeId(4), 3).unwrap();
    assert_eq!(problem.network.flow(EdgeId(4)), 3);
    assert!(problem.network.set_flow(EdgeId(4), 5).is_err());
}

#[test]
fn synthetic_edges_follow_the_original_ones() {
    let (graph, mut net) = fork();
    let supply = vec![3_i64, 2, 0, -5];
    let problem = reduce_supply(&graph, &mut net, &supply).unwrap();
    let layout = problem.layout();
    for e in problem.graph.edges() {
        let expected = if e.0 < graph.edge_count() {
            EdgeBand::Original
        } else {
            EdgeBand::Supply
        };
        assert_eq!(layout.band(e), expected);
    }
    for e in graph.edges() {
        assert_eq!(problem.graph.edge_source(e), graph.edge_source(e));
        assert_eq!(problem.graph.edge_target(e), graph.edge_target(e));
    }
    assert_eq!(problem.network.inner().capacities(), &[4, 6, 7, 2]);
}

#[test]
fn oversized_capacities_overflow_instead_of_wrapping() {
    let mut graph = IndexGraph::new_directed(3);
    graph.add_edge(NodeId(0), NodeId(1)).unwrap();
    graph.add_edge(NodeId(0), NodeId(2)).unwrap();
    let mut net = EdgeNetwork::from_capacities(&graph, vec![i64::MAX, i64::MAX]).unwrap();
    let cost = vec![1_i64, 1];
    let err = MinCostFlowSolver::new(SuccessiveShortestPaths::default())
        .compute_min_cost_max_flow_multi(&graph, &mut net, &cost, &[NodeId(0)], &[NodeId(1), NodeId(2)])
        .unwrap_err();
    assert_eq!(err, FlowError::Overflow("vertex max supply"));
}

#[test]
fn overflow_leaves_lower_bounded_network_untouched() {
    let mut graph = IndexGraph::new_directed(3);
    graph.add_edge(NodeId(0), NodeId(1)).unwrap();
    graph.add_edge(NodeId(0), NodeId(2)).unwrap();
    let mut net = EdgeNetwork::from_capacities(&graph, vec![i64::MAX, i64::MAX]).unwrap();
    let cost = vec![1_i64, 1];
    let lower = vec![1_i64, 0];
    let err = MinCostFlowSolver::new(SuccessiveShortestPaths::default())
        .compute_min_cost_max_flow_multi_with_lower_bound(
            &graph,
            &mut net,
            &cost,
            &lower,
            &[NodeId(0)],
            &[NodeId(1), NodeId(2)],
        )
        .unwrap_err();
    assert_eq!(err, FlowError::Overflow("vertex max supply"));
    assert_eq!(net.flows(), &[0, 0]);
}

#[test]
fn undirected_graphs_are_rejected_by_the_solvers() {
    let mut graph = IndexGraph::new_undirected(2);
    graph.add_edge(NodeId(0), NodeId(1)).unwrap();
    let mut net = EdgeNetwork::from_capacities(&graph, vec![1_i64]).unwrap();
    let cost = vec![1_i64];
    let err = MinCostFlowSolver::new(CycleCanceling::default())
        .compute_min_cost_max_flow(&graph, &mut net, &cost, NodeId(0), NodeId(1))
        .unwrap_err();
    assert!(matches!(err, FlowError::InvalidInput(_)));
}

#[test]
fn compacted_residual_keeps_twins_consistent() {
    let mut rng = StdRng::seed_from_u64(7);
    let n = 12;
    let mut graph = IndexGraph::new_directed(n);
    for _ in 0..60 {
        let u = rng.gen_range(0..n);
        let v = rng.gen_range(0..n);
        graph.add_edge(NodeId(u), NodeId(v)).unwrap();
    }
    let plain = ResidualGraphBuilder::from_graph(&graph).build(ArcOrder::Insertion);
    let compact = ResidualGraphBuilder::from_graph(&graph).build(ArcOrder::BySource);
    assert_eq!(plain.arc_count(), compact.arc_count());

    let mut next = 0;
    for v in 0..n {
        let arcs = compact.out_arcs(NodeId(v));
        for (offset, &arc) in arcs.iter().enumerate() {
            assert_eq!(arc, next + offset);
            assert_eq!(compact.arc_source(arc), NodeId(v));
        }
        next += arcs.len();
    }
    for arc in 0..compact.arc_count() {
        let twin = compact.twin(arc);
        assert_eq!(compact.twin(twin), arc);
        assert_eq!(compact.arc_source(twin), compact.arc_target(arc));
        assert_eq!(compact.arc_edge(twin), compact.arc_edge(arc));
        assert_ne!(compact.is_forward(twin), compact.is_forward(arc));
        if compact.is_forward(arc) {
            let edge = compact.arc_edge(arc).unwrap();
            assert_eq!(compact.arc_source(arc), graph.edge_source(edge));
        }
    }
}
