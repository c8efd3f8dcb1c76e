use log::{debug, trace, warn};
use num_traits::Zero;

use crate::graph::residual::{ResidualGraph, ResidualGraphBuilder, ResidualState};
use crate::graph::{IndexGraph, NodeId};
use crate::network::{check_supply, FlowNetwork};
use crate::numerics::FlowValue;
use crate::optimality::cancel_cycles;
use crate::reduction::reduce_supply;
use crate::solver::{saturate_negative_self_loops, BaseSolver};
use crate::weights::WeightFunction;
use crate::{FlowError, FlowOptions};

/// Min-cost max-flow by repeated Bellman-Ford shortest augmenting paths.
///
/// Negative residual cycles of the zero flow are canceled first, so every
/// intermediate flow is of minimum cost for its value. Supply problems go
/// through [`reduce_supply`].
#[derive(Debug, Clone, Default)]
pub struct SuccessiveShortestPaths {
    options: FlowOptions,
}

impl SuccessiveShortestPaths {
    pub fn new(options: FlowOptions) -> Self {
        Self { options }
    }
}

struct ShortestPaths<C> {
    dist: Vec<Option<C>>,
    pred: Vec<Option<usize>>,
}

fn shortest_paths<V: FlowValue, C: FlowValue>(
    residual: &ResidualGraph,
    state: &ResidualState<V>,
    costs: &[C],
    source: NodeId,
    flow_slack: V,
    cost_slack: C,
) -> Result<ShortestPaths<C>, FlowError> {
    let n = residual.node_count();
    let mut dist: Vec<Option<C>> = vec![None; n];
    let mut pred: Vec<Option<usize>> = vec![None; n];
    dist[source.0] = Some(C::zero());

    for _ in 0..n {
        let mut updated = false;
        for arc in 0..residual.arc_count() {
            let u = residual.arc_source(arc).0;
            let Some(du) = dist[u] else {
                continue;
            };
            if state.residual(arc) <= flow_slack {
                continue;
            }
            let v = residual.arc_target(arc).0;
            let nd = du.add_checked(costs[arc], "residual path cost")?;
            let improves = match dist[v] {
                Some(dv) => nd + cost_slack < dv,
                None => true,
            };
            if improves {
                dist[v] = Some(nd);
                pred[v] = Some(arc);
                updated = true;
            }
        }
        if !updated {
            break;
        }
    }
    Ok(ShortestPaths { dist, pred })
}

impl BaseSolver for SuccessiveShortestPaths {
    fn compute_min_cost_max_flow<N, C>(
        &self,
        graph: &IndexGraph,
        net: &mut N,
        cost: &dyn WeightFunction<C>,
        source: NodeId,
        sink: NodeId,
    ) -> Result<(), FlowError>
    where
        N: FlowNetwork + ?Sized,
        C: FlowValue,
    {
        graph.require_directed()?;
        graph.check_node(source)?;
        graph.check_node(sink)?;
        if source == sink {
            return Err(FlowError::TerminalOverlap(source.0));
        }

        let residual = ResidualGraphBuilder::from_graph(graph).build(self.options.arc_order());
        let mut state = ResidualState::zero(&residual, &*net);
        let costs = residual.arc_costs(cost);
        let purge = cancel_cycles(&residual, &mut state, &costs, &self.options)?;

        let flow_slack = N::Value::tolerance(self.options.epsilon);
        let cost_slack = C::tolerance(self.options.epsilon);
        let mut total_flow = N::Value::zero();
        let mut augmentations = 0_usize;
        loop {
            let paths = shortest_paths(&residual, &state, &costs, source, flow_slack, cost_slack)?;
            let Some(path_cost) = paths.dist[sink.0] else {
                break;
            };
            let mut path = Vec::new();
            let mut v = sink;
            while v != source {
                let Some(arc) = paths.pred[v.0].filter(|_| path.len() < residual.node_count())
                else {
                    warn!("shortest path tree closes a negative cycle");
                    return Err(FlowError::NegativeCycleLeft {
                        cancellations: purge.cycles_canceled,
                    });
                };
                path.push(arc);
                v = residual.arc_source(arc);
            }
            let Some(bottleneck) = path
                .iter()
                .map(|&arc| state.residual(arc))
                .reduce(|a, b| a.min_of(b))
            else {
                break;
            };
            for &arc in &path {
                state.push(&residual, arc, bottleneck);
            }
            total_flow = total_flow.add_checked(bottleneck, "flow value")?;
            augmentations += 1;
            trace!("augmented {} units along a path of cost {}", bottleneck, path_cost);
        }

        state.write_back(&residual, net)?;
        saturate_negative_self_loops(graph, net, cost)?;
        debug!(
            "min cost max flow {} after {} canceled cycles and {} augmentations",
            total_flow, purge.cycles_canceled, augmentations
        );
        Ok(())
    }

    fn compute_min_cost_flow<N, C>(
        &self,
        graph: &IndexGraph,
        net: &mut N,
        cost: &dyn WeightFunction<C>,
        supply: &dyn WeightFunction<N::Value>,
    ) -> Result<(), FlowError>
    where
        N: FlowNetwork + ?Sized,
        C: FlowValue,
    {
        check_supply(graph, supply)?;
        let mut problem = reduce_supply(graph, net, supply)?;
        let reduced_cost = problem.cost(cost)?;
        self.compute_min_cost_max_flow(
            &problem.graph,
            &mut problem.network,
            &reduced_cost,
            problem.source,
            problem.sink,
        )?;
        problem.check_saturated(self.options.epsilon)
    }

    fn options(&self) -> &FlowOptions {
        &self.options
    }
}
