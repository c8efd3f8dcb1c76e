mod cycle_canceling;
mod ssp;

pub use cycle_canceling::CycleCanceling;
pub use ssp::SuccessiveShortestPaths;

use log::debug;
use num_traits::Zero;

use crate::graph::{IndexGraph, NodeId};
use crate::network::{check_capacities, check_supply, check_terminals, FlowNetwork};
use crate::numerics::FlowValue;
use crate::reduction::{eliminate_lower_bounds, reduce_terminals, reduce_terminals_with_supply};
use crate::weights::WeightFunction;
use crate::{FlowError, FlowOptions};

/// Solver for the canonical problems: a single source and sink, or a pure
/// supply vector, with no lower bounds. Implementations may reduce one form to
/// the other, but never back again.
pub trait BaseSolver {
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
        C: FlowValue;

    fn compute_min_cost_flow<N, C>(
        &self,
        graph: &IndexGraph,
        net: &mut N,
        cost: &dyn WeightFunction<C>,
        supply: &dyn WeightFunction<N::Value>,
    ) -> Result<(), FlowError>
    where
        N: FlowNetwork + ?Sized,
        C: FlowValue;

    fn options(&self) -> &FlowOptions;
}

/// Entry points for every problem shape. Inputs are validated before any
/// solving; reductions bring each shape to a canonical one for `B`.
#[derive(Debug, Clone, Default)]
pub struct MinCostFlowSolver<B> {
    base: B,
}

impl<B: BaseSolver> MinCostFlowSolver<B> {
    pub fn new(base: B) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &B {
        &self.base
    }

    fn epsilon(&self) -> f64 {
        self.base.options().epsilon
    }

    pub fn compute_min_cost_max_flow<N, C>(
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
        check_capacities(graph, &*net)?;
        check_terminals(graph, &[source], &[sink])?;
        self.base
            .compute_min_cost_max_flow(graph, net, cost, source, sink)
    }

    pub fn compute_min_cost_max_flow_with_lower_bound<N, C>(
        &self,
        graph: &IndexGraph,
        net: &mut N,
        cost: &dyn WeightFunction<C>,
        lower_bound: &dyn WeightFunction<N::Value>,
        source: NodeId,
        sink: NodeId,
    ) -> Result<(), FlowError>
    where
        N: FlowNetwork + ?Sized,
        C: FlowValue,
    {
        self.compute_min_cost_max_flow_multi_with_lower_bound(
            graph,
            net,
            cost,
            lower_bound,
            &[source],
            &[sink],
        )
    }

    pub fn compute_min_cost_max_flow_multi<N, C>(
        &self,
        graph: &IndexGraph,
        net: &mut N,
        cost: &dyn WeightFunction<C>,
        sources: &[NodeId],
        sinks: &[NodeId],
    ) -> Result<(), FlowError>
    where
        N: FlowNetwork + ?Sized,
        C: FlowValue,
    {
        graph.require_directed()?;
        check_capacities(graph, &*net)?;
        let mut problem = reduce_terminals(graph, net, sources, sinks)?;
        let reduced_cost = problem.cost(cost)?;
        self.base.compute_min_cost_max_flow(
            &problem.graph,
            &mut problem.network,
            &reduced_cost,
            problem.source,
            problem.sink,
        )
    }

    pub fn compute_min_cost_max_flow_multi_with_lower_bound<N, C>(
        &self,
        graph: &IndexGraph,
        net: &mut N,
        cost: &dyn WeightFunction<C>,
        lower_bound: &dyn WeightFunction<N::Value>,
        sources: &[NodeId],
        sinks: &[NodeId],
    ) -> Result<(), FlowError>
    where
        N: FlowNetwork + ?Sized,
        C: FlowValue,
    {
        graph.require_directed()?;
        check_capacities(graph, &*net)?;
        let mut problem =
            reduce_terminals_with_supply(graph, net, sources, sinks, Some(lower_bound), None)?;
        let reduced_cost = problem.cost(cost)?;
        self.base.compute_min_cost_max_flow(
            &problem.graph,
            &mut problem.network,
            &reduced_cost,
            problem.source,
            problem.sink,
        )?;
        problem.check_saturated(self.epsilon())
    }

    pub fn compute_min_cost_flow<N, C>(
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
        graph.require_directed()?;
        check_capacities(graph, &*net)?;
        check_supply(graph, supply)?;
        self.base.compute_min_cost_flow(graph, net, cost, supply)
    }

    pub fn compute_min_cost_flow_with_lower_bound<N, C>(
        &self,
        graph: &IndexGraph,
        net: &mut N,
        cost: &dyn WeightFunction<C>,
        lower_bound: &dyn WeightFunction<N::Value>,
        supply: &dyn WeightFunction<N::Value>,
    ) -> Result<(), FlowError>
    where
        N: FlowNetwork + ?Sized,
        C: FlowValue,
    {
        graph.require_directed()?;
        check_capacities(graph, &*net)?;
        check_supply(graph, supply)?;
        let mut reduction = eliminate_lower_bounds(graph, net, lower_bound, Some(supply))?;
        debug!("solving lower-bounded supply problem on {} edges", graph.edge_count());
        self.base
            .compute_min_cost_flow(graph, &mut reduction.network, cost, &reduction.supply)
    }
}

/// `sum(cost(e) * flow(e))` over all edges, overflow-checked.
pub fn total_cost<N>(
    graph: &IndexGraph,
    net: &N,
    cost: &dyn WeightFunction<N::Value>,
) -> Result<N::Value, FlowError>
where
    N: FlowNetwork + ?Sized,
{
    let mut total = N::Value::zero();
    for e in graph.edges() {
        let c = cost.weight(e.0);
        let f = net.flow(e);
        total = total.add_checked(c.mul_checked(f, "total cost")?, "total cost")?;
    }
    Ok(total)
}

/// Negative-cost self-loops never appear in the residual graph but always
/// lower the cost, so base solvers fill them to capacity.
pub(crate) fn saturate_negative_self_loops<N, C>(
    graph: &IndexGraph,
    net: &mut N,
    cost: &dyn WeightFunction<C>,
) -> Result<(), FlowError>
where
    N: FlowNetwork + ?Sized,
    C: FlowValue,
{
    for e in graph.edges() {
        if !graph.is_self_loop(e) {
            continue;
        }
        let flow = if cost.weight(e.0) < C::zero() {
            net.capacity(e)
        } else {
            N::Value::zero()
        };
        net.set_flow(e, flow)?;
    }
    Ok(())
}
