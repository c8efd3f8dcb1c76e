use log::debug;

use crate::circulation::compute_circulation;
use crate::graph::{IndexGraph, NodeId};
use crate::network::FlowNetwork;
use crate::numerics::FlowValue;
use crate::optimality::cancel_negative_cycles;
use crate::reduction::reduce_terminals_to_supply;
use crate::solver::{saturate_negative_self_loops, BaseSolver};
use crate::weights::WeightFunction;
use crate::{FlowError, FlowOptions};

/// Supply-native solver: a feasible flow from a maximum flow, then negative
/// residual cycles are canceled until none is left. Terminal problems go
/// through [`reduce_terminals_to_supply`].
#[derive(Debug, Clone, Default)]
pub struct CycleCanceling {
    options: FlowOptions,
}

impl CycleCanceling {
    pub fn new(options: FlowOptions) -> Self {
        Self { options }
    }
}

impl BaseSolver for CycleCanceling {
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
        if source == sink {
            return Err(FlowError::TerminalOverlap(source.0));
        }
        let (mut problem, supply) = reduce_terminals_to_supply(graph, net, &[source], &[sink])?;
        let reduced_cost = problem.cost(cost)?;
        self.compute_min_cost_flow(&problem.graph, &mut problem.network, &reduced_cost, &supply)
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
        compute_circulation(graph, net, supply, &self.options)?;
        let stats = cancel_negative_cycles(graph, net, cost, &self.options)?;
        saturate_negative_self_loops(graph, net, cost)?;
        debug!(
            "canceled {} cycles, cost reduced by {}",
            stats.cycles_canceled, stats.total_cost_reduction
        );
        Ok(())
    }

    fn options(&self) -> &FlowOptions {
        &self.options
    }
}
