//! Graph-and-network transforms that bring a flow problem into the canonical
//! shape a [`BaseSolver`](crate::solver::BaseSolver) accepts.
//!
//! Every reduction keeps the original edges at their indices and appends the
//! synthetic edges after them, in three consecutive bands:
//!
//! * terminal arcs (`S -> s`, `t -> T`), cost zero,
//! * supply arcs (`S -> v`, `v -> T`), cost `-huge_cost`, must be saturated,
//! * bypass arcs (`S -> T`, `T -> S`), cost `+huge_cost`.

mod lower_bound;
mod supply;
mod terminals;

pub use lower_bound::{eliminate_lower_bounds, shifted_supply, LowerBoundReduction};
pub use supply::reduce_supply;
pub use terminals::{reduce_terminals, reduce_terminals_to_supply, reduce_terminals_with_supply};

use log::{debug, warn};
use num_traits::Zero;

use crate::graph::{EdgeId, IndexGraph, NodeId};
use crate::network::{check_lower_bound, FlowNetwork, ReducedNetwork};
use crate::numerics::{huge_cost, vertex_max_demand, vertex_max_supply, FlowValue};
use crate::weights::WeightFunction;
use crate::FlowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeBand {
    Original,
    Terminal,
    Supply,
    Bypass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntheticLayout {
    pub orig_edges_threshold: usize,
    pub supply_edges_start: usize,
    pub bypass_edges_start: usize,
    pub edge_count: usize,
}

impl SyntheticLayout {
    pub fn band(&self, edge: EdgeId) -> EdgeBand {
        if edge.0 < self.orig_edges_threshold {
            EdgeBand::Original
        } else if edge.0 < self.supply_edges_start {
            EdgeBand::Terminal
        } else if edge.0 < self.bypass_edges_start {
            EdgeBand::Supply
        } else {
            EdgeBand::Bypass
        }
    }

    pub fn supply_edges(&self) -> impl Iterator<Item = EdgeId> {
        (self.supply_edges_start..self.bypass_edges_start).map(EdgeId)
    }

    fn needs_huge_cost(&self) -> bool {
        self.supply_edges_start < self.edge_count
    }
}

/// Augmented graph and wrapped network of a reduction, with the artificial
/// source `S` and sink `T`.
pub struct ReducedProblem<'a, N: FlowNetwork + ?Sized> {
    pub graph: IndexGraph,
    pub network: ReducedNetwork<'a, N>,
    pub source: NodeId,
    pub sink: NodeId,
    layout: SyntheticLayout,
}

impl<'a, N: FlowNetwork + ?Sized> ReducedProblem<'a, N> {
    pub fn layout(&self) -> SyntheticLayout {
        self.layout
    }

    /// Cost over the augmented graph. The huge constant is only synthesized
    /// when supply or bypass arcs exist.
    pub fn cost<'c, C: FlowValue>(
        &self,
        original: &'c dyn WeightFunction<C>,
    ) -> Result<ReducedCost<'c, C>, FlowError> {
        let huge = if self.layout.needs_huge_cost() {
            huge_cost(self.layout.orig_edges_threshold, original)?
        } else {
            C::zero()
        };
        Ok(ReducedCost {
            original,
            layout: self.layout,
            huge,
        })
    }

    /// Fails with [`FlowError::Infeasible`] unless every supply arc carries its
    /// full capacity.
    pub fn check_saturated(&self, epsilon: f64) -> Result<(), FlowError> {
        let slack = N::Value::tolerance(epsilon);
        for e in self.layout.supply_edges() {
            let flow = self.network.flow(e);
            let capacity = self.network.capacity(e);
            if capacity - flow > slack {
                warn!(
                    "supply arc {} carries {} of {}, instance is infeasible",
                    e.0, flow, capacity
                );
                return Err(FlowError::Infeasible {
                    edge: e.0,
                    flow: flow.as_f64(),
                    capacity: capacity.as_f64(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy)]
pub struct ReducedCost<'c, C> {
    original: &'c dyn WeightFunction<C>,
    layout: SyntheticLayout,
    huge: C,
}

impl<C: FlowValue> ReducedCost<'_, C> {
    pub fn huge(&self) -> C {
        self.huge
    }
}

impl<C: FlowValue> WeightFunction<C> for ReducedCost<'_, C> {
    fn weight(&self, index: usize) -> C {
        match self.layout.band(EdgeId(index)) {
            EdgeBand::Original => self.original.weight(index),
            EdgeBand::Terminal => C::zero(),
            EdgeBand::Supply => -self.huge,
            EdgeBand::Bypass => self.huge,
        }
    }
}

struct ProblemBuilder<'a, N: FlowNetwork + ?Sized> {
    graph: IndexGraph,
    network: ReducedNetwork<'a, N>,
    source: NodeId,
    sink: NodeId,
    supply_start: Option<usize>,
    bypass_start: Option<usize>,
}

impl<'a, N: FlowNetwork + ?Sized> ProblemBuilder<'a, N> {
    fn new(
        graph: &IndexGraph,
        net: &'a mut N,
        lower_bound: Option<&'a dyn WeightFunction<N::Value>>,
        extra_edges: usize,
    ) -> Result<Self, FlowError> {
        graph.require_directed()?;
        let mut augmented = graph.clone_with_reserve(2, extra_edges);
        let source = augmented.add_node();
        let sink = augmented.add_node();
        Ok(Self {
            network: ReducedNetwork::new(net, graph.edge_count(), lower_bound),
            graph: augmented,
            source,
            sink,
            supply_start: None,
            bypass_start: None,
        })
    }

    fn add_arc(&mut self, u: NodeId, v: NodeId, capacity: N::Value) -> Result<EdgeId, FlowError> {
        let edge = self.graph.add_edge(u, v)?;
        let synthetic = self.network.push_synthetic(capacity);
        debug_assert_eq!(edge, synthetic);
        Ok(edge)
    }

    fn begin_supply(&mut self) {
        self.supply_start = Some(self.graph.edge_count());
    }

    fn begin_bypass(&mut self) {
        self.bypass_start = Some(self.graph.edge_count());
    }

    fn finish(self) -> ReducedProblem<'a, N> {
        let edge_count = self.graph.edge_count();
        let bypass_edges_start = self.bypass_start.unwrap_or(edge_count);
        let supply_edges_start = self.supply_start.unwrap_or(bypass_edges_start);
        let layout = SyntheticLayout {
            orig_edges_threshold: self.network.orig_edges_threshold(),
            supply_edges_start,
            bypass_edges_start,
            edge_count,
        };
        debug!(
            "reduced problem: {} original edges, {} terminal, {} supply, {} bypass arcs",
            layout.orig_edges_threshold,
            supply_edges_start - layout.orig_edges_threshold,
            bypass_edges_start - supply_edges_start,
            edge_count - bypass_edges_start
        );
        ReducedProblem {
            graph: self.graph,
            network: self.network,
            source: self.source,
            sink: self.sink,
            layout,
        }
    }
}

/// Shared construction of the terminal and supply reductions: terminal arcs
/// for `sources`/`sinks`, then supply arcs for the supply left after shifting
/// by `lower_bound`.
fn build_terminal_problem<'a, N>(
    graph: &IndexGraph,
    net: &'a mut N,
    sources: &[NodeId],
    sinks: &[NodeId],
    lower_bound: Option<&'a dyn WeightFunction<N::Value>>,
    supply: Option<&dyn WeightFunction<N::Value>>,
) -> Result<ReducedProblem<'a, N>, FlowError>
where
    N: FlowNetwork + ?Sized,
{
    graph.require_directed()?;
    if let Some(lower) = lower_bound {
        check_lower_bound(graph, &*net, lower)?;
    }
    let remaining = match (lower_bound, supply) {
        (None, None) => None,
        _ => Some(shifted_supply(graph, lower_bound, supply)?),
    };
    // Full capacities, so that a terminal arc also has room for the
    // mandatory units of its terminal.
    let mut terminal_capacities = Vec::with_capacity(sources.len() + sinks.len());
    for &s in sources {
        terminal_capacities.push(vertex_max_supply(graph, &*net, s)?);
    }
    for &t in sinks {
        terminal_capacities.push(vertex_max_demand(graph, &*net, t)?);
    }
    // Written last, so a failed reduction leaves `net` as it was.
    if let Some(lower) = lower_bound {
        for e in graph.edges() {
            net.set_flow(e, lower.weight(e.0))?;
        }
    }

    let mut builder = ProblemBuilder::new(
        graph,
        net,
        lower_bound,
        sources.len() + sinks.len() + graph.node_count(),
    )?;
    let (super_source, super_sink) = (builder.source, builder.sink);
    let arcs = sources
        .iter()
        .map(|&s| (super_source, s))
        .chain(sinks.iter().map(|&t| (t, super_sink)));
    for ((u, v), capacity) in arcs.zip(terminal_capacities) {
        builder.add_arc(u, v, capacity)?;
    }
    builder.begin_supply();
    if let Some(remaining) = remaining {
        let zero = N::Value::zero();
        for (v, &amount) in remaining.iter().enumerate() {
            if amount > zero {
                builder.add_arc(super_source, NodeId(v), amount)?;
            } else if amount < zero {
                builder.add_arc(NodeId(v), super_sink, -amount)?;
            }
        }
    }
    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_bands_are_consecutive() {
        let layout = SyntheticLayout {
            orig_edges_threshold: 3,
            supply_edges_start: 5,
            bypass_edges_start: 6,
            edge_count: 8,
        };
        assert_eq!(layout.band(EdgeId(2)), EdgeBand::Original);
        assert_eq!(layout.band(EdgeId(4)), EdgeBand::Terminal);
        assert_eq!(layout.band(EdgeId(5)), EdgeBand::Supply);
        assert_eq!(layout.band(EdgeId(7)), EdgeBand::Bypass);
        assert_eq!(layout.supply_edges().collect::<Vec<_>>(), vec![EdgeId(5)]);
    }
}
