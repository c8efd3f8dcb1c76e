use std::collections::VecDeque;

use log::{debug, trace};
use num_traits::Zero;

use crate::graph::residual::{ResidualGraphBuilder, ResidualState};
use crate::graph::{EdgeId, IndexGraph, NodeId};
use crate::network::{check_capacities, check_terminals, FlowNetwork};
use crate::numerics::{vertex_max_demand, vertex_max_supply, FlowValue};
use crate::{FlowError, FlowOptions};

pub trait MaximumFlow {
    /// Computes a maximum flow from `source` to `sink`, stores it in `net` and
    /// returns its value.
    fn compute_maximum_flow<N>(
        &self,
        graph: &IndexGraph,
        net: &mut N,
        source: NodeId,
        sink: NodeId,
    ) -> Result<N::Value, FlowError>
    where
        N: FlowNetwork + ?Sized,
    {
        if source == sink {
            return Err(FlowError::TerminalOverlap(source.0));
        }
        self.compute_maximum_flow_multi(graph, net, &[source], &[sink])
    }

    fn compute_maximum_flow_multi<N>(
        &self,
        graph: &IndexGraph,
        net: &mut N,
        sources: &[NodeId],
        sinks: &[NodeId],
    ) -> Result<N::Value, FlowError>
    where
        N: FlowNetwork + ?Sized;
}

/// Shortest augmenting paths by breadth-first search over the residual graph.
/// Handles directed and undirected graphs; multiple terminals are attached to
/// an internal super source and super sink that never reach `net`.
#[derive(Debug, Clone, Default)]
pub struct EdmondsKarp {
    options: FlowOptions,
}

impl EdmondsKarp {
    pub fn new(options: FlowOptions) -> Self {
        Self { options }
    }
}

impl MaximumFlow for EdmondsKarp {
    fn compute_maximum_flow_multi<N>(
        &self,
        graph: &IndexGraph,
        net: &mut N,
        sources: &[NodeId],
        sinks: &[NodeId],
    ) -> Result<N::Value, FlowError>
    where
        N: FlowNetwork + ?Sized,
    {
        if sources.is_empty() || sinks.is_empty() {
            return Err(FlowError::InvalidInput(
                "at least one source and one sink are required".to_string(),
            ));
        }
        check_terminals(graph, sources, sinks)?;
        check_capacities(graph, &*net)?;

        let mut builder = ResidualGraphBuilder::from_graph(graph);
        let super_source = builder.add_vertex();
        let super_sink = builder.add_vertex();
        let mut terminal_arcs = Vec::with_capacity(sources.len() + sinks.len());
        for &s in sources {
            let arc = builder.add_arc_pair(super_source, s, None)?;
            terminal_arcs.push((arc, vertex_max_supply(graph, &*net, s)?));
        }
        for &t in sinks {
            let arc = builder.add_arc_pair(t, super_sink, None)?;
            terminal_arcs.push((arc, vertex_max_demand(graph, &*net, t)?));
        }
        // Arc ids are only stable in insertion order.
        let residual = builder.build(Default::default());
        let mut state = ResidualState::zero(&residual, &*net);
        for &(arc, capacity) in &terminal_arcs {
            state.set_capacity(arc, capacity);
        }

        let slack = N::Value::tolerance(self.options.epsilon);
        let n = residual.node_count();
        let mut total = N::Value::zero();
        let mut augmentations = 0_usize;
        let mut pred: Vec<Option<usize>> = vec![None; n];
        let mut queue = VecDeque::new();
        loop {
            pred.iter_mut().for_each(|p| *p = None);
            queue.clear();
            queue.push_back(super_source);
            let mut reached = false;
            while let Some(u) = queue.pop_front() {
                for &arc in residual.out_arcs(u) {
                    let v = residual.arc_target(arc);
                    if v == super_source || pred[v.0].is_some() {
                        continue;
                    }
                    if state.residual(arc) <= slack {
                        continue;
                    }
                    pred[v.0] = Some(arc);
                    if v == super_sink {
                        reached = true;
                        break;
                    }
                    queue.push_back(v);
                }
                if reached {
                    break;
                }
            }
            if !reached {
                break;
            }

            let mut bottleneck: Option<N::Value> = None;
            let mut v = super_sink;
            while let Some(arc) = pred[v.0] {
                let r = state.residual(arc);
                bottleneck = Some(bottleneck.map_or(r, |b| b.min_of(r)));
                v = residual.arc_source(arc);
            }
            let Some(bottleneck) = bottleneck else {
                break;
            };
            let mut v = super_sink;
            while let Some(arc) = pred[v.0] {
                state.push(&residual, arc, bottleneck);
                v = residual.arc_source(arc);
            }
            total = total + bottleneck;
            augmentations += 1;
            trace!("augmented {} units", bottleneck);
        }

        state.write_back(&residual, net)?;
        for e in graph.edges() {
            if graph.is_self_loop(e) {
                net.set_flow(e, N::Value::zero())?;
            }
        }
        debug!(
            "maximum flow {} after {} augmentations over {} vertices",
            total,
            augmentations,
            graph.node_count()
        );
        Ok(total)
    }
}

/// Value of the flow stored in `net`: net outflow of the sources.
pub fn flow_value<N>(graph: &IndexGraph, net: &N, sources: &[NodeId]) -> N::Value
where
    N: FlowNetwork + ?Sized,
{
    let mut is_source = vec![false; graph.node_count()];
    for &s in sources {
        is_source[s.0] = true;
    }
    let mut total = N::Value::zero();
    for &s in sources {
        for &e in graph.outgoing_edges(s) {
            let other = graph.edge_endpoint(e, s);
            if is_source[other.0] {
                continue;
            }
            total = total + directed_flow(graph, net, e, s);
        }
        if graph.is_directed() {
            for &e in graph.incoming_edges(s) {
                if is_source[graph.edge_source(e).0] {
                    continue;
                }
                total = total - net.flow(e);
            }
        }
    }
    total
}

/// Flow of `edge` in the direction leaving `from`.
pub(crate) fn directed_flow<N>(
    graph: &IndexGraph,
    net: &N,
    edge: EdgeId,
    from: NodeId,
) -> N::Value
where
    N: FlowNetwork + ?Sized,
{
    let flow = net.flow(edge);
    if graph.edge_source(edge) == from {
        flow
    } else {
        -flow
    }
}
