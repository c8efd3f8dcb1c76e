use log::trace;
use rayon::prelude::*;

use crate::graph::{EdgeId, IndexGraph, NodeId};
use crate::network::FlowNetwork;
use crate::numerics::FlowValue;
use crate::weights::WeightFunction;
use crate::FlowError;

/// Arc numbering of a built [`ResidualGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArcOrder {
    /// Forward arc of the k-th pair is `2k`, its twin `2k + 1`.
    #[default]
    Insertion,
    /// Arcs renumbered so that the out-arcs of each vertex are contiguous,
    /// keeping insertion order within a vertex.
    BySource,
}

/// Arena of residual arcs with stable ids, filled before any renumbering.
#[derive(Debug, Clone)]
pub struct ResidualGraphBuilder {
    directed: bool,
    node_count: usize,
    arc_source: Vec<NodeId>,
    arc_target: Vec<NodeId>,
    edge_ref: Vec<Option<EdgeId>>,
    twin: Vec<usize>,
    forward: Vec<bool>,
}

impl ResidualGraphBuilder {
    pub fn new(directed: bool, node_count: usize) -> Self {
        Self {
            directed,
            node_count,
            arc_source: Vec::new(),
            arc_target: Vec::new(),
            edge_ref: Vec::new(),
            twin: Vec::new(),
            forward: Vec::new(),
        }
    }

    /// One arc pair per edge of `graph`, self-loops excluded.
    pub fn from_graph(graph: &IndexGraph) -> Self {
        let mut builder = Self::new(graph.is_directed(), graph.node_count());
        let pairs = graph.edges().filter(|&e| !graph.is_self_loop(e)).count();
        builder.reserve_pairs(pairs);
        for e in graph.edges() {
            if graph.is_self_loop(e) {
                continue;
            }
            builder.push_pair(graph.edge_source(e), graph.edge_target(e), Some(e));
        }
        builder
    }

    fn reserve_pairs(&mut self, pairs: usize) {
        self.arc_source.reserve(2 * pairs);
        self.arc_target.reserve(2 * pairs);
        self.edge_ref.reserve(2 * pairs);
        self.twin.reserve(2 * pairs);
        self.forward.reserve(2 * pairs);
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn arc_count(&self) -> usize {
        self.arc_source.len()
    }

    pub fn add_vertex(&mut self) -> NodeId {
        self.node_count += 1;
        NodeId(self.node_count - 1)
    }

    /// Adds a forward arc `source -> target` and its twin, returning the id of
    /// the forward arc. `edge` is `None` for arcs with no original edge.
    pub fn add_arc_pair(
        &mut self,
        source: NodeId,
        target: NodeId,
        edge: Option<EdgeId>,
    ) -> Result<usize, FlowError> {
        if source.0 >= self.node_count || target.0 >= self.node_count {
            return Err(FlowError::InvalidInput(
                "residual arc endpoint outside node range".to_string(),
            ));
        }
        if source == target {
            return Err(FlowError::InvalidInput(
                "residual arcs never form self-loops".to_string(),
            ));
        }
        Ok(self.push_pair(source, target, edge))
    }

    fn push_pair(&mut self, source: NodeId, target: NodeId, edge: Option<EdgeId>) -> usize {
        let fwd = self.arc_source.len();
        self.arc_source.extend([source, target]);
        self.arc_target.extend([target, source]);
        self.edge_ref.extend([edge, edge]);
        self.twin.extend([fwd + 1, fwd]);
        self.forward.extend([true, false]);
        fwd
    }

    pub fn build(self, order: ArcOrder) -> ResidualGraph {
        match order {
            ArcOrder::Insertion => self.build_in_insertion_order(),
            ArcOrder::BySource => self.build_compacted(),
        }
    }

    fn build_in_insertion_order(self) -> ResidualGraph {
        let mut out_offsets = vec![0_usize; self.node_count + 1];
        for source in &self.arc_source {
            out_offsets[source.0 + 1] += 1;
        }
        for v in 0..self.node_count {
            out_offsets[v + 1] += out_offsets[v];
        }
        let mut cursor = out_offsets.clone();
        let mut out_arcs = vec![0_usize; self.arc_source.len()];
        for (arc, source) in self.arc_source.iter().enumerate() {
            out_arcs[cursor[source.0]] = arc;
            cursor[source.0] += 1;
        }
        ResidualGraph {
            directed: self.directed,
            arc_source: self.arc_source,
            arc_target: self.arc_target,
            edge_ref: self.edge_ref,
            twin: self.twin,
            forward: self.forward,
            out_offsets,
            out_arcs,
        }
    }

    fn build_compacted(self) -> ResidualGraph {
        let arc_count = self.arc_source.len();
        let mut order: Vec<usize> = (0..arc_count).collect();
        // par_sort_by_key is stable, so arcs of one vertex keep insertion order.
        order.par_sort_by_key(|&arc| self.arc_source[arc].0);

        let mut new_index = vec![0_usize; arc_count];
        for (new, &old) in order.iter().enumerate() {
            new_index[old] = new;
        }
        let permute = |values: &[NodeId]| order.iter().map(|&old| values[old]).collect::<Vec<_>>();
        let arc_source = permute(&self.arc_source);
        let arc_target = permute(&self.arc_target);
        let edge_ref = order.iter().map(|&old| self.edge_ref[old]).collect();
        let forward = order.iter().map(|&old| self.forward[old]).collect();
        let twin = order
            .iter()
            .map(|&old| new_index[self.twin[old]])
            .collect();

        let mut out_offsets = vec![0_usize; self.node_count + 1];
        for source in &arc_source {
            out_offsets[source.0 + 1] += 1;
        }
        for v in 0..self.node_count {
            out_offsets[v + 1] += out_offsets[v];
        }
        trace!("compacted {} residual arcs over {} vertices", arc_count, self.node_count);
        ResidualGraph {
            directed: self.directed,
            arc_source,
            arc_target,
            edge_ref,
            twin,
            forward,
            out_offsets,
            out_arcs: (0..arc_count).collect(),
        }
    }
}

/// Residual topology: arcs with origin references, twins and a CSR index of
/// the out-arcs of every vertex.
#[derive(Debug, Clone)]
pub struct ResidualGraph {
    directed: bool,
    arc_source: Vec<NodeId>,
    arc_target: Vec<NodeId>,
    edge_ref: Vec<Option<EdgeId>>,
    twin: Vec<usize>,
    forward: Vec<bool>,
    out_offsets: Vec<usize>,
    out_arcs: Vec<usize>,
}

impl ResidualGraph {
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn node_count(&self) -> usize {
        self.out_offsets.len() - 1
    }

    pub fn arc_count(&self) -> usize {
        self.arc_source.len()
    }

    pub fn arc_source(&self, arc: usize) -> NodeId {
        self.arc_source[arc]
    }

    pub fn arc_target(&self, arc: usize) -> NodeId {
        self.arc_target[arc]
    }

    pub fn arc_edge(&self, arc: usize) -> Option<EdgeId> {
        self.edge_ref[arc]
    }

    pub fn twin(&self, arc: usize) -> usize {
        self.twin[arc]
    }

    pub fn is_forward(&self, arc: usize) -> bool {
        self.forward[arc]
    }

    pub fn out_arcs(&self, node: NodeId) -> &[usize] {
        &self.out_arcs[self.out_offsets[node.0]..self.out_offsets[node.0 + 1]]
    }

    /// Per-arc cost: `cost(e)` forward, `-cost(e)` backward, zero for arcs
    /// without an original edge.
    pub fn arc_costs<C: FlowValue>(&self, cost: &dyn WeightFunction<C>) -> Vec<C> {
        (0..self.arc_count())
            .map(|arc| match self.edge_ref[arc] {
                Some(e) if self.forward[arc] => cost.weight(e.0),
                Some(e) => -cost.weight(e.0),
                None => C::zero(),
            })
            .collect()
    }
}

/// Capacity and flow of every residual arc. The flow of an arc is always the
/// negation of the flow of its twin.
#[derive(Debug, Clone)]
pub struct ResidualState<V: FlowValue> {
    capacity: Vec<V>,
    flow: Vec<V>,
}

impl<V: FlowValue> ResidualState<V> {
    /// Zero flow; arcs of original edges get the edge capacity (and the twins of
    /// undirected edges too), other arcs get zero capacity.
    pub fn zero<N>(residual: &ResidualGraph, net: &N) -> Self
    where
        N: FlowNetwork<Value = V> + ?Sized,
    {
        let mut capacity = vec![V::zero(); residual.arc_count()];
        for (arc, cap) in capacity.iter_mut().enumerate() {
            if let Some(e) = residual.arc_edge(arc) {
                if residual.is_forward(arc) || !residual.is_directed() {
                    *cap = net.capacity(e);
                }
            }
        }
        Self {
            capacity,
            flow: vec![V::zero(); residual.arc_count()],
        }
    }

    /// Starts from the flow currently stored in `net`.
    pub fn from_network<N>(residual: &ResidualGraph, net: &N) -> Self
    where
        N: FlowNetwork<Value = V> + ?Sized,
    {
        let mut state = Self::zero(residual, net);
        for arc in 0..residual.arc_count() {
            if let Some(e) = residual.arc_edge(arc) {
                let f = net.flow(e);
                state.flow[arc] = if residual.is_forward(arc) { f } else { -f };
            }
        }
        state
    }

    pub fn set_capacity(&mut self, arc: usize, capacity: V) {
        self.capacity[arc] = capacity;
    }

    pub fn capacity(&self, arc: usize) -> V {
        self.capacity[arc]
    }

    pub fn flow(&self, arc: usize) -> V {
        self.flow[arc]
    }

    pub fn residual(&self, arc: usize) -> V {
        self.capacity[arc] - self.flow[arc]
    }

    pub fn push(&mut self, residual: &ResidualGraph, arc: usize, amount: V) {
        self.flow[arc] = self.flow[arc] + amount;
        let twin = residual.twin(arc);
        self.flow[twin] = self.flow[twin] - amount;
    }

    /// Writes the flow of every forward arc back onto its original edge.
    pub fn write_back<N>(&self, residual: &ResidualGraph, net: &mut N) -> Result<(), FlowError>
    where
        N: FlowNetwork<Value = V> + ?Sized,
    {
        for arc in 0..residual.arc_count() {
            if !residual.is_forward(arc) {
                continue;
            }
            if let Some(e) = residual.arc_edge(arc) {
                net.set_flow(e, self.flow[arc])?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::EdgeNetwork;

    fn sample() -> IndexGraph {
        let mut graph = IndexGraph::new_directed(3);
        graph.add_edge(NodeId(1), NodeId(2)).unwrap();
        graph.add_edge(NodeId(0), NodeId(0)).unwrap();
        graph.add_edge(NodeId(0), NodeId(1)).unwrap();
        graph.add_edge(NodeId(2), NodeId(0)).unwrap();
        graph
    }

    #[test]
    fn insertion_order_pairs_forward_and_backward_arcs() {
        let residual = ResidualGraphBuilder::from_graph(&sample()).build(ArcOrder::Insertion);
        assert_eq!(residual.node_count(), 3);
        assert_eq!(residual.arc_count(), 6);
        assert_eq!(residual.arc_edge(0), Some(EdgeId(0)));
        assert_eq!(residual.arc_edge(2), Some(EdgeId(2)));
        assert_eq!(residual.twin(2), 3);
        assert!(residual.is_forward(2) && !residual.is_forward(3));
        assert_eq!(residual.arc_source(3), NodeId(1));
        assert_eq!(residual.out_arcs(NodeId(0)), &[2, 5]);
        assert_eq!(residual.out_arcs(NodeId(1)), &[0, 3]);
    }

    #[test]
    fn compaction_permutes_all_side_arrays_together() {
        let graph = sample();
        let plain = ResidualGraphBuilder::from_graph(&graph).build(ArcOrder::Insertion);
        let packed = ResidualGraphBuilder::from_graph(&graph).build(ArcOrder::BySource);
        assert_eq!(packed.arc_count(), plain.arc_count());
        for arc in 0..packed.arc_count() {
            let twin = packed.twin(arc);
            assert_eq!(packed.twin(twin), arc);
            assert_ne!(packed.is_forward(arc), packed.is_forward(twin));
            assert_eq!(packed.arc_edge(arc), packed.arc_edge(twin));
            assert_eq!(packed.arc_source(arc), packed.arc_target(twin));
            if packed.is_forward(arc) {
                let e = packed.arc_edge(arc).unwrap();
                assert_eq!(packed.arc_source(arc), graph.edge_source(e));
            }
        }
        for v in graph.nodes() {
            let arcs = packed.out_arcs(v);
            assert!(arcs.windows(2).all(|w| w[1] == w[0] + 1));
            assert!(arcs.iter().all(|&a| packed.arc_source(a) == v));
            assert_eq!(arcs.len(), plain.out_arcs(v).len());
        }
    }

    #[test]
    fn extra_vertices_and_unowned_arcs() {
        let graph = sample();
        let mut builder = ResidualGraphBuilder::from_graph(&graph);
        let hub = builder.add_vertex();
        let arc = builder.add_arc_pair(hub, NodeId(0), None).unwrap();
        assert!(builder.add_arc_pair(hub, hub, None).is_err());
        assert!(builder.add_arc_pair(hub, NodeId(7), None).is_err());
        let residual = builder.build(ArcOrder::Insertion);
        assert_eq!(residual.node_count(), 4);
        assert_eq!(residual.arc_edge(arc), None);
        assert_eq!(residual.out_arcs(hub), &[arc]);
    }

    #[test]
    fn state_pushes_mirror_onto_twins_and_write_back() {
        let graph = sample();
        let mut net = EdgeNetwork::from_capacities(&graph, vec![4_i64, 9, 6, 2]).unwrap();
        let residual = ResidualGraphBuilder::from_graph(&graph).build(ArcOrder::BySource);
        let mut state = ResidualState::zero(&residual, &net);
        let fwd = (0..residual.arc_count())
            .find(|&a| residual.is_forward(a) && residual.arc_edge(a) == Some(EdgeId(2)))
            .unwrap();
        state.push(&residual, fwd, 4);
        assert_eq!(state.residual(fwd), 2);
        assert_eq!(state.residual(residual.twin(fwd)), 4);
        state.write_back(&residual, &mut net).unwrap();
        assert_eq!(net.flow(EdgeId(2)), 4);
        let again = ResidualState::from_network(&residual, &net);
        assert_eq!(again.flow(fwd), 4);
        assert_eq!(again.flow(residual.twin(fwd)), -4);
    }

    #[test]
    fn undirected_twins_carry_the_edge_capacity() {
        let mut graph = IndexGraph::new_undirected(2);
        graph.add_edge(NodeId(0), NodeId(1)).unwrap();
        let net = EdgeNetwork::from_capacities(&graph, vec![3.0_f64]).unwrap();
        let residual = ResidualGraphBuilder::from_graph(&graph).build(ArcOrder::Insertion);
        let state = ResidualState::zero(&residual, &net);
        assert_eq!(state.residual(0), 3.0);
        assert_eq!(state.residual(1), 3.0);
        let costs = residual.arc_costs::<f64>(&vec![1.5_f64]);
        assert_eq!(costs, vec![1.5, -1.5]);
    }
}
