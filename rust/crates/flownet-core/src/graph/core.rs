use crate::FlowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub usize);

/// Graph over dense `0..n` vertex and `0..m` edge indices.
///
/// For undirected graphs every edge is listed among both the outgoing and the
/// incoming edges of each endpoint; a self-loop is listed once.
#[derive(Debug, Clone)]
pub struct IndexGraph {
    directed: bool,
    sources: Vec<NodeId>,
    targets: Vec<NodeId>,
    outgoing: Vec<Vec<EdgeId>>,
    incoming: Vec<Vec<EdgeId>>,
}

impl IndexGraph {
    pub fn new_directed(node_count: usize) -> Self {
        Self::with_capacity(true, node_count, 0)
    }

    pub fn new_undirected(node_count: usize) -> Self {
        Self::with_capacity(false, node_count, 0)
    }

    pub fn with_capacity(directed: bool, node_count: usize, edge_capacity: usize) -> Self {
        Self {
            directed,
            sources: Vec::with_capacity(edge_capacity),
            targets: Vec::with_capacity(edge_capacity),
            outgoing: vec![Vec::new(); node_count],
            incoming: vec![Vec::new(); node_count],
        }
    }

    /// Copies all vertices and edges, keeping their indices, and reserves room
    /// for `extra_nodes` and `extra_edges` more.
    pub fn clone_with_reserve(&self, extra_nodes: usize, extra_edges: usize) -> Self {
        let mut graph = Self::with_capacity(
            self.directed,
            self.node_count(),
            self.edge_count() + extra_edges,
        );
        graph.outgoing.reserve(extra_nodes);
        graph.incoming.reserve(extra_nodes);
        for (idx, (&u, &v)) in self.sources.iter().zip(self.targets.iter()).enumerate() {
            let edge = graph.push_edge(u, v);
            debug_assert_eq!(edge.0, idx);
        }
        graph
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn node_count(&self) -> usize {
        self.outgoing.len()
    }

    pub fn edge_count(&self) -> usize {
        self.sources.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> {
        (0..self.node_count()).map(NodeId)
    }

    pub fn edges(&self) -> impl Iterator<Item = EdgeId> {
        (0..self.edge_count()).map(EdgeId)
    }

    pub fn contains_node(&self, node: NodeId) -> bool {
        node.0 < self.node_count()
    }

    pub fn add_node(&mut self) -> NodeId {
        let node = NodeId(self.outgoing.len());
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        node
    }

    pub fn add_edge(&mut self, source: NodeId, target: NodeId) -> Result<EdgeId, FlowError> {
        if !self.contains_node(source) || !self.contains_node(target) {
            return Err(FlowError::InvalidInput(
                "edge endpoint outside node range".to_string(),
            ));
        }
        Ok(self.push_edge(source, target))
    }

    fn push_edge(&mut self, source: NodeId, target: NodeId) -> EdgeId {
        let edge = EdgeId(self.sources.len());
        self.sources.push(source);
        self.targets.push(target);
        self.outgoing[source.0].push(edge);
        self.incoming[target.0].push(edge);
        if !self.directed && source != target {
            self.outgoing[target.0].push(edge);
            self.incoming[source.0].push(edge);
        }
        edge
    }

    pub fn edge_source(&self, edge: EdgeId) -> NodeId {
        self.sources[edge.0]
    }

    pub fn edge_target(&self, edge: EdgeId) -> NodeId {
        self.targets[edge.0]
    }

    /// The endpoint of `edge` that is not `endpoint`.
    pub fn edge_endpoint(&self, edge: EdgeId, endpoint: NodeId) -> NodeId {
        let source = self.sources[edge.0];
        if source == endpoint {
            self.targets[edge.0]
        } else {
            source
        }
    }

    pub fn is_self_loop(&self, edge: EdgeId) -> bool {
        self.sources[edge.0] == self.targets[edge.0]
    }

    pub fn outgoing_edges(&self, node: NodeId) -> &[EdgeId] {
        &self.outgoing[node.0]
    }

    pub fn incoming_edges(&self, node: NodeId) -> &[EdgeId] {
        &self.incoming[node.0]
    }

    pub fn check_node(&self, node: NodeId) -> Result<(), FlowError> {
        if self.contains_node(node) {
            Ok(())
        } else {
            Err(FlowError::InvalidInput(format!(
                "vertex {} outside node range",
                node.0
            )))
        }
    }

    pub fn require_directed(&self) -> Result<(), FlowError> {
        if self.directed {
            Ok(())
        } else {
            Err(FlowError::InvalidInput(
                "only directed graphs are supported".to_string(),
            ))
        }
    }
}
