use num_traits::Zero;

use crate::graph::EdgeId;
use crate::network::{checked_flow, FlowNetwork};
use crate::weights::WeightFunction;
use crate::FlowError;

/// Network over an augmented graph, as produced by a reduction.
///
/// Edges below `orig_edges_threshold` are the edges of the wrapped network,
/// seen with their lower bound subtracted from capacity and flow. Edges at or
/// above it are synthetic and live in the side arrays. Capacities are fixed at
/// construction.
pub struct ReducedNetwork<'a, N: FlowNetwork + ?Sized> {
    inner: &'a mut N,
    lower_bound: Option<&'a dyn WeightFunction<N::Value>>,
    orig_edges_threshold: usize,
    synthetic_capacity: Vec<N::Value>,
    synthetic_flow: Vec<N::Value>,
}

impl<'a, N: FlowNetwork + ?Sized> ReducedNetwork<'a, N> {
    pub fn new(
        inner: &'a mut N,
        orig_edges_threshold: usize,
        lower_bound: Option<&'a dyn WeightFunction<N::Value>>,
    ) -> Self {
        Self {
            inner,
            lower_bound,
            orig_edges_threshold,
            synthetic_capacity: Vec::new(),
            synthetic_flow: Vec::new(),
        }
    }

    /// Registers the capacity of the next synthetic edge, whose id must be
    /// `orig_edges_threshold + synthetic_count()`.
    pub(crate) fn push_synthetic(&mut self, capacity: N::Value) -> EdgeId {
        let edge = EdgeId(self.orig_edges_threshold + self.synthetic_capacity.len());
        self.synthetic_capacity.push(capacity);
        self.synthetic_flow.push(N::Value::zero());
        edge
    }

    pub fn orig_edges_threshold(&self) -> usize {
        self.orig_edges_threshold
    }

    pub fn synthetic_count(&self) -> usize {
        self.synthetic_capacity.len()
    }

    pub fn is_synthetic(&self, edge: EdgeId) -> bool {
        edge.0 >= self.orig_edges_threshold
    }

    pub fn inner(&self) -> &N {
        &*self.inner
    }

    fn lower(&self, edge: EdgeId) -> N::Value {
        self.lower_bound
            .map_or(N::Value::zero(), |lower| lower.weight(edge.0))
    }
}

impl<N: FlowNetwork + ?Sized> FlowNetwork for ReducedNetwork<'_, N> {
    type Value = N::Value;

    fn capacity(&self, edge: EdgeId) -> N::Value {
        if self.is_synthetic(edge) {
            self.synthetic_capacity[edge.0 - self.orig_edges_threshold]
        } else {
            self.inner.capacity(edge) - self.lower(edge)
        }
    }

    fn set_capacity(&mut self, _edge: EdgeId, _capacity: N::Value) -> Result<(), FlowError> {
        Err(FlowError::ImmutableCapacity)
    }

    fn flow(&self, edge: EdgeId) -> N::Value {
        if self.is_synthetic(edge) {
            self.synthetic_flow[edge.0 - self.orig_edges_threshold]
        } else {
            self.inner.flow(edge) - self.lower(edge)
        }
    }

    fn set_flow(&mut self, edge: EdgeId, flow: N::Value) -> Result<(), FlowError> {
        let value = checked_flow(edge, flow, self.capacity(edge), false)?;
        if self.is_synthetic(edge) {
            self.synthetic_flow[edge.0 - self.orig_edges_threshold] = value;
            Ok(())
        } else {
            let lower = self.lower(edge);
            self.inner.set_flow(edge, value + lower)
        }
    }
}
