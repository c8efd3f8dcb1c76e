use crate::graph::EdgeId;
use crate::numerics::FlowValue;
use crate::FlowError;

/// Scalar weight per edge (costs, capacities, lower bounds) or per vertex
/// (supply), addressed by dense index.
pub trait WeightFunction<T> {
    fn weight(&self, index: usize) -> T;
}

impl<T: Copy> WeightFunction<T> for [T] {
    fn weight(&self, index: usize) -> T {
        self[index]
    }
}

impl<T: Copy> WeightFunction<T> for Vec<T> {
    fn weight(&self, index: usize) -> T {
        self[index]
    }
}

impl<T: Copy, const N: usize> WeightFunction<T> for [T; N] {
    fn weight(&self, index: usize) -> T {
        self[index]
    }
}

/// Weights computed on demand by a closure.
#[derive(Debug, Clone, Copy)]
pub struct FnWeights<F>(pub F);

impl<T, F> WeightFunction<T> for FnWeights<F>
where
    F: Fn(usize) -> T,
{
    fn weight(&self, index: usize) -> T {
        (self.0)(index)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ConstWeight<T>(pub T);

impl<T: Copy> WeightFunction<T> for ConstWeight<T> {
    fn weight(&self, _index: usize) -> T {
        self.0
    }
}

pub fn weight_sum<T: FlowValue>(
    weights: &dyn WeightFunction<T>,
    edges: impl IntoIterator<Item = EdgeId>,
) -> Result<T, FlowError> {
    T::checked_sum(edges.into_iter().map(|e| weights.weight(e.0)), "weight sum")
}
