pub mod circulation;
pub mod cut;
pub mod graph;
pub mod maxflow;
pub mod network;
pub mod numerics;
pub mod optimality;
pub mod reduction;
pub mod solver;
pub mod weights;

use thiserror::Error;

pub use graph::residual::{ArcOrder, ResidualGraph, ResidualGraphBuilder};
pub use graph::{EdgeId, IndexGraph, NodeId};
pub use maxflow::{EdmondsKarp, MaximumFlow};
pub use network::{EdgeNetwork, FlowNetwork};
pub use numerics::{FlowValue, NumericFamily};
pub use solver::{BaseSolver, CycleCanceling, MinCostFlowSolver, SuccessiveShortestPaths};
pub use weights::WeightFunction;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlowError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("flow {flow} on edge {edge} is outside [0, {capacity}]")]
    FlowOutOfRange { edge: usize, flow: f64, capacity: f64 },
    /// Raised when a caller tries to change a capacity of a network built by a
    /// reduction. This is a programming error in the caller.
    #[error("capacities of a reduced network are immutable")]
    ImmutableCapacity,
    #[error("vertex {0} is both a source and a sink")]
    TerminalOverlap(usize),
    #[error("infeasible instance: synthetic edge {edge} carries {flow} of required {capacity}")]
    Infeasible { edge: usize, flow: f64, capacity: f64 },
    /// The working integer width cannot hold a synthesized constant or a
    /// residual path cost.
    #[error("arithmetic overflow while computing {0}")]
    Overflow(&'static str),
    /// A negative residual cycle is still present, so the flow is not of
    /// minimum cost. Raised when `max_cycle_cancellations` is exhausted.
    #[error("negative residual cycle left after {cancellations} cancellations")]
    NegativeCycleLeft { cancellations: usize },
}

#[derive(Debug, Clone)]
pub struct FlowOptions {
    pub epsilon: f64,
    pub compact_residual: bool,
    pub max_cycle_cancellations: usize,
}

impl Default for FlowOptions {
    fn default() -> Self {
        Self {
            epsilon: 1e-9,
            compact_residual: false,
            max_cycle_cancellations: 100_000,
        }
    }
}

impl FlowOptions {
    pub fn compacted() -> Self {
        Self {
            compact_residual: true,
            ..Self::default()
        }
    }

    pub fn arc_order(&self) -> ArcOrder {
        if self.compact_residual {
            ArcOrder::BySource
        } else {
            ArcOrder::Insertion
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_keep_insertion_order() {
        let opts = FlowOptions::default();
        assert_eq!(opts.arc_order(), ArcOrder::Insertion);
        assert_eq!(FlowOptions::compacted().arc_order(), ArcOrder::BySource);
        assert!(opts.epsilon > 0.0);
    }

    #[test]
    fn errors_render_their_context() {
        let err = FlowError::FlowOutOfRange {
            edge: 3,
            flow: 7.0,
            capacity: 5.0,
        };
        assert_eq!(err.to_string(), "flow 7 on edge 3 is outside [0, 5]");
        assert_eq!(
            FlowError::TerminalOverlap(2).to_string(),
            "vertex 2 is both a source and a sink"
        );
        assert!(FlowError::Overflow("huge cost")
            .to_string()
            .contains("huge cost"));
        assert_eq!(
            FlowError::NegativeCycleLeft { cancellations: 4 }.to_string(),
            "negative residual cycle left after 4 cancellations"
        );
    }
}
