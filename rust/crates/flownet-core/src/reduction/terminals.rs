use log::debug;
use num_traits::Zero;

use crate::graph::{IndexGraph, NodeId};
use crate::network::{check_terminals, FlowNetwork};
use crate::numerics::huge_capacity;
use crate::weights::WeightFunction;
use crate::FlowError;

use super::{build_terminal_problem, ProblemBuilder, ReducedProblem};

fn require_terminals(sources: &[NodeId], sinks: &[NodeId]) -> Result<(), FlowError> {
    if sources.is_empty() || sinks.is_empty() {
        return Err(FlowError::InvalidInput(
            "at least one source and one sink are required".to_string(),
        ));
    }
    Ok(())
}

/// Multi-terminal to single-terminal: `S -> s` for every source with the total
/// out-capacity of `s`, `t -> T` for every sink with the total in-capacity of
/// `t`.
pub fn reduce_terminals<'a, N>(
    graph: &IndexGraph,
    net: &'a mut N,
    sources: &[NodeId],
    sinks: &[NodeId],
) -> Result<ReducedProblem<'a, N>, FlowError>
where
    N: FlowNetwork + ?Sized,
{
    require_terminals(sources, sinks)?;
    check_terminals(graph, sources, sinks)?;
    build_terminal_problem(graph, net, sources, sinks, None, None)
}

/// Terminal arcs as in [`reduce_terminals`] together with supply arcs for
/// `supply` and the mandatory units of `lower_bound`.
pub fn reduce_terminals_with_supply<'a, N>(
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
    require_terminals(sources, sinks)?;
    check_terminals(graph, sources, sinks)?;
    build_terminal_problem(graph, net, sources, sinks, lower_bound, supply)
}

/// Terminal problem expressed as pure supply, for solvers that only accept
/// supply. Returns the problem and the supply over its vertices: `+H` at `S`
/// and `-H` at `T` with `H = huge_capacity`. The bypass arcs `S -> T` and
/// `T -> S` keep the supply satisfiable; their `+huge_cost` makes any real
/// path cheaper.
pub fn reduce_terminals_to_supply<'a, N>(
    graph: &IndexGraph,
    net: &'a mut N,
    sources: &[NodeId],
    sinks: &[NodeId],
) -> Result<(ReducedProblem<'a, N>, Vec<N::Value>), FlowError>
where
    N: FlowNetwork + ?Sized,
{
    require_terminals(sources, sinks)?;
    check_terminals(graph, sources, sinks)?;
    let huge = huge_capacity(graph, &*net, sources, sinks)?;
    debug!(
        "terminal to supply reduction with {} sources, {} sinks, capacity bound {}",
        sources.len(),
        sinks.len(),
        huge
    );

    let mut builder = ProblemBuilder::new(graph, net, None, sources.len() + sinks.len() + 2)?;
    let (super_source, super_sink) = (builder.source, builder.sink);
    for &s in sources {
        builder.add_arc(super_source, s, huge)?;
    }
    for &t in sinks {
        builder.add_arc(t, super_sink, huge)?;
    }
    builder.begin_supply();
    builder.begin_bypass();
    builder.add_arc(super_source, super_sink, huge)?;
    builder.add_arc(super_sink, super_source, huge)?;
    let problem = builder.finish();

    let mut supply = vec![N::Value::zero(); problem.graph.node_count()];
    supply[problem.source.0] = huge;
    supply[problem.sink.0] = -huge;
    Ok((problem, supply))
}
