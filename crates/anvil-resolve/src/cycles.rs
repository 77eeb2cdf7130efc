//! Cycle detection over the compile-time visibility subgraph
//!
//! Tarjan's strongly-connected-component algorithm (iterative, O(V+E))
//! restricted to public and private edges. Dynamic edges impose no
//! compile-time ordering and are allowed to form cycles.
//!
//! Diagnostics are reproducible: the reported chain is the cycle through
//! the lexicographically smallest participating module, rotated to start
//! (and end) at that module.

use crate::error::{ResolveError, ResolveResult};
use crate::graph::DependencyGraph;
use crate::registry::ModuleRegistry;
use std::collections::VecDeque;

/// Verify the public+private subgraph is acyclic
pub fn check_acyclic(registry: &ModuleRegistry, graph: &DependencyGraph) -> ResolveResult<()> {
    let n = graph.len();
    let ct_edges: Vec<Vec<usize>> = (0..n)
        .map(|v| graph.compile_time_deps(v).collect())
        .collect();

    let cyclic_sccs = tarjan_sccs(&ct_edges)
        .into_iter()
        .filter(|scc| scc.len() > 1)
        .collect::<Vec<_>>();
    if cyclic_sccs.is_empty() {
        return Ok(());
    }

    // Deterministic selection: the SCC holding the smallest module name.
    let name_of = |id: usize| registry.module(id).name();
    let scc = cyclic_sccs
        .iter()
        .min_by_key(|scc| scc.iter().map(|&v| name_of(v)).min())
        .expect("non-empty");

    let chain = minimal_chain(scc, &ct_edges, registry);
    Err(ResolveError::CyclicDependency { chain })
}

/// Iterative Tarjan SCC
fn tarjan_sccs(edges: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let n = edges.len();
    let mut index: Vec<Option<u32>> = vec![None; n];
    let mut lowlink: Vec<u32> = vec![0; n];
    let mut on_stack: Vec<bool> = vec![false; n];
    let mut stack: Vec<usize> = Vec::new();
    let mut next_index: u32 = 0;
    let mut sccs: Vec<Vec<usize>> = Vec::new();

    for root in 0..n {
        if index[root].is_some() {
            continue;
        }
        // Explicit call stack of (node, next child position)
        let mut frames: Vec<(usize, usize)> = vec![(root, 0)];
        index[root] = Some(next_index);
        lowlink[root] = next_index;
        next_index += 1;
        stack.push(root);
        on_stack[root] = true;

        while !frames.is_empty() {
            let top = frames.len() - 1;
            let (v, child) = frames[top];
            if child < edges[v].len() {
                frames[top].1 += 1;
                let w = edges[v][child];
                match index[w] {
                    None => {
                        index[w] = Some(next_index);
                        lowlink[w] = next_index;
                        next_index += 1;
                        stack.push(w);
                        on_stack[w] = true;
                        frames.push((w, 0));
                    }
                    Some(w_index) if on_stack[w] => {
                        lowlink[v] = lowlink[v].min(w_index);
                    }
                    Some(_) => {}
                }
            } else {
                frames.pop();
                if let Some(&(parent, _)) = frames.last() {
                    lowlink[parent] = lowlink[parent].min(lowlink[v]);
                }
                if Some(lowlink[v]) == index[v] {
                    let mut scc = Vec::new();
                    loop {
                        let w = stack.pop().expect("tarjan stack underflow");
                        on_stack[w] = false;
                        scc.push(w);
                        if w == v {
                            break;
                        }
                    }
                    sccs.push(scc);
                }
            }
        }
    }
    sccs
}

/// Shortest cycle through the SCC's smallest-named module, as a name chain
/// with the start repeated at the end
fn minimal_chain(
    scc: &[usize],
    edges: &[Vec<usize>],
    registry: &ModuleRegistry,
) -> Vec<String> {
    let mut in_scc = vec![false; edges.len()];
    for &v in scc {
        in_scc[v] = true;
    }
    let start = *scc
        .iter()
        .min_by_key(|&&v| registry.module(v).name())
        .expect("non-empty scc");

    // BFS back to `start`; edge order is declaration order, so ties are stable.
    let mut prev: Vec<Option<usize>> = vec![None; edges.len()];
    let mut visited = vec![false; edges.len()];
    visited[start] = true;
    let mut queue = VecDeque::from([start]);
    while let Some(v) = queue.pop_front() {
        for &w in &edges[v] {
            if !in_scc[w] {
                continue;
            }
            if w == start {
                // Reconstruct start -> ... -> v -> start
                let mut path = vec![start];
                let mut names: Vec<usize> = Vec::new();
                let mut cur = v;
                while cur != start {
                    names.push(cur);
                    cur = prev[cur].expect("bfs predecessor");
                }
                names.reverse();
                path.extend(names);
                path.push(start);
                return path
                    .into_iter()
                    .map(|id| registry.module(id).name().to_string())
                    .collect();
            }
            if !visited[w] {
                visited[w] = true;
                prev[w] = Some(v);
                queue.push_back(w);
            }
        }
    }
    // An SCC of size > 1 always contains a cycle through every member.
    unreachable!("no cycle found inside a non-trivial SCC")
}
