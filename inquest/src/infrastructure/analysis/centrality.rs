// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Centrality
//!
//! Weighted PageRank by power iteration and Brandes betweenness centrality
//! on undirected graphs. Both run on the in-memory entity graph, which stays
//! small (entities of one investigation), so dense iteration is fine.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::collections::VecDeque;

const DAMPING: f64 = 0.85;
const PAGERANK_ITERATIONS: usize = 50;
const PAGERANK_EPSILON: f64 = 1e-8;

/// Weighted PageRank. Returns one score per node index; scores sum to 1.
pub fn pagerank<N>(graph: &UnGraph<N, f64>) -> Vec<f64> {
    let n = graph.node_count();
    if n == 0 {
        return Vec::new();
    }
    let uniform = 1.0 / n as f64;
    let mut ranks = vec![uniform; n];

    // Total incident weight per node; isolated nodes redistribute uniformly
    let strength: Vec<f64> = graph
        .node_indices()
        .map(|i| graph.edges(i).map(|e| *e.weight()).sum::<f64>())
        .collect();

    for _ in 0..PAGERANK_ITERATIONS {
        let mut next = vec![(1.0 - DAMPING) * uniform; n];
        let mut dangling = 0.0;
        for i in graph.node_indices() {
            let idx = i.index();
            if strength[idx] <= 0.0 {
                dangling += DAMPING * ranks[idx];
                continue;
            }
            for edge in graph.edges(i) {
                let j = edge.target().index();
                let share = *edge.weight() / strength[idx];
                next[j] += DAMPING * ranks[idx] * share;
            }
        }
        let dangling_share = dangling / n as f64;
        for value in next.iter_mut() {
            *value += dangling_share;
        }
        let delta: f64 = next.iter().zip(&ranks).map(|(a, b)| (a - b).abs()).sum();
        ranks = next;
        if delta < PAGERANK_EPSILON {
            break;
        }
    }
    ranks
}

/// Brandes betweenness centrality (unweighted shortest paths, undirected),
/// normalized by `(n-1)(n-2)/2` for graphs with more than two nodes.
pub fn betweenness_centrality<N>(graph: &UnGraph<N, f64>) -> Vec<f64> {
    let n = graph.node_count();
    let mut centrality = vec![0.0; n];
    if n < 3 {
        return centrality;
    }

    for s in graph.node_indices() {
        // Single-source shortest paths (BFS)
        let mut stack: Vec<NodeIndex> = Vec::new();
        let mut predecessors: Vec<Vec<NodeIndex>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0f64; n];
        let mut distance = vec![-1i64; n];
        sigma[s.index()] = 1.0;
        distance[s.index()] = 0;

        let mut queue = VecDeque::new();
        queue.push_back(s);
        while let Some(v) = queue.pop_front() {
            stack.push(v);
            for w in graph.neighbors(v) {
                if distance[w.index()] < 0 {
                    distance[w.index()] = distance[v.index()] + 1;
                    queue.push_back(w);
                }
                if distance[w.index()] == distance[v.index()] + 1 {
                    sigma[w.index()] += sigma[v.index()];
                    predecessors[w.index()].push(v);
                }
            }
        }

        // Accumulation
        let mut delta = vec![0.0f64; n];
        while let Some(w) = stack.pop() {
            for &v in &predecessors[w.index()] {
                delta[v.index()] +=
                    (sigma[v.index()] / sigma[w.index()]) * (1.0 + delta[w.index()]);
            }
            if w != s {
                centrality[w.index()] += delta[w.index()];
            }
        }
    }

    // Undirected: every pair counted twice; normalize to [0,1]
    let scale = ((n - 1) * (n - 2)) as f64;
    for value in centrality.iter_mut() {
        *value /= scale;
    }
    centrality
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_graph(n: usize) -> UnGraph<usize, f64> {
        let mut graph = UnGraph::new_undirected();
        let nodes: Vec<_> = (0..n).map(|i| graph.add_node(i)).collect();
        for w in nodes.windows(2) {
            graph.add_edge(w[0], w[1], 1.0);
        }
        graph
    }

    #[test]
    fn pagerank_sums_to_one() {
        let graph = path_graph(5);
        let ranks = pagerank(&graph);
        let total: f64 = ranks.iter().sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn pagerank_favors_hub() {
        // Star: center connected to 4 leaves
        let mut graph = UnGraph::new_undirected();
        let center = graph.add_node(0usize);
        for i in 1..5 {
            let leaf = graph.add_node(i);
            graph.add_edge(center, leaf, 1.0);
        }
        let ranks = pagerank(&graph);
        assert!(ranks[center.index()] > ranks[1]);
    }

    #[test]
    fn pagerank_empty_graph_is_empty() {
        let graph: UnGraph<usize, f64> = UnGraph::new_undirected();
        assert!(pagerank(&graph).is_empty());
    }

    #[test]
    fn betweenness_peaks_at_path_middle() {
        let graph = path_graph(5);
        let centrality = betweenness_centrality(&graph);
        let middle = centrality[2];
        assert!(middle > centrality[0]);
        assert!(middle > centrality[4]);
        assert!(middle > centrality[1]);
    }

    #[test]
    fn betweenness_zero_for_tiny_graphs() {
        let graph = path_graph(2);
        assert!(betweenness_centrality(&graph).iter().all(|&b| b == 0.0));
    }
}
