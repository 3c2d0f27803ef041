// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Community Detection
//!
//! Modularity-based clustering in the Louvain style: every node starts in its
//! own community, then nodes greedily move to the neighboring community with
//! the highest modularity gain until no move improves modularity. Node order
//! is index order, so results are deterministic for a given graph.

use petgraph::graph::UnGraph;
use petgraph::visit::EdgeRef;
use std::collections::BTreeMap;

const MAX_PASSES: usize = 10;

/// Assigns every node to a community; returns community id → node indices.
/// Community ids are dense, ordered by their smallest member index.
pub fn louvain_communities<N>(graph: &UnGraph<N, f64>) -> BTreeMap<i64, Vec<usize>> {
    let n = graph.node_count();
    let mut result = BTreeMap::new();
    if n == 0 {
        return result;
    }

    let total_weight: f64 = graph.edge_references().map(|e| *e.weight()).sum();
    if total_weight <= 0.0 {
        // No edges: everyone is a singleton
        for (i, idx) in graph.node_indices().enumerate() {
            result.insert(i as i64, vec![idx.index()]);
        }
        return result;
    }
    let two_m = 2.0 * total_weight;

    // strength[i]: total weight incident to node i
    let strength: Vec<f64> = graph
        .node_indices()
        .map(|i| graph.edges(i).map(|e| *e.weight()).sum())
        .collect();

    let mut community: Vec<usize> = (0..n).collect();
    // sigma_tot[c]: total strength of community c
    let mut sigma_tot = strength.clone();

    for _ in 0..MAX_PASSES {
        let mut moved = false;
        for node in graph.node_indices() {
            let i = node.index();
            let current = community[i];

            // Weight from node i to each neighboring community
            let mut links: BTreeMap<usize, f64> = BTreeMap::new();
            for edge in graph.edges(node) {
                let j = edge.target().index();
                if j != i {
                    *links.entry(community[j]).or_insert(0.0) += *edge.weight();
                }
            }

            // Remove i from its community while evaluating moves
            sigma_tot[current] -= strength[i];
            let base_link = links.get(&current).copied().unwrap_or(0.0);
            let base_gain = base_link - sigma_tot[current] * strength[i] / two_m;

            let mut best_community = current;
            let mut best_gain = base_gain;
            for (&candidate, &link_weight) in &links {
                if candidate == current {
                    continue;
                }
                let gain = link_weight - sigma_tot[candidate] * strength[i] / two_m;
                if gain > best_gain + 1e-12 {
                    best_gain = gain;
                    best_community = candidate;
                }
            }

            sigma_tot[best_community] += strength[i];
            if best_community != current {
                community[i] = best_community;
                moved = true;
            }
        }
        if !moved {
            break;
        }
    }

    // Relabel to dense ids ordered by smallest member
    let mut members: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, &c) in community.iter().enumerate() {
        members.entry(c).or_default().push(i);
    }
    let mut groups: Vec<Vec<usize>> = members.into_values().collect();
    groups.sort_by_key(|g| g[0]);
    for (id, group) in groups.into_iter().enumerate() {
        result.insert(id as i64, group);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two triangles joined by one bridge edge.
    fn two_cliques() -> UnGraph<usize, f64> {
        let mut graph = UnGraph::new_undirected();
        let nodes: Vec<_> = (0..6).map(|i| graph.add_node(i)).collect();
        for &(a, b) in &[(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5)] {
            graph.add_edge(nodes[a], nodes[b], 1.0);
        }
        graph.add_edge(nodes[2], nodes[3], 0.1);
        graph
    }

    #[test]
    fn separates_two_cliques() {
        let graph = two_cliques();
        let communities = louvain_communities(&graph);
        assert_eq!(communities.len(), 2);
        let first: &Vec<usize> = communities.get(&0).unwrap();
        assert_eq!(first, &vec![0, 1, 2]);
        assert_eq!(communities.get(&1).unwrap(), &vec![3, 4, 5]);
    }

    #[test]
    fn edgeless_graph_yields_singletons() {
        let mut graph: UnGraph<usize, f64> = UnGraph::new_undirected();
        graph.add_node(0);
        graph.add_node(1);
        let communities = louvain_communities(&graph);
        assert_eq!(communities.len(), 2);
    }

    #[test]
    fn empty_graph_yields_nothing() {
        let graph: UnGraph<usize, f64> = UnGraph::new_undirected();
        assert!(louvain_communities(&graph).is_empty());
    }

    #[test]
    fn assignment_is_deterministic() {
        let graph = two_cliques();
        assert_eq!(louvain_communities(&graph), louvain_communities(&graph));
    }
}
