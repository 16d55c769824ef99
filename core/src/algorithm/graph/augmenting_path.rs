//! Shortest augmenting path search and augmentation
//!
//! Breadth-first search over the residual graph yields the augmenting path
//! with the fewest arcs; ties are broken by BFS discovery order, which is the
//! insertion order of the residual adjacency. Each vertex is visited at most
//! once, so one search costs O(V + E).
//!
//! Augmentation pushes the path's bottleneck back onto the base graph,
//! locating every base edge through its endpoint pair.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::VecDeque;

use log::trace;

use crate::algorithm::graph::residual::{ResidualArc, ResidualGraph};
use crate::algorithm::traits::{Capacity, NodeId};
use crate::data_structures::graph::Graph;

/// Ordered residual arcs from `begin` to `end`; empty when no path exists
pub type AugmentingPath = Vec<ResidualArc>;

/// Reusable BFS state for repeated path searches
#[derive(Debug, Clone, Default)]
pub struct PathSearch {
    /// Residual arc that first reached each vertex
    parent: Vec<Option<ResidualArc>>,
    visited: Vec<bool>,
    queue: VecDeque<NodeId>,
    /// Vertices dequeued by the most recent search
    explored: usize,
}

impl PathSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Vertices dequeued by the most recent search
    pub fn explored(&self) -> usize {
        self.explored
    }

    /// Finds the shortest (fewest arcs) path from `begin` to `end`
    pub fn shortest_path(
        &mut self,
        residual: &ResidualGraph,
        begin: NodeId,
        end: NodeId,
    ) -> AugmentingPath {
        let n = residual.node_count();
        self.explored = 0;
        if begin == end || begin.as_usize() >= n || end.as_usize() >= n {
            return AugmentingPath::new();
        }

        self.parent.clear();
        self.parent.resize(n, None);
        self.visited.clear();
        self.visited.resize(n, false);
        self.queue.clear();

        self.visited[begin.as_usize()] = true;
        self.queue.push_back(begin);

        while let Some(node) = self.queue.pop_front() {
            self.explored += 1;
            if node == end {
                break;
            }
            for arc in residual.arcs_from(node) {
                let next = arc.to.as_usize();
                if !self.visited[next] {
                    self.visited[next] = true;
                    self.parent[next] = Some(*arc);
                    self.queue.push_back(arc.to);
                }
            }
        }

        if !self.visited[end.as_usize()] {
            return AugmentingPath::new();
        }

        let mut path = AugmentingPath::new();
        let mut cursor = end;
        while cursor != begin {
            match self.parent[cursor.as_usize()] {
                Some(arc) => {
                    path.push(arc);
                    cursor = arc.from;
                }
                None => unreachable!("visited vertex {} has no parent arc", cursor),
            }
        }
        path.reverse();
        path
    }
}

/// One-shot shortest augmenting path search
pub fn shortest_augmenting_path(
    residual: &ResidualGraph,
    begin: NodeId,
    end: NodeId,
) -> AugmentingPath {
    PathSearch::new().shortest_path(residual, begin, end)
}

/// Minimum residual value along the path
pub fn bottleneck(path: &[ResidualArc]) -> Capacity {
    path.iter().map(|arc| arc.value).min().unwrap_or(0)
}

/// Applies the path's bottleneck to the base graph and returns it.
///
/// # Panics
/// On an empty path, a non-positive bottleneck, a missing base edge, or a
/// resulting flow outside `[lwb, capacity]`. All of these mean the path was
/// not derived from the current state of `graph`.
pub fn augment(graph: &mut Graph, path: &[ResidualArc]) -> Capacity {
    let amount = bottleneck(path);
    assert!(amount > 0, "augmenting path has non-positive bottleneck {}", amount);

    for arc in path {
        let (prev, next) = arc.base_endpoints();
        let id = graph
            .find_edge(prev, next)
            .unwrap_or_else(|| panic!("no base edge {} -> {} for residual arc", prev, next));
        let edge = graph.edge_mut(id);
        if arc.back {
            edge.flow -= amount;
        } else {
            edge.flow += amount;
        }
        edge.assert_within_bounds();
    }

    trace!("augmented {} units along {} arcs", amount, path.len());
    amount
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::graph::{Edge, Vertex};

    fn plain_graph(n: usize, edges: &[(usize, usize, Capacity)]) -> Graph {
        let mut graph = Graph::new();
        for _ in 0..n {
            graph.add_vertex(Vertex::with_demand(0));
        }
        for &(u, v, c) in edges {
            graph.add_edge(Edge::new(NodeId(u), NodeId(v), c)).unwrap();
        }
        graph
    }

    #[test]
    fn test_bfs_prefers_fewest_arcs() {
        // 0 -> 1 -> 2 -> 3 and 0 -> 3 directly
        let graph = plain_graph(4, &[(0, 1, 5), (1, 2, 5), (2, 3, 5), (0, 3, 1)]);
        let residual = ResidualGraph::from_graph(&graph);

        let path = shortest_augmenting_path(&residual, NodeId(0), NodeId(3));
        assert_eq!(path.len(), 1);
        assert_eq!(path[0].to, NodeId(3));
        assert_eq!(bottleneck(&path), 1);
    }

    #[test]
    fn test_ties_follow_insertion_order() {
        let graph = plain_graph(4, &[(0, 2, 1), (0, 1, 1), (1, 3, 1), (2, 3, 1)]);
        let residual = ResidualGraph::from_graph(&graph);

        let path = shortest_augmenting_path(&residual, NodeId(0), NodeId(3));
        let hops: Vec<NodeId> = path.iter().map(|arc| arc.to).collect();
        assert_eq!(hops, vec![NodeId(2), NodeId(3)]);
    }

    #[test]
    fn test_no_path_is_empty() {
        let graph = plain_graph(3, &[(0, 1, 1)]);
        let residual = ResidualGraph::from_graph(&graph);

        assert!(shortest_augmenting_path(&residual, NodeId(0), NodeId(2)).is_empty());
        assert!(shortest_augmenting_path(&residual, NodeId(0), NodeId(0)).is_empty());
        assert!(shortest_augmenting_path(&residual, NodeId(0), NodeId(9)).is_empty());
        assert_eq!(bottleneck(&[]), 0);
    }

    #[test]
    fn test_search_state_is_reusable() {
        let graph = plain_graph(3, &[(0, 1, 1), (1, 2, 1)]);
        let residual = ResidualGraph::from_graph(&graph);
        let mut search = PathSearch::new();

        let first = search.shortest_path(&residual, NodeId(0), NodeId(2));
        let second = search.shortest_path(&residual, NodeId(0), NodeId(2));
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert_eq!(search.explored(), 3);
    }

    #[test]
    fn test_augment_forward_and_backward() {
        // classic cancellation: 0->1->2->3 saturated, then 0->2 and 1->3 open up
        let mut graph = plain_graph(
            4,
            &[(0, 1, 1), (0, 2, 1), (1, 2, 1), (1, 3, 1), (2, 3, 1)],
        );
        let forced = vec![
            ResidualArc { from: NodeId(0), to: NodeId(1), value: 1, back: false },
            ResidualArc { from: NodeId(1), to: NodeId(2), value: 1, back: false },
            ResidualArc { from: NodeId(2), to: NodeId(3), value: 1, back: false },
        ];
        assert_eq!(augment(&mut graph, &forced), 1);

        let residual = ResidualGraph::from_graph(&graph);
        let path = shortest_augmenting_path(&residual, NodeId(0), NodeId(3));
        assert!(path.iter().any(|arc| arc.back));
        assert_eq!(augment(&mut graph, &path), 1);

        let mid = graph.find_edge(NodeId(1), NodeId(2)).unwrap();
        assert_eq!(graph.edge(mid).flow, 0);
        assert_eq!(graph.net_outflow(NodeId(0)), 2);
    }

    #[test]
    #[should_panic(expected = "no base edge")]
    fn test_augment_missing_base_edge_panics() {
        let mut graph = plain_graph(2, &[]);
        let path = vec![ResidualArc { from: NodeId(0), to: NodeId(1), value: 1, back: false }];
        augment(&mut graph, &path);
    }

    #[test]
    #[should_panic(expected = "non-positive bottleneck")]
    fn test_augment_empty_path_panics() {
        let mut graph = plain_graph(2, &[(0, 1, 1)]);
        augment(&mut graph, &[]);
    }
}
