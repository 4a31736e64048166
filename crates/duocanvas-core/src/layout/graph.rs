//! Internal graph representation: indexing, components, cycle breaking, ranks.

use super::{LayoutEdge, LayoutNode, LayoutOptions};
use kurbo::Size;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::unionfind::UnionFind;
use std::collections::{HashMap, HashSet};

/// Nodes and edges resolved to dense indices in input order.
pub(super) struct IndexedGraph<'a> {
    ids: Vec<&'a str>,
    sizes: Vec<Size>,
    /// Deduplicated, self-loop-free edges in input order.
    edges: Vec<(usize, usize)>,
}

impl<'a> IndexedGraph<'a> {
    pub fn build(nodes: &'a [LayoutNode], edges: &[LayoutEdge], options: &LayoutOptions) -> Self {
        let mut index: HashMap<&'a str, usize> = HashMap::with_capacity(nodes.len());
        let mut ids = Vec::with_capacity(nodes.len());
        let mut sizes = Vec::with_capacity(nodes.len());

        for node in nodes {
            if index.contains_key(node.id.as_str()) {
                log::warn!("Duplicate layout node id {:?}, keeping first occurrence", node.id);
                continue;
            }
            index.insert(node.id.as_str(), ids.len());
            ids.push(node.id.as_str());
            sizes.push(node.resolved_size(options));
        }

        let mut seen: HashSet<(usize, usize)> = HashSet::with_capacity(edges.len());
        let mut resolved = Vec::with_capacity(edges.len());
        for edge in edges {
            let (Some(&u), Some(&v)) = (
                index.get(edge.source.as_str()),
                index.get(edge.target.as_str()),
            ) else {
                log::warn!(
                    "Edge {:?} -> {:?} references a node that is not in the layout, ignoring",
                    edge.source,
                    edge.target
                );
                continue;
            };
            if u == v {
                log::debug!("Ignoring self-loop on {:?}", edge.source);
                continue;
            }
            if seen.insert((u, v)) {
                resolved.push((u, v));
            }
        }

        Self {
            ids,
            sizes,
            edges: resolved,
        }
    }

    pub fn id(&self, index: usize) -> &'a str {
        self.ids[index]
    }

    /// Split into weakly connected components, ordered by their first member.
    pub fn components(&self) -> Vec<Component> {
        let n = self.ids.len();
        let mut sets = UnionFind::<usize>::new(n);
        for &(u, v) in &self.edges {
            sets.union(u, v);
        }

        let mut slot_of_root: HashMap<usize, usize> = HashMap::new();
        let mut members: Vec<Vec<usize>> = Vec::new();
        let mut component_of = vec![0usize; n];
        for (node, component) in component_of.iter_mut().enumerate() {
            let root = sets.find(node);
            let slot = *slot_of_root.entry(root).or_insert_with(|| {
                members.push(Vec::new());
                members.len() - 1
            });
            members[slot].push(node);
            *component = slot;
        }

        let mut edges_by_component: Vec<Vec<(usize, usize)>> = vec![Vec::new(); members.len()];
        for &(u, v) in &self.edges {
            edges_by_component[component_of[u]].push((u, v));
        }

        members
            .into_iter()
            .zip(edges_by_component)
            .map(|(members, edges)| Component::new(members, &edges, &self.sizes))
            .collect()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    Active,
    Done,
}

/// One connected component with local indices and an acyclic edge set.
pub(super) struct Component {
    /// Global node indices, in input order. Local index `i` is `members[i]`.
    pub members: Vec<usize>,
    pub sizes: Vec<Size>,
    /// Successors after back-edge removal.
    pub succ: Vec<Vec<usize>>,
    /// Predecessors after back-edge removal.
    pub pred: Vec<Vec<usize>>,
}

impl Component {
    fn new(members: Vec<usize>, edges: &[(usize, usize)], sizes: &[Size]) -> Self {
        let local: HashMap<usize, usize> = members
            .iter()
            .enumerate()
            .map(|(local, &global)| (global, local))
            .collect();

        let n = members.len();
        let mut succ = vec![Vec::new(); n];
        for &(u, v) in edges {
            succ[local[&u]].push(local[&v]);
        }

        let succ = break_cycles(&succ);
        let mut pred = vec![Vec::new(); n];
        for (u, targets) in succ.iter().enumerate() {
            for &v in targets {
                pred[v].push(u);
            }
        }

        Self {
            sizes: members.iter().map(|&g| sizes[g]).collect(),
            members,
            succ,
            pred,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Longest-path rank of every node, measured from the sources.
    pub fn ranks(&self) -> Vec<usize> {
        let n = self.len();
        let mut dag = DiGraph::<(), ()>::with_capacity(n, self.succ.iter().map(Vec::len).sum());
        for _ in 0..n {
            dag.add_node(());
        }
        for (u, targets) in self.succ.iter().enumerate() {
            for &v in targets {
                dag.add_edge(NodeIndex::new(u), NodeIndex::new(v), ());
            }
        }

        let mut ranks = vec![0usize; n];
        match toposort(&dag, None) {
            Ok(order) => {
                for node in order {
                    let u = node.index();
                    for &v in &self.succ[u] {
                        ranks[v] = ranks[v].max(ranks[u] + 1);
                    }
                }
            }
            Err(cycle) => {
                log::warn!(
                    "Cycle through local node {} survived back-edge removal, flattening ranks",
                    cycle.node_id().index()
                );
            }
        }
        ranks
    }
}

/// Drop every DFS back-edge so the remaining edges form a DAG.
///
/// DFS roots are the in-degree-0 nodes first, then every remaining node, both
/// in index order, so the result depends only on input order.
fn break_cycles(succ: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let n = succ.len();
    let mut in_degree = vec![0usize; n];
    for targets in succ {
        for &v in targets {
            in_degree[v] += 1;
        }
    }

    let roots = (0..n)
        .filter(|&v| in_degree[v] == 0)
        .chain(0..n);

    let mut state = vec![Visit::New; n];
    let mut kept: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for root in roots {
        if state[root] != Visit::New {
            continue;
        }
        state[root] = Visit::Active;
        stack.push((root, 0));

        while let Some(frame) = stack.last_mut() {
            let node = frame.0;
            if frame.1 < succ[node].len() {
                let child = succ[node][frame.1];
                frame.1 += 1;
                match state[child] {
                    Visit::New => {
                        kept[node].push(child);
                        state[child] = Visit::Active;
                        stack.push((child, 0));
                    }
                    Visit::Active => {
                        log::debug!("Removing back-edge {} -> {} to break a cycle", node, child);
                    }
                    Visit::Done => kept[node].push(child),
                }
            } else {
                state[node] = Visit::Done;
                stack.pop();
            }
        }
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph<'a>(nodes: &'a [LayoutNode], edges: &[(&str, &str)]) -> IndexedGraph<'a> {
        let edges: Vec<LayoutEdge> = edges.iter().map(|(s, t)| LayoutEdge::new(*s, *t)).collect();
        IndexedGraph::build(nodes, &edges, &LayoutOptions::default())
    }

    #[test]
    fn test_ranks_follow_longest_path() {
        let nodes: Vec<LayoutNode> = ["A", "B", "C", "D"].iter().map(|id| LayoutNode::new(*id)).collect();
        // A->D is short, A->B->C->D is long; D must sit below C.
        let g = graph(&nodes, &[("A", "D"), ("A", "B"), ("B", "C"), ("C", "D")]);
        let components = g.components();
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].ranks(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_back_edge_removed() {
        let succ = vec![vec![1], vec![2], vec![0]];
        let dag = break_cycles(&succ);
        assert_eq!(dag, vec![vec![1], vec![2], vec![]]);
    }

    #[test]
    fn test_cycle_with_source_roots_at_source() {
        // S -> B -> C -> B: the DFS starts from S, so C -> B is the back-edge.
        let succ = vec![vec![1], vec![2], vec![1]];
        let dag = break_cycles(&succ);
        assert_eq!(dag, vec![vec![1], vec![2], vec![]]);
    }

    #[test]
    fn test_cross_edges_kept() {
        // 0 -> 1, 0 -> 2, 2 -> 1: 2 -> 1 is a cross edge, not a back-edge.
        let succ = vec![vec![1, 2], vec![], vec![1]];
        let dag = break_cycles(&succ);
        assert_eq!(dag, succ);
    }

    #[test]
    fn test_components_in_input_order() {
        let nodes: Vec<LayoutNode> = ["A", "B", "C", "D"].iter().map(|id| LayoutNode::new(*id)).collect();
        let g = graph(&nodes, &[("C", "B")]);
        let components = g.components();
        let members: Vec<Vec<usize>> = components.iter().map(|c| c.members.clone()).collect();
        assert_eq!(members, vec![vec![0], vec![1, 2], vec![3]]);
    }

    #[test]
    fn test_self_loops_and_duplicates_dropped() {
        let nodes: Vec<LayoutNode> = ["A", "B"].iter().map(|id| LayoutNode::new(*id)).collect();
        let g = graph(&nodes, &[("A", "A"), ("A", "B"), ("A", "B")]);
        assert_eq!(g.edges, vec![(0, 1)]);
    }
}
