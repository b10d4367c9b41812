use slab::Slab;
use std::collections::VecDeque;
use std::fmt::{Display, Formatter};
use std::ops::{Index, IndexMut};
use tinyvec::TinyVec;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeIndex(usize);

impl Display for NodeIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SearchContinuation {
    Continue,
    Stop,
}

#[derive(Default)]
struct Adjacency {
    parents: TinyVec<[usize; 4]>,
    children: TinyVec<[usize; 4]>,
    rank: usize,
}

struct Node<T> {
    value: T,
    adjacency: Adjacency,
}

/// Every node's rank is greater than the rank of each of its parents.
pub struct Graph<T> {
    nodes: Slab<Node<T>>,
}

impl<T> Graph<T> {
    pub fn new() -> Self {
        Graph { nodes: Slab::new() }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, node: NodeIndex) -> bool {
        self.nodes.contains(node.0)
    }

    pub fn add_node(&mut self, value: T) -> NodeIndex {
        NodeIndex(self.nodes.insert(Node {
            value,
            adjacency: Adjacency::default(),
        }))
    }

    pub fn remove_node(&mut self, node: NodeIndex) -> T {
        let removed = self.nodes.remove(node.0);
        for parent in removed.adjacency.parents.iter() {
            if let Some(p) = self.nodes.get_mut(*parent) {
                p.adjacency.children.retain(|c| *c != node.0);
            }
        }
        for child in removed.adjacency.children.iter() {
            if let Some(c) = self.nodes.get_mut(*child) {
                c.adjacency.parents.retain(|p| *p != node.0);
            }
        }
        removed.value
    }

    pub fn add_edge(&mut self, parent: NodeIndex, child: NodeIndex) {
        assert_ne!(parent, child, "Dependency cycle on node {}", parent);
        let parent_rank = self.node(parent).adjacency.rank;
        {
            let p = self.node_mut(parent);
            if p.adjacency.children.contains(&child.0) {
                return;
            }
            p.adjacency.children.push(child.0);
        }
        self.node_mut(child).adjacency.parents.push(parent.0);
        self.raise_rank(child, parent_rank + 1);
    }

    pub fn rank(&self, node: NodeIndex) -> usize {
        self.node(node).adjacency.rank
    }

    /// Breadth-first walk over the descendants of `node`, not including
    /// `node` itself. Children of a node for which `visit` returned
    /// `Stop` are not entered from there.
    pub fn search_children_mut<F: FnMut(NodeIndex, &mut T) -> SearchContinuation>(
        &mut self,
        mut visit: F,
        node: NodeIndex,
    ) {
        let mut queue: VecDeque<usize> = self.node(node).adjacency.children.iter().copied().collect();
        while let Some(current) = queue.pop_front() {
            let n = &mut self.nodes[current];
            if visit(NodeIndex(current), &mut n.value) == SearchContinuation::Continue {
                queue.extend(n.adjacency.children.iter().copied());
            }
        }
    }

    fn raise_rank(&mut self, node: NodeIndex, rank: usize) {
        let mut queue = VecDeque::new();
        queue.push_back((node.0, rank));
        while let Some((current, rank)) = queue.pop_front() {
            let n = &mut self.nodes[current];
            if n.adjacency.rank >= rank {
                continue;
            }
            assert!(
                rank <= self.nodes.len(),
                "Dependency cycle through node {}",
                NodeIndex(current)
            );
            let n = &mut self.nodes[current];
            n.adjacency.rank = rank;
            queue.extend(n.adjacency.children.iter().map(|c| (*c, rank + 1)));
        }
    }

    fn node(&self, node: NodeIndex) -> &Node<T> {
        self.nodes
            .get(node.0)
            .unwrap_or_else(|| panic!("Node {} not found in graph", node))
    }

    fn node_mut(&mut self, node: NodeIndex) -> &mut Node<T> {
        self.nodes
            .get_mut(node.0)
            .unwrap_or_else(|| panic!("Node {} not found in graph", node))
    }
}

impl<T> Default for Graph<T> {
    fn default() -> Self {
        Graph::new()
    }
}

impl<T> Index<NodeIndex> for Graph<T> {
    type Output = T;

    fn index(&self, index: NodeIndex) -> &T {
        &self.node(index).value
    }
}

impl<T> IndexMut<NodeIndex> for Graph<T> {
    fn index_mut(&mut self, index: NodeIndex) -> &mut T {
        &mut self.node_mut(index).value
    }
}
