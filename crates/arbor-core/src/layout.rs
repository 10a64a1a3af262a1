//! Forest layout for the graph-style conversation view.
//!
//! Runs on the full node/edge forest, independent of branch filtering
//! and windowing. The input is supposed to be a forest; the traversal
//! defends against duplicate and cyclic edges instead of assuming it.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::Anomaly;

pub type NodeId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    User,
    Assistant,
    Tool,
    System,
}

/// Per-node metrics carried through to the visualization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeMetrics {
    pub cost_usd: f64,
    pub tokens: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<NodeId>,
    pub kind: NodeKind,
    #[serde(default)]
    pub sidechain: bool,
    #[serde(default)]
    pub metrics: NodeMetrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Reply,
    Sidechain,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    pub kind: EdgeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Geometry constants for [`layout`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    /// Horizontal distance between adjacent leaf slots.
    pub sibling_spacing: f32,
    /// Vertical distance per depth level.
    pub level_height: f32,
    /// Extra horizontal gap between disconnected subtrees.
    pub root_gap: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            sibling_spacing: 160.0,
            level_height: 120.0,
            root_gap: 240.0,
        }
    }
}

/// Result of a layout pass: one position per node, plus any structural
/// anomalies skipped over on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub positions: HashMap<NodeId, Point>,
    pub anomalies: Vec<Anomaly>,
}

/// Lay out a forest with the default geometry. See [`layout_with`].
pub fn layout(nodes: &[Node], edges: &[Edge]) -> Layout {
    layout_with(nodes, edges, &LayoutConfig::default())
}

/// Assign 2D coordinates to every node.
///
/// Explicit-stack post-order traversal from the roots (nodes with no
/// incoming edge): each leaf takes the next horizontal slot at fixed
/// spacing, an internal node is centered over the span of its placed
/// children, and `y` is depth times the level height. A visited guard
/// places each node exactly once, so duplicate or cyclic edges degrade
/// to a skipped edge and an [`Anomaly::CycleDetected`] instead of
/// revisiting or looping. Disconnected roots advance left-to-right with
/// `root_gap` between their subtree spans.
pub fn layout_with(nodes: &[Node], edges: &[Edge], config: &LayoutConfig) -> Layout {
    let known: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();

    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut has_incoming: HashSet<&str> = HashSet::new();
    for edge in edges {
        if !known.contains(edge.source.as_str()) || !known.contains(edge.target.as_str()) {
            tracing::debug!(
                target: "arbor.layout",
                "edge {} -> {} references an unknown node; skipped",
                edge.source,
                edge.target
            );
            continue;
        }
        children
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
        has_incoming.insert(edge.target.as_str());
    }

    let mut state = Walk {
        children: &children,
        config,
        positions: HashMap::with_capacity(nodes.len()),
        visited: HashSet::with_capacity(nodes.len()),
        anomalies: Vec::new(),
        next_slot: 0.0,
    };

    let mut first_tree = true;
    for node in nodes {
        if has_incoming.contains(node.id.as_str()) {
            continue;
        }
        if !first_tree {
            state.next_slot += config.root_gap;
        }
        first_tree = false;
        state.place_subtree(&node.id);
    }

    // Nodes only reachable through a cycle have incoming edges but no
    // root above them; sweep them so every id gets a position.
    for node in nodes {
        if !state.visited.contains(node.id.as_str()) {
            if !first_tree {
                state.next_slot += config.root_gap;
            }
            first_tree = false;
            state.place_subtree(&node.id);
        }
    }

    Layout {
        positions: state.positions,
        anomalies: state.anomalies,
    }
}

enum Frame<'a> {
    Enter { id: &'a str, depth: usize },
    Exit { id: &'a str, depth: usize },
}

struct Walk<'a> {
    children: &'a HashMap<&'a str, Vec<&'a str>>,
    config: &'a LayoutConfig,
    positions: HashMap<NodeId, Point>,
    visited: HashSet<&'a str>,
    anomalies: Vec<Anomaly>,
    next_slot: f32,
}

impl<'a> Walk<'a> {
    fn place_subtree(&mut self, root: &'a str) {
        let mut stack = vec![Frame::Enter { id: root, depth: 0 }];

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter { id, depth } => {
                    if !self.visited.insert(id) {
                        tracing::warn!(
                            target: "arbor.layout",
                            "edge into {id} revisits an already placed node; skipped"
                        );
                        self.anomalies.push(Anomaly::CycleDetected {
                            id: id.to_string(),
                        });
                        continue;
                    }
                    stack.push(Frame::Exit { id, depth });
                    if let Some(kids) = self.children.get(id) {
                        for child in kids.iter().rev().copied() {
                            stack.push(Frame::Enter {
                                id: child,
                                depth: depth + 1,
                            });
                        }
                    }
                }
                Frame::Exit { id, depth } => {
                    let x = self.subtree_center(id).unwrap_or_else(|| {
                        let slot = self.next_slot;
                        self.next_slot = slot + self.config.sibling_spacing;
                        slot
                    });
                    self.positions.insert(
                        id.to_string(),
                        Point {
                            x,
                            y: depth as f32 * self.config.level_height,
                        },
                    );
                }
            }
        }
    }

    /// Midpoint of the placed children's span, or `None` when the node
    /// has none (a leaf, or every child was claimed by another path).
    fn subtree_center(&self, id: &str) -> Option<f32> {
        let kids = self.children.get(id)?;
        let mut min_x = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        for child in kids {
            if let Some(pos) = self.positions.get(*child) {
                min_x = min_x.min(pos.x);
                max_x = max_x.max(pos.x);
            }
        }
        (min_x <= max_x).then_some((min_x + max_x) / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str) -> Node {
        Node {
            id: id.to_string(),
            parent_id: None,
            kind: NodeKind::User,
            sidechain: false,
            metrics: NodeMetrics::default(),
        }
    }

    fn edge(source: &str, target: &str) -> Edge {
        Edge {
            source: source.to_string(),
            target: target.to_string(),
            kind: EdgeKind::Reply,
        }
    }

    fn pos<'a>(layout: &'a Layout, id: &str) -> &'a Point {
        layout.positions.get(id).unwrap()
    }

    #[test]
    fn chain_descends_one_level_per_edge() {
        let nodes = [node("a"), node("b"), node("c")];
        let edges = [edge("a", "b"), edge("b", "c")];
        let layout = layout(&nodes, &edges);

        let config = LayoutConfig::default();
        assert_eq!(pos(&layout, "a").y, 0.0);
        assert_eq!(pos(&layout, "b").y, config.level_height);
        assert_eq!(pos(&layout, "c").y, 2.0 * config.level_height);
        // Single-child chain stays on one vertical line.
        assert_eq!(pos(&layout, "a").x, pos(&layout, "c").x);
        assert!(layout.anomalies.is_empty());
    }

    #[test]
    fn parent_is_centered_over_children() {
        let nodes = [node("a"), node("b"), node("c")];
        let edges = [edge("a", "b"), edge("a", "c")];
        let layout = layout(&nodes, &edges);

        let mid = (pos(&layout, "b").x + pos(&layout, "c").x) / 2.0;
        assert_eq!(pos(&layout, "a").x, mid);
        assert!(pos(&layout, "b").x < pos(&layout, "c").x);
    }

    #[test]
    fn disconnected_roots_never_overlap() {
        let nodes = [node("a"), node("b"), node("c"), node("d")];
        let edges = [edge("a", "b"), edge("c", "d")];
        let layout = layout(&nodes, &edges);

        let first_max = pos(&layout, "a").x.max(pos(&layout, "b").x);
        let second_min = pos(&layout, "c").x.min(pos(&layout, "d").x);
        assert!(
            second_min >= first_max + LayoutConfig::default().root_gap,
            "second tree must start past the first tree's span"
        );
    }

    #[test]
    fn duplicate_edge_places_each_node_once() {
        let nodes = [node("a"), node("b")];
        let edges = [edge("a", "b"), edge("a", "b")];
        let layout = layout(&nodes, &edges);

        assert_eq!(layout.positions.len(), 2);
        assert_eq!(
            layout.anomalies,
            [Anomaly::CycleDetected {
                id: "b".to_string()
            }]
        );
    }

    #[test]
    fn cycle_terminates_and_covers_every_node() {
        // a -> b -> a: no node is free of incoming edges, so the sweep
        // has to pick the cycle up.
        let nodes = [node("a"), node("b")];
        let edges = [edge("a", "b"), edge("b", "a")];
        let layout = layout(&nodes, &edges);

        assert_eq!(layout.positions.len(), 2);
        assert!(
            layout
                .anomalies
                .contains(&Anomaly::CycleDetected { id: "a".to_string() })
        );
    }

    #[test]
    fn self_loop_is_skipped() {
        let nodes = [node("a")];
        let edges = [edge("a", "a")];
        let layout = layout(&nodes, &edges);

        assert_eq!(layout.positions.len(), 1);
        assert_eq!(
            layout.anomalies,
            [Anomaly::CycleDetected {
                id: "a".to_string()
            }]
        );
    }

    #[test]
    fn edge_to_unknown_node_is_ignored() {
        let nodes = [node("a")];
        let edges = [edge("a", "ghost")];
        let layout = layout(&nodes, &edges);

        assert_eq!(layout.positions.len(), 1);
        assert!(layout.anomalies.is_empty());
    }

    #[test]
    fn isolated_nodes_are_separate_roots() {
        let nodes = [node("a"), node("b")];
        let layout = layout(&nodes, &[]);

        assert_eq!(layout.positions.len(), 2);
        assert_eq!(pos(&layout, "a").y, 0.0);
        assert_eq!(pos(&layout, "b").y, 0.0);
        assert_ne!(pos(&layout, "a").x, pos(&layout, "b").x);
    }
}
