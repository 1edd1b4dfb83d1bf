//! Cycle Detection
//!
//! Three-color depth-first search over registered dependencies:
//!
//! - Unvisited: not reached yet
//! - Visiting: on the current DFS path
//! - Visited: fully explored, known not to lead back into the current path
//!
//! Reaching a Visiting node means the current path loops back on itself.
//!
//! The search keeps its own stack of frames instead of recursing, so a long
//! dependency chain cannot overflow the thread stack.

use super::builder::{Adjacency, NodeTable};
use crate::registry::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Unvisited,
    Visiting,
    Visited,
}

struct Frame {
    node: usize,
    dependencies: Adjacency,
    cursor: usize,
}

impl Frame {
    fn new(table: &NodeTable, node: usize) -> Self {
        Self {
            node,
            dependencies: table.dependency_indices(node),
            cursor: 0,
        }
    }
}

/// Check whether the table contains no dependency cycle.
pub(crate) fn is_acyclic(table: &NodeTable) -> bool {
    find_cycle(table).is_none()
}

/// Find one dependency cycle, returned as a closed path.
///
/// For `a -> b -> a` (a depends on b, b depends on a) this returns
/// `[a, b, a]`. Dangling references never participate in a cycle.
pub(crate) fn find_cycle(table: &NodeTable) -> Option<Vec<NodeId>> {
    let mut color = vec![Color::Unvisited; table.len()];

    for root in 0..table.len() {
        if color[root] != Color::Unvisited {
            continue;
        }

        color[root] = Color::Visiting;
        let mut stack = vec![Frame::new(table, root)];

        while let Some(frame) = stack.last_mut() {
            if frame.cursor < frame.dependencies.len() {
                let next = frame.dependencies[frame.cursor];
                frame.cursor += 1;

                match color[next] {
                    Color::Unvisited => {
                        color[next] = Color::Visiting;
                        stack.push(Frame::new(table, next));
                    }
                    Color::Visiting => return Some(close_path(table, &stack, next)),
                    Color::Visited => {}
                }
            } else {
                color[frame.node] = Color::Visited;
                stack.pop();
            }
        }
    }

    None
}

fn close_path(table: &NodeTable, stack: &[Frame], repeated: usize) -> Vec<NodeId> {
    let start = stack
        .iter()
        .position(|frame| frame.node == repeated)
        .unwrap_or(0);

    stack[start..]
        .iter()
        .map(|frame| frame.node)
        .chain(std::iter::once(repeated))
        .filter_map(|index| table.node_at(index).map(|node| node.id().clone()))
        .collect()
}
