//! Positional addressing of nodes.
//!
//! A path is a sequence of `/tag[n]` segments where `n` is the 1-based index
//! among preceding siblings with the same tag. Paths are relative to some
//! ancestor (the active fragment root in practice); the empty path names
//! that ancestor itself. Lookups accept bare `tag` (index 1) and `*[n]`
//! (any tag) segments as well.

use crate::markup::Node;

/// One resolved step: an index into a node's children.
pub type Position = Vec<usize>;

/// Builds the path of the node reached by following `position` from `root`.
pub fn node_to_path(root: &Node, position: &[usize]) -> Option<String> {
    let mut path = String::new();
    let mut current = root;
    for &idx in position {
        let child = current.children.get(idx)?;
        let n = current.children[..idx]
            .iter()
            .filter(|sib| sib.is(&child.tag))
            .count()
            + 1;
        path.push('/');
        path.push_str(&child.tag.to_ascii_lowercase());
        path.push('[');
        path.push_str(&n.to_string());
        path.push(']');
        current = child;
    }
    Some(path)
}

#[derive(Debug, PartialEq, Eq)]
struct Segment<'a> {
    tag: Option<&'a str>,
    index: usize,
}

fn parse_segment(segment: &str) -> Option<Segment<'_>> {
    let (tag, index) = match segment.split_once('[') {
        Some((tag, rest)) => {
            let n = rest.strip_suffix(']')?.trim().parse::<usize>().ok()?;
            (tag.trim(), n)
        }
        None => (segment.trim(), 1),
    };
    if tag.is_empty() || index == 0 {
        return None;
    }
    Some(Segment {
        tag: (tag != "*").then_some(tag),
        index,
    })
}

/// Resolves `path` against `root` into child indices. `None` when any
/// segment is malformed or names no node.
pub fn path_to_position(path: &str, root: &Node) -> Option<Position> {
    let mut position = Vec::new();
    let mut current = root;
    for raw in path.split('/').filter(|s| !s.is_empty()) {
        let segment = parse_segment(raw)?;
        let (idx, child) = current
            .children
            .iter()
            .enumerate()
            .filter(|(_, c)| segment.tag.is_none_or(|t| c.is(t)))
            .nth(segment.index - 1)?;
        position.push(idx);
        current = child;
    }
    Some(position)
}

pub fn path_to_node<'a>(path: &str, root: &'a Node) -> Option<&'a Node> {
    let position = path_to_position(path, root)?;
    node_at(root, &position)
}

pub fn node_at<'a>(root: &'a Node, position: &[usize]) -> Option<&'a Node> {
    position
        .iter()
        .try_fold(root, |node, &idx| node.children.get(idx))
}

pub fn node_at_mut<'a>(root: &'a mut Node, position: &[usize]) -> Option<&'a mut Node> {
    position
        .iter()
        .try_fold(root, |node, &idx| node.children.get_mut(idx))
}

/// Joins a parent path and a child segment.
pub fn join(parent: &str, segment: &str) -> String {
    format!("{}/{}", parent.trim_end_matches('/'), segment.trim_start_matches('/'))
}
