//! Structure tree of the active fragment, as listed in the inspector.

use crate::markup::Node;
use crate::path::join;
use crate::project::Project;
use crate::schema::registry;

/// Icon of the fragment root entry.
pub const WINDOW_ICON: &str = "widget-gtk-window.png";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutlineEntry {
    pub label: String,
    pub kind: String,
    /// Path relative to the fragment root; empty for the root itself.
    pub path: String,
    pub icon: String,
    pub is_container: bool,
    /// Shows another fragment instead of owning content.
    pub external: bool,
    pub children: Vec<OutlineEntry>,
}

impl OutlineEntry {
    /// Depth-first search by path.
    pub fn find(&self, path: &str) -> Option<&OutlineEntry> {
        if self.path == path {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(path))
    }

    /// Number of entries in this subtree, including itself.
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(OutlineEntry::len).sum::<usize>()
    }
}

/// Outline of the project's active fragment, or `None` without fragments.
pub fn outline(project: &Project) -> Option<OutlineEntry> {
    let root = project.fragment_root()?;
    let kind = root.tag.to_ascii_lowercase();
    Some(OutlineEntry {
        label: project.current_fragment_id().unwrap_or_default().to_string(),
        is_container: registry().resolve(&kind).is_container(),
        external: false,
        kind,
        path: String::new(),
        icon: WINDOW_ICON.to_string(),
        children: children_of(root, ""),
    })
}

fn children_of(node: &Node, parent_path: &str) -> Vec<OutlineEntry> {
    let mut seen: Vec<(&str, usize)> = Vec::new();
    node.children
        .iter()
        .map(|child| {
            let kind = child.tag.to_ascii_lowercase();
            let n = match seen.iter_mut().find(|(t, _)| t.eq_ignore_ascii_case(&child.tag)) {
                Some((_, count)) => {
                    *count += 1;
                    *count
                }
                None => {
                    seen.push((child.tag.as_str(), 1));
                    1
                }
            };
            let path = join(parent_path, &format!("{kind}[{n}]"));
            let desc = registry().resolve(&kind);
            let label = match child.id() {
                Some(id) if !id.is_empty() => format!("{kind} ({id})"),
                _ => kind.clone(),
            };
            let children = if desc.special {
                Vec::new()
            } else {
                children_of(child, &path)
            };
            OutlineEntry {
                label,
                icon: desc.icon.clone(),
                is_container: desc.is_container(),
                external: desc.external,
                kind,
                path,
                children,
            }
        })
        .collect()
}
