//! The project document model.
//!
//! A project owns one element tree whose root holds one child per fragment
//! (top-level window definition). Every structural or property edit is
//! addressed by a path relative to the currently selected fragment root;
//! the empty path (or `/`) names that root. Edits report failure through
//! their return values and never leave the tree half-changed.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::{EditError, PlacementRejected, ProjectError};
use crate::events::{DesignerEvent, EventQueue};
use crate::markup::{self, Node};
use crate::path::{self, Position, node_at, node_at_mut, node_to_path};
use crate::placement;
use crate::properties::{PropertySheet, project_properties};
use crate::schema::registry;

/// Tag of the document root that holds the fragments.
pub const ROOT_TAG: &str = "div";

/// One file loaded alongside the application.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreloadEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub src: String,
}

impl PreloadEntry {
    /// MIME type used when opening the entry in a file browser.
    pub fn mime(&self) -> &'static str {
        match self.kind.as_str() {
            "stylesheet" => "text/css",
            "javascript" => "application/javascript",
            _ => "text/plain",
        }
    }

    /// Remote sources are referenced, not copied.
    pub fn is_remote(&self) -> bool {
        ["http:", "https:", "ftp:"]
            .iter()
            .any(|scheme| self.src.starts_with(scheme))
    }
}

/// Package metadata (`metadata.json`). Unknown keys are kept in `extra` and
/// written back unchanged.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Metadata {
    pub name: String,
    pub class_name: String,
    pub icon: String,
    pub category: String,
    pub singular: bool,
    pub mime: Vec<String>,
    pub preload: Vec<PreloadEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of a successful [`Project::move_node`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Path of the moved node at its new position.
    pub path: String,
    /// Set when the move into a container was refused and the node was
    /// placed as a sibling instead.
    pub fallback: Option<PlacementRejected>,
}

#[derive(Debug)]
pub struct Project {
    pub name: String,
    /// Directory the project was loaded from or last saved to.
    pub path: Option<PathBuf>,
    pub metadata: Metadata,
    tree: Node,
    fragments: Vec<String>,
    current_fragment: usize,
    events: EventQueue,
}

impl Default for Project {
    fn default() -> Self {
        Self::new("Unknown")
    }
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            metadata: Metadata {
                name: name.clone(),
                ..Default::default()
            },
            name,
            path: None,
            tree: Node::new(ROOT_TAG),
            fragments: Vec::new(),
            current_fragment: 0,
            events: EventQueue::default(),
        }
    }

    /// Builds a project from persisted sources.
    pub fn from_sources(markup: &str, metadata: &str) -> Result<Self, ProjectError> {
        let mut project = Self::default();
        project.load(markup, metadata)?;
        Ok(project)
    }

    /// Replaces the document and metadata. Nothing is adopted unless both
    /// parse.
    pub fn load(&mut self, markup: &str, metadata: &str) -> Result<(), ProjectError> {
        let metadata: Metadata = serde_json::from_str(metadata).map_err(ProjectError::Metadata)?;
        let tree = markup::parse(markup)?;

        self.name = metadata.name.clone();
        self.metadata = metadata;
        self.tree = tree;
        self.current_fragment = 0;
        self.refresh_fragments();
        info!(name = %self.name, fragments = self.fragments.len(), "project loaded");
        self.emit_fragments();
        Ok(())
    }

    /// Serializes the document and metadata. Does not touch the model.
    pub fn save(&self) -> Result<(String, String), ProjectError> {
        let markup = self.tree.to_markup();
        let metadata =
            serde_json::to_string_pretty(&self.metadata).map_err(ProjectError::Serialize)?;
        Ok((markup, metadata))
    }

    pub fn tree(&self) -> &Node {
        &self.tree
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn current_fragment(&self) -> usize {
        self.current_fragment
    }

    pub fn current_fragment_id(&self) -> Option<&str> {
        self.fragments.get(self.current_fragment).map(String::as_str)
    }

    /// Root node of the active fragment.
    pub fn fragment_root(&self) -> Option<&Node> {
        self.tree.children.get(self.current_fragment)
    }

    fn refresh_fragments(&mut self) {
        self.fragments = self
            .tree
            .children
            .iter()
            .map(|f| f.id().unwrap_or_default().to_string())
            .collect();
        if self.current_fragment >= self.fragments.len() {
            self.current_fragment = 0;
        }
    }

    fn emit_fragments(&mut self) {
        self.events.push(DesignerEvent::FragmentListChanged {
            fragments: self.fragments.clone(),
            current: self.current_fragment,
        });
    }

    /// Appends a new fragment root of `kind` identified by `id`.
    pub fn create_fragment(&mut self, kind: &str, id: &str) -> Result<(), ProjectError> {
        if self.fragments.iter().any(|f| f == id) {
            return Err(ProjectError::DuplicateId(id.to_string()));
        }
        self.tree.children.push(Node::new(kind).with_data("id", id));
        self.refresh_fragments();
        debug!(kind, id, "fragment created");
        self.emit_fragments();
        Ok(())
    }

    /// Removes the fragment at `index`. Removing the selected fragment
    /// selects the first one; removing an earlier one keeps the same
    /// fragment selected.
    pub fn remove_fragment(&mut self, index: usize) -> bool {
        if index >= self.tree.children.len() {
            return false;
        }
        self.tree.children.remove(index);
        if index == self.current_fragment {
            self.current_fragment = 0;
        } else if index < self.current_fragment {
            self.current_fragment -= 1;
        }
        self.refresh_fragments();
        debug!(index, "fragment removed");
        self.emit_fragments();
        true
    }

    pub fn select_fragment(&mut self, index: usize) -> bool {
        if index >= self.fragments.len() {
            return false;
        }
        self.current_fragment = index;
        self.emit_fragments();
        true
    }

    /// Absolute position of `path` in the document tree.
    fn resolve(&self, path: &str) -> Option<Position> {
        let root = self.fragment_root()?;
        let mut position = vec![self.current_fragment];
        position.extend(path::path_to_position(path, root)?);
        Some(position)
    }

    /// Path of an absolute position, relative to the active fragment.
    fn path_of(&self, position: &[usize]) -> Option<String> {
        let root = self.fragment_root()?;
        node_to_path(root, position.get(1..)?)
    }

    pub fn get_node(&self, path: &str) -> Option<&Node> {
        node_at(&self.tree, &self.resolve(path)?)
    }

    pub fn is_fragment_root(&self, path: &str) -> bool {
        self.resolve(path).is_some_and(|p| p.len() == 1)
    }

    /// Creates a `kind` node under the node at `parent_path` and returns the
    /// new node's path. Refused placements leave the tree untouched.
    pub fn insert_child(&mut self, parent_path: &str, kind: &str) -> Result<String, EditError> {
        let mut position = self
            .resolve(parent_path)
            .ok_or_else(|| EditError::not_found(parent_path))?;
        let parent_kind = self.kind_at(&position, parent_path)?;
        self.check_placement(kind, &parent_kind)?;

        // Proxy containers host children in their first sub-container.
        let mut host_kind = parent_kind;
        while let Some(sub) = registry().resolve(&host_kind).sub_container()
            && !sub.eq_ignore_ascii_case(kind)
        {
            let Some(host) = node_at(&self.tree, &position) else {
                break;
            };
            let Some(idx) = host.children.iter().position(|c| c.is(sub)) else {
                break;
            };
            position.push(idx);
            host_kind = sub.to_string();
            self.check_placement(kind, &host_kind)?;
        }

        let host = node_at_mut(&mut self.tree, &position)
            .ok_or_else(|| EditError::not_found(parent_path))?;
        let node = registry().instantiate(kind, Some(&*host));
        host.children.push(node);
        position.push(host.children.len() - 1);

        let path = self
            .path_of(&position)
            .ok_or_else(|| EditError::not_found(parent_path))?;
        debug!(path = %path, kind, "element inserted");
        Ok(path)
    }

    fn kind_at(&self, position: &[usize], path: &str) -> Result<String, EditError> {
        node_at(&self.tree, position)
            .map(|n| n.tag.to_ascii_lowercase())
            .ok_or_else(|| EditError::not_found(path))
    }

    fn check_placement(&mut self, child: &str, parent: &str) -> Result<(), EditError> {
        placement::validate_drop(child, parent).map_err(|rejected| {
            self.events.push(DesignerEvent::PlacementRejected {
                reason: rejected.to_string(),
            });
            EditError::Rejected(rejected)
        })
    }

    /// Detaches the node at `path`. Fragment roots are removed with
    /// [`Project::remove_fragment`] instead.
    pub fn delete_node(&mut self, path: &str) -> bool {
        let Some(mut position) = self.resolve(path) else {
            return false;
        };
        if position.len() < 2 {
            return false;
        }
        let Some(idx) = position.pop() else {
            return false;
        };
        let Some(parent) = node_at_mut(&mut self.tree, &position) else {
            return false;
        };
        let removed = parent.children.remove(idx);
        debug!(path, kind = %removed.tag, "element deleted");
        true
    }

    /// Moves the node at `src` either into the node at `dest` (appended as
    /// last child) or, when `as_child_of` is false, right before it.
    ///
    /// A refused move into a container falls back to sibling placement and
    /// reports the rejection in [`MoveOutcome::fallback`].
    pub fn move_node(
        &mut self,
        src: &str,
        dest: &str,
        as_child_of: bool,
    ) -> Result<MoveOutcome, EditError> {
        let src_pos = self.resolve(src).ok_or_else(|| EditError::not_found(src))?;
        let mut dest_pos = self.resolve(dest).ok_or_else(|| EditError::not_found(dest))?;

        if src_pos.len() < 2 {
            return Err(EditError::InvalidMove("cannot move a fragment root".into()));
        }
        if dest_pos.starts_with(&src_pos) {
            return Err(EditError::InvalidMove(format!(
                "cannot move `{src}` into itself"
            )));
        }

        let src_kind = self.kind_at(&src_pos, src)?;
        let dest_kind = self.kind_at(&dest_pos, dest)?;

        let mut fallback = None;
        let mut into = as_child_of;
        if as_child_of && let Err(EditError::Rejected(r)) = self.check_placement(&src_kind, &dest_kind)
        {
            fallback = Some(r);
            into = false;
        }

        if !into && dest_pos.len() < 2 {
            return Err(match fallback {
                Some(r) => EditError::Rejected(r),
                None => EditError::InvalidMove("cannot place beside a fragment root".into()),
            });
        }

        // Detach first, then shift the destination if it followed the source
        // under the same parent.
        let depth = src_pos.len() - 1;
        let node = {
            let parent = node_at_mut(&mut self.tree, &src_pos[..depth])
                .ok_or_else(|| EditError::not_found(src))?;
            parent.children.remove(src_pos[depth])
        };
        if dest_pos.len() > depth
            && dest_pos[..depth] == src_pos[..depth]
            && dest_pos[depth] > src_pos[depth]
        {
            dest_pos[depth] -= 1;
        }

        let new_pos = if into {
            let parent =
                node_at_mut(&mut self.tree, &dest_pos).ok_or_else(|| EditError::not_found(dest))?;
            parent.children.push(node);
            let mut p = dest_pos;
            p.push(parent.children.len() - 1);
            p
        } else {
            let (&idx, parent_pos) = dest_pos
                .split_last()
                .ok_or_else(|| EditError::not_found(dest))?;
            let parent =
                node_at_mut(&mut self.tree, parent_pos).ok_or_else(|| EditError::not_found(dest))?;
            parent.children.insert(idx.min(parent.children.len()), node);
            dest_pos
        };

        let path = self.path_of(&new_pos).ok_or_else(|| EditError::not_found(dest))?;
        debug!(from = src, to = %path, kind = %src_kind, fallback = fallback.is_some(), "element moved");
        Ok(MoveOutcome { path, fallback })
    }

    /// Effective property set of the node at `path`.
    pub fn effective_properties(&self, path: &str) -> Option<PropertySheet> {
        let position = self.resolve(path)?;
        let node = node_at(&self.tree, &position)?;
        let kind = node.tag.to_ascii_lowercase();
        let id = if position.len() == 1 {
            self.current_fragment_id()
        } else {
            node.id()
        };
        Some(project_properties(Some(node), &kind, id))
    }

    pub fn get_property(&self, path: &str, property: &str) -> Option<Value> {
        self.effective_properties(path)?.value(property).cloned()
    }

    /// Writes `property` on the node at `path`. Reserved names are accepted
    /// without effect unless the kind handles them itself.
    pub fn set_property(&mut self, path: &str, property: &str, value: &str) -> bool {
        let Some(position) = self.resolve(path) else {
            return false;
        };
        if position.len() == 1 && property == "id" && !self.is_free_fragment_id(position[0], value) {
            debug!(path, value, "fragment id refused");
            return false;
        }
        let Some(node) = node_at_mut(&mut self.tree, &position) else {
            return false;
        };
        let kind = node.tag.to_ascii_lowercase();
        let accepted = registry().update_property(node, &kind, property, value);
        debug!(path, kind = %kind, property, value, accepted, "property set");

        if accepted {
            if position.len() == 1 && property == "id" {
                self.refresh_fragments();
                self.emit_fragments();
            }
            self.emit_properties(path, &kind);
        }
        accepted
    }

    /// Fragment ids are non-empty and unique; `index` may keep its own.
    fn is_free_fragment_id(&self, index: usize, id: &str) -> bool {
        !id.trim().is_empty()
            && !self
                .fragments
                .iter()
                .enumerate()
                .any(|(i, f)| i != index && f == id)
    }

    /// Removes the stored value of `property` so its default applies again.
    /// A fragment root keeps its id.
    pub fn clear_property(&mut self, path: &str, property: &str) -> bool {
        if markup::is_reserved_property(property) {
            return true;
        }
        let Some(position) = self.resolve(path) else {
            return false;
        };
        if position.len() == 1 && property == "id" {
            return false;
        }
        let Some(node) = node_at_mut(&mut self.tree, &position) else {
            return false;
        };
        let kind = node.tag.to_ascii_lowercase();
        let desc = registry().resolve(&kind);
        if property == "label" && desc.has_inner_label {
            node.text = None;
        } else {
            node.remove_attribute(&markup::attribute_name(property));
        }
        debug!(path, kind = %kind, property, "property cleared");
        self.emit_properties(path, &kind);
        true
    }

    fn emit_properties(&mut self, path: &str, kind: &str) {
        if let Some(properties) = self.effective_properties(path) {
            self.events.push(DesignerEvent::PropertiesChanged {
                path: path.to_string(),
                kind: kind.to_string(),
                properties,
            });
        }
    }

    /// Marks the node at `path` as the inspector's subject.
    pub fn select_element(&mut self, path: &str) -> bool {
        let Some(kind) = self.get_node(path).map(|n| n.tag.to_ascii_lowercase()) else {
            return false;
        };
        self.events.push(DesignerEvent::ElementSelected {
            path: path.to_string(),
            kind: kind.clone(),
        });
        self.emit_properties(path, &kind);
        true
    }

    /// Where a selection of the node at `path` should land in a rendered
    /// view. Kinds with a selection rewrite (select options) map to their
    /// rendered counterpart; all others keep `path`.
    pub fn selection_target(&self, path: &str) -> Option<String> {
        let position = self.resolve(path)?;
        let node = node_at(&self.tree, &position)?;
        let desc = registry().resolve(&node.tag);
        let Some(query) = desc.select_query else {
            return Some(path.to_string());
        };
        let (&idx, parent_pos) = position.split_last()?;
        let parent = node_at(&self.tree, parent_pos)?;
        let index = parent.children[..idx]
            .iter()
            .filter(|c| c.is(&node.tag))
            .count();
        Some(query(index, path))
    }

    pub fn drain_events(&mut self) -> Vec<DesignerEvent> {
        self.events.drain().collect()
    }

    /// Merges `partial` into the metadata. Refused (and nothing changes)
    /// when a known key has the wrong type.
    pub fn apply_metadata(&mut self, partial: Map<String, Value>) -> bool {
        let mut merged = match serde_json::to_value(&self.metadata) {
            Ok(Value::Object(map)) => map,
            _ => return false,
        };
        merged.extend(partial);
        match serde_json::from_value::<Metadata>(Value::Object(merged)) {
            Ok(metadata) => {
                self.name = metadata.name.clone();
                self.metadata = metadata;
                debug!(name = %self.name, "metadata applied");
                true
            }
            Err(err) => {
                warn!(error = %err, "metadata rejected");
                false
            }
        }
    }

    pub fn add_mime(&mut self, mime: &str) {
        self.metadata.mime.push(mime.to_string());
    }

    pub fn remove_mime(&mut self, index: usize) -> bool {
        if index >= self.metadata.mime.len() {
            return false;
        }
        self.metadata.mime.remove(index);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlacementRule;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const METADATA: &str = r#"{
        "name": "Example",
        "className": "ApplicationExample",
        "icon": "apps/example.png",
        "category": "other",
        "singular": false,
        "mime": ["text/plain"],
        "preload": [{"type": "javascript", "src": "main.js"}],
        "compability": ["canvas"]
    }"#;

    fn project() -> Project {
        Project::from_sources(
            r#"<div><application-window data-id="main"></application-window></div>"#,
            METADATA,
        )
        .unwrap()
    }

    #[test]
    fn test_load_reads_fragments_and_metadata() {
        let mut p = project();
        assert_eq!(p.name, "Example");
        assert_eq!(p.fragments(), &["main".to_string()]);
        assert_eq!(p.current_fragment(), 0);
        assert_eq!(p.metadata.preload[0].mime(), "application/javascript");
        assert_eq!(p.metadata.extra.get("compability"), Some(&json!(["canvas"])));

        let events = p.drain_events();
        assert!(matches!(
            &events[..],
            [DesignerEvent::FragmentListChanged { current: 0, .. }]
        ));
    }

    #[test]
    fn test_failed_load_keeps_previous_state() {
        let mut p = project();
        let before = p.save().unwrap();

        assert!(matches!(
            p.load("<div><application-window></div>", METADATA),
            Err(ProjectError::Parse(_))
        ));
        assert!(matches!(
            p.load("<div></div>", "{ not json"),
            Err(ProjectError::Metadata(_))
        ));
        assert!(matches!(
            p.load("<div></div>", r#"{"mime": "text/plain"}"#),
            Err(ProjectError::Metadata(_))
        ));
        assert_eq!(p.save().unwrap(), before);
    }

    #[test]
    fn test_save_keeps_unknown_metadata_keys() {
        let p = project();
        let (markup, metadata) = p.save().unwrap();
        assert_eq!(markup, r#"<div><application-window data-id="main"></application-window></div>"#);
        let value: Value = serde_json::from_str(&metadata).unwrap();
        assert_eq!(value["className"], json!("ApplicationExample"));
        assert_eq!(value["compability"], json!(["canvas"]));
        assert_eq!(value["preload"][0]["type"], json!("javascript"));
    }

    #[test]
    fn test_fragment_management() {
        let mut p = project();
        p.create_fragment("application-window", "about").unwrap();
        assert!(matches!(
            p.create_fragment("application-window", "about"),
            Err(ProjectError::DuplicateId(id)) if id == "about"
        ));
        assert_eq!(p.fragments(), &["main".to_string(), "about".to_string()]);

        assert!(p.select_fragment(1));
        assert_eq!(p.current_fragment_id(), Some("about"));
        assert!(!p.select_fragment(2));

        assert!(p.remove_fragment(0));
        assert_eq!(p.fragments(), &["about".to_string()]);
        assert_eq!(p.current_fragment(), 0);
        assert_eq!(p.current_fragment_id(), Some("about"));
        assert!(!p.remove_fragment(3));
    }

    #[test]
    fn test_insert_child_applies_defaults_and_rejects() {
        let mut p = project();
        let tabs = p.insert_child("", "gui-tabs").unwrap();
        assert_eq!(tabs, "/gui-tabs[1]");

        let err = p.insert_child(&tabs, "gui-button").unwrap_err();
        assert!(matches!(
            &err,
            EditError::Rejected(r) if r.rule == PlacementRule::AllowChildren
        ));
        assert_eq!(p.get_node(&tabs).unwrap().children.len(), 1);

        let button = p.insert_child("/gui-tabs[1]/gui-tab-container[1]", "gui-button").unwrap();
        assert_eq!(button, "/gui-tabs[1]/gui-tab-container[1]/gui-button[1]");
        assert_eq!(p.get_property(&button, "label"), Some(json!("Button")));

        assert!(matches!(
            p.insert_child("/gui-nothing[1]", "gui-button"),
            Err(EditError::NotFound { .. })
        ));

        let rejected = p
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, DesignerEvent::PlacementRejected { .. }))
            .count();
        assert_eq!(rejected, 1);
    }

    #[test]
    fn test_insert_sub_container_into_proxy() {
        let mut p = project();
        let hbox = p.insert_child("", "gui-hbox").unwrap();
        let slot = p.insert_child(&hbox, "gui-hbox-container").unwrap();
        assert_eq!(slot, "/gui-hbox[1]/gui-hbox-container[3]");
        assert_eq!(p.get_property(&hbox, "_size"), Some(json!(3)));
    }

    #[test]
    fn test_delete_node_is_idempotent() {
        let mut p = project();
        let label = p.insert_child("", "gui-label").unwrap();
        assert!(p.delete_node(&label));
        let after = p.save().unwrap();
        assert!(!p.delete_node(&label));
        assert_eq!(p.save().unwrap(), after);
        assert!(!p.delete_node(""));
    }

    #[test]
    fn test_move_node_into_container_and_as_sibling() {
        let mut p = project();
        let vbox = p.insert_child("", "gui-vbox").unwrap();
        let label = p.insert_child("", "gui-label").unwrap();
        let button = p.insert_child("", "gui-button").unwrap();
        assert_eq!(label, "/gui-label[1]");

        let slot = format!("{vbox}/gui-vbox-container[1]");
        let moved = p.move_node(&label, &slot, true).unwrap();
        assert_eq!(moved.path, "/gui-vbox[1]/gui-vbox-container[1]/gui-label[1]");
        assert_eq!(moved.fallback, None);

        let moved = p.move_node(&button, &vbox, false).unwrap();
        assert_eq!(moved.path, "/gui-button[1]");
        let root = p.fragment_root().unwrap();
        assert_eq!(root.children[0].tag, "gui-button");
        assert_eq!(root.children[1].tag, "gui-vbox");
    }

    #[test]
    fn test_move_node_falls_back_to_sibling() {
        let mut p = project();
        let tabs = p.insert_child("", "gui-tabs").unwrap();
        let label = p.insert_child("", "gui-label").unwrap();
        assert_eq!(label, "/gui-label[1]");

        let moved = p.move_node(&label, &tabs, true).unwrap();
        assert_eq!(moved.path, "/gui-label[1]");
        assert_eq!(
            moved.fallback.map(|r| r.rule),
            Some(PlacementRule::AllowChildren)
        );
        let root = p.fragment_root().unwrap();
        assert_eq!(root.children[0].tag, "gui-label");
        assert_eq!(root.children[1].tag, "gui-tabs");
    }

    #[test]
    fn test_move_node_shifts_destination_after_detach() {
        let mut p = project();
        let first = p.insert_child("", "gui-label").unwrap();
        p.insert_child("", "gui-button").unwrap();
        p.insert_child("", "gui-statusbar").unwrap();

        let moved = p.move_node(&first, "/gui-statusbar[1]", false).unwrap();
        assert_eq!(moved.path, "/gui-label[1]");
        let tags: Vec<&str> = p
            .fragment_root()
            .unwrap()
            .children
            .iter()
            .map(|c| c.tag.as_str())
            .collect();
        assert_eq!(tags, vec!["gui-button", "gui-label", "gui-statusbar"]);
    }

    #[test]
    fn test_move_node_refuses_invalid_moves() {
        let mut p = project();
        let vbox = p.insert_child("", "gui-vbox").unwrap();
        let slot = format!("{vbox}/gui-vbox-container[1]");

        assert!(matches!(
            p.move_node(&vbox, &slot, true),
            Err(EditError::InvalidMove(_))
        ));
        assert!(matches!(
            p.move_node("", &vbox, false),
            Err(EditError::InvalidMove(_))
        ));
        assert!(matches!(
            p.move_node(&vbox, "", false),
            Err(EditError::InvalidMove(_))
        ));
        assert!(matches!(
            p.move_node("/gui-label[4]", &vbox, true),
            Err(EditError::NotFound { .. })
        ));
    }

    #[test]
    fn test_set_property_paths() {
        let mut p = project();
        let button = p.insert_child("", "gui-button").unwrap();

        assert!(p.set_property(&button, "label", "Save"));
        assert_eq!(p.get_node(&button).unwrap().text(), "Save");
        assert!(!p.set_property(&button, "nonsense", "1"));
        assert!(!p.set_property("/gui-button[9]", "label", "x"));

        let before = p.get_node(&button).unwrap().clone();
        assert!(p.set_property(&button, "_reserved_internal", "anything"));
        assert_eq!(p.get_node(&button).unwrap(), &before);
    }

    #[test]
    fn test_setting_root_id_renames_fragment() {
        let mut p = project();
        assert!(p.set_property("", "id", "primary"));
        assert_eq!(p.fragments(), &["primary".to_string()]);
        assert_eq!(p.get_property("/", "id"), Some(json!("primary")));
    }

    #[test]
    fn test_fragment_ids_stay_unique() {
        let mut p = project();
        p.create_fragment("application-window", "about").unwrap();
        p.drain_events();

        assert!(!p.set_property("", "id", "about"));
        assert!(!p.set_property("", "id", ""));
        assert!(!p.set_property("", "id", "   "));
        assert!(!p.clear_property("", "id"));
        assert_eq!(p.fragments(), &["main".to_string(), "about".to_string()]);
        assert_eq!(p.fragment_root().unwrap().id(), Some("main"));
        assert!(p.drain_events().is_empty());

        assert!(p.set_property("", "id", "main"));
        assert!(p.set_property("", "id", "primary"));
        assert!(p.create_fragment("application-window", "main").is_ok());
        assert_eq!(
            p.fragments(),
            &["primary".to_string(), "about".to_string(), "main".to_string()]
        );
    }

    #[test]
    fn test_leaf_refuses_children() {
        let mut p = project();
        let label = p.insert_child("", "gui-label").unwrap();
        let before = p.save().unwrap();
        p.drain_events();

        let err = p.insert_child(&label, "gui-button").unwrap_err();
        assert!(matches!(
            &err,
            EditError::Rejected(r) if r.rule == PlacementRule::IsContainer
        ));
        assert_eq!(p.save().unwrap(), before);
        assert!(matches!(
            p.drain_events().as_slice(),
            [DesignerEvent::PlacementRejected { .. }]
        ));
    }

    #[test]
    fn test_move_onto_leaf_places_beside() {
        let mut p = project();
        let button = p.insert_child("", "gui-button").unwrap();
        let label = p.insert_child("", "gui-label").unwrap();

        let moved = p.move_node(&label, &button, true).unwrap();
        assert_eq!(moved.path, "/gui-label[1]");
        assert_eq!(moved.fallback.map(|r| r.rule), Some(PlacementRule::IsContainer));
        let root = p.fragment_root().unwrap();
        let tags: Vec<&str> = root.children.iter().map(|c| c.tag.as_str()).collect();
        assert_eq!(tags, vec!["gui-label", "gui-button"]);
        assert!(root.children[1].children.is_empty());
    }

    #[test]
    fn test_clear_property() {
        let mut p = project();
        let label = p.insert_child("", "gui-label").unwrap();
        assert_eq!(p.get_property(&label, "label"), Some(json!("Label")));
        assert!(p.clear_property(&label, "label"));
        assert_eq!(p.get_property(&label, "label"), Some(json!("")));

        let button = p.insert_child("", "gui-button").unwrap();
        assert!(p.clear_property(&button, "label"));
        assert_eq!(p.get_node(&button).unwrap().text, None);
        assert!(!p.clear_property("/gui-nope[1]", "label"));
    }

    #[test]
    fn test_size_through_project() {
        let mut p = project();
        let hbox = p.insert_child("", "gui-hbox").unwrap();
        assert_eq!(p.get_property(&hbox, "_size"), Some(json!(2)));
        assert!(p.set_property(&hbox, "_size", "3"));
        assert_eq!(p.get_node(&hbox).unwrap().children.len(), 3);
        assert!(p.set_property(&hbox, "_size", "0"));
        assert!(p.get_node(&hbox).unwrap().children.is_empty());
        assert!(p.set_property(&hbox, "_size", "lots"));
        assert!(p.get_node(&hbox).unwrap().children.is_empty());
    }

    #[test]
    fn test_select_element_emits_events() {
        let mut p = project();
        let label = p.insert_child("", "gui-label").unwrap();
        p.drain_events();

        assert!(p.select_element(&label));
        let events = p.drain_events();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            &events[0],
            DesignerEvent::ElementSelected { path, kind } if *path == label && kind == "gui-label"
        ));
        assert!(matches!(&events[1], DesignerEvent::PropertiesChanged { .. }));
        assert!(!p.select_element("/gui-label[2]"));
    }

    #[test]
    fn test_selection_target_rewrites_select_options() {
        let mut p = project();
        let select = p.insert_child("", "gui-select").unwrap();
        p.insert_child(&select, "gui-select-option").unwrap();
        let second = p.insert_child(&select, "gui-select-option").unwrap();
        assert_eq!(
            p.selection_target(&second),
            Some("/gui-select[1]/select/option[2]".to_string())
        );
        assert_eq!(p.selection_target(&select), Some(select.clone()));
    }

    #[test]
    fn test_metadata_editing() {
        let mut p = project();
        let mut partial = Map::new();
        partial.insert("name".into(), json!("Renamed"));
        partial.insert("singular".into(), json!(true));
        assert!(p.apply_metadata(partial));
        assert_eq!(p.name, "Renamed");
        assert!(p.metadata.singular);
        assert_eq!(p.metadata.class_name, "ApplicationExample");

        let mut bad = Map::new();
        bad.insert("mime".into(), json!(12));
        assert!(!p.apply_metadata(bad));
        assert_eq!(p.metadata.mime, vec!["text/plain".to_string()]);

        p.add_mime("text/html");
        assert!(p.remove_mime(0));
        assert_eq!(p.metadata.mime, vec!["text/html".to_string()]);
        assert!(!p.remove_mime(5));
    }

    #[test]
    fn test_preload_entries() {
        let css = PreloadEntry {
            kind: "stylesheet".into(),
            src: "main.css".into(),
        };
        assert_eq!(css.mime(), "text/css");
        assert!(!css.is_remote());

        let remote = PreloadEntry {
            kind: "other".into(),
            src: "https://example.com/lib.js".into(),
        };
        assert_eq!(remote.mime(), "text/plain");
        assert!(remote.is_remote());
    }
}
