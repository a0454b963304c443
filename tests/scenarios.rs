use pretty_assertions::assert_eq;
use serde_json::json;
use window_designer::error::PlacementRule;
use window_designer::outline::{OutlineEntry, outline};
use window_designer::path::{node_to_path, path_to_node, path_to_position};
use window_designer::placement::validate;
use window_designer::scaffold::{Scaffold, TemplateScaffold};
use window_designer::{EditError, Project, ProjectError, package, registry};

const METADATA: &str = r#"{"name": "Scenario", "className": "ApplicationScenario", "mime": [], "preload": []}"#;

fn project() -> Project {
    Project::from_sources(
        r#"<div><application-window data-id="main"></application-window></div>"#,
        METADATA,
    )
    .unwrap()
}

fn paths(entry: &OutlineEntry, out: &mut Vec<String>) {
    out.push(entry.path.clone());
    for child in &entry.children {
        paths(child, out);
    }
}

#[test]
fn test_placement_is_deterministic_for_every_pair() {
    let kinds: Vec<&str> = registry().kinds().collect();
    assert!(kinds.len() > 40);
    for child in &kinds {
        for parent in &kinds {
            assert_eq!(validate(child, parent), validate(child, parent));
        }
    }
}

#[test]
fn test_edits_survive_save_and_load() {
    let mut p = project();
    let hbox = p.insert_child("", "gui-hbox").unwrap();
    let left = format!("{hbox}/gui-hbox-container[1]");
    let right = format!("{hbox}/gui-hbox-container[2]");
    let button = p.insert_child(&left, "gui-button").unwrap();
    let label = p.insert_child(&right, "gui-label").unwrap();
    assert!(p.set_property(&button, "label", "Save & <close>"));
    assert!(p.set_property(&label, "id", "status"));
    let moved = p.move_node(&label, &button, false).unwrap();
    assert_eq!(moved.path, format!("{left}/gui-label[1]"));
    assert!(p.set_property(&hbox, "_size", "3"));
    p.create_fragment("application-window", "about").unwrap();

    let (markup, metadata) = p.save().unwrap();
    let reloaded = Project::from_sources(&markup, &metadata).unwrap();
    assert_eq!(reloaded.tree(), p.tree());
    assert_eq!(reloaded.fragments(), p.fragments());
    assert_eq!(reloaded.metadata, p.metadata);
    assert_eq!(
        reloaded.get_property(&format!("{left}/gui-button[1]"), "label"),
        Some(json!("Save & <close>"))
    );
}

#[test]
fn test_delete_twice_is_a_no_op() {
    let mut p = project();
    let vbox = p.insert_child("", "gui-vbox").unwrap();
    assert!(p.delete_node(&vbox));
    let after = p.save().unwrap();
    assert!(!p.delete_node(&vbox));
    assert_eq!(p.save().unwrap(), after);
}

#[test]
fn test_paths_are_stable() {
    let mut p = project();
    let tabs = p.insert_child("", "gui-tabs").unwrap();
    let slot = format!("{tabs}/gui-tab-container[1]");
    p.insert_child(&slot, "gui-button").unwrap();
    p.insert_child(&slot, "gui-button").unwrap();
    p.insert_child(&slot, "gui-label").unwrap();
    p.insert_child("", "gui-button").unwrap();

    let root = p.fragment_root().unwrap();
    let mut all = Vec::new();
    paths(&outline(&p).unwrap(), &mut all);
    assert_eq!(all.len(), 7);
    for path in all.iter().filter(|path| !path.is_empty()) {
        let node = path_to_node(path, root).unwrap();
        let position = path_to_position(path, root).unwrap();
        assert_eq!(node_to_path(root, &position).as_deref(), Some(path.as_str()));
        assert_eq!(p.get_node(path), Some(node));
    }
    assert!(path_to_node("/gui-button[3]", root).is_none());
}

#[test]
fn test_box_size_property() {
    let mut p = project();
    let hbox = p.insert_child("", "gui-hbox").unwrap();
    let count = |p: &Project| p.get_node(&hbox).unwrap().count_children("gui-hbox-container");
    assert_eq!(count(&p), 2);

    assert!(p.set_property(&hbox, "_size", "3"));
    assert_eq!(count(&p), 3);
    assert_eq!(p.get_property(&hbox, "_size"), Some(json!(3)));

    assert!(p.set_property(&hbox, "_size", "0"));
    assert_eq!(count(&p), 0);

    assert!(p.set_property(&hbox, "_size", "many"));
    assert_eq!(count(&p), 0);
}

#[test]
fn test_button_needs_a_tab_container() {
    let mut p = project();
    let tabs = p.insert_child("", "gui-tabs").unwrap();

    let err = p.insert_child(&tabs, "gui-button").unwrap_err();
    let EditError::Rejected(rejected) = &err else {
        panic!("expected a placement rejection, got {err:?}");
    };
    assert_eq!(rejected.rule, PlacementRule::AllowChildren);
    assert!(err.to_string().contains("allowChildren"));
    assert!(err.to_string().contains("gui-tabs"));

    let button = p
        .insert_child(&format!("{tabs}/gui-tab-container[1]"), "gui-button")
        .unwrap();
    let properties = p.effective_properties(&button).unwrap();
    assert_eq!(properties.value("label"), Some(&json!("Button")));
}

#[test]
fn test_removing_first_fragment() {
    let mut p = Project::new("Fragments");
    p.create_fragment("application-window", "main").unwrap();
    p.create_fragment("application-window", "about").unwrap();
    assert!(matches!(
        p.create_fragment("application-window", "main"),
        Err(ProjectError::DuplicateId(_))
    ));
    assert_eq!(p.current_fragment(), 0);

    assert!(p.remove_fragment(0));
    assert_eq!(p.fragments(), &["about".to_string()]);
    assert_eq!(p.current_fragment(), 0);
}

#[test]
fn test_reserved_properties_are_accepted_without_effect() {
    let mut p = project();
    let label = p.insert_child("", "gui-label").unwrap();
    let before = p.save().unwrap();
    let properties = p.effective_properties(&label).unwrap();

    assert!(p.set_property(&label, "_reserved_internal", "anything"));
    assert!(p.set_property("", "_reserved_internal", "anything"));
    assert_eq!(p.save().unwrap(), before);
    assert_eq!(p.effective_properties(&label).unwrap(), properties);
}

#[test]
fn test_new_project_from_template_and_reopen() {
    let template = tempfile::tempdir().unwrap();
    std::fs::write(
        template.path().join(package::METADATA_FILE),
        r#"{"name": "EXAMPLE", "preload": [{"type": "stylesheet", "src": "main.css"}]}"#,
    )
    .unwrap();
    std::fs::write(template.path().join("main.css"), "/* EXAMPLE */").unwrap();
    std::fs::write(
        template.path().join(package::SCHEME_FILE),
        r#"<div><application-window data-id="EXAMPLEWindow"></application-window></div>"#,
    )
    .unwrap();

    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("Notes");
    TemplateScaffold::default()
        .create_project("Notes", template.path(), &dir)
        .unwrap();

    let mut p = package::load(&dir).unwrap();
    assert_eq!(p.name, "Notes");
    assert_eq!(p.current_fragment_id(), Some("NotesWindow"));
    let entry = p.insert_child("", "gui-text").unwrap();
    assert!(p.set_property(&entry, "placeholder", "Search"));
    package::save(&p).unwrap();

    let reopened = package::load(&dir).unwrap();
    assert_eq!(reopened.tree(), p.tree());
    assert_eq!(
        reopened.get_property("/gui-text[1]", "placeholder"),
        Some(json!("Search"))
    );
}

#[test]
fn test_padded_and_blank_labels_reload_unchanged() {
    let mut p = project();
    let ok = p.insert_child("", "gui-button").unwrap();
    let blank = p.insert_child("", "gui-button").unwrap();
    assert!(p.set_property(&ok, "label", "  OK  "));
    assert!(p.set_property(&blank, "label", "   "));
    assert!(p.insert_child(&ok, "gui-label").is_err());

    let (markup, metadata) = p.save().unwrap();
    let reloaded = Project::from_sources(&markup, &metadata).unwrap();
    assert_eq!(reloaded.tree(), p.tree());
    assert_eq!(reloaded.get_property(&ok, "label"), Some(json!("OK")));
    assert_eq!(reloaded.get_property(&blank, "label"), p.get_property(&blank, "label"));
    assert!(reloaded.get_node(&ok).unwrap().children.is_empty());
}
