use crate::highlight::{Highlighter, code_viewer, indent_markup};
use egui::{Align2, Color32, CornerRadius, FontId, Id, Pos2, Rect, Sense, Stroke, vec2};
use egui_extras::{Column, TableBuilder};
use serde_json::json;
use std::path::PathBuf;
use tracing::{debug, error};
use window_designer::{
    Metadata, Project,
    config::Config,
    error::EditError,
    events::DesignerEvent,
    outline::{OutlineEntry, outline},
    package::{self, FileGroup, project_files},
    placement,
    properties::{Editor, PropertySheet, Unit, UnitValue, display_value, editor_for},
    scaffold::{Scaffold, TemplateScaffold},
    schema::registry,
};

/// Kind of the top-level windows created from the Fragments tab.
const WINDOW_KIND: &str = "application-window";

/// Tabs of the right-hand panel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
enum InspectorTab {
    #[default]
    Structure,
    Properties,
    Fragments,
    Metadata,
    Markup,
}

impl InspectorTab {
    const ALL: [InspectorTab; 5] = [
        InspectorTab::Structure,
        InspectorTab::Properties,
        InspectorTab::Fragments,
        InspectorTab::Metadata,
        InspectorTab::Markup,
    ];

    const fn display_name(&self) -> &'static str {
        match self {
            InspectorTab::Structure => "Structure",
            InspectorTab::Properties => "Properties",
            InspectorTab::Fragments => "Windows",
            InspectorTab::Metadata => "Metadata",
            InspectorTab::Markup => "Markup",
        }
    }
}

/// Which persisted document the markup tab shows
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
enum PreviewDoc {
    #[default]
    Scheme,
    Metadata,
}

/// What is being dragged across the window
#[derive(Clone, Debug, PartialEq, Eq)]
enum Dragging {
    /// A widget kind from the palette
    Kind(String),
    /// An existing element, by path
    Element(String),
}

/// Area an element occupies this frame, in the canvas or the structure list
#[derive(Clone, Debug)]
struct DropTarget {
    rect: Rect,
    path: String,
    kind: String,
    depth: usize,
}

/// Element currently shown in the Properties tab
struct Inspected {
    path: String,
    kind: String,
    properties: PropertySheet,
}

/// Pending edit of one property
struct PropertyDraft {
    path: String,
    name: String,
    editor: Editor,
    text: String,
    unit: UnitValue,
}

enum PropertyAction {
    Apply(String, String, String),
    Clear(String, String),
}

pub(crate) struct DesignerApp {
    config: Config,
    project: Project,
    palette_open: bool,
    /// Selected element path, relative to the active window
    selected: Option<String>,
    inspected: Option<Inspected>,
    draft: Option<PropertyDraft>,
    dragging: Option<Dragging>,
    /// Rebuilt every frame while rendering
    drop_targets: Vec<DropTarget>,
    metadata_draft: Metadata,
    new_mime: String,
    new_fragment_id: String,
    /// Name typed into the "New Project" window while it is open
    new_project: Option<String>,
    status_message: Option<(String, std::time::Instant)>,
    highlighter: Highlighter,
    syntax_highlighting: bool,
    preview_doc: PreviewDoc,
    right_panel_tab: InspectorTab,
}

impl DesignerApp {
    pub(crate) fn new(config: Config) -> Self {
        let mut app = Self {
            project: Project::default(),
            palette_open: true,
            selected: None,
            inspected: None,
            draft: None,
            dragging: None,
            drop_targets: Vec::new(),
            metadata_draft: Metadata::default(),
            new_mime: String::new(),
            new_fragment_id: String::new(),
            new_project: None,
            status_message: None,
            highlighter: Highlighter::new(),
            syntax_highlighting: true,
            preview_doc: PreviewDoc::default(),
            right_panel_tab: InspectorTab::default(),
            config,
        };
        if let Some(dir) = app.config.project.clone() {
            app.open_project(dir);
        }
        app
    }

    /// Set a status message that will auto-clear after a few seconds
    fn set_status(&mut self, msg: String) {
        self.status_message = Some((msg, std::time::Instant::now()));
    }

    fn clear_selection(&mut self) {
        self.selected = None;
        self.inspected = None;
        self.draft = None;
    }

    fn select(&mut self, path: &str) {
        if self.project.select_element(path) {
            self.selected = Some(path.to_string());
            self.draft = None;
        }
    }

    fn adopt(&mut self, project: Project) {
        self.project = project;
        self.metadata_draft = self.project.metadata.clone();
        self.new_fragment_id = self.suggest_fragment_id();
        self.clear_selection();
    }

    fn open_project(&mut self, dir: PathBuf) {
        match package::load(&dir) {
            Ok(project) => {
                self.adopt(project);
                self.set_status(format!("Opened {}", dir.display()));
            }
            Err(err) => {
                error!(path = %dir.display(), error = %err, "open failed");
                self.set_status(format!("Open failed: {err}"));
            }
        }
    }

    fn save_project(&mut self) {
        if self.project.path.is_none() {
            self.save_project_as();
            return;
        }
        match package::save(&self.project) {
            Ok(()) => self.set_status(format!("Saved {}", self.project.name)),
            Err(err) => {
                error!(error = %err, "save failed");
                self.set_status(format!("Save failed: {err}"));
            }
        }
    }

    fn save_project_as(&mut self) {
        let Some(dir) = rfd::FileDialog::new()
            .set_title("Save project into folder")
            .pick_folder()
        else {
            return;
        };
        match package::save_to(&mut self.project, &dir) {
            Ok(()) => self.set_status(format!("Saved to {}", dir.display())),
            Err(err) => {
                error!(path = %dir.display(), error = %err, "save failed");
                self.set_status(format!("Save failed: {err}"));
            }
        }
    }

    fn create_project(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            self.set_status("Project name is empty".into());
            return;
        }
        let destination = self.config.project_dir(name);
        let scaffold = TemplateScaffold::default();
        match scaffold.create_project(name, &self.config.template, &destination) {
            Ok(()) => self.open_project(destination),
            Err(err) => {
                error!(name, error = %err, "scaffold failed");
                self.set_status(format!("Could not create project: {err}"));
            }
        }
    }

    fn delete_selected(&mut self) {
        let Some(path) = self.selected.clone() else {
            return;
        };
        if self.project.delete_node(&path) {
            self.clear_selection();
            self.set_status(format!("Deleted {path}"));
        } else {
            self.set_status("Windows are removed from the Windows tab".into());
        }
    }

    fn insert(&mut self, parent: &str, kind: &str) {
        match self.project.insert_child(parent, kind) {
            Ok(path) => self.select(&path),
            // the model reports refusals as events
            Err(EditError::Rejected(_)) => {}
            Err(err) => self.set_status(err.to_string()),
        }
    }

    fn move_element(&mut self, src: &str, dest: &str, as_child: bool) {
        if src == dest {
            return;
        }
        match self.project.move_node(src, dest, as_child) {
            Ok(outcome) => {
                if let Some(rejected) = outcome.fallback {
                    self.set_status(format!("Placed beside instead: {rejected}"));
                }
                self.select(&outcome.path);
            }
            Err(err) => self.set_status(err.to_string()),
        }
    }

    fn suggest_fragment_id(&self) -> String {
        (1..)
            .map(|n| format!("window{n}"))
            .find(|id| !self.project.fragments().contains(id))
            .unwrap_or_default()
    }

    fn process_events(&mut self) {
        for event in self.project.drain_events() {
            match event {
                DesignerEvent::ElementSelected { path, kind } => {
                    debug!(path = %path, kind = %kind, "element selected");
                    self.selected = Some(path);
                }
                DesignerEvent::PropertiesChanged {
                    path,
                    kind,
                    properties,
                } => {
                    if self.selected.as_deref() == Some(path.as_str()) {
                        self.inspected = Some(Inspected {
                            path,
                            kind,
                            properties,
                        });
                    }
                }
                DesignerEvent::PlacementRejected { reason } => self.set_status(reason),
                DesignerEvent::FragmentListChanged { fragments, current } => {
                    debug!(count = fragments.len(), current, "window list changed");
                    if self
                        .selected
                        .as_deref()
                        .is_some_and(|p| self.project.get_node(p).is_none())
                    {
                        self.clear_selection();
                    }
                }
            }
        }
    }

    fn target_at(&self, pos: Pos2) -> Option<&DropTarget> {
        self.drop_targets
            .iter()
            .filter(|t| t.rect.contains(pos))
            .max_by_key(|t| t.depth)
    }

    /// Selectable, draggable header of an element. Shared by the canvas and
    /// the structure list.
    fn element_button(&mut self, ui: &mut egui::Ui, entry: &OutlineEntry) -> egui::Response {
        let selected = self.selected.as_deref() == Some(entry.path.as_str());
        let path = if entry.path.is_empty() { "/" } else { entry.path.as_str() };
        let r = ui
            .add(
                egui::Button::new(entry.label.as_str())
                    .selected(selected)
                    .sense(Sense::click_and_drag()),
            )
            .on_hover_text(if entry.external {
                format!("{path}\n{}\nshows another window", entry.icon)
            } else {
                format!("{path}\n{}", entry.icon)
            });
        if r.clicked() {
            self.select(&entry.path);
        }
        if r.drag_started() && !entry.path.is_empty() {
            self.dragging = Some(Dragging::Element(entry.path.clone()));
        }
        r
    }

    fn palette_ui(&mut self, ui: &mut egui::Ui) {
        ui.heading("Palette");
        ui.separator();
        ui.label("Drag a widget onto the designer");
        ui.add_space(4.0);

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for category in registry().categories() {
                    egui::CollapsingHeader::new(category.label)
                        .default_open(true)
                        .show(ui, |ui| {
                            for kind in category.items {
                                self.palette_item(ui, kind);
                            }
                        });
                }

                ui.add_space(8.0);
                ui.separator();
                egui::CollapsingHeader::new("Shortcuts")
                    .default_open(false)
                    .show(ui, |ui| {
                        ui.small("Click: add to selection");
                        ui.small("Shift+drop: place beside");
                        ui.small("Delete: remove");
                        ui.small("Ctrl+S: save");
                    });
            });
    }

    fn palette_item(&mut self, ui: &mut egui::Ui, kind: &str) {
        let label = kind.strip_prefix("gui-").unwrap_or(kind);
        let r = ui
            .add(egui::Button::new(label).sense(Sense::click_and_drag()))
            .on_hover_text(registry().icon(kind));
        if r.drag_started() {
            self.dragging = Some(Dragging::Kind(kind.to_string()));
        } else if r.clicked() {
            let parent = self.selected.clone().unwrap_or_default();
            self.insert(&parent, kind);
        }
    }

    fn canvas_ui(&mut self, ui: &mut egui::Ui) {
        let Some(root) = outline(&self.project) else {
            ui.centered_and_justified(|ui| {
                ui.weak("No window yet. Add one in the Windows tab.");
            });
            return;
        };
        egui::ScrollArea::both()
            .id_salt("designer_canvas")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                self.element_ui(ui, &root, 0);
            });
    }

    fn is_horizontal(&self, entry: &OutlineEntry) -> bool {
        match entry.kind.as_str() {
            "gui-hbox" | "gui-tabs" | "gui-toolbar" | "gui-button-bar" | "gui-menu-bar" => true,
            "gui-paned-view" => self
                .project
                .get_property(&entry.path, "orientation")
                .is_some_and(|v| v == "horizontal"),
            _ => false,
        }
    }

    fn element_ui(&mut self, ui: &mut egui::Ui, entry: &OutlineEntry, depth: usize) {
        let selected = self.selected.as_deref() == Some(entry.path.as_str());
        let mut frame = egui::Frame::group(ui.style()).inner_margin(6.0);
        if selected {
            frame = frame.stroke(Stroke::new(1.5, Color32::LIGHT_BLUE));
        }
        let caption = self
            .project
            .get_property(&entry.path, "label")
            .map(|v| display_value(&v))
            .filter(|s| !s.is_empty() && s != "null");

        let inner = frame.show(ui, |ui| {
            self.element_button(ui, entry);
            if let Some(caption) = caption {
                ui.label(caption);
            }
            if entry.children.is_empty() {
                if entry.is_container {
                    ui.weak("(empty)");
                }
                return;
            }
            let children = |app: &mut Self, ui: &mut egui::Ui| {
                for child in &entry.children {
                    app.element_ui(ui, child, depth + 1);
                }
            };
            if self.is_horizontal(entry) {
                ui.horizontal_top(|ui| children(self, ui));
            } else {
                ui.vertical(|ui| children(self, ui));
            }
        });

        if entry.is_container {
            self.drop_targets.push(DropTarget {
                rect: inner.response.rect,
                path: entry.path.clone(),
                kind: entry.kind.clone(),
                depth,
            });
        }
    }

    fn structure_ui(&mut self, ui: &mut egui::Ui) {
        let Some(root) = outline(&self.project) else {
            ui.weak("No window");
            return;
        };
        ui.label(format!("{} elements", root.len()));
        ui.separator();
        egui::ScrollArea::vertical()
            .id_salt("structure_scroll")
            .max_height(ui.available_height() - 40.0)
            .auto_shrink([false, false])
            .show(ui, |ui| self.outline_ui(ui, &root, 0));

        ui.separator();
        let deletable = self
            .selected
            .as_deref()
            .is_some_and(|p| !self.project.is_fragment_root(p));
        if ui
            .add_enabled(deletable, egui::Button::new("Delete"))
            .on_hover_text("Delete the selected element (Del)")
            .clicked()
        {
            self.delete_selected();
        }
    }

    fn outline_ui(&mut self, ui: &mut egui::Ui, entry: &OutlineEntry, depth: usize) {
        let r = self.element_button(ui, entry);
        if entry.is_container {
            self.drop_targets.push(DropTarget {
                rect: r.rect,
                path: entry.path.clone(),
                kind: entry.kind.clone(),
                depth,
            });
        }
        if !entry.children.is_empty() {
            ui.indent(("outline", &entry.path), |ui| {
                for child in &entry.children {
                    self.outline_ui(ui, child, depth + 1);
                }
            });
        }
    }

    fn begin_edit(&mut self, name: &str) {
        let Some(inspected) = &self.inspected else {
            return;
        };
        let Some(property) = inspected.properties.get(name) else {
            return;
        };
        let text = match &property.value {
            serde_json::Value::Null => String::new(),
            value => display_value(value),
        };
        self.draft = Some(PropertyDraft {
            path: inspected.path.clone(),
            name: name.to_string(),
            editor: editor_for(&inspected.kind, name, &property.value),
            unit: UnitValue::parse(&text),
            text,
        });
    }

    fn properties_ui(&mut self, ui: &mut egui::Ui) {
        let Some(inspected) = &self.inspected else {
            ui.weak("No selection");
            return;
        };
        ui.label(format!("Kind: {}", inspected.kind));
        if let Some(target) = self.project.selection_target(&inspected.path)
            && target != inspected.path
        {
            ui.label(format!("Renders at: {target}"));
        }
        ui.add_space(4.0);

        let editing = self.draft.as_ref().map(|d| d.name.clone());
        let mut pick = None;
        let row_h = ui.text_style_height(&egui::TextStyle::Body) + 6.0;
        ui.push_id("property_table", |ui| {
            TableBuilder::new(ui)
                .striped(true)
                .max_scroll_height(260.0)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .column(Column::initial(110.0).resizable(true))
                .column(Column::initial(60.0))
                .column(Column::remainder())
                .header(row_h, |mut header| {
                    header.col(|ui| {
                        ui.strong("Property");
                    });
                    header.col(|ui| {
                        ui.strong("Type");
                    });
                    header.col(|ui| {
                        ui.strong("Value");
                    });
                })
                .body(|mut body| {
                    for property in &inspected.properties {
                        body.row(row_h, |mut row| {
                            row.col(|ui| {
                                let active = editing.as_deref() == Some(property.name.as_str());
                                if ui.selectable_label(active, &property.name).clicked() {
                                    pick = Some(property.name.clone());
                                }
                            });
                            row.col(|ui| {
                                ui.weak(property.kind.as_str());
                            });
                            row.col(|ui| {
                                ui.monospace(display_value(&property.value));
                            });
                        });
                    }
                });
        });
        if let Some(name) = pick {
            self.begin_edit(&name);
        }

        ui.separator();
        let Some(draft) = &mut self.draft else {
            ui.weak("Pick a property to edit");
            return;
        };
        let mut action = None;
        ui.label(format!("Edit `{}`", draft.name));
        let PropertyDraft {
            path,
            name,
            editor,
            text,
            unit,
        } = draft;
        match editor {
            Editor::Text => {
                ui.text_edit_singleline(text);
            }
            Editor::Select(choices) => {
                let current = choices
                    .iter()
                    .find(|c| c.value == *text)
                    .map(|c| c.label.clone())
                    .unwrap_or_else(|| text.clone());
                egui::ComboBox::from_id_salt(("property_choice", name.as_str()))
                    .selected_text(current)
                    .show_ui(ui, |ui| {
                        for choice in choices.iter() {
                            ui.selectable_value(&mut *text, choice.value.clone(), &choice.label);
                        }
                    });
            }
            Editor::Unit => {
                ui.horizontal(|ui| {
                    let mut auto = matches!(unit, UnitValue::Auto);
                    if ui.checkbox(&mut auto, "auto").changed() {
                        *unit = if auto {
                            UnitValue::Auto
                        } else {
                            UnitValue::Length(0.0, Unit::Px)
                        };
                    }
                    if let UnitValue::Length(n, u) = unit {
                        ui.add(egui::DragValue::new(n).speed(1.0));
                        egui::ComboBox::from_id_salt(("property_unit", name.as_str()))
                            .selected_text(u.as_str())
                            .show_ui(ui, |ui| {
                                for option in Unit::ALL {
                                    ui.selectable_value(&mut *u, option, option.as_str());
                                }
                            });
                    }
                });
                *text = unit.to_string();
            }
        }
        ui.horizontal(|ui| {
            if ui.button("Apply").clicked() {
                action = Some(match editor {
                    Editor::Select(_) if *text == "null" => {
                        PropertyAction::Clear(path.clone(), name.clone())
                    }
                    _ => PropertyAction::Apply(path.clone(), name.clone(), text.clone()),
                });
            }
            if ui
                .button("Null")
                .on_hover_text("Remove the stored value")
                .clicked()
            {
                action = Some(PropertyAction::Clear(path.clone(), name.clone()));
            }
        });

        match action {
            Some(PropertyAction::Apply(path, name, value)) => {
                if !self.project.set_property(&path, &name, &value) {
                    self.set_status(format!("`{value}` was not accepted for {name}"));
                }
            }
            Some(PropertyAction::Clear(path, name)) => {
                if !self.project.clear_property(&path, &name) {
                    self.set_status(format!("{name} cannot be cleared here"));
                }
            }
            None => {}
        }
    }

    fn fragments_ui(&mut self, ui: &mut egui::Ui) {
        let fragments = self.project.fragments().to_vec();
        let current = self.project.current_fragment();

        ui.horizontal(|ui| {
            ui.label("Window");
            let mut chosen = current;
            egui::ComboBox::from_id_salt("fragment_select")
                .selected_text(fragments.get(current).cloned().unwrap_or_default())
                .show_ui(ui, |ui| {
                    for (i, id) in fragments.iter().enumerate() {
                        ui.selectable_value(&mut chosen, i, id);
                    }
                });
            if chosen != current && self.project.select_fragment(chosen) {
                self.clear_selection();
            }
        });

        if ui
            .add_enabled(fragments.len() > 1, egui::Button::new("Remove window"))
            .on_hover_text("The last window cannot be removed")
            .clicked()
            && self.project.remove_fragment(current)
        {
            self.clear_selection();
            self.new_fragment_id = self.suggest_fragment_id();
        }

        ui.separator();
        ui.horizontal(|ui| {
            ui.label("New id");
            ui.text_edit_singleline(&mut self.new_fragment_id);
        });
        if ui.button("Add window").clicked() {
            let id = self.new_fragment_id.trim().to_string();
            if id.is_empty() {
                self.set_status("Window id is empty".into());
            } else {
                match self.project.create_fragment(WINDOW_KIND, &id) {
                    Ok(()) => {
                        let index = self.project.fragments().len() - 1;
                        self.project.select_fragment(index);
                        self.clear_selection();
                        self.new_fragment_id = self.suggest_fragment_id();
                    }
                    Err(err) => self.set_status(err.to_string()),
                }
            }
        }
    }

    fn metadata_ui(&mut self, ui: &mut egui::Ui) {
        egui::Grid::new("metadata_grid")
            .num_columns(2)
            .spacing([8.0, 4.0])
            .show(ui, |ui| {
                ui.label("Name");
                ui.text_edit_singleline(&mut self.metadata_draft.name);
                ui.end_row();
                ui.label("Class name");
                ui.text_edit_singleline(&mut self.metadata_draft.class_name);
                ui.end_row();
                ui.label("Icon");
                ui.text_edit_singleline(&mut self.metadata_draft.icon);
                ui.end_row();
                ui.label("Category");
                ui.text_edit_singleline(&mut self.metadata_draft.category);
                ui.end_row();
                ui.label("Singular");
                ui.checkbox(&mut self.metadata_draft.singular, "");
                ui.end_row();
            });
        ui.horizontal(|ui| {
            if ui.button("Apply").clicked() {
                let draft = &self.metadata_draft;
                let partial = json!({
                    "name": draft.name,
                    "className": draft.class_name,
                    "icon": draft.icon,
                    "category": draft.category,
                    "singular": draft.singular,
                });
                if let serde_json::Value::Object(map) = partial
                    && !self.project.apply_metadata(map)
                {
                    self.set_status("Metadata was not accepted".into());
                }
            }
            if ui.button("Revert").clicked() {
                self.metadata_draft = self.project.metadata.clone();
            }
        });

        ui.separator();
        egui::CollapsingHeader::new("MIME types")
            .default_open(true)
            .show(ui, |ui| {
                let mut remove = None;
                for (i, mime) in self.project.metadata.mime.iter().enumerate() {
                    ui.horizontal(|ui| {
                        ui.monospace(mime);
                        if ui.small_button("✖").clicked() {
                            remove = Some(i);
                        }
                    });
                }
                if let Some(i) = remove {
                    self.project.remove_mime(i);
                }
                ui.horizontal(|ui| {
                    ui.text_edit_singleline(&mut self.new_mime);
                    if ui.button("Add").clicked() && !self.new_mime.trim().is_empty() {
                        self.project.add_mime(self.new_mime.trim());
                        self.new_mime.clear();
                    }
                });
            });

        egui::CollapsingHeader::new("Files")
            .default_open(true)
            .show(ui, |ui| {
                let files = project_files(&self.project);
                for group in FileGroup::ALL {
                    ui.strong(group.label());
                    for file in files.iter().filter(|f| f.group == group) {
                        let location = file
                            .path
                            .as_ref()
                            .map(|p| p.display().to_string())
                            .unwrap_or_else(|| "(not on disk)".to_string());
                        ui.horizontal(|ui| {
                            ui.label(&file.label).on_hover_text(location);
                            ui.weak(file.mime);
                        });
                    }
                }
            });
    }

    fn markup_ui(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.selectable_value(&mut self.preview_doc, PreviewDoc::Scheme, package::SCHEME_FILE);
            ui.selectable_value(
                &mut self.preview_doc,
                PreviewDoc::Metadata,
                package::METADATA_FILE,
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.checkbox(&mut self.syntax_highlighting, "Highlight")
                    .on_hover_text("Toggle syntax highlighting");
            });
        });
        ui.separator();

        match self.project.save() {
            Ok((scheme, metadata)) => match self.preview_doc {
                PreviewDoc::Scheme => code_viewer(
                    ui,
                    &self.highlighter,
                    &indent_markup(&scheme),
                    "html",
                    self.syntax_highlighting,
                ),
                PreviewDoc::Metadata => code_viewer(
                    ui,
                    &self.highlighter,
                    &metadata,
                    "json",
                    self.syntax_highlighting,
                ),
            },
            Err(err) => {
                ui.colored_label(Color32::LIGHT_RED, err.to_string());
            }
        }
    }

    fn top_bar(&mut self, ui: &mut egui::Ui) {
        // Show status message if recent
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed().as_secs() < 3 {
                ui.horizontal(|ui| {
                    ui.label(msg);
                });
            } else {
                self.status_message = None;
            }
        }

        egui::MenuBar::new().ui(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui
                    .button("New Project...")
                    .on_hover_text("Create a project from the template")
                    .clicked()
                {
                    self.new_project = Some(String::new());
                    ui.close_kind(egui::UiKind::Menu);
                }
                ui.separator();
                if ui
                    .button("Open...")
                    .on_hover_text("Open a project folder")
                    .clicked()
                {
                    if let Some(dir) = rfd::FileDialog::new()
                        .set_title("Open project folder")
                        .pick_folder()
                    {
                        self.open_project(dir);
                    }
                    ui.close_kind(egui::UiKind::Menu);
                }
                if ui
                    .button("Save")
                    .on_hover_text("Save project (Ctrl+S)")
                    .clicked()
                {
                    self.save_project();
                    ui.close_kind(egui::UiKind::Menu);
                }
                if ui
                    .button("Save As...")
                    .on_hover_text("Save project into another folder")
                    .clicked()
                {
                    self.save_project_as();
                    ui.close_kind(egui::UiKind::Menu);
                }
                ui.separator();
                if ui.button("Quit").clicked() {
                    ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.menu_button("Edit", |ui| {
                let deletable = self
                    .selected
                    .as_deref()
                    .is_some_and(|p| !self.project.is_fragment_root(p));
                if ui
                    .add_enabled(deletable, egui::Button::new("Delete"))
                    .on_hover_text("Delete selected (Del)")
                    .clicked()
                {
                    self.delete_selected();
                    ui.close_kind(egui::UiKind::Menu);
                }
                if ui.button("Select window").clicked() {
                    self.select("");
                    ui.close_kind(egui::UiKind::Menu);
                }
            });

            ui.menu_button("View", |ui| {
                ui.checkbox(&mut self.palette_open, "Palette");
                ui.checkbox(&mut self.syntax_highlighting, "Syntax highlighting");
            });

            ui.separator();
            let title = match &self.project.path {
                Some(dir) => format!("{} ({})", self.project.name, dir.display()),
                None => format!("{} (unsaved)", self.project.name),
            };
            ui.weak(title);
        });
    }

    fn new_project_window(&mut self, ctx: &egui::Context) {
        let Some(name) = &mut self.new_project else {
            return;
        };
        let mut create = false;
        let mut cancel = false;
        egui::Window::new("New Project")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Name");
                    ui.text_edit_singleline(name);
                });
                ui.horizontal(|ui| {
                    create = ui.button("Create").clicked();
                    cancel = ui.button("Cancel").clicked();
                });
            });
        if create {
            let name = name.clone();
            self.new_project = None;
            self.create_project(&name);
        } else if cancel {
            self.new_project = None;
        }
    }

    /// Paints the drag ghost and completes the drop on pointer release.
    fn drag_ui(&mut self, ctx: &egui::Context) {
        let Some(dragging) = self.dragging.clone() else {
            return;
        };
        let pointer = ctx.pointer_interact_pos();
        let target = pointer.and_then(|pos| self.target_at(pos)).cloned();

        if let Some(mouse) = pointer {
            let (label, kind) = match &dragging {
                Dragging::Kind(kind) => (kind.clone(), kind.clone()),
                Dragging::Element(path) => (
                    path.clone(),
                    self.project
                        .get_node(path)
                        .map(|n| n.tag.to_ascii_lowercase())
                        .unwrap_or_default(),
                ),
            };
            let layer = egui::LayerId::new(egui::Order::Tooltip, Id::new("ghost"));
            let painter = ctx.layer_painter(layer);
            let galley = painter.layout_no_wrap(
                label,
                FontId::proportional(13.0),
                Color32::LIGHT_BLUE,
            );
            let ghost = Rect::from_min_size(mouse + vec2(12.0, 4.0), galley.size()).expand(4.0);
            painter.rect_filled(ghost, 4.0, Color32::from_gray(40));
            painter.galley(ghost.min + vec2(4.0, 4.0), galley, Color32::LIGHT_BLUE);

            if let Some(target) = &target {
                let color = if placement::validate_drop(&kind, &target.kind).is_ok() {
                    Color32::LIGHT_BLUE
                } else {
                    Color32::LIGHT_RED
                };
                painter.rect_stroke(
                    target.rect,
                    CornerRadius::same(4),
                    Stroke::new(2.0, color),
                    egui::StrokeKind::Outside,
                );
            }
        }

        if ctx.input(|i| i.pointer.any_released()) {
            self.dragging = None;
            let Some(target) = target else {
                return;
            };
            let beside = ctx.input(|i| i.modifiers.shift);
            match dragging {
                Dragging::Kind(kind) => self.insert(&target.path, &kind),
                Dragging::Element(path) => self.move_element(&path, &target.path, !beside),
            }
        }
    }
}

impl eframe::App for DesignerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let (delete_pressed, save_pressed) = ctx.input(|i| {
            let del = i.key_pressed(egui::Key::Delete);
            let save = i.modifiers.command && i.key_pressed(egui::Key::S);
            (del, save)
        });
        if delete_pressed && !ctx.wants_keyboard_input() {
            self.delete_selected();
        }
        if save_pressed {
            self.save_project();
        }

        self.drop_targets.clear();

        egui::TopBottomPanel::top("menubar").show(ctx, |ui| self.top_bar(ui));
        if self.palette_open {
            egui::SidePanel::left("palette")
                .resizable(true)
                .show(ctx, |ui| {
                    self.palette_ui(ui);
                });
        }
        egui::SidePanel::right("inspector")
            .default_width(320.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    for tab in InspectorTab::ALL {
                        if ui
                            .selectable_label(self.right_panel_tab == tab, tab.display_name())
                            .clicked()
                        {
                            self.right_panel_tab = tab;
                        }
                    }
                });
                ui.separator();

                match self.right_panel_tab {
                    InspectorTab::Structure => self.structure_ui(ui),
                    InspectorTab::Properties => self.properties_ui(ui),
                    InspectorTab::Fragments => self.fragments_ui(ui),
                    InspectorTab::Metadata => self.metadata_ui(ui),
                    InspectorTab::Markup => self.markup_ui(ui),
                }
            });
        egui::CentralPanel::default().show(ctx, |ui| self.canvas_ui(ui));

        self.new_project_window(ctx);
        self.drag_ui(ctx);
        self.process_events();

        if self.dragging.is_some() {
            ctx.set_cursor_icon(egui::CursorIcon::Grabbing);
        }
    }
}
