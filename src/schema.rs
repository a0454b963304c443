//! Element schema registry: one descriptor per widget kind.
//!
//! Descriptors are plain data plus two optional capabilities: computed
//! property defaults and [`ElementHooks`]. The registry is built once and is
//! read-only afterwards. Kinds that are not registered resolve to a single
//! fallback descriptor (leaf, unknown icon, no constraints).

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use serde_json::Value;

use crate::markup::{Node, is_reserved_property};

/// Icon used for kinds without one of their own.
pub const UNKNOWN_ICON: &str = "status/dialog-question.png";

/// Upper bound for the sub-container count set through `_size`.
pub const MAX_BOX_SLOTS: usize = 64;

/// Declared type of a widget property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    String,
    Number,
    Boolean,
    /// One of a fixed set of [`Choice`]s.
    Mixed,
    /// A CSS-like length such as `12px` or `auto`.
    Unit,
    Unknown,
}

impl PropertyKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PropertyKind::String => "string",
            PropertyKind::Number => "number",
            PropertyKind::Boolean => "boolean",
            PropertyKind::Mixed => "mixed",
            PropertyKind::Unit => "unit",
            PropertyKind::Unknown => "unknown",
        }
    }

    /// Runtime type of a resolved value, used when nothing is declared.
    pub fn of_value(value: &Value) -> Self {
        match value {
            Value::String(_) => PropertyKind::String,
            Value::Number(_) => PropertyKind::Number,
            Value::Bool(_) => PropertyKind::Boolean,
            _ => PropertyKind::Unknown,
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub value: String,
}

impl Choice {
    pub fn new(label: &str, value: &str) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PropertyType {
    pub kind: PropertyKind,
    pub values: Vec<Choice>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Creation-time value, preferred over the descriptor's default.
    pub default_value: Option<Value>,
}

impl PropertyType {
    pub fn of(kind: PropertyKind) -> Self {
        Self {
            kind,
            values: Vec::new(),
            min: None,
            max: None,
            default_value: None,
        }
    }

    fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    fn with_values(mut self, values: Vec<Choice>) -> Self {
        self.values = values;
        self
    }

    /// Whether `value` fits the declared bounds. Without bounds anything fits;
    /// with bounds the value must be a number inside them.
    pub fn accepts(&self, value: &str) -> bool {
        if self.min.is_none() && self.max.is_none() {
            return true;
        }
        let Ok(n) = value.trim().parse::<f64>() else {
            return false;
        };
        self.min.is_none_or(|min| n >= min) && self.max.is_none_or(|max| n <= max)
    }
}

/// Default value of a property.
#[derive(Clone)]
pub enum PropertyDefault {
    /// Explicitly no default; skipped at creation.
    Null,
    Literal(Value),
    /// Evaluated against the live node, or `None` at creation time.
    Computed(fn(Option<&Node>, &str) -> Value),
}

impl PropertyDefault {
    pub fn literal(value: impl Into<Value>) -> Self {
        PropertyDefault::Literal(value.into())
    }

    pub fn evaluate(&self, node: Option<&Node>, kind: &str) -> Value {
        match self {
            PropertyDefault::Null => Value::Null,
            PropertyDefault::Literal(v) => v.clone(),
            PropertyDefault::Computed(f) => f(node, kind),
        }
    }
}

impl fmt::Debug for PropertyDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyDefault::Null => f.write_str("Null"),
            PropertyDefault::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            PropertyDefault::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// How a kind accepts children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContainerModel {
    Leaf,
    /// Children attach directly.
    Direct,
    /// Children live inside the named sub-container kind.
    Proxy(String),
}

/// Naming and population rules for box-like containers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoxModel {
    Boxes,
    Tabs,
}

impl BoxModel {
    /// `<kind>-container`, or `<kind minus -tabs>-tab-container` for tab sets.
    pub fn sub_container_kind(self, kind: &str) -> String {
        match self {
            BoxModel::Boxes => format!("{kind}-container"),
            BoxModel::Tabs => {
                format!("{}-tab-container", kind.strip_suffix("-tabs").unwrap_or(kind))
            }
        }
    }

    const fn initial_count(self) -> usize {
        match self {
            BoxModel::Boxes => 2,
            BoxModel::Tabs => 1,
        }
    }

    fn new_sub_container(self, kind: &str) -> Node {
        let node = Node::new(self.sub_container_kind(kind));
        match self {
            BoxModel::Boxes => node.with_data("shrink", "1").with_data("grow", "1"),
            BoxModel::Tabs => node.with_data("label", "Tab"),
        }
    }
}

/// Lifecycle capabilities of a widget kind.
pub trait ElementHooks: Send + Sync {
    /// Runs once after defaults are applied to a freshly created node.
    fn on_create(&self, _node: &mut Node, _parent: Option<&Node>, _kind: &str) {}

    /// Overrides the generic property write. `None` defers to it.
    fn on_property_update(
        &self,
        _node: &mut Node,
        _kind: &str,
        _property: &str,
        _value: &str,
    ) -> Option<bool> {
        None
    }
}

pub struct WidgetKindDescriptor {
    pub name: String,
    pub container: ContainerModel,
    pub allow_children: Option<Vec<String>>,
    pub allow_parents: Option<Vec<String>>,
    pub invalid_children: Option<Vec<String>>,
    pub allow_inner_containers: Option<bool>,
    pub property_types: Vec<(String, PropertyType)>,
    pub properties: Vec<(String, PropertyDefault)>,
    /// The `label` property is stored as inner text.
    pub has_inner_label: bool,
    /// Subtree is hidden from structural views.
    pub special: bool,
    /// References another fragment rather than owning content.
    pub external: bool,
    pub icon: String,
    pub hooks: Option<Box<dyn ElementHooks>>,
    /// Rewrites the selection target of the `index`th instance at `path`.
    pub select_query: Option<fn(usize, &str) -> String>,
}

impl fmt::Debug for WidgetKindDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetKindDescriptor")
            .field("name", &self.name)
            .field("container", &self.container)
            .field("allow_children", &self.allow_children)
            .field("allow_parents", &self.allow_parents)
            .field("invalid_children", &self.invalid_children)
            .field("allow_inner_containers", &self.allow_inner_containers)
            .field("properties", &self.properties)
            .field("icon", &self.icon)
            .field("hooks", &self.hooks.is_some())
            .finish_non_exhaustive()
    }
}

impl WidgetKindDescriptor {
    fn new(name: &str, icon: &str) -> Self {
        Self {
            name: name.to_string(),
            container: ContainerModel::Leaf,
            allow_children: None,
            allow_parents: None,
            invalid_children: None,
            allow_inner_containers: None,
            property_types: Vec::new(),
            properties: Vec::new(),
            has_inner_label: false,
            special: false,
            external: false,
            icon: icon.to_string(),
            hooks: None,
            select_query: None,
        }
    }

    fn with_container(mut self, container: ContainerModel) -> Self {
        self.container = container;
        self
    }

    fn with_allow_children(mut self, kinds: &[&str]) -> Self {
        self.allow_children = Some(kinds.iter().map(|k| k.to_string()).collect());
        self
    }

    fn with_allow_parents(mut self, kinds: &[&str]) -> Self {
        self.allow_parents = Some(kinds.iter().map(|k| k.to_string()).collect());
        self
    }

    fn with_invalid_children(mut self, kinds: &[&str]) -> Self {
        self.invalid_children = Some(kinds.iter().map(|k| k.to_string()).collect());
        self
    }

    fn without_inner_containers(mut self) -> Self {
        self.allow_inner_containers = Some(false);
        self
    }

    fn with_property(mut self, name: &str, ty: PropertyType, default: PropertyDefault) -> Self {
        self.property_types.push((name.to_string(), ty));
        self.properties.push((name.to_string(), default));
        self
    }

    fn with_inner_label(mut self) -> Self {
        self.has_inner_label = true;
        self
    }

    fn with_hooks(mut self, hooks: impl ElementHooks + 'static) -> Self {
        self.hooks = Some(Box::new(hooks));
        self
    }

    pub fn is_container(&self) -> bool {
        self.container != ContainerModel::Leaf
    }

    /// Kind that actually hosts children dropped on this one, if proxied.
    pub fn sub_container(&self) -> Option<&str> {
        match &self.container {
            ContainerModel::Proxy(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn property_type(&self, name: &str) -> Option<&PropertyType> {
        self.property_types
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| t)
    }

    pub fn property_default(&self, name: &str) -> Option<&PropertyDefault> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d)
    }
}

/// A labelled palette group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Category {
    pub label: &'static str,
    pub items: &'static [&'static str],
}

pub const CATEGORIES: &[Category] = &[
    Category {
        label: "Containers",
        items: &[
            "gui-hbox",
            "gui-vbox",
            "gui-paned-view",
            "gui-tabs",
            "gui-toolbar",
            "gui-button-bar",
            "gui-expander",
            "gui-fragment",
        ],
    },
    Category {
        label: "Media",
        items: &["gui-audio", "gui-video", "gui-image", "gui-canvas", "gui-iframe"],
    },
    Category {
        label: "Input",
        items: &[
            "gui-label",
            "gui-button",
            "gui-switch",
            "gui-radio",
            "gui-checkbox",
            "gui-select",
            "gui-select-list",
            "gui-slider",
            "gui-text",
            "gui-password",
            "gui-textarea",
            "gui-richtext",
        ],
    },
    Category {
        label: "Views",
        items: &["gui-tree-view", "gui-icon-view", "gui-list-view", "gui-file-view"],
    },
    Category {
        label: "Misc",
        items: &[
            "gui-progress-bar",
            "gui-color-swatch",
            "gui-menu-bar",
            "gui-statusbar",
            "gui-file-upload",
            "gui-input-modal",
            "gui-color-box",
        ],
    },
    Category {
        label: "Entries",
        items: &["gui-menu-bar-entry", "gui-select-option"],
    },
];

/// Read-only lookup table of every supported widget kind.
pub struct SchemaRegistry {
    descriptors: Vec<WidgetKindDescriptor>,
    index: HashMap<String, usize>,
    fallback: WidgetKindDescriptor,
}

static REGISTRY: OnceLock<SchemaRegistry> = OnceLock::new();

/// The process-wide registry of built-in kinds.
pub fn registry() -> &'static SchemaRegistry {
    REGISTRY.get_or_init(SchemaRegistry::builtin)
}

impl SchemaRegistry {
    fn from_descriptors(descriptors: Vec<WidgetKindDescriptor>) -> Self {
        let index = descriptors
            .iter()
            .enumerate()
            .map(|(i, d)| (d.name.clone(), i))
            .collect();
        Self {
            descriptors,
            index,
            fallback: WidgetKindDescriptor::new("unknown", UNKNOWN_ICON),
        }
    }

    pub fn lookup(&self, kind: &str) -> Option<&WidgetKindDescriptor> {
        let idx = match self.index.get(kind) {
            Some(idx) => *idx,
            None => *self.index.get(&kind.to_ascii_lowercase())?,
        };
        self.descriptors.get(idx)
    }

    /// Like [`SchemaRegistry::lookup`] but never absent.
    pub fn resolve(&self, kind: &str) -> &WidgetKindDescriptor {
        self.lookup(kind).unwrap_or(&self.fallback)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.descriptors.iter().map(|d| d.name.as_str())
    }

    pub fn categories(&self) -> &'static [Category] {
        CATEGORIES
    }

    pub fn icon(&self, kind: &str) -> &str {
        &self.resolve(kind).icon
    }

    /// Creates a node of `kind` with every non-null default applied, then
    /// runs the kind's creation hook.
    pub fn instantiate(&self, kind: &str, parent: Option<&Node>) -> Node {
        let desc = self.resolve(kind);
        let mut node = Node::new(kind);

        for (name, default) in &desc.properties {
            let value = desc
                .property_type(name)
                .and_then(|t| t.default_value.clone())
                .unwrap_or_else(|| default.evaluate(None, kind));
            if value.is_null() || is_reserved_property(name) {
                continue;
            }
            let text = attribute_value(&value);
            if name == "label" && desc.has_inner_label {
                node.set_text(text);
            } else {
                node.set_data(name, text);
            }
        }

        if let Some(hooks) = &desc.hooks {
            hooks.on_create(&mut node, parent, kind);
        }
        node
    }

    /// Writes a property through the kind's hook, falling back to plain
    /// attribute storage. Returns whether the write was accepted.
    pub fn update_property(&self, node: &mut Node, kind: &str, property: &str, value: &str) -> bool {
        let desc = self.lookup(kind);
        if let Some(hooks) = desc.and_then(|d| d.hooks.as_deref())
            && let Some(accepted) = hooks.on_property_update(node, kind, property, value)
        {
            return accepted;
        }
        set_attribute_property(desc, node, property, value)
    }

    fn builtin() -> Self {
        let mut kinds = vec![
            WidgetKindDescriptor::new("application-window", UNKNOWN_ICON)
                .with_container(ContainerModel::Direct)
                .with_property("width", PropertyType::of(PropertyKind::Number), PropertyDefault::Null)
                .with_property("height", PropertyType::of(PropertyKind::Number), PropertyDefault::Null)
                .with_property("allow_maximize", PropertyType::of(PropertyKind::Boolean), PropertyDefault::literal(true))
                .with_property("allow_minimize", PropertyType::of(PropertyKind::Boolean), PropertyDefault::literal(true))
                .with_property("allow_close", PropertyType::of(PropertyKind::Boolean), PropertyDefault::literal(true))
                .with_property("allow_resize", PropertyType::of(PropertyKind::Boolean), PropertyDefault::literal(true)),
            {
                let mut d = WidgetKindDescriptor::new("gui-fragment", "widget-gtk-frame.png")
                    .with_container(ContainerModel::Direct)
                    .without_inner_containers()
                    .with_property("fragment-id", PropertyType::of(PropertyKind::String), PropertyDefault::Null);
                d.external = true;
                d
            },
        ];

        for (name, icon, model) in BOXES {
            kinds.push(box_container(name, icon, *model));
            kinds.push(box_slot(name, *model));
        }

        kinds.extend([
            WidgetKindDescriptor::new("gui-toolbar", "widget-gtk-toolbar.png")
                .with_container(ContainerModel::Direct)
                .without_inner_containers(),
            WidgetKindDescriptor::new("gui-button-bar", "widget-gtk-toolbar.png")
                .with_container(ContainerModel::Direct)
                .without_inner_containers(),
            WidgetKindDescriptor::new("gui-expander", "widget-gtk-expander.png")
                .with_container(ContainerModel::Direct)
                .with_property("label", PropertyType::of(PropertyKind::String), PropertyDefault::Computed(label_attribute))
                .with_hooks(ExpanderHooks),
        ]);

        kinds.extend([
            media("gui-audio", UNKNOWN_ICON),
            media("gui-video", UNKNOWN_ICON),
            media("gui-image", "widget-gtk-image.png"),
            media("gui-iframe", "widget-gtk-custom.png"),
            WidgetKindDescriptor::new("gui-canvas", "widget-gtk-drawingarea.png"),
        ]);

        kinds.extend([
            input("gui-label", "widget-gtk-label.png", InputLabel::Attribute("Label")),
            input("gui-radio", "widget-gtk-radiotoolbutton.png", InputLabel::Attribute("")),
            input("gui-checkbox", "widget-gtk-checkbox.png", InputLabel::Attribute("")),
            input("gui-file-upload", "widget-gtk-filechooserbutton.png", InputLabel::Value),
            input("gui-input-modal", "widget-gtk-comboboxentry.png", InputLabel::Value),
            select("gui-select", "widget-gtk-combobox.png"),
            select("gui-select-list", "widget-gtk-list.png"),
            {
                let mut d = WidgetKindDescriptor::new("gui-select-option", "widget-gtk-label.png")
                    .with_inner_label()
                    .with_property("value", PropertyType::of(PropertyKind::String), PropertyDefault::Null)
                    .with_property("label", PropertyType::of(PropertyKind::String), PropertyDefault::Null);
                d.select_query = Some(select_option_query);
                d
            },
            input("gui-slider", "widget-gtk-hscale.png", InputLabel::Value),
            input("gui-switch", "widget-gtk-togglebutton.png", InputLabel::Value),
            input("gui-text", "widget-gtk-entry.png", InputLabel::Value),
            input("gui-password", "widget-gtk-password.png", InputLabel::Value),
            input("gui-textarea", "widget-gtk-textview.png", InputLabel::Value),
            input("gui-button", "widget-gtk-button.png", InputLabel::Inner("Button"))
                .with_property("icon", PropertyType::of(PropertyKind::String), PropertyDefault::literal("")),
            WidgetKindDescriptor::new("gui-richtext", "widget-gtk-textview.png")
                .without_inner_containers()
                .with_property("value", PropertyType::of(PropertyKind::String), PropertyDefault::literal("")),
        ]);

        kinds.extend([
            view("gui-tree-view", "widget-gtk-treeview.png"),
            view("gui-icon-view", "widget-gtk-iconview.png"),
            view("gui-list-view", "widget-gtk-list.png"),
            view("gui-file-view", "widget-gtk-filefilter.png"),
        ]);

        kinds.extend([
            view("gui-progress-bar", "widget-gtk-progressbar.png").with_property(
                "progress",
                PropertyType::of(PropertyKind::Number).with_range(0.0, 100.0),
                PropertyDefault::literal(0),
            ),
            view("gui-color-box", "widget-gtk-colorbutton.png"),
            view("gui-color-swatch", "widget-gtk-colorselection.png"),
            {
                let mut d = WidgetKindDescriptor::new("gui-menu", "widget-gtk-menu.png")
                    .with_allow_parents(&["gui-menu-entry"]);
                d.special = true;
                d
            },
            WidgetKindDescriptor::new("gui-menu-entry", UNKNOWN_ICON),
            WidgetKindDescriptor::new("gui-menu-bar", "widget-gtk-menubar.png")
                .with_container(ContainerModel::Direct)
                .without_inner_containers()
                .with_allow_children(&["gui-menu-bar-entry"]),
            WidgetKindDescriptor::new("gui-menu-bar-entry", "widget-gtk-label.png")
                .with_property("disabled", PropertyType::of(PropertyKind::Boolean), PropertyDefault::Null)
                .with_property("label", PropertyType::of(PropertyKind::String), PropertyDefault::literal("Menu Item")),
            view("gui-statusbar", "widget-gtk-statusbar.png").with_property(
                "value",
                PropertyType::of(PropertyKind::String),
                PropertyDefault::literal(""),
            ),
        ]);

        Self::from_descriptors(kinds)
    }
}

/// Renders a JSON value the way it is stored in an attribute.
pub fn attribute_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Generic property write: reserved names always succeed without effect,
/// `id` and declared properties become attributes (or inner text for inner
/// labels), anything else is refused.
fn set_attribute_property(
    desc: Option<&WidgetKindDescriptor>,
    node: &mut Node,
    property: &str,
    value: &str,
) -> bool {
    if is_reserved_property(property) {
        return true;
    }
    let Some(desc) = desc else {
        return false;
    };
    match desc.property_type(property) {
        None if property != "id" => return false,
        Some(ty) if !ty.accepts(value) => {
            tracing::debug!(kind = %desc.name, property, value, "value out of range");
            return false;
        }
        _ => {}
    }
    if property == "label" && desc.has_inner_label {
        node.set_text(value);
    } else {
        node.set_data(property, value);
    }
    true
}

const BOXES: &[(&str, &str, BoxModel)] = &[
    ("gui-hbox", "widget-gtk-hbox.png", BoxModel::Boxes),
    ("gui-vbox", "widget-gtk-vbox.png", BoxModel::Boxes),
    ("gui-paned-view", "widget-gtk-hpaned.png", BoxModel::Boxes),
    ("gui-tabs", "widget-gtk-notebook.png", BoxModel::Tabs),
];

fn box_container(name: &str, icon: &str, model: BoxModel) -> WidgetKindDescriptor {
    let sub = model.sub_container_kind(name);
    let desc = WidgetKindDescriptor::new(name, icon)
        .with_allow_children(&[sub.as_str()])
        .with_container(ContainerModel::Proxy(sub))
        .with_property(
            "_size",
            PropertyType::of(PropertyKind::Number),
            PropertyDefault::Computed(box_size),
        )
        .with_hooks(BoxHooks { model });

    if name == "gui-paned-view" {
        desc.with_property(
            "orientation",
            PropertyType::of(PropertyKind::Mixed).with_values(vec![
                Choice::new("Horizontal", "horizontal"),
                Choice::new("Vertical", "vertical"),
            ]),
            PropertyDefault::Computed(orientation_attribute),
        )
    } else {
        desc
    }
}

/// The sub-container kind a box hosts its children in.
fn box_slot(parent: &str, model: BoxModel) -> WidgetKindDescriptor {
    let name = model.sub_container_kind(parent);
    match model {
        BoxModel::Tabs => WidgetKindDescriptor::new(&name, "widget-gtk-container.png")
            .with_container(ContainerModel::Direct)
            .with_allow_parents(&[parent])
            .with_invalid_children(&[name.as_str()])
            .with_property("label", PropertyType::of(PropertyKind::String), PropertyDefault::literal("Tab")),
        BoxModel::Boxes => WidgetKindDescriptor::new(&name, "widget-gtk-container.png")
            .with_container(ContainerModel::Direct)
            .with_allow_parents(&[parent])
            .with_property("grow", PropertyType::of(PropertyKind::Number), PropertyDefault::Null)
            .with_property("shrink", PropertyType::of(PropertyKind::Number), PropertyDefault::Null)
            .with_property("basis", PropertyType::of(PropertyKind::Unit), PropertyDefault::Null)
            .with_property("expand", PropertyType::of(PropertyKind::Boolean), PropertyDefault::Null)
            .with_property("fill", PropertyType::of(PropertyKind::Boolean), PropertyDefault::Null),
    }
}

fn media(name: &str, icon: &str) -> WidgetKindDescriptor {
    WidgetKindDescriptor::new(name, icon)
        .without_inner_containers()
        .with_property("src", PropertyType::of(PropertyKind::String), PropertyDefault::literal(""))
}

fn view(name: &str, icon: &str) -> WidgetKindDescriptor {
    WidgetKindDescriptor::new(name, icon).without_inner_containers()
}

fn select(name: &str, icon: &str) -> WidgetKindDescriptor {
    WidgetKindDescriptor::new(name, icon)
        .with_container(ContainerModel::Direct)
        .with_allow_children(&["gui-select-option"])
        .without_inner_containers()
        .with_property("disabled", PropertyType::of(PropertyKind::Boolean), PropertyDefault::Null)
}

/// Where an input keeps its text.
enum InputLabel {
    /// `data-label`, created with the given text.
    Attribute(&'static str),
    /// Inner text, created with the given text.
    Inner(&'static str),
    /// `data-value`, created empty.
    Value,
}

fn input(name: &str, icon: &str, label: InputLabel) -> WidgetKindDescriptor {
    let desc = WidgetKindDescriptor::new(name, icon)
        .without_inner_containers()
        .with_property("disabled", PropertyType::of(PropertyKind::Boolean), PropertyDefault::Null)
        .with_property("placeholder", PropertyType::of(PropertyKind::String), PropertyDefault::literal(""));

    let (property, initial) = match label {
        InputLabel::Attribute(text) | InputLabel::Inner(text) => ("label", text),
        InputLabel::Value => ("value", ""),
    };
    let desc = desc.with_property(
        property,
        PropertyType::of(PropertyKind::String).with_default(initial),
        PropertyDefault::literal(""),
    );

    match label {
        InputLabel::Inner(_) => desc.with_inner_label(),
        _ => desc,
    }
}

fn box_size(node: Option<&Node>, kind: &str) -> Value {
    let Some(node) = node else {
        return Value::from(-1);
    };
    match registry().resolve(kind).sub_container() {
        Some(sub) => Value::from(node.count_children(sub)),
        None => Value::from(-1),
    }
}

fn orientation_attribute(node: Option<&Node>, _kind: &str) -> Value {
    node.and_then(|n| n.data("orientation"))
        .map(Value::from)
        .unwrap_or(Value::Null)
}

fn label_attribute(node: Option<&Node>, _kind: &str) -> Value {
    Value::from(node.and_then(|n| n.data("label")).unwrap_or(""))
}

fn select_option_query(index: usize, path: &str) -> String {
    format!(
        "{}select/option[{}]",
        strip_indexed_segment(path, "gui-select-option"),
        index + 1
    )
}

/// Removes a trailing `tag[n]` from `path`, if present.
fn strip_indexed_segment<'a>(path: &'a str, tag: &str) -> &'a str {
    let Some(rest) = path.strip_suffix(']') else {
        return path;
    };
    let Some(open) = rest.rfind('[') else {
        return path;
    };
    let digits = &rest[open + 1..];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return path;
    }
    rest[..open].strip_suffix(tag).unwrap_or(path)
}

/// Parses a leading integer the way form inputs are usually read: leading
/// whitespace and a sign are allowed, trailing garbage is ignored.
fn parse_leading_int(value: &str) -> Option<i64> {
    let s = value.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let n = digits[..end].parse::<i64>().ok()?;
    Some(if negative { -n } else { n })
}

struct BoxHooks {
    model: BoxModel,
}

impl BoxHooks {
    fn resize(&self, node: &mut Node, kind: &str, size: usize) {
        let sub = self.model.sub_container_kind(kind);
        let mut current = node.count_children(&sub);

        while current > size {
            match node.children.iter().rposition(|c| c.is(&sub)) {
                Some(idx) => {
                    node.children.remove(idx);
                    current -= 1;
                }
                None => break,
            }
        }
        while current < size {
            node.children.push(self.model.new_sub_container(kind));
            current += 1;
        }
    }
}

impl ElementHooks for BoxHooks {
    fn on_create(&self, node: &mut Node, _parent: Option<&Node>, kind: &str) {
        for _ in 0..self.model.initial_count() {
            node.children.push(self.model.new_sub_container(kind));
        }
    }

    fn on_property_update(
        &self,
        node: &mut Node,
        kind: &str,
        property: &str,
        value: &str,
    ) -> Option<bool> {
        if property != "_size" {
            return None;
        }
        match parse_leading_int(value) {
            Some(n) => {
                let size = usize::try_from(n.max(0)).unwrap_or(0).min(MAX_BOX_SLOTS);
                tracing::debug!(kind, size, "resizing box");
                self.resize(node, kind, size);
            }
            None => tracing::debug!(kind, value, "ignoring non-numeric _size"),
        }
        Some(true)
    }
}

struct ExpanderHooks;

impl ElementHooks for ExpanderHooks {
    fn on_create(&self, node: &mut Node, _parent: Option<&Node>, _kind: &str) {
        node.set_data("label", "Expander");
    }
}
