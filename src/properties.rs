//! Property projection: the effective, typed property set of a node as the
//! inspector shows it.

use std::fmt;

use serde_json::Value;

use crate::markup::{Node, is_reserved_attribute, property_name};
use crate::schema::{Choice, PropertyKind, WidgetKindDescriptor, registry};

#[derive(Clone, Debug, PartialEq)]
pub struct EffectiveProperty {
    pub name: String,
    pub value: Value,
    pub kind: PropertyKind,
}

/// Ordered property set. Key order is `id`, then declared properties in
/// descriptor order, then any other attributes in document order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertySheet {
    entries: Vec<EffectiveProperty>,
}

impl PropertySheet {
    pub fn get(&self, name: &str) -> Option<&EffectiveProperty> {
        self.entries.iter().find(|p| p.name == name)
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.get(name).map(|p| &p.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EffectiveProperty> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|p| p.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn upsert(&mut self, name: &str, value: Value) {
        match self.entries.iter_mut().find(|p| p.name == name) {
            Some(p) => p.value = value,
            None => self.entries.push(EffectiveProperty {
                name: name.to_string(),
                value,
                kind: PropertyKind::Unknown,
            }),
        }
    }
}

impl<'a> IntoIterator for &'a PropertySheet {
    type Item = &'a EffectiveProperty;
    type IntoIter = std::slice::Iter<'a, EffectiveProperty>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Declared type of `property` on `desc`, or `None` when undeclared.
/// `id` is always a string.
pub fn declared_kind(desc: &WidgetKindDescriptor, property: &str) -> Option<PropertyKind> {
    if property == "id" {
        return Some(PropertyKind::String);
    }
    desc.property_type(property).map(|t| t.kind)
}

/// Declared type of `property` on `kind`, `Unknown` when undeclared.
pub fn property_type(kind: &str, property: &str) -> PropertyKind {
    declared_kind(registry().resolve(kind), property).unwrap_or(PropertyKind::Unknown)
}

/// Computes the effective property set of `node` (or of a node-less query
/// when `None`). `id` seeds the synthetic `id` entry.
pub fn project_properties(node: Option<&Node>, kind: &str, id: Option<&str>) -> PropertySheet {
    let desc = registry().resolve(kind);
    let mut sheet = PropertySheet::default();

    sheet.upsert("id", id.map(Value::from).unwrap_or(Value::Null));

    for (name, default) in &desc.properties {
        sheet.upsert(name, default.evaluate(node, kind));
    }

    if let Some(node) = node {
        for (attr, raw) in &node.attributes {
            if is_reserved_attribute(attr) {
                continue;
            }
            let name = property_name(attr);
            let value = match declared_kind(desc, name) {
                Some(k) => coerce(raw, k),
                None => Value::from(raw.as_str()),
            };
            sheet.upsert(name, value);
        }
        if desc.has_inner_label {
            sheet.upsert("label", Value::from(node.text()));
        }
    }

    for entry in &mut sheet.entries {
        entry.kind = declared_kind(desc, &entry.name)
            .unwrap_or_else(|| PropertyKind::of_value(&entry.value));
    }
    sheet
}

/// Converts a stored attribute string to its declared type. Values that do
/// not parse stay strings.
pub fn coerce(raw: &str, kind: PropertyKind) -> Value {
    match kind {
        PropertyKind::Number => {
            let trimmed = raw.trim();
            if let Ok(n) = trimmed.parse::<i64>() {
                Value::from(n)
            } else if let Some(n) = trimmed
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
            {
                Value::Number(n)
            } else {
                Value::from(raw)
            }
        }
        PropertyKind::Boolean => match raw {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            other => Value::from(other),
        },
        _ => Value::from(raw),
    }
}

/// Text shown for a value in the property list.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// How the inspector edits a property.
#[derive(Clone, Debug, PartialEq)]
pub enum Editor {
    Text,
    Select(Vec<Choice>),
    Unit,
}

/// Picks the editor for `property` on `kind` given its current value.
/// Select editors gain a leading `NULL` choice unless the value is a boolean.
pub fn editor_for(kind: &str, property: &str, value: &Value) -> Editor {
    let desc = registry().resolve(kind);
    let mut choices = match property_type(kind, property) {
        PropertyKind::Boolean => vec![Choice::new("true", "true"), Choice::new("false", "false")],
        PropertyKind::Mixed => desc
            .property_type(property)
            .map(|t| t.values.clone())
            .unwrap_or_default(),
        PropertyKind::Unit => return Editor::Unit,
        _ => return Editor::Text,
    };
    let current = display_value(value);
    if current != "true" && current != "false" {
        choices.insert(0, Choice::new("NULL", "null"));
    }
    Editor::Select(choices)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Unit {
    #[default]
    Px,
    Em,
    Rem,
    Pt,
    Percent,
}

impl Unit {
    pub const ALL: [Unit; 5] = [Unit::Px, Unit::Em, Unit::Rem, Unit::Pt, Unit::Percent];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Unit::Px => "px",
            Unit::Em => "em",
            Unit::Rem => "rem",
            Unit::Pt => "pt",
            Unit::Percent => "%",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `unit`-typed property value.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum UnitValue {
    #[default]
    Auto,
    Length(f64, Unit),
}

impl UnitValue {
    /// Reads the trailing `<number><unit>` of `raw`; a missing unit is `px`.
    /// Anything without a number is `auto`.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        // `rem` before `em` so the longer suffix wins
        let (number, unit) = [Unit::Rem, Unit::Em, Unit::Px, Unit::Pt, Unit::Percent]
            .into_iter()
            .find_map(|u| raw.strip_suffix(u.as_str()).map(|rest| (rest, u)))
            .unwrap_or((raw, Unit::Px));

        let start = number
            .rfind(|c: char| !(c.is_ascii_digit() || c == '.'))
            .map(|i| i + 1)
            .unwrap_or(0);
        match number[start..].parse::<f64>() {
            Ok(n) => UnitValue::Length(n, unit),
            Err(_) => UnitValue::Auto,
        }
    }
}

impl fmt::Display for UnitValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitValue::Auto => f.write_str("auto"),
            UnitValue::Length(n, unit) => write!(f, "{n}{unit}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::registry;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_button_projection() {
        let node = registry().instantiate("gui-button", None);
        let sheet = project_properties(Some(&node), "gui-button", None);

        let names: Vec<&str> = sheet.names().collect();
        assert_eq!(names, vec!["id", "disabled", "placeholder", "label", "icon"]);
        assert_eq!(sheet.value("label"), Some(&Value::from("Button")));
        assert_eq!(sheet.get("label").unwrap().kind, PropertyKind::String);
        assert_eq!(sheet.value("disabled"), Some(&Value::Null));
        assert_eq!(sheet.get("disabled").unwrap().kind, PropertyKind::Boolean);
        assert_eq!(sheet.get("id").unwrap().kind, PropertyKind::String);
    }

    #[test]
    fn test_attributes_override_defaults_and_are_coerced() {
        let mut node = registry().instantiate("application-window", None);
        node.set_data("width", "400");
        node.set_data("allow_close", "false");
        node.set_data("id", "main");
        node.set_data("custom", "x");
        node.set_data("_size", "9");

        let sheet = project_properties(Some(&node), "application-window", None);
        assert_eq!(sheet.value("id"), Some(&Value::from("main")));
        assert_eq!(sheet.value("width"), Some(&Value::from(400)));
        assert_eq!(sheet.value("allow_close"), Some(&Value::Bool(false)));
        assert_eq!(sheet.value("allow_resize"), Some(&Value::Bool(true)));
        assert_eq!(sheet.value("custom"), Some(&Value::from("x")));
        assert_eq!(sheet.get("custom").unwrap().kind, PropertyKind::String);
        assert!(sheet.get("_size").is_none());
        assert_eq!(sheet.names().last(), Some("custom"));
    }

    #[test]
    fn test_computed_defaults_see_live_node() {
        let node = registry().instantiate("gui-tabs", None);
        let sheet = project_properties(Some(&node), "gui-tabs", None);
        assert_eq!(sheet.value("_size"), Some(&Value::from(1)));
        assert_eq!(sheet.get("_size").unwrap().kind, PropertyKind::Number);

        let sheet = project_properties(None, "gui-tabs", Some("main"));
        assert_eq!(sheet.value("_size"), Some(&Value::from(-1)));
        assert_eq!(sheet.value("id"), Some(&Value::from("main")));
    }

    #[test]
    fn test_projection_is_stable() {
        let node = registry().instantiate("gui-paned-view", None);
        let a = project_properties(Some(&node), "gui-paned-view", None);
        let b = project_properties(Some(&node), "gui-paned-view", None);
        assert_eq!(a, b);
    }

    #[test]
    fn test_property_type_query() {
        assert_eq!(property_type("gui-button", "id"), PropertyKind::String);
        assert_eq!(property_type("gui-hbox-container", "basis"), PropertyKind::Unit);
        assert_eq!(property_type("gui-paned-view", "orientation"), PropertyKind::Mixed);
        assert_eq!(property_type("gui-button", "nope"), PropertyKind::Unknown);
        assert_eq!(property_type("gui-nonsense", "label"), PropertyKind::Unknown);
    }

    #[test]
    fn test_coerce() {
        assert_eq!(coerce("12", PropertyKind::Number), Value::from(12));
        assert_eq!(coerce("1.5", PropertyKind::Number), Value::from(1.5));
        assert_eq!(coerce("wide", PropertyKind::Number), Value::from("wide"));
        assert_eq!(coerce("true", PropertyKind::Boolean), Value::Bool(true));
        assert_eq!(coerce("yes", PropertyKind::Boolean), Value::from("yes"));
        assert_eq!(coerce("12", PropertyKind::String), Value::from("12"));
    }

    #[test]
    fn test_editor_selection() {
        assert_eq!(editor_for("gui-button", "placeholder", &Value::from("")), Editor::Text);
        assert_eq!(editor_for("gui-hbox-container", "basis", &Value::Null), Editor::Unit);

        let Editor::Select(choices) = editor_for("gui-button", "disabled", &Value::Null) else {
            panic!("expected select editor");
        };
        let values: Vec<&str> = choices.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["null", "true", "false"]);

        let Editor::Select(choices) = editor_for("gui-button", "disabled", &Value::Bool(true)) else {
            panic!("expected select editor");
        };
        assert_eq!(choices.len(), 2);

        let Editor::Select(choices) =
            editor_for("gui-paned-view", "orientation", &Value::from("vertical"))
        else {
            panic!("expected select editor");
        };
        assert_eq!(choices[0].label, "NULL");
        assert_eq!(choices[2].value, "vertical");
    }

    #[test]
    fn test_unit_values() {
        assert_eq!(UnitValue::parse("12px"), UnitValue::Length(12.0, Unit::Px));
        assert_eq!(UnitValue::parse("1.5em"), UnitValue::Length(1.5, Unit::Em));
        assert_eq!(UnitValue::parse("2rem"), UnitValue::Length(2.0, Unit::Rem));
        assert_eq!(UnitValue::parse("50%"), UnitValue::Length(50.0, Unit::Percent));
        assert_eq!(UnitValue::parse("30"), UnitValue::Length(30.0, Unit::Px));
        assert_eq!(UnitValue::parse("auto"), UnitValue::Auto);
        assert_eq!(UnitValue::parse(""), UnitValue::Auto);
        assert_eq!(UnitValue::parse("null"), UnitValue::Auto);

        assert_eq!(UnitValue::Length(12.0, Unit::Px).to_string(), "12px");
        assert_eq!(UnitValue::Length(1.5, Unit::Percent).to_string(), "1.5%");
        assert_eq!(UnitValue::Auto.to_string(), "auto");
    }
}
