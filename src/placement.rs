//! Decides whether a widget kind may be attached under another.

use crate::error::{PlacementRejected, PlacementRule};
use crate::schema::{SchemaRegistry, registry};

/// Checks `child` under `parent` against the built-in registry.
pub fn validate(child: &str, parent: &str) -> Result<(), PlacementRejected> {
    validate_with(registry(), child, parent)
}

/// Checks a drop of `child` onto `parent`: a known leaf parent is refused
/// before any rule applies.
pub fn validate_drop(child: &str, parent: &str) -> Result<(), PlacementRejected> {
    if registry().lookup(parent).is_some_and(|p| !p.is_container()) {
        tracing::warn!(child, parent, "drop onto a leaf rejected");
        return Err(PlacementRejected {
            rule: PlacementRule::IsContainer,
            child: child.to_string(),
            parent: parent.to_string(),
        });
    }
    validate(child, parent)
}

/// Rules are checked in a fixed order and the first violation is reported.
/// Unknown kinds on either side are always allowed.
pub fn validate_with(
    registry: &SchemaRegistry,
    child: &str,
    parent: &str,
) -> Result<(), PlacementRejected> {
    let (Some(c), Some(p)) = (registry.lookup(child), registry.lookup(parent)) else {
        return Ok(());
    };

    let reject = |rule: PlacementRule| {
        tracing::warn!(child, parent, rule = %rule, "placement rejected");
        Err(PlacementRejected {
            rule,
            child: child.to_string(),
            parent: parent.to_string(),
        })
    };

    if let Some(allowed) = &p.allow_children
        && !contains(allowed, child)
    {
        return reject(PlacementRule::AllowChildren);
    }
    if let Some(allowed) = &c.allow_parents
        && !contains(allowed, parent)
    {
        return reject(PlacementRule::AllowParents);
    }
    if let Some(invalid) = &p.invalid_children
        && contains(invalid, child)
    {
        return reject(PlacementRule::InvalidChildren);
    }
    if p.allow_inner_containers == Some(false) && c.is_container() {
        return reject(PlacementRule::AllowInnerContainers);
    }
    Ok(())
}

fn contains(kinds: &[String], kind: &str) -> bool {
    kinds.iter().any(|k| k.eq_ignore_ascii_case(kind))
}
