//! Legal-access filtering over sparse OSM tags.
//!
//! The clauses can be toggled independently: the acquisition pass only checks
//! `access`, while off-road leg building checks all three.

use log::info;
use serde::{Deserialize, Serialize};

use crate::{EdgeCollection, EdgeFeature};

const RESTRICTED_ACCESS: [&str; 3] = ["private", "customers", "restricted"];
const OFFROAD_SURFACES: [&str; 3] = ["gravel", "dirt", "unpaved"];

/// Null-safe admission predicate over `access`, `motor_vehicle` and `surface`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeFilter {
    /// Reject `access` in {private, customers, restricted}; absent admits.
    pub access: bool,
    /// Reject `motor_vehicle=no`; absent admits.
    pub motor_vehicle: bool,
    /// Require `surface` in {gravel, dirt, unpaved}; absent rejects.
    pub surface: bool,
}

impl Default for AttributeFilter {
    fn default() -> Self {
        Self::access_only()
    }
}

impl AttributeFilter {
    pub fn access_only() -> Self {
        Self {
            access: true,
            motor_vehicle: false,
            surface: false,
        }
    }

    pub fn offroad_legal() -> Self {
        Self {
            access: true,
            motor_vehicle: true,
            surface: true,
        }
    }

    pub fn admits(&self, edge: &EdgeFeature) -> bool {
        self.admits_tags(|key| edge.tag(key))
    }

    /// Evaluates the active clauses against an arbitrary tag lookup.
    pub fn admits_tags<'a>(&self, tag: impl Fn(&str) -> Option<&'a str>) -> bool {
        if self.access && !access_allowed(tag("access")) {
            return false;
        }
        if self.motor_vehicle && !motor_vehicle_allowed(tag("motor_vehicle")) {
            return false;
        }
        if self.surface && !offroad_surface(tag("surface")) {
            return false;
        }
        true
    }

    /// Keeps admitted edges in collection order.
    pub fn apply(&self, collection: &EdgeCollection) -> EdgeCollection {
        let kept: EdgeCollection = collection
            .iter()
            .filter(|edge| self.admits(edge))
            .cloned()
            .collect();

        info!(
            "Attribute filter kept {} of {} edges",
            kept.len(),
            collection.len()
        );
        kept
    }
}

fn access_allowed(value: Option<&str>) -> bool {
    value.is_none_or(|v| !RESTRICTED_ACCESS.contains(&v.to_lowercase().as_str()))
}

fn motor_vehicle_allowed(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.to_lowercase() != "no")
}

fn offroad_surface(value: Option<&str>) -> bool {
    value.is_some_and(|v| OFFROAD_SURFACES.contains(&v.to_lowercase().as_str()))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn admits(filter: AttributeFilter, tags: &[(&str, &str)]) -> bool {
        let tags: HashMap<&str, &str> = tags.iter().copied().collect();
        filter.admits_tags(|key| tags.get(key).copied())
    }

    #[test]
    fn private_access_is_rejected_in_any_case() {
        let filter = AttributeFilter::access_only();
        assert!(!admits(filter, &[("access", "private")]));
        assert!(!admits(filter, &[("access", "Private")]));
        assert!(!admits(filter, &[("access", "CUSTOMERS")]));
        assert!(!admits(filter, &[("access", "restricted")]));
    }

    #[test]
    fn missing_or_public_access_is_admitted() {
        let filter = AttributeFilter::access_only();
        assert!(admits(filter, &[]));
        assert!(admits(filter, &[("access", "yes")]));
        assert!(admits(filter, &[("access", "permissive")]));
    }

    #[test]
    fn motor_vehicle_no_is_rejected() {
        let filter = AttributeFilter {
            access: false,
            motor_vehicle: true,
            surface: false,
        };
        assert!(!admits(filter, &[("motor_vehicle", "No")]));
        assert!(admits(filter, &[("motor_vehicle", "yes")]));
        assert!(admits(filter, &[]));
    }

    #[test]
    fn surface_clause_requires_presence() {
        let filter = AttributeFilter::offroad_legal();
        assert!(!admits(filter, &[]));
        assert!(!admits(filter, &[("surface", "asphalt")]));
        assert!(admits(filter, &[("surface", "Gravel")]));
        assert!(admits(filter, &[("surface", "dirt")]));
    }

    #[test]
    fn all_clauses_must_hold() {
        let filter = AttributeFilter::offroad_legal();
        assert!(!admits(filter, &[("surface", "dirt"), ("access", "private")]));
        assert!(!admits(filter, &[("surface", "dirt"), ("motor_vehicle", "no")]));
        assert!(admits(
            filter,
            &[("surface", "unpaved"), ("access", "yes"), ("motor_vehicle", "yes")]
        ));
    }

    #[test]
    fn inactive_surface_clause_ignores_surface() {
        assert!(admits(AttributeFilter::access_only(), &[("surface", "asphalt")]));
    }
}
