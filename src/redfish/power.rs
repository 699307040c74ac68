//! Reset-action discovery on a computer system resource.

use serde_json::Value;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::redfish::model::ComputerSystem;

pub const RESET_ACTION_KEY: &str = "#ComputerSystem.Reset";
pub const ALLOWABLE_VALUES_KEY: &str = "ResetType@Redfish.AllowableValues";

/// Reset types every Redfish implementation is expected to understand.
/// Used as the fallback list when the action omits its allowable values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, EnumIter, Display)]
pub enum ResetType {
    On,
    ForceOff,
    GracefulShutdown,
    ForceRestart,
    GracefulRestart,
}

pub fn standard_reset_types() -> Vec<String> {
    ResetType::iter().map(|r| r.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetCapabilities {
    pub target: String,
    pub allowable_values: Vec<String>,
    /// True when the list came from the standard fallback rather than
    /// the action descriptor.
    pub from_fallback: bool,
}

/// Locates the reset action on a system resource: the well-known key
/// first, then any action key containing "Reset". Returns `None` when
/// no action with a target exists - a valid configuration on BMCs that
/// do not expose power control.
pub fn reset_capabilities(system: &ComputerSystem) -> Option<ResetCapabilities> {
    let action = system
        .actions
        .get(RESET_ACTION_KEY)
        .or_else(|| {
            system
                .actions
                .iter()
                .find(|(key, _)| key.contains("Reset"))
                .map(|(_, value)| value)
        })?;

    let target = action.get("target")?.as_str()?.to_string();

    let declared = action
        .get(ALLOWABLE_VALUES_KEY)
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect::<Vec<_>>()
        })
        .filter(|values| !values.is_empty());

    let (allowable_values, from_fallback) = match declared {
        Some(values) => (values, false),
        None => (standard_reset_types(), true),
    };

    Some(ResetCapabilities {
        target,
        allowable_values,
        from_fallback,
    })
}
