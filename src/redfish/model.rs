//! Serde views of the Redfish resources the harness inspects.
//!
//! Fields are optional throughout: BMC feature sets vary, and a missing
//! field is usually a skip condition rather than a parse failure.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{Display, EnumString};

/// A resource link embedded in another resource.
#[derive(Debug, Clone, Deserialize)]
pub struct ODataRef {
    #[serde(rename = "@odata.id")]
    pub odata_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceRoot {
    pub redfish_version: Option<String>,
    pub systems: Option<ODataRef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ComputerSystem {
    pub id: Option<String>,
    pub name: Option<String>,
    pub power_state: Option<String>,
    pub status: Option<ResourceStatus>,
    pub thermal: Option<ODataRef>,
    pub processors: Option<ODataRef>,
    pub memory: Option<ODataRef>,
    pub ethernet_interfaces: Option<ODataRef>,
    pub storage: Option<ODataRef>,
    pub bios: Option<ODataRef>,
    #[serde(default)]
    pub actions: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceStatus {
    pub health: Option<String>,
    pub state: Option<String>,
}

/// Power states a Redfish computer system may legitimately report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
pub enum PowerState {
    On,
    Off,
    PoweringOn,
    PoweringOff,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Chassis {
    pub thermal: Option<ODataRef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Thermal {
    #[serde(default)]
    pub temperatures: Vec<TemperatureSensor>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemperatureSensor {
    pub name: Option<String>,
    pub reading_celsius: Option<f64>,
    pub upper_threshold_critical: Option<f64>,
    pub upper_threshold_fatal: Option<f64>,
}

/// Members listing shared by the Processors and Memory collections.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceCollection {
    #[serde(default)]
    pub members: Vec<ODataRef>,
    pub processor_summary: Option<ProcessorSummary>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProcessorSummary {
    pub count: Option<u64>,
    pub model: Option<String>,
    pub total_cores: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Processor {
    pub processor_type: Option<String>,
    pub model: Option<String>,
    pub total_cores: Option<u64>,
    pub total_threads: Option<u64>,
    pub socket: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MemoryModule {
    pub memory_device_type: Option<String>,
    #[serde(rename = "CapacityMiB")]
    pub capacity_mib: Option<u64>,
    pub operating_speed_mhz: Option<u64>,
    pub manufacturer: Option<String>,
}

/// Body for `POST /SessionService/Sessions`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SessionRequest<'a> {
    pub user_name: &'a str,
    pub password: &'a str,
}
