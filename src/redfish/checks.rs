//! The Redfish API correctness campaign.
//!
//! Checks run sequentially against one authenticated session. Missing
//! optional resources skip; violated assertions on guaranteed resources
//! fail; transport and parse faults during optional traversals are
//! logged and skip.

use reqwest::StatusCode;
use serde_json::json;
use tracing::{info, warn};

use crate::campaign::{CampaignReport, CheckOutcome};
use crate::config::BmcConfig;
use crate::redfish::client::{RedfishClient, RedfishError, AUTH_TOKEN_HEADER};
use crate::redfish::model::{
    Chassis, ComputerSystem, MemoryModule, PowerState, Processor, ResourceCollection, ServiceRoot,
    Thermal,
};
use crate::redfish::power::reset_capabilities;
use crate::redfish::thermal::{cpu_temperature, SYSTEM_PATH};

pub const CPU_TEMP_MIN_C: f64 = -10.0;
pub const CPU_TEMP_MAX_C: f64 = 120.0;

const PROCESSORS_PATH: &str = "/Systems/system/Processors";
const MEMORY_PATH: &str = "/Systems/system/Memory";
const CHASSIS_PATH: &str = "/Chassis";

/// Runs the full campaign against the configured BMC.
pub async fn run(cfg: &BmcConfig) -> anyhow::Result<CampaignReport> {
    let client = RedfishClient::connect(cfg).await?;
    let mut report = CampaignReport::new("redfish-api");

    report
        .record("service-root-accessible", check_service_root(&client))
        .await;
    report
        .record("session-authentication", check_session_authentication(&client))
        .await;
    report
        .record("system-identity", check_system_identity(&client))
        .await;
    report
        .record("system-component-links", check_system_components(&client))
        .await;
    report
        .record("power-reset-capabilities", check_power_capabilities(&client))
        .await;
    report
        .record("power-reset-endpoint", check_power_endpoint(&client))
        .await;
    report
        .record("cpu-temperature-range", check_cpu_temperature(&client))
        .await;
    report
        .record("chassis-thermal-sensors", check_chassis_thermal(&client))
        .await;
    report
        .record("processor-inventory", check_processor_inventory(&client))
        .await;
    report
        .record("memory-inventory", check_memory_inventory(&client))
        .await;
    report
        .record("system-read-idempotence", check_idempotent_reads(&client))
        .await;

    Ok(report)
}

/// The service root must exist on every Redfish implementation.
pub async fn check_service_root(client: &RedfishClient) -> CheckOutcome {
    let root: ServiceRoot = match client.get_json("").await {
        Ok(root) => root,
        Err(err) => return CheckOutcome::failed(format!("service root unreachable: {err}")),
    };
    match (&root.redfish_version, &root.systems) {
        (Some(version), Some(_)) => {
            info!(redfish_version = %version, "service root accessible");
            CheckOutcome::Passed
        }
        (None, _) => CheckOutcome::failed("service root lacks RedfishVersion"),
        (_, None) => CheckOutcome::failed("service root lacks a Systems link"),
    }
}

/// A 201 from the Session Service must carry a non-empty token header.
pub async fn check_session_authentication(client: &RedfishClient) -> CheckOutcome {
    let resp = match client.session_probe().await {
        Ok(resp) => resp,
        Err(err) => return CheckOutcome::skipped(format!("Session Service unreachable: {err}")),
    };
    let status = resp.status();
    if status != StatusCode::CREATED {
        return CheckOutcome::skipped(format!("Session Service unavailable: HTTP {status}"));
    }
    let token = resp
        .headers()
        .get(AUTH_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if token.is_empty() {
        CheckOutcome::failed(format!("HTTP 201 without a {AUTH_TOKEN_HEADER} header"))
    } else {
        CheckOutcome::Passed
    }
}

async fn fetch_system(client: &RedfishClient) -> Result<ComputerSystem, CheckOutcome> {
    client
        .get_json(SYSTEM_PATH)
        .await
        .map_err(|err| CheckOutcome::skipped(format!("system resource unavailable: {err}")))
}

/// Id, PowerState, and Status are mandatory on the system resource, and
/// PowerState must be one of the four documented values.
pub async fn check_system_identity(client: &RedfishClient) -> CheckOutcome {
    let system = match fetch_system(client).await {
        Ok(system) => system,
        Err(skip) => return skip,
    };

    let id = match system.id {
        Some(id) => id,
        None => return CheckOutcome::failed("system resource missing Id"),
    };
    let power_state = match system.power_state {
        Some(state) => state,
        None => return CheckOutcome::failed("system resource missing PowerState"),
    };
    if power_state.parse::<PowerState>().is_err() {
        return CheckOutcome::failed(format!("invalid PowerState: {power_state}"));
    }
    let status = match system.status {
        Some(status) => status,
        None => return CheckOutcome::failed("system resource missing Status"),
    };

    info!(
        system_id = %id,
        power_state = %power_state,
        health = status.health.as_deref().unwrap_or("Unknown"),
        "system identity verified"
    );
    CheckOutcome::Passed
}

/// At least two of the five expected component links must be present.
pub async fn check_system_components(client: &RedfishClient) -> CheckOutcome {
    let system = match fetch_system(client).await {
        Ok(system) => system,
        Err(skip) => return skip,
    };

    let links = [
        ("Processors", system.processors.is_some()),
        ("Memory", system.memory.is_some()),
        ("EthernetInterfaces", system.ethernet_interfaces.is_some()),
        ("Storage", system.storage.is_some()),
        ("Bios", system.bios.is_some()),
    ];
    let found: Vec<&str> = links
        .iter()
        .filter(|(_, present)| *present)
        .map(|(name, _)| *name)
        .collect();

    info!(components = ?found, "component links discovered");
    if found.len() >= 2 {
        CheckOutcome::Passed
    } else {
        CheckOutcome::failed(format!(
            "only {} of 5 component links present: {:?}",
            found.len(),
            found
        ))
    }
}

/// The reset action, when exposed, must advertise at least one reset
/// type (directly or via the standard fallback list).
pub async fn check_power_capabilities(client: &RedfishClient) -> CheckOutcome {
    let system = match fetch_system(client).await {
        Ok(system) => system,
        Err(skip) => return skip,
    };

    let caps = match reset_capabilities(&system) {
        Some(caps) => caps,
        None => return CheckOutcome::skipped("power control actions not exposed on this system"),
    };

    if caps.from_fallback {
        info!("action omits allowable values, using the standard reset type list");
    }
    if caps.allowable_values.is_empty() {
        return CheckOutcome::failed("reset action advertises no reset types");
    }

    let core: Vec<&String> = caps
        .allowable_values
        .iter()
        .filter(|v| matches!(v.as_str(), "On" | "ForceOff" | "GracefulShutdown"))
        .collect();
    if core.is_empty() {
        warn!(available = ?caps.allowable_values, "core reset types not advertised");
    } else {
        info!(reset_target = %caps.target, core = ?core, "power control capabilities verified");
    }
    CheckOutcome::Passed
}

/// Informational probe of the reset endpoint itself. Acceptance is a
/// 200/202/204; anything else is a warning, since the platform may
/// refuse the action while still being healthy.
pub async fn check_power_endpoint(client: &RedfishClient) -> CheckOutcome {
    let system = match fetch_system(client).await {
        Ok(system) => system,
        Err(skip) => return skip,
    };
    let caps = match reset_capabilities(&system) {
        Some(caps) => caps,
        None => return CheckOutcome::skipped("power control actions not exposed on this system"),
    };

    match client
        .post_json(&caps.target, &json!({ "ResetType": "On" }))
        .await
    {
        Ok(resp) => match resp.status() {
            StatusCode::OK | StatusCode::ACCEPTED | StatusCode::NO_CONTENT => {
                info!("reset action accepted by the server");
                CheckOutcome::Passed
            }
            status => CheckOutcome::warned(format!("reset action returned HTTP {status}")),
        },
        Err(err) => CheckOutcome::warned(format!("reset endpoint unreachable: {err}")),
    }
}

/// CPU temperature must be plausible and below its own thresholds.
pub async fn check_cpu_temperature(client: &RedfishClient) -> CheckOutcome {
    let cpu = match cpu_temperature(client).await {
        Some(cpu) => cpu,
        None => return CheckOutcome::skipped("CPU temperature data not available"),
    };

    info!(sensor = %cpu.name, reading_c = cpu.reading_celsius, "CPU temperature read");

    let reading = cpu.reading_celsius;
    if !(CPU_TEMP_MIN_C..=CPU_TEMP_MAX_C).contains(&reading) {
        return CheckOutcome::failed(format!("CPU temperature out of range: {reading}°C"));
    }
    if let Some(critical) = cpu.upper_critical {
        if reading >= critical {
            return CheckOutcome::failed(format!(
                "CPU temperature {reading}°C at or above critical threshold {critical}°C"
            ));
        }
    }
    if let Some(fatal) = cpu.upper_fatal {
        if reading >= fatal {
            return CheckOutcome::failed(format!(
                "CPU temperature {reading}°C at or above fatal threshold {fatal}°C"
            ));
        }
    }
    CheckOutcome::Passed
}

/// The first chassis member's thermal resource must list at least one
/// temperature sensor; the chain up to it is optional.
pub async fn check_chassis_thermal(client: &RedfishClient) -> CheckOutcome {
    let chassis_collection: ResourceCollection = match client.get_json(CHASSIS_PATH).await {
        Ok(collection) => collection,
        Err(err) => return CheckOutcome::skipped(format!("chassis information unavailable: {err}")),
    };
    let first = match chassis_collection.members.first() {
        Some(member) => member,
        None => return CheckOutcome::skipped("no chassis members reported"),
    };

    let chassis: Chassis = match client.get_json(&first.odata_id).await {
        Ok(chassis) => chassis,
        Err(err) => return CheckOutcome::skipped(format!("chassis member unavailable: {err}")),
    };
    let thermal_ref = match chassis.thermal {
        Some(link) => link,
        None => return CheckOutcome::skipped("chassis exposes no thermal resource"),
    };

    let thermal: Thermal = match client.get_json(&thermal_ref.odata_id).await {
        Ok(thermal) => thermal,
        Err(err) => return CheckOutcome::skipped(format!("thermal resource unavailable: {err}")),
    };

    if thermal.temperatures.is_empty() {
        return CheckOutcome::failed("thermal resource lists no temperature sensors");
    }
    for sensor in thermal.temperatures.iter().take(3) {
        info!(
            sensor = sensor.name.as_deref().unwrap_or("unnamed"),
            reading_c = sensor.reading_celsius,
            "temperature sensor"
        );
    }
    info!(count = thermal.temperatures.len(), "temperature sensors found");
    CheckOutcome::Passed
}

/// Processor inventory: the collection endpoint, with a fallback to the
/// link advertised by the system resource, then to ProcessorSummary.
pub async fn check_processor_inventory(client: &RedfishClient) -> CheckOutcome {
    let collection = match client
        .get_json::<ResourceCollection>(PROCESSORS_PATH)
        .await
    {
        Ok(collection) => collection,
        Err(RedfishError::UnexpectedStatus { status, .. }) if status == StatusCode::NOT_FOUND => {
            // Some firmware builds only advertise the collection via the
            // system resource.
            let system = match fetch_system(client).await {
                Ok(system) => system,
                Err(skip) => return skip,
            };
            let link = match system.processors {
                Some(link) => link,
                None => return CheckOutcome::skipped("processor information unavailable"),
            };
            match client.get_json(&link.odata_id).await {
                Ok(collection) => collection,
                Err(err) => {
                    return CheckOutcome::skipped(format!(
                        "processor information unavailable: {err}"
                    ))
                }
            }
        }
        Err(err) => {
            return CheckOutcome::skipped(format!("processor information unavailable: {err}"))
        }
    };

    let first = match collection.members.first() {
        Some(member) => member,
        None => {
            if let Some(summary) = collection.processor_summary {
                if summary.count.unwrap_or(0) > 0 {
                    info!(
                        count = summary.count,
                        model = summary.model.as_deref().unwrap_or("N/A"),
                        total_cores = summary.total_cores,
                        "processors reported via summary"
                    );
                    return CheckOutcome::Passed;
                }
            }
            return CheckOutcome::skipped("no processors reported by this system");
        }
    };

    match client.get_json::<Processor>(&first.odata_id).await {
        Ok(cpu) => {
            info!(
                processor_type = cpu.processor_type.as_deref().unwrap_or("N/A"),
                model = cpu.model.as_deref().unwrap_or("N/A"),
                total_cores = cpu.total_cores,
                total_threads = cpu.total_threads,
                socket = cpu.socket.as_deref().unwrap_or("N/A"),
                "processor inventory"
            );
        }
        Err(err) => {
            info!(error = %err, "processors found, detailed information unavailable");
        }
    }
    CheckOutcome::Passed
}

/// Memory inventory. An empty collection is acceptable - some firmware
/// reports memory only in consolidated form.
pub async fn check_memory_inventory(client: &RedfishClient) -> CheckOutcome {
    let collection: ResourceCollection = match client.get_json(MEMORY_PATH).await {
        Ok(collection) => collection,
        Err(err) => return CheckOutcome::skipped(format!("memory information unavailable: {err}")),
    };

    let first = match collection.members.first() {
        Some(member) => member,
        None => {
            info!("no discrete memory modules reported");
            return CheckOutcome::Passed;
        }
    };

    match client.get_json::<MemoryModule>(&first.odata_id).await {
        Ok(module) => {
            info!(
                device_type = module.memory_device_type.as_deref().unwrap_or("N/A"),
                capacity_mib = module.capacity_mib,
                speed_mhz = module.operating_speed_mhz,
                manufacturer = module.manufacturer.as_deref().unwrap_or("N/A"),
                modules = collection.members.len(),
                "memory inventory"
            );
        }
        Err(err) => {
            info!(error = %err, "memory modules found, detailed information unavailable");
        }
    }
    CheckOutcome::Passed
}

/// Two reads of the system resource with no intervening action must
/// agree on Id and PowerState.
pub async fn check_idempotent_reads(client: &RedfishClient) -> CheckOutcome {
    let first = match fetch_system(client).await {
        Ok(system) => system,
        Err(skip) => return skip,
    };
    let second = match fetch_system(client).await {
        Ok(system) => system,
        Err(skip) => return skip,
    };

    if first.id != second.id {
        return CheckOutcome::failed(format!(
            "Id changed between reads: {:?} then {:?}",
            first.id, second.id
        ));
    }
    if first.power_state != second.power_state {
        return CheckOutcome::failed(format!(
            "PowerState changed between reads: {:?} then {:?}",
            first.power_state, second.power_state
        ));
    }
    CheckOutcome::Passed
}
