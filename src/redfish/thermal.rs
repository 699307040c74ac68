//! CPU temperature lookup via the system resource's thermal link.

use tracing::{debug, warn};

use crate::redfish::client::RedfishClient;
use crate::redfish::model::{ComputerSystem, Thermal};

pub const SYSTEM_PATH: &str = "/Systems/system";

#[derive(Debug, Clone, PartialEq)]
pub struct CpuTemperature {
    pub name: String,
    pub reading_celsius: f64,
    pub upper_critical: Option<f64>,
    pub upper_fatal: Option<f64>,
}

/// Two-hop traversal: system resource, embedded thermal link, then a
/// linear scan of the temperature list for the first sensor whose name
/// contains "cpu". Every hop failure is an absence, not an error.
pub async fn cpu_temperature(client: &RedfishClient) -> Option<CpuTemperature> {
    let system: ComputerSystem = match client.get_json(SYSTEM_PATH).await {
        Ok(system) => system,
        Err(err) => {
            warn!(error = %err, "system resource unavailable for temperature lookup");
            return None;
        }
    };

    let thermal_ref = match system.thermal {
        Some(link) => link,
        None => {
            debug!("system resource exposes no thermal link");
            return None;
        }
    };

    let thermal: Thermal = match client.get_json(&thermal_ref.odata_id).await {
        Ok(thermal) => thermal,
        Err(err) => {
            warn!(error = %err, "thermal resource unavailable");
            return None;
        }
    };

    find_cpu_sensor(&thermal)
}

fn find_cpu_sensor(thermal: &Thermal) -> Option<CpuTemperature> {
    thermal.temperatures.iter().find_map(|sensor| {
        let name = sensor.name.as_deref()?;
        let reading = sensor.reading_celsius?;
        if name.to_ascii_lowercase().contains("cpu") {
            Some(CpuTemperature {
                name: name.to_string(),
                reading_celsius: reading,
                upper_critical: sensor.upper_threshold_critical,
                upper_fatal: sensor.upper_threshold_fatal,
            })
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn thermal(temps: serde_json::Value) -> Thermal {
        serde_json::from_value(json!({ "Temperatures": temps })).unwrap()
    }

    #[test]
    fn picks_the_first_cpu_sensor_with_a_reading() {
        let t = thermal(json!([
            { "Name": "Ambient", "ReadingCelsius": 24.0 },
            { "Name": "CPU0 Temp" },
            { "Name": "CPU1 Temp", "ReadingCelsius": 52.5, "UpperThresholdCritical": 90.0 },
        ]));
        let cpu = find_cpu_sensor(&t).unwrap();
        assert_eq!(cpu.name, "CPU1 Temp");
        assert_eq!(cpu.reading_celsius, 52.5);
        assert_eq!(cpu.upper_critical, Some(90.0));
        assert_eq!(cpu.upper_fatal, None);
    }

    #[test]
    fn matches_cpu_case_insensitively() {
        let t = thermal(json!([{ "Name": "cpu temp", "ReadingCelsius": 40.0 }]));
        assert!(find_cpu_sensor(&t).is_some());
    }

    #[test]
    fn no_cpu_sensor_is_none() {
        let t = thermal(json!([{ "Name": "Inlet", "ReadingCelsius": 20.0 }]));
        assert!(find_cpu_sensor(&t).is_none());
        assert!(find_cpu_sensor(&thermal(json!([]))).is_none());
    }
}
