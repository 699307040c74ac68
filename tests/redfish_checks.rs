//! Redfish campaign tests against an in-process mock BMC.
//!
//! The mock serves the OpenBMC-shaped resources the campaign traverses,
//! so these tests cover session bootstrap, the auth fallback, and every
//! check tier without needing hardware.

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bmc_harness::campaign::CheckOutcome;
use bmc_harness::config::BmcConfig;
use bmc_harness::redfish::{self, AuthStrategy, RedfishClient};

const TOKEN: &str = "token-123";
// base64("root:0penBmc")
const BASIC_HEADER: &str = "Basic cm9vdDowcGVuQm1j";

fn config_for(server: &MockServer) -> BmcConfig {
    BmcConfig {
        base_url: server.uri(),
        username: "root".into(),
        password: "0penBmc".into(),
        http_timeout_seconds: 10,
    }
}

fn system_body() -> serde_json::Value {
    json!({
        "@odata.id": "/redfish/v1/Systems/system",
        "Id": "system",
        "Name": "system",
        "PowerState": "On",
        "Status": { "Health": "OK", "State": "Enabled" },
        "Thermal": { "@odata.id": "/redfish/v1/Systems/system/Thermal" },
        "Processors": { "@odata.id": "/redfish/v1/Systems/system/Processors" },
        "Memory": { "@odata.id": "/redfish/v1/Systems/system/Memory" },
        "Actions": {
            "#ComputerSystem.Reset": {
                "target": "/redfish/v1/Systems/system/Actions/ComputerSystem.Reset",
                "ResetType@Redfish.AllowableValues": ["On", "ForceOff", "GracefulShutdown"]
            }
        }
    })
}

async fn mount_session_service(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/redfish/v1/SessionService/Sessions"))
        .respond_with(ResponseTemplate::new(201).insert_header("X-Auth-Token", TOKEN))
        .mount(server)
        .await;
}

#[tokio::test]
async fn session_token_is_attached_to_subsequent_requests() {
    let server = MockServer::start().await;
    mount_session_service(&server).await;
    Mock::given(method("GET"))
        .and(path("/redfish/v1/Systems/system"))
        .and(header("X-Auth-Token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(system_body()))
        .mount(&server)
        .await;

    let client = RedfishClient::connect(&config_for(&server)).await.unwrap();
    assert!(matches!(client.auth(), AuthStrategy::Session { .. }));

    let outcome = redfish::check_system_identity(&client).await;
    assert_eq!(outcome, CheckOutcome::Passed);
}

#[tokio::test]
async fn missing_session_service_falls_back_to_basic_auth() {
    let server = MockServer::start().await;
    // No session mock mounted: the POST returns 404.
    Mock::given(method("GET"))
        .and(path("/redfish/v1/Systems/system"))
        .and(header("authorization", BASIC_HEADER))
        .respond_with(ResponseTemplate::new(200).set_body_json(system_body()))
        .mount(&server)
        .await;

    let client = RedfishClient::connect(&config_for(&server)).await.unwrap();
    assert_eq!(*client.auth(), AuthStrategy::Basic);

    let outcome = redfish::check_system_identity(&client).await;
    assert_eq!(outcome, CheckOutcome::Passed);

    match redfish::check_session_authentication(&client).await {
        CheckOutcome::Skipped(reason) => assert!(reason.contains("404")),
        other => panic!("expected skip, got {other:?}"),
    }
}

#[tokio::test]
async fn session_created_without_token_is_a_failure_but_client_survives() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/redfish/v1/SessionService/Sessions"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let client = RedfishClient::connect(&config_for(&server)).await.unwrap();
    assert_eq!(*client.auth(), AuthStrategy::Basic);

    match redfish::check_session_authentication(&client).await {
        CheckOutcome::Failed(reason) => assert!(reason.contains("X-Auth-Token")),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn service_root_requires_version_and_systems_link() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/redfish/v1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "RedfishVersion": "1.9.0",
            "Systems": { "@odata.id": "/redfish/v1/Systems" }
        })))
        .mount(&server)
        .await;

    let client = RedfishClient::connect(&config_for(&server)).await.unwrap();
    assert_eq!(redfish::check_service_root(&client).await, CheckOutcome::Passed);
}

#[tokio::test]
async fn service_root_without_version_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/redfish/v1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Systems": { "@odata.id": "/redfish/v1/Systems" }
        })))
        .mount(&server)
        .await;

    let client = RedfishClient::connect(&config_for(&server)).await.unwrap();
    match redfish::check_service_root(&client).await {
        CheckOutcome::Failed(reason) => assert!(reason.contains("RedfishVersion")),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn invalid_power_state_is_a_hard_failure() {
    let server = MockServer::start().await;
    let mut body = system_body();
    body["PowerState"] = json!("Sleeping");
    Mock::given(method("GET"))
        .and(path("/redfish/v1/Systems/system"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let client = RedfishClient::connect(&config_for(&server)).await.unwrap();
    match redfish::check_system_identity(&client).await {
        CheckOutcome::Failed(reason) => {
            assert_eq!(reason, "invalid PowerState: Sleeping");
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn unavailable_system_resource_skips_identity_check() {
    let server = MockServer::start().await;
    let client = RedfishClient::connect(&config_for(&server)).await.unwrap();

    match redfish::check_system_identity(&client).await {
        CheckOutcome::Skipped(reason) => assert!(reason.contains("unavailable")),
        other => panic!("expected skip, got {other:?}"),
    }
}

#[tokio::test]
async fn too_few_component_links_fail_the_cardinality_check() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/redfish/v1/Systems/system"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Id": "system",
            "PowerState": "On",
            "Status": {},
            "Processors": { "@odata.id": "/redfish/v1/Systems/system/Processors" }
        })))
        .mount(&server)
        .await;

    let client = RedfishClient::connect(&config_for(&server)).await.unwrap();
    match redfish::check_system_components(&client).await {
        CheckOutcome::Failed(reason) => assert!(reason.contains("only 1 of 5")),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn cpu_temperature_within_bounds_passes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/redfish/v1/Systems/system"))
        .respond_with(ResponseTemplate::new(200).set_body_json(system_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/redfish/v1/Systems/system/Thermal"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Temperatures": [
                { "Name": "Ambient", "ReadingCelsius": 23.0 },
                {
                    "Name": "CPU0 Temp",
                    "ReadingCelsius": 52.5,
                    "UpperThresholdCritical": 90.0,
                    "UpperThresholdFatal": 105.0
                }
            ]
        })))
        .mount(&server)
        .await;

    let client = RedfishClient::connect(&config_for(&server)).await.unwrap();
    assert_eq!(
        redfish::check_cpu_temperature(&client).await,
        CheckOutcome::Passed
    );
}

#[tokio::test]
async fn cpu_temperature_above_critical_threshold_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/redfish/v1/Systems/system"))
        .respond_with(ResponseTemplate::new(200).set_body_json(system_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/redfish/v1/Systems/system/Thermal"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Temperatures": [
                { "Name": "CPU0 Temp", "ReadingCelsius": 95.0, "UpperThresholdCritical": 90.0 }
            ]
        })))
        .mount(&server)
        .await;

    let client = RedfishClient::connect(&config_for(&server)).await.unwrap();
    match redfish::check_cpu_temperature(&client).await {
        CheckOutcome::Failed(reason) => assert!(reason.contains("critical")),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn cpu_temperature_out_of_plausible_range_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/redfish/v1/Systems/system"))
        .respond_with(ResponseTemplate::new(200).set_body_json(system_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/redfish/v1/Systems/system/Thermal"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Temperatures": [{ "Name": "CPU0 Temp", "ReadingCelsius": 150.0 }]
        })))
        .mount(&server)
        .await;

    let client = RedfishClient::connect(&config_for(&server)).await.unwrap();
    match redfish::check_cpu_temperature(&client).await {
        CheckOutcome::Failed(reason) => assert!(reason.contains("out of range")),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_thermal_link_skips_the_temperature_check() {
    let server = MockServer::start().await;
    let mut body = system_body();
    body.as_object_mut().unwrap().remove("Thermal");
    Mock::given(method("GET"))
        .and(path("/redfish/v1/Systems/system"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let client = RedfishClient::connect(&config_for(&server)).await.unwrap();
    assert!(matches!(
        redfish::check_cpu_temperature(&client).await,
        CheckOutcome::Skipped(_)
    ));
}

#[tokio::test]
async fn chassis_thermal_sensors_traversal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/redfish/v1/Chassis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Members": [{ "@odata.id": "/redfish/v1/Chassis/chassis" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/redfish/v1/Chassis/chassis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Thermal": { "@odata.id": "/redfish/v1/Chassis/chassis/Thermal" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/redfish/v1/Chassis/chassis/Thermal"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Temperatures": [
                { "Name": "inlet", "ReadingCelsius": 21.0 },
                { "Name": "CPU0 Temp", "ReadingCelsius": 48.0 }
            ]
        })))
        .mount(&server)
        .await;

    let client = RedfishClient::connect(&config_for(&server)).await.unwrap();
    assert_eq!(
        redfish::check_chassis_thermal(&client).await,
        CheckOutcome::Passed
    );
}

#[tokio::test]
async fn chassis_without_members_skips_and_empty_thermal_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/redfish/v1/Chassis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Members": [] })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let client = RedfishClient::connect(&config_for(&server)).await.unwrap();
    assert!(matches!(
        redfish::check_chassis_thermal(&client).await,
        CheckOutcome::Skipped(_)
    ));

    Mock::given(method("GET"))
        .and(path("/redfish/v1/Chassis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Members": [{ "@odata.id": "/redfish/v1/Chassis/chassis" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/redfish/v1/Chassis/chassis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Thermal": { "@odata.id": "/redfish/v1/Chassis/chassis/Thermal" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/redfish/v1/Chassis/chassis/Thermal"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "Temperatures": [] })),
        )
        .mount(&server)
        .await;

    match redfish::check_chassis_thermal(&client).await {
        CheckOutcome::Failed(reason) => assert!(reason.contains("no temperature sensors")),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn power_capabilities_present_and_probe_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/redfish/v1/Systems/system"))
        .respond_with(ResponseTemplate::new(200).set_body_json(system_body()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/redfish/v1/Systems/system/Actions/ComputerSystem.Reset"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = RedfishClient::connect(&config_for(&server)).await.unwrap();
    assert_eq!(
        redfish::check_power_capabilities(&client).await,
        CheckOutcome::Passed
    );
    assert_eq!(
        redfish::check_power_endpoint(&client).await,
        CheckOutcome::Passed
    );
}

#[tokio::test]
async fn rejected_reset_probe_is_only_a_warning() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/redfish/v1/Systems/system"))
        .respond_with(ResponseTemplate::new(200).set_body_json(system_body()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/redfish/v1/Systems/system/Actions/ComputerSystem.Reset"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = RedfishClient::connect(&config_for(&server)).await.unwrap();
    assert!(matches!(
        redfish::check_power_endpoint(&client).await,
        CheckOutcome::Warned(_)
    ));
}

#[tokio::test]
async fn absent_reset_action_skips_power_checks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/redfish/v1/Systems/system"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Id": "system",
            "PowerState": "On",
            "Status": {},
            "Processors": { "@odata.id": "/p" },
            "Memory": { "@odata.id": "/m" }
        })))
        .mount(&server)
        .await;

    let client = RedfishClient::connect(&config_for(&server)).await.unwrap();
    assert!(matches!(
        redfish::check_power_capabilities(&client).await,
        CheckOutcome::Skipped(_)
    ));
}

#[tokio::test]
async fn processor_inventory_falls_back_to_the_system_link() {
    let server = MockServer::start().await;
    // The fixed collection path is not mounted, so it 404s; the system
    // resource advertises the real location.
    let mut body = system_body();
    body["Processors"] = json!({ "@odata.id": "/redfish/v1/Systems/system/ProcessorSet" });
    Mock::given(method("GET"))
        .and(path("/redfish/v1/Systems/system"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/redfish/v1/Systems/system/ProcessorSet"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Members": [],
            "ProcessorSummary": { "Count": 2, "Model": "POWER9", "TotalCores": 16 }
        })))
        .mount(&server)
        .await;

    let client = RedfishClient::connect(&config_for(&server)).await.unwrap();
    assert_eq!(
        redfish::check_processor_inventory(&client).await,
        CheckOutcome::Passed
    );
}

#[tokio::test]
async fn processor_inventory_reads_the_first_member() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/redfish/v1/Systems/system/Processors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Members": [{ "@odata.id": "/redfish/v1/Systems/system/Processors/cpu0" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/redfish/v1/Systems/system/Processors/cpu0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ProcessorType": "CPU",
            "Model": "POWER9",
            "TotalCores": 8,
            "TotalThreads": 32,
            "Socket": "P0"
        })))
        .mount(&server)
        .await;

    let client = RedfishClient::connect(&config_for(&server)).await.unwrap();
    assert_eq!(
        redfish::check_processor_inventory(&client).await,
        CheckOutcome::Passed
    );
}

#[tokio::test]
async fn memory_inventory_tolerates_an_empty_collection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/redfish/v1/Systems/system/Memory"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Members": [] })))
        .mount(&server)
        .await;

    let client = RedfishClient::connect(&config_for(&server)).await.unwrap();
    assert_eq!(
        redfish::check_memory_inventory(&client).await,
        CheckOutcome::Passed
    );
}

#[tokio::test]
async fn repeated_system_reads_must_agree() {
    let server = MockServer::start().await;
    let mut powered_off = system_body();
    powered_off["PowerState"] = json!("Off");

    Mock::given(method("GET"))
        .and(path("/redfish/v1/Systems/system"))
        .respond_with(ResponseTemplate::new(200).set_body_json(system_body()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/redfish/v1/Systems/system"))
        .respond_with(ResponseTemplate::new(200).set_body_json(powered_off))
        .mount(&server)
        .await;

    let client = RedfishClient::connect(&config_for(&server)).await.unwrap();
    match redfish::check_idempotent_reads(&client).await {
        CheckOutcome::Failed(reason) => assert!(reason.contains("PowerState changed")),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn full_campaign_against_a_complete_mock_has_no_failures() {
    let server = MockServer::start().await;
    mount_session_service(&server).await;
    Mock::given(method("GET"))
        .and(path("/redfish/v1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "RedfishVersion": "1.9.0",
            "Systems": { "@odata.id": "/redfish/v1/Systems" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/redfish/v1/Systems/system"))
        .respond_with(ResponseTemplate::new(200).set_body_json(system_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/redfish/v1/Systems/system/Thermal"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Temperatures": [
                { "Name": "CPU0 Temp", "ReadingCelsius": 52.0, "UpperThresholdCritical": 90.0 }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/redfish/v1/Chassis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Members": [{ "@odata.id": "/redfish/v1/Chassis/chassis" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/redfish/v1/Chassis/chassis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Thermal": { "@odata.id": "/redfish/v1/Chassis/chassis/Thermal" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/redfish/v1/Chassis/chassis/Thermal"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Temperatures": [{ "Name": "board", "ReadingCelsius": 30.0 }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/redfish/v1/Systems/system/Processors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Members": [{ "@odata.id": "/redfish/v1/Systems/system/Processors/cpu0" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/redfish/v1/Systems/system/Processors/cpu0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ProcessorType": "CPU", "Model": "POWER9", "TotalCores": 8
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/redfish/v1/Systems/system/Memory"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Members": [{ "@odata.id": "/redfish/v1/Systems/system/Memory/dimm0" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/redfish/v1/Systems/system/Memory/dimm0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "MemoryDeviceType": "DDR4", "CapacityMiB": 16384
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/redfish/v1/Systems/system/Actions/ComputerSystem.Reset"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let report = redfish::checks::run(&config_for(&server)).await.unwrap();
    report.log_summary();
    assert_eq!(report.runs.len(), 11);
    assert!(!report.has_failures());
    assert_eq!(report.skipped(), 0);
    assert_eq!(report.warned(), 0);
}
