//! Virtual-user behaviors for the load campaign.
//!
//! Three scenarios, one per external host: the BMC Redfish API (two
//! transactions weighted 3:2), the JSONPlaceholder API, and the wttr.in
//! weather API. Each request is an independent trial with no retries;
//! the response is classified by shape-checking the JSON body, and a
//! body that fails to parse is a distinct failure category from one
//! with the wrong shape.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use goose::prelude::*;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::warn;

use crate::config::{BmcConfig, HarnessConfig};
use crate::redfish::model::PowerState;

const SYSTEM_PATH: &str = "/redfish/v1/Systems/system";
const POSTS_PATH: &str = "/posts";
const WEATHER_PATH: &str = "/Novosibirsk?format=j1";

const PLACEHOLDER_HOST: &str = "https://jsonplaceholder.typicode.com";
const WEATHER_HOST: &str = "https://wttr.in";

// --- Response classification -------------------------------------------

pub fn classify_system_info(body: &str) -> Result<(), String> {
    let data: Value =
        serde_json::from_str(body).map_err(|_| "Invalid JSON in system response".to_string())?;
    if data.get("Name").is_some() && data.get("Id").is_some() {
        Ok(())
    } else {
        Err("Invalid system response format".to_string())
    }
}

pub fn classify_power_state(body: &str) -> Result<(), String> {
    let data: Value = serde_json::from_str(body)
        .map_err(|_| "Power state not found or invalid JSON".to_string())?;
    match data.get("PowerState").and_then(Value::as_str) {
        Some(state) if state.parse::<PowerState>().is_ok() => Ok(()),
        Some(state) => Err(format!("Invalid power state: {state}")),
        None => Err("Power state not found or invalid JSON".to_string()),
    }
}

pub fn classify_posts(body: &str) -> Result<(), String> {
    let posts: Value =
        serde_json::from_str(body).map_err(|_| "Invalid JSON in posts response".to_string())?;
    let valid = posts
        .as_array()
        .map(|list| {
            !list.is_empty()
                && list
                    .iter()
                    .all(|post| post.get("id").is_some() && post.get("title").is_some())
        })
        .unwrap_or(false);
    if valid {
        Ok(())
    } else {
        Err("Empty or invalid posts list".to_string())
    }
}

pub fn classify_weather(body: &str) -> Result<(), String> {
    let data: Value =
        serde_json::from_str(body).map_err(|_| "Invalid JSON in weather response".to_string())?;
    if data.get("current_condition").is_some() {
        Ok(())
    } else {
        Err("Invalid weather response format".to_string())
    }
}

// --- Transactions --------------------------------------------------------

/// Issues one named GET and classifies the response body.
async fn fetch_and_classify(
    user: &mut GooseUser,
    path: &str,
    name: &str,
    tag: &str,
    classify: fn(&str) -> Result<(), String>,
) -> TransactionResult {
    let goose_request = GooseRequest::builder()
        .method(GooseMethod::Get)
        .path(path)
        .name(name)
        .build();
    let mut goose = user.request(goose_request).await?;

    match goose.response {
        Ok(response) => {
            let status = response.status();
            if status == StatusCode::OK {
                match response.text().await {
                    Ok(body) => match classify(&body) {
                        Ok(()) => user.set_success(&mut goose.request),
                        Err(reason) => {
                            user.set_failure(&reason, &mut goose.request, None, Some(body.as_str()))
                        }
                    },
                    Err(err) => user.set_failure(
                        &format!("failed to read body for {tag}: {err}"),
                        &mut goose.request,
                        None,
                        None,
                    ),
                }
            } else {
                user.set_failure(
                    &format!("HTTP {} for {tag}", status.as_u16()),
                    &mut goose.request,
                    None,
                    None,
                )
            }
        }
        Err(err) => user.set_failure(
            &format!("request error for {tag}: {err}"),
            &mut goose.request,
            None,
            None,
        ),
    }
}

/// Replaces the default client with one that trusts the BMC's
/// self-signed certificate and carries Basic credentials.
async fn setup_bmc_client(user: &mut GooseUser) -> TransactionResult {
    let bmc = HarnessConfig::load().map(|c| c.bmc).unwrap_or_default();

    let mut headers = HeaderMap::new();
    let credentials = BASE64.encode(format!("{}:{}", bmc.username, bmc.password));
    match HeaderValue::from_str(&format!("Basic {credentials}")) {
        Ok(value) => {
            headers.insert(AUTHORIZATION, value);
        }
        Err(err) => warn!(error = %err, "could not encode Basic credentials"),
    }

    let builder = reqwest::Client::builder()
        .danger_accept_invalid_certs(true)
        .default_headers(headers)
        .user_agent(concat!("bmc-harness/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(10));
    user.set_client_builder(builder).await?;
    Ok(())
}

/// Weather host rejects default client UAs, so send our own.
async fn setup_weather_client(user: &mut GooseUser) -> TransactionResult {
    let builder = reqwest::Client::builder()
        .danger_accept_invalid_certs(true)
        .user_agent("bmc-harness-load-test")
        .timeout(Duration::from_secs(10));
    user.set_client_builder(builder).await?;
    Ok(())
}

async fn get_system_info(user: &mut GooseUser) -> TransactionResult {
    fetch_and_classify(
        user,
        SYSTEM_PATH,
        "OpenBMC - System Info",
        "system info",
        classify_system_info,
    )
    .await
}

async fn get_power_state(user: &mut GooseUser) -> TransactionResult {
    fetch_and_classify(
        user,
        SYSTEM_PATH,
        "OpenBMC - Power State",
        "power state",
        classify_power_state,
    )
    .await
}

async fn get_posts_list(user: &mut GooseUser) -> TransactionResult {
    fetch_and_classify(
        user,
        POSTS_PATH,
        "JSONPlaceholder - Posts List",
        "posts list",
        classify_posts,
    )
    .await
}

async fn get_weather(user: &mut GooseUser) -> TransactionResult {
    fetch_and_classify(
        user,
        WEATHER_PATH,
        "Weather API - Novosibirsk",
        "weather",
        classify_weather,
    )
    .await
}

// --- Scenarios ------------------------------------------------------------

pub fn bmc_scenario(bmc: &BmcConfig) -> Result<Scenario, GooseError> {
    Ok(scenario!("OpenBMC API")
        .set_host(bmc.base_url.trim_end_matches('/'))
        .set_wait_time(Duration::from_secs(1), Duration::from_secs(3))?
        .register_transaction(transaction!(setup_bmc_client).set_on_start())
        .register_transaction(
            transaction!(get_system_info)
                .set_name("OpenBMC - System Info")
                .set_weight(3)?,
        )
        .register_transaction(
            transaction!(get_power_state)
                .set_name("OpenBMC - Power State")
                .set_weight(2)?,
        ))
}

pub fn placeholder_scenario() -> Result<Scenario, GooseError> {
    Ok(scenario!("JSONPlaceholder")
        .set_host(PLACEHOLDER_HOST)
        .set_wait_time(Duration::from_millis(500), Duration::from_secs(2))?
        .register_transaction(
            transaction!(get_posts_list).set_name("JSONPlaceholder - Posts List"),
        ))
}

pub fn weather_scenario() -> Result<Scenario, GooseError> {
    Ok(scenario!("Weather API")
        .set_host(WEATHER_HOST)
        .set_wait_time(Duration::from_secs(1), Duration::from_secs(3))?
        .register_transaction(transaction!(setup_weather_client).set_on_start())
        .register_transaction(transaction!(get_weather).set_name("Weather API - Novosibirsk")))
}
