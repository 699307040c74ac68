//! Data-driven post-login panel checks.
//!
//! A panel is a navigation probe list plus optional content markers.
//! Panel layout varies by firmware build, so a missing navigation entry
//! or marker degrades to a warning rather than a failure.

use thirtyfour::{By, WebDriver};
use tokio::time::sleep;
use tracing::info;

use crate::campaign::CheckOutcome;
use crate::config::UiConfig;
use crate::ui::driver::capture_screenshot;
use crate::ui::probes::{find_displayed, wait_for_clickable, Probe};

pub struct PanelSpec {
    pub name: &'static str,
    pub nav_probes: Vec<Probe>,
    pub marker_probes: Vec<Probe>,
    pub screenshot: &'static str,
}

pub fn power_panel() -> PanelSpec {
    PanelSpec {
        name: "power control",
        nav_probes: vec![
            Probe::new("text Power", By::XPath("//*[contains(text(), 'Power')]")),
            Probe::new("text Control", By::XPath("//*[contains(text(), 'Control')]")),
            Probe::new("id=power-control", By::Id("power-control")),
        ],
        marker_probes: Vec::new(),
        screenshot: "power_management.png",
    }
}

pub fn sensor_panel() -> PanelSpec {
    PanelSpec {
        name: "sensors",
        nav_probes: vec![
            Probe::new("text Sensors", By::XPath("//*[contains(text(), 'Sensors')]")),
            Probe::new(
                "text Monitoring",
                By::XPath("//*[contains(text(), 'Monitoring')]"),
            ),
            Probe::new("text Hardware", By::XPath("//*[contains(text(), 'Hardware')]")),
        ],
        marker_probes: vec![
            Probe::new(
                "text Temperature",
                By::XPath("//*[contains(text(), 'Temperature')]"),
            ),
            Probe::new("text ℃", By::XPath("//*[contains(text(), '℃')]")),
            Probe::new("text °C", By::XPath("//*[contains(text(), '°C')]")),
        ],
        screenshot: "temperature_found.png",
    }
}

pub fn inventory_panel() -> PanelSpec {
    PanelSpec {
        name: "inventory",
        nav_probes: vec![
            Probe::new("text Inventory", By::XPath("//*[contains(text(), 'Inventory')]")),
            Probe::new("text Hardware", By::XPath("//*[contains(text(), 'Hardware')]")),
            Probe::new("text System", By::XPath("//*[contains(text(), 'System')]")),
        ],
        marker_probes: vec![
            Probe::new("text CPU", By::XPath("//*[contains(text(), 'CPU')]")),
            Probe::new("text Memory", By::XPath("//*[contains(text(), 'Memory')]")),
            Probe::new("text DIMM", By::XPath("//*[contains(text(), 'DIMM')]")),
            Probe::new("text Processor", By::XPath("//*[contains(text(), 'Processor')]")),
        ],
        screenshot: "inventory_found.png",
    }
}

/// Navigate to a panel and scan for its content markers.
pub async fn check_panel(driver: &WebDriver, cfg: &UiConfig, spec: PanelSpec) -> CheckOutcome {
    let nav = match wait_for_clickable(driver, &spec.nav_probes, cfg.element_wait()).await {
        Some(nav) => nav,
        None => return CheckOutcome::warned(format!("{} navigation not found", spec.name)),
    };
    if let Err(err) = nav.click().await {
        return CheckOutcome::warned(format!("{} navigation click failed: {err}", spec.name));
    }
    sleep(cfg.page_settle()).await;

    if spec.marker_probes.is_empty() {
        info!(panel = spec.name, "panel reached");
        capture_screenshot(driver, &cfg.screenshot_dir, spec.screenshot).await;
        return CheckOutcome::Passed;
    }

    match find_displayed(driver, &spec.marker_probes).await {
        Some(marker) => {
            let text = marker.text().await.unwrap_or_default();
            info!(panel = spec.name, content = %text, "panel content found");
            capture_screenshot(driver, &cfg.screenshot_dir, spec.screenshot).await;
            CheckOutcome::Passed
        }
        None => CheckOutcome::warned(format!("{} content markers not found", spec.name)),
    }
}
