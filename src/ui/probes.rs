//! Ordered element-discovery probes, combined by first-success.
//!
//! The admin console's markup varies across firmware builds, so every
//! lookup is a list of independent strategies tried in order. A probe
//! that errors (stale page, missing frame) counts as a non-match, and
//! the lists can be reordered or extended without touching the callers.

use std::time::Duration;
use thirtyfour::{By, WebDriver, WebElement};
use tokio::time::{sleep, Instant};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Probe {
    pub label: &'static str,
    pub by: By,
}

impl Probe {
    pub fn new(label: &'static str, by: By) -> Self {
        Self { label, by }
    }
}

/// Which login field a discovered input must plausibly be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Username,
    Password,
}

/// Acceptance predicate on an input's type and placeholder attributes.
pub fn accepts_input(kind: FieldKind, input_type: &str, placeholder: &str) -> bool {
    let placeholder = placeholder.to_lowercase();
    match kind {
        FieldKind::Username => {
            matches!(input_type, "text" | "email" | "username" | "") || placeholder.contains("user")
        }
        FieldKind::Password => input_type == "password" || placeholder.contains("pass"),
    }
}

pub fn username_probes() -> Vec<Probe> {
    vec![
        Probe::new("id=username", By::Id("username")),
        Probe::new("name=username", By::Name("username")),
        Probe::new("input[type=text]", By::Css("input[type='text']")),
        Probe::new(
            "placeholder=Username",
            By::XPath("//input[@placeholder='Username']"),
        ),
        Probe::new("id contains user", By::XPath("//input[contains(@id, 'user')]")),
    ]
}

pub fn password_probes() -> Vec<Probe> {
    vec![
        Probe::new("id=password", By::Id("password")),
        Probe::new("name=password", By::Name("password")),
        Probe::new("input[type=password]", By::Css("input[type='password']")),
        Probe::new(
            "placeholder=Password",
            By::XPath("//input[@placeholder='Password']"),
        ),
        Probe::new("id contains pass", By::XPath("//input[contains(@id, 'pass')]")),
    ]
}

pub fn login_button_probes() -> Vec<Probe> {
    vec![
        Probe::new("button text Login", By::XPath("//button[contains(text(), 'Login')]")),
        Probe::new(
            "button text Sign in",
            By::XPath("//button[contains(text(), 'Sign in')]"),
        ),
        Probe::new("input[type=submit]", By::XPath("//input[@type='submit']")),
        Probe::new("button[type=submit]", By::XPath("//button[@type='submit']")),
        Probe::new("id=login", By::Id("login")),
        Probe::new("id=submit", By::Id("submit")),
        Probe::new("button.btn-primary", By::Css("button.btn-primary")),
    ]
}

pub fn dashboard_probes() -> Vec<Probe> {
    vec![
        Probe::new("id=dashboard", By::Id("dashboard")),
        Probe::new("text Dashboard", By::XPath("//*[contains(text(), 'Dashboard')]")),
        Probe::new("text System", By::XPath("//*[contains(text(), 'System')]")),
        Probe::new("text Overview", By::XPath("//*[contains(text(), 'Overview')]")),
        Probe::new("text Server", By::XPath("//*[contains(text(), 'Server')]")),
        Probe::new("class navbar", By::ClassName("navbar")),
        Probe::new("id=navigation", By::Id("navigation")),
    ]
}

pub fn logout_probes() -> Vec<Probe> {
    vec![
        Probe::new("text Logout", By::XPath("//*[contains(text(), 'Logout')]")),
        Probe::new("text Sign out", By::XPath("//*[contains(text(), 'Sign out')]")),
        Probe::new("id=logout", By::Id("logout")),
        Probe::new("class logout", By::ClassName("logout")),
    ]
}

pub fn login_error_probes() -> Vec<Probe> {
    vec![
        Probe::new("class error", By::ClassName("error")),
        Probe::new("class alert-danger", By::ClassName("alert-danger")),
        Probe::new("text invalid", By::XPath("//*[contains(text(), 'invalid')]")),
        Probe::new("text incorrect", By::XPath("//*[contains(text(), 'incorrect')]")),
    ]
}

pub fn lockout_probes() -> Vec<Probe> {
    vec![
        Probe::new("text lock", By::XPath("//*[contains(text(), 'lock')]")),
        Probe::new("text block", By::XPath("//*[contains(text(), 'block')]")),
        Probe::new("text temporarily", By::XPath("//*[contains(text(), 'temporarily')]")),
        Probe::new("text disabled", By::XPath("//*[contains(text(), 'disabled')]")),
    ]
}

async fn is_interactable(element: &WebElement) -> bool {
    element.is_displayed().await.unwrap_or(false) && element.is_enabled().await.unwrap_or(false)
}

/// First visible, enabled input matching the field-kind predicate.
pub async fn find_field(
    driver: &WebDriver,
    probes: &[Probe],
    kind: FieldKind,
) -> Option<WebElement> {
    for probe in probes {
        let elements = match driver.find_all(probe.by.clone()).await {
            Ok(elements) => elements,
            Err(_) => continue,
        };
        for element in elements {
            if !is_interactable(&element).await {
                continue;
            }
            let input_type = element.attr("type").await.ok().flatten().unwrap_or_default();
            let placeholder = element
                .attr("placeholder")
                .await
                .ok()
                .flatten()
                .unwrap_or_default();
            if accepts_input(kind, &input_type, &placeholder) {
                debug!(probe = probe.label, ?kind, "field located");
                return Some(element);
            }
        }
    }
    None
}

/// First visible, enabled element from the probe list.
pub async fn find_clickable(driver: &WebDriver, probes: &[Probe]) -> Option<WebElement> {
    for probe in probes {
        let elements = match driver.find_all(probe.by.clone()).await {
            Ok(elements) => elements,
            Err(_) => continue,
        };
        for element in elements {
            if is_interactable(&element).await {
                debug!(probe = probe.label, "element located");
                return Some(element);
            }
        }
    }
    None
}

/// First visible element from the probe list, enabled or not.
pub async fn find_displayed(driver: &WebDriver, probes: &[Probe]) -> Option<WebElement> {
    for probe in probes {
        let elements = match driver.find_all(probe.by.clone()).await {
            Ok(elements) => elements,
            Err(_) => continue,
        };
        for element in elements {
            if element.is_displayed().await.unwrap_or(false) {
                debug!(probe = probe.label, "element located");
                return Some(element);
            }
        }
    }
    None
}

/// Bounded poll for a clickable element; the browser-side condition wait
/// used by the panel checks.
pub async fn wait_for_clickable(
    driver: &WebDriver,
    probes: &[Probe],
    timeout: Duration,
) -> Option<WebElement> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(element) = find_clickable(driver, probes).await {
            return Some(element);
        }
        if Instant::now() >= deadline {
            return None;
        }
        sleep(Duration::from_millis(500)).await;
    }
}
