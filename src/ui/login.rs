//! The bounded login state machine.
//!
//! Each attempt moves through discover -> fill -> submit -> verify, and
//! every non-success path is explicit: fields not found, submit failed,
//! or the confirmation oracle rejected the result. The oracle itself is
//! approximate by design - dashboard markers or a URL without login
//! wording - and can pass spuriously if the console changes wording;
//! callers treat it as a heuristic, not proof.

use std::time::Duration;
use thirtyfour::{Key, WebDriver, WebElement};
use thirtyfour::error::WebDriverResult;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::UiConfig;
use crate::ui::driver::{bypass_certificate_interstitial, capture_screenshot};
use crate::ui::probes::{
    dashboard_probes, find_clickable, find_displayed, find_field, login_button_probes,
    logout_probes, password_probes, username_probes, FieldKind,
};

/// Outcome of a single login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginAttempt {
    FieldsNotFound,
    SubmitFailed(String),
    Rejected,
    Confirmed,
}

/// Multi-attempt login. Retries reload the page and re-run the
/// certificate-interstitial bypass; screenshots are captured on field
/// discovery and submit failures.
pub async fn smart_login(
    driver: &WebDriver,
    username: &str,
    password: &str,
    cfg: &UiConfig,
) -> bool {
    for attempt in 1..=cfg.max_login_attempts {
        info!(attempt, max = cfg.max_login_attempts, user = username, "login attempt");

        if attempt > 1 {
            if let Err(err) = driver.refresh().await {
                warn!(error = %err, "page reload failed");
            }
            bypass_certificate_interstitial(driver, cfg.page_settle()).await;
        }

        match attempt_login(driver, username, password).await {
            LoginAttempt::Confirmed => {
                info!("login confirmed");
                return true;
            }
            LoginAttempt::Rejected => {
                warn!(attempt, "login rejected");
            }
            LoginAttempt::FieldsNotFound => {
                warn!(attempt, "login fields not found");
                capture_screenshot(
                    driver,
                    &cfg.screenshot_dir,
                    &format!("login_fields_not_found_{attempt}.png"),
                )
                .await;
            }
            LoginAttempt::SubmitFailed(reason) => {
                warn!(attempt, %reason, "login submit failed");
                capture_screenshot(
                    driver,
                    &cfg.screenshot_dir,
                    &format!("login_error_{attempt}.png"),
                )
                .await;
            }
        }
    }
    false
}

/// One pass through the state machine.
pub async fn attempt_login(driver: &WebDriver, username: &str, password: &str) -> LoginAttempt {
    let username_field = find_field(driver, &username_probes(), FieldKind::Username).await;
    let password_field = find_field(driver, &password_probes(), FieldKind::Password).await;

    let (username_field, password_field) = match (username_field, password_field) {
        (Some(u), Some(p)) => (u, p),
        _ => return LoginAttempt::FieldsNotFound,
    };

    if let Err(err) = fill_and_submit(driver, &username_field, &password_field, username, password).await
    {
        return LoginAttempt::SubmitFailed(err.to_string());
    }

    // Let the console process the submission before judging it.
    sleep(Duration::from_secs(3)).await;

    if confirmed(driver).await {
        LoginAttempt::Confirmed
    } else {
        LoginAttempt::Rejected
    }
}

async fn fill_and_submit(
    driver: &WebDriver,
    username_field: &WebElement,
    password_field: &WebElement,
    username: &str,
    password: &str,
) -> WebDriverResult<()> {
    username_field.clear().await?;
    username_field.send_keys(username).await?;
    password_field.clear().await?;
    password_field.send_keys(password).await?;

    match find_clickable(driver, &login_button_probes()).await {
        Some(button) => button.click().await?,
        None => {
            // No discoverable button; Enter in the password field.
            password_field
                .send_keys(char::from(Key::Enter).to_string())
                .await?
        }
    }
    Ok(())
}

/// The approximate login-confirmation oracle: a displayed dashboard
/// marker, or a current URL mentioning neither "login" nor "auth".
pub async fn confirmed(driver: &WebDriver) -> bool {
    if find_displayed(driver, &dashboard_probes()).await.is_some() {
        return true;
    }
    url_suggests_logged_in(driver).await
}

async fn url_suggests_logged_in(driver: &WebDriver) -> bool {
    match driver.current_url().await {
        Ok(url) => {
            let url = url.as_str().to_lowercase();
            !url.contains("login") && !url.contains("auth")
        }
        Err(_) => false,
    }
}

/// Best-effort logout so a later check starts from the login page.
pub async fn safe_logout(driver: &WebDriver) -> bool {
    match find_clickable(driver, &logout_probes()).await {
        Some(element) => {
            if element.click().await.is_ok() {
                sleep(Duration::from_secs(2)).await;
                info!("logged out");
                true
            } else {
                false
            }
        }
        None => false,
    }
}
