//! Browser session management for the UI campaign.
//!
//! The admin console ships with a self-signed certificate, so the
//! browser is launched with certificate errors suppressed and an
//! interstitial bypass is still attempted on navigation - some browser
//! builds show the warning page regardless of the flags.

use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;
use thirtyfour::{By, ChromiumLikeCapabilities, DesiredCapabilities, Key, WebDriver};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::UiConfig;

/// Starts a WebDriver session with TLS-error suppression and a fixed
/// viewport.
pub async fn launch(cfg: &UiConfig) -> Result<WebDriver> {
    let mut caps = DesiredCapabilities::chrome();
    caps.set_ignore_certificate_errors()?;
    caps.set_no_sandbox()?;
    caps.set_disable_dev_shm_usage()?;
    caps.add_arg("--allow-running-insecure-content")?;
    caps.add_arg("--disable-extensions")?;
    caps.add_arg("--window-size=1920,1080")?;
    if cfg.headless {
        caps.set_headless()?;
    }

    let driver = WebDriver::new(&cfg.webdriver_url, caps)
        .await
        .with_context(|| {
            format!(
                "failed to start WebDriver session at {} (is chromedriver running?)",
                cfg.webdriver_url
            )
        })?;
    if let Err(err) = driver.maximize_window().await {
        debug!(error = %err, "window maximize not supported");
    }
    Ok(driver)
}

/// Cookie wipe plus navigation back to the login page, re-running the
/// interstitial bypass. Used between checks so they start equal.
pub async fn fresh_state(driver: &WebDriver, cfg: &UiConfig) {
    if let Err(err) = driver.delete_all_cookies().await {
        warn!(error = %err, "cookie reset failed");
    }
    if let Err(err) = driver.goto(&cfg.base_url).await {
        warn!(error = %err, url = %cfg.base_url, "navigation to login page failed");
    }
    bypass_certificate_interstitial(driver, cfg.page_settle()).await;
}

/// Best-effort screenshot for offline diagnosis of failure paths.
pub async fn capture_screenshot(driver: &WebDriver, dir: &Path, name: &str) {
    if let Err(err) = tokio::fs::create_dir_all(dir).await {
        warn!(error = %err, "could not create screenshot directory");
        return;
    }
    let path = dir.join(name);
    match driver.screenshot(&path).await {
        Ok(()) => info!(path = %path.display(), "screenshot saved"),
        Err(err) => warn!(error = %err, "screenshot failed"),
    }
}

const INTERSTITIAL_MARKER: &str = "your connection is not private";

/// Detects a certificate-warning page by substring and tries, in order,
/// the Advanced button, the Proceed link, and a Tab+Enter keyboard
/// fallback. Every step is best-effort.
pub async fn bypass_certificate_interstitial(driver: &WebDriver, settle: Duration) {
    sleep(settle).await;

    let source = match driver.source().await {
        Ok(source) => source.to_lowercase(),
        Err(_) => return,
    };
    if !source.contains(INTERSTITIAL_MARKER) && !source.contains("certificate") {
        return;
    }
    info!("certificate interstitial detected, attempting bypass");

    if click_first_displayed(driver, By::XPath("//button[contains(text(), 'Advanced')]")).await {
        info!("clicked Advanced");
        sleep(Duration::from_secs(1)).await;
    }
    if click_first_displayed(driver, By::XPath("//a[contains(text(), 'Proceed')]")).await {
        info!("clicked Proceed");
        sleep(Duration::from_secs(2)).await;
    }

    // Keyboard navigation as a last resort.
    let still_blocked = driver
        .source()
        .await
        .map(|s| s.to_lowercase().contains(INTERSTITIAL_MARKER))
        .unwrap_or(false);
    if still_blocked {
        let sequence = format!("{}{}", char::from(Key::Tab), char::from(Key::Enter));
        match driver.action_chain().send_keys(&sequence).perform().await {
            Ok(()) => {
                info!("used keyboard bypass");
                sleep(Duration::from_secs(2)).await;
            }
            Err(err) => debug!(error = %err, "keyboard bypass failed"),
        }
    }
}

async fn click_first_displayed(driver: &WebDriver, by: By) -> bool {
    let elements = match driver.find_all(by).await {
        Ok(elements) => elements,
        Err(_) => return false,
    };
    for element in elements {
        if element.is_displayed().await.unwrap_or(false) && element.click().await.is_ok() {
            return true;
        }
    }
    false
}
