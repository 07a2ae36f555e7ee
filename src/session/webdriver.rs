// src/session/webdriver.rs

//! WebDriver-backed automation session.
//!
//! Requires a running chromedriver (or compatible) server at
//! `catalog.webdriver_url`.

use std::time::Duration;

use async_trait::async_trait;
use thirtyfour::error::WebDriverError;
use thirtyfour::prelude::*;

use crate::error::{AppError, Result};
use crate::models::CatalogConfig;
use crate::session::Automation;

/// A single Chrome session driven over the WebDriver protocol.
pub struct WebDriverSession {
    driver: WebDriver,
}

impl WebDriverSession {
    /// Connect to the WebDriver server and open the catalog start page.
    pub async fn connect(config: &CatalogConfig) -> Result<Self> {
        let mut caps = DesiredCapabilities::chrome();
        caps.add_arg("--start-maximized")
            .map_err(|e| webdriver_error("configure", "chrome", e))?;
        if config.headless {
            caps.set_headless()
                .map_err(|e| webdriver_error("configure", "chrome", e))?;
        }

        log::info!("Connecting to WebDriver at {}", config.webdriver_url);
        let driver = WebDriver::new(config.webdriver_url.as_str(), caps)
            .await
            .map_err(|e| webdriver_error("connect", &config.webdriver_url, e))?;

        let session = Self { driver };
        session.goto(&config.start_url).await?;
        Ok(session)
    }
}

fn webdriver_error(action: &str, target: &str, error: WebDriverError) -> AppError {
    AppError::automation(action, target, error)
}

#[async_trait]
impl Automation for WebDriverSession {
    type Element = WebElement;

    async fn goto(&self, url: &str) -> Result<()> {
        self.driver
            .goto(url)
            .await
            .map_err(|e| webdriver_error("goto", url, e))
    }

    async fn exists(&self, xpath: &str) -> Result<bool> {
        let found = self
            .driver
            .find_all(By::XPath(xpath))
            .await
            .map_err(|e| webdriver_error("exists", xpath, e))?;
        Ok(!found.is_empty())
    }

    async fn find(&self, xpath: &str) -> Result<WebElement> {
        self.driver
            .find(By::XPath(xpath))
            .await
            .map_err(|e| webdriver_error("find", xpath, e))
    }

    async fn find_all(&self, xpath: &str) -> Result<Vec<WebElement>> {
        self.driver
            .find_all(By::XPath(xpath))
            .await
            .map_err(|e| webdriver_error("find_all", xpath, e))
    }

    async fn find_in(&self, parent: &WebElement, xpath: &str) -> Result<WebElement> {
        parent
            .find(By::XPath(xpath))
            .await
            .map_err(|e| webdriver_error("find_in", xpath, e))
    }

    async fn attribute(&self, element: &WebElement, name: &str) -> Result<Option<String>> {
        // Link properties are resolved to absolute URLs by the browser.
        if matches!(name, "href" | "src") {
            let prop = element
                .prop(name)
                .await
                .map_err(|e| webdriver_error("prop", name, e))?;
            if prop.is_some() {
                return Ok(prop);
            }
        }
        element
            .attr(name)
            .await
            .map_err(|e| webdriver_error("attr", name, e))
    }

    async fn text(&self, element: &WebElement) -> Result<String> {
        element
            .text()
            .await
            .map_err(|e| webdriver_error("text", "element", e))
    }

    async fn outer_html(&self, element: &WebElement) -> Result<String> {
        element
            .outer_html()
            .await
            .map_err(|e| webdriver_error("outer_html", "element", e))
    }

    async fn click(&self, element: &WebElement) -> Result<()> {
        element
            .click()
            .await
            .map_err(|e| webdriver_error("click", "element", e))
    }

    async fn switch_to_newest(&self) -> Result<()> {
        let windows = self
            .driver
            .windows()
            .await
            .map_err(|e| webdriver_error("windows", "session", e))?;
        let newest = windows
            .last()
            .cloned()
            .ok_or_else(|| AppError::automation("switch_to_newest", "session", "no windows"))?;
        self.driver
            .switch_to_window(newest)
            .await
            .map_err(|e| webdriver_error("switch_to_window", "newest", e))
    }

    async fn close_context(&self) -> Result<()> {
        self.driver
            .close_window()
            .await
            .map_err(|e| webdriver_error("close_window", "current", e))
    }

    async fn switch_to_main(&self) -> Result<()> {
        let windows = self
            .driver
            .windows()
            .await
            .map_err(|e| webdriver_error("windows", "session", e))?;
        let main = windows
            .first()
            .cloned()
            .ok_or_else(|| AppError::automation("switch_to_main", "session", "no windows"))?;
        self.driver
            .switch_to_window(main)
            .await
            .map_err(|e| webdriver_error("switch_to_window", "main", e))
    }

    async fn wait(&self, duration: Duration) -> Result<()> {
        tokio::time::sleep(duration).await;
        Ok(())
    }

    async fn quit(&self) -> Result<()> {
        self.driver
            .clone()
            .quit()
            .await
            .map_err(|e| webdriver_error("quit", "session", e))
    }
}
