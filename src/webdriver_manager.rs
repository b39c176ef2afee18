use anyhow::{Context, Result};
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::backend::browser::BrowserType;

/// Manages WebDriver processes (geckodriver, chromedriver)
pub struct WebDriverManager {
    processes: Mutex<Vec<DriverProcess>>,
}

struct DriverProcess {
    browser_type: BrowserType,
    child: Child,
    url: String,
}

impl Default for WebDriverManager {
    fn default() -> Self {
        Self {
            processes: Mutex::new(Vec::new()),
        }
    }
}

impl WebDriverManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure a WebDriver is running for the given browser type.
    /// Returns the URL to connect to.
    pub async fn ensure_driver(&self, browser_type: &BrowserType) -> Result<String> {
        let managed_url = {
            let processes = self.processes.lock().unwrap();
            processes
                .iter()
                .find(|p| p.browser_type == *browser_type)
                .map(|p| p.url.clone())
        };
        if let Some(url) = managed_url
            && Self::is_driver_ready(&url).await
        {
            debug!("Using managed WebDriver at {}", url);
            return Ok(url);
        }

        // Check the standard port for an externally managed driver.
        let standard_url = match browser_type {
            BrowserType::Firefox => "http://localhost:4444",
            BrowserType::Chrome => "http://localhost:9515",
        };
        if Self::is_driver_ready(standard_url).await {
            debug!("Found external WebDriver at {}", standard_url);
            return Ok(standard_url.to_string());
        }

        info!("WebDriver not detected, attempting to start automatically...");
        self.start_driver(browser_type).await
    }

    async fn start_driver(&self, browser_type: &BrowserType) -> Result<String> {
        let driver = browser_type.driver_name();
        let (port, args) = match browser_type {
            BrowserType::Firefox => (4444u16, vec!["--port".to_string(), "4444".to_string()]),
            BrowserType::Chrome => (9515u16, vec!["--port=9515".to_string()]),
        };

        if !Self::command_exists(driver) {
            anyhow::bail!(
                "{} not found in PATH. Please install it:\n\
                  macOS: brew install {}\n\
                  Linux: download from the official releases\n\
                  Or start it yourself on port {}",
                driver,
                driver,
                port
            );
        }

        info!("Starting {} on port {}", driver, port);
        let mut cmd = Command::new(driver);
        cmd.args(&args).stdout(Stdio::null()).stderr(Stdio::null());

        // New process group so shutdown can take the browser down with it.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let child = cmd.spawn().context(format!("Failed to start {}", driver))?;
        let url = format!("http://localhost:{}", port);

        {
            let mut processes = self.processes.lock().unwrap();
            processes.push(DriverProcess {
                browser_type: *browser_type,
                child,
                url: url.clone(),
            });
        }

        // 3 seconds total
        for _ in 0..30 {
            if Self::is_driver_ready(&url).await {
                info!("{} started on port {}", driver, port);
                return Ok(url);
            }
            sleep(Duration::from_millis(100)).await;
        }

        self.stop_all();
        anyhow::bail!("{} failed to become ready within timeout", driver)
    }

    /// Check if a command exists in PATH
    pub fn command_exists(command: &str) -> bool {
        let finder = if cfg!(windows) { "where" } else { "which" };
        Command::new(finder)
            .arg(command)
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// A ready driver answers its `/status` endpoint with `value.ready: true`.
    pub async fn is_driver_ready(url: &str) -> bool {
        let status_url = format!("{}/status", url);
        match reqwest::Client::new()
            .get(&status_url)
            .timeout(Duration::from_secs(1))
            .send()
            .await
        {
            Ok(response) => match response.json::<serde_json::Value>().await {
                Ok(body) => body
                    .get("value")
                    .and_then(|v| v.get("ready"))
                    .and_then(|r| r.as_bool())
                    .unwrap_or(false),
                Err(_) => false,
            },
            Err(_) => false,
        }
    }

    /// Stop all managed WebDriver processes
    pub fn stop_all(&self) {
        let mut processes = self.processes.lock().unwrap();
        for process in processes.iter_mut() {
            debug!("Stopping {}", process.browser_type.driver_name());

            #[cfg(unix)]
            {
                // The driver is its own process group leader; kill the group
                // so spawned browser processes go with it.
                let pgid = process.child.id() as i32;
                let _ = Command::new("kill")
                    .args(["-TERM", &format!("-{}", pgid)])
                    .output();
            }

            let _ = process.child.kill();
        }
        processes.clear();
    }
}

impl Drop for WebDriverManager {
    fn drop(&mut self) {
        self.stop_all();
    }
}

// Global WebDriver manager instance
lazy_static::lazy_static! {
    pub static ref GLOBAL_WEBDRIVER_MANAGER: WebDriverManager = WebDriverManager::new();
}

#[cfg(test)]
#[path = "webdriver_manager_test.rs"]
mod webdriver_manager_test;
