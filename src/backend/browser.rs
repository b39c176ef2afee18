use std::time::Duration;

use anyhow::{Context, Result};
use fantoccini::elements::Element;
use fantoccini::key::Key;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use tracing::{debug, info};
use url::Url;

use crate::backend::{BackendError, SubmitBackend};
use crate::config::{Credentials, FieldPair};
use crate::webdriver_manager::GLOBAL_WEBDRIVER_MANAGER;

/// How long to let the portal process a submitted login before the resolver
/// re-probes connectivity.
const POST_SUBMIT_SETTLE: Duration = Duration::from_secs(3);

/// Supported browser types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserType {
    /// Mozilla Firefox
    Firefox,
    /// Google Chrome/Chromium
    Chrome,
}

impl std::str::FromStr for BrowserType {
    type Err = anyhow::Error;

    /// Parse browser type from string (case-insensitive)
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "firefox" => Ok(BrowserType::Firefox),
            "chrome" | "chromium" => Ok(BrowserType::Chrome),
            _ => anyhow::bail!("Unsupported browser: {}", s),
        }
    }
}

impl BrowserType {
    pub fn driver_name(&self) -> &'static str {
        match self {
            BrowserType::Firefox => "geckodriver",
            BrowserType::Chrome => "chromedriver",
        }
    }
}

/// An element locator strategy: tried in order, misses fall through.
enum Strategy {
    Css(String),
    XPath(String),
}

impl Strategy {
    fn describe(&self) -> &str {
        match self {
            Strategy::Css(s) | Strategy::XPath(s) => s,
        }
    }
}

/// Ordered locator strategies for the username input: exact name, exact id,
/// substring match on name/id/placeholder, then any text input.
fn username_strategies(pair: &FieldPair) -> Vec<Strategy> {
    vec![
        Strategy::Css(format!("input[name='{}']", pair.username_key)),
        Strategy::Css(format!("input#{}", pair.username_key)),
        Strategy::Css(
            "input[name*='user'], input[id*='user'], input[placeholder*='user']".to_string(),
        ),
        Strategy::XPath("//input[@type='text']".to_string()),
    ]
}

fn password_strategies(pair: &FieldPair) -> Vec<Strategy> {
    vec![
        Strategy::Css(format!("input[name='{}']", pair.password_key)),
        Strategy::Css(format!("input#{}", pair.password_key)),
        Strategy::Css("input[name*='pass'], input[id*='pass']".to_string()),
        Strategy::XPath("//input[@type='password']".to_string()),
    ]
}

fn submit_strategies() -> Vec<Strategy> {
    vec![
        Strategy::Css("input[name='submit'], input#submit".to_string()),
        Strategy::Css("input[type='submit']".to_string()),
        Strategy::Css("button[type='submit']".to_string()),
        Strategy::Css("button".to_string()),
    ]
}

/// Browser-driven submission: a WebDriver session that loads the login page,
/// locates the form inputs by ordered strategies, injects credentials and
/// triggers submission.
pub struct BrowserBackend {
    client: Client,
    login_url: Url,
}

impl BrowserBackend {
    /// Connect a WebDriver session. Setup failure here is fatal to the
    /// current process: without a session there is nothing left to retry,
    /// so the error propagates after logging.
    pub async fn connect(browser_type: BrowserType, login_url: Url, headless: bool) -> Result<Self> {
        info!("Connecting to {:?} WebDriver", browser_type);

        let webdriver_url = GLOBAL_WEBDRIVER_MANAGER.ensure_driver(&browser_type).await?;

        let mut caps = serde_json::Map::new();
        // The portal presents a self-signed certificate for its gateway
        // address; the session must not balk at it.
        caps.insert("acceptInsecureCerts".to_string(), json!(true));

        match &browser_type {
            BrowserType::Firefox => {
                let mut args = Vec::new();
                if headless {
                    args.push("--headless".to_string());
                }
                caps.insert("moz:firefoxOptions".to_string(), json!({ "args": args }));
            }
            BrowserType::Chrome => {
                let mut args = vec![
                    "--no-sandbox".to_string(),
                    "--ignore-certificate-errors".to_string(),
                    "--allow-running-insecure-content".to_string(),
                ];
                if headless {
                    args.push("--headless=new".to_string());
                    args.push("--disable-gpu".to_string());
                    args.push("--disable-dev-shm-usage".to_string());
                }
                caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
            }
        }

        debug!("Connecting to WebDriver at {}", webdriver_url);
        let client = ClientBuilder::rustls()
            .capabilities(caps)
            .connect(&webdriver_url)
            .await
            .context("Failed to connect to WebDriver")?;

        Ok(Self { client, login_url })
    }

    /// Close the WebDriver session. Called on every exit path by the owner.
    pub async fn close(self) -> Result<()> {
        self.client.close().await.context("Failed to close WebDriver session")?;
        info!("WebDriver session closed");
        Ok(())
    }

    async fn goto_login(&self) -> Result<(), BackendError> {
        self.client.goto(self.login_url.as_str()).await?;

        // Wait for the page to settle; stale element references otherwise.
        for _ in 0..20 {
            if let Ok(value) = self
                .client
                .execute("return document.readyState === 'complete';", vec![])
                .await
                && value.as_bool().unwrap_or(false)
            {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        Ok(())
    }

    async fn find_first(&self, strategies: &[Strategy]) -> Option<Element> {
        for strategy in strategies {
            let locator = match strategy {
                Strategy::Css(css) => Locator::Css(css),
                Strategy::XPath(xpath) => Locator::XPath(xpath),
            };
            match self.client.find(locator).await {
                Ok(element) => {
                    debug!("Matched locator {}", strategy.describe());
                    return Some(element);
                }
                Err(e) => {
                    debug!("Locator {} missed: {}", strategy.describe(), e);
                }
            }
        }
        None
    }

    /// Click a submit control if one can be located; otherwise press Enter
    /// on the password field; otherwise submit the focused element's form
    /// from script.
    async fn trigger_submit(&self, password_field: &Element) -> Result<(), BackendError> {
        for strategy in submit_strategies() {
            if let Some(element) = self.find_first(std::slice::from_ref(&strategy)).await {
                match element.click().await {
                    Ok(()) => {
                        debug!("Clicked submit control {}", strategy.describe());
                        return Ok(());
                    }
                    Err(e) => {
                        debug!("Click on {} failed: {}", strategy.describe(), e);
                    }
                }
            }
        }

        let enter = String::from(char::from(Key::Enter));
        if password_field.send_keys(&enter).await.is_ok() {
            debug!("Submitted via Enter on the password field");
            return Ok(());
        }

        self.client
            .execute(
                "if (document.activeElement && document.activeElement.form) { \
                   document.activeElement.form.submit(); \
                 }",
                vec![],
            )
            .await?;
        debug!("Submitted via scripted form.submit()");
        Ok(())
    }
}

/// One `<input>` element on the portal page, as seen by the analyzer.
#[derive(Debug, Clone, serde::Serialize)]
pub struct InputReport {
    pub input_type: String,
    pub name: Option<String>,
    pub id: Option<String>,
    pub placeholder: Option<String>,
}

/// One button or submit control on the portal page.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ButtonReport {
    pub control_type: String,
    pub name: Option<String>,
    pub id: Option<String>,
    pub text: String,
}

/// One `<form>` element on the portal page.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FormElementReport {
    pub action: Option<String>,
    pub method: Option<String>,
}

/// Everything the analyzer learned from the live login page.
#[derive(Debug, serde::Serialize)]
pub struct PageReport {
    pub title: String,
    pub current_url: String,
    pub inputs: Vec<InputReport>,
    pub buttons: Vec<ButtonReport>,
    pub forms: Vec<FormElementReport>,
}

impl BrowserBackend {
    /// Enumerate the login page's form structure. This is the manual
    /// diagnostic behind the `analyze` command, not part of the automatic
    /// loop: it reads the real field names so the catalog can be corrected.
    pub async fn inspect_login_page(&self) -> Result<PageReport> {
        self.goto_login()
            .await
            .map_err(|e| anyhow::anyhow!("failed to load login page: {}", e))?;

        let title = self
            .client
            .execute("return document.title;", vec![])
            .await
            .ok()
            .and_then(|v| v.as_str().map(|s| s.to_string()))
            .unwrap_or_default();
        let current_url = self.client.current_url().await?.to_string();

        let mut inputs = Vec::new();
        for element in self.client.find_all(Locator::Css("input")).await? {
            inputs.push(InputReport {
                input_type: element
                    .attr("type")
                    .await
                    .ok()
                    .flatten()
                    .unwrap_or_else(|| "text".to_string()),
                name: element.attr("name").await.ok().flatten(),
                id: element.attr("id").await.ok().flatten(),
                placeholder: element.attr("placeholder").await.ok().flatten(),
            });
        }

        let mut buttons = Vec::new();
        for element in self.client.find_all(Locator::Css("button")).await? {
            buttons.push(ButtonReport {
                control_type: element
                    .attr("type")
                    .await
                    .ok()
                    .flatten()
                    .unwrap_or_else(|| "button".to_string()),
                name: element.attr("name").await.ok().flatten(),
                id: element.attr("id").await.ok().flatten(),
                text: element.text().await.unwrap_or_default(),
            });
        }

        let mut forms = Vec::new();
        for element in self.client.find_all(Locator::Css("form")).await? {
            forms.push(FormElementReport {
                action: element.attr("action").await.ok().flatten(),
                method: element.attr("method").await.ok().flatten(),
            });
        }

        Ok(PageReport {
            title,
            current_url,
            inputs,
            buttons,
            forms,
        })
    }
}

impl SubmitBackend for BrowserBackend {
    /// Load the page fresh, fill both fields, submit, then give the portal a
    /// moment to process before the resolver re-probes. Exhausting every
    /// locator strategy for a required field fails this attempt only.
    async fn submit(
        &mut self,
        pair: &FieldPair,
        credentials: &Credentials,
    ) -> Result<(), BackendError> {
        self.goto_login().await?;

        let Some(username_field) = self.find_first(&username_strategies(pair)).await else {
            return Err(BackendError::Other(format!(
                "no username input matched any locator for {}",
                pair
            )));
        };
        username_field.clear().await?;
        username_field.send_keys(&credentials.username).await?;

        let Some(password_field) = self.find_first(&password_strategies(pair)).await else {
            return Err(BackendError::Other(format!(
                "no password input matched any locator for {}",
                pair
            )));
        };
        password_field.clear().await?;
        password_field.send_keys(&credentials.password).await?;

        self.trigger_submit(&password_field).await?;
        tokio::time::sleep(POST_SUBMIT_SETTLE).await;
        Ok(())
    }
}
