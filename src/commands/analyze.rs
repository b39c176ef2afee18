use std::path::PathBuf;

use anyhow::Result;
use serde_json::json;
use tracing::info;

use crate::backend::browser::{BrowserBackend, BrowserType, ButtonReport, InputReport, PageReport};
use crate::config::Settings;

const USERNAME_KEYWORDS: &[&str] = &["user", "roll", "id", "name", "login"];
const PASSWORD_KEYWORDS: &[&str] = &["pass", "pwd", "password"];
const SUBMIT_KEYWORDS: &[&str] = &["submit", "login", "sign", "enter"];

fn matches_keyword(input: &InputReport, keywords: &[&str]) -> bool {
    let haystacks = [
        input.name.as_deref().unwrap_or(""),
        input.id.as_deref().unwrap_or(""),
        input.placeholder.as_deref().unwrap_or(""),
    ];
    keywords.iter().any(|kw| {
        haystacks
            .iter()
            .any(|h| h.to_lowercase().contains(kw))
    })
}

fn best_identifier(name: &Option<String>, id: &Option<String>) -> Option<String> {
    name.clone()
        .filter(|s| !s.is_empty())
        .or_else(|| id.clone().filter(|s| !s.is_empty()))
}

/// Text inputs whose name/id/placeholder hints at a username field.
pub fn username_candidates(inputs: &[InputReport]) -> Vec<String> {
    inputs
        .iter()
        .filter(|i| i.input_type == "text" && matches_keyword(i, USERNAME_KEYWORDS))
        .filter_map(|i| best_identifier(&i.name, &i.id))
        .collect()
}

/// Password-typed inputs, or anything whose attributes hint at a password.
pub fn password_candidates(inputs: &[InputReport]) -> Vec<String> {
    inputs
        .iter()
        .filter(|i| i.input_type == "password" || matches_keyword(i, PASSWORD_KEYWORDS))
        .filter_map(|i| best_identifier(&i.name, &i.id))
        .collect()
}

/// Submit-typed controls, or buttons whose text/name/id hints at submission.
pub fn submit_candidates(buttons: &[ButtonReport]) -> Vec<String> {
    buttons
        .iter()
        .filter(|b| {
            b.control_type == "submit"
                || SUBMIT_KEYWORDS.iter().any(|kw| {
                    b.text.to_lowercase().contains(kw)
                        || b.name.as_deref().unwrap_or("").to_lowercase().contains(kw)
                        || b.id.as_deref().unwrap_or("").to_lowercase().contains(kw)
                })
        })
        .filter_map(|b| {
            best_identifier(&b.name, &b.id).or_else(|| {
                if b.text.is_empty() {
                    None
                } else {
                    Some(b.text.clone())
                }
            })
        })
        .collect()
}

fn report_json(report: &PageReport) -> serde_json::Value {
    json!({
        "title": report.title,
        "current_url": report.current_url,
        "inputs": report.inputs,
        "buttons": report.buttons,
        "forms": report.forms,
        "recommendations": {
            "username_field_candidates": username_candidates(&report.inputs),
            "password_field_candidates": password_candidates(&report.inputs),
            "submit_control_candidates": submit_candidates(&report.buttons),
        },
    })
}

/// Open the portal page in a real browser and report its form structure, so
/// the field-name catalog can be corrected for this portal.
pub async fn handle_analyze(
    env_file: Option<PathBuf>,
    browser: String,
    no_headless: bool,
) -> Result<()> {
    let settings = Settings::load(env_file.as_deref())?;
    let browser_type: BrowserType = browser.parse()?;

    info!("Analyzing login page {}", settings.portal.login_url);
    let backend = BrowserBackend::connect(
        browser_type,
        settings.portal.login_url.clone(),
        !no_headless,
    )
    .await?;

    let result = backend.inspect_login_page().await;
    backend.close().await?;

    let report = result?;
    println!("{}", serde_json::to_string_pretty(&report_json(&report))?);
    Ok(())
}
