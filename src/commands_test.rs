// Unit tests for command helpers: analyzer classification and install
// artifact rendering

use std::path::Path;

use pretty_assertions::assert_eq;

use crate::backend::browser::{ButtonReport, InputReport};
use crate::commands::analyze::{password_candidates, submit_candidates, username_candidates};
use crate::commands::install::{
    render_dispatcher_script, render_launch_agent, render_systemd_unit, render_trigger_script,
};

fn input(input_type: &str, name: Option<&str>, id: Option<&str>, placeholder: Option<&str>) -> InputReport {
    InputReport {
        input_type: input_type.to_string(),
        name: name.map(String::from),
        id: id.map(String::from),
        placeholder: placeholder.map(String::from),
    }
}

#[test]
fn test_username_candidates_match_keywords() {
    let inputs = vec![
        input("text", Some("roll_number"), None, None),
        input("text", Some("captcha"), None, None),
        input("text", None, Some("loginid"), None),
        input("password", Some("user_password"), None, None),
        input("hidden", Some("username"), None, None),
    ];
    assert_eq!(
        username_candidates(&inputs),
        vec!["roll_number".to_string(), "loginid".to_string()]
    );
}

#[test]
fn test_password_candidates_prefer_type_then_keywords() {
    let inputs = vec![
        input("password", Some("pwd"), None, None),
        input("text", Some("passphrase"), None, None),
        input("text", Some("search"), None, None),
    ];
    assert_eq!(
        password_candidates(&inputs),
        vec!["pwd".to_string(), "passphrase".to_string()]
    );
}

#[test]
fn test_candidates_fall_back_to_id_when_name_missing() {
    let inputs = vec![input("password", None, Some("pass-input"), None)];
    assert_eq!(password_candidates(&inputs), vec!["pass-input".to_string()]);
}

#[test]
fn test_submit_candidates() {
    let buttons = vec![
        ButtonReport {
            control_type: "submit".to_string(),
            name: Some("btnSubmit".to_string()),
            id: None,
            text: "Go".to_string(),
        },
        ButtonReport {
            control_type: "button".to_string(),
            name: None,
            id: None,
            text: "Sign In".to_string(),
        },
        ButtonReport {
            control_type: "button".to_string(),
            name: None,
            id: None,
            text: "Cancel".to_string(),
        },
    ];
    assert_eq!(
        submit_candidates(&buttons),
        vec!["btnSubmit".to_string(), "Sign In".to_string()]
    );
}

#[test]
fn test_launch_agent_invokes_one_shot_login() {
    let plist = render_launch_agent(Path::new("/usr/local/bin/portalwatch"), None);
    assert!(plist.contains("<string>com.portalwatch.login</string>"));
    assert!(plist.contains("<string>/usr/local/bin/portalwatch</string>"));
    assert!(plist.contains("<string>login</string>"));
    assert!(plist.contains("NetworkState"));
    assert!(!plist.contains("--env-file"));
}

#[test]
fn test_launch_agent_passes_env_file() {
    let plist = render_launch_agent(
        Path::new("/usr/local/bin/portalwatch"),
        Some(Path::new("/home/me/.wifi.env")),
    );
    assert!(plist.contains("<string>--env-file</string>"));
    assert!(plist.contains("<string>/home/me/.wifi.env</string>"));
}

#[test]
fn test_systemd_unit_is_oneshot() {
    let unit = render_systemd_unit(Path::new("/usr/bin/portalwatch"), None);
    assert!(unit.contains("Type=oneshot"));
    assert!(unit.contains("ExecStart=/usr/bin/portalwatch login"));
    assert!(unit.contains("network-online.target"));
}

#[tokio::test]
async fn test_install_writes_artifacts_into_custom_dir() {
    let dir = tempfile::tempdir().unwrap();
    crate::commands::install::handle_install(None, Some(dir.path().to_path_buf()))
        .await
        .unwrap();
    // One service descriptor plus one trigger script, whatever the OS.
    let count = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(count, 2);
}

#[test]
fn test_trigger_scripts_are_shell_scripts() {
    let trigger = render_trigger_script(Path::new("/usr/bin/portalwatch"), None);
    assert!(trigger.starts_with("#!/bin/sh"));
    assert!(trigger.contains("portalwatch' login"));

    let dispatcher = render_dispatcher_script(Path::new("/usr/bin/portalwatch"), None);
    assert!(dispatcher.starts_with("#!/bin/sh"));
    assert!(dispatcher.contains("\"$2\" = \"up\""));
}
