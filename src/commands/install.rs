use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

const LAUNCH_AGENT_LABEL: &str = "com.portalwatch.login";

/// macOS LaunchAgent that runs the one-shot login at load and whenever the
/// network state changes.
pub fn render_launch_agent(exe: &Path, env_file: Option<&Path>) -> String {
    let mut args = format!(
        "        <string>{}</string>\n        <string>login</string>",
        exe.display()
    );
    if let Some(path) = env_file {
        args.push_str(&format!(
            "\n        <string>--env-file</string>\n        <string>{}</string>",
            path.display()
        ));
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>Label</key>
    <string>{label}</string>
    <key>ProgramArguments</key>
    <array>
{args}
    </array>
    <key>RunAtLoad</key>
    <true/>
    <key>KeepAlive</key>
    <dict>
        <key>NetworkState</key>
        <true/>
    </dict>
    <key>StandardOutPath</key>
    <string>/tmp/portalwatch.log</string>
    <key>StandardErrorPath</key>
    <string>/tmp/portalwatch.err.log</string>
</dict>
</plist>
"#,
        label = LAUNCH_AGENT_LABEL,
        args = args,
    )
}

/// Shell trigger for hooking into network-change events by hand (e.g. from
/// a crontab or a location-change watcher).
pub fn render_trigger_script(exe: &Path, env_file: Option<&Path>) -> String {
    let env_arg = env_file
        .map(|p| format!(" --env-file '{}'", p.display()))
        .unwrap_or_default();
    format!(
        "#!/bin/sh\n\
         # Generated by portalwatch install on {date}.\n\
         # Runs the one-shot portal login; exit 0 means logged in or already online.\n\
         '{exe}' login{env_arg} >> /tmp/portalwatch.log 2>&1\n",
        date = chrono::Utc::now().format("%Y-%m-%d"),
        exe = exe.display(),
        env_arg = env_arg,
    )
}

/// systemd user unit running the one-shot login; pair it with the dispatcher
/// script or a timer.
pub fn render_systemd_unit(exe: &Path, env_file: Option<&Path>) -> String {
    let env_arg = env_file
        .map(|p| format!(" --env-file {}", p.display()))
        .unwrap_or_default();
    format!(
        "[Unit]\n\
         Description=Captive portal auto-login\n\
         After=network-online.target\n\
         Wants=network-online.target\n\
         \n\
         [Service]\n\
         Type=oneshot\n\
         ExecStart={exe} login{env_arg}\n\
         \n\
         [Install]\n\
         WantedBy=default.target\n",
        exe = exe.display(),
        env_arg = env_arg,
    )
}

/// NetworkManager dispatcher hook: fires the login on interface up events.
pub fn render_dispatcher_script(exe: &Path, env_file: Option<&Path>) -> String {
    let env_arg = env_file
        .map(|p| format!(" --env-file '{}'", p.display()))
        .unwrap_or_default();
    format!(
        "#!/bin/sh\n\
         # Install into /etc/NetworkManager/dispatcher.d/ (root, mode 755).\n\
         if [ \"$2\" = \"up\" ]; then\n\
         \x20   '{exe}' login{env_arg} >> /tmp/portalwatch.log 2>&1 &\n\
         fi\n",
        exe = exe.display(),
        env_arg = env_arg,
    )
}

fn write_artifact(dir: &Path, name: &str, contents: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    std::fs::write(&path, contents)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {}", path.display());
    Ok(path)
}

/// Generate the auto-start artifacts for this OS so the one-shot login runs
/// on network-state changes. With `--dir` the files land there instead of
/// the platform's standard location.
pub async fn handle_install(env_file: Option<PathBuf>, dir: Option<PathBuf>) -> Result<()> {
    let exe = std::env::current_exe().context("Failed to locate the portalwatch binary")?;
    let env_file = env_file.as_deref();

    if cfg!(target_os = "macos") {
        let out_dir = match dir {
            Some(d) => d,
            None => dirs::home_dir()
                .context("Cannot determine home directory")?
                .join("Library/LaunchAgents"),
        };
        std::fs::create_dir_all(&out_dir)?;
        let plist = write_artifact(
            &out_dir,
            &format!("{}.plist", LAUNCH_AGENT_LABEL),
            &render_launch_agent(&exe, env_file),
        )?;
        write_artifact(&out_dir, "portalwatch-trigger.sh", &render_trigger_script(&exe, env_file))?;

        println!("LaunchAgent written. Activate it with:");
        println!("  launchctl load {}", plist.display());
    } else {
        let out_dir = match dir {
            Some(d) => d,
            None => dirs::config_dir()
                .context("Cannot determine config directory")?
                .join("systemd/user"),
        };
        std::fs::create_dir_all(&out_dir)?;
        let unit = write_artifact(
            &out_dir,
            "portalwatch.service",
            &render_systemd_unit(&exe, env_file),
        )?;
        write_artifact(
            &out_dir,
            "90-portalwatch",
            &render_dispatcher_script(&exe, env_file),
        )?;

        println!("Unit written to {}. Enable it with:", unit.display());
        println!("  systemctl --user daemon-reload && systemctl --user enable --now portalwatch.service");
        println!("For login on every network change, copy 90-portalwatch to /etc/NetworkManager/dispatcher.d/ (root, mode 755).");
    }

    Ok(())
}
