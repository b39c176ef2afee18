use std::fmt;

/// Crate error type carrying process exit codes
#[derive(Debug)]
pub enum PortalError {
    /// Configuration could not be loaded or parsed
    Config(String),
    /// WebDriver session setup failed (fatal, nothing to retry without a session)
    DriverSetup(String),
    /// The field-name catalog was exhausted without restoring connectivity
    LoginFailed { attempts: usize },
    /// Not associated with the target wireless network
    NotAssociated { current: Option<String> },
    /// Operator interrupt during a one-shot login
    Interrupted,
    /// Generic error
    Other(anyhow::Error),
}

impl PortalError {
    /// Get the exit code for this error.
    ///
    /// The one-shot contract is deliberately coarse: 0 means confirmed login
    /// or already-connected, 1 means any failure path or interrupt, so OS
    /// trigger scripts can branch on the exit status alone.
    pub fn exit_code(&self) -> i32 {
        match self {
            PortalError::Config(_)
            | PortalError::DriverSetup(_)
            | PortalError::LoginFailed { .. }
            | PortalError::NotAssociated { .. }
            | PortalError::Interrupted
            | PortalError::Other(_) => 1,
        }
    }
}

impl fmt::Display for PortalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortalError::Config(msg) => write!(f, "Configuration error: {}", msg),
            PortalError::DriverSetup(msg) => {
                write!(f, "WebDriver session setup failed: {}", msg)
            }
            PortalError::LoginFailed { attempts } => {
                write!(
                    f,
                    "Login failed: catalog exhausted after {} attempts without restoring connectivity",
                    attempts
                )
            }
            PortalError::NotAssociated { current } => match current {
                Some(ssid) => write!(f, "Not on the target network (current: {})", ssid),
                None => write!(f, "Not associated with any wireless network"),
            },
            PortalError::Interrupted => write!(f, "Interrupted by operator"),
            PortalError::Other(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for PortalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PortalError::Other(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for PortalError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<PortalError>() {
            Ok(portal_err) => portal_err,
            Err(err) => {
                let msg = err.to_string();
                if msg.contains("geckodriver")
                    || msg.contains("chromedriver")
                    || msg.contains("WebDriver")
                {
                    PortalError::DriverSetup(msg)
                } else if msg.contains("env file") || msg.contains("Invalid URL") {
                    PortalError::Config(msg)
                } else {
                    PortalError::Other(err)
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "errors_test.rs"]
mod errors_test;
