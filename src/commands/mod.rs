pub mod analyze;
pub mod install;
pub mod login;
pub mod status;
pub mod watch;

#[cfg(test)]
#[path = "../commands_test.rs"]
mod commands_test;
