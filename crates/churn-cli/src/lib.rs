//! churn-cli: the `churn` binary's run logic, kept in a library so the
//! integration tests can drive it without spawning a process.
pub mod select;
