//! Shared test support for the Belot server workspace.

pub mod logging;
