//! syswiz core library.
//!
//! The stateful heart of the wizard: the operation catalog, breadcrumb
//! navigation, command rendering with shell-safe substitution, the
//! privilege gate, and the execution engine that streams child-process
//! output back to the interface.

pub mod catalog;
pub mod command;
pub mod errors;
pub mod exec;
pub mod navigator;
pub mod privilege;
