//! # roster
//!
//! Headless client for a user-management backend: a typed REST client, the
//! record form / record table / upload panel state machines, and the root
//! coordinator that wires them together. Rendering is left to the caller;
//! the `roster` binary drives the same state from the command line.

pub mod config;
pub mod net;
pub mod state;
pub mod validation;
