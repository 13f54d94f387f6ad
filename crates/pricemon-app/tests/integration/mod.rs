//! Integration tests for pricemon-app.
//!
//! These tests verify the interaction between components:
//! - Random-walk feed driving the coordinator
//! - Command entry against live instrument state
//! - Test mode and refresh period control

pub mod common;
