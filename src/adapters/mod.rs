//! Infrastructure adapters. Implement outbound ports.
//!
//! Attendance REST API, frame source, roster file, terminal UI. Map errors to DomainError.

pub mod camera;
pub mod clock;
pub mod http;
pub mod persistence;
pub mod ui;
