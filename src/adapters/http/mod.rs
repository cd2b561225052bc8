//! Attendance REST API adapter. Implements AttendanceApi and CredentialProvider over reqwest.

pub mod client;
pub mod credentials;
pub mod dto;

pub use client::HttpAttendanceApi;
pub use credentials::{CsrfEndpointCredentials, StaticCredentials};

#[cfg(test)]
pub(crate) mod stub;
