//! Blocking client for the academic-records API.
//!
//! # Overview
//! Fetches the assignment list and the student profile and pushes profile
//! updates, authenticating every request with a bearer token.
//!
//! # Design
//! - `RecordsApi` builds `HttpRequest` values and parses `HttpResponse`
//!   values without touching the network, so the wire contract is testable
//!   on its own.
//! - `ApiClient` executes those requests with one lazily built `ureq::Agent`
//!   and reads the token from a `TokenProvider` on every call.
//! - Status 200 and 201 are the only accepted statuses; everything else is
//!   `ApiError::UnexpectedStatus`.
//! - Assignment and profile records are opaque JSON objects, passed through
//!   unchanged.

pub mod api_client;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod token;
pub mod types;

pub use api_client::ApiClient;
pub use client::RecordsApi;
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use token::{SharedToken, StaticToken, TokenProvider};
pub use types::{Assignment, AssignmentList, StudentProfile};
