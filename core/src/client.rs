//! Stateless HTTP request builder and response parser for the records API.
//!
//! # Design
//! `RecordsApi` holds only a `base_url`. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method that
//! consumes an `HttpResponse`. The token is an argument of every `build_*`
//! call, so the builder never holds credentials. `ApiClient` wires the two
//! halves to a real transport.

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{AssignmentList, StudentProfile};

pub const ASSIGNMENTS_PATH: &str = "/assignments";
pub const STUDENT_PATH: &str = "/student";

const JSON: &str = "application/json";

#[derive(Debug, Clone)]
pub struct RecordsApi {
    base_url: String,
}

impl RecordsApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_fetch_assignments(&self, token: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.url(ASSIGNMENTS_PATH),
            headers: auth_headers(token),
            body: None,
        }
    }

    pub fn build_fetch_student(&self, token: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.url(STUDENT_PATH),
            headers: auth_headers(token),
            body: None,
        }
    }

    pub fn build_update_student(
        &self,
        token: &str,
        profile: &StudentProfile,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(profile).map_err(ApiError::Serialization)?;
        let mut headers = auth_headers(token);
        headers.push(("content-type".to_string(), JSON.to_string()));
        Ok(HttpRequest {
            method: HttpMethod::Put,
            url: self.url(STUDENT_PATH),
            headers,
            body: Some(body),
        })
    }

    pub fn parse_fetch_assignments(&self, response: HttpResponse) -> Result<AssignmentList, ApiError> {
        check_status(&response)?;
        serde_json::from_str(&response.body).map_err(ApiError::Deserialization)
    }

    pub fn parse_fetch_student(&self, response: HttpResponse) -> Result<StudentProfile, ApiError> {
        check_status(&response)?;
        serde_json::from_str(&response.body).map_err(ApiError::Deserialization)
    }

    /// The body of a successful update is not required and is ignored.
    pub fn parse_update_student(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

fn auth_headers(token: &str) -> Vec<(String, String)> {
    vec![
        ("authorization".to_string(), format!("Bearer {token}")),
        ("accept".to_string(), JSON.to_string()),
    ]
}

/// 200 and 201 are the only accepted statuses.
pub fn accepts_status(status: u16) -> bool {
    matches!(status, 200 | 201)
}

/// Every status outside `accepts_status` is an error carrying only the
/// status. The body is not looked at.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if accepts_status(response.status) {
        Ok(())
    } else {
        Err(ApiError::UnexpectedStatus(response.status))
    }
}
