//! Record types exchanged with the records API.
//!
//! # Design
//! The server owns the field-level schema of assignments and student
//! profiles, so both are kept as opaque JSON objects. Nothing is dropped,
//! renamed or defaulted on the way through, which is what lets a fetched
//! profile be sent back unchanged and leave the server state as it was.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single assignment as returned by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Assignment(Map<String, Value>);

impl Assignment {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }
}

/// Ordered assignments from `GET /assignments`.
///
/// The array is read from `items`; payloads that name it `assignments` are
/// accepted as well. There is no mutating API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignmentList {
    #[serde(alias = "assignments")]
    items: Vec<Assignment>,
}

impl AssignmentList {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Assignment> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Assignment> {
        self.items.iter()
    }
}

impl IntoIterator for AssignmentList {
    type Item = Assignment;
    type IntoIter = std::vec::IntoIter<Assignment>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a AssignmentList {
    type Item = &'a Assignment;
    type IntoIter = std::slice::Iter<'a, Assignment>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// The authenticated student's profile from `GET /student`, and the payload
/// of `PUT /student`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentProfile(Map<String, Value>);

impl StudentProfile {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Set a field, returning the previous value if there was one.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }
}

impl From<Map<String, Value>> for StudentProfile {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}
