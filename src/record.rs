//! Record module: the unit of work flowing through the pool.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

/// An input record plus the value computed for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Sort key; not unique.
    pub name: String,
    /// Checked against the eligibility threshold.
    pub age: i32,
    pub salary: f64,
    /// Filled in exactly once, only for eligible records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computed: Option<String>,
}

impl Record {
    /// Create a record that has not been processed yet.
    pub fn new(name: impl Into<String>, age: i32, salary: f64) -> Self {
        Self {
            name: name.into(),
            age,
            salary,
            computed: None,
        }
    }

    /// Canonical byte form fed to the digest: `name:age:salary` with six decimals.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        format!("{}:{}:{:.6}", self.name, self.age, self.salary).into_bytes()
    }
}

/// Items that carry an ordered sort key.
pub trait Keyed {
    type Key: Ord + ?Sized;

    /// The key used to order items in a collector.
    fn key(&self) -> &Self::Key;
}

impl Keyed for Record {
    type Key = str;

    fn key(&self) -> &str {
        &self.name
    }
}
