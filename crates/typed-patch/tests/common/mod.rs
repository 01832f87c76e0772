#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use typed_patch::record;

// ── Regression DTOs ───────────────────────────────────────────────────────

#[derive(Debug, Default, Clone, PartialEq)]
pub struct DownDoc {
    pub integers: Vec<i32>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct UpDoc {
    pub down_docs: Vec<DownDoc>,
}

record!(DownDoc { "Integers" => integers });
record!(UpDoc { "DownDocs" => down_docs });

// ── Customer graph ────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub zip: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Order {
    pub number: u32,
    pub total: f64,
    pub lines: Vec<String>,
    pub placed: String,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Customer {
    pub name: String,
    pub age: Option<u8>,
    pub tags: Vec<String>,
    pub address: Address,
    pub orders: Vec<Order>,
    pub attributes: BTreeMap<String, String>,
    pub scores: IndexMap<String, f64>,
    pub id: u64,
    pub history: Vec<String>,
}

record!(Address { "Street" => street, "City" => city, "Zip" => zip });
record! {
    Order { "Number" => number, "Total" => total, "Lines" => lines }
    readonly { "Placed" => placed }
}
record! {
    Customer {
        "Name" => name,
        "Age" => age,
        "Tags" => tags,
        "Address" => address,
        "Orders" => orders,
        "Attributes" => attributes,
        "Scores" => scores,
    }
    readonly { "Id" => id, "History" => history }
}

pub fn sample_customer() -> Customer {
    Customer {
        name: "Ada".to_string(),
        age: Some(36),
        tags: vec!["a".to_string(), "b".to_string()],
        address: Address {
            street: "1 Main".to_string(),
            city: "Springfield".to_string(),
            zip: None,
        },
        orders: vec![Order {
            number: 1,
            total: 9.5,
            lines: vec!["pen".to_string()],
            placed: "2024-01-01".to_string(),
        }],
        attributes: [("tier".to_string(), "gold".to_string())].into_iter().collect(),
        scores: [("q1".to_string(), 1.5)].into_iter().collect(),
        id: 7,
        history: Vec::new(),
    }
}

// ── Fixtures ──────────────────────────────────────────────────────────────

pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

pub fn read_toml<T: serde::de::DeserializeOwned>(name: &str) -> T {
    let path = fixtures_dir().join(name);
    let text = fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {:?}: {e}", path));
    toml::from_str(&text).unwrap_or_else(|e| panic!("failed to parse {:?}: {e}", path))
}

/// The code part of a `PatchError` message (`TYPE_MISMATCH: ...` → `TYPE_MISMATCH`).
pub fn error_code(error: &typed_patch::PatchError) -> String {
    let message = error.to_string();
    message.split(':').next().unwrap_or_default().to_string()
}
