//! Shared fixtures for in-crate tests.

use crate::EduDb;
use crate::repos::ReferenceData;

const FIXTURE: &str = include_str!("../tests/fixtures/reference.json");

pub fn fixture() -> ReferenceData {
    ReferenceData::from_json(FIXTURE).expect("fixture should parse")
}

/// In-memory database with the fixture hierarchy and catalog loaded.
pub async fn seeded_db() -> EduDb {
    let db = EduDb::open_local(":memory:").await.expect("in-memory db");
    db.seed(&fixture()).await.expect("seed fixture");
    db
}
