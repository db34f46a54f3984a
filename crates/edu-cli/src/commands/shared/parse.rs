use std::collections::BTreeMap;

use edu_core::enums::Role;
use serde::de::DeserializeOwned;

/// Parse a snake_case enum value using serde-deserialization.
pub fn parse_enum<T>(raw: &str, field: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let normalized = raw.replace('-', "_");
    let json = format!("\"{normalized}\"");
    serde_json::from_str(&json).map_err(|error| anyhow::anyhow!("invalid {field} '{raw}': {error}"))
}

/// Roles are single words; `school-admin` and `school_admin` are accepted too.
pub fn parse_role(raw: &str) -> anyhow::Result<Role> {
    let normalized: String = raw
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .collect::<String>()
        .to_ascii_lowercase();
    parse_enum(&normalized, "role").map_err(|_| {
        anyhow::anyhow!(
            "invalid role '{raw}': expected schooladmin, sectoradmin, regionadmin, or superadmin"
        )
    })
}

/// Parse repeated `COLUMN=VALUE` arguments. Later values win.
pub fn parse_assignments(raw: &[String]) -> anyhow::Result<BTreeMap<String, String>> {
    let mut values = BTreeMap::new();
    for item in raw {
        let (column, value) = item
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("invalid --set '{item}': expected COLUMN=VALUE"))?;
        let column = column.trim();
        if column.is_empty() {
            anyhow::bail!("invalid --set '{item}': column is empty");
        }
        values.insert(column.to_string(), value.to_string());
    }
    Ok(values)
}
