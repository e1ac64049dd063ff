//! MCP resources: whole-table JSON snapshots.

use crate::protocol::{ResourceContents, ResourceDefinition};
use crate::ToolError;
use roster_db::RosterDb;

pub const EMPLOYEES_URI: &str = "roster://employees";
pub const DEPARTMENTS_URI: &str = "roster://departments";

const JSON_MIME: &str = "application/json";

pub fn list_resources() -> Vec<ResourceDefinition> {
    vec![
        ResourceDefinition {
            uri: EMPLOYEES_URI.to_string(),
            name: "employees".to_string(),
            description: "All employees with their department name".to_string(),
            mime_type: JSON_MIME.to_string(),
        },
        ResourceDefinition {
            uri: DEPARTMENTS_URI.to_string(),
            name: "departments".to_string(),
            description: "All departments".to_string(),
            mime_type: JSON_MIME.to_string(),
        },
    ]
}

/// Read one resource, capped at `max_rows` entries.
pub async fn read_resource(
    db: &RosterDb,
    uri: &str,
    max_rows: usize,
) -> Result<ResourceContents, ToolError> {
    let text = match uri {
        EMPLOYEES_URI => {
            let limit = u32::try_from(max_rows).unwrap_or(u32::MAX);
            serde_json::to_string(&db.list_employees(Some(limit)).await?)?
        }
        DEPARTMENTS_URI => {
            let mut departments = db.list_departments().await?;
            departments.truncate(max_rows);
            serde_json::to_string(&departments)?
        }
        other => return Err(ToolError::UnknownResource(other.to_string())),
    };

    Ok(ResourceContents {
        uri: uri.to_string(),
        mime_type: JSON_MIME.to_string(),
        text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_db::{NewDepartment, NewEmployee};
    use serde_json::Value;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_read_resources() {
        let tmp = TempDir::new().unwrap();
        let db = RosterDb::open(tmp.path().join("roster.sqlite3")).await.unwrap();
        db.create_department(&NewDepartment::new("Ops")).await.unwrap();
        for name in ["A", "B", "C"] {
            db.create_employee(&NewEmployee::new(name)).await.unwrap();
        }

        let contents = read_resource(&db, EMPLOYEES_URI, 2).await.unwrap();
        assert_eq!(contents.mime_type, "application/json");
        let employees: Value = serde_json::from_str(&contents.text).unwrap();
        assert_eq!(employees.as_array().unwrap().len(), 2);

        let contents = read_resource(&db, DEPARTMENTS_URI, 10).await.unwrap();
        let departments: Value = serde_json::from_str(&contents.text).unwrap();
        assert_eq!(departments[0]["name"], "Ops");

        let err = read_resource(&db, "roster://payroll", 10).await.unwrap_err();
        assert_eq!(err.kind(), "UnknownResource");
    }

    #[test]
    fn test_list_resources() {
        let uris: Vec<_> = list_resources().into_iter().map(|r| r.uri).collect();
        assert_eq!(uris, vec![EMPLOYEES_URI, DEPARTMENTS_URI]);
    }
}
