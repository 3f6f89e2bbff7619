//! The PlanetScale stream catalog
//!
//! ```text
//! organizations
//! ├── organization_regions
//! ├── databases
//! │   ├── database_read_only_regions
//! │   ├── database_regions
//! │   └── branches
//! │       ├── branch_schema (disabled)
//! │       ├── backups
//! │       ├── passwords
//! │       └── deploy_requests
//! │           ├── deploy_operations
//! │           └── deploy_request_reviews
//! └── oauth_applications (disabled)
//! regions
//! ```

use super::types::StreamDefinition;
use crate::error::{Error, Result};
use crate::types::{Context, JsonObject, JsonValue};
use serde_json::Number;

/// Spec path of the backups listing, whose `deleted_at` type is corrected
pub const BACKUPS_SPEC_PATH: &str =
    "/organizations/{organization}/databases/{database}/branches/{branch}/backups";

/// Every stream definition, in discovery order
pub fn registry() -> Vec<StreamDefinition> {
    vec![
        StreamDefinition::new("organizations", "/organizations")
            .with_child_context(organization_context)
            .with_post_process(coerce_invoice_budget),
        StreamDefinition::new(
            "organization_regions",
            "/organizations/{organization_name}/regions",
        )
        .with_spec_path("/organizations/{organization}/regions")
        .with_parent("organizations"),
        StreamDefinition::new(
            "databases",
            "/organizations/{organization_name}/databases",
        )
        .with_spec_path("/organizations/{organization}/databases")
        .with_parent("organizations")
        .with_child_context(database_context),
        StreamDefinition::new(
            "database_read_only_regions",
            "/organizations/{organization_name}/databases/{database_name}/read-only-regions",
        )
        .with_spec_path("/organizations/{organization}/databases/{database}/read-only-regions")
        .with_parent("databases"),
        StreamDefinition::new(
            "database_regions",
            "/organizations/{organization_name}/databases/{database_name}/regions",
        )
        .with_spec_path("/organizations/{organization}/databases/{database}/regions")
        .with_parent("databases"),
        StreamDefinition::new(
            "branches",
            "/organizations/{organization_name}/databases/{database_name}/branches",
        )
        .with_spec_path("/organizations/{organization}/databases/{database}/branches")
        .with_parent("databases")
        .with_child_context(branch_context),
        // Its response schema does not resolve to a list item schema.
        StreamDefinition::new(
            "branch_schema",
            "/organizations/{organization_name}/databases/{database_name}/branches/{branch_name}/schema",
        )
        .with_spec_path("/organizations/{organization}/databases/{database}/branches/{name}/schema")
        .with_parent("branches")
        .disabled(),
        StreamDefinition::new(
            "backups",
            "/organizations/{organization_name}/databases/{database_name}/branches/{branch_name}/backups",
        )
        .with_spec_path(BACKUPS_SPEC_PATH)
        .with_parent("branches"),
        StreamDefinition::new(
            "passwords",
            "/organizations/{organization_name}/databases/{database_name}/branches/{branch_name}/passwords",
        )
        .with_spec_path("/organizations/{organization}/databases/{database}/branches/{branch}/passwords")
        .with_parent("branches"),
        // Listed per database, but expanded once per branch.
        StreamDefinition::new(
            "deploy_requests",
            "/organizations/{organization_name}/databases/{database_name}/deploy-requests",
        )
        .with_spec_path("/organizations/{organization}/databases/{database}/deploy-requests")
        .with_parent("branches")
        .with_child_context(deploy_request_context),
        StreamDefinition::new(
            "deploy_operations",
            "/organizations/{organization_name}/databases/{database_name}/deploy-requests/{deploy_request_number}/operations",
        )
        .with_spec_path(
            "/organizations/{organization}/databases/{database}/deploy-requests/{number}/operations",
        )
        .with_parent("deploy_requests"),
        StreamDefinition::new(
            "deploy_request_reviews",
            "/organizations/{organization_name}/databases/{database_name}/deploy-requests/{deploy_request_number}/reviews",
        )
        .with_spec_path(
            "/organizations/{organization}/databases/{database}/deploy-requests/{number}/reviews",
        )
        .with_parent("deploy_requests"),
        // Addressed by organization id rather than name; not synced.
        StreamDefinition::new(
            "oauth_applications",
            "/organizations/{organization_id}/oauth-applications",
        )
        .with_spec_path("/organizations/{organization}/oauth-applications")
        .with_parent("organizations")
        .disabled(),
        StreamDefinition::new("regions", "/regions"),
    ]
}

/// Look a stream up by name, enabled or not
pub fn find(name: &str) -> Result<StreamDefinition> {
    registry()
        .into_iter()
        .find(|s| s.name == name)
        .ok_or_else(|| Error::StreamNotFound {
            stream: name.to_string(),
        })
}

// ============================================================================
// Hooks
// ============================================================================

fn required(stream: &str, record: &JsonObject, field: &str) -> Result<JsonValue> {
    match record.get(field) {
        Some(value) if !value.is_null() => Ok(value.clone()),
        _ => Err(Error::missing_record_field(stream, field)),
    }
}

fn organization_context(record: &JsonObject, context: &Context) -> Result<Context> {
    let mut child = context.clone();
    child.insert(
        "organization_id".into(),
        required("organizations", record, "id")?,
    );
    child.insert(
        "organization_name".into(),
        required("organizations", record, "name")?,
    );
    Ok(child)
}

fn database_context(record: &JsonObject, context: &Context) -> Result<Context> {
    let mut child = context.clone();
    child.insert("database_id".into(), required("databases", record, "id")?);
    child.insert(
        "database_name".into(),
        required("databases", record, "name")?,
    );
    Ok(child)
}

fn branch_context(record: &JsonObject, context: &Context) -> Result<Context> {
    let mut child = context.clone();
    child.insert("branch_id".into(), required("branches", record, "id")?);
    child.insert("branch_name".into(), required("branches", record, "name")?);
    Ok(child)
}

fn deploy_request_context(record: &JsonObject, context: &Context) -> Result<Context> {
    let mut child = context.clone();
    child.insert(
        "deploy_request_id".into(),
        required("deploy_requests", record, "id")?,
    );
    child.insert(
        "deploy_request_number".into(),
        required("deploy_requests", record, "number")?,
    );
    Ok(child)
}

/// The API sends the invoice budget as a decimal string; emit it as a float
fn coerce_invoice_budget(mut record: JsonObject, _context: &Context) -> Result<Option<JsonObject>> {
    const FIELD: &str = "invoice_budget_amount";

    let coerced = match record.get(FIELD) {
        None | Some(JsonValue::Null) => return Ok(Some(record)),
        Some(JsonValue::Number(n)) => n.as_f64(),
        Some(JsonValue::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    }
    .and_then(Number::from_f64)
    .ok_or_else(|| {
        Error::transform(
            "organizations",
            format!("{FIELD} is not a number: {}", record[FIELD]),
        )
    })?;

    record.insert(FIELD.to_string(), JsonValue::Number(coerced));
    Ok(Some(record))
}
