//! Stream schemas
//!
//! The bundled schemas describe the fixed shape of each stream. Leads are
//! extended at runtime with the account's custom fields.

pub mod types;

use futures::TryStreamExt;
use serde_json::{json, Map, Value};

use crate::api::endpoints::{paths, ListParams};
use crate::api::{CloseClient, Paginator};
use crate::error::{AppError, Result};
use crate::models::{CustomField, Stream};

pub use types::json_type_for;

const LEADS_SCHEMA: &str = include_str!("../../schemas/leads.json");
const ACTIVITIES_SCHEMA: &str = include_str!("../../schemas/activities.json");

/// Bundled schema for a stream, before any custom-field discovery
pub fn load_static(stream: Stream) -> Result<Value> {
    let raw = match stream {
        Stream::Leads => LEADS_SCHEMA,
        Stream::Activities => ACTIVITIES_SCHEMA,
    };
    let schema: Value = serde_json::from_str(raw)
        .map_err(|e| AppError::Schema(format!("bundled {} schema is invalid: {}", stream, e)))?;
    if !schema.get("properties").is_some_and(Value::is_object) {
        return Err(AppError::Schema(format!(
            "bundled {} schema has no properties object",
            stream
        )));
    }
    Ok(schema)
}

/// Fetch every lead custom field definition
pub async fn fetch_custom_fields(client: &CloseClient) -> Result<Vec<CustomField>> {
    tracing::info!("Fetching leads custom fields meta data");

    let mut pages = Box::pin(
        Paginator::new(
            client,
            Stream::Leads.name(),
            paths::LEAD_CUSTOM_FIELDS,
            ListParams::new(),
        )
        .into_stream(),
    );

    let mut fields = Vec::new();
    while let Some(page) = pages.try_next().await? {
        for record in page.records {
            fields.push(serde_json::from_value(record)?);
        }
    }
    Ok(fields)
}

/// Replace the lead schema's `custom` sub-schema with the discovered fields
pub fn apply_custom_fields(lead_schema: &mut Value, fields: &[CustomField]) -> Result<()> {
    let properties: Map<String, Value> = fields
        .iter()
        .map(|field| (field.name.clone(), json_type_for(field.field_type.as_deref())))
        .collect();

    let schema_props = lead_schema
        .get_mut("properties")
        .and_then(Value::as_object_mut)
        .ok_or_else(|| AppError::Schema("lead schema has no properties object".into()))?;

    schema_props.insert(
        "custom".to_string(),
        json!({ "type": "object", "properties": properties }),
    );
    Ok(())
}

/// Extend `base_schema` with the account's custom lead fields
pub async fn build_lead_schema(client: &CloseClient, mut base_schema: Value) -> Result<Value> {
    let fields = fetch_custom_fields(client).await?;
    tracing::info!("Discovered {} lead custom fields", fields.len());
    apply_custom_fields(&mut base_schema, &fields)?;
    Ok(base_schema)
}

/// Resolved schemas for both streams
#[derive(Debug, Clone)]
pub struct Schemas {
    pub leads: Value,
    pub activities: Value,
}

impl Schemas {
    /// Build both schemas; leads require a round of custom-field discovery
    pub async fn load(client: &CloseClient) -> Result<Self> {
        let leads = build_lead_schema(client, load_static(Stream::Leads)?).await?;
        let activities = load_static(Stream::Activities)?;
        Ok(Self { leads, activities })
    }

    pub fn get(&self, stream: Stream) -> &Value {
        match stream {
            Stream::Leads => &self.leads,
            Stream::Activities => &self.activities,
        }
    }
}
