//! Contact resolution for leads
//!
//! Lead list responses only carry partial contact references; each one is
//! replaced with the full contact object, in order.

use serde_json::Value;

use crate::api::CloseClient;
use crate::error::{AppError, Result};
use crate::models::Stream;

/// Replace `lead.contacts` with fully fetched contacts, one request per
/// reference. Leads without a `contacts` list are left as they are.
pub async fn resolve_contacts(client: &CloseClient, lead: &mut Value) -> Result<()> {
    let ids = match lead.get("contacts").and_then(Value::as_array) {
        Some(partials) => partials
            .iter()
            .map(|partial| {
                partial
                    .get("id")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| {
                        AppError::Sync(format!(
                            "lead {} has a contact reference without an id",
                            lead.get("id").and_then(Value::as_str).unwrap_or("<unknown>")
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?,
        None => return Ok(()),
    };

    let mut contacts = Vec::with_capacity(ids.len());
    for id in &ids {
        contacts.push(client.get_contact(Stream::Leads.name(), id).await?);
    }

    lead["contacts"] = Value::Array(contacts);
    Ok(())
}
