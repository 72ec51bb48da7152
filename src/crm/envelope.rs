//! CRM response envelope decoding.
//!
//! Every reply is a JSON object carrying either `result` or
//! `error` + `error_description`. Ids inside `result` arrive as numbers
//! or as numeric strings depending on the method.

use serde_json::Value;

use super::CrmError;

/// Extracts `result` from an envelope, or converts `error` into
/// [`CrmError::Remote`].
///
/// # Errors
///
/// Returns [`CrmError::Remote`] for error envelopes and
/// [`CrmError::InvalidResponse`] when neither key is present.
pub fn unwrap_envelope(envelope: Value) -> Result<Value, CrmError> {
    let Value::Object(mut map) = envelope else {
        return Err(CrmError::InvalidResponse(
            "envelope is not a JSON object".to_string(),
        ));
    };

    if let Some(error) = map.get("error") {
        let code = scalar_text(error);
        let description = map
            .get("error_description")
            .map(scalar_text)
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| code.clone());
        return Err(CrmError::Remote { code, description });
    }

    map.remove("result").ok_or_else(|| {
        CrmError::InvalidResponse("envelope has neither result nor error".to_string())
    })
}

/// Decodes a CRM record id from a number or a numeric string.
///
/// # Errors
///
/// Returns [`CrmError::InvalidResponse`] when `value` is not a positive
/// integer id.
pub fn parse_id(value: &Value) -> Result<u64, CrmError> {
    let id = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    id.filter(|id| *id > 0)
        .ok_or_else(|| CrmError::InvalidResponse(format!("expected record id, got {value}")))
}

/// First contact id of a `crm.duplicate.findbycomm` result.
///
/// The CRM answers `{"CONTACT": [..]}` on a match and `[]` when nothing
/// matched; both an empty list and a missing key mean "no contact".
///
/// # Errors
///
/// Returns [`CrmError::InvalidResponse`] when the first id is malformed.
pub fn first_contact_id(result: &Value) -> Result<Option<u64>, CrmError> {
    let first = result
        .get("CONTACT")
        .and_then(Value::as_array)
        .and_then(|ids| ids.first());
    first.map(parse_id).transpose()
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
