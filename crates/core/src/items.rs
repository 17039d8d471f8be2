//! Item write rules: type coercion and validation of incoming payloads.
//!
//! Create and update share the same rules because an update is a full-field
//! overwrite, not a patch.

use serde_json::{Map, Value};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::CoreError;

/// Quantity stored when the input is absent or not a number.
pub const DEFAULT_QUANTITY: i64 = 0;

/// `isActive` value when the payload leaves it out.
pub const DEFAULT_IS_ACTIVE: bool = true;

/// Settings that differ between deployments of the service.
#[derive(Debug, Clone)]
pub struct ItemRules {
    /// Reject writes without a description. When `false`, a missing
    /// description is stored as an empty string.
    pub require_description: bool,
}

impl Default for ItemRules {
    fn default() -> Self {
        Self {
            require_description: true,
        }
    }
}

/// The validated, coerced field set written to the store.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct ItemFields {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    pub description: String,
    pub quantity: i64,
    /// Free-form grouping label. Blank input is stored as absent.
    pub category: Option<String>,
    pub price: Option<f64>,
    pub is_active: bool,
}

impl ItemFields {
    /// Build a field set from a JSON object body.
    ///
    /// Absent keys and `null` values are treated alike. Unknown keys are
    /// ignored.
    pub fn from_json(body: &Map<String, Value>, rules: &ItemRules) -> Result<Self, CoreError> {
        let fields = Self {
            name: coerce_text("name", body.get("name"))?.unwrap_or_default(),
            description: coerce_text("description", body.get("description"))?
                .unwrap_or_default(),
            quantity: body.get("quantity").map_or(DEFAULT_QUANTITY, coerce_quantity),
            category: coerce_text("category", body.get("category"))?
                .filter(|c| !c.trim().is_empty()),
            price: coerce_price(body.get("price"))?,
            is_active: coerce_flag("isActive", body.get("isActive"))?.unwrap_or(DEFAULT_IS_ACTIVE),
        };

        fields
            .validate()
            .map_err(|errors| CoreError::Validation(describe(&errors)))?;

        if rules.require_description && fields.description.is_empty() {
            return Err(CoreError::Validation("description is required".into()));
        }

        Ok(fields)
    }
}

/// Coerce a JSON value to an integer quantity.
///
/// Integers are kept, floats are truncated toward zero, and strings are read
/// as an optional sign followed by leading decimal digits (`"7 apples"` is 7).
/// Everything else, including out-of-range values, becomes [`DEFAULT_QUANTITY`].
pub fn coerce_quantity(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(truncate)),
        Value::String(s) => parse_leading_int(s),
        _ => None,
    }
    .unwrap_or(DEFAULT_QUANTITY)
}

/// Coerce a JSON scalar to text. `null` counts as absent.
fn coerce_text(field: &str, value: Option<&Value>) -> Result<Option<String>, CoreError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(Value::Array(_) | Value::Object(_)) => Err(CoreError::Validation(format!(
            "{field} must be a string"
        ))),
    }
}

/// Coerce a JSON value to a price. Numbers and numeric strings are accepted;
/// blank strings count as absent.
fn coerce_price(value: Option<&Value>) -> Result<Option<f64>, CoreError> {
    let invalid = || CoreError::Validation("price must be a number".into());
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_f64().map(Some).ok_or_else(invalid),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Some)
            .ok_or_else(invalid),
        Some(_) => Err(invalid()),
    }
}

fn coerce_flag(field: &str, value: Option<&Value>) -> Result<Option<bool>, CoreError> {
    let flag = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Bool(b)) => Some(*b),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        Some(_) => None,
    };
    flag.map(Some)
        .ok_or_else(|| CoreError::Validation(format!("{field} must be a boolean")))
}

fn truncate(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
    if f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f.trunc() as i64)
    } else {
        None
    }
}

fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let magnitude: i64 = rest[..digits_len].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("name is required".into());
        return Err(err);
    }
    Ok(())
}

fn describe(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => msg.to_string(),
                None => format!("{field} is invalid"),
            })
        })
        .collect();
    messages.sort();
    messages.join("; ")
}
