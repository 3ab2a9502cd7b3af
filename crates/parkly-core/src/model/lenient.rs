// ── Lenient numeric decoding ──
//
// The backend sends numbers as JSON numbers, numeric strings, or not at
// all. These helpers accept all three; anything unusable becomes "absent".

use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn as_f64(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn as_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

/// Optional float: number or numeric string, otherwise `None`.
pub(crate) fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(as_f64))
}

/// Count: non-negative integer or numeric string, otherwise zero.
pub(crate) fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(as_u32).unwrap_or(0))
}

/// Free-form scalar rendered as text (ids that may be numbers or strings).
pub(crate) fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "super::opt_f64")]
        amount: Option<f64>,
        #[serde(default, deserialize_with = "super::count")]
        spots: u32,
        #[serde(default, deserialize_with = "super::opt_text")]
        owner: Option<String>,
    }

    fn probe(v: serde_json::Value) -> Probe {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn numbers_and_numeric_strings_are_accepted() {
        let p = probe(json!({"amount": "12.5", "spots": "7", "owner": 3}));
        assert_eq!(p.amount, Some(12.5));
        assert_eq!(p.spots, 7);
        assert_eq!(p.owner.as_deref(), Some("3"));
    }

    #[test]
    fn garbage_and_missing_become_absent() {
        let p = probe(json!({"amount": "n/a", "spots": -4, "owner": null}));
        assert_eq!(p.amount, None);
        assert_eq!(p.spots, 0);
        assert_eq!(p.owner, None);

        let p = probe(json!({}));
        assert_eq!(p.amount, None);
        assert_eq!(p.spots, 0);
    }
}
