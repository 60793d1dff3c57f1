use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Largest integer a JSON consumer can hold exactly in a double.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// A single spreadsheet cell as it arrives from the document API.
///
/// The Sheets API renders everything as strings by default, but numbers show
/// up when a caller asks for unformatted values, and trailing empty cells are
/// simply missing from the row. Anything that is not a string or a number is
/// folded into one of the three variants on the way in.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(from = "Value")]
pub enum CellValue {
    Text(String),
    Number(f64),
    #[default]
    Null,
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// String form used for header names and group keys. Null becomes "".
    pub fn to_key(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            other => other.to_string(),
        }
    }
}

fn whole_number(n: f64) -> Option<i64> {
    (n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER).then_some(n as i64)
}

/// Whole numbers go out as JSON integers, so a row index is `0`, not `0.0`.
impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Text(s) => serializer.serialize_str(s),
            CellValue::Number(n) => match whole_number(*n) {
                Some(i) => serializer.serialize_i64(i),
                None => serializer.serialize_f64(*n),
            },
            CellValue::Null => serializer.serialize_unit(),
        }
    }
}

/// Numbers print the way the web frontend prints them: plain decimals in
/// `[1e-6, 1e21)`, exponent form with an explicit sign outside it.
fn write_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n == 0.0 {
        return f.write_str("0");
    }

    let magnitude = n.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let exp = format!("{:e}", n);
        return match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => {
                write!(f, "{}e+{}", mantissa, power)
            }
            _ => f.write_str(&exp),
        };
    }

    write!(f, "{}", n)
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => write_number(f, *n),
            CellValue::Null => Ok(()),
        }
    }
}

impl From<Value> for CellValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => CellValue::Null,
            Value::String(s) => CellValue::Text(s),
            Value::Number(n) => n
                .as_f64()
                .map(CellValue::Number)
                .unwrap_or_else(|| CellValue::Text(n.to_string())),
            Value::Bool(b) => CellValue::Text(if b { "TRUE" } else { "FALSE" }.to_string()),
            other => CellValue::Text(other.to_string()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_api_values() {
        let row: Vec<CellValue> =
            serde_json::from_value(json!(["Name", 42, 1.5, null, true])).unwrap();
        assert_eq!(
            row,
            vec![
                CellValue::text("Name"),
                CellValue::Number(42.0),
                CellValue::Number(1.5),
                CellValue::Null,
                CellValue::text("TRUE"),
            ]
        );
    }

    #[test]
    fn serializes_untagged() {
        let row = vec![CellValue::text("a"), CellValue::Number(2.5), CellValue::Null];
        assert_eq!(serde_json::to_value(&row).unwrap(), json!(["a", 2.5, null]));
    }

    #[test]
    fn whole_numbers_serialize_as_integers() {
        let row = vec![
            CellValue::Number(0.0),
            CellValue::Number(42.0),
            CellValue::Number(-3.0),
            CellValue::Number(2.5),
        ];
        assert_eq!(serde_json::to_value(&row).unwrap(), json!([0, 42, -3, 2.5]));
        assert_eq!(serde_json::to_string(&CellValue::Number(7.0)).unwrap(), "7");
    }

    #[test]
    fn huge_whole_numbers_stay_floats() {
        let value = serde_json::to_value(CellValue::Number(1e300)).unwrap();
        assert!(value.is_f64());
    }

    #[test]
    fn extreme_magnitudes_use_exponent_form() {
        assert_eq!(CellValue::Number(1e21).to_key(), "1e+21");
        assert_eq!(CellValue::Number(1.5e22).to_key(), "1.5e+22");
        assert_eq!(CellValue::Number(1.5e-7).to_key(), "1.5e-7");
        assert_eq!(CellValue::Number(1e20).to_key(), "100000000000000000000");
        assert_eq!(CellValue::Number(0.000001).to_key(), "0.000001");
        assert_eq!(CellValue::Number(-0.0).to_key(), "0");
    }

    #[test]
    fn integral_numbers_stringify_without_fraction() {
        assert_eq!(CellValue::Number(7.0).to_key(), "7");
        assert_eq!(CellValue::Number(0.25).to_key(), "0.25");
        assert_eq!(CellValue::Null.to_key(), "");
    }
}
