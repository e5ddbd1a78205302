//! Run parameter decoding.
//!
//! Parameters arrive as loosely typed values. Numbers become `Int`/`Float`,
//! VectorNav register sentences (`$VNRRG,...*XX`) are split into their
//! payload fields, anything else stays text.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{IngestionError, Result};

/// Parameter holding the nominal forward speed
pub const SPEED_PARAMETER: &str = "Speed";

/// Leading sentence fields dropped from register replies (`VNRRG`, register id)
const VNAV_HEADER_FIELDS: usize = 2;

/// `$<payload>*<checksum>`
static SENTENCE: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"\$(.*)\*.*"));

/// Decoded run parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParValue {
    Int(i64),
    Float(f64),
    Text(String),
    Array(Vec<f64>),
}

impl ParValue {
    /// Decode the raw textual value of parameter `name`.
    ///
    /// `Speed` is always a float. Other values are tried as an integer, then
    /// as a float. A `$`-prefixed VectorNav sentence yields an `Int`/`Text`
    /// for a single payload field and a float `Array` for several.
    pub fn decode(name: &str, raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if name == SPEED_PARAMETER {
            if let Ok(speed) = raw.parse::<f64>() {
                return Ok(Self::Float(speed));
            }
        } else if let Ok(int) = raw.parse::<i64>() {
            return Ok(Self::Int(int));
        } else if let Ok(float) = raw.parse::<f64>() {
            return Ok(Self::Float(float));
        }

        if !raw.starts_with('$') {
            return Ok(Self::Text(raw.to_string()));
        }

        let fields = parse_vnav_sentence(raw, VNAV_HEADER_FIELDS)?;
        match fields.as_slice() {
            [single] => Ok(single
                .trim()
                .parse::<i64>()
                .map(Self::Int)
                .unwrap_or_else(|_| Self::Text(single.clone()))),
            many => many
                .iter()
                .map(|field| {
                    field.trim().parse::<f64>().map_err(|e| {
                        IngestionError::parameter(name, format!("field '{field}': {e}"))
                    })
                })
                .collect::<Result<Vec<_>>>()
                .map(Self::Array),
        }
    }

    /// Decode a JSON value, going through its textual form
    pub fn from_json(name: &str, value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::String(s) => Self::decode(name, s),
            serde_json::Value::Number(n) => Self::decode(name, &n.to_string()),
            serde_json::Value::Bool(b) => Ok(Self::Int(i64::from(*b))),
            other => Err(IngestionError::parameter(
                name,
                format!("unsupported parameter value {other}"),
            )),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }
}

/// Payload fields of a VectorNav sentence, minus the first `skip`.
///
/// `$VNRRG,26,1,0,0*6A` with `skip = 2` gives `["1", "0", "0"]`. A string
/// without the `$...*` framing is split as is.
pub fn parse_vnav_sentence(sentence: &str, skip: usize) -> Result<Vec<String>> {
    let pattern = SENTENCE
        .as_ref()
        .map_err(|e| IngestionError::parameter("sentence", e.to_string()))?;
    let payload = pattern.replace(sentence, "$1");
    Ok(payload
        .split(',')
        .skip(skip)
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentence_strips_framing_and_checksum() {
        let fields = parse_vnav_sentence("$VNRRG,26,1.5,-0.25,3*5C", 2).unwrap();
        assert_eq!(fields, vec!["1.5", "-0.25", "3"]);
        let all = parse_vnav_sentence("$VNRRG,26,1.5*5C", 0).unwrap();
        assert_eq!(all, vec!["VNRRG", "26", "1.5"]);
    }

    #[test]
    fn test_sentence_without_framing() {
        assert_eq!(parse_vnav_sentence("a,b", 1).unwrap(), vec!["b"]);
    }

    #[test]
    fn test_speed_is_float() {
        assert_eq!(ParValue::decode("Speed", "3").unwrap(), ParValue::Float(3.0));
    }

    #[test]
    fn test_plain_values() {
        assert_eq!(ParValue::decode("RunID", "42").unwrap(), ParValue::Int(42));
        assert_eq!(
            ParValue::decode("Rider", "Jason").unwrap(),
            ParValue::Text("Jason".into())
        );
        assert_eq!(
            ParValue::decode("Duration", "30.5").unwrap(),
            ParValue::Float(30.5)
        );
    }

    #[test]
    fn test_vnav_single_field() {
        assert_eq!(
            ParValue::decode("VNavBaud", "$VNRRG,05,115200*5B").unwrap(),
            ParValue::Int(115200)
        );
        assert_eq!(
            ParValue::decode("VNavModel", "$VNRRG,01,VN-100T*1B").unwrap(),
            ParValue::Text("VN-100T".into())
        );
    }

    #[test]
    fn test_vnav_array() {
        assert_eq!(
            ParValue::decode("VNavRefFrame", "$VNRRG,09,1,0,0,0,1,0*4C").unwrap(),
            ParValue::Array(vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0])
        );
    }

    #[test]
    fn test_vnav_array_with_bad_field() {
        let err = ParValue::decode("VNavRefFrame", "$VNRRG,09,1,x*4C").unwrap_err();
        assert!(matches!(err, IngestionError::Parameter { .. }));
    }

    #[test]
    fn test_from_json() {
        let value = serde_json::json!(7);
        assert_eq!(ParValue::from_json("Trial", &value).unwrap(), ParValue::Int(7));
        let value = serde_json::json!(true);
        assert_eq!(ParValue::from_json("Flag", &value).unwrap(), ParValue::Int(1));
        assert!(ParValue::from_json("Bad", &serde_json::Value::Null).is_err());
    }
}
