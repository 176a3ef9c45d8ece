// src/model/flex_bool.rs

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// **可用 true/false 或 1/0 表示的布尔值**
///
/// 解码时按顺序尝试每一种编码，全部失败才报错，不会默默回退到 false。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlexBool(pub bool);

/// 一种编码方式的解析尝试：匹配返回 Some，不匹配返回 None
type Attempt = fn(&Value) -> Option<bool>;

const ENCODINGS: [(&str, Attempt); 2] = [("boolean", as_bool), ("8-bit integer", as_small_int)];

fn as_bool(value: &Value) -> Option<bool> {
    value.as_bool()
}

fn as_small_int(value: &Value) -> Option<bool> {
    let n = value.as_i64()?;
    let n = i8::try_from(n).ok()?;
    Some(n != 0)
}

/// 所有编码都不匹配时的错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlexBoolError {
    pub found: String,
}

impl fmt::Display for FlexBoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tried: Vec<&str> = ENCODINGS.iter().map(|(name, _)| *name).collect();
        write!(f, "expected {} but found {}", tried.join(" or "), self.found)
    }
}

impl std::error::Error for FlexBoolError {}

impl FlexBool {
    /// 从已解析的 JSON 标量中解码
    pub fn from_json(value: &Value) -> Result<Self, FlexBoolError> {
        ENCODINGS
            .iter()
            .find_map(|(_, attempt)| attempt(value))
            .map(FlexBool)
            .ok_or_else(|| FlexBoolError {
                found: value.to_string(),
            })
    }

    /// 从原始 JSON 文本中解码
    pub fn decode(raw: &str) -> Result<Self, FlexBoolError> {
        let value: Value = serde_json::from_str(raw).map_err(|_| FlexBoolError {
            found: raw.to_string(),
        })?;
        Self::from_json(&value)
    }

    /// 输出到 OpenRTB 时使用 1/0
    pub fn to_i8(self) -> i8 {
        if self.0 {
            1
        } else {
            0
        }
    }
}

impl From<FlexBool> for bool {
    fn from(flag: FlexBool) -> Self {
        flag.0
    }
}

impl<'de> Deserialize<'de> for FlexBool {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        FlexBool::from_json(&value).map_err(serde::de::Error::custom)
    }
}

impl Serialize for FlexBool {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_booleans_and_integers() {
        assert_eq!(FlexBool::decode("true"), Ok(FlexBool(true)));
        assert_eq!(FlexBool::decode("false"), Ok(FlexBool(false)));
        assert_eq!(FlexBool::decode("1"), Ok(FlexBool(true)));
        assert_eq!(FlexBool::decode("0"), Ok(FlexBool(false)));
        assert_eq!(FlexBool::decode("-3"), Ok(FlexBool(true)));
    }

    #[test]
    fn rejects_other_encodings() {
        for raw in ["\"yes\"", "null", "1.5", "[1]", "{}", "128", "not json"] {
            assert!(FlexBool::decode(raw).is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn error_names_every_attempted_encoding() {
        let err = FlexBool::decode("\"yes\"").unwrap_err();
        assert_eq!(
            err.to_string(),
            "expected boolean or 8-bit integer but found \"yes\""
        );
    }

    #[test]
    fn projects_to_one_or_zero() {
        assert_eq!(FlexBool(true).to_i8(), 1);
        assert_eq!(FlexBool(false).to_i8(), 0);
    }

    #[test]
    fn deserializes_inside_a_struct() {
        #[derive(Deserialize)]
        struct Holder {
            flag: Option<FlexBool>,
        }
        let h: Holder = serde_json::from_str(r#"{"flag": 1}"#).unwrap();
        assert_eq!(h.flag, Some(FlexBool(true)));
        let h: Holder = serde_json::from_str(r#"{"flag": null}"#).unwrap();
        assert_eq!(h.flag, None);
        assert!(serde_json::from_str::<Holder>(r#"{"flag": "true"}"#).is_err());
    }

    proptest! {
        #[test]
        fn any_i8_decodes_to_non_zero(n in any::<i8>()) {
            let flag = FlexBool::decode(&n.to_string()).unwrap();
            prop_assert_eq!(flag.0, n != 0);
            prop_assert_eq!(flag.to_i8(), i8::from(n != 0));
        }

        #[test]
        fn integers_outside_i8_are_rejected(n in prop_oneof![-100_000i64..-129, 128i64..100_000]) {
            prop_assert!(FlexBool::decode(&n.to_string()).is_err());
        }
    }
}
