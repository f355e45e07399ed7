//! Call argument model.
//!
//! Callers hand the read-through layer the same arguments they would hand the
//! uncached source: positional values followed by an options mapping. The
//! layer strips its own `reload` option and forwards the rest as a
//! [`FetchRequest`], which is also what cache keys are derived from.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::RELOAD_OPTION;

/// Options mapping supplied after the positional arguments.
///
/// Ordered so that rendering it into a key is deterministic.
pub type Options = BTreeMap<String, ArgValue>;

// ═══════════════════════════════════════════════════════════════════════════════
// ARGUMENT VALUES
// ═══════════════════════════════════════════════════════════════════════════════

/// A single opaque argument value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    /// Absent value
    Null,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Unsigned integer above `i64::MAX`
    UInt(u64),
    /// Floating point number, always rendered with a fractional part or exponent
    Float(f64),
    /// String
    Str(String),
    /// Ordered list of values
    List(Vec<ArgValue>),
    /// Nested mapping
    Map(Options),
}

impl ArgValue {
    /// Interprets the value as a flag.
    ///
    /// `true`, non-zero integers and the strings `"true"`/`"1"` are truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            ArgValue::Bool(b) => *b,
            ArgValue::Int(n) => *n != 0,
            ArgValue::UInt(n) => *n != 0,
            ArgValue::Str(s) => {
                let s = s.trim();
                s.eq_ignore_ascii_case("true") || s == "1"
            }
            _ => false,
        }
    }

    /// Returns the inner mapping if this is a map.
    pub fn as_map(&self) -> Option<&Options> {
        match self {
            ArgValue::Map(map) => Some(map),
            _ => None,
        }
    }
}

/// Plain textual representation, used for cache keys and log lines.
///
/// Scalars render bare, lists as `[a,b]`, maps as `{k=v,k2=v2}` in key order.
/// Floats keep their fractional part (`1.0`) so they never read as integers.
impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Null => Ok(()),
            ArgValue::Bool(b) => write!(f, "{}", b),
            ArgValue::Int(n) => write!(f, "{}", n),
            ArgValue::UInt(n) => write!(f, "{}", n),
            ArgValue::Float(x) => write!(f, "{:?}", x),
            ArgValue::Str(s) => f.write_str(s),
            ArgValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            ArgValue::Map(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}={}", k, v)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        ArgValue::Bool(value)
    }
}

impl From<i32> for ArgValue {
    fn from(value: i32) -> Self {
        ArgValue::Int(value.into())
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        ArgValue::Int(value)
    }
}

impl From<u32> for ArgValue {
    fn from(value: u32) -> Self {
        ArgValue::Int(value.into())
    }
}

impl From<u64> for ArgValue {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(n) => ArgValue::Int(n),
            Err(_) => ArgValue::UInt(value),
        }
    }
}

impl From<f64> for ArgValue {
    fn from(value: f64) -> Self {
        ArgValue::Float(value)
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::Str(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        ArgValue::Str(value)
    }
}

impl From<Vec<ArgValue>> for ArgValue {
    fn from(value: Vec<ArgValue>) -> Self {
        ArgValue::List(value)
    }
}

impl From<Options> for ArgValue {
    fn from(value: Options) -> Self {
        ArgValue::Map(value)
    }
}

impl From<serde_json::Value> for ArgValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => ArgValue::Null,
            Value::Bool(b) => ArgValue::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    ArgValue::Int(i)
                } else if let Some(u) = n.as_u64() {
                    ArgValue::UInt(u)
                } else {
                    ArgValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => ArgValue::Str(s),
            Value::Array(items) => ArgValue::List(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => {
                ArgValue::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CALL ARGUMENTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Arguments for one lookup, exactly as the caller supplied them.
///
/// The options mapping always sits after the positional values. It may carry
/// a `reload` flag which the read-through layer consumes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CallArguments {
    positional: Vec<ArgValue>,
    options: Options,
}

impl CallArguments {
    /// Creates an empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds arguments from an untyped list.
    ///
    /// A trailing map is taken as the options mapping; everything before it
    /// is positional.
    pub fn from_values(mut values: Vec<ArgValue>) -> Self {
        let options = match values.last() {
            Some(ArgValue::Map(_)) => match values.pop() {
                Some(ArgValue::Map(map)) => map,
                _ => Options::new(),
            },
            _ => Options::new(),
        };

        Self {
            positional: values,
            options,
        }
    }

    /// Appends a positional argument.
    pub fn arg(mut self, value: impl Into<ArgValue>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Sets an entry in the options mapping.
    pub fn option(mut self, key: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Sets the `reload` option.
    pub fn reload(self, reload: bool) -> Self {
        self.option(RELOAD_OPTION, reload)
    }

    /// Positional arguments.
    pub fn positional(&self) -> &[ArgValue] {
        &self.positional
    }

    /// Options mapping, including `reload` if the caller set it.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Splits off the `reload` flag and returns the downstream request.
    ///
    /// An options mapping left empty after removing `reload` is dropped, so the
    /// request matches what a caller without the cache would have sent.
    pub fn into_request(mut self) -> (FetchRequest, bool) {
        let reload = self
            .options
            .remove(RELOAD_OPTION)
            .map(|v| v.is_truthy())
            .unwrap_or(false);

        let options = if self.options.is_empty() {
            None
        } else {
            Some(self.options)
        };

        (
            FetchRequest {
                positional: self.positional,
                options,
            },
            reload,
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// FETCH REQUEST
// ═══════════════════════════════════════════════════════════════════════════════

/// Normalized arguments forwarded to the underlying fetch.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchRequest {
    /// Positional arguments in caller order
    pub positional: Vec<ArgValue>,
    /// Options mapping, `None` when the caller passed none (or only `reload`)
    pub options: Option<Options>,
}

impl FetchRequest {
    /// Returns true if there are no arguments at all.
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.options.is_none()
    }

    /// Iterates over every argument as the caller ordered them.
    ///
    /// The options mapping, when present, comes last as a single map value.
    pub fn segments(&self) -> impl Iterator<Item = ArgValue> + '_ {
        self.positional
            .iter()
            .cloned()
            .chain(self.options.iter().cloned().map(ArgValue::Map))
    }
}

/// Renders as `[a, b, {k=v}]`.
impl fmt::Display for FetchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, segment) in self.segments().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", segment)?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(ArgValue::Bool(true), true ; "bool true")]
    #[test_case(ArgValue::Bool(false), false ; "bool false")]
    #[test_case(ArgValue::Int(1), true ; "non-zero int")]
    #[test_case(ArgValue::Int(0), false ; "zero int")]
    #[test_case(ArgValue::UInt(u64::MAX), true ; "large unsigned int")]
    #[test_case(ArgValue::from("TRUE"), true ; "string true")]
    #[test_case(ArgValue::from("1"), true ; "string one")]
    #[test_case(ArgValue::from("no"), false ; "other string")]
    #[test_case(ArgValue::Null, false ; "null")]
    fn test_is_truthy(value: ArgValue, expected: bool) {
        assert_eq!(value.is_truthy(), expected);
    }

    #[test]
    fn test_display() {
        assert_eq!(ArgValue::Int(42).to_string(), "42");
        assert_eq!(ArgValue::UInt(u64::MAX).to_string(), "18446744073709551615");
        assert_eq!(ArgValue::Float(1.0).to_string(), "1.0");
        assert_eq!(ArgValue::Float(2.5).to_string(), "2.5");
        assert_eq!(ArgValue::from("abc").to_string(), "abc");
        assert_eq!(ArgValue::Null.to_string(), "");
        assert_eq!(
            ArgValue::List(vec![1.into(), "x".into()]).to_string(),
            "[1,x]"
        );

        let mut map = Options::new();
        map.insert("b".into(), 2.into());
        map.insert("a".into(), "one".into());
        assert_eq!(ArgValue::Map(map).to_string(), "{a=one,b=2}");
    }

    #[test]
    fn test_reload_is_stripped() {
        let (request, reload) = CallArguments::new().arg(42).reload(true).into_request();
        assert!(reload);
        assert_eq!(request.positional, vec![ArgValue::Int(42)]);
        assert!(request.options.is_none());
    }

    #[test]
    fn test_reload_defaults_to_false() {
        let (request, reload) = CallArguments::new().arg("all").into_request();
        assert!(!reload);
        assert_eq!(request.positional.len(), 1);
    }

    #[test]
    fn test_other_options_survive() {
        let (request, reload) = CallArguments::new()
            .arg("all")
            .option("from", "archive")
            .reload(false)
            .into_request();

        assert!(!reload);
        let options = request.options.expect("options kept");
        assert_eq!(options.len(), 1);
        assert_eq!(options.get("from"), Some(&ArgValue::from("archive")));
    }

    #[test]
    fn test_from_values_takes_trailing_map() {
        let mut map = Options::new();
        map.insert("reload".into(), true.into());
        map.insert("params".into(), "x".into());

        let args = CallArguments::from_values(vec![42.into(), ArgValue::Map(map)]);
        assert_eq!(args.positional(), &[ArgValue::Int(42)]);
        assert_eq!(args.options().len(), 2);

        let (request, reload) = args.into_request();
        assert!(reload);
        assert_eq!(request.to_string(), "[42, {params=x}]");
    }

    #[test]
    fn test_from_values_without_map() {
        let args = CallArguments::from_values(vec![1.into(), 2.into()]);
        assert_eq!(args.positional().len(), 2);
        assert!(args.options().is_empty());
    }

    #[test]
    fn test_empty_request() {
        let (request, _) = CallArguments::new().into_request();
        assert!(request.is_empty());
        assert_eq!(request.segments().count(), 0);
        assert_eq!(request.to_string(), "[]");
    }

    #[test]
    fn test_from_json() {
        let value: ArgValue = serde_json::json!({"ids": [1, 2], "active": true}).into();
        assert_eq!(value.to_string(), "{active=true,ids=[1,2]}");
    }

    #[test]
    fn test_untagged_deserialize() {
        let values: Vec<ArgValue> = serde_json::from_str(r#"[42, "x", {"reload": true}]"#).unwrap();
        let args = CallArguments::from_values(values);
        let (request, reload) = args.into_request();
        assert!(reload);
        assert_eq!(request.positional, vec![ArgValue::Int(42), ArgValue::from("x")]);
    }

    #[test]
    fn test_large_integers_keep_precision() {
        let from_json = ArgValue::from(serde_json::json!(u64::MAX));
        assert_eq!(from_json, ArgValue::UInt(u64::MAX));
        assert_eq!(ArgValue::from(u64::MAX - 1), ArgValue::UInt(u64::MAX - 1));
        assert_eq!(ArgValue::from(7u64), ArgValue::Int(7));

        let values: Vec<ArgValue> =
            serde_json::from_str("[18446744073709551000, 18446744073709551615, 1.5]").unwrap();
        assert_eq!(
            values,
            vec![
                ArgValue::UInt(18446744073709551000),
                ArgValue::UInt(u64::MAX),
                ArgValue::Float(1.5),
            ]
        );
    }
}
