use serde_json::{Map, Number, Value};

use crate::error::EncodingError;

/// Deepest container nesting the encoder accepts.
pub const MAX_DEPTH: usize = 128;

/// Deterministic JSON encoder.
///
/// Output is byte-identical to `json.dumps(v, sort_keys=True,
/// separators=(",", ":"))` from the reference tooling, so independent
/// verifiers can recompute every digest without this crate:
///
/// - object keys sorted by code point, no whitespace
/// - strings escaped to pure ASCII (`\uXXXX`, surrogate pairs above the BMP)
/// - integers digit for digit at any magnitude (`-0` becomes `0`), floats
///   in shortest round-trip form
///
/// Key order is applied here rather than trusted from the map type, since
/// `serde_json` may be built with `preserve_order` elsewhere in the graph.
pub struct CanonicalEncoder;

impl CanonicalEncoder {
    /// Encode a value to its canonical bytes.
    pub fn encode(value: &Value) -> Result<Vec<u8>, EncodingError> {
        Self::encode_to_string(value).map(String::into_bytes)
    }

    /// Encode a value to its canonical text. Always ASCII.
    pub fn encode_to_string(value: &Value) -> Result<String, EncodingError> {
        let mut out = String::new();
        write_value(&mut out, value, 0)?;
        Ok(out)
    }

    /// Parse a JSON document supplied as text.
    pub fn parse(text: &str) -> Result<Value, EncodingError> {
        serde_json::from_str(text).map_err(|e| EncodingError::InvalidJson(e.to_string()))
    }

    /// Canonical rendering of a single float.
    pub fn format_float(x: f64) -> Result<String, EncodingError> {
        if !x.is_finite() {
            return Err(EncodingError::NonFiniteNumber);
        }
        let mut out = String::new();
        write_float(&mut out, x);
        Ok(out)
    }
}

fn write_value(out: &mut String, value: &Value, depth: usize) -> Result<(), EncodingError> {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => write_number(out, n)?,
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            check_depth(depth)?;
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item, depth + 1)?;
            }
            out.push(']');
        }
        Value::Object(map) => {
            check_depth(depth)?;
            write_object(out, map, depth)?;
        }
    }
    Ok(())
}

fn check_depth(depth: usize) -> Result<(), EncodingError> {
    if depth >= MAX_DEPTH {
        return Err(EncodingError::TooDeep { max: MAX_DEPTH });
    }
    Ok(())
}

fn write_object(
    out: &mut String,
    map: &Map<String, Value>,
    depth: usize,
) -> Result<(), EncodingError> {
    let mut entries: Vec<(&String, &Value)> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    out.push('{');
    for (i, (key, item)) in entries.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_string(out, key);
        out.push(':');
        write_value(out, item, depth + 1)?;
    }
    out.push('}');
    Ok(())
}

fn write_number(out: &mut String, n: &Number) -> Result<(), EncodingError> {
    // Parsed numbers keep their source text, so integers of any size pass
    // through digit for digit.
    let text = n.to_string();
    if is_integer_literal(&text) {
        out.push_str(if text == "-0" { "0" } else { &text });
        return Ok(());
    }
    let x = n.as_f64().ok_or(EncodingError::NonFiniteNumber)?;
    if !x.is_finite() {
        return Err(EncodingError::NonFiniteNumber);
    }
    write_float(out, x);
    Ok(())
}

fn is_integer_literal(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            ' '..='~' => out.push(c),
            _ => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{unit:04x}"));
                }
            }
        }
    }
    out.push('"');
}

/// Shortest round-trip digits, laid out the way the reference `repr` does.
///
/// Rust's `{:e}` already yields the shortest digit string; only the
/// placement of the decimal point and the exponent syntax differ.
fn write_float(out: &mut String, x: f64) {
    if x == 0.0 {
        out.push_str(if x.is_sign_negative() { "-0.0" } else { "0.0" });
        return;
    }
    if x.is_sign_negative() {
        out.push('-');
    }

    let sci = format!("{:e}", x.abs());
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    if (-4..16).contains(&exp) {
        if exp >= 0 {
            let int_len = exp as usize + 1;
            if digits.len() <= int_len {
                out.push_str(&digits);
                out.extend(std::iter::repeat('0').take(int_len - digits.len()));
                out.push_str(".0");
            } else {
                out.push_str(&digits[..int_len]);
                out.push('.');
                out.push_str(&digits[int_len..]);
            }
        } else {
            out.push_str("0.");
            out.extend(std::iter::repeat('0').take((-exp - 1) as usize));
            out.push_str(&digits);
        }
    } else {
        out.push_str(&digits[..1]);
        if digits.len() > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        out.push('e');
        out.push(if exp < 0 { '-' } else { '+' });
        out.push_str(&format!("{:02}", exp.abs()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn enc(v: &Value) -> String {
        CanonicalEncoder::encode_to_string(v).unwrap()
    }

    #[test]
    fn sorts_keys_and_strips_whitespace() {
        let v = json!({"prompt": "hello", "providers": [], "guidelines": [], "salt": null});
        assert_eq!(
            enc(&v),
            r#"{"guidelines":[],"prompt":"hello","providers":[],"salt":null}"#
        );
    }

    #[test]
    fn nested_objects_are_sorted() {
        let v = json!({"z": {"b": 1, "a": [true, false, null]}, "a": 0});
        assert_eq!(enc(&v), r#"{"a":0,"z":{"a":[true,false,null],"b":1}}"#);
    }

    #[test]
    fn arrays_keep_order() {
        assert_eq!(enc(&json!([3, 1, 2])), "[3,1,2]");
    }

    #[test]
    fn escapes_to_ascii() {
        let v = json!({"name": "é😀", "b": [1, 2.5], "ctl": "\u{01}\u{7f}"});
        assert_eq!(
            enc(&v),
            r#"{"b":[1,2.5],"ctl":"\u0001\u007f","name":"\u00e9\ud83d\ude00"}"#
        );
    }

    #[test]
    fn short_escapes() {
        let v = json!("q\"b\\n\nr\rt\tb\u{08}f\u{0c}/");
        assert_eq!(enc(&v), r#""q\"b\\n\nr\rt\tb\bf\f/""#);
    }

    #[test]
    fn integers_and_floats_differ() {
        assert_eq!(enc(&json!(1)), "1");
        assert_eq!(enc(&json!(1.0)), "1.0");
        assert_eq!(enc(&json!(-42)), "-42");
        assert_eq!(enc(&json!(u64::MAX)), "18446744073709551615");
    }

    fn enc_text(text: &str) -> String {
        enc(&CanonicalEncoder::parse(text).unwrap())
    }

    #[test]
    fn integers_beyond_64_bits_keep_their_digits() {
        assert_eq!(enc_text("18446744073709551616"), "18446744073709551616");
        assert_eq!(enc_text("-9223372036854775809"), "-9223372036854775809");
        assert_eq!(
            enc_text(r#"{"big":[123456789012345678901234567890]}"#),
            r#"{"big":[123456789012345678901234567890]}"#
        );
    }

    #[test]
    fn negative_zero_integer_is_zero() {
        assert_eq!(enc_text("-0"), "0");
        assert_eq!(enc_text("[-0, 0]"), "[0,0]");
        assert_eq!(enc_text("-0.0"), "-0.0");
    }

    #[test]
    fn parsed_floats_are_renormalized() {
        assert_eq!(enc_text("1E5"), "100000.0");
        assert_eq!(enc_text("1.50"), "1.5");
        assert_eq!(enc_text("2.5e-7"), "2.5e-07");
        assert_eq!(enc_text("1e16"), "1e+16");
    }

    #[test]
    fn float_repr_layout() {
        let cases = [
            (1.0, "1.0"),
            (0.1, "0.1"),
            (1e16, "1e+16"),
            (1.5e-5, "1.5e-05"),
            (1e-7, "1e-07"),
            (1e15, "1000000000000000.0"),
            (123456789.125, "123456789.125"),
            (-2.5, "-2.5"),
            (100.0, "100.0"),
            (1e22, "1e+22"),
            (5e-324, "5e-324"),
            (1.7976931348623157e308, "1.7976931348623157e+308"),
            (0.0001, "0.0001"),
            (87.5, "87.5"),
        ];
        for (x, expected) in cases {
            assert_eq!(CanonicalEncoder::format_float(x).unwrap(), expected, "for {x:e}");
        }
    }

    #[test]
    fn signed_zero() {
        assert_eq!(CanonicalEncoder::format_float(0.0).unwrap(), "0.0");
        assert_eq!(CanonicalEncoder::format_float(-0.0).unwrap(), "-0.0");
    }

    #[test]
    fn non_finite_rejected() {
        for x in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert_eq!(
                CanonicalEncoder::format_float(x),
                Err(EncodingError::NonFiniteNumber)
            );
        }
    }

    fn nested(levels: usize) -> Value {
        let mut v = json!(0);
        for _ in 0..levels {
            v = Value::Array(vec![v]);
        }
        v
    }

    #[test]
    fn depth_limit() {
        assert!(CanonicalEncoder::encode(&nested(MAX_DEPTH)).is_ok());
        assert_eq!(
            CanonicalEncoder::encode(&nested(MAX_DEPTH + 1)),
            Err(EncodingError::TooDeep { max: MAX_DEPTH })
        );
    }

    #[test]
    fn parse_reports_invalid_json() {
        assert!(matches!(
            CanonicalEncoder::parse("{not json"),
            Err(EncodingError::InvalidJson(_))
        ));
        assert_eq!(CanonicalEncoder::parse("[1]").unwrap(), json!([1]));
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|i| json!(i)),
            any::<i16>().prop_map(|n| json!(f64::from(n) / 64.0)),
            any::<String>().prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 32, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::btree_map(any::<String>(), inner, 0..6)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn output_is_ascii_and_parses_back(v in arb_json()) {
            let text = CanonicalEncoder::encode_to_string(&v).unwrap();
            prop_assert!(text.is_ascii());
            let back: Value = serde_json::from_str(&text).unwrap();
            prop_assert_eq!(back, v);
        }

        #[test]
        fn key_insertion_order_is_irrelevant(
            entries in prop::collection::vec((any::<String>(), any::<i32>()), 0..8)
        ) {
            let forward: Map<String, Value> =
                entries.iter().map(|(k, v)| (k.clone(), json!(v))).collect();
            let reverse: Map<String, Value> =
                entries.iter().rev().map(|(k, v)| (k.clone(), json!(v))).collect();
            let a = CanonicalEncoder::encode(&Value::Object(forward)).unwrap();
            let b = CanonicalEncoder::encode(&Value::Object(reverse)).unwrap();
            // Duplicate keys keep the last write, which differs between the two.
            let unique: std::collections::BTreeSet<_> = entries.iter().map(|(k, _)| k).collect();
            if unique.len() == entries.len() {
                prop_assert_eq!(a, b);
            }
        }
    }
}
