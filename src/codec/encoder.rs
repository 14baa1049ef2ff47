//! Request-string encoding for outgoing parameters.

use crate::models::ParameterSet;

/// Reserved characters and the tokens that replace them, applied in order.
const ESCAPES: [(&str, &str); 4] = [
    ("&", "dp_Amp"),
    ("=", "dp_Equal"),
    ("#", "dp_Pound"),
    ("?", "dp_Qmark"),
];

/// Replace the delimiter characters in a parameter value.
///
/// Substitution runs ampersand, equals, pound, question mark. There is no
/// decoding counterpart; the endpoint understands the tokens directly.
pub fn escape_value(value: &str) -> String {
    ESCAPES
        .iter()
        .fold(value.to_string(), |acc, (from, to)| acc.replace(from, to))
}

/// Encode a parameter set as `name1=value1&name2=value2`.
///
/// Parameters appear in insertion order. Only values are escaped; names
/// are passed through. The result is trimmed of surrounding whitespace and
/// an empty set yields an empty string.
///
/// # Example
///
/// ```ignore
/// let params = ParameterSet::new().with("Title", "Q&A").with("UserID", 7);
/// assert_eq!(encode(&params), "Title=Qdp_AmpA&UserID=7");
/// ```
pub fn encode(params: &ParameterSet) -> String {
    let encoded = params
        .iter()
        .map(|(key, value)| format!("{}={}", key, escape_value(&value.to_string())))
        .collect::<Vec<_>>()
        .join("&");

    encoded.trim().to_string()
}
