//! Escaping for values carried in query blocks and status messages.
//!
//! This is a fixed table of percent escapes rather than full URI encoding. Order
//! matters in both directions: `%` is escaped first and unescaped last, so escape
//! sequences produced by one rule are never rewritten by another.

/// Applied in order by [`decode`]
const DECODE_TABLE: [(&str, &str); 12] = [
    ("%20%20", " &nbsp;"),
    ("%20", " "),
    ("%22", "\""),
    ("%60", "`"),
    ("%5C", "\\"),
    ("%23", "#"),
    ("%3C", "<"),
    ("%3E", ">"),
    ("%26", "&"),
    ("%3D", "="),
    ("%3F", "?"),
    ("%25", "%"),
];

/// Applied in order by [`encode`]
const ENCODE_TABLE: [(&str, &str); 12] = [
    ("%", "%25"),
    ("&nbsp;", "%20"),
    (" ", "%20"),
    ("\"", "%22"),
    ("`", "%60"),
    ("\\", "%5C"),
    ("#", "%23"),
    ("<", "%3C"),
    (">", "%3E"),
    ("&", "%26"),
    ("=", "%3D"),
    ("?", "%3F"),
];

fn apply(table: &[(&str, &str)], value: &str) -> String {
    table
        .iter()
        .fold(value.to_string(), |acc, (from, to)| acc.replace(from, to))
}

/// Undo [`encode`]. Unknown escapes are left alone. A doubled space comes back as
/// `" &nbsp;"` so runs of spaces survive being placed into HTML
pub fn decode(value: &str) -> String {
    apply(&DECODE_TABLE, value)
}

pub fn encode(value: &str) -> String {
    apply(&ENCODE_TABLE, value)
}

/// Whether a browser would read `value` as a number (`Number(value)` is not NaN).
/// Blank strings count as numeric
pub fn looks_numeric(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return true;
    }
    let unsigned = value.trim_start_matches(['+', '-']);
    if value.len() - unsigned.len() > 1 {
        return false;
    }
    if unsigned == "Infinity" {
        return true;
    }
    if unsigned.len() == value.len() {
        let radix = match value.get(..2) {
            Some("0x") | Some("0X") => Some(16),
            Some("0o") | Some("0O") => Some(8),
            Some("0b") | Some("0B") => Some(2),
            _ => None,
        };
        if let Some(radix) = radix {
            let digits = &value[2..];
            return !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix));
        }
    }
    // Rust also accepts "inf" and "nan" spellings, which browsers do not
    if unsigned.chars().any(|c| c.is_alphabetic() && c != 'e' && c != 'E') {
        return false;
    }
    value.parse::<f64>().is_ok()
}

#[cfg(test)]
#[test]
fn test_encode() {
    assert_eq!(encode("a b"), "a%20b");
    assert_eq!(encode("100%"), "100%25");
    assert_eq!(encode("x=1&y=\"2\""), "x%3D1%26y%3D%222%22");
    assert_eq!(encode("<#`\\?>"), "%3C%23%60%5C%3F%3E");
    assert_eq!(encode("a&nbsp;b"), "a%20b");
    assert_eq!(encode("plain"), "plain");
}

#[cfg(test)]
#[test]
fn test_decode() {
    assert_eq!(decode("a%20b"), "a b");
    assert_eq!(decode("a%20%20b"), "a &nbsp;b");
    assert_eq!(decode("%2520"), "%20");
    assert_eq!(decode("%3C%3E%26%3D%3F%22%60%5C%23"), "<>&=?\"`\\#");
    // Lower case and unknown escapes pass through
    assert_eq!(decode("%3c%41"), "%3c%41");
}

#[cfg(test)]
#[test]
fn test_round_trip() {
    let samples = [
        "",
        "hello world",
        "50% off & more",
        "%20 is a space",
        "%25%",
        "a=b?c#d<e>f`g\\h\"i",
        "trailing ",
        "unicode \u{00e9}\u{4e2d}",
    ];
    for s in samples {
        assert_eq!(decode(&encode(s)), s, "round trip of {:?}", s);
    }
}

#[cfg(test)]
#[test]
fn test_double_space_becomes_nbsp() {
    assert_eq!(decode(&encode("a  b")), "a &nbsp;b");
    assert_eq!(encode(&decode("a%20%20b")), "a%20%20b");
}

#[cfg(test)]
#[test]
fn test_looks_numeric() {
    for s in ["5", "-5", "+2.5", ".5", "1e3", " 12 ", "", "  ", "0x1F", "Infinity", "-Infinity"] {
        assert!(looks_numeric(s), "{:?} should be numeric", s);
    }
    for s in ["a b", "12px", "inf", "NaN", "nan", "0x", "0xZZ", "--1", "1 2", "e5", "-0x10"] {
        assert!(!looks_numeric(s), "{:?} should not be numeric", s);
    }
}
