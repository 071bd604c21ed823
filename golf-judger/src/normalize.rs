use serde::{Deserialize, Serialize};

/// Whitespace policy applied to both the output and the sample before they
/// are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Trim {
    Trim,
    LeftTrim,
    RightTrim,
}

const WHITESPACE: &[u8] = b" \t\n\r\0\x0B";

fn is_space(b: &u8) -> bool {
    WHITESPACE.contains(b)
}

fn trim_start(text: &[u8]) -> &[u8] {
    match text.iter().position(|b| !is_space(b)) {
        Some(start) => &text[start..],
        None => &[],
    }
}

fn trim_end(text: &[u8]) -> &[u8] {
    match text.iter().rposition(|b| !is_space(b)) {
        Some(end) => &text[..=end],
        None => &[],
    }
}

/// `None` compares raw bytes.
pub fn normalize(text: &[u8], policy: Option<Trim>) -> &[u8] {
    match policy {
        None => text,
        Some(Trim::Trim) => trim_end(trim_start(text)),
        Some(Trim::LeftTrim) => trim_start(text),
        Some(Trim::RightTrim) => trim_end(text),
    }
}
