use super::*;

use crate::hole::float_literal;

/// Drop-in ini file read by the official php images on startup.
const DISABLE_INI: &str = "/usr/local/etc/php/conf.d/golf-disable.ini";

#[derive(Debug, Clone)]
pub struct Php {
    tag: String,
}

impl Php {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

impl Language for Php {
    fn lang_name(&self) -> &str {
        &self.tag
    }

    fn tag_name(&self) -> &str {
        &self.tag
    }

    fn execute_command(&self) -> &str {
        "php"
    }

    // `?>` swallows the newline right after it, so the script has to follow on
    // the same line to keep its line numbers.
    fn add_constant(&self, script: &[u8], name: &str, value: &ConstantValue) -> Vec<u8> {
        let prelude = format!("<?php define('{}', {}); ?>", name, literal(value));
        let mut out = Vec::with_capacity(prelude.len() + script.len());
        out.extend_from_slice(prelude.as_bytes());
        out.extend_from_slice(script);
        out
    }

    fn restriction(&self, capability: Capability) -> Option<Vec<String>> {
        let functions = match capability {
            Capability::UpperCaseWord => "ucwords",
        };
        Some(vec![format!(
            "RUN echo 'disable_functions = {}' >> {}",
            functions, DISABLE_INI
        )])
    }
}

fn literal(value: &ConstantValue) -> String {
    match value {
        ConstantValue::Bool(b) => b.to_string(),
        ConstantValue::Int(n) => n.to_string(),
        ConstantValue::Float(x) => float_literal(*x),
        ConstantValue::Str(s) => {
            let mut quoted = String::with_capacity(s.len() + 2);
            quoted.push('\'');
            for c in s.chars() {
                if c == '\\' || c == '\'' {
                    quoted.push('\\');
                }
                quoted.push(c);
            }
            quoted.push('\'');
            quoted
        }
    }
}
