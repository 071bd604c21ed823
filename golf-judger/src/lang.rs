pub mod php;

use crate::hole::{Binding, ConstantValue};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Functionality a hole may revoke before the submission runs.
///
/// What revoking means is up to each language, see [`Language::restriction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    /// Built-ins that upper-case the first letter of every word.
    UpperCaseWord,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::UpperCaseWord => "upper-case-word",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a language receives hole constants. A language picks exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstantMode {
    /// The script text is rewritten by [`Language::add_constant`].
    Inject,
    /// `-c NAME=value` flags are passed before the script path.
    Argument,
}

pub trait Language: fmt::Debug + Send + Sync {
    /// Identifier used to look the language up.
    fn lang_name(&self) -> &str;

    /// Tag of the base image, also the name of its definition directory.
    fn tag_name(&self) -> &str;

    /// Interpreter invoked with the script path as its last argument.
    fn execute_command(&self) -> &str;

    fn constant_mode(&self) -> ConstantMode {
        ConstantMode::Inject
    }

    /// Binds `name` to `value` for the rest of the script.
    ///
    /// Must keep the line numbers of the original script intact.
    fn add_constant(&self, script: &[u8], name: &str, value: &ConstantValue) -> Vec<u8>;

    /// Build directives that revoke `capability`, or `None` if the language
    /// has no way to do so.
    fn restriction(&self, capability: Capability) -> Option<Vec<String>>;

    fn runtime_args(&self, bindings: &[Binding]) -> Vec<String> {
        match self.constant_mode() {
            ConstantMode::Inject => Vec::new(),
            ConstantMode::Argument => bindings
                .iter()
                .flat_map(|b| vec!["-c".to_owned(), format!("{}={}", b.name, b.value)])
                .collect(),
        }
    }
}
