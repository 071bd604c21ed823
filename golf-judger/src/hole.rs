pub mod beer;
pub mod fizzbuzz;
pub mod ucwords;

use crate::lang::Capability;
use crate::normalize::Trim;
use crate::{Error, Result};

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConstantValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ConstantValue {
    pub fn as_int(&self) -> Option<i64> {
        match *self {
            ConstantValue::Int(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConstantValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantValue::Bool(b) => write!(f, "{}", b),
            ConstantValue::Int(n) => write!(f, "{}", n),
            ConstantValue::Float(x) => f.write_str(&float_literal(*x)),
            ConstantValue::Str(s) => f.write_str(s),
        }
    }
}

/// Renders `x` so that it reads back as the same float. Non-finite values use
/// the `NAN`/`INF` spelling most interpreters predefine.
pub(crate) fn float_literal(x: f64) -> String {
    if x.is_nan() {
        "NAN".to_owned()
    } else if x.is_infinite() {
        let sign = if x < 0.0 { "-" } else { "" };
        format!("{}INF", sign)
    } else {
        format!("{:?}", x)
    }
}

impl From<i64> for ConstantValue {
    fn from(n: i64) -> Self {
        ConstantValue::Int(n)
    }
}

impl From<&str> for ConstantValue {
    fn from(s: &str) -> Self {
        ConstantValue::Str(s.to_owned())
    }
}

impl From<String> for ConstantValue {
    fn from(s: String) -> Self {
        ConstantValue::Str(s)
    }
}

/// One constant bound for one case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    pub name: String,
    pub value: ConstantValue,
}

impl Binding {
    pub fn new(name: impl Into<String>, value: ConstantValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

pub fn lookup<'a>(bindings: &'a [Binding], name: &str) -> Option<&'a ConstantValue> {
    bindings.iter().find(|b| b.name == name).map(|b| &b.value)
}

pub type Generator = Box<dyn Fn() -> Vec<ConstantValue> + Send + Sync>;
pub type SampleFn = Box<dyn Fn(&[Binding]) -> String + Send + Sync>;

pub enum Values {
    Fixed(Vec<ConstantValue>),
    /// Called once per judging run, never once per case.
    Generated(Generator),
}

impl Values {
    fn resolve(&self) -> Vec<ConstantValue> {
        match self {
            Values::Fixed(values) => values.clone(),
            Values::Generated(f) => f(),
        }
    }
}

pub enum Sample {
    Fixed(String),
    Generated(SampleFn),
}

impl Sample {
    pub fn expected(&self, bindings: &[Binding]) -> String {
        match self {
            Sample::Fixed(s) => s.clone(),
            Sample::Generated(f) => f(bindings),
        }
    }
}

/// A golf challenge.
pub struct Hole {
    pub name: String,
    /// Declaration order is the injection order.
    pub constants: Vec<(String, Values)>,
    pub sample: Sample,
    pub trim: Option<Trim>,
    pub disable_functionality: Vec<Capability>,
}

impl Hole {
    pub fn new(name: impl Into<String>, sample: Sample) -> Self {
        Self {
            name: name.into(),
            constants: Vec::new(),
            sample,
            trim: None,
            disable_functionality: Vec::new(),
        }
    }

    pub fn constant(mut self, name: impl Into<String>, values: Values) -> Self {
        self.constants.push((name.into(), values));
        self
    }

    pub fn trim(mut self, trim: Trim) -> Self {
        self.trim = Some(trim);
        self
    }

    pub fn disable(mut self, capability: Capability) -> Self {
        self.disable_functionality.push(capability);
        self
    }

    /// Expands the declared constants into one parameter set per case.
    ///
    /// There are as many cases as values in the longest sequence, shorter
    /// sequences wrap around. Without any value there is exactly one case
    /// with nothing bound. A constant with an empty sequence is left unbound.
    pub fn cases(&self) -> Vec<Vec<Binding>> {
        let columns: Vec<(&str, Vec<ConstantValue>)> = self
            .constants
            .iter()
            .map(|(name, values)| (name.as_str(), values.resolve()))
            .filter(|(_, values)| !values.is_empty())
            .collect();

        let count = columns.iter().map(|(_, v)| v.len()).max().unwrap_or(0);
        if count == 0 {
            return vec![Vec::new()];
        }

        (0..count)
            .map(|i| {
                columns
                    .iter()
                    .map(|(name, values)| Binding::new(*name, values[i % values.len()].clone()))
                    .collect()
            })
            .collect()
    }
}

impl fmt::Debug for Hole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let constants: Vec<&str> = self.constants.iter().map(|(n, _)| n.as_str()).collect();
        f.debug_struct("Hole")
            .field("name", &self.name)
            .field("constants", &constants)
            .field("trim", &self.trim)
            .field("disable_functionality", &self.disable_functionality)
            .finish()
    }
}

pub const BUILTIN: &[&str] = &[beer::NAME, fizzbuzz::NAME, ucwords::NAME];

/// Loads one of the bundled holes.
pub fn load(name: &str) -> Result<Hole> {
    match name {
        beer::NAME => Ok(beer::hole()),
        fizzbuzz::NAME => Ok(fizzbuzz::hole()),
        ucwords::NAME => Ok(ucwords::hole()),
        _ => Err(Error::UnknownHole(name.to_owned())),
    }
}
