use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::PathBuf;

/// A command line that has been assembled but not spawned yet.
///
/// Kept independent of any process API so that both blocking and async
/// callers can turn it into their own command type.
#[derive(Clone, PartialEq, Eq)]
pub struct OsCmd {
    pub bin: PathBuf,
    pub args: Vec<OsString>,
    pub env: Vec<(OsString, OsString)>,
}

impl OsCmd {
    pub fn new(bin: impl Into<PathBuf>) -> Self {
        Self {
            bin: bin.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    pub fn arg(&mut self, a: impl Into<OsString>) -> &mut Self {
        self.args.push(a.into());
        self
    }

    pub fn args<I>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn add_env(&mut self, k: impl Into<OsString>, v: impl AsRef<OsStr>) -> &mut Self {
        self.env.push((k.into(), v.as_ref().to_owned()));
        self
    }
}

impl fmt::Debug for OsCmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (k, v) in &self.env {
            write!(f, "{}={} ", k.to_string_lossy(), v.to_string_lossy())?;
        }
        write!(f, "{}", self.bin.display())?;
        for a in &self.args {
            write!(f, " {}", a.to_string_lossy())?;
        }
        Ok(())
    }
}
