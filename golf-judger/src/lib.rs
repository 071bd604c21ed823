#![deny(clippy::all)]

pub mod config;
pub mod docker;
mod error;
pub mod exec;
pub mod hole;
pub mod image;
pub mod judge;
pub mod lang;
pub mod normalize;
pub mod provider;
pub mod registry;

pub use self::config::Config;
pub use self::error::{Error, Result};
pub use self::judge::{CaseResult, Failure, JudgeVerdict, Judger};
