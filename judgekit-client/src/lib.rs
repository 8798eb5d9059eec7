#![deny(clippy::all)]

pub mod abort;
pub mod client;
pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod fallback;
pub mod lang;
pub mod runner;
pub mod service;

pub use self::abort::Abort;
pub use self::config::Config;
pub use self::error::JudgeError;
pub use self::service::CodeJudge;
