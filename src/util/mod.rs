//! Shared utilities

pub mod config;
pub mod diagnostic;
pub mod fs;
pub mod hash;
pub mod process;
pub mod shell;
pub mod tools;

pub use config::Config;
pub use diagnostic::Diagnostic;
pub use process::{CommandRunner, ProcessBuilder, ProcessOutput, SystemRunner};
pub use shell::Shell;
pub use tools::{Capabilities, PathProbe, ToolProbe};
