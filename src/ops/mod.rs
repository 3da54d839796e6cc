//! High-level operations.
//!
//! This module contains the implementation of multibuild commands.

pub mod build;
pub mod clean;
pub mod doctor;
pub mod package;
pub mod summary;

pub use build::{build, BuildContext, BuildOptions, BuildReport};
pub use clean::{clean, CleanOptions};
pub use doctor::{doctor, format_report, DoctorOptions, DoctorReport};
pub use package::{PackageOutcome, Packager};
pub use summary::{summarize, ListingSource, Summary};
