pub mod config;
pub mod error;
pub mod mirror;
pub mod scanner;
pub mod templates;
pub mod writer;

pub use config::{Config, MirrorOptions};
pub use error::{AutoRstError, Result};
pub use mirror::{mirror, MirrorReport, TreeMirrorer};
