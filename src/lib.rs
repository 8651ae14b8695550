//! Comment-title outlines.
//!
//! Marked comment lines such as `/* > Setup */` or `// ## Details` become
//! titles. The crate scans a document for them, keeps a table-of-contents
//! block inside the document in sync, and moves the cursor between titles.
//! The editor itself stays behind the traits in [`host`].

pub mod command;
pub mod config;
pub mod error;
pub mod format;
pub mod host;
pub mod navigate;
pub mod outline;
pub mod rpc;
pub mod scan;
pub mod types;

pub use command::{Args, Command, CommandTable, Context, Outcome, TableOfComments};
pub use config::{Config, SettingsStore, TomlSettings};
pub use error::TocError;
pub use outline::SyncOutcome;
pub use types::{Direction, Span, Title};
