//! Pagecast - publish Markdown post records to social platforms
//!
//! This library provides the core publish pipeline: select the next ready
//! record from a posts directory, run the platform's publish protocol, and
//! durably record the outcome back into the file's front matter.

pub mod config;
pub mod error;
pub mod frontmatter;
pub mod logging;
pub mod platforms;
pub mod record;
pub mod reset;
pub mod runner;
pub mod selector;
pub mod store;

// Re-export commonly used types
pub use config::{Config, Credentials};
pub use error::{PagecastError, Result};
pub use frontmatter::{FrontMatter, Value};
pub use platforms::{create_publisher, PlatformKind, Publisher};
pub use record::{PostRecord, PostStatus};
pub use reset::reset_all;
pub use runner::{publish_next, PublishReport};
pub use selector::{select_next, PlatformFilter};
pub use store::{FsStore, GitStore, MemoryStore, OutcomeStore};
