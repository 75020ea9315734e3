//! # tablet-input
//!
//! Input format for jobs that read range-partitioned, sorted key-value tables.
//!
//! Workers only see a flat string-keyed [`JobConfig`], so the driver encodes
//! the server-side iterator stack and the version limit into it and every
//! worker decodes them again before scanning its split.
//!
//! ## Modules
//!
//! - `codec` - Escaped record and list encoding that round-trips any string
//! - `config` - The flat job configuration, its reserved keys and YAML job files
//! - `iterators` - Iterator settings and their encoding into the configuration
//! - `input` - The input format facade: version limit, split planning, record readers
//! - `store` - The store contract, its data model and an in-memory implementation
//! - `error` - Error types and codes
//! - `app` - Logging and fatal-error handling for the binary
pub mod app;
pub mod codec;
pub mod config;
pub mod error;
pub mod input;
pub mod iterators;
pub mod store;

pub use config::{ConfigKeys, JobConfig};
pub use error::{InputError, Result};
pub use input::{InputFormat, RecordReader, SplitDescriptor};
pub use iterators::{IteratorOption, IteratorSetting, IteratorStack};
