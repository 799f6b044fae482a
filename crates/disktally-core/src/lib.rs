/// DiskTally Core: option parsing, scan drivers, and data model.
///
/// This crate contains all business logic with zero terminal dependencies.
/// The frontend drives it one step at a time from a single thread.
///
/// # Modules
///
/// - [`cli`]: Hand-rolled argv tokenizer and the configuration resolver.
/// - [`config`]: The flat `Config` record the resolver produces.
/// - [`scan`]: Scan cursor, error channel, scratch entry, and source drivers.
/// - [`sink`]: Where scanned entries go: in-memory tree or export file.
/// - [`model`]: Arena-allocated file tree and size formatting.
/// - [`redraw`]: Wall-clock cadence for throttling redraws.
/// - [`pipeline`]: Opens the source and sink a run was configured with.
/// - [`delete`]: Incremental filesystem deletion.
/// - [`error`]: Usage and startup errors.
/// - [`exclude`]: Exclusion pattern set.
/// - [`platform`]: OS probes (kernel pseudo-filesystems, firmlinks, stream errors).
pub mod cli;
pub mod config;
pub mod delete;
pub mod error;
pub mod exclude;
pub mod model;
pub mod pipeline;
pub mod platform;
pub mod redraw;
pub mod scan;
pub mod sink;

pub use config::Config;
pub use error::UsageError;
