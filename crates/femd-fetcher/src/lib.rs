//! Command fetcher: turns a script or stdin line stream into a sequence of
//! [`Action`]s for the driver thread to carry out, handling script
//! preprocessing, `LOOP`/`NEXT`/`fem`/`$loop` locally so none of it ever
//! reaches the wire.

pub mod directive;
pub mod error;
pub mod fetcher;
pub mod metadata;
pub mod pedlist;
pub mod preprocess;

pub use directive::{parse_directive, substitute_loop_token, Directive, DiskMode, FemSelector};
pub use error::{FetcherError, Result};
pub use fetcher::{Action, Fetcher};
pub use metadata::RunMetadata;
pub use pedlist::format_ped_list;
pub use preprocess::{bypasses_run_metadata, preprocess};
