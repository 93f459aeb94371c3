//! FEM array: one [`femd_proxy::FemProxy`] per card, fanned-out commands,
//! global DAQ credit accounting, and the `select`-driven receive loop that
//! feeds the event builder and drains its recycle ring.

pub mod array;
pub mod credit;
pub mod daq;
pub mod error;
pub mod select;

pub use array::{FemArray, SELECT_TIMEOUT};
pub use credit::{apply_request, format_command, plan_request, DaqRequest};
pub use daq::{parse_daq_arg, CredUnit, DaqAccounting, DaqArg};
pub use error::{ArrayError, Result};
