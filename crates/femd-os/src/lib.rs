//! Thread, mutex, counting-semaphore, and monotonic-clock primitives shared
//! across the DAQ core crates.

pub mod clock;
pub mod semaphore;
pub mod worker;

pub use clock::{Clock, FakeClock, SystemClock};
pub use semaphore::{Semaphore, WaitResult};
pub use worker::{StopToken, WorkerThread};
