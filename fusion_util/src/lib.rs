//! Small utilities shared by every crate in the workspace: attribute tables, logging, timing, and
//! JSON I/O.

#[macro_use]
extern crate log;

mod collections;
mod io;
pub mod logger;
mod tags;
mod time;

pub use crate::collections::Counter;
pub use crate::io::{deserialize_btreemap, read_json, serialize_btreemap, to_json, write_json};
pub use crate::tags::Tags;
pub use crate::time::{prettyprint_usize, Timer};
