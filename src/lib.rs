//! A small interactive command interpreter: one line in, at most two
//! processes out.
//!
//! The core is split in two. [`parse`] turns a raw input line into an
//! immutable [`Command`]: argument tokens plus optional `<`/`>` redirection
//! targets and an optional pipe split point. [`run`] consumes the `Command`
//! and launches the processes it describes, wiring redirections and the pipe
//! onto the children's standard streams before the image replacement, then
//! blocks until every child has terminated. The `cd` built-in is recognized
//! by the launcher and handled in-process.

mod builtin;
mod eval;
mod parser;
mod types;

pub use builtin::cd_target;
pub use eval::{run, LaunchError};
pub use parser::{parse, ParseError};
pub use types::{Command, Stage};
