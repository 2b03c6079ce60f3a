//! KVFerry - Record model and line codec
//!
//! A dump file is newline-delimited JSON, one record per line. This crate
//! owns the typed record model, the TTL arithmetic on it, and the decoder
//! that turns one line into a [`Record`] or a [`ParseError`].
//!
//! # Design
//!
//! - **Closed variant set**: records are a tagged union discriminated by the
//!   wire `type` field. Every consumer matches exhaustively; there is no
//!   runtime fallback branch. Unknown tags surface at the decode boundary as
//!   [`ParseError::UnsupportedType`] carrying the raw tag.
//! - **Immutable per line**: a record is built once per decoded line,
//!   consumed by one pipeline pass, then dropped. Nothing here does I/O.
//! - **Stable reason tags**: [`Reason`] is the shared vocabulary for the
//!   error stream and the per-reason counters; `as_str()` values are part
//!   of the output format and must not change.

mod decode;
mod model;
mod reason;

pub use decode::{Decoder, ParseError};
pub use model::{Record, epoch_millis_now};
pub use reason::Reason;
