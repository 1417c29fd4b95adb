//! QUARRY Core - Schema and Value Types
//!
//! Pure data structures shared by the scanner, the suggestion resolver and
//! anything that consumes a parsed search query. No parsing happens here.

mod candidate;
mod error;
mod schema;
mod value;

pub use candidate::*;
pub use error::*;
pub use schema::*;
pub use value::*;
