//! Line-delimited JSON server.
//!
//! Exposes the analysis cache and the tally over stdin/stdout, one JSON
//! object per line in each direction.
//!
//! ## Methods
//!
//! - `mutant` - analyze `dna`; status 200 (mutant), 403 (human) or 400
//! - `stats` - tally report
//! - `health` - liveness
//!
//! ## Example
//!
//! ```text
//! {"id":1,"method":"mutant","dna":["AAAA","CCCC","TTAT","AGAC"]}\n
//! {"id":1,"status":200}\n
//! ```

mod protocol;
mod server;
mod transport;

pub use protocol::{
    ServerRequest, ServerResponse, BAD_REQUEST, FORBIDDEN, INTERNAL_ERROR, NOT_FOUND, OK,
};
pub use server::Server;
pub use transport::{LineTransport, StdioTransport};
