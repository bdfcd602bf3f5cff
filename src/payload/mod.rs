mod graph;
mod parse;

pub use graph::{GraphPayload, LinkRecord, NodeKind, NodeRecord};
pub use parse::{PayloadError, load_payload, parse_payload};
