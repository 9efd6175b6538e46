mod docs;
mod entry;
mod handlers;
mod rpc;
mod state;

pub use docs::{position_to_offset, DocumentStore};
pub use entry::run;
pub use rpc::{Message, MessageReader, MessageWriter};
pub use state::LspServer;
