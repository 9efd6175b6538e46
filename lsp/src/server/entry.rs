use std::io;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{unbounded, TryRecvError};

use crate::server::rpc::MessageReader;
use crate::server::state::LspServer;

const IDLE_BACKOFF: Duration = Duration::from_millis(5);

/// Runs the server over stdio until an `exit` notification or stream close.
///
/// A dedicated thread does the blocking frame reads and feeds a FIFO; the
/// consumer loop below drains it one message at a time, so document edits
/// and analysis queries are strictly serialized.
pub fn run() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let (sender, receiver) = unbounded();
    thread::spawn(move || {
        let mut reader = MessageReader::new(io::stdin());
        loop {
            match reader.read_message() {
                Ok(Some(message)) => {
                    if sender.send(message).is_err() {
                        break;
                    }
                }
                Ok(None) => continue,
                Err(err) => {
                    tracing::info!(%err, "input stream closed, stopping reader");
                    break;
                }
            }
        }
    });

    let mut server = LspServer::new(io::stdout());
    loop {
        match receiver.try_recv() {
            Ok(message) => {
                if server.process_message(message) {
                    break;
                }
            }
            Err(TryRecvError::Empty) => thread::sleep(IDLE_BACKOFF),
            Err(TryRecvError::Disconnected) => break,
        }
    }
}
