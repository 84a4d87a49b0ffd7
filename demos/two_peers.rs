//! Two peers keeping a document in sync
//!
//! Simulates a client and a server exchanging patch messages over a lossy link:
//! one message is dropped, one is delivered twice, and the engines still agree.
//!
//! Run with: RUST_LOG=debug cargo run --example two_peers

use anyhow::Result;
use diffsync::protocol::{decode_message, encode_message};
use diffsync::{Document, EngineConfig, SyncEngine};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let client = SyncEngine::with_config(EngineConfig::new("client"));
    let server = SyncEngine::with_config(EngineConfig::new("server"));

    let initial = Document::new("notes", json!({"title": "Groceries", "items": ["milk"]}));
    client.add_document(initial.clone());
    server.add_document(initial);

    // 1. The server edits locally, but its message never arrives.
    let lost = server.diff(&Document::new(
        "notes",
        json!({"title": "Groceries (weekend)", "items": ["milk"]}),
    ))?;
    info!(edits = lost.edits.len(), "server -> client (dropped)");

    // 2. The client edits against the original baseline. The server's shadow is
    //    ahead, so it rolls back to its backup and applies the client's edit there.
    let msg = client.diff(&Document::new(
        "notes",
        json!({"title": "Groceries", "items": ["milk", "eggs"]}),
    ))?;
    let wire = encode_message(&msg)?;
    info!(bytes = wire.len(), "client -> server");

    let report = server.patch(&decode_message(&wire)?)?;
    info!(outcomes = ?report.outcomes, pending = server.pending("notes").len(), "server reconciled");

    // 3. The same message is delivered again and discarded.
    let duplicate = server.patch(&decode_message(&wire)?)?;
    info!(outcomes = ?duplicate.outcomes, "server processed duplicate delivery");

    match (client.get_document("notes"), server.get_document("notes")) {
        (Some(c), Some(s)) => {
            info!(
                client = %c.content,
                server = %s.content,
                converged = c.content == s.content,
                "final state"
            );
        }
        _ => anyhow::bail!("document missing after sync"),
    }

    Ok(())
}
