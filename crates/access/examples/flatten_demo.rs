//! Seed a small in-memory store and dump flattened records as JSON.
//!
//! Run with `cargo run -p recview-access --example flatten_demo`. Set
//! `RUST_LOG=debug` to watch the resolution diagnostics.

use anyhow::Result;
use recview_access::RecordAccessor;
use recview_core::{load_dotenv, AccessConfig};
use recview_store::{MemoryStore, RecordDraft};

fn main() -> Result<()> {
    load_dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut store = MemoryStore::new();
    store.create_table(
        "incident",
        "number",
        &["number", "short_description", "opened_for", "sys_created_on"],
    );
    store.create_table("sys_user", "name", &["user_name", "name", "email"]);
    store.create_table("interaction", "number", &["number", "opened_for", "channel"]);

    let user_id = store.insert(
        "sys_user",
        RecordDraft::new()
            .set("user_name", "abel.tuter")
            .set("name", "Abel Tuter")
            .set("email", "abel.tuter@example.com"),
    )?;
    store.insert(
        "incident",
        RecordDraft::new()
            .set("number", "INC0010042")
            .set("short_description", "Disk full")
            .set_with_display("opened_for", &user_id, "Abel Tuter"),
    )?;
    store.insert(
        "interaction",
        RecordDraft::new()
            .set("number", "IMS0001001")
            .set_with_display("opened_for", &user_id, "Abel Tuter")
            .set("channel", "chat"),
    )?;

    let accessor = RecordAccessor::with_config(store, AccessConfig::from_env());

    println!("incident by number:");
    println!("  {}", accessor.get_fields_as_text("incident", "INC0010042", false));
    println!("populated fields only:");
    println!("  {}", accessor.get_populated_fields_as_text("incident", "INC0010042"));
    println!(
        "short description: {:?}",
        accessor.get_short_description("incident", "INC0010042")
    );
    println!("interactions for abel.tuter:");
    println!("  {}", accessor.find_user_interactions_as_text("abel.tuter", true));
    println!("lookup against a bogus table (fail-soft):");
    println!("  {}", accessor.get_fields_as_text("bogus_table", "INC0010042", false));

    Ok(())
}
