//! History-Backed Navigation
//!
//! This example binds a router to an in-memory history stack and drives it
//! from both sides.
//!
//! Key concepts:
//! - Seeding the router from an existing history entry
//! - Emits proposed to persistence, applied on notify
//! - Deferred commits (propose, commit, notify)
//! - Back/forward navigation driving the router
//! - Params falling back to their configured defaults
//!
//! Run with: cargo run --example history_navigation

use std::sync::Arc;
use waymark::builder::RouterBuilder;
use waymark::core::Query;
use waymark::persistence::{CommitMode, MemoryPersistence};
use waymark::{params, transition_table, RouterEvent};

fn main() {
    println!("=== History-Backed Navigation ===\n");

    let history = Arc::new(
        MemoryPersistence::starting_at("/inbox", params! { "folder" => "work" })
            .mode(CommitMode::Deferred),
    );

    let router = RouterBuilder::new(transition_table! {
        INBOX => "/inbox" { OPEN => MESSAGE, COMPOSE => DRAFT },
        MESSAGE => "/message" { CLOSE => INBOX, REPLY => DRAFT },
        DRAFT => "/draft" { DISCARD => INBOX },
    })
    .start_state("INBOX")
    .query(params! { "folder" => "all" })
    .persistence(history.clone())
    .build()
    .unwrap();

    router.subscribe(|event| match event {
        RouterEvent::StateChanged { previous, current } => {
            println!("  [event] {} -> {} {:?}", previous, current.name, current.params);
        }
        RouterEvent::ParamsChanged { state, changes, .. } => {
            println!("  [event] {} params changed: {} key(s)", state, changes.len());
        }
    });

    println!("Seeded from history: {:?}\n", router.current_state());

    println!("Emit OPEN with id=42 (deferred, nothing applied yet)");
    let outcome = router.emit("OPEN", Query::new().set("id", 42));
    println!("  outcome: {:?}", outcome);
    println!("  router state: {}", router.state());
    println!("  pending commits: {}\n", history.pending());

    println!("Commit the write");
    history.flush();
    println!("  router state: {}\n", router.state());

    println!("Emit REPLY without params (folder reverts to its default)");
    router.emit("REPLY", Query::new());
    history.flush();
    println!("  params: {:?}\n", router.params());

    println!("Browser back twice");
    history.back();
    history.back();
    println!("  router state: {}\n", router.state());

    println!("Browser forward");
    history.forward();
    println!("  router state: {}", router.state());

    println!("\nHistory path: {:?}", router.history().get_path());
    println!("\n=== Example Complete ===");
}
