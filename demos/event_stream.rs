//! Driving the lower pipeline stages directly: tokens, events and nodes.
//!
//! Run with: cargo run --example event_stream

use serde_yamlet::events::{Event, EventKind};
use serde_yamlet::{compose, emit, parse, scan, serialize, DumpOptions};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let text = "%YAML 1.1\n--- !!map\nname: &n demo\nalias: *n\nlist: [a, b]\n";

    println!("Tokens:");
    for token in scan(text)? {
        println!(
            "  {:>2}:{:<2} {:?}",
            token.start_mark.line, token.start_mark.column, token.kind
        );
    }

    println!("\nEvents:");
    let events = parse(text)?;
    for event in &events {
        println!("  {}", event.kind.name());
    }

    println!("\nRe-emitted:\n{}", emit(events, &DumpOptions::new())?);

    if let Some(document) = compose(text)? {
        if let Some(root) = document.root_node() {
            println!("Root node tag: {}", root.tag);
        }
        println!("Serialized graph:\n{}", serialize(&document, &DumpOptions::new())?);
    }

    // Events can also be built by hand
    let built = vec![
        Event::new(EventKind::StreamStart),
        Event::new(EventKind::DocumentStart {
            explicit: true,
            version: None,
            tags: Vec::new(),
        }),
        Event::new(EventKind::SequenceStart {
            anchor: None,
            tag: None,
            implicit: true,
            flow_style: false,
        }),
        Event::new(EventKind::plain_scalar("hand")),
        Event::new(EventKind::plain_scalar("built")),
        Event::new(EventKind::SequenceEnd),
        Event::new(EventKind::DocumentEnd { explicit: false }),
        Event::new(EventKind::StreamEnd),
    ];
    println!("Hand-built stream:\n{}", emit(built, &DumpOptions::new())?);

    // Errors carry marks that render a snippet of the source
    if let Err(err) = parse("key: [1, 2\nnext: 3\n") {
        println!("Parse error:\n{}", err);
    }

    Ok(())
}
