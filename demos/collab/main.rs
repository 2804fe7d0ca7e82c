use std::{sync::Arc, time::Duration};

use canvasflow::{
    CollabHub, Config, Connection, DataPatch, Focus, KeyChord, NodeChange, SessionBuilder, Viewport, XYPosition,
    store::{MemStore, StaticAuth},
};
use tokio::runtime::Handle;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))).init();

    let config = Config::load_from_str(include_str!("./canvasflow.toml")).unwrap();
    let hub = CollabHub::new(config.collab.queue_size, Handle::current());
    let store = MemStore::new();

    let alice = SessionBuilder::new()
        .config(config.clone())
        .store(&store)
        .auth(Arc::new(StaticAuth::signed_in("0xa11ce", "alice-token")))
        .collab(hub.clone())
        .build()
        .unwrap();
    let bob = SessionBuilder::new()
        .config(config)
        .store(&store)
        .auth(Arc::new(StaticAuth::signed_in("0xb0b", "bob-token")))
        .collab(hub.clone())
        .build()
        .unwrap();

    let editor = alice.editor();
    let viewport = Viewport {
        x: -40.0,
        y: 0.0,
        zoom: 1.5,
    };
    let feed = editor.drop_node("liveFeedNode", XYPosition::new(100.0, 100.0), &viewport).unwrap();
    let note = editor.drop_node("noteNode", XYPosition::new(400.0, 100.0), &viewport).unwrap();
    editor.on_connect(Connection::new(&feed.id, &note.id)).unwrap();
    editor.update_node_data(&note.id, &DataPatch::new().set("text", "BTC volume spiking"));

    for step in 1..=5 {
        let position = XYPosition::new(note.position.x + step as f64 * 10.0, note.position.y);
        editor.on_nodes_change(vec![NodeChange::position(&note.id, position, step < 5)]);
    }

    tokio::time::sleep(Duration::from_millis(100)).await;
    println!("alice: {} undo steps", editor.read(|c| c.history().past_len()));
    println!("bob sees: {:#?}", bob.editor().snapshot().nodes.iter().map(|n| (&n.id, n.position)).collect::<Vec<_>>());

    editor.handle_key(&KeyChord::new("z").ctrl(), Focus::Canvas);
    println!("alice after undo: {:?}", editor.read(|c| c.node(&note.id).map(|n| n.position)));

    let record = alice.save().await.unwrap();
    println!("saved {} as {}", record.registry_id, record.content_hash);

    bob.create_new();
    bob.load(&record.registry_id).await.unwrap();
    println!("bob loaded {} nodes, status: {:?}", bob.editor().snapshot().nodes.len(), bob.status());
}
