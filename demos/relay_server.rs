//! Local relay example
//!
//! Runs the local API a browser extension talks to, with the configuration
//! kept in a JSON file. Menu entries are printed whenever the directory list
//! changes, standing in for a real context-menu host.
//!
//! ```bash
//! cargo run --example relay_server -- nas-magnet.json
//! ```
//!
//! After starting, you can:
//! - View Swagger UI at http://localhost:6789/swagger-ui (with `api.swagger_ui` set)
//! - Submit via POST http://localhost:6789/submit
//! - Stream events via GET http://localhost:6789/events

use async_trait::async_trait;
use nas_magnet::menu::{MenuHost, MenuItem, MenuManager};
use nas_magnet::{ConfigStore, Event, JsonFileConfigStore, NasClient, run_with_shutdown};
use std::sync::Arc;

/// Menu host that prints instead of drawing
struct PrintingMenuHost;

#[async_trait]
impl MenuHost for PrintingMenuHost {
    async fn create(&self, item: &MenuItem) -> nas_magnet::Result<()> {
        println!(
            "  + {} {}",
            item.id,
            item.title.as_deref().unwrap_or("-----")
        );
        Ok(())
    }

    async fn remove(&self, id: &str) -> nas_magnet::Result<()> {
        println!("  - {}", id);
        Ok(())
    }

    async fn remove_all(&self) -> nas_magnet::Result<()> {
        println!("  (menu cleared)");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing (optional)
    // Uncomment if you add tracing-subscriber to your dependencies:
    // tracing_subscriber::fmt::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "nas-magnet.json".to_string());
    let store = Arc::new(JsonFileConfigStore::open(&path).await?);

    let api = store.read().await?.api;

    let client = Arc::new(NasClient::from_store(store.clone()).await?);

    let mut menus = MenuManager::new(PrintingMenuHost);
    println!("Context menu:");
    menus.ensure(&client.menus().await?).await?;

    let mut events = client.subscribe();
    let menu_client = client.clone();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                Event::ConfigChanged {
                    directories_changed: true,
                } => {
                    println!("Directories changed, updating menu:");
                    match menu_client.menus().await {
                        Ok(items) => {
                            if let Err(e) = menus.ensure(&items).await {
                                eprintln!("menu update failed: {}", e);
                            }
                        }
                        Err(e) => eprintln!("could not read configuration: {}", e),
                    }
                }
                Event::BadgeChanged { count } if count > 0 => println!("Badge: {}", count),
                Event::BadgeChanged { .. } => println!("Badge cleared"),
                other => println!("Event: {:?}", other),
            }
        }
    });

    println!("Starting nas-magnet relay on http://{}", api.bind_address);
    println!("Configuration file: {}", store.path().display());
    if api.swagger_ui {
        println!("Swagger UI: http://{}/swagger-ui", api.bind_address);
    }
    println!();
    println!("Example commands:");
    println!("  curl -X POST http://{}/submit \\", api.bind_address);
    println!("    -H 'Content-Type: application/json' \\");
    println!("    -d '{{\"magnet_uri\": \"magnet:?xt=urn:btih:...\", \"directory_index\": 0}}'");
    println!();
    println!("  curl -N http://{}/events", api.bind_address);

    run_with_shutdown(client).await?;
    Ok(())
}
