//! Plays a few rounds locally: one host, a handful of players, all on the
//! in-memory store. Run with `RUST_LOG=debug` to watch every transition.
//!
//! ```text
//! cargo run -p hot-seat -- --players=5 --impostors=2 --hints --topic=cucina
//! ```

use std::sync::Arc;

use impostore::prelude::*;
use tracing_subscriber::EnvFilter;

const NAMES: [&str; 8] = ["Anna", "Bruno", "Carla", "Dario", "Elena", "Fabio", "Gina", "Ugo"];

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

struct Args {
    players: usize,
    impostors: u32,
    hints: bool,
    hint_only_first: bool,
    rounds: usize,
    topic: Option<String>,
}

impl Args {
    fn parse() -> Self {
        let mut args = Self {
            players: 4,
            impostors: 1,
            hints: false,
            hint_only_first: false,
            rounds: 2,
            topic: None,
        };
        for arg in std::env::args().skip(1) {
            match arg.split_once('=') {
                Some(("--players", n)) => args.players = n.parse().unwrap_or(args.players),
                Some(("--impostors", n)) => args.impostors = n.parse().unwrap_or(args.impostors),
                Some(("--rounds", n)) => args.rounds = n.parse().unwrap_or(args.rounds),
                Some(("--topic", t)) => args.topic = Some(t.to_string()),
                None if arg == "--hints" => args.hints = true,
                None if arg == "--hint-only-first" => args.hint_only_first = true,
                _ => eprintln!("ignoring unknown argument {arg}"),
            }
        }
        args.players = args.players.clamp(1, NAMES.len());
        args
    }
}

// ---------------------------------------------------------------------------
// Topic lists
// ---------------------------------------------------------------------------

/// Stands in for a generative provider: answers a couple of topics from a
/// canned reply and falls back to the built-in list for anything else.
fn provider_for(topic: &str) -> CannedProvider {
    match topic {
        "cucina" => CannedProvider::replying(
            r#"```json
{"lasagna": "forno", "risotto": "brodo", "tiramisù": "caffè", "pesto": "basilico"}
```"#,
        ),
        "sport" => CannedProvider::replying(
            r#"{"calcio": "pallone", "tennis": "racchetta", "nuoto": "piscina"}"#,
        ),
        _ => CannedProvider::replying("{}"),
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let coordinator = Arc::new(RoomCoordinator::new(MemoryStore::new()));
    let _sweeper = spawn_sweeper(Arc::clone(&coordinator), PulseConfig::default());

    if let Some(topic) = &args.topic {
        let source = coordinator
            .regenerate_catalog(&provider_for(topic), topic)
            .await?;
        println!("word list for {topic:?}: {source:?}");
    }

    let config = HostConfig::default().with_settings(RoomSettings {
        num_impostors: args.impostors,
        hint_enabled: args.hints,
        hint_only_first: args.hint_only_first,
    });
    let host = HostSession::open(Arc::clone(&coordinator), &config).await?;
    println!("room {} open, join at {}", host.code(), host.join_link());

    // Everyone but the host joins through the shared link.
    let mut players = vec![(host.host_id().clone(), "Host".to_string())];
    for (i, name) in NAMES.iter().take(args.players).enumerate() {
        let Some(code) = code_from_link(host.join_link()) else {
            return Err("join link carries no room code".into());
        };
        if !coordinator.is_name_available(&code, name).await? {
            println!("{name} is taken, skipping");
            continue;
        }
        let id = ParticipantId::new(format!("player-{i}"))?;
        coordinator.join(&code, &id, Some(name)).await?;
        players.push((id, name.to_string()));
    }

    for round in 1..=args.rounds {
        host.start().await?;
        println!("\n--- round {round} ---");

        for (id, name) in &players {
            coordinator.reveal(host.code(), id).await?;
            let Some(room) = coordinator.read(host.code()).await? else {
                return Err("room vanished mid-round".into());
            };
            let card = match room.role_card(id) {
                RoleCard::Civilian { word, .. } => format!("civilian, word {word:?}"),
                RoleCard::Impostor { hint: Some(hint), .. } => format!("IMPOSTOR, hint {hint:?}"),
                RoleCard::Impostor { hint: None, .. } => "IMPOSTOR".to_string(),
                RoleCard::Unassigned => "no role".to_string(),
            };
            let first = if room.first_player_id.as_ref() == Some(id) { " (speaks first)" } else { "" };
            println!("{name:>6}: {card}{first}  [{}/{} ready]", room.revealed_count(), room.player_count());
        }

        host.end().await?;
    }

    host.close().await?;
    println!("\nroom closed");
    Ok(())
}
