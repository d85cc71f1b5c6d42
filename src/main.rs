use std::sync::Arc;

use anyhow::Result;
use scrabble_engine::{Config, Dictionary, Game, GameCommand, GameEvent};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the event stream
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scrabble_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting scrabble engine...");

    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    let dictionary = match Dictionary::load(&config.dictionary_path).await {
        Ok(dict) => dict,
        Err(e) => {
            tracing::warn!(
                "Failed to load dictionary: {}. Using empty dictionary for now.",
                e
            );
            tracing::warn!(
                "Download a word list to {} for full functionality",
                config.dictionary_path
            );
            Dictionary::empty()
        }
    };

    let game = Game::new(config.game.clone(), Arc::new(dictionary))?;
    let (_, mut events) = game.events().channel();

    // Print every event as a JSON line
    let max_rounds = config.max_rounds;
    let game_for_events = game.clone();
    let send_task = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => println!("{}", json),
                Err(e) => tracing::error!("Failed to serialize event: {}", e),
            }
            match event {
                GameEvent::RoundCompleted { round } if max_rounds.is_some_and(|max| round >= max) => {
                    tracing::info!("Reached {} rounds, stopping", round);
                    game_for_events.end_game();
                }
                GameEvent::GameEnded { .. } => break,
                _ => {}
            }
        }
    });

    // Read commands as JSON lines
    let game_for_commands = game.clone();
    let mut recv_task = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => match serde_json::from_str::<GameCommand>(&line) {
                    Ok(command) => {
                        if let Err(e) = game_for_commands.dispatch(command) {
                            tracing::warn!("Command rejected: {}", e);
                        }
                    }
                    Err(e) => tracing::error!("Failed to parse command: {}", e),
                },
                Ok(None) => {
                    tracing::info!("Input closed");
                    break;
                }
                Err(e) => {
                    tracing::error!("Failed to read input: {}", e);
                    break;
                }
            }
        }
    });

    let game_loop = game.clone();
    let mut game_task = tokio::spawn(async move { game_loop.start_game().await });

    tokio::select! {
        _ = (&mut game_task) => {
            recv_task.abort();
        }
        _ = (&mut recv_task) => {
            game.end_game();
        }
    }

    let _ = game_task.await;
    let _ = send_task.await;

    tracing::info!("Final scores: {:?}", game.scores());
    Ok(())
}
