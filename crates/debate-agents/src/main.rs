use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use debate_agents::config::AgentsConfig;
use debate_agents::{default_participants, KeywordAnalyzer, OpenAiGenerator};
use orchestration::{Archiver, ChatMessage, DebateEvent, DebateService};

#[derive(Parser)]
#[command(
    name = "debate-agents",
    about = "Run a moderated multi-agent debate and archive the result"
)]
struct Cli {
    /// The proposition under debate.
    #[arg(
        long,
        default_value = "AI will benefit society more than it will harm it."
    )]
    topic: String,

    /// Full rounds to run (one turn per participant each).
    #[arg(long, default_value_t = 2)]
    rounds: u32,

    /// Print each turn the moment it is produced instead of per round.
    #[arg(long)]
    stream: bool,

    /// Archive the finished debate with keyword analysis.
    #[arg(long)]
    save: bool,

    /// Optional TOML config path (endpoint, model, archive directory).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn print_messages(messages: &[ChatMessage], last_round: &mut u32) {
    for message in messages {
        if message.round != *last_round {
            println!("--- Round {} ---", message.round);
            *last_round = message.round;
        }
        println!("{}: {}\n", message.agent, message.text);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AgentsConfig::from_file(path)?,
        None => AgentsConfig::default(),
    };
    info!(
        model = %config.generation.model,
        endpoint = %config.generation.base_url,
        rounds = cli.rounds,
        "debate runner starting"
    );

    let generator = Arc::new(OpenAiGenerator::new(config.generation.clone()));
    let service = DebateService::new(generator)
        .with_analysis(Arc::new(KeywordAnalyzer::default()))
        .with_archiver(Archiver::new(&config.archive_dir));

    let mut last_round = 0u32;
    let session_id = if cli.stream {
        let id = service.start_streaming(&cli.topic, default_participants())?;
        for _ in 0..cli.rounds {
            let mut handle = service.stream(&id)?;
            while let Some(event) = handle.next_event().await {
                match event {
                    DebateEvent::Started { round, .. } => println!("--- Round {} ---", round),
                    DebateEvent::Message { agent, text, .. } => println!("{}: {}\n", agent, text),
                    DebateEvent::Completed { .. } => {}
                    DebateEvent::Error { reason, .. } => anyhow::bail!("round failed: {reason}"),
                }
            }
        }
        id
    } else {
        let update = service
            .start(&cli.topic, default_participants())
            .await?;
        print_messages(&update.messages, &mut last_round);

        for _ in 1..cli.rounds {
            let update = service.resume(&update.session_id).await?;
            print_messages(&update.messages, &mut last_round);
        }
        update.session_id
    };

    let tally = service.tally(&session_id).await?;
    println!("--- Scores ---");
    for (name, wins) in &tally.scores {
        println!("{}: {}", name, wins);
    }
    println!("Overall winner: {}", tally.overall());

    if cli.save {
        let transcript = service.transcript(&session_id).await?;
        let analysis = service
            .analyze(&transcript)
            .await
            .unwrap_or(serde_json::Value::Null);
        let saved = service.save(&session_id, analysis).await?;
        println!("Debate saved to {}", saved.path.display());
    }

    Ok(())
}
