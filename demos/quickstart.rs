//! Run a small LLM-judged tournament against OpenRouter.
//!
//! ```sh
//! OPENROUTER_API_KEY=sk-... cargo run --example quickstart [config.json]
//! ```
//!
//! The optional config file is a JSON `TournamentConfig`, e.g.
//! `{"competitors": ["Rust", "Go", "Zig"], "attributes": ["safety"], "label": "languages"}`.

use std::error::Error;

use tournament_harness::{
    run_tournament, JudgmentEvent, JudgmentObserver, LlmJudge, ObserverError, ProviderGateway,
    TournamentConfig,
};

struct Progress;

#[async_trait::async_trait]
impl JudgmentObserver for Progress {
    async fn on_judgment(&self, event: &JudgmentEvent) -> Result<(), ObserverError> {
        eprintln!(
            "[{}/{}] {} vs {} ({}): {:?}",
            event.finished,
            event.submitted,
            event.task.item_a,
            event.task.item_b,
            event.task.attribute,
            event.status
        );
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tournament_harness=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => TournamentConfig::new(
            ["Rust", "Go", "Zig", "C++"],
            ["memory safety", "compile speed"],
            "programming languages",
        )
        .with_concurrency(8),
    };

    let judge = LlmJudge::new(ProviderGateway::from_env()?, config.label.clone());
    let result = run_tournament(&judge, &config, Some(&Progress), None).await?;

    println!(
        "{} judgments: {} completed, {} failed",
        result.report.submitted, result.report.completed, result.report.failed
    );
    for (rank, estimate) in result.strengths.iter().enumerate() {
        println!("{:>2}. {:<24} {:.4}", rank + 1, estimate.competitor, estimate.strength);
    }
    Ok(())
}
