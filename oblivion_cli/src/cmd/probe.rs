use anyhow::Result;
use oblivion_storage::{Selector, StorageConfig};

pub async fn run_probe(config: &StorageConfig, prefer_mock: bool) -> Result<()> {
    let resolution = Selector::new(config).resolve_with_report(prefer_mock).await;

    for attempt in &resolution.attempts {
        println!("{:<12} {}", attempt.backend.to_string(), attempt.outcome);
    }
    if config.is_mock_only() && !prefer_mock {
        println!("no hosted or self-hosted backend configured");
    }
    println!("selected backend: {}", resolution.backend());
    Ok(())
}
