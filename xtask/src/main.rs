use std::time::{Duration, Instant};
use rand::{seq::SliceRandom, thread_rng};
use reqwest::Client;
use hdrhistogram::Histogram;
use serde_json::Value;


// Sends the same questions to every listed model through /v1/ask and prints per-model latency.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let base = std::env::args().nth(1).unwrap_or_else(|| "http://127.0.0.1:8501".to_string());
    let rounds: usize = std::env::args().nth(2).and_then(|s| s.parse().ok()).unwrap_or(5);
    let questions = vec!["What is the capital of France?", "Explain ownership in one sentence.", "Name three prime numbers.", "What is a haiku?"];

    let client = Client::builder().timeout(Duration::from_secs(300)).build()?;
    let models: Value = client.get(format!("{base}/v1/models")).send().await?.json().await?;
    let ids: Vec<String> = models["models"]
        .as_array()
        .map(|a| a.iter().filter_map(|m| m["id"].as_str().map(str::to_string)).collect())
        .unwrap_or_default();

    // one request at a time, matching how the form is used
    for id in ids {
        let mut hist = Histogram::<u64>::new(3)?;
        let mut errors = 0usize;
        for _ in 0..rounds {
            let q = {
                let mut rng = thread_rng();
                questions.choose(&mut rng).copied().unwrap_or("Hello?")
            };
            let t0 = Instant::now();
            let res = client.post(format!("{base}/v1/ask")).json(&serde_json::json!({"question": q, "model": id})).send().await;
            let dur = t0.elapsed();
            match res {
                Ok(r) if r.status().is_success() => { hist.record(dur.as_millis() as u64).ok(); }
                _ => errors += 1,
            }
        }
        if hist.len() == 0 {
            println!("{id:<16} unavailable ({errors} errors)");
            continue;
        }
        println!(
            "{id:<16} ok {:>3}  err {:>3}  p50 {:>6} ms  p95 {:>6} ms  max {:>6} ms",
            hist.len(), errors, hist.value_at_quantile(0.50), hist.value_at_quantile(0.95), hist.max()
        );
    }
    Ok(())
}
