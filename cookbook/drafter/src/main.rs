//! Document drafting agent: the model edits a document with `update` and
//! finishes with `save`.
//!
//! Run: cargo run -p drafter

use chatgraph::{build_model, init_tracing, AppConfig, Drafter, ModelConfig, StdConsole};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing()?;

    let cfg = AppConfig::load(AppConfig::with_model(ModelConfig::new(
        "groq",
        "llama-3.3-70b-versatile",
        0.7,
    )))?;
    let model = build_model(&cfg.model)?;

    let mut drafter = Drafter::new(model).with_output_dir(cfg.session.output_dir.clone());
    drafter.run(&mut StdConsole::new()).await?;
    Ok(())
}
