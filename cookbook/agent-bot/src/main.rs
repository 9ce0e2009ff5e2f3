//! Stateless chat: every line goes to the model on its own.
//!
//! Run: cargo run -p agent-bot   (type `exit` to quit)

use chatgraph::{build_model, init_tracing, AppConfig, ChatSession, ModelConfig, StdConsole};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing()?;

    let cfg = AppConfig::load(AppConfig::with_model(ModelConfig::new(
        "gemini",
        "gemini-2.5-flash",
        0.0,
    )))?;
    let model = build_model(&cfg.model)?;

    let mut session = ChatSession::new(model);
    session.run(&mut StdConsole::new()).await?;
    Ok(())
}
