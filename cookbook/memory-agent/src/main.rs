//! Chat that remembers the whole conversation and logs it on exit.
//!
//! Run: cargo run -p memory-agent   (type `exit` to quit and write the log)

use chatgraph::{
    build_model, init_tracing, write_transcript, AppConfig, ChatSession, Console, ModelConfig,
    StdConsole,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing()?;

    let cfg = AppConfig::load(AppConfig::with_model(ModelConfig::new(
        "gemini",
        "gemini-2.5-flash",
        0.7,
    )))?;
    let model = build_model(&cfg.model)?;

    let mut console = StdConsole::new();
    let mut session = ChatSession::new(model).with_history(true);
    session.run(&mut console).await?;

    let path = &cfg.session.transcript_path;
    write_transcript(path, session.conversation().turns()).await?;
    console
        .write_line(&format!("Conversation saved to {}", path.display()))
        .await?;
    Ok(())
}
