use anyhow::Result;
use clap::Parser;

mod repl;

#[derive(Parser)]
#[command(name = "chainprompt")]
#[command(about = "Multi-provider AI chat with named, chainable prompt history")]
#[command(version)]
struct Cli {
    /// Run a single prompt and exit
    #[arg(short, long)]
    prompt: Option<String>,

    /// Model to use
    #[arg(short, long)]
    model: Option<String>,

    /// Provider (claude, openai, gemini)
    #[arg(long)]
    provider: Option<String>,

    /// Record the prompt under this name
    #[arg(short, long)]
    name: Option<String>,

    /// Comma-separated prompt names to inject as context
    #[arg(short, long)]
    context: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut settings = chainprompt_core::Settings::load();

    if let Some(ref provider) = cli.provider {
        settings.llm.provider = chainprompt_core::ProviderId::from_name(provider);
        settings.llm.model = settings.llm.provider.default_model().to_string();
    }
    if let Some(ref model) = cli.model {
        settings.llm.model = model.clone();
    }

    let client = settings.build_client()?;

    if let Some(prompt) = cli.prompt {
        let history_refs = cli
            .context
            .map(|c| repl::parse_context_refs(&c))
            .unwrap_or_default();
        repl::run_single_prompt(client, &prompt, cli.name, history_refs).await?;
    } else {
        repl::run_repl(client).await?;
    }

    Ok(())
}
