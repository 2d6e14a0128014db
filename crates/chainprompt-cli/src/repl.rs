use anyhow::Result;
use chainprompt_core::{ConversationClient, GenerateOptions};
use std::io::{self, BufRead, Write};

/// Split a comma-separated `--context` value into prompt-name refs.
pub fn parse_context_refs(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// One prompt, one answer, exit.
pub async fn run_single_prompt(
    mut client: ConversationClient,
    prompt: &str,
    name: Option<String>,
    history_refs: Vec<String>,
) -> Result<()> {
    let mut options = GenerateOptions::new().with_history_refs(history_refs);
    if let Some(name) = name {
        options = options.with_prompt_name(name);
    }
    let response = client.generate_response(prompt, options).await?;
    println!("{response}");
    Ok(())
}

/// Interactive loop. Plain lines are prompts; `exit` quits; `:`-commands
/// inspect the session history.
pub async fn run_repl(mut client: ConversationClient) -> Result<()> {
    println!("chainprompt ready. Type 'exit' to quit, ':help' for commands.");

    let stdin = io::stdin();
    loop {
        print!("You: ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();

        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            println!("Goodbye!");
            break;
        }
        if let Some(command) = input.strip_prefix(':') {
            handle_command(&client, command);
            continue;
        }

        match client.generate(input).await {
            Ok(response) => println!("Assistant: {response}"),
            Err(e) => tracing::error!("error generating response: {e}"),
        }
    }

    Ok(())
}

fn handle_command(client: &ConversationClient, command: &str) {
    match command.trim() {
        "history" => match serde_json::to_string_pretty(&client.history_json()) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::error!("could not render history: {e}"),
        },
        "stats" => {
            let by_name = client.prompt_name_usage_stats();
            let by_model = client.model_usage_stats();
            println!("interactions: {}", client.interaction_history().len());
            for (name, count) in by_name {
                println!("  name {name:?}: {count}");
            }
            for (model, count) in by_model {
                println!("  model {model}: {count}");
            }
        }
        "clear" => {
            client.clear_conversation();
            println!("Conversation buffer cleared (history retained).");
        }
        "help" => {
            println!(":history  dump recorded interactions as JSON");
            println!(":stats    usage counts by prompt name and model");
            println!(":clear    reset the provider's turn buffer");
            println!("exit      quit");
        }
        other => println!("Unknown command ':{other}'. Try ':help'."),
    }
}

#[cfg(test)]
mod tests {
    use super::parse_context_refs;

    #[test]
    fn test_parse_context_refs() {
        assert_eq!(parse_context_refs("a, b ,c"), vec!["a", "b", "c"]);
        assert_eq!(parse_context_refs(""), Vec::<String>::new());
        assert_eq!(parse_context_refs("one,,two"), vec!["one", "two"]);
    }
}
