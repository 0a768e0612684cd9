/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes three top-level command modules:

- `chat`   - Interactive chat session
- `ask`    - Stream a single completion to stdout
- `models` - List models installed on the server

These handlers are intentionally small and use the library components:
the model client, the session controller, and the terminal renderer.
*/

use crate::client::{ModelHandle, OllamaClient};
use crate::config::Config;
use crate::error::Result;

// Special commands parser for the chat REPL
pub mod special_commands;

// Model discovery command
pub mod models;

/// Build and initialize an Ollama client, applying CLI overrides
///
/// Initialization failure is fatal by design: the caller surfaces the
/// error and the process refuses to accept prompts.
async fn initialize_client(
    config: &Config,
    host: Option<String>,
    model: Option<String>,
) -> Result<(OllamaClient, ModelHandle)> {
    let mut ollama = config.ollama.clone();
    if let Some(host) = host {
        ollama.host = host;
    }
    if let Some(model) = model {
        ollama.model = model;
    }

    let mut client = OllamaClient::new(ollama)?;
    let handle = client.initialize().await?;
    Ok((client, handle))
}

// Chat command handler
pub mod chat {
    //! Interactive chat session handler.
    //!
    //! Initializes the model client, creates a session controller, and
    //! runs a readline-based loop that streams each response into the
    //! terminal as it is generated.

    use super::*;
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use crate::render::{render_history, TerminalRenderer};
    use crate::session::SessionController;

    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start an interactive chat session
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `host` - Optional override for the Ollama server host
    /// * `model` - Optional override for the model name
    ///
    /// # Errors
    ///
    /// Returns error when model initialization fails (the session is
    /// never started then) or when the terminal cannot be driven.
    pub async fn run_chat(
        config: Config,
        host: Option<String>,
        model: Option<String>,
    ) -> Result<()> {
        tracing::info!("Starting interactive chat session");

        let (client, handle) = match initialize_client(&config, host, model).await {
            Ok(ready) => ready,
            Err(e) => {
                eprintln!("{}", format!("Failed to initialize model: {}", e).red());
                eprintln!(
                    "{}",
                    "Make sure the Ollama server is running (`ollama serve`) and the model is pulled (`ollama pull <model>`)."
                        .yellow()
                );
                return Err(e);
            }
        };

        print_welcome_banner(&handle);

        let mut controller = SessionController::new(Box::new(client));
        let mut renderer = TerminalRenderer::new();
        let mut rl = DefaultEditor::new()?;

        loop {
            match rl.readline(">> ") {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    match parse_special_command(trimmed) {
                        SpecialCommand::Help => {
                            print_help();
                            continue;
                        }
                        SpecialCommand::History => {
                            println!();
                            render_history(controller.session(), &mut renderer);
                            continue;
                        }
                        SpecialCommand::Exit => break,
                        SpecialCommand::Unknown(command) => {
                            println!(
                                "Unknown command: /{}\nType '/help' to see available commands\n",
                                command
                            );
                            continue;
                        }
                        SpecialCommand::None => {
                            // Regular prompt for the model
                        }
                    }

                    rl.add_history_entry(trimmed)?;

                    // Input stays disabled until the turn finishes: the
                    // loop awaits the whole stream before reading again.
                    if let Err(e) = controller.submit_prompt(trimmed, &mut renderer).await {
                        eprintln!("Error: {}\n", e);
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    /// Display the welcome banner with the verified model
    fn print_welcome_banner(handle: &ModelHandle) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║              Murmur - Local Model Chat                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Model:  {}", handle.model().cyan());
        println!("Server: {}\n", handle.host().cyan());
        println!("Type '/help' for available commands, 'exit' to quit\n");
    }
}

// Ask command handler
pub mod ask {
    //! One-shot prompt handler.
    //!
    //! Sends a single prompt and streams the completion straight to
    //! stdout, without a session. Useful for scripting and for
    //! checking that the backend works end to end.

    use super::*;
    use crate::client::ModelClient;

    use std::io::{self, Write};

    /// Send one prompt and stream the completion to stdout
    ///
    /// # Errors
    ///
    /// Unlike the interactive session, failures are not converted into
    /// messages here: any initialization or streaming error is
    /// propagated and ends the process with a nonzero exit.
    pub async fn run_ask(
        config: Config,
        prompt: String,
        host: Option<String>,
        model: Option<String>,
    ) -> Result<()> {
        let (client, handle) = initialize_client(&config, host, model).await?;

        tracing::info!("Sending prompt to {}", handle.model());

        let mut stream = client.stream_completion(&prompt).await?;
        let mut stdout = io::stdout();

        while let Some(item) = stream.next().await {
            let fragment = item?;
            write!(stdout, "{}", fragment)?;
            stdout.flush()?;
        }
        writeln!(stdout)?;

        Ok(())
    }
}
