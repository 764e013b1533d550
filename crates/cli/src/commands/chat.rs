//! `atombot chat`: Interactive conversation.
//!
//! Input keeps flowing while a reply is in flight: each dispatched reply runs
//! on its own task and comes back over a channel, so a line typed in the
//! meantime reaches the controller and is dropped there. When stdin closes
//! the loop still waits for the reply it owes.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use atombot_assistant::{
    CompletedReply, ConversationController, ResponseGateway, SubmitRejected,
};
use atombot_core::message::Role;
use tokio::sync::mpsc;

use crate::input::{ChatInput, spawn_stdin_reader};

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    super::warn_if_no_api_key(&config);

    let provider = atombot_providers::build_from_config(&config)?;
    let program = config.load_program()?;
    let mut controller = ConversationController::from_config(&config, program);
    let gateway = Arc::new(ResponseGateway::from_config(&config, provider));
    controller.open();

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║        AtomBot — Admissions Assistant        ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Provider:  {}", gateway.provider_name());
    println!("  Model:     {}", gateway.settings().model);
    println!();
    println!("  Type your question and press Enter.");
    println!("  /reset starts over, 'exit' or Ctrl+D quits.");
    println!();
    print_message(Role::Model, controller.history().greeting());

    drive(&mut controller, gateway, spawn_stdin_reader()).await?;

    println!();
    println!("  Goodbye! 👋");
    println!();

    Ok(())
}

/// Feed `inputs` to the controller until they end and no reply is owed.
pub async fn drive(
    controller: &mut ConversationController,
    gateway: Arc<ResponseGateway>,
    mut inputs: mpsc::Receiver<ChatInput>,
) -> std::io::Result<()> {
    let (reply_tx, mut replies) = mpsc::channel::<CompletedReply>(4);
    let mut reading = true;

    prompt()?;

    loop {
        if !reading && !controller.is_loading() {
            break;
        }

        tokio::select! {
            input = inputs.recv(), if reading => {
                let Some(input) = input else {
                    reading = false;
                    if controller.is_loading() {
                        tracing::debug!("Input closed, waiting for the pending reply");
                    }
                    continue;
                };
                match input {
                    ChatInput::Message(text) => match controller.submit(&text) {
                        Ok(pending) => {
                            eprint!("  ...");
                            let gateway = gateway.clone();
                            let reply_tx = reply_tx.clone();
                            tokio::spawn(async move {
                                let completed = pending.dispatch(&gateway).await;
                                let _ = reply_tx.send(completed).await;
                            });
                            continue;
                        }
                        Err(SubmitRejected::ReplyInFlight) => {
                            eprintln!("  (still answering your last question, that message was not sent)");
                        }
                        Err(SubmitRejected::EmptyInput) => {}
                    },
                    ChatInput::Reset => {
                        controller.reset();
                        println!();
                        print_message(Role::Model, controller.history().greeting());
                    }
                    ChatInput::Open => {
                        controller.open();
                        println!("  [panel open]");
                    }
                    ChatInput::Close => {
                        controller.close();
                        println!("  [panel closed]");
                    }
                }
                if !controller.is_loading() {
                    prompt()?;
                }
            }
            Some(completed) = replies.recv() => {
                eprint!("\r     \r");
                match controller.complete(completed) {
                    Ok(message) => {
                        println!();
                        print_message(message.role, &message.text);
                    }
                    Err(stale) => tracing::debug!(%stale, "Ignoring reply from before reset"),
                }
                if reading {
                    prompt()?;
                }
            }
            else => break,
        }
    }

    Ok(())
}

fn print_message(role: Role, text: &str) {
    let label = match role {
        Role::User => "You",
        Role::Model => "Atom",
    };
    for line in text.lines() {
        println!("  {label} > {line}");
    }
    println!();
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}
