//! `atombot ask`: one message, one reply.

use atombot_assistant::{ChatSession, SendOutcome};
use std::path::Path;

pub async fn run(config_path: Option<&Path>, message: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    super::warn_if_no_api_key(&config);

    let provider = atombot_providers::build_from_config(&config)?;
    let mut session = ChatSession::from_config(&config, provider)?;

    eprint!("  Thinking...");
    let outcome = session.send(message).await;
    eprint!("\r              \r");

    match outcome {
        SendOutcome::Replied(reply) | SendOutcome::FellBack(reply) => {
            println!("{}", reply.text);
            Ok(())
        }
        SendOutcome::Rejected(reason) => Err(format!("Message not sent: {reason}").into()),
        SendOutcome::Stale(stale) => Err(stale.to_string().into()),
    }
}
