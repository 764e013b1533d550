//! `atombot context`: print the grounding text sent with every request.

use atombot_assistant::build_context;
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let program = config.load_program()?;
    println!("{}", build_context(&program, &config.persona));
    Ok(())
}
