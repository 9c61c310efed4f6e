//! Version command implementation

use anyhow::Result;

const APP_NAME: &str = "TODO APP v1";

fn version_line() -> String {
    format!("{} ({})", APP_NAME, env!("CARGO_PKG_VERSION"))
}

/// Execute the version command
pub async fn execute() -> Result<()> {
    println!("{}", version_line());
    Ok(())
}
