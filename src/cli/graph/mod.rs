//! Graph command - prints the answer graph

use crate::domain::graph::to_mermaid;

pub fn run() -> anyhow::Result<()> {
    print!("{}", to_mermaid());
    Ok(())
}
