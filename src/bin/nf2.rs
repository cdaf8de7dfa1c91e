//! NF2: acknowledges locations and posts its own back after a delay.

use clap::Parser;
use nf_location::config::NodeKind;
use nf_location::lifecycle::{launch, NodeArgs};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = NodeArgs::parse();
    launch(NodeKind::Nf2, args).await?;
    Ok(())
}
