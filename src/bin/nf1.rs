//! NF1: triggers the exchange and receives NF2's follow-up.

use clap::Parser;
use nf_location::config::NodeKind;
use nf_location::lifecycle::{launch, NodeArgs};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = NodeArgs::parse();
    launch(NodeKind::Nf1, args).await?;
    Ok(())
}
