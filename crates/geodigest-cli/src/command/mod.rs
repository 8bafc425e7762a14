use clap::{Parser, Subcommand};

use self::{generate_layers::GenerateLayersArg, summarize::SummarizeArg};

mod generate_layers;
mod summarize;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Summarize feature layers into a compact client summary
    Summarize(#[clap(flatten)] SummarizeArg),
    /// Generate synthetic feature layers for demos and smoke tests
    GenerateLayers(#[clap(flatten)] GenerateLayersArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Summarize(arg) => summarize::run(&arg)?,
        Mode::GenerateLayers(arg) => generate_layers::run(&arg)?,
    }
    Ok(())
}
