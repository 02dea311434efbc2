use clap::{Parser, Subcommand};

use self::{replay::ReplayArg, shapes::ShapesArg};

mod replay;
mod shapes;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play a recorded list of moves and report the outcome of each
    Replay(#[clap(flatten)] ReplayArg),
    /// Print every block type in all four rotations
    Shapes(#[clap(flatten)] ShapesArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Replay(arg) => replay::run(&arg)?,
        Mode::Shapes(arg) => shapes::run(&arg)?,
    }
    Ok(())
}
