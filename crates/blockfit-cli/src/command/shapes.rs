use std::io::{self, Write as _};

use anyhow::Context;
use blockfit_engine::{Block, BlockType};

const ROTATIONS: usize = 4;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ShapesArg {
    /// Only show this block type (e.g. `L_SMALL`)
    #[arg(long = "type")]
    block_type: Option<BlockType>,
}

pub(crate) fn run(arg: &ShapesArg) -> anyhow::Result<()> {
    let types = match arg.block_type {
        Some(kind) => vec![kind],
        None => BlockType::ALL.to_vec(),
    };

    let mut stdout = io::stdout().lock();
    for kind in types {
        let mut block = Block::new(kind);
        for _ in 0..ROTATIONS {
            let data = serde_json::to_string(&block)
                .with_context(|| format!("Failed to serialize block {kind}"))?;
            writeln!(stdout, "{kind} {}°", block.rotation().degrees())?;
            write!(stdout, "{}", render(&block))?;
            writeln!(stdout, "{data}")?;
            writeln!(stdout)?;
            block = block.rotated();
        }
    }
    stdout.flush()?;
    Ok(())
}

/// Draws `block` inside its bounding box, `#` for filled cells and `.` for
/// gaps, one line per row.
fn render(block: &Block) -> String {
    let bounds = block.bounds();
    let mut grid = vec![vec!['.'; bounds.width]; bounds.height];
    for pos in block.shape() {
        if let (Ok(row), Ok(col)) = (usize::try_from(pos.row), usize::try_from(pos.col)) {
            grid[row][col] = '#';
        }
    }
    grid.into_iter()
        .map(|line| line.into_iter().chain(['\n']).collect::<String>())
        .collect()
}
