use std::path::PathBuf;

use blockfit_engine::{Block, BlockType, GameSession, GameState, MoveOutcome, SessionConfig};
use serde::{Deserialize, Serialize};

use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ReplayArg {
    /// JSON file holding an array of `{"candidate", "row", "col"}` moves
    moves: PathBuf,
    /// Session configuration JSON file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for the block generator, overriding the configuration file
    #[arg(long)]
    seed: Option<u32>,
    /// Number of candidate slots, overriding the configuration file
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    capacity: Option<u16>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

/// One recorded player action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct Move {
    candidate: usize,
    row: i32,
    col: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct MoveRecord {
    #[serde(flatten)]
    action: Move,
    /// Type of the selected candidate, if the slot held one.
    block_type: Option<BlockType>,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<MoveOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct ReplayReport {
    moves: Vec<MoveRecord>,
    total_score: i64,
    move_count: u64,
    game_state: GameState,
    /// Final board, one `#`/`.` string per row.
    board: Vec<String>,
}

pub(crate) fn run(arg: &ReplayArg) -> anyhow::Result<()> {
    let ReplayArg {
        moves,
        config,
        seed,
        capacity,
        output,
    } = arg;

    let mut session_config: SessionConfig = match config {
        Some(path) => util::read_json_file("session config", path)?,
        None => SessionConfig::default(),
    };
    if let Some(seed) = seed {
        session_config.seed = Some(*seed);
    }
    if let Some(capacity) = capacity {
        session_config.queue_capacity = usize::from(*capacity);
    }
    let moves: Vec<Move> = util::read_json_file("moves", moves)?;

    let mut session = GameSession::from_config(&session_config)?;
    session.start();
    let report = replay(&mut session, &moves);
    tracing::info!(
        applied = report.move_count,
        recorded = moves.len(),
        total_score = report.total_score,
        "replay finished"
    );

    util::write_json(&report, output.as_deref())
}

/// Applies `moves` in order to a started session until the game ends.
fn replay(session: &mut GameSession, moves: &[Move]) -> ReplayReport {
    let mut records = Vec::with_capacity(moves.len());
    for &action in moves {
        if !session.is_playing() {
            break;
        }
        let block_type = session.candidate(action.candidate).map(Block::block_type);
        let record = match session.place_candidate(action.candidate, action.row, action.col) {
            Ok(outcome) => MoveRecord {
                action,
                block_type,
                success: true,
                outcome: Some(outcome),
                reason: None,
            },
            Err(err) => {
                tracing::warn!(?action, reason = %err, "move rejected");
                MoveRecord {
                    action,
                    block_type,
                    success: false,
                    outcome: None,
                    reason: Some(err.to_string()),
                }
            }
        };
        records.push(record);
    }

    ReplayReport {
        moves: records,
        total_score: session.total_score(),
        move_count: session.move_count(),
        game_state: session.game_state(),
        board: session.board().to_string().lines().map(str::to_owned).collect(),
    }
}

#[cfg(test)]
mod tests {
    use blockfit_engine::Board;

    use super::*;

    fn single_block_session() -> GameSession {
        let config = SessionConfig {
            seed: Some(1),
            block_types: Some(vec![BlockType::Single]),
            ..SessionConfig::default()
        };
        let mut session = GameSession::from_config(&config).unwrap();
        session.start();
        session
    }

    #[test]
    fn test_replay_records_each_move() {
        let mut session = single_block_session();
        let moves = [
            Move { candidate: 0, row: 0, col: 0 },
            Move { candidate: 5, row: 0, col: 1 },
            Move { candidate: 1, row: 0, col: 0 },
            Move { candidate: 2, row: 8, col: 8 },
        ];
        let report = replay(&mut session, &moves);

        let successes: Vec<bool> = report.moves.iter().map(|m| m.success).collect();
        assert_eq!(successes, [true, false, false, true]);
        assert_eq!(
            report.moves[1].reason.as_deref(),
            Some("Invalid candidate index")
        );
        assert_eq!(report.moves[1].block_type, None);
        assert_eq!(report.moves[2].reason.as_deref(), Some("Position occupied"));
        assert_eq!(report.moves[3].block_type, Some(BlockType::Single));
        assert_eq!(report.total_score, 2);
        assert_eq!(report.move_count, 2);
        assert_eq!(report.game_state, GameState::Playing);
        assert_eq!(report.board.len(), Board::SIZE);
        assert_eq!(report.board[0], "#........");
        assert_eq!(report.board[8], "........#");
    }

    #[test]
    fn test_replay_stops_at_game_over() {
        let config = SessionConfig {
            seed: Some(1),
            block_types: Some(vec![BlockType::Square2x2]),
            ..SessionConfig::default()
        };
        let mut session = GameSession::from_config(&config).unwrap();
        session.start();
        // Only the top-left 2x2 hole can take a square.
        *session.board_mut() = Board::from_ascii(
            "
            ..##.####
            ..####.##
            ##.######
            ###.#####
            .###.####
            #####.###
            #.####.##
            #######.#
            ########.
            ",
        );
        let moves = [
            Move { candidate: 0, row: 0, col: 0 },
            Move { candidate: 1, row: 2, col: 2 },
        ];
        let report = replay(&mut session, &moves);

        assert_eq!(report.moves.len(), 1);
        assert!(report.moves[0].outcome.as_ref().unwrap().game_over);
        assert_eq!(report.move_count, 1);
        assert_eq!(report.total_score, 4);
        assert_eq!(report.game_state, GameState::GameOver);
    }

    #[test]
    fn test_report_serializes_outcome_or_reason() {
        let mut session = single_block_session();
        let moves = [
            Move { candidate: 0, row: 4, col: 4 },
            Move { candidate: 0, row: 9, col: 0 },
        ];
        let report = replay(&mut session, &moves);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["moves"][0]["success"], true);
        assert_eq!(json["moves"][0]["outcome"]["placement"]["score"], 1);
        assert_eq!(json["moves"][0]["block_type"], "SINGLE");
        assert!(json["moves"][0].get("reason").is_none());
        assert_eq!(json["moves"][1]["reason"], "Out of bounds");
        assert_eq!(json["moves"][1]["row"], 9);
        assert_eq!(json["game_state"], "PLAYING");
    }

    #[test]
    fn test_moves_parse_from_json() {
        let moves: Vec<Move> =
            serde_json::from_str(r#"[{"candidate":2,"row":3,"col":-1}]"#).unwrap();
        assert_eq!(moves, [Move { candidate: 2, row: 3, col: -1 }]);
    }
}
