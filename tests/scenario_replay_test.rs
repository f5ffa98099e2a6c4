use anyhow::Result;
use kanban_drag::app::StepResult;
use kanban_drag::utils::validation::Validate;
use kanban_drag::{ActivitySuppressor, Confirmation, DropOutcome, ScenarioConfig, ScenarioRunner};
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;

const BOARD: &str = r#"
[board]
name = "release-1.4"
description = "Issues planned for the next release"

[drag]
confirmation_timeout_ms = 50

[refresh]
enabled = true
interval_ms = 10

[viewport]
left = 0.0
width = 500.0
content_width = 800.0

[[columns]]
id = "open"

[[columns.cards]]
id = "issue-1"
width = 200.0
issue = { number = 1, title = "Login fails" }

[[columns.cards]]
id = "issue-2"
width = 200.0
draggable = false
issue = { number = 2, title = "Typo in footer" }

[[columns]]
id = "in-progress"

[[columns]]
id = "closed"
droppable = false

[[columns]]
id = "archive"
accepts_drops = false
"#;

fn write_board(steps: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    write!(file, "{}\n{}", BOARD, steps)?;
    Ok(file)
}

fn cards_of<'a>(report: &'a kanban_drag::ReplayReport, column: &str) -> &'a [String] {
    &report
        .columns
        .iter()
        .find(|c| c.id == column)
        .expect("column present")
        .cards
}

#[tokio::test]
async fn test_replay_accepted_move() -> Result<()> {
    let file = write_board(
        r#"
[[steps]]
action = "start"
card = "issue-1"
left = 100.0

[[steps]]
action = "move"
helper_left = 400.0

[[steps]]
action = "drop_on"
column = "in-progress"

[[steps]]
action = "release"
confirm = "accept"
"#,
    )?;

    let config = ScenarioConfig::from_file(file.path())?;
    config.validate()?;

    let report = ScenarioRunner::new(config).run().await?;

    assert_eq!(report.board, "release-1.4");
    assert_eq!(report.steps.len(), 4);
    assert_eq!(report.steps[1].result, StepResult::Scrolled { offset: 100.0 });
    assert_eq!(
        report.steps[3].result,
        StepResult::Released {
            outcome: DropOutcome::Committed {
                target: "in-progress".to_string()
            }
        }
    );
    assert_eq!(cards_of(&report, "in-progress"), ["issue-1".to_string()]);
    assert_eq!(cards_of(&report, "open"), ["issue-2".to_string()]);
    assert_eq!(report.scroll_offset, 100.0);
    assert_eq!(report.activity_count, 0);
    assert_eq!(report.drag_starts, vec![json!({"number": 1, "title": "Login fails"})]);
    assert_eq!(report.confirmation_requests.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_refused_start_does_not_change_which_card_moves() -> Result<()> {
    let file = write_board(
        r#"
[[steps]]
action = "start"
card = "issue-1"

[[steps]]
action = "start"
card = "issue-2"

[[steps]]
action = "drop_on"
column = "in-progress"

[[steps]]
action = "release"
confirm = "accept"
"#,
    )?;

    let config = ScenarioConfig::from_file(file.path())?;
    config.validate()?;
    let report = ScenarioRunner::new(config).run().await?;

    assert!(matches!(report.steps[1].result, StepResult::Refused { .. }));
    assert_eq!(
        report.steps[3].result,
        StepResult::Released {
            outcome: DropOutcome::Committed {
                target: "in-progress".to_string()
            }
        }
    );
    assert_eq!(cards_of(&report, "in-progress"), ["issue-1".to_string()]);
    assert_eq!(cards_of(&report, "open"), ["issue-2".to_string()]);
    assert_eq!(report.confirmation_requests, vec![json!({"number": 1, "title": "Login fails"})]);
    assert_eq!(report.activity_count, 0);
    Ok(())
}

#[tokio::test]
async fn test_replay_rejected_and_unanswered_moves() -> Result<()> {
    let file = write_board(
        r#"
[[steps]]
action = "start"
card = "issue-1"

[[steps]]
action = "drop_on"
column = "in-progress"

[[steps]]
action = "release"
confirm = "reject"

[[steps]]
action = "start"
card = "issue-1"

[[steps]]
action = "drop_on"
column = "in-progress"

[[steps]]
action = "release"
confirm = "never"
"#,
    )?;

    let config = ScenarioConfig::from_file(file.path())?;
    config.validate()?;
    let report = ScenarioRunner::new(config).run().await?;

    assert_eq!(
        report.steps[2].result,
        StepResult::Released {
            outcome: DropOutcome::Declined {
                target: "in-progress".to_string(),
                confirmation: Confirmation::Rejected,
            }
        }
    );
    assert_eq!(
        report.steps[5].result,
        StepResult::Released {
            outcome: DropOutcome::Declined {
                target: "in-progress".to_string(),
                confirmation: Confirmation::TimedOut,
            }
        }
    );
    assert!(cards_of(&report, "open").contains(&"issue-1".to_string()));
    assert!(cards_of(&report, "in-progress").is_empty());
    assert_eq!(report.activity_count, 0);
    assert_eq!(report.confirmation_requests.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_replay_refuses_invalid_steps_and_ignores_closed_columns() -> Result<()> {
    let file = write_board(
        r#"
[[steps]]
action = "start"
card = "issue-2"

[[steps]]
action = "start"
card = "issue-1"

[[steps]]
action = "drop_on"
column = "closed"

[[steps]]
action = "drop_on"
column = "archive"

[[steps]]
action = "release"

[[steps]]
action = "set_droppable"
column = "closed"
droppable = true

[[steps]]
action = "release"
"#,
    )?;

    let config = ScenarioConfig::from_file(file.path())?;
    config.validate()?;
    let suppressor = ActivitySuppressor::new();
    let report = ScenarioRunner::new(config)
        .with_suppressor(suppressor.clone())
        .run()
        .await?;

    assert!(matches!(report.steps[0].result, StepResult::Refused { .. }));
    assert_eq!(
        report.steps[2].result,
        StepResult::DropEvaluated {
            column: "closed".to_string(),
            recorded: false
        }
    );
    assert_eq!(
        report.steps[3].result,
        StepResult::DropEvaluated {
            column: "archive".to_string(),
            recorded: false
        }
    );
    assert_eq!(
        report.steps[4].result,
        StepResult::Released {
            outcome: DropOutcome::NoTarget
        }
    );
    assert!(matches!(report.steps[6].result, StepResult::Refused { .. }));
    assert!(report.confirmation_requests.is_empty());
    assert_eq!(suppressor.count(), 0);

    let closed = report.columns.iter().find(|c| c.id == "closed").unwrap();
    assert!(closed.droppable);
    Ok(())
}

#[test]
fn test_invalid_board_files_fail_validation() -> Result<()> {
    let duplicate = BOARD.replace("id = \"in-progress\"", "id = \"open\"");
    assert!(ScenarioConfig::from_toml_str(&duplicate)?.validate().is_err());

    let zero_width = BOARD.replace("width = 500.0", "width = 0.0");
    assert!(ScenarioConfig::from_toml_str(&zero_width)?.validate().is_err());

    let unknown_column = format!("{}\n[[steps]]\naction = \"drop_on\"\ncolumn = \"review\"\n", BOARD);
    assert!(ScenarioConfig::from_toml_str(&unknown_column)?.validate().is_err());

    assert!(ScenarioConfig::from_toml_str("[board\nname = 1").is_err());
    Ok(())
}

#[test]
fn test_missing_file_is_io_error() {
    let err = ScenarioConfig::from_file("/definitely/not/here/board.toml").unwrap_err();
    assert!(matches!(err, kanban_drag::BoardError::IoError(_)));
}
