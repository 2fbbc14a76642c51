use std::io::{IsTerminal, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    cursor, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::http::ProgressSink;

const BAR_WIDTH: usize = 30;
const REDRAW_INTERVAL: Duration = Duration::from_millis(100);

/// Counts finished requests; shared between the workers and the renderer.
#[derive(Debug, Default)]
pub(crate) struct RequestProgress {
    completed: AtomicU64,
}

impl RequestProgress {
    pub(crate) fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }
}

impl ProgressSink for RequestProgress {
    fn increment(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }
}

/// Redraws the bar on stderr until `done_rx` fires. Does nothing when stderr
/// is not a terminal.
pub(crate) fn setup_progress_indicator(
    progress: Arc<RequestProgress>,
    goal: u64,
    run_start: Instant,
    mut done_rx: oneshot::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if !std::io::stderr().is_terminal() {
            return;
        }

        let mut ticker = tokio::time::interval(REDRAW_INTERVAL);
        loop {
            tokio::select! {
                _ = &mut done_rx => {
                    let line = build_progress_line(progress.completed(), goal, run_start.elapsed());
                    if render_progress_line(&line).is_ok() {
                        drop(finish_progress_line());
                    }
                    break;
                }
                _ = ticker.tick() => {
                    let line = build_progress_line(progress.completed(), goal, run_start.elapsed());
                    if render_progress_line(&line).is_err() {
                        break;
                    }
                }
            }
        }
    })
}

fn render_progress_line(line: &[ProgressSegment]) -> Result<(), std::io::Error> {
    let mut out = std::io::stderr();
    queue!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine))?;
    for segment in line {
        if let Some(color) = segment.color {
            queue!(
                out,
                SetForegroundColor(color),
                Print(&segment.text),
                ResetColor
            )?;
        } else {
            queue!(out, Print(&segment.text))?;
        }
    }
    out.flush()?;
    Ok(())
}

fn finish_progress_line() -> Result<(), std::io::Error> {
    let mut out = std::io::stderr();
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

fn build_progress_line(current: u64, goal: u64, elapsed: Duration) -> Vec<ProgressSegment> {
    let goal = goal.max(1);
    let current = current.min(goal);
    let width = u64::try_from(BAR_WIDTH).unwrap_or(u64::MAX);

    let filled = current
        .saturating_mul(width)
        .checked_div(goal)
        .unwrap_or(0);
    let complete_size = usize::try_from(filled).unwrap_or(BAR_WIDTH).min(BAR_WIDTH);
    let incomplete_size = BAR_WIDTH.saturating_sub(complete_size);

    let percent_x100 = current
        .saturating_mul(10_000)
        .checked_div(goal)
        .unwrap_or(0);
    let percent_whole = percent_x100.checked_div(100).unwrap_or(0);
    let percent_frac = percent_x100.checked_rem(100).unwrap_or(0);

    vec![
        ProgressSegment::plain(format!(
            "[{}{}]",
            "#".repeat(complete_size),
            "-".repeat(incomplete_size)
        )),
        ProgressSegment::colored(
            format!(" {}/{} ({}.{:02}%)", current, goal, percent_whole, percent_frac),
            Color::Cyan,
        ),
        ProgressSegment::colored(format!(" | {:.1}s", elapsed.as_secs_f64()), Color::Yellow),
    ]
}

struct ProgressSegment {
    text: String,
    color: Option<Color>,
}

impl ProgressSegment {
    const fn plain(text: String) -> Self {
        Self { text, color: None }
    }

    const fn colored(text: String, color: Color) -> Self {
        Self {
            text,
            color: Some(color),
        }
    }
}
