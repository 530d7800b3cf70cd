use std::io::{IsTerminal, Write};
use std::time::Duration;

use crossterm::{
    cursor, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use tokio::sync::oneshot;
use tokio::time::Instant;


const BAR_WIDTH: usize = 30;
const TICK: Duration = Duration::from_millis(250);

/// Draws an elapsed-versus-nominal bar on stderr until `done_rx` fires, so
/// the drain of in-flight requests past the deadline stays visible. Does
/// nothing when stderr is not a terminal.
pub(super) fn setup_progress_indicator(
    nominal: Duration,
    run_start: Instant,
    done_rx: oneshot::Receiver<()>,
    no_color: bool,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if !std::io::stderr().is_terminal() {
            return;
        }
        let rendered = tick_until_done(run_start, done_rx, |elapsed| {
            render_progress_line(nominal, elapsed, no_color)
        })
        .await;
        if rendered.is_ok() {
            drop(finish_progress_line());
        }
    })
}

/// Calls `render` every tick and once more when `done_rx` resolves, always
/// with the real elapsed time.
async fn tick_until_done<F>(
    run_start: Instant,
    mut done_rx: oneshot::Receiver<()>,
    mut render: F,
) -> Result<(), std::io::Error>
where
    F: FnMut(Duration) -> Result<(), std::io::Error>,
{
    let mut ticker = tokio::time::interval(TICK);
    loop {
        tokio::select! {
            _ = &mut done_rx => {
                return render(run_start.elapsed());
            }
            _ = ticker.tick() => {
                render(run_start.elapsed())?;
            }
        }
    }
}

fn render_progress_line(
    nominal: Duration,
    elapsed: Duration,
    no_color: bool,
) -> Result<(), std::io::Error> {
    let mut out = std::io::stderr();
    queue!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine))?;
    for (text, color) in build_progress_line(nominal, elapsed) {
        match color {
            Some(color) if !no_color => {
                queue!(out, SetForegroundColor(color), Print(&text), ResetColor)?;
            }
            Some(_) | None => queue!(out, Print(&text))?,
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

/// Bar, percentage, and clock segments. Past the nominal duration the bar
/// stays full and the clock keeps running while in-flight requests drain.
fn build_progress_line(nominal: Duration, elapsed: Duration) -> Vec<(String, Option<Color>)> {
    let goal_ms = nominal.as_millis().max(1);
    let elapsed_ms = elapsed.as_millis();
    let shown_ms = elapsed_ms.min(goal_ms);

    let width = u128::from(u64::try_from(BAR_WIDTH).unwrap_or(u64::MAX));
    let filled = shown_ms
        .saturating_mul(width)
        .checked_div(goal_ms)
        .map_or(0, |value| usize::try_from(value).unwrap_or(BAR_WIDTH))
        .min(BAR_WIDTH);
    let bar = format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH.saturating_sub(filled))
    );

    let percent_x100 = shown_ms
        .saturating_mul(10_000)
        .checked_div(goal_ms)
        .unwrap_or(0);
    let percent = format!(
        " {}.{:02}%",
        percent_x100.checked_div(100).unwrap_or(0),
        percent_x100.checked_rem(100).unwrap_or(0)
    );

    let tenths = elapsed_ms.checked_div(100).unwrap_or(0);
    let mut clock = format!(
        " | {}.{}s / {}s",
        tenths.checked_div(10).unwrap_or(0),
        tenths.checked_rem(10).unwrap_or(0),
        nominal.as_secs_f64()
    );
    if elapsed_ms > goal_ms {
        clock.push_str(" (draining)");
    }

    vec![
        (bar, None),
        (percent, Some(Color::Cyan)),
        (clock, Some(Color::Yellow)),
    ]
}
