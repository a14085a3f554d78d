//! Fixed-size character bar charts.

use thiserror::Error;

/// Glyph used for filled bar cells.
pub const BLOCK: char = '█';

/// Inputs a bar chart cannot be drawn from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChartError {
    #[error("no values to chart")]
    NoValues,
    #[error("{labels} labels for {values} values")]
    LabelCountMismatch { values: usize, labels: usize },
    #[error("{bars} bars do not fit in {width} columns")]
    TooNarrow { width: usize, bars: usize },
}

/// Renders one column per value into a framed `width` x `height` grid.
///
/// Values are normalized against `bounds` (a zero-width range counts as 1) and
/// drawn as whole rows, rounding down. A label strip sits under the bars. The
/// returned rows run top to bottom and are `width + 2` characters wide.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn render_bargraph(
    values: &[f64],
    labels: &[String],
    bounds: (f64, f64),
    width: usize,
    height: usize,
) -> Result<Vec<String>, ChartError> {
    if values.is_empty() {
        return Err(ChartError::NoValues);
    }
    if labels.len() != values.len() {
        return Err(ChartError::LabelCountMismatch {
            values: values.len(),
            labels: labels.len(),
        });
    }
    let bar_width = width / values.len();
    if bar_width == 0 {
        return Err(ChartError::TooNarrow {
            width,
            bars: values.len(),
        });
    }

    let (min, max) = bounds;
    let span = (max - min).max(1.0);
    let fill_width = bar_width.saturating_sub(1).max(1);

    // Bottom row first.
    let mut grid = vec![vec![' '; width]; height];
    for (bar, value) in values.iter().enumerate() {
        let scaled = ((value - min) / span * height as f64).floor();
        let bar_height = if scaled.is_finite() && scaled > 0.0 {
            (scaled as usize).min(height)
        } else {
            0
        };
        let left = bar * bar_width;
        for row in grid.iter_mut().take(bar_height) {
            for cell in &mut row[left..left + fill_width] {
                *cell = BLOCK;
            }
        }
    }

    let mut label_line: String = labels
        .iter()
        .map(|label| {
            let label: String = label.chars().take(bar_width).collect();
            format!("{label:<bar_width$}")
        })
        .collect();
    let used = label_line.chars().count();
    label_line.push_str(&" ".repeat(width.saturating_sub(used)));

    let rule = "-".repeat(width);
    let mut canvas = Vec::with_capacity(height + 4);
    canvas.push(format!("+{rule}+"));
    canvas.push(format!("|{label_line}|"));
    canvas.push(format!("|{rule}|"));
    for row in &grid {
        canvas.push(format!("|{}|", row.iter().collect::<String>()));
    }
    canvas.push(format!("+{rule}+"));

    canvas.reverse();
    Ok(canvas)
}
