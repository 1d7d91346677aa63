//! Terminal chart of a predicted monthly defect curve.
//!
//! Months run along the x-axis and defects up the y-axis, which always starts
//! at zero so the hump keeps its true proportions. Each month's value is an
//! `o`; consecutive months are joined with `-`. Output is deterministic for a
//! given result and grid size.

use crate::domain::PredictionResult;

/// Render the predicted monthly curve.
pub fn render_monthly_plot(result: &PredictionResult, width: usize, height: usize) -> String {
    let points: Vec<(f64, f64)> = result
        .months
        .iter()
        .zip(result.monthly_distribution.iter())
        .map(|(&m, &v)| (m as f64, v))
        .collect();

    let frame = Frame::new(&points, width.max(10), height.max(5));
    let mut grid = vec![vec![' '; frame.width]; frame.height];

    // Joins go down first; month markers overwrite them.
    trace_curve(&mut grid, &frame, &points);
    for &(month, defects) in &points {
        let (col, row) = frame.cell(month, defects);
        grid[row][col] = 'o';
    }

    let mut out = format!(
        "Plot: months=[{}, {}] | defects=[{:.2}, {:.2}]\n",
        result.months.first().copied().unwrap_or(0),
        result.months.last().copied().unwrap_or(0),
        0.0,
        frame.defects_max,
    );
    for row in grid {
        out.extend(row);
        out.push('\n');
    }
    out
}

/// Grid geometry: month span on x, `0..=defects_max` on y.
struct Frame {
    month_min: f64,
    month_max: f64,
    defects_max: f64,
    width: usize,
    height: usize,
}

impl Frame {
    fn new(points: &[(f64, f64)], width: usize, height: usize) -> Self {
        let (month_min, month_max) = month_range(points);
        let peak = points.iter().map(|&(_, d)| d).fold(0.0_f64, f64::max);
        // 5% headroom above the peak; an all-zero curve gets a unit axis.
        let defects_max = if peak > 0.0 {
            peak + (peak * 0.05).max(1e-12)
        } else {
            1.0
        };
        Self {
            month_min,
            month_max,
            defects_max,
            width,
            height,
        }
    }

    /// Column and row of a point; row 0 is the top of the chart.
    fn cell(&self, month: f64, defects: f64) -> (usize, usize) {
        let across = ((month - self.month_min) / (self.month_max - self.month_min)).clamp(0.0, 1.0);
        let up = (defects / self.defects_max).clamp(0.0, 1.0);
        let last_col = self.width as f64 - 1.0;
        let last_row = self.height as f64 - 1.0;
        let col = (across * last_col).round() as usize;
        let row = (last_row - up * last_row).round() as usize;
        (col, row)
    }
}

/// A single month is centred by widening the range by one month each side.
fn month_range(points: &[(f64, f64)]) -> (f64, f64) {
    let mut min_m = f64::INFINITY;
    let mut max_m = f64::NEG_INFINITY;
    for &(m, _) in points {
        min_m = min_m.min(m);
        max_m = max_m.max(m);
    }
    if !(min_m.is_finite() && max_m.is_finite()) {
        return (0.0, 1.0);
    }
    if max_m > min_m {
        (min_m, max_m)
    } else {
        (min_m - 1.0, max_m + 1.0)
    }
}

fn trace_curve(grid: &mut [Vec<char>], frame: &Frame, points: &[(f64, f64)]) {
    let cells: Vec<(usize, usize)> = points.iter().map(|&(m, d)| frame.cell(m, d)).collect();
    for pair in cells.windows(2) {
        join_cells(grid, pair[0], pair[1]);
    }
}

/// Bresenham walk from `from` to `to`, marking blank cells with `-`.
fn join_cells(grid: &mut [Vec<char>], from: (usize, usize), to: (usize, usize)) {
    let (mut col, mut row) = (from.0 as isize, from.1 as isize);
    let (end_col, end_row) = (to.0 as isize, to.1 as isize);

    let d_col = (end_col - col).abs();
    let step_col = if col < end_col { 1 } else { -1 };
    let d_row = -(end_row - row).abs();
    let step_row = if row < end_row { 1 } else { -1 };
    let mut err = d_col + d_row;

    loop {
        if let Some(cell) = grid
            .get_mut(row as usize)
            .and_then(|r| r.get_mut(col as usize))
            .filter(|c| **c == ' ')
        {
            *cell = '-';
        }

        if col == end_col && row == end_row {
            break;
        }
        let e2 = 2 * err;
        if e2 >= d_row {
            err += d_row;
            col += step_col;
        }
        if e2 <= d_col {
            err += d_col;
            row += step_row;
        }
    }
}
