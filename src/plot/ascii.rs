//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - a quick look at the price development in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - forecast points: `o`
//! - development line between quarters: `-`

use crate::domain::{FORECAST_LEN, ForecastSeries};

/// Render the price development of a forecast series.
///
/// Quarters are evenly spaced on the x-axis, first quarter at the left edge.
pub fn render_series_plot(series: &ForecastSeries, width: usize, height: usize) -> String {
    let frame = Frame::new(series, width.max(10), height.max(5));
    let cells: Vec<(usize, usize)> = series
        .iter()
        .enumerate()
        .map(|(i, p)| frame.cell(i, p.price))
        .collect();

    let mut grid = vec![vec![' '; frame.width]; frame.height];

    // Segments first so points can overlay.
    for pair in cells.windows(2) {
        draw_segment(&mut grid, pair[0], pair[1], '-');
    }
    for &(row, col) in &cells {
        grid[row][col] = 'o';
    }

    let points = series.points();
    let mut out = String::new();
    out.push_str(&format!(
        "Price development: {} .. {} | price=[{:.2}, {:.2}] €/m²\n",
        points[0].quarter,
        points[FORECAST_LEN - 1].quarter,
        frame.y_min,
        frame.y_max,
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

/// Grid size plus the padded price range shown on the y-axis.
struct Frame {
    width: usize,
    height: usize,
    y_min: f64,
    y_max: f64,
}

impl Frame {
    fn new(series: &ForecastSeries, width: usize, height: usize) -> Self {
        let prices = series.prices();
        let low = prices.iter().copied().fold(f64::INFINITY, f64::min);
        let high = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        // A flat series gets one unit either side of its level.
        let (low, high) = if high > low { (low, high) } else { (low - 1.0, low + 1.0) };
        let pad = ((high - low) * 0.05).max(1e-12);

        Self {
            width,
            height,
            y_min: low - pad,
            y_max: high + pad,
        }
    }

    /// `(row, col)` of quarter `index` at `price`. Row 0 is the top (highest price).
    fn cell(&self, index: usize, price: f64) -> (usize, usize) {
        let x = index as f64 / (FORECAST_LEN - 1) as f64;
        let col = (x * (self.width - 1) as f64).round() as usize;

        let y = ((price - self.y_min) / (self.y_max - self.y_min)).clamp(0.0, 1.0);
        let row = ((1.0 - y) * (self.height - 1) as f64).round() as usize;

        (row.min(self.height - 1), col.min(self.width - 1))
    }
}

/// Fill the cells strictly between two endpoints, one step per cell of the
/// longer axis.
fn draw_segment(grid: &mut [Vec<char>], from: (usize, usize), to: (usize, usize), ch: char) {
    let (r0, c0) = (from.0 as f64, from.1 as f64);
    let (r1, c1) = (to.0 as f64, to.1 as f64);
    let steps = from.0.abs_diff(to.0).max(from.1.abs_diff(to.1));

    for k in 1..steps {
        let t = k as f64 / steps as f64;
        let row = (r0 + t * (r1 - r0)).round() as usize;
        let col = (c0 + t * (c1 - c0)).round() as usize;
        if let Some(cell) = grid.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = ch;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_golden_snapshot_rising() {
        let series = ForecastSeries::from_prices([100.0, 100.0, 110.0, 110.0]).unwrap();
        let txt = render_series_plot(&series, 10, 5);
        let expected = concat!(
            "Price development: Q3 2021 .. Q2 2022 | price=[99.50, 110.50] €/m²\n",
            "      o--o\n",
            "     -    \n",
            "     -    \n",
            "    -     \n",
            "o--o      \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn flat_series_stays_on_one_row() {
        let series = ForecastSeries::from_prices([5.0; 4]).unwrap();
        let txt = render_series_plot(&series, 10, 5);
        let rows: Vec<&str> = txt.lines().skip(1).collect();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows.iter().filter(|r| r.contains('o')).count(), 1);
        assert_eq!(rows[2], "o--o--o--o");
    }

    #[test]
    fn falling_series_mirrors_rising_one() {
        let series = ForecastSeries::from_prices([110.0, 110.0, 100.0, 100.0]).unwrap();
        let txt = render_series_plot(&series, 10, 5);
        let rows: Vec<&str> = txt.lines().skip(1).collect();
        assert_eq!(rows[0], "o--o      ");
        assert_eq!(rows[4], "      o--o");
        assert_eq!(rows.iter().map(|r| r.matches('o').count()).sum::<usize>(), 4);
    }
}
