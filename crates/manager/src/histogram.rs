//! Rating distribution over fixed-width bins.
//!
//! Bins are 0.5 wide and cover [1, 10]; the last bin is closed so a rating of
//! exactly 10 is counted. Ratings outside the range are tallied separately.

/// Lower edge of the first bin
pub const HISTOGRAM_MIN: f64 = 1.0;
/// Upper edge of the last bin
pub const HISTOGRAM_MAX: f64 = 10.0;
pub const BIN_WIDTH: f64 = 0.5;

/// One histogram bin, `[lower, upper)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RatingHistogram {
    bins: Vec<Bin>,
    out_of_range: usize,
}

impl RatingHistogram {
    pub fn from_ratings(ratings: &[f64]) -> Self {
        let bin_count = ((HISTOGRAM_MAX - HISTOGRAM_MIN) / BIN_WIDTH).round() as usize;
        let mut bins: Vec<Bin> = (0..bin_count)
            .map(|i| Bin {
                lower: HISTOGRAM_MIN + i as f64 * BIN_WIDTH,
                upper: HISTOGRAM_MIN + (i + 1) as f64 * BIN_WIDTH,
                count: 0,
            })
            .collect();

        let mut out_of_range = 0;
        for &rating in ratings {
            // Also catches NaN
            if !(HISTOGRAM_MIN..=HISTOGRAM_MAX).contains(&rating) {
                out_of_range += 1;
                continue;
            }
            let index = (((rating - HISTOGRAM_MIN) / BIN_WIDTH) as usize).min(bin_count - 1);
            bins[index].count += 1;
        }

        Self { bins, out_of_range }
    }

    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    /// Ratings that fell outside [1, 10]
    pub fn out_of_range(&self) -> usize {
        self.out_of_range
    }

    /// Number of binned ratings
    pub fn total(&self) -> usize {
        self.bins.iter().map(|bin| bin.count).sum()
    }

    /// Text bar chart, one line per bin, bars scaled to at most `width` marks
    pub fn render(&self, width: usize) -> String {
        let peak = self.bins.iter().map(|bin| bin.count).max().unwrap_or(0);
        let mut out = String::from("Distribution of Movie Ratings\n");

        for bin in &self.bins {
            let bar = if peak == 0 {
                0
            } else {
                (bin.count * width).div_ceil(peak)
            };
            out.push_str(&format!(
                "{:>4.1} - {:<4.1} | {:<width$} {}\n",
                bin.lower,
                bin.upper,
                "#".repeat(bar),
                bin.count,
                width = width
            ));
        }
        if self.out_of_range > 0 {
            out.push_str(&format!("outside 1-10: {}\n", self.out_of_range));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_layout() {
        let histogram = RatingHistogram::from_ratings(&[]);
        assert_eq!(histogram.bins().len(), 18);
        assert_eq!(histogram.bins()[0].lower, 1.0);
        assert_eq!(histogram.bins()[17].upper, 10.0);
        assert_eq!(histogram.total(), 0);
    }

    #[test]
    fn test_binning() {
        let histogram = RatingHistogram::from_ratings(&[1.0, 1.4, 1.5, 9.9, 10.0, 0.5, 11.0]);

        assert_eq!(histogram.bins()[0].count, 2);
        assert_eq!(histogram.bins()[1].count, 1);
        assert_eq!(histogram.bins()[17].count, 2);
        assert_eq!(histogram.out_of_range(), 2);
        assert_eq!(histogram.total(), 5);
    }

    #[test]
    fn test_render_scales_to_width() {
        let histogram = RatingHistogram::from_ratings(&[8.0, 8.1, 8.2, 8.3, 3.0]);
        let text = histogram.render(8);

        assert!(text.starts_with("Distribution of Movie Ratings"));
        assert!(text.contains("########"));
        assert!(!text.contains("#########"));
        assert_eq!(text.lines().count(), 19);
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_render_reports_out_of_range() {
        let text = RatingHistogram::from_ratings(&[0.5, 5.0]).render(4);

        assert_eq!(text.lines().count(), 20);
        let bin = text.lines().find(|line| line.starts_with(" 5.0 - 5.5")).unwrap();
        assert!(bin.contains("| #### 1"));
        assert_eq!(text.lines().last(), Some("outside 1-10: 1"));
    }
}
