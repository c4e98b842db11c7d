//! Chart sinks: the segment donut and the top-zones bar chart.

use crate::leaderboard::ZoneStats;
use crate::nps::{Segment, SegmentCounts};
use std::fmt::{self, Write};

/// One slice of the segment donut.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSlice {
    pub label: &'static str,
    pub count: u64,
    pub color: &'static str,
}

/// Three slices, detractors first.
pub fn segment_slices(counts: &SegmentCounts) -> Vec<ChartSlice> {
    Segment::ALL
        .iter()
        .map(|&s| ChartSlice {
            label: s.label(),
            count: counts.get(s),
            color: s.color(),
        })
        .collect()
}

/// (zone, reclassified score) pairs for the bar chart.
pub fn zone_bars(zones: &[ZoneStats]) -> Vec<(String, f64)> {
    zones
        .iter()
        .map(|z| (z.zone.clone(), z.nps_reclassified_percent))
        .collect()
}

/// Anything that can draw the two charts.
pub trait ChartSink {
    type Output;

    fn donut(&mut self, title: &str, slices: &[ChartSlice]) -> Self::Output;
    fn bar(&mut self, title: &str, bars: &[(String, f64)]) -> Self::Output;
}

/// Renders charts as plain text for the terminal.
#[derive(Debug, Clone)]
pub struct TextChart {
    /// Characters used by the longest bar.
    pub width: usize,
}

impl Default for TextChart {
    fn default() -> Self {
        Self { width: 40 }
    }
}

impl TextChart {
    fn bar_len(&self, value: f64, max: f64) -> usize {
        if max <= 0.0 || value <= 0.0 {
            return 0;
        }
        ((value / max) * self.width as f64).round() as usize
    }
}

impl ChartSink for TextChart {
    type Output = Result<String, fmt::Error>;

    fn donut(&mut self, title: &str, slices: &[ChartSlice]) -> Self::Output {
        let total: u64 = slices.iter().map(|s| s.count).sum();
        let label_width = slices.iter().map(|s| s.label.len()).max().unwrap_or(0);
        let mut out = String::new();

        writeln!(out, "{}", title)?;
        for slice in slices {
            let share = if total == 0 {
                0.0
            } else {
                slice.count as f64 / total as f64 * 100.0
            };
            let len = self.bar_len(slice.count as f64, total as f64);
            writeln!(
                out,
                "{:<lw$} {:>6} {:>6.1}% {}",
                slice.label,
                slice.count,
                share,
                "#".repeat(len),
                lw = label_width
            )?;
        }
        Ok(out)
    }

    fn bar(&mut self, title: &str, bars: &[(String, f64)]) -> Self::Output {
        let max = bars.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
        let label_width = bars.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
        let mut out = String::new();

        writeln!(out, "{}", title)?;
        for (label, value) in bars {
            writeln!(
                out,
                "{:<lw$} {:>8.2}% {}",
                label,
                value,
                "#".repeat(self.bar_len(*value, max)),
                lw = label_width
            )?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_slices() {
        let counts = SegmentCounts::from_scores([1.0, 9.0, 10.0]);
        let slices = segment_slices(&counts);
        assert_eq!(slices.len(), 3);
        assert_eq!(slices[0].label, "Detrattori (0-6)");
        assert_eq!(slices[0].count, 1);
        assert_eq!(slices[2].count, 2);
        assert_eq!(slices[2].color, "#00D4AA");
    }

    #[test]
    fn test_text_donut() {
        let counts = SegmentCounts::from_scores([1.0, 9.0, 10.0, 7.0]);
        let mut chart = TextChart { width: 4 };
        let out = chart
            .donut("Distribuzione NPS", &segment_slices(&counts))
            .unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Distribuzione NPS");
        assert!(lines[3].starts_with("Promotori (9-10)"));
        assert!(lines[3].contains("50.0%"));
        assert!(lines[3].ends_with("##"));
    }

    #[test]
    fn test_text_bar_negative_values_have_no_bar() {
        let mut chart = TextChart { width: 10 };
        let out = chart
            .bar(
                "Top",
                &[("Sud".to_string(), 105.0), ("Nord".to_string(), -100.0)],
            )
            .unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[1].ends_with(&"#".repeat(10)));
        assert!(lines[2].trim_end().ends_with('%'));
    }
}
