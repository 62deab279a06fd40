//! Inspect report types and terminal formatting.

use std::fmt;

/// The result of inspecting a manifest.
#[derive(Clone, Debug)]
pub struct InspectReport {
    /// Summary counts for the manifest.
    pub summary: SummarySection,
    /// Label distribution histogram.
    pub labels: LabelsSection,
    /// Box statistics.
    pub boxes: BoxStats,
    /// Display options for formatting.
    pub(crate) bar_width: usize,
}

/// Summary counts for the manifest.
#[derive(Clone, Debug, Default)]
pub struct SummarySection {
    /// Task kind name.
    pub task: String,
    /// Number of entries in the class table.
    pub classes: usize,
    /// Total number of samples.
    pub samples: usize,
    /// Annotated objects over all samples (one per image for whole-image tasks).
    pub objects: usize,
    /// Number of samples that have at least one object.
    pub annotated_samples: usize,
}

/// Label distribution section.
#[derive(Clone, Debug)]
pub struct LabelsSection {
    /// How many top labels to show.
    pub top_n: usize,
    /// Total distinct labels referenced by samples.
    pub total_distinct: usize,
    /// Total label references counted.
    pub total_labels: usize,
    /// Top label entries (sorted by count descending).
    pub entries: Vec<LabelCount>,
    /// Sum of counts for labels not in the top N.
    pub other_count: usize,
}

/// A single label with its reference count.
#[derive(Clone, Debug)]
pub struct LabelCount {
    /// The class name, or a placeholder for ids missing from the class table.
    pub label: String,
    pub count: usize,
}

/// Box statistics.
#[derive(Clone, Debug, Default)]
pub struct BoxStats {
    /// Total boxes analyzed.
    pub total: usize,
    /// Boxes with finite (non-NaN, non-Inf) coordinates.
    pub finite: usize,
    /// Boxes with properly ordered corners (or non-negative side lengths).
    pub ordered: usize,
    /// Boxes with zero or negative area.
    pub degenerate_area: usize,
    /// Minimum box width (pixels), if any valid boxes exist.
    pub min_width: Option<f64>,
    /// Maximum box width (pixels).
    pub max_width: Option<f64>,
    /// Minimum box height (pixels).
    pub min_height: Option<f64>,
    /// Maximum box height (pixels).
    pub max_height: Option<f64>,
}

impl fmt::Display for InspectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "╭─────────────────────────────────────────────────────────────╮")?;
        writeln!(f, "│              📊  Manifest Inspection Report                 │")?;
        writeln!(f, "╰─────────────────────────────────────────────────────────────╯")?;
        writeln!(f)?;

        self.fmt_summary(f)?;
        writeln!(f)?;

        self.fmt_labels(f)?;

        // Whole-image tasks have no boxes to report on
        if self.boxes.total > 0 {
            writeln!(f)?;
            self.fmt_boxes(f)?;
        }

        Ok(())
    }
}

impl InspectReport {
    fn fmt_summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.summary;

        writeln!(f, "┌─ Summary ─────────────────────────────────────────────────┐")?;
        writeln!(f, "│                                                           │")?;
        writeln!(f, "│   Task:          {:<41}│", s.task)?;
        writeln!(
            f,
            "│   Classes:       {:>8}                                 │",
            format_number(s.classes)
        )?;
        writeln!(
            f,
            "│   Samples:       {:>8}                                 │",
            format_number(s.samples)
        )?;
        writeln!(
            f,
            "│   Objects:       {:>8}                                 │",
            format_number(s.objects)
        )?;
        writeln!(f, "│                                                           │")?;

        let annotated = format!(
            "{} of {} ({})",
            format_number(s.annotated_samples),
            format_number(s.samples),
            fmt_percent(s.annotated_samples, s.samples)
        );
        writeln!(f, "│   Annotated:     {:<41}│", annotated)?;
        writeln!(f, "│                                                           │")?;
        writeln!(f, "└───────────────────────────────────────────────────────────┘")?;

        Ok(())
    }

    fn fmt_labels(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let l = &self.labels;

        let header = if l.total_distinct > l.top_n {
            format!("Labels (top {} of {})", l.top_n, l.total_distinct)
        } else {
            format!("Labels ({})", l.total_distinct)
        };

        writeln!(f, "┌─ {} {}┐", header, "─".repeat(57usize.saturating_sub(header.len())))?;
        writeln!(f, "│                                                           │")?;

        if l.entries.is_empty() {
            writeln!(f, "│   No labels found.                                        │")?;
        } else {
            let max_count = l.entries.iter().map(|e| e.count).max().unwrap_or(1);

            for entry in &l.entries {
                writeln!(
                    f,
                    "│   {:<16} {:>7} {:>6}  {}│",
                    truncate_label(&entry.label, 16),
                    format_number(entry.count),
                    fmt_percent(entry.count, l.total_labels),
                    pad_bar(&render_bar(entry.count, max_count, self.bar_width), self.bar_width)
                )?;
            }

            if l.other_count > 0 {
                writeln!(
                    f,
                    "│   {:<16} {:>7} {:>6}  {}│",
                    "(other)",
                    format_number(l.other_count),
                    fmt_percent(l.other_count, l.total_labels),
                    pad_bar(&render_bar(l.other_count, max_count, self.bar_width), self.bar_width)
                )?;
            }
        }

        writeln!(f, "│                                                           │")?;
        writeln!(f, "└───────────────────────────────────────────────────────────┘")?;

        Ok(())
    }

    fn fmt_boxes(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.boxes;

        writeln!(f, "┌─ Bounding Boxes ──────────────────────────────────────────┐")?;
        writeln!(f, "│                                                           │")?;

        if let (Some(min_w), Some(max_w), Some(min_h), Some(max_h)) =
            (b.min_width, b.max_width, b.min_height, b.max_height)
        {
            writeln!(
                f,
                "│   Width  (px):    min {:>8.1}    max {:>8.1}            │",
                min_w, max_w
            )?;
            writeln!(
                f,
                "│   Height (px):    min {:>8.1}    max {:>8.1}            │",
                min_h, max_h
            )?;
        } else {
            writeln!(f, "│   Width/Height:   No valid boxes to measure               │")?;
        }

        writeln!(f, "│                                                           │")?;
        writeln!(f, "│   Quality metrics:                                        │")?;
        writeln!(
            f,
            "│     ✓ Finite coords:     {:>7} / {:>7}  ({:>6})     │",
            format_number(b.finite),
            format_number(b.total),
            fmt_percent(b.finite, b.total)
        )?;
        writeln!(
            f,
            "│     ✓ Properly ordered:  {:>7} / {:>7}  ({:>6})     │",
            format_number(b.ordered),
            format_number(b.total),
            fmt_percent(b.ordered, b.total)
        )?;
        writeln!(f, "│                                                           │")?;

        if b.degenerate_area > 0 || b.finite < b.total {
            writeln!(f, "│   Issues found:                                           │")?;

            if b.degenerate_area > 0 {
                writeln!(
                    f,
                    "│     ⚠ Degenerate area:   {:>7} / {:>7}  ({:>6})     │",
                    format_number(b.degenerate_area),
                    format_number(b.total),
                    fmt_percent(b.degenerate_area, b.total)
                )?;
            }

            if b.finite < b.total {
                let non_finite = b.total - b.finite;
                writeln!(
                    f,
                    "│     ✗ Non-finite coords: {:>7} / {:>7}  ({:>6})     │",
                    format_number(non_finite),
                    format_number(b.total),
                    fmt_percent(non_finite, b.total)
                )?;
            }
        } else {
            writeln!(f, "│   ✓ No issues detected                                    │")?;
        }

        writeln!(f, "│                                                           │")?;
        writeln!(f, "└───────────────────────────────────────────────────────────┘")?;

        Ok(())
    }
}

/// Format a number with thousands separators.
fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Format a percentage, handling zero denominators.
fn fmt_percent(numerator: usize, denominator: usize) -> String {
    if denominator == 0 {
        "n/a".to_string()
    } else {
        format!("{:.1}%", (numerator as f64 / denominator as f64) * 100.0)
    }
}

/// Render a horizontal bar using Unicode block characters.
fn render_bar(count: usize, max_count: usize, width: usize) -> String {
    if max_count == 0 || width == 0 {
        return String::new();
    }

    let filled = (count * width) / max_count;
    let filled = filled.min(width); // Clamp to width

    // Use Unicode blocks for a nicer look
    "█".repeat(filled) + &"░".repeat(width - filled)
}

/// Pad a bar string to ensure consistent column alignment.
fn pad_bar(bar: &str, width: usize) -> String {
    // Each Unicode char is 1 char, but we want consistent visual width
    let visual_len = bar.chars().count();
    let padding = (width + 2).saturating_sub(visual_len);
    format!("{}{}", bar, " ".repeat(padding))
}

/// Truncate a label to fit in the display column.
fn truncate_label(label: &str, max_len: usize) -> String {
    if label.chars().count() <= max_len {
        label.to_string()
    } else {
        let head: String = label.chars().take(max_len.saturating_sub(1)).collect();
        format!("{}…", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(123), "123");
        assert_eq!(format_number(1234), "1,234");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_fmt_percent() {
        assert_eq!(fmt_percent(0, 0), "n/a");
        assert_eq!(fmt_percent(1, 2), "50.0%");
        assert_eq!(fmt_percent(1, 3), "33.3%");
    }

    #[test]
    fn test_render_bar() {
        assert_eq!(render_bar(5, 10, 10), "█████░░░░░");
        assert_eq!(render_bar(10, 10, 10), "██████████");
        assert_eq!(render_bar(0, 10, 10), "░░░░░░░░░░");
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("short", 10), "short");
        assert_eq!(truncate_label("verylonglabel", 10), "verylongl…");
        assert_eq!(truncate_label("größenordnung", 5), "größ…");
    }
}
