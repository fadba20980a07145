//! Row fitting shared by both scene layouts.

use std::ops::Range;

use crate::types::Length;

/// Greedy first-fit row wrap.
///
/// Items are taken in order and appended to the current row while the row
/// total stays within `canvas_width`. On overflow the row is closed and the
/// item opens the next one; nothing is moved back into earlier rows. An item
/// wider than the canvas sits alone in its row.
pub fn pack_rows(widths: &[Length], canvas_width: Length) -> Vec<Range<usize>> {
    let mut rows = Vec::new();
    let mut start = 0;
    let mut row_width = Length::ZERO;
    for (i, &w) in widths.iter().enumerate() {
        if i > start && row_width + w > canvas_width {
            rows.push(start..i);
            start = i;
            row_width = Length::ZERO;
        }
        row_width += w;
    }
    if start < widths.len() {
        rows.push(start..widths.len());
    }
    rows
}

/// Scale `widths` proportionally so they add up to `target`.
///
/// A zero total leaves the widths unchanged.
pub fn redistribute(widths: &[Length], target: Length) -> Vec<Length> {
    let total: Length = widths.iter().copied().sum();
    match target.checked_div(total) {
        Some(factor) => widths.iter().map(|&w| w * factor).collect(),
        None => widths.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lengths(v: &[f64]) -> Vec<Length> {
        v.iter().copied().map(Length).collect()
    }

    #[test]
    fn first_fit_rows() {
        let rows = pack_rows(&lengths(&[100.0, 200.0, 150.0, 50.0, 300.0]), Length(300.0));
        assert_eq!(rows, vec![0..2, 2..4, 4..5]);
    }

    #[test]
    fn exact_fit_stays_on_the_row() {
        let rows = pack_rows(&lengths(&[150.0, 150.0, 1.0]), Length(300.0));
        assert_eq!(rows, vec![0..2, 2..3]);
    }

    #[test]
    fn oversize_item_gets_its_own_row() {
        let rows = pack_rows(&lengths(&[500.0, 100.0, 600.0]), Length(300.0));
        assert_eq!(rows, vec![0..1, 1..2, 2..3]);
        assert!(pack_rows(&[], Length(300.0)).is_empty());
    }

    #[test]
    fn redistribution_is_proportional() {
        let out = redistribute(&lengths(&[100.0, 200.0]), Length(450.0));
        assert_eq!(out, lengths(&[150.0, 300.0]));
    }

    #[test]
    fn redistributed_row_sums_to_target() {
        let widths = lengths(&[130.0, 245.5, 310.25]);
        let out = redistribute(&widths, Length(2000.0));
        let total: f64 = out.iter().map(|w| w.raw()).sum();
        assert!((total - 2000.0).abs() < 1e-9);
        let ratios: Vec<f64> = out.iter().zip(&widths).map(|(a, b)| a.raw() / b.raw()).collect();
        assert!(ratios.windows(2).all(|p| (p[0] - p[1]).abs() < 1e-12));
    }

    #[test]
    fn zero_total_is_left_alone() {
        let out = redistribute(&lengths(&[0.0, 0.0]), Length(100.0));
        assert_eq!(out, lengths(&[0.0, 0.0]));
    }
}
