//! Glyph widths of the standard Helvetica faces.
//!
//! Widths are in thousandths of the font size, for printable ASCII
//! (0x20..=0x7E). Other characters use the width of a digit.

/// Font face used by the invoice template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Regular,
    Bold,
}

impl Face {
    /// Resource name of the face in the page's font dictionary.
    pub fn resource(self) -> &'static str {
        match self {
            Face::Regular => "F1",
            Face::Bold => "F2",
        }
    }

    /// PostScript name of the base-14 font.
    pub fn base_font(self) -> &'static str {
        match self {
            Face::Regular => "Helvetica",
            Face::Bold => "Helvetica-Bold",
        }
    }

    fn widths(self) -> &'static [u16; 95] {
        match self {
            Face::Regular => &HELVETICA,
            Face::Bold => &HELVETICA_BOLD,
        }
    }
}

const DEFAULT_WIDTH: u16 = 556;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Width of `text` in points when set in `face` at `size`.
pub fn text_width(text: &str, face: Face, size: f32) -> f32 {
    let widths = face.widths();
    let units: u32 = text
        .chars()
        .map(|c| {
            let code = c as u32;
            if (0x20..=0x7E).contains(&code) {
                u32::from(widths[(code - 0x20) as usize])
            } else {
                u32::from(DEFAULT_WIDTH)
            }
        })
        .sum();

    units as f32 * size / 1000.0
}

/// Truncate `text` so that it fits in `max_width`, marking the cut with `...`.
pub fn fit_text(text: &str, face: Face, size: f32, max_width: f32) -> String {
    if text_width(text, face, size) <= max_width {
        return text.to_string();
    }

    let ellipsis_width = text_width("...", face, size);
    let mut fitted = String::new();
    for c in text.chars() {
        let mut candidate = fitted.clone();
        candidate.push(c);
        if text_width(&candidate, face, size) + ellipsis_width > max_width {
            break;
        }
        fitted = candidate;
    }
    fitted.push_str("...");
    fitted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width() {
        assert_eq!(text_width("", Face::Regular, 10.0), 0.0);
        assert!((text_width("0", Face::Regular, 10.0) - 5.56).abs() < 1e-4);
        assert!(text_width("Wide", Face::Bold, 10.0) > text_width("Wide", Face::Regular, 10.0));
    }

    #[test]
    fn test_fit_text() {
        assert_eq!(fit_text("short", Face::Regular, 10.0, 200.0), "short");

        let fitted = fit_text(&"x".repeat(200), Face::Regular, 10.0, 100.0);
        assert!(fitted.ends_with("..."));
        assert!(text_width(&fitted, Face::Regular, 10.0) <= 100.0);
    }
}
