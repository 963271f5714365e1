//! Text wrap metrics.
//!
//! The canvas never rasterizes glyphs itself — the host's text stack does —
//! but layout (wrapping, natural height, truncation) must be deterministic
//! here so hit-testing, auto-grow, and export bounds agree with what the
//! host displays. Widths use a fixed average-advance approximation.

/// Average glyph advance as a fraction of the font size.
const ADVANCE_RATIO: f32 = 0.6;
/// Line height as a fraction of the font size.
const LINE_HEIGHT_RATIO: f32 = 1.4;

pub fn char_advance(font_size: f32) -> f32 {
    font_size * ADVANCE_RATIO
}

pub fn line_height(font_size: f32) -> f32 {
    font_size * LINE_HEIGHT_RATIO
}

/// Approximate rendered width of a single line.
pub fn measure(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * char_advance(font_size)
}

/// Truncate `text` to fit `max_width`, appending an ellipsis when trimmed.
pub fn ellipsize(text: &str, max_width: f32, font_size: f32) -> String {
    if measure(text, font_size) <= max_width {
        return text.to_string();
    }
    let budget = (max_width / char_advance(font_size)) as usize;
    let keep = budget.saturating_sub(1);
    let truncated: String = text.chars().take(keep).collect();
    format!("{truncated}…")
}

/// Greedy word wrap honoring explicit newlines. Words longer than the
/// available width are broken mid-word rather than overflowing.
pub fn wrap(content: &str, max_width: f32, font_size: f32) -> Vec<String> {
    let advance = char_advance(font_size);
    let cols = ((max_width / advance) as usize).max(1);

    let mut lines = Vec::new();
    for paragraph in content.split('\n') {
        if paragraph.is_empty() {
            lines.push(String::new());
            continue;
        }
        let mut line = String::new();
        let mut line_len = 0usize;
        for word in paragraph.split(' ') {
            let word_len = word.chars().count();
            let needed = if line_len == 0 { word_len } else { word_len + 1 };
            if line_len + needed <= cols {
                if line_len > 0 {
                    line.push(' ');
                    line_len += 1;
                }
                line.push_str(word);
                line_len += word_len;
            } else if word_len > cols {
                // Flush, then hard-break the oversized word.
                if line_len > 0 {
                    lines.push(std::mem::take(&mut line));
                    line_len = 0;
                }
                let mut chunk = String::new();
                for ch in word.chars() {
                    if chunk.chars().count() == cols {
                        lines.push(std::mem::take(&mut chunk));
                    }
                    chunk.push(ch);
                }
                line = chunk;
                line_len = line.chars().count();
            } else {
                lines.push(std::mem::take(&mut line));
                line.push_str(word);
                line_len = word_len;
            }
        }
        lines.push(line);
    }
    lines
}

/// The natural height of wrapped content, used by the textbox auto-grow
/// rule (height grows to fit, never shrinks below this).
pub fn natural_height(content: &str, max_width: f32, font_size: f32) -> f32 {
    wrap(content, max_width, font_size).len() as f32 * line_height(font_size)
}
