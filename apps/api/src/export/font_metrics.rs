//! Static font metrics used to lay out the export preview.
//!
//! Widths are in em units (relative to font size). ASCII comes from a
//! humanist sans table; CJK ideographs, kana, hangul and full-width forms are
//! square, 1em each. Anything else falls back to the average width.
//!
//! Table covers ASCII 0x20..=0x7E (95 printable characters). Index = (char as usize) - 32.

/// Character-width table for the preview font.
pub struct FontMetricTable {
    widths: [f32; 95],
    /// Fallback width for non-ASCII characters that are not full-width.
    pub average_char_width: f32,
    pub space_width: f32,
    pub wide_char_width: f32,
}

/// A wrap unit: words and single wide characters are placed whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit<'a> {
    Word(&'a str),
    Space,
}

/// True for characters rendered on a square em box (CJK and friends).
pub fn is_wide(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x115F       // Hangul Jamo
        | 0x2E80..=0x303F     // CJK radicals, punctuation
        | 0x3040..=0x33FF     // Kana, CJK compatibility
        | 0x3400..=0x4DBF     // CJK extension A
        | 0x4E00..=0x9FFF     // CJK unified ideographs
        | 0xAC00..=0xD7AF     // Hangul syllables
        | 0xF900..=0xFAFF     // CJK compatibility ideographs
        | 0xFE30..=0xFE4F     // CJK compatibility forms
        | 0xFF00..=0xFF60     // Full-width forms
        | 0xFFE0..=0xFFE6)
}

impl FontMetricTable {
    pub fn measure_char(&self, c: char) -> f32 {
        let code = c as usize;
        if (32..=126).contains(&code) {
            self.widths[code - 32]
        } else if is_wide(c) {
            self.wide_char_width
        } else {
            self.average_char_width
        }
    }

    /// Measures the rendered width of a string in em units.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars().map(|c| self.measure_char(c)).sum()
    }

    /// Greedy word-wrap at `max_width_em`.
    ///
    /// Latin words never split; a line may break before or after any wide
    /// character. A single unit wider than the line gets a line of its own.
    /// Runs of whitespace collapse to one space; blank input yields no lines.
    pub fn wrap(&self, text: &str, max_width_em: f32) -> Vec<String> {
        let mut lines = Vec::new();
        let mut line = String::new();
        let mut width = 0.0_f32;
        let mut pending_space = false;

        for unit in units(text) {
            let word = match unit {
                Unit::Space => {
                    pending_space = !line.is_empty();
                    continue;
                }
                Unit::Word(word) => word,
            };

            let word_w = self.measure_str(word);
            let mut space_w = if pending_space { self.space_width } else { 0.0 };
            if !line.is_empty() && width + space_w + word_w > max_width_em {
                lines.push(std::mem::take(&mut line));
                width = 0.0;
                space_w = 0.0;
            }
            if space_w > 0.0 {
                line.push(' ');
            }
            line.push_str(word);
            width += space_w + word_w;
            pending_space = false;
        }

        if !line.is_empty() {
            lines.push(line);
        }
        lines
    }
}

/// Splits text into whitespace, Latin words, and single wide characters.
fn units(text: &str) -> Vec<Unit<'_>> {
    let mut out = Vec::new();
    let mut word_start: Option<usize> = None;

    for (i, c) in text.char_indices() {
        if c.is_whitespace() || is_wide(c) {
            if let Some(start) = word_start.take() {
                out.push(Unit::Word(&text[start..i]));
            }
            if c.is_whitespace() {
                if out.last() != Some(&Unit::Space) {
                    out.push(Unit::Space);
                }
            } else {
                out.push(Unit::Word(&text[i..i + c.len_utf8()]));
            }
        } else if word_start.is_none() {
            word_start = Some(i);
        }
    }
    if let Some(start) = word_start {
        out.push(Unit::Word(&text[start..]));
    }
    out
}

/// Humanist sans-serif, the preview's body font.
pub static SANS_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.25, 0.30, 0.38, 0.56, 0.56, 0.89, 0.67, 0.22, 0.33, 0.33, 0.39, 0.59, 0.28, 0.33, 0.28, 0.31,
        // 0     1     2     3     4     5     6     7     8     9
        0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56,
        // :     ;     <     =     >     ?     @
        0.28, 0.28, 0.59, 0.59, 0.59, 0.50, 1.02,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        0.67, 0.61, 0.61, 0.67, 0.56, 0.50, 0.67, 0.67, 0.25, 0.39, 0.61, 0.53, 0.78,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        0.67, 0.72, 0.56, 0.72, 0.61, 0.50, 0.56, 0.67, 0.67, 0.89, 0.61, 0.61, 0.56,
        // [     \     ]     ^     _     `
        0.28, 0.31, 0.28, 0.47, 0.56, 0.34,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        0.56, 0.56, 0.50, 0.56, 0.56, 0.31, 0.56, 0.56, 0.22, 0.22, 0.53, 0.22, 0.83,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        0.56, 0.56, 0.56, 0.56, 0.33, 0.44, 0.39, 0.56, 0.50, 0.72, 0.50, 0.50, 0.44,
        // {     |     }     ~
        0.33, 0.26, 0.33, 0.59,
    ],
    average_char_width: 0.52,
    space_width: 0.25,
    wide_char_width: 1.0,
};
