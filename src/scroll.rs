use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Gap inserted between the end of the text and its wrapped-around start.
const SEPARATOR: &str = "   •   ";

/// Marquee state for the song line. Static while the text fits the
/// available columns, Scrolling once it overflows: a fixed-width window
/// slides over a padded copy of the text, wrapping seamlessly.
pub struct TextScroller {
    text: String,
    padded: Vec<char>,
    offset: usize,
    width: usize,
    scrolling: bool,
}

impl TextScroller {
    pub fn new(width: usize) -> Self {
        Self {
            text: String::new(),
            padded: Vec::new(),
            offset: 0,
            width,
            scrolling: false,
        }
    }

    /// Replace the displayed text. A genuinely new text resets the scroll
    /// offset; setting the same text again keeps the current position so
    /// per-tick refreshes of an unchanged track don't stutter the marquee.
    pub fn set_text(&mut self, text: &str) {
        if text == self.text {
            return;
        }
        self.text = text.to_string();
        self.offset = 0;
        self.apply_width();
    }

    /// Adjust to a new terminal width. Keeps the offset when still
    /// scrolling so a resize doesn't restart the marquee.
    pub fn resize(&mut self, width: usize) {
        if width == self.width {
            return;
        }
        self.width = width;
        self.apply_width();
    }

    fn apply_width(&mut self) {
        self.scrolling = UnicodeWidthStr::width(self.text.as_str()) > self.width;
        if self.scrolling {
            self.padded = self.text.chars().chain(SEPARATOR.chars()).collect();
            self.offset %= self.padded.len();
        } else {
            self.padded.clear();
            self.offset = 0;
        }
    }

    /// Advance the window by one character, wrapping at the padded length.
    /// No-op in Static state.
    pub fn tick(&mut self) {
        if self.scrolling && !self.padded.is_empty() {
            self.offset = (self.offset + 1) % self.padded.len();
        }
    }

    pub fn reset(&mut self) {
        self.offset = 0;
    }

    /// The currently visible line: the full text when static, otherwise a
    /// window of at most `width` display columns starting at the offset.
    pub fn line(&self) -> String {
        if !self.scrolling {
            return self.text.clone();
        }
        let n = self.padded.len();
        let mut out = String::new();
        let mut cols = 0usize;
        let mut i = self.offset % n;
        // Iteration cap guards against pathological zero-width input.
        for _ in 0..(n + self.width) {
            let ch = self.padded[i];
            let cw = UnicodeWidthChar::width(ch).unwrap_or(0);
            if cols + cw > self.width {
                break;
            }
            out.push(ch);
            cols += cw;
            if cols >= self.width {
                break;
            }
            i = (i + 1) % n;
        }
        out
    }

    pub fn is_scrolling(&self) -> bool {
        self.scrolling
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}
