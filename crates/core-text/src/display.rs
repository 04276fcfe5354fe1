//! Composes the strings the terminal actually sees.
//!
//! Storage, parsing, and the pipeline engine all hold logical-order text;
//! this module is the single place where lines become visual. The order of
//! operations matters: shaping runs first (Lam-Alef collapse changes the
//! length), the bidi engine resolves the shaped sequence, and rule L2
//! produces the final left-to-right cell order. Presentation forms carry
//! the same AL class as their base letters, so shaping never perturbs the
//! resolved levels.

use unicode_width::UnicodeWidthStr;

use crate::bidi::{BaseLevel, BidiEngine};
use crate::class::{bidi_class, BidiClass};
use crate::shape::shape;

/// Left-to-right mark: pins the terminal's own heuristics after an RTL tail.
const LRM: char = '\u{200E}';
/// Right-to-left mark: the mirror guard for LTR tails in RTL lines.
const RLM: char = '\u{200F}';

/// Formatter for prompts, output lines, and diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayFormatter {
    engine: BidiEngine,
}

impl DisplayFormatter {
    pub fn new() -> Self {
        DisplayFormatter {
            engine: BidiEngine::new(),
        }
    }

    /// Shape and reorder one logical line into its visual form, without
    /// alignment (files, captures, and the prompt frame use this).
    pub fn format_line(&self, text: &str, base: BaseLevel) -> String {
        self.format_line_aligned(text, base, None)
    }

    /// Like [`format_line`](Self::format_line), right-aligning RTL
    /// paragraphs when the terminal width is known. The console sinks pass
    /// the detected column count through here.
    pub fn format_line_aligned(&self, text: &str, base: BaseLevel, columns: Option<u16>) -> String {
        if text.is_empty() {
            return String::new();
        }
        let chars: Vec<char> = text.chars().collect();
        let shaped = shape(&chars);
        let para = self.engine.process(&shaped, base);
        let mut visual: String = para.visual_order().into_iter().map(|i| shaped[i]).collect();
        if para.base_level % 2 == 1 {
            if let Some(columns) = columns {
                let width = visual.width();
                let pad = (columns as usize).saturating_sub(width);
                if pad > 0 {
                    let mut padded = " ".repeat(pad);
                    padded.push_str(&visual);
                    visual = padded;
                }
            }
        }
        self.append_direction_guard(&mut visual, &shaped, para.base_level);
        visual
    }

    /// Compose the interactive prompt. The frame is kept LTR so the cursor
    /// lands after the marker regardless of terminal heuristics; the Arabic
    /// label inside still shapes and reorders.
    pub fn format_prompt(&self, dir_tail: &str, arabic: bool) -> String {
        let logical = if arabic {
            format!("\u{0639}\u{0631}\u{0628}\u{0634}:{dir_tail}> ")
        } else {
            format!("arbsh:{dir_tail}> ")
        };
        self.format_line(&logical, BaseLevel::Ltr)
    }

    /// LRM after a strong-RTL tail in an LTR line (and RLM for the mirror
    /// case) so trailing neutrals keep their place on the host terminal.
    fn append_direction_guard(&self, visual: &mut String, shaped: &[char], base_level: u8) {
        let last_strong = shaped
            .iter()
            .rev()
            .map(|&c| bidi_class(c))
            .find(|cls| cls.is_strong());
        match last_strong {
            Some(BidiClass::R | BidiClass::AL) if base_level % 2 == 0 => visual.push(LRM),
            Some(BidiClass::L) if base_level % 2 == 1 => visual.push(RLM),
            _ => {}
        }
    }
}
