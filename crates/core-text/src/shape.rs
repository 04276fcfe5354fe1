//! Arabic contextual shaping: presentation forms and Lam-Alef ligatures.
//!
//! Shaping runs in logical order, before visual reordering. Each Arabic
//! letter picks its isolated/initial/medial/final form from the joining
//! classes of its nearest non-transparent neighbors; Lam followed by an
//! Alef variant collapses into the corresponding ligature. Everything
//! outside the Arabic block: and anything already in the presentation
//! forms block: passes through untouched, which is what makes the
//! operation idempotent.

use crate::class::{joining_class, JoiningClass};

/// Contextual position of a letter inside a joined group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoiningState {
    Isolated,
    Initial,
    Medial,
    Final,
}

/// `(base, [isolated, final, initial, medial])` presentation forms from the
/// Arabic Presentation Forms-B block. `0` marks a form the letter does not
/// have (right-joining letters lack initial/medial forms).
const FORMS: &[(u32, [u32; 4])] = &[
    (0x0621, [0xFE80, 0, 0, 0]),
    (0x0622, [0xFE81, 0xFE82, 0, 0]),
    (0x0623, [0xFE83, 0xFE84, 0, 0]),
    (0x0624, [0xFE85, 0xFE86, 0, 0]),
    (0x0625, [0xFE87, 0xFE88, 0, 0]),
    (0x0626, [0xFE89, 0xFE8A, 0xFE8B, 0xFE8C]),
    (0x0627, [0xFE8D, 0xFE8E, 0, 0]),
    (0x0628, [0xFE8F, 0xFE90, 0xFE91, 0xFE92]),
    (0x0629, [0xFE93, 0xFE94, 0, 0]),
    (0x062A, [0xFE95, 0xFE96, 0xFE97, 0xFE98]),
    (0x062B, [0xFE99, 0xFE9A, 0xFE9B, 0xFE9C]),
    (0x062C, [0xFE9D, 0xFE9E, 0xFE9F, 0xFEA0]),
    (0x062D, [0xFEA1, 0xFEA2, 0xFEA3, 0xFEA4]),
    (0x062E, [0xFEA5, 0xFEA6, 0xFEA7, 0xFEA8]),
    (0x062F, [0xFEA9, 0xFEAA, 0, 0]),
    (0x0630, [0xFEAB, 0xFEAC, 0, 0]),
    (0x0631, [0xFEAD, 0xFEAE, 0, 0]),
    (0x0632, [0xFEAF, 0xFEB0, 0, 0]),
    (0x0633, [0xFEB1, 0xFEB2, 0xFEB3, 0xFEB4]),
    (0x0634, [0xFEB5, 0xFEB6, 0xFEB7, 0xFEB8]),
    (0x0635, [0xFEB9, 0xFEBA, 0xFEBB, 0xFEBC]),
    (0x0636, [0xFEBD, 0xFEBE, 0xFEBF, 0xFEC0]),
    (0x0637, [0xFEC1, 0xFEC2, 0xFEC3, 0xFEC4]),
    (0x0638, [0xFEC5, 0xFEC6, 0xFEC7, 0xFEC8]),
    (0x0639, [0xFEC9, 0xFECA, 0xFECB, 0xFECC]),
    (0x063A, [0xFECD, 0xFECE, 0xFECF, 0xFED0]),
    (0x0641, [0xFED1, 0xFED2, 0xFED3, 0xFED4]),
    (0x0642, [0xFED5, 0xFED6, 0xFED7, 0xFED8]),
    (0x0643, [0xFED9, 0xFEDA, 0xFEDB, 0xFEDC]),
    (0x0644, [0xFEDD, 0xFEDE, 0xFEDF, 0xFEE0]),
    (0x0645, [0xFEE1, 0xFEE2, 0xFEE3, 0xFEE4]),
    (0x0646, [0xFEE5, 0xFEE6, 0xFEE7, 0xFEE8]),
    (0x0647, [0xFEE9, 0xFEEA, 0xFEEB, 0xFEEC]),
    (0x0648, [0xFEED, 0xFEEE, 0, 0]),
    (0x0649, [0xFEEF, 0xFEF0, 0, 0]),
    (0x064A, [0xFEF1, 0xFEF2, 0xFEF3, 0xFEF4]),
];

const LAM: char = '\u{0644}';

/// `(alef, [isolated, final])` Lam-Alef ligatures. An initial Lam produces
/// the isolated ligature, a medial Lam the final one.
const LAM_ALEF: &[(u32, [u32; 2])] = &[
    (0x0622, [0xFEF5, 0xFEF6]),
    (0x0623, [0xFEF7, 0xFEF8]),
    (0x0625, [0xFEF9, 0xFEFA]),
    (0x0627, [0xFEFB, 0xFEFC]),
];

fn presentation_forms(c: char) -> Option<&'static [u32; 4]> {
    let cp = c as u32;
    FORMS
        .binary_search_by_key(&cp, |&(base, _)| base)
        .ok()
        .map(|idx| &FORMS[idx].1)
}

fn lam_alef_ligature(alef: char, lam_joins_previous: bool) -> Option<char> {
    let cp = alef as u32;
    let forms = LAM_ALEF
        .iter()
        .find(|&&(base, _)| base == cp)
        .map(|&(_, forms)| forms)?;
    let form = if lam_joins_previous { forms[1] } else { forms[0] };
    char::from_u32(form)
}

/// A letter joins toward the preceding character when it carries a form on
/// its right side and the neighbor connects on its left.
fn joins(prev: JoiningClass, next: JoiningClass) -> bool {
    let prev_connects = matches!(
        prev,
        JoiningClass::DualJoining | JoiningClass::LeftJoining | JoiningClass::JoinCausing
    );
    let next_connects = matches!(
        next,
        JoiningClass::DualJoining | JoiningClass::RightJoining | JoiningClass::JoinCausing
    );
    prev_connects && next_connects
}

fn state_for(joins_previous: bool, joins_next: bool) -> JoiningState {
    match (joins_previous, joins_next) {
        (false, false) => JoiningState::Isolated,
        (true, false) => JoiningState::Final,
        (false, true) => JoiningState::Initial,
        (true, true) => JoiningState::Medial,
    }
}

fn form_for(forms: &[u32; 4], state: JoiningState) -> u32 {
    let (primary, fallback) = match state {
        JoiningState::Isolated => (forms[0], forms[0]),
        JoiningState::Final => (forms[1], forms[0]),
        JoiningState::Initial => (forms[2], forms[0]),
        JoiningState::Medial => (forms[3], forms[1]),
    };
    if primary != 0 {
        primary
    } else if fallback != 0 {
        fallback
    } else {
        forms[0]
    }
}

/// Nearest non-transparent joining class before `i`, if any.
fn class_before(chars: &[char], i: usize) -> Option<JoiningClass> {
    chars[..i]
        .iter()
        .rev()
        .map(|&c| joining_class(c))
        .find(|&jc| jc != JoiningClass::Transparent)
}

/// Nearest non-transparent joining class after `i`, together with its index.
fn class_after(chars: &[char], i: usize) -> Option<(usize, JoiningClass)> {
    chars
        .iter()
        .enumerate()
        .skip(i + 1)
        .map(|(j, &c)| (j, joining_class(c)))
        .find(|&(_, jc)| jc != JoiningClass::Transparent)
}

/// Shape a logical code-point sequence. Output length can only shrink, and
/// only through Lam-Alef collapse.
pub fn shape(chars: &[char]) -> Vec<char> {
    let mut out = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let Some(forms) = presentation_forms(c) else {
            out.push(c);
            i += 1;
            continue;
        };

        let own = joining_class(c);
        let joins_previous = class_before(chars, i).is_some_and(|prev| joins(prev, own));

        // Lam-Alef: the Alef variant (and any marks between) folds into one
        // ligature code point.
        if c == LAM {
            if let Some((j, _)) = class_after(chars, i) {
                if let Some(ligature) = lam_alef_ligature(chars[j], joins_previous) {
                    out.push(ligature);
                    // Marks sitting between Lam and Alef stay attached.
                    out.extend_from_slice(&chars[i + 1..j]);
                    i = j + 1;
                    continue;
                }
            }
        }

        let joins_next = class_after(chars, i).is_some_and(|(_, next)| joins(own, next));
        let state = state_for(joins_previous, joins_next);
        let form = form_for(forms, state);
        out.push(char::from_u32(form).unwrap_or(c));
        i += 1;
    }
    out
}

/// Convenience wrapper over [`shape`] for string call sites.
pub fn shape_str(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    shape(&chars).into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_arabic_passes_through() {
        assert_eq!(shape_str("hello, world"), "hello, world");
        assert_eq!(shape_str("שלום 123"), "שלום 123");
        assert_eq!(shape_str(""), "");
    }

    #[test]
    fn isolated_letter() {
        // A lone beh takes its isolated form.
        assert_eq!(shape_str("\u{0628}"), "\u{FE8F}");
    }

    #[test]
    fn two_dual_joiners_take_initial_and_final() {
        // beh + beh: first initial, second final.
        assert_eq!(shape_str("\u{0628}\u{0628}"), "\u{FE91}\u{FE90}");
    }

    #[test]
    fn right_joiner_breaks_the_chain() {
        // beh + dal + beh: dal joins the beh before it but nothing after,
        // so the trailing beh is isolated again.
        assert_eq!(
            shape_str("\u{0628}\u{062F}\u{0628}"),
            "\u{FE91}\u{FEAA}\u{FE8F}"
        );
    }

    #[test]
    fn medial_form_in_the_middle() {
        // seen + meem + noon: meem is medial.
        assert_eq!(
            shape_str("\u{0633}\u{0645}\u{0646}"),
            "\u{FEB3}\u{FEE4}\u{FEE6}"
        );
    }

    #[test]
    fn transparent_marks_do_not_break_joining() {
        // beh + fatha + beh still joins across the mark.
        assert_eq!(
            shape_str("\u{0628}\u{064E}\u{0628}"),
            "\u{FE91}\u{064E}\u{FE90}"
        );
    }

    #[test]
    fn marhaba_shapes_fully() {
        // مرحبا: meem initial, reh final, hah initial, beh medial, alef final.
        assert_eq!(
            shape_str("\u{0645}\u{0631}\u{062D}\u{0628}\u{0627}"),
            "\u{FEE3}\u{FEAE}\u{FEA3}\u{FE92}\u{FE8E}"
        );
    }

    #[test]
    fn lam_alef_isolated_ligature() {
        // Lam + alef alone: isolated ligature, length shrinks by one.
        assert_eq!(shape_str("\u{0644}\u{0627}"), "\u{FEFB}");
    }

    #[test]
    fn lam_alef_final_ligature_after_joiner() {
        // seen + lam + alef: the lam joins the seen, so the ligature takes
        // its final form.
        assert_eq!(shape_str("\u{0633}\u{0644}\u{0627}"), "\u{FEB3}\u{FEFC}");
    }

    #[test]
    fn lam_alef_variants() {
        assert_eq!(shape_str("\u{0644}\u{0622}"), "\u{FEF5}");
        assert_eq!(shape_str("\u{0644}\u{0623}"), "\u{FEF7}");
        assert_eq!(shape_str("\u{0644}\u{0625}"), "\u{FEF9}");
    }

    #[test]
    fn lam_without_alef_shapes_normally() {
        // lam + beh: no ligature, lam takes its initial form.
        assert_eq!(shape_str("\u{0644}\u{0628}"), "\u{FEDF}\u{FE90}");
    }

    #[test]
    fn shaping_is_idempotent() {
        for text in ["مرحبا", "السلام عليكم", "abc مرحبا def", "لا إله"] {
            let once = shape_str(text);
            let twice = shape_str(&once);
            assert_eq!(once, twice, "shape must be idempotent on {text:?}");
        }
    }

    #[test]
    fn hamza_never_joins() {
        // beh + hamza: hamza is non-joining, beh stays isolated.
        assert_eq!(shape_str("\u{0628}\u{0621}"), "\u{FE8F}\u{FE80}");
    }

    #[test]
    fn tatweel_causes_joining() {
        // tatweel + beh: beh takes its final form against the join-causer.
        assert_eq!(shape_str("\u{0640}\u{0628}"), "\u{0640}\u{FE90}");
    }
}
