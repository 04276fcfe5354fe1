//! Rules W1–W7 (weak types), N0–N2 (neutrals and paired brackets), and
//! I1/I2 (implicit levels), applied per isolating run sequence.

use crate::class::{bracket_info, canonical_bracket, BidiClass, BracketKind};

use super::sequence::IsolatingSequence;

/// BD16 caps the bracket-pair stack at 63 entries; overflow abandons the
/// rule for the rest of the sequence.
const BRACKET_STACK_LIMIT: usize = 63;

/// W1–W7 on one isolating run sequence. `work` is indexed by logical
/// position and mutated in place.
pub(super) fn resolve_weak(seq: &IsolatingSequence, work: &mut [BidiClass]) {
    // W1: non-spacing marks take the type of the character they follow;
    // at the sequence start they take sos, behind an isolate boundary ON.
    let mut prev = seq.sos;
    for &i in &seq.indices {
        if work[i] == BidiClass::NSM {
            work[i] = if prev.is_isolate_initiator() || prev == BidiClass::PDI {
                BidiClass::ON
            } else {
                prev
            };
        }
        prev = work[i];
    }

    // W2: European numbers become Arabic numbers after an Arabic letter.
    let mut last_strong = seq.sos;
    for &i in &seq.indices {
        match work[i] {
            BidiClass::L | BidiClass::R | BidiClass::AL => last_strong = work[i],
            BidiClass::EN if last_strong == BidiClass::AL => work[i] = BidiClass::AN,
            _ => {}
        }
    }

    // W3: Arabic letters resolve to R.
    for &i in &seq.indices {
        if work[i] == BidiClass::AL {
            work[i] = BidiClass::R;
        }
    }

    // W4: a single separator between matching numbers joins them.
    for k in 1..seq.indices.len().saturating_sub(1) {
        let (p, c, f) = (
            work[seq.indices[k - 1]],
            work[seq.indices[k]],
            work[seq.indices[k + 1]],
        );
        if c == BidiClass::ES && p == BidiClass::EN && f == BidiClass::EN {
            work[seq.indices[k]] = BidiClass::EN;
        } else if c == BidiClass::CS
            && p == f
            && (p == BidiClass::EN || p == BidiClass::AN)
        {
            work[seq.indices[k]] = p;
        }
    }

    // W5: runs of terminators adjacent to a European number become EN.
    let len = seq.indices.len();
    let mut k = 0;
    while k < len {
        if work[seq.indices[k]] == BidiClass::ET {
            let start = k;
            while k < len && work[seq.indices[k]] == BidiClass::ET {
                k += 1;
            }
            let before_en = start > 0 && work[seq.indices[start - 1]] == BidiClass::EN;
            let after_en = k < len && work[seq.indices[k]] == BidiClass::EN;
            if before_en || after_en {
                for j in start..k {
                    work[seq.indices[j]] = BidiClass::EN;
                }
            }
        } else {
            k += 1;
        }
    }

    // W6: leftover separators and terminators are plain neutrals.
    for &i in &seq.indices {
        if matches!(work[i], BidiClass::ES | BidiClass::ET | BidiClass::CS) {
            work[i] = BidiClass::ON;
        }
    }

    // W7: European numbers in a left context read as L.
    let mut last_strong = seq.sos;
    for &i in &seq.indices {
        match work[i] {
            BidiClass::L | BidiClass::R => last_strong = work[i],
            BidiClass::EN if last_strong == BidiClass::L => work[i] = BidiClass::L,
            _ => {}
        }
    }
}

/// The strong direction a class contributes when weighing neutrals:
/// numbers count as R (N1 clause), strong types as themselves.
fn strong_direction(class: BidiClass) -> Option<BidiClass> {
    match class {
        BidiClass::L => Some(BidiClass::L),
        BidiClass::R | BidiClass::EN | BidiClass::AN => Some(BidiClass::R),
        _ => None,
    }
}

/// N0: paired brackets. Only runs when the actual characters are known;
/// the class-sequence entry point has no bracket identities to pair.
pub(super) fn resolve_brackets(
    seq: &IsolatingSequence,
    chars: &[char],
    original: &[BidiClass],
    work: &mut [BidiClass],
) {
    let embedding = if seq.level % 2 == 1 {
        BidiClass::R
    } else {
        BidiClass::L
    };
    let opposite = if embedding == BidiClass::L {
        BidiClass::R
    } else {
        BidiClass::L
    };

    // BD16: locate pairs with a bounded stack of open brackets.
    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut pairs: Vec<(usize, usize)> = Vec::new();
    for (k, &i) in seq.indices.iter().enumerate() {
        if work[i] != BidiClass::ON {
            continue;
        }
        let Some((paired, kind)) = bracket_info(chars[i]) else {
            continue;
        };
        match kind {
            BracketKind::Open => {
                if stack.len() == BRACKET_STACK_LIMIT {
                    return;
                }
                stack.push((canonical_bracket(chars[i]), k));
            }
            BracketKind::Close => {
                let expected = canonical_bracket(paired);
                if let Some(pos) = stack.iter().rposition(|&(open, _)| open == expected) {
                    pairs.push((stack[pos].1, k));
                    stack.truncate(pos);
                }
            }
        }
    }
    pairs.sort_unstable();

    for (open_k, close_k) in pairs {
        // Strong types strictly inside the pair.
        let mut saw_embedding = false;
        let mut saw_opposite = false;
        for k in open_k + 1..close_k {
            match strong_direction(work[seq.indices[k]]) {
                Some(d) if d == embedding => saw_embedding = true,
                Some(_) => saw_opposite = true,
                None => {}
            }
        }
        let resolved = if saw_embedding {
            Some(embedding)
        } else if saw_opposite {
            // Context before the opening bracket decides between the
            // opposite direction and the embedding direction.
            let mut context = seq.sos;
            for k in (0..open_k).rev() {
                if let Some(d) = strong_direction(work[seq.indices[k]]) {
                    context = d;
                    break;
                }
            }
            Some(if context == opposite { opposite } else { embedding })
        } else {
            None
        };
        if let Some(direction) = resolved {
            set_bracket(seq, original, work, open_k, direction);
            set_bracket(seq, original, work, close_k, direction);
        }
    }
}

/// Assign a resolved bracket its direction, dragging along any trailing
/// characters that were NSM before W1 ran.
fn set_bracket(
    seq: &IsolatingSequence,
    original: &[BidiClass],
    work: &mut [BidiClass],
    k: usize,
    direction: BidiClass,
) {
    work[seq.indices[k]] = direction;
    for next in seq.indices.iter().skip(k + 1) {
        if original[*next] == BidiClass::NSM {
            work[*next] = direction;
        } else {
            break;
        }
    }
}

/// N1/N2: neutral runs take the surrounding direction when both sides
/// agree, otherwise the embedding direction.
pub(super) fn resolve_neutrals(seq: &IsolatingSequence, work: &mut [BidiClass]) {
    let embedding = if seq.level % 2 == 1 {
        BidiClass::R
    } else {
        BidiClass::L
    };
    let len = seq.indices.len();
    let mut k = 0;
    while k < len {
        if !work[seq.indices[k]].is_ni() {
            k += 1;
            continue;
        }
        let start = k;
        while k < len && work[seq.indices[k]].is_ni() {
            k += 1;
        }
        let before = if start == 0 {
            seq.sos
        } else {
            strong_direction(work[seq.indices[start - 1]]).unwrap_or(embedding)
        };
        let after = if k == len {
            seq.eos
        } else {
            strong_direction(work[seq.indices[k]]).unwrap_or(embedding)
        };
        let direction = if before == after { before } else { embedding };
        for j in start..k {
            work[seq.indices[j]] = direction;
        }
    }
}

/// I1/I2: bump levels from the resolved classes.
pub(super) fn resolve_implicit(seq: &IsolatingSequence, work: &[BidiClass], levels: &mut [u8]) {
    for &i in &seq.indices {
        let even = levels[i] % 2 == 0;
        levels[i] += match (even, work[i]) {
            (true, BidiClass::R) => 1,
            (true, BidiClass::AN | BidiClass::EN) => 2,
            (false, BidiClass::L | BidiClass::EN | BidiClass::AN) => 1,
            _ => 0,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BidiClass::*;

    fn seq_over(classes: &[BidiClass], level: u8, sos: BidiClass, eos: BidiClass) -> IsolatingSequence {
        IsolatingSequence {
            indices: (0..classes.len()).collect(),
            level,
            sos,
            eos,
        }
    }

    #[test]
    fn w1_nsm_takes_preceding_type() {
        let mut work = vec![AL, NSM, NSM];
        let seq = seq_over(&work, 1, R, R);
        resolve_weak(&seq, &mut work);
        // AL resolves to R via W3; the marks followed AL before that.
        assert_eq!(work, vec![R, R, R]);
    }

    #[test]
    fn w1_nsm_at_start_takes_sos() {
        let mut work = vec![NSM, L];
        let seq = seq_over(&work, 0, L, L);
        resolve_weak(&seq, &mut work);
        assert_eq!(work[0], L);
    }

    #[test]
    fn w2_en_after_al_becomes_an() {
        let mut work = vec![AL, ON, EN];
        let seq = seq_over(&work, 1, R, R);
        resolve_weak(&seq, &mut work);
        assert_eq!(work[2], AN);
    }

    #[test]
    fn w4_w5_number_joins() {
        let mut work = vec![EN, ES, EN, ET, ET];
        let seq = seq_over(&work, 0, L, L);
        resolve_weak(&seq, &mut work);
        // ES bridges the numbers, the terminator run rides along, and W7
        // then converts the whole left-context number to L.
        assert_eq!(work, vec![L, L, L, L, L]);
    }

    #[test]
    fn w4_cs_between_an() {
        let mut work = vec![AN, CS, AN];
        let seq = seq_over(&work, 1, R, R);
        resolve_weak(&seq, &mut work);
        assert_eq!(work, vec![AN, AN, AN]);
    }

    #[test]
    fn w6_stray_separator_neutralizes() {
        let mut work = vec![EN, CS, AN];
        let seq = seq_over(&work, 1, R, R);
        resolve_weak(&seq, &mut work);
        assert_eq!(work[1], ON, "mismatched numbers do not join");
    }

    #[test]
    fn w7_en_after_l() {
        let mut work = vec![L, ON, EN];
        let seq = seq_over(&work, 0, L, L);
        resolve_weak(&seq, &mut work);
        assert_eq!(work[2], L);
    }

    #[test]
    fn n1_agreeing_context_wins() {
        let mut work = vec![R, WS, R];
        let seq = seq_over(&work, 1, R, R);
        resolve_neutrals(&seq, &mut work);
        assert_eq!(work[1], R);
    }

    #[test]
    fn n2_disagreement_takes_embedding() {
        let mut work = vec![L, WS, R];
        let seq = seq_over(&work, 0, L, L);
        resolve_neutrals(&seq, &mut work);
        assert_eq!(work[1], L);
    }

    #[test]
    fn n1_numbers_count_as_r() {
        let mut work = vec![R, WS, EN];
        let seq = seq_over(&work, 1, R, R);
        resolve_neutrals(&seq, &mut work);
        assert_eq!(work[1], R);
    }

    #[test]
    fn n0_brackets_take_enclosed_strong_type() {
        // أ(ب)أ: RTL context, Arabic letter inside the pair.
        let chars: Vec<char> = "أ(ب)أ".chars().collect();
        let original = vec![AL, ON, AL, ON, AL];
        let mut work = original.clone();
        let seq = seq_over(&original, 1, R, R);
        resolve_weak(&seq, &mut work);
        resolve_brackets(&seq, &chars, &original, &mut work);
        assert_eq!(work[1], R);
        assert_eq!(work[3], R);
    }

    #[test]
    fn n0_opposite_inside_checks_context() {
        // RTL paragraph, Latin letter inside the pair, Latin context before:
        // the pair takes the opposite (L) direction.
        let chars: Vec<char> = "a(b)".chars().collect();
        let original = vec![L, ON, L, ON];
        let mut work = original.clone();
        let seq = seq_over(&original, 1, R, R);
        resolve_weak(&seq, &mut work);
        resolve_brackets(&seq, &chars, &original, &mut work);
        assert_eq!(work[1], L);
        assert_eq!(work[3], L);
    }

    #[test]
    fn n0_empty_pair_left_to_n1() {
        let chars: Vec<char> = "()".chars().collect();
        let original = vec![ON, ON];
        let mut work = original.clone();
        let seq = seq_over(&original, 0, L, L);
        resolve_brackets(&seq, &chars, &original, &mut work);
        assert_eq!(work, vec![ON, ON]);
    }

    #[test]
    fn implicit_levels_follow_i1_i2() {
        let work = vec![L, R, EN, AN];
        let mut levels = vec![0, 0, 0, 0];
        let seq = seq_over(&work, 0, L, L);
        resolve_implicit(&seq, &work, &mut levels);
        assert_eq!(levels, vec![0, 1, 2, 2]);
        let mut levels = vec![1, 1, 1, 1];
        let seq = seq_over(&work, 1, R, R);
        resolve_implicit(&seq, &work, &mut levels);
        assert_eq!(levels, vec![2, 1, 2, 2]);
    }
}
