//! Character property table: bidirectional class, Arabic joining class, and
//! bracket pairs.
//!
//! The classifier is total: every code point maps to exactly one
//! [`BidiClass`] and one [`JoiningClass`]. ASCII goes through a direct-index
//! table; everything else through a binary search over sorted, non-overlapping
//! ranges. Two deliberate deviations from raw `UnicodeData.txt`: LRM (U+200E)
//! and RLM (U+200F) classify as `BN` so they survive as invisible guards in
//! formatter output instead of injecting strong types of their own.

/// UAX #9 bidirectional character types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::upper_case_acronyms)]
pub enum BidiClass {
    /// Left-to-right letter.
    L,
    /// Right-to-left letter (Hebrew and friends).
    R,
    /// Right-to-left Arabic letter.
    AL,
    /// European number.
    EN,
    /// European number separator.
    ES,
    /// European number terminator.
    ET,
    /// Arabic number.
    AN,
    /// Common number separator.
    CS,
    /// Non-spacing mark.
    NSM,
    /// Boundary neutral.
    BN,
    /// Paragraph separator.
    B,
    /// Segment separator.
    S,
    /// Whitespace.
    WS,
    /// Other neutral.
    ON,
    /// Left-to-right embedding.
    LRE,
    /// Left-to-right override.
    LRO,
    /// Right-to-left embedding.
    RLE,
    /// Right-to-left override.
    RLO,
    /// Pop directional format.
    PDF,
    /// Left-to-right isolate.
    LRI,
    /// Right-to-left isolate.
    RLI,
    /// First strong isolate.
    FSI,
    /// Pop directional isolate.
    PDI,
}

impl BidiClass {
    /// Strong types per BD7: L, R, AL.
    pub fn is_strong(self) -> bool {
        matches!(self, BidiClass::L | BidiClass::R | BidiClass::AL)
    }

    /// Neutral or isolate-formatting types: the "NI" set of rules N0–N2.
    pub fn is_ni(self) -> bool {
        matches!(
            self,
            BidiClass::B
                | BidiClass::S
                | BidiClass::WS
                | BidiClass::ON
                | BidiClass::LRI
                | BidiClass::RLI
                | BidiClass::FSI
                | BidiClass::PDI
        )
    }

    /// LRI, RLI, or FSI.
    pub fn is_isolate_initiator(self) -> bool {
        matches!(self, BidiClass::LRI | BidiClass::RLI | BidiClass::FSI)
    }

    /// Types removed from rule application by X9 (embeddings, overrides, PDF,
    /// boundary neutrals). Isolate formatting characters are NOT removed.
    pub fn is_removed_by_x9(self) -> bool {
        matches!(
            self,
            BidiClass::LRE
                | BidiClass::RLE
                | BidiClass::LRO
                | BidiClass::RLO
                | BidiClass::PDF
                | BidiClass::BN
        )
    }

    /// Short name as used by `BidiTest.txt` and `UnicodeData.txt`.
    pub fn as_str(self) -> &'static str {
        match self {
            BidiClass::L => "L",
            BidiClass::R => "R",
            BidiClass::AL => "AL",
            BidiClass::EN => "EN",
            BidiClass::ES => "ES",
            BidiClass::ET => "ET",
            BidiClass::AN => "AN",
            BidiClass::CS => "CS",
            BidiClass::NSM => "NSM",
            BidiClass::BN => "BN",
            BidiClass::B => "B",
            BidiClass::S => "S",
            BidiClass::WS => "WS",
            BidiClass::ON => "ON",
            BidiClass::LRE => "LRE",
            BidiClass::LRO => "LRO",
            BidiClass::RLE => "RLE",
            BidiClass::RLO => "RLO",
            BidiClass::PDF => "PDF",
            BidiClass::LRI => "LRI",
            BidiClass::RLI => "RLI",
            BidiClass::FSI => "FSI",
            BidiClass::PDI => "PDI",
        }
    }

    /// Inverse of [`as_str`](Self::as_str); used by the conformance parser.
    pub fn from_name(name: &str) -> Option<BidiClass> {
        Some(match name {
            "L" => BidiClass::L,
            "R" => BidiClass::R,
            "AL" => BidiClass::AL,
            "EN" => BidiClass::EN,
            "ES" => BidiClass::ES,
            "ET" => BidiClass::ET,
            "AN" => BidiClass::AN,
            "CS" => BidiClass::CS,
            "NSM" => BidiClass::NSM,
            "BN" => BidiClass::BN,
            "B" => BidiClass::B,
            "S" => BidiClass::S,
            "WS" => BidiClass::WS,
            "ON" => BidiClass::ON,
            "LRE" => BidiClass::LRE,
            "LRO" => BidiClass::LRO,
            "RLE" => BidiClass::RLE,
            "RLO" => BidiClass::RLO,
            "PDF" => BidiClass::PDF,
            "LRI" => BidiClass::LRI,
            "RLI" => BidiClass::RLI,
            "FSI" => BidiClass::FSI,
            "PDI" => BidiClass::PDI,
            _ => return None,
        })
    }
}

use BidiClass::*;

/// Direct-index classes for U+0000..U+007F.
const ASCII_CLASSES: [BidiClass; 128] = [
    BN, BN, BN, BN, BN, BN, BN, BN, // 00-07 control
    BN, S, B, S, WS, B, BN, BN, // 08-0F: TAB=S, LF=B, VT=S, FF=WS, CR=B
    BN, BN, BN, BN, BN, BN, BN, BN, // 10-17 control
    BN, BN, BN, BN, B, B, B, S, // 18-1F: FS/GS/RS=B, US=S
    WS, ON, ON, ET, ET, ET, ON, ON, // 20-27: space, !"#$%&'
    ON, ON, ON, ES, CS, ES, CS, CS, // 28-2F: ()*+,-./
    EN, EN, EN, EN, EN, EN, EN, EN, // 30-37 digits
    EN, EN, CS, ON, ON, ON, ON, ON, // 38-3F: 89:;<=>?
    ON, L, L, L, L, L, L, L, // 40-47: @A-G
    L, L, L, L, L, L, L, L, // 48-4F
    L, L, L, L, L, L, L, L, // 50-57
    L, L, L, ON, ON, ON, ON, ON, // 58-5F: XYZ[\]^_
    ON, L, L, L, L, L, L, L, // 60-67: `a-g
    L, L, L, L, L, L, L, L, // 68-6F
    L, L, L, L, L, L, L, L, // 70-77
    L, L, L, ON, ON, ON, ON, BN, // 78-7F: xyz{|}~ DEL
];

/// Sorted, non-overlapping `(first, last, class)` ranges above ASCII.
/// Code points not covered by any range default to `L`; that matches the
/// letter-heavy remainder of the repertoire (CJK, Indic, Hangul, ...).
const RANGES: &[(u32, u32, BidiClass)] = &[
    (0x0080, 0x0084, BN),
    (0x0085, 0x0085, B),
    (0x0086, 0x009F, BN),
    (0x00A0, 0x00A0, CS),
    (0x00A1, 0x00A1, ON),
    (0x00A2, 0x00A5, ET),
    (0x00A6, 0x00A9, ON),
    (0x00AA, 0x00AA, L),
    (0x00AB, 0x00AC, ON),
    (0x00AD, 0x00AD, BN),
    (0x00AE, 0x00AF, ON),
    (0x00B0, 0x00B1, ET),
    (0x00B2, 0x00B3, EN),
    (0x00B4, 0x00B4, ON),
    (0x00B5, 0x00B5, L),
    (0x00B6, 0x00B8, ON),
    (0x00B9, 0x00B9, EN),
    (0x00BA, 0x00BA, L),
    (0x00BB, 0x00BF, ON),
    (0x00C0, 0x00D6, L),
    (0x00D7, 0x00D7, ON),
    (0x00D8, 0x00F6, L),
    (0x00F7, 0x00F7, ON),
    (0x00F8, 0x02B8, L),
    (0x02B9, 0x02BA, ON),
    (0x02BB, 0x02C1, L),
    (0x02C2, 0x02CF, ON),
    (0x02D0, 0x02D1, L),
    (0x02D2, 0x02DF, ON),
    (0x02E0, 0x02E4, L),
    (0x02E5, 0x02FF, ON),
    (0x0300, 0x036F, NSM),
    (0x0370, 0x0373, L),
    (0x0374, 0x0375, ON),
    (0x0376, 0x0482, L),
    (0x0483, 0x0489, NSM),
    (0x048A, 0x0590, L),
    (0x0591, 0x05BD, NSM),
    (0x05BE, 0x05BE, R),
    (0x05BF, 0x05BF, NSM),
    (0x05C0, 0x05C0, R),
    (0x05C1, 0x05C2, NSM),
    (0x05C3, 0x05C3, R),
    (0x05C4, 0x05C5, NSM),
    (0x05C6, 0x05C6, R),
    (0x05C7, 0x05C7, NSM),
    (0x05C8, 0x05FF, R),
    (0x0600, 0x0605, AN),
    (0x0606, 0x0607, ON),
    (0x0608, 0x0608, AL),
    (0x0609, 0x060A, ET),
    (0x060B, 0x060B, AL),
    (0x060C, 0x060C, CS),
    (0x060D, 0x060D, AL),
    (0x060E, 0x060F, ON),
    (0x0610, 0x061A, NSM),
    (0x061B, 0x064A, AL),
    (0x064B, 0x065F, NSM),
    (0x0660, 0x0669, AN),
    (0x066A, 0x066A, ET),
    (0x066B, 0x066C, AN),
    (0x066D, 0x066F, AL),
    (0x0670, 0x0670, NSM),
    (0x0671, 0x06D5, AL),
    (0x06D6, 0x06DC, NSM),
    (0x06DD, 0x06DD, AN),
    (0x06DE, 0x06DE, ON),
    (0x06DF, 0x06E4, NSM),
    (0x06E5, 0x06E6, AL),
    (0x06E7, 0x06E8, NSM),
    (0x06E9, 0x06E9, ON),
    (0x06EA, 0x06ED, NSM),
    (0x06EE, 0x06EF, AL),
    (0x06F0, 0x06F9, EN),
    (0x06FA, 0x070E, AL),
    (0x070F, 0x070F, AL),
    (0x0710, 0x0710, AL),
    (0x0711, 0x0711, NSM),
    (0x0712, 0x072F, AL),
    (0x0730, 0x074A, NSM),
    (0x074B, 0x07A5, AL),
    (0x07A6, 0x07B0, NSM),
    (0x07B1, 0x07BF, AL),
    (0x07C0, 0x07EA, R),
    (0x07EB, 0x07F3, NSM),
    (0x07F4, 0x07F5, R),
    (0x07F6, 0x07F9, ON),
    (0x07FA, 0x07FF, R),
    (0x0800, 0x0815, R),
    (0x0816, 0x0819, NSM),
    (0x081A, 0x081A, R),
    (0x081B, 0x0823, NSM),
    (0x0824, 0x0824, R),
    (0x0825, 0x0827, NSM),
    (0x0828, 0x0828, R),
    (0x0829, 0x082D, NSM),
    (0x082E, 0x0858, R),
    (0x0859, 0x085B, NSM),
    (0x085C, 0x089F, R),
    (0x08A0, 0x08D2, AL),
    (0x08D3, 0x08FF, NSM),
    (0x0900, 0x1FFF, L),
    (0x2000, 0x200A, WS),
    (0x200B, 0x200D, BN),
    // LRM/RLM: BN here (see module docs), not the UnicodeData L/R.
    (0x200E, 0x200F, BN),
    (0x2010, 0x2027, ON),
    (0x2028, 0x2028, WS),
    (0x2029, 0x2029, B),
    (0x202A, 0x202A, LRE),
    (0x202B, 0x202B, RLE),
    (0x202C, 0x202C, PDF),
    (0x202D, 0x202D, LRO),
    (0x202E, 0x202E, RLO),
    (0x202F, 0x202F, CS),
    (0x2030, 0x2034, ET),
    (0x2035, 0x2043, ON),
    (0x2044, 0x2044, CS),
    (0x2045, 0x205E, ON),
    (0x205F, 0x205F, WS),
    (0x2060, 0x2065, BN),
    (0x2066, 0x2066, LRI),
    (0x2067, 0x2067, RLI),
    (0x2068, 0x2068, FSI),
    (0x2069, 0x2069, PDI),
    (0x206A, 0x206F, BN),
    (0x2070, 0x2070, EN),
    (0x2071, 0x2073, L),
    (0x2074, 0x2079, EN),
    (0x207A, 0x207B, ES),
    (0x207C, 0x207E, ON),
    (0x207F, 0x207F, L),
    (0x2080, 0x2089, EN),
    (0x208A, 0x208B, ES),
    (0x208C, 0x209F, ON),
    (0x20A0, 0x20CF, ET),
    (0x20D0, 0x20FF, NSM),
    (0x2100, 0x2101, ON),
    (0x2102, 0x2102, L),
    (0x2103, 0x2106, ON),
    (0x2107, 0x2107, L),
    (0x2108, 0x2109, ON),
    (0x210A, 0x2113, L),
    (0x2114, 0x2114, ON),
    (0x2115, 0x2115, L),
    (0x2116, 0x2118, ON),
    (0x2119, 0x211D, L),
    (0x211E, 0x2123, ON),
    (0x2124, 0x2124, L),
    (0x2125, 0x2125, ON),
    (0x2126, 0x2126, L),
    (0x2127, 0x2127, ON),
    (0x2128, 0x2128, L),
    (0x2129, 0x2129, ON),
    (0x212A, 0x212D, L),
    (0x212E, 0x212E, ET),
    (0x212F, 0x2139, L),
    (0x213A, 0x213B, ON),
    (0x213C, 0x213F, L),
    (0x2140, 0x2144, ON),
    (0x2145, 0x2149, L),
    (0x214A, 0x214D, ON),
    (0x214E, 0x214F, L),
    (0x2150, 0x215F, ON),
    (0x2160, 0x2188, L),
    (0x2189, 0x2BFF, ON),
    (0x2C00, 0x2CEE, L),
    (0x2CEF, 0x2CF1, NSM),
    (0x2CF2, 0x2CFF, L),
    (0x2D00, 0x2D7E, L),
    (0x2D7F, 0x2D7F, NSM),
    (0x2D80, 0x2DDF, L),
    (0x2DE0, 0x2DFF, NSM),
    (0x2E00, 0x2E7F, ON),
    (0x2E80, 0x2FFF, ON),
    (0x3000, 0x3000, WS),
    (0x3001, 0x3020, ON),
    (0x3021, 0x3029, L),
    (0x302A, 0x302D, NSM),
    (0x302E, 0x3098, L),
    (0x3099, 0x309A, NSM),
    (0x309B, 0x309C, ON),
    (0x309D, 0xA66E, L),
    (0xA66F, 0xA672, NSM),
    (0xA673, 0xA673, ON),
    (0xA674, 0xA67D, NSM),
    (0xA67E, 0xFB1C, L),
    (0xFB1D, 0xFB1D, R),
    (0xFB1E, 0xFB1E, NSM),
    (0xFB1F, 0xFB28, R),
    (0xFB29, 0xFB29, ES),
    (0xFB2A, 0xFB4F, R),
    (0xFB50, 0xFD3D, AL),
    (0xFD3E, 0xFD4F, ON),
    (0xFD50, 0xFDFF, AL),
    (0xFE00, 0xFE0F, NSM),
    (0xFE10, 0xFE19, ON),
    (0xFE20, 0xFE2F, NSM),
    (0xFE30, 0xFE4F, ON),
    (0xFE50, 0xFE50, CS),
    (0xFE51, 0xFE51, ON),
    (0xFE52, 0xFE52, CS),
    (0xFE53, 0xFE54, ON),
    (0xFE55, 0xFE55, CS),
    (0xFE56, 0xFE5E, ON),
    (0xFE5F, 0xFE5F, ET),
    (0xFE60, 0xFE61, ON),
    (0xFE62, 0xFE63, ES),
    (0xFE64, 0xFE68, ON),
    (0xFE69, 0xFE6A, ET),
    (0xFE6B, 0xFE6B, ON),
    (0xFE70, 0xFEFE, AL),
    (0xFEFF, 0xFEFF, BN),
    (0xFF01, 0xFF02, ON),
    (0xFF03, 0xFF05, ET),
    (0xFF06, 0xFF0A, ON),
    (0xFF0B, 0xFF0B, ES),
    (0xFF0C, 0xFF0C, CS),
    (0xFF0D, 0xFF0D, ES),
    (0xFF0E, 0xFF0F, CS),
    (0xFF10, 0xFF19, EN),
    (0xFF1A, 0xFF1A, CS),
    (0xFF1B, 0xFF20, ON),
    (0xFF21, 0xFF3A, L),
    (0xFF3B, 0xFF40, ON),
    (0xFF41, 0xFF5A, L),
    (0xFF5B, 0xFF65, ON),
    (0xFF66, 0xFFDF, L),
    (0xFFE0, 0xFFE1, ET),
    (0xFFE2, 0xFFEF, ON),
    (0x10800, 0x1091E, R),
    (0x1091F, 0x1091F, ON),
    (0x10920, 0x10A00, R),
    (0x10A01, 0x10A0F, NSM),
    (0x10A10, 0x10A37, R),
    (0x10A38, 0x10A3F, NSM),
    (0x10A40, 0x10AE4, R),
    (0x10AE5, 0x10AE6, NSM),
    (0x10AE7, 0x10FFF, R),
    (0x1D167, 0x1D169, NSM),
    (0x1D173, 0x1D182, BN),
    (0x1D185, 0x1D18B, NSM),
    (0x1D1AA, 0x1D1AD, NSM),
    (0x1D7CE, 0x1D7FF, EN),
    (0x1E800, 0x1E8CF, R),
    (0x1E8D0, 0x1E8D6, NSM),
    (0x1E900, 0x1E943, R),
    (0x1E944, 0x1E94A, NSM),
    (0x1E94B, 0x1E95F, R),
    (0x1E960, 0x1EC70, R),
    (0x1EC71, 0x1ECBF, AL),
    (0x1ED01, 0x1ED3F, AL),
    (0x1EE00, 0x1EEFF, AL),
    (0x1F100, 0x1F10A, EN),
];

/// Bidirectional class of a code point. Total over `char`.
pub fn bidi_class(c: char) -> BidiClass {
    let cp = c as u32;
    if cp < 0x80 {
        return ASCII_CLASSES[cp as usize];
    }
    match RANGES.binary_search_by(|&(first, last, _)| {
        if cp < first {
            std::cmp::Ordering::Greater
        } else if cp > last {
            std::cmp::Ordering::Less
        } else {
            std::cmp::Ordering::Equal
        }
    }) {
        Ok(idx) => RANGES[idx].2,
        Err(_) => L,
    }
}

/// Arabic joining behavior of a letter (ArabicShaping.txt terms).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoiningClass {
    /// Never joins (U).
    NonJoining,
    /// Joins only the preceding letter (R).
    RightJoining,
    /// Joins only the following letter (L).
    LeftJoining,
    /// Joins on both sides (D).
    DualJoining,
    /// Forces joining without taking contextual forms itself (C).
    JoinCausing,
    /// Invisible to joining context (T); marks attach to the preceding base.
    Transparent,
}

/// Sorted `(first, last, class)` joining ranges for the Arabic letters the
/// shaper handles plus the join-causing controls.
const JOINING_RANGES: &[(u32, u32, JoiningClass)] = &[
    (0x0620, 0x0620, JoiningClass::DualJoining),
    (0x0621, 0x0621, JoiningClass::NonJoining),
    (0x0622, 0x0625, JoiningClass::RightJoining),
    (0x0626, 0x0626, JoiningClass::DualJoining),
    (0x0627, 0x0627, JoiningClass::RightJoining),
    (0x0628, 0x0628, JoiningClass::DualJoining),
    (0x0629, 0x0629, JoiningClass::RightJoining),
    (0x062A, 0x062E, JoiningClass::DualJoining),
    (0x062F, 0x0632, JoiningClass::RightJoining),
    (0x0633, 0x063F, JoiningClass::DualJoining),
    (0x0640, 0x0640, JoiningClass::JoinCausing),
    (0x0641, 0x0647, JoiningClass::DualJoining),
    (0x0648, 0x0648, JoiningClass::RightJoining),
    (0x0649, 0x064A, JoiningClass::DualJoining),
    (0x066E, 0x066F, JoiningClass::DualJoining),
    (0x0671, 0x0673, JoiningClass::RightJoining),
    (0x0675, 0x0677, JoiningClass::RightJoining),
    (0x0678, 0x0687, JoiningClass::DualJoining),
    (0x0688, 0x0699, JoiningClass::RightJoining),
    (0x069A, 0x06BF, JoiningClass::DualJoining),
    (0x06C0, 0x06C0, JoiningClass::RightJoining),
    (0x06C1, 0x06C2, JoiningClass::DualJoining),
    (0x06C3, 0x06CB, JoiningClass::RightJoining),
    (0x06CC, 0x06CC, JoiningClass::DualJoining),
    (0x06CD, 0x06CD, JoiningClass::RightJoining),
    (0x06CE, 0x06CE, JoiningClass::DualJoining),
    (0x06CF, 0x06CF, JoiningClass::RightJoining),
    (0x06D0, 0x06D1, JoiningClass::DualJoining),
    (0x06D2, 0x06D3, JoiningClass::RightJoining),
    (0x06D5, 0x06D5, JoiningClass::RightJoining),
    (0x06EE, 0x06EF, JoiningClass::RightJoining),
    (0x06FA, 0x06FC, JoiningClass::DualJoining),
    (0x06FF, 0x06FF, JoiningClass::DualJoining),
    (0x200D, 0x200D, JoiningClass::JoinCausing),
];

/// Joining class of a code point. Total: anything not in the table is
/// Transparent when it is a non-spacing mark, otherwise NonJoining.
pub fn joining_class(c: char) -> JoiningClass {
    let cp = c as u32;
    match JOINING_RANGES.binary_search_by(|&(first, last, _)| {
        if cp < first {
            std::cmp::Ordering::Greater
        } else if cp > last {
            std::cmp::Ordering::Less
        } else {
            std::cmp::Ordering::Equal
        }
    }) {
        Ok(idx) => JOINING_RANGES[idx].2,
        Err(_) => {
            if bidi_class(c) == BidiClass::NSM {
                JoiningClass::Transparent
            } else {
                JoiningClass::NonJoining
            }
        }
    }
}

/// Whether a bracket opens or closes its pair (BD14/BD15).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketKind {
    Open,
    Close,
}

/// `(opening, closing)` pairs from the Unicode BidiBrackets data.
const BRACKET_PAIRS: &[(u32, u32)] = &[
    (0x0028, 0x0029),
    (0x005B, 0x005D),
    (0x007B, 0x007D),
    (0x0F3A, 0x0F3B),
    (0x0F3C, 0x0F3D),
    (0x169B, 0x169C),
    (0x2045, 0x2046),
    (0x207D, 0x207E),
    (0x208D, 0x208E),
    (0x2308, 0x2309),
    (0x230A, 0x230B),
    (0x2329, 0x232A),
    (0x2768, 0x2769),
    (0x276A, 0x276B),
    (0x276C, 0x276D),
    (0x276E, 0x276F),
    (0x2770, 0x2771),
    (0x2772, 0x2773),
    (0x2774, 0x2775),
    (0x27C5, 0x27C6),
    (0x27E6, 0x27E7),
    (0x27E8, 0x27E9),
    (0x27EA, 0x27EB),
    (0x27EC, 0x27ED),
    (0x27EE, 0x27EF),
    (0x2983, 0x2984),
    (0x2985, 0x2986),
    (0x2987, 0x2988),
    (0x2989, 0x298A),
    (0x298B, 0x298C),
    (0x298D, 0x2990),
    (0x298F, 0x298E),
    (0x2991, 0x2992),
    (0x2993, 0x2994),
    (0x2995, 0x2996),
    (0x2997, 0x2998),
    (0x29D8, 0x29D9),
    (0x29DA, 0x29DB),
    (0x29FC, 0x29FD),
    (0x2E22, 0x2E23),
    (0x2E24, 0x2E25),
    (0x2E26, 0x2E27),
    (0x2E28, 0x2E29),
    (0x3008, 0x3009),
    (0x300A, 0x300B),
    (0x300C, 0x300D),
    (0x300E, 0x300F),
    (0x3010, 0x3011),
    (0x3014, 0x3015),
    (0x3016, 0x3017),
    (0x3018, 0x3019),
    (0x301A, 0x301B),
    (0xFE59, 0xFE5A),
    (0xFE5B, 0xFE5C),
    (0xFE5D, 0xFE5E),
    (0xFF08, 0xFF09),
    (0xFF3B, 0xFF3D),
    (0xFF5B, 0xFF5D),
    (0xFF5F, 0xFF60),
    (0xFF62, 0xFF63),
];

/// Bracket-pair membership per BD16.
pub fn bracket_info(c: char) -> Option<(char, BracketKind)> {
    let cp = c as u32;
    for &(open, close) in BRACKET_PAIRS {
        if cp == open {
            return Some((char::from_u32(close)?, BracketKind::Open));
        }
        if cp == close {
            return Some((char::from_u32(open)?, BracketKind::Close));
        }
    }
    None
}

/// Canonical form used when matching bracket pairs: the angle brackets
/// U+2329/U+232A are canonically equivalent to U+3008/U+3009.
pub fn canonical_bracket(c: char) -> char {
    match c {
        '\u{3008}' => '\u{2329}',
        '\u{3009}' => '\u{232A}',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_table_matches_spec_anchors() {
        assert_eq!(bidi_class('\t'), S);
        assert_eq!(bidi_class(' '), WS);
        assert_eq!(bidi_class('A'), L);
        assert_eq!(bidi_class('z'), L);
        assert_eq!(bidi_class('5'), EN);
        assert_eq!(bidi_class('+'), ES);
        assert_eq!(bidi_class(','), CS);
        assert_eq!(bidi_class('$'), ET);
        assert_eq!(bidi_class('!'), ON);
        assert_eq!(bidi_class('\n'), B);
    }

    #[test]
    fn latin_extended_and_symbols() {
        assert_eq!(bidi_class('\u{00E9}'), L, "e-acute is a letter");
        assert_eq!(bidi_class('\u{00A9}'), ON, "copyright sign is neutral");
        assert_eq!(bidi_class('\u{20AC}'), ET, "euro sign terminates numbers");
    }

    #[test]
    fn rtl_blocks() {
        assert_eq!(bidi_class('\u{05D0}'), R, "Hebrew alef");
        assert_eq!(bidi_class('\u{0627}'), AL, "Arabic alef");
        assert_eq!(bidi_class('\u{0661}'), AN, "Arabic-Indic one");
        assert_eq!(bidi_class('\u{06F1}'), EN, "extended Arabic-Indic one");
        assert_eq!(bidi_class('\u{064E}'), NSM, "fatha");
        assert_eq!(bidi_class('\u{FE8D}'), AL, "presentation-form alef");
    }

    #[test]
    fn directional_marks_are_boundary_neutral() {
        assert_eq!(bidi_class('\u{200E}'), BN);
        assert_eq!(bidi_class('\u{200F}'), BN);
    }

    #[test]
    fn explicit_formatting_classes() {
        assert_eq!(bidi_class('\u{202A}'), LRE);
        assert_eq!(bidi_class('\u{202B}'), RLE);
        assert_eq!(bidi_class('\u{202C}'), PDF);
        assert_eq!(bidi_class('\u{202D}'), LRO);
        assert_eq!(bidi_class('\u{202E}'), RLO);
        assert_eq!(bidi_class('\u{2066}'), LRI);
        assert_eq!(bidi_class('\u{2067}'), RLI);
        assert_eq!(bidi_class('\u{2068}'), FSI);
        assert_eq!(bidi_class('\u{2069}'), PDI);
    }

    #[test]
    fn classifier_is_total_over_sampled_planes() {
        // Exhaustive over the BMP, sampled over the supplementary planes.
        for cp in 0u32..=0xFFFF {
            if let Some(c) = char::from_u32(cp) {
                let _ = bidi_class(c);
                let _ = joining_class(c);
            }
        }
        for cp in (0x1_0000u32..=0x10_FFFF).step_by(257) {
            if let Some(c) = char::from_u32(cp) {
                let _ = bidi_class(c);
                let _ = joining_class(c);
            }
        }
    }

    #[test]
    fn ranges_are_sorted_and_disjoint() {
        for pair in RANGES.windows(2) {
            assert!(pair[0].1 < pair[1].0, "overlap near {:#X}", pair[1].0);
        }
        for &(first, last, _) in RANGES {
            assert!(first <= last);
        }
    }

    #[test]
    fn joining_classes_for_core_letters() {
        assert_eq!(joining_class('\u{0628}'), JoiningClass::DualJoining); // beh
        assert_eq!(joining_class('\u{0627}'), JoiningClass::RightJoining); // alef
        assert_eq!(joining_class('\u{0621}'), JoiningClass::NonJoining); // hamza
        assert_eq!(joining_class('\u{0640}'), JoiningClass::JoinCausing); // tatweel
        assert_eq!(joining_class('\u{064E}'), JoiningClass::Transparent); // fatha
        assert_eq!(joining_class('\u{062F}'), JoiningClass::RightJoining); // dal
        assert_eq!(joining_class('A'), JoiningClass::NonJoining);
    }

    #[test]
    fn bracket_pairs_round_trip() {
        let (close, kind) = bracket_info('(').unwrap();
        assert_eq!((close, kind), (')', BracketKind::Open));
        let (open, kind) = bracket_info(')').unwrap();
        assert_eq!((open, kind), ('(', BracketKind::Close));
        assert!(bracket_info('x').is_none());
        assert_eq!(canonical_bracket('\u{3008}'), '\u{2329}');
    }
}
