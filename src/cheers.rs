//! Cheers - messages shown when a session is recorded

use rand::seq::SliceRandom;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheerKind {
    Finished,   // the whole routine
    CutShort,   // terminated early
}

impl CheerKind {
    pub fn emoji(&self) -> &'static str {
        match self {
            CheerKind::Finished => "🔥",
            CheerKind::CutShort => "👍",
        }
    }
}

pub struct Cheer {
    pub kind: CheerKind,
    pub text: &'static str,
}

pub const CHEERS: &[Cheer] = &[
    Cheer {
        kind: CheerKind::Finished,
        text: "Workout complete. You crushed it!",
    },
    Cheer {
        kind: CheerKind::Finished,
        text: "Every set done. Tomorrow's routine is already lined up.",
    },
    Cheer {
        kind: CheerKind::Finished,
        text: "That's a wrap. Hydrate and stretch.",
    },
    Cheer {
        kind: CheerKind::Finished,
        text: "Consistency beats intensity, and you just proved both.",
    },
    Cheer {
        kind: CheerKind::CutShort,
        text: "Logged. Some training beats no training.",
    },
    Cheer {
        kind: CheerKind::CutShort,
        text: "Short day counts too. The rotation moves on tomorrow.",
    },
    Cheer {
        kind: CheerKind::CutShort,
        text: "Saved. Listen to your body, come back fresh.",
    },
];

/// Random cheer of the given kind
pub fn random_cheer(kind: CheerKind) -> &'static Cheer {
    let matching: Vec<&'static Cheer> = CHEERS.iter().filter(|c| c.kind == kind).collect();
    matching
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(&CHEERS[0])
}

pub fn format_cheer(cheer: &Cheer) -> String {
    format!("{} {}", cheer.kind.emoji(), cheer.text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_cheers() {
        for kind in [CheerKind::Finished, CheerKind::CutShort] {
            assert!(CHEERS.iter().any(|c| c.kind == kind), "{:?} has no cheers", kind);
        }
    }

    #[test]
    fn test_random_cheer_matches_kind() {
        for _ in 0..10 {
            assert_eq!(random_cheer(CheerKind::CutShort).kind, CheerKind::CutShort);
            assert_eq!(random_cheer(CheerKind::Finished).kind, CheerKind::Finished);
        }
    }

    #[test]
    fn test_format_cheer() {
        let cheer = &CHEERS[0];
        let formatted = format_cheer(cheer);
        assert!(formatted.starts_with(cheer.kind.emoji()));
        assert!(formatted.contains(cheer.text));
    }

    #[test]
    fn test_all_cheers_have_text() {
        for (i, cheer) in CHEERS.iter().enumerate() {
            assert!(!cheer.text.is_empty(), "Cheer {} has empty text", i);
        }
    }
}
