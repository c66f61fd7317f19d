//! Fixed session and time-slot catalog.
//!
//! # Responsibility
//! - Map session keys to display titles.
//! - Map time-slot keys to the hour used for schedule ordering.
//!
//! # Invariants
//! - Unknown session keys are displayed unchanged.
//! - Unknown or empty time slots order as hour `0`.

/// Conference session offered on the registration form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Session {
    MarvelCinematicUniverse,
    AnimeEvolution,
    GamingFuture,
    SciFiLegacy,
    FantasyWorldBuilding,
    CosplayCompetition,
}

impl Session {
    /// All sessions in form display order.
    pub const ALL: [Session; 6] = [
        Session::MarvelCinematicUniverse,
        Session::AnimeEvolution,
        Session::GamingFuture,
        Session::SciFiLegacy,
        Session::FantasyWorldBuilding,
        Session::CosplayCompetition,
    ];

    /// Stable key stored in `Registration::session_title`.
    pub fn key(self) -> &'static str {
        match self {
            Self::MarvelCinematicUniverse => "marvel-cinematic-universe",
            Self::AnimeEvolution => "anime-evolution",
            Self::GamingFuture => "gaming-future",
            Self::SciFiLegacy => "sci-fi-legacy",
            Self::FantasyWorldBuilding => "fantasy-world-building",
            Self::CosplayCompetition => "cosplay-competition",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::MarvelCinematicUniverse => "Marvel Cinematic Universe: What's Next",
            Self::AnimeEvolution => "Anime Evolution: Past to Present",
            Self::GamingFuture => "Gaming's Future: VR & Beyond",
            Self::SciFiLegacy => "Sci-Fi Legacy: 50 Years of Iconic Shows",
            Self::FantasyWorldBuilding => "Fantasy World Building Masterclass",
            Self::CosplayCompetition => "Cosplay Competition & Awards",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|session| session.key() == key)
    }
}

/// Schedule slot offered on the registration form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimeSlot {
    NineAm,
    ElevenAm,
    OnePm,
    ThreePm,
    FivePm,
}

impl TimeSlot {
    pub const ALL: [TimeSlot; 5] = [
        TimeSlot::NineAm,
        TimeSlot::ElevenAm,
        TimeSlot::OnePm,
        TimeSlot::ThreePm,
        TimeSlot::FivePm,
    ];

    /// Stable key stored in `Registration::time_slot`.
    pub fn key(self) -> &'static str {
        match self {
            Self::NineAm => "9-am",
            Self::ElevenAm => "11-am",
            Self::OnePm => "1-pm",
            Self::ThreePm => "3-pm",
            Self::FivePm => "5-pm",
        }
    }

    /// 24h start hour.
    pub fn hour(self) -> u8 {
        match self {
            Self::NineAm => 9,
            Self::ElevenAm => 11,
            Self::OnePm => 13,
            Self::ThreePm => 15,
            Self::FivePm => 17,
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.key() == key)
    }
}

/// Returns the display title for a session key.
///
/// Unknown keys (including empty) pass through unchanged.
pub fn humanize(session_key: &str) -> String {
    Session::parse(session_key)
        .map(|session| session.title().to_string())
        .unwrap_or_else(|| session_key.to_string())
}

/// Returns the ordering hour for a time-slot key, `0` when unknown or empty.
pub fn slot_order_key(time_slot: &str) -> u8 {
    TimeSlot::parse(time_slot).map_or(0, TimeSlot::hour)
}

#[cfg(test)]
mod tests {
    use super::{humanize, slot_order_key, Session, TimeSlot};

    #[test]
    fn every_session_key_parses_back() {
        for session in Session::ALL {
            assert_eq!(Session::parse(session.key()), Some(session));
        }
    }

    #[test]
    fn humanize_passes_unknown_keys_through() {
        assert_eq!(
            humanize("anime-evolution"),
            "Anime Evolution: Past to Present"
        );
        assert_eq!(humanize("panel-x"), "panel-x");
        assert_eq!(humanize(""), "");
    }

    #[test]
    fn slot_order_key_maps_hours_and_defaults_to_zero() {
        assert_eq!(slot_order_key("9-am"), 9);
        assert_eq!(slot_order_key("1-pm"), 13);
        assert_eq!(slot_order_key("5-pm"), 17);
        assert_eq!(slot_order_key(""), 0);
        assert_eq!(slot_order_key("noon"), 0);
        assert!(TimeSlot::ALL.windows(2).all(|w| w[0].hour() < w[1].hour()));
    }
}
