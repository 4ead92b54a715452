//! Delivery cities.

use serde::{Deserialize, Serialize};

/// Cities the store delivers to.
///
/// Serialized as the display name, which is also what the order and user
/// schemas check enum membership against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum City {
    #[serde(rename = "Tel Aviv")]
    TelAviv,
    Jerusalem,
    Haifa,
    #[serde(rename = "Rishon LeZion")]
    RishonLeZion,
    #[serde(rename = "Petah Tikva")]
    PetahTikva,
    Ashdod,
    Netanya,
    #[serde(rename = "Beer Sheva")]
    BeerSheva,
    Holon,
    #[serde(rename = "Bnei Brak")]
    BneiBrak,
}

impl City {
    /// Every deliverable city, in display order.
    pub const ALL: [Self; 10] = [
        Self::TelAviv,
        Self::Jerusalem,
        Self::Haifa,
        Self::RishonLeZion,
        Self::PetahTikva,
        Self::Ashdod,
        Self::Netanya,
        Self::BeerSheva,
        Self::Holon,
        Self::BneiBrak,
    ];

    /// Display name, as stored in documents.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TelAviv => "Tel Aviv",
            Self::Jerusalem => "Jerusalem",
            Self::Haifa => "Haifa",
            Self::RishonLeZion => "Rishon LeZion",
            Self::PetahTikva => "Petah Tikva",
            Self::Ashdod => "Ashdod",
            Self::Netanya => "Netanya",
            Self::BeerSheva => "Beer Sheva",
            Self::Holon => "Holon",
            Self::BneiBrak => "Bnei Brak",
        }
    }

    /// All display names, for enum constraints.
    #[must_use]
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|c| c.name()).collect()
    }
}

impl std::fmt::Display for City {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for City {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| format!("unknown city: {s}"))
    }
}
