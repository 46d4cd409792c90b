use serde::Deserialize;
use serde::Serialize;

use crate::CharacterRef;
use crate::Images;
use crate::MediaRef;
use crate::PersonRef;

/// Person profile, as returned by `/people` search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub mal_id: u64,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default)]
    pub images: Option<Images>,
    pub name: String,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub alternate_names: Vec<String>,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default)]
    pub favorites: Option<u64>,
    #[serde(default)]
    pub about: Option<String>,
}

/// Staff position on an anime, entry of `/people/{id}/anime`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonAnime {
    pub position: String,
    pub anime: MediaRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonManga {
    pub position: String,
    pub manga: MediaRef,
}

/// Voice role, entry of `/people/{id}/voices`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonVoice {
    pub role: String,
    pub anime: MediaRef,
    pub character: CharacterRef,
}

/// Payload of `/people/{id}/full`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonFull {
    #[serde(flatten)]
    pub person: Person,
    #[serde(default)]
    pub anime: Vec<PersonAnime>,
    #[serde(default)]
    pub manga: Vec<PersonManga>,
    #[serde(default)]
    pub voices: Vec<PersonVoice>,
}

impl PersonFull {
    /// Voice roles marked main
    pub fn main_roles(&self) -> impl Iterator<Item = &PersonVoice> {
        self.voices.iter().filter(|voice| voice.role.eq_ignore_ascii_case("main"))
    }
}

/// Staff member credited on `/anime/{id}/staff`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffMember {
    pub person: PersonRef,
    pub positions: Vec<String>,
}
