use serde::Deserialize;
use serde::Serialize;

use crate::Images;
use crate::MediaRef;

/// Character as referenced from an anime's cast list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRef {
    pub mal_id: u64,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub images: Option<Images>,
    pub name: String,
}

/// Person (voice actor, staff member) reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRef {
    pub mal_id: u64,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub images: Option<Images>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceActor {
    pub person: PersonRef,
    pub language: String,
}

/// Entry of `/anime/{id}/characters`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRole {
    pub character: CharacterRef,
    pub role: String,
    #[serde(default)]
    pub voice_actors: Vec<VoiceActor>,
}

impl CharacterRole {
    pub fn is_main(&self) -> bool {
        self.role.eq_ignore_ascii_case("main")
    }

    /// Voice actor for a given language, e.g. "Japanese"
    pub fn voice_actor(&self, language: &str) -> Option<&PersonRef> {
        self.voice_actors.iter().find(|va| va.language.eq_ignore_ascii_case(language)).map(|va| &va.person)
    }
}

/// Character profile, as returned by `/characters` search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub mal_id: u64,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub images: Option<Images>,
    pub name: String,
    #[serde(default)]
    pub name_kanji: Option<String>,
    #[serde(default)]
    pub nicknames: Vec<String>,
    #[serde(default)]
    pub favorites: Option<u64>,
    #[serde(default)]
    pub about: Option<String>,
}

/// Entry of `/characters/{id}/anime`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterAnime {
    pub role: String,
    pub anime: MediaRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterManga {
    pub role: String,
    pub manga: MediaRef,
}

/// Payload of `/characters/{id}/full`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterFull {
    #[serde(flatten)]
    pub character: Character,
    #[serde(default)]
    pub anime: Vec<CharacterAnime>,
    #[serde(default)]
    pub manga: Vec<CharacterManga>,
    #[serde(default)]
    pub voices: Vec<VoiceActor>,
}

impl CharacterFull {
    /// Voice actor for a given language, e.g. "Japanese"
    pub fn voice_actor(&self, language: &str) -> Option<&PersonRef> {
        self.voices.iter().find(|va| va.language.eq_ignore_ascii_case(language)).map(|va| &va.person)
    }
}
