use serde::{Deserialize, Serialize};

/// A stored song record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub song_id: i64,
    pub song: String,
    pub group: String,
    #[serde(rename = "releaseDate")]
    pub release_date: String,
    pub text: String,
    pub link: String,
}

/// Body of a song creation request.
///
/// Missing fields decode as empty strings so that they are reported as empty
/// rather than as a malformed body.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct PayloadSong {
    pub song: String,
    pub group: String,
}

impl PayloadSong {
    pub fn has_empty_fields(&self) -> bool {
        self.song.trim().is_empty() || self.group.trim().is_empty()
    }
}

/// Details returned by the metadata service for a (song, group) pair.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SongInfo {
    #[serde(rename = "releaseDate")]
    pub release_date: String,
    pub text: String,
    pub link: String,
}

/// A song that has not been stored yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewSong {
    pub song: String,
    pub group: String,
    pub release_date: String,
    pub text: String,
    pub link: String,
}

impl NewSong {
    pub fn from_enrichment(payload: PayloadSong, info: SongInfo) -> Self {
        NewSong {
            song: payload.song,
            group: payload.group,
            release_date: info.release_date,
            text: info.text,
            link: info.link,
        }
    }

    pub fn into_song(self, song_id: i64) -> Song {
        Song {
            song_id,
            song: self.song,
            group: self.group,
            release_date: self.release_date,
            text: self.text,
            link: self.link,
        }
    }
}

/// Partial update of a song. Absent fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SongForUpdate {
    pub song: Option<String>,
    pub group: Option<String>,
    #[serde(rename = "releaseDate")]
    pub release_date: Option<String>,
    pub text: Option<String>,
    pub link: Option<String>,
}

impl SongForUpdate {
    pub fn is_empty(&self) -> bool {
        self.song.is_none()
            && self.group.is_none()
            && self.release_date.is_none()
            && self.text.is_none()
            && self.link.is_none()
    }
}

/// Substring filters for listing songs. Empty strings do not filter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SongFilter {
    pub name: String,
    pub group: String,
    pub date: String,
    pub text: String,
    pub link: String,
}
