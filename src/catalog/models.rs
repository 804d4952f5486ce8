use serde::{Deserialize, Serialize};

pub type UserId = i64;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
}

/// Outcome of an idempotent user creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatedUser {
    pub user: User,
    /// False when a user with the same username already existed.
    pub is_new: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: i64,
    pub title: String,
    /// Comparison key derived from `title`, never exposed over the API.
    #[serde(skip)]
    pub normalized_title: String,
    pub barcode: Option<String>,
    pub artist: Option<String>,
    pub owner_id: UserId,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub cover_url: Option<String>,
}

/// Fields accepted when adding an album. At least one of `title` and
/// `barcode` must be non-empty.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewAlbum {
    pub title: Option<String>,
    pub barcode: Option<String>,
    pub artist: Option<String>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub cover_url: Option<String>,
}

/// Partial update of an album; `None` leaves the field untouched.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AlbumUpdate {
    pub title: Option<String>,
    pub barcode: Option<String>,
    pub artist: Option<String>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub cover_url: Option<String>,
}

impl AlbumUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.barcode.is_none()
            && self.artist.is_none()
            && self.year.is_none()
            && self.genre.is_none()
            && self.cover_url.is_none()
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct AlbumCheck {
    pub exists: bool,
    pub album: Option<Album>,
}

impl From<Option<Album>> for AlbumCheck {
    fn from(album: Option<Album>) -> Self {
        AlbumCheck {
            exists: album.is_some(),
            album,
        }
    }
}
