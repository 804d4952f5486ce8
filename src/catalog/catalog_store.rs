use super::error::CatalogResult;
use super::models::{Album, AlbumCheck, AlbumUpdate, CreatedUser, NewAlbum, User, UserId};

/// Durable storage for users and their albums.
///
/// Every method is atomic: a failing call leaves no partial write behind.
/// Per-owner uniqueness of normalized titles and barcodes is enforced here.
pub trait CatalogStore: Send + Sync {
    /// Creates a user, or returns the existing one with the same username.
    fn create_user(&self, username: &str) -> CatalogResult<CreatedUser>;

    /// Returns the user with the given id.
    /// Returns Err(UserNotFound) if there is no such user.
    fn get_user(&self, user_id: UserId) -> CatalogResult<User>;

    /// Deletes a user together with all of the user's albums.
    fn delete_user(&self, user_id: UserId) -> CatalogResult<()>;

    /// Returns every user, ordered by id.
    fn list_users(&self) -> CatalogResult<Vec<User>>;

    /// Adds an album for `owner_id` after checking title and barcode are not
    /// already used by another album of the same owner.
    fn add_album(&self, owner_id: UserId, album: &NewAlbum) -> CatalogResult<Album>;

    /// Returns the owner's albums ordered by title, optionally restricted to
    /// those whose normalized title contains the normalized `filter`.
    fn list_albums(&self, owner_id: UserId, filter: Option<&str>) -> CatalogResult<Vec<Album>>;

    /// Returns every album of every user, ordered by id.
    fn list_all_albums(&self) -> CatalogResult<Vec<Album>>;

    /// Looks for an album of the owner matching `title` (normalized) first,
    /// then `barcode`.
    fn check_album(
        &self,
        owner_id: UserId,
        title: Option<&str>,
        barcode: Option<&str>,
    ) -> CatalogResult<AlbumCheck>;

    /// Deletes an album, which must belong to `owner_id`.
    fn delete_album(&self, owner_id: UserId, album_id: i64) -> CatalogResult<()>;

    /// Applies a partial update to an album owned by `owner_id`.
    fn update_album(
        &self,
        owner_id: UserId,
        album_id: i64,
        update: &AlbumUpdate,
    ) -> CatalogResult<Album>;
}
