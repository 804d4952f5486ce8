use super::catalog_store::CatalogStore;
use super::error::{read_error, write_error, CatalogError, CatalogResult};
use super::models::{Album, AlbumCheck, AlbumUpdate, CreatedUser, NewAlbum, User, UserId};
use super::normalize::normalize_title;
use super::validation::{validate_album_update, validate_new_album, validate_username};
use crate::sqlite_column;
use crate::sqlite_persistence::{
    open_versioned_db, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
};
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Params, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// V 0
const USERS_TABLE_V_0: Table = Table {
    name: "users",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "username",
            &SqlType::Text,
            non_null = true,
            is_unique = true
        ),
    ],
    indices: &[("ix_users_username", "username")],
    unique_constraints: &[],
};
const ALBUMS_TABLE_V_0: Table = Table {
    name: "albums",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("normalized_title", &SqlType::Text, non_null = true),
        sqlite_column!("barcode", &SqlType::Text),
        sqlite_column!("artist", &SqlType::Text),
        sqlite_column!(
            "owner_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "users",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!("year", &SqlType::Integer),
        sqlite_column!("genre", &SqlType::Text),
        sqlite_column!("cover_url", &SqlType::Text),
    ],
    indices: &[
        ("ix_albums_title", "title"),
        ("ix_albums_owner", "owner_id"),
        ("ix_owner_title", "owner_id, normalized_title"),
        ("ix_owner_barcode", "owner_id, barcode"),
    ],
    unique_constraints: &[&["owner_id", "normalized_title"], &["owner_id", "barcode"]],
};

pub const VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[USERS_TABLE_V_0, ALBUMS_TABLE_V_0],
}];

const ALBUM_COLUMNS: &str =
    "id, title, normalized_title, barcode, artist, owner_id, year, genre, cover_url";

fn album_from_row(row: &Row) -> rusqlite::Result<Album> {
    Ok(Album {
        id: row.get(0)?,
        title: row.get(1)?,
        normalized_title: row.get(2)?,
        barcode: row.get(3)?,
        artist: row.get(4)?,
        owner_id: row.get(5)?,
        year: row.get(6)?,
        genre: row.get(7)?,
        cover_url: row.get(8)?,
    })
}

fn user_from_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
    })
}

fn find_user(conn: &Connection, user_id: UserId) -> CatalogResult<Option<User>> {
    conn.query_row(
        "SELECT id, username FROM users WHERE id = ?1",
        params![user_id],
        user_from_row,
    )
    .optional()
    .map_err(read_error)
}

fn require_user(conn: &Connection, user_id: UserId) -> CatalogResult<User> {
    find_user(conn, user_id)?.ok_or(CatalogError::UserNotFound)
}

fn find_user_by_username(conn: &Connection, username: &str) -> CatalogResult<Option<User>> {
    conn.query_row(
        "SELECT id, username FROM users WHERE username = ?1",
        params![username],
        user_from_row,
    )
    .optional()
    .map_err(read_error)
}

fn find_owned_album(
    conn: &Connection,
    owner_id: UserId,
    album_id: i64,
) -> CatalogResult<Option<Album>> {
    conn.query_row(
        &format!(
            "SELECT {} FROM albums WHERE id = ?1 AND owner_id = ?2",
            ALBUM_COLUMNS
        ),
        params![album_id, owner_id],
        album_from_row,
    )
    .optional()
    .map_err(read_error)
}

/// Finds an album of `owner_id` whose `column` equals `value`, ignoring the
/// album with id `excluding` if given.
fn find_album_by(
    conn: &Connection,
    owner_id: UserId,
    column: &'static str,
    value: &str,
    excluding: Option<i64>,
) -> CatalogResult<Option<Album>> {
    conn.query_row(
        &format!(
            "SELECT {} FROM albums WHERE owner_id = ?1 AND {} = ?2 AND (?3 IS NULL OR id != ?3)",
            ALBUM_COLUMNS, column
        ),
        params![owner_id, value, excluding],
        album_from_row,
    )
    .optional()
    .map_err(read_error)
}

fn find_album_by_normalized_title(
    conn: &Connection,
    owner_id: UserId,
    normalized_title: &str,
    excluding: Option<i64>,
) -> CatalogResult<Option<Album>> {
    find_album_by(conn, owner_id, "normalized_title", normalized_title, excluding)
}

fn find_album_by_barcode(
    conn: &Connection,
    owner_id: UserId,
    barcode: &str,
    excluding: Option<i64>,
) -> CatalogResult<Option<Album>> {
    find_album_by(conn, owner_id, "barcode", barcode, excluding)
}

fn query_albums<P: Params>(conn: &Connection, sql: &str, params: P) -> CatalogResult<Vec<Album>> {
    let mut stmt = conn.prepare(sql).map_err(read_error)?;
    let albums = stmt
        .query_map(params, album_from_row)
        .map_err(read_error)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_error)?;
    Ok(albums)
}

#[derive(Clone)]
pub struct SqliteCatalogStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCatalogStore {
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self> {
        let conn = open_versioned_db(db_path.as_ref(), VERSIONED_SCHEMAS)?;
        Ok(SqliteCatalogStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// The connection is held for the duration of a single operation and
    /// released when the guard drops. An interrupted transaction has already
    /// been rolled back by then, so a poisoned lock is safe to reuse.
    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CatalogStore for SqliteCatalogStore {
    fn create_user(&self, username: &str) -> CatalogResult<CreatedUser> {
        validate_username(username)?;

        let mut conn = self.lock();
        let tx = conn
            .transaction()
            .map_err(write_error("Failed to create user"))?;

        if let Some(user) = find_user_by_username(&tx, username)? {
            debug!("User {} already exists with id {}", username, user.id);
            return Ok(CreatedUser {
                user,
                is_new: false,
            });
        }

        tx.execute(
            "INSERT INTO users (username) VALUES (?1)",
            params![username],
        )
        .map_err(write_error("Failed to create user"))?;
        let user = User {
            id: tx.last_insert_rowid(),
            username: username.to_string(),
        };
        tx.commit().map_err(write_error("Failed to create user"))?;

        info!("Created user {} with id {}", user.username, user.id);
        Ok(CreatedUser { user, is_new: true })
    }

    fn get_user(&self, user_id: UserId) -> CatalogResult<User> {
        require_user(&self.lock(), user_id)
    }

    fn delete_user(&self, user_id: UserId) -> CatalogResult<()> {
        let deleted = self
            .lock()
            .execute("DELETE FROM users WHERE id = ?1", params![user_id])
            .map_err(write_error("Failed to delete user"))?;
        if deleted == 0 {
            return Err(CatalogError::UserNotFound);
        }
        info!("Deleted user {} and all of their albums", user_id);
        Ok(())
    }

    fn list_users(&self) -> CatalogResult<Vec<User>> {
        let conn = self.lock();
        let mut stmt = conn
            .prepare("SELECT id, username FROM users ORDER BY id ASC")
            .map_err(read_error)?;
        let users = stmt
            .query_map([], user_from_row)
            .map_err(read_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(read_error)?;
        Ok(users)
    }

    fn add_album(&self, owner_id: UserId, album: &NewAlbum) -> CatalogResult<Album> {
        validate_new_album(album)?;
        let title = album.title.as_deref().filter(|t| !t.is_empty());
        let barcode = album.barcode.as_deref().filter(|b| !b.is_empty());

        let mut conn = self.lock();
        let tx = conn
            .transaction()
            .map_err(write_error("Failed to save album"))?;

        require_user(&tx, owner_id)?;

        // Without a title the barcode doubles as the display title
        let (stored_title, normalized_title) = match (title, barcode) {
            (Some(title), _) => (title, normalize_title(title)),
            (None, Some(barcode)) => (barcode, String::new()),
            (None, None) => return Err(CatalogError::missing_title_and_barcode()),
        };

        if title.is_some()
            && find_album_by_normalized_title(&tx, owner_id, &normalized_title, None)?.is_some()
        {
            return Err(CatalogError::DuplicateTitle);
        }
        if let Some(barcode) = barcode {
            if find_album_by_barcode(&tx, owner_id, barcode, None)?.is_some() {
                return Err(CatalogError::DuplicateBarcode);
            }
        }

        tx.execute(
            "INSERT INTO albums (title, normalized_title, barcode, artist, owner_id, year, genre, cover_url) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                stored_title,
                normalized_title,
                barcode,
                album.artist,
                owner_id,
                album.year,
                album.genre,
                album.cover_url
            ],
        )
        .map_err(write_error("Failed to save album"))?;

        let saved = Album {
            id: tx.last_insert_rowid(),
            title: stored_title.to_string(),
            normalized_title,
            barcode: barcode.map(str::to_string),
            artist: album.artist.clone(),
            owner_id,
            year: album.year,
            genre: album.genre.clone(),
            cover_url: album.cover_url.clone(),
        };
        tx.commit().map_err(write_error("Failed to save album"))?;

        debug!("User {} saved album {} ({:?})", owner_id, saved.id, saved.title);
        Ok(saved)
    }

    fn list_albums(&self, owner_id: UserId, filter: Option<&str>) -> CatalogResult<Vec<Album>> {
        let conn = self.lock();
        require_user(&conn, owner_id)?;

        match filter.map(normalize_title).filter(|f| !f.is_empty()) {
            Some(needle) => query_albums(
                &conn,
                &format!(
                    "SELECT {} FROM albums WHERE owner_id = ?1 AND instr(normalized_title, ?2) > 0 \
                     ORDER BY title ASC, id ASC",
                    ALBUM_COLUMNS
                ),
                params![owner_id, needle],
            ),
            None => query_albums(
                &conn,
                &format!(
                    "SELECT {} FROM albums WHERE owner_id = ?1 ORDER BY title ASC, id ASC",
                    ALBUM_COLUMNS
                ),
                params![owner_id],
            ),
        }
    }

    fn list_all_albums(&self) -> CatalogResult<Vec<Album>> {
        query_albums(
            &self.lock(),
            &format!("SELECT {} FROM albums ORDER BY id ASC", ALBUM_COLUMNS),
            [],
        )
    }

    fn check_album(
        &self,
        owner_id: UserId,
        title: Option<&str>,
        barcode: Option<&str>,
    ) -> CatalogResult<AlbumCheck> {
        let title = title.filter(|t| !t.is_empty());
        let barcode = barcode.filter(|b| !b.is_empty());

        let conn = self.lock();
        require_user(&conn, owner_id)?;
        if title.is_none() && barcode.is_none() {
            return Err(CatalogError::missing_title_and_barcode());
        }

        let mut album = None;
        if let Some(title) = title {
            album = find_album_by_normalized_title(&conn, owner_id, &normalize_title(title), None)?;
        }
        if album.is_none() {
            if let Some(barcode) = barcode {
                album = find_album_by_barcode(&conn, owner_id, barcode, None)?;
            }
        }
        Ok(album.into())
    }

    fn delete_album(&self, owner_id: UserId, album_id: i64) -> CatalogResult<()> {
        let deleted = self
            .lock()
            .execute(
                "DELETE FROM albums WHERE id = ?1 AND owner_id = ?2",
                params![album_id, owner_id],
            )
            .map_err(write_error("Failed to delete album"))?;
        if deleted == 0 {
            return Err(CatalogError::AlbumNotFound);
        }
        debug!("User {} deleted album {}", owner_id, album_id);
        Ok(())
    }

    fn update_album(
        &self,
        owner_id: UserId,
        album_id: i64,
        update: &AlbumUpdate,
    ) -> CatalogResult<Album> {
        validate_album_update(update)?;

        let mut conn = self.lock();
        let tx = conn
            .transaction()
            .map_err(write_error("Failed to update album"))?;

        let mut album =
            find_owned_album(&tx, owner_id, album_id)?.ok_or(CatalogError::AlbumNotFound)?;
        if update.is_empty() {
            return Err(CatalogError::no_changes());
        }

        if let Some(title) = &update.title {
            let normalized_title = normalize_title(title);
            if find_album_by_normalized_title(&tx, owner_id, &normalized_title, Some(album_id))?
                .is_some()
            {
                return Err(CatalogError::DuplicateTitle);
            }
            album.title = title.clone();
            album.normalized_title = normalized_title;
        }
        match update.barcode.as_deref() {
            // An empty barcode clears it, same as storing NULL on add
            Some("") => album.barcode = None,
            Some(barcode) => {
                if find_album_by_barcode(&tx, owner_id, barcode, Some(album_id))?.is_some() {
                    return Err(CatalogError::DuplicateBarcode);
                }
                album.barcode = Some(barcode.to_string());
            }
            None => {}
        }
        if let Some(artist) = &update.artist {
            album.artist = Some(artist.clone());
        }
        if let Some(year) = update.year {
            album.year = Some(year);
        }
        if let Some(genre) = &update.genre {
            album.genre = Some(genre.clone());
        }
        if let Some(cover_url) = &update.cover_url {
            album.cover_url = Some(cover_url.clone());
        }

        tx.execute(
            "UPDATE albums SET title = ?1, normalized_title = ?2, barcode = ?3, artist = ?4, \
             year = ?5, genre = ?6, cover_url = ?7 WHERE id = ?8",
            params![
                album.title,
                album.normalized_title,
                album.barcode,
                album.artist,
                album.year,
                album.genre,
                album.cover_url,
                album.id
            ],
        )
        .map_err(write_error("Failed to update album"))?;
        tx.commit().map_err(write_error("Failed to update album"))?;

        debug!("User {} updated album {}", owner_id, album_id);
        Ok(album)
    }
}
