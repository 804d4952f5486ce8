use album_catalog_server::catalog::{Album, CatalogStore, SqliteCatalogStore, User};
use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

/// Prints every user and album stored in a catalog database.
#[derive(Parser, Debug)]
struct CliArgs {
    #[clap(value_parser = parse_path)]
    pub db_path: PathBuf,
}

const RULE_WIDTH: usize = 60;

fn print_users(users: &[User]) {
    println!("\n[USERS]");
    if users.is_empty() {
        println!("  (no data)");
        return;
    }
    println!("Columns: id, username");
    println!("{}", "-".repeat(RULE_WIDTH));
    for user in users {
        println!("  ID: {}, Username: {}", user.id, user.username);
    }
}

fn display_optional<T: std::fmt::Display>(value: &Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "None".to_string(),
    }
}

fn print_albums(albums: &[Album]) {
    println!("\n[ALBUMS]");
    if albums.is_empty() {
        println!("  (no data)");
        return;
    }
    println!("Columns: id, title, normalized_title, barcode, artist, owner_id, year, genre, cover_url");
    println!("{}", "-".repeat(RULE_WIDTH));
    for album in albums {
        println!("  ID: {}", album.id);
        println!("  Title: {}", album.title);
        println!("  Normalized Title: {}", album.normalized_title);
        println!("  Barcode: {}", display_optional(&album.barcode));
        println!("  Artist: {}", display_optional(&album.artist));
        println!("  Owner ID: {}", album.owner_id);
        println!("  Year: {}", display_optional(&album.year));
        println!("  Genre: {}", display_optional(&album.genre));
        println!("  Cover URL: {}", display_optional(&album.cover_url));
        println!();
    }
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();
    if !cli_args.db_path.is_file() {
        bail!("No database at {:?}", cli_args.db_path);
    }
    let store = SqliteCatalogStore::new(&cli_args.db_path)?;

    println!("{}", "=".repeat(RULE_WIDTH));
    println!("Catalog database {:?}", cli_args.db_path);
    println!("{}", "=".repeat(RULE_WIDTH));

    print_users(&store.list_users()?);
    print_albums(&store.list_all_albums()?);
    Ok(())
}
