use colored::Colorize;
use serde::Serialize;

use crate::error::SpotlinkError;
use crate::types::{Artist, CursorPaging, Paging, SavedTrack, SearchResult, Track, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Pretty,
    Json,
}

impl OutputMode {
    pub fn from_flag(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Pretty
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

fn label(text: &str, is_tty: bool) -> String {
    if is_tty {
        text.dimmed().to_string()
    } else {
        text.to_string()
    }
}

fn heading(text: &str, is_tty: bool) -> String {
    if is_tty {
        text.bold().cyan().to_string()
    } else {
        text.to_string()
    }
}

/// `215000` -> `3:35`.
pub fn format_duration(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{}:{:02}", secs / 60, secs % 60)
}

pub fn print_user(user: &User, mode: OutputMode, is_tty: bool) {
    if mode == OutputMode::Json {
        return print_json(user);
    }
    println!("{}", heading(user.name(), is_tty));
    println!("  {}: {}", label("ID", is_tty), user.id);
    if let Some(ref email) = user.email {
        println!("  {}: {}", label("Email", is_tty), email);
    }
    if let Some(ref country) = user.country {
        println!("  {}: {}", label("Country", is_tty), country);
    }
    if let Some(ref product) = user.product {
        println!("  {}: {}", label("Plan", is_tty), product);
    }
    println!("  {}: {}", label("Followers", is_tty), user.followers.total);
}

fn track_line(index: usize, track: &Track, is_tty: bool) -> String {
    let name = if is_tty {
        track.name.bold().to_string()
    } else {
        track.name.clone()
    };
    let explicit = if track.explicit { " [E]" } else { "" };
    format!(
        "{:>3}. {}{} - {} ({}) {}",
        index + 1,
        name,
        explicit,
        track.artist_names(),
        track.album.name,
        label(&format_duration(track.duration_ms), is_tty),
    )
}

pub fn print_tracks(tracks: &[Track], mode: OutputMode, is_tty: bool) {
    if mode == OutputMode::Json {
        return print_json(tracks);
    }
    if tracks.is_empty() {
        println!("No tracks.");
        return;
    }
    for (i, track) in tracks.iter().enumerate() {
        println!("{}", track_line(i, track, is_tty));
    }
}

pub fn print_track(track: &Track, mode: OutputMode, is_tty: bool) {
    if mode == OutputMode::Json {
        return print_json(track);
    }
    println!("{}", heading(&track.name, is_tty));
    if let Some(ref id) = track.id {
        println!("  {}: {}", label("ID", is_tty), id);
    }
    println!("  {}: {}", label("Artists", is_tty), track.artist_names());
    println!("  {}: {}", label("Album", is_tty), track.album.name);
    println!(
        "  {}: {}",
        label("Duration", is_tty),
        format_duration(track.duration_ms)
    );
    if let Some(popularity) = track.popularity {
        println!("  {}: {}", label("Popularity", is_tty), popularity);
    }
    if let Some(url) = track.external_url() {
        println!("  {}: {}", label("URL", is_tty), url);
    }
}

pub fn print_saved(page: &Paging<SavedTrack>, mode: OutputMode, is_tty: bool) {
    if mode == OutputMode::Json {
        return print_json(page);
    }
    if page.items.is_empty() {
        println!("No saved tracks.");
        return;
    }
    for (i, saved) in page.items.iter().enumerate() {
        println!(
            "{}  {}",
            track_line(page.offset as usize + i, &saved.track, is_tty),
            label(&saved.added_at.format("%Y-%m-%d").to_string(), is_tty)
        );
    }
    println!(
        "{}",
        label(
            &format!("{} of {} saved tracks", page.items.len(), page.total),
            is_tty
        )
    );
}

pub fn print_artist(artist: &Artist, mode: OutputMode, is_tty: bool) {
    if mode == OutputMode::Json {
        return print_json(artist);
    }
    println!("{}", heading(&artist.name, is_tty));
    println!("  {}: {}", label("ID", is_tty), artist.id);
    if !artist.genres.is_empty() {
        println!("  {}: {}", label("Genres", is_tty), artist.genres.join(", "));
    }
    if let Some(ref followers) = artist.followers {
        println!("  {}: {}", label("Followers", is_tty), followers.total);
    }
    if let Some(popularity) = artist.popularity {
        println!("  {}: {}", label("Popularity", is_tty), popularity);
    }
}

pub fn print_followed(page: &CursorPaging<Artist>, mode: OutputMode, is_tty: bool) {
    if mode == OutputMode::Json {
        return print_json(page);
    }
    if page.items.is_empty() {
        println!("Not following any artists.");
        return;
    }
    for (i, artist) in page.items.iter().enumerate() {
        let name = if is_tty {
            artist.name.bold().to_string()
        } else {
            artist.name.clone()
        };
        println!("{:>3}. {} {}", i + 1, name, label(&artist.id, is_tty));
    }
}

pub fn print_search(result: &SearchResult, mode: OutputMode, is_tty: bool) {
    if mode == OutputMode::Json {
        return print_json(result);
    }
    if result.is_empty() {
        println!("No results.");
        return;
    }
    if let Some(ref tracks) = result.tracks {
        print_tracks(&tracks.items, mode, is_tty);
    }
    if let Some(ref artists) = result.artists {
        for (i, artist) in artists.items.iter().enumerate() {
            println!("{:>3}. {} {}", i + 1, artist.name, label(&artist.id, is_tty));
        }
    }
    if let Some(ref albums) = result.albums {
        for (i, album) in albums.items.iter().enumerate() {
            let artists = album
                .artists
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            println!("{:>3}. {} - {} {}", i + 1, album.name, artists, label(&album.id, is_tty));
        }
    }
    if let Some(ref playlists) = result.playlists {
        for (i, playlist) in playlists.items.iter().flatten().enumerate() {
            println!(
                "{:>3}. {} ({} tracks) {}",
                i + 1,
                playlist.name,
                playlist.tracks.total,
                label(&playlist.id, is_tty)
            );
        }
    }
}

/// Membership checks: one `id: yes|no` line per id, or an `{id: bool}` object.
pub fn print_contains(ids: &[String], flags: &[bool], mode: OutputMode, is_tty: bool) {
    if mode == OutputMode::Json {
        let map: serde_json::Map<String, serde_json::Value> = ids
            .iter()
            .zip(flags)
            .map(|(id, flag)| (id.clone(), serde_json::Value::Bool(*flag)))
            .collect();
        return print_json(&map);
    }
    for (id, flag) in ids.iter().zip(flags) {
        let answer = match (*flag, is_tty) {
            (true, true) => "yes".green().to_string(),
            (false, true) => "no".red().to_string(),
            (true, false) => "yes".to_string(),
            (false, false) => "no".to_string(),
        };
        println!("{}: {}", id, answer);
    }
}

/// Acknowledge a command endpoint that returns nothing.
pub fn print_done(message: &str, mode: OutputMode, is_tty: bool) {
    match mode {
        OutputMode::Json => print_json(&serde_json::json!({ "ok": true })),
        OutputMode::Pretty if is_tty => println!("{}", message.green()),
        OutputMode::Pretty => println!("{}", message),
    }
}

pub fn print_error(err: &SpotlinkError, json_mode: bool) {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&err.to_json()).unwrap_or_default());
    } else {
        eprintln!("Error: {}", err);
    }
}
