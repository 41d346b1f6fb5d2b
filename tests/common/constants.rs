//! Shared constants for end-to-end tests
//!
//! This module contains all constants used across the test suite.
//! When the fake metadata service data changes, update only this file.

#![allow(dead_code)]

// ============================================================================
// Songs known to the fake metadata service
// ============================================================================

pub const SONG_1_NAME: &str = "Supermassive Black Hole";
pub const SONG_1_GROUP: &str = "Muse";
pub const SONG_1_RELEASE_DATE: &str = "16.07.2006";
pub const SONG_1_TEXT: &str = "Ooh baby, don't you know I suffer?\nOoh baby, can you hear me moan?\n\nYou caught me under false pretenses\nHow long before you let me go?\n\nOoh\nYou set my soul alight";
pub const SONG_1_LINK: &str = "https://www.youtube.com/watch?v=Xsp3_a-PMTw";
pub const SONG_1_VERSES: usize = 3;

pub const SONG_2_NAME: &str = "Hysteria";
pub const SONG_2_GROUP: &str = "Muse";
pub const SONG_2_RELEASE_DATE: &str = "01.12.2003";
pub const SONG_2_TEXT: &str = "It's bugging me\nGrating me\n\nAnd twisting me around";
pub const SONG_2_LINK: &str = "https://www.youtube.com/watch?v=3dm_5qWWDV8";

pub const SONG_3_NAME: &str = "Кукла колдуна";
pub const SONG_3_GROUP: &str = "Король и Шут";
pub const SONG_3_RELEASE_DATE: &str = "1998";
pub const SONG_3_TEXT: &str = "Тёмный, мрачный коридор";
pub const SONG_3_LINK: &str = "https://example.com/kish";

/// Song for which the fake metadata service answers with a server error
pub const BROKEN_SONG_NAME: &str = "Unreleased Demo";

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for server to become ready
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Interval between readiness checks
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 20;

/// Request timeout for the test client
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
