//! File storage trait
//!
//! Not used by the render cycle. The firmware reads an optional
//! configuration override through it.

use heapless::{String, Vec};

use super::InitError;

/// Longest entry name returned by a listing (8.3 names fit comfortably)
pub const MAX_ENTRY_NAME_LEN: usize = 16;

/// Most entries returned by one listing
pub const MAX_ENTRIES: usize = 32;

/// A single directory entry name
pub type EntryName = String<MAX_ENTRY_NAME_LEN>;

/// Entries of a directory
pub type EntryList = Vec<EntryName, MAX_ENTRIES>;

/// Trait for a small file store
pub trait Storage {
    /// Mount the medium
    fn init(&mut self) -> Result<(), InitError>;

    /// Names in the directory at `path`
    ///
    /// Returns an empty list if the directory cannot be read. Listings longer
    /// than [`MAX_ENTRIES`] are truncated.
    fn list_entries(&mut self, path: &str) -> EntryList;

    /// Read the whole file at `path` into `buf`
    ///
    /// Returns the number of bytes read, or `None` if the file is missing,
    /// unreadable or larger than `buf`.
    fn read_all(&mut self, path: &str, buf: &mut [u8]) -> Option<usize>;

    /// Replace the file at `path` with `data`
    fn write_all(&mut self, path: &str, data: &[u8]) -> bool;
}
