//! FAT storage on an SD card
//!
//! Thin adapter from the [`Storage`] trait to `embedded-sdmmc`. Paths are
//! `/`-separated 8.3 names relative to the root of the first partition;
//! every call opens the volume afresh and closes what it opened on return.

use core::fmt::Write;

use embedded_sdmmc::{
    BlockDevice, Directory, Mode, TimeSource, VolumeIdx, VolumeManager,
};
use horae_core::traits::{EntryList, EntryName, InitError, Storage};
use horae_core::Timestamp;

/// File timestamps for new or modified files
///
/// Taken once per wake from the RTC; the card only ever sees a handful of
/// writes per wake so a frozen time is close enough.
#[derive(Debug, Clone, Copy)]
pub struct FixedTime(pub Timestamp);

impl TimeSource for FixedTime {
    fn get_timestamp(&self) -> embedded_sdmmc::Timestamp {
        let t = &self.0;
        embedded_sdmmc::Timestamp {
            year_since_1970: t.year.saturating_sub(1970).min(255) as u8,
            zero_indexed_month: t.month.saturating_sub(1),
            zero_indexed_day: t.day.saturating_sub(1),
            hours: t.hour,
            minutes: t.minute,
            seconds: t.second,
        }
    }
}

/// Storage on the first FAT partition of a block device
pub struct SdStorage<D: BlockDevice, T: TimeSource> {
    mgr: VolumeManager<D, T>,
    mounted: bool,
}

/// Split a path into its directory components and final name
fn split_path(path: &str) -> (impl Iterator<Item = &str>, Option<&str>) {
    let trimmed = path.trim_matches('/');
    match trimmed.rfind('/') {
        Some(i) => (
            trimmed[..i].split('/').filter(|c| !c.is_empty()),
            Some(&trimmed[i + 1..]),
        ),
        None => (
            "".split('/').filter(|c| !c.is_empty()),
            (!trimmed.is_empty()).then_some(trimmed),
        ),
    }
}

/// Read a whole file into `buf` through `read`
///
/// `Ok(None)` when `buf` fills before `is_eof` reports the end, so a file
/// larger than the buffer is never mistaken for a complete one.
fn read_whole<E>(
    buf: &mut [u8],
    mut read: impl FnMut(&mut [u8]) -> Result<usize, E>,
    is_eof: impl Fn() -> bool,
) -> Result<Option<usize>, E> {
    let mut total = 0;
    while total < buf.len() && !is_eof() {
        match read(&mut buf[total..])? {
            0 => break,
            n => total += n,
        }
    }
    Ok((total < buf.len() || is_eof()).then_some(total))
}

impl<D: BlockDevice, T: TimeSource> SdStorage<D, T> {
    pub fn new(device: D, time: T) -> Self {
        Self {
            mgr: VolumeManager::new(device, time),
            mounted: false,
        }
    }

    /// Run `f` on the directory at `dirs` (components below the root)
    fn with_dir<'p, R, F>(
        &mut self,
        dirs: impl Iterator<Item = &'p str>,
        f: F,
    ) -> Result<R, embedded_sdmmc::Error<D::Error>>
    where
        F: FnOnce(&Directory<'_, D, T, 4, 4, 1>) -> Result<R, embedded_sdmmc::Error<D::Error>>,
    {
        let volume = self.mgr.open_volume(VolumeIdx(0))?;
        let mut dir = volume.open_root_dir()?;
        for name in dirs {
            dir = dir.open_dir(name)?;
        }
        f(&dir)
    }
}

impl<D: BlockDevice, T: TimeSource> Storage for SdStorage<D, T> {
    fn init(&mut self) -> Result<(), InitError> {
        self.mounted = self.mgr.open_volume(VolumeIdx(0)).is_ok();
        if self.mounted {
            Ok(())
        } else {
            Err(InitError::NotFound)
        }
    }

    fn list_entries(&mut self, path: &str) -> EntryList {
        let mut entries = EntryList::new();
        if !self.mounted {
            return entries;
        }
        let (dirs, last) = split_path(path);
        let _ = self.with_dir(dirs.chain(last), |dir| {
            dir.iterate_dir(|entry| {
                if entry.attributes.is_volume() {
                    return;
                }
                let mut name = EntryName::new();
                if write!(name, "{}", entry.name).is_ok() && name != "." && name != ".." {
                    // Extra entries beyond the list capacity are dropped
                    let _ = entries.push(name);
                }
            })
        });
        entries
    }

    fn read_all(&mut self, path: &str, buf: &mut [u8]) -> Option<usize> {
        if !self.mounted {
            return None;
        }
        let (dirs, name) = split_path(path);
        let name = name?;
        self.with_dir(dirs, |dir| {
            let file = dir.open_file_in_dir(name, Mode::ReadOnly)?;
            read_whole(buf, |chunk| file.read(chunk), || file.is_eof())
        })
        .ok()
        .flatten()
    }

    fn write_all(&mut self, path: &str, data: &[u8]) -> bool {
        if !self.mounted {
            return false;
        }
        let (dirs, name) = split_path(path);
        let Some(name) = name else {
            return false;
        };
        self.with_dir(dirs, |dir| {
            let file = dir.open_file_in_dir(name, Mode::ReadWriteCreateOrTruncate)?;
            file.write(data)?;
            file.flush()
        })
        .is_ok()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::vec::Vec;

    fn split(path: &str) -> (Vec<&str>, Option<&str>) {
        let (dirs, name) = split_path(path);
        (dirs.collect(), name)
    }

    #[test]
    fn test_split_path() {
        assert_eq!(split("/HORAE.TOM"), (Vec::new(), Some("HORAE.TOM")));
        assert_eq!(split("HORAE.TOM"), (Vec::new(), Some("HORAE.TOM")));
        assert_eq!(split("/CONF/OLD/A.TXT"), (std::vec!["CONF", "OLD"], Some("A.TXT")));
        assert_eq!(split("/"), (Vec::new(), None));
        assert_eq!(split(""), (Vec::new(), None));
        assert_eq!(split("//CONF//A.TXT"), (std::vec!["CONF"], Some("A.TXT")));
    }

    /// Reads `data` in chunks of at most `chunk` bytes
    fn read_file(data: &[u8], chunk: usize, buf: &mut [u8]) -> Option<usize> {
        let pos = core::cell::Cell::new(0);
        read_whole::<()>(
            buf,
            |out| {
                let start = pos.get();
                let n = out.len().min(chunk).min(data.len() - start);
                out[..n].copy_from_slice(&data[start..start + n]);
                pos.set(start + n);
                Ok(n)
            },
            || pos.get() == data.len(),
        )
        .unwrap()
    }

    #[test]
    fn test_read_whole_file() {
        let data: Vec<u8> = (0..100u8).collect();
        let mut buf = [0u8; 128];
        assert_eq!(read_file(&data, 32, &mut buf), Some(100));
        assert_eq!(&buf[..100], &data[..]);
    }

    #[test]
    fn test_read_exact_fit() {
        let data = [7u8; 64];
        let mut buf = [0u8; 64];
        assert_eq!(read_file(&data, 512, &mut buf), Some(64));
    }

    #[test]
    fn test_read_file_larger_than_buffer() {
        let data = std::vec![b'x'; 5000];
        let mut buf = [0u8; 4097];
        assert_eq!(read_file(&data, 512, &mut buf), None);
    }

    #[test]
    fn test_read_empty_file() {
        let mut buf = [0u8; 16];
        assert_eq!(read_file(&[], 512, &mut buf), Some(0));
    }

    #[test]
    fn test_fixed_time_conversion() {
        let ts = FixedTime(Timestamp::new(2024, 5, 17, 14, 37, 50)).get_timestamp();
        assert_eq!(ts.year_since_1970, 54);
        assert_eq!(ts.zero_indexed_month, 4);
        assert_eq!(ts.zero_indexed_day, 16);
        assert_eq!((ts.hours, ts.minutes, ts.seconds), (14, 37, 50));
    }
}
