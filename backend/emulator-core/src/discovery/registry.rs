//! The set of currently discoverable emulator instances.

use crate::discovery::{metadata, paths};

use models::EmulatorInfo;

use std::collections::BTreeMap;
use std::fs;

use log::{debug, trace, warn};

/// Discovers emulators by scanning the published metadata files.
///
/// Every operation performs a fresh scan. Caching across calls would hide
/// emulator restarts, so there is none.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmulatorRegistry;

impl EmulatorRegistry {
    pub fn new() -> Self {
        Self
    }

    /// Number of valid records currently on disk.
    pub fn available(&self) -> usize {
        self.scan().len()
    }

    /// All records, ascending by pid.
    pub fn find_all(&self) -> Vec<EmulatorInfo> {
        self.scan().into_values().collect()
    }

    /// The record for a specific pid, if that emulator is publishing.
    pub fn find_by_pid(&self, pid: u32) -> Option<EmulatorInfo> {
        self.scan().remove(&pid)
    }

    /// The record with the lowest pid. Deterministic across runs, so a
    /// host with a single emulator always resolves to the same instance.
    pub fn default_emulator(&self) -> Option<EmulatorInfo> {
        self.scan().into_iter().next().map(|(_, info)| info)
    }

    fn scan(&self) -> BTreeMap<u32, EmulatorInfo> {
        let mut records: BTreeMap<u32, EmulatorInfo> = BTreeMap::new();

        for dir in paths::discovery_directories() {
            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Cannot enumerate {}: {e}", dir.display());
                    continue;
                }
            };

            for entry in entries.flatten() {
                let path = entry.path();
                if !path.is_file() || metadata::pid_from_file_name(&path).is_none() {
                    continue;
                }

                match metadata::parse_metadata_file(&path) {
                    Ok(info) => {
                        trace!("Found emulator pid {} via {}", info.pid, path.display());
                        // First directory in resolution order wins.
                        records.entry(info.pid).or_insert(info);
                    }
                    Err(e) => warn!("Skipping metadata file: {e}"),
                }
            }
        }

        debug!("Discovery scan found {} emulator(s)", records.len());
        records
    }
}
