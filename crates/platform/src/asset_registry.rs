//! Read-only registry of embedded built-in sounds, used as a fallback when a
//! sound id has no matching file in persistent storage.

/// One embedded sound: a numeric id, its raw WAV bytes, and a display name.
#[derive(Debug, Clone, Copy)]
pub struct AssetEntry {
    /// The sound id this entry answers for.
    pub sound_id: u16,
    /// Raw WAV file bytes, compiled into the binary.
    pub bytes: &'static [u8],
    /// Human-readable name, for logs/diagnostics.
    pub name: &'static str,
}

/// Read-only lookup from sound id to embedded asset.
pub trait AssetRegistry {
    /// Look up `sound_id`, returning its bytes and name if present.
    fn lookup(&self, sound_id: u16) -> Option<AssetEntry>;
}

/// A fixed, compile-time table of [`AssetEntry`] values.
///
/// Lookup is linear; the table is expected to hold at most a few dozen
/// entries, so this is simpler and smaller than a hash map.
pub struct StaticAssetRegistry {
    entries: &'static [AssetEntry],
}

impl StaticAssetRegistry {
    /// Wrap a static table of entries.
    #[must_use]
    pub const fn new(entries: &'static [AssetEntry]) -> Self {
        Self { entries }
    }
}

impl AssetRegistry for StaticAssetRegistry {
    fn lookup(&self, sound_id: u16) -> Option<AssetEntry> {
        self.entries.iter().copied().find(|e| e.sound_id == sound_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    static ENTRIES: &[AssetEntry] = &[
        AssetEntry { sound_id: 10, bytes: &[0u8; 4], name: "chime" },
        AssetEntry { sound_id: 20, bytes: &[0u8; 8], name: "alert" },
    ];

    #[test]
    fn lookup_finds_existing_entry() {
        let reg = StaticAssetRegistry::new(ENTRIES);
        let found = reg.lookup(20).expect("entry 20 present");
        assert_eq!(found.name, "alert");
    }

    #[test]
    fn lookup_missing_returns_none() {
        let reg = StaticAssetRegistry::new(ENTRIES);
        assert!(reg.lookup(999).is_none());
    }
}
