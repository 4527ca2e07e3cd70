//! The in-memory session key.

use std::fmt;

use zeroize::Zeroize;

/// Length of the session key (256 bits, for AES-256-GCM).
pub const KEY_LEN: usize = 32;

/// A 32-byte AES key derived from the Calm Code.
///
/// Lives only in memory while the journal is unlocked and wipes its
/// bytes when dropped. It is deliberately neither `Clone` nor
/// serializable.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct SessionKey {
    bytes: [u8; KEY_LEN],
}

impl SessionKey {
    /// Wrap raw key bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Access the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionKey(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_does_not_leak_bytes() {
        let key = SessionKey::new([0x41; KEY_LEN]);
        assert_eq!(format!("{key:?}"), "SessionKey(..)");
    }
}
