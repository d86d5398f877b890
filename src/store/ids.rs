//! Tag id generation

use super::types::Tag;
use rand::RngCore;
use rand::rngs::OsRng;

/// Source of candidate tag ids
///
/// Candidates do not need to be unique; the store retries until it gets one
/// that no existing tag uses.
pub trait IdSource: Send {
    fn next_id(&mut self) -> String;
}

/// 8 lowercase hex characters from the operating system RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandomIds;

impl IdSource for OsRandomIds {
    fn next_id(&mut self) -> String {
        let mut bytes = [0u8; 4];
        OsRng.fill_bytes(&mut bytes);
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}

pub(crate) fn unique_id(source: &mut dyn IdSource, existing: &[Tag]) -> String {
    loop {
        let candidate = source.next_id();
        if existing.iter().all(|tag| tag.id != candidate) {
            return candidate;
        }
        log::debug!("Tag id {candidate} already in use, regenerating");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Scripted(Vec<&'static str>);

    impl IdSource for Scripted {
        fn next_id(&mut self) -> String {
            self.0.remove(0).to_string()
        }
    }

    #[test]
    fn test_os_random_ids_shape() {
        let mut source = OsRandomIds;
        for _ in 0..32 {
            let id = source.next_id();
            assert_eq!(id.len(), 8);
            assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn test_unique_id_skips_existing() {
        let existing = vec![Tag::new("aaaaaaaa", "a", "#000000"), Tag::new("bbbbbbbb", "b", "#ffffff")];
        let mut source = Scripted(vec!["aaaaaaaa", "bbbbbbbb", "cccccccc"]);

        assert_eq!(unique_id(&mut source, &existing), "cccccccc");
        assert!(source.0.is_empty());
    }
}
