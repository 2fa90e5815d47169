use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A flag shared between an import and whoever may want to stop it. Clones share the same flag, so
/// one clone can be handed to another thread and set there while the import runs.
///
/// The importer only looks at the flag between tracks, so a cancelled import still finishes the
/// track it is working on before returning [`crate::ImportError::Cancelled`].
#[derive(Clone, Debug, Default)]
pub struct CancelFlag {
    flag: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask any import watching this flag to stop.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Clear the flag so that it can be used for another import.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::Relaxed);
    }
}

#[test]
fn clones_share_the_flag() {
    let flag = CancelFlag::new();
    let other = flag.clone();
    assert!(!flag.is_cancelled());
    std::thread::spawn(move || other.cancel()).join().unwrap();
    assert!(flag.is_cancelled());
    flag.reset();
    assert!(!flag.is_cancelled());
}
