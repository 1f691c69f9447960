//! Loader interface: anything that can produce a snapshot of parsed notes.

use crate::error::Result;
use crate::models::NoteEntry;

/// A source of parsed notes.
///
/// Returning an error aborts the analysis; there is no partial snapshot.
pub trait NoteSource {
    fn load_notes(&self) -> Result<Vec<NoteEntry>>;
}

impl NoteSource for Vec<NoteEntry> {
    fn load_notes(&self) -> Result<Vec<NoteEntry>> {
        Ok(self.clone())
    }
}

impl NoteSource for [NoteEntry] {
    fn load_notes(&self) -> Result<Vec<NoteEntry>> {
        Ok(self.to_vec())
    }
}

impl<T: NoteSource + ?Sized> NoteSource for &T {
    fn load_notes(&self) -> Result<Vec<NoteEntry>> {
        (**self).load_notes()
    }
}
