use chrono::{DateTime, Local};

use crate::decor::{PresentationStyle, StylePass};
use crate::snapshot::{EncodedBitmap, Snapshot};

/// A gallery entry: a snapshot branded with its sequence index, the
/// position it was captured at.
#[derive(Clone, Debug)]
pub struct Photo {
    snapshot: Snapshot,
    sequence_index: u32,
}

impl Photo {
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn bitmap(&self) -> &EncodedBitmap {
        &self.snapshot.bitmap
    }

    pub fn taken_at(&self) -> DateTime<Local> {
        self.snapshot.taken_at
    }

    pub fn sequence_index(&self) -> u32 {
        self.sequence_index
    }
}

/// A photo dressed for display. The style is pass-scoped decoration, not
/// part of the photo's durable identity; the next pass may dress the same
/// photo differently.
#[derive(Clone, Copy)]
pub struct StyledPhoto<'a> {
    pub photo: &'a Photo,
    pub style: &'static PresentationStyle,
}

/// Ordered gallery. Indices are contiguous from 0 and strictly increasing;
/// `reset` restarts numbering, so they are monotonic between resets only.
#[derive(Default)]
pub struct PhotoCollection {
    photos: Vec<Photo>,
}

impl PhotoCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Brands the snapshot with the next index and returns it.
    pub fn append(&mut self, snapshot: Snapshot) -> u32 {
        let sequence_index = self.photos.len() as u32;
        self.photos.push(Photo {
            snapshot,
            sequence_index,
        });
        sequence_index
    }

    pub fn reset(&mut self) {
        self.photos.clear();
    }

    /// Ordered read-only view of the gallery.
    pub fn all(&self) -> &[Photo] {
        &self.photos
    }

    /// The ordered view dressed with one render pass's styling.
    pub fn styled_view(&self, pass: StylePass) -> Vec<StyledPhoto<'_>> {
        self.photos
            .iter()
            .map(|photo| StyledPhoto {
                photo,
                style: pass.style_for(photo.sequence_index()),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }
}
