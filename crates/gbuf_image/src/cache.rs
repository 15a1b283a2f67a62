//! Frame-scoped bitmap cache
//!
//! Entries live for one frame: [`ImageCache::begin_frame`] drops them all
//! and bumps the generation. A decode handed out as a [`PendingDecode`]
//! carries a [`DecodeTicket`]; its completion is accepted only while that
//! ticket still names the current entry for its id.

use std::sync::Arc;

use gbuf_paint::{Bitmap, Rect};
use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::payload::ImagePayload;

/// Identifies one decode request within one frame generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodeTicket {
    generation: u64,
    serial: u64,
}

impl DecodeTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// A blit waiting on a pending decode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeferredDraw {
    /// Device-space destination, already normalized
    pub dest: Rect,
}

/// Decode work handed to the caller
#[derive(Debug, Clone)]
pub struct PendingDecode {
    pub id: String,
    pub ticket: DecodeTicket,
    pub payload: ImagePayload,
}

impl PendingDecode {
    /// Run the decode on the current thread
    pub fn decode(self) -> Result<DecodedImage> {
        let bitmap = self.payload.decode()?;
        Ok(DecodedImage {
            id: self.id,
            ticket: self.ticket,
            bitmap,
        })
    }
}

/// A finished decode, ready to be handed back to the cache
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub id: String,
    pub ticket: DecodeTicket,
    pub bitmap: Bitmap,
}

/// Result of a cache lookup
#[derive(Debug, Clone)]
pub enum Lookup {
    Ready(Arc<Bitmap>),
    Pending,
    Missing,
}

/// Result of handing a decode back
#[derive(Debug)]
pub enum Completion {
    /// Entry is now ready; the queued draws should be executed
    Ready {
        bitmap: Arc<Bitmap>,
        deferred: Vec<DeferredDraw>,
    },
    /// The ticket no longer names the current entry
    Stale,
}

#[derive(Debug)]
enum Entry {
    Ready(Arc<Bitmap>),
    Pending {
        ticket: DecodeTicket,
        deferred: Vec<DeferredDraw>,
    },
}

/// Decoded bitmaps keyed by `drawimage` id
#[derive(Debug, Default)]
pub struct ImageCache {
    generation: u64,
    next_serial: u64,
    entries: FxHashMap<String, Entry>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every entry and start a new generation
    pub fn begin_frame(&mut self) {
        self.entries.clear();
        self.generation += 1;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn lookup(&self, id: &str) -> Lookup {
        match self.entries.get(id) {
            Some(Entry::Ready(bitmap)) => Lookup::Ready(Arc::clone(bitmap)),
            Some(Entry::Pending { .. }) => Lookup::Pending,
            None => Lookup::Missing,
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<Bitmap>> {
        match self.entries.get(id) {
            Some(Entry::Ready(bitmap)) => Some(Arc::clone(bitmap)),
            _ => None,
        }
    }

    pub fn insert_ready(&mut self, id: impl Into<String>, bitmap: Bitmap) -> Arc<Bitmap> {
        let bitmap = Arc::new(bitmap);
        self.entries.insert(id.into(), Entry::Ready(Arc::clone(&bitmap)));
        bitmap
    }

    /// Reserve `id` for a decode that will complete later
    pub fn insert_pending(&mut self, id: impl Into<String>) -> DecodeTicket {
        self.next_serial += 1;
        let ticket = DecodeTicket {
            generation: self.generation,
            serial: self.next_serial,
        };
        self.entries.insert(
            id.into(),
            Entry::Pending {
                ticket,
                deferred: Vec::new(),
            },
        );
        ticket
    }

    /// Queue a draw against a pending entry. Returns false when `id` is
    /// not pending.
    pub fn defer(&mut self, id: &str, draw: DeferredDraw) -> bool {
        match self.entries.get_mut(id) {
            Some(Entry::Pending { deferred, .. }) => {
                deferred.push(draw);
                true
            }
            _ => false,
        }
    }

    /// Accept a finished decode if its ticket is still current
    pub fn complete(&mut self, decoded: DecodedImage) -> Completion {
        let current = matches!(
            self.entries.get(&decoded.id),
            Some(Entry::Pending { ticket, .. }) if *ticket == decoded.ticket
        );
        if !current || decoded.ticket.generation != self.generation {
            tracing::debug!(
                "Discarding stale decode for image {} (generation {}, current {})",
                decoded.id,
                decoded.ticket.generation,
                self.generation
            );
            return Completion::Stale;
        }

        let bitmap = Arc::new(decoded.bitmap);
        let previous = self.entries.insert(decoded.id, Entry::Ready(Arc::clone(&bitmap)));
        let deferred = match previous {
            Some(Entry::Pending { deferred, .. }) => deferred,
            _ => Vec::new(),
        };
        Completion::Ready { bitmap, deferred }
    }

    /// Drop all entries without starting a new generation
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
