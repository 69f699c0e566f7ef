//! Page-addressed receive ring buffer.
use crate::frame::FRAME_CAPACITY;
use alloc::vec;
use alloc::vec::Vec;
use log::debug;

/// Upper bound on the page count, limited by the dirty bitmap width
pub const MAX_PAGES: usize = 64;

/// Result of storing a frame into the ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Frame landed on a clean page
    Stored,
    /// Oldest unread page was overwritten, its frame is gone
    Overwrote,
    /// No clean page and overwriting is disallowed, frame discarded
    Refused,
}

/// Receive ring of fixed-size pages, one frame per page.
///
/// Each page holds a full wire image. A `u64` bitmap tracks which pages are
/// dirty (written but not yet released by the host). The write cursor always
/// points at the next page to fill, the read cursor at the oldest dirty page.
#[derive(Debug, Clone)]
pub struct RxRing {
    pages: Vec<Vec<u8>>,
    dirty: u64,
    write_page: usize,
    read_page: usize,
    read_pos: usize,
}

impl RxRing {
    /// Creates a ring with the given page count, clamped to 2..=[MAX_PAGES].
    pub fn new(pages: usize) -> Self {
        let pages = pages.clamp(2, MAX_PAGES);

        Self {
            pages: vec![vec![0x0; FRAME_CAPACITY]; pages],
            dirty: 0,
            write_page: 0,
            read_page: 0,
            read_pos: 0,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Number of written but unreleased pages.
    pub fn dirty_count(&self) -> u32 {
        self.dirty.count_ones()
    }

    /// True if at least one page awaits the host.
    pub fn pending(&self) -> bool {
        self.dirty != 0
    }

    fn mask(&self, page: usize) -> u64 {
        1 << (page as u64)
    }

    /// Stores a raw frame image on the current write page.
    ///
    /// A dirty write page means the host has fallen behind: with `no_drop`
    /// the frame is refused, otherwise the unread page is overwritten and
    /// the read side skips ahead to the oldest surviving frame.
    pub fn write(&mut self, raw: &[u8], no_drop: bool) -> WriteOutcome {
        let dirty_hit = self.dirty & self.mask(self.write_page) != 0;

        if dirty_hit && no_drop {
            debug!("Receive ring full, refusing frame");
            return WriteOutcome::Refused;
        }

        let page = &mut self.pages[self.write_page];
        page[..raw.len()].copy_from_slice(raw);

        self.dirty |= self.mask(self.write_page);
        self.write_page = (self.write_page + 1) % self.pages.len();

        if dirty_hit {
            debug!("Receive ring full, overwriting oldest page");
            self.read_page = self.write_page;
            self.read_pos = 0;
            WriteOutcome::Overwrote
        } else {
            WriteOutcome::Stored
        }
    }

    /// Streams the next byte of the current page and advances the pointer.
    ///
    /// Reads past the page end wrap around to its start.
    pub fn read_byte(&mut self) -> u8 {
        let byte = self.pages[self.read_page][self.read_pos];
        self.read_pos = (self.read_pos + 1) % FRAME_CAPACITY;
        byte
    }

    /// Rewinds the in-page read pointer.
    pub fn reset_pointer(&mut self) {
        self.read_pos = 0;
    }

    /// Releases the current page and moves on to the next dirty one.
    pub fn clear_pending(&mut self) {
        if self.dirty & self.mask(self.read_page) == 0 {
            return;
        }

        self.dirty &= !self.mask(self.read_page);
        self.read_page = (self.read_page + 1) % self.pages.len();
        self.read_pos = 0;
    }

    /// Drops all content and rewinds both cursors.
    pub fn reset(&mut self) {
        self.dirty = 0;
        self.write_page = 0;
        self.read_page = 0;
        self.read_pos = 0;
    }

    /// Index of the page the host reads next.
    pub fn read_page_index(&self) -> usize {
        self.read_page
    }

    /// Dirty bitmap as seen through the page flag registers.
    pub fn dirty_bitmap(&self) -> u64 {
        self.dirty
    }
}
