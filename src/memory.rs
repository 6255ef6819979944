use crate::clock::Timestamp;

/// A page-table entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub index: usize,
    pub is_valid: bool,
    pub is_dirty: bool,
    /// Pid of the process whose fault is loading this page right now
    pub requested_by: Option<usize>,
    pub last_access: Timestamp,
}

impl Page {
    /// A fresh, non-resident, clean page
    pub fn new(index: usize) -> Self {
        Page {
            index,
            is_valid: false,
            is_dirty: false,
            requested_by: None,
            last_access: Timestamp::ZERO,
        }
    }
}

/// The pages of one process, indexed densely from 0
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTable {
    pages: Vec<Page>,
}

impl PageTable {
    /// Allocate `size` invalid pages with indices 0..size
    pub fn initialize(size: usize) -> Self {
        PageTable {
            pages: (0..size).map(Page::new).collect(),
        }
    }

    /// Find the entry whose stored index is `page_index`
    pub fn lookup(&self, page_index: usize) -> Option<&Page> {
        self.pages.iter().find(|p| p.index == page_index)
    }

    pub fn lookup_mut(&mut self, page_index: usize) -> Option<&mut Page> {
        self.pages.iter_mut().find(|p| p.index == page_index)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn valid_count(&self) -> usize {
        self.pages.iter().filter(|p| p.is_valid).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    pub pid: usize,
    pub page_table: PageTable,
}

impl Process {
    pub fn new(pid: usize, page_table_size: usize) -> Self {
        Process {
            pid,
            page_table: PageTable::initialize(page_table_size),
        }
    }

    pub fn page_table_size(&self) -> usize {
        self.page_table.len()
    }
}

/// One slot of physical memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RamFrame {
    pub frame_index: usize,
    pub owner_pid: Option<usize>,
    pub page_index: Option<usize>,
    pub last_access: Timestamp,
}

impl RamFrame {
    pub fn unmapped(frame_index: usize) -> Self {
        RamFrame {
            frame_index,
            owner_pid: None,
            page_index: None,
            last_access: Timestamp::ZERO,
        }
    }

    pub fn is_mapped(&self) -> bool {
        self.owner_pid.is_some()
    }

    #[inline]
    pub fn maps(&self, pid: usize, page_index: usize) -> bool {
        self.owner_pid == Some(pid) && self.page_index == Some(page_index)
    }
}

impl std::fmt::Display for RamFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.owner_pid, self.page_index) {
            (Some(pid), Some(page)) => write!(
                f,
                "frame {}: pid {} page {} (last access {})",
                self.frame_index, pid, page, self.last_access
            ),
            _ => write!(f, "frame {}: free", self.frame_index),
        }
    }
}

/// Fixed pool of physical frames
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameTable {
    frames: Vec<RamFrame>,
}

impl FrameTable {
    /// `capacity` frames, all unmapped
    pub fn new(capacity: usize) -> Self {
        FrameTable {
            frames: (0..capacity).map(RamFrame::unmapped).collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.frames.len()
    }

    pub fn occupied(&self) -> usize {
        self.frames.iter().filter(|f| f.is_mapped()).count()
    }

    pub fn free_count(&self) -> usize {
        self.capacity() - self.occupied()
    }

    /// Lowest-indexed unmapped frame
    pub fn first_free(&self) -> Option<usize> {
        self.frames.iter().position(|f| !f.is_mapped())
    }

    /// Frame currently holding `(pid, page_index)`
    pub fn find(&self, pid: usize, page_index: usize) -> Option<usize> {
        self.frames.iter().position(|f| f.maps(pid, page_index))
    }

    /// Point `frame_index` at `(pid, page_index)`, dropping whatever it held
    pub fn bind(&mut self, frame_index: usize, pid: usize, page_index: usize, now: Timestamp) -> &RamFrame {
        let frame = &mut self.frames[frame_index];
        frame.owner_pid = Some(pid);
        frame.page_index = Some(page_index);
        frame.last_access = now;
        frame
    }

    /// Refresh the access time of the frame holding `(pid, page_index)`
    pub fn touch(&mut self, pid: usize, page_index: usize, now: Timestamp) -> Option<&RamFrame> {
        let frame = self.frames.iter_mut().find(|f| f.maps(pid, page_index))?;
        frame.last_access = now;
        Some(&*frame)
    }

    pub fn get(&self, frame_index: usize) -> Option<&RamFrame> {
        self.frames.get(frame_index)
    }

    pub fn frames(&self) -> &[RamFrame] {
        &self.frames
    }
}
