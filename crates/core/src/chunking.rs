use std::ops::Range;

/// Default maximum chunk size: 8 MiB, the attachment limit of a plain webhook.
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024 * 1024;

/// Most chunks a single file may be split into. Metadata declaring more is
/// rejected, which bounds the slot table allocated per file.
pub const MAX_TOTAL_CHUNKS: usize = 65_536;

/// How a file of a given size is cut into contiguous chunks.
///
/// A file of `n` bytes yields `ceil(n / chunk_size)` chunks. An empty file
/// still yields one empty chunk so it stays visible in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    file_size: u64,
    chunk_size: usize,
}

impl ChunkPlan {
    /// Plan a file of `file_size` bytes with chunks of at most `chunk_size`
    /// bytes. A zero chunk size is treated as one byte.
    pub fn new(file_size: u64, chunk_size: usize) -> Self {
        Self {
            file_size,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Size of the planned file.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Maximum chunk size.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of chunks.
    pub fn total_chunks(&self) -> usize {
        let chunks = self.file_size.div_ceil(self.chunk_size as u64).max(1);
        usize::try_from(chunks).unwrap_or(usize::MAX)
    }

    /// Byte range of chunk `index`, or `None` past the end.
    pub fn range(&self, index: usize) -> Option<Range<u64>> {
        if index >= self.total_chunks() {
            return None;
        }
        let size = self.chunk_size as u64;
        let start = index as u64 * size;
        let end = (start + size).min(self.file_size);
        Some(start..end.max(start))
    }

    /// Byte length of chunk `index`, or `None` past the end.
    pub fn chunk_len(&self, index: usize) -> Option<usize> {
        self.range(index)
            .map(|r| usize::try_from(r.end - r.start).unwrap_or(self.chunk_size))
    }

    /// Iterate over every chunk range in order.
    pub fn ranges(&self) -> impl Iterator<Item = Range<u64>> + '_ {
        (0..self.total_chunks()).filter_map(|i| self.range(i))
    }
}

/// Attachment filename for chunk `index` of `file_name`.
pub fn part_file_name(file_name: &str, index: usize) -> String {
    format!("{file_name}.part{index}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: u64 = 1024 * 1024;

    #[test]
    fn twenty_mib_at_eight_mib_is_three_chunks() {
        let plan = ChunkPlan::new(20 * MIB, DEFAULT_CHUNK_SIZE);
        assert_eq!(plan.total_chunks(), 3);
        let lens: Vec<u64> = plan.ranges().map(|r| r.end - r.start).collect();
        assert_eq!(lens, vec![8 * MIB, 8 * MIB, 4 * MIB]);
        assert_eq!(plan.range(2), Some(16 * MIB..20 * MIB));
        assert_eq!(plan.range(3), None);
    }

    #[test]
    fn exact_multiple_has_no_trailing_chunk() {
        let plan = ChunkPlan::new(16 * MIB, DEFAULT_CHUNK_SIZE);
        assert_eq!(plan.total_chunks(), 2);
        assert_eq!(plan.chunk_len(1), Some(DEFAULT_CHUNK_SIZE));
    }

    #[test]
    fn small_file_is_single_chunk() {
        let plan = ChunkPlan::new(10, DEFAULT_CHUNK_SIZE);
        assert_eq!(plan.total_chunks(), 1);
        assert_eq!(plan.chunk_len(0), Some(10));
    }

    #[test]
    fn empty_file_is_one_empty_chunk() {
        let plan = ChunkPlan::new(0, DEFAULT_CHUNK_SIZE);
        assert_eq!(plan.total_chunks(), 1);
        assert_eq!(plan.range(0), Some(0..0));
        assert_eq!(plan.chunk_len(0), Some(0));
    }

    #[test]
    fn ranges_are_contiguous() {
        let plan = ChunkPlan::new(1000, 64);
        let ranges: Vec<_> = plan.ranges().collect();
        assert_eq!(ranges.len(), 16);
        assert_eq!(ranges[0].start, 0);
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert_eq!(ranges.last().unwrap().end, 1000);
    }

    #[test]
    fn zero_chunk_size_is_clamped() {
        let plan = ChunkPlan::new(3, 0);
        assert_eq!(plan.chunk_size(), 1);
        assert_eq!(plan.total_chunks(), 3);
    }

    #[test]
    fn part_names() {
        assert_eq!(part_file_name("report.pdf", 0), "report.pdf.part0");
        assert_eq!(part_file_name("report.pdf", 12), "report.pdf.part12");
    }
}
