/// Line-start table mapping 1-based line/column anchors to byte offsets.
/// Columns count Unicode scalar values, so ASCII sources behave like
/// byte columns.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            line_starts,
            len: text.len(),
        }
    }

    /// Byte offset of a 1-based line/column anchor. `None` when the line
    /// does not exist or the column runs past the end of it.
    pub fn offset(&self, text: &str, line: u32, column: u32) -> Option<usize> {
        if line == 0 || column == 0 {
            return None;
        }
        let line_start = *self.line_starts.get(line as usize - 1)?;
        let line_end = self
            .line_starts
            .get(line as usize)
            .copied()
            .unwrap_or(self.len);

        let mut remaining = column - 1;
        let mut offset = line_start;
        let mut chars = text[line_start..line_end].char_indices();
        while remaining > 0 {
            let (_, ch) = chars.next()?;
            if ch == '\n' {
                return None;
            }
            offset += ch.len_utf8();
            remaining -= 1;
        }
        Some(offset)
    }

    /// 1-based line/column of a byte offset
    pub fn position(&self, text: &str, offset: usize) -> (u32, u32) {
        let offset = offset.min(self.len);
        let line = self.line_starts.partition_point(|&s| s <= offset);
        let line_start = self.line_starts[line - 1];
        let column = text[line_start..offset].chars().count() + 1;
        (line as u32, column as u32)
    }
}
