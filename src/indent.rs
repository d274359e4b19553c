//! Indentation detection and block re-indentation.
//!
//! The analyzer infers the indentation style of a source once, answers
//! byte/line/level queries against it, and re-indents pasted content blocks
//! to a target nesting level while preserving their relative nesting.

/// Indentation character class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentStyle {
    Spaces,
    Tabs,
}

/// The inferred indentation of a source: style, unit width, and the unit
/// string itself (`size` spaces, or one tab).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndentationDescriptor {
    pub style: IndentStyle,
    pub size: usize,
    pub unit: String,
}

impl IndentationDescriptor {
    /// Infer the indentation of `source`.
    ///
    /// Lines whose leading whitespace contains a tab vote for tabs; lines
    /// indented with spaces only vote for spaces. A tab majority yields
    /// `Tabs` with width 1. Otherwise the space width is the GCD of the
    /// consecutive differences among observed leading-space lengths (plus
    /// the smallest observed length), clamped to `[1, 8]` with a default of
    /// 4. A source with no indented lines defaults to four spaces.
    pub fn detect(source: &str) -> Self {
        let mut tab_lines = 0usize;
        let mut space_lines = 0usize;
        let mut space_widths: Vec<usize> = Vec::new();

        for line in source.split('\n') {
            let ws_len = line
                .char_indices()
                .find(|&(_, c)| c != ' ' && c != '\t')
                .map(|(i, _)| i)
                .unwrap_or(line.len());
            let ws = &line[..ws_len];
            if ws.is_empty() {
                continue;
            }
            if ws.contains('\t') {
                tab_lines += 1;
            } else {
                space_lines += 1;
                space_widths.push(ws.len());
            }
        }

        if tab_lines > space_lines {
            return Self {
                style: IndentStyle::Tabs,
                size: 1,
                unit: "\t".to_string(),
            };
        }

        space_widths.sort_unstable();
        space_widths.dedup();
        if space_widths.is_empty() {
            return Self::spaces(4);
        }

        let mut candidates: Vec<usize> = space_widths.windows(2).map(|w| w[1] - w[0]).collect();
        candidates.push(space_widths[0]);
        let g = candidates.into_iter().fold(0, gcd);
        let size = if g == 0 || g > 8 { 4 } else { g };

        Self::spaces(size)
    }

    fn spaces(size: usize) -> Self {
        Self {
            style: IndentStyle::Spaces,
            size,
            unit: " ".repeat(size),
        }
    }
}

fn gcd(a: usize, b: usize) -> usize {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

/// Indentation queries and re-indentation against one source.
#[derive(Debug, Clone)]
pub struct IndentationAnalyzer {
    descriptor: IndentationDescriptor,
    lines: Vec<String>,
}

impl IndentationAnalyzer {
    pub fn new(source: &str) -> Self {
        Self {
            descriptor: IndentationDescriptor::detect(source),
            lines: source.split('\n').map(str::to_string).collect(),
        }
    }

    pub fn descriptor(&self) -> &IndentationDescriptor {
        &self.descriptor
    }

    /// Nesting level of line `line` in indentation units. Out-of-range
    /// lines are level 0.
    pub fn level_at_line(&self, line: usize) -> usize {
        self.lines
            .get(line)
            .map(|l| self.level_of_line(l))
            .unwrap_or(0)
    }

    /// Leading whitespace of line `line`, verbatim.
    pub fn raw_indentation_at_line(&self, line: usize) -> &str {
        match self.lines.get(line) {
            Some(l) => {
                let end = l
                    .char_indices()
                    .find(|&(_, c)| c != ' ' && c != '\t')
                    .map(|(i, _)| i)
                    .unwrap_or(l.len());
                &l[..end]
            }
            None => "",
        }
    }

    /// Index of the line containing byte `byte`, by linear scan over line
    /// byte sizes. Offsets at or past the end map to the last line.
    pub fn line_at_byte(&self, byte: usize) -> usize {
        let mut acc = 0usize;
        for (i, line) in self.lines.iter().enumerate() {
            let end = acc + line.len() + 1; // +1 for the newline
            if byte < end {
                return i;
            }
            acc = end;
        }
        self.lines.len().saturating_sub(1)
    }

    pub fn indentation_at_byte(&self, byte: usize) -> &str {
        self.raw_indentation_at_line(self.line_at_byte(byte))
    }

    pub fn level_at_byte(&self, byte: usize) -> usize {
        self.level_at_line(self.line_at_byte(byte))
    }

    /// The unit string repeated `max(level, 0)` times.
    pub fn indent_string_for_level(&self, level: isize) -> String {
        self.descriptor.unit.repeat(level.max(0) as usize)
    }

    /// Re-indent a content block to `target_level`, preserving relative
    /// nesting.
    ///
    /// When `current_level` is `None` it is inferred from the leading indent
    /// of the first non-empty line. Blank lines are kept verbatim; every
    /// other line is shifted by the level delta (floored at zero) and its
    /// non-indent tail is appended unchanged.
    pub fn adjust_indentation(
        &self,
        content: &str,
        target_level: usize,
        current_level: Option<usize>,
    ) -> String {
        let current = current_level.unwrap_or_else(|| {
            content
                .split('\n')
                .find(|l| !l.trim().is_empty())
                .map(|l| self.level_of_line(l))
                .unwrap_or(0)
        });
        let delta = target_level as isize - current as isize;

        let adjusted: Vec<String> = content
            .split('\n')
            .map(|line| {
                if line.trim().is_empty() {
                    return line.to_string();
                }
                let level = self.level_of_line(line) as isize;
                let tail = line.trim_start_matches(|c| c == ' ' || c == '\t');
                format!("{}{}", self.indent_string_for_level(level + delta), tail)
            })
            .collect();

        adjusted.join("\n")
    }

    fn level_of_line(&self, line: &str) -> usize {
        match self.descriptor.style {
            IndentStyle::Tabs => line.chars().take_while(|&c| c == '\t').count(),
            IndentStyle::Spaces => {
                let spaces = line.chars().take_while(|&c| c == ' ').count();
                spaces / self.descriptor.size
            }
        }
    }
}
