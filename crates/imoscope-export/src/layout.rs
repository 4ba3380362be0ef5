//! Pure transcript layout: wrapping, role prefixes, pagination math.

use imoscope_types::{Message, Role};

/// Column width the transcript is wrapped to.
pub const WRAP_COLUMNS: usize = 90;

/// One rendered line of the transcript plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLine {
    pub role: Role,
    pub text: String,
    /// True for the first line of a message (the one carrying the role
    /// label); continuation lines are indented by the writer.
    pub leading: bool,
}

/// Greedy word wrap to `max` columns. Explicit newlines are preserved;
/// words longer than a full line are hard-split.
pub fn wrap_text(text: &str, max: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for raw_line in text.split('\n') {
        let mut current = String::new();
        for word in raw_line.split_whitespace() {
            let word_len = word.chars().count();
            if word_len > max {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let chars: Vec<char> = word.chars().collect();
                for chunk in chars.chunks(max) {
                    let piece: String = chunk.iter().collect();
                    if chunk.len() == max {
                        lines.push(piece);
                    } else {
                        current = piece;
                    }
                }
                continue;
            }
            let needed = if current.is_empty() {
                word_len
            } else {
                current.chars().count() + 1 + word_len
            };
            if needed > max {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
            } else {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
            }
        }
        lines.push(current);
    }
    lines
}

/// Turn the transcript into a flat line plan. The first line of every
/// message carries its role label; both the image-present and image-absent
/// export paths consume exactly this plan.
pub fn plan_transcript(messages: &[Message], columns: usize) -> Vec<TranscriptLine> {
    let mut plan = Vec::new();
    for message in messages {
        let labeled = format!("{}: {}", message.role.label(), message.text);
        for (i, line) in wrap_text(&labeled, columns).into_iter().enumerate() {
            plan.push(TranscriptLine {
                role: message.role,
                text: line,
                leading: i == 0,
            });
        }
    }
    plan
}

/// How many pages a plan occupies given a per-page line capacity.
pub fn pages_required(line_count: usize, lines_per_page: usize) -> usize {
    if line_count == 0 {
        1
    } else {
        line_count.div_ceil(lines_per_page)
    }
}
