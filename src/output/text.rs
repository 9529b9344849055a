// src/output/text.rs
//! Plain-text rendering of records for streaming output.

use crate::model::{ExportRecord, SentenceRecord, WordRecord};

/// Renders one record as a block: blank line, `---`, head, body lines.
pub fn render_block(record: &ExportRecord) -> String {
    let mut lines = vec![String::new(), "---".to_string()];
    match record {
        ExportRecord::Sentence(s) => sentence_lines(s, &mut lines),
        ExportRecord::Word(w) => word_lines(w, &mut lines),
    }
    let mut block = lines.join("\n");
    block.push('\n');
    block
}

fn sentence_lines(s: &SentenceRecord, lines: &mut Vec<String>) {
    if !s.word_id.is_empty() {
        let mut head = s.word.spell.clone();
        if !s.word.pron.is_empty() && s.word.pron != head {
            head = append(&head, &format!("[{}]", s.word.pron));
        }
        lines.push(with_word_id(&head, &s.word_id));
    }
    lines.push(s.jp.clone());
    if !s.trans.is_empty() {
        lines.push(s.trans.clone());
    }
}

fn word_lines(w: &WordRecord, lines: &mut Vec<String>) {
    let mut head = w.spell.clone();
    if !w.pron.is_empty() {
        head = append(&head, &format!("[{}]", w.pron));
    }
    if !w.accent.is_empty() {
        head = format!("{} {}", head, w.accent).trim().to_string();
    }
    if !w.word_id.is_empty() {
        head = with_word_id(&head, &w.word_id);
    }
    if !head.is_empty() {
        lines.push(head);
    }
    if !w.excerpt.is_empty() {
        lines.push(w.excerpt.clone());
    }
}

fn with_word_id(head: &str, word_id: &str) -> String {
    if head.is_empty() {
        format!("wordId={}", word_id)
    } else {
        format!("{} (wordId={})", head, word_id)
    }
}

/// `"{head} {part}"`, or just `part` when the head is empty.
fn append(head: &str, part: &str) -> String {
    if head.is_empty() {
        part.to_string()
    } else {
        format!("{} {}", head, part)
    }
}
