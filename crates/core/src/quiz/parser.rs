use crate::model::{OPTION_LABELS, QuestionRecord};

use super::{QUIZ_LENGTH, QuizResult};

/// Marks the start of a question block anywhere in the reply.
const BLOCK_DELIMITER: &str = "Q: ";
const CORRECT_PREFIX: &str = "Correct:";

/// What a single line inside a question block contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Blank,
    /// Option body with the `A)`..`D)` label removed.
    Option(&'a str),
    /// Index named by a `Correct:` line, `None` when the letter is not `A`..`D`.
    CorrectAnswer(Option<usize>),
    Text(&'a str),
}

/// Classify one line of a block.
///
/// Prefixes must start the line; indented option or `Correct:` lines are
/// plain text. Whitespace only matters for detecting blank lines.
#[must_use]
pub fn classify_line(line: &str) -> LineKind<'_> {
    if line.trim().is_empty() {
        return LineKind::Blank;
    }
    if let Some(body) = option_body(line) {
        return LineKind::Option(body);
    }
    if let Some(rest) = line.strip_prefix(CORRECT_PREFIX) {
        return LineKind::CorrectAnswer(answer_index(rest));
    }
    LineKind::Text(line.trim())
}

/// Body of an option line: everything after the first three characters
/// (label, `)` and the separating space), trimmed.
fn option_body(line: &str) -> Option<&str> {
    let mut chars = line.chars();
    let label = chars.next()?;
    if !OPTION_LABELS.contains(&label) || chars.next() != Some(')') {
        return None;
    }
    chars.next();
    Some(chars.as_str().trim())
}

fn answer_index(rest: &str) -> Option<usize> {
    let token = rest.split(':').next().unwrap_or_default().trim().to_uppercase();
    let mut chars = token.chars();
    let letter = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    OPTION_LABELS.iter().position(|label| *label == letter)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    AwaitingQuestion,
    ReadingOptions,
    ReadingCorrectAnswer,
}

/// Accumulates one block line by line.
///
/// Option lines are appended in encounter order in every state after the
/// question, so duplicate labels grow the list past four and sink the block.
/// A `Correct:` letter only resolves against the options seen so far.
#[derive(Debug)]
struct BlockScanner<'a> {
    state: ScanState,
    question: &'a str,
    options: Vec<&'a str>,
    answer: Option<usize>,
}

impl<'a> BlockScanner<'a> {
    fn new() -> Self {
        Self {
            state: ScanState::AwaitingQuestion,
            question: "",
            options: Vec::with_capacity(OPTION_LABELS.len()),
            answer: None,
        }
    }

    fn feed(&mut self, line: &'a str) {
        match (self.state, classify_line(line)) {
            (_, LineKind::Blank) => {}
            (ScanState::AwaitingQuestion, _) => {
                self.question = line.trim();
                self.state = ScanState::ReadingOptions;
            }
            (ScanState::ReadingOptions | ScanState::ReadingCorrectAnswer, LineKind::Option(body)) => {
                self.options.push(body);
            }
            (ScanState::ReadingOptions | ScanState::ReadingCorrectAnswer, LineKind::CorrectAnswer(index)) => {
                if let Some(index) = index.filter(|idx| *idx < self.options.len()) {
                    self.answer = Some(index);
                }
                self.state = ScanState::ReadingCorrectAnswer;
            }
            (_, LineKind::Text(_)) => {}
        }
    }

    fn finish(self) -> Option<QuestionRecord> {
        let answer = self.answer?;
        let options = self.options.into_iter().map(str::to_owned).collect();
        QuestionRecord::new(self.question, options, answer).ok()
    }
}

/// Parse the text following one `Q: ` delimiter.
///
/// Returns `None` unless the block has a question, exactly four options and a
/// `Correct:` letter that resolved to one of them.
#[must_use]
pub fn parse_block(block: &str) -> Option<QuestionRecord> {
    let mut scanner = BlockScanner::new();
    for line in block.lines() {
        scanner.feed(line);
    }
    scanner.finish()
}

/// Turn a generator reply into exactly `QUIZ_LENGTH` questions.
///
/// `None` (generator disabled or failed) yields placeholders only. Text before
/// the first delimiter is ignored, malformed blocks are dropped whole, and
/// blocks past the first `QUIZ_LENGTH` accepted ones are never scanned.
#[must_use]
pub fn parse_quiz(raw: Option<&str>) -> QuizResult {
    let Some(raw) = raw else {
        return QuizResult::placeholders();
    };

    let accepted = raw
        .split(BLOCK_DELIMITER)
        .skip(1)
        .filter_map(parse_block)
        .take(QUIZ_LENGTH)
        .collect();

    QuizResult::from_parsed(accepted)
}
