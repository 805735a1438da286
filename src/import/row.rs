//! Typed view of one spreadsheet record.
//!
//! Header names are matched loosely: case, spaces and underscores are
//! ignored, so `promptText`, `Prompt Text` and `prompt_text` all land in the
//! same field.

pub const MAX_ANSWER_OPTIONS: usize = 6;

const ANSWER_LETTERS: [char; MAX_ANSWER_OPTIONS] = ['A', 'B', 'C', 'D', 'E', 'F'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    PromptText,
    QuestionType,
    Category,
    TimerSeconds,
    CorrectAnswerIndex,
    Answer(usize),
    LegacyAnswer(usize),
    AnswerWeights,
    PersonalityDimensionCode,
    PromptImageUrl,
    SectionTag,
}

fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

fn column_for(header: &str) -> Option<Column> {
    let key = normalize_header(header);
    let column = match key.as_str() {
        "prompttext" => Column::PromptText,
        "questiontype" => Column::QuestionType,
        "category" => Column::Category,
        "timerseconds" => Column::TimerSeconds,
        "correctanswerindex" => Column::CorrectAnswerIndex,
        "answerweights" => Column::AnswerWeights,
        "personalitydimensioncode" => Column::PersonalityDimensionCode,
        "promptimageurl" => Column::PromptImageUrl,
        "sectiontag" => Column::SectionTag,
        _ => {
            if let Some(letter) = key.strip_prefix("answer") {
                if let Some(slot) = letter_slot(letter) {
                    return Some(Column::Answer(slot));
                }
            }
            if let Some(digit) = key.strip_prefix("answeroption") {
                return match digit.parse::<usize>() {
                    Ok(n) if (1..=MAX_ANSWER_OPTIONS).contains(&n) => {
                        Some(Column::LegacyAnswer(n - 1))
                    }
                    _ => None,
                };
            }
            return None;
        }
    };
    Some(column)
}

fn letter_slot(s: &str) -> Option<usize> {
    let mut chars = s.chars();
    let c = chars.next()?.to_ascii_uppercase();
    if chars.next().is_some() {
        return None;
    }
    ANSWER_LETTERS.iter().position(|l| *l == c)
}

/// Header layout of a sheet, resolved once and applied to every record.
#[derive(Debug, Clone)]
pub struct HeaderMap {
    columns: Vec<Option<Column>>,
}

impl HeaderMap {
    pub fn new<S: AsRef<str>>(headers: &[S]) -> Self {
        Self {
            columns: headers.iter().map(|h| column_for(h.as_ref().trim())).collect(),
        }
    }

    pub fn recognized(&self) -> usize {
        self.columns.iter().filter(|c| c.is_some()).count()
    }

    /// Builds a typed row from trimmed cell values. Extra cells beyond the
    /// header are only consulted for blankness.
    pub fn row<S: AsRef<str>>(&self, row_number: usize, cells: &[S]) -> SheetRow {
        let mut row = SheetRow {
            row_number,
            blank: cells.iter().all(|c| c.as_ref().trim().is_empty()),
            ..SheetRow::default()
        };
        let mut legacy: [String; MAX_ANSWER_OPTIONS] = Default::default();

        for (idx, cell) in cells.iter().enumerate() {
            let Some(Some(column)) = self.columns.get(idx) else {
                continue;
            };
            let value = cell.as_ref().trim().to_string();
            match *column {
                Column::PromptText => row.prompt_text = value,
                Column::QuestionType => row.question_type = value,
                Column::Category => row.category = value,
                Column::TimerSeconds => row.timer_seconds = value,
                Column::CorrectAnswerIndex => row.correct_answer_index = value,
                Column::Answer(slot) => row.answers[slot] = value,
                Column::LegacyAnswer(slot) => legacy[slot] = value,
                Column::AnswerWeights => row.answer_weights = value,
                Column::PersonalityDimensionCode => row.personality_dimension_code = value,
                Column::PromptImageUrl => row.prompt_image_url = value,
                Column::SectionTag => row.section_tag = value,
            }
        }

        for (slot, old) in legacy.into_iter().enumerate() {
            if row.answers[slot].is_empty() {
                row.answers[slot] = old;
            }
        }
        row
    }
}

/// One data record. Absent cells are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetRow {
    /// 1-based position in the source file, header included.
    pub row_number: usize,
    pub prompt_text: String,
    pub question_type: String,
    pub category: String,
    pub timer_seconds: String,
    pub correct_answer_index: String,
    pub answers: [String; MAX_ANSWER_OPTIONS],
    pub answer_weights: String,
    pub personality_dimension_code: String,
    pub prompt_image_url: String,
    pub section_tag: String,
    blank: bool,
}

impl SheetRow {
    pub fn is_blank(&self) -> bool {
        self.blank
    }

    /// Non-blank answer options in slot order.
    pub fn answer_options(&self) -> Vec<String> {
        self.answers
            .iter()
            .filter(|a| !a.is_empty())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_new_style_headers() {
        let headers = ["promptText", "category", "timerSeconds", "correctAnswerIndex", "Answer A", "Answer B"];
        let map = HeaderMap::new(&headers);
        assert_eq!(map.recognized(), 6);

        let row = map.row(2, &["2+2?", "LOGICAL", "30", "B", "3", "4"]);
        assert_eq!(row.row_number, 2);
        assert_eq!(row.prompt_text, "2+2?");
        assert_eq!(row.correct_answer_index, "B");
        assert_eq!(row.answer_options(), vec!["3", "4"]);
        assert!(!row.is_blank());
    }

    #[test]
    fn legacy_headers_fill_missing_slots_only() {
        let headers = ["prompt_text", "Answer A", "answerOption1", "answerOption2", "answer_option_3"];
        let map = HeaderMap::new(&headers);
        let row = map.row(3, &["Q", "new", "old", "second", "third"]);
        assert_eq!(row.answer_options(), vec!["new", "second", "third"]);
    }

    #[test]
    fn blank_answer_slots_are_skipped() {
        let headers = ["Answer A", "Answer B", "Answer C", "Answer D"];
        let row = HeaderMap::new(&headers).row(2, &["x", "  ", "", "y"]);
        assert_eq!(row.answer_options(), vec!["x", "y"]);
    }

    #[test]
    fn unknown_columns_count_towards_blankness() {
        let headers = ["promptText", "notes"];
        let map = HeaderMap::new(&headers);
        assert!(map.row(2, &["", " "]).is_blank());
        assert!(!map.row(3, &["", "stray"]).is_blank());
    }

    #[test]
    fn rejects_out_of_range_answer_headers() {
        assert_eq!(column_for("Answer G"), None);
        assert_eq!(column_for("answerOption7"), None);
        assert_eq!(column_for("Answer f"), Some(Column::Answer(5)));
    }
}
