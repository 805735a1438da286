use crate::error::Result;
use crate::import::validator::{MAX_TIMER_SECONDS, MIN_TIMER_SECONDS};
use crate::models::question::QuestionCategory;
use rust_xlsxwriter::*;

/// Column contract of the import file, in template order.
pub const TEMPLATE_COLUMNS: [(&str, f64); 14] = [
    ("promptText", 40.0),
    ("questionType", 16.0),
    ("category", 20.0),
    ("timerSeconds", 14.0),
    ("correctAnswerIndex", 18.0),
    ("Answer A", 16.0),
    ("Answer B", 16.0),
    ("Answer C", 16.0),
    ("Answer D", 16.0),
    ("Answer E", 16.0),
    ("Answer F", 16.0),
    ("answerWeights", 18.0),
    ("personalityDimensionCode", 24.0),
    ("promptImageUrl", 30.0),
];

const SECTION_TAG_COLUMN: (&str, f64) = ("sectionTag", 16.0);

fn example_rows() -> [Vec<&'static str>; 2] {
    [
        vec![
            "What is 2 + 2?", "OBJECTIVE", "LOGICAL", "30", "B", "3", "4", "5", "6", "", "", "", "",
            "", "Arithmetic",
        ],
        vec![
            "I enjoy meeting new people.", "PERSONALITY", "PERSONALITY", "20", "",
            "Strongly disagree", "Disagree", "Neutral", "Agree", "Strongly agree", "",
            "[1,2,3,4,5]", "EXT", "", "Extraversion",
        ],
    ]
}

fn headers() -> Vec<(&'static str, f64)> {
    TEMPLATE_COLUMNS
        .iter()
        .copied()
        .chain(std::iter::once(SECTION_TAG_COLUMN))
        .collect()
}

pub struct TemplateService;

impl TemplateService {
    /// Workbook whose first sheet is a ready-to-fill import file.
    pub fn generate_xlsx() -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();

        let header_format = Format::new()
            .set_bold()
            .set_font_size(10)
            .set_font_color(Color::White)
            .set_background_color(Color::RGB(0x0F172A))
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin)
            .set_border_color(Color::RGB(0xE2E8F0));
        let example_format = Format::new()
            .set_font_size(10)
            .set_italic()
            .set_font_color(Color::RGB(0x64748B));

        let columns = headers();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Questions")?;
        for (i, (name, width)) in columns.iter().enumerate() {
            worksheet.set_column_width(i as u16, *width)?;
            worksheet.write_string_with_format(0, i as u16, *name, &header_format)?;
        }
        worksheet.set_freeze_panes(1, 0)?;

        for (idx, row) in example_rows().iter().enumerate() {
            let row_num = (idx + 1) as u32;
            for (col, value) in row.iter().enumerate() {
                if value.is_empty() {
                    continue;
                }
                worksheet.write_string_with_format(row_num, col as u16, *value, &example_format)?;
            }
        }

        let notes = workbook.add_worksheet();
        notes.set_name("Instructions")?;
        notes.set_column_width(0, 28.0)?;
        notes.set_column_width(1, 90.0)?;
        let bold = Format::new().set_bold();
        let lines = [
            ("questionType", "OBJECTIVE (default when blank) or PERSONALITY".to_string()),
            ("category", QuestionCategory::allowed_values()),
            (
                "timerSeconds",
                format!("Whole number between {} and {}", MIN_TIMER_SECONDS, MAX_TIMER_SECONDS),
            ),
            ("Answer A..F", "At least two answers; legacy answerOption1..6 headers are also accepted".to_string()),
            ("correctAnswerIndex", "OBJECTIVE only: letter A-F of the correct answer".to_string()),
            ("answerWeights", "PERSONALITY only: JSON array with one number per answer, e.g. [1,2,3,4,5]".to_string()),
            ("personalityDimensionCode", "PERSONALITY only: dimension code such as EXT; unknown codes are created".to_string()),
            ("promptImageUrl", "Optional: http(s) URL or path starting with /".to_string()),
            ("sectionTag", "Optional free-text section label".to_string()),
        ];
        for (idx, (column, rule)) in lines.iter().enumerate() {
            notes.write_string_with_format(idx as u32, 0, *column, &bold)?;
            notes.write_string(idx as u32, 1, rule)?;
        }

        Ok(workbook.save_to_buffer()?)
    }

    pub fn generate_csv() -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(headers().iter().map(|(name, _)| *name))?;
        for row in example_rows() {
            writer.write_record(&row)?;
        }
        writer
            .into_inner()
            .map_err(|e| crate::error::Error::Internal(format!("Failed to finish CSV template: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::parser::{parse_spreadsheet, SpreadsheetFormat};
    use crate::import::validator::validate_rows;

    #[test]
    fn xlsx_template_examples_validate() {
        let bytes = TemplateService::generate_xlsx().unwrap();
        let rows = parse_spreadsheet(SpreadsheetFormat::Xlsx, &bytes).unwrap();
        let report = validate_rows(&rows);
        assert!(report.errors.is_empty(), "{:?}", report.errors);
        assert_eq!(report.valid_rows(), 2);
        assert_eq!(report.questions[1].section_tag.as_deref(), Some("Extraversion"));
    }

    #[test]
    fn csv_template_examples_validate() {
        let bytes = TemplateService::generate_csv().unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.starts_with("promptText,questionType,category,timerSeconds"));

        let rows = parse_spreadsheet(SpreadsheetFormat::Csv, &bytes).unwrap();
        let report = validate_rows(&rows);
        assert!(report.errors.is_empty(), "{:?}", report.errors);
        assert_eq!(report.valid_rows(), 2);
    }
}
