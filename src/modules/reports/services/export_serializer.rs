//! Turns a [`ReportResult`] into a downloadable artifact.
//!
//! All three writers read the same [`ReportTable`] view of each section, so a CSV, a
//! spreadsheet and a printed report of one result always carry the same rows.

use tracing::debug;

use crate::core::document::{el, key_value_table, styles, HtmlDocument};
use crate::core::timezone::{format_generated_at, format_iso8601, format_long_date};
use crate::core::{Currency, Result};
use crate::modules::records::models::Labelled;
use crate::modules::reports::models::{ExportFormat, ReportResult, ReportTable};

/// A serialized report ready for download or attachment
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub filename: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ExportSerializer {
    currency: Currency,
    institute_name: String,
}

impl Default for ExportSerializer {
    fn default() -> Self {
        Self::new(Currency::default(), "Training Center")
    }
}

impl ExportSerializer {
    pub fn new(currency: Currency, institute_name: impl Into<String>) -> Self {
        Self {
            currency,
            institute_name: institute_name.into(),
        }
    }

    /// Serialize with a format name as received from a request or stored schedule.
    ///
    /// Unsupported names fail with a configuration error and produce no artifact.
    pub fn serialize_as(&self, result: &ReportResult, format: &str) -> Result<ExportArtifact> {
        let format: ExportFormat = format.parse()?;
        self.serialize(result, format)
    }

    pub fn serialize(&self, result: &ReportResult, format: ExportFormat) -> Result<ExportArtifact> {
        let tables: Vec<ReportTable> = result.sections.iter().map(|s| s.to_table()).collect();
        for table in &tables {
            table.validate()?;
        }

        let body = match format {
            ExportFormat::Csv => self.write_csv(&tables),
            ExportFormat::Spreadsheet => self.write_spreadsheet(result, &tables),
            ExportFormat::Print => self.write_print(result, &tables),
        };

        let artifact = ExportArtifact {
            filename: filename(result, format),
            mime_type: format.mime_type(),
            bytes: body.into_bytes(),
        };

        debug!(
            filename = %artifact.filename,
            bytes = artifact.len(),
            "Serialized report"
        );

        Ok(artifact)
    }

    fn write_csv(&self, tables: &[ReportTable]) -> String {
        let mut out = String::new();
        for (index, table) in tables.iter().enumerate() {
            if index > 0 {
                out.push_str("\r\n");
            }

            let header = std::iter::once("report_type").chain(table.columns.iter().map(|c| c.key));
            push_csv_record(&mut out, header.map(str::to_string));

            for row in &table.rows {
                let record = std::iter::once(table.report_type.key().to_string())
                    .chain(row.iter().map(|cell| cell.raw(self.currency)));
                push_csv_record(&mut out, record);
            }
        }
        out
    }

    fn write_spreadsheet(&self, result: &ReportResult, tables: &[ReportTable]) -> String {
        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        out.push_str("<?mso-application progid=\"Excel.Sheet\"?>\n");
        out.push_str(
            "<Workbook xmlns=\"urn:schemas-microsoft-com:office:spreadsheet\" \
             xmlns:ss=\"urn:schemas-microsoft-com:office:spreadsheet\">\n",
        );
        push_line(
            &mut out,
            format!(
                " <DocumentProperties xmlns=\"urn:schemas-microsoft-com:office:office\">\
                 <Title>{}</Title><Created>{}</Created></DocumentProperties>",
                xml_escape(&self.institute_name),
                format_iso8601(result.generated_at)
            ),
        );
        out.push_str(" <Styles><Style ss:ID=\"header\"><Font ss:Bold=\"1\"/></Style></Styles>\n");

        for table in tables {
            let sheet = xml_escape(&sheet_name(table.title()));
            push_line(&mut out, format!(" <Worksheet ss:Name=\"{}\">", sheet));
            out.push_str("  <Table>\n   <Row>\n");
            for column in &table.columns {
                push_line(
                    &mut out,
                    format!(
                        "    <Cell ss:StyleID=\"header\"><Data ss:Type=\"String\">{}</Data></Cell>",
                        xml_escape(column.title)
                    ),
                );
            }
            out.push_str("   </Row>\n");

            for row in &table.rows {
                out.push_str("   <Row>\n");
                for cell in row {
                    let kind = if cell.is_numeric() { "Number" } else { "String" };
                    push_line(
                        &mut out,
                        format!(
                            "    <Cell><Data ss:Type=\"{}\">{}</Data></Cell>",
                            kind,
                            xml_escape(&cell.raw(self.currency))
                        ),
                    );
                }
                out.push_str("   </Row>\n");
            }
            out.push_str("  </Table>\n </Worksheet>\n");
        }

        out.push_str("</Workbook>\n");
        out
    }

    fn write_print(&self, result: &ReportResult, tables: &[ReportTable]) -> String {
        let mut doc = HtmlDocument::new(format!("{} Report", self.institute_name));

        let division = result
            .division
            .as_ref()
            .map_or_else(|| "All divisions".to_string(), |d| d.label().to_string());
        let reports = tables.iter().map(|t| t.title()).collect::<Vec<_>>().join(", ");
        let period = format!(
            "{} to {}",
            format_long_date(result.start),
            format_long_date(result.end)
        );

        let mut sheet = el("div")
            .style(styles::SHEET)
            .child(
                el("div")
                    .style(styles::HEADER)
                    .child(el("h1").style(styles::TITLE).text(self.institute_name.clone()))
                    .child(el("p").style(styles::SUBTITLE).text("Fee & Enrollment Report")),
            )
            .child(key_value_table([
                ("Period", period),
                ("Division", division),
                ("Reports", reports),
            ]));

        for table in tables {
            sheet = sheet.child(el("h2").style(styles::SECTION_TITLE).text(table.title()));
            if table.rows.is_empty() {
                sheet = sheet.child(
                    el("div")
                        .style(styles::PLACEHOLDER)
                        .text("No data for the selected filters"),
                );
                continue;
            }

            let header = el("tr").children(
                table
                    .columns
                    .iter()
                    .map(|c| el("th").style(styles::TH).text(c.title)),
            );
            let rows = table.rows.iter().map(|row| {
                el("tr").children(row.iter().map(|cell| {
                    let style = if cell.is_numeric() { styles::TD_NUMERIC } else { styles::TD };
                    el("td").style(style).text(cell.display(self.currency))
                }))
            });
            sheet = sheet.child(el("table").style(styles::TABLE).child(header).children(rows));
        }

        sheet = sheet
            .child(
                el("p")
                    .style(styles::MUTED)
                    .text(format!("Generated on {}", format_generated_at(result.generated_at))),
            )
            .child(
                el("div")
                    .style(styles::FOOTER)
                    .text(format!("{} · Computer-generated report", self.institute_name)),
            );

        doc.push(sheet);
        doc.render()
    }
}

/// `{report slugs joined by +}_{start}_{end}[_{division}].{ext}`
pub fn filename(result: &ReportResult, format: ExportFormat) -> String {
    let slugs = result
        .report_types()
        .iter()
        .map(|t| t.slug())
        .collect::<Vec<_>>()
        .join("+");
    let mut name = format!(
        "{}_{}_{}",
        slugs,
        result.start.format("%Y-%m-%d"),
        result.end.format("%Y-%m-%d")
    );
    if let Some(division) = &result.division {
        let code: String = division
            .code()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
            .collect();
        name.push('_');
        name.push_str(&code);
    }
    name.push('.');
    name.push_str(format.extension());
    name
}

fn csv_quote(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn push_csv_record(out: &mut String, fields: impl Iterator<Item = String>) {
    let line = fields.map(|f| csv_quote(&f)).collect::<Vec<_>>().join(",");
    out.push_str(&line);
    out.push_str("\r\n");
}

/// Split CSV text into records, honoring quoted commas, quotes and line breaks.
/// Blank lines (section separators) yield no record.
pub fn parse_csv_records(body: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = body.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => record.push(std::mem::take(&mut field)),
            '\r' if !in_quotes => {}
            '\n' if !in_quotes => {
                if !record.is_empty() || !field.is_empty() {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
            }
            _ => field.push(ch),
        }
    }
    if !record.is_empty() || !field.is_empty() {
        record.push(field);
        records.push(record);
    }
    records
}

/// Worksheet names are capped at 31 characters and may not contain `[]:*?/\`
fn sheet_name(title: &str) -> String {
    title
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(31)
        .collect()
}

fn push_line(out: &mut String, line: String) {
    out.push_str(&line);
    out.push('\n');
}

fn xml_escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
