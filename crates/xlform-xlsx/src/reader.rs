//! XLSX reader

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use log::warn;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use xlform_core::CellAddress;

use crate::error::{XlsxError, XlsxResult};
use crate::number_format;
use crate::workbook::{CellContent, Workbook, Worksheet};

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// Excel uses this format for characters XML cannot carry literally,
/// e.g. `_x000d_` for a carriage return or `_x005f_` for an underscore.
fn decode_excel_escapes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find("_x") {
        result.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        let decoded = candidate
            .get(2..6)
            .filter(|hex| hex.chars().all(|c| c.is_ascii_hexdigit()))
            .filter(|_| candidate.as_bytes().get(6) == Some(&b'_'))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);

        match decoded {
            Some(c) => {
                result.push(c);
                rest = &candidate[7..];
            }
            None => {
                result.push('_');
                rest = &candidate[1..];
            }
        }
    }
    result.push_str(rest);

    result
}

fn attr_value(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|s| s.to_string()))
}

fn is_true(value: Option<String>) -> bool {
    matches!(value.as_deref(), Some("1") | Some("true"))
}

/// A `<c>` element collected while reading a worksheet
#[derive(Default)]
struct RawCell {
    reference: String,
    cell_type: Option<String>,
    style: Option<usize>,
    value: Option<String>,
    formula: Option<String>,
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let file = File::open(path)?;
        Self::read(file)
    }

    /// Read a workbook from a reader
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        let mut archive = zip::ZipArchive::new(reader)?;

        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let cell_formats = Self::read_cell_formats(&mut archive)?;
        let sheet_info = Self::read_workbook_xml(&mut archive)?;
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;

        let mut workbook = Workbook::empty();
        for (name, r_id) in &sheet_info {
            let path = sheet_paths.get(r_id).ok_or_else(|| {
                XlsxError::InvalidFormat(format!("No worksheet part for sheet '{}'", name))
            })?;
            let index = workbook.add_worksheet_with_name(name)?;
            let worksheet = workbook
                .worksheet_mut(index)
                .ok_or_else(|| XlsxError::InvalidFormat("Sheet not found".into()))?;
            Self::read_worksheet(&mut archive, path, worksheet, &shared_strings, &cell_formats)?;
        }

        if workbook.is_empty() {
            return Err(XlsxError::InvalidFormat("Workbook has no sheets".into()));
        }

        Ok(workbook)
    }

    /// Read the shared strings table
    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings),
        };

        let mut xml_reader = Reader::from_reader(BufReader::new(file));

        let mut buf = Vec::new();
        let mut current = String::new();
        let mut in_si = false;
        let mut in_t = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current.clear();
                    }
                    b"t" if in_si => in_t = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.name().as_ref() == b"si" => strings.push(String::new()),
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current));
                        in_si = false;
                    }
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => {
                    let text = e.unescape().map_err(XlsxError::Xml)?;
                    current.push_str(&text);
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    /// Read the number format code of every cell xf
    fn read_cell_formats<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<String>> {
        let file = match archive.by_name("xl/styles.xml") {
            Ok(f) => f,
            Err(_) => return Ok(Vec::new()),
        };

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut custom: HashMap<u32, String> = HashMap::new();
        let mut xf_format_ids: Vec<u32> = Vec::new();
        let mut in_cell_xfs = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.name().as_ref() {
                    b"numFmt" => {
                        let id = attr_value(&e, b"numFmtId").and_then(|s| s.parse().ok());
                        let code = attr_value(&e, b"formatCode");
                        if let (Some(id), Some(code)) = (id, code) {
                            custom.insert(id, code);
                        }
                    }
                    b"cellXfs" => in_cell_xfs = true,
                    b"xf" if in_cell_xfs => {
                        let id = attr_value(&e, b"numFmtId")
                            .and_then(|s| s.parse().ok())
                            .unwrap_or(0);
                        xf_format_ids.push(id);
                    }
                    _ => {}
                },
                Ok(Event::End(e)) if e.name().as_ref() == b"cellXfs" => in_cell_xfs = false,
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(xf_format_ids
            .into_iter()
            .map(|id| {
                custom
                    .get(&id)
                    .cloned()
                    .or_else(|| number_format::builtin_code(id).map(str::to_string))
                    .unwrap_or_else(|| number_format::GENERAL.to_string())
            })
            .collect())
    }

    /// Read workbook.xml to get sheet names and rIds
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<(String, String)>> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::InvalidFormat("Missing xl/workbook.xml".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut sheets = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"sheet" => {
                    if let (Some(name), Some(r_id)) =
                        (attr_value(&e, b"name"), attr_value(&e, b"r:id"))
                    {
                        sheets.push((name, r_id));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Read workbook.xml.rels to get worksheet part paths by rId
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<HashMap<String, String>> {
        let file = archive.by_name("xl/_rels/workbook.xml.rels").map_err(|_| {
            XlsxError::InvalidFormat("Missing xl/_rels/workbook.xml.rels".into())
        })?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let id = attr_value(&e, b"Id");
                    let target = attr_value(&e, b"Target");
                    let rel_type = attr_value(&e, b"Type");

                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        if rel_type.ends_with("/worksheet") {
                            // Targets are relative to xl/ unless absolute
                            let full_path = match target.strip_prefix('/') {
                                Some(absolute) => absolute.to_string(),
                                None => format!("xl/{}", target),
                            };
                            rels.insert(id, full_path);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        worksheet: &mut Worksheet,
        shared_strings: &[String],
        cell_formats: &[String],
    ) -> XlsxResult<()> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::InvalidFormat(format!("Missing worksheet part {}", path)))?;

        // Text is kept untrimmed: only text inside <v>, <f> and <t> is consumed
        let mut xml_reader = Reader::from_reader(BufReader::new(file));

        let mut buf = Vec::new();
        let mut current: Option<RawCell> = None;
        let mut in_value = false;
        let mut in_formula = false;
        let mut in_inline_text = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"c" => current = Some(Self::start_cell(&e)),
                    b"v" if current.is_some() => in_value = true,
                    b"f" if current.is_some() => in_formula = true,
                    b"t" if current.is_some() => in_inline_text = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.name().as_ref() {
                    b"c" => {
                        let raw = Self::start_cell(&e);
                        Self::process_cell(worksheet, raw, shared_strings, cell_formats)?;
                    }
                    b"sheetProtection" => {
                        worksheet.set_protected(is_true(attr_value(&e, b"sheet")));
                    }
                    _ => {}
                },
                Ok(Event::Text(e)) => {
                    if let Some(raw) = current.as_mut() {
                        if in_value || in_formula || in_inline_text {
                            let text = e.unescape().map_err(XlsxError::Xml)?;
                            let target = if in_formula {
                                &mut raw.formula
                            } else {
                                &mut raw.value
                            };
                            target.get_or_insert_with(String::new).push_str(&text);
                        }
                    }
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"v" => in_value = false,
                    b"f" => in_formula = false,
                    b"t" => in_inline_text = false,
                    b"c" => {
                        if let Some(raw) = current.take() {
                            Self::process_cell(worksheet, raw, shared_strings, cell_formats)?;
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(())
    }

    fn start_cell(e: &BytesStart) -> RawCell {
        RawCell {
            reference: attr_value(e, b"r").unwrap_or_default(),
            cell_type: attr_value(e, b"t"),
            style: attr_value(e, b"s").and_then(|s| s.parse().ok()),
            value: None,
            formula: None,
        }
    }

    fn process_cell(
        worksheet: &mut Worksheet,
        raw: RawCell,
        shared_strings: &[String],
        cell_formats: &[String],
    ) -> XlsxResult<()> {
        let addr = CellAddress::parse(&raw.reference).map_err(|e| {
            XlsxError::Parse(format!("Invalid cell reference '{}': {}", raw.reference, e))
        })?;

        let format_code = match raw.style {
            Some(s) if s != 0 => cell_formats.get(s).cloned().ok_or_else(|| {
                XlsxError::Parse(format!("Style index {} out of bounds", s))
            })?,
            _ => number_format::GENERAL.to_string(),
        };

        let content = match (raw.formula, raw.value) {
            // Cached results are not kept; formulas are never evaluated
            (Some(f), _) if !f.is_empty() => CellContent::Formula(format!("={}", f)),
            (_, None) => CellContent::Empty,
            (_, Some(value)) => match raw.cell_type.as_deref() {
                Some("s") => {
                    let idx: usize = value.parse().map_err(|_| {
                        XlsxError::Parse(format!("Invalid shared string index: {}", value))
                    })?;
                    let s = shared_strings.get(idx).ok_or_else(|| {
                        XlsxError::Parse(format!("Shared string index {} out of bounds", idx))
                    })?;
                    CellContent::Text(s.clone())
                }
                Some("inlineStr") | Some("str") => CellContent::Text(decode_excel_escapes(&value)),
                None | Some("n") => Self::parse_number(&value, &format_code, &raw.reference),
                Some(other) => {
                    warn!(
                        "cell {}: unsupported cell type '{}', reading as text",
                        raw.reference, other
                    );
                    CellContent::Text(value)
                }
            },
        };

        worksheet.set_number_format_at(addr.row, addr.col, format_code);
        worksheet.cell_at_mut(addr.row, addr.col).content = content;
        Ok(())
    }

    fn parse_number(value: &str, format_code: &str, reference: &str) -> CellContent {
        let value = value.trim();
        if number_format::is_date_format(format_code) {
            if let Some(dt) = value
                .parse::<f64>()
                .ok()
                .and_then(number_format::serial_to_datetime)
            {
                return CellContent::DateTime(dt);
            }
        }
        if let Ok(i) = value.parse::<i64>() {
            return CellContent::Int(i);
        }
        match value.parse::<f64>() {
            Ok(f) => CellContent::Float(f),
            Err(_) => {
                warn!("cell {}: unparsable number '{}', reading as text", reference, value);
                CellContent::Text(value.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::XlsxWriter;
    use chrono::NaiveDate;
    use std::io::{Cursor, Write};
    use xlform_core::CellValue;

    #[test]
    fn test_decode_excel_escapes() {
        assert_eq!(decode_excel_escapes("a_x000d_b"), "a\rb");
        assert_eq!(decode_excel_escapes("_x000a__x0009_"), "\n\t");
        assert_eq!(decode_excel_escapes("snake_x005f_case"), "snake_case");
        assert_eq!(decode_excel_escapes("_x00_ and _x"), "_x00_ and _x");
        assert_eq!(decode_excel_escapes("plain text"), "plain text");
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(XlsxReader::parse_number("42", "General", "A1"), CellContent::Int(42));
        assert_eq!(XlsxReader::parse_number("4.5", "General", "A1"), CellContent::Float(4.5));
        assert_eq!(XlsxReader::parse_number("2.0", "0.00", "A1"), CellContent::Float(2.0));
        assert_eq!(
            XlsxReader::parse_number("45306.5", "mm-dd-yy", "A1"),
            CellContent::DateTime(
                NaiveDate::from_ymd_opt(2024, 1, 15)
                    .unwrap()
                    .and_hms_opt(12, 0, 0)
                    .unwrap()
            )
        );
        assert_eq!(
            XlsxReader::parse_number("n/a", "General", "A1"),
            CellContent::Text("n/a".into())
        );
    }

    #[test]
    fn test_roundtrip_in_memory() {
        let mut wb = Workbook::with_sheet("Data").unwrap();
        wb.add_worksheet_with_name("Second").unwrap();
        let ws = wb.worksheet_mut(0).unwrap();
        ws.set_value_at(1, 1, CellValue::text("  padded  "));
        ws.set_value_at(1, 2, CellValue::Float(1.25));
        ws.set_value_at(2, 1, CellValue::text("=A1&\"x\""));
        ws.set_number_format_at(2, 2, "0.00");
        ws.set_value_at(2, 2, CellValue::Int(3));

        let mut buffer = Cursor::new(Vec::new());
        XlsxWriter::write(&wb, &mut buffer).unwrap();
        buffer.set_position(0);
        let read = XlsxReader::read(buffer).unwrap();

        assert_eq!(read.sheet_count(), 2);
        assert_eq!(read.worksheet(1).unwrap().name(), "Second");
        let ws = read.worksheet(0).unwrap();
        assert_eq!(ws.cell_at(1, 1).unwrap().content, CellContent::Text("  padded  ".into()));
        assert_eq!(ws.cell_at(1, 2).unwrap().content, CellContent::Float(1.25));
        assert_eq!(
            ws.cell_at(2, 1).unwrap().content,
            CellContent::Formula("=A1&\"x\"".into())
        );
        assert_eq!(ws.cell_at(2, 2).unwrap().content, CellContent::Int(3));
        assert_eq!(ws.cell_at(2, 2).unwrap().format_code(), "0.00");
    }

    #[test]
    fn test_read_shared_strings() {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut buffer);
            let parts = [
                ("[Content_Types].xml", "<Types/>"),
                (
                    "xl/workbook.xml",
                    r#"<workbook xmlns:r="r"><sheets><sheet name="S" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
                ),
                (
                    "xl/_rels/workbook.xml.rels",
                    r#"<Relationships><Relationship Id="rId1" Type="x/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#,
                ),
                (
                    "xl/sharedStrings.xml",
                    r#"<sst><si><t>first</t></si><si><r><t>rich </t></r><r><t>text</t></r></si></sst>"#,
                ),
                (
                    "xl/worksheets/sheet1.xml",
                    r#"<worksheet><sheetData><row r="1"><c r="A1" t="s"><v>1</v></c><c r="B1" t="b"><v>1</v></c></row></sheetData><sheetProtection sheet="1"/></worksheet>"#,
                ),
            ];
            for (name, content) in parts {
                zip.start_file(name, zip::write::SimpleFileOptions::default())
                    .unwrap();
                zip.write_all(content.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
        }
        buffer.set_position(0);

        let wb = XlsxReader::read(buffer).unwrap();
        let ws = wb.worksheet(0).unwrap();
        assert_eq!(ws.cell_at(1, 1).unwrap().content, CellContent::Text("rich text".into()));
        // Booleans are outside the supported value set and fall back to text
        assert_eq!(ws.cell_at(1, 2).unwrap().content, CellContent::Text("1".into()));
        assert!(ws.is_protected());
    }
}
