//! Minimal single-page PDF writer for note reports.
//!
//! Emits a PDF 1.4 file with one A4 page and the standard Helvetica face, so
//! no font data is embedded. Text is encoded as WinAnsi; characters
//! outside that set are replaced with `?`.

use std::fmt::Write as _;

use super::NoteReport;

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 56.0;
const TITLE_SIZE: f32 = 20.0;
const FIELD_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 14.0;
const LINE_SPACING: f32 = 1.35;
const FIELD_GAP: f32 = 10.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

/// Helvetica advance widths (AFM units per 1000 em) for WinAnsi 32..=126.
const ASCII_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

/// Cursor that lays lines top-down and drops whatever falls off the page.
struct PageWriter {
    content: Vec<u8>,
    y: f32,
    dropped: usize,
}

impl PageWriter {
    fn new() -> Self {
        Self {
            content: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
            dropped: 0,
        }
    }

    fn line(&mut self, size: f32, text: &str) {
        let next = self.y - size * LINE_SPACING;
        if next < MARGIN {
            self.dropped += 1;
            return;
        }
        self.y = next;

        let mut op = String::new();
        let _ = write!(
            op,
            "BT /F1 {size:.0} Tf {MARGIN:.0} {:.2} Td (",
            self.y
        );
        self.content.extend_from_slice(op.as_bytes());
        self.content.extend(encode_text(text));
        self.content.extend_from_slice(b") Tj ET\n");
    }

    /// `Label: value`, wrapped to the page width.
    fn field(&mut self, label: &str, size: f32, value: &str) {
        let text = format!("{label}: {value}");
        for line in wrap_text(&text, size, CONTENT_WIDTH) {
            self.line(size, &line);
        }
        self.y -= FIELD_GAP;
    }
}

pub(super) fn render_report(report: &NoteReport) -> Vec<u8> {
    let mut page = PageWriter::new();
    for (label, value) in report.fields() {
        let size = match label {
            "Asunto" => TITLE_SIZE,
            "Detalles" => BODY_SIZE,
            _ => FIELD_SIZE,
        };
        page.field(label, size, value);
    }

    if page.dropped > 0 {
        tracing::warn!(
            "Report for '{}' does not fit on one page; {} line(s) omitted",
            report.title,
            page.dropped
        );
    }

    write_document(&page.content)
}

fn write_document(content: &[u8]) -> Vec<u8> {
    let mut objects: Vec<Vec<u8>> = vec![
        b"<< /Type /Catalog /Pages 2 0 R >>".to_vec(),
        b"<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_vec(),
        format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH:.0} {PAGE_HEIGHT:.0}] \
             /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>"
        )
        .into_bytes(),
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_vec(),
    ];

    let mut stream = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
    stream.extend_from_slice(content);
    stream.extend_from_slice(b"\nendstream");
    objects.push(stream);

    let mut out = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (index, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", index + 1).as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_offset = out.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        let _ = writeln!(xref, "{offset:010} 00000 n ");
    }
    let _ = write!(
        xref,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
        objects.len() + 1
    );
    out.extend_from_slice(xref.as_bytes());
    out
}

/// Advance width of one WinAnsi byte in Helvetica, in AFM units.
fn glyph_width(byte: u8) -> u16 {
    match byte {
        32..=126 => ASCII_WIDTHS[usize::from(byte - 32)],
        0x82 | 0x91 | 0x92 => 222,
        0x84 | 0x93 | 0x94 | 0xA1 | 0xA8 | 0xAD | 0xAF | 0xB2 | 0xB3 | 0xB4 | 0xB8 | 0xB9 => 333,
        0x85 | 0x97 | 0xC6 => 1000,
        0x95 => 350,
        0xA0 | 0xB7 | 0xCC..=0xCF | 0xEC..=0xEF => 278,
        0xA6 => 260,
        0xA9 | 0xAE => 737,
        0xAA => 370,
        0xAC | 0xB1 | 0xD7 | 0xF7 => 584,
        0xB0 => 400,
        0xB6 => 537,
        0xBA => 365,
        0xBC..=0xBE => 834,
        0xBF | 0xDF | 0xF8 => 611,
        0xC0..=0xC5 | 0xC8..=0xCB | 0xDD | 0xDE => 667,
        0xC7 | 0xD0 | 0xD1 | 0xD9..=0xDC => 722,
        0xD2..=0xD6 | 0xD8 => 778,
        0xE6 => 889,
        0xE7 | 0xFD | 0xFF => 500,
        _ => 556,
    }
}

fn char_width(ch: char, size: f32) -> f32 {
    f32::from(glyph_width(win_ansi_byte(ch))) * size / 1000.0
}

fn text_width(text: &str, size: f32) -> f32 {
    text.chars().map(|ch| char_width(ch, size)).sum()
}

/// Greedy word wrap to `max_width` points at `size`. Explicit newlines are
/// kept and words wider than a line are split between characters.
fn wrap_text(text: &str, size: f32, max_width: f32) -> Vec<String> {
    let space = char_width(' ', size);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_width = 0.0;

        for word in paragraph.split_whitespace() {
            let word_width = text_width(word, size);
            if !current.is_empty() && current_width + space + word_width > max_width {
                lines.push(std::mem::take(&mut current));
                current_width = 0.0;
            }

            if word_width > max_width {
                for ch in word.chars() {
                    let width = char_width(ch, size);
                    if !current.is_empty() && current_width + width > max_width {
                        lines.push(std::mem::take(&mut current));
                        current_width = 0.0;
                    }
                    current.push(ch);
                    current_width += width;
                }
                continue;
            }

            if !current.is_empty() {
                current.push(' ');
                current_width += space;
            }
            current.push_str(word);
            current_width += word_width;
        }

        lines.push(current);
    }

    lines
}

fn encode_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        match win_ansi_byte(ch) {
            b'(' | b')' | b'\\' => {
                out.push(b'\\');
                out.push(ch as u8);
            }
            byte => out.push(byte),
        }
    }
    out
}

#[allow(clippy::cast_possible_truncation)]
fn win_ansi_byte(ch: char) -> u8 {
    match ch {
        ' '..='~' | '\u{A0}'..='\u{FF}' => ch as u8,
        '\t' => b' ',
        '€' => 0x80,
        '‚' => 0x82,
        '„' => 0x84,
        '…' => 0x85,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        _ => b'?',
    }
}
