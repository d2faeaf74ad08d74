//! Minimal single-purpose PDF writer.
//!
//! Renders a title plus monospaced text lines into an uncompressed PDF 1.4
//! document. This covers exactly what report export needs; it is not a
//! general PDF library.

/// Page height in points (US Letter).
const PAGE_HEIGHT: f32 = 792.0;
/// Page width in points.
const PAGE_WIDTH: f32 = 612.0;
/// Text lines per page after the title.
const LINES_PER_PAGE: usize = 50;

/// Render a text document: a title on the first page, then `lines` flowing
/// across as many pages as needed.
#[must_use]
pub fn render_text_document(title: &str, lines: &[String]) -> Vec<u8> {
    let pages: Vec<&[String]> = if lines.is_empty() {
        vec![&[]]
    } else {
        lines.chunks(LINES_PER_PAGE).collect()
    };
    let page_count = pages.len();

    // Object layout: 1 = catalog, 2 = pages, 3 = font, then for page i
    // (0-based): 4 + 2i = page, 5 + 2i = content stream.
    let mut objects: Vec<Vec<u8>> = Vec::with_capacity(3 + 2 * page_count);

    let kids: Vec<String> = (0..page_count).map(|i| format!("{} 0 R", 4 + 2 * i)).collect();
    objects.push(b"<< /Type /Catalog /Pages 2 0 R >>".to_vec());
    objects.push(
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            page_count
        )
        .into_bytes(),
    );
    objects.push(b"<< /Type /Font /Subtype /Type1 /BaseFont /Courier >>".to_vec());

    for (i, page_lines) in pages.iter().enumerate() {
        let content = page_content(if i == 0 { Some(title) } else { None }, page_lines);
        objects.push(
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
                 /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                5 + 2 * i
            )
            .into_bytes(),
        );

        let mut stream = Vec::new();
        stream.extend_from_slice(
            format!("<< /Length {} >>\nstream\n", content.len()).as_bytes(),
        );
        stream.extend_from_slice(content.as_bytes());
        stream.extend_from_slice(b"\nendstream");
        objects.push(stream);
    }

    let mut out = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n");

    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_offset = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        )
        .as_bytes(),
    );

    out
}

fn page_content(title: Option<&str>, lines: &[String]) -> String {
    let mut content = String::from("BT\n");

    let mut y = PAGE_HEIGHT - 50.0;
    if let Some(title) = title {
        content.push_str("/F1 14 Tf\n");
        content.push_str(&format!("50 {y} Td\n({}) Tj\n", escape(title)));
        y -= 28.0;
        content.push_str("/F1 9 Tf\n0 -28 Td\n");
    } else {
        content.push_str("/F1 9 Tf\n");
        content.push_str(&format!("50 {y} Td\n"));
    }
    let _ = y;

    for line in lines {
        content.push_str(&format!("({}) Tj\n0 -13 Td\n", escape(line)));
    }

    content.push_str("ET");
    content
}

/// Escape characters with meaning inside PDF string literals.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '(' => escaped.push_str("\\("),
            ')' => escaped.push_str("\\)"),
            '\n' | '\r' => escaped.push(' '),
            c if c.is_ascii() => escaped.push(c),
            // Courier has no glyphs beyond Latin-1; drop to '?'
            _ => escaped.push('?'),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_has_pdf_framing() {
        let doc = render_text_document("Complaint Report", &["Total: 3".to_string()]);
        assert!(doc.starts_with(b"%PDF-1.4"));
        assert!(doc.ends_with(b"%%EOF\n"));
    }

    #[test]
    fn test_title_and_lines_present() {
        let doc = render_text_document(
            "Complaint Report",
            &["Total: 3".to_string(), "Resolved: 1".to_string()],
        );
        let text = String::from_utf8_lossy(&doc);
        assert!(text.contains("(Complaint Report) Tj"));
        assert!(text.contains("(Total: 3) Tj"));
        assert!(text.contains("(Resolved: 1) Tj"));
    }

    #[test]
    fn test_escapes_parentheses() {
        let doc = render_text_document("Report (draft)", &[]);
        let text = String::from_utf8_lossy(&doc);
        assert!(text.contains("(Report \\(draft\\)) Tj"));
    }

    #[test]
    fn test_long_reports_span_pages() {
        let lines: Vec<String> = (0..120).map(|i| format!("Row {i}")).collect();
        let doc = render_text_document("Report", &lines);
        let text = String::from_utf8_lossy(&doc);
        assert!(text.contains("/Count 3"));
    }
}
