//! Minimal PDF 1.4 writer for laid-out report documents.
//!
//! Text uses the standard Helvetica fonts with WinAnsi encoding, so no font
//! data is embedded. Images are embedded in their original compressed form.

use std::fmt::Write as _;

use crate::report::layout::{DrawOp, ReportDocument, Rgb};
use crate::{ImageEncoding, LogoImage};

const MM_TO_PT: f32 = 72.0 / 25.4;
const CATALOG: usize = 1;
const PAGES: usize = 2;
const FONT_REGULAR: usize = 3;
const FONT_BOLD: usize = 4;
const IMAGE: usize = 5;

struct PdfWriter {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn new(object_count: usize) -> Self {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        Self {
            buf,
            offsets: vec![0; object_count + 1],
        }
    }

    fn object(&mut self, id: usize, body: &str) {
        self.offsets[id] = self.buf.len();
        self.buf
            .extend_from_slice(format!("{id} 0 obj\n{body}\nendobj\n").as_bytes());
    }

    fn stream(&mut self, id: usize, dict: &str, data: &[u8]) {
        self.offsets[id] = self.buf.len();
        self.buf.extend_from_slice(
            format!("{id} 0 obj\n<< {dict} /Length {} >>\nstream\n", data.len()).as_bytes(),
        );
        self.buf.extend_from_slice(data);
        self.buf.extend_from_slice(b"\nendstream\nendobj\n");
    }

    fn finish(mut self) -> Vec<u8> {
        let xref_at = self.buf.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", self.offsets.len());
        for offset in &self.offsets[1..] {
            let _ = writeln!(xref, "{offset:010} 00000 n ");
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {} /Root {CATALOG} 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
            self.offsets.len()
        );
        self.buf.extend_from_slice(xref.as_bytes());
        self.buf
    }
}

/// Serializes the document. Object ids: catalog, page tree, two fonts, the
/// optional logo, then a page/content pair per page.
pub fn render_pdf(document: &ReportDocument) -> Vec<u8> {
    let first_page = if document.logo.is_some() {
        IMAGE + 1
    } else {
        IMAGE
    };
    let object_count = first_page + 2 * document.pages.len() - 1;
    let mut pdf = PdfWriter::new(object_count);

    pdf.object(CATALOG, &format!("<< /Type /Catalog /Pages {PAGES} 0 R >>"));
    let kids: Vec<String> = (0..document.pages.len())
        .map(|index| format!("{} 0 R", first_page + 2 * index))
        .collect();
    pdf.object(
        PAGES,
        &format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            document.pages.len()
        ),
    );
    pdf.object(FONT_REGULAR, &font_dict("Helvetica"));
    pdf.object(FONT_BOLD, &font_dict("Helvetica-Bold"));
    if let Some(logo) = &document.logo {
        pdf.stream(IMAGE, &image_dict(logo), &logo.data);
    }

    let media_box = format!(
        "[0 0 {} {}]",
        pt(document.page_width),
        pt(document.page_height)
    );
    let x_object = if document.logo.is_some() {
        format!(" /XObject << /Im1 {IMAGE} 0 R >>")
    } else {
        String::new()
    };
    for (index, page) in document.pages.iter().enumerate() {
        let page_id = first_page + 2 * index;
        let content_id = page_id + 1;
        pdf.object(
            page_id,
            &format!(
                "<< /Type /Page /Parent {PAGES} 0 R /MediaBox {media_box} \
                 /Resources << /Font << /F1 {FONT_REGULAR} 0 R /F2 {FONT_BOLD} 0 R >>{x_object} >> \
                 /Contents {content_id} 0 R >>"
            ),
        );
        let content = page_content(&page.ops, document.page_height, document.logo.is_some());
        pdf.stream(content_id, "", &content);
    }

    pdf.finish()
}

fn page_content(ops: &[DrawOp], page_height: f32, has_logo: bool) -> Vec<u8> {
    let mut out = Vec::new();
    for op in ops {
        match op {
            DrawOp::Text {
                x,
                y,
                size,
                bold,
                color,
                text,
            } => {
                let font = if *bold { "F2" } else { "F1" };
                out.extend_from_slice(
                    format!(
                        "BT /{font} {size} Tf {} rg {} {} Td (",
                        rgb(*color),
                        pt(*x),
                        pt(page_height - y)
                    )
                    .as_bytes(),
                );
                out.extend(encode_text(text));
                out.extend_from_slice(b") Tj ET\n");
            }
            DrawOp::Line { x1, y1, x2, y2 } => {
                out.extend_from_slice(
                    format!(
                        "0.5 w 0 0 0 RG {} {} m {} {} l S\n",
                        pt(*x1),
                        pt(page_height - y1),
                        pt(*x2),
                        pt(page_height - y2)
                    )
                    .as_bytes(),
                );
            }
            DrawOp::FillRect {
                x,
                y,
                width,
                height,
                color,
            } => {
                out.extend_from_slice(
                    format!(
                        "{} rg {} {} {} {} re f\n",
                        rgb(*color),
                        pt(*x),
                        pt(page_height - y - height),
                        pt(*width),
                        pt(*height)
                    )
                    .as_bytes(),
                );
            }
            DrawOp::Image {
                x,
                y,
                width,
                height,
            } if has_logo => {
                out.extend_from_slice(
                    format!(
                        "q {} 0 0 {} {} {} cm /Im1 Do Q\n",
                        pt(*width),
                        pt(*height),
                        pt(*x),
                        pt(page_height - y - height)
                    )
                    .as_bytes(),
                );
            }
            DrawOp::Image { .. } => {}
        }
    }
    out
}

fn font_dict(base: &str) -> String {
    format!("<< /Type /Font /Subtype /Type1 /BaseFont /{base} /Encoding /WinAnsiEncoding >>")
}

fn image_dict(logo: &LogoImage) -> String {
    let size = format!(
        "/Type /XObject /Subtype /Image /Width {} /Height {} /BitsPerComponent 8",
        logo.width, logo.height
    );
    match &logo.encoding {
        ImageEncoding::Jpeg { components } => {
            let space = match components {
                1 => "/DeviceGray",
                4 => "/DeviceCMYK",
                _ => "/DeviceRGB",
            };
            format!("{size} /ColorSpace {space} /Filter /DCTDecode")
        }
        ImageEncoding::Png { colors, palette } => {
            let space = match (colors, palette) {
                (_, Some(palette)) => {
                    let hex: String = palette.iter().map(|b| format!("{b:02X}")).collect();
                    format!(
                        "[/Indexed /DeviceRGB {} <{hex}>]",
                        (palette.len() / 3).saturating_sub(1)
                    )
                }
                (1, None) => "/DeviceGray".to_string(),
                _ => "/DeviceRGB".to_string(),
            };
            format!(
                "{size} /ColorSpace {space} /Filter /FlateDecode \
                 /DecodeParms << /Predictor 15 /Colors {colors} /BitsPerComponent 8 /Columns {} >>",
                logo.width
            )
        }
    }
}

/// Escapes a PDF string literal. Characters outside Latin-1 become `?`.
fn encode_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '(' | ')' | '\\' => {
                out.push(b'\\');
                out.push(ch as u8);
            }
            ' '..='~' => out.push(ch as u8),
            '\u{A0}'..='\u{FF}' => {
                out.extend_from_slice(format!("\\{:03o}", ch as u32).as_bytes());
            }
            _ => out.push(b'?'),
        }
    }
    out
}

fn pt(mm: f32) -> String {
    format!("{:.2}", mm * MM_TO_PT)
}

fn rgb(color: Rgb) -> String {
    format!(
        "{:.3} {:.3} {:.3}",
        f32::from(color.0) / 255.0,
        f32::from(color.1) / 255.0,
        f32::from(color.2) / 255.0
    )
}
