use std::collections::HashSet;

use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::error::Error;
use crate::fonts::FontFace;
use crate::model::{Alignment, DrawOp, Document, Stroke, TextColor, TextRun};

const FONT_NAME: &[u8] = b"F1";
const LINE_WIDTH: f32 = 1.0;
const LIGHT_GRAY: f32 = 0xBB as f32 / 255.0;
const MUTED_GRAY: f32 = 0x66 as f32 / 255.0;

fn stroke_gray(stroke: Stroke) -> f32 {
    match stroke {
        Stroke::Regular => 0.0,
        Stroke::Light => LIGHT_GRAY,
    }
}

fn fill_gray(color: TextColor) -> f32 {
    match color {
        TextColor::Black => 0.0,
        TextColor::Muted => MUTED_GRAY,
    }
}

/// Left edge of a line of text inside its box.
fn line_start_x(run: &TextRun, face: &FontFace) -> f32 {
    let w = face.text_width(&run.text, run.font_size);
    match run.align {
        Alignment::Left => run.x,
        Alignment::Center => run.x + (run.width - w) / 2.0,
        Alignment::Right => run.x + run.width - w,
    }
}

fn op_is_finite(op: &DrawOp) -> bool {
    match op {
        DrawOp::Text(run) => [run.x, run.y, run.width, run.font_size]
            .iter()
            .all(|v| v.is_finite()),
        DrawOp::Line { x1, y1, x2, y2, .. } => [x1, y1, x2, y2].iter().all(|v| v.is_finite()),
        DrawOp::Rect {
            x,
            y,
            width,
            height,
            ..
        } => [x, y, width, height].iter().all(|v| v.is_finite()),
    }
}

/// Write the page content, flipping the document's top-down y axis.
fn write_content(
    content: &mut Content,
    doc: &Document,
    face: &FontFace,
    encode: impl Fn(&str) -> Vec<u8>,
) -> Result<(), Error> {
    if let Some(bad) = doc.ops.iter().position(|op| !op_is_finite(op)) {
        return Err(Error::Pdf(format!("draw op {bad} has a non-finite coordinate")));
    }
    let page_h = doc.page_height;
    let mut cur_stroke: Option<Stroke> = None;
    let mut cur_fill: Option<TextColor> = None;

    content.set_line_width(LINE_WIDTH);
    for op in &doc.ops {
        match op {
            DrawOp::Rect {
                x,
                y,
                width,
                height,
                stroke,
            } => {
                if cur_stroke != Some(*stroke) {
                    content.set_stroke_gray(stroke_gray(*stroke));
                    cur_stroke = Some(*stroke);
                }
                content.rect(*x, page_h - y - height, *width, *height);
                content.stroke();
            }
            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                stroke,
            } => {
                if cur_stroke != Some(*stroke) {
                    content.set_stroke_gray(stroke_gray(*stroke));
                    cur_stroke = Some(*stroke);
                }
                content.move_to(*x1, page_h - y1);
                content.line_to(*x2, page_h - y2);
                content.stroke();
            }
            DrawOp::Text(run) => {
                let bytes = encode(&run.text);
                if bytes.is_empty() {
                    continue;
                }
                if cur_fill != Some(run.color) {
                    content.set_fill_gray(fill_gray(run.color));
                    cur_fill = Some(run.color);
                }
                let x = line_start_x(run, face);
                let baseline = page_h - run.y - run.font_size * face.ascender_ratio();
                content.begin_text();
                content.set_font(Name(FONT_NAME), run.font_size);
                content.next_line(x, baseline);
                content.show(Str(&bytes));
                content.end_text();
            }
        }
    }
    Ok(())
}

/// Encode a laid-out page as a single-page PDF.
///
/// Output is deterministic: the same document and face give the same bytes.
pub fn encode_pdf(doc: &Document, face: &FontFace, title: &str) -> Result<Vec<u8>, Error> {
    let t0 = std::time::Instant::now();
    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();
    let page_id = alloc();
    let content_id = alloc();
    let info_id = alloc();

    let used_chars: HashSet<char> = doc.text_runs().flat_map(|r| r.text.chars()).collect();
    let missing: HashSet<char> = used_chars
        .iter()
        .copied()
        .filter(|&c| !c.is_whitespace() && !face.has_glyph(c))
        .collect();
    if !missing.is_empty() {
        log::debug!("{} has no glyphs for {:?}", face.name(), missing);
    }

    let font = face.register(&mut pdf, &mut alloc, &used_chars);
    let t_fonts = t0.elapsed();

    let mut content = Content::new();
    write_content(&mut content, doc, face, |text| font.encode(text))?;
    let raw = content.finish();
    let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
    pdf.stream(content_id, &compressed).filter(Filter::FlateDecode);

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id).kids([page_id]).count(1);
    {
        let mut page = pdf.page(page_id);
        page.media_box(Rect::new(0.0, 0.0, doc.page_width, doc.page_height))
            .parent(pages_id)
            .contents(content_id);
        page.resources().fonts().pair(Name(FONT_NAME), font.font_ref);
    }
    pdf.document_info(info_id)
        .title(TextStr(title))
        .producer(TextStr(concat!("payslip-pdf ", env!("CARGO_PKG_VERSION"))));

    let bytes = pdf.finish();

    log::debug!(
        "encode_pdf: fonts={:.1}ms, total={:.1}ms, {} ops, {} bytes",
        t_fonts.as_secs_f64() * 1000.0,
        t0.elapsed().as_secs_f64() * 1000.0,
        doc.ops.len(),
        bytes.len(),
    );
    Ok(bytes)
}
