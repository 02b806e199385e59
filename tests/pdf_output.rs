mod common;

use std::path::{Path, PathBuf};

use payslip_pdf::{Config, FontFace, encode_pdf, render};

fn slip_pdf(face: &FontFace) -> Vec<u8> {
    let doc = render(&common::company(), &common::record("C-100"), face).unwrap();
    encode_pdf(&doc, face, "Pay Slip C-100 - March 2024").unwrap()
}

#[test]
fn output_is_a_single_page_pdf() {
    let bytes = slip_pdf(&FontFace::builtin());
    assert!(bytes.starts_with(b"%PDF-"));
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("/Count 1"));
    assert!(text.contains("/FlateDecode"));
    assert!(text.contains("Pay Slip C-100 - March 2024"));
    assert!(text.trim_end().ends_with("%%EOF"));
}

#[test]
fn encoding_is_deterministic() {
    let face = FontFace::builtin();
    assert_eq!(slip_pdf(&face), slip_pdf(&face));
}

#[test]
fn builtin_face_uses_standard_helvetica() {
    let face = FontFace::builtin();
    assert!(face.is_builtin());
    let text = String::from_utf8_lossy(&slip_pdf(&face)).into_owned();
    assert!(text.contains("/Helvetica"));
    assert!(text.contains("/WinAnsiEncoding"));
}

#[test]
fn missing_font_file_is_an_error() {
    assert!(FontFace::load(Path::new("/nonexistent/payslip-font.ttf")).is_err());
}

#[test]
fn garbage_font_bytes_are_rejected() {
    assert!(FontFace::from_bytes(vec![0u8; 64], 0).is_err());
}

#[test]
fn unusable_font_still_renders() {
    let config = Config {
        font_path: PathBuf::from("/nonexistent/payslip-font.ttf"),
        font_family: "No Such Family".to_string(),
        font_dirs: vec![common::temp_dir("empty-fonts")],
        ..Config::default()
    };
    let face = FontFace::resolve(&config);
    assert!(face.is_builtin());
    let bytes = slip_pdf(&face);
    assert!(bytes.starts_with(b"%PDF-"));
}

#[test]
fn non_finite_geometry_is_rejected() {
    let face = FontFace::builtin();
    let mut doc = render(&common::company(), &common::record("C-100"), &face).unwrap();
    doc.ops.push(payslip_pdf::DrawOp::Line {
        x1: 0.0,
        y1: f32::NAN,
        x2: 10.0,
        y2: 10.0,
        stroke: payslip_pdf::Stroke::Light,
    });
    let err = encode_pdf(&doc, &face, "broken").unwrap_err();
    assert!(matches!(err, payslip_pdf::Error::Pdf(_)), "{err}");
}
