use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use memmap2::Mmap;
use pdf_writer::{Name, Pdf, Rect, Ref};
use ttf_parser::Face;

use crate::config::Config;
use crate::error::Error;

// Helvetica AFM vertical metrics (1000 units/em)
const HELVETICA_ASCENDER: f32 = 718.0;
const HELVETICA_DESCENDER: f32 = -207.0;
const HELVETICA_LINE_GAP: f32 = 231.0;

#[derive(Clone)]
enum FaceSource {
    Builtin,
    TrueType { data: Arc<Vec<u8>>, face_index: u32 },
}

/// Metrics for the one face a payslip is set in.
///
/// Shared read-only across all renders in a batch; embedding happens per PDF.
#[derive(Clone)]
pub struct FontFace {
    name: String,
    source: FaceSource,
    /// char -> (glyph id, advance in 1000-units)
    glyphs: HashMap<char, (u16, f32)>,
    line_h_ratio: f32,
    ascender_ratio: f32,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("name", &self.name)
            .field("builtin", &self.is_builtin())
            .field("glyphs", &self.glyphs.len())
            .finish()
    }
}

impl FontFace {
    /// Built-in Helvetica metrics. Characters outside WinAnsi measure zero.
    pub fn builtin() -> Self {
        let glyphs = (32u8..=255u8)
            .filter_map(|b| {
                let ch = winansi_to_char(b);
                // 0x7F and the unassigned 0x8x/0x9x slots have no glyph
                if (0x7F..=0x9F).contains(&b) && ch as u32 == b as u32 {
                    return None;
                }
                Some((ch, (0u16, helvetica_width(b))))
            })
            .collect();
        FontFace {
            name: "Helvetica".to_string(),
            source: FaceSource::Builtin,
            glyphs,
            line_h_ratio: (HELVETICA_ASCENDER - HELVETICA_DESCENDER + HELVETICA_LINE_GAP) / 1000.0,
            ascender_ratio: HELVETICA_ASCENDER / 1000.0,
        }
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let data = std::fs::read(path)
            .map_err(|e| Error::Font(format!("{}: {e}", path.display())))?;
        Self::from_bytes(data, 0)
            .map_err(|e| Error::Font(format!("{}: {e}", path.display())))
    }

    pub fn from_bytes(data: Vec<u8>, face_index: u32) -> Result<Self, Error> {
        let face = Face::parse(&data, face_index)
            .map_err(|e| Error::Font(format!("cannot parse font: {e}")))?;
        let units = face.units_per_em() as f32;

        let mut glyphs = HashMap::new();
        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables {
                if !subtable.is_unicode() {
                    continue;
                }
                subtable.codepoints(|cp| {
                    let Some(ch) = char::from_u32(cp) else {
                        return;
                    };
                    if let Some(gid) = face.glyph_index(ch) {
                        let adv = face
                            .glyph_hor_advance(gid)
                            .map(|a| a as f32 / units * 1000.0)
                            .unwrap_or(0.0);
                        glyphs.entry(ch).or_insert((gid.0, adv));
                    }
                });
            }
        }
        if glyphs.is_empty() {
            return Err(Error::Font("font has no Unicode cmap".into()));
        }

        let line_gap = face.line_gap() as f32;
        let line_h_ratio = (face.ascender() as f32 - face.descender() as f32 + line_gap) / units;
        let ascender_ratio = face.ascender() as f32 / units;
        let name = font_family_name(&face).unwrap_or_else(|| "Embedded".to_string());

        Ok(FontFace {
            name,
            source: FaceSource::TrueType {
                data: Arc::new(data),
                face_index,
            },
            glyphs,
            line_h_ratio,
            ascender_ratio,
        })
    }

    /// Configured file, then the configured family in the font directories, then Helvetica.
    pub fn resolve(config: &Config) -> Self {
        let t0 = std::time::Instant::now();
        match Self::load(&config.font_path) {
            Ok(face) => {
                log::info!("Using font {} from {}", face.name, config.font_path.display());
                return face;
            }
            Err(e) => log::warn!("Font loading error: {e}"),
        }

        let found = find_family_file(&config.font_family, &config.font_dirs);
        if let Some((path, face_index)) = found {
            let loaded = std::fs::read(&path)
                .map_err(Error::Io)
                .and_then(|data| Self::from_bytes(data, face_index));
            match loaded {
                Ok(face) => {
                    log::info!(
                        "Using system font {} from {} ({:.1}ms)",
                        face.name,
                        path.display(),
                        t0.elapsed().as_secs_f64() * 1000.0,
                    );
                    return face;
                }
                Err(e) => log::warn!("Font loading error: {}: {e}", path.display()),
            }
        }

        log::warn!("No usable font found, falling back to Helvetica");
        Self::builtin()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self.source, FaceSource::Builtin)
    }

    pub fn has_glyph(&self, ch: char) -> bool {
        self.glyphs.contains_key(&ch)
    }

    /// Line box height as a multiple of the font size.
    pub fn line_height_ratio(&self) -> f32 {
        self.line_h_ratio
    }

    pub fn ascender_ratio(&self) -> f32 {
        self.ascender_ratio
    }

    pub fn line_height(&self, font_size: f32) -> f32 {
        font_size * self.line_h_ratio
    }

    pub(crate) fn char_width_1000(&self, ch: char) -> f32 {
        self.glyphs.get(&ch).map_or(0.0, |&(_, w)| w)
    }

    pub fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars()
            .map(|ch| self.char_width_1000(ch) * font_size / 1000.0)
            .sum()
    }

    pub fn space_width(&self, font_size: f32) -> f32 {
        self.char_width_1000(' ') * font_size / 1000.0
    }

    /// Write the face into `pdf` and return how text must be encoded for it.
    pub(crate) fn register(
        &self,
        pdf: &mut Pdf,
        alloc: &mut impl FnMut() -> Ref,
        used_chars: &HashSet<char>,
    ) -> RegisteredFont {
        let font_ref = alloc();
        if let FaceSource::TrueType { data, face_index } = &self.source {
            let descriptor_ref = alloc();
            let data_ref = alloc();
            if let Some(char_to_gid) = embed_truetype(
                pdf,
                font_ref,
                descriptor_ref,
                data_ref,
                &self.name,
                data,
                *face_index,
                used_chars,
                alloc,
            ) {
                return RegisteredFont {
                    font_ref,
                    char_to_gid: Some(char_to_gid),
                };
            }
            log::warn!("Embedding {} failed, using Helvetica", self.name);
        }
        pdf.type1_font(font_ref)
            .base_font(Name(b"Helvetica"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        RegisteredFont {
            font_ref,
            char_to_gid: None,
        }
    }
}

pub(crate) struct RegisteredFont {
    pub(crate) font_ref: Ref,
    char_to_gid: Option<HashMap<char, u16>>,
}

impl RegisteredFont {
    pub(crate) fn encode(&self, text: &str) -> Vec<u8> {
        match &self.char_to_gid {
            Some(map) => encode_as_gids(text, map),
            None => to_winansi_bytes(text),
        }
    }
}

fn font_family_name(face: &Face) -> Option<String> {
    for name in face.names() {
        if name.name_id == ttf_parser::name_id::FAMILY
            && name.is_unicode()
            && let Some(s) = name.to_string()
        {
            return Some(s);
        }
    }
    None
}

/// Configured directories first, then the platform font directories.
fn font_directories(extra: &[PathBuf]) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = extra.to_vec();

    #[cfg(target_os = "macos")]
    {
        dirs.extend([
            "/Library/Fonts".into(),
            "/System/Library/Fonts".into(),
            "/System/Library/Fonts/Supplemental".into(),
        ]);
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(home).join("Library/Fonts"));
        }
    }

    #[cfg(target_os = "linux")]
    {
        dirs.extend(["/usr/share/fonts".into(), "/usr/local/share/fonts".into()]);
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(home).join(".local/share/fonts"));
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(windir) = std::env::var("WINDIR") {
            dirs.push(PathBuf::from(windir).join("Fonts"));
        } else {
            dirs.push("C:\\Windows\\Fonts".into());
        }
    }

    dirs
}

fn is_font_file(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref(),
        Some("ttf" | "otf" | "ttc")
    )
}

/// Regular (non-bold, non-italic) face of `family`, searching directories depth-first.
fn find_family_file(family: &str, extra_dirs: &[PathBuf]) -> Option<(PathBuf, u32)> {
    let wanted = family.to_lowercase();
    let mut visited: HashSet<PathBuf> = HashSet::new();
    let mut stack = font_directories(extra_dirs);
    stack.reverse();

    while let Some(dir) = stack.pop() {
        if !visited.insert(dir.clone()) {
            continue;
        }
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        let mut paths: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
        paths.sort();
        for path in paths {
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            if !is_font_file(&path) {
                continue;
            }
            let Ok(file) = std::fs::File::open(&path) else {
                continue;
            };
            let Ok(data) = (unsafe { Mmap::map(&file) }) else {
                continue;
            };
            let face_count = ttf_parser::fonts_in_collection(&data).unwrap_or(1);
            for face_idx in 0..face_count {
                let Ok(face) = Face::parse(&data, face_idx) else {
                    continue;
                };
                if face.is_bold() || face.is_italic() {
                    continue;
                }
                if font_family_name(&face).is_some_and(|f| f.to_lowercase() == wanted) {
                    return Some((path, face_idx));
                }
            }
        }
    }
    None
}

/// Windows-1252 (WinAnsi) byte to Unicode char mapping.
/// Bytes 0x80-0x9F are remapped; all others map directly to their Unicode codepoint.
fn winansi_to_char(byte: u8) -> char {
    match byte {
        0x80 => '\u{20AC}',
        0x82 => '\u{201A}',
        0x83 => '\u{0192}',
        0x84 => '\u{201E}',
        0x85 => '\u{2026}',
        0x86 => '\u{2020}',
        0x87 => '\u{2021}',
        0x88 => '\u{02C6}',
        0x89 => '\u{2030}',
        0x8A => '\u{0160}',
        0x8B => '\u{2039}',
        0x8C => '\u{0152}',
        0x8E => '\u{017D}',
        0x91 => '\u{2018}',
        0x92 => '\u{2019}',
        0x93 => '\u{201C}',
        0x94 => '\u{201D}',
        0x95 => '\u{2022}',
        0x96 => '\u{2013}',
        0x97 => '\u{2014}',
        0x98 => '\u{02DC}',
        0x99 => '\u{2122}',
        0x9A => '\u{0161}',
        0x9B => '\u{203A}',
        0x9C => '\u{0153}',
        0x9E => '\u{017E}',
        0x9F => '\u{0178}',
        _ => byte as char,
    }
}

/// Map a single Unicode char to its WinAnsi byte, or None if unmappable.
fn char_to_winansi(c: char) -> Option<u8> {
    match c as u32 {
        0x0020..=0x007E | 0x00A0..=0x00FF => Some(c as u8),
        _ => (0x80u8..=0x9F).find(|&b| winansi_to_char(b) == c && b as char != c),
    }
}

/// Convert a UTF-8 string to WinAnsi bytes, dropping characters it cannot express.
pub(crate) fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars().filter_map(char_to_winansi).collect()
}

/// Encode UTF-8 text as big-endian 2-byte glyph IDs for CIDFont content streams.
pub(crate) fn encode_as_gids(text: &str, char_to_gid: &HashMap<char, u16>) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 2);
    for ch in text.chars() {
        let gid = char_to_gid.get(&ch).copied().unwrap_or(0);
        out.push((gid >> 8) as u8);
        out.push((gid & 0xFF) as u8);
    }
    out
}

/// Helvetica AFM advance widths for WinAnsi bytes.
fn helvetica_width(b: u8) -> f32 {
    match b {
        b' ' | b'!' | b',' | b'.' | b'/' | b':' | b';' | b'I' | b'[' | b'\\' | b']' | b'f'
        | b't' => 278.0,
        b'"' => 355.0,
        b'#' | b'$' | b'0'..=b'9' | b'?' | b'L' | b'_' | b'a' | b'b' | b'd' | b'e' | b'g'
        | b'h' | b'n' | b'o' | b'p' | b'q' | b'u' => 556.0,
        b'%' => 889.0,
        b'&' | b'A' | b'B' | b'E' | b'K' | b'P' | b'S' | b'V' | b'X' | b'Y' => 667.0,
        b'\'' => 191.0,
        b'(' | b')' | b'-' | b'`' | b'r' => 333.0,
        b'*' => 389.0,
        b'+' | b'<' | b'=' | b'>' | b'~' => 584.0,
        b'@' => 1015.0,
        b'C' | b'D' | b'H' | b'N' | b'R' | b'U' | b'w' => 722.0,
        b'F' | b'T' | b'Z' => 611.0,
        b'G' | b'O' | b'Q' => 778.0,
        b'J' | b'c' | b'k' | b's' | b'v' | b'x' | b'y' | b'z' => 500.0,
        b'M' | b'm' => 833.0,
        b'W' => 944.0,
        b'^' => 469.0,
        b'i' | b'j' | b'l' => 222.0,
        b'{' | b'}' => 334.0,
        b'|' => 260.0,
        0x95 => 350.0,  // bullet
        0x96 => 556.0,  // en dash
        0x97 => 1000.0, // em dash
        _ => 556.0,
    }
}

/// Embed a TrueType/OpenType font as a CIDFont (Type0 composite) with Identity-H encoding,
/// subsetted to the characters the page uses. Returns the char -> new glyph id map.
fn embed_truetype(
    pdf: &mut Pdf,
    font_ref: Ref,
    descriptor_ref: Ref,
    data_ref: Ref,
    font_name: &str,
    font_data: &[u8],
    face_index: u32,
    used_chars: &HashSet<char>,
    alloc: &mut impl FnMut() -> Ref,
) -> Option<HashMap<char, u16>> {
    let face = Face::parse(font_data, face_index).ok()?;

    let units = face.units_per_em() as f32;
    let ascent = face.ascender() as f32 / units * 1000.0;
    let descent = face.descender() as f32 / units * 1000.0;
    let cap_height = face
        .capital_height()
        .map(|h| h as f32 / units * 1000.0)
        .unwrap_or(700.0);

    let bb = face.global_bounding_box();
    let bbox = Rect::new(
        bb.x_min as f32 / units * 1000.0,
        bb.y_min as f32 / units * 1000.0,
        bb.x_max as f32 / units * 1000.0,
        bb.y_max as f32 / units * 1000.0,
    );

    // Sorted so the subset and its object stream are identical run to run
    let mut chars: Vec<char> = used_chars.iter().copied().collect();
    chars.sort_unstable();

    let mut remapper = subsetter::GlyphRemapper::new();
    let mut char_to_gid = HashMap::new();
    let mut gid_widths: Vec<(u16, f32)> = Vec::new();
    for ch in chars {
        if let Some(gid) = face.glyph_index(ch) {
            let new_gid = remapper.remap(gid.0);
            char_to_gid.insert(ch, new_gid);
            let w = face
                .glyph_hor_advance(gid)
                .map(|adv| adv as f32 / units * 1000.0)
                .unwrap_or(0.0);
            gid_widths.push((new_gid, w));
        }
    }
    gid_widths.sort_by_key(|&(gid, _)| gid);
    gid_widths.dedup_by_key(|&mut (gid, _)| gid);

    let subset_data = subsetter::subset(font_data, face_index, &remapper).unwrap_or_else(|e| {
        log::warn!("Font subsetting failed for {font_name}: {e}, embedding full font");
        font_data.to_vec()
    });

    let data_len = i32::try_from(subset_data.len()).ok()?;
    pdf.stream(data_ref, &subset_data)
        .pair(Name(b"Length1"), data_len);

    let ps_name = font_name.replace(' ', "");

    pdf.font_descriptor(descriptor_ref)
        .name(Name(ps_name.as_bytes()))
        .flags(pdf_writer::types::FontFlags::NON_SYMBOLIC)
        .bbox(bbox)
        .italic_angle(0.0)
        .ascent(ascent)
        .descent(descent)
        .cap_height(cap_height)
        .stem_v(80.0)
        .font_file2(data_ref);

    let cid_font_ref = alloc();
    let system_info = pdf_writer::types::SystemInfo {
        registry: pdf_writer::Str(b"Adobe"),
        ordering: pdf_writer::Str(b"Identity"),
        supplement: 0,
    };
    {
        let mut cid = pdf.cid_font(cid_font_ref);
        cid.subtype(pdf_writer::types::CidFontType::Type2);
        cid.base_font(Name(ps_name.as_bytes()));
        cid.system_info(system_info);
        cid.font_descriptor(descriptor_ref);
        cid.default_width(0.0);
        cid.cid_to_gid_map_predefined(Name(b"Identity"));
        if !gid_widths.is_empty() {
            let mut w = cid.widths();
            for &(gid, width) in &gid_widths {
                w.consecutive(gid, [width]);
            }
        }
    }

    let tounicode_ref = alloc();
    let cmap_name = format!("{}-UTF16", ps_name);
    let mut cmap = pdf_writer::types::UnicodeCmap::new(
        Name(cmap_name.as_bytes()),
        pdf_writer::types::SystemInfo {
            registry: pdf_writer::Str(b"Adobe"),
            ordering: pdf_writer::Str(b"Identity"),
            supplement: 0,
        },
    );
    let mut pairs: Vec<(u16, char)> = char_to_gid.iter().map(|(&ch, &gid)| (gid, ch)).collect();
    pairs.sort_unstable();
    for (gid, ch) in pairs {
        cmap.pair(gid, ch);
    }
    let cmap_data = cmap.finish();
    pdf.stream(tounicode_ref, cmap_data.as_slice());

    pdf.type0_font(font_ref)
        .base_font(Name(ps_name.as_bytes()))
        .encoding_predefined(Name(b"Identity-H"))
        .descendant_font(cid_font_ref)
        .to_unicode(tounicode_ref);

    Some(char_to_gid)
}
