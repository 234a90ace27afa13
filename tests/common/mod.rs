//! Shared helpers: report fixtures plus a minimal PDF prodder that pulls
//! decompressed page content streams and the text they show, so tests can
//! assert on what actually landed on each page.

#![allow(dead_code)]

use std::io::Cursor;

use informe_pdf::{CompanyInfo, EmbeddedImage, ImageFormat, Photo, Report};

pub fn sample_company() -> CompanyInfo {
    CompanyInfo {
        name: "Andina Power S.A.S".into(),
        address: "Calle 73 #65-39, Medellín".into(),
        phone: "+57 300 555 0134".into(),
        email: "servicio@andinapower.co".into(),
        logo: None,
    }
}

pub fn render(report: &Report) -> Vec<u8> {
    informe_pdf::render_report(report, &sample_company(), 1, "7/8/2026").expect("render")
}

pub fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([180, 40, 40, 255]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).expect("encode png");
    buf.into_inner()
}

pub fn png_signature() -> EmbeddedImage {
    EmbeddedImage {
        data: png_bytes(300, 150),
        format: ImageFormat::Png,
        pixel_width: 300,
        pixel_height: 150,
    }
}

pub fn photo(id: u64, description: &str) -> Photo {
    Photo {
        id,
        data: png_bytes(40, 30),
        description: description.into(),
    }
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from > haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .rposition(|w| w == needle)
}

fn skip_ws(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

fn parse_digits(bytes: &[u8], from: usize) -> Option<usize> {
    let start = skip_ws(bytes, from);
    let digits: String = bytes[start..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .map(|&b| b as char)
        .collect();
    digits.parse().ok()
}

/// Page count as declared in the page tree.
pub fn page_count(pdf: &[u8]) -> usize {
    let pos = find(pdf, b"/Count", 0).expect("page tree /Count");
    parse_digits(pdf, pos + b"/Count".len()).expect("page count")
}

/// Width and height of the first /MediaBox.
pub fn media_box(pdf: &[u8]) -> (f32, f32) {
    let key = find(pdf, b"/MediaBox", 0).expect("media box");
    let open = skip_ws(pdf, key + b"/MediaBox".len());
    assert_eq!(pdf[open], b'[', "array expected after /MediaBox");
    let end = find(pdf, b"]", open).expect("media box end");
    let nums: Vec<f32> = std::str::from_utf8(&pdf[open + 1..end])
        .expect("media box numbers")
        .split_whitespace()
        .map(|s| s.parse().expect("media box number"))
        .collect();
    assert_eq!(nums.len(), 4);
    (nums[2] - nums[0], nums[3] - nums[1])
}

/// All stream payloads, sliced out via each stream dictionary's /Length.
fn raw_streams(pdf: &[u8]) -> Vec<Vec<u8>> {
    let mut out = Vec::new();
    let mut at = 0;
    while let Some(pos) = find(pdf, b"stream", at) {
        at = pos + 6;
        if pos >= 3 && &pdf[pos - 3..pos] == b"end" {
            continue;
        }
        let window_start = pos.saturating_sub(512);
        let window = &pdf[window_start..pos];
        let Some(len_pos) = rfind(window, b"/Length") else {
            continue;
        };
        let Some(len) = parse_digits(window, len_pos + b"/Length".len()) else {
            continue;
        };
        let mut data_start = pos + 6;
        if pdf.get(data_start) == Some(&b'\r') {
            data_start += 1;
        }
        if pdf.get(data_start) == Some(&b'\n') {
            data_start += 1;
        }
        if data_start + len <= pdf.len() {
            out.push(pdf[data_start..data_start + len].to_vec());
            at = data_start + len;
        }
    }
    out
}

/// Decompressed page content streams, in page order. Image streams are
/// filtered out (raw JPEG does not inflate; pixel streams carry no text
/// operators).
pub fn page_streams(pdf: &[u8]) -> Vec<Vec<u8>> {
    raw_streams(pdf)
        .iter()
        .filter_map(|data| miniz_oxide::inflate::decompress_to_vec_zlib(data).ok())
        .filter(|data| find(data, b"BT", 0).is_some() && find(data, b"Tf", 0).is_some())
        .collect()
}

/// Text shown on each page, one entry per page, Tj strings joined with
/// newlines. Bytes decode as Latin-1, which covers the report's labels.
pub fn page_texts(pdf: &[u8]) -> Vec<String> {
    page_streams(pdf).iter().map(|s| extract_text(s)).collect()
}

pub fn document_text(pdf: &[u8]) -> String {
    page_texts(pdf).join("\n")
}

fn push_shown(out: &mut String, bytes: &[u8]) {
    if !out.is_empty() {
        out.push('\n');
    }
    out.extend(bytes.iter().map(|&b| b as char));
}

fn followed_by_tj(stream: &[u8], mut i: usize) -> bool {
    while i < stream.len() && (stream[i] == b' ' || stream[i] == b'\n' || stream[i] == b'\r') {
        i += 1;
    }
    stream.get(i..).is_some_and(|rest| rest.starts_with(b"Tj"))
}

/// Collect every string operand shown with Tj, handling both literal
/// (with escapes) and hex string syntax.
pub fn extract_text(stream: &[u8]) -> String {
    let mut out = String::new();
    let mut i = 0;
    while i < stream.len() {
        match stream[i] {
            b'(' => {
                let mut s: Vec<u8> = Vec::new();
                let mut j = i + 1;
                // PDF literal strings allow balanced, unescaped parentheses;
                // track nesting depth so a `(V)` inside the string does not
                // terminate it early.
                let mut depth = 1usize;
                while j < stream.len() {
                    if stream[j] == b'\\' && j + 1 < stream.len() {
                        let c = stream[j + 1];
                        match c {
                            b'0'..=b'7' => {
                                let mut val = 0u32;
                                let mut k = j + 1;
                                let mut count = 0;
                                while k < stream.len()
                                    && count < 3
                                    && (b'0'..=b'7').contains(&stream[k])
                                {
                                    val = val * 8 + (stream[k] - b'0') as u32;
                                    k += 1;
                                    count += 1;
                                }
                                s.push(val as u8);
                                j = k;
                            }
                            b'n' => {
                                s.push(b'\n');
                                j += 2;
                            }
                            b'r' => {
                                s.push(b'\r');
                                j += 2;
                            }
                            b't' => {
                                s.push(b'\t');
                                j += 2;
                            }
                            _ => {
                                s.push(c);
                                j += 2;
                            }
                        }
                    } else if stream[j] == b'(' {
                        depth += 1;
                        s.push(b'(');
                        j += 1;
                    } else if stream[j] == b')' {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                        s.push(b')');
                        j += 1;
                    } else {
                        s.push(stream[j]);
                        j += 1;
                    }
                }
                if followed_by_tj(stream, j + 1) {
                    push_shown(&mut out, &s);
                }
                i = j + 1;
            }
            b'<' if stream.get(i + 1) != Some(&b'<') => {
                let mut s: Vec<u8> = Vec::new();
                let mut j = i + 1;
                let mut hi: Option<u8> = None;
                while j < stream.len() && stream[j] != b'>' {
                    let d = (stream[j] as char).to_digit(16);
                    if let Some(d) = d {
                        match hi.take() {
                            Some(h) => s.push((h * 16 + d as u8) as u8),
                            None => hi = Some(d as u8),
                        }
                    }
                    j += 1;
                }
                if let Some(h) = hi {
                    s.push(h * 16);
                }
                if followed_by_tj(stream, j + 1) {
                    push_shown(&mut out, &s);
                }
                i = j + 1;
            }
            _ => i += 1,
        }
    }
    out
}
