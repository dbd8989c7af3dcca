//! Source map (v3) construction: base64 VLQ mappings plus the JSON
//! envelope, serialized with serde.

use serde::Serialize;

const BASE64: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// One generated-to-original position mapping.
#[derive(Clone, Copy, Debug)]
pub struct Mapping {
  pub gen_line: u32,
  pub gen_col: u32,
  /// Index into the map's `sources` array.
  pub source: u32,
  pub src_line: u32,
  pub src_col: u32,
}

pub fn encode_vlq(value: i64, out: &mut String) {
  let mut vlq = if value < 0 {
    (((-value) as u64) << 1) | 1
  } else {
    (value as u64) << 1
  };
  loop {
    let mut digit = (vlq & 0b11111) as usize;
    vlq >>= 5;
    if vlq > 0 {
      digit |= 0b100000;
    }
    out.push(BASE64[digit] as char);
    if vlq == 0 {
      break;
    }
  }
}

/// Encode mappings (already sorted by generated position) as the
/// `mappings` string: per-line segments with field deltas.
pub fn encode_mappings(mappings: &[Mapping]) -> String {
  let mut out = String::new();
  let mut gen_line = 0u32;
  let mut prev_gen_col = 0i64;
  let mut prev_source = 0i64;
  let mut prev_src_line = 0i64;
  let mut prev_src_col = 0i64;
  let mut first_on_line = true;

  for mapping in mappings {
    while gen_line < mapping.gen_line {
      out.push(';');
      gen_line += 1;
      prev_gen_col = 0;
      first_on_line = true;
    }
    if !first_on_line {
      out.push(',');
    }
    first_on_line = false;
    encode_vlq(mapping.gen_col as i64 - prev_gen_col, &mut out);
    prev_gen_col = mapping.gen_col as i64;
    encode_vlq(mapping.source as i64 - prev_source, &mut out);
    prev_source = mapping.source as i64;
    encode_vlq(mapping.src_line as i64 - prev_src_line, &mut out);
    prev_src_line = mapping.src_line as i64;
    encode_vlq(mapping.src_col as i64 - prev_src_col, &mut out);
    prev_src_col = mapping.src_col as i64;
  }
  out
}

#[derive(Serialize)]
struct SourceMapJson<'a> {
  version: u32,
  sources: &'a [String],
  #[serde(rename = "sourcesContent")]
  sources_content: &'a [String],
  names: Vec<String>,
  mappings: String,
}

pub fn build_source_map(sources: &[String], contents: &[String], mappings: &[Mapping]) -> String {
  let map = SourceMapJson {
    version: 3,
    sources,
    sources_content: contents,
    names: Vec::new(),
    mappings: encode_mappings(mappings),
  };
  serde_json::to_string(&map).expect("source map serializes")
}

/// Byte offsets of line starts, for offset -> (line, col) conversion.
pub fn line_starts(text: &str) -> Vec<usize> {
  let mut out = vec![0];
  for (i, b) in text.bytes().enumerate() {
    if b == b'\n' {
      out.push(i + 1);
    }
  }
  out
}

pub fn offset_to_line_col(line_starts: &[usize], offset: usize) -> (u32, u32) {
  let line = match line_starts.binary_search(&offset) {
    Ok(i) => i,
    Err(i) => i - 1,
  };
  (line as u32, (offset - line_starts[line]) as u32)
}
