//! Loader registry.
//!
//! Maps file extensions to parser variants. The non-JS loaders synthesize a
//! small CommonJS module (`module.exports = <literal>`) that is then parsed
//! like any other source, so the linker never special-cases them.

use crate::fs;
use crate::print::quote_js_string;
use ahash::AHashMap;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use parse_js::Dialect;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Loader {
  Js,
  Jsx,
  Ts,
  Tsx,
  Json,
  Text,
  Base64,
  DataUrl,
}

impl Loader {
  pub fn from_name(name: &str) -> Option<Loader> {
    Some(match name {
      "js" => Loader::Js,
      "jsx" => Loader::Jsx,
      "ts" => Loader::Ts,
      "tsx" => Loader::Tsx,
      "json" => Loader::Json,
      "text" => Loader::Text,
      "base64" => Loader::Base64,
      "dataurl" => Loader::DataUrl,
      _ => return None,
    })
  }

  pub fn dialect(&self) -> Dialect {
    match self {
      Loader::Jsx => Dialect::Jsx,
      Loader::Ts => Dialect::Ts,
      Loader::Tsx => Dialect::Tsx,
      _ => Dialect::Js,
    }
  }

  pub fn is_synthetic(&self) -> bool {
    matches!(
      self,
      Loader::Json | Loader::Text | Loader::Base64 | Loader::DataUrl
    )
  }
}

pub fn default_extension_loaders() -> AHashMap<String, Loader> {
  let mut map = AHashMap::new();
  for (ext, loader) in [
    (".js", Loader::Js),
    (".mjs", Loader::Js),
    (".cjs", Loader::Js),
    (".jsx", Loader::Jsx),
    (".ts", Loader::Ts),
    (".tsx", Loader::Tsx),
    (".json", Loader::Json),
  ] {
    map.insert(ext.to_string(), loader);
  }
  map
}

/// Generate the JS text of a synthetic module, or an error message.
pub fn synthesize_source(loader: Loader, raw: &[u8], abs_path: &str) -> Result<String, String> {
  match loader {
    Loader::Json => {
      let text = std::str::from_utf8(raw).map_err(|_| "File is not valid UTF-8".to_string())?;
      let value: serde_json::Value =
        serde_json::from_str(text).map_err(|err| format!("Invalid JSON: {}", err))?;
      let mut out = String::from("module.exports = ");
      write_json_as_js(&value, &mut out);
      out.push_str(";\n");
      Ok(out)
    }
    Loader::Text => {
      let text = std::str::from_utf8(raw).map_err(|_| "File is not valid UTF-8".to_string())?;
      Ok(format!("module.exports = {};\n", quote_js_string(text)))
    }
    Loader::Base64 => Ok(format!(
      "module.exports = \"{}\";\n",
      STANDARD.encode(raw)
    )),
    Loader::DataUrl => Ok(format!(
      "module.exports = \"data:{};base64,{}\";\n",
      mime_for_ext(fs::ext(abs_path)),
      STANDARD.encode(raw)
    )),
    _ => unreachable!("only synthetic loaders synthesize sources"),
  }
}

/// Contents of the distinguished disabled module (`browser: {"x": false}`).
pub fn disabled_source() -> String {
  "module.exports = {};\n".to_string()
}

fn mime_for_ext(ext: &str) -> &'static str {
  match ext {
    ".png" => "image/png",
    ".jpg" | ".jpeg" => "image/jpeg",
    ".gif" => "image/gif",
    ".svg" => "image/svg+xml",
    ".json" => "application/json",
    ".css" => "text/css",
    ".html" => "text/html",
    ".txt" => "text/plain",
    _ => "application/octet-stream",
  }
}

fn is_valid_ident_key(key: &str) -> bool {
  let mut chars = key.chars();
  match chars.next() {
    Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
    _ => return false,
  }
  chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn write_json_as_js(value: &serde_json::Value, out: &mut String) {
  match value {
    serde_json::Value::Null => out.push_str("null"),
    serde_json::Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
    serde_json::Value::Number(n) => out.push_str(&n.to_string()),
    serde_json::Value::String(s) => out.push_str(&quote_js_string(s)),
    serde_json::Value::Array(items) => {
      out.push('[');
      for (i, item) in items.iter().enumerate() {
        if i > 0 {
          out.push_str(", ");
        }
        write_json_as_js(item, out);
      }
      out.push(']');
    }
    serde_json::Value::Object(map) => {
      out.push('{');
      for (i, (key, value)) in map.iter().enumerate() {
        if i > 0 {
          out.push_str(", ");
        }
        if is_valid_ident_key(key) {
          out.push_str(key);
        } else {
          out.push_str(&quote_js_string(key));
        }
        out.push_str(": ");
        write_json_as_js(value, out);
      }
      out.push('}');
    }
  }
}
