//! Import specifier resolution.
//!
//! Maps `(importer directory, specifier)` to an absolute path plus loader,
//! an external reference, the distinguished disabled module, or a
//! diagnostic. Package metadata reads are cached behind a single-writer
//! lock; the resolver itself is reentrant and shared by scan workers.

use crate::fs;
use crate::fs::FileSystem;
use crate::loader::Loader;
use ahash::AHashMap;
use ahash::AHashSet;
use diagnostics::DeferLog;
use diagnostics::Loc;
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Platform {
  Browser,
  Node,
}

#[derive(Clone, Debug)]
pub struct ResolveOptions {
  pub extension_order: Vec<String>,
  pub platform: Platform,
  pub externals: AHashSet<String>,
}

impl Default for ResolveOptions {
  fn default() -> Self {
    Self {
      extension_order: [".tsx", ".ts", ".jsx", ".js", ".json"]
        .iter()
        .map(|s| s.to_string())
        .collect(),
      platform: Platform::Browser,
      externals: AHashSet::new(),
    }
  }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Resolved {
  /// Bundle this file.
  Resolved { abs_path: String, loader: Loader },
  /// Keep the specifier verbatim in the output.
  External,
  /// `browser: {"x": false}`; resolves to an empty CommonJS module.
  Disabled { abs_path: String },
  /// Diagnostic, attributed to the import site by the caller.
  Unresolved { message: String },
}

#[derive(Default)]
struct PackageJson {
  main_fields: Vec<(String, String)>, // (field name, value) in file order
  /// `browser` map entries: specifier-or-relative -> replacement
  /// (None = disabled).
  browser_map: Vec<(String, Option<String>)>,
}

/// A remapping installed by a `browser` map during directory resolution.
#[derive(Clone)]
struct BrowserRemap {
  to: Option<String>,
  package_dir: String,
}

pub struct Resolver<'a> {
  fs: &'a dyn FileSystem,
  log: &'a DeferLog,
  options: ResolveOptions,
  extension_to_loader: AHashMap<String, Loader>,
  package_json_cache: RwLock<AHashMap<String, Option<Arc<PackageJson>>>>,
  /// Keys are absolute paths or bare package names.
  browser_remaps: RwLock<AHashMap<String, BrowserRemap>>,
  tsconfig_cache: RwLock<AHashMap<String, Option<String>>>, // dir -> baseUrl abs
}

impl<'a> Resolver<'a> {
  pub fn new(
    fs: &'a dyn FileSystem,
    log: &'a DeferLog,
    options: ResolveOptions,
    extension_to_loader: AHashMap<String, Loader>,
  ) -> Self {
    Self {
      fs,
      log,
      options,
      extension_to_loader,
      package_json_cache: RwLock::new(AHashMap::new()),
      browser_remaps: RwLock::new(AHashMap::new()),
      tsconfig_cache: RwLock::new(AHashMap::new()),
    }
  }

  pub fn resolve(&self, importer_dir: &str, specifier: &str) -> Resolved {
    if self.options.externals.contains(specifier) {
      return Resolved::External;
    }

    // A browser map may rewrite a bare package name anywhere in the tree.
    if self.options.platform == Platform::Browser && !is_path_specifier(specifier) {
      let remap = self.browser_remaps.read().get(specifier).cloned();
      if let Some(remap) = remap {
        return match remap.to {
          None => Resolved::Disabled {
            abs_path: format!("/(disabled):{}", specifier),
          },
          Some(_) => self.apply_remap(specifier, remap),
        };
      }
    }

    if is_path_specifier(specifier) {
      let abs = fs::join(importer_dir, specifier);
      return self.finish(specifier, self.resolve_path(&abs, specifier));
    }

    self.resolve_package(importer_dir, specifier)
  }

  fn finish(&self, specifier: &str, result: Resolved) -> Resolved {
    // Resolved paths may themselves be remapped by a browser map.
    if let Resolved::Resolved { abs_path, .. } = &result {
      if self.options.platform == Platform::Browser {
        let remap = self.browser_remaps.read().get(abs_path).cloned();
        if let Some(remap) = remap {
          return match remap.to {
            None => Resolved::Disabled {
              abs_path: abs_path.clone(),
            },
            Some(_) => self.apply_remap(specifier, remap),
          };
        }
      }
    }
    result
  }

  fn apply_remap(&self, specifier: &str, remap: BrowserRemap) -> Resolved {
    match remap.to {
      None => Resolved::Disabled {
        abs_path: format!("/(disabled):{}", specifier),
      },
      Some(to) => {
        if is_path_specifier(&to) {
          let abs = fs::join(&remap.package_dir, &to);
          self.resolve_path(&abs, specifier)
        } else {
          self.resolve_package(&remap.package_dir, &to)
        }
      }
    }
  }

  /// Rules (1) and (3): exact path, extension probing, then directories.
  fn resolve_path(&self, abs: &str, specifier: &str) -> Resolved {
    if let Some(found) = self.probe_file(abs) {
      return self.with_loader(found);
    }
    if self.fs.is_dir(abs) {
      return self.resolve_directory(abs, specifier);
    }
    Resolved::Unresolved {
      message: format!("Could not resolve {:?}", specifier),
    }
  }

  /// The exact file, then each configured extension appended.
  fn probe_file(&self, abs: &str) -> Option<String> {
    if self.fs.read_file(abs).is_some() && !self.fs.is_dir(abs) {
      return Some(abs.to_string());
    }
    for ext in &self.options.extension_order {
      let candidate = format!("{}{}", abs, ext);
      if self.fs.read_file(&candidate).is_some() {
        return Some(candidate);
      }
    }
    None
  }

  fn with_loader(&self, abs_path: String) -> Resolved {
    let ext = fs::ext(&abs_path);
    match self.extension_to_loader.get(ext) {
      Some(&loader) => Resolved::Resolved { abs_path, loader },
      None => Resolved::Unresolved {
        message: format!("File extension not supported: {}", abs_path),
      },
    }
  }

  /// Rule (3): `package.json` main fields, browser maps, index files.
  fn resolve_directory(&self, dir: &str, specifier: &str) -> Resolved {
    let package_json_path = fs::join(dir, "package.json");
    if let Some(pkg) = self.package_json(&package_json_path) {
      // Install browser remappings before resolving the entry so files
      // inside this package resolve through the map.
      if self.options.platform == Platform::Browser && !pkg.browser_map.is_empty() {
        let mut remaps = self.browser_remaps.write();
        for (from, to) in &pkg.browser_map {
          let key = if is_path_specifier(from) {
            let abs = fs::join(dir, from);
            // Also cover extension-probed forms of the key.
            for ext in &self.options.extension_order {
              if let Some(stripped) = abs.strip_suffix(ext.as_str()) {
                remaps.entry(stripped.to_string()).or_insert(BrowserRemap {
                  to: to.clone(),
                  package_dir: dir.to_string(),
                });
              }
            }
            abs
          } else {
            from.clone()
          };
          remaps.entry(key).or_insert(BrowserRemap {
            to: to.clone(),
            package_dir: dir.to_string(),
          });
        }
      }

      for (field, value) in &pkg.main_fields {
        let usable = match field.as_str() {
          "browser" => self.options.platform == Platform::Browser,
          _ => true,
        };
        if !usable {
          continue;
        }
        let abs = fs::join(dir, value);
        if let Some(found) = self.probe_file(&abs) {
          return self.finish(specifier, self.with_loader(found));
        }
        if self.fs.is_dir(&abs) {
          return self.resolve_directory(&abs, specifier);
        }
      }
    }

    for ext in &self.options.extension_order {
      let candidate = fs::join(dir, &format!("index{}", ext));
      if self.fs.read_file(&candidate).is_some() {
        return self.finish(specifier, self.with_loader(candidate));
      }
    }
    Resolved::Unresolved {
      message: format!("Could not resolve {:?}", specifier),
    }
  }

  /// Rule (2): tsconfig `baseUrl`, then the `node_modules` walk.
  fn resolve_package(&self, importer_dir: &str, specifier: &str) -> Resolved {
    if let Some(base_url) = self.enclosing_base_url(importer_dir) {
      let abs = fs::join(&base_url, specifier);
      if self.probe_file(&abs).is_some() || self.fs.is_dir(&abs) {
        return self.finish(specifier, self.resolve_path(&abs, specifier));
      }
    }

    let mut dir = importer_dir.to_string();
    loop {
      let candidate = fs::join(&dir, &format!("node_modules/{}", specifier));
      if self.probe_file(&candidate).is_some() || self.fs.is_dir(&candidate) {
        return self.finish(specifier, self.resolve_path(&candidate, specifier));
      }
      let parent = fs::dir(&dir);
      if parent == dir {
        break;
      }
      dir = parent;
    }

    // Node can require anything at runtime; the browser cannot.
    match self.options.platform {
      Platform::Node => Resolved::External,
      Platform::Browser => Resolved::Unresolved {
        message: format!("Could not resolve {:?}", specifier),
      },
    }
  }

  /// The `baseUrl` of the nearest enclosing `tsconfig.json`, if any.
  fn enclosing_base_url(&self, importer_dir: &str) -> Option<String> {
    let mut dir = importer_dir.to_string();
    loop {
      if let Some(cached) = self.tsconfig_cache.read().get(&dir) {
        return cached.clone();
      }
      let tsconfig_path = fs::join(&dir, "tsconfig.json");
      if let Some(bytes) = self.fs.read_file(&tsconfig_path) {
        let base_url = parse_tsconfig_base_url(&bytes).map(|rel| fs::join(&dir, &rel));
        self
          .tsconfig_cache
          .write()
          .insert(dir.clone(), base_url.clone());
        return base_url;
      }
      let parent = fs::dir(&dir);
      if parent == dir {
        self.tsconfig_cache.write().insert(dir, None);
        return None;
      }
      dir = parent;
    }
  }

  /// Strict JSON only; comments and trailing commas are diagnostics.
  fn package_json(&self, path: &str) -> Option<Arc<PackageJson>> {
    if let Some(cached) = self.package_json_cache.read().get(path) {
      return cached.clone();
    }
    let parsed = self.fs.read_file(path).and_then(|bytes| {
      let text = String::from_utf8(bytes).ok()?;
      match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(value) => Some(Arc::new(package_json_from_value(&value))),
        Err(_) => {
          let message = if has_json_comment(&text) {
            "JSON does not support comments"
          } else if has_trailing_comma(&text) {
            "JSON does not support trailing commas"
          } else {
            "Invalid JSON"
          };
          self.log.add_error(path, Loc::NONE, message);
          None
        }
      }
    });
    self
      .package_json_cache
      .write()
      .insert(path.to_string(), parsed.clone());
    parsed
  }
}

fn is_path_specifier(specifier: &str) -> bool {
  specifier.starts_with('/') || specifier.starts_with("./") || specifier.starts_with("../")
    || specifier == "."
    || specifier == ".."
}

fn package_json_from_value(value: &serde_json::Value) -> PackageJson {
  let mut pkg = PackageJson::default();
  let Some(obj) = value.as_object() else {
    return pkg;
  };
  // Field priority: browser (string form), then module, then main.
  if let Some(serde_json::Value::String(s)) = obj.get("browser") {
    pkg.main_fields.push(("browser".into(), s.clone()));
  }
  if let Some(serde_json::Value::String(s)) = obj.get("module") {
    pkg.main_fields.push(("module".into(), s.clone()));
  }
  if let Some(serde_json::Value::String(s)) = obj.get("main") {
    pkg.main_fields.push(("main".into(), s.clone()));
  }
  if let Some(serde_json::Value::Object(map)) = obj.get("browser") {
    for (from, to) in map {
      match to {
        serde_json::Value::String(s) => {
          pkg.browser_map.push((from.clone(), Some(s.clone())));
        }
        serde_json::Value::Bool(false) => {
          pkg.browser_map.push((from.clone(), None));
        }
        _ => {}
      }
    }
  }
  pkg
}

fn strip_json_strings(text: &str) -> String {
  // Replace string contents with spaces so structural scans ignore them.
  let mut out = String::with_capacity(text.len());
  let mut in_string = false;
  let mut escaped = false;
  for c in text.chars() {
    if in_string {
      if escaped {
        escaped = false;
        out.push(' ');
      } else if c == '\\' {
        escaped = true;
        out.push(' ');
      } else if c == '"' {
        in_string = false;
        out.push('"');
      } else {
        out.push(' ');
      }
    } else {
      if c == '"' {
        in_string = true;
      }
      out.push(c);
    }
  }
  out
}

fn has_json_comment(text: &str) -> bool {
  let stripped = strip_json_strings(text);
  stripped.contains("//") || stripped.contains("/*")
}

fn has_trailing_comma(text: &str) -> bool {
  let stripped = strip_json_strings(text);
  let mut last_significant = ' ';
  for c in stripped.chars() {
    if c.is_whitespace() {
      continue;
    }
    if (c == '}' || c == ']') && last_significant == ',' {
      return true;
    }
    last_significant = c;
  }
  false
}

/// Tolerant parse of `tsconfig.json`: comments and trailing commas allowed.
fn parse_tsconfig_base_url(bytes: &[u8]) -> Option<String> {
  let text = String::from_utf8(bytes.to_vec()).ok()?;
  let cleaned = strip_jsonc(&text);
  let value: serde_json::Value = serde_json::from_str(&cleaned).ok()?;
  value
    .get("compilerOptions")?
    .get("baseUrl")?
    .as_str()
    .map(|s| s.to_string())
}

/// Remove comments and trailing commas so `serde_json` accepts the text.
fn strip_jsonc(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  let bytes = text.as_bytes();
  let mut i = 0;
  let mut in_string = false;
  while i < bytes.len() {
    let c = bytes[i];
    if in_string {
      out.push(c as char);
      if c == b'\\' && i + 1 < bytes.len() {
        out.push(bytes[i + 1] as char);
        i += 2;
        continue;
      }
      if c == b'"' {
        in_string = false;
      }
      i += 1;
      continue;
    }
    match c {
      b'"' => {
        in_string = true;
        out.push('"');
        i += 1;
      }
      b'/' if i + 1 < bytes.len() && bytes[i + 1] == b'/' => {
        while i < bytes.len() && bytes[i] != b'\n' {
          i += 1;
        }
      }
      b'/' if i + 1 < bytes.len() && bytes[i + 1] == b'*' => {
        i += 2;
        while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
          i += 1;
        }
        i += 2;
      }
      _ => {
        out.push(c as char);
        i += 1;
      }
    }
  }
  // Trailing commas.
  let mut cleaned = String::with_capacity(out.len());
  let chars: Vec<char> = out.chars().collect();
  for (idx, &c) in chars.iter().enumerate() {
    if c == ',' {
      let mut j = idx + 1;
      while j < chars.len() && chars[j].is_whitespace() {
        j += 1;
      }
      if j < chars.len() && (chars[j] == '}' || chars[j] == ']') {
        continue;
      }
    }
    cleaned.push(c);
  }
  cleaned
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn detects_jsonc_constructs() {
    assert!(has_json_comment("{\n// hi\n\"a\": 1}"));
    assert!(!has_json_comment("{\"a\": \"// not a comment\"}"));
    assert!(has_trailing_comma("{\"a\": 1,}"));
    assert!(!has_trailing_comma("{\"a\": \",}\"}"));
  }

  #[test]
  fn strips_jsonc() {
    let cleaned = strip_jsonc("{\n  // comment\n  \"a\": [1, 2,],\n}");
    let value: serde_json::Value = serde_json::from_str(&cleaned).unwrap();
    assert_eq!(value["a"][1], 2);
  }

  #[test]
  fn tsconfig_base_url() {
    let bytes = b"{\n  \"compilerOptions\": {\n    // base\n    \"baseUrl\": \".\",\n  }\n}";
    assert_eq!(parse_tsconfig_base_url(bytes).as_deref(), Some("."));
  }
}
