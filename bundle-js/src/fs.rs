//! Filesystem abstraction.
//!
//! All paths are absolute and use forward slashes. [`MockFs`] backs the
//! test suites; [`OsFs`] is the real thing. Path manipulation is pure
//! string work so resolution behaves identically on every host.

use ahash::AHashMap;

pub trait FileSystem: Send + Sync {
  fn read_file(&self, path: &str) -> Option<Vec<u8>>;
  fn is_dir(&self, path: &str) -> bool;
  fn entries(&self, path: &str) -> Vec<String>;
}

/// In-memory filesystem for tests: a mapping from absolute path to contents.
#[derive(Default)]
pub struct MockFs {
  files: AHashMap<String, Vec<u8>>,
}

impl MockFs {
  pub fn new<I, P, C>(files: I) -> Self
  where
    I: IntoIterator<Item = (P, C)>,
    P: Into<String>,
    C: Into<Vec<u8>>,
  {
    Self {
      files: files
        .into_iter()
        .map(|(p, c)| (p.into(), c.into()))
        .collect(),
    }
  }
}

impl FileSystem for MockFs {
  fn read_file(&self, path: &str) -> Option<Vec<u8>> {
    self.files.get(path).cloned()
  }

  fn is_dir(&self, path: &str) -> bool {
    let prefix = if path.ends_with('/') {
      path.to_string()
    } else {
      format!("{}/", path)
    };
    self.files.keys().any(|k| k.starts_with(&prefix))
  }

  fn entries(&self, path: &str) -> Vec<String> {
    let prefix = if path.ends_with('/') {
      path.to_string()
    } else {
      format!("{}/", path)
    };
    let mut out: Vec<String> = self
      .files
      .keys()
      .filter_map(|k| k.strip_prefix(&prefix))
      .map(|rest| rest.split('/').next().unwrap().to_string())
      .collect();
    out.sort();
    out.dedup();
    out
  }
}

pub struct OsFs;

impl FileSystem for OsFs {
  fn read_file(&self, path: &str) -> Option<Vec<u8>> {
    std::fs::read(path).ok()
  }

  fn is_dir(&self, path: &str) -> bool {
    std::fs::metadata(path)
      .map(|m| m.is_dir())
      .unwrap_or(false)
  }

  fn entries(&self, path: &str) -> Vec<String> {
    let mut out: Vec<String> = std::fs::read_dir(path)
      .map(|entries| {
        entries
          .filter_map(|e| e.ok())
          .filter_map(|e| e.file_name().into_string().ok())
          .collect()
      })
      .unwrap_or_default();
    out.sort();
    out
  }
}

// --------------------------------------------------------------------------
// Pure path helpers (forward slashes, absolute paths)
// --------------------------------------------------------------------------

/// Normalize `.` and `..` components of an absolute path.
pub fn normalize(path: &str) -> String {
  let mut parts: Vec<&str> = Vec::new();
  for part in path.split('/') {
    match part {
      "" | "." => {}
      ".." => {
        parts.pop();
      }
      other => parts.push(other),
    }
  }
  let mut out = String::from("/");
  out.push_str(&parts.join("/"));
  out
}

/// Join `base` (absolute) with `path` (absolute or relative) and normalize.
pub fn join(base: &str, path: &str) -> String {
  if path.starts_with('/') {
    normalize(path)
  } else {
    normalize(&format!("{}/{}", base, path))
  }
}

/// Parent directory; `/` for the root.
pub fn dir(path: &str) -> String {
  match path.rfind('/') {
    Some(0) | None => "/".to_string(),
    Some(i) => path[..i].to_string(),
  }
}

/// Final path component.
pub fn base(path: &str) -> &str {
  path.rsplit('/').next().unwrap_or(path)
}

/// Extension including the dot, or `""`.
pub fn ext(path: &str) -> &str {
  let name = base(path);
  match name.rfind('.') {
    Some(i) if i > 0 => &name[i..],
    _ => "",
  }
}

/// Final path component with the extension removed.
pub fn base_without_ext(path: &str) -> &str {
  let name = base(path);
  match name.rfind('.') {
    Some(i) if i > 0 => &name[..i],
    _ => name,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn joins_and_normalizes() {
    assert_eq!(join("/a/b", "./c"), "/a/b/c");
    assert_eq!(join("/a/b", "../c"), "/a/c");
    assert_eq!(join("/a/b", "/x/./y/../z"), "/x/z");
    assert_eq!(join("/", "entry.js"), "/entry.js");
  }

  #[test]
  fn path_parts() {
    assert_eq!(dir("/a/b/c.js"), "/a/b");
    assert_eq!(dir("/c.js"), "/");
    assert_eq!(base("/a/b/c.js"), "c.js");
    assert_eq!(ext("/a/b/c.min.js"), ".js");
    assert_eq!(ext("/a/b/noext"), "");
    assert_eq!(ext("/a/.hidden"), "");
    assert_eq!(base_without_ext("/a/b/util.js"), "util");
  }

  #[test]
  fn mock_fs_dirs_and_entries() {
    let fs = MockFs::new([
      ("/a/b/c.js", "x"),
      ("/a/b/d/e.js", "y"),
      ("/a/f.js", "z"),
    ]);
    assert!(fs.is_dir("/a/b"));
    assert!(fs.is_dir("/a/b/d"));
    assert!(!fs.is_dir("/a/b/c.js"));
    assert_eq!(fs.entries("/a/b"), vec!["c.js", "d"]);
    assert_eq!(fs.read_file("/a/f.js"), Some(b"z".to_vec()));
  }
}
