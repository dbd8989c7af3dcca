//! The runtime shim module.
//!
//! Helpers are written as ordinary JavaScript and parsed like any other
//! source, so they flow through the same symbol, rename, and print
//! machinery as user code. The linker records which helpers a bundle
//! actually needs; [`closure`] adds intra-runtime dependencies (e.g.
//! `__export` needs `__defProp`) and the printer emits only the needed
//! top-level statements, in source order.

use ahash::AHashSet;

pub const RUNTIME_PATH: &str = "<runtime>";

pub fn runtime_source() -> &'static str {
  r#"let __defProp = Object.defineProperty;
let __hasOwnProp = Object.prototype.hasOwnProperty;
let __moduleMap;
let __moduleCache = {};
export let __require = id => {
  let module = __moduleCache[id];
  if (!module) {
    module = __moduleCache[id] = {exports: {}};
    __moduleMap[id](module.exports, module);
  }
  return module.exports;
};
export let bootstrap = (map, entry) => {
  __moduleMap = map;
  return __require(entry);
};
export let __commonJS = callback => {
  let module;
  return () => {
    if (!module) {
      module = {exports: {}};
      callback(module.exports, module);
    }
    return module.exports;
  };
};
export let __export = (target, all) => {
  for (let name in all)
    __defProp(target, name, {get: all[name], enumerable: true});
};
export let __toModule = module => {
  if (module && module.__esModule)
    return module;
  let result = {};
  for (let key in module)
    if (__hasOwnProp.call(module, key))
      result[key] = module[key];
  result.default = module;
  return result;
};
export let __import = id => __toModule(__require(id));
export let __assign = (target, source) => {
  for (let key in source)
    if (__hasOwnProp.call(source, key))
      target[key] = source[key];
  return target;
};
export let __pow = (base, exponent) => Math.pow(base, exponent);
"#
}

/// Direct dependencies of each runtime binding on other runtime bindings.
const HELPER_DEPS: &[(&str, &[&str])] = &[
  ("__defProp", &[]),
  ("__hasOwnProp", &[]),
  ("__moduleMap", &[]),
  ("__moduleCache", &[]),
  ("__require", &["__moduleCache", "__moduleMap"]),
  ("bootstrap", &["__moduleMap", "__require"]),
  ("__commonJS", &[]),
  ("__export", &["__defProp"]),
  ("__toModule", &["__hasOwnProp"]),
  ("__import", &["__toModule", "__require"]),
  ("__assign", &["__hasOwnProp"]),
  ("__pow", &[]),
];

pub fn is_helper_name(name: &str) -> bool {
  HELPER_DEPS.iter().any(|(helper, _)| *helper == name)
}

/// Expand a needed-helper set with its transitive runtime dependencies.
pub fn closure(needed: &AHashSet<String>) -> AHashSet<String> {
  let mut out: AHashSet<String> = AHashSet::new();
  let mut stack: Vec<&str> = needed.iter().map(|s| s.as_str()).collect();
  while let Some(name) = stack.pop() {
    if !out.insert(name.to_string()) {
      continue;
    }
    if let Some((_, deps)) = HELPER_DEPS.iter().find(|(helper, _)| *helper == name) {
      stack.extend(deps.iter().copied());
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn every_helper_exists_in_source() {
    let source = runtime_source();
    for (helper, deps) in HELPER_DEPS {
      assert!(
        source.contains(&format!("{} ", helper)) || source.contains(&format!("{};", helper)),
        "helper {} missing from runtime source",
        helper
      );
      for dep in *deps {
        assert!(is_helper_name(dep));
      }
    }
  }

  #[test]
  fn closure_is_transitive() {
    let mut needed = AHashSet::new();
    needed.insert("__import".to_string());
    let closed = closure(&needed);
    assert!(closed.contains("__toModule"));
    assert!(closed.contains("__require"));
    assert!(closed.contains("__moduleCache"));
    assert!(closed.contains("__hasOwnProp"));
    assert!(!closed.contains("__pow"));
  }

  #[test]
  fn runtime_parses_as_esm() {
    let program = parse_js::parse(runtime_source()).unwrap();
    assert_eq!(program.exports_kind, parse_js::ExportsKind::Esm);
    assert!(program.named_exports.contains_key("__commonJS"));
    assert!(program.named_exports.contains_key("bootstrap"));
  }
}
