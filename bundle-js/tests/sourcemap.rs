mod common;

use common::bundled;
use common::expect_clean;
use serde_json::Value;

#[test]
fn linked_source_maps_reference_original_sources() {
  let result = bundled(
    &[
      (
        "/Users/user/project/src/entry.js",
        "import {bar} from './bar';\nfunction foo() {\n  bar();\n}\nfoo();\n",
      ),
      (
        "/Users/user/project/src/bar.js",
        "export function bar() {\n  throw new Error('test');\n}\n",
      ),
    ],
    &["/Users/user/project/src/entry.js"],
    |options, _| {
      options.abs_output_file = Some("/Users/user/project/out.js".to_string());
      options.source_map = bundle_js::SourceMapMode::Linked;
    },
  );
  expect_clean(&result);
  let code = result.output("/Users/user/project/out.js");
  assert!(code.ends_with("//# sourceMappingURL=out.js.map\n"), "got: {}", code);

  let map_text = result.output("/Users/user/project/out.js.map");
  let map: Value = serde_json::from_str(map_text).unwrap();
  assert_eq!(map["version"], 3);
  let sources: Vec<&str> = map["sources"]
    .as_array()
    .unwrap()
    .iter()
    .map(|s| s.as_str().unwrap())
    .collect();
  // bar.js prints first (post-order), then the entry.
  assert_eq!(sources, vec![
    "/Users/user/project/src/bar.js",
    "/Users/user/project/src/entry.js",
  ]);
  assert!(!map["mappings"].as_str().unwrap().is_empty());
  assert_eq!(map["sourcesContent"].as_array().unwrap().len(), 2);
}

#[test]
fn inline_source_maps_embed_a_data_url() {
  let result = bundled(
    &[("/entry.js", "console.log(1);\n")],
    &["/entry.js"],
    |options, _| {
      options.source_map = bundle_js::SourceMapMode::Inline;
    },
  );
  expect_clean(&result);
  let code = result.output("/out.js");
  assert!(code.contains("//# sourceMappingURL=data:application/json;base64,"));
  // Only the code output exists; no .map file.
  assert_eq!(result.outputs.len(), 1);
}

#[test]
fn external_source_maps_omit_the_comment() {
  let result = bundled(
    &[("/entry.js", "console.log(1);\n")],
    &["/entry.js"],
    |options, _| {
      options.source_map = bundle_js::SourceMapMode::External;
    },
  );
  expect_clean(&result);
  let code = result.output("/out.js");
  assert!(!code.contains("sourceMappingURL"));
  let map: Value = serde_json::from_str(result.output("/out.js.map")).unwrap();
  assert_eq!(map["sources"].as_array().unwrap().len(), 1);
}
