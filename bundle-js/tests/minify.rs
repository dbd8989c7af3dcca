mod common;

use common::bundled;
use common::expect_clean;

#[test]
fn direct_eval_taints_renaming() {
  let result = bundled(
    &[(
      "/entry.js",
      concat!(
        "function test1() {\n",
        "  function add(first, second) {\n",
        "    return first + second;\n",
        "  }\n",
        "  eval(\"add(1, 2)\");\n",
        "}\n",
        "function test2() {\n",
        "  function add(first, second) {\n",
        "    return first + second;\n",
        "  }\n",
        "  (0, eval)(\"add(1, 2)\");\n",
        "}\n",
      ),
    )],
    &["/entry.js"],
    |options, _| {
      options.is_bundling = false;
      options.minify_identifiers = true;
    },
  );
  expect_clean(&result);
  let out = result.output("/out.js");
  // The function containing the direct eval keeps every name.
  assert!(out.contains("function add(first, second)"));
  assert!(out.contains("eval(\"add(1, 2)\");"));
  // Its sibling with only an indirect eval minifies normally.
  assert!(out.contains("function a(a, b)"));
  assert!(out.contains("(0, eval)(\"add(1, 2)\");"));
  // Top-level names are visible to the evaluated code and stay.
  assert!(out.contains("function test1()"));
  assert!(out.contains("function test2()"));
}

#[test]
fn with_statement_pins_crossing_names() {
  let result = bundled(
    &[(
      "/entry.js",
      concat!(
        "(() => {\n",
        "  let local = 1;\n",
        "  let outer = 2;\n",
        "  with ({}) {\n",
        "    var hoisted = 4;\n",
        "    let inner = 5;\n",
        "    hoisted++;\n",
        "    inner++;\n",
        "    outer++;\n",
        "  }\n",
        "  local++;\n",
        "})();\n",
      ),
    )],
    &["/entry.js"],
    |options, _| {
      options.is_bundling = false;
      options.minify_identifiers = true;
    },
  );
  expect_clean(&result);
  let out = result.output("/out.js");
  // Names observable through the with object keep their spelling.
  assert!(out.contains("var hoisted = 4;"));
  assert!(out.contains("outer++;"));
  // Purely lexical bindings inside and outside minify.
  assert!(!out.contains("let local"));
  assert!(!out.contains("let inner"));
}

#[test]
fn arguments_is_never_renamed() {
  let result = bundled(
    &[(
      "/entry.js",
      "function f(x = arguments) {\n  var arguments;\n  return arguments;\n}\n",
    )],
    &["/entry.js"],
    |options, _| {
      options.is_bundling = false;
      options.minify_identifiers = true;
    },
  );
  expect_clean(&result);
  let out = result.output("/out.js");
  assert!(out.contains("var arguments;"));
  assert!(out.contains("return arguments;"));
  assert!(out.contains("(a = arguments)"));
}

#[test]
fn minified_bundle_is_compact() {
  let result = bundled(
    &[
      ("/entry.js", "import {foo} from './a';\nconsole.log(foo());\n"),
      ("/a.js", "export function foo() {\n  return 123;\n}\nfoo();\n"),
    ],
    &["/entry.js"],
    |options, _| {
      options.minify_whitespace = true;
      options.minify_identifiers = true;
    },
  );
  expect_clean(&result);
  assert_eq!(
    result.output("/out.js"),
    "function a(){return 123;}a();console.log(a());"
  );
}

#[test]
fn minified_wrapped_modules_rename_per_closure() {
  let result = bundled(
    &[
      (
        "/entry.js",
        "const {foo} = require('./a');\nconsole.log(foo());\n",
      ),
      ("/a.js", "exports.foo = function() {\n  return 123;\n};\n"),
    ],
    &["/entry.js"],
    |options, _| {
      options.minify_whitespace = true;
      options.minify_identifiers = true;
    },
  );
  expect_clean(&result);
  let out = result.output("/out.js");
  // The wrapper body sees its exports object under a one-letter name.
  assert!(out.contains(".foo=function(){return 123;}"), "got: {}", out);
  // `exports.foo` must not survive identifier minification.
  assert!(!out.contains("exports.foo"));
}

#[test]
fn important_trailing_semicolons_survive_whitespace_removal() {
  let result = bundled(
    &[("/entry.js", "while (foo());\n")],
    &["/entry.js"],
    |options, _| {
      options.minify_whitespace = true;
    },
  );
  expect_clean(&result);
  assert_eq!(result.output("/out.js"), "while(foo());");
}

#[test]
fn runtime_helper_names_win_collisions() {
  let result = bundled(
    &[(
      "/entry.js",
      "export function __require() {\n  return 123;\n}\nconsole.log(__require());\n",
    )],
    &["/entry.js"],
    |_, _| {},
  );
  expect_clean(&result);
  let out = result.output("/out.js");
  // The user's symbol takes the next free suffix; the helper keeps the
  // bare name for itself.
  assert!(out.contains("function __require2() {"), "got: {}", out);
  assert!(out.contains("__require: () => __require2"));
  assert!(!out.contains("function __require() {"));
}

#[test]
fn no_bundle_mode_keeps_runtime_like_names() {
  let result = bundled(
    &[(
      "/entry.js",
      "function __require() {\n  return 123;\n}\nconsole.log(__require());\n",
    )],
    &["/entry.js"],
    |options, _| {
      options.is_bundling = false;
    },
  );
  expect_clean(&result);
  assert_eq!(
    result.output("/out.js"),
    "function __require() {\n  return 123;\n}\nconsole.log(__require());\n"
  );
}

#[test]
fn optional_catch_parameter_avoids_visible_names() {
  let result = bundled(
    &[("/entry.js", "try {}\ncatch { var e, e2 }\nvar e3;\n")],
    &["/entry.js"],
    |options, _| {
      options.is_bundling = false;
      options.target = parse_js::Target::Es2018;
    },
  );
  // One warning about the optional catch binding's level.
  assert_eq!(result.log, vec![
    "/entry.js: warning: This syntax is from ES2019 and is not available in ES2018",
  ]);
  assert_eq!(
    result.output("/out.js"),
    "try {\n} catch (e4) {\n  var e, e2;\n}\nvar e3;\n"
  );
}

#[test]
fn collisions_across_modules_take_numeric_suffixes() {
  let result = bundled(
    &[
      (
        "/entry.js",
        "import {fn} from './foo';\nfunction fn2() {}\nconsole.log(fn(), fn2());\n",
      ),
      ("/foo.js", "export function fn() {\n  return 1;\n}\nfn();\n"),
    ],
    &["/entry.js"],
    |_, _| {},
  );
  expect_clean(&result);
  let out = result.output("/out.js");
  // foo's `fn` keeps its name (more uses); the entry's fn2 stays put.
  assert!(out.contains("function fn() {"));
  assert!(out.contains("function fn2() {"));
  assert!(out.contains("console.log(fn(), fn2());"));
}

#[test]
fn nested_var_hoisting_does_not_confuse_renaming() {
  let result = bundled(
    &[(
      "/entry.js",
      "(() => {\n  function a() {\n    b();\n  }\n  {\n    var b = () => {};\n  }\n  a();\n})();\n",
    )],
    &["/entry.js"],
    |_, _| {},
  );
  expect_clean(&result);
  assert_eq!(
    result.output("/out.js"),
    concat!(
      "// /entry.js\n",
      "(() => {\n",
      "  function a() {\n",
      "    b();\n",
      "  }\n",
      "  {\n",
      "    var b = () => {\n",
      "    };\n",
      "  }\n",
      "  a();\n",
      "})();\n",
    )
  );
}
