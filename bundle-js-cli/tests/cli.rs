use assert_cmd::Command;
use std::fs;

fn bundle_js() -> Command {
  Command::cargo_bin("bundle-js").unwrap()
}

#[test]
fn bundles_to_an_output_file() {
  let dir = tempfile::tempdir().unwrap();
  let entry = dir.path().join("entry.js");
  let dep = dir.path().join("foo.js");
  fs::write(&entry, "import {fn} from './foo';\nconsole.log(fn());\n").unwrap();
  fs::write(&dep, "export function fn() {\n  return 123;\n}\n").unwrap();
  let out = dir.path().join("out.js");

  bundle_js()
    .arg(entry.to_str().unwrap())
    .arg("--bundle")
    .arg("--outfile")
    .arg(out.to_str().unwrap())
    .assert()
    .success()
    .code(0);

  let code = fs::read_to_string(&out).unwrap();
  assert!(code.contains("function fn() {"));
  assert!(code.contains("console.log(fn());"));
}

#[test]
fn writes_to_stdout_without_outfile() {
  let dir = tempfile::tempdir().unwrap();
  let entry = dir.path().join("entry.js");
  fs::write(&entry, "console.log(1);\n").unwrap();

  let assert = bundle_js()
    .arg(entry.to_str().unwrap())
    .assert()
    .success();
  assert_eq!(
    String::from_utf8_lossy(&assert.get_output().stdout),
    "console.log(1);\n"
  );
}

#[test]
fn resolve_errors_exit_with_one() {
  let dir = tempfile::tempdir().unwrap();
  let entry = dir.path().join("entry.js");
  fs::write(&entry, "import './missing';\n").unwrap();

  let assert = bundle_js()
    .arg(entry.to_str().unwrap())
    .arg("--bundle")
    .assert()
    .failure()
    .code(1);
  let stderr = String::from_utf8_lossy(&assert.get_output().stderr);
  assert!(
    stderr.contains("Could not resolve \"./missing\""),
    "stderr: {}",
    stderr
  );
}

#[test]
fn minify_flags_shrink_output() {
  let dir = tempfile::tempdir().unwrap();
  let entry = dir.path().join("entry.js");
  fs::write(
    &entry,
    "function add(first, second) {\n  return first + second;\n}\nconsole.log(add(1, 2));\n",
  )
  .unwrap();

  let assert = bundle_js()
    .arg(entry.to_str().unwrap())
    .arg("--minify")
    .assert()
    .success();
  let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
  assert!(stdout.contains("function a(a,b){return a+b;}"), "stdout: {}", stdout);
}

#[test]
fn loader_overrides_apply() {
  let dir = tempfile::tempdir().unwrap();
  let entry = dir.path().join("entry.js");
  let data = dir.path().join("data.txt");
  fs::write(&entry, "console.log(require('./data.txt'));\n").unwrap();
  fs::write(&data, "hello").unwrap();

  let assert = bundle_js()
    .arg(entry.to_str().unwrap())
    .arg("--bundle")
    .arg("--loader")
    .arg(".txt=text")
    .assert()
    .success();
  let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
  assert!(stdout.contains("module.exports = \"hello\";"), "stdout: {}", stdout);
}

#[test]
fn unknown_loader_is_an_internal_error() {
  let dir = tempfile::tempdir().unwrap();
  let entry = dir.path().join("entry.js");
  fs::write(&entry, "console.log(1);\n").unwrap();

  bundle_js()
    .arg(entry.to_str().unwrap())
    .arg("--loader")
    .arg(".x=bogus")
    .assert()
    .failure()
    .code(2);
}
