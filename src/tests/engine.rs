// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(clippy::unwrap_used, clippy::panic)]

use crate::loader::MemLoader;
use crate::Engine;

use anyhow::Result;

fn engine(files: &[(&str, &str)]) -> Engine {
    let mut loader = MemLoader::new();
    for (path, contents) in files {
        loader.add(path, contents);
    }
    Engine::with_loader(Box::new(loader))
}

#[test]
fn only_needed_functions_are_inlined() -> Result<()> {
    let mut engine = engine(&[
        ("main.sh", ". lib.sh\ngreet\n"),
        (
            "lib.sh",
            "greet() {\n    echo hi\n}\n\nhelper() {\n    echo unused\n}\n",
        ),
    ]);
    let output = engine.expand_file("main.sh")?;
    assert_eq!(output, "greet() {\n    echo hi\n}\n\ngreet\n");
    Ok(())
}

#[test]
fn closure_is_emitted_with_the_directive() -> Result<()> {
    let mut engine = engine(&[
        ("main.sh", ". lib.sh\ngreet\n"),
        (
            "lib.sh",
            "greet() {\n    helper\n}\n\nhelper() {\n    echo hi\n}\n",
        ),
    ]);
    let output = engine.expand_file("main.sh")?;
    assert_eq!(
        output,
        "greet() {\n    helper\n}\n\nhelper() {\n    echo hi\n}\n\ngreet\n"
    );
    Ok(())
}

#[test]
fn names_that_occur_only_in_comments_are_not_needed() -> Result<()> {
    let mut engine = engine(&[
        ("main.sh", ". lib.sh\n# greet is nice\necho done # not greet\n"),
        ("lib.sh", "greet() {\n    echo hi\n}\n"),
    ]);
    let output = engine.expand_file("main.sh")?;
    assert_eq!(output, "# greet is nice\necho done # not greet\n");
    Ok(())
}

#[test]
fn usage_detection_is_an_unscoped_substring_test() -> Result<()> {
    // `logger` is not a function, but it contains `log`; the match is
    // textual and over-inclusive
    let mut engine = engine(&[
        ("main.sh", ". lib.sh\nlogger start\n"),
        ("lib.sh", "log() {\n    echo l\n}\n"),
    ]);
    let output = engine.expand_file("main.sh")?;
    assert_eq!(output, "log() {\n    echo l\n}\n\nlogger start\n");
    Ok(())
}

#[test]
fn registry_accumulates_across_directives() -> Result<()> {
    // one() only becomes needed once use_two() from the second library
    // references it
    let mut engine = engine(&[
        ("main.sh", ". lib1.sh\n. lib2.sh\nuse_two\n"),
        ("lib1.sh", "one() {\n    echo 1\n}\n"),
        ("lib2.sh", "use_two() {\n    one\n}\n"),
    ]);
    let output = engine.expand_file("main.sh")?;
    assert_eq!(
        output,
        "one() {\n    echo 1\n}\n\nuse_two() {\n    one\n}\n\nuse_two\n"
    );
    Ok(())
}

#[test]
fn first_resolved_definition_wins() -> Result<()> {
    let mut engine = engine(&[
        ("main.sh", ". one.sh\n. two.sh\nshared\n"),
        ("one.sh", "shared() {\n    echo one\n}\n"),
        ("two.sh", "shared() {\n    echo two\n}\n"),
    ]);
    let output = engine.expand_file("main.sh")?;
    assert_eq!(output, "shared() {\n    echo one\n}\n\nshared\n");
    Ok(())
}

#[test]
fn include_pastes_the_file_unfiltered() -> Result<()> {
    let mut engine = engine(&[
        ("main.sh", "###Include: banner.sh\necho done\n"),
        ("banner.sh", "# banner\nhelper() { echo never-filtered; }\n"),
    ]);
    let output = engine.expand_file("main.sh")?;
    assert_eq!(
        output,
        "# banner\nhelper() { echo never-filtered; }\necho done\n"
    );
    Ok(())
}

#[test]
fn blank_line_runs_are_squeezed() -> Result<()> {
    let mut engine = engine(&[("main.sh", "a\n\n\n\nb\n\n\n\n\nc\n")]);
    let output = engine.expand_file("main.sh")?;
    assert_eq!(output, "a\n\nb\n\nc\n");
    Ok(())
}

#[test]
fn whitespace_only_lines_pass_through() -> Result<()> {
    let mut engine = engine(&[("main.sh", "a\n  \t\n  \t\nb\n")]);
    let output = engine.expand_file("main.sh")?;
    assert_eq!(output, "a\n  \t\n  \t\nb\n");
    Ok(())
}

#[test]
fn trailing_comment_on_directive_is_part_of_the_path() {
    let mut engine = engine(&[
        ("main.sh", ". lib.sh # load helpers\n"),
        ("lib.sh", "f() {\n    echo f\n}\n"),
    ]);
    let err = engine.expand_file("main.sh").unwrap_err();
    assert!(err.to_string().contains("lib.sh # load helpers"));
}

#[test]
fn missing_include_is_fatal() {
    let mut engine = engine(&[("main.sh", "###Include: nowhere.sh\n")]);
    let err = engine.expand_file("main.sh").unwrap_err();
    assert!(err.to_string().contains("nowhere.sh"));
}

#[test]
fn missing_main_script_is_fatal() {
    let mut engine = engine(&[]);
    assert!(engine.expand_file("main.sh").is_err());
}

#[test]
fn script_without_trailing_newline_keeps_its_lines() -> Result<()> {
    let mut engine = engine(&[("main.sh", "a\nb")]);
    let output = engine.expand_file("main.sh")?;
    assert_eq!(output, "a\nb\n");
    Ok(())
}
