//! If/else-if chain to switch conversion.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use javaclean::config::CleanUpOptions;
use javaclean::fixer::FixAggregator;
use javaclean::test_utils::parse;

fn run_with(source: &str, options: &CleanUpOptions) -> String {
    let tree = parse(source).expect("should parse");
    let result = FixAggregator::new().compute(&tree, options);
    result.realize(source).expect("should realize")
}

fn run(source: &str) -> String {
    run_with(
        source,
        &CleanUpOptions {
            if_chain_to_switch: true,
            ..CleanUpOptions::default()
        },
    )
}

#[test]
fn test_int_chain_converts() {
    let source = "int x = 0;\n\
                  if (x == 1) { a(); } else if (x == 2) { b(); } else { c(); }";
    assert_eq!(
        run(source),
        "int x = 0;\n\
         switch (x) {\n\
         case 1:\n    a();\n    break;\n\
         case 2:\n    b();\n    break;\n\
         default:\n    c();\n\
         }"
    );
}

#[test]
fn test_or_guard_becomes_label_list() {
    let source = "int x = 0;\n\
                  if (x == 1 || x == 2) { a(); } else if (x == 3) { b(); } else { c(); }";
    assert_eq!(
        run(source),
        "int x = 0;\n\
         switch (x) {\n\
         case 1:\ncase 2:\n    a();\n    break;\n\
         case 3:\n    b();\n    break;\n\
         default:\n    c();\n\
         }"
    );
}

#[test]
fn test_abrupt_bodies_need_no_break() {
    let source = "int x = 0;\n\
                  if (x == 1) { return; } else if (x == 2) { return; } else { c(); }";
    assert_eq!(
        run(source),
        "int x = 0;\n\
         switch (x) {\n\
         case 1:\n    return;\n\
         case 2:\n    return;\n\
         default:\n    c();\n\
         }"
    );
}

#[test]
fn test_string_equals_chain_converts() {
    let source = "String s = \"\";\n\
                  if (s.equals(\"a\")) { a(); } else if (s.equals(\"b\")) { b(); } else { c(); }";
    assert_eq!(
        run(source),
        "String s = \"\";\n\
         switch (s) {\n\
         case \"a\":\n    a();\n    break;\n\
         case \"b\":\n    b();\n    break;\n\
         default:\n    c();\n\
         }"
    );
}

#[test]
fn test_short_chain_left_alone() {
    // Two branches stay below the default minimum of three.
    let source = "int x = 0;\nif (x == 1) { a(); } else { b(); }";
    assert_eq!(run(source), source);
}

#[test]
fn test_min_branches_is_configurable() {
    let source = "int x = 0;\nif (x == 1) { a(); } else { b(); }";
    let options = CleanUpOptions {
        if_chain_to_switch: true,
        min_switch_branches: 2,
        ..CleanUpOptions::default()
    };
    assert_eq!(
        run_with(source, &options),
        "int x = 0;\n\
         switch (x) {\n\
         case 1:\n    a();\n    break;\n\
         default:\n    b();\n\
         }"
    );
}

#[test]
fn test_mismatched_scrutinee_left_alone() {
    let source = "int x = 0;\nint y = 0;\n\
                  if (x == 1) { a(); } else if (y == 2) { b(); } else { c(); }";
    assert_eq!(run(source), source);
}

#[test]
fn test_nonconstant_label_left_alone() {
    let source = "int x = 0;\nint k = 1;\n\
                  if (x == k) { a(); } else if (x == 2) { b(); } else { c(); }";
    assert_eq!(run(source), source);
}

#[test]
fn test_scrutinee_write_left_alone() {
    let source = "int x = 0;\n\
                  if (x == 1) { x = 2; } else if (x == 2) { b(); } else { c(); }";
    assert_eq!(run(source), source);
}

#[test]
fn test_duplicate_labels_left_alone() {
    let source = "int x = 0;\n\
                  if (x == 1) { a(); } else if (x == 1) { b(); } else { c(); }";
    assert_eq!(run(source), source);
}

#[test]
fn test_long_scrutinee_left_alone() {
    // long comparisons have no switch form; the chain must survive as is.
    let source = "long x = 0;\n\
                  if (x == 1) { a(); } else if (x == 2) { b(); } else { c(); }";
    assert_eq!(run(source), source);
}

#[test]
fn test_char_scrutinee_converts() {
    let source = "char c = 'a';\n\
                  if (c == 'x') { a(); } else if (c == 'y') { b(); } else { d(); }";
    assert_eq!(
        run(source),
        "char c = 'a';\n\
         switch (c) {\n\
         case 'x':\n    a();\n    break;\n\
         case 'y':\n    b();\n    break;\n\
         default:\n    d();\n\
         }"
    );
}

#[test]
fn test_pure_unary_read_in_body_converts() {
    let source = "int x = 0;\n\
                  if (x == 1) { a(-x); } else if (x == 2) { b(); } else { c(); }";
    assert_eq!(
        run(source),
        "int x = 0;\n\
         switch (x) {\n\
         case 1:\n    a(-x);\n    break;\n\
         case 2:\n    b();\n    break;\n\
         default:\n    c();\n\
         }"
    );
}
