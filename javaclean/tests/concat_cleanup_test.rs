//! String-concatenation merging, NLS tag handling, and MessageFormat rewrites.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use javaclean::config::CleanUpOptions;
use javaclean::fixer::{FileCleanUp, FixAggregator};
use javaclean::test_utils::parse;

fn options() -> CleanUpOptions {
    CleanUpOptions {
        merge_string_concat: true,
        ..CleanUpOptions::default()
    }
}

fn compute(source: &str) -> FileCleanUp {
    let tree = parse(source).expect("should parse");
    FixAggregator::new().compute(&tree, &options())
}

fn run(source: &str) -> String {
    compute(source).realize(source).expect("should realize")
}

#[test]
fn test_two_literals_merge() {
    assert_eq!(run("String s = \"a\" + \"b\";"), "String s = \"ab\";");
}

#[test]
fn test_four_literals_merge() {
    assert_eq!(
        run("String s = \"a\" + \"b\" + \"c\" + \"d\";"),
        "String s = \"abcd\";"
    );
}

#[test]
fn test_single_literal_left_alone() {
    let source = "String s = \"a\" + x;";
    assert_eq!(run(source), source);
}

#[test]
fn test_numeric_prefix_left_alone() {
    // `1 + 2 + "a"` adds before it concatenates; merging would change the
    // value.
    let source = "String s = 1 + 2 + \"a\" + \"b\";";
    assert_eq!(run(source), source);
}

#[test]
fn test_mixed_chain_becomes_message_format() {
    let result = compute("String s = \"a\" + x + \"b\";");
    assert_eq!(
        result.realize("String s = \"a\" + x + \"b\";").expect("should realize"),
        "String s = MessageFormat.format(\"a{0}b\", x);"
    );
    assert_eq!(result.imports.added(), vec!["java.text.MessageFormat"]);
}

#[test]
fn test_brace_in_literal_blocks_message_format() {
    // `{` is a MessageFormat metacharacter; quoting it is out of scope.
    let source = "String s = \"a{\" + x + \"b\";";
    assert_eq!(run(source), source);
}

#[test]
fn test_untagged_result_records_no_import() {
    let result = compute("String s = \"a\" + \"b\";");
    assert!(result.imports.added().is_empty());
}

#[test]
fn test_tagged_literals_merge_and_drop_surplus_tags() {
    assert_eq!(
        run("String s = \"a\" + \"b\"; //$NON-NLS-1$ //$NON-NLS-2$"),
        "String s = \"ab\"; //$NON-NLS-1$"
    );
}

#[test]
fn test_three_tagged_literals() {
    assert_eq!(
        run("String s = \"a\" + \"b\" + \"c\"; //$NON-NLS-1$ //$NON-NLS-2$ //$NON-NLS-3$"),
        "String s = \"abc\"; //$NON-NLS-1$"
    );
}

#[test]
fn test_five_tagged_literals() {
    let source = "String s = \"a\" + \"b\" + \"c\" + \"d\" + \"e\"; \
                  //$NON-NLS-1$ //$NON-NLS-2$ //$NON-NLS-3$ //$NON-NLS-4$ //$NON-NLS-5$";
    assert_eq!(run(source), "String s = \"abcde\"; //$NON-NLS-1$");
}

#[test]
fn test_mixed_tagging_left_alone() {
    // Tagging only some literals is ambiguous; merging would either tag an
    // untagged literal or untag a tagged one.
    let source = "String s = \"a\" //$NON-NLS-1$\n + \"b\" + x;";
    assert_eq!(run(source), source);
}

#[test]
fn test_tagged_chain_across_lines_left_alone() {
    let source = "String s = \"a\" //$NON-NLS-1$\n + \"b\"; //$NON-NLS-1$";
    assert_eq!(run(source), source);
}

#[test]
fn test_multiline_value_becomes_text_block() {
    assert_eq!(
        run("String s = \"one\\n\" + \"two\\n\" + \"three\\n\";"),
        "String s = \"\"\"\n    one\n    two\n    three\n    \"\"\";"
    );
}

#[test]
fn test_value_with_quote_stays_single_line() {
    // A quote inside the merged value disqualifies the text block form.
    assert_eq!(
        run("String s = \"say \\\"hi\\\"\\n\" + \"twice\\n\";"),
        "String s = \"say \\\"hi\\\"\\ntwice\\n\";"
    );
}
