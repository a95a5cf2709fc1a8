//! Formatter collaborator: re-indentation of verbatim fragments.
//!
//! The engine never reformats structured payloads; the only formatting it
//! performs itself is shifting the interior lines of a verbatim fragment when
//! a fragment moves to a different nesting depth. Pure `string x indent-unit
//! -> string`, per the external-interface contract.

/// Re-indent the interior lines of a multi-line fragment.
///
/// The first line is left untouched (it lands at an already-indented
/// position); every following non-blank line has `old_indent` stripped once
/// if present and `new_indent` prepended.
#[must_use]
pub fn reindent(fragment: &str, old_indent: &str, new_indent: &str) -> String {
    if !fragment.contains('\n') {
        return fragment.to_owned();
    }
    let mut out = String::with_capacity(fragment.len());
    for (i, line) in fragment.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if i == 0 {
            out.push_str(line);
        } else if line.trim().is_empty() {
            // Blank lines stay blank; trailing whitespace is not our business.
            out.push_str(line);
        } else {
            let rest = line.strip_prefix(old_indent).unwrap_or(line);
            out.push_str(new_indent);
            out.push_str(rest);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reindent_shifts_interior_lines() {
        let fragment = "if (a) {\n        foo();\n    }";
        let shifted = reindent(fragment, "    ", "        ");
        assert_eq!(shifted, "if (a) {\n            foo();\n        }");
    }

    #[test]
    fn test_reindent_single_line_untouched() {
        assert_eq!(reindent("return x;", "    ", ""), "return x;");
    }

    #[test]
    fn test_reindent_keeps_blank_lines() {
        let fragment = "a();\n\nb();";
        assert_eq!(reindent(fragment, "", "    "), "a();\n\n    b();");
    }
}
