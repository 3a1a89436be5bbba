// `#` runs to end of line, except inside a `"`, `'`, or backtick-quoted region.
pub fn strip_comments(source: &str) -> String {
    source
        .lines()
        .map(strip_comment_from_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_comment_from_line(line: &str) -> &str {
    let mut in_quotes = false;
    let mut quote_char = '\0';

    for (index, ch) in line.char_indices() {
        match ch {
            '"' | '\'' | '`' => {
                if !in_quotes {
                    in_quotes = true;
                    quote_char = ch;
                } else if ch == quote_char {
                    in_quotes = false;
                }
            }
            '#' if !in_quotes => return line[..index].trim_end_matches([' ', '\t']),
            _ => {}
        }
    }

    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_trailing_comment() {
        assert_eq!(strip_comment_from_line("let a = 5; # the answer"), "let a = 5;");
    }

    #[test]
    fn leaves_hash_inside_string_literal() {
        assert_eq!(
            strip_comment_from_line(r#"let a = "not a # comment";"#),
            r#"let a = "not a # comment";"#
        );
    }

    #[test]
    fn strips_whole_comment_only_line() {
        assert_eq!(strip_comment_from_line("# a whole line comment"), "");
    }

    #[test]
    fn strips_across_multiple_lines() {
        let source = "let a = 1; # one\nlet b = 2; # two";
        assert_eq!(strip_comments(source), "let a = 1; \nlet b = 2; ");
    }
}
