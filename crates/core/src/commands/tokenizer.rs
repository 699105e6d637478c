//! Quote-aware argument tokenizer.
//!
//! A single left-to-right scan: a `"` or `'` opens a literal run until its
//! matching closing quote, during which the other quote character is just
//! a literal character. Whitespace outside a quoted run delimits tokens;
//! empty tokens are discarded.

pub fn tokenize(arg_string: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in arg_string.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            None => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s3_quoted_token_with_trailing_bare_token() {
        assert_eq!(tokenize(r#""Evil Player" 100"#), vec!["Evil Player", "100"]);
    }

    #[test]
    fn plain_whitespace_split() {
        assert_eq!(tokenize("foo bar baz"), vec!["foo", "bar", "baz"]);
    }

    #[test]
    fn repeated_whitespace_produces_no_empty_tokens() {
        assert_eq!(tokenize("foo   bar"), vec!["foo", "bar"]);
    }

    #[test]
    fn single_quotes_work_like_double_quotes() {
        assert_eq!(tokenize("'hello world' next"), vec!["hello world", "next"]);
    }

    #[test]
    fn opposite_quote_inside_quoted_run_is_literal() {
        assert_eq!(tokenize(r#""it's fine""#), vec!["it's fine"]);
        assert_eq!(tokenize(r#"'say "hi"'"#), vec![r#"say "hi""#]);
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn unterminated_quote_still_yields_its_content() {
        assert_eq!(tokenize(r#""unterminated"#), vec!["unterminated"]);
    }
}
