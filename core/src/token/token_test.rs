#[cfg(test)]
mod tests {
    use crate::token::{Position, Span, Token, Tokenizer, offset_to_position, position_to_offset};

    fn kinds(src: &str) -> Vec<Token> {
        Tokenizer::tokenize(src).tokens
    }

    fn s(value: &str) -> Token {
        Token::Str {
            value: value.to_string(),
            format: false,
            multiline: false,
        }
    }

    #[test]
    fn basic() {
        let tokens = kinds("1 + 2 * 3 / 4 % 5 == 'str' true false");
        let expected = vec![
            Token::Int(1),
            Token::Add,
            Token::Int(2),
            Token::Mul,
            Token::Int(3),
            Token::Div,
            Token::Int(4),
            Token::Mod,
            Token::Int(5),
            Token::Eq,
            s("str"),
            Token::Bool(true),
            Token::Bool(false),
        ];
        assert_eq!(tokens, expected);
    }

    #[test]
    fn test_compound_assignment_tokens() {
        let tokens = kinds("+= -= *= /= %=");
        let expected = vec![
            Token::AddAssign,
            Token::SubAssign,
            Token::MulAssign,
            Token::DivAssign,
            Token::ModAssign,
        ];
        assert_eq!(tokens, expected);
    }

    #[test]
    fn keywords_and_word_operators() {
        let tokens = kinds("if elif else endif foreach endforeach break continue and or not in");
        let expected = vec![
            Token::If,
            Token::Elif,
            Token::Else,
            Token::Endif,
            Token::Foreach,
            Token::Endforeach,
            Token::Break,
            Token::Continue,
            Token::And,
            Token::Or,
            Token::Not,
            Token::In,
        ];
        assert_eq!(tokens, expected);
    }

    #[test]
    fn integer_bases() {
        assert_eq!(
            kinds("0x1F 0o17 0b101 42"),
            vec![Token::Int(31), Token::Int(15), Token::Int(5), Token::Int(42)]
        );
    }

    #[test]
    fn invalid_integer_is_recorded_not_fatal() {
        let lexed = Tokenizer::tokenize("0xZZ + 1");
        assert_eq!(lexed.tokens[0], Token::Int(0));
        assert_eq!(lexed.errors.len(), 1);
        assert_eq!(lexed.tokens.len(), 3);
    }

    #[test]
    fn every_line_break_is_a_newline_token() {
        let tokens = kinds("foo(\n  'a',\n  'b',\n)\nx = 1\n");
        let newlines = tokens.iter().filter(|t| **t == Token::Newline).count();
        assert_eq!(newlines, 5);
    }

    #[test]
    fn comments_are_skipped() {
        let tokens = kinds("x = 1 # comment ( not a bracket\ny = 2");
        assert_eq!(
            tokens,
            vec![
                Token::Id("x".to_string()),
                Token::Assign,
                Token::Int(1),
                Token::Newline,
                Token::Id("y".to_string()),
                Token::Assign,
                Token::Int(2),
            ]
        );
    }

    #[test]
    fn string_escape_sequences() {
        assert_eq!(kinds(r"'Hello\nWorld'"), vec![s("Hello\nWorld")]);
        assert_eq!(kinds(r"'Tab\tTest'"), vec![s("Tab\tTest")]);
        assert_eq!(kinds(r"'it\'s'"), vec![s("it's")]);
        assert_eq!(kinds(r"'\x41é'"), vec![s("Aé")]);
        assert_eq!(kinds(r"'\101'"), vec![s("A")]);
        assert_eq!(kinds(r"'keep\q'"), vec![s("keep\\q")]);
    }

    #[test]
    fn format_and_multiline_strings() {
        let tokens = kinds("f'@name@' '''a\nb''' f'''x'''");
        assert_eq!(
            tokens,
            vec![
                Token::Str {
                    value: "@name@".to_string(),
                    format: true,
                    multiline: false
                },
                Token::Str {
                    value: "a\nb".to_string(),
                    format: false,
                    multiline: true
                },
                Token::Str {
                    value: "x".to_string(),
                    format: true,
                    multiline: true
                },
            ]
        );
    }

    #[test]
    fn f_identifier_is_not_a_format_prefix() {
        assert_eq!(
            kinds("f = 1"),
            vec![Token::Id("f".to_string()), Token::Assign, Token::Int(1)]
        );
    }

    #[test]
    fn unclosed_str_recovers_at_line_end() {
        let lexed = Tokenizer::tokenize("x = 'abc\ny = 1");
        assert_eq!(lexed.errors.len(), 1);
        assert!(lexed.tokens.contains(&Token::Id("y".to_string())));
    }

    #[test]
    fn unknown_character_becomes_token() {
        let lexed = Tokenizer::tokenize("a $ b");
        assert_eq!(lexed.tokens[1], Token::Unknown('$'));
        assert_eq!(lexed.errors.len(), 1);
    }

    #[test]
    fn spans_use_utf16_columns() {
        let lexed = Tokenizer::tokenize("x = '😀' + y");
        // the emoji is two UTF-16 code units but four bytes
        let y_span = lexed.spans.last().unwrap();
        assert_eq!(y_span.start.line, 0);
        assert_eq!(y_span.start.column, 11);
        assert_eq!(y_span.start.offset, 13);
    }

    #[test]
    fn spans_track_lines() {
        let lexed = Tokenizer::tokenize("a\n  b");
        assert_eq!(lexed.spans[2], Span::new(Position::new(1, 2, 4), Position::new(1, 3, 5)));
    }

    #[test]
    fn test_offset_to_position() {
        let text = "line1\nline2\nline3";

        assert_eq!(offset_to_position(text, 0), Position::new(0, 0, 0));
        assert_eq!(offset_to_position(text, 5), Position::new(0, 5, 5));
        assert_eq!(offset_to_position(text, 6), Position::new(1, 0, 6));
        assert_eq!(offset_to_position(text, 12), Position::new(2, 0, 12));
    }

    #[test]
    fn test_position_to_offset() {
        let text = "ab\ncd\n";
        assert_eq!(position_to_offset(text, 1, 1), 4);
        assert_eq!(position_to_offset(text, 0, 99), 2);
        assert_eq!(position_to_offset(text, 9, 0), text.len());
    }

    #[test]
    fn span_contains_is_half_open() {
        let span = Span::new(Position::new(0, 0, 0), Position::new(0, 10, 10));
        assert!(span.contains(0, 0));
        assert!(span.contains(0, 9));
        assert!(!span.contains(0, 10));
        assert!(!span.contains(1, 0));
    }

    #[test]
    fn test_span_display() {
        let span1 = Span::new(Position::new(0, 4, 4), Position::new(0, 9, 9));
        assert_eq!(span1.to_string(), "1:5-10");

        let span2 = Span::new(Position::new(0, 4, 4), Position::new(2, 1, 20));
        assert_eq!(span2.to_string(), "1:5-3:2");
    }
}
