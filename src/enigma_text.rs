//! Text / Enigma Parser (C11): tokenizes Enigma-format inline directives
//! (`^name(args)`), extracts font runs, substitutes accidental glyphs, and
//! strips directives down to plain text (spec.md §4.11).
//!
//! Grounded on `original_source`'s Enigma-string handling (the same
//! `^tag(args)` grammar, `^^` as a literal caret, balanced-parenthesis
//! arguments) and on the teacher's `domain::text` tokenizer shape for a
//! scan-once, emit-tokens parser rather than a regex sweep.

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Text(String),
    Directive { name: String, args: Vec<String> },
}

/// Scans `text` into a flat token stream. `^^` collapses to a literal `^`;
/// `^name(args)` with unbalanced or missing parentheses is malformed and
/// its leading `^` is emitted as a literal character instead (spec.md §4.11
/// "malformed input").
fn scan(text: &str) -> Vec<Token> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != '^' {
            literal.push(chars[i]);
            i += 1;
            continue;
        }
        if chars.get(i + 1) == Some(&'^') {
            literal.push('^');
            i += 2;
            continue;
        }

        let name_start = i + 1;
        let mut j = name_start;
        while j < chars.len() && (chars[j].is_alphanumeric() || chars[j] == '_') {
            j += 1;
        }
        if j == name_start || chars.get(j) != Some(&'(') {
            literal.push('^');
            i += 1;
            continue;
        }

        let mut depth = 1;
        let mut k = j + 1;
        while k < chars.len() && depth > 0 {
            match chars[k] {
                '(' => depth += 1,
                ')' => depth -= 1,
                _ => {}
            }
            if depth == 0 {
                break;
            }
            k += 1;
        }
        if depth != 0 {
            literal.push('^');
            i += 1;
            continue;
        }

        if !literal.is_empty() {
            tokens.push(Token::Text(std::mem::take(&mut literal)));
        }
        let name: String = chars[name_start..j].iter().collect();
        let args_str: String = chars[j + 1..k].iter().collect();
        let args = if args_str.is_empty() { Vec::new() } else { split_top_level_args(&args_str) };
        tokens.push(Token::Directive { name, args });
        i = k + 1;
    }

    if !literal.is_empty() {
        tokens.push(Token::Text(literal));
    }
    tokens
}

/// Splits on commas at paren-depth zero, so an argument may itself contain
/// balanced parentheses (spec.md §4.11).
fn split_top_level_args(s: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    for c in s.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth -= 1;
                current.push(c);
            }
            ',' if depth == 0 => args.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    args.push(current);
    args
}

/// Parses a single directive's components — the name followed by its
/// argument list (spec.md §4.11 "parseComponents"). `tag` excludes the
/// leading `^`. Malformed input (unbalanced parens, trailing garbage after
/// the closing paren) yields an empty vector.
pub fn parse_components(tag: &str) -> Vec<String> {
    let chars: Vec<char> = tag.chars().collect();
    let Some(open) = chars.iter().position(|&c| c == '(') else {
        return if tag.is_empty() { Vec::new() } else { vec![tag.to_string()] };
    };
    let name: String = chars[..open].iter().collect();
    if name.is_empty() {
        return Vec::new();
    }
    let mut depth = 1i32;
    let mut k = open + 1;
    while k < chars.len() && depth > 0 {
        match chars[k] {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
        if depth == 0 {
            break;
        }
        k += 1;
    }
    if depth != 0 || k != chars.len() - 1 {
        return Vec::new();
    }
    let args_str: String = chars[open + 1..k].iter().collect();
    let mut result = vec![name];
    if !args_str.is_empty() {
        result.extend(split_top_level_args(&args_str));
    }
    result
}

/// The font carried by the first `^font…(…)` directive in `text`, refined
/// by whichever `^size(n)`/`^nfx(bitmask)` directives follow it (spec.md
/// §4.11 "parseFirstFontInfo"). `None` if no font directive is present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontRun {
    pub font: String,
    pub size: Option<i32>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikeout: bool,
    pub absolute: bool,
    pub hidden: bool,
}

const NFX_BOLD: i64 = 1 << 0;
const NFX_ITALIC: i64 = 1 << 1;
const NFX_UNDERLINE: i64 = 1 << 2;
const NFX_STRIKEOUT: i64 = 1 << 3;
const NFX_ABSOLUTE: i64 = 1 << 4;
const NFX_HIDDEN: i64 = 1 << 5;

pub fn parse_first_font_info(text: &str) -> Option<FontRun> {
    let tokens = scan(text);
    let font_index = tokens.iter().position(|t| matches!(t, Token::Directive { name, .. } if name.starts_with("font")))?;
    let Token::Directive { args, .. } = &tokens[font_index] else { unreachable!() };
    let mut run = FontRun { font: args.first().cloned().unwrap_or_default(), ..Default::default() };

    for token in &tokens[font_index + 1..] {
        let Token::Directive { name, args } = token else { continue };
        match name.as_str() {
            "size" => {
                if run.size.is_none() {
                    run.size = args.first().and_then(|a| a.trim().parse().ok());
                }
            }
            "nfx" => {
                let bitmask: i64 = args.first().and_then(|a| a.trim().parse().ok()).unwrap_or(0);
                run.bold = bitmask & NFX_BOLD != 0;
                run.italic = bitmask & NFX_ITALIC != 0;
                run.underline = bitmask & NFX_UNDERLINE != 0;
                run.strikeout = bitmask & NFX_STRIKEOUT != 0;
                run.absolute = bitmask & NFX_ABSOLUTE != 0;
                run.hidden = bitmask & NFX_HIDDEN != 0;
            }
            _ => {}
        }
    }
    Some(run)
}

/// The glyph repertoire `replaceAccidentalTags` substitutes into
/// (spec.md §4.11 "ASCII, Unicode, or SMuFL code points").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccidentalStyle {
    Ascii,
    Unicode,
    Smufl,
}

impl AccidentalStyle {
    fn sharp(self) -> &'static str {
        match self {
            AccidentalStyle::Ascii => "#",
            AccidentalStyle::Unicode => "\u{266F}",
            AccidentalStyle::Smufl => "\u{E262}",
        }
    }
    fn natural(self) -> &'static str {
        match self {
            AccidentalStyle::Ascii => "n",
            AccidentalStyle::Unicode => "\u{266E}",
            AccidentalStyle::Smufl => "\u{E261}",
        }
    }
    fn flat(self) -> &'static str {
        match self {
            AccidentalStyle::Ascii => "b",
            AccidentalStyle::Unicode => "\u{266D}",
            AccidentalStyle::Smufl => "\u{E260}",
        }
    }
}

/// Substitutes `^sharp()`, `^natural()`, `^flat()` with `style`'s glyphs;
/// every other directive is reproduced verbatim (spec.md §4.11
/// "replaceAccidentalTags").
pub fn replace_accidental_tags(text: &str, style: AccidentalStyle) -> String {
    let mut out = String::with_capacity(text.len());
    for token in scan(text) {
        match token {
            Token::Text(s) => out.push_str(&s),
            Token::Directive { name, args } => match name.as_str() {
                "sharp" => out.push_str(style.sharp()),
                "natural" => out.push_str(style.natural()),
                "flat" => out.push_str(style.flat()),
                _ => {
                    out.push('^');
                    out.push_str(&name);
                    out.push('(');
                    out.push_str(&args.join(","));
                    out.push(')');
                }
            },
        }
    }
    out
}

/// Strips every directive, collapsing `^^` to a single `^` (spec.md §4.11
/// "trimTags"). Idempotent: running it again on its own output is a no-op.
pub fn trim_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for token in scan(text) {
        if let Token::Text(s) = token {
            out.push_str(&s);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_caret_is_a_literal_caret() {
        assert_eq!(trim_tags("a^^b"), "a^b");
    }

    #[test]
    fn trim_tags_strips_directives_and_is_idempotent() {
        let once = trim_tags("Hello ^bold(1)World^bold(0)!");
        assert_eq!(once, "Hello World!");
        assert_eq!(trim_tags(&once), once);
    }

    #[test]
    fn malformed_directive_is_left_as_a_literal_caret() {
        assert_eq!(trim_tags("^unterminated(abc"), "^unterminated(abc");
    }

    #[test]
    fn parse_components_splits_name_and_balanced_args() {
        assert_eq!(parse_components("font(Arial,(bold))"), vec!["font", "Arial", "(bold)"]);
        assert_eq!(parse_components("size(12)"), vec!["size", "12"]);
        assert_eq!(parse_components("unterminated("), Vec::<String>::new());
    }

    #[test]
    fn parse_first_font_info_combines_size_and_nfx() {
        let run = parse_first_font_info("^fontTxt(Garamond)^size(14)^nfx(3)").unwrap();
        assert_eq!(run.font, "Garamond");
        assert_eq!(run.size, Some(14));
        assert!(run.bold);
        assert!(run.italic);
        assert!(!run.underline);
    }

    #[test]
    fn parse_first_font_info_is_none_without_a_font_directive() {
        assert!(parse_first_font_info("plain text").is_none());
    }

    #[test]
    fn replace_accidental_tags_substitutes_only_accidentals() {
        let out = replace_accidental_tags("C^sharp() and ^bold(1)D^flat()", AccidentalStyle::Ascii);
        assert_eq!(out, "C# and ^bold(1)Db");
    }

    #[test]
    fn replace_accidental_tags_smufl_codepoints() {
        let out = replace_accidental_tags("^sharp()", AccidentalStyle::Smufl);
        assert_eq!(out, "\u{E262}");
    }
}
