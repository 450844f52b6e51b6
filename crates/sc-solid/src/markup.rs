//! Vector markup intake: sanitation, root validation, declared size.

use crate::error::ParseError;
use winnow::combinator::{opt, preceded};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::take_while;

/// Size used when the markup declares none.
pub const DEFAULT_SIZE: f64 = 100.0;

const STRIPPED_GLYPHS: [char; 3] = ['\u{2122}', '\u{00AE}', '\u{00A9}'];
const STRIPPED_ENTITIES: [&str; 3] = ["&trade;", "&reg;", "&copy;"];

/// Validated vector markup with its declared size.
#[derive(Debug, Clone, PartialEq)]
pub struct Markup {
    /// Sanitised text, ready for conversion.
    pub text: String,
    pub width: f64,
    pub height: f64,
}

/// Remove trademark/registered/copyright glyphs and their named entities.
/// The entities are not predefined in XML, so leaving them in would make
/// an otherwise valid file fail to parse.
pub fn sanitize(text: &str) -> String {
    let mut out: String = text.chars().filter(|c| !STRIPPED_GLYPHS.contains(c)).collect();
    for entity in STRIPPED_ENTITIES {
        if out.contains(entity) {
            out = out.replace(entity, "");
        }
    }
    out
}

/// Sanitise, parse, and check for a root `<svg>` element.
///
/// Width/height come from the `viewBox` (3rd and 4th fields) when present,
/// else from the `width`/`height` attributes, else [`DEFAULT_SIZE`].
pub fn validate(text: &str) -> Result<Markup, ParseError> {
    let text = sanitize(text);
    let doc = roxmltree::Document::parse(&text).map_err(|e| ParseError::Syntax(e.to_string()))?;
    let root = doc.root_element();
    if root.tag_name().name() != "svg" {
        return Err(ParseError::MissingRoot);
    }

    let mut width = root.attribute("width").and_then(parse_length).unwrap_or(DEFAULT_SIZE);
    let mut height = root.attribute("height").and_then(parse_length).unwrap_or(DEFAULT_SIZE);
    if let Some([_, _, vw, vh]) = root.attribute("viewBox").and_then(parse_view_box) {
        width = vw;
        height = vh;
    }

    log::debug!("outline markup declares {width}x{height}");
    Ok(Markup {
        text,
        width,
        height,
    })
}

// ─── Numbers ─────────────────────────────────────────────────────────────

fn parse_number(input: &mut &str) -> ModalResult<f64> {
    let start = *input;
    let _ = opt(winnow::token::one_of(['-', '+'])).parse_next(input)?;
    let int: &str = take_while(0.., |c: char| c.is_ascii_digit()).parse_next(input)?;
    let frac = opt(preceded('.', take_while(0.., |c: char| c.is_ascii_digit()))).parse_next(input)?;
    if int.is_empty() && frac.is_none_or(str::is_empty) {
        return Err(ErrMode::Backtrack(ContextError::new()));
    }
    if input.starts_with(['e', 'E']) {
        let checkpoint = *input;
        *input = &input[1..];
        let _ = opt(winnow::token::one_of(['-', '+'])).parse_next(input)?;
        let exp: &str = take_while(0.., |c: char| c.is_ascii_digit()).parse_next(input)?;
        if exp.is_empty() {
            *input = checkpoint;
        }
    }
    let matched = &start[..start.len() - input.len()];
    matched
        .parse::<f64>()
        .map_err(|_| ErrMode::Backtrack(ContextError::new()))
}

fn skip_separators(input: &mut &str) {
    *input = input.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == ',');
}

/// `"100"`, `"100px"`, `"12.5mm"` → the leading number. Percentages are
/// relative to nothing here and are ignored.
pub fn parse_length(value: &str) -> Option<f64> {
    let mut input = value.trim();
    let n = parse_number(&mut input).ok()?;
    if input.starts_with('%') || n <= 0.0 {
        return None;
    }
    Some(n)
}

/// `viewBox` as four numbers separated by whitespace and/or commas.
pub fn parse_view_box(value: &str) -> Option<[f64; 4]> {
    let mut input = value;
    let mut out = [0.0; 4];
    for slot in &mut out {
        skip_separators(&mut input);
        *slot = parse_number(&mut input).ok()?;
    }
    (out[2] > 0.0 && out[3] > 0.0).then_some(out)
}
