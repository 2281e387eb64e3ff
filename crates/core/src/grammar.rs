//! Path grammar and tokenizer.
//!
//! ```text
//! PATH    := ["/"] SEGMENT ("/" SEGMENT)*
//! SEGMENT := [TYPECODE ";"] ID | ".."
//! ```
//!
//! A leading `/` marks an absolute (canonical) path. A run of `..`
//! segments is legal only in relative paths and only as a contiguous
//! prefix; it counts the up-hops. Ids exclude unescaped `/` and `;`;
//! a backslash escapes the next character (`\/`, `\;`, `\\`), so any
//! string can appear as an id. A bare unescaped `..` is always an
//! up-hop, never an id.
//!
//! The tokenizer knows nothing about contexts or origins; it produces
//! a raw token stream for the resolver in [`crate::resolve`].

use crate::error::PathError;
use crate::hierarchy::EntityType;

/// One lexed path segment, possibly still untyped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSegment {
    /// Explicit type code, when the segment was written `code;id`.
    pub explicit_type: Option<EntityType>,
    /// Segment id with escapes resolved.
    pub id: String,
}

/// The lexed form of a path string: absolute flag, leading up-hop
/// count, and the remaining segments in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStream {
    pub absolute: bool,
    pub ups: usize,
    pub segments: Vec<RawSegment>,
}

/// Lex a path string into a [`TokenStream`].
pub fn tokenize(src: &str) -> Result<TokenStream, PathError> {
    if src.is_empty() {
        return Err(PathError::grammar(0, "empty path"));
    }

    let chars: Vec<char> = src.chars().collect();
    let mut pos = 0usize;

    let absolute = chars[0] == '/';
    if absolute {
        pos += 1;
        if pos >= chars.len() {
            return Err(PathError::grammar(pos, "path has no segments"));
        }
    }

    let mut ups = 0usize;
    let mut segments: Vec<RawSegment> = Vec::new();

    loop {
        let seg_start = pos;

        // Scan one segment up to the next unescaped '/'. The first
        // unescaped ';' splits a type code from the id; a second one
        // is an error.
        let mut first = String::new();
        let mut second: Option<String> = None;
        let mut escaped = false;

        while pos < chars.len() && chars[pos] != '/' {
            let c = chars[pos];
            if c == '\\' {
                pos += 1;
                if pos >= chars.len() {
                    return Err(PathError::grammar(pos, "dangling escape at end of path"));
                }
                match &mut second {
                    Some(s) => s.push(chars[pos]),
                    None => first.push(chars[pos]),
                }
                escaped = true;
                pos += 1;
                continue;
            }
            if c == ';' {
                if second.is_some() {
                    return Err(PathError::grammar(pos, "second ';' in segment"));
                }
                second = Some(String::new());
                pos += 1;
                continue;
            }
            match &mut second {
                Some(s) => s.push(c),
                None => first.push(c),
            }
            pos += 1;
        }

        let segment = match second {
            None => {
                if first.is_empty() {
                    return Err(PathError::grammar(seg_start, "empty segment"));
                }
                if first == ".." && !escaped {
                    if absolute {
                        return Err(PathError::grammar(
                            seg_start,
                            "'..' is not allowed in an absolute path",
                        ));
                    }
                    if !segments.is_empty() {
                        return Err(PathError::grammar(
                            seg_start,
                            "'..' after a named segment",
                        ));
                    }
                    ups += 1;
                    None
                } else {
                    Some(RawSegment {
                        explicit_type: None,
                        id: first,
                    })
                }
            }
            Some(id) => {
                let explicit = EntityType::from_code(&first).ok_or_else(|| {
                    PathError::grammar(seg_start, format!("unknown type code '{}'", first))
                })?;
                if id.is_empty() {
                    return Err(PathError::grammar(seg_start, "empty id after type code"));
                }
                Some(RawSegment {
                    explicit_type: Some(explicit),
                    id,
                })
            }
        };
        if let Some(seg) = segment {
            segments.push(seg);
        }

        if pos >= chars.len() {
            break;
        }
        // Skip the separator; nothing may follow the final segment.
        pos += 1;
        if pos >= chars.len() {
            return Err(PathError::grammar(pos, "trailing '/'"));
        }
    }

    if ups == 0 && segments.is_empty() {
        return Err(PathError::grammar(0, "path has no segments"));
    }

    Ok(TokenStream {
        absolute,
        ups,
        segments,
    })
}

/// Escape an id for embedding in a path string: the inverse of the
/// tokenizer's escape resolution.
pub fn escape_id(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for c in id.chars() {
        if c == '/' || c == ';' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    // A bare ".." would lex as an up-hop.
    if out == ".." {
        return "\\..".to_string();
    }
    out
}
