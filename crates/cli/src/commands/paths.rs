//! Path subcommands: canon, resolve, relativize, detype.

use arbor_core::{CanonicalPath, EntityType, ParsingContext, Path, RelativePath};

/// Parse a `--expect` value into an entity kind.
fn parse_expect(expect: Option<&str>) -> Result<Option<EntityType>, String> {
    match expect {
        None => Ok(None),
        Some(name) => EntityType::from_name(name)
            .map(Some)
            .ok_or_else(|| format!("unknown entity kind '{}'", name)),
    }
}

/// Parse a fully-typed canonical path flag value.
fn parse_origin(flag: &str, value: Option<&str>) -> Result<Option<CanonicalPath>, String> {
    match value {
        None => Ok(None),
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|e| format!("{} '{}': {}", flag, s, e)),
    }
}

/// Assemble a parsing context from the shared flags.
fn build_context(
    origin: Option<&str>,
    relative_origin: Option<&str>,
    expect: Option<&str>,
) -> Result<ParsingContext, String> {
    let mut ctx = ParsingContext::new();
    if let Some(origin) = parse_origin("--origin", origin)? {
        ctx = ctx.canonical_origin(origin);
    }
    if let Some(origin) = parse_origin("--relative-origin", relative_origin)? {
        ctx = ctx.relative_origin(origin);
    }
    if let Some(expect) = parse_expect(expect)? {
        ctx = ctx.expected_leaf(expect);
    }
    Ok(ctx)
}

pub(crate) fn cmd_canon(
    path: &str,
    origin: Option<&str>,
    relative_origin: Option<&str>,
    expect: Option<&str>,
) -> Result<String, String> {
    let ctx = build_context(origin, relative_origin, expect)?;
    let parsed = Path::from_partially_untyped(path, &ctx).map_err(|e| e.to_string())?;
    Ok(parsed.to_string())
}

pub(crate) fn cmd_resolve(
    origin: &str,
    path: &str,
    expect: Option<&str>,
) -> Result<String, String> {
    let origin: CanonicalPath = origin
        .parse()
        .map_err(|e| format!("origin '{}': {}", origin, e))?;
    let expect = parse_expect(expect)?;
    let rel =
        RelativePath::from_partially_untyped(path, &origin, expect).map_err(|e| e.to_string())?;
    let resolved = rel.resolve(&origin).map_err(|e| e.to_string())?;
    Ok(resolved.to_canonical_string())
}

pub(crate) fn cmd_relativize(origin: &str, target: &str) -> Result<String, String> {
    let origin: CanonicalPath = origin
        .parse()
        .map_err(|e| format!("origin '{}': {}", origin, e))?;
    let target: CanonicalPath = target
        .parse()
        .map_err(|e| format!("target '{}': {}", target, e))?;
    Ok(origin.relativize(&target).to_relative_string())
}

pub(crate) fn cmd_detype(
    path: &str,
    origin: Option<&str>,
    relative_origin: Option<&str>,
    expect: Option<&str>,
) -> Result<String, String> {
    let ctx = build_context(origin, relative_origin, expect)?;
    if path.starts_with('/') {
        let parsed: CanonicalPath = path.parse().map_err(|e| format!("'{}': {}", path, e))?;
        Ok(parsed.to_partially_typed_string(&ctx))
    } else {
        let parsed: RelativePath = path.parse().map_err(|e| format!("'{}': {}", path, e))?;
        Ok(parsed.to_partially_typed_string(&ctx))
    }
}
