//! Positional argument formatting for message templates.
//!
//! Templates use a small subset of Rust's `format!` syntax: `{}` takes the
//! next argument, `{N}` takes argument `N`, and `{{` / `}}` produce literal
//! braces. Rendering comes in two flavours:
//!
//! - [`format_lenient`] never fails. Missing arguments render as
//!   `{!MISSING}`, unused arguments are appended as ` {!EXTRA: a, b}` and
//!   malformed placeholders are copied through verbatim.
//! - [`format_strict`] reports the same situations as [`TemplateError`]s.

use std::fmt::{self, Write as _};

use thiserror::Error;

/// Marker rendered in place of a placeholder with no matching argument.
pub const MISSING_MARKER: &str = "{!MISSING}";

/// Positional arguments accepted by the formatter.
pub type Args<'a> = [&'a dyn fmt::Display];

/// Errors reported by strict template formatting.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    /// A placeholder referenced an argument that was not supplied.
    #[error("placeholder {index} has no matching argument")]
    MissingArgument { index: usize },
    /// More arguments were supplied than the template consumed.
    #[error("{count} argument(s) not consumed by the template")]
    ExtraArguments { count: usize },
    /// A `{` was never closed.
    #[error("unclosed placeholder starting at byte {offset}")]
    UnclosedPlaceholder { offset: usize },
    /// A `}` appeared without a matching `{`.
    #[error("unmatched '}}' at byte {offset}")]
    UnmatchedBrace { offset: usize },
    /// The placeholder body is neither empty nor an argument index.
    #[error("invalid placeholder '{{{body}}}'")]
    InvalidPlaceholder { body: String },
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Strict,
    Lenient,
}

/// Render `template` with `args`, never failing.
pub fn format_lenient(template: &str, args: &Args<'_>) -> String {
    match render(template, args, Mode::Lenient) {
        Ok(out) => out,
        // Lenient rendering has no error paths; keep the raw template if one
        // is ever introduced.
        Err(_) => template.to_owned(),
    }
}

/// Render `template` with `args`, rejecting any mismatch.
///
/// # Errors
///
/// Returns a [`TemplateError`] when a placeholder lacks an argument, when
/// arguments are left unused, or when the template syntax is malformed.
pub fn format_strict(template: &str, args: &Args<'_>) -> Result<String, TemplateError> {
    render(template, args, Mode::Strict)
}

fn render(template: &str, args: &Args<'_>, mode: Mode) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len() + args.len() * 8);
    let mut used = vec![false; args.len()];
    let mut next_auto = 0usize;
    let mut rest = template;
    let mut offset = 0usize;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let brace_at = offset + pos;
        let tail = &rest[pos..];

        if let Some(after) = tail.strip_prefix("{{") {
            out.push('{');
            offset = template.len() - after.len();
            rest = after;
            continue;
        }
        if let Some(after) = tail.strip_prefix("}}") {
            out.push('}');
            offset = template.len() - after.len();
            rest = after;
            continue;
        }
        if tail.starts_with('}') {
            if mode == Mode::Strict {
                return Err(TemplateError::UnmatchedBrace { offset: brace_at });
            }
            out.push('}');
            offset = brace_at + 1;
            rest = &tail[1..];
            continue;
        }

        let Some(close) = tail.find('}') else {
            if mode == Mode::Strict {
                return Err(TemplateError::UnclosedPlaceholder { offset: brace_at });
            }
            out.push_str(tail);
            rest = "";
            break;
        };
        let body = &tail[1..close];
        let index = if body.is_empty() {
            let index = next_auto;
            next_auto += 1;
            Some(index)
        } else {
            body.trim().parse::<usize>().ok()
        };

        match index {
            Some(index) => write_argument(&mut out, args, &mut used, index, mode)?,
            None if mode == Mode::Strict => {
                return Err(TemplateError::InvalidPlaceholder {
                    body: body.to_owned(),
                });
            }
            None => out.push_str(&tail[..=close]),
        }
        offset = brace_at + close + 1;
        rest = &tail[close + 1..];
    }
    out.push_str(rest);

    let extra: Vec<usize> = (0..args.len()).filter(|i| !used[*i]).collect();
    if !extra.is_empty() {
        if mode == Mode::Strict {
            return Err(TemplateError::ExtraArguments { count: extra.len() });
        }
        out.push_str(" {!EXTRA: ");
        for (n, index) in extra.iter().enumerate() {
            if n > 0 {
                out.push_str(", ");
            }
            let _ = write!(out, "{}", args[*index]);
        }
        out.push('}');
    }
    Ok(out)
}

fn write_argument(
    out: &mut String,
    args: &Args<'_>,
    used: &mut [bool],
    index: usize,
    mode: Mode,
) -> Result<(), TemplateError> {
    match args.get(index) {
        Some(arg) => {
            used[index] = true;
            // Writing into a String cannot fail.
            let _ = write!(out, "{arg}");
            Ok(())
        }
        None if mode == Mode::Strict => Err(TemplateError::MissingArgument { index }),
        None => {
            out.push_str(MISSING_MARKER);
            Ok(())
        }
    }
}
