//! The nest-limit mini-language.
//!
//! A nest rule string such as `{R,5}{R.*,3}` caps how many children a
//! free-form sub-path may have at each level. Each `{path,max}` group names
//! a set of tree positions (`R` is the nest root, `*` any ordinal, a number
//! one specific ordinal) and the maximum child count allowed there.
//!
//! Two shorthands are accepted: a bare number `N` means `{R,N}{R.*,0}`, and
//! `A.B` means `{R,A}{R.*,B}`.

mod ast;
mod compile;
mod error;
mod parser;


use std::borrow::Cow;

use chumsky::Parser;

pub use ast::{Group, NestSpec, PathToken};
pub use compile::{NestRule, compile_nest, limit_for};
pub use error::NestError;

/// Parse a nest rule string into its groups.
pub fn parse_nest(input: &str) -> Result<NestSpec, NestError> {
    let expanded = expand_shorthand(input);

    let raw = parser::nest_parser()
        .parse(expanded.as_ref())
        .map_err(|errs| match errs.into_iter().next() {
            Some(e) => NestError::Syntax {
                index: e.span().start,
                message: e.to_string(),
            },
            None => NestError::Syntax {
                index: 0,
                message: "invalid nest rule".into(),
            },
        })?;

    let mut groups = Vec::with_capacity(raw.len());
    for g in raw {
        let mut path = Vec::with_capacity(g.tokens.len() + 1);
        for tok in &g.tokens {
            path.push(classify_token(tok)?);
        }
        if path.first() != Some(&PathToken::Root) {
            path.insert(0, PathToken::Root);
        }
        groups.push(Group {
            path,
            max_children: g.max_children,
        });
    }

    Ok(NestSpec { groups })
}

/// Rewrite the `N` and `A.B` shorthands into full group syntax.
pub fn expand_shorthand(input: &str) -> Cow<'_, str> {
    let s = input.trim();

    if is_digits(s) {
        return Cow::Owned(format!("{{R,{s}}}{{R.*,0}}"));
    }

    if let Some((root, nested)) = s.split_once('.') {
        if is_digits(root) && is_digits(nested) {
            return Cow::Owned(format!("{{R,{root}}}{{R.*,{nested}}}"));
        }
    }

    Cow::Borrowed(input)
}

fn classify_token(tok: &str) -> Result<PathToken, NestError> {
    match tok {
        "R" => Ok(PathToken::Root),
        "*" => Ok(PathToken::Any),
        _ if is_digits(tok) => tok
            .parse::<u32>()
            .map(PathToken::Index)
            .map_err(|_| NestError::InvalidToken { token: tok.into() }),
        _ => Err(NestError::InvalidToken { token: tok.into() }),
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
