//! Recursive descent rules for SRL source text.
//!
//! Each rule maps the remaining input to its candidate parses. Below the list
//! level, rules commit to their first success. `list_of_expressions` yields
//! its longest run first and then every shorter prefix, and the rules above
//! it pass those alternatives on, so a trailing `, must end` or `, case
//! insensitive` swallowed by the list as plain references is still found.

use std::iter;

use phf::{Map, phf_map};

use crate::ast::{Case, Expression, Modifier, Node, Pattern, Settings};
use crate::combinator::{
    Parser, Parses, bare_word, choice, join, join3, quoted, word, words,
};
use crate::error::CompileError;

/// Settings clauses and the case mode each selects.
static CASE_SETTINGS: Map<&'static str, Case> = phf_map! {
    "case insensitive" => Case::Insensitive,
    "case sensitive" => Case::Sensitive,
};

/// Repetition phrases that may follow an atomic expression.
static MODIFIERS: Map<&'static str, Modifier> = phf_map! {
    "once or more" => Modifier::OnceOrMore,
};

/// Parse a complete SRL source into a [`Pattern`].
///
/// The whole source must be consumed; otherwise the error carries the input
/// left over by the parse that got furthest.
pub fn parse(source: &str) -> Result<Pattern, CompileError> {
    complete(source, pattern)
}

/// Parse a comma-separated list of expressions, as found between
/// parentheses, into a [`Node::Sequence`].
pub fn parse_fragment(source: &str) -> Result<Node, CompileError> {
    complete(source, list_of_expressions).map(Node::Sequence)
}

fn complete<'a, T: 'a>(
    source: &'a str,
    start: impl FnOnce(&'a str) -> Parses<'a, T>,
) -> Result<T, CompileError> {
    let source = source.trim_start();
    let mut remainder = source;
    for (value, rest) in start(source) {
        if rest.is_empty() {
            return Ok(value);
        }
        if rest.len() < remainder.len() {
            remainder = rest;
        }
    }
    Err(CompileError::Parse {
        remainder: remainder.to_string(),
    })
}

/// Wrap a rule function as a parser that traces its calls.
fn rule<'a, T: 'a>(name: &'static str, f: fn(&'a str) -> Parses<'a, T>) -> Parser<'a, T> {
    Parser::new(f).traced(name)
}

/// Committed choice over the phrases of a keyword table.
fn keyword<'a, V: Copy + 'a>(table: &'static Map<&'static str, V>) -> Parser<'a, V> {
    choice(
        table
            .entries()
            .map(|(phrase, value)| words(phrase).map(move |_| *value))
            .collect(),
    )
}

/// `expression` then optionally `, settings`; candidates with settings come
/// first.
fn pattern(src: &str) -> Parses<'_, Pattern> {
    let with_settings = join3(
        rule("expression", expression),
        word(","),
        rule("settings", settings),
    )
    .map(|(expression, _, settings)| Pattern {
        expression,
        settings: Some(settings),
    });
    let without_settings = rule("expression", expression).map(|expression| Pattern {
        expression,
        settings: None,
    });
    with_settings.or(without_settings).parse(src)
}

/// `[begins with] list [, must end]`, or the empty expression.
///
/// `begins with` is committed: once matched, a list must follow and the
/// empty expression is not offered.
fn expression(src: &str) -> Parses<'_, Expression> {
    let (begins_with, rest) = match words("begins with").first(src) {
        Some((_, rest)) => (true, rest),
        None => (false, src),
    };
    let must_end = join(word(","), words("must end"))
        .optional()
        .map(|clause| clause.is_some());
    let bodies = join(rule("list_of_expressions", list_of_expressions), must_end).map(
        move |(body, must_end)| Expression {
            begins_with,
            body,
            must_end,
        },
    );
    let candidates = bodies.parse(rest);
    if begins_with {
        return candidates;
    }
    Box::new(candidates.chain(iter::once((Expression::default(), src))))
}

/// One or more comma-separated repeated expressions.
///
/// The run is greedy and stops at the first comma that is not followed by an
/// expression. Candidates are the full run, then each shorter prefix.
fn list_of_expressions(src: &str) -> Parses<'_, Vec<Node>> {
    let term = rule("repeated_expression", repeated_expression);
    let Some((first, mut rest)) = term.first(src) else {
        return Box::new(iter::empty());
    };
    let next_term = join(word(","), term);
    let mut items = vec![first];
    let mut ends = vec![rest];
    while let Some(((_, item), after)) = next_term.first(rest) {
        items.push(item);
        rest = after;
        ends.push(rest);
    }
    Box::new(
        ends.into_iter()
            .enumerate()
            .rev()
            .map(move |(last, rest)| (items[..=last].to_vec(), rest)),
    )
}

/// An atomic expression, optionally followed by a repetition modifier.
fn repeated_expression(src: &str) -> Parses<'_, Node> {
    let Some((node, rest)) = rule("atomic_expression", atomic_expression).first(src) else {
        return Box::new(iter::empty());
    };
    let repeated = match keyword(&MODIFIERS).first(rest) {
        Some((modifier, rest)) => (Node::Repeated(Box::new(node), modifier), rest),
        None => (node, rest),
    };
    Box::new(iter::once(repeated))
}

/// The first of these to match, in order: `literally`, `any of (...)`,
/// `one of`, `not`, a parenthesised list, a bare word.
fn atomic_expression(src: &str) -> Parses<'_, Node> {
    let list = || rule("list_of_expressions", list_of_expressions);
    choice(vec![
        join(word("literally"), quoted()).map(|(_, text)| Node::Literal(text)),
        join3(words("any of ("), list(), word(")"))
            .map(|(_, choices, _)| Node::Alternation(choices)),
        join(words("one of"), quoted()).map(|(_, chars)| Node::CharacterSet(chars)),
        join(word("not"), rule("atomic_expression", atomic_expression))
            .map(|(_, inner)| Node::Negated(Box::new(inner))),
        join3(word("("), list(), word(")")).map(|(_, items, _)| Node::Sequence(items)),
        bare_word().map(|name| Node::Reference(name.to_string())),
    ])
    .parse(src)
}

/// A single case setting.
fn settings(src: &str) -> Parses<'_, Settings> {
    keyword(&CASE_SETTINGS)
        .map(|case| Settings { case })
        .parse(src)
}
