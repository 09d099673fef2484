//! Backtracking parser combinators over `&str`.
//!
//! A [`Parser`] maps the remaining input to a lazy, ordered sequence of
//! candidate `(value, remainder)` pairs. An empty sequence means the parser
//! does not match here; several candidates are alternative parses, best
//! first. Consumers either commit to the first candidate ([`Parser::first`])
//! or enumerate them all to backtrack.
//!
//! The token primitives ([`word`], [`quoted`], [`bare_word`]) skip the
//! whitespace that follows the token, so rules never deal with it.

use std::iter;
use std::rc::Rc;

/// The candidates produced by a parser, best first.
pub type Parses<'a, T> = Box<dyn Iterator<Item = (T, &'a str)> + 'a>;

/// A parser producing values of type `T` from input that lives for `'a`.
pub struct Parser<'a, T> {
    run: Rc<dyn Fn(&'a str) -> Parses<'a, T> + 'a>,
}

impl<T> Clone for Parser<'_, T> {
    fn clone(&self) -> Self {
        Self {
            run: Rc::clone(&self.run),
        }
    }
}

impl<'a, T: 'a> Parser<'a, T> {
    pub fn new(run: impl Fn(&'a str) -> Parses<'a, T> + 'a) -> Self {
        Self { run: Rc::new(run) }
    }

    /// All candidates for `src`.
    pub fn parse(&self, src: &'a str) -> Parses<'a, T> {
        (self.run)(src)
    }

    /// Commit to the first candidate, if any.
    pub fn first(&self, src: &'a str) -> Option<(T, &'a str)> {
        self.parse(src).next()
    }

    pub fn map<U: 'a>(self, f: impl Fn(T) -> U + 'a) -> Parser<'a, U> {
        let f = Rc::new(f);
        Parser::new(move |src| {
            let f = Rc::clone(&f);
            Box::new(self.parse(src).map(move |(value, rest)| (f(value), rest)))
        })
    }

    /// Every candidate of `self`, then every candidate of `other`.
    pub fn or(self, other: Parser<'a, T>) -> Parser<'a, T> {
        Parser::new(move |src| {
            let other = other.clone();
            Box::new(
                self.parse(src)
                    .chain(iter::once_with(move || other.parse(src)).flatten()),
            )
        })
    }

    /// The candidates of `self` as `Some`, then `None` consuming nothing.
    pub fn optional(self) -> Parser<'a, Option<T>> {
        Parser::new(move |src| {
            Box::new(
                self.parse(src)
                    .map(|(value, rest)| (Some(value), rest))
                    .chain(iter::once((None, src))),
            )
        })
    }

    /// Log every call and every candidate under `rule` at trace level.
    pub fn traced(self, rule: &'static str) -> Parser<'a, T> {
        Parser::new(move |src| {
            log::trace!("{rule} <- {src:?}");
            Box::new(
                self.parse(src)
                    .inspect(move |(_, rest)| log::trace!("{rule} -> {rest:?}")),
            )
        })
    }
}

/// Always succeeds once with `value`, consuming nothing.
pub fn pure<'a, T: Clone + 'a>(value: T) -> Parser<'a, T> {
    Parser::new(move |src| Box::new(iter::once((value.clone(), src))))
}

/// Sequence two parsers.
///
/// For each candidate of `first`, in order, every candidate of `second` on
/// its remainder is produced.
pub fn join<'a, A, B>(first: Parser<'a, A>, second: Parser<'a, B>) -> Parser<'a, (A, B)>
where
    A: Clone + 'a,
    B: 'a,
{
    Parser::new(move |src| {
        let second = second.clone();
        Box::new(first.parse(src).flat_map(move |(a, rest)| {
            second
                .parse(rest)
                .map(move |(b, rest)| ((a.clone(), b), rest))
        }))
    })
}

/// Sequence three parsers; see [`join`].
pub fn join3<'a, A, B, C>(
    first: Parser<'a, A>,
    second: Parser<'a, B>,
    third: Parser<'a, C>,
) -> Parser<'a, (A, B, C)>
where
    A: Clone + 'a,
    B: Clone + 'a,
    C: 'a,
{
    join(first, join(second, third)).map(|(a, (b, c))| (a, b, c))
}

/// Sequence any number of parsers of the same type.
///
/// With no parsers this succeeds once with an empty vector, consuming
/// nothing.
pub fn join_all<'a, T: Clone + 'a>(parsers: Vec<Parser<'a, T>>) -> Parser<'a, Vec<T>> {
    parsers
        .into_iter()
        .rev()
        .fold(pure(Vec::new()), |tail, head| {
            join(head, tail).map(|(value, mut values)| {
                values.insert(0, value);
                values
            })
        })
}

/// Committed choice: the first candidate of the first parser that has one.
pub fn choice<'a, T: 'a>(alternatives: Vec<Parser<'a, T>>) -> Parser<'a, T> {
    Parser::new(move |src| {
        let first = alternatives.iter().find_map(|parser| parser.first(src));
        Box::new(first.into_iter())
    })
}

/// Word characters make up bare words; keywords may not run into them.
pub fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Match `token` case-insensitively.
///
/// A token ending in a word character must not be followed by another one,
/// so `not` does not match the start of `nothing`.
pub fn word<'a>(token: &'static str) -> Parser<'a, &'a str> {
    Parser::new(move |src: &'a str| {
        let candidate = src
            .get(..token.len())
            .filter(|head| head.eq_ignore_ascii_case(token))
            .map(|head| (head, &src[token.len()..]))
            .filter(|(_, rest)| !(token.ends_with(is_word_char) && rest.starts_with(is_word_char)))
            .map(|(head, rest)| (head, rest.trim_start()));
        Box::new(candidate.into_iter())
    })
}

/// Match the whitespace-separated words of `phrase` in order.
pub fn words<'a>(phrase: &'static str) -> Parser<'a, Vec<&'a str>> {
    join_all(phrase.split_whitespace().map(word).collect())
}

/// A bare word: one or more word characters.
pub fn bare_word<'a>() -> Parser<'a, &'a str> {
    Parser::new(|src: &'a str| {
        let end = src.find(|ch: char| !is_word_char(ch)).unwrap_or(src.len());
        let candidate = (end > 0).then(|| (&src[..end], src[end..].trim_start()));
        Box::new(candidate.into_iter())
    })
}

/// A `'...'` or `"..."` string. A backslash takes the next character
/// literally; the value has the quotes and escapes removed.
pub fn quoted<'a>() -> Parser<'a, String> {
    Parser::new(|src: &'a str| Box::new(split_quoted(src).into_iter()))
}

fn split_quoted(src: &str) -> Option<(String, &str)> {
    let mut chars = src.char_indices();
    let (_, quote) = chars.next().filter(|&(_, ch)| ch == '\'' || ch == '"')?;
    let mut text = String::new();
    while let Some((i, ch)) = chars.next() {
        match ch {
            '\\' => text.push(chars.next()?.1),
            ch if ch == quote => return Some((text, src[i + ch.len_utf8()..].trim_start())),
            ch => text.push(ch),
        }
    }
    None
}
