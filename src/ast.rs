//! AST types for SRL programs, and their translation to regex syntax.

use std::fmt;

use itertools::{Itertools, process_results};

use crate::char_class;
use crate::context::Context;
use crate::error::CompileError;

/// Reference chains longer than this are reported as cycles.
const MAX_REFERENCE_DEPTH: usize = 64;

/// One SRL expression.
///
/// `Display` renders the node back as SRL text. Every tree the parser
/// produces reads back to an equivalent tree; an empty `Sequence` has no
/// source form and renders as `()`, which does not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// `literally '...'`
    Literal(String),
    /// `one of '...'`
    CharacterSet(String),
    NegatedCharacterSet(String),
    Digit,
    NotDigit,
    Letter,
    NotLetter,
    Whitespace,
    NotWhitespace,
    /// `any of (...)`
    Alternation(Vec<Node>),
    /// A parenthesised, comma-separated list. Empty matches the empty string.
    Sequence(Vec<Node>),
    Repeated(Box<Node>, Modifier),
    /// `not ...`
    Negated(Box<Node>),
    /// A bare word, looked up in the [`Context`] at translation time.
    Reference(String),
    Expression(Expression),
    Pattern(Pattern),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    OnceOrMore,
}

/// Anchors plus the top-level list of a source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expression {
    pub begins_with: bool,
    pub body: Vec<Node>,
    pub must_end: bool,
}

/// A complete compile unit: the expression and any trailing settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pattern {
    pub expression: Expression,
    pub settings: Option<Settings>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub case: Case,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Sensitive,
    Insensitive,
}

impl Node {
    /// The logical complement of this node, for nodes that have one.
    ///
    /// Inverting twice yields the original node. A single-item sequence
    /// inverts as its item does. `Negated(x)` inverts to `x` only when `x`
    /// has a complement of its own; otherwise it is a lookahead, and so is
    /// its complement.
    pub fn invert(&self) -> Option<Node> {
        let inverted = match self {
            Node::CharacterSet(chars) => Node::NegatedCharacterSet(chars.clone()),
            Node::NegatedCharacterSet(chars) => Node::CharacterSet(chars.clone()),
            Node::Digit => Node::NotDigit,
            Node::NotDigit => Node::Digit,
            Node::Letter => Node::NotLetter,
            Node::NotLetter => Node::Letter,
            Node::Whitespace => Node::NotWhitespace,
            Node::NotWhitespace => Node::Whitespace,
            Node::Negated(inner) if inner.invert().is_some() => (**inner).clone(),
            Node::Sequence(items) if items.len() == 1 => return items[0].invert(),
            _ => return None,
        };
        Some(inverted)
    }

    /// Translate this node to regex syntax, resolving references through `ctx`.
    pub fn translate(&self, ctx: &Context) -> Result<String, CompileError> {
        self.translate_at(ctx, 0)
    }

    /// `depth` counts the references followed to reach this node.
    fn translate_at(&self, ctx: &Context, depth: usize) -> Result<String, CompileError> {
        let regex = match self {
            Node::Literal(text) => regex::escape(text),
            Node::CharacterSet(chars) => char_class::bracket(chars, false),
            Node::NegatedCharacterSet(chars) => char_class::bracket(chars, true),
            Node::Digit => char_class::DIGIT.to_string(),
            Node::NotDigit => char_class::NOT_DIGIT.to_string(),
            Node::Letter => char_class::LETTER.to_string(),
            Node::NotLetter => char_class::NOT_LETTER.to_string(),
            Node::Whitespace => char_class::WHITESPACE.to_string(),
            Node::NotWhitespace => char_class::NOT_WHITESPACE.to_string(),
            Node::Alternation(choices) if choices.is_empty() => char_class::NEVER.to_string(),
            Node::Alternation(choices) => {
                let choices = choices.iter().map(|choice| choice.translate_at(ctx, depth));
                format!("(?:{})", process_results(choices, |mut it| it.join("|"))?)
            }
            Node::Sequence(items) => translate_sequence(items, ctx, depth)?,
            Node::Repeated(inner, modifier) => {
                let body = inner.translate_at(ctx, depth)?;
                let body = if inner.is_atom(ctx, depth)? {
                    body
                } else {
                    format!("(?:{body})")
                };
                match modifier {
                    Modifier::OnceOrMore => format!("{body}+"),
                }
            }
            Node::Negated(inner) => match inner.complement(ctx, depth)? {
                Some(complement) => complement.translate_at(ctx, depth)?,
                None => format!("(?!{})", inner.translate_at(ctx, depth)?),
            },
            Node::Reference(name) => {
                if depth >= MAX_REFERENCE_DEPTH {
                    return Err(CompileError::ReferenceCycle(name.clone()));
                }
                ctx.lookup(name)?.translate_at(ctx, depth + 1)?
            }
            Node::Expression(expression) => expression.translate_at(ctx, depth)?,
            Node::Pattern(pattern) => pattern.translate_at(ctx, depth)?,
        };
        Ok(regex)
    }

    /// Follow references and unwrap single-item sequences down to the node
    /// that actually determines this one's meaning.
    fn resolve<'n>(&'n self, ctx: &'n Context, depth: usize) -> Result<&'n Node, CompileError> {
        let mut node = self;
        let mut depth = depth;
        loop {
            match node {
                Node::Reference(name) => {
                    if depth >= MAX_REFERENCE_DEPTH {
                        return Err(CompileError::ReferenceCycle(name.clone()));
                    }
                    depth += 1;
                    node = ctx.lookup(name)?;
                }
                Node::Sequence(items) if items.len() == 1 => node = &items[0],
                _ => return Ok(node),
            }
        }
    }

    /// Like [`invert`](Self::invert), but looks through references and
    /// single-item sequences at every level first.
    fn complement(&self, ctx: &Context, depth: usize) -> Result<Option<Node>, CompileError> {
        match self.resolve(ctx, depth)? {
            Node::Negated(inner) => {
                let invertible = inner.complement(ctx, depth + 1)?.is_some();
                Ok(invertible.then(|| (**inner).clone()))
            }
            node => Ok(node.invert()),
        }
    }

    /// True if the translation is a single regex atom, so a quantifier can
    /// follow it without grouping.
    fn is_atom(&self, ctx: &Context, depth: usize) -> Result<bool, CompileError> {
        let atom = match self.resolve(ctx, depth)? {
            Node::Literal(text) => text.chars().count() == 1,
            Node::Negated(inner) => match inner.complement(ctx, depth)? {
                Some(complement) => complement.is_atom(ctx, depth + 1)?,
                None => false,
            },
            Node::CharacterSet(_)
            | Node::NegatedCharacterSet(_)
            | Node::Digit
            | Node::NotDigit
            | Node::Letter
            | Node::NotLetter
            | Node::Whitespace
            | Node::NotWhitespace
            | Node::Alternation(_) => true,
            _ => false,
        };
        Ok(atom)
    }
}

fn translate_sequence(items: &[Node], ctx: &Context, depth: usize) -> Result<String, CompileError> {
    process_results(
        items.iter().map(|item| item.translate_at(ctx, depth)),
        |it| it.collect::<String>(),
    )
}

impl Expression {
    pub fn translate(&self, ctx: &Context) -> Result<String, CompileError> {
        self.translate_at(ctx, 0)
    }

    fn translate_at(&self, ctx: &Context, depth: usize) -> Result<String, CompileError> {
        let begin = if self.begins_with { "^" } else { "" };
        let end = if self.must_end { "$" } else { "" };
        let body = translate_sequence(&self.body, ctx, depth)?;
        Ok(format!("{begin}{body}{end}"))
    }
}

impl Pattern {
    /// Translate the whole compile unit, settings included.
    pub fn translate(&self, ctx: &Context) -> Result<String, CompileError> {
        self.translate_at(ctx, 0)
    }

    fn translate_at(&self, ctx: &Context, depth: usize) -> Result<String, CompileError> {
        let flags = match self.settings {
            Some(Settings {
                case: Case::Insensitive,
            }) => "(?i)",
            Some(Settings {
                case: Case::Sensitive,
            })
            | None => "",
        };
        Ok(format!("{flags}{}", self.expression.translate_at(ctx, depth)?))
    }
}

/// Quote `text` as an SRL string literal.
fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for ch in text.chars() {
        if ch == '\'' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('\'');
    out
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Literal(text) => write!(f, "literally {}", quote(text)),
            Node::CharacterSet(chars) => write!(f, "one of {}", quote(chars)),
            Node::NegatedCharacterSet(chars) => write!(f, "not one of {}", quote(chars)),
            Node::Digit => f.write_str("digit"),
            Node::NotDigit => f.write_str("not digit"),
            Node::Letter => f.write_str("letter"),
            Node::NotLetter => f.write_str("not letter"),
            Node::Whitespace => f.write_str("whitespace"),
            Node::NotWhitespace => f.write_str("not whitespace"),
            Node::Alternation(choices) => write!(f, "any of ({})", choices.iter().format(", ")),
            Node::Sequence(items) => write!(f, "({})", items.iter().format(", ")),
            Node::Repeated(inner, modifier) => write!(f, "{} {modifier}", Operand(inner)),
            Node::Negated(inner) => write!(f, "not {}", Operand(inner)),
            Node::Reference(name) => f.write_str(name),
            Node::Expression(expression) => write!(f, "{expression}"),
            Node::Pattern(pattern) => write!(f, "{pattern}"),
        }
    }
}

/// The operand of `not` or a modifier. A repetition is parenthesised so the
/// text parses back to the same tree.
struct Operand<'n>(&'n Node);

impl fmt::Display for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Node::Repeated(..) => write!(f, "({})", self.0),
            node => write!(f, "{node}"),
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modifier::OnceOrMore => f.write_str("once or more"),
        }
    }
}

impl fmt::Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Case::Sensitive => f.write_str("case sensitive"),
            Case::Insensitive => f.write_str("case insensitive"),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.begins_with {
            f.write_str("begins with ")?;
        }
        write!(f, "{}", self.body.iter().format(", "))?;
        if self.must_end {
            f.write_str(", must end")?;
        }
        Ok(())
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expression)?;
        if let Some(settings) = self.settings {
            write!(f, ", {}", settings.case)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translate(node: Node) -> String {
        node.translate(&Context::with_builtins())
            .expect("translation should succeed")
    }

    fn reference(name: &str) -> Node {
        Node::Reference(name.to_string())
    }

    fn negated(node: Node) -> Node {
        Node::Negated(Box::new(node))
    }

    // --- Complements ---

    #[test]
    fn classes_invert_pairwise() {
        let pairs = [
            (Node::Digit, Node::NotDigit),
            (Node::Letter, Node::NotLetter),
            (Node::Whitespace, Node::NotWhitespace),
            (
                Node::CharacterSet("ab".to_string()),
                Node::NegatedCharacterSet("ab".to_string()),
            ),
        ];
        for (node, complement) in pairs {
            assert_eq!(node.invert().as_ref(), Some(&complement));
            assert_eq!(complement.invert().as_ref(), Some(&node));
        }
    }

    #[test]
    fn negated_inverts_to_invertible_inner() {
        assert_eq!(negated(Node::Digit).invert(), Some(Node::Digit));
        let set = Node::CharacterSet("xy".to_string());
        assert_eq!(negated(set.clone()).invert(), Some(set));
    }

    #[test]
    fn negated_lookahead_has_no_complement() {
        assert_eq!(negated(Node::Literal("x".to_string())).invert(), None);
        let pair = Node::Sequence(vec![Node::Digit, Node::Letter]);
        assert_eq!(negated(pair).invert(), None);
    }

    #[test]
    fn literal_has_no_complement() {
        assert_eq!(Node::Literal("x".to_string()).invert(), None);
        assert_eq!(reference("digit").invert(), None);
    }

    // --- Translation ---

    #[test]
    fn literal_is_escaped() {
        assert_eq!(translate(Node::Literal("a.b*".to_string())), r"a\.b\*");
    }

    #[test]
    fn empty_sequence_is_empty() {
        assert_eq!(translate(Node::Sequence(vec![])), "");
    }

    #[test]
    fn alternation_is_grouped() {
        let node = Node::Alternation(vec![
            Node::Literal("a".to_string()),
            Node::Literal("b".to_string()),
        ]);
        assert_eq!(translate(node), "(?:a|b)");
    }

    #[test]
    fn empty_alternation_never_matches() {
        assert_eq!(translate(Node::Alternation(vec![])), "(?!)");
    }

    #[test]
    fn negated_class_uses_complement() {
        assert_eq!(translate(negated(Node::Digit)), r"\D");
        assert_eq!(
            translate(negated(Node::CharacterSet("abc".to_string()))),
            "[^abc]"
        );
    }

    #[test]
    fn negated_reference_resolves_before_inverting() {
        assert_eq!(translate(negated(reference("digit"))), r"\D");
        assert_eq!(
            translate(negated(Node::Sequence(vec![reference("whitespace")]))),
            r"\S"
        );
    }

    #[test]
    fn negated_literal_uses_lookahead() {
        assert_eq!(
            translate(negated(Node::Literal("ab".to_string()))),
            "(?!ab)"
        );
    }

    #[test]
    fn double_negation_cancels() {
        assert_eq!(translate(negated(negated(Node::Letter))), r"[^\W\d_]");
        assert_eq!(translate(negated(negated(reference("digit")))), r"\d");
    }

    #[test]
    fn double_negated_lookahead_stays_zero_width() {
        assert_eq!(
            translate(negated(negated(Node::Literal("ab".to_string())))),
            "(?!(?!ab))"
        );
        let grouped = negated(Node::Sequence(vec![negated(Node::Literal(
            "ab".to_string(),
        ))]));
        assert_eq!(translate(grouped), "(?!(?!ab))");
    }

    #[test]
    fn repeated_lookahead_is_grouped() {
        let node = Node::Repeated(
            Box::new(negated(negated(Node::Literal("a".to_string())))),
            Modifier::OnceOrMore,
        );
        assert_eq!(translate(node), "(?:(?!(?!a)))+");
    }

    #[test]
    fn repeated_atom_is_not_grouped() {
        let node = Node::Repeated(Box::new(reference("digit")), Modifier::OnceOrMore);
        assert_eq!(translate(node), r"\d+");
        let node = Node::Repeated(
            Box::new(Node::Literal(".".to_string())),
            Modifier::OnceOrMore,
        );
        assert_eq!(translate(node), r"\.+");
    }

    #[test]
    fn repeated_sequence_is_grouped() {
        let node = Node::Repeated(
            Box::new(Node::Literal("ab".to_string())),
            Modifier::OnceOrMore,
        );
        assert_eq!(translate(node), "(?:ab)+");
        let twice = Node::Repeated(
            Box::new(Node::Repeated(Box::new(Node::Digit), Modifier::OnceOrMore)),
            Modifier::OnceOrMore,
        );
        assert_eq!(translate(twice), r"(?:\d+)+");
    }

    #[test]
    fn expression_anchors() {
        let expression = Expression {
            begins_with: true,
            body: vec![Node::Literal("a".to_string())],
            must_end: true,
        };
        assert_eq!(translate(Node::Expression(expression)), "^a$");
    }

    #[test]
    fn case_insensitive_sets_flag() {
        let pattern = Pattern {
            expression: Expression {
                body: vec![Node::Literal("a".to_string())],
                ..Expression::default()
            },
            settings: Some(Settings {
                case: Case::Insensitive,
            }),
        };
        assert_eq!(translate(Node::Pattern(pattern.clone())), "(?i)a");
        let sensitive = Pattern {
            settings: Some(Settings {
                case: Case::Sensitive,
            }),
            ..pattern
        };
        assert_eq!(translate(Node::Pattern(sensitive)), "a");
    }

    #[test]
    fn unknown_reference_fails() {
        let err = reference("foo")
            .translate(&Context::with_builtins())
            .expect_err("foo is not defined");
        assert_eq!(err, CompileError::Unresolved("foo".to_string()));
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let mut ctx = Context::new();
        ctx.define("loop", reference("loop"));
        let err = reference("loop").translate(&ctx).expect_err("cycle");
        assert_eq!(err, CompileError::ReferenceCycle("loop".to_string()));

        ctx.define("knot", negated(reference("knot")));
        let err = negated(reference("knot")).translate(&ctx).expect_err("cycle");
        assert_eq!(err, CompileError::ReferenceCycle("knot".to_string()));
    }

    // --- Description ---

    #[test]
    fn repetition_operand_is_parenthesised() {
        let repeated = Node::Repeated(Box::new(reference("digit")), Modifier::OnceOrMore);
        assert_eq!(
            negated(repeated.clone()).to_string(),
            "not (digit once or more)"
        );
        let twice = Node::Repeated(Box::new(repeated), Modifier::OnceOrMore);
        assert_eq!(twice.to_string(), "(digit once or more) once or more");
        let outer = Node::Repeated(Box::new(negated(reference("digit"))), Modifier::OnceOrMore);
        assert_eq!(outer.to_string(), "not digit once or more");
    }

    #[test]
    fn display_reads_as_source() {
        let pattern = Pattern {
            expression: Expression {
                begins_with: true,
                body: vec![
                    Node::Literal("it's".to_string()),
                    Node::Alternation(vec![reference("digit"), Node::NotLetter]),
                    Node::Repeated(
                        Box::new(Node::CharacterSet("xy".to_string())),
                        Modifier::OnceOrMore,
                    ),
                ],
                must_end: true,
            },
            settings: Some(Settings {
                case: Case::Insensitive,
            }),
        };
        assert_eq!(
            pattern.to_string(),
            r"begins with literally 'it\'s', any of (digit, not letter), one of 'xy' once or more, must end, case insensitive"
        );
    }
}
