//! A compiler from SRL, a small English-like language for describing string
//! matches, to regular-expression syntax.
//!
//! # Example
//!
//! ```rust
//! let regex = srl::compile("begins with literally 'cat', one of 'xyz', must end").unwrap();
//! assert_eq!(regex, "^cat[xyz]$");
//! ```
//!
//! # Language
//!
//! | Source                     | Regex               |
//! |----------------------------|---------------------|
//! | `literally 'text'`         | `text`, escaped     |
//! | `one of 'abc'`             | `[abc]`             |
//! | `any of (a, b)`            | `(?:a\|b)`          |
//! | `not x`                    | complement of `x`   |
//! | `(a, b)`                   | `ab`                |
//! | `x once or more`           | `x+`                |
//! | `digit`                    | `\d`                |
//! | `letter`                   | `[^\W\d_]`          |
//! | `whitespace`               | `\s`                |
//! | `begins with ...`          | `^...`              |
//! | `..., must end`            | `...$`              |
//! | `..., case insensitive`    | `(?i)...`           |
//!
//! Any other bare word is a reference, resolved through a [`Context`].

pub mod ast;
mod char_class;
pub mod combinator;
mod compiler;
pub mod context;
mod error;
mod grammar;


pub use ast::{Case, Expression, Modifier, Node, Pattern, Settings};
pub use compiler::{compile, compile_with};
pub use context::Context;
pub use error::CompileError;
pub use grammar::{parse, parse_fragment};
