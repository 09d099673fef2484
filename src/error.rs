/// Errors that can occur while compiling SRL source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// No parse consumed the whole source. `remainder` is the input left
    /// over by the parse that got furthest.
    Parse { remainder: String },
    /// A reference names nothing in the context chain.
    Unresolved(String),
    /// A reference is (directly or indirectly) defined in terms of itself.
    ReferenceCycle(String),
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse { remainder } if remainder.is_empty() => {
                write!(f, "Syntax error: unexpected end of source")
            }
            Self::Parse { remainder } => write!(f, "Syntax error: could not parse {remainder:?}"),
            Self::Unresolved(name) => write!(f, "Unknown reference '{name}'"),
            Self::ReferenceCycle(name) => {
                write!(f, "Reference '{name}' is defined in terms of itself")
            }
        }
    }
}

impl std::error::Error for CompileError {}
