//! Extraction of DataPool annotations from C definition files.
//!
//! The grammar recognised here is deliberately narrow: a documentation
//! comment (`/** ... */`) immediately followed by a declaration terminated by
//! `;` or `{`, with directives inside the comment:
//!
//! ```text
//! @version <text>       mandatory in a definition file's leading comment
//! @brief <text>         description, continued over following lines
//! @dp <uint>            local index of a leaf parameter
//! @dp_module <ident>    member is another module's parameter block
//! ```
//!
//! Everything else in the file (code, plain comments, unrelated
//! preprocessor lines) is skipped. Quoted `#include` paths, struct bodies and
//! `#define` directives are extracted independently.

mod decl;
mod doc;
mod error;
mod lexer;
mod source;

pub use decl::{Declaration, Declarations, Terminator, declarations, declarations_at, member_declarations};
pub use doc::DocBlock;
pub use error::AnnotationError;
pub use lexer::{Lexer, Token, TokenKind, parse_int_literal, tokenize};
pub use source::{Define, StructDef, defines, header_version, includes, struct_bodies};

#[cfg(test)]
mod tests;
