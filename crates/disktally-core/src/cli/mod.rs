/// Command-line handling: the tokenizer and the resolver that maps
/// options onto a [`Config`](crate::config::Config).
pub mod options;
pub mod parser;

pub use options::{help_text, parse_args, version_text, Invocation};
pub use parser::{ArgParser, Token};
