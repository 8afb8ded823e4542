mod nom_parser;
mod parse;
mod serialize;
mod types;

pub use self::nom_parser::{parse_line, ParsedLine};
pub use self::types::Message;
