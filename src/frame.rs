
use nom::{
    bytes::complete::{is_not, take_while},
    combinator::opt,
    sequence::{preceded, tuple},
    IResult,
};

// text frame sent by the acquisition board, one per line:
//      <kind tag>;<sensor id>;<value>      e.g. "T;T-001;25.6"
pub const DELIMITER: char = ';';

/// Longest id or value kept from a frame, in bytes.
pub const MAX_FIELD_BYTES: usize = 49;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    /// First character of the first field; `None` for a blank frame.
    pub tag: Option<char>,
    pub id: String,
    pub value: String,
}

// one field, skipping any run of delimiters in front of it
fn field(s: &str) -> IResult<&str, &str> {
    preceded(take_while(|c| c == DELIMITER), is_not(";"))(s)
}

fn fields(s: &str) -> IResult<&str, (Option<&str>, Option<&str>, Option<&str>)> {
    tuple((opt(field), opt(field), opt(field)))(s)
}

/// Splits one received line into its kind tag, id and value. Missing
/// fields come back empty and anything after the third field is ignored.
pub fn decode_frame(line: &str) -> Frame {
    let line = line.trim_end_matches(['\r', '\n']);

    let (tag, id, value) = match fields(line) {
        Ok((_, parts)) => parts,
        Err(_) => (None, None, None),
    };

    Frame {
        tag: tag.and_then(|t| t.chars().next()),
        id: truncate(id.unwrap_or_default(), MAX_FIELD_BYTES),
        value: truncate(value.unwrap_or_default(), MAX_FIELD_BYTES),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_owned();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_owned()
}
