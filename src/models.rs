use once_cell::sync::Lazy;
use regex::Regex;
use tokio::fs::File;

static ENTRY_FIELD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^entry\[(\d+)\]\[(\w+)\]$").expect("entry field pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryField {
    Title,
    Image,
}

/// Splits `entry[<index>][<field>]` into its parts. Unknown fields and
/// indices that don't fit a `u32` yield `None`.
pub fn parse_field_name(name: &str) -> Option<(u32, EntryField)> {
    let caps = ENTRY_FIELD_RE.captures(name)?;
    let index = caps[1].parse().ok()?;
    let field = match &caps[2] {
        "title" => EntryField::Title,
        "image" => EntryField::Image,
        _ => return None,
    };
    Some((index, field))
}

/// An image part spooled to disk while the form was read.
#[derive(Debug)]
pub struct SpooledImage {
    pub file_name: String,
    pub file: File,
}

/// One (title, image) pair of an upload request.
#[derive(Debug)]
pub struct UploadEntry {
    pub index: u32,
    pub title: String,
    pub image: SpooledImage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_entry_fields() {
        assert_eq!(
            parse_field_name("entry[0][title]"),
            Some((0, EntryField::Title))
        );
        assert_eq!(
            parse_field_name("entry[17][image]"),
            Some((17, EntryField::Image))
        );
    }

    #[test]
    fn ignores_everything_else() {
        assert_eq!(parse_field_name("entry[0][caption]"), None);
        assert_eq!(parse_field_name("data[0][title]"), None);
        assert_eq!(parse_field_name("entry[-1][title]"), None);
        assert_eq!(parse_field_name("entry[][title]"), None);
        assert_eq!(parse_field_name("xentry[0][title]"), None);
        assert_eq!(parse_field_name("entry[0][title]x"), None);
        assert_eq!(parse_field_name("entry[99999999999][title]"), None);
        assert_eq!(parse_field_name("file"), None);
    }
}
