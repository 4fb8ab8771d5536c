use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Key(&'a str),
    Index(usize),
}

/// Location of a value inside a nested attribute tree.
///
/// Segments borrow the keys of the tree being walked and are only joined
/// into a dotted string when the path is displayed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath<'a> {
    segments: Vec<Segment<'a>>,
}

impl<'a> FieldPath<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_key(&mut self, key: &'a str) {
        self.segments.push(Segment::Key(key));
    }

    pub fn push_index(&mut self, index: usize) {
        self.segments.push(Segment::Index(index));
    }

    pub fn pop(&mut self) {
        self.segments.pop();
    }
}

impl fmt::Display for FieldPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("(root)");
        }

        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match segment {
                Segment::Key(key) if is_ambiguous(key) => write!(f, "{key:?}")?,
                Segment::Key(key) => f.write_str(key)?,
                Segment::Index(index) => write!(f, "{index}")?,
            }
        }

        Ok(())
    }
}

/// Keys that would read as a separator or a list index are quoted.
fn is_ambiguous(key: &str) -> bool {
    key.is_empty() || key.contains('.') || key.bytes().all(|b| b.is_ascii_digit())
}
