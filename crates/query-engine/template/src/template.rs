//! Compile a template into literal text and placeholders, then apply a lookup.

/// A piece of a compiled template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    /// The name between a start marker and the nearest following end marker.
    Placeholder(&'a str),
}

/// A template split on a delimiter pair such as `<<` / `>>`.
///
/// Scanning is a single left-to-right pass. After a start marker, the nearest
/// following end marker closes the placeholder, so a name can never contain the
/// end marker; there is no escaping. A start marker that is never closed is kept
/// as literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template<'a> {
    start: &'a str,
    end: &'a str,
    segments: Vec<Segment<'a>>,
}

impl<'a> Template<'a> {
    /// Compile `source`. Empty markers match nothing.
    pub fn new(start: &'a str, end: &'a str, source: &'a str) -> Self {
        let mut segments = Vec::new();
        let mut rest = source;

        if !start.is_empty() && !end.is_empty() {
            while let Some(open) = rest.find(start) {
                let after_open = &rest[open + start.len()..];
                let Some(close) = after_open.find(end) else {
                    break;
                };
                if open > 0 {
                    segments.push(Segment::Literal(&rest[..open]));
                }
                segments.push(Segment::Placeholder(&after_open[..close]));
                rest = &after_open[close + end.len()..];
            }
        }

        if !rest.is_empty() {
            segments.push(Segment::Literal(rest));
        }

        Template {
            start,
            end,
            segments,
        }
    }

    pub fn segments(&self) -> &[Segment<'a>] {
        &self.segments
    }

    /// The placeholder names in order of appearance, duplicates included.
    pub fn placeholders(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Placeholder(name) => Some(*name),
            Segment::Literal(_) => None,
        })
    }

    /// Produce the output text, replacing each placeholder by `lookup(name)`.
    ///
    /// Names the lookup has no value for are written back unchanged, delimiters
    /// included, so that placeholder syntax belonging to someone else survives.
    pub fn apply<F, S>(&self, mut lookup: F) -> String
    where
        F: FnMut(&str) -> Option<S>,
        S: AsRef<str>,
    {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => match lookup(*name) {
                    Some(value) => out.push_str(value.as_ref()),
                    None => {
                        out.push_str(self.start);
                        out.push_str(name);
                        out.push_str(self.end);
                    }
                },
            }
        }
        out
    }
}

/// Compile and apply in one go.
pub fn resolve<F, S>(start: &str, end: &str, source: &str, lookup: F) -> String
where
    F: FnMut(&str) -> Option<S>,
    S: AsRef<str>,
{
    Template::new(start, end, source).apply(lookup)
}
