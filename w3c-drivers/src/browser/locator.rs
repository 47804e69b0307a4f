use std::fmt;

/// Element query understood by every [`Browser`](super::Browser).
///
/// Queries are static strings: the harvester only ever looks for a fixed set
/// of elements, and keeping them `'static` lets a locator double as a map key
/// in the scripted test browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum By {
    Css(&'static str),
    Id(&'static str),
    Tag(&'static str),
    Class(&'static str),
    XPath(&'static str),
}

impl fmt::Display for By {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            By::Css(q) => write!(f, "css `{q}`"),
            By::Id(q) => write!(f, "id `{q}`"),
            By::Tag(q) => write!(f, "tag `{q}`"),
            By::Class(q) => write!(f, "class `{q}`"),
            By::XPath(q) => write!(f, "xpath `{q}`"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_kind_and_query() {
        assert_eq!(By::Id("abstract").to_string(), "id `abstract`");
        assert_eq!(By::XPath("..//time").to_string(), "xpath `..//time`");
    }
}
