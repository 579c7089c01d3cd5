//! Content fragments collected under a section heading

/// One piece of section content, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Trimmed paragraph text
    Text(String),
    /// Image source URL (or the missing-source sentinel)
    ImageRef(String),
    /// Quoted legal citations from a block quote
    Citations(Vec<Fragment>),
}

/// Flattens nested fragments into one ordered stream of strings
pub fn flatten_fragments(fragments: &[Fragment]) -> Vec<&str> {
    let mut flat = Vec::with_capacity(fragments.len());
    flatten_into(fragments, &mut flat);
    flat
}

fn flatten_into<'a>(fragments: &'a [Fragment], out: &mut Vec<&'a str>) {
    for fragment in fragments {
        match fragment {
            Fragment::Text(text) | Fragment::ImageRef(text) => out.push(text),
            Fragment::Citations(nested) => flatten_into(nested, out),
        }
    }
}

/// Flattens and joins fragments with newline separators
pub fn join_fragments(fragments: &[Fragment]) -> String {
    flatten_fragments(fragments).join("\n")
}
