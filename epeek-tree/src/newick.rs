//! Newick format parser and writer.
//!
//! The input is split into tokens on `;`, `(`, `)`, `,` and `:`, with the
//! surrounding whitespace trimmed. A stack of open ancestors drives the
//! construction:
//!
//! - `(` starts a child list on the current node and descends into it
//! - `,` starts a sibling under the innermost open ancestor
//! - `)` closes the innermost ancestor, which becomes current again, so a
//!   label right after `)` names the clade that was just closed
//! - a text token names the current node after `(`, `)` or `,`, and is its
//!   branch length after `:`
//!
//! ```text
//! (A:0.1,B:0.2,(C:0.3,D:0.4)E:0.5)F;
//! ```

use epeek_core::{EpeekError, Result};

use crate::tree::TreeNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tok<'a> {
    Open,
    Close,
    Comma,
    Colon,
    Semicolon,
    Text(&'a str),
}

/// Split `input` into `(byte offset, token)` pairs, dropping empty text.
fn tokenize(input: &str) -> Vec<(usize, Tok<'_>)> {
    let mut tokens = Vec::new();
    let mut start = 0;
    for (pos, ch) in input.char_indices() {
        let delim = match ch {
            '(' => Tok::Open,
            ')' => Tok::Close,
            ',' => Tok::Comma,
            ':' => Tok::Colon,
            ';' => Tok::Semicolon,
            _ => continue,
        };
        push_text(input, &mut tokens, start, pos);
        tokens.push((pos, delim));
        start = pos + 1;
    }
    push_text(input, &mut tokens, start, input.len());
    tokens
}

fn push_text<'a>(input: &'a str, tokens: &mut Vec<(usize, Tok<'a>)>, from: usize, to: usize) {
    let raw = &input[from..to];
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        let lead = raw.len() - raw.trim_start().len();
        tokens.push((from + lead, Tok::Text(trimmed)));
    }
}

/// Parse a Newick string into a nested [`TreeNode`].
///
/// The trailing `;` is optional. Unbalanced parentheses, a missing or
/// non-numeric branch length after `:`, and text after the closing `;`
/// are reported as [`EpeekError::Parse`] with the offending byte offset.
pub fn parse(input: &str) -> Result<TreeNode> {
    let tokens = tokenize(input);
    let mut ancestors: Vec<TreeNode> = Vec::new();
    let mut current = TreeNode::default();
    let mut prev: Option<Tok<'_>> = None;
    let mut end = None;

    for (i, &(pos, tok)) in tokens.iter().enumerate() {
        if prev == Some(Tok::Colon) && !matches!(tok, Tok::Text(_)) {
            return Err(EpeekError::parse(pos, "expected branch length after ':'"));
        }
        match tok {
            Tok::Open => {
                if current.branchset.is_some() || current.name.is_some() {
                    return Err(EpeekError::parse(pos, "unexpected '('"));
                }
                ancestors.push(current);
                current = TreeNode::default();
            }
            Tok::Comma => {
                let parent = ancestors
                    .last_mut()
                    .ok_or_else(|| EpeekError::parse(pos, "',' outside of parentheses"))?;
                attach(parent, std::mem::take(&mut current));
            }
            Tok::Close => {
                let mut parent = ancestors
                    .pop()
                    .ok_or_else(|| EpeekError::parse(pos, "unbalanced ')'"))?;
                attach(&mut parent, std::mem::take(&mut current));
                current = parent;
            }
            Tok::Colon => {}
            Tok::Semicolon => {
                end = Some(i);
                break;
            }
            Tok::Text(text) => match prev {
                None | Some(Tok::Open) | Some(Tok::Close) | Some(Tok::Comma) => {
                    current.name = Some(text.to_string());
                }
                Some(Tok::Colon) => {
                    let length: f64 = text
                        .parse()
                        .ok()
                        .filter(|l: &f64| l.is_finite())
                        .ok_or_else(|| {
                            EpeekError::parse(pos, format!("invalid branch length: '{text}'"))
                        })?;
                    current.length = Some(length);
                }
                Some(Tok::Text(_)) | Some(Tok::Semicolon) => {
                    return Err(EpeekError::parse(pos, format!("unexpected '{text}'")));
                }
            },
        }
        prev = Some(tok);
    }

    if prev == Some(Tok::Colon) {
        return Err(EpeekError::parse(input.len(), "expected branch length after ':'"));
    }
    if !ancestors.is_empty() {
        return Err(EpeekError::parse(input.len(), "unbalanced '(': missing ')'"));
    }
    if let Some(&(pos, _)) = end.and_then(|i| tokens.get(i + 1)) {
        return Err(EpeekError::parse(pos, "unexpected text after ';'"));
    }
    Ok(current)
}

fn attach(parent: &mut TreeNode, child: TreeNode) {
    parent.branchset.get_or_insert_with(Vec::new).push(child);
}

enum Emit<'a> {
    Node(&'a TreeNode),
    Comma,
    Close(&'a TreeNode),
}

/// Serialize a nested record to a Newick string.
pub fn write(tree: &TreeNode) -> String {
    let mut buf = String::new();
    let mut pending = vec![Emit::Node(tree)];
    while let Some(next) = pending.pop() {
        match next {
            Emit::Node(node) => match &node.branchset {
                Some(children) => {
                    buf.push('(');
                    pending.push(Emit::Close(node));
                    for (i, child) in children.iter().enumerate().rev() {
                        pending.push(Emit::Node(child));
                        if i > 0 {
                            pending.push(Emit::Comma);
                        }
                    }
                }
                None => write_label(node, &mut buf),
            },
            Emit::Comma => buf.push(','),
            Emit::Close(node) => {
                buf.push(')');
                write_label(node, &mut buf);
            }
        }
    }
    buf.push(';');
    buf
}

fn write_label(node: &TreeNode, buf: &mut String) {
    if let Some(name) = &node.name {
        buf.push_str(name);
    }
    if let Some(length) = node.length {
        buf.push(':');
        buf.push_str(&format_length(length));
    }
}

/// At most ten decimals, no trailing zeros: `0.5`, `2`, `0.0000000001`.
fn format_length(length: f64) -> String {
    let fixed = format!("{length:.10}");
    let trimmed = fixed.trim_end_matches('0');
    trimmed.strip_suffix('.').unwrap_or(trimmed).to_string()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn leaf_name() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z0-9_]{0,5}"
    }

    /// Caterpillar trees with 2-6 named leaves.
    fn simple_newick() -> impl Strategy<Value = String> {
        proptest::collection::vec(leaf_name(), 2..=6).prop_map(|leaves| {
            let mut s = format!("({},{})", leaves[0], leaves[1]);
            for leaf in &leaves[2..] {
                s = format!("({},{})", s, leaf);
            }
            s.push(';');
            s
        })
    }

    fn leaf_names(node: &TreeNode, out: &mut Vec<String>) {
        if node.is_leaf() {
            out.extend(node.name.clone());
        }
        for c in node.children() {
            leaf_names(c, out);
        }
    }

    proptest! {
        #[test]
        fn roundtrip_preserves_leaf_names(newick in simple_newick()) {
            let tree = parse(&newick).unwrap();
            let tree2 = parse(&write(&tree)).unwrap();
            let (mut a, mut b) = (Vec::new(), Vec::new());
            leaf_names(&tree, &mut a);
            leaf_names(&tree2, &mut b);
            prop_assert_eq!(a, b);
        }

        #[test]
        fn parse_does_not_panic(s in "\\PC{0,100}") {
            let _ = parse(&s);
        }
    }
}
