//! Closing of truncated JSON documents.
//!
//! Streaming models emit a JSON document a few characters at a time. To turn
//! every prefix into a parseable snapshot, [`close`] appends the missing
//! string quote and container closers, completes truncated literals, and
//! drops dangling keys, colons and commas.
//!
//! ```text
//! {"days":[{"day_label":"Da     ──►  {"days":[{"day_label":"Da"}]}
//! {"destination":"X","start_    ──►  {"destination":"X"}
//! [1, 2, tr                     ──►  [1, 2, true]
//! ```

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Key,
    Colon,
    Value,
    Separator,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    object: bool,
    expect: Expect,
}

#[derive(Debug, Clone, Copy)]
enum Escape {
    None,
    /// Backslash seen at the given byte offset
    Pending(usize),
    /// Inside `\uXXXX` starting at the given byte offset
    Unicode { start: usize, remaining: u8 },
}

#[derive(Debug, Clone, Copy)]
struct OpenString {
    is_key: bool,
    escape: Escape,
}

/// Last position at which the document could be cut and closed.
#[derive(Debug)]
struct Checkpoint {
    end: usize,
    closers: String,
}

/// Close a truncated JSON document so that it parses.
///
/// Returns `None` when no value has started yet. The output of a complete
/// document is the document itself. Text that is not a JSON prefix is
/// returned in some closed form that will still fail to parse.
pub fn close(text: &str) -> Option<String> {
    let mut stack: Vec<Frame> = Vec::new();
    let mut checkpoint: Option<Checkpoint> = None;
    let mut string: Option<OpenString> = None;
    let mut scalar_start: Option<usize> = None;

    for (i, c) in text.char_indices() {
        if let Some(open) = string.as_mut() {
            match open.escape {
                Escape::None => match c {
                    '\\' => open.escape = Escape::Pending(i),
                    '"' => {
                        let is_key = open.is_key;
                        string = None;
                        if is_key {
                            set_expect(&mut stack, Expect::Colon);
                        } else {
                            value_done(&mut stack);
                            checkpoint = Some(mark(i + 1, &stack));
                        }
                    }
                    _ => {}
                },
                Escape::Pending(start) => {
                    open.escape = if c == 'u' {
                        Escape::Unicode {
                            start,
                            remaining: 4,
                        }
                    } else {
                        Escape::None
                    };
                }
                Escape::Unicode { start, remaining } => {
                    open.escape = if remaining <= 1 {
                        Escape::None
                    } else {
                        Escape::Unicode {
                            start,
                            remaining: remaining - 1,
                        }
                    };
                }
            }
            continue;
        }

        if scalar_start.is_some() {
            if is_scalar_char(c) {
                continue;
            }
            scalar_start = None;
            value_done(&mut stack);
            checkpoint = Some(mark(i, &stack));
        }

        match c {
            '"' => {
                let is_key = matches!(
                    stack.last(),
                    Some(Frame {
                        object: true,
                        expect: Expect::Key
                    })
                );
                string = Some(OpenString {
                    is_key,
                    escape: Escape::None,
                });
            }
            '{' | '[' => {
                let object = c == '{';
                stack.push(Frame {
                    object,
                    expect: if object { Expect::Key } else { Expect::Value },
                });
                checkpoint = Some(mark(i + 1, &stack));
            }
            '}' | ']' => {
                stack.pop();
                value_done(&mut stack);
                checkpoint = Some(mark(i + 1, &stack));
            }
            ':' => set_expect(&mut stack, Expect::Value),
            ',' => {
                if let Some(frame) = stack.last_mut() {
                    frame.expect = if frame.object {
                        Expect::Key
                    } else {
                        Expect::Value
                    };
                }
            }
            c if c.is_whitespace() => {}
            _ => scalar_start = Some(i),
        }
    }

    if let Some(open) = string {
        if !open.is_key {
            let end = match open.escape {
                Escape::None => text.len(),
                Escape::Pending(start) | Escape::Unicode { start, .. } => start,
            };
            let mut out = String::with_capacity(end + stack.len() + 1);
            out.push_str(&text[..end]);
            out.push('"');
            out.push_str(&closers(&stack));
            return Some(out);
        }
    } else if let Some(start) = scalar_start {
        if let Some(scalar) = complete_scalar(&text[start..]) {
            let mut out = String::with_capacity(text.len() + stack.len() + 4);
            out.push_str(&text[..start]);
            out.push_str(scalar);
            out.push_str(&closers(&stack));
            return Some(out);
        }
    }

    checkpoint.map(|cp| {
        let mut out = String::with_capacity(cp.end + cp.closers.len());
        out.push_str(&text[..cp.end]);
        out.push_str(&cp.closers);
        out
    })
}

fn set_expect(stack: &mut [Frame], expect: Expect) {
    if let Some(frame) = stack.last_mut() {
        frame.expect = expect;
    }
}

fn value_done(stack: &mut [Frame]) {
    set_expect(stack, Expect::Separator);
}

fn mark(end: usize, stack: &[Frame]) -> Checkpoint {
    Checkpoint {
        end,
        closers: closers(stack),
    }
}

fn closers(stack: &[Frame]) -> String {
    stack
        .iter()
        .rev()
        .map(|frame| if frame.object { '}' } else { ']' })
        .collect()
}

fn is_scalar_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '+' | '.')
}

/// Complete a truncated literal or trim a truncated number.
fn complete_scalar(partial: &str) -> Option<&str> {
    for literal in ["true", "false", "null"] {
        if literal.starts_with(partial) {
            return Some(literal);
        }
    }
    let trimmed = partial.trim_end_matches(['.', '-', '+', 'e', 'E']);
    if !trimmed.is_empty() && trimmed.parse::<f64>().is_ok() {
        Some(trimmed)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn closed(text: &str) -> Value {
        let out = close(text).unwrap_or_else(|| panic!("no value for {:?}", text));
        serde_json::from_str(&out).unwrap_or_else(|e| panic!("{:?} -> {:?}: {}", text, out, e))
    }

    #[test]
    fn test_empty_has_no_value() {
        assert_eq!(close(""), None);
        assert_eq!(close("   "), None);
    }

    #[test]
    fn test_complete_document_unchanged() {
        let doc = r#"{"a":[1,2,{"b":"c"}],"d":null}"#;
        assert_eq!(close(doc).as_deref(), Some(doc));
    }

    #[test]
    fn test_open_string_value() {
        assert_eq!(
            closed(r#"{"days":[{"day_label":"Da"#),
            json!({"days":[{"day_label":"Da"}]})
        );
    }

    #[test]
    fn test_dangling_key_dropped() {
        assert_eq!(closed(r#"{"destination":"X","start_"#), json!({"destination":"X"}));
        assert_eq!(closed(r#"{"destination":"X","start_label""#), json!({"destination":"X"}));
        assert_eq!(closed(r#"{"destination":"X","start_label":"#), json!({"destination":"X"}));
        assert_eq!(closed(r#"{"destination":"X", "#), json!({"destination":"X"}));
    }

    #[test]
    fn test_open_containers() {
        assert_eq!(closed("{"), json!({}));
        assert_eq!(closed(r#"{"days":["#), json!({"days":[]}));
        assert_eq!(closed(r#"{"days":[{"#), json!({"days":[{}]}));
        assert_eq!(closed(r#"{"days":[{}, "#), json!({"days":[{}]}));
    }

    #[test]
    fn test_truncated_scalars() {
        assert_eq!(closed("[1, 2, tr"), json!([1, 2, true]));
        assert_eq!(closed(r#"{"a":nu"#), json!({"a": null}));
        assert_eq!(closed(r#"{"a":1.5e"#), json!({"a": 1.5}));
        assert_eq!(closed(r#"{"a":1,"b":-"#), json!({"a": 1}));
    }

    #[test]
    fn test_truncated_escapes() {
        assert_eq!(closed(r#"{"a":"say \"#), json!({"a": "say "}));
        assert_eq!(closed(r#"{"a":"caf\u00"#), json!({"a": "caf"}));
        assert_eq!(closed(r#"{"a":"café"#), json!({"a": "café"}));
        assert_eq!(closed(r#"{"a":"x\"y"#), json!({"a": "x\"y"}));
    }

    #[test]
    fn test_braces_inside_strings_ignored() {
        assert_eq!(closed(r#"{"a":"{[}"#), json!({"a": "{[}"}));
    }

    #[test]
    fn test_every_prefix_parses() {
        let doc = r#"{"destination":"Blacksburg, VA","start_label":"Oct 13 2025","end_label":"Oct 13 2025","days":[{"day_label":"Day 1","sections":[{"title":"Morning","activities":[{"name":"Coffee","time_label":"8 AM"}]}]}]}"#;
        for end in 1..=doc.len() {
            if !doc.is_char_boundary(end) {
                continue;
            }
            let out = close(&doc[..end]).unwrap();
            assert!(
                serde_json::from_str::<Value>(&out).is_ok(),
                "prefix {} produced {:?}",
                end,
                out
            );
        }
    }
}
