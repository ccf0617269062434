//! Tag tokenizer for documentation comments
//!
//! Strips comment decoration (`/**`, `*/`, leading `*`, `///`, `//!`) and
//! splits the remaining text into tag entries. A tag is recognized only at
//! the start of a line, spelled with either `\` or `@`. Text following a tag
//! up to the next tag or blank line is the tag's body; untagged text becomes
//! [`Tag::PlainText`].

use super::{CommentBlock, Tag, TagEntry};
use regex::Regex;
use std::sync::LazyLock;

static RE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\\@]([A-Za-z]+)(?:\[([^\]]*)\])?(?:\s+(.*))?$").unwrap()
});
static RE_GROUP_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\\@]([{}])\s*(.*)$").unwrap());

/// Remove comment decoration.
///
/// Returns the bare text and whether the comment is a trailing one
/// (`///<`, `//!<`, `/**<`, `/*!<`).
pub fn strip_decoration(raw: &str) -> (String, bool) {
    let trimmed = raw.trim();
    if trimmed == "/**/" {
        return (String::new(), false);
    }

    if let Some(rest) = trimmed
        .strip_prefix("/**")
        .or_else(|| trimmed.strip_prefix("/*!"))
        .or_else(|| trimmed.strip_prefix("/*"))
    {
        let rest = rest.strip_suffix("*/").unwrap_or(rest);
        let (rest, trailing) = match rest.strip_prefix('<') {
            Some(rest) => (rest, true),
            None => (rest, false),
        };
        let lines: Vec<&str> = rest.lines().map(strip_block_line).collect();
        return (lines.join("\n"), trailing);
    }

    let mut trailing = false;
    let mut lines = Vec::new();
    for (index, line) in trimmed.lines().enumerate() {
        let line = line.trim_start();
        let mut body = ["///", "//!", "//"]
            .iter()
            .find_map(|prefix| line.strip_prefix(prefix))
            .unwrap_or(line);
        if index == 0 {
            if let Some(rest) = body.strip_prefix('<') {
                trailing = true;
                body = rest;
            }
        }
        lines.push(body);
    }
    (lines.join("\n"), trailing)
}

fn strip_block_line(line: &str) -> &str {
    let line = line.trim_start();
    line.strip_prefix('*').unwrap_or(line)
}

struct PendingEntry {
    tag: Tag,
    direction: Option<String>,
    text: String,
    offset: u32,
}

impl PendingEntry {
    fn finish(self) -> TagEntry {
        let (argument, body) = if self.tag == Tag::InGroup {
            (self.text, String::new())
        } else if self.tag.takes_name() {
            match self.text.split_once(char::is_whitespace) {
                Some((name, rest)) => (name.to_string(), rest.trim().to_string()),
                None => (self.text, String::new()),
            }
        } else {
            (String::new(), self.text)
        };

        TagEntry {
            tag: self.tag,
            argument,
            body,
            direction: self.direction,
            offset: self.offset,
        }
    }
}

fn flush(current: &mut Option<PendingEntry>, entries: &mut Vec<TagEntry>) {
    if let Some(pending) = current.take() {
        entries.push(pending.finish());
    }
}

/// Tokenize already-stripped comment text.
pub fn tokenize(text: &str) -> CommentBlock {
    let mut entries = Vec::new();
    let mut current: Option<PendingEntry> = None;

    for (offset, line) in text.lines().enumerate() {
        let line = line.trim();
        let offset = offset as u32;

        if line.is_empty() {
            flush(&mut current, &mut entries);
            continue;
        }

        if let Some(caps) = RE_GROUP_MARKER.captures(line) {
            flush(&mut current, &mut entries);
            let tag = if &caps[1] == "{" {
                Tag::GroupOpen
            } else {
                Tag::GroupClose
            };
            entries.push(TagEntry {
                offset,
                ..TagEntry::new(tag, "", "")
            });
            let rest = caps.get(2).map_or("", |m| m.as_str().trim());
            if !rest.is_empty() {
                current = Some(PendingEntry {
                    tag: Tag::PlainText,
                    direction: None,
                    text: rest.to_string(),
                    offset,
                });
            }
            continue;
        }

        if let Some(caps) = RE_TAG.captures(line) {
            flush(&mut current, &mut entries);
            current = Some(PendingEntry {
                tag: Tag::from_keyword(&caps[1]),
                direction: caps.get(2).map(|m| m.as_str().trim().to_string()),
                text: caps.get(3).map_or("", |m| m.as_str().trim()).to_string(),
                offset,
            });
            continue;
        }

        match current.as_mut() {
            Some(pending) if pending.tag.is_line_scoped() => {
                flush(&mut current, &mut entries);
                current = Some(PendingEntry {
                    tag: Tag::PlainText,
                    direction: None,
                    text: line.to_string(),
                    offset,
                });
            }
            Some(pending) => {
                if !pending.text.is_empty() {
                    pending.text.push(' ');
                }
                pending.text.push_str(line);
            }
            None => {
                current = Some(PendingEntry {
                    tag: Tag::PlainText,
                    direction: None,
                    text: line.to_string(),
                    offset,
                });
            }
        }
    }
    flush(&mut current, &mut entries);

    CommentBlock {
        entries,
        line: 0,
        trailing: false,
    }
}

/// Strip and tokenize a raw comment starting at `line`.
pub fn tokenize_raw(raw: &str, line: u32) -> CommentBlock {
    let (text, trailing) = strip_decoration(raw);
    let mut block = tokenize(&text);
    block.line = line;
    block.trailing = trailing;
    block
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(block: &CommentBlock) -> Vec<&str> {
        block.entries.iter().map(|e| e.tag.keyword()).collect()
    }

    #[test]
    fn test_strip_block_comment() {
        let (text, trailing) = strip_decoration("/**\n * \\brief An example class\n *\n * More.\n */");
        assert!(!trailing);
        assert_eq!(text.lines().map(str::trim).collect::<Vec<_>>(), vec!["", "\\brief An example class", "", "More."]);
    }

    #[test]
    fn test_strip_trailing_comments() {
        assert_eq!(strip_decoration("///< First Enumerator"), (" First Enumerator".to_string(), true));
        assert_eq!(strip_decoration("/**< Second */"), ("Second ".to_string(), true));
        assert!(!strip_decoration("/// Not trailing").1);
    }

    #[test]
    fn test_tokenize_brief_and_details() {
        let block = tokenize_raw("/**\n * \\brief An example class\n *\n * This is an example class.\n */", 7);
        assert_eq!(block.line, 7);
        assert_eq!(tags(&block), vec!["brief", "text"]);
        assert_eq!(block.brief(true), Some("An example class"));
        assert_eq!(block.details(true), "This is an example class.");
    }

    #[test]
    fn test_tokenize_param_and_return() {
        let block = tokenize("\\param param The parameter\n@param[in] other Another\n\\returns The return value\n  spanning lines");
        let param = block.first(&Tag::Param).unwrap();
        assert_eq!(param.argument, "param");
        assert_eq!(param.body, "The parameter");
        assert_eq!(param.direction, None);

        let other = block.all(&Tag::Param).nth(1).unwrap();
        assert_eq!(other.direction.as_deref(), Some("in"));
        assert_eq!(block.first(&Tag::Return).unwrap().body, "The return value spanning lines");
    }

    #[test]
    fn test_tokenize_group_markers() {
        let block = tokenize("\\defgroup a Group A\n@{");
        assert_eq!(tags(&block), vec!["defgroup", "@{"]);
        let def = block.group_definition().unwrap();
        assert_eq!(def.argument, "a");
        assert_eq!(def.body, "Group A");

        let close = tokenize("@}");
        assert_eq!(close.entries[0].tag, Tag::GroupClose);
        assert!(!close.has_documentation());
    }

    #[test]
    fn test_tokenize_ingroup_multiple() {
        let block = tokenize("\\ingroup b c\n\\brief A function");
        assert_eq!(block.ingroups(), vec!["b", "c"]);
        assert_eq!(block.brief(false), Some("A function"));
    }

    #[test]
    fn test_ingroup_argument_ends_at_line() {
        let block = tokenize("\\ingroup b\n A function that does things\n and more");
        assert_eq!(block.ingroups(), vec!["b"]);
        assert_eq!(tags(&block), vec!["ingroup", "text"]);
        assert_eq!(block.brief(true), Some("A function that does things and more"));
        assert_eq!(block.details(true), "");
    }

    #[test]
    fn test_defgroup_title_ends_at_line() {
        let block = tokenize("\\defgroup a Group A\n Holds the grouped API.\n @{");
        assert_eq!(tags(&block), vec!["defgroup", "text", "@{"]);
        let def = block.group_definition().unwrap();
        assert_eq!(def.body, "Group A");
        assert_eq!(block.brief(true), Some("Holds the grouped API."));

        let add = tokenize("\\addtogroup a\n More for the group.");
        assert_eq!(add.group_definition().unwrap().body, "");
        assert_eq!(add.brief(true), Some("More for the group."));
    }

    #[test]
    fn test_merge_rebases_offsets() {
        let merged = CommentBlock::merge(vec![
            tokenize_raw("/// \\brief First", 1),
            tokenize_raw("///\n/// \\param", 10),
        ])
        .unwrap();
        assert_eq!(merged.line, 1);
        let param = merged.first(&Tag::Param).unwrap();
        assert_eq!(merged.line + param.offset, 11);
    }

    #[test]
    fn test_implicit_brief() {
        let block = tokenize("Root namespace of the example project");
        assert_eq!(block.brief(true), Some("Root namespace of the example project"));
        assert_eq!(block.brief(false), None);
        assert_eq!(block.details(false), "Root namespace of the example project");
        assert_eq!(block.details(true), "");
    }

    #[test]
    fn test_malformed_and_unknown_tags() {
        let block = tokenize("\\param\n\\deprecated Use g instead");
        assert_eq!(block.malformed().count(), 1);
        assert_eq!(block.entries[1].tag, Tag::Unknown("deprecated".to_string()));
        assert_eq!(block.entries[1].body, "Use g instead");
    }

    #[test]
    fn test_file_level_block() {
        let block = tokenize("\\file example.hpp\n\\author Someone\n\\brief Header");
        assert!(block.is_file_level());
        assert_eq!(block.first(&Tag::File).unwrap().argument, "example.hpp");

        assert!(tokenize("\\author Someone").is_file_level());
        assert!(!tokenize("\\brief Nothing about files").is_file_level());
        // Free text makes it declaration documentation that happens to name an author.
        assert!(!tokenize("\\author Someone\n\nDoes a thing").is_file_level());
    }
}
