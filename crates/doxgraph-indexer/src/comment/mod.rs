//! Structured comment blocks.
//!
//! A [`CommentBlock`] is the tokenized form of one documentation comment:
//! an ordered list of tag entries. It is immutable once produced by
//! [`tokenizer::tokenize`].

pub mod tokenizer;

pub use tokenizer::{strip_decoration, tokenize, tokenize_raw};

/// Recognized tag keywords.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    Brief,
    Details,
    Param,
    Return,
    TParam,
    DefGroup,
    AddToGroup,
    InGroup,
    /// `@{`
    GroupOpen,
    /// `@}`
    GroupClose,
    File,
    Author,
    Version,
    Date,
    Copyright,
    /// Untagged text.
    PlainText,
    Unknown(String),
}

impl Tag {
    pub fn from_keyword(keyword: &str) -> Tag {
        match keyword {
            "brief" | "short" => Tag::Brief,
            "details" => Tag::Details,
            "param" => Tag::Param,
            "return" | "returns" | "result" => Tag::Return,
            "tparam" => Tag::TParam,
            "defgroup" => Tag::DefGroup,
            "addtogroup" => Tag::AddToGroup,
            "ingroup" => Tag::InGroup,
            "file" => Tag::File,
            "author" | "authors" => Tag::Author,
            "version" => Tag::Version,
            "date" => Tag::Date,
            "copyright" => Tag::Copyright,
            other => Tag::Unknown(other.to_string()),
        }
    }

    /// Tags whose first word is a name (`\param x`, `\defgroup key`).
    pub fn takes_name(&self) -> bool {
        matches!(
            self,
            Tag::Param | Tag::TParam | Tag::DefGroup | Tag::AddToGroup | Tag::File
        )
    }

    /// Tags that are malformed without an argument.
    pub fn requires_argument(&self) -> bool {
        matches!(
            self,
            Tag::Param | Tag::TParam | Tag::DefGroup | Tag::AddToGroup | Tag::InGroup
        )
    }

    /// Tags whose argument ends with their own line; text on the next line
    /// starts a new paragraph.
    pub fn is_line_scoped(&self) -> bool {
        matches!(
            self,
            Tag::InGroup | Tag::DefGroup | Tag::AddToGroup | Tag::File
        )
    }

    pub fn is_structural(&self) -> bool {
        matches!(self, Tag::GroupOpen | Tag::GroupClose)
    }

    pub fn is_file_metadata(&self) -> bool {
        matches!(
            self,
            Tag::File | Tag::Author | Tag::Version | Tag::Date | Tag::Copyright
        )
    }

    pub fn is_group_definition(&self) -> bool {
        matches!(self, Tag::DefGroup | Tag::AddToGroup)
    }

    pub fn keyword(&self) -> &str {
        match self {
            Tag::Brief => "brief",
            Tag::Details => "details",
            Tag::Param => "param",
            Tag::Return => "return",
            Tag::TParam => "tparam",
            Tag::DefGroup => "defgroup",
            Tag::AddToGroup => "addtogroup",
            Tag::InGroup => "ingroup",
            Tag::GroupOpen => "@{",
            Tag::GroupClose => "@}",
            Tag::File => "file",
            Tag::Author => "author",
            Tag::Version => "version",
            Tag::Date => "date",
            Tag::Copyright => "copyright",
            Tag::PlainText => "text",
            Tag::Unknown(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEntry {
    pub tag: Tag,
    /// Name-like argument (`\param name`, `\defgroup key`, `\ingroup a b`).
    pub argument: String,
    pub body: String,
    /// `[in]`, `[out]`, `[in,out]` on `\param`.
    pub direction: Option<String>,
    /// Line offset of the tag inside the block.
    pub offset: u32,
}

impl TagEntry {
    pub fn new(tag: Tag, argument: impl Into<String>, body: impl Into<String>) -> Self {
        TagEntry {
            tag,
            argument: argument.into(),
            body: body.into(),
            direction: None,
            offset: 0,
        }
    }

    pub fn is_malformed(&self) -> bool {
        self.tag.requires_argument() && self.argument.is_empty()
    }
}

/// One tokenized documentation comment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentBlock {
    pub entries: Vec<TagEntry>,
    /// Source line of the comment's first line.
    pub line: u32,
    /// `///<`-style comment documenting the preceding item.
    pub trailing: bool,
}

impl CommentBlock {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has(&self, tag: &Tag) -> bool {
        self.entries.iter().any(|e| &e.tag == tag)
    }

    pub fn first(&self, tag: &Tag) -> Option<&TagEntry> {
        self.entries.iter().find(|e| &e.tag == tag)
    }

    pub fn all<'a>(&'a self, tag: &Tag) -> impl Iterator<Item = &'a TagEntry> + use<'a> {
        let tag = tag.clone();
        self.entries.iter().filter(move |e| e.tag == tag)
    }

    pub fn malformed(&self) -> impl Iterator<Item = &TagEntry> {
        self.entries.iter().filter(|e| e.is_malformed())
    }

    /// The group this block defines, if any.
    pub fn group_definition(&self) -> Option<&TagEntry> {
        self.entries.iter().find(|e| e.tag.is_group_definition())
    }

    /// `\file` present, or nothing but file metadata tags and scope markers.
    pub fn is_file_level(&self) -> bool {
        if self.has(&Tag::File) {
            return true;
        }
        let mut any_metadata = false;
        for entry in &self.entries {
            match &entry.tag {
                tag if tag.is_file_metadata() => any_metadata = true,
                Tag::GroupOpen | Tag::GroupClose => {}
                _ => return false,
            }
        }
        any_metadata
    }

    /// Anything besides `@{`/`@}`.
    pub fn has_documentation(&self) -> bool {
        self.entries.iter().any(|e| !e.tag.is_structural())
    }

    /// Explicit `\brief`, else the leading untagged paragraph when `implicit` is set.
    pub fn brief(&self, implicit: bool) -> Option<&str> {
        if let Some(entry) = self.first(&Tag::Brief) {
            return Some(entry.body.as_str());
        }
        if implicit {
            return self.leading_text().map(|e| e.body.as_str());
        }
        None
    }

    /// `\details` plus untagged paragraphs not consumed as the brief.
    pub fn details(&self, implicit: bool) -> String {
        let brief_index = if implicit && !self.has(&Tag::Brief) {
            self.leading_text_index()
        } else {
            None
        };
        self.entries
            .iter()
            .enumerate()
            .filter(|(i, e)| Some(*i) != brief_index && matches!(e.tag, Tag::Details | Tag::PlainText))
            .map(|(_, e)| e.body.as_str())
            .filter(|body| !body.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Untagged text appearing before any tag.
    fn leading_text(&self) -> Option<&TagEntry> {
        self.leading_text_index().map(|i| &self.entries[i])
    }

    /// First paragraph of text, looking past markers and one-line tags such
    /// as `\ingroup` or `\defgroup`.
    fn leading_text_index(&self) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| !e.tag.is_structural() && !e.tag.is_line_scoped())
            .filter(|&i| self.entries[i].tag == Tag::PlainText)
    }

    /// `\ingroup` keys in order of appearance.
    pub fn ingroups(&self) -> Vec<&str> {
        self.all(&Tag::InGroup)
            .flat_map(|e| e.argument.split_whitespace())
            .collect()
    }

    /// Concatenate several blocks documenting the same declaration. Entry
    /// offsets are rebased onto the first block's line.
    pub fn merge(blocks: Vec<CommentBlock>) -> Option<CommentBlock> {
        let mut iter = blocks.into_iter();
        let mut merged = iter.next()?;
        for block in iter {
            let shift = block.line.saturating_sub(merged.line);
            merged.entries.extend(block.entries.into_iter().map(|mut entry| {
                entry.offset += shift;
                entry
            }));
        }
        Some(merged)
    }
}
