//! Lightweight markup to HTML for the newsletter body.
//!
//! Handles what the model actually produces: paragraphs, bullet and numbered
//! lists, `#` headings, `**bold**`, `*italic*` and `[text](url)` links.
//! Text is escaped before any markup is applied.

use once_cell::sync::Lazy;
use regex::Regex;

static LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\((https?://[^)\s]+)\)").expect("valid link regex"));
static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid bold regex"));
static ITALIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*([^*\s][^*]*?)\*").expect("valid italic regex"));
static ORDERED_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+[.)]\s+(.*)$").expect("valid list regex"));

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn emphasis(text: &str) -> String {
    let bolded = BOLD.replace_all(text, "<strong>$1</strong>");
    ITALIC.replace_all(&bolded, "<em>$1</em>").into_owned()
}

/// Inline markup for a single line of text.
///
/// Emphasis applies to the text around links and to link labels, never to
/// the href itself.
pub fn inline_to_html(text: &str) -> String {
    let escaped = escape_html(text);
    let mut html = String::with_capacity(escaped.len());
    let mut last = 0;

    for caps in LINK.captures_iter(&escaped) {
        let Some(whole) = caps.get(0) else { continue };
        html.push_str(&emphasis(&escaped[last..whole.start()]));
        html.push_str(&format!(
            r#"<a href="{}" target="_blank">{}</a>"#,
            &caps[2],
            emphasis(&caps[1])
        ));
        last = whole.end();
    }
    html.push_str(&emphasis(&escaped[last..]));

    html
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Block {
    None,
    Paragraph,
    Unordered,
    Ordered,
}

struct Writer {
    html: String,
    block: Block,
    paragraph: Vec<String>,
}

impl Writer {
    fn close(&mut self) {
        match self.block {
            Block::Paragraph => {
                self.html
                    .push_str(&format!("<p>{}</p>\n", self.paragraph.join("<br>\n")));
                self.paragraph.clear();
            }
            Block::Unordered => self.html.push_str("</ul>\n"),
            Block::Ordered => self.html.push_str("</ol>\n"),
            Block::None => {}
        }
        self.block = Block::None;
    }

    fn open(&mut self, block: Block) {
        if self.block == block {
            return;
        }
        self.close();
        match block {
            Block::Unordered => self.html.push_str("<ul>\n"),
            Block::Ordered => self.html.push_str("<ol>\n"),
            Block::Paragraph | Block::None => {}
        }
        self.block = block;
    }
}

fn bullet_item(line: &str) -> Option<&str> {
    ["- ", "* ", "\u{2022} "]
        .iter()
        .find_map(|prefix| line.strip_prefix(prefix))
}

/// Converts a block of lightweight markup into HTML fragments.
pub fn to_html(text: &str) -> String {
    let mut w = Writer {
        html: String::new(),
        block: Block::None,
        paragraph: Vec::new(),
    };

    for line in text.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            w.close();
            continue;
        }

        if let Some(item) = bullet_item(trimmed) {
            w.open(Block::Unordered);
            w.html
                .push_str(&format!("<li>{}</li>\n", inline_to_html(item.trim())));
            continue;
        }

        if let Some(caps) = ORDERED_ITEM.captures(trimmed) {
            w.open(Block::Ordered);
            w.html
                .push_str(&format!("<li>{}</li>\n", inline_to_html(caps[1].trim())));
            continue;
        }

        if trimmed.starts_with('#') {
            let level = trimmed.chars().take_while(|c| *c == '#').count();
            let title = trimmed[level..].trim();
            if !title.is_empty() {
                w.close();
                // h2 is reserved for section headings
                let tag = (level + 2).min(6);
                w.html.push_str(&format!(
                    "<h{tag}>{}</h{tag}>\n",
                    inline_to_html(title)
                ));
                continue;
            }
        }

        w.open(Block::Paragraph);
        w.paragraph.push(inline_to_html(trimmed));
    }

    w.close();
    w.html
}
