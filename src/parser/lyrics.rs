use std::fmt;
use std::sync::LazyLock;

use ego_tree::NodeRef;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;

/// Label that ends the metadata block; lyrics start after the next `<hr>`.
const ANCHOR_LABEL: &str = "Language:";
const BOUNDARY_TAG: &str = "hr";
const IGNORED_TAGS: &[&str] = &["hr", "center"];
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "pre", "li", "tr", "blockquote", "h1", "h2", "h3", "h4", "h5", "h6",
];

static BOLD_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("b, strong").unwrap());
static MEANING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)meaning").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionLabel {
    Pallavi,
    Anupallavi,
    Charanam,
    Caranam,
}

impl SectionLabel {
    pub fn from_text(text: &str) -> Option<Self> {
        match text.to_lowercase().as_str() {
            "pallavi" => Some(Self::Pallavi),
            "anupallavi" => Some(Self::Anupallavi),
            "charanam" => Some(Self::Charanam),
            "caranam" => Some(Self::Caranam),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pallavi => "Pallavi",
            Self::Anupallavi => "Anupallavi",
            Self::Charanam => "Charanam",
            Self::Caranam => "Caranam",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Header(SectionLabel),
    Line(String),
}

/// Headers render with a leading newline so joined output gets a blank line
/// before each section.
impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Header(label) => write!(f, "\n[{}]", label.as_str()),
            Segment::Line(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lyrics {
    pub segments: Vec<Segment>,
}

impl Lyrics {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn joined(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Why the segmenter stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stop {
    AnchorMissing,
    BoundaryMissing,
    Meaning,
    Exhausted,
}

#[derive(Debug, Clone, Copy)]
enum State<'a> {
    SeekingAnchor,
    SeekingBoundary(NodeRef<'a, Node>),
    Collecting(ElementRef<'a>),
    Done(Stop),
}

/// How a single sibling after the boundary is treated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sibling {
    Terminal,
    Ignored,
    Header(SectionLabel),
    Line(String),
    Empty,
}

pub struct Segmenter<'a> {
    document: &'a Html,
    cell: ElementRef<'a>,
    segments: Vec<Segment>,
}

impl<'a> Segmenter<'a> {
    pub fn new(document: &'a Html, cell: ElementRef<'a>) -> Self {
        Self {
            document,
            cell,
            segments: Vec::new(),
        }
    }

    pub fn run(mut self) -> (Lyrics, Stop) {
        let mut state = State::SeekingAnchor;
        loop {
            state = match state {
                State::SeekingAnchor => self.seek_anchor(),
                State::SeekingBoundary(anchor) => self.seek_boundary(anchor),
                State::Collecting(cursor) => self.collect_next(cursor),
                State::Done(stop) => {
                    debug!(?stop, segments = self.segments.len(), "Segmenter done");
                    return (Lyrics { segments: self.segments }, stop);
                }
            };
        }
    }

    fn seek_anchor(&self) -> State<'a> {
        match find_anchor(self.cell) {
            Some(anchor) => State::SeekingBoundary(anchor),
            None => State::Done(Stop::AnchorMissing),
        }
    }

    fn seek_boundary(&self, anchor: NodeRef<'a, Node>) -> State<'a> {
        match find_boundary(self.document, anchor) {
            Some(hr) => State::Collecting(hr),
            None => State::Done(Stop::BoundaryMissing),
        }
    }

    fn collect_next(&mut self, cursor: ElementRef<'a>) -> State<'a> {
        let Some(sibling) = cursor.next_siblings().find_map(ElementRef::wrap) else {
            return State::Done(Stop::Exhausted);
        };

        let kind = classify(sibling);
        debug!(tag = sibling.value().name(), ?kind, "Classified sibling");
        match kind {
            Sibling::Terminal => return State::Done(Stop::Meaning),
            Sibling::Header(label) => self.segments.push(Segment::Header(label)),
            Sibling::Line(text) => self.segments.push(Segment::Line(text)),
            Sibling::Ignored | Sibling::Empty => {}
        }
        State::Collecting(sibling)
    }
}

/// Walk the lyric siblings that follow the metadata block.
pub fn segment<'a>(document: &'a Html, cell: ElementRef<'a>) -> (Lyrics, Stop) {
    Segmenter::new(document, cell).run()
}

/// Deepest node under `cell` whose text contains the anchor label. Descends
/// through the first matching child at each level, so a label split across
/// inline tags resolves to their common parent.
pub fn find_anchor(cell: ElementRef<'_>) -> Option<NodeRef<'_, Node>> {
    let mut current = *cell;
    if !contains_anchor_label(current) {
        return None;
    }
    while let Some(child) = current.children().find(|c| contains_anchor_label(*c)) {
        current = child;
    }
    Some(current)
}

fn contains_anchor_label(node: NodeRef<'_, Node>) -> bool {
    match node.value() {
        Node::Text(text) => text.contains(ANCHOR_LABEL),
        Node::Element(_) => ElementRef::wrap(node)
            .is_some_and(|el| el.text().collect::<String>().contains(ANCHOR_LABEL)),
        _ => false,
    }
}

/// First `<hr>` after `anchor` in document order, anchor's own subtree included.
pub fn find_boundary<'a>(document: &'a Html, anchor: NodeRef<'a, Node>) -> Option<ElementRef<'a>> {
    document
        .tree
        .root()
        .descendants()
        .skip_while(|node| node.id() != anchor.id())
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == BOUNDARY_TAG)
}

pub fn classify(element: ElementRef<'_>) -> Sibling {
    if is_terminal(element) {
        return Sibling::Terminal;
    }
    if IGNORED_TAGS.contains(&element.value().name()) {
        return Sibling::Ignored;
    }

    let text = stripped_text(element);
    if let Some(label) = SectionLabel::from_text(&text) {
        return Sibling::Header(label);
    }
    if text.is_empty() {
        return Sibling::Empty;
    }
    Sibling::Line(render_lines(element))
}

fn is_terminal(element: ElementRef<'_>) -> bool {
    is_meaning_label(element) || element.select(&BOLD_SEL).any(is_meaning_label)
}

fn is_meaning_label(element: ElementRef<'_>) -> bool {
    matches!(element.value().name(), "b" | "strong")
        && MEANING_RE.is_match(&element.text().collect::<String>())
}

/// Every text node trimmed and concatenated with no separator.
fn stripped_text(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).collect()
}

/// Plain-text rendering that keeps `<br>` and block boundaries as newlines.
/// Whitespace inside a line is collapsed and blank lines are dropped.
pub fn render_lines(element: ElementRef<'_>) -> String {
    let mut lines = vec![String::new()];
    push_lines(element, &mut lines);
    lines
        .iter()
        .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn push_lines(element: ElementRef<'_>, lines: &mut Vec<String>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            if let Some(line) = lines.last_mut() {
                line.push_str(text);
            }
        } else if let Some(child_el) = ElementRef::wrap(child) {
            let name = child_el.value().name();
            if name == "br" {
                lines.push(String::new());
                continue;
            }
            let block = BLOCK_TAGS.contains(&name);
            if block {
                lines.push(String::new());
            }
            push_lines(child_el, lines);
            if block {
                lines.push(String::new());
            }
        }
    }
}
