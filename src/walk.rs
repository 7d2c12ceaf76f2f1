// src/walk.rs
//
// Drive the renderer from pulldown-cmark's event stream.
//
// Every `Start` pushes a frame that collects the rendered children; the
// matching `End` pops it and hands the collected fragment to the renderer
// handler for that node kind. Blocks outside any container go to the
// document outline, which owns heading sections.

use std::iter::Peekable;

use pulldown_cmark::{Alignment as MdAlignment, Event, Options as MdOptions, Parser, Tag, TagEnd};
use tracing::trace;

use crate::node::Fragment;
use crate::options::Options;
use crate::render::{require_content, Outline, Renderer};
use crate::sentinel::{TABLE_CELL, TABLE_ROW};
use crate::style::InlineStyle;
use crate::table::{Alignment, TableGrid};

pub fn parser_options() -> MdOptions {
    MdOptions::ENABLE_TABLES
        | MdOptions::ENABLE_STRIKETHROUGH
        | MdOptions::ENABLE_FOOTNOTES
        | MdOptions::ENABLE_TASKLISTS
        | MdOptions::ENABLE_MATH
}

/// Render `markdown` into the intermediate tree.
pub fn walk(markdown: &str, options: &Options) -> Fragment {
    let mut walker = Walker::new(options);
    let mut events = Parser::new_ext(markdown, parser_options()).peekable();
    while let Some(event) = events.next() {
        walker.handle(event, &mut events);
    }
    walker.finish()
}

/* ================================ Frames ================================= */

#[derive(Debug)]
enum FrameKind {
    Paragraph,
    Heading(usize),
    BlockQuote,
    CodeBlock,
    HtmlBlock,
    List,
    Item,
    FootnoteDefinition(String),
    Table,
    TableHead,
    TableRow,
    TableCell,
    Inline(InlineStyle),
    /// Two styles opened back to back, rendered as one triple-emphasis span
    /// if they also close back to back.
    Triple { inner: InlineStyle, outer: InlineStyle },
    Link { url: String, title: String },
    Image { url: String, title: String },
    /// Anything else: children pass straight through to the parent.
    Transparent,
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    content: Fragment,
    /// Verbatim text for code and HTML blocks.
    raw: String,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            content: Fragment::new(),
            raw: String::new(),
        }
    }
}

/// Table being collected as row/cell sentinel sub-streams.
#[derive(Debug, Default)]
struct TableState {
    alignments: Vec<Option<Alignment>>,
    header: String,
    body: String,
    row: String,
}

fn style_of(tag: &Tag<'_>) -> Option<InlineStyle> {
    match tag {
        Tag::Emphasis => Some(InlineStyle::Emphasis),
        Tag::Strong => Some(InlineStyle::Strong),
        _ => None,
    }
}

/// A plain span, or a triple span if the other emphasis opens right inside.
fn emphasis<'e, I>(outer: InlineStyle, events: &mut Peekable<I>) -> FrameKind
where
    I: Iterator<Item = Event<'e>>,
{
    let inner = match events.peek() {
        Some(Event::Start(next)) => style_of(next).filter(|s| *s != outer),
        _ => None,
    };
    match inner {
        Some(inner) => {
            events.next();
            FrameKind::Triple { inner, outer }
        }
        None => FrameKind::Inline(outer),
    }
}

fn end_of(style: InlineStyle) -> Option<TagEnd> {
    match style {
        InlineStyle::Emphasis => Some(TagEnd::Emphasis),
        InlineStyle::Strong => Some(TagEnd::Strong),
        _ => None,
    }
}

fn alignment(a: &MdAlignment) -> Option<Alignment> {
    match a {
        MdAlignment::None => None,
        MdAlignment::Left => Some(Alignment::Left),
        MdAlignment::Center => Some(Alignment::Center),
        MdAlignment::Right => Some(Alignment::Right),
    }
}

/// Where finished blocks go: the innermost open frame, else the outline.
fn sink_in<'f>(frames: &'f mut [Frame], outline: &'f mut Outline) -> &'f mut Fragment {
    match frames.last_mut() {
        Some(frame) => &mut frame.content,
        None => outline.current(),
    }
}

/* ================================ Walker ================================= */

struct Walker<'a> {
    renderer: Renderer<'a>,
    outline: Outline,
    frames: Vec<Frame>,
    tables: Vec<TableState>,
    /// Footnote labels in order of first reference.
    footnote_refs: Vec<String>,
    footnote_defs: Vec<(String, Fragment)>,
}

impl<'a> Walker<'a> {
    fn new(options: &'a Options) -> Self {
        Self {
            renderer: Renderer::new(options),
            outline: Outline::new(),
            frames: Vec::new(),
            tables: Vec::new(),
            footnote_refs: Vec::new(),
            footnote_defs: Vec::new(),
        }
    }

    fn sink(&mut self) -> &mut Fragment {
        sink_in(&mut self.frames, &mut self.outline)
    }

    fn in_raw_block(&self) -> bool {
        matches!(
            self.frames.last().map(|f| &f.kind),
            Some(FrameKind::CodeBlock | FrameKind::HtmlBlock)
        )
    }

    fn footnote_id(&mut self, label: &str) -> usize {
        match self.footnote_refs.iter().position(|l| l == label) {
            Some(i) => i + 1,
            None => {
                self.footnote_refs.push(label.to_string());
                self.footnote_refs.len()
            }
        }
    }

    fn handle<'e, I>(&mut self, event: Event<'e>, events: &mut Peekable<I>)
    where
        I: Iterator<Item = Event<'e>>,
    {
        match event {
            Event::Start(tag) => self.start(tag, events),
            Event::End(tag) => self.end(tag, events),
            Event::Text(text) => {
                if self.in_raw_block() {
                    if let Some(frame) = self.frames.last_mut() {
                        frame.raw.push_str(&text);
                    }
                } else {
                    let text = self.renderer.text(&text);
                    self.sink().append(text);
                }
            }
            Event::Html(html) => {
                if let Some(frame) = self.frames.last_mut() {
                    frame.raw.push_str(&html);
                }
            }
            Event::Code(code) | Event::InlineMath(code) | Event::DisplayMath(code) => {
                let span = self.renderer.code_span(&code);
                self.sink().append(span);
            }
            Event::InlineHtml(html) => {
                let text = self.renderer.text(&html);
                self.sink().append(text);
            }
            Event::FootnoteReference(label) => {
                let id = self.footnote_id(&label);
                let marker = self.renderer.footnote_ref(id);
                self.sink().append(marker);
            }
            Event::SoftBreak => self.sink().push_text(" "),
            Event::HardBreak => {
                let br = self.renderer.line_break();
                self.sink().append(br);
            }
            Event::Rule => self.renderer.rule(sink_in(&mut self.frames, &mut self.outline)),
            Event::TaskListMarker(checked) => {
                let marker = self.renderer.task_marker(checked);
                self.sink().append(marker);
            }
        }
    }

    fn start<'e, I>(&mut self, tag: Tag<'e>, events: &mut Peekable<I>)
    where
        I: Iterator<Item = Event<'e>>,
    {
        let kind = match tag {
            Tag::Paragraph => FrameKind::Paragraph,
            Tag::Heading { level, .. } => FrameKind::Heading(level as usize),
            Tag::BlockQuote(_) => FrameKind::BlockQuote,
            Tag::CodeBlock(_) => FrameKind::CodeBlock,
            Tag::HtmlBlock => FrameKind::HtmlBlock,
            Tag::List(_) => FrameKind::List,
            Tag::Item => FrameKind::Item,
            Tag::FootnoteDefinition(label) => FrameKind::FootnoteDefinition(label.to_string()),
            Tag::Table(aligns) => {
                self.tables.push(TableState {
                    alignments: aligns.iter().map(alignment).collect(),
                    ..TableState::default()
                });
                FrameKind::Table
            }
            Tag::TableHead => FrameKind::TableHead,
            Tag::TableRow => FrameKind::TableRow,
            Tag::TableCell => FrameKind::TableCell,
            Tag::Emphasis => emphasis(InlineStyle::Emphasis, events),
            Tag::Strong => emphasis(InlineStyle::Strong, events),
            Tag::Strikethrough => FrameKind::Inline(InlineStyle::Strikethrough),
            Tag::Link { dest_url, title, .. } => FrameKind::Link {
                url: dest_url.to_string(),
                title: title.to_string(),
            },
            Tag::Image { dest_url, title, .. } => FrameKind::Image {
                url: dest_url.to_string(),
                title: title.to_string(),
            },
            _ => FrameKind::Transparent,
        };
        self.frames.push(Frame::new(kind));
    }

    fn end<'e, I>(&mut self, tag: TagEnd, events: &mut Peekable<I>)
    where
        I: Iterator<Item = Event<'e>>,
    {
        // The inner half of a triple span closes first.
        if let Some(Frame {
            kind: FrameKind::Triple { inner, outer },
            ..
        }) = self.frames.last()
        {
            let (inner, outer) = (*inner, *outer);
            if end_of(inner) == Some(tag) {
                let closes_outer = matches!(
                    events.peek(),
                    Some(Event::End(next)) if end_of(outer) == Some(*next)
                );
                if closes_outer {
                    events.next();
                    self.close(InlineStyle::Triple);
                } else if let Some(frame) = self.frames.last_mut() {
                    let content = std::mem::take(&mut frame.content);
                    frame.content = self.renderer.styled(inner, content);
                    frame.kind = FrameKind::Inline(outer);
                }
                return;
            }
        }

        let Some(frame) = self.frames.pop() else {
            trace!(?tag, "end without start");
            return;
        };
        let r = &self.renderer;
        let top_level = self.frames.is_empty();
        let sink = sink_in(&mut self.frames, &mut self.outline);
        match frame.kind {
            FrameKind::Paragraph => r.paragraph(sink, require_content(frame.content)),
            FrameKind::Heading(level) => {
                let title = require_content(frame.content);
                if top_level {
                    if let Ok(plan) = r.heading(self.outline.depth(), level, title) {
                        self.outline.apply(plan);
                    }
                } else {
                    r.nested_heading(sink, title);
                }
            }
            FrameKind::BlockQuote => r.block_quote(sink, frame.content),
            FrameKind::CodeBlock => r.code_block(sink, &frame.raw),
            FrameKind::HtmlBlock => r.block_html(sink, &frame.raw),
            FrameKind::List => r.list(sink, require_content(frame.content)),
            FrameKind::Item => r.list_item(sink, frame.content),
            FrameKind::FootnoteDefinition(label) => self.footnote_defs.push((label, frame.content)),
            FrameKind::Table => {
                if let Some(state) = self.tables.pop() {
                    let mut grid = TableGrid::from_marked(&state.header, &state.body);
                    grid.alignments = state.alignments;
                    r.table(sink, &grid);
                }
            }
            FrameKind::TableHead => self.close_row(true),
            FrameKind::TableRow => self.close_row(false),
            FrameKind::TableCell => {
                if let Some(state) = self.tables.last_mut() {
                    state.row.push_str(&frame.content.inline_text());
                    state.row.push(TABLE_CELL as char);
                }
            }
            FrameKind::Inline(style) => sink.append(r.styled(style, frame.content)),
            FrameKind::Triple { inner, outer } => {
                // closed out of order: plain nested spans
                sink.append(r.styled(outer, r.styled(inner, frame.content)));
            }
            FrameKind::Link { url, title } => sink.append(r.link(&url, &title, frame.content)),
            FrameKind::Image { url, title } => sink.append(r.image(&url, &title, frame.content)),
            FrameKind::Transparent => sink.append(frame.content),
        }
    }

    fn close_row(&mut self, head: bool) {
        if let Some(state) = self.tables.last_mut() {
            let row = std::mem::take(&mut state.row);
            let target = if head { &mut state.header } else { &mut state.body };
            target.push_str(&row);
            target.push(TABLE_ROW as char);
        }
    }

    /// Close the top frame as a single span of `style`.
    fn close(&mut self, style: InlineStyle) {
        if let Some(frame) = self.frames.pop() {
            let span = self.renderer.styled(style, frame.content);
            self.sink().append(span);
        }
    }

    fn finish(mut self) -> Fragment {
        while let Some(frame) = self.frames.pop() {
            self.sink().append(frame.content);
        }
        let mut doc = std::mem::replace(&mut self.outline, Outline::new()).finish();

        if !self.footnote_defs.is_empty() {
            let mut defs: Vec<(usize, Fragment)> = Vec::with_capacity(self.footnote_defs.len());
            for (label, body) in std::mem::take(&mut self.footnote_defs) {
                let id = self.footnote_id(&label);
                defs.push((id, body));
            }
            defs.sort_by_key(|(id, _)| *id);
            let mut items = Fragment::new();
            for (id, body) in defs {
                self.renderer.footnote_item(&mut items, body, id);
            }
            self.renderer.footnotes(&mut doc, require_content(items));
        }
        doc
    }
}
