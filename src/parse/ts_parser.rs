use crate::catalog::Catalog;
use crate::error::{CatalogError, Result};
use hashbrown::HashMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;
use std::fs;
use std::path::Path;

use super::translation::{Location, TranslationEntry, TranslationStatus};

/// Separator Qt places between length variants of one translation
pub const LENGTH_VARIANT_SEPARATOR: char = '\u{9c}';

/// Parser for Qt translation-source (`.ts`) files
pub struct TsParser;

impl TsParser {
    pub fn parse_file(path: &Path) -> Result<Catalog> {
        let content = fs::read_to_string(path).map_err(|e| CatalogError::file_io(path, e))?;
        let catalog = Self::parse_str(&content, path)?;
        tracing::debug!(
            file = %path.display(),
            messages = catalog.len(),
            language = catalog.language.as_deref().unwrap_or(""),
            "loaded translation catalogue"
        );
        Ok(catalog)
    }

    /// Parse TS content. `origin` is only used in error messages and as the
    /// catalogue's path.
    pub fn parse_str(content: &str, origin: impl AsRef<Path>) -> Result<Catalog> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        TsReader::new(content, origin.as_ref()).run()
    }

    /// Cheap pre-check used by directory scans: does the file look like a TS catalogue?
    pub fn looks_like_ts(content: &str) -> bool {
        let head = &content.as_bytes()[..content.len().min(512)];
        head.windows(3).any(|w| w == b"<TS")
    }
}

struct TsReader<'a> {
    reader: Reader<&'a [u8]>,
    content: &'a str,
    file: &'a Path,
    // (byte offset, line) of the last line lookup
    line_cursor: (usize, usize),
    current_file: String,
    current_lines: HashMap<String, i64>,
}

impl<'a> TsReader<'a> {
    fn new(content: &'a str, file: &'a Path) -> Self {
        Self {
            reader: Reader::from_str(content),
            content,
            file,
            line_cursor: (0, 1),
            current_file: String::new(),
            current_lines: HashMap::new(),
        }
    }

    fn run(mut self) -> Result<Catalog> {
        loop {
            match self.next()? {
                Event::Start(e) if e.name().as_ref() == b"TS" => {
                    let mut catalog = self.start_catalog(&e)?;
                    self.parse_ts_body(&mut catalog)?;
                    self.expect_eof()?;
                    return Ok(catalog);
                }
                Event::Empty(e) if e.name().as_ref() == b"TS" => {
                    let catalog = self.start_catalog(&e)?;
                    self.expect_eof()?;
                    return Ok(catalog);
                }
                Event::Start(e) | Event::Empty(e) => {
                    return Err(self.schema(format!(
                        "expected <TS> root element, found <{}>",
                        String::from_utf8_lossy(e.name().as_ref())
                    )));
                }
                Event::Text(t) => self.expect_whitespace(&t)?,
                ev @ (Event::CData(_) | Event::GeneralRef(_)) => {
                    return Err(self.stray_text(&ev));
                }
                Event::Eof => return Err(self.schema("missing <TS> root element")),
                _ => {}
            }
        }
    }

    fn start_catalog(&mut self, e: &BytesStart<'_>) -> Result<Catalog> {
        let mut catalog = Catalog::new(self.attr(e, b"language")?);
        catalog.path = Some(self.file.to_path_buf());
        if let Some(version) = self.attr(e, b"version")? {
            catalog.version = version;
        }
        catalog.source_language = self.attr(e, b"sourcelanguage")?;
        Ok(catalog)
    }

    fn parse_ts_body(&mut self, catalog: &mut Catalog) -> Result<()> {
        loop {
            match self.next()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"context" => self.parse_context(catalog)?,
                    b"dependencies" => self.parse_dependencies(catalog)?,
                    other => return Err(self.unexpected(other, "TS")),
                },
                Event::Empty(e) => match e.name().as_ref() {
                    b"context" | b"dependencies" => {}
                    other => return Err(self.unexpected(other, "TS")),
                },
                Event::End(e) if e.name().as_ref() == b"TS" => return Ok(()),
                Event::Text(t) => self.expect_whitespace(&t)?,
                ev @ (Event::CData(_) | Event::GeneralRef(_)) => {
                    return Err(self.stray_text(&ev));
                }
                Event::Eof => return Err(self.eof_inside("TS")),
                _ => {}
            }
        }
    }

    fn parse_context(&mut self, catalog: &mut Catalog) -> Result<()> {
        let start_line = self.line();
        let mut name: Option<String> = None;
        let mut comment: Option<String> = None;
        let mut messages = Vec::new();

        loop {
            match self.next()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"name" => name = Some(self.read_text(b"name")?),
                    b"comment" => comment = Some(self.read_text(b"comment")?),
                    b"message" => messages.push(self.parse_message(&e)?),
                    other => return Err(self.unexpected(other, "context")),
                },
                Event::Empty(e) => match e.name().as_ref() {
                    b"name" => name = Some(String::new()),
                    b"comment" => comment = Some(String::new()),
                    other => return Err(self.unexpected(other, "context")),
                },
                Event::End(e) if e.name().as_ref() == b"context" => break,
                Event::Text(t) => self.expect_whitespace(&t)?,
                ev @ (Event::CData(_) | Event::GeneralRef(_)) => {
                    return Err(self.stray_text(&ev));
                }
                Event::Eof => return Err(self.eof_inside("context")),
                _ => {}
            }
        }

        let name = name.ok_or_else(|| {
            CatalogError::schema(self.file, start_line, "<context> without <name>")
        })?;
        catalog.ensure_context(&name);
        if comment.is_some() {
            catalog.set_context_comment(&name, comment);
        }
        for mut entry in messages {
            entry.context = name.clone();
            catalog.insert(entry)?;
        }
        Ok(())
    }

    fn parse_message(&mut self, start: &BytesStart<'_>) -> Result<TranslationEntry> {
        let mut entry = TranslationEntry {
            line: self.line(),
            id: self.attr(start, b"id")?,
            numerus: self.attr(start, b"numerus")?.as_deref() == Some("yes"),
            ..Default::default()
        };
        let mut has_source = false;
        let mut has_translation = false;

        loop {
            match self.next()? {
                Event::Start(e) => {
                    let name = e.name();
                    match name.as_ref() {
                        b"location" => {
                            self.parse_location(&e, &mut entry)?;
                            self.skip_element(b"location")?;
                        }
                        b"source" => {
                            self.ensure_single(has_source, "source")?;
                            entry.source = self.read_text(b"source")?;
                            has_source = true;
                        }
                        b"translation" => {
                            self.ensure_single(has_translation, "translation")?;
                            self.parse_translation(&e, false, &mut entry)?;
                            has_translation = true;
                        }
                        b"comment" => {
                            self.ensure_single(entry.comment.is_some(), "comment")?;
                            entry.comment = Some(self.read_text(b"comment")?)
                        }
                        b"oldsource" => entry.old_source = Some(self.read_text(b"oldsource")?),
                        b"oldcomment" => entry.old_comment = Some(self.read_text(b"oldcomment")?),
                        b"extracomment" => {
                            entry.extra_comment = Some(self.read_text(b"extracomment")?)
                        }
                        b"translatorcomment" => {
                            entry.translator_comment = Some(self.read_text(b"translatorcomment")?)
                        }
                        b"userdata" => entry.user_data = Some(self.read_text(b"userdata")?),
                        other if other.starts_with(b"extra-") => {
                            let key = String::from_utf8_lossy(&other[6..]).into_owned();
                            let value = self.read_text(other)?;
                            entry.extras.push((key, value));
                        }
                        other => return Err(self.unexpected(other, "message")),
                    }
                }
                Event::Empty(e) => {
                    let name = e.name();
                    match name.as_ref() {
                        b"location" => self.parse_location(&e, &mut entry)?,
                        b"source" => {
                            self.ensure_single(has_source, "source")?;
                            has_source = true;
                        }
                        b"translation" => {
                            self.ensure_single(has_translation, "translation")?;
                            self.parse_translation(&e, true, &mut entry)?;
                            has_translation = true;
                        }
                        b"comment" => {
                            self.ensure_single(entry.comment.is_some(), "comment")?;
                            entry.comment = Some(String::new())
                        }
                        b"oldsource" => entry.old_source = Some(String::new()),
                        b"oldcomment" => entry.old_comment = Some(String::new()),
                        b"extracomment" => entry.extra_comment = Some(String::new()),
                        b"translatorcomment" => entry.translator_comment = Some(String::new()),
                        b"userdata" => entry.user_data = Some(String::new()),
                        other if other.starts_with(b"extra-") => {
                            let key = String::from_utf8_lossy(&other[6..]).into_owned();
                            entry.extras.push((key, String::new()));
                        }
                        other => return Err(self.unexpected(other, "message")),
                    }
                }
                Event::End(e) if e.name().as_ref() == b"message" => break,
                Event::Text(t) => self.expect_whitespace(&t)?,
                ev @ (Event::CData(_) | Event::GeneralRef(_)) => {
                    return Err(self.stray_text(&ev));
                }
                Event::Eof => return Err(self.eof_inside("message")),
                _ => {}
            }
        }

        if !has_source {
            return Err(CatalogError::schema(
                self.file,
                entry.line,
                "<message> without <source>",
            ));
        }
        if !has_translation {
            entry.status = TranslationStatus::Unfinished;
        }
        Ok(entry)
    }

    /// `<source>`, `<translation>` and `<comment>` appear at most once per message
    fn ensure_single(&mut self, seen: bool, element: &str) -> Result<()> {
        if seen {
            Err(self.schema(format!("duplicate <{}> in <message>", element)))
        } else {
            Ok(())
        }
    }

    fn parse_dependencies(&mut self, catalog: &mut Catalog) -> Result<()> {
        loop {
            match self.next()? {
                Event::Start(e) if e.name().as_ref() == b"dependency" => {
                    catalog.dependencies.push(self.dependency(&e)?);
                    self.skip_element(b"dependency")?;
                }
                Event::Empty(e) if e.name().as_ref() == b"dependency" => {
                    catalog.dependencies.push(self.dependency(&e)?);
                }
                Event::Start(e) | Event::Empty(e) => {
                    return Err(self.unexpected(e.name().as_ref(), "dependencies"));
                }
                Event::End(e) if e.name().as_ref() == b"dependencies" => return Ok(()),
                Event::Text(t) => self.expect_whitespace(&t)?,
                ev @ (Event::CData(_) | Event::GeneralRef(_)) => {
                    return Err(self.stray_text(&ev));
                }
                Event::Eof => return Err(self.eof_inside("dependencies")),
                _ => {}
            }
        }
    }

    fn dependency(&mut self, e: &BytesStart<'_>) -> Result<String> {
        self.attr(e, b"catalog")?
            .ok_or_else(|| self.schema("<dependency> without catalog"))
    }

    /// Resolve a `<location>`; a missing filename means "same file as before"
    /// and a signed line is relative to the running line of that file.
    fn parse_location(&mut self, e: &BytesStart<'_>, entry: &mut TranslationEntry) -> Result<()> {
        if let Some(file) = self.attr(e, b"filename")? {
            self.current_file = file;
        }
        let file = self.current_file.clone();

        let line = match self.attr(e, b"line")? {
            None => None,
            Some(raw) if raw.is_empty() => None,
            Some(raw) => {
                let value: i64 = raw
                    .trim_start_matches('+')
                    .parse()
                    .map_err(|_| self.schema(format!("invalid location line '{}'", raw)))?;
                let absolute = if raw.starts_with('+') || raw.starts_with('-') {
                    let running = self.current_lines.entry(file.clone()).or_insert(0);
                    *running += value;
                    *running
                } else {
                    value
                };
                let line = u32::try_from(absolute).map_err(|_| {
                    self.schema(format!("location line '{}' resolves to {}", raw, absolute))
                })?;
                Some(line)
            }
        };

        entry.locations.push(Location { file, line });
        Ok(())
    }

    fn parse_translation(
        &mut self,
        e: &BytesStart<'_>,
        is_empty: bool,
        entry: &mut TranslationEntry,
    ) -> Result<()> {
        entry.status = match self.attr(e, b"type")? {
            None => TranslationStatus::Finished,
            Some(kind) => TranslationStatus::from_attr(&kind).ok_or_else(|| {
                self.schema(format!("unknown translation type '{}'", kind))
            })?,
        };
        if is_empty {
            return Ok(());
        }

        if !entry.numerus {
            entry.translation = self.read_text(b"translation")?;
            return Ok(());
        }

        loop {
            match self.next()? {
                Event::Start(e) if e.name().as_ref() == b"numerusform" => {
                    let form = self.read_text(b"numerusform")?;
                    entry.numerus_forms.push(form);
                }
                Event::Empty(e) if e.name().as_ref() == b"numerusform" => {
                    entry.numerus_forms.push(String::new());
                }
                Event::Start(e) | Event::Empty(e) => {
                    return Err(self.unexpected(e.name().as_ref(), "translation"));
                }
                Event::End(e) if e.name().as_ref() == b"translation" => return Ok(()),
                Event::Text(t) => self.expect_whitespace(&t)?,
                ev @ (Event::CData(_) | Event::GeneralRef(_)) => {
                    return Err(self.stray_text(&ev));
                }
                Event::Eof => return Err(self.eof_inside("translation")),
                _ => {}
            }
        }
    }

    /// Collect the text content of the element `end`, resolving entities,
    /// `<byte>` escapes and length variants.
    fn read_text(&mut self, end: &[u8]) -> Result<String> {
        let mut text = String::new();
        let mut variants: Vec<String> = Vec::new();
        let allow_variants = end == b"translation" || end == b"numerusform";

        loop {
            match self.next()? {
                Event::Text(t) => text.push_str(&self.decode_text(&t)?),
                Event::CData(c) => text.push_str(&normalize_newlines(&self.utf8(&c)?)),
                Event::GeneralRef(r) => {
                    let name = self.utf8(&r)?;
                    text.push_str(&self.unescape(&format!("&{};", name))?);
                }
                Event::Empty(e) if e.name().as_ref() == b"byte" => {
                    text.push(self.parse_byte(&e)?);
                }
                Event::Start(e) if allow_variants && e.name().as_ref() == b"lengthvariant" => {
                    variants.push(self.read_text(b"lengthvariant")?);
                }
                Event::Empty(e) if allow_variants && e.name().as_ref() == b"lengthvariant" => {
                    variants.push(String::new());
                }
                Event::Start(e) | Event::Empty(e) => {
                    let parent = String::from_utf8_lossy(end).into_owned();
                    return Err(self.unexpected(e.name().as_ref(), &parent));
                }
                Event::End(e) if e.name().as_ref() == end => break,
                Event::Eof => {
                    return Err(self.eof_inside(&String::from_utf8_lossy(end)));
                }
                _ => {}
            }
        }

        if variants.is_empty() {
            Ok(text)
        } else {
            Ok(variants.join(&LENGTH_VARIANT_SEPARATOR.to_string()))
        }
    }

    fn parse_byte(&mut self, e: &BytesStart<'_>) -> Result<char> {
        let raw = self
            .attr(e, b"value")?
            .ok_or_else(|| self.schema("<byte> without value"))?;
        let code = match raw.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => raw.parse(),
        };
        code.ok()
            .and_then(char::from_u32)
            .ok_or_else(|| self.schema(format!("invalid <byte> value '{}'", raw)))
    }

    fn skip_element(&mut self, end: &[u8]) -> Result<()> {
        let mut depth = 0usize;
        loop {
            match self.next()? {
                Event::Start(_) => depth += 1,
                Event::End(e) if depth == 0 && e.name().as_ref() == end => return Ok(()),
                Event::End(_) => depth = depth.saturating_sub(1),
                Event::Eof => return Err(self.eof_inside(&String::from_utf8_lossy(end))),
                _ => {}
            }
        }
    }

    fn expect_eof(&mut self) -> Result<()> {
        loop {
            match self.next()? {
                Event::Eof => return Ok(()),
                Event::Text(t) => self.expect_whitespace(&t)?,
                Event::Comment(_) | Event::PI(_) => {}
                _ => return Err(self.schema("unexpected content after </TS>")),
            }
        }
    }

    fn expect_whitespace(&mut self, raw: &[u8]) -> Result<()> {
        if raw.iter().all(u8::is_ascii_whitespace) {
            Ok(())
        } else {
            let text = String::from_utf8_lossy(raw);
            Err(self.schema(format!("unexpected text '{}'", text.trim())))
        }
    }

    /// Character data where only elements may appear
    fn stray_text(&mut self, event: &Event<'_>) -> CatalogError {
        let text = match event {
            Event::GeneralRef(r) => format!("&{};", String::from_utf8_lossy(r)),
            Event::CData(c) => String::from_utf8_lossy(c).into_owned(),
            _ => String::new(),
        };
        self.schema(format!("unexpected text '{}'", text.trim()))
    }

    fn next(&mut self) -> Result<Event<'a>> {
        self.reader.read_event().map_err(|e| {
            let line = self.line();
            CatalogError::xml(self.file, line, e.to_string())
        })
    }

    fn attr(&mut self, e: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>> {
        for attr in e.attributes() {
            let attr = attr.map_err(|err| self.xml_error(err.to_string()))?;
            if attr.key.as_ref() == name {
                let raw = self.utf8(&attr.value)?;
                return self.unescape(&normalize_newlines(&raw)).map(Some);
            }
        }
        Ok(None)
    }

    fn decode_text(&mut self, raw: &[u8]) -> Result<String> {
        let text = self.utf8(raw)?;
        self.unescape(&normalize_newlines(&text))
    }

    fn unescape(&mut self, raw: &str) -> Result<String> {
        quick_xml::escape::unescape(raw)
            .map(|text| text.into_owned())
            .map_err(|err| self.xml_error(err.to_string()))
    }

    fn utf8(&mut self, raw: &[u8]) -> Result<String> {
        std::str::from_utf8(raw)
            .map(str::to_string)
            .map_err(|err| self.xml_error(format!("invalid UTF-8: {}", err)))
    }

    /// 1-indexed line of the reader's current position
    fn line(&mut self) -> usize {
        let pos = (self.reader.buffer_position() as usize).min(self.content.len());
        let (cursor, mut line) = self.line_cursor;
        if pos < cursor {
            line = 1 + count_newlines(&self.content.as_bytes()[..pos]);
        } else {
            line += count_newlines(&self.content.as_bytes()[cursor..pos]);
        }
        self.line_cursor = (pos, line);
        line
    }

    fn xml_error(&mut self, reason: String) -> CatalogError {
        let line = self.line();
        CatalogError::xml(self.file, line, reason)
    }

    fn schema(&mut self, reason: impl Into<String>) -> CatalogError {
        let line = self.line();
        CatalogError::schema(self.file, line, reason)
    }

    fn unexpected(&mut self, name: &[u8], parent: &str) -> CatalogError {
        let reason = format!(
            "unexpected element <{}> inside <{}>",
            String::from_utf8_lossy(name),
            parent
        );
        self.schema(reason)
    }

    fn eof_inside(&mut self, element: &str) -> CatalogError {
        let reason = format!("unexpected end of file inside <{}>", element);
        self.xml_error(reason)
    }
}

fn count_newlines(bytes: &[u8]) -> usize {
    bytes.iter().filter(|&&b| b == b'\n').count()
}

/// XML end-of-line handling: literal `\r\n` and lone `\r` read as `\n`.
/// Applied before unescaping, so `&#xd;` still yields a carriage return.
fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}
