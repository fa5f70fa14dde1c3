use crate::catalog::Catalog;
use crate::error::{CatalogError, Result};
use crate::parse::{TranslationEntry, LENGTH_VARIANT_SEPARATOR};
use quick_xml::escape::escape;
use std::fs;
use std::path::Path;

/// Serializer producing TS XML in the layout `lupdate` writes
pub struct TsWriter {
    indent: String,
}

impl TsWriter {
    pub fn new() -> Self {
        Self {
            indent: " ".repeat(4),
        }
    }

    /// Render a catalogue as a complete TS document
    pub fn to_string(&self, catalog: &Catalog) -> String {
        let mut output = String::new();
        output.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
        output.push_str("<!DOCTYPE TS>\n");

        output.push_str(&format!("<TS version=\"{}\"", attr(&catalog.version)));
        if let Some(language) = &catalog.language {
            output.push_str(&format!(" language=\"{}\"", attr(language)));
        }
        if let Some(source_language) = &catalog.source_language {
            output.push_str(&format!(" sourcelanguage=\"{}\"", attr(source_language)));
        }
        output.push_str(">\n");

        if !catalog.dependencies.is_empty() {
            output.push_str("<dependencies>\n");
            for dependency in &catalog.dependencies {
                output.push_str(&format!("<dependency catalog=\"{}\"/>\n", attr(dependency)));
            }
            output.push_str("</dependencies>\n");
        }

        for context in catalog.contexts() {
            output.push_str("<context>\n");
            self.element(&mut output, 1, "name", &context.name);
            if let Some(comment) = &context.comment {
                self.element(&mut output, 1, "comment", comment);
            }
            for entry in context.messages() {
                self.format_message(&mut output, entry);
            }
            output.push_str("</context>\n");
        }

        output.push_str("</TS>\n");
        output
    }

    /// Write a catalogue to `path`, replacing its content
    pub fn write_file(&self, catalog: &Catalog, path: &Path) -> Result<()> {
        fs::write(path, self.to_string(catalog)).map_err(|e| CatalogError::file_io(path, e))?;
        tracing::debug!(file = %path.display(), messages = catalog.len(), "wrote catalogue");
        Ok(())
    }

    fn format_message(&self, output: &mut String, entry: &TranslationEntry) {
        self.pad(output, 1);
        output.push_str("<message");
        if let Some(id) = &entry.id {
            output.push_str(&format!(" id=\"{}\"", attr(id)));
        }
        if entry.numerus {
            output.push_str(" numerus=\"yes\"");
        }
        output.push_str(">\n");

        for location in &entry.locations {
            self.pad(output, 2);
            output.push_str(&format!("<location filename=\"{}\"", attr(&location.file)));
            if let Some(line) = location.line {
                output.push_str(&format!(" line=\"{}\"", line));
            }
            output.push_str("/>\n");
        }

        self.element(output, 2, "source", &entry.source);
        let optional = [
            ("oldsource", &entry.old_source),
            ("comment", &entry.comment),
            ("oldcomment", &entry.old_comment),
            ("extracomment", &entry.extra_comment),
            ("translatorcomment", &entry.translator_comment),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                self.element(output, 2, name, value);
            }
        }

        self.format_translation(output, entry);

        if let Some(user_data) = &entry.user_data {
            self.element(output, 2, "userdata", user_data);
        }
        for (name, value) in &entry.extras {
            self.element(output, 2, &format!("extra-{}", name), value);
        }

        self.pad(output, 1);
        output.push_str("</message>\n");
    }

    fn format_translation(&self, output: &mut String, entry: &TranslationEntry) {
        self.pad(output, 2);
        output.push_str("<translation");
        if let Some(kind) = entry.status.as_attr() {
            output.push_str(&format!(" type=\"{}\"", kind));
        }

        if entry.numerus {
            if entry.numerus_forms.is_empty() {
                output.push_str("></translation>\n");
                return;
            }
            output.push_str(">\n");
            for form in &entry.numerus_forms {
                self.pad(output, 3);
                output.push_str("<numerusform");
                self.format_variants(output, form);
                output.push_str("</numerusform>\n");
            }
            self.pad(output, 2);
            output.push_str("</translation>\n");
        } else {
            self.format_variants(output, &entry.translation);
            output.push_str("</translation>\n");
        }
    }

    /// Finish an open tag and write its text, split into `<lengthvariant>`s
    /// when the text carries more than one variant.
    fn format_variants(&self, output: &mut String, text: &str) {
        if !text.contains(LENGTH_VARIANT_SEPARATOR) {
            output.push('>');
            output.push_str(&protect(text));
            return;
        }
        output.push_str(" variants=\"yes\">");
        for variant in text.split(LENGTH_VARIANT_SEPARATOR) {
            output.push_str("<lengthvariant>");
            output.push_str(&protect(variant));
            output.push_str("</lengthvariant>");
        }
    }

    fn element(&self, output: &mut String, depth: usize, name: &str, text: &str) {
        self.pad(output, depth);
        output.push_str(&format!("<{name}>{}</{name}>\n", protect(text)));
    }

    fn pad(&self, output: &mut String, depth: usize) {
        for _ in 0..depth {
            output.push_str(&self.indent);
        }
    }
}

impl Default for TsWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Escape element text. Characters XML 1.0 cannot carry become `<byte>`
/// elements; carriage returns become character references so they survive
/// end-of-line normalisation.
fn protect(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut segment_start = 0;

    for (i, ch) in text.char_indices() {
        let replacement = match ch {
            '\r' => Some("&#xd;".to_string()),
            '\t' | '\n' => None,
            c if (c as u32) < 0x20 => Some(format!("<byte value=\"x{:x}\"/>", c as u32)),
            _ => None,
        };
        if let Some(replacement) = replacement {
            result.push_str(&escape(&text[segment_start..i]));
            result.push_str(&replacement);
            segment_start = i + ch.len_utf8();
        }
    }
    result.push_str(&escape(&text[segment_start..]));
    result
}

fn attr(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for ch in escape(value).chars() {
        if (ch as u32) < 0x20 {
            result.push_str(&format!("&#x{:x};", ch as u32));
        } else {
            result.push(ch);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{TranslationStatus, TsParser};

    #[test]
    fn test_layout() {
        let mut catalog = Catalog::new(Some("de".to_string()));
        catalog
            .insert(
                TranslationEntry::new("ARMRegisters", "ARM Registers")
                    .with_location("../../src/citra_qt/debugger/registers.ui", Some(14))
                    .with_translation("ARM Register"),
            )
            .unwrap();
        catalog
            .insert(TranslationEntry::new("ARMRegisters", "Value"))
            .unwrap();

        let output = TsWriter::new().to_string(&catalog);
        let expected = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="de">
<context>
    <name>ARMRegisters</name>
    <message>
        <location filename="../../src/citra_qt/debugger/registers.ui" line="14"/>
        <source>ARM Registers</source>
        <translation>ARM Register</translation>
    </message>
    <message>
        <source>Value</source>
        <translation type="unfinished"></translation>
    </message>
</context>
</TS>
"#;
        assert_eq!(output, expected);
    }

    #[test]
    fn test_escaping() {
        assert_eq!(protect("<b>%1 & \"x\"</b>"), "&lt;b&gt;%1 &amp; &quot;x&quot;&lt;/b&gt;");
        assert_eq!(protect("a\u{1b}b"), "a<byte value=\"x1b\"/>b");
        assert_eq!(protect("a\r\nb\tc"), "a&#xd;\nb\tc");
    }

    #[test]
    fn test_numerus_and_variants_reload() {
        let mut catalog = Catalog::new(Some("ru".to_string()));
        catalog
            .insert(
                TranslationEntry::new("GameList", "%n game(s)")
                    .with_numerus_forms(vec!["%n игра".into(), "%n игры".into(), "".into()])
                    .with_status(TranslationStatus::Unfinished),
            )
            .unwrap();
        catalog
            .insert(TranslationEntry::new("GMainWindow", "Start").with_translation("Starten\u{9c}Go"))
            .unwrap();

        let output = TsWriter::new().to_string(&catalog);
        assert!(output.contains("<message numerus=\"yes\">"));
        assert!(output.contains("<numerusform>%n игра</numerusform>"));
        assert!(output.contains("variants=\"yes\""));

        let reloaded = TsParser::parse_str(&output, "ru.ts").unwrap();
        let entry = reloaded.lookup("GameList", "%n game(s)", None).unwrap();
        assert_eq!(entry.numerus_forms.len(), 3);
        assert_eq!(entry.status, TranslationStatus::Unfinished);
        assert_eq!(
            reloaded.translate("GMainWindow", "Start", None),
            "Starten\u{9c}Go"
        );
    }
}
