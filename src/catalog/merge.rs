use super::Catalog;
use crate::error::{CatalogError, Result};
use crate::parse::{TranslationEntry, TranslationStatus};
use hashbrown::HashSet;
use serde::Serialize;

/// What happened to the messages of a catalogue during a merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Present in both, translation carried over
    pub kept: usize,
    /// New in the template, added untranslated
    pub added: usize,
    /// Retired messages that are back in the template
    pub revived: usize,
    /// Gone from the template, kept as vanished because they were translated
    pub vanished: usize,
    /// Gone from the template and never translated
    pub dropped: usize,
}

impl Catalog {
    /// Update this catalogue against a freshly extracted `template`.
    ///
    /// The result follows the template's contexts and message order, takes
    /// its locations and developer comments, and keeps every translation
    /// this catalogue already had. `self` is left untouched.
    pub fn merge_template(&self, template: &Catalog) -> Result<(Catalog, MergeReport)> {
        if let (Some(ours), Some(theirs)) = (&self.source_language, &template.source_language) {
            if ours != theirs {
                return Err(CatalogError::SourceLanguageMismatch {
                    template: theirs.clone(),
                    catalog: ours.clone(),
                });
            }
        }

        let mut merged = Catalog::with_header_of(self);
        if merged.source_language.is_none() {
            merged.source_language = template.source_language.clone();
        }
        let mut report = MergeReport::default();
        let mut seen = HashSet::new();

        for context in template.contexts() {
            let comment = context.comment.clone().or_else(|| {
                self.context(&context.name)
                    .and_then(|c| c.comment.clone())
            });
            merged.ensure_context(&context.name);
            merged.set_context_comment(&context.name, comment);

            for fresh in context.messages() {
                let key = fresh.key();
                let entry = match self.lookup_key(&key) {
                    Some(old) => {
                        if old.status.is_retired() {
                            report.revived += 1;
                        } else {
                            report.kept += 1;
                        }
                        carry_translation(fresh, old)
                    }
                    None => {
                        report.added += 1;
                        untranslated(fresh)
                    }
                };
                seen.insert(key);
                merged.insert(entry)?;
            }
        }

        for old in self.messages() {
            if seen.contains(&old.key()) {
                continue;
            }
            if old.has_text() {
                let mut entry = old.clone();
                if !entry.status.is_retired() {
                    entry.status = TranslationStatus::Vanished;
                }
                report.vanished += 1;
                merged.insert(entry)?;
            } else {
                report.dropped += 1;
            }
        }

        tracing::debug!(?report, "merged catalogue against template");
        Ok((merged, report))
    }
}

fn carry_translation(fresh: &TranslationEntry, old: &TranslationEntry) -> TranslationEntry {
    let mut entry = fresh.clone();
    entry.translation = old.translation.clone();
    entry.numerus_forms = old.numerus_forms.clone();
    entry.translator_comment = old.translator_comment.clone();
    entry.status = if old.status.is_retired() {
        TranslationStatus::Unfinished
    } else {
        old.status
    };
    if entry.numerus && entry.numerus_forms.is_empty() && !entry.translation.is_empty() {
        entry.numerus_forms.push(std::mem::take(&mut entry.translation));
    }
    entry
}

fn untranslated(fresh: &TranslationEntry) -> TranslationEntry {
    let mut entry = fresh.clone();
    entry.translation.clear();
    entry.numerus_forms.clear();
    entry.translator_comment = None;
    entry.status = TranslationStatus::Unfinished;
    entry
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translated() -> Catalog {
        let mut catalog = Catalog::new(Some("de".to_string()));
        catalog
            .insert(TranslationEntry::new("GMainWindow", "Open").with_translation("Öffnen"))
            .unwrap();
        catalog
            .insert(TranslationEntry::new("GMainWindow", "Close").with_translation("Schließen"))
            .unwrap();
        catalog
            .insert(TranslationEntry::new("GMainWindow", "Never translated"))
            .unwrap();
        catalog
            .insert(
                TranslationEntry::new("GMainWindow", "Reset")
                    .with_translation("Zurücksetzen")
                    .with_status(TranslationStatus::Vanished),
            )
            .unwrap();
        catalog
    }

    fn template() -> Catalog {
        let mut catalog = Catalog::new(None);
        for source in ["Open", "Reset", "Save"] {
            catalog
                .insert(TranslationEntry::new("GMainWindow", source).with_location("main.cpp", Some(10)))
                .unwrap();
        }
        catalog
    }

    #[test]
    fn test_merge_report() {
        let (merged, report) = translated().merge_template(&template()).unwrap();
        assert_eq!(
            report,
            MergeReport {
                kept: 1,
                added: 1,
                revived: 1,
                vanished: 1,
                dropped: 1,
            }
        );
        assert_eq!(merged.len(), 4);
        assert_eq!(merged.language.as_deref(), Some("de"));
    }

    #[test]
    fn test_merge_statuses() {
        let (merged, _) = translated().merge_template(&template()).unwrap();

        let open = merged.lookup("GMainWindow", "Open", None).unwrap();
        assert_eq!(open.translation, "Öffnen");
        assert_eq!(open.status, TranslationStatus::Finished);
        assert_eq!(open.locations[0].file, "main.cpp");

        let reset = merged.lookup("GMainWindow", "Reset", None).unwrap();
        assert_eq!(reset.translation, "Zurücksetzen");
        assert_eq!(reset.status, TranslationStatus::Unfinished);

        let save = merged.lookup("GMainWindow", "Save", None).unwrap();
        assert_eq!(save.status, TranslationStatus::Unfinished);
        assert!(save.translation.is_empty());

        let close = merged.lookup("GMainWindow", "Close", None).unwrap();
        assert_eq!(close.status, TranslationStatus::Vanished);

        assert!(merged.lookup("GMainWindow", "Never translated", None).is_none());
    }

    #[test]
    fn test_merge_keeps_dependencies_of_translation() {
        let mut ours = translated();
        ours.dependencies = vec!["qtbase_de".to_string()];
        let mut theirs = template();
        theirs.dependencies = vec!["qtbase_en".to_string()];

        let (merged, _) = ours.merge_template(&theirs).unwrap();
        assert_eq!(merged.dependencies, vec!["qtbase_de"]);
    }

    #[test]
    fn test_merge_rejects_other_source_language() {
        let mut ours = translated();
        ours.source_language = Some("en".to_string());
        let mut theirs = template();
        theirs.source_language = Some("ja".to_string());
        assert!(matches!(
            ours.merge_template(&theirs),
            Err(CatalogError::SourceLanguageMismatch { .. })
        ));
    }
}
