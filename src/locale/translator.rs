use super::LocaleRegistry;
use crate::catalog::Catalog;
use crate::error::Result;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::sync::Arc;

static GLOBAL: Lazy<Translator> = Lazy::new(Translator::new);

/// The catalogue UI code translates through.
///
/// With nothing installed every call returns the source text.
#[derive(Default)]
pub struct Translator {
    active: RwLock<Option<Arc<Catalog>>>,
}

impl Translator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `catalog` active, returning the previous one
    pub fn install(&self, catalog: Arc<Catalog>) -> Option<Arc<Catalog>> {
        tracing::debug!(
            language = catalog.language.as_deref().unwrap_or(""),
            "installing catalogue"
        );
        self.active.write().replace(catalog)
    }

    pub fn uninstall(&self) -> Option<Arc<Catalog>> {
        self.active.write().take()
    }

    /// Load `locale` from `registry` and make it active
    pub fn switch_locale(&self, registry: &LocaleRegistry, locale: &str) -> Result<Arc<Catalog>> {
        let catalog = registry.load(locale)?;
        self.install(Arc::clone(&catalog));
        Ok(catalog)
    }

    pub fn catalog(&self) -> Option<Arc<Catalog>> {
        self.active.read().clone()
    }

    pub fn language(&self) -> Option<String> {
        self.active.read().as_ref().and_then(|c| c.language.clone())
    }

    pub fn tr(&self, context: &str, source: &str) -> String {
        self.tr_disambiguated(context, source, None)
    }

    pub fn tr_disambiguated(&self, context: &str, source: &str, comment: Option<&str>) -> String {
        match self.active.read().as_deref() {
            Some(catalog) => catalog.translate(context, source, comment).to_string(),
            None => source.to_string(),
        }
    }

    /// Plural-aware lookup; `%n` is left for the caller to fill in
    pub fn tr_n(&self, context: &str, source: &str, comment: Option<&str>, n: i64) -> String {
        match self.active.read().as_deref() {
            Some(catalog) => catalog
                .translate_plural(context, source, comment, n)
                .to_string(),
            None => source.to_string(),
        }
    }
}

/// Process-wide translator
pub fn global() -> &'static Translator {
    &GLOBAL
}

pub fn install(catalog: Arc<Catalog>) -> Option<Arc<Catalog>> {
    global().install(catalog)
}

pub fn uninstall() -> Option<Arc<Catalog>> {
    global().uninstall()
}

pub fn tr(context: &str, source: &str) -> String {
    global().tr(context, source)
}

pub fn tr_n(context: &str, source: &str, n: i64) -> String {
    global().tr_n(context, source, None, n)
}
