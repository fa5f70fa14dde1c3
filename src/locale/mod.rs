pub mod translator;

pub use translator::Translator;

use crate::catalog::Catalog;
use crate::error::{CatalogError, Result};
use crate::parse::TsParser;
use hashbrown::HashMap;
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

struct CachedCatalog {
    modified: Option<SystemTime>,
    size: u64,
    catalog: Arc<Catalog>,
}

/// A directory of `<locale>.ts` catalogues, loaded on first use.
///
/// Loaded catalogues are cached and reloaded when the file's modification
/// time or size changes.
pub struct LocaleRegistry {
    dir: PathBuf,
    cache: Mutex<HashMap<String, CachedCatalog>>,
}

impl LocaleRegistry {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, locale: &str) -> PathBuf {
        self.dir.join(format!("{}.ts", locale))
    }

    /// Locale names of every `.ts` file in the directory, sorted
    pub fn available(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| CatalogError::file_io(&self.dir, e))?;
        let mut locales: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "ts"))
            .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        locales.sort();
        Ok(locales)
    }

    /// Best available locale for a request such as `de_DE.UTF-8`, `pt-BR` or `es`
    pub fn resolve(&self, requested: &str) -> Result<Option<String>> {
        let available = self.available()?;
        Ok(resolve_from(&available, requested))
    }

    /// Load the catalogue for `requested`, resolving it first
    pub fn load(&self, requested: &str) -> Result<Arc<Catalog>> {
        let locale = match self.resolve(requested)? {
            Some(locale) => locale,
            None => {
                let available = self.available()?;
                return Err(CatalogError::unknown_locale(requested, &self.dir, &available));
            }
        };
        if locale != requested {
            tracing::debug!(requested, resolved = %locale, "locale fallback");
        }
        self.load_exact(&locale)
    }

    fn load_exact(&self, locale: &str) -> Result<Arc<Catalog>> {
        let path = self.path_for(locale);
        let meta = fs::metadata(&path).map_err(|e| CatalogError::file_io(&path, e))?;
        let modified = meta.modified().ok();
        let size = meta.len();

        let mut cache = self.cache.lock();
        if let Some(cached) = cache.get(locale) {
            if cached.modified == modified && cached.size == size {
                tracing::trace!(locale, "catalogue cache hit");
                return Ok(Arc::clone(&cached.catalog));
            }
            tracing::debug!(locale, "catalogue changed on disk, reloading");
        }

        let catalog = Arc::new(TsParser::parse_file(&path)?);
        cache.insert(
            locale.to_string(),
            CachedCatalog {
                modified,
                size,
                catalog: Arc::clone(&catalog),
            },
        );
        Ok(catalog)
    }

    /// Drop every cached catalogue
    pub fn clear(&self) {
        self.cache.lock().clear();
    }

    pub fn cached_count(&self) -> usize {
        self.cache.lock().len()
    }
}

/// Locale requested by the environment (`LC_ALL`, `LC_MESSAGES`, `LANG`)
pub fn system_locale() -> Option<String> {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.is_empty() && value != "C" && value != "POSIX")
}

/// Strip encoding and modifier (`de_DE.UTF-8@euro` -> `de_DE`) and use `_`
fn normalize(locale: &str) -> String {
    let end = locale.find(['.', '@']).unwrap_or(locale.len());
    locale[..end].replace('-', "_")
}

fn language_of(locale: &str) -> &str {
    locale.split('_').next().unwrap_or(locale)
}

fn resolve_from(available: &[String], requested: &str) -> Option<String> {
    let wanted = normalize(requested);
    if wanted.is_empty() {
        return None;
    }
    let find = |name: &str| {
        available
            .iter()
            .find(|a| a.eq_ignore_ascii_case(name))
            .cloned()
    };

    if let Some(found) = find(&wanted) {
        return Some(found);
    }
    let language = language_of(&wanted);
    if let Some(found) = find(language) {
        return Some(found);
    }
    available
        .iter()
        .find(|a| language_of(a).eq_ignore_ascii_case(language))
        .cloned()
}
