use std::collections::HashMap;

use lazylist::Translate;
use parking_lot::RwLock;
use serde_json::Value;
use tokio::sync::watch;

/// Failure to load a translation catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("catalog root must be a JSON object")]
    NotAnObject,
}

struct Catalogs {
    /// language -> flattened key -> message
    messages: HashMap<String, HashMap<String, String>>,
    language: String,
    fallback: String,
}

/// A translation service with per-language catalogs.
///
/// Constructed explicitly and handed to whoever needs it (as an `Arc<dyn Translate>` for a
/// list controller). Language switches are published on a [`watch`] channel so views can
/// re-render their labels.
pub struct Translator {
    catalogs: RwLock<Catalogs>,
    language_tx: watch::Sender<String>,
}

impl Translator {
    /// A translator whose fallback language is `language` itself.
    pub fn new(language: impl Into<String>) -> Self {
        let language = language.into();
        let (language_tx, _) = watch::channel(language.clone());
        Self {
            catalogs: RwLock::new(Catalogs {
                messages: HashMap::new(),
                fallback: language.clone(),
                language,
            }),
            language_tx,
        }
    }

    /// Sets the language consulted when the current one has no entry for a key.
    pub fn with_fallback(self, fallback: impl Into<String>) -> Self {
        self.catalogs.write().fallback = fallback.into();
        self
    }

    /// Merges a catalog into `language`. Nested objects become dotted keys
    /// (`{"time": {"just_now": ..}}` is `time.just_now`); non-string scalars are stored in
    /// their JSON text form, arrays and nulls are skipped.
    pub fn add_catalog(&self, language: &str, catalog: &Value) -> Result<(), CatalogError> {
        let Value::Object(root) = catalog else {
            return Err(CatalogError::NotAnObject);
        };
        let mut flat = HashMap::new();
        for (key, value) in root {
            flatten(key, value, &mut flat);
        }
        adebug!(language, keys = flat.len(), "catalog loaded");
        self.catalogs
            .write()
            .messages
            .entry(language.to_owned())
            .or_default()
            .extend(flat);
        Ok(())
    }

    pub fn add_catalog_json(&self, language: &str, json: &str) -> Result<(), CatalogError> {
        let catalog: Value = serde_json::from_str(json)?;
        self.add_catalog(language, &catalog)
    }

    pub fn language(&self) -> String {
        self.catalogs.read().language.clone()
    }

    /// Switches the current language and notifies subscribers. Returns `false` when the
    /// language was already current.
    pub fn set_language(&self, language: impl Into<String>) -> bool {
        let language = language.into();
        {
            let mut catalogs = self.catalogs.write();
            if catalogs.language == language {
                return false;
            }
            if !catalogs.messages.contains_key(&language) {
                awarn!(language = %language, "switching to a language without a catalog");
            }
            catalogs.language = language.clone();
        }
        adebug!(language = %language, "language changed");
        self.language_tx.send_replace(language);
        true
    }

    /// A receiver that observes every language switch.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.language_tx.subscribe()
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.catalogs.read().lookup(key).is_some()
    }

    /// Looks `key` up in the current language, then the fallback language, then returns the
    /// key itself. `{name}` placeholders are replaced by the matching parameter; a parameter
    /// value that is itself a key is translated first.
    pub fn translate(&self, key: &str, params: &[(&str, &str)]) -> String {
        let catalogs = self.catalogs.read();
        let Some(template) = catalogs.lookup(key) else {
            return key.to_owned();
        };
        if params.is_empty() {
            return template.to_owned();
        }
        params.iter().fold(template.to_owned(), |text, &(name, value)| {
            let value = catalogs.lookup(value).unwrap_or(value);
            text.replace(&format!("{{{name}}}"), value)
        })
    }
}

impl Catalogs {
    fn lookup(&self, key: &str) -> Option<&str> {
        [&self.language, &self.fallback]
            .into_iter()
            .filter_map(|lang| self.messages.get(lang))
            .find_map(|messages| messages.get(key))
            .map(String::as_str)
    }
}

impl Translate for Translator {
    fn translate(&self, key: &str, params: &[(&str, &str)]) -> String {
        Translator::translate(self, key, params)
    }
}

impl core::fmt::Debug for Translator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let catalogs = self.catalogs.read();
        f.debug_struct("Translator")
            .field("language", &catalogs.language)
            .field("fallback", &catalogs.fallback)
            .field("languages", &catalogs.messages.len())
            .finish_non_exhaustive()
    }
}

fn flatten(prefix: &str, value: &Value, out: &mut HashMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten(&format!("{prefix}.{key}"), child, out);
            }
        }
        Value::String(s) => {
            out.insert(prefix.to_owned(), s.clone());
        }
        Value::Number(_) | Value::Bool(_) => {
            out.insert(prefix.to_owned(), value.to_string());
        }
        Value::Array(_) | Value::Null => {}
    }
}
