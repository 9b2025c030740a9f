// src/common/i18n.rs

use std::collections::HashMap;

use anyhow::Context;

const CATALOGS: &[(&str, &str)] = &[
    ("es", include_str!("../../locales/es.json")),
    ("en", include_str!("../../locales/en.json")),
];

pub const DEFAULT_LANG: &str = "es";

/// Catálogos de mensajes por idioma, cargados una vez al iniciar.
#[derive(Debug)]
pub struct I18nStore {
    default_lang: String,
    catalogs: HashMap<String, HashMap<String, String>>,
}

impl I18nStore {
    pub fn load(default_lang: &str) -> anyhow::Result<Self> {
        let mut catalogs = HashMap::new();
        for (lang, raw) in CATALOGS {
            let messages: HashMap<String, String> = serde_json::from_str(raw)
                .with_context(|| format!("catálogo de mensajes '{}' inválido", lang))?;
            catalogs.insert(lang.to_string(), messages);
        }

        if !catalogs.contains_key(default_lang) {
            anyhow::bail!("idioma por defecto '{}' no tiene catálogo", default_lang);
        }

        Ok(Self {
            default_lang: default_lang.to_string(),
            catalogs,
        })
    }

    pub fn supports(&self, lang: &str) -> bool {
        self.catalogs.contains_key(lang)
    }

    // Idioma desconocido -> idioma por defecto; clave desconocida -> la clave.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        let lang = if self.supports(lang) { lang } else { self.default_lang.as_str() };

        self.catalogs
            .get(lang)
            .and_then(|messages| messages.get(key))
            .or_else(|| {
                self.catalogs
                    .get(&self.default_lang)
                    .and_then(|messages| messages.get(key))
            })
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_catalog_has_the_same_keys() {
        let store = I18nStore::load("es").unwrap();
        let es = &store.catalogs["es"];
        let en = &store.catalogs["en"];

        let mut missing: Vec<&String> = es.keys().filter(|k| !en.contains_key(*k)).collect();
        missing.extend(en.keys().filter(|k| !es.contains_key(*k)));
        assert!(missing.is_empty(), "claves sin traducir: {:?}", missing);
    }

    #[test]
    fn unknown_language_uses_default() {
        let store = I18nStore::load("en").unwrap();
        assert_eq!(
            store.translate("fr", "USER_NOT_FOUND"),
            store.translate("en", "USER_NOT_FOUND")
        );
        assert_eq!(store.translate("", "USER_NOT_FOUND"), "User not found.");
    }

    #[test]
    fn unknown_key_returns_key() {
        let store = I18nStore::load("es").unwrap();
        assert_eq!(store.translate("es", "NO_EXISTE"), "NO_EXISTE");
    }

    #[test]
    fn default_language_must_exist() {
        assert!(I18nStore::load("de").is_err());
    }
}
