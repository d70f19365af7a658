use anyhow::{anyhow, Result};
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource, FluentValue};
use std::collections::HashMap;
use std::sync::OnceLock;
use unic_langid::LanguageIdentifier;

/// Languages with a bundled resource file
pub const SUPPORTED_LANGUAGES: [&str; 2] = ["es", "en"];

const FALLBACK_LANGUAGE: &str = "es";

const RESOURCES: [(&str, &str); 2] = [
    ("es", include_str!("../locales/es/main.ftl")),
    ("en", include_str!("../locales/en/main.ftl")),
];

/// Localization manager for the recipe bot
pub struct LocalizationManager {
    bundles: HashMap<String, FluentBundle<FluentResource>>,
    default_language: String,
}

impl LocalizationManager {
    /// Create a new localization manager with the bundled languages
    pub fn new() -> Result<Self> {
        Self::with_default_language(FALLBACK_LANGUAGE)
    }

    /// Create a manager that falls back to `default_language` for unknown users
    pub fn with_default_language(default_language: &str) -> Result<Self> {
        let mut bundles = HashMap::new();
        for (lang, source) in RESOURCES {
            let locale: LanguageIdentifier = lang.parse()?;
            bundles.insert(lang.to_string(), Self::create_bundle(locale, source)?);
        }

        if !bundles.contains_key(default_language) {
            return Err(anyhow!("unsupported default language '{default_language}'"));
        }

        Ok(Self {
            bundles,
            default_language: default_language.to_string(),
        })
    }

    /// Create a fluent bundle for a specific locale
    fn create_bundle(
        locale: LanguageIdentifier,
        source: &str,
    ) -> Result<FluentBundle<FluentResource>> {
        let mut bundle = FluentBundle::new_concurrent(vec![locale.clone()]);
        // Bidi isolation marks would end up inside button labels
        bundle.set_use_isolating(false);

        let resource = FluentResource::try_new(source.to_string())
            .map_err(|(_, errors)| anyhow!("invalid resource for {locale}: {errors:?}"))?;
        bundle
            .add_resource(resource)
            .map_err(|errors| anyhow!("duplicate messages for {locale}: {errors:?}"))?;

        Ok(bundle)
    }

    pub fn is_language_supported(&self, language: &str) -> bool {
        self.bundles.contains_key(language)
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Map a Telegram language code (`es`, `en-US`, ...) to a bundled language
    pub fn detect_language(&self, language_code: Option<&str>) -> String {
        language_code
            .and_then(|code| code.split(['-', '_']).next())
            .map(|primary| primary.to_ascii_lowercase())
            .filter(|primary| self.is_language_supported(primary))
            .unwrap_or_else(|| self.default_language.clone())
    }

    /// Get a localized message in a given language
    pub fn get_message_in_language(
        &self,
        key: &str,
        language: &str,
        args: Option<&HashMap<&str, &str>>,
    ) -> String {
        let bundle = match self
            .bundles
            .get(language)
            .or_else(|| self.bundles.get(&self.default_language))
        {
            Some(bundle) => bundle,
            None => return format!("Missing translation: {key}"),
        };

        let msg = match bundle.get_message(key) {
            Some(msg) => msg,
            None => return format!("Missing translation: {key}"),
        };

        let pattern = match msg.value() {
            Some(pattern) => pattern,
            None => return format!("Missing value for key: {key}"),
        };

        let fluent_args = args.map(|args| {
            let mut fluent_args = FluentArgs::new();
            for (name, value) in args {
                fluent_args.set(*name, FluentValue::from(*value));
            }
            fluent_args
        });

        let mut errors = vec![];
        bundle
            .format_pattern(pattern, fluent_args.as_ref(), &mut errors)
            .into_owned()
    }
}

static LOCALIZATION_MANAGER: OnceLock<LocalizationManager> = OnceLock::new();

/// Initialize the global localization manager
pub fn init_localization(default_language: &str) -> Result<()> {
    let manager = LocalizationManager::with_default_language(default_language)?;
    // A second initialization keeps the first manager
    let _ = LOCALIZATION_MANAGER.set(manager);
    Ok(())
}

/// Get the global localization manager, initializing it with defaults if needed
pub fn get_localization_manager() -> &'static LocalizationManager {
    LOCALIZATION_MANAGER.get_or_init(|| {
        LocalizationManager::new().unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to load bundled locales");
            LocalizationManager {
                bundles: HashMap::new(),
                default_language: FALLBACK_LANGUAGE.to_string(),
            }
        })
    })
}

/// Get a localized message in the given language
pub fn t_lang(key: &str, language: &str) -> String {
    get_localization_manager().get_message_in_language(key, language, None)
}

/// Get a localized message with arguments in the given language
pub fn t_args_lang(key: &str, args: &[(&str, &str)], language: &str) -> String {
    let args_map: HashMap<&str, &str> = args.iter().cloned().collect();
    get_localization_manager().get_message_in_language(key, language, Some(&args_map))
}

/// Resolve the language for a Telegram user
pub fn detect_language(language_code: Option<&str>) -> String {
    get_localization_manager().detect_language(language_code)
}
