pub mod format;
pub mod mark;
pub mod propagate;
pub mod replace;

use crate::{Ctx, TranslateArgs};
use color_eyre::eyre::{eyre, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use viloc_lang::{LanguageClassifier, Strategy};
use viloc_services::ScanOptions;
use viloc_translate::{
    GlossaryBackend, GoogleBackend, Provider, TranslationBackend, Translator, DEFAULT_TIMEOUT_MS,
};

pub type DynTranslator = Translator<Box<dyn TranslationBackend>>;

/// `--catalog` as given, otherwise the configured location inside the module.
pub fn catalog_path(ctx: &Ctx, module: &Path, catalog: Option<PathBuf>) -> PathBuf {
    catalog.unwrap_or_else(|| ctx.cfg.catalog_path(module))
}

pub fn scan_options(ctx: &Ctx) -> ScanOptions {
    ScanOptions {
        extensions: ctx.cfg.extensions(),
        exclude: Vec::new(),
        backup_suffix: ctx.cfg.backup_suffix().to_string(),
    }
}

pub fn classifier(ctx: &Ctx, flag: Option<&str>) -> Result<Box<dyn LanguageClassifier>> {
    let cfg = ctx.cfg.translate();
    let Some(name) = flag.or(cfg.classifier.as_deref()) else {
        return Ok(Strategy::default().classifier());
    };
    let strategy = Strategy::parse(name).ok_or_else(|| eyre!("unknown classifier: {name}"))?;
    Ok(strategy.classifier())
}

pub fn translator(ctx: &Ctx, args: &TranslateArgs) -> Result<DynTranslator> {
    let cfg = ctx.cfg.translate();
    let provider_name = args
        .provider
        .as_deref()
        .or(cfg.provider.as_deref())
        .unwrap_or("google");
    let provider =
        Provider::parse(provider_name).ok_or_else(|| eyre!("unknown provider: {provider_name}"))?;

    let backend: Box<dyn TranslationBackend> = match provider {
        Provider::Google => {
            let endpoint = args.endpoint.as_deref().or(cfg.endpoint.as_deref());
            let timeout = args.timeout_ms.or(cfg.timeout_ms).unwrap_or(DEFAULT_TIMEOUT_MS);
            Box::new(GoogleBackend::new(endpoint, timeout)?)
        }
        Provider::Glossary => {
            let path = args
                .glossary
                .clone()
                .or_else(|| cfg.glossary.as_ref().map(PathBuf::from))
                .ok_or_else(|| eyre!("the glossary provider needs --glossary or translate.glossary"))?;
            Box::new(GlossaryBackend::load(&path)?)
        }
    };
    tracing::debug!(event = "translator", backend = backend.name());
    Ok(Translator::new(backend))
}

pub fn delay(ctx: &Ctx, args: &TranslateArgs) -> Duration {
    Duration::from_millis(args.delay_ms.or(ctx.cfg.translate().delay_ms).unwrap_or(0))
}
