use serde::Serialize;
use std::time::Duration;
use viloc_core::{CatalogEntry, Lang, ReplacementJob};
use viloc_lang::LanguageClassifier;
use viloc_translate::{TranslateError, TranslationBackend, Translator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    /// Vietnamese msgid translated to English; the Vietnamese text moved to msgstr.
    Swapped,
    /// English msgid with an empty msgstr got a Vietnamese msgstr.
    Filled,
}

#[derive(Debug, Clone, Serialize)]
pub struct Mutation {
    /// Position among the reconciled entries.
    pub index: usize,
    pub kind: MutationKind,
    pub source_before: String,
    pub source_after: String,
    pub target_after: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileOutcome {
    pub entries: usize,
    pub mutations: Vec<Mutation>,
    /// Translation attempts that failed; those entries were left as they were.
    pub failed: usize,
}

impl ReconcileOutcome {
    pub fn mutated(&self) -> usize {
        self.mutations.len()
    }

    pub fn count(&self, kind: MutationKind) -> usize {
        self.mutations.iter().filter(|m| m.kind == kind).count()
    }

    /// Renames to propagate: only swaps change the msgid that source files use.
    pub fn jobs(&self) -> Vec<ReplacementJob> {
        self.mutations
            .iter()
            .filter(|m| m.kind == MutationKind::Swapped)
            .map(|m| ReplacementJob::new(&m.source_before, &m.source_after))
            .filter(|j| !j.is_noop())
            .collect()
    }
}

/// Applies the swap/fill policy to catalog entries.
pub struct CatalogRewriter<'a, C: ?Sized, B> {
    classifier: &'a C,
    translator: &'a Translator<B>,
    delay: Duration,
}

impl<'a, C, B> CatalogRewriter<'a, C, B>
where
    C: LanguageClassifier + ?Sized,
    B: TranslationBackend,
{
    pub fn new(classifier: &'a C, translator: &'a Translator<B>) -> Self {
        Self {
            classifier,
            translator,
            delay: Duration::ZERO,
        }
    }

    /// Pause after each entry (keeps console output readable with slow terminals).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Decide and apply the change for one entry. At most one translation call.
    /// `Ok(None)` means the entry needed nothing.
    pub fn reconcile_entry(
        &self,
        entry: &mut CatalogEntry,
    ) -> Result<Option<MutationKind>, TranslateError> {
        let source = entry.source_text.as_str();
        if self.classifier.looks_like(source, Lang::Vietnamese) {
            let english = self
                .translator
                .translate(source, Lang::Vietnamese, Lang::English)?;
            entry.target_text = std::mem::replace(&mut entry.source_text, english);
            return Ok(Some(MutationKind::Swapped));
        }
        if entry.target_text.is_empty() && self.classifier.looks_like(source, Lang::English) {
            let vietnamese = self
                .translator
                .translate(source, Lang::English, Lang::Vietnamese)?;
            entry.target_text = vietnamese;
            return Ok(Some(MutationKind::Filled));
        }
        Ok(None)
    }

    /// Reconcile entries in order, in place.
    pub fn reconcile<'e, I>(&self, entries: I) -> ReconcileOutcome
    where
        I: IntoIterator<Item = &'e mut CatalogEntry>,
    {
        let mut outcome = ReconcileOutcome::default();
        for (index, entry) in entries.into_iter().enumerate() {
            outcome.entries += 1;
            let source_before = entry.source_text.clone();
            match self.reconcile_entry(entry) {
                Ok(Some(kind)) => {
                    tracing::info!(
                        event = "entry_translated",
                        index,
                        kind = ?kind,
                        msgid = %entry.source_text,
                        msgstr = %entry.target_text
                    );
                    outcome.mutations.push(Mutation {
                        index,
                        kind,
                        source_before,
                        source_after: entry.source_text.clone(),
                        target_after: entry.target_text.clone(),
                    });
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(event = "translate_failed", index, msgid = %source_before, error = %e);
                    outcome.failed += 1;
                }
            }
            if !self.delay.is_zero() {
                std::thread::sleep(self.delay);
            }
        }
        outcome
    }
}
