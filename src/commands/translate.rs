use std::sync::Arc;
use anyhow::{Context, Result};

use crate::clipboard::{capture_selection, replace_selection};
use crate::platform::{ClipboardSlot, KeyInjector};
use crate::state::{AppStatus, CycleGuard, TimingSettings};
use crate::translate::{preview, Translator};

/// How one translate cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Replaced { chars: usize },
    NothingSelected,
    Failed,
}

/// Capture → translate → replace, run once per hotkey press.
pub struct TranslatePipeline {
    clipboard: Arc<dyn ClipboardSlot>,
    keys: Arc<dyn KeyInjector>,
    translator: Arc<dyn Translator>,
    timing: TimingSettings,
    show_indicator: bool,
}

impl TranslatePipeline {
    pub fn new(
        clipboard: Arc<dyn ClipboardSlot>,
        keys: Arc<dyn KeyInjector>,
        translator: Arc<dyn Translator>,
        timing: TimingSettings,
        show_indicator: bool,
    ) -> Self {
        Self {
            clipboard,
            keys,
            translator,
            timing,
            show_indicator,
        }
    }

    /// Runs a full cycle. Every error is logged here; none escapes.
    pub async fn run(&self, cycle: &CycleGuard) -> CycleOutcome {
        let captured = capture_selection(
            self.clipboard.as_ref(),
            self.keys.as_ref(),
            &self.timing,
            self.show_indicator,
        )
        .await;

        let text = match captured {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("Failed to capture selected text: {:#}", e);
                return CycleOutcome::Failed;
            }
        };
        tracing::debug!("Text to translate length: {}", text.chars().count());

        if text.is_empty() {
            tracing::warn!("No text detected to translate");
            return CycleOutcome::NothingSelected;
        }

        match self.translate_and_replace(&text, cycle).await {
            Ok(chars) => {
                tracing::info!("Translation completed successfully");
                CycleOutcome::Replaced { chars }
            }
            Err(e) => {
                tracing::error!("{:#}", e);
                CycleOutcome::Failed
            }
        }
    }

    async fn translate_and_replace(&self, text: &str, cycle: &CycleGuard) -> Result<usize> {
        cycle.advance(AppStatus::Translating);
        let translated = self.translator.translate(text).await?;

        cycle.advance(AppStatus::Replacing);
        replace_selection(
            self.clipboard.as_ref(),
            self.keys.as_ref(),
            &self.timing,
            &translated,
        )
        .await
        .with_context(|| {
            format!(
                "Replacement failed for text ({} chars): {}",
                text.chars().count(),
                preview(text)
            )
        })?;

        Ok(translated.chars().count())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use async_trait::async_trait;
    use tracing_subscriber::layer::{Context as LayerContext, Layer, SubscriberExt};

    use crate::platform::fake::FakeDesktop;
    use crate::platform::EditChord;
    use crate::state::{AppState, Settings};
    use crate::translate::{ProviderError, TranslateError};

    /// Deterministic translator backed by a lookup table; records every call.
    #[derive(Default)]
    pub(crate) struct TableTranslator {
        table: HashMap<String, String>,
        pub(crate) calls: Mutex<Vec<String>>,
    }

    impl TableTranslator {
        pub(crate) fn with(pairs: &[(&str, &str)]) -> Self {
            Self {
                table: pairs
                    .iter()
                    .map(|(from, to)| (from.to_string(), to.to_string()))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Translator for TableTranslator {
        async fn translate(&self, text: &str) -> Result<String, TranslateError> {
            self.calls.lock().unwrap().push(text.to_string());
            match self.table.get(text) {
                Some(translated) => Ok(translated.clone()),
                None => Err(TranslateError::new(
                    text,
                    ProviderError::MalformedResponse("no entry".into()),
                )),
            }
        }
    }

    /// Counts ERROR events seen by the subscriber it is installed in.
    #[derive(Clone, Default)]
    struct ErrorCounter(Arc<AtomicUsize>);

    impl ErrorCounter {
        fn count(&self) -> usize {
            self.0.load(Ordering::SeqCst)
        }
    }

    impl<S: tracing::Subscriber> Layer<S> for ErrorCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: LayerContext<'_, S>) {
            if *event.metadata().level() == tracing::Level::ERROR {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    struct RejectingTranslator;

    #[async_trait]
    impl Translator for RejectingTranslator {
        async fn translate(&self, text: &str) -> Result<String, TranslateError> {
            Err(TranslateError::new(
                text,
                ProviderError::Authentication {
                    status: 401,
                    message: "Incorrect API key provided".into(),
                },
            ))
        }
    }

    fn pipeline(
        desktop: &Arc<FakeDesktop>,
        translator: Arc<dyn Translator>,
        show_indicator: bool,
    ) -> TranslatePipeline {
        TranslatePipeline::new(
            desktop.clone(),
            desktop.clone(),
            translator,
            TimingSettings::immediate(),
            show_indicator,
        )
    }

    fn cycle() -> CycleGuard {
        Arc::new(AppState::new(Settings::default()))
            .try_begin_cycle()
            .unwrap()
    }

    #[tokio::test]
    async fn selection_is_replaced_by_its_translation() {
        let desktop = Arc::new(FakeDesktop::new("previous", "Bonjour le monde"));
        let translator = Arc::new(TableTranslator::with(&[("Bonjour le monde", "Hello world")]));

        let outcome = pipeline(&desktop, translator.clone(), true).run(&cycle()).await;

        assert_eq!(outcome, CycleOutcome::Replaced { chars: 11 });
        assert_eq!(desktop.clipboard(), "Hello world");
        assert_eq!(desktop.field(), "Hello world");
        assert_eq!(*translator.calls.lock().unwrap(), vec!["Bonjour le monde"]);
    }

    #[tokio::test]
    async fn empty_selection_makes_no_remote_call() {
        let desktop = Arc::new(FakeDesktop::new("kept", ""));
        let translator = Arc::new(TableTranslator::default());

        let outcome = pipeline(&desktop, translator.clone(), false).run(&cycle()).await;

        assert_eq!(outcome, CycleOutcome::NothingSelected);
        assert_eq!(desktop.clipboard(), "kept");
        assert_eq!(translator.call_count(), 0);
        assert_eq!(desktop.chords(), vec![EditChord::SelectAll, EditChord::Copy]);
    }

    #[tokio::test]
    async fn authentication_failure_stays_inside_the_cycle() {
        let errors = ErrorCounter::default();
        let _subscriber =
            tracing::subscriber::set_default(tracing_subscriber::registry().with(errors.clone()));
        let desktop = Arc::new(FakeDesktop::new("previous", "Bonjour le monde"));

        let outcome = pipeline(&desktop, Arc::new(RejectingTranslator), false)
            .run(&cycle())
            .await;

        assert_eq!(outcome, CycleOutcome::Failed);
        assert_eq!(desktop.clipboard(), "previous");
        assert_eq!(desktop.field(), "Bonjour le monde");
        assert!(!desktop.chords().contains(&EditChord::Paste));
        assert_eq!(errors.count(), 1);
    }

    #[tokio::test]
    async fn capture_failure_restores_clipboard_and_skips_translation() {
        let desktop = Arc::new(FakeDesktop::new("previous", "Bonjour"));
        desktop.fail_on(EditChord::SelectAll);
        let translator = Arc::new(TableTranslator::default());

        let outcome = pipeline(&desktop, translator.clone(), false).run(&cycle()).await;

        assert_eq!(outcome, CycleOutcome::Failed);
        assert_eq!(desktop.clipboard(), "previous");
        assert_eq!(translator.call_count(), 0);
    }

    #[tokio::test]
    async fn paste_failure_is_reported_as_failed() {
        let desktop = Arc::new(FakeDesktop::new("previous", "Bonjour"));
        desktop.fail_on(EditChord::Paste);
        let translator = Arc::new(TableTranslator::with(&[("Bonjour", "Hello")]));

        let outcome = pipeline(&desktop, translator, false).run(&cycle()).await;

        assert_eq!(outcome, CycleOutcome::Failed);
    }

    #[tokio::test]
    async fn repeated_cycles_on_the_same_selection_agree() {
        let desktop = Arc::new(FakeDesktop::new("previous", "Bonjour le monde"));
        let translator = Arc::new(TableTranslator::with(&[("Bonjour le monde", "Hello world")]));
        let pipeline = pipeline(&desktop, translator.clone(), false);

        pipeline.run(&cycle()).await;
        let first = desktop.clipboard();

        desktop.set_field("Bonjour le monde");
        pipeline.run(&cycle()).await;

        assert_eq!(first, "Hello world");
        assert_eq!(desktop.clipboard(), first);
        assert_eq!(translator.call_count(), 2);
    }

    #[tokio::test]
    async fn status_follows_the_cycle_and_returns_to_idle() {
        let state = Arc::new(AppState::new(Settings::default()));
        let desktop = Arc::new(FakeDesktop::new("", "Hola"));
        let translator = Arc::new(TableTranslator::with(&[("Hola", "Hello")]));

        {
            let guard = state.try_begin_cycle().unwrap();
            pipeline(&desktop, translator, false).run(&guard).await;
            assert_eq!(state.status(), AppStatus::Replacing);
        }
        assert_eq!(state.status(), AppStatus::Idle);
    }
}
