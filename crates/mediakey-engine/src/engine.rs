//! Retrieval and save workflows.
//!
//! ## Read path
//!
//! message → list collections → alias index → prefix resolution → pick items
//! → [`Notifier`]. Directory read failures degrade to "no match".
//!
//! ## Write path
//!
//! identity → quota → (prompt for items / keyword) → exact resolution →
//! per-item size check, naming and write. Each item's outcome is independent.
//!
//! Every call takes the configuration explicitly and runs in its own span
//! carrying a UUIDv7 `request_id`.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use mediakey_core::{
    extension_for, render_filename, resolve_quota, Delivery, EngineConfig, Error, Identity,
    IncomingItem, ItemOutcome, KeywordSummary, LookupOutcome, MissingTargetPolicy, NamingContext,
    Notifier, Prompter, QuotaDecision, RandomSource, Reply, Result, SaveOutcome, SaveReport,
    SaveRequest, SaveTarget, ThreadRandom,
};
use mediakey_store::{write_item, AliasIndex, CollectionDirectory, MediaPicker, TokenResolver};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::messages;

/// Entry point for inbound messages and save requests.
///
/// Holds only the random source; everything else arrives per call.
#[derive(Clone)]
pub struct Engine {
    rng: Arc<dyn RandomSource>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Engine backed by the thread-local random generator.
    pub fn new() -> Self {
        Self {
            rng: Arc::new(ThreadRandom),
        }
    }

    /// Engine with an injected random source.
    pub fn with_random(rng: Arc<dyn RandomSource>) -> Self {
        Self { rng }
    }

    // =========================================================================
    // READ PATH
    // =========================================================================

    /// Resolve a message to media without sending anything.
    pub async fn lookup(&self, config: &EngineConfig, message: &str) -> LookupOutcome {
        let span = info_span!("lookup", request_id = %Uuid::now_v7(), op = "lookup");
        self.lookup_inner(config, message).instrument(span).await
    }

    /// Resolve a message and deliver the result through `notifier`.
    ///
    /// `NoMatch` sends nothing.
    pub async fn respond(
        &self,
        config: &EngineConfig,
        message: &str,
        notifier: &dyn Notifier,
    ) -> Result<LookupOutcome> {
        let span = info_span!("respond", request_id = %Uuid::now_v7(), op = "respond");
        async {
            let outcome = self.lookup_inner(config, message).await;
            match &outcome {
                LookupOutcome::NoMatch => {}
                LookupOutcome::Empty { collection } => {
                    notifier
                        .send_text(&messages::empty_collection(collection))
                        .await?;
                }
                LookupOutcome::Found(delivery) => {
                    for item in &delivery.items {
                        notifier.send_media(item).await?;
                    }
                    info!(
                        collection = %delivery.collection,
                        count = delivery.items.len(),
                        "engine: delivered media"
                    );
                }
            }
            Ok(outcome)
        }
        .instrument(span)
        .await
    }

    async fn lookup_inner(&self, config: &EngineConfig, message: &str) -> LookupOutcome {
        let listing = CollectionDirectory::new(&config.collection_root);
        let collections = match listing.list_collections().await {
            Ok(collections) => collections,
            Err(e) => {
                warn!(path = %config.collection_root.display(), error = %e, "engine: collection root unreadable, treating as no match");
                return LookupOutcome::NoMatch;
            }
        };

        let max_output = config.effective_max_output();
        let index = AliasIndex::build(&collections);
        let resolver = TokenResolver::new(self.rng.as_ref(), max_output).with_trace(config.debug);
        let Some(resolution) = resolver.resolve_prefix(&index, message) else {
            if config.debug {
                debug!(aliases = index.len(), "engine: no alias prefixes the message");
            }
            return LookupOutcome::NoMatch;
        };

        let picker = MediaPicker::new(self.rng.as_ref(), max_output);
        match picker.pick(resolution.collection, resolution.count).await {
            Ok(Some(items)) => LookupOutcome::Found(Delivery {
                collection: resolution.collection.name.clone(),
                alias: resolution.alias.to_string(),
                count: resolution.count,
                collided: resolution.collided(),
                items,
            }),
            Ok(None) => LookupOutcome::Empty {
                collection: resolution.collection.primary().to_string(),
            },
            Err(e) => {
                warn!(collection = %resolution.collection.name, error = %e, "engine: collection unreadable, treating as no match");
                LookupOutcome::NoMatch
            }
        }
    }

    /// Every collection with its aliases and eligible item count.
    ///
    /// An unreadable root yields an empty list.
    pub async fn list_keywords(&self, config: &EngineConfig) -> Vec<KeywordSummary> {
        let span = info_span!("keywords", request_id = %Uuid::now_v7(), op = "keywords");
        async {
            let listing = CollectionDirectory::new(&config.collection_root);
            let collections = match listing.list_collections().await {
                Ok(collections) => collections,
                Err(e) => {
                    warn!(path = %config.collection_root.display(), error = %e, "engine: collection root unreadable");
                    return Vec::new();
                }
            };

            let mut summaries = Vec::with_capacity(collections.len());
            for collection in &collections {
                let item_count = match CollectionDirectory::list_items(collection).await {
                    Ok(items) => items.iter().filter(|i| i.kind.is_some()).count(),
                    Err(e) => {
                        warn!(collection = %collection.name, error = %e, "engine: collection unreadable");
                        0
                    }
                };
                summaries.push(KeywordSummary {
                    name: collection.primary().to_string(),
                    aliases: collection.aliases().into_iter().map(String::from).collect(),
                    item_count,
                });
            }
            summaries
        }
        .instrument(span)
        .await
    }

    // =========================================================================
    // WRITE PATH
    // =========================================================================

    /// Save the request's items under the collection its keyword names.
    ///
    /// Filesystem and transport failures before any item is attempted are
    /// returned as `Err`. Once items are attempted the report is always
    /// returned; per-item failures are outcomes and undeliverable notices are
    /// only logged.
    pub async fn save(
        &self,
        config: &EngineConfig,
        request: SaveRequest,
        notifier: &dyn Notifier,
        prompter: &dyn Prompter,
    ) -> Result<SaveOutcome> {
        let span = info_span!(
            "save",
            request_id = %Uuid::now_v7(),
            op = "save",
            user_id = %request.identity.user_id,
            group_id = request.identity.group_id.as_deref(),
        );
        self.save_inner(config, request, notifier, prompter)
            .instrument(span)
            .await
    }

    async fn save_inner(
        &self,
        config: &EngineConfig,
        request: SaveRequest,
        notifier: &dyn Notifier,
        prompter: &dyn Prompter,
    ) -> Result<SaveOutcome> {
        let SaveRequest {
            identity,
            keyword,
            mut items,
        } = request;

        let quota = resolve_quota(&config.quota, &identity);
        if config.debug {
            debug!(limit_bytes = quota.limit_bytes, source = %quota.source, "engine: quota resolved");
        }
        if quota.is_denied() {
            notifier.send_text(messages::QUOTA_DENIED).await?;
            return Ok(SaveOutcome::QuotaDenied);
        }

        if items.is_empty() {
            let Some(reply) = ask(config, prompter, messages::ASK_ITEMS).await? else {
                notifier.send_text(messages::TIMED_OUT).await?;
                return Ok(SaveOutcome::TimedOut);
            };
            items = reply.items;
            if items.is_empty() {
                notifier.send_text(messages::NO_ITEMS).await?;
                return Ok(SaveOutcome::NoItems);
            }
        }

        let keyword = match keyword.filter(|k| !k.trim().is_empty()) {
            Some(keyword) => keyword.trim().to_string(),
            None => match ask(config, prompter, messages::ASK_KEYWORD).await? {
                Some(reply) if !reply.text.trim().is_empty() => reply.text.trim().to_string(),
                Some(_) => {
                    notifier.send_text(messages::NO_KEYWORD).await?;
                    return Ok(SaveOutcome::NoKeyword);
                }
                None => {
                    notifier.send_text(messages::TIMED_OUT).await?;
                    return Ok(SaveOutcome::TimedOut);
                }
            },
        };

        let collections = match list_for_save(&config.collection_root).await {
            Ok(collections) => collections,
            Err(e) => {
                notifier.send_text(&messages::save_failed(&e)).await?;
                return Err(e);
            }
        };
        let index = AliasIndex::build(&collections);
        let resolver = TokenResolver::new(self.rng.as_ref(), config.effective_max_output())
            .with_trace(config.debug);

        let (target, dir) = match resolver.resolve_exact(&index, &keyword) {
            Some(collection) => (
                SaveTarget::Collection(collection.name.clone()),
                collection.path.clone(),
            ),
            None => match config.missing_target {
                MissingTargetPolicy::Fallback => {
                    debug!(keyword = %keyword, "engine: no collection matches, using holding area");
                    (SaveTarget::Holding, config.holding_root.clone())
                }
                MissingTargetPolicy::Cancel => {
                    notifier.send_text(&messages::cancelled(&keyword)).await?;
                    return Ok(SaveOutcome::Cancelled { keyword });
                }
            },
        };

        let now = Utc::now();
        let mut outcomes = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            outcomes.push(store_item(config, &identity, &quota, &dir, now, i + 1, item).await);
        }
        let report = SaveReport { target, outcomes };

        // Items are on disk by now; a failed notice must not hide the report
        for notice in report.outcomes.iter().filter_map(messages::item_notice) {
            notify(notifier, &notice).await;
        }
        notify(notifier, &messages::save_summary(&report, &keyword)).await;
        info!(
            saved = report.saved_count(),
            total = report.outcomes.len(),
            fallback = report.fallback_used(),
            path = %dir.display(),
            "engine: save finished"
        );
        Ok(SaveOutcome::Completed(report))
    }
}

/// Send a line after items were attempted; failures are logged, not returned.
async fn notify(notifier: &dyn Notifier, text: &str) {
    if let Err(e) = notifier.send_text(text).await {
        warn!(error = %e, "engine: notice not delivered");
    }
}

/// Ask through the prompter, bounded by the configured timeout.
///
/// `Ok(None)` means the wait expired.
async fn ask(config: &EngineConfig, prompter: &dyn Prompter, question: &str) -> Result<Option<Reply>> {
    match tokio::time::timeout(config.prompt_timeout(), prompter.ask(question)).await {
        Ok(reply) => reply.map(Some),
        Err(_) => {
            info!(timeout_secs = config.prompt_timeout_secs, "engine: prompt timed out");
            Ok(None)
        }
    }
}

/// List collections for a save; a root that does not exist yet has none.
async fn list_for_save(root: &Path) -> Result<Vec<mediakey_core::Collection>> {
    match CollectionDirectory::new(root).list_collections().await {
        Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %root.display(), "engine: collection root missing, no save targets");
            Ok(Vec::new())
        }
        other => other,
    }
}

async fn store_item(
    config: &EngineConfig,
    identity: &Identity,
    quota: &QuotaDecision,
    dir: &Path,
    now: DateTime<Utc>,
    index: usize,
    item: &IncomingItem,
) -> ItemOutcome {
    let Some(data) = &item.data else {
        return ItemOutcome::SkippedNoSource { index };
    };

    let size = data.len() as u64;
    if quota.excess(size).is_some() {
        return ItemOutcome::SkippedOversize {
            index,
            size,
            limit: quota.limit_bytes,
        };
    }

    let ext = extension_for(item.kind, item.content_type.as_deref());
    let context = NamingContext::new(identity, now, index, ext);
    let file_name = render_filename(&config.naming_template, &context);

    match write_item(dir, &file_name, data).await {
        Ok(path) => ItemOutcome::Saved { index, path },
        Err(e) => {
            warn!(index, file_name = %file_name, error = %e, "engine: item write failed");
            ItemOutcome::Failed {
                index,
                error: e.to_string(),
            }
        }
    }
}
