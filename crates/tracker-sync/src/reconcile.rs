//! Pull and push reconciliation between the local store and the hub.
//!
//! Both directions are idempotent. Pull never links a hub record twice
//! (hub id index, with a normalized-title fallback for decisions entered
//! locally before any link existed). Push only considers decisions with no
//! hub id that did not come from the hub, and stamps the hub id on success,
//! so a second push finds nothing to send. The hub has no dedup of its own;
//! the local hub id is the only thing standing between a retry and a
//! duplicate remote record.

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::hub::HubApi;
use chrono::{Local, NaiveDateTime};
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use std::fmt;
use tracing::{info, warn};
use tracker_core::decision::normalize_title;
use tracker_core::remote::{parse_listing, RemoteDecision};
use tracker_core::vocab;
use tracker_core::{Decision, HistoryAction, HistoryEntry, TrackerState};
use tracker_store::StateStore;

const RESPONSIBLE_LABEL: &str = "Ответственный";
const DEADLINE_LABEL: &str = "Срок";
const TEXT_SEPARATOR: &str = ". ";

/// Why a sync operation stopped early without touching local state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoftFailure {
    NotConfigured,
    ConnectionFailed,
    UnexpectedFormat,
}

impl fmt::Display for SoftFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotConfigured => "hub not configured: no API key",
            Self::ConnectionFailed => "connection failed: hub unavailable",
            Self::UnexpectedFormat => "unexpected response format from hub",
        })
    }
}

/// Why a single push candidate was left unlinked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Extraction failed or returned no `extracted` object.
    ExtractFailed,
    /// Draft creation failed or returned no `draftId`.
    DraftFailed,
    /// Confirmation failed or returned no `id`.
    ConfirmFailed,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ExtractFailed => "extraction failed",
            Self::DraftFailed => "draft creation failed",
            Self::ConfirmFailed => "confirmation failed",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    Pushed { id: String, hub_id: String },
    Skipped { id: String, reason: SkipReason },
}

/// Result of a sync operation: how many records moved and a short
/// human-readable summary.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport {
    pub count: usize,
    pub message: String,
    pub failure: Option<SoftFailure>,
    /// Per-candidate results; empty for pulls.
    pub outcomes: Vec<PushOutcome>,
}

impl SyncReport {
    fn done(count: usize, message: String) -> Self {
        Self {
            count,
            message,
            failure: None,
            outcomes: Vec::new(),
        }
    }

    fn soft(failure: SoftFailure) -> Self {
        Self {
            count: 0,
            message: failure.to_string(),
            failure: Some(failure),
            outcomes: Vec::new(),
        }
    }
}

/// Hub availability plus local link counts.
#[derive(Debug, Clone)]
pub struct Overview {
    pub configured: bool,
    pub hub_ok: bool,
    pub hub_stats: Option<Value>,
    pub local_total: usize,
    pub linked: usize,
    pub local_only: usize,
    pub last_sync: Option<HistoryEntry>,
}

/// Runs pull and push against one hub and one local store.
///
/// Local changes go through [`StateStore::update`], so a concurrent mutation
/// fails fast instead of losing updates. The store lock is never held across
/// a hub request.
pub struct Reconciler<H> {
    hub: H,
    store: StateStore,
    config: SyncConfig,
}

impl<H: HubApi> Reconciler<H> {
    pub fn new(hub: H, store: StateStore, config: SyncConfig) -> Self {
        Self { hub, store, config }
    }

    pub fn hub(&self) -> &H {
        &self.hub
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn load_state(&self) -> Result<TrackerState, SyncError> {
        Ok(self.store.load()?)
    }

    pub fn save_state(&self, state: &TrackerState) -> Result<(), SyncError> {
        Ok(self.store.save(state)?)
    }

    /// Bring remote decisions into the local store.
    pub fn pull(&self) -> Result<SyncReport, SyncError> {
        if !self.hub.is_configured() {
            return Ok(SyncReport::soft(SoftFailure::NotConfigured));
        }

        let params = [("limit", self.config.pull_limit.to_string())];
        let Some(body) = self.hub.get("/api/decisions", &params) else {
            return Ok(SyncReport::soft(SoftFailure::ConnectionFailed));
        };
        let Some(listing) = parse_listing(&body) else {
            warn!("hub listing is neither an array nor has a decisions/data array");
            return Ok(SyncReport::soft(SoftFailure::UnexpectedFormat));
        };
        if listing.rejected > 0 {
            warn!(rejected = listing.rejected, "skipped malformed hub decisions");
        }

        let added = self
            .store
            .update(|state| Ok::<_, SyncError>(merge_pulled(state, &listing.decisions, now())))?;

        info!(added, fetched = listing.decisions.len(), "pull finished");
        Ok(SyncReport::done(
            added,
            format!("Pulled {} new decisions from the hub", added),
        ))
    }

    /// Send local-only decisions to the hub and link them.
    ///
    /// The extract -> draft -> confirm chains run against a snapshot with
    /// the store unlocked. Hub ids are applied afterwards in one short
    /// locked update, and only to decisions that are still unlinked local
    /// candidates at that point.
    pub fn push(&self) -> Result<SyncReport, SyncError> {
        if !self.hub.is_configured() {
            return Ok(SyncReport::soft(SoftFailure::NotConfigured));
        }

        let snapshot = self.store.load()?;
        let mut outcomes = Vec::new();
        for decision in snapshot.decisions.iter().filter(|d| is_push_candidate(d)) {
            let outcome = match self.push_one(decision) {
                Ok(hub_id) => PushOutcome::Pushed {
                    id: decision.id.clone(),
                    hub_id,
                },
                Err(reason) => {
                    warn!(id = %decision.id, %reason, "push skipped");
                    PushOutcome::Skipped {
                        id: decision.id.clone(),
                        reason,
                    }
                }
            };
            outcomes.push(outcome);
        }

        let linked = if pushed_count(&outcomes) > 0 {
            self.store.update(|state| {
                let linked = link_pushed(state, &outcomes);
                if linked > 0 {
                    state
                        .history
                        .push(HistoryEntry::sync(HistoryAction::SyncPush, linked, now()));
                }
                Ok::<_, SyncError>(linked)
            })?
        } else {
            0
        };

        info!(pushed = linked, candidates = outcomes.len(), "push finished");
        let mut report =
            SyncReport::done(linked, format!("Pushed {} decisions to the hub", linked));
        report.outcomes = outcomes;
        Ok(report)
    }

    /// Pull, then push.
    pub fn full_sync(&self) -> Result<SyncReport, SyncError> {
        let pulled = self.pull()?;
        let pushed = self.push()?;
        Ok(SyncReport {
            count: pulled.count + pushed.count,
            message: format!("{}. {}", pulled.message, pushed.message),
            failure: pulled.failure.or(pushed.failure),
            outcomes: pushed.outcomes,
        })
    }

    pub fn overview(&self) -> Result<Overview, SyncError> {
        let configured = self.hub.is_configured();
        let hub_ok = configured && self.hub.healthy();
        let hub_stats = if hub_ok { self.hub.stats() } else { None };

        let state = self.store.load()?;
        let local_total = state.decisions.len();
        let linked = state.linked_count();
        let local_only = state
            .decisions
            .iter()
            .filter(|d| is_push_candidate(d))
            .count();
        Ok(Overview {
            configured,
            hub_ok,
            hub_stats,
            local_total,
            linked,
            local_only,
            last_sync: state.last_sync().cloned(),
        })
    }

    /// extract -> draft -> confirm for one decision. Returns the hub id.
    fn push_one(&self, decision: &Decision) -> Result<String, SkipReason> {
        let raw_text = extraction_text(decision);

        let extract = self
            .hub
            .post("/api/decisions/extract", &json!({ "text": raw_text }))
            .ok_or(SkipReason::ExtractFailed)?;
        let mut extracted = match extract.get("extracted") {
            Some(Value::Object(map)) => map.clone(),
            _ => return Err(SkipReason::ExtractFailed),
        };
        overlay_local_fields(&mut extracted, decision);
        let missing_fields = match extract.get("missingFields") {
            Some(v @ Value::Array(_)) => v.clone(),
            _ => json!([]),
        };

        let draft = self
            .hub
            .post(
                "/api/decisions/draft",
                &json!({
                    "chatId": self.config.chat_id,
                    "userId": self.config.user_id,
                    "rawText": raw_text,
                    "extracted": extracted,
                    "missingFields": missing_fields,
                }),
            )
            .ok_or(SkipReason::DraftFailed)?;
        let draft_id = id_string(draft.get("draftId")).ok_or(SkipReason::DraftFailed)?;

        let confirmed = self
            .hub
            .post(
                &format!("/api/decisions/draft/{}/confirm", draft_id),
                &json!({
                    "userId": self.config.user_id,
                    "userName": self.config.user_name,
                }),
            )
            .ok_or(SkipReason::ConfirmFailed)?;
        id_string(confirmed.get("id")).ok_or(SkipReason::ConfirmFailed)
    }
}

/// Append every remote decision not yet known locally. Returns how many
/// were added; logs one `sync_pull` entry when that is non-zero.
pub fn merge_pulled(
    state: &mut TrackerState,
    remote: &[RemoteDecision],
    now: NaiveDateTime,
) -> usize {
    let mut hub_ids: HashSet<String> = state
        .decisions
        .iter()
        .filter_map(|d| d.hub_id.clone())
        .collect();
    let mut titles: HashSet<String> = state.decisions.iter().map(Decision::title_key).collect();

    let mut added = 0;
    for incoming in remote {
        let hub_id = incoming.hub_id();
        let title = normalize_title(incoming.title());

        if hub_id.is_some_and(|id| hub_ids.contains(id)) {
            continue;
        }
        if !title.is_empty() && titles.contains(&title) {
            continue;
        }

        let local = incoming.to_local(state.next_id(incoming.block()));

        if let Some(id) = hub_id {
            hub_ids.insert(id.to_string());
        }
        titles.insert(title);
        state.decisions.push(local);
        added += 1;
    }

    if added > 0 {
        state
            .history
            .push(HistoryEntry::sync(HistoryAction::SyncPull, added, now));
    }
    added
}

/// Only locally originated, unlinked decisions are pushed.
pub fn is_push_candidate(decision: &Decision) -> bool {
    !decision.is_linked() && !decision.is_hub_origin()
}

/// Flatten a decision into free text for remote extraction: the decision
/// text, then responsible, deadline and comment when present.
pub fn extraction_text(decision: &Decision) -> String {
    let mut parts = vec![decision.decision.clone()];
    if !decision.responsible.is_empty() {
        parts.push(format!("{}: {}", RESPONSIBLE_LABEL, decision.responsible));
    }
    if let Some(deadline) = &decision.deadline {
        parts.push(format!("{}: {}", DEADLINE_LABEL, deadline));
    }
    if !decision.comment.is_empty() {
        parts.push(decision.comment.clone());
    }
    parts.join(TEXT_SEPARATOR)
}

/// Local responsible and deadline win over the extractor's guesses; the
/// domain always comes from the local block.
pub fn overlay_local_fields(extracted: &mut Map<String, Value>, decision: &Decision) {
    if !decision.responsible.is_empty() {
        extracted.insert("responsible".into(), json!(decision.responsible));
    } else {
        extracted.entry("responsible").or_insert(Value::Null);
    }
    match &decision.deadline {
        Some(deadline) => {
            extracted.insert("deadline".into(), json!(deadline));
        }
        None => {
            extracted.entry("deadline").or_insert(Value::Null);
        }
    }
    extracted.insert(
        "domain".into(),
        json!(vocab::domain_for_block(decision.block)),
    );
}

/// Stamp hub ids from successful pushes onto their local decisions.
/// Decisions that were linked, removed or relabelled as hub-origin in the
/// meantime keep their current state. Returns how many were linked.
pub fn link_pushed(state: &mut TrackerState, outcomes: &[PushOutcome]) -> usize {
    let mut linked = 0;
    for outcome in outcomes {
        let PushOutcome::Pushed { id, hub_id } = outcome else {
            continue;
        };
        match state.decisions.iter_mut().find(|d| &d.id == id) {
            Some(decision) if is_push_candidate(decision) => {
                decision.hub_id = Some(hub_id.clone());
                linked += 1;
            }
            _ => warn!(%id, %hub_id, "decision changed during push, hub id not applied"),
        }
    }
    linked
}

fn pushed_count(outcomes: &[PushOutcome]) -> usize {
    outcomes
        .iter()
        .filter(|o| matches!(o, PushOutcome::Pushed { .. }))
        .count()
}

/// A non-empty string or a number, as a string.
fn id_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
