//! Multi-actor timeline manager.
//!
//! Owns every timeline, the shared playhead and selection, the playback clock
//! and the bookkeeping for in-flight posing-service requests. All service
//! I/O is expressed as queued [`PoseRequest`]s and returned
//! [`PoseCompletion`]s, so the manager itself never blocks.

use std::collections::{BTreeMap, BTreeSet};
use std::hash::Hash;

use hashbrown::HashMap;
use tracing::{debug, error, info, warn};

use crate::config::TimelineConfig;
use crate::data::Keyframe;
use crate::error::TimelineError;
use crate::ids::{ActorId, RequestTicket, Sequence, TicketAllocator};
use crate::pose::parse_or_log;
use crate::scheduler::PlaybackClock;
use crate::service::{
    PoseCompletion, PoseRequest, PoseRequestKind, PoseResult, PoseService, PoseServiceClient,
    SavePurpose, SelectedBones, ServiceStatus,
};
use crate::timeline::Timeline;
use crate::widget::{Canvas, Interaction, PointerEvent, TimelineView, WidgetLayout};

/// Upper bound on request/complete rounds per [`TimelineManager::pump`].
/// A selection fetch resolves in at most two follow-up rounds.
const MAX_PUMP_ROUNDS: usize = 4;

/// Outcome of one host tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Frames the playhead advanced.
    pub steps: u32,
    pub frame: i32,
    /// A pose-apply pass ran (the frame differed from the last applied one).
    pub applied: bool,
}

#[derive(Clone, Debug, PartialEq)]
enum Pending {
    SelectedBones,
    DefaultPose {
        actor: ActorId,
        seq: Sequence,
    },
    Capture {
        actor: ActorId,
        frame: i32,
        bones: Vec<String>,
        seq: Sequence,
    },
    Push {
        actor: ActorId,
    },
}

/// Newest sequence issued per key on one request channel.
#[derive(Debug)]
struct SequenceChannel<K> {
    newest: HashMap<K, Sequence>,
}

impl<K> Default for SequenceChannel<K> {
    fn default() -> Self {
        Self {
            newest: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash> SequenceChannel<K> {
    fn issue(&mut self, key: K, seq: Sequence) {
        self.newest.insert(key, seq);
    }

    fn is_stale(&self, key: &K, seq: Sequence) -> bool {
        self.newest.get(key).is_some_and(|newest| seq < *newest)
    }
}

/// A captured bone keyframe: actor, frame and bone name.
type CaptureKey = (ActorId, i32, String);

#[derive(Debug)]
struct Entry {
    timeline: Timeline,
    view: TimelineView,
}

#[derive(Debug)]
pub struct TimelineManager {
    config: TimelineConfig,
    entries: Vec<Entry>,
    active: Option<usize>,
    interaction: Interaction,
    clock: PlaybackClock,
    last_applied_frame: Option<i32>,
    status: ServiceStatus,
    allocator: TicketAllocator,
    outbox: Vec<PoseRequest>,
    pending: HashMap<RequestTicket, Pending>,
    /// Actors whose default pose is being fetched, with the bones to add.
    pending_creations: BTreeMap<ActorId, BTreeSet<String>>,
    /// Default-pose fetches, one channel per actor.
    fetches: SequenceChannel<ActorId>,
    /// Captures only supersede each other on the same frame and bone.
    captures: SequenceChannel<CaptureKey>,
}

impl Default for TimelineManager {
    fn default() -> Self {
        Self::new(TimelineConfig::default())
    }
}

impl TimelineManager {
    /// Build a manager. An invalid config is logged and replaced by the
    /// defaults; use [`try_new`](Self::try_new) to reject it instead.
    pub fn new(config: TimelineConfig) -> Self {
        match Self::try_new(config) {
            Ok(manager) => manager,
            Err(err) => {
                warn!(%err, "invalid timeline config, using defaults");
                Self::with_config(TimelineConfig::default())
            }
        }
    }

    pub fn try_new(config: TimelineConfig) -> Result<Self, TimelineError> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    fn with_config(config: TimelineConfig) -> Self {
        let clock = PlaybackClock::new(config.playback_fps);
        Self {
            config,
            entries: Vec::new(),
            active: None,
            interaction: Interaction::default(),
            clock,
            last_applied_frame: None,
            status: ServiceStatus::default(),
            allocator: TicketAllocator::new(),
            outbox: Vec::new(),
            pending: HashMap::new(),
            pending_creations: BTreeMap::new(),
            fetches: SequenceChannel::default(),
            captures: SequenceChannel::default(),
        }
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    // ---- timelines ----

    pub fn timeline_count(&self) -> usize {
        self.entries.len()
    }

    pub fn timelines(&self) -> impl Iterator<Item = &Timeline> + '_ {
        self.entries.iter().map(|e| &e.timeline)
    }

    pub fn timeline(&self, index: usize) -> Option<&Timeline> {
        self.entries.get(index).map(|e| &e.timeline)
    }

    /// Mutable access to a timeline. Edits made through it should be
    /// followed by [`invalidate_applied_pose`](Self::invalidate_applied_pose)
    /// so the next tick re-pushes the pose.
    pub fn timeline_mut(&mut self, index: usize) -> Option<&mut Timeline> {
        self.entries.get_mut(index).map(|e| &mut e.timeline)
    }

    pub fn timeline_by_actor(&self, actor: ActorId) -> Option<&Timeline> {
        self.entries
            .iter()
            .map(|e| &e.timeline)
            .find(|t| t.actor == actor)
    }

    pub fn timeline_by_actor_mut(&mut self, actor: ActorId) -> Option<&mut Timeline> {
        self.entries
            .iter_mut()
            .map(|e| &mut e.timeline)
            .find(|t| t.actor == actor)
    }

    pub fn view(&self, index: usize) -> Option<&TimelineView> {
        self.entries.get(index).map(|e| &e.view)
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_timeline(&self) -> Option<&Timeline> {
        self.timeline(self.active?)
    }

    pub fn active_timeline_mut(&mut self) -> Option<&mut Timeline> {
        let index = self.active?;
        self.timeline_mut(index)
    }

    /// Switch the active timeline. The shared selection refers to track
    /// indices, so it is cleared when the active timeline changes.
    pub fn set_active_timeline(&mut self, index: usize) -> Result<(), TimelineError> {
        if index >= self.entries.len() {
            return Err(TimelineError::TimelineIndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        if self.active != Some(index) {
            if let Some(previous) = self.active.and_then(|i| self.entries.get_mut(i)) {
                previous.view.reset_interaction();
            }
            self.active = Some(index);
            self.clear_selection();
            self.invalidate_applied_pose();
        }
        Ok(())
    }

    /// Activate the timeline that belongs to `actor`.
    pub fn set_active_actor(&mut self, actor: ActorId) -> Result<(), TimelineError> {
        let index = self
            .entries
            .iter()
            .position(|e| e.timeline.actor == actor)
            .ok_or(TimelineError::UnknownActor(actor))?;
        self.set_active_timeline(index)
    }

    /// Mark a timeline closed; it is dropped on the next [`prune_closed`](Self::prune_closed).
    pub fn close_timeline(&mut self, index: usize) -> Result<(), TimelineError> {
        let len = self.entries.len();
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(TimelineError::TimelineIndexOutOfRange { index, len })?;
        entry.timeline.visible = false;
        Ok(())
    }

    /// Drop closed timelines. Returns how many were removed.
    pub fn prune_closed(&mut self) -> usize {
        let before = self.entries.len();
        let active_actor = self.active_timeline().map(|t| t.actor);
        self.entries.retain(|e| e.timeline.visible);
        let removed = before - self.entries.len();
        if removed > 0 {
            debug!(removed, remaining = self.entries.len(), "closed timelines pruned");
            self.active = active_actor
                .and_then(|actor| self.entries.iter().position(|e| e.timeline.actor == actor));
            if self.active.is_none() {
                self.clear_selection();
            }
            self.fix_active_index();
            self.interaction.current_frame = self.clamp_global(self.interaction.current_frame);
            self.invalidate_applied_pose();
        }
        removed
    }

    fn fix_active_index(&mut self) {
        let len = self.entries.len();
        self.active = match self.active {
            _ if len == 0 => None,
            None => Some(len - 1),
            Some(i) if i >= len => Some(0),
            keep => keep,
        };
    }

    // ---- frames and selection ----

    /// Smallest `frame_min` across timelines; 0 with none.
    pub fn global_min_frame(&self) -> i32 {
        self.timelines().map(Timeline::frame_min).min().unwrap_or(0)
    }

    /// Largest `frame_max` across timelines; the configured default with none.
    pub fn global_max_frame(&self) -> i32 {
        self.timelines()
            .map(Timeline::frame_max)
            .max()
            .unwrap_or(self.config.default_frame_max)
    }

    /// Set every timeline's `frame_max`, never below `global_min + 1`.
    pub fn set_max_frame_for_all(&mut self, max: i32) {
        let max = max.max(self.global_min_frame().saturating_add(1));
        for entry in &mut self.entries {
            entry.timeline.set_frame_max(max);
        }
        self.interaction.current_frame = self.clamp_global(self.interaction.current_frame);
        self.invalidate_applied_pose();
    }

    fn clamp_global(&self, frame: i32) -> i32 {
        frame.clamp(self.global_min_frame(), self.global_max_frame().max(self.global_min_frame()))
    }

    pub fn current_frame(&self) -> i32 {
        self.interaction.current_frame
    }

    /// Move the playhead, clamped to the global frame range.
    pub fn set_current_frame(&mut self, frame: i32) {
        self.interaction.current_frame = self.clamp_global(frame);
    }

    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    pub fn selected_track(&self) -> Option<usize> {
        self.interaction.selected_track
    }

    /// Select a track (and optionally one of its keyframes) in the active
    /// timeline. Out-of-range indices clear the selection.
    pub fn select(&mut self, track: Option<usize>, keyframe: Option<usize>) {
        let valid_track =
            track.filter(|t| self.active_timeline().is_some_and(|tl| *t < tl.track_count()));
        let valid_key = valid_track.and(keyframe).filter(|k| {
            valid_track
                .and_then(|t| self.active_timeline()?.track(t))
                .is_some_and(|tr| *k < tr.len())
        });
        self.interaction.selected_track = valid_track;
        self.interaction.selected_keyframe = valid_key;
    }

    fn clear_selection(&mut self) {
        self.interaction.selected_track = None;
        self.interaction.selected_keyframe = None;
    }

    pub fn selected_keyframe(&self) -> Option<&Keyframe> {
        let track = self.interaction.selected_track?;
        let key = self.interaction.selected_keyframe?;
        self.active_timeline()?.keyframe(track, key)
    }

    pub fn selected_keyframe_mut(&mut self) -> Option<&mut Keyframe> {
        let track = self.interaction.selected_track?;
        let key = self.interaction.selected_keyframe?;
        self.active_timeline_mut()?.keyframe_mut(track, key)
    }

    /// Delete the selected keyframe of the active timeline. `Ok(None)` when
    /// nothing is selected.
    pub fn delete_selected_keyframe(&mut self) -> Result<Option<Keyframe>, TimelineError> {
        let (Some(track), Some(key)) = (
            self.interaction.selected_track,
            self.interaction.selected_keyframe,
        ) else {
            return Ok(None);
        };
        let Some(timeline) = self.active_timeline_mut() else {
            return Ok(None);
        };
        let len = timeline.track_count();
        let removed = timeline
            .track_mut(track)
            .ok_or(TimelineError::TrackIndexOutOfRange { index: track, len })?
            .delete_keyframe(key)?;
        self.interaction.selected_keyframe = None;
        self.invalidate_applied_pose();
        Ok(Some(removed))
    }

    // ---- playback ----

    pub fn is_playing(&self) -> bool {
        self.clock.is_playing()
    }

    /// Flip play/pause. Returns whether playback is now running.
    pub fn toggle_play(&mut self) -> bool {
        self.clock.toggle()
    }

    /// Pause, rewind to the global minimum and push that pose.
    pub fn stop(&mut self) {
        self.clock.stop();
        self.interaction.current_frame = self.global_min_frame();
        self.invalidate_applied_pose();
        self.apply_pose(self.interaction.current_frame);
    }

    /// Host tick: advance playback, then run a (debounced) pose-apply pass.
    pub fn tick(&mut self, dt: f32) -> TickReport {
        let (min, max) = (self.global_min_frame(), self.global_max_frame());
        let mut frame = self.interaction.current_frame;
        let steps = if self.entries.is_empty() {
            0
        } else {
            self.clock.advance(dt, &mut frame, min, max)
        };
        self.interaction.current_frame = frame;
        let applied = self.apply_pose(frame);
        TickReport {
            steps,
            frame,
            applied,
        }
    }

    /// Queue a pose push for every timeline at `frame`. Skipped when `frame`
    /// was the last applied frame. Returns whether a pass ran.
    pub fn apply_pose(&mut self, frame: i32) -> bool {
        if self.last_applied_frame == Some(frame) {
            return false;
        }
        let mut pushes = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let sampled = entry.timeline.sample_pose(frame);
            let document = if sampled.is_empty() {
                entry.timeline.default_pose().cloned()
            } else {
                Some(sampled)
            };
            if let Some(document) = document {
                pushes.push((entry.timeline.actor, document));
            }
        }
        for (actor, document) in pushes {
            self.supersede_push(actor);
            let seq = self.allocator.alloc_sequence();
            self.enqueue(
                PoseRequestKind::LoadPose {
                    actor,
                    document,
                    seq,
                },
                Pending::Push { actor },
            );
        }
        self.last_applied_frame = Some(frame);
        true
    }

    /// Pushes are latest-wins: drop the actor's older push, whether still
    /// queued or already handed out, so unanswered pushes never pile up.
    fn supersede_push(&mut self, actor: ActorId) {
        self.pending.retain(|_, pending| match pending {
            Pending::Push { actor: a } => *a != actor,
            _ => true,
        });
        self.outbox.retain(|request| match &request.kind {
            PoseRequestKind::LoadPose { actor: a, .. } => *a != actor,
            _ => true,
        });
    }

    /// Forget the last applied frame so the next pass pushes again.
    pub fn invalidate_applied_pose(&mut self) {
        self.last_applied_frame = None;
    }

    pub fn last_applied_frame(&self) -> Option<i32> {
        self.last_applied_frame
    }

    // ---- service ----

    pub fn service_status(&self) -> ServiceStatus {
        self.status
    }

    pub fn update_service_status(&mut self, status: ServiceStatus) {
        self.status = status;
    }

    /// Ask the service which bones are selected. Completing the request
    /// creates timelines, adds tracks and captures keyframes.
    pub fn fetch_selected_bones(&mut self) -> Option<RequestTicket> {
        if !self.status.available {
            error!("cannot fetch selected bones: posing service is not available");
            return None;
        }
        Some(self.enqueue(PoseRequestKind::GetSelectedBones, Pending::SelectedBones))
    }

    /// Drain queued requests for the host to execute.
    pub fn take_requests(&mut self) -> Vec<PoseRequest> {
        std::mem::take(&mut self.outbox)
    }

    /// Requests handed out (or queued) that have not completed yet.
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    fn enqueue(&mut self, kind: PoseRequestKind, pending: Pending) -> RequestTicket {
        let ticket = self.allocator.alloc_ticket();
        self.pending.insert(ticket, pending);
        self.outbox.push(PoseRequest { ticket, kind });
        ticket
    }

    /// Feed back the result of a request. Returns `false` when the completion
    /// was ignored (unknown ticket, stale sequence, closed timeline or a
    /// result of the wrong kind).
    pub fn complete(&mut self, completion: PoseCompletion) -> bool {
        let Some(pending) = self.pending.remove(&completion.ticket) else {
            debug!(ticket = completion.ticket.0, "completion for unknown ticket ignored");
            return false;
        };
        match (pending, completion.result) {
            (Pending::SelectedBones, PoseResult::SelectedBones(selected)) => {
                self.on_selected_bones(selected);
                true
            }
            (Pending::DefaultPose { actor, seq }, PoseResult::SavedPose(json)) => {
                if self.fetches.is_stale(&actor, seq) {
                    debug!(%actor, seq = seq.0, "stale default pose discarded");
                    return false;
                }
                self.on_default_pose(actor, json.as_deref());
                true
            }
            (
                Pending::Capture {
                    actor,
                    frame,
                    bones,
                    seq,
                },
                PoseResult::SavedPose(json),
            ) => {
                let fresh: Vec<String> = bones
                    .into_iter()
                    .filter(|bone| !self.captures.is_stale(&(actor, frame, bone.clone()), seq))
                    .collect();
                if fresh.is_empty() {
                    debug!(%actor, frame, seq = seq.0, "stale pose capture discarded");
                    return false;
                }
                self.on_capture(actor, frame, &fresh, json.as_deref())
            }
            (Pending::Push { actor }, PoseResult::Loaded(accepted)) => {
                if !accepted {
                    warn!(%actor, "posing service rejected pose push");
                }
                true
            }
            (pending, result) => {
                warn!(?pending, ?result, "completion kind does not match request");
                false
            }
        }
    }

    fn on_selected_bones(&mut self, selected: SelectedBones) {
        let ordered: BTreeMap<ActorId, BTreeSet<String>> = selected
            .into_iter()
            .map(|(actor, bones)| (actor, bones.into_iter().collect()))
            .collect();

        for (actor, bones) in ordered {
            if bones.is_empty() {
                continue;
            }
            let capture = self.timeline_by_actor_mut(actor).map(|timeline| {
                let mut capture = Vec::new();
                for bone in &bones {
                    if timeline.has_track(bone) {
                        capture.push(bone.clone());
                    } else {
                        timeline.add_track(bone.as_str());
                    }
                }
                capture
            });
            match capture {
                Some(capture) if capture.is_empty() => {}
                Some(capture) => {
                    let frame = self.interaction.current_frame;
                    let seq = self.allocator.alloc_sequence();
                    for bone in &capture {
                        self.captures.issue((actor, frame, bone.clone()), seq);
                    }
                    self.enqueue(
                        PoseRequestKind::SavePose {
                            actor,
                            purpose: SavePurpose::Capture {
                                frame,
                                bones: capture.clone(),
                            },
                            seq,
                        },
                        Pending::Capture {
                            actor,
                            frame,
                            bones: capture,
                            seq,
                        },
                    );
                }
                None => {
                    if let Some(pending) = self.pending_creations.get_mut(&actor) {
                        pending.extend(bones);
                        continue;
                    }
                    self.pending_creations.insert(actor, bones);
                    let seq = self.allocator.alloc_sequence();
                    self.fetches.issue(actor, seq);
                    self.enqueue(
                        PoseRequestKind::SavePose {
                            actor,
                            purpose: SavePurpose::DefaultPose,
                            seq,
                        },
                        Pending::DefaultPose { actor, seq },
                    );
                }
            }
        }
        self.fix_active_index();
    }

    fn on_default_pose(&mut self, actor: ActorId, json: Option<&str>) {
        let bones = self.pending_creations.remove(&actor).unwrap_or_default();
        let default_pose = parse_or_log(json, "default pose");
        if let Some(timeline) = self.timeline_by_actor_mut(actor) {
            for bone in &bones {
                timeline.ensure_track(bone);
            }
            return;
        }
        let frame_max = self.global_max_frame();
        let mut timeline = Timeline::new(actor, default_pose);
        timeline.set_frame_max(frame_max);
        for bone in &bones {
            timeline.add_track(bone.as_str());
        }
        info!(%actor, tracks = bones.len(), frame_max, "timeline created");
        self.entries.push(Entry {
            timeline,
            view: TimelineView::from_config(&self.config),
        });
        self.fix_active_index();
    }

    fn on_capture(
        &mut self,
        actor: ActorId,
        frame: i32,
        bones: &[String],
        json: Option<&str>,
    ) -> bool {
        let live = parse_or_log(json, "captured pose");
        let Some(timeline) = self.timeline_by_actor_mut(actor) else {
            debug!(%actor, "capture for closed timeline ignored");
            return false;
        };
        for bone in bones {
            let pose = live.as_ref().and_then(|doc| doc.bone(bone)).copied();
            let index = timeline.ensure_track(bone);
            if let Some(track) = timeline.track_mut(index) {
                track.add_or_update_keyframe(frame, pose);
            }
        }
        debug!(%actor, frame, bones = bones.len(), "pose captured");
        self.invalidate_applied_pose();
        true
    }

    /// Execute queued requests synchronously against `client` until the
    /// outbox is empty. Returns the number of completions applied.
    pub fn pump<S: PoseService>(&mut self, client: &mut PoseServiceClient<S>) -> usize {
        self.update_service_status(client.status());
        let mut applied = 0;
        for _ in 0..MAX_PUMP_ROUNDS {
            let requests = self.take_requests();
            if requests.is_empty() {
                break;
            }
            for completion in client.execute_all(requests) {
                if self.complete(completion) {
                    applied += 1;
                }
            }
        }
        applied
    }

    // ---- widget ----

    /// Route pointer events to the active timeline's widget and paint it.
    /// Returns whether the model changed; the next tick then re-pushes the
    /// pose.
    pub fn draw_active(
        &mut self,
        canvas: &mut dyn Canvas,
        layout: &WidgetLayout,
        events: &[PointerEvent],
    ) -> bool {
        let Some(index) = self.active else {
            return false;
        };
        let Some(entry) = self.entries.get_mut(index) else {
            return false;
        };
        let mut interaction = self.interaction;
        let changed = entry
            .view
            .frame(canvas, &mut entry.timeline, layout, events, &mut interaction);
        self.interaction = interaction;
        if changed {
            self.invalidate_applied_pose();
        }
        changed
    }
}
