//! Seam to the external posing service.
//!
//! The manager never calls the service itself. It queues [`PoseRequest`]s;
//! the host runs them (here through [`PoseServiceClient::execute`], or on its
//! own runtime) and returns [`PoseCompletion`]s.

use hashbrown::{HashMap, HashSet};
use tracing::{error, warn};

use crate::error::ServiceError;
use crate::ids::{ActorId, RequestTicket, Sequence};
use crate::pose::PoseDocument;

/// Bones currently selected in the posing tool, per actor.
pub type SelectedBones = HashMap<ActorId, HashSet<String>>;

/// Calls exposed by the posing tool. Implementations report failures as
/// [`ServiceError`]; [`PoseServiceClient`] turns them into degraded values.
pub trait PoseService {
    fn is_available(&self) -> bool;
    fn api_version(&self) -> Result<(i32, i32), ServiceError>;
    fn is_posing(&self) -> Result<bool, ServiceError>;
    /// Apply a serialized pose document to an actor.
    fn load_pose(&mut self, actor: ActorId, json: &str) -> Result<bool, ServiceError>;
    /// Serialize an actor's live pose.
    fn save_pose(&mut self, actor: ActorId) -> Result<Option<String>, ServiceError>;
    fn selected_bones(&self) -> Result<SelectedBones, ServiceError>;
}

/// Snapshot of service health as last observed by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ServiceStatus {
    pub available: bool,
    pub api_version: (i32, i32),
    pub posing: bool,
}

/// Why a live pose is being read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SavePurpose {
    /// Rest pose for a timeline about to be created.
    DefaultPose,
    /// Keyframe capture of `bones` at `frame`.
    Capture { frame: i32, bones: Vec<String> },
}

#[derive(Clone, Debug, PartialEq)]
pub enum PoseRequestKind {
    GetSelectedBones,
    SavePose {
        actor: ActorId,
        purpose: SavePurpose,
        seq: Sequence,
    },
    LoadPose {
        actor: ActorId,
        document: PoseDocument,
        seq: Sequence,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct PoseRequest {
    pub ticket: RequestTicket,
    pub kind: PoseRequestKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PoseResult {
    SelectedBones(SelectedBones),
    SavedPose(Option<String>),
    Loaded(bool),
}

#[derive(Clone, Debug, PartialEq)]
pub struct PoseCompletion {
    pub ticket: RequestTicket,
    pub result: PoseResult,
}

impl PoseCompletion {
    pub fn new(ticket: RequestTicket, result: PoseResult) -> Self {
        Self { ticket, result }
    }
}

/// Error-absorbing wrapper around a [`PoseService`].
#[derive(Debug)]
pub struct PoseServiceClient<S> {
    service: S,
}

impl<S: PoseService> PoseServiceClient<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut S {
        &mut self.service
    }

    pub fn into_inner(self) -> S {
        self.service
    }

    pub fn is_available(&self) -> bool {
        self.service.is_available()
    }

    pub fn api_version(&self) -> (i32, i32) {
        self.service.api_version().unwrap_or_else(|err| {
            error!(%err, "api_version call failed");
            (0, 0)
        })
    }

    pub fn is_posing(&self) -> bool {
        self.service.is_posing().unwrap_or_else(|err| {
            error!(%err, "is_posing call failed");
            false
        })
    }

    pub fn status(&self) -> ServiceStatus {
        let available = self.is_available();
        if !available {
            return ServiceStatus::default();
        }
        ServiceStatus {
            available,
            api_version: self.api_version(),
            posing: self.is_posing(),
        }
    }

    /// Serialize and push a pose document. `false` on any failure.
    pub fn load_pose(&mut self, actor: ActorId, document: &PoseDocument) -> bool {
        let json = match document.to_json() {
            Ok(json) => json,
            Err(err) => {
                warn!(%actor, %err, "could not serialize pose document");
                return false;
            }
        };
        self.service.load_pose(actor, &json).unwrap_or_else(|err| {
            error!(%actor, %err, "load_pose call failed");
            false
        })
    }

    pub fn save_pose(&mut self, actor: ActorId) -> Option<String> {
        self.service.save_pose(actor).unwrap_or_else(|err| {
            error!(%actor, %err, "save_pose call failed");
            None
        })
    }

    pub fn selected_bones(&self) -> SelectedBones {
        self.service.selected_bones().unwrap_or_else(|err| {
            error!(%err, "selected_bones call failed");
            SelectedBones::new()
        })
    }

    /// Run one queued request against the service.
    pub fn execute(&mut self, request: PoseRequest) -> PoseCompletion {
        let result = match request.kind {
            PoseRequestKind::GetSelectedBones => PoseResult::SelectedBones(self.selected_bones()),
            PoseRequestKind::SavePose { actor, .. } => PoseResult::SavedPose(self.save_pose(actor)),
            PoseRequestKind::LoadPose { actor, document, .. } => {
                PoseResult::Loaded(self.load_pose(actor, &document))
            }
        };
        PoseCompletion::new(request.ticket, result)
    }

    pub fn execute_all(&mut self, requests: Vec<PoseRequest>) -> Vec<PoseCompletion> {
        requests.into_iter().map(|r| self.execute(r)).collect()
    }
}
