//! Entry flow into the app: invite code, then login, then the main app.
//!
//! Modelled as a small aggregate so the shell can only hand out a cart once
//! the gate reports `MainApp`. There is no backend; checks are local.

pub mod gate;

pub use gate::{
    AccessCommand, AccessEvent, AccessGate, AccessGateId, AppMode, CompleteLogin, GateStage,
    InviteCodeAccepted, InviteCodes, LoggedIn, SignOut, SignedOut, SubmitInviteCode, UserProfile,
};
