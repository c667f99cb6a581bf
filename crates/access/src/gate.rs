use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cashless_core::{Aggregate, AggregateId, AggregateRoot, DomainError, DomainResult};
use cashless_events::{Command, Event};

/// Which half of the app an invite code unlocks.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppMode {
    /// Music, merch and the fan hub.
    Fan,
    /// Funnel marketplace.
    Marketplace,
}

impl AppMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppMode::Fan => "fan",
            AppMode::Marketplace => "marketplace",
        }
    }
}

impl core::fmt::Display for AppMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for AppMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fan" => Ok(AppMode::Fan),
            "marketplace" => Ok(AppMode::Marketplace),
            other => Err(DomainError::validation(format!("unknown app mode: {other:?}"))),
        }
    }
}

/// Registry of accepted invite codes.
///
/// Codes are stored and looked up in their normalised form (trimmed,
/// upper-case), matching what the entry field produces as the user types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteCodes {
    codes: HashMap<String, AppMode>,
}

impl InviteCodes {
    /// An empty registry; nothing is accepted.
    pub fn none() -> Self {
        Self {
            codes: HashMap::new(),
        }
    }

    pub fn normalize(code: &str) -> String {
        code.trim().to_uppercase()
    }

    /// Register `code`. Blank codes are rejected.
    pub fn insert(&mut self, code: &str, mode: AppMode) -> DomainResult<()> {
        let code = Self::normalize(code);
        if code.is_empty() {
            return Err(DomainError::validation("invite code cannot be empty"));
        }
        self.codes.insert(code, mode);
        Ok(())
    }

    pub fn resolve(&self, code: &str) -> Option<AppMode> {
        self.codes.get(&Self::normalize(code)).copied()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl Default for InviteCodes {
    fn default() -> Self {
        let mut codes = HashMap::new();
        codes.insert("SOUNDWAVE2024".to_string(), AppMode::Fan);
        codes.insert("FUNNELMARKET2024".to_string(), AppMode::Marketplace);
        Self { codes }
    }
}

/// Where the user currently is in the entry flow.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateStage {
    CodeEntry,
    Login,
    MainApp,
}

/// Access gate identifier (one per app session).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessGateId(pub AggregateId);

impl AccessGateId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for AccessGateId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// The signed-in user, as far as the app knows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub username: Option<String>,
}

/// Aggregate root: AccessGate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGate {
    id: AccessGateId,
    codes: InviteCodes,
    stage: GateStage,
    mode: Option<AppMode>,
    user: Option<UserProfile>,
    version: u64,
}

impl AccessGate {
    /// A gate waiting for an invite code.
    pub fn new(id: AccessGateId, codes: InviteCodes) -> Self {
        Self {
            id,
            codes,
            stage: GateStage::CodeEntry,
            mode: None,
            user: None,
            version: 0,
        }
    }

    pub fn id_typed(&self) -> AccessGateId {
        self.id
    }

    pub fn stage(&self) -> GateStage {
        self.stage
    }

    /// Mode unlocked by the accepted invite code, if any.
    pub fn mode(&self) -> Option<AppMode> {
        self.mode
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn is_in_main_app(&self) -> bool {
        self.stage == GateStage::MainApp
    }
}

impl AggregateRoot for AccessGate {
    type Id = AccessGateId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: SubmitInviteCode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitInviteCode {
    pub gate_id: AccessGateId,
    pub code: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CompleteLogin. `username` is present on sign-up only.
///
/// The password is accepted on input but never written back out, neither by
/// `Serialize` nor by `Debug`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteLogin {
    pub gate_id: AccessGateId,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub username: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl core::fmt::Debug for CompleteLogin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CompleteLogin")
            .field("gate_id", &self.gate_id)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("username", &self.username)
            .field("occurred_at", &self.occurred_at)
            .finish()
    }
}

/// Command: SignOut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignOut {
    pub gate_id: AccessGateId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessCommand {
    SubmitInviteCode(SubmitInviteCode),
    CompleteLogin(CompleteLogin),
    SignOut(SignOut),
}

impl Command for AccessCommand {
    fn target_aggregate_id(&self) -> AggregateId {
        match self {
            AccessCommand::SubmitInviteCode(cmd) => cmd.gate_id.0,
            AccessCommand::CompleteLogin(cmd) => cmd.gate_id.0,
            AccessCommand::SignOut(cmd) => cmd.gate_id.0,
        }
    }
}

/// Event: InviteCodeAccepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteCodeAccepted {
    pub gate_id: AccessGateId,
    pub mode: AppMode,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LoggedIn. Never carries the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedIn {
    pub gate_id: AccessGateId,
    pub email: String,
    pub username: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: SignedOut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedOut {
    pub gate_id: AccessGateId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessEvent {
    InviteCodeAccepted(InviteCodeAccepted),
    LoggedIn(LoggedIn),
    SignedOut(SignedOut),
}

impl Event for AccessEvent {
    fn event_type(&self) -> &'static str {
        match self {
            AccessEvent::InviteCodeAccepted(_) => "access.invite_code.accepted",
            AccessEvent::LoggedIn(_) => "access.logged_in",
            AccessEvent::SignedOut(_) => "access.signed_out",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            AccessEvent::InviteCodeAccepted(e) => e.occurred_at,
            AccessEvent::LoggedIn(e) => e.occurred_at,
            AccessEvent::SignedOut(e) => e.occurred_at,
        }
    }
}

impl Aggregate for AccessGate {
    type Command = AccessCommand;
    type Event = AccessEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            AccessEvent::InviteCodeAccepted(e) => {
                self.mode = Some(e.mode);
                self.stage = GateStage::Login;
            }
            AccessEvent::LoggedIn(e) => {
                self.user = Some(UserProfile {
                    email: e.email.clone(),
                    username: e.username.clone(),
                });
                self.stage = GateStage::MainApp;
            }
            AccessEvent::SignedOut(_) => {
                self.mode = None;
                self.user = None;
                self.stage = GateStage::CodeEntry;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            AccessCommand::SubmitInviteCode(cmd) => self.handle_submit_code(cmd),
            AccessCommand::CompleteLogin(cmd) => self.handle_login(cmd),
            AccessCommand::SignOut(cmd) => self.handle_sign_out(cmd),
        }
    }
}

impl AccessGate {
    fn ensure_gate_id(&self, gate_id: AccessGateId) -> Result<(), DomainError> {
        if self.id != gate_id {
            return Err(DomainError::invariant("gate_id mismatch"));
        }
        Ok(())
    }

    fn ensure_stage(&self, expected: GateStage) -> Result<(), DomainError> {
        if self.stage != expected {
            return Err(DomainError::invariant(format!(
                "expected stage {expected:?}, gate is at {:?}",
                self.stage
            )));
        }
        Ok(())
    }

    fn handle_submit_code(&self, cmd: &SubmitInviteCode) -> Result<Vec<AccessEvent>, DomainError> {
        self.ensure_gate_id(cmd.gate_id)?;
        self.ensure_stage(GateStage::CodeEntry)?;

        let mode = self
            .codes
            .resolve(&cmd.code)
            .ok_or_else(|| DomainError::unauthorized("invalid invite code"))?;

        Ok(vec![AccessEvent::InviteCodeAccepted(InviteCodeAccepted {
            gate_id: cmd.gate_id,
            mode,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_login(&self, cmd: &CompleteLogin) -> Result<Vec<AccessEvent>, DomainError> {
        self.ensure_gate_id(cmd.gate_id)?;
        self.ensure_stage(GateStage::Login)?;

        let email = cmd.email.trim();
        if email.is_empty() {
            return Err(DomainError::validation("email is required"));
        }
        if !email.contains('@') {
            return Err(DomainError::validation("email must contain '@'"));
        }
        if cmd.password.trim().is_empty() {
            return Err(DomainError::validation("password is required"));
        }

        let username = match cmd.username.as_deref().map(str::trim) {
            Some("") => return Err(DomainError::validation("username cannot be empty")),
            Some(name) => Some(name.to_string()),
            None => None,
        };

        Ok(vec![AccessEvent::LoggedIn(LoggedIn {
            gate_id: cmd.gate_id,
            email: email.to_string(),
            username,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_sign_out(&self, cmd: &SignOut) -> Result<Vec<AccessEvent>, DomainError> {
        self.ensure_gate_id(cmd.gate_id)?;
        self.ensure_stage(GateStage::MainApp)?;

        Ok(vec![AccessEvent::SignedOut(SignedOut {
            gate_id: cmd.gate_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cashless_events::execute;

    fn test_gate() -> AccessGate {
        AccessGate::new(AccessGateId::new(AggregateId::new()), InviteCodes::default())
    }

    fn submit(gate: &AccessGate, code: &str) -> AccessCommand {
        AccessCommand::SubmitInviteCode(SubmitInviteCode {
            gate_id: gate.id_typed(),
            code: code.to_string(),
            occurred_at: Utc::now(),
        })
    }

    fn login(gate: &AccessGate, email: &str, password: &str, username: Option<&str>) -> AccessCommand {
        AccessCommand::CompleteLogin(CompleteLogin {
            gate_id: gate.id_typed(),
            email: email.to_string(),
            password: password.to_string(),
            username: username.map(str::to_string),
            occurred_at: Utc::now(),
        })
    }

    fn sign_out(gate: &AccessGate) -> AccessCommand {
        AccessCommand::SignOut(SignOut {
            gate_id: gate.id_typed(),
            occurred_at: Utc::now(),
        })
    }

    #[test]
    fn fan_code_then_login_reaches_main_app() {
        let mut gate = test_gate();

        let cmd = submit(&gate, "SOUNDWAVE2024");
        execute(&mut gate, &cmd).unwrap();
        assert_eq!(gate.stage(), GateStage::Login);
        assert_eq!(gate.mode(), Some(AppMode::Fan));

        let cmd = login(&gate, "fan@example.com", "hunter2", None);
        execute(&mut gate, &cmd).unwrap();
        assert!(gate.is_in_main_app());
        assert_eq!(gate.user().unwrap().email, "fan@example.com");
        assert_eq!(gate.version(), 2);
    }

    #[test]
    fn marketplace_code_unlocks_marketplace_mode() {
        let mut gate = test_gate();
        let cmd = submit(&gate, "FUNNELMARKET2024");
        execute(&mut gate, &cmd).unwrap();
        assert_eq!(gate.mode(), Some(AppMode::Marketplace));
    }

    #[test]
    fn code_is_trimmed_and_uppercased() {
        let mut gate = test_gate();
        let cmd = submit(&gate, "  soundwave2024 ");
        execute(&mut gate, &cmd).unwrap();
        assert_eq!(gate.mode(), Some(AppMode::Fan));
    }

    #[test]
    fn unknown_code_is_unauthorized_and_state_unchanged() {
        let mut gate = test_gate();
        let cmd = submit(&gate, "LETMEIN");
        let err = execute(&mut gate, &cmd).unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));
        assert_eq!(gate.stage(), GateStage::CodeEntry);
        assert_eq!(gate.version(), 0);
    }

    #[test]
    fn login_before_code_is_rejected() {
        let gate = test_gate();
        let err = gate.handle(&login(&gate, "a@b.c", "pw", None)).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn second_code_after_acceptance_is_rejected() {
        let mut gate = test_gate();
        let cmd = submit(&gate, "SOUNDWAVE2024");
        execute(&mut gate, &cmd).unwrap();
        let err = gate.handle(&submit(&gate, "FUNNELMARKET2024")).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn login_field_validation() {
        let mut gate = test_gate();
        let cmd = submit(&gate, "SOUNDWAVE2024");
        execute(&mut gate, &cmd).unwrap();

        for cmd in [
            login(&gate, "", "pw", None),
            login(&gate, "not-an-email", "pw", None),
            login(&gate, "a@b.c", "   ", None),
            login(&gate, "a@b.c", "pw", Some("  ")),
        ] {
            let err = gate.handle(&cmd).unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)), "{cmd:?}");
        }
    }

    #[test]
    fn sign_up_keeps_trimmed_username() {
        let mut gate = test_gate();
        let cmd = submit(&gate, "SOUNDWAVE2024");
        execute(&mut gate, &cmd).unwrap();
        let cmd = login(&gate, " a@b.c ", "pw", Some(" wave "));
        execute(&mut gate, &cmd).unwrap();

        let user = gate.user().unwrap();
        assert_eq!(user.email, "a@b.c");
        assert_eq!(user.username.as_deref(), Some("wave"));
    }

    #[test]
    fn sign_out_returns_to_code_entry() {
        let mut gate = test_gate();
        let cmd = submit(&gate, "SOUNDWAVE2024");
        execute(&mut gate, &cmd).unwrap();
        let cmd = login(&gate, "a@b.c", "pw", None);
        execute(&mut gate, &cmd).unwrap();
        let cmd = sign_out(&gate);
        execute(&mut gate, &cmd).unwrap();

        assert_eq!(gate.stage(), GateStage::CodeEntry);
        assert_eq!(gate.mode(), None);
        assert!(gate.user().is_none());
        assert_eq!(gate.version(), 3);
    }

    #[test]
    fn sign_out_outside_main_app_is_rejected() {
        let gate = test_gate();
        assert!(gate.handle(&sign_out(&gate)).is_err());
    }

    #[test]
    fn password_is_redacted_in_debug() {
        let gate = test_gate();
        let rendered = format!("{:?}", login(&gate, "a@b.c", "s3cret-pw", None));
        assert!(!rendered.contains("s3cret-pw"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn password_is_never_serialized() {
        let gate = test_gate();
        let cmd = login(&gate, "a@b.c", "s3cret-pw", Some("wave"));

        let json = serde_json::to_string(&cmd).unwrap();
        assert!(!json.contains("s3cret-pw"));
        assert!(!json.contains("password"));
        assert!(json.contains("a@b.c"));
    }

    #[test]
    fn password_is_read_from_incoming_commands() {
        let gate = test_gate();
        let incoming = serde_json::json!({
            "CompleteLogin": {
                "gate_id": gate.id_typed(),
                "email": "a@b.c",
                "password": "pw",
                "username": null,
                "occurred_at": Utc::now(),
            }
        });
        match serde_json::from_value::<AccessCommand>(incoming).unwrap() {
            AccessCommand::CompleteLogin(cmd) => assert_eq!(cmd.password, "pw"),
            other => panic!("Expected CompleteLogin, got {other:?}"),
        }
    }

    #[test]
    fn gate_id_mismatch_is_rejected() {
        let gate = test_gate();
        let cmd = AccessCommand::SubmitInviteCode(SubmitInviteCode {
            gate_id: AccessGateId::new(AggregateId::new()),
            code: "SOUNDWAVE2024".into(),
            occurred_at: Utc::now(),
        });
        assert!(matches!(gate.handle(&cmd), Err(DomainError::InvariantViolation(_))));
    }

    #[test]
    fn custom_registry_and_mode_parsing() {
        let mut codes = InviteCodes::none();
        assert!(codes.insert("  ", AppMode::Fan).is_err());
        codes.insert("vip", "Marketplace".parse().unwrap()).unwrap();

        assert_eq!(codes.resolve("VIP"), Some(AppMode::Marketplace));
        assert_eq!(codes.resolve("SOUNDWAVE2024"), None);
        assert!("admin".parse::<AppMode>().is_err());
    }

    #[test]
    fn event_types_are_stable() {
        let gate = test_gate();
        let events = gate.handle(&submit(&gate, "SOUNDWAVE2024")).unwrap();
        assert_eq!(events[0].event_type(), "access.invite_code.accepted");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

            #[test]
            fn unknown_codes_never_pass(code in "[A-Z0-9]{1,16}") {
                prop_assume!(code != "SOUNDWAVE2024" && code != "FUNNELMARKET2024");
                let gate = test_gate();
                prop_assert!(matches!(
                    gate.handle(&submit(&gate, &code)),
                    Err(DomainError::Unauthorized(_))
                ));
            }
        }
    }
}
