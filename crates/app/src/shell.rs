use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;

use cashless_access::{
    AccessCommand, AccessGate, AccessGateId, AppMode, CompleteLogin, GateStage, InviteCodes,
    SignOut, SubmitInviteCode, UserProfile,
};
use cashless_cart::CartId;
use cashless_core::{AggregateId, DomainError, DomainResult, SessionId};
use cashless_events::{EventBus, InMemoryEventBus, Subscription, execute};
use cashless_marketplace::Board;
use cashless_merch::Catalog;

use crate::cart_handle::{CartEnvelope, CartHandle};
use crate::config::AppConfig;
use crate::error::ShellError;

pub type SharedCartBus = Arc<InMemoryEventBus<CartEnvelope>>;

/// One app session: the entry gate, the cart once the user is in, and the
/// read-only catalog and marketplace board.
#[derive(Debug)]
pub struct Shell {
    session_id: SessionId,
    gate: AccessGate,
    bus: SharedCartBus,
    cart: Option<CartHandle<SharedCartBus>>,
    catalog: Catalog,
    board: Board,
}

impl Shell {
    pub fn new(codes: InviteCodes) -> Self {
        Self {
            session_id: SessionId::new(),
            gate: AccessGate::new(AccessGateId::new(AggregateId::new()), codes),
            bus: Arc::new(InMemoryEventBus::new()),
            cart: None,
            catalog: Catalog::default(),
            board: Board::default(),
        }
    }

    /// Build a shell from configuration, loading the catalog and listings
    /// documents it points at.
    pub fn from_config(config: &AppConfig) -> Result<Self, ShellError> {
        let mut shell = Self::new(config.invite_codes.clone());

        if let Some(path) = &config.catalog_path {
            shell.catalog = Catalog::from_json_reader(open(path)?)?;
        }
        if let Some(path) = &config.listings_path {
            shell.board = Board::from_json_reader(open(path)?)?;
        }

        Ok(shell)
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_board(mut self, board: Board) -> Self {
        self.board = board;
        self
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn stage(&self) -> GateStage {
        self.gate.stage()
    }

    pub fn mode(&self) -> Option<AppMode> {
        self.gate.mode()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.gate.user()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Follow cart events published from now on.
    pub fn subscribe(&self) -> Subscription<CartEnvelope> {
        self.bus.subscribe()
    }

    pub fn submit_invite_code(&mut self, code: &str) -> DomainResult<AppMode> {
        let command = AccessCommand::SubmitInviteCode(SubmitInviteCode {
            gate_id: self.gate.id_typed(),
            code: code.to_string(),
            occurred_at: Utc::now(),
        });

        if let Err(err) = execute(&mut self.gate, &command) {
            tracing::info!(session_id = %self.session_id, "invite code rejected: {err}");
            return Err(err);
        }

        let mode = self
            .gate
            .mode()
            .ok_or_else(|| DomainError::invariant("accepted invite code without a mode"))?;
        tracing::info!(session_id = %self.session_id, mode = %mode, "invite code accepted");
        Ok(mode)
    }

    /// Log in (or sign up when `username` is given). Opens an empty cart.
    pub fn log_in(&mut self, email: &str, password: &str, username: Option<&str>) -> DomainResult<()> {
        let command = AccessCommand::CompleteLogin(CompleteLogin {
            gate_id: self.gate.id_typed(),
            email: email.to_string(),
            password: password.to_string(),
            username: username.map(str::to_string),
            occurred_at: Utc::now(),
        });
        execute(&mut self.gate, &command)?;

        let cart_id = CartId::new(AggregateId::new());
        self.cart = Some(CartHandle::new(self.session_id, cart_id, self.bus.clone()));

        tracing::info!(session_id = %self.session_id, cart_id = %cart_id, "entered main app");
        Ok(())
    }

    /// Leave the main app. The session's cart is discarded.
    pub fn sign_out(&mut self) -> DomainResult<()> {
        let command = AccessCommand::SignOut(SignOut {
            gate_id: self.gate.id_typed(),
            occurred_at: Utc::now(),
        });
        execute(&mut self.gate, &command)?;

        self.cart = None;
        tracing::info!(session_id = %self.session_id, "signed out");
        Ok(())
    }

    pub fn cart(&self) -> DomainResult<&CartHandle<SharedCartBus>> {
        self.cart.as_ref().ok_or_else(Self::locked)
    }

    pub fn cart_mut(&mut self) -> DomainResult<&mut CartHandle<SharedCartBus>> {
        self.cart.as_mut().ok_or_else(Self::locked)
    }

    fn locked() -> DomainError {
        DomainError::unauthorized("cart is only available inside the main app")
    }
}

fn open(path: &Path) -> Result<File, ShellError> {
    File::open(path).map_err(|source| ShellError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_in() -> Shell {
        let mut shell = Shell::new(InviteCodes::default());
        shell.submit_invite_code("SOUNDWAVE2024").unwrap();
        shell.log_in("fan@example.com", "pw", None).unwrap();
        shell
    }

    #[test]
    fn cart_is_locked_until_main_app() {
        let mut shell = Shell::new(InviteCodes::default());
        assert!(matches!(shell.cart(), Err(DomainError::Unauthorized(_))));

        shell.submit_invite_code("FUNNELMARKET2024").unwrap();
        assert!(matches!(shell.cart_mut(), Err(DomainError::Unauthorized(_))));

        shell.log_in("a@b.c", "pw", Some("bidder")).unwrap();
        assert_eq!(shell.stage(), GateStage::MainApp);
        assert!(shell.cart().unwrap().cart().is_empty());
    }

    #[test]
    fn rejected_code_keeps_shell_at_entry() {
        let mut shell = Shell::new(InviteCodes::default());
        assert!(shell.submit_invite_code("NOPE").is_err());
        assert_eq!(shell.stage(), GateStage::CodeEntry);
        assert_eq!(shell.mode(), None);
    }

    #[test]
    fn sign_out_discards_cart() {
        let mut shell = signed_in();
        assert!(shell.cart().is_ok());

        shell.sign_out().unwrap();
        assert_eq!(shell.stage(), GateStage::CodeEntry);
        assert!(shell.cart().is_err());
        assert!(shell.user().is_none());
    }

    #[test]
    fn missing_catalog_file_is_io_error() {
        let config = AppConfig {
            catalog_path: Some("/definitely/not/here.json".into()),
            ..AppConfig::default()
        };
        assert!(matches!(Shell::from_config(&config), Err(ShellError::Io { .. })));
    }
}
