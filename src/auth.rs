use tracing::warn;

use crate::ledger::Ledger;

pub const MAX_LOGIN_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginState {
    AwaitingCredentials { attempts: u32 },
    Authenticated(String),
    Rejected,
}

/// A bounded sequence of login attempts against one ledger.
#[derive(Debug)]
pub struct Login {
    state: LoginState,
}

impl Default for Login {
    fn default() -> Self {
        Self {
            state: LoginState::AwaitingCredentials { attempts: 0 },
        }
    }
}

impl Login {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks one pair of credentials. Once `Authenticated` or `Rejected`
    /// the outcome is final and further submissions are ignored.
    pub fn submit(&mut self, ledger: &Ledger, username: &str, pin: &str) -> &LoginState {
        let LoginState::AwaitingCredentials { attempts } = self.state else {
            return &self.state;
        };

        self.state = if ledger.authenticate(username, pin) {
            LoginState::Authenticated(username.to_string())
        } else if attempts + 1 < MAX_LOGIN_ATTEMPTS {
            LoginState::AwaitingCredentials {
                attempts: attempts + 1,
            }
        } else {
            warn!(attempts = attempts + 1, "login rejected");
            LoginState::Rejected
        };
        &self.state
    }
}
