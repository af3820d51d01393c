//! Per-call token-recovery policy, written once and driven by both the async
//! and the blocking client.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// What the executor should do next.
pub(crate) enum Step {
    /// Credential exchange because the session holds no token yet.
    Login,
    /// Issue the request with the current bearer header.
    Dispatch,
    /// Exchange the stale token via the refresh endpoint.
    Refresh,
    /// Full credential exchange after a failed refresh.
    Relogin,
    /// Re-issue the original request after a successful recovery.
    Replay,
    /// Recovery budget spent; the caller surfaces `TokenExpired`.
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// What happened at the current step.
pub(crate) enum Outcome {
    /// A fresh token was installed into the session.
    TokenInstalled,
    /// The token exchange failed (any error kind).
    ExchangeFailed,
    /// The gateway answered 401.
    Unauthorized,
}

#[derive(Debug)]
/// Authentication flow for one logical API call.
///
/// The recovery budget is exactly one: a 401 buys a single
/// refresh-or-relogin attempt and a single replay, after which the flow is
/// `Expired`. A successful (non-401) dispatch exits at the caller; it is never
/// fed back into the machine.
pub(crate) struct AuthFlow {
    step: Step,
}

impl AuthFlow {
    /// Entry point for one call: `Login` when the session holds no token,
    /// `Dispatch` otherwise.
    pub(crate) fn begin(has_token: bool) -> Self {
        Self {
            step: if has_token { Step::Dispatch } else { Step::Login },
        }
    }

    pub(crate) fn step(&self) -> Step {
        self.step
    }

    /// Feed the outcome of the current step and get the next one.
    pub(crate) fn advance(&mut self, outcome: Outcome) -> Step {
        self.step = match (self.step, outcome) {
            (Step::Login, Outcome::TokenInstalled) => Step::Dispatch,
            (Step::Dispatch, Outcome::Unauthorized) => Step::Refresh,
            (Step::Refresh, Outcome::TokenInstalled) => Step::Replay,
            (Step::Refresh, Outcome::ExchangeFailed) => Step::Relogin,
            (Step::Relogin, Outcome::TokenInstalled) => Step::Replay,
            (Step::Relogin, Outcome::ExchangeFailed) => Step::Expired,
            (Step::Replay, Outcome::Unauthorized) => Step::Expired,
            // Terminal or nonsensical combinations keep the current step.
            (step, _) => step,
        };
        self.step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begins_at_login_without_a_token() {
        assert_eq!(AuthFlow::begin(false).step(), Step::Login);
        assert_eq!(AuthFlow::begin(true).step(), Step::Dispatch);
    }

    #[test]
    fn login_leads_to_dispatch() {
        let mut flow = AuthFlow::begin(false);
        assert_eq!(flow.advance(Outcome::TokenInstalled), Step::Dispatch);
    }

    #[test]
    fn unauthorized_dispatch_is_recovered_via_refresh_then_replayed() {
        let mut flow = AuthFlow::begin(true);
        assert_eq!(flow.advance(Outcome::Unauthorized), Step::Refresh);
        assert_eq!(flow.advance(Outcome::TokenInstalled), Step::Replay);
    }

    #[test]
    fn failed_refresh_falls_back_to_relogin() {
        let mut flow = AuthFlow::begin(true);
        flow.advance(Outcome::Unauthorized);
        assert_eq!(flow.advance(Outcome::ExchangeFailed), Step::Relogin);
        assert_eq!(flow.advance(Outcome::TokenInstalled), Step::Replay);
    }

    #[test]
    fn failed_relogin_expires_the_flow() {
        let mut flow = AuthFlow::begin(true);
        flow.advance(Outcome::Unauthorized);
        flow.advance(Outcome::ExchangeFailed);
        assert_eq!(flow.advance(Outcome::ExchangeFailed), Step::Expired);
    }

    #[test]
    fn second_unauthorized_after_replay_expires_the_flow() {
        let mut flow = AuthFlow::begin(true);
        flow.advance(Outcome::Unauthorized);
        flow.advance(Outcome::TokenInstalled);
        // The replay's 401 must not buy another refresh.
        assert_eq!(flow.advance(Outcome::Unauthorized), Step::Expired);
    }

    #[test]
    fn expired_is_terminal() {
        let mut flow = AuthFlow::begin(true);
        flow.advance(Outcome::Unauthorized);
        flow.advance(Outcome::ExchangeFailed);
        flow.advance(Outcome::ExchangeFailed);
        assert_eq!(flow.advance(Outcome::Unauthorized), Step::Expired);
        assert_eq!(flow.advance(Outcome::TokenInstalled), Step::Expired);
    }
}
