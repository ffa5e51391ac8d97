//! Exclusive interactive sessions a character can take part in.
//!
//! The sessions themselves belong to the trade/market subsystem. The
//! coordinator only keeps a weak back-reference and calls `cancel` on it;
//! it never keeps a session alive.

use std::sync::{Arc, Weak};

use tracing::{debug, warn};

/// A player-to-player trade, owned by the trade subsystem.
pub trait TradeSession: Send + Sync {
    /// Terminates the trade for every participant.
    fn cancel(&self);
}

/// A buy/sell session with a merchant, owned by the market subsystem.
pub trait BuySellSession: Send + Sync {
    fn cancel(&self);
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum TransactionKind {
    #[default]
    None,
    Trade,
    BuySell,
}

#[derive(Clone, Default)]
enum Transaction {
    #[default]
    None,
    Trade(Weak<dyn TradeSession>),
    BuySell(Weak<dyn BuySellSession>),
}

/// Ensures a character is in at most one exclusive transaction.
#[derive(Clone, Default)]
pub struct TransactionCoordinator {
    active: Transaction,
}

impl TransactionCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(&self) -> TransactionKind {
        match self.active {
            Transaction::None => TransactionKind::None,
            Transaction::Trade(_) => TransactionKind::Trade,
            Transaction::BuySell(_) => TransactionKind::BuySell,
        }
    }

    /// Installs `trade` as the active transaction, cancelling whatever was
    /// active first. `None` clears a finished trade.
    ///
    /// # Panics
    ///
    /// Clearing while a buy/sell session is active is a caller bug.
    pub fn set_trading(&mut self, trade: Option<&Arc<dyn TradeSession>>) {
        match trade {
            Some(trade) => {
                self.cancel();
                self.active = Transaction::Trade(Arc::downgrade(trade));
            }
            None => {
                assert!(
                    matches!(self.active, Transaction::None | Transaction::Trade(_)),
                    "cleared trade while a {} transaction is active",
                    self.kind()
                );
                self.active = Transaction::None;
            }
        }
    }

    /// Buy/sell counterpart of [`set_trading`](Self::set_trading).
    ///
    /// # Panics
    ///
    /// Clearing while a trade is active is a caller bug.
    pub fn set_buy_sell(&mut self, session: Option<&Arc<dyn BuySellSession>>) {
        match session {
            Some(session) => {
                self.cancel();
                self.active = Transaction::BuySell(Arc::downgrade(session));
            }
            None => {
                assert!(
                    matches!(self.active, Transaction::None | Transaction::BuySell(_)),
                    "cleared buy/sell while a {} transaction is active",
                    self.kind()
                );
                self.active = Transaction::None;
            }
        }
    }

    /// Cancels the active transaction, if any, and returns to `None`.
    ///
    /// The state is cleared before the session is notified.
    pub fn cancel(&mut self) {
        let previous = std::mem::take(&mut self.active);
        let notified = match previous {
            Transaction::None => return,
            Transaction::Trade(trade) => trade.upgrade().map(|trade| trade.cancel()).is_some(),
            Transaction::BuySell(session) => {
                session.upgrade().map(|session| session.cancel()).is_some()
            }
        };
        if notified {
            debug!("transaction cancelled");
        } else {
            warn!("cancelled a transaction whose session was already released");
        }
    }

    /// The active trade, if a trade is what is active.
    pub fn trading(&self) -> Option<Arc<dyn TradeSession>> {
        match &self.active {
            Transaction::Trade(trade) => trade.upgrade(),
            _ => None,
        }
    }

    /// The active buy/sell session, if that is what is active.
    pub fn buy_sell(&self) -> Option<Arc<dyn BuySellSession>> {
        match &self.active {
            Transaction::BuySell(session) => session.upgrade(),
            _ => None,
        }
    }
}

impl std::fmt::Debug for TransactionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionCoordinator")
            .field("active", &self.kind())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Session {
        cancels: AtomicUsize,
    }

    impl Session {
        fn cancels(&self) -> usize {
            self.cancels.load(Ordering::SeqCst)
        }
    }

    impl TradeSession for Session {
        fn cancel(&self) {
            self.cancels.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl BuySellSession for Session {
        fn cancel(&self) {
            self.cancels.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn trade() -> (Arc<Session>, Arc<dyn TradeSession>) {
        let session = Arc::new(Session::default());
        let handle: Arc<dyn TradeSession> = session.clone();
        (session, handle)
    }

    fn buy_sell() -> (Arc<Session>, Arc<dyn BuySellSession>) {
        let session = Arc::new(Session::default());
        let handle: Arc<dyn BuySellSession> = session.clone();
        (session, handle)
    }

    #[test]
    fn starting_buy_sell_cancels_trade_first() {
        let mut coordinator = TransactionCoordinator::new();
        let (trade_session, trade) = trade();
        let (sell_session, sell) = buy_sell();

        coordinator.set_trading(Some(&trade));
        assert!(coordinator.trading().is_some());
        assert!(coordinator.buy_sell().is_none());

        coordinator.set_buy_sell(Some(&sell));

        assert_eq!(trade_session.cancels(), 1);
        assert_eq!(sell_session.cancels(), 0);
        assert!(coordinator.trading().is_none());
        assert!(Arc::ptr_eq(&coordinator.buy_sell().unwrap(), &sell));
        assert_eq!(coordinator.kind(), TransactionKind::BuySell);
    }

    #[test]
    fn replacing_a_trade_cancels_the_old_one() {
        let mut coordinator = TransactionCoordinator::new();
        let (first_session, first) = trade();
        let (second_session, second) = trade();

        coordinator.set_trading(Some(&first));
        coordinator.set_trading(Some(&second));

        assert_eq!(first_session.cancels(), 1);
        assert_eq!(second_session.cancels(), 0);
        assert!(Arc::ptr_eq(&coordinator.trading().unwrap(), &second));
    }

    #[test]
    fn clearing_does_not_cancel() {
        let mut coordinator = TransactionCoordinator::new();
        let (session, trade) = trade();

        coordinator.set_trading(Some(&trade));
        coordinator.set_trading(None);

        assert_eq!(session.cancels(), 0);
        assert_eq!(coordinator.kind(), TransactionKind::None);
    }

    #[test]
    fn cancel_notifies_once_and_is_idempotent() {
        let mut coordinator = TransactionCoordinator::new();
        let (session, sell) = buy_sell();

        coordinator.set_buy_sell(Some(&sell));
        coordinator.cancel();
        coordinator.cancel();

        assert_eq!(session.cancels(), 1);
        assert!(coordinator.buy_sell().is_none());
    }

    #[test]
    fn coordinator_does_not_keep_sessions_alive() {
        let mut coordinator = TransactionCoordinator::new();
        let (session, trade) = trade();
        coordinator.set_trading(Some(&trade));

        drop(trade);
        drop(session);

        assert!(coordinator.trading().is_none());
        coordinator.cancel();
        assert_eq!(coordinator.kind(), TransactionKind::None);
    }

    #[test]
    #[should_panic(expected = "cleared trade while a buy_sell transaction is active")]
    fn clearing_the_wrong_kind_is_a_bug() {
        let mut coordinator = TransactionCoordinator::new();
        let (_session, sell) = buy_sell();
        coordinator.set_buy_sell(Some(&sell));
        coordinator.set_trading(None);
    }
}
