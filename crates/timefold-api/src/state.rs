use std::sync::Arc;

use timefold_core::clock::Clock;
use timefold_service::{
    AccountService, CapsuleFacade, DraftService, RecipientService, SelfLetterService, Settings,
};
use timefold_store::Store;

use crate::rate_limit::RateLimiter;
use crate::token::TokenKeys;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub accounts: Arc<AccountService>,
    pub capsules: Arc<CapsuleFacade>,
    pub drafts: Arc<DraftService>,
    pub recipients: Arc<RecipientService>,
    pub self_letters: Arc<SelfLetterService>,
    pub tokens: Arc<TokenKeys>,
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(store: Arc<Store>, clock: Arc<dyn Clock>, settings: Settings) -> Self {
        let tokens = Arc::new(TokenKeys::new(&settings));
        let limiter = Arc::new(RateLimiter::new(settings.rate_limit_per_minute));
        Self {
            accounts: Arc::new(AccountService::new(Arc::clone(&store), Arc::clone(&clock))),
            capsules: Arc::new(CapsuleFacade::new(
                Arc::clone(&store),
                Arc::clone(&clock),
                settings.clone(),
            )),
            drafts: Arc::new(DraftService::new(
                Arc::clone(&store),
                Arc::clone(&clock),
                settings.clone(),
            )),
            self_letters: Arc::new(SelfLetterService::new(
                Arc::clone(&store),
                Arc::clone(&clock),
            )),
            recipients: Arc::new(RecipientService::new(store, clock)),
            tokens,
            limiter,
            settings: Arc::new(settings),
        }
    }
}
