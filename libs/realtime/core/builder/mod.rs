pub mod states;

use crate::client::RealtimeClient;
use crate::config::ClientConfig;
use crate::traits::*;
use states::*;
use std::marker::PhantomData;
use std::time::Duration;

/// Type-state builder for [`RealtimeClient`]
///
/// The URL and the router are required; the reconnection strategy
/// defaults to [`FixedDelay::default`] (3000 ms, 5 attempts).
pub struct RealtimeClientBuilder<U, Ro, R>
where
    U: UrlState,
    Ro: RouterState,
{
    _state: PhantomData<(U, Ro)>,
    url: Option<String>,
    router: Option<R>,
    reconnect_strategy: Option<Box<dyn ReconnectionStrategy>>,
}

impl RealtimeClientBuilder<NoUrl, NoRouter, ()> {
    /// Create a new builder instance
    pub fn new() -> Self {
        Self {
            _state: PhantomData,
            url: None,
            router: None,
            reconnect_strategy: None,
        }
    }
}

impl Default for RealtimeClientBuilder<NoUrl, NoRouter, ()> {
    fn default() -> Self {
        Self::new()
    }
}

// URL setting
impl<Ro, R> RealtimeClientBuilder<NoUrl, Ro, R>
where
    Ro: RouterState,
{
    pub fn url(self, url: impl Into<String>) -> RealtimeClientBuilder<HasUrl, Ro, R> {
        RealtimeClientBuilder {
            _state: PhantomData,
            url: Some(url.into()),
            router: self.router,
            reconnect_strategy: self.reconnect_strategy,
        }
    }
}

// Router setting
impl<U> RealtimeClientBuilder<U, NoRouter, ()>
where
    U: UrlState,
{
    pub fn router<NewR>(self, router: NewR) -> RealtimeClientBuilder<U, HasRouter, NewR>
    where
        NewR: EnvelopeRouter,
    {
        RealtimeClientBuilder {
            _state: PhantomData,
            url: self.url,
            router: Some(router),
            reconnect_strategy: self.reconnect_strategy,
        }
    }
}

// Optional settings, available in any state
impl<U, Ro, R> RealtimeClientBuilder<U, Ro, R>
where
    U: UrlState,
    Ro: RouterState,
{
    pub fn reconnect_strategy(mut self, strategy: impl ReconnectionStrategy + 'static) -> Self {
        self.reconnect_strategy = Some(Box::new(strategy));
        self
    }

    /// Shorthand for a [`FixedDelay`] strategy
    pub fn fixed_delay(self, delay: Duration, max_attempts: usize) -> Self {
        self.reconnect_strategy(FixedDelay::new(delay, Some(max_attempts)))
    }
}

impl<R> RealtimeClientBuilder<HasUrl, HasRouter, R>
where
    R: EnvelopeRouter,
{
    /// Validate the configuration and create an idle client
    ///
    /// No connection is made until [`RealtimeClient::connect`] is called.
    pub fn build(self) -> Result<RealtimeClient<R>> {
        let (Some(url), Some(router)) = (self.url, self.router) else {
            return Err(RealtimeError::Configuration(
                "builder is missing url or router".to_string(),
            ));
        };

        let strategy = self
            .reconnect_strategy
            .unwrap_or_else(|| Box::new(FixedDelay::default()));

        let config = ClientConfig::new(url, strategy)?;
        Ok(RealtimeClient::new(config, router))
    }
}
