//! Compile-time markers for [`RealtimeClientBuilder`](super::RealtimeClientBuilder)
//!
//! `build()` is only implemented for `<HasUrl, HasRouter, R>`.

pub trait UrlState {}
pub trait RouterState {}

pub struct NoUrl;
pub struct HasUrl;

pub struct NoRouter;
pub struct HasRouter;

impl UrlState for NoUrl {}
impl UrlState for HasUrl {}

impl RouterState for NoRouter {}
impl RouterState for HasRouter {}
