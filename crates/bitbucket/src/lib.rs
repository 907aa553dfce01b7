//! Bitbucket Cloud infrastructure adapter.
//!
//! Implements the [`pipeline::ProviderClient`] port against the Bitbucket Cloud
//! 2.0 REST API and exposes [`BitbucketCloudDecorator`], the entry point that
//! binds a client to one pull request and runs a decoration pass with it.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules.
//! All API details (URL layout, authentication, pagination, payload shapes)
//! are handled here; the [`pipeline`] crate never sees them.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`client`] | `BitbucketCloudClient`, the `ProviderClient` implementation |
//! | [`decorator`] | `BitbucketCloudDecorator` entry point |
//! | `pagination` | Shared `next`-link follower |
//! | `payload` | Request and response bodies |

pub mod client;
pub mod decorator;
mod pagination;
mod payload;

pub use client::{BitbucketCloudClient, DEFAULT_BASE_URL};
pub use decorator::BitbucketCloudDecorator;
