//! # Message Recall
//!
//! A retrieval-augmented question answering service for chat workspaces.
//!
//! Two halves share one crate: a scheduled job that incrementally syncs new
//! chat messages into a remote vector index, and an HTTP query pipeline
//! that answers natural-language questions over the indexed history.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌─────────────┐   ┌───────────────┐
//! │ Messages │──▶│  Indexer     │──▶│ Vector Index  │
//! │ (SQLite) │   │ embed+upsert │   │ (remote, ns)  │
//! └──────────┘   └──────┬──────┘   └───────┬───────┘
//!                       │                  │
//!                 checkpoints         query-time
//!                                          │
//!        query ──▶ classify ──▶ retrieve ──┴─▶ compose ──▶ blocks
//!                                │                 │
//!                          summary+chunk      session store
//!                            fan-out          (last 5 turns)
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`store`] | Message reads and the sync checkpoint log |
//! | [`embedding`] | Embedding client |
//! | [`chat`] | Language model client |
//! | [`vector`] | Vector index client and typed metadata filters |
//! | [`indexer`] | Incremental sync job |
//! | [`intent`] | Query intent classification |
//! | [`router`] | Intent-driven retrieval fan-out |
//! | [`composer`] | Grounded answer composition |
//! | [`blocks`] | Response block wire format |
//! | [`session`] | Bounded conversation memory |
//! | [`server`] | HTTP query endpoint |

pub mod blocks;
pub mod chat;
pub mod composer;
pub mod config;
pub mod db;
pub mod embedding;
pub mod error;
mod http;
pub mod indexer;
pub mod intent;
pub mod migrate;
pub mod models;
pub mod pipeline;
pub mod router;
pub mod server;
pub mod session;
pub mod store;
pub mod vector;
