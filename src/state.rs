// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::TokenService;
use crate::storage::CrmDatabase;

/// Shared application state cloned into every handler.
///
/// Nothing here is mutable at request time: the database handle manages its
/// own transactions and the token service holds only immutable key material.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<CrmDatabase>,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(db: CrmDatabase, tokens: TokenService) -> Self {
        Self {
            db: Arc::new(db),
            tokens,
        }
    }
}
