// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

/// Membership view over the set of known cat breeds.
///
/// Implemented by `crate::infrastructure::breeds::BreedCache`; validation only
/// depends on this trait so it never touches the network.
pub trait BreedCatalog: Send + Sync {
    fn exists(&self, name: &str) -> bool;
}
