// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod crunchbase;
pub mod linkedin;
pub mod manager;
pub mod provider;

pub use crunchbase::CrunchbaseProvider;
pub use linkedin::LinkedInProvider;
pub use manager::{EnrichmentManager, EnrichmentReport};
pub use provider::{EnrichmentProvider, ProviderError};
