// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod crawler_test;
pub mod enrichment_test;
pub mod helpers;
pub mod pipeline_test;
