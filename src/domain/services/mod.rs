// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod extraction_service;
pub mod report_service;
pub mod scoring_service;

pub use extraction_service::ExtractionService;
pub use report_service::ReportService;
pub use scoring_service::ScoringService;
