// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-based test modules

mod schema_validation;
mod subject_naming;
