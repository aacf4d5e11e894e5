// Copyright 2026 The Laoshi Project
// SPDX-License-Identifier: Apache-2.0

pub mod client;
pub mod config;
pub mod course;
pub mod repository;
pub mod stream;
