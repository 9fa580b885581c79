// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod doctor;
pub mod goals;
pub mod investments;
pub mod networth;
pub mod plans;
pub mod recurring;
pub mod settings;
pub mod transactions;
pub mod users;
