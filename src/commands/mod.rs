// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod periods;
pub mod view;
pub mod deductions;
pub mod units;
pub mod calcs;
pub mod trucks;
pub mod exporter;
pub mod settings;
