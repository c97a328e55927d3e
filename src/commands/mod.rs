// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod accounts;
pub mod dashboard;
pub mod doctor;
pub mod exporter;
pub mod goals;
pub mod importer;
pub mod portfolio;
pub mod settings;
pub mod transactions;

use rusqlite::Connection;

use crate::seed::Seed;
use crate::store::RecordStore;

/// Opens the record store over `conn`, seeding demo data on first use.
pub fn open_store(conn: &Connection) -> RecordStore<&Connection> {
    RecordStore::open(conn, Seed::demo())
}
