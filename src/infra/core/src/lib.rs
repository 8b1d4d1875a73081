// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

pub mod repos;
pub mod testing;
pub mod utils;

mod dataset_registry_impl;
pub use dataset_registry_impl::*;

mod extraction_service_postgres;
pub use extraction_service_postgres::*;

mod landing_service_impl;
pub use landing_service_impl::*;

mod parquet_encoder;
pub use parquet_encoder::*;

mod verification_service_impl;
pub use verification_service_impl::*;

pub use repos::*;
