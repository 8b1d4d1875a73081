// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

mod dataset_registry;
pub use dataset_registry::*;

mod extraction_service;
pub use extraction_service::*;

mod landing_service;
pub use landing_service::*;

mod landing_store;
pub use landing_store::*;

mod payload_encoder;
pub use payload_encoder::*;

mod time_source;
pub use time_source::*;

mod verification_service;
pub use verification_service::*;
