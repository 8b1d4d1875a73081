// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

mod extraction_service_stub;
pub use extraction_service_stub::*;

mod landing_store_in_memory;
pub use landing_store_in_memory::*;
